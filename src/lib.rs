// src/lib.rs
//! # corr-db
//!
//! Storage and reduction of lattice QCD two-point correlators.
//!
//! Raw measurements (one time series per gauge configuration and time
//! source) live in a measurement store. Retrieval removes repeated
//! measurements, blocking averages consecutive configurations, and
//! aggregation averages correlators that describe the same state. Reduced
//! datasets are cached on disk so later runs skip the store entirely.
//!
//! ## Features
//!
//! - **Duplicate resolution**: near-identical repeats keep one copy, conflicting repeats are discarded
//! - **Blocking**: groups never cross a series, incomplete trajectories are evicted
//! - **Aggregation**: `16p`/`16m` style partners are averaged configuration by configuration
//! - **File cache**: GPL text or JSON, data and metadata kept in parallel files
//! - **SQLite store** (feature `sqlite`): zstd-compressed series blobs
//!
//! ## Quick Start
//!
//! ### Reducing one correlator
//!
//! ```rust
//! use corr_db::*;
//!
//! fn main() -> Result<()> {
//!     let mut store = MemoryStore::new();
//!     let id = store.insert_correlator("corr")?;
//!     store.append_all(
//!         id,
//!         (0..4).map(|traj| Measurement::new('a', 100 + traj, 0, vec![traj as f64 + 1.0, 0.5])),
//!         false,
//!     )?;
//!
//!     let corr = LatticeCorrelator::fetch(&store, "corr", FitKind::Baryon, &RetrievalOptions::default())?;
//!     let blocked = corr.block(BlockingOptions::new(2, false))?;
//!     assert_eq!(blocked.config_ids(), vec!["a00100_t000+a00101_t000", "a00102_t000+a00103_t000"]);
//!     Ok(())
//! }
//! ```
//!
//! ### Gathering cached datasets
//!
//! ```rust,no_run
//! # #[cfg(feature = "sqlite")]
//! use corr_db::*;
//!
//! # #[cfg(feature = "sqlite")]
//! fn main() -> Result<()> {
//!     let mut config = GatherConfig::new("corr.sqlite", "data", "16", "0.0102", "l3248f211b580m002426m06730m8447");
//!     config.src_class_list = vec!["2".into()];
//!     config.sink_class_list = vec!["2".into(), "3".into()];
//!     config.avg_tsrc = true;
//!
//!     for (tag, dataset) in gather_sqlite(&config)? {
//!         println!("{}: {} configurations", tag, dataset.len());
//!     }
//!     Ok(())
//! }
//! # #[cfg(not(feature = "sqlite"))]
//! # fn main() {}
//! ```

// Modules
pub mod error;
pub mod types;
pub mod metadata;
pub mod store;
pub mod reduce;
pub mod correlator;
pub mod aggregate;
pub mod cache;
pub mod config;
pub mod gather;

mod utils;

// Re-export commonly used types at the crate root for convenience
pub use error::{CorrDbError, Result};

// Type exports
pub use types::{
    Block,
    FitKind,
    Measurement,
    ReducedDataset,
    Sample,
};

// Metadata exports
pub use metadata::{
    correlator_keys,
    ConfigurationId,
    DataTag,
    Momentum,
};

// Store exports
pub use store::{
    CorrelatorId,
    Ingest,
    MemoryStore,
    RecordStore,
};

#[cfg(feature = "sqlite")]
pub use store::SqliteStore;

// Reduction exports
pub use reduce::{
    BlockingOptions,
    DuplicateResolver,
    PairDiagnostic,
    PairVerdict,
};

pub use correlator::{BlockedSeries, LatticeCorrelator, RetrievalOptions};
pub use aggregate::{combine, Aggregator};
pub use cache::{CacheKey, CacheReader, CacheWriter};
pub use config::{GatherConfig, OutputFormat};
pub use gather::{dataset_tags, gather_data, gather_dataset};

#[cfg(feature = "sqlite")]
pub use gather::gather_sqlite;

// Prelude module for glob imports
pub mod prelude {
    //! Convenient imports for common use cases.
    //!
    //! ```rust
    //! use corr_db::prelude::*;
    //! ```

    pub use crate::error::{CorrDbError, Result};
    pub use crate::types::{FitKind, Measurement, ReducedDataset};
    pub use crate::metadata::{ConfigurationId, DataTag};
    pub use crate::store::{Ingest, MemoryStore, RecordStore};
    pub use crate::correlator::{LatticeCorrelator, RetrievalOptions};
    pub use crate::reduce::BlockingOptions;
    pub use crate::config::GatherConfig;
    pub use crate::gather::{gather_data, gather_dataset};

    #[cfg(feature = "sqlite")]
    pub use crate::store::SqliteStore;
}

/// The library version
pub const LIBRARY_VERSION: &str = env!("CARGO_PKG_VERSION");
