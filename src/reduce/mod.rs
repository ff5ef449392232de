// src/reduce/mod.rs
//! Reduction of raw measurements into a clean dataset.
//!
//! - [`DuplicateResolver`] removes repeated or conflicting measurements of one configuration
//! - [`block_samples`] averages consecutive measurements into [`Block`](crate::types::Block)s

mod dedup;
mod blocking;

pub use dedup::{relative_differences, tsrc_count, DuplicateResolver, PairDiagnostic, PairVerdict, Resolved};
pub use blocking::{block_samples, BlockState, BlockingOptions};
