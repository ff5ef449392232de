// src/metadata/mod.rs
mod config_id;
mod datatag;
mod correlator_key;

pub use config_id::ConfigurationId;
pub use datatag::{DataTag, Momentum};
pub use correlator_key::{correlator_keys, SPLIT_IRREP};
