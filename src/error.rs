// src/error.rs
use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CorrDbError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[cfg(feature = "sqlite")]
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Correlator not found: '{name}' matched {matches} entries")]
    NotFound { name: String, matches: usize },

    #[error("Unsupported fit kind: {0}")]
    UnsupportedKind(String),

    #[error("Inconsistent series length for {config_id}: expected {expected}, found {found}")]
    InconsistentLength { config_id: String, expected: usize, found: usize },

    #[error("Identical series inside one block: {first} and {second}")]
    DuplicateInBlock { first: String, second: String },

    #[error("Correlators {reference} and {other} were measured on different configurations")]
    ConfigurationMismatch { reference: String, other: String },

    #[error("Metadata length mismatch: {data} data entries, {metadata} metadata entries")]
    MetadataLengthMismatch { data: usize, metadata: usize },

    #[error("No configurations found: {0}")]
    NoConfigurationsFound(String),

    #[error("Invalid data tag: {0}")]
    InvalidTag(String),

    #[error("Invalid configuration id: {0}")]
    InvalidConfigurationId(String),

    #[error("Invalid measurement: {0}")]
    InvalidMeasurement(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Malformed cache file: {0}")]
    CacheFormat(String),

    #[error("Malformed series blob: {0}")]
    InvalidSeriesBlob(String),
}

pub type Result<T> = std::result::Result<T, CorrDbError>;
