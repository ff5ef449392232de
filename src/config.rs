// src/config.rs
use crate::correlator::RetrievalOptions;
use crate::error::{CorrDbError, Result};
use crate::reduce::{BlockingOptions, DuplicateResolver};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// On-disk format of cached datasets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Whitespace separated text, one configuration per line.
    #[default]
    Gpl,
    Json,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Gpl => "gpl",
            OutputFormat::Json => "json",
        }
    }
}

/// Parameters of a gather run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatherConfig {
    pub db_name: PathBuf,
    pub data_dir: PathBuf,
    #[serde(default)]
    pub avg_tsrc: bool,
    #[serde(default = "default_blocking")]
    pub blocking: usize,
    #[serde(default)]
    pub overwrite: bool,
    pub op_irrep: String,
    #[serde(default)]
    pub src_class_list: Vec<String>,
    #[serde(default)]
    pub sink_class_list: Vec<String>,
    pub mass: String,
    pub ensemble: String,
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
    #[serde(default = "default_verbose")]
    pub verbose: bool,
    #[serde(default)]
    pub out_format: OutputFormat,
}

fn default_blocking() -> usize {
    1
}

fn default_tolerance() -> f64 {
    DuplicateResolver::DEFAULT_TOLERANCE
}

fn default_verbose() -> bool {
    true
}

impl GatherConfig {
    pub fn new(
        db_name: impl Into<PathBuf>,
        data_dir: impl Into<PathBuf>,
        op_irrep: impl Into<String>,
        mass: impl Into<String>,
        ensemble: impl Into<String>,
    ) -> Self {
        GatherConfig {
            db_name: db_name.into(),
            data_dir: data_dir.into(),
            avg_tsrc: false,
            blocking: default_blocking(),
            overwrite: false,
            op_irrep: op_irrep.into(),
            src_class_list: Vec::new(),
            sink_class_list: Vec::new(),
            mass: mass.into(),
            ensemble: ensemble.into(),
            tolerance: default_tolerance(),
            verbose: default_verbose(),
            out_format: OutputFormat::default(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.blocking == 0 {
            return Err(CorrDbError::InvalidConfig("blocking must be at least 1".into()));
        }
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(CorrDbError::InvalidConfig(format!(
                "tolerance must be a positive number, got {}",
                self.tolerance
            )));
        }
        for (field, value) in [("op_irrep", &self.op_irrep), ("mass", &self.mass), ("ensemble", &self.ensemble)] {
            if value.is_empty() {
                return Err(CorrDbError::InvalidConfig(format!("{} must not be empty", field)));
            }
        }
        Ok(())
    }

    pub fn retrieval(&self) -> RetrievalOptions {
        RetrievalOptions { tolerance: self.tolerance, verbose: self.verbose }
    }

    pub fn blocking_options(&self) -> BlockingOptions {
        BlockingOptions::new(self.blocking, self.avg_tsrc)
    }
}
