// src/types.rs
use crate::error::{CorrDbError, Result};
use crate::metadata::ConfigurationId;
use std::fmt;
use std::str::FromStr;

/// Kind of fit a dataset is gathered for. Selects the correlator naming scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FitKind {
    Baryon,
}

impl FitKind {
    pub fn name(&self) -> &'static str {
        match self {
            FitKind::Baryon => "baryon",
        }
    }
}

impl FromStr for FitKind {
    type Err = CorrDbError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "baryon" => Ok(FitKind::Baryon),
            other => Err(CorrDbError::UnsupportedKind(other.to_string())),
        }
    }
}

impl fmt::Display for FitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One raw correlator sample: `T` values measured on one configuration and time source.
#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    pub series: char,
    pub trajectory: u32,
    pub tsrc: u32,
    pub values: Vec<f64>,
}

impl Measurement {
    pub fn new(series: char, trajectory: u32, tsrc: u32, values: Vec<f64>) -> Self {
        Measurement { series, trajectory, tsrc, values }
    }

    pub fn config_id(&self) -> ConfigurationId {
        ConfigurationId::new(self.series, self.trajectory, self.tsrc)
    }

    /// Number of time slices.
    pub fn nt(&self) -> usize {
        self.values.len()
    }

    /// Checks the ingestion invariants: non-empty, finite, `0 <= tsrc < T`.
    pub fn validate(&self) -> Result<()> {
        if self.values.is_empty() {
            return Err(CorrDbError::InvalidMeasurement(format!(
                "{} has no time slices",
                self.config_id()
            )));
        }
        if self.tsrc as usize >= self.values.len() {
            return Err(CorrDbError::InvalidMeasurement(format!(
                "{}: time source {} outside 0..{}",
                self.config_id(),
                self.tsrc,
                self.values.len()
            )));
        }
        if let Some(t) = self.values.iter().position(|v| !v.is_finite()) {
            return Err(CorrDbError::InvalidMeasurement(format!(
                "{}: non-finite value at time slice {}",
                self.config_id(),
                t
            )));
        }
        Ok(())
    }

    /// Shifts the series so that time slice `tsrc` becomes slice 0.
    pub fn translated(mut self) -> Self {
        let n = self.values.len();
        if n > 0 {
            self.values.rotate_left(self.tsrc as usize % n);
        }
        self
    }
}

/// A configuration id paired with its series, the unit every reduction stage consumes.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub id: ConfigurationId,
    pub values: Vec<f64>,
}

impl From<Measurement> for Sample {
    fn from(m: Measurement) -> Self {
        Sample { id: m.config_id(), values: m.values }
    }
}

/// The average of a run of consecutive samples.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    /// Ids of the consumed samples joined with `+`, in input order.
    pub id: String,
    pub values: Vec<f64>,
}

impl Block {
    pub const ID_SEPARATOR: &'static str = "+";

    /// Number of samples averaged into this block.
    pub fn size(&self) -> usize {
        self.id.split(Self::ID_SEPARATOR).count()
    }
}

/// Final output of a gather: one averaged series per retained configuration group.
#[derive(Debug, Clone, PartialEq)]
pub struct ReducedDataset {
    pub datatag: String,
    pub data: Vec<Vec<f64>>,
    pub config_ids: Vec<String>,
}

impl ReducedDataset {
    pub fn new(datatag: impl Into<String>, data: Vec<Vec<f64>>, config_ids: Vec<String>) -> Result<Self> {
        if data.len() != config_ids.len() {
            return Err(CorrDbError::MetadataLengthMismatch {
                data: data.len(),
                metadata: config_ids.len(),
            });
        }
        Ok(ReducedDataset { datatag: datatag.into(), data, config_ids })
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
