// src/metadata/config_id.rs
use crate::error::{CorrDbError, Result};
use std::fmt;

/// Identifies one measurement: series label, trajectory and time source.
///
/// The string form is `{series}{trajectory:05}_t{tsrc:03}`, e.g. `a00234_t017`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConfigurationId {
    pub series: char,
    pub trajectory: u32,
    pub tsrc: u32,
}

impl ConfigurationId {
    pub fn new(series: char, trajectory: u32, tsrc: u32) -> Self {
        ConfigurationId { series, trajectory, tsrc }
    }

    /// The trajectory label without the time-source suffix (`a00234`).
    pub fn trajectory_label(&self) -> String {
        format!("{}{:05}", self.series, self.trajectory)
    }

    /// Key shared by every time source of the same gauge configuration.
    pub fn trajectory_key(&self) -> (char, u32) {
        (self.series, self.trajectory)
    }

    pub fn from_string(s: &str) -> Result<Self> {
        let invalid = || CorrDbError::InvalidConfigurationId(s.to_string());

        let (label, tsrc) = s.split_once("_t").ok_or_else(invalid)?;
        let mut chars = label.chars();
        let series = chars.next().ok_or_else(invalid)?;
        let trajectory = chars.as_str();

        if trajectory.is_empty() || !trajectory.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        if tsrc.is_empty() || !tsrc.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        Ok(ConfigurationId {
            series,
            trajectory: trajectory.parse().map_err(|_| invalid())?,
            tsrc: tsrc.parse().map_err(|_| invalid())?,
        })
    }
}

impl fmt::Display for ConfigurationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:05}_t{:03}", self.series, self.trajectory, self.tsrc)
    }
}
