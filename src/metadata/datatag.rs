// src/metadata/datatag.rs
use crate::error::{CorrDbError, Result};
use std::fmt;

const DELIMITER: char = '_';
const FIELD_COUNT: usize = 13;

/// Structured identity of a gathered dataset.
///
/// Encodes to
/// `{src_irrep}_s_{src_class}_{sink_irrep}_s_{sink_class}_p{m0}_p{m1}_p{m2}_m{mass}_m{mass}_m{mass}_{ensemble}`.
/// No field may contain `_`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DataTag {
    pub src_irrep: String,
    pub sink_irrep: String,
    pub src_class: String,
    pub sink_class: String,
    pub mom: [String; 3],
    pub mass: String,
    pub ensemble: String,
}

/// Quark momenta, either one label shared by all three quarks or one each.
#[derive(Debug, Clone)]
pub enum Momentum {
    Shared(String),
    PerQuark([String; 3]),
}

impl From<&str> for Momentum {
    fn from(mom: &str) -> Self {
        Momentum::Shared(mom.to_string())
    }
}

impl From<[&str; 3]> for Momentum {
    fn from(mom: [&str; 3]) -> Self {
        Momentum::PerQuark(mom.map(str::to_string))
    }
}

impl DataTag {
    pub fn new(
        src_irrep: impl Into<String>,
        sink_irrep: impl Into<String>,
        src_class: impl Into<String>,
        sink_class: impl Into<String>,
        mom: impl Into<Momentum>,
        mass: impl Into<String>,
        ensemble: impl Into<String>,
    ) -> Result<Self> {
        let mom = match mom.into() {
            Momentum::Shared(m) => {
                if m.chars().count() != 3 {
                    return Err(CorrDbError::InvalidTag(format!(
                        "shared momentum must have three components, got '{}'",
                        m
                    )));
                }
                [m.clone(), m.clone(), m]
            }
            Momentum::PerQuark(m) => m,
        };

        let tag = DataTag {
            src_irrep: src_irrep.into(),
            sink_irrep: sink_irrep.into(),
            src_class: src_class.into(),
            sink_class: sink_class.into(),
            mom,
            mass: mass.into(),
            ensemble: ensemble.into(),
        };
        tag.validate()?;
        Ok(tag)
    }

    fn validate(&self) -> Result<()> {
        if self.src_irrep != self.sink_irrep {
            return Err(CorrDbError::InvalidTag(format!(
                "source irrep '{}' must equal sink irrep '{}'",
                self.src_irrep, self.sink_irrep
            )));
        }

        let fields = [
            &self.src_irrep,
            &self.sink_irrep,
            &self.src_class,
            &self.sink_class,
            &self.mom[0],
            &self.mom[1],
            &self.mom[2],
            &self.mass,
            &self.ensemble,
        ];
        for field in fields {
            if field.is_empty() || field.contains(DELIMITER) {
                return Err(CorrDbError::InvalidTag(format!(
                    "field '{}' is empty or contains '{}'",
                    field, DELIMITER
                )));
            }
        }

        self.mass_value()?;
        Ok(())
    }

    /// The mass label as a number.
    pub fn mass_value(&self) -> Result<f64> {
        self.mass
            .parse::<f64>()
            .map_err(|_| CorrDbError::InvalidTag(format!("mass '{}' is not a number", self.mass)))
    }

    /// Inverse of the `Display` encoding.
    pub fn parse(datatag: &str) -> Result<Self> {
        let invalid = |reason: &str| CorrDbError::InvalidTag(format!("{}: {}", datatag, reason));

        let parts: Vec<&str> = datatag.split(DELIMITER).collect();
        if parts.len() != FIELD_COUNT {
            return Err(invalid("wrong number of fields"));
        }
        if parts[1] != "s" || parts[4] != "s" {
            return Err(invalid("missing operator separators"));
        }

        let strip = |part: &str, prefix: char| -> Result<String> {
            part.strip_prefix(prefix)
                .map(str::to_string)
                .ok_or_else(|| invalid("missing field prefix"))
        };

        let mom = [strip(parts[6], 'p')?, strip(parts[7], 'p')?, strip(parts[8], 'p')?];
        let masses = [strip(parts[9], 'm')?, strip(parts[10], 'm')?, strip(parts[11], 'm')?];
        if masses[0] != masses[1] || masses[0] != masses[2] {
            return Err(invalid("quark masses differ"));
        }
        let [mass, _, _] = masses;

        let tag = DataTag {
            src_irrep: parts[0].to_string(),
            src_class: parts[2].to_string(),
            sink_irrep: parts[3].to_string(),
            sink_class: parts[5].to_string(),
            mom,
            mass,
            ensemble: parts[12].to_string(),
        };
        tag.validate()?;
        Ok(tag)
    }
}

impl fmt::Display for DataTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}_s_{}_{}_s_{}_p{}_p{}_p{}_m{}_m{}_m{}_{}",
            self.src_irrep,
            self.src_class,
            self.sink_irrep,
            self.sink_class,
            self.mom[0],
            self.mom[1],
            self.mom[2],
            self.mass,
            self.mass,
            self.mass,
            self.ensemble
        )
    }
}
