// src/reduce/dedup.rs
use crate::error::{CorrDbError, Result};
use crate::metadata::ConfigurationId;
use crate::types::Sample;
use std::collections::{BTreeMap, HashSet};

/// How two measurements sharing a configuration id compare.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairVerdict {
    /// Equal within tolerance: one copy is kept.
    Duplicate,
    /// Different beyond tolerance: neither copy can be trusted.
    Conflict,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PairDiagnostic {
    pub config_id: ConfigurationId,
    /// Positions in the input list, `first < second`.
    pub first: usize,
    pub second: usize,
    pub mean_rel_diff: f64,
    pub max_rel_diff: f64,
    pub verdict: PairVerdict,
}

/// Result of duplicate resolution over one correlator.
#[derive(Debug, Clone)]
pub struct Resolved {
    /// Retained samples, still in input order. Configuration ids are pairwise distinct.
    pub samples: Vec<Sample>,
    /// Time slices per sample.
    pub nt: usize,
    /// `floor(retained / distinct trajectories)`.
    pub tsrc_count: usize,
    pub diagnostics: Vec<PairDiagnostic>,
}

impl Resolved {
    pub fn discarded_count(&self, input_len: usize) -> usize {
        input_len - self.samples.len()
    }
}

/// Detects repeated measurements of the same configuration id and decides which survive.
///
/// Within each group of samples sharing an id every pair is compared. A pair
/// within tolerance drops its later member, a pair beyond tolerance drops
/// both. A sample survives only if no pair it takes part in drops it.
#[derive(Debug, Clone)]
pub struct DuplicateResolver {
    tolerance: f64,
    verbose: bool,
}

impl Default for DuplicateResolver {
    fn default() -> Self {
        DuplicateResolver { tolerance: Self::DEFAULT_TOLERANCE, verbose: false }
    }
}

impl DuplicateResolver {
    pub const DEFAULT_TOLERANCE: f64 = 1e-4;

    pub fn new(tolerance: f64) -> Self {
        DuplicateResolver { tolerance, verbose: false }
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    pub fn resolve(&self, samples: Vec<Sample>) -> Result<Resolved> {
        let mut groups: BTreeMap<ConfigurationId, Vec<usize>> = BTreeMap::new();
        for (idx, sample) in samples.iter().enumerate() {
            groups.entry(sample.id).or_default().push(idx);
        }

        let mut discard = vec![false; samples.len()];
        let mut diagnostics = Vec::new();

        for (id, members) in groups.iter().filter(|(_, m)| m.len() > 1) {
            for (a, &i) in members.iter().enumerate() {
                for &j in &members[a + 1..] {
                    let diag = self.compare(*id, i, j, &samples[i].values, &samples[j].values);
                    self.report(&diag);
                    match diag.verdict {
                        PairVerdict::Duplicate => discard[j] = true,
                        PairVerdict::Conflict => {
                            discard[i] = true;
                            discard[j] = true;
                        }
                    }
                    diagnostics.push(diag);
                }
            }
        }

        let retained: Vec<Sample> = samples
            .into_iter()
            .zip(discard)
            .filter_map(|(sample, dropped)| (!dropped).then_some(sample))
            .collect();

        let nt = match retained.first() {
            Some(first) => first.values.len(),
            None => {
                return Err(CorrDbError::NoConfigurationsFound(
                    "every measurement was discarded or none were present".into(),
                ))
            }
        };
        if let Some(bad) = retained.iter().find(|s| s.values.len() != nt) {
            return Err(CorrDbError::InconsistentLength {
                config_id: bad.id.to_string(),
                expected: nt,
                found: bad.values.len(),
            });
        }

        let tsrc_count = tsrc_count(&retained);

        Ok(Resolved { samples: retained, nt, tsrc_count, diagnostics })
    }

    fn compare(&self, config_id: ConfigurationId, first: usize, second: usize, a: &[f64], b: &[f64]) -> PairDiagnostic {
        let (mean_rel_diff, max_rel_diff) = if a.len() != b.len() || a.is_empty() {
            (f64::INFINITY, f64::INFINITY)
        } else {
            relative_differences(a, b)
        };

        // NaN never counts as within tolerance.
        let within = mean_rel_diff.abs() <= self.tolerance && max_rel_diff <= self.tolerance;
        PairDiagnostic {
            config_id,
            first,
            second,
            mean_rel_diff,
            max_rel_diff,
            verdict: if within { PairVerdict::Duplicate } else { PairVerdict::Conflict },
        }
    }

    fn report(&self, diag: &PairDiagnostic) {
        let level = if self.verbose { log::Level::Warn } else { log::Level::Debug };
        match diag.verdict {
            PairVerdict::Duplicate => log::log!(
                level,
                "identical data present for {} (entries {} and {}), only one will be retained",
                diag.config_id,
                diag.first,
                diag.second
            ),
            PairVerdict::Conflict => log::log!(
                level,
                "measurements for {} found but NOT identical (entries {} and {}): \
                 max relative diff {:e}, mean relative diff {:e}, tolerance {:e}; configuration discarded",
                diag.config_id,
                diag.first,
                diag.second,
                diag.max_rel_diff,
                diag.mean_rel_diff,
                self.tolerance()
            ),
        }
    }
}

/// Mean of `(a - b) / a` and maximum of `|(a - b) / b|` over the time slices.
pub fn relative_differences(a: &[f64], b: &[f64]) -> (f64, f64) {
    let rel = |x: f64, y: f64, den: f64| if x == y { 0.0 } else { (x - y) / den };

    let mut sum = 0.0;
    let mut max = 0.0f64;
    for (&x, &y) in a.iter().zip(b) {
        let r = rel(x, y, y).abs();
        if r.is_nan() {
            return (f64::NAN, f64::NAN);
        }
        sum += rel(x, y, x);
        max = max.max(r);
    }
    (sum / a.len() as f64, max)
}

/// Time sources per configuration: `floor(samples / distinct trajectories)`.
pub fn tsrc_count(samples: &[Sample]) -> usize {
    let trajectories: HashSet<(char, u32)> = samples.iter().map(|s| s.id.trajectory_key()).collect();
    if trajectories.is_empty() {
        0
    } else {
        samples.len() / trajectories.len()
    }
}
