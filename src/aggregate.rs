// src/aggregate.rs
use crate::correlator::{BlockedSeries, LatticeCorrelator, RetrievalOptions};
use crate::error::{CorrDbError, Result};
use crate::reduce::BlockingOptions;
use crate::store::RecordStore;
use crate::types::{FitKind, ReducedDataset};
use crate::utils::mean_series;

/// Retrieves and blocks several correlators measured on the same gauge
/// configurations and averages them into one dataset.
pub struct Aggregator<'s, S: RecordStore + ?Sized> {
    store: &'s S,
    fit_kind: FitKind,
    retrieval: RetrievalOptions,
    blocking: BlockingOptions,
}

impl<'s, S: RecordStore + ?Sized> Aggregator<'s, S> {
    pub fn new(store: &'s S, fit_kind: FitKind) -> Self {
        Aggregator {
            store,
            fit_kind,
            retrieval: RetrievalOptions::default(),
            blocking: BlockingOptions::default(),
        }
    }

    pub fn with_retrieval(mut self, retrieval: RetrievalOptions) -> Self {
        self.retrieval = retrieval;
        self
    }

    pub fn with_blocking(mut self, blocking: BlockingOptions) -> Self {
        self.blocking = blocking;
        self
    }

    /// Runs retrieval and blocking for every name, then [`combine`]s the results.
    pub fn run(&self, datatag: &str, names: &[String]) -> Result<ReducedDataset> {
        let mut blocked = Vec::with_capacity(names.len());
        for name in names {
            let correlator = LatticeCorrelator::fetch(self.store, name, self.fit_kind, &self.retrieval)?;
            let series = correlator.block(self.blocking)?;
            log::info!("{}: {} blocks from {} measurements", name, series.len(), correlator.nconf());
            blocked.push(series);
        }
        combine(datatag, &blocked)
    }
}

/// Averages blocked correlators index by index.
///
/// Every input must carry the same block ids in the same order; averaging
/// correlators from different configurations is rejected.
pub fn combine(datatag: &str, blocked: &[BlockedSeries]) -> Result<ReducedDataset> {
    let (reference, rest) = blocked
        .split_first()
        .ok_or_else(|| CorrDbError::NoConfigurationsFound(format!("no correlators given for {}", datatag)))?;

    let reference_ids = reference.config_ids();
    for other in rest {
        if other.config_ids() != reference_ids {
            return Err(CorrDbError::ConfigurationMismatch {
                reference: reference.correlator.clone(),
                other: other.correlator.clone(),
            });
        }
    }

    let data: Vec<Vec<f64>> = (0..reference.len())
        .map(|idx| {
            let nt = reference.blocks[idx].values.len();
            mean_series(blocked.iter().map(|series| series.blocks[idx].values.as_slice()), nt)
        })
        .collect();

    ReducedDataset::new(datatag, data, reference_ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Block;

    fn series(name: &str, blocks: &[(&str, f64)]) -> BlockedSeries {
        BlockedSeries {
            correlator: name.to_string(),
            options: BlockingOptions::default(),
            blocks: blocks
                .iter()
                .map(|(id, v)| Block { id: id.to_string(), values: vec![*v, 2.0 * v] })
                .collect(),
        }
    }

    #[test]
    fn test_combine_averages_across_correlators() {
        let plus = series("16p", &[("a00100_t000", 1.0), ("a00101_t000", 3.0)]);
        let minus = series("16m", &[("a00100_t000", 3.0), ("a00101_t000", 5.0)]);
        let dataset = combine("tag", &[plus, minus]).unwrap();
        assert_eq!(dataset.data, vec![vec![2.0, 4.0], vec![4.0, 8.0]]);
        assert_eq!(dataset.config_ids, vec!["a00100_t000", "a00101_t000"]);
    }

    #[test]
    fn test_combine_rejects_different_configurations() {
        let plus = series("16p", &[("a00100_t000", 1.0), ("a00101_t000", 3.0)]);
        let minus = series("16m", &[("a00100_t000", 3.0), ("a00102_t000", 5.0)]);
        let err = combine("tag", &[plus, minus]).unwrap_err();
        assert!(matches!(err, CorrDbError::ConfigurationMismatch { ref reference, ref other }
            if reference == "16p" && other == "16m"));
    }

    #[test]
    fn test_combine_rejects_reordered_configurations() {
        let plus = series("16p", &[("a00100_t000", 1.0), ("a00101_t000", 3.0)]);
        let minus = series("16m", &[("a00101_t000", 3.0), ("a00100_t000", 5.0)]);
        assert!(combine("tag", &[plus, minus]).is_err());
    }

    #[test]
    fn test_combine_single_correlator_is_passthrough() {
        let only = series("8p", &[("a00100_t000", 1.0)]);
        let dataset = combine("tag", &[only]).unwrap();
        assert_eq!(dataset.data, vec![vec![1.0, 2.0]]);
    }

    #[test]
    fn test_combine_requires_input() {
        assert!(matches!(combine("tag", &[]), Err(CorrDbError::NoConfigurationsFound(_))));
    }
}
