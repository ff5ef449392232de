// src/correlator.rs
use crate::error::Result;
use crate::metadata::ConfigurationId;
use crate::reduce::{block_samples, BlockingOptions, DuplicateResolver, PairDiagnostic};
use crate::store::RecordStore;
use crate::types::{Block, FitKind, Measurement, Sample};

/// Per-retrieval knobs of the duplicate resolver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetrievalOptions {
    pub tolerance: f64,
    pub verbose: bool,
}

impl Default for RetrievalOptions {
    fn default() -> Self {
        RetrievalOptions { tolerance: DuplicateResolver::DEFAULT_TOLERANCE, verbose: true }
    }
}

/// One correlator's measurements after retrieval and duplicate resolution.
///
/// Construction runs the store query and the duplicate resolver; the
/// retained samples are never modified afterwards. [`block`](Self::block)
/// can be called repeatedly with different options.
#[derive(Debug, Clone)]
pub struct LatticeCorrelator {
    name: String,
    fit_kind: FitKind,
    samples: Vec<Sample>,
    nt: usize,
    tsrc_count: usize,
    diagnostics: Vec<PairDiagnostic>,
}

impl LatticeCorrelator {
    pub fn fetch<S: RecordStore + ?Sized>(
        store: &S,
        name: &str,
        fit_kind: FitKind,
        options: &RetrievalOptions,
    ) -> Result<Self> {
        let measurements = store.fetch(name, fit_kind)?;
        Self::from_measurements(name, fit_kind, measurements, options)
    }

    /// Builds from measurements already sorted by `(series, trajectory, tsrc)`.
    pub fn from_measurements(
        name: impl Into<String>,
        fit_kind: FitKind,
        measurements: Vec<Measurement>,
        options: &RetrievalOptions,
    ) -> Result<Self> {
        let name = name.into();
        let fetched = measurements.len();
        let samples: Vec<Sample> = measurements.into_iter().map(Sample::from).collect();

        let resolved = DuplicateResolver::new(options.tolerance)
            .verbose(options.verbose)
            .resolve(samples)?;

        log::debug!(
            "{}: {} measurements, {} discarded, {} time sources per configuration",
            name,
            fetched,
            resolved.discarded_count(fetched),
            resolved.tsrc_count
        );

        Ok(LatticeCorrelator {
            name,
            fit_kind,
            nt: resolved.nt,
            tsrc_count: resolved.tsrc_count,
            samples: resolved.samples,
            diagnostics: resolved.diagnostics,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fit_kind(&self) -> FitKind {
        self.fit_kind
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn raw_config_ids(&self) -> Vec<ConfigurationId> {
        self.samples.iter().map(|s| s.id).collect()
    }

    pub fn raw_data(&self) -> Vec<&[f64]> {
        self.samples.iter().map(|s| s.values.as_slice()).collect()
    }

    /// Time slices per measurement.
    pub fn nt(&self) -> usize {
        self.nt
    }

    pub fn tsrc_count(&self) -> usize {
        self.tsrc_count
    }

    /// Number of retained measurements.
    pub fn nconf(&self) -> usize {
        self.samples.len()
    }

    pub fn diagnostics(&self) -> &[PairDiagnostic] {
        &self.diagnostics
    }

    pub fn block(&self, options: BlockingOptions) -> Result<BlockedSeries> {
        let group_size = options.group_size(self.tsrc_count)?;
        let blocks = block_samples(&self.samples, self.tsrc_count, group_size)?;
        Ok(BlockedSeries { correlator: self.name.clone(), options, blocks })
    }
}

/// Blocks produced for one correlator.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockedSeries {
    pub correlator: String,
    pub options: BlockingOptions,
    pub blocks: Vec<Block>,
}

impl BlockedSeries {
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn config_ids(&self) -> Vec<String> {
        self.blocks.iter().map(|b| b.id.clone()).collect()
    }

    pub fn data(&self) -> Vec<Vec<f64>> {
        self.blocks.iter().map(|b| b.values.clone()).collect()
    }
}
