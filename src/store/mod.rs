// src/store/mod.rs
//! Persisted measurement rows.
//!
//! A store holds correlators by name, each with an append-only list of
//! [`Measurement`]s. Reads always return measurements ordered by
//! `(series, trajectory, tsrc)`, the order every reduction stage relies on.

mod codec;
mod memory;
#[cfg(feature = "sqlite")]
mod sqlite;

pub use codec::{decode_series, encode_series};
pub use memory::MemoryStore;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStore;

use crate::error::Result;
use crate::types::{FitKind, Measurement};

/// Handle to one correlator entity inside a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CorrelatorId(pub i64);

/// Read side of a measurement store.
pub trait RecordStore {
    /// All measurements of the correlator called `correlator_name`, sorted by
    /// `(series, trajectory, tsrc)`.
    ///
    /// Fails with `NotFound` unless exactly one correlator has that name.
    fn fetch(&self, correlator_name: &str, fit_kind: FitKind) -> Result<Vec<Measurement>>;

    fn list_correlators(&self) -> Result<Vec<String>>;
}

/// Append-only write side of a measurement store.
pub trait Ingest {
    fn insert_correlator(&mut self, name: &str) -> Result<CorrelatorId>;

    /// Appends measurements, rotating each by its time source first when `translate` is set.
    /// Returns how many rows were written.
    fn append_all<I>(&mut self, correlator: CorrelatorId, measurements: I, translate: bool) -> Result<usize>
    where
        I: IntoIterator<Item = Measurement>;

    fn append(&mut self, correlator: CorrelatorId, measurement: Measurement, translate: bool) -> Result<()> {
        self.append_all(correlator, std::iter::once(measurement), translate)?;
        Ok(())
    }
}

impl<S: RecordStore + ?Sized> RecordStore for &S {
    fn fetch(&self, correlator_name: &str, fit_kind: FitKind) -> Result<Vec<Measurement>> {
        (**self).fetch(correlator_name, fit_kind)
    }

    fn list_correlators(&self) -> Result<Vec<String>> {
        (**self).list_correlators()
    }
}

pub(crate) fn prepare_measurement(measurement: Measurement, translate: bool) -> Result<Measurement> {
    measurement.validate()?;
    Ok(if translate { measurement.translated() } else { measurement })
}
