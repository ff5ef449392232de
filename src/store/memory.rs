// src/store/memory.rs
use crate::error::{CorrDbError, Result};
use crate::store::{prepare_measurement, CorrelatorId, Ingest, RecordStore};
use crate::types::{FitKind, Measurement};

struct CorrelatorEntry {
    name: String,
    rows: Vec<Measurement>,
}

/// In-process store, mainly for tests and for staging data before ingestion.
#[derive(Default)]
pub struct MemoryStore {
    correlators: Vec<CorrelatorEntry>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn row_count(&self) -> usize {
        self.correlators.iter().map(|c| c.rows.len()).sum()
    }
}

impl RecordStore for MemoryStore {
    fn fetch(&self, correlator_name: &str, _fit_kind: FitKind) -> Result<Vec<Measurement>> {
        let matches: Vec<&CorrelatorEntry> = self
            .correlators
            .iter()
            .filter(|c| c.name == correlator_name)
            .collect();

        let entry = match matches.as_slice() {
            [entry] => entry,
            _ => {
                return Err(CorrDbError::NotFound {
                    name: correlator_name.to_string(),
                    matches: matches.len(),
                })
            }
        };

        let mut rows = entry.rows.clone();
        rows.sort_by_key(|m| m.config_id());
        log::debug!("fetched {} rows for {}", rows.len(), correlator_name);
        Ok(rows)
    }

    fn list_correlators(&self) -> Result<Vec<String>> {
        Ok(self.correlators.iter().map(|c| c.name.clone()).collect())
    }
}

impl Ingest for MemoryStore {
    fn insert_correlator(&mut self, name: &str) -> Result<CorrelatorId> {
        self.correlators.push(CorrelatorEntry { name: name.to_string(), rows: Vec::new() });
        Ok(CorrelatorId(self.correlators.len() as i64 - 1))
    }

    fn append_all<I>(&mut self, correlator: CorrelatorId, measurements: I, translate: bool) -> Result<usize>
    where
        I: IntoIterator<Item = Measurement>,
    {
        let entry = usize::try_from(correlator.0)
            .ok()
            .and_then(|idx| self.correlators.get_mut(idx))
            .ok_or_else(|| CorrDbError::NotFound {
                name: format!("#{}", correlator.0),
                matches: 0,
            })?;

        let prepared = measurements
            .into_iter()
            .map(|m| prepare_measurement(m, translate))
            .collect::<Result<Vec<_>>>()?;
        let count = prepared.len();
        entry.rows.extend(prepared);
        Ok(count)
    }
}
