// src/store/sqlite.rs
use crate::error::{CorrDbError, Result};
use crate::store::codec::{decode_series, encode_series};
use crate::store::{prepare_measurement, CorrelatorId, Ingest, RecordStore};
use crate::types::{FitKind, Measurement};
use rusqlite::{params, Connection, OpenFlags};
use std::path::Path;

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS correlators (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL
    );
    CREATE TABLE IF NOT EXISTS data (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        correlator_id INTEGER NOT NULL REFERENCES correlators(id),
        series TEXT NOT NULL,
        trajectory INTEGER NOT NULL,
        tsrc INTEGER NOT NULL,
        data_blob BLOB NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_correlator_name ON correlators(name);
    CREATE INDEX IF NOT EXISTS idx_data_order
        ON data(correlator_id, series, trajectory, tsrc);
";

/// SQLite-backed measurement store.
///
/// Series are stored as zstd-compressed text blobs, see [`encode_series`].
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (creating if needed) a database file and ensure the schema exists.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        conn.execute_batch(SCHEMA)?;
        log::debug!("opened correlator database {}", path.display());
        Ok(SqliteStore { conn })
    }

    /// Open an existing database without write access.
    pub fn open_read_only(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open_with_flags(
            path.as_ref(),
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Ok(SqliteStore { conn })
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(SqliteStore { conn })
    }

    fn correlator_ids(&self, name: &str) -> Result<Vec<i64>> {
        let mut stmt = self.conn.prepare("SELECT id FROM correlators WHERE name = ?1")?;
        let ids = stmt
            .query_map([name], |row| row.get::<_, i64>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(ids)
    }

    fn correlator_exists(&self, correlator: CorrelatorId) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM correlators WHERE id = ?1",
            [correlator.0],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }
}

fn row_to_measurement(series: String, trajectory: i64, tsrc: i64, blob: Vec<u8>) -> Result<Measurement> {
    let mut chars = series.chars();
    let label = match (chars.next(), chars.next()) {
        (Some(c), None) => c,
        _ => {
            return Err(CorrDbError::InvalidMeasurement(format!(
                "series label '{}' is not a single character",
                series
            )))
        }
    };
    let trajectory = u32::try_from(trajectory)
        .map_err(|_| CorrDbError::InvalidMeasurement(format!("trajectory {} out of range", trajectory)))?;
    let tsrc = u32::try_from(tsrc)
        .map_err(|_| CorrDbError::InvalidMeasurement(format!("time source {} out of range", tsrc)))?;

    Ok(Measurement::new(label, trajectory, tsrc, decode_series(&blob)?))
}

impl RecordStore for SqliteStore {
    fn fetch(&self, correlator_name: &str, fit_kind: FitKind) -> Result<Vec<Measurement>> {
        let ids = self.correlator_ids(correlator_name)?;
        let correlator_id = match ids.as_slice() {
            [id] => *id,
            _ => {
                return Err(CorrDbError::NotFound {
                    name: correlator_name.to_string(),
                    matches: ids.len(),
                })
            }
        };

        let query = match fit_kind {
            FitKind::Baryon => {
                "SELECT series, trajectory, tsrc, data_blob FROM data
                 WHERE correlator_id = ?1
                 ORDER BY series, trajectory, tsrc"
            }
        };

        let mut stmt = self.conn.prepare(query)?;
        let rows = stmt
            .query_map([correlator_id], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, i64>(2)?,
                    row.get::<_, Vec<u8>>(3)?,
                ))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let measurements = rows
            .into_iter()
            .map(|(series, trajectory, tsrc, blob)| row_to_measurement(series, trajectory, tsrc, blob))
            .collect::<Result<Vec<_>>>()?;

        log::debug!("fetched {} rows for {}", measurements.len(), correlator_name);
        Ok(measurements)
    }

    fn list_correlators(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare("SELECT name FROM correlators ORDER BY id")?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(names)
    }
}

impl Ingest for SqliteStore {
    fn insert_correlator(&mut self, name: &str) -> Result<CorrelatorId> {
        self.conn.execute("INSERT INTO correlators (name) VALUES (?1)", [name])?;
        Ok(CorrelatorId(self.conn.last_insert_rowid()))
    }

    fn append_all<I>(&mut self, correlator: CorrelatorId, measurements: I, translate: bool) -> Result<usize>
    where
        I: IntoIterator<Item = Measurement>,
    {
        if !self.correlator_exists(correlator)? {
            return Err(CorrDbError::NotFound {
                name: format!("#{}", correlator.0),
                matches: 0,
            });
        }

        let tx = self.conn.transaction()?;
        let mut count = 0usize;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO data (correlator_id, series, trajectory, tsrc, data_blob)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for measurement in measurements {
                let m = prepare_measurement(measurement, translate)?;
                let blob = encode_series(&m.values)?;
                stmt.execute(params![
                    correlator.0,
                    m.series.to_string(),
                    m.trajectory as i64,
                    m.tsrc as i64,
                    blob,
                ])?;
                count += 1;
            }
        }
        tx.commit()?;

        log::debug!("appended {} rows to correlator #{}", count, correlator.0);
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip_through_sqlite() {
        let mut store = SqliteStore::in_memory().unwrap();
        let id = store.insert_correlator("corr").unwrap();
        store
            .append_all(
                id,
                vec![
                    Measurement::new('a', 12, 0, vec![1.0, 0.5]),
                    Measurement::new('a', 10, 1, vec![2.0, 0.25]),
                ],
                false,
            )
            .unwrap();

        let rows = store.fetch("corr", FitKind::Baryon).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], Measurement::new('a', 10, 1, vec![2.0, 0.25]));
        assert_eq!(rows[1], Measurement::new('a', 12, 0, vec![1.0, 0.5]));
    }

    #[test]
    fn test_failed_batch_is_rolled_back() {
        let mut store = SqliteStore::in_memory().unwrap();
        let id = store.insert_correlator("corr").unwrap();
        let result = store.append_all(
            id,
            vec![
                Measurement::new('a', 1, 0, vec![1.0]),
                Measurement::new('a', 2, 3, vec![1.0]),
            ],
            false,
        );
        assert!(result.is_err());
        assert!(store.fetch("corr", FitKind::Baryon).unwrap().is_empty());
    }

    #[test]
    fn test_unknown_correlator_id() {
        let mut store = SqliteStore::in_memory().unwrap();
        let err = store
            .append(CorrelatorId(42), Measurement::new('a', 1, 0, vec![1.0]), false)
            .unwrap_err();
        assert!(matches!(err, CorrDbError::NotFound { .. }));
    }
}
