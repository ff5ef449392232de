// src/cache/reader.rs
use crate::config::OutputFormat;
use crate::error::{CorrDbError, Result};
use crate::types::ReducedDataset;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};

/// Loads a dataset previously written by [`CacheWriter`](super::CacheWriter).
pub struct CacheReader {
    data_path: PathBuf,
    meta_path: PathBuf,
    format: OutputFormat,
}

impl CacheReader {
    pub fn new(data_path: impl Into<PathBuf>, meta_path: impl Into<PathBuf>, format: OutputFormat) -> Self {
        CacheReader { data_path: data_path.into(), meta_path: meta_path.into(), format }
    }

    pub fn data_path(&self) -> &Path {
        &self.data_path
    }

    pub fn meta_path(&self) -> &Path {
        &self.meta_path
    }

    pub fn read(&self) -> Result<ReducedDataset> {
        let data = BufReader::new(File::open(&self.data_path)?);
        let meta = BufReader::new(File::open(&self.meta_path)?);
        match self.format {
            OutputFormat::Gpl => read_gpl(data, meta),
            OutputFormat::Json => read_json(data, meta),
        }
    }
}

pub fn read_gpl<D: BufRead, M: BufRead>(data: D, meta: M) -> Result<ReducedDataset> {
    let mut datatag: Option<String> = None;
    let mut rows = Vec::new();

    for (lineno, line) in data.lines().enumerate() {
        let line = line?;
        let mut fields = line.split_whitespace();
        let tag = fields
            .next()
            .ok_or_else(|| CorrDbError::CacheFormat(format!("line {}: empty data line", lineno + 1)))?;
        match &datatag {
            None => datatag = Some(tag.to_string()),
            Some(expected) if expected != tag => {
                return Err(CorrDbError::CacheFormat(format!(
                    "line {}: data tag {} differs from {}",
                    lineno + 1,
                    tag,
                    expected
                )))
            }
            Some(_) => {}
        }

        let row = fields
            .map(|field| {
                field.parse::<f64>().map_err(|_| {
                    CorrDbError::CacheFormat(format!("line {}: '{}' is not a number", lineno + 1, field))
                })
            })
            .collect::<Result<Vec<f64>>>()?;
        rows.push(row);
    }

    let mut config_ids = Vec::new();
    for (lineno, line) in meta.lines().enumerate() {
        let line = line?;
        let id = line.trim();
        if id.is_empty() {
            return Err(CorrDbError::CacheFormat(format!("metadata line {}: empty id", lineno + 1)));
        }
        config_ids.push(id.to_string());
    }

    let datatag = datatag.ok_or_else(|| CorrDbError::CacheFormat("data file holds no entries".into()))?;
    check_row_lengths(&rows)?;
    ReducedDataset::new(datatag, rows, config_ids)
}

/// Every row must be non-empty and as long as the first.
fn check_row_lengths(rows: &[Vec<f64>]) -> Result<()> {
    let nt = rows.first().map_or(0, Vec::len);
    if nt == 0 {
        return Err(CorrDbError::CacheFormat("cached rows hold no time slices".into()));
    }
    match rows.iter().position(|row| row.len() != nt) {
        Some(idx) => Err(CorrDbError::CacheFormat(format!(
            "row {} has {} time slices, expected {}",
            idx + 1,
            rows[idx].len(),
            nt
        ))),
        None => Ok(()),
    }
}

pub fn read_json<D: Read, M: Read>(data: D, meta: M) -> Result<ReducedDataset> {
    let data: BTreeMap<String, Vec<Vec<f64>>> = serde_json::from_reader(data)?;
    let meta: BTreeMap<String, Vec<String>> = serde_json::from_reader(meta)?;

    let (datatag, rows) = single_entry(data, "data")?;
    let (meta_tag, config_ids) = single_entry(meta, "metadata")?;
    if meta_tag != datatag {
        return Err(CorrDbError::CacheFormat(format!(
            "metadata is for {} but data is for {}",
            meta_tag, datatag
        )));
    }
    check_row_lengths(&rows)?;
    ReducedDataset::new(datatag, rows, config_ids)
}

fn single_entry<V>(map: BTreeMap<String, V>, what: &str) -> Result<(String, V)> {
    if map.len() != 1 {
        return Err(CorrDbError::CacheFormat(format!(
            "{} file holds {} data tags, expected 1",
            what,
            map.len()
        )));
    }
    map.into_iter()
        .next()
        .ok_or_else(|| CorrDbError::CacheFormat(format!("{} file is empty", what)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_read_gpl() {
        let data = "tag 1.500000000000000e+00 -2.0e-10\ntag 3.5 0\n";
        let meta = "a00100_t000\na00101_t000\n";
        let dataset = read_gpl(Cursor::new(data), Cursor::new(meta)).unwrap();
        assert_eq!(dataset.datatag, "tag");
        assert_eq!(dataset.data, vec![vec![1.5, -2.0e-10], vec![3.5, 0.0]]);
        assert_eq!(dataset.config_ids, vec!["a00100_t000", "a00101_t000"]);
    }

    #[test]
    fn test_read_gpl_length_mismatch() {
        let data = "tag 1.0\ntag 2.0\n";
        let meta = "a00100_t000\n";
        let err = read_gpl(Cursor::new(data), Cursor::new(meta)).unwrap_err();
        assert!(matches!(err, CorrDbError::MetadataLengthMismatch { data: 2, metadata: 1 }));
    }

    #[test]
    fn test_read_gpl_rejects_mixed_tags() {
        let data = "tag 1.0\nother 2.0\n";
        let meta = "x\ny\n";
        assert!(matches!(
            read_gpl(Cursor::new(data), Cursor::new(meta)),
            Err(CorrDbError::CacheFormat(_))
        ));
    }

    #[test]
    fn test_read_gpl_rejects_bad_number() {
        let data = "tag 1.0 one\n";
        let meta = "x\n";
        assert!(matches!(
            read_gpl(Cursor::new(data), Cursor::new(meta)),
            Err(CorrDbError::CacheFormat(_))
        ));
    }

    #[test]
    fn test_read_gpl_rejects_blank_lines() {
        let data = "tag 1.0\n\ntag 2.0\n";
        let meta = "x\ny\n";
        assert!(matches!(
            read_gpl(Cursor::new(data), Cursor::new(meta)),
            Err(CorrDbError::CacheFormat(_))
        ));

        let data = "tag 1.0\ntag 2.0\n";
        let meta = "x\n\ny\n";
        assert!(matches!(
            read_gpl(Cursor::new(data), Cursor::new(meta)),
            Err(CorrDbError::CacheFormat(_))
        ));
    }

    #[test]
    fn test_read_rejects_ragged_rows() {
        let data = "tag 1.0 2.0\ntag 3.0\n";
        let meta = "x\ny\n";
        assert!(matches!(
            read_gpl(Cursor::new(data), Cursor::new(meta)),
            Err(CorrDbError::CacheFormat(_))
        ));

        let data = r#"{"tag":[[1.0,2.0],[3.0]]}"#;
        let meta = r#"{"tag":["x","y"]}"#;
        assert!(matches!(
            read_json(Cursor::new(data), Cursor::new(meta)),
            Err(CorrDbError::CacheFormat(_))
        ));
    }

    #[test]
    fn test_read_json() {
        let data = r#"{"tag":[[1.0,2.0]]}"#;
        let meta = r#"{"tag":["a00100_t000"]}"#;
        let dataset = read_json(Cursor::new(data), Cursor::new(meta)).unwrap();
        assert_eq!(dataset.data, vec![vec![1.0, 2.0]]);

        let meta = r#"{"other":["a00100_t000"]}"#;
        assert!(read_json(Cursor::new(data), Cursor::new(meta)).is_err());
    }
}
