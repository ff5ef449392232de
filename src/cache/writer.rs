// src/cache/writer.rs
use crate::config::OutputFormat;
use crate::error::Result;
use crate::types::ReducedDataset;
use crate::utils::format_sci;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Writes one dataset to a data/metadata file pair.
///
/// Both files are written under temporary names and renamed into place only
/// after both were flushed, so a failed write never leaves a half pair behind.
pub struct CacheWriter {
    data_path: PathBuf,
    meta_path: PathBuf,
    format: OutputFormat,
}

impl CacheWriter {
    /// Prepares a writer for the pair. Missing parent directories are created.
    pub fn create(data_path: impl Into<PathBuf>, meta_path: impl Into<PathBuf>, format: OutputFormat) -> Result<Self> {
        let data_path = data_path.into();
        let meta_path = meta_path.into();
        for path in [&data_path, &meta_path] {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Ok(CacheWriter { data_path, meta_path, format })
    }

    pub fn write(&self, dataset: &ReducedDataset) -> Result<()> {
        let data_tmp = temporary_path(&self.data_path);
        let meta_tmp = temporary_path(&self.meta_path);

        let result = self
            .write_temporaries(dataset, &data_tmp, &meta_tmp)
            .and_then(|()| self.commit(&data_tmp, &meta_tmp));
        if result.is_err() {
            std::fs::remove_file(&data_tmp).ok();
            std::fs::remove_file(&meta_tmp).ok();
        }
        result
    }

    fn write_temporaries(&self, dataset: &ReducedDataset, data_tmp: &Path, meta_tmp: &Path) -> Result<()> {
        let mut data_file = BufWriter::new(File::create(data_tmp)?);
        let mut meta_file = BufWriter::new(File::create(meta_tmp)?);
        match self.format {
            OutputFormat::Gpl => write_gpl(dataset, &mut data_file, &mut meta_file)?,
            OutputFormat::Json => write_json(dataset, &mut data_file, &mut meta_file)?,
        }
        for file in [data_file, meta_file] {
            file.into_inner().map_err(|e| e.into_error())?.sync_all()?;
        }
        Ok(())
    }

    /// Metadata goes first; a lone metadata file is never taken for a cache hit.
    fn commit(&self, data_tmp: &Path, meta_tmp: &Path) -> Result<()> {
        std::fs::rename(meta_tmp, &self.meta_path)?;
        if let Err(e) = std::fs::rename(data_tmp, &self.data_path) {
            std::fs::remove_file(&self.meta_path).ok();
            return Err(e.into());
        }
        Ok(())
    }
}

fn temporary_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

/// Data lines are `{datatag} v1 ... vT` in `%.15e`, metadata lines are block ids.
pub fn write_gpl<W: Write, M: Write>(dataset: &ReducedDataset, data: &mut W, meta: &mut M) -> Result<()> {
    for row in &dataset.data {
        data.write_all(dataset.datatag.as_bytes())?;
        for v in row {
            write!(data, " {}", format_sci(*v))?;
        }
        data.write_all(b"\n")?;
    }
    for id in &dataset.config_ids {
        writeln!(meta, "{}", id)?;
    }
    Ok(())
}

/// Writes `{datatag: [[...]]}` and `{datatag: [ids]}`.
pub fn write_json<W: Write, M: Write>(dataset: &ReducedDataset, data: &mut W, meta: &mut M) -> Result<()> {
    let data_map: BTreeMap<&str, &Vec<Vec<f64>>> = BTreeMap::from([(dataset.datatag.as_str(), &dataset.data)]);
    let meta_map: BTreeMap<&str, &Vec<String>> = BTreeMap::from([(dataset.datatag.as_str(), &dataset.config_ids)]);
    serde_json::to_writer(&mut *data, &data_map)?;
    serde_json::to_writer(&mut *meta, &meta_map)?;
    Ok(())
}
