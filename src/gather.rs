// src/gather.rs
//! End-to-end gathering of reduced datasets with a file cache in front of
//! the measurement store.

use crate::aggregate::Aggregator;
use crate::cache::{CacheKey, CacheReader, CacheWriter};
use crate::config::GatherConfig;
use crate::error::{CorrDbError, Result};
use crate::metadata::{correlator_keys, DataTag, Momentum};
use crate::store::RecordStore;
use crate::types::{FitKind, ReducedDataset};
use std::collections::BTreeMap;
use std::time::Instant;

/// Returns the reduced dataset for `datatag`, from the cache when possible.
///
/// When both cache files exist and `config.overwrite` is false they are loaded
/// and returned as is; `open_store` is never called. Otherwise the store is
/// opened, every correlator named by the tag is retrieved, blocked and
/// averaged, and the result is written to the cache before being returned.
pub fn gather_data<S, F>(datatag: &DataTag, config: &GatherConfig, open_store: F) -> Result<ReducedDataset>
where
    S: RecordStore,
    F: FnOnce() -> Result<S>,
{
    config.validate()?;
    if let Some(dataset) = load_cached(datatag, config)? {
        return Ok(dataset);
    }
    let store = open_store()?;
    build_and_cache(datatag, config, &store)
}

fn cache_key(datatag: &DataTag, config: &GatherConfig) -> CacheKey {
    CacheKey::new(datatag.to_string(), FitKind::Baryon, config.blocking_options(), config.out_format)
}

fn load_cached(datatag: &DataTag, config: &GatherConfig) -> Result<Option<ReducedDataset>> {
    let key = cache_key(datatag, config);
    if !key.exists(&config.data_dir) {
        return Ok(None);
    }

    let data_path = key.data_path(&config.data_dir);
    if config.overwrite {
        log::warn!("overwriting {}", data_path.display());
        return Ok(None);
    }

    let reader = CacheReader::new(&data_path, key.meta_path(&config.data_dir), config.out_format);
    log::info!("loading cached {} with {}", reader.data_path().display(), reader.meta_path().display());
    let dataset = reader.read()?;
    if dataset.datatag != key.datatag {
        return Err(CorrDbError::CacheFormat(format!(
            "{} holds data for {}",
            reader.data_path().display(),
            dataset.datatag
        )));
    }
    Ok(Some(dataset))
}

fn build_and_cache<S: RecordStore + ?Sized>(datatag: &DataTag, config: &GatherConfig, store: &S) -> Result<ReducedDataset> {
    let start = Instant::now();
    let key = cache_key(datatag, config);
    let names = correlator_keys(datatag, key.fit_kind)?;
    let dataset = Aggregator::new(store, key.fit_kind)
        .with_retrieval(config.retrieval())
        .with_blocking(config.blocking_options())
        .run(&key.datatag, &names)?;

    if dataset.is_empty() {
        return Err(CorrDbError::NoConfigurationsFound(format!("{} produced no blocks", key.datatag)));
    }
    if dataset.data.len() != dataset.config_ids.len() {
        return Err(CorrDbError::MetadataLengthMismatch {
            data: dataset.data.len(),
            metadata: dataset.config_ids.len(),
        });
    }

    let writer = CacheWriter::create(
        key.data_path(&config.data_dir),
        key.meta_path(&config.data_dir),
        config.out_format,
    )?;
    writer.write(&dataset)?;

    log::info!(
        "gathered {} ({} configurations) in {:.2?}",
        key.datatag,
        dataset.len(),
        start.elapsed()
    );
    Ok(dataset)
}

/// The data tags of every `(src_class, sink_class)` pair in the config, at zero momentum.
pub fn dataset_tags(config: &GatherConfig) -> Result<Vec<DataTag>> {
    let mut tags = Vec::with_capacity(config.src_class_list.len() * config.sink_class_list.len());
    for src_class in &config.src_class_list {
        for sink_class in &config.sink_class_list {
            tags.push(DataTag::new(
                config.op_irrep.as_str(),
                config.op_irrep.as_str(),
                src_class.as_str(),
                sink_class.as_str(),
                Momentum::from("000"),
                config.mass.as_str(),
                config.ensemble.as_str(),
            )?);
        }
    }
    Ok(tags)
}

/// Gathers every dataset named by [`dataset_tags`], keyed by the encoded tag.
///
/// The store is opened at most once, on the first cache miss.
pub fn gather_dataset<S, F>(config: &GatherConfig, open_store: F) -> Result<BTreeMap<String, ReducedDataset>>
where
    S: RecordStore,
    F: FnOnce() -> Result<S>,
{
    config.validate()?;
    let mut open_store = Some(open_store);
    let mut store: Option<S> = None;
    let mut datasets = BTreeMap::new();

    for tag in dataset_tags(config)? {
        let dataset = match load_cached(&tag, config)? {
            Some(dataset) => dataset,
            None => {
                if store.is_none() {
                    let open = open_store.take().ok_or_else(store_unavailable)?;
                    store = Some(open()?);
                }
                let store = store.as_ref().ok_or_else(store_unavailable)?;
                build_and_cache(&tag, config, store)?
            }
        };
        datasets.insert(tag.to_string(), dataset);
    }
    Ok(datasets)
}

fn store_unavailable() -> CorrDbError {
    CorrDbError::InvalidConfig("measurement store is not available".into())
}

/// [`gather_dataset`] against the SQLite database named by `config.db_name`.
#[cfg(feature = "sqlite")]
pub fn gather_sqlite(config: &GatherConfig) -> Result<BTreeMap<String, ReducedDataset>> {
    gather_dataset(config, || crate::store::SqliteStore::open_read_only(&config.db_name))
}
