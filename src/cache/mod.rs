// src/cache/mod.rs
//! Cached reduced datasets.
//!
//! A dataset is cached as two parallel files: a data file with one line per
//! retained configuration and a metadata file with the matching block ids.
//! Both files must have the same number of entries.
//!
//! ```text
//! raw_{datatag}_{fit_kind}_tsrcavg{0|1}_blocking{B}.{gpl|json}
//! meta_{datatag}_{fit_kind}_tsrcavg{0|1}_blocking{B}.{gpl|json}
//! ```

mod reader;
mod writer;

pub use reader::{read_gpl, read_json, CacheReader};
pub use writer::{write_gpl, write_json, CacheWriter};

use crate::config::OutputFormat;
use crate::reduce::BlockingOptions;
use crate::types::FitKind;
use std::path::{Path, PathBuf};

/// Everything that distinguishes one cached dataset from another.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub datatag: String,
    pub fit_kind: FitKind,
    pub avg_tsrc: bool,
    pub blocking: usize,
    pub format: OutputFormat,
}

impl CacheKey {
    pub fn new(datatag: impl Into<String>, fit_kind: FitKind, blocking: BlockingOptions, format: OutputFormat) -> Self {
        CacheKey {
            datatag: datatag.into(),
            fit_kind,
            avg_tsrc: blocking.avg_tsrc,
            blocking: blocking.block_size,
            format,
        }
    }

    fn file_name(&self, prefix: &str) -> String {
        format!(
            "{}_{}_{}_tsrcavg{}_blocking{}.{}",
            prefix,
            self.datatag,
            self.fit_kind,
            u8::from(self.avg_tsrc),
            self.blocking,
            self.format.extension()
        )
    }

    pub fn data_path(&self, dir: impl AsRef<Path>) -> PathBuf {
        dir.as_ref().join(self.file_name("raw"))
    }

    pub fn meta_path(&self, dir: impl AsRef<Path>) -> PathBuf {
        dir.as_ref().join(self.file_name("meta"))
    }

    /// True only when both files of the pair are present.
    pub fn exists(&self, dir: impl AsRef<Path>) -> bool {
        let dir = dir.as_ref();
        self.data_path(dir).is_file() && self.meta_path(dir).is_file()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_names() {
        let key = CacheKey::new("tag", FitKind::Baryon, BlockingOptions::new(4, true), OutputFormat::Gpl);
        assert_eq!(
            key.data_path("/tmp/cache"),
            PathBuf::from("/tmp/cache/raw_tag_baryon_tsrcavg1_blocking4.gpl")
        );
        assert_eq!(
            key.meta_path("/tmp/cache"),
            PathBuf::from("/tmp/cache/meta_tag_baryon_tsrcavg1_blocking4.gpl")
        );
    }

    #[test]
    fn test_keys_differ_by_every_field() {
        use std::collections::HashSet;

        let base = CacheKey::new("tag", FitKind::Baryon, BlockingOptions::default(), OutputFormat::Gpl);
        let keys: HashSet<CacheKey> = [
            base.clone(),
            CacheKey::new("tag", FitKind::Baryon, BlockingOptions::default(), OutputFormat::Json),
            CacheKey::new("tag", FitKind::Baryon, BlockingOptions::new(1, true), OutputFormat::Gpl),
            CacheKey::new("tag", FitKind::Baryon, BlockingOptions::new(2, false), OutputFormat::Gpl),
            CacheKey::new("other", FitKind::Baryon, BlockingOptions::default(), OutputFormat::Gpl),
            base,
        ]
        .into_iter()
        .collect();
        assert_eq!(keys.len(), 5);
    }

    #[test]
    fn test_exists_requires_both_files() {
        let dir = tempfile::tempdir().unwrap();
        let key = CacheKey::new("tag", FitKind::Baryon, BlockingOptions::default(), OutputFormat::Json);
        assert!(!key.exists(dir.path()));

        std::fs::write(key.data_path(dir.path()), "{}").unwrap();
        assert!(!key.exists(dir.path()));

        std::fs::write(key.meta_path(dir.path()), "{}").unwrap();
        assert!(key.exists(dir.path()));
    }
}
