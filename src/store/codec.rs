// src/store/codec.rs
//! Blob encoding of one measurement's series.
//!
//! The series is written as newline-joined text, one value per line in the
//! shortest representation that round-trips exactly, and the text is
//! zstd-compressed.

use crate::error::{CorrDbError, Result};
use bytes::{BufMut, BytesMut};
use std::fmt::Write;

const COMPRESSION_LEVEL: i32 = 9;

pub fn encode_series(values: &[f64]) -> Result<Vec<u8>> {
    let mut text = BytesMut::with_capacity(values.len() * 24);
    for (i, v) in values.iter().enumerate() {
        if i > 0 {
            text.put_u8(b'\n');
        }
        write!(text, "{:e}", v)
            .map_err(|_| CorrDbError::InvalidSeriesBlob("failed to format value".into()))?;
    }
    Ok(zstd::stream::encode_all(&text[..], COMPRESSION_LEVEL)?)
}

pub fn decode_series(blob: &[u8]) -> Result<Vec<f64>> {
    let raw = zstd::stream::decode_all(blob)?;
    let text = std::str::from_utf8(&raw)
        .map_err(|_| CorrDbError::InvalidSeriesBlob("series text is not UTF-8".into()))?;

    if text.is_empty() {
        return Ok(Vec::new());
    }
    text.split('\n')
        .map(|line| {
            line.trim()
                .parse::<f64>()
                .map_err(|_| CorrDbError::InvalidSeriesBlob(format!("unparsable value '{}'", line)))
        })
        .collect()
}
