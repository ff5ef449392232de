// src/metadata/correlator_key.rs
use crate::error::{CorrDbError, Result};
use crate::metadata::DataTag;
use crate::types::FitKind;

const BARYON_PREFIX: &str = "nd_b";
/// Zero-momentum corner-wall source for all three quarks.
const ZERO_MOMENTUM_MIDFIX: &str = "cw0_cw0_cw0_";

/// Irrep that is stored as its two R12 eigen-sectors and gathered together.
pub const SPLIT_IRREP: &str = "16";
const SPLIT_SECTORS: [&str; 2] = ["16p", "16m"];

/// Names of the stored correlators that make up one dataset.
///
/// Most irreps map to a single correlator. The `16` irrep maps to its
/// `16p` and `16m` sectors, which must be averaged by the aggregator.
pub fn correlator_keys(tag: &DataTag, fit_kind: FitKind) -> Result<Vec<String>> {
    match fit_kind {
        FitKind::Baryon => baryon_keys(tag),
    }
}

fn baryon_keys(tag: &DataTag) -> Result<Vec<String>> {
    if tag.src_irrep != tag.sink_irrep {
        return Err(CorrDbError::InvalidTag(format!(
            "source irrep '{}' must equal sink irrep '{}'",
            tag.src_irrep, tag.sink_irrep
        )));
    }
    if SPLIT_SECTORS.contains(&tag.src_irrep.as_str()) {
        return Err(CorrDbError::InvalidTag(format!(
            "irrep '{}' cannot be gathered on its own, use '{}'",
            tag.src_irrep, SPLIT_IRREP
        )));
    }

    let suffix = format!("d_d_d_m{0}_m{0}_m{0}", tag.mass);
    let key = |irrep: &str| {
        format!(
            "{}_{}_s_{}_{}_s_{}_{}{}",
            BARYON_PREFIX, irrep, tag.src_class, irrep, tag.sink_class, ZERO_MOMENTUM_MIDFIX, suffix
        )
    };

    if tag.src_irrep == SPLIT_IRREP {
        Ok(SPLIT_SECTORS.iter().map(|sector| key(sector)).collect())
    } else {
        Ok(vec![key(&tag.src_irrep)])
    }
}
