use crate::prelude::{AnalysisError, AnalysisResult};

/// Fill value IBTrACS uses for missing numeric fields.
pub const MISSING_SENTINEL: f64 = -9999.0;

/// Maps a raw dataset value to `None` when it is the fill value or not a number.
pub fn clean(value: f64) -> Option<f64> {
    if value.is_nan() || value == MISSING_SENTINEL {
        None
    } else {
        Some(value)
    }
}

/// Turns per-sample landfall distances into segmenter input.
///
/// The dataset never populates the final sample, so a missing final value
/// carries the second-to-last one forward. Every other missing sample
/// becomes `+inf` and never qualifies.
pub fn resolve_landfall(raw: &[Option<f64>]) -> AnalysisResult<Vec<f64>> {
    if raw.len() < 2 {
        return Err(AnalysisError::TooShort(raw.len()));
    }
    let mut resolved: Vec<f64> = raw.iter().map(|v| v.unwrap_or(f64::INFINITY)).collect();
    let last = raw.len() - 1;
    if raw[last].is_none() {
        resolved[last] = resolved[last - 1];
    }
    Ok(resolved)
}
