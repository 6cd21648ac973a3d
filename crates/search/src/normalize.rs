//! Min-max score normalization
//!
//! Raw scores from different indices live on different scales (cosine in
//! [-1, 1], BM25 unbounded). Each branch is rescaled to [0, 1] before
//! fusion.

use litrank_core::{Error, Result, ScoredId};

/// Rescale `scores` to [0, 1] by min-max
///
/// If every score is equal (including a single score) the result is all
/// zeros: there is no spread to rank by.
///
/// # Errors
/// - `Error::EmptyScores` for an empty slice
/// - `Error::InvalidInput` if any score is NaN or infinite
pub fn normalize(scores: &[f32]) -> Result<Vec<f32>> {
    if scores.is_empty() {
        return Err(Error::EmptyScores);
    }
    if let Some(bad) = scores.iter().find(|s| !s.is_finite()) {
        return Err(Error::invalid_input(format!(
            "cannot normalize non-finite score {}",
            bad
        )));
    }

    let min = scores.iter().copied().fold(f32::INFINITY, f32::min);
    let max = scores.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    if min == max {
        return Ok(vec![0.0; scores.len()]);
    }
    let range = max - min;
    // clamp guards against rounding just outside [0, 1]
    Ok(scores
        .iter()
        .map(|s| ((s - min) / range).clamp(0.0, 1.0))
        .collect())
}

/// Normalize the scores of a hit list, keeping ids and order
pub fn normalize_hits(hits: &[ScoredId]) -> Result<Vec<ScoredId>> {
    let scores: Vec<f32> = hits.iter().map(|h| h.score).collect();
    let normalized = normalize(&scores)?;
    Ok(hits
        .iter()
        .zip(normalized)
        .map(|(h, s)| ScoredId::new(h.id, s))
        .collect())
}
