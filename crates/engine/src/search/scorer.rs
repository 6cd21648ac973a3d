//! BM25 scoring parameters and term weights

use serde::{Deserialize, Serialize};

/// BM25 tuning parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bm25Params {
    /// Term frequency saturation
    pub k1: f32,
    /// Document length normalization strength
    pub b: f32,
}

impl Default for Bm25Params {
    fn default() -> Self {
        Bm25Params { k1: 1.2, b: 0.75 }
    }
}

impl Bm25Params {
    /// Create parameters with custom k1 and b
    pub fn new(k1: f32, b: f32) -> Self {
        Bm25Params { k1, b }
    }

    /// Term-frequency component for one (term, document) pair
    ///
    /// `tf * (k1 + 1) / (tf + k1 * (1 - b + b * dl / avgdl))`
    pub fn tf_component(&self, tf: f32, doc_len: f32, avg_doc_len: f32) -> f32 {
        let norm = if avg_doc_len > 0.0 {
            1.0 - self.b + self.b * doc_len / avg_doc_len
        } else {
            1.0
        };
        (tf * (self.k1 + 1.0)) / (tf + self.k1 * norm)
    }
}

/// Smoothed inverse document frequency
///
/// IDF(t) = ln((N - df + 0.5) / (df + 0.5) + 1), always positive.
pub fn idf(total_docs: usize, doc_freq: usize) -> f32 {
    let n = total_docs as f32;
    let df = doc_freq as f32;
    ((n - df + 0.5) / (df + 0.5) + 1.0).ln()
}
