//! Core search types for retrieval
//!
//! This module defines the types exchanged between indices, fusion and the
//! retrieval pipeline:
//! - SearchMode: which retrieval branch(es) to run
//! - ScoredId: one ranked hit (document id + score)
//! - Candidate: a hit tagged with the method that produced it
//! - RetrievalMethod: dense or lexical

use crate::error::Error;
use crate::types::WorkId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// SearchMode
// ============================================================================

/// Search mode - determines the retrieval strategy
///
/// Parsed from configuration or caller strings. Anything other than
/// `vector`, `lexical` or `hybrid` is rejected with
/// [`Error::UnsupportedSearchMode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    /// Dense embedding similarity only
    Vector,
    /// BM25 over title and abstract only
    Lexical,
    /// Weighted fusion of both branches (default)
    #[default]
    Hybrid,
}

impl SearchMode {
    /// Lowercase name, as accepted by `from_str`
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchMode::Vector => "vector",
            SearchMode::Lexical => "lexical",
            SearchMode::Hybrid => "hybrid",
        }
    }
}

impl FromStr for SearchMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "vector" => Ok(SearchMode::Vector),
            "lexical" => Ok(SearchMode::Lexical),
            "hybrid" => Ok(SearchMode::Hybrid),
            _ => Err(Error::UnsupportedSearchMode(s.to_string())),
        }
    }
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// ScoredId
// ============================================================================

/// A ranked hit: document id plus score
///
/// Output unit of every index and of fusion. Lists of ScoredId are
/// ordered descending by score, ties broken by ascending id.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoredId {
    /// Document identifier
    pub id: WorkId,
    /// Score (index-specific scale before normalization)
    pub score: f32,
}

impl ScoredId {
    /// Create a new scored id
    pub fn new(id: WorkId, score: f32) -> Self {
        ScoredId { id, score }
    }
}

/// Sort hits descending by score with ascending id as tiebreak
///
/// NaN scores compare as equal to everything and fall back to the id order.
pub fn sort_by_score_then_id(hits: &mut [ScoredId]) {
    hits.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.id.cmp(&b.id))
    });
}

// ============================================================================
// Candidate
// ============================================================================

/// Which retrieval branch produced a candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RetrievalMethod {
    /// Dense vector similarity
    Vector,
    /// BM25 lexical match
    Lexical,
}

impl fmt::Display for RetrievalMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RetrievalMethod::Vector => f.write_str("vector"),
            RetrievalMethod::Lexical => f.write_str("lexical"),
        }
    }
}

/// A raw hit tagged with its source method
///
/// Internal to fusion; never persisted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    /// Document identifier
    pub id: WorkId,
    /// Raw score from the producing index
    pub score: f32,
    /// Producing method
    pub method: RetrievalMethod,
}

impl Candidate {
    /// Tag every hit of a branch with its method
    pub fn from_hits(hits: &[ScoredId], method: RetrievalMethod) -> Vec<Candidate> {
        hits.iter()
            .map(|h| Candidate {
                id: h.id,
                score: h.score,
                method,
            })
            .collect()
    }
}
