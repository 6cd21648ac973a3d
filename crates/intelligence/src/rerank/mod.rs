//! Setwise re-ranking of retrieved works
//!
//! This module provides post-retrieval re-ranking: after hybrid search and
//! hydration produce a candidate pool, a comparison oracle repeatedly picks
//! the most relevant of a small set of abstracts, and a heap built from
//! those comparisons yields the top-k.
//!
//! # Architecture
//!
//! ```text
//! HybridSearch → hydrate rerank_factor × n works
//!     → RerankCandidate { id, abstract }
//!     → SetwiseReranker (c-ary heap, c = children per node)
//!         → ComparisonOracle::compare(query, parent + children)
//!     → top-n WorkIds
//! ```
//!
//! The oracle returns candidate identities, never text, so results always
//! map back to the hydrated records.

pub mod api;
pub mod prompt;
pub mod setwise;

pub use api::ApiComparisonOracle;
pub use setwise::SetwiseReranker;

use litrank_core::{Error, Result, Work, WorkId};

/// A candidate handed to the reranker: a work id and the text judged
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RerankCandidate {
    /// Work the text belongs to
    pub id: WorkId,
    /// Abstract (or other body text) the oracle reads
    pub text: String,
}

impl RerankCandidate {
    /// Create a candidate
    pub fn new(id: WorkId, text: impl Into<String>) -> Self {
        RerankCandidate {
            id,
            text: text.into(),
        }
    }

    /// Build a candidate from a work's abstract
    ///
    /// # Errors
    /// Returns `Error::MissingText` if the work has no non-blank abstract.
    pub fn from_work(work: &Work) -> Result<Self> {
        match work.abstract_text() {
            Some(text) if !text.trim().is_empty() => Ok(Self::new(work.id(), text)),
            _ => Err(Error::MissingText(work.id())),
        }
    }
}

/// Orders a small set of candidates by relevance to a query.
///
/// Implementations return candidate ids, most relevant first. Ids not in
/// `candidates` are ignored by callers; candidates missing from the answer
/// rank after those present. The trait is object-safe for use as
/// `Arc<dyn ComparisonOracle>`.
pub trait ComparisonOracle: Send + Sync {
    /// Preference order over `candidates`
    ///
    /// # Errors
    /// Returns `Error::Rerank` if the oracle is unavailable.
    fn compare(&self, query: &str, candidates: &[RerankCandidate]) -> Result<Vec<WorkId>>;
}

/// Trait for re-ranking implementations.
///
/// The trait is object-safe for use as `Arc<dyn Reranker>`.
///
/// # Implementations
///
/// - `SetwiseReranker`: heap-based top-k selection over a `ComparisonOracle`
pub trait Reranker: Send + Sync {
    /// Return the ids of the `k` most relevant candidates, best first
    ///
    /// # Errors
    /// - `Error::MissingText` if any candidate has blank text
    /// - `Error::Rerank` if the oracle fails
    fn rerank(&self, query: &str, candidates: &[RerankCandidate], k: usize)
        -> Result<Vec<WorkId>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn work(abstract_text: Option<&str>) -> Work {
        let w = Work::new(
            WorkId::new(7),
            "t",
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        );
        match abstract_text {
            Some(a) => w.with_abstract(a),
            None => w,
        }
    }

    #[test]
    fn test_candidate_from_work() {
        let c = RerankCandidate::from_work(&work(Some("coral reefs"))).unwrap();
        assert_eq!(c, RerankCandidate::new(WorkId::new(7), "coral reefs"));
    }

    #[test]
    fn test_candidate_requires_text() {
        assert!(matches!(
            RerankCandidate::from_work(&work(None)),
            Err(Error::MissingText(id)) if id == WorkId::new(7)
        ));
        assert!(matches!(
            RerankCandidate::from_work(&work(Some("   "))),
            Err(Error::MissingText(_))
        ));
    }
}
