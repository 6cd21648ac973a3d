//! Retrieval branch orchestration
//!
//! This module provides:
//! - HybridSearch: runs the dense and/or lexical branch for a query and
//!   returns a single normalized ranked id list
//!
//! # Architecture
//!
//! ```text
//!            query
//!              │
//!     ┌────────┴─────────┐        rayon::join
//!     ▼                  ▼
//!  embed → VectorSearch  LexicalSearch
//!     │                  │
//!     └────────┬─────────┘
//!              ▼
//!            Fuser
//!              │
//!              ▼
//!       Vec<ScoredId>
//! ```
//!
//! HybridSearch is STATELESS. It holds only `Arc` references to its
//! collaborators; all search state is per request.

use crate::fuser::{Fuser, WeightedSumFuser};
use crate::normalize::normalize_hits;
use chrono::NaiveDate;
use litrank_core::{
    Embedder, LexicalSearch, Result, RetrievalMethod, ScoredId, SearchMode, VectorSearch,
};
use std::sync::Arc;
use std::time::Instant;

/// Default over-fetch factor for hybrid branches
pub const DEFAULT_OVERFETCH_FACTOR: usize = 2;

/// Branch orchestrator
#[derive(Clone)]
pub struct HybridSearch {
    embedder: Arc<dyn Embedder>,
    vector: Arc<dyn VectorSearch>,
    lexical: Arc<dyn LexicalSearch>,
    fuser: Arc<dyn Fuser>,
    overfetch_factor: usize,
}

impl HybridSearch {
    /// Create an orchestrator with the default weighted-sum fuser
    pub fn new(
        embedder: Arc<dyn Embedder>,
        vector: Arc<dyn VectorSearch>,
        lexical: Arc<dyn LexicalSearch>,
    ) -> Self {
        HybridSearch {
            embedder,
            vector,
            lexical,
            fuser: Arc::new(WeightedSumFuser::default()),
            overfetch_factor: DEFAULT_OVERFETCH_FACTOR,
        }
    }

    /// Builder: set custom fuser
    pub fn with_fuser(mut self, fuser: Arc<dyn Fuser>) -> Self {
        self.fuser = fuser;
        self
    }

    /// Builder: set how many candidates per result each hybrid branch fetches
    ///
    /// Values below 1 are treated as 1.
    pub fn with_overfetch_factor(mut self, factor: usize) -> Self {
        self.overfetch_factor = factor.max(1);
        self
    }

    /// Fuser in use
    pub fn fuser(&self) -> &Arc<dyn Fuser> {
        &self.fuser
    }

    // ========================================================================
    // Search Orchestration
    // ========================================================================

    /// Rank work ids for `query`
    ///
    /// - `Vector` / `Lexical`: one branch, scores min-max normalized
    /// - `Hybrid`: both branches with `overfetch_factor × top_n` each,
    ///   run concurrently, then fused
    ///
    /// Results are descending by score (ties by ascending id) and hold at
    /// most `top_n` entries.
    pub fn search(
        &self,
        query: &str,
        top_n: usize,
        min_date: Option<NaiveDate>,
        mode: SearchMode,
    ) -> Result<Vec<ScoredId>> {
        if top_n == 0 {
            return Ok(Vec::new());
        }
        let start = Instant::now();

        let hits = match mode {
            SearchMode::Vector => normalized(self.vector_branch(query, top_n, min_date)?)?,
            SearchMode::Lexical => normalized(self.lexical_branch(query, top_n, min_date)?)?,
            SearchMode::Hybrid => {
                let fetch = top_n.saturating_mul(self.overfetch_factor);
                let (vector, lexical) = rayon::join(
                    || self.vector_branch(query, fetch, min_date),
                    || self.lexical_branch(query, fetch, min_date),
                );
                let (vector, lexical) = (vector?, lexical?);
                tracing::debug!(
                    target: "litrank::hybrid",
                    vector_hits = vector.len(),
                    lexical_hits = lexical.len(),
                    fuser = self.fuser.name(),
                    "Fusing branches"
                );
                self.fuser
                    .fuse(
                        vec![
                            (RetrievalMethod::Vector, vector),
                            (RetrievalMethod::Lexical, lexical),
                        ],
                        top_n,
                    )?
                    .hits
            }
        };

        tracing::debug!(
            target: "litrank::hybrid",
            mode = %mode,
            top_n,
            hits = hits.len(),
            elapsed_us = start.elapsed().as_micros() as u64,
            "Search complete"
        );
        Ok(hits)
    }

    fn vector_branch(
        &self,
        query: &str,
        top_n: usize,
        min_date: Option<NaiveDate>,
    ) -> Result<Vec<ScoredId>> {
        let embedding = self.embedder.embed(query)?;
        self.vector.search_by_vector(&embedding, top_n, min_date)
    }

    fn lexical_branch(
        &self,
        query: &str,
        top_n: usize,
        min_date: Option<NaiveDate>,
    ) -> Result<Vec<ScoredId>> {
        self.lexical.search_by_text(query, top_n, min_date)
    }
}

/// Normalize a single branch; an empty branch stays empty
fn normalized(hits: Vec<ScoredId>) -> Result<Vec<ScoredId>> {
    if hits.is_empty() {
        return Ok(hits);
    }
    normalize_hits(&hits)
}
