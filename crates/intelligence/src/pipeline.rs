//! End-to-end retrieval
//!
//! This module provides:
//! - RetrievalPipeline: search → hydrate → optional rerank
//!
//! # Architecture
//!
//! ```text
//! retrieve(query, n, min_date, mode, rerank)
//!     │
//!     ▼
//! HybridSearch::search(query, pool, ...)      pool = n, or rerank_factor × n
//!     │ Vec<ScoredId>
//!     ▼
//! MetadataSource::fetch_works(ids)            order restored, duplicates and
//!     │ Vec<Work>                             missing ids dropped
//!     ▼
//! Reranker::rerank(query, candidates, n)      only when rerank = true
//!     │
//!     ▼
//! Vec<Work>  (at most n, unique ids)
//! ```
//!
//! The pipeline is stateless per request. A failed stage fails the whole
//! call; no partial result list is returned.

use crate::rerank::{RerankCandidate, Reranker};
use chrono::NaiveDate;
use litrank_core::{Error, MetadataSource, Result, ScoredId, SearchMode, Work, WorkId};
use litrank_search::HybridSearch;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;

/// Default candidate pool multiplier when reranking
pub const DEFAULT_RERANK_FACTOR: usize = 10;

/// Search, hydration and reranking orchestrator
#[derive(Clone)]
pub struct RetrievalPipeline {
    search: HybridSearch,
    metadata: Arc<dyn MetadataSource>,
    reranker: Option<Arc<dyn Reranker>>,
    rerank_factor: usize,
}

impl RetrievalPipeline {
    /// Create a pipeline without a reranker
    pub fn new(search: HybridSearch, metadata: Arc<dyn MetadataSource>) -> Self {
        RetrievalPipeline {
            search,
            metadata,
            reranker: None,
            rerank_factor: DEFAULT_RERANK_FACTOR,
        }
    }

    /// Builder: set reranker
    pub fn with_reranker(mut self, reranker: Arc<dyn Reranker>) -> Self {
        self.reranker = Some(reranker);
        self
    }

    /// Builder: candidate pool multiplier for reranking (at least 1)
    pub fn with_rerank_factor(mut self, factor: usize) -> Self {
        self.rerank_factor = factor.max(1);
        self
    }

    /// The search orchestrator in use
    pub fn search(&self) -> &HybridSearch {
        &self.search
    }

    /// Retrieve up to `n` works for `query`
    ///
    /// Without `rerank`, the `n` best search hits are hydrated and returned
    /// in score order. With `rerank`, `rerank_factor × n` hits are hydrated
    /// and the reranker picks the final `n`.
    ///
    /// # Errors
    /// - `Error::InvalidInput` if `rerank` is set but no reranker is configured
    /// - `Error::MissingText` if a rerank candidate has no abstract
    /// - stage-tagged errors from embedding, search, hydration or reranking
    pub fn retrieve(
        &self,
        query: &str,
        n: usize,
        min_date: Option<NaiveDate>,
        mode: SearchMode,
        rerank: bool,
    ) -> Result<Vec<Work>> {
        let reranker = match (rerank, &self.reranker) {
            (true, None) => {
                return Err(Error::invalid_input(
                    "reranking requested but no reranker is configured",
                ))
            }
            (true, Some(r)) => Some(r),
            (false, _) => None,
        };
        if n == 0 {
            return Ok(Vec::new());
        }

        let start = Instant::now();
        let pool = if reranker.is_some() {
            n.saturating_mul(self.rerank_factor)
        } else {
            n
        };
        tracing::debug!(
            target: "litrank::pipeline",
            mode = %mode,
            n,
            pool,
            rerank,
            "Retrieving"
        );

        let hits = self.search.search(query, pool, min_date, mode)?;
        let works = self.hydrate(&hits)?;

        let works = match reranker {
            Some(reranker) => rerank_works(reranker.as_ref(), query, works, n)?,
            None => works,
        };

        tracing::debug!(
            target: "litrank::pipeline",
            hits = hits.len(),
            returned = works.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Retrieval complete"
        );
        Ok(works)
    }

    /// Resolve hits to works in hit order
    ///
    /// Duplicate ids keep their first occurrence; ids the source does not
    /// return are dropped and logged.
    pub fn hydrate(&self, hits: &[ScoredId]) -> Result<Vec<Work>> {
        let mut seen = HashSet::with_capacity(hits.len());
        let ids: Vec<WorkId> = hits.iter().map(|h| h.id).filter(|id| seen.insert(*id)).collect();
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let fetched = self.metadata.fetch_works(&ids).map_err(|e| match e {
            Error::Hydration(_) => e,
            other => Error::Hydration(other.to_string()),
        })?;
        let mut by_id: HashMap<WorkId, Work> = HashMap::with_capacity(fetched.len());
        for work in fetched {
            by_id.entry(work.id()).or_insert(work);
        }

        let mut works = Vec::with_capacity(ids.len());
        for id in ids {
            match by_id.remove(&id) {
                Some(work) => works.push(work),
                None => {
                    tracing::warn!(target: "litrank::pipeline", work = %id, "Dropping id missing from metadata source");
                }
            }
        }
        Ok(works)
    }
}

fn rerank_works(
    reranker: &dyn Reranker,
    query: &str,
    works: Vec<Work>,
    n: usize,
) -> Result<Vec<Work>> {
    let candidates = works
        .iter()
        .map(RerankCandidate::from_work)
        .collect::<Result<Vec<_>>>()?;
    let order = reranker.rerank(query, &candidates, n)?;

    let mut by_id: HashMap<WorkId, Work> = works.into_iter().map(|w| (w.id(), w)).collect();
    Ok(order
        .into_iter()
        .filter_map(|id| by_id.remove(&id))
        .take(n)
        .collect())
}
