//! Fusion infrastructure for combining retrieval branches
//!
//! This module provides:
//! - Fuser trait for pluggable fusion algorithms
//! - WeightedSumFuser: per-branch min-max normalization, weighting, and
//!   summation by document id

use crate::normalize::normalize_hits;
use litrank_core::{
    sort_by_score_then_id, Candidate, Error, Result, RetrievalMethod, ScoredId, WorkId,
};
use std::collections::HashMap;

// ============================================================================
// FusedResult
// ============================================================================

/// Result of fusing several branches
#[derive(Debug, Clone, PartialEq)]
pub struct FusedResult {
    /// Final ranked list of hits
    pub hits: Vec<ScoredId>,
    /// Whether more than `k` distinct documents were available
    pub truncated: bool,
}

impl FusedResult {
    /// Create a new FusedResult
    pub fn new(hits: Vec<ScoredId>, truncated: bool) -> Self {
        FusedResult { hits, truncated }
    }
}

// ============================================================================
// Fuser Trait
// ============================================================================

/// Pluggable fusion interface
///
/// Fusers combine the hit lists of several retrieval branches into a single
/// ranked list truncated to `k` items, ordered descending by fused score
/// with ascending id as tiebreak.
///
/// # Thread Safety
///
/// Fusers must be Send + Sync for concurrent search operations.
pub trait Fuser: Send + Sync {
    /// Fuse branch results
    fn fuse(&self, results: Vec<(RetrievalMethod, Vec<ScoredId>)>, k: usize)
        -> Result<FusedResult>;

    /// Name for debugging and logging
    fn name(&self) -> &str;
}

// ============================================================================
// WeightedSumFuser
// ============================================================================

/// Weighted-sum fusion
///
/// 1. Within a branch, a document listed twice keeps its best raw score
/// 2. Each non-empty branch is min-max normalized independently
/// 3. Normalized scores are multiplied by the branch weight
/// 4. Scores of the same document are summed across branches
/// 5. Sort by (score desc, id asc), truncate to k
///
/// A document found by only one branch contributes nothing from the other.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightedSumFuser {
    vector_weight: f32,
    lexical_weight: f32,
}

impl Default for WeightedSumFuser {
    fn default() -> Self {
        WeightedSumFuser {
            vector_weight: 0.8,
            lexical_weight: 0.2,
        }
    }
}

impl WeightedSumFuser {
    /// Create a fuser with explicit weights
    ///
    /// # Errors
    /// Returns `Error::InvalidWeights` unless both weights are finite and
    /// non-negative.
    pub fn new(vector_weight: f32, lexical_weight: f32) -> Result<Self> {
        let valid = |w: f32| w.is_finite() && w >= 0.0;
        if !valid(vector_weight) || !valid(lexical_weight) {
            return Err(Error::InvalidWeights {
                vector: vector_weight,
                lexical: lexical_weight,
            });
        }
        Ok(WeightedSumFuser {
            vector_weight,
            lexical_weight,
        })
    }

    /// Weight applied to a branch
    pub fn weight(&self, method: RetrievalMethod) -> f32 {
        match method {
            RetrievalMethod::Vector => self.vector_weight,
            RetrievalMethod::Lexical => self.lexical_weight,
        }
    }
}

/// Keep the best raw score per id, in first-seen order
fn dedupe_branch(hits: &[ScoredId]) -> Vec<ScoredId> {
    let mut position: HashMap<WorkId, usize> = HashMap::with_capacity(hits.len());
    let mut out: Vec<ScoredId> = Vec::with_capacity(hits.len());
    for hit in hits {
        match position.get(&hit.id) {
            Some(&i) => {
                if hit.score > out[i].score {
                    out[i].score = hit.score;
                }
            }
            None => {
                position.insert(hit.id, out.len());
                out.push(*hit);
            }
        }
    }
    out
}

impl Fuser for WeightedSumFuser {
    fn fuse(
        &self,
        results: Vec<(RetrievalMethod, Vec<ScoredId>)>,
        k: usize,
    ) -> Result<FusedResult> {
        let mut candidates: Vec<Candidate> = Vec::new();
        for (method, hits) in &results {
            if hits.is_empty() {
                continue;
            }
            let normalized = normalize_hits(&dedupe_branch(hits))?;
            candidates.extend(Candidate::from_hits(&normalized, *method));
        }

        let mut fused: HashMap<WorkId, f32> = HashMap::with_capacity(candidates.len());
        for c in &candidates {
            *fused.entry(c.id).or_insert(0.0) += c.score * self.weight(c.method);
        }

        let mut hits: Vec<ScoredId> = fused
            .into_iter()
            .map(|(id, score)| ScoredId::new(id, score))
            .collect();
        sort_by_score_then_id(&mut hits);

        let truncated = hits.len() > k;
        hits.truncate(k);
        Ok(FusedResult::new(hits, truncated))
    }

    fn name(&self) -> &str {
        "weighted-sum"
    }
}

// ============================================================================
// Tests
// ============================================================================
