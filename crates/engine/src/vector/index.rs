//! Brute-force vector index
//!
//! Simple O(n) exact search. Sufficient for per-user corpora and the topic
//! catalogue (a few thousand entries); performance degrades linearly.
//!
//! Determinism contract:
//! 1. Iterate vectors in key order (BTreeMap iteration)
//! 2. Compute scores single-threaded
//! 3. Sort by (score desc, key asc)
//! 4. Truncate to k

use super::distance::cosine_similarity;
use chrono::NaiveDate;
use litrank_core::{Error, Result, ScoredId, WorkId};
use parking_lot::RwLock;
use std::cmp::Ordering;
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
struct VectorEntry {
    embedding: Vec<f32>,
    publication_date: Option<NaiveDate>,
}

/// Exact cosine-similarity index keyed by `K`
///
/// Works use `VectorIndex<WorkId>` (the default); the topic catalogue uses
/// `VectorIndex<TopicId>`.
///
/// # Thread Safety
///
/// Interior `RwLock`: concurrent searches, exclusive inserts.
pub struct VectorIndex<K = WorkId> {
    dimension: usize,
    entries: RwLock<BTreeMap<K, VectorEntry>>,
}

impl<K: Ord + Copy> VectorIndex<K> {
    /// Create an empty index for vectors of `dimension` components
    pub fn new(dimension: usize) -> Self {
        VectorIndex {
            dimension,
            entries: RwLock::new(BTreeMap::new()),
        }
    }

    /// Vector dimension accepted by this index
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Number of stored vectors
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// True if no vectors are stored
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// True if a vector is stored under `id`
    pub fn contains(&self, id: &K) -> bool {
        self.entries.read().contains_key(id)
    }

    /// Insert or replace the vector for `id`
    ///
    /// Entries without a publication date never match a date-filtered
    /// search.
    ///
    /// # Errors
    /// - `Error::DimensionMismatch` if the embedding has the wrong length
    /// - `Error::InvalidInput` if it contains NaN or infinite components
    pub fn insert(
        &self,
        id: K,
        embedding: Vec<f32>,
        publication_date: Option<NaiveDate>,
    ) -> Result<()> {
        self.check_dimension(&embedding)?;
        if embedding.iter().any(|x| !x.is_finite()) {
            return Err(Error::invalid_input("embedding contains non-finite values"));
        }
        self.entries.write().insert(
            id,
            VectorEntry {
                embedding,
                publication_date,
            },
        );
        Ok(())
    }

    /// Remove the vector for `id`, returning whether it existed
    pub fn remove(&self, id: &K) -> bool {
        self.entries.write().remove(id).is_some()
    }

    /// Copy of the stored vector for `id`
    pub fn get(&self, id: &K) -> Option<Vec<f32>> {
        self.entries.read().get(id).map(|e| e.embedding.clone())
    }

    /// Return the `k` keys most similar to `query`
    ///
    /// An empty index or `k == 0` yields an empty list before the query is
    /// checked.
    ///
    /// # Errors
    /// Returns `Error::DimensionMismatch` if `query` has the wrong length.
    pub fn nearest(
        &self,
        query: &[f32],
        k: usize,
        min_date: Option<NaiveDate>,
    ) -> Result<Vec<(K, f32)>> {
        let entries = self.entries.read();
        if k == 0 || entries.is_empty() {
            return Ok(Vec::new());
        }
        self.check_dimension(query)?;

        let mut results: Vec<(K, f32)> = entries
            .iter()
            .filter(|(_, e)| match min_date {
                Some(min) => e.publication_date.map(|d| d >= min).unwrap_or(false),
                None => true,
            })
            .map(|(id, e)| (*id, cosine_similarity(query, &e.embedding)))
            .collect();
        drop(entries);

        // Sort by (score desc, key asc) for determinism
        results.sort_by(|(id_a, score_a), (id_b, score_b)| {
            score_b
                .partial_cmp(score_a)
                .unwrap_or(Ordering::Equal)
                .then_with(|| id_a.cmp(id_b))
        });
        results.truncate(k);
        Ok(results)
    }

    fn check_dimension(&self, v: &[f32]) -> Result<()> {
        if v.len() != self.dimension {
            return Err(Error::DimensionMismatch {
                expected: self.dimension,
                actual: v.len(),
            });
        }
        Ok(())
    }
}

impl VectorIndex<WorkId> {
    /// Nearest works as [`ScoredId`]s
    pub fn search(
        &self,
        query: &[f32],
        top_n: usize,
        min_date: Option<NaiveDate>,
    ) -> Result<Vec<ScoredId>> {
        Ok(self
            .nearest(query, top_n, min_date)?
            .into_iter()
            .map(|(id, score)| ScoredId::new(id, score))
            .collect())
    }
}
