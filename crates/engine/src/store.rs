//! In-memory publication store
//!
//! Owns the works together with both retrieval indices and keeps them in
//! step: a work is searchable by vector and by keyword as soon as
//! `insert` returns. Insertion is at-most-once per `WorkId`.
//!
//! The store implements the core seam traits (`VectorSearch`,
//! `LexicalSearch`, `MetadataSource`) so it can back a retrieval pipeline
//! directly.

use crate::search::{Bm25Params, LexicalIndex};
use crate::snapshot::{read_snapshot, write_snapshot};
use crate::vector::VectorIndex;
use chrono::NaiveDate;
use litrank_core::{
    LexicalSearch, MetadataSource, Result, ScoredId, VectorSearch, Work, WorkId,
};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

#[derive(Serialize, Deserialize)]
struct StoreSnapshot {
    dimension: usize,
    entries: Vec<(Work, Vec<f32>)>,
}

/// Works plus their vector and lexical indices
pub struct PublicationStore {
    works: RwLock<BTreeMap<WorkId, Work>>,
    vectors: VectorIndex<WorkId>,
    lexical: LexicalIndex,
}

impl PublicationStore {
    /// Create an empty store for embeddings of `dimension` components
    pub fn new(dimension: usize) -> Self {
        Self::with_bm25(dimension, Bm25Params::default())
    }

    /// Create an empty store with custom BM25 parameters
    pub fn with_bm25(dimension: usize, params: Bm25Params) -> Self {
        PublicationStore {
            works: RwLock::new(BTreeMap::new()),
            vectors: VectorIndex::new(dimension),
            lexical: LexicalIndex::with_params(params),
        }
    }

    /// Embedding dimension
    pub fn dimension(&self) -> usize {
        self.vectors.dimension()
    }

    /// Number of stored works
    pub fn len(&self) -> usize {
        self.works.read().len()
    }

    /// True if the store holds no works
    pub fn is_empty(&self) -> bool {
        self.works.read().is_empty()
    }

    /// True if a work with this id was already inserted
    pub fn contains(&self, id: WorkId) -> bool {
        self.works.read().contains_key(&id)
    }

    /// Ids of all stored works, ascending
    pub fn known_ids(&self) -> BTreeSet<WorkId> {
        self.works.read().keys().copied().collect()
    }

    /// Copy of a stored work
    pub fn get(&self, id: WorkId) -> Option<Work> {
        self.works.read().get(&id).cloned()
    }

    /// Insert a work with its embedding
    ///
    /// Returns `Ok(false)` without touching anything if the id is already
    /// present.
    ///
    /// # Errors
    /// Returns the vector index error if the embedding is rejected; in that
    /// case nothing is inserted.
    pub fn insert(&self, work: Work, embedding: Vec<f32>) -> Result<bool> {
        let mut works = self.works.write();
        if works.contains_key(&work.id()) {
            return Ok(false);
        }
        let date = Some(work.publication_date());
        self.vectors.insert(work.id(), embedding, date)?;
        self.lexical
            .index_document(work.id(), &work.searchable_text(), date);
        works.insert(work.id(), work);
        Ok(true)
    }

    /// The dense index (read access for diagnostics and tests)
    pub fn vector_index(&self) -> &VectorIndex<WorkId> {
        &self.vectors
    }

    /// The lexical index (read access for diagnostics and tests)
    pub fn lexical_index(&self) -> &LexicalIndex {
        &self.lexical
    }

    // ========================================================================
    // Snapshots
    // ========================================================================

    /// Write all works and embeddings to `path`
    pub fn save_snapshot(&self, path: &Path) -> Result<()> {
        let entries: Vec<(Work, Vec<f32>)> = {
            let works = self.works.read();
            works
                .values()
                .filter_map(|w| self.vectors.get(&w.id()).map(|v| (w.clone(), v)))
                .collect()
        };
        let count = entries.len();
        write_snapshot(
            path,
            &StoreSnapshot {
                dimension: self.dimension(),
                entries,
            },
        )?;

        tracing::debug!(
            target: "litrank::store",
            path = %path.display(),
            works = count,
            "Saved store snapshot"
        );
        Ok(())
    }

    /// Rebuild a store from a snapshot written by `save_snapshot`
    ///
    /// # Errors
    /// - `Error::Io` if the file cannot be read
    /// - `Error::Serialization` if it is corrupt or from another format version
    pub fn load_snapshot(path: &Path) -> Result<Self> {
        Self::load_snapshot_with_bm25(path, Bm25Params::default())
    }

    /// Rebuild a store from a snapshot, indexing with custom BM25 parameters
    pub fn load_snapshot_with_bm25(path: &Path, params: Bm25Params) -> Result<Self> {
        let snapshot: StoreSnapshot = read_snapshot(path)?;
        let store = PublicationStore::with_bm25(snapshot.dimension, params);
        for (work, embedding) in snapshot.entries {
            store.insert(work, embedding)?;
        }
        tracing::debug!(
            target: "litrank::store",
            path = %path.display(),
            works = store.len(),
            "Loaded store snapshot"
        );
        Ok(store)
    }
}

impl VectorSearch for PublicationStore {
    fn search_by_vector(
        &self,
        query: &[f32],
        top_n: usize,
        min_date: Option<NaiveDate>,
    ) -> Result<Vec<ScoredId>> {
        self.vectors.search(query, top_n, min_date)
    }
}

impl LexicalSearch for PublicationStore {
    fn search_by_text(
        &self,
        query: &str,
        top_n: usize,
        min_date: Option<NaiveDate>,
    ) -> Result<Vec<ScoredId>> {
        Ok(self.lexical.search(query, top_n, min_date))
    }
}

impl MetadataSource for PublicationStore {
    fn fetch_works(&self, ids: &[WorkId]) -> Result<Vec<Work>> {
        let works = self.works.read();
        Ok(ids.iter().filter_map(|id| works.get(id).cloned()).collect())
    }
}
