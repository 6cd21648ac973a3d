//! Inverted index for BM25 keyword search
//!
//! This module provides:
//! - LexicalIndex with per-term posting lists
//! - Incremental add/remove of documents
//! - In-index BM25 scoring with an inclusive publication-date filter
//!
//! # Memory Layout
//!
//! PostingEntry is a compact Copy struct keyed by `WorkId`; document text
//! is never stored. Per-document metadata (length, publication date) lives
//! in one map so that removal can undo the global statistics exactly.

use super::scorer::{idf, Bm25Params};
use super::tokenizer::{tokenize, tokenize_unique};
use chrono::NaiveDate;
use dashmap::DashMap;
use litrank_core::{sort_by_score_then_id, ScoredId, WorkId};
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

// ============================================================================
// PostingEntry
// ============================================================================

/// Entry in a posting list
#[derive(Debug, Clone, Copy)]
pub struct PostingEntry {
    /// Document identifier
    pub doc_id: WorkId,
    /// Term frequency in this document
    pub tf: u32,
    /// Document length in tokens
    pub doc_len: u32,
}

impl PostingEntry {
    /// Create a new posting entry
    pub fn new(doc_id: WorkId, tf: u32, doc_len: u32) -> Self {
        PostingEntry {
            doc_id,
            tf,
            doc_len,
        }
    }
}

// ============================================================================
// PostingList
// ============================================================================

/// List of documents containing a term
#[derive(Debug, Clone, Default)]
pub struct PostingList {
    /// Document entries
    pub entries: Vec<PostingEntry>,
}

impl PostingList {
    /// Add an entry to the posting list
    pub fn add(&mut self, entry: PostingEntry) {
        self.entries.push(entry);
    }

    /// Remove entries matching a doc_id, returning how many were removed
    pub fn remove_by_id(&mut self, doc_id: WorkId) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| e.doc_id != doc_id);
        before - self.entries.len()
    }

    /// Number of documents containing this term
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if posting list is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, Copy)]
struct DocMeta {
    len: u32,
    publication_date: Option<NaiveDate>,
}

// ============================================================================
// LexicalIndex
// ============================================================================

/// Inverted index with BM25 scoring
///
/// # Thread Safety
///
/// Uses DashMap for postings and a `RwLock` for document metadata.
/// Multiple readers and writers are supported; a search running
/// concurrently with an insert sees either the old or the new document.
///
/// # Version Watermark
///
/// `version()` is incremented on every update.
pub struct LexicalIndex {
    /// Term -> PostingList mapping
    postings: DashMap<String, PostingList>,
    /// doc_id -> length and publication date
    docs: RwLock<BTreeMap<WorkId, DocMeta>>,
    /// Sum of all document lengths
    total_doc_len: AtomicUsize,
    /// Version watermark
    version: AtomicU64,
    params: Bm25Params,
}

impl Default for LexicalIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl LexicalIndex {
    /// Create an empty index with default BM25 parameters
    pub fn new() -> Self {
        Self::with_params(Bm25Params::default())
    }

    /// Create an empty index with custom BM25 parameters
    pub fn with_params(params: Bm25Params) -> Self {
        LexicalIndex {
            postings: DashMap::new(),
            docs: RwLock::new(BTreeMap::new()),
            total_doc_len: AtomicUsize::new(0),
            version: AtomicU64::new(0),
            params,
        }
    }

    // ========================================================================
    // Statistics
    // ========================================================================

    /// BM25 parameters in use
    pub fn params(&self) -> Bm25Params {
        self.params
    }

    /// Current version watermark
    pub fn version(&self) -> u64 {
        self.version.load(Ordering::Acquire)
    }

    /// Number of indexed documents
    pub fn total_docs(&self) -> usize {
        self.docs.read().len()
    }

    /// True if `doc_id` is indexed
    pub fn contains(&self, doc_id: WorkId) -> bool {
        self.docs.read().contains_key(&doc_id)
    }

    /// Number of documents containing `term`
    pub fn doc_freq(&self, term: &str) -> usize {
        self.postings.get(term).map(|p| p.len()).unwrap_or(0)
    }

    /// Average document length in tokens
    pub fn avg_doc_len(&self) -> f32 {
        let total = self.total_docs();
        if total == 0 {
            return 0.0;
        }
        self.total_doc_len.load(Ordering::Acquire) as f32 / total as f32
    }

    /// Smoothed IDF for a term
    pub fn compute_idf(&self, term: &str) -> f32 {
        idf(self.total_docs(), self.doc_freq(term))
    }

    // ========================================================================
    // Index Updates
    // ========================================================================

    /// Index a document
    ///
    /// If the document is already indexed it is removed first, so statistics
    /// are never double-counted.
    pub fn index_document(&self, doc_id: WorkId, text: &str, publication_date: Option<NaiveDate>) {
        if self.contains(doc_id) {
            self.remove_document(doc_id);
        }

        let tokens = tokenize(text);
        let doc_len = tokens.len() as u32;

        let mut tf_map: HashMap<String, u32> = HashMap::with_capacity(tokens.len());
        for token in tokens {
            *tf_map.entry(token).or_insert(0) += 1;
        }

        for (term, tf) in tf_map {
            self.postings
                .entry(term)
                .or_default()
                .add(PostingEntry::new(doc_id, tf, doc_len));
        }

        self.docs.write().insert(
            doc_id,
            DocMeta {
                len: doc_len,
                publication_date,
            },
        );
        self.total_doc_len
            .fetch_add(doc_len as usize, Ordering::AcqRel);
        self.version.fetch_add(1, Ordering::Release);
    }

    /// Remove a document from the index, returning whether it was indexed
    pub fn remove_document(&self, doc_id: WorkId) -> bool {
        let meta = match self.docs.write().remove(&doc_id) {
            Some(meta) => meta,
            None => return false,
        };

        for mut entry in self.postings.iter_mut() {
            entry.remove_by_id(doc_id);
        }
        self.postings.retain(|_, list| !list.is_empty());

        self.total_doc_len
            .fetch_sub(meta.len as usize, Ordering::AcqRel);
        self.version.fetch_add(1, Ordering::Release);
        true
    }

    // ========================================================================
    // In-Index BM25 Scoring
    // ========================================================================

    /// Score documents for `query` and return the best `top_n`
    ///
    /// Query terms are deduplicated before scoring. Only documents whose
    /// publication date is on or after `min_date` are considered (undated
    /// documents are excluded when a date is given). Results are descending
    /// by score, ties broken by ascending id.
    pub fn search(&self, query: &str, top_n: usize, min_date: Option<NaiveDate>) -> Vec<ScoredId> {
        if top_n == 0 {
            return Vec::new();
        }
        let terms = tokenize_unique(query);
        if terms.is_empty() {
            return Vec::new();
        }

        let docs = self.docs.read();
        let total_docs = docs.len();
        if total_docs == 0 {
            return Vec::new();
        }
        let avg_doc_len = self.total_doc_len.load(Ordering::Acquire) as f32 / total_docs as f32;

        let mut scores: HashMap<WorkId, f32> = HashMap::new();
        for term in &terms {
            let Some(list) = self.postings.get(term) else {
                continue;
            };
            let term_idf = idf(total_docs, list.len());
            for entry in &list.entries {
                let admitted = match (min_date, docs.get(&entry.doc_id)) {
                    (_, None) => false,
                    (None, Some(_)) => true,
                    (Some(min), Some(meta)) => meta.publication_date.map(|d| d >= min).unwrap_or(false),
                };
                if !admitted {
                    continue;
                }
                let tf_comp =
                    self.params
                        .tf_component(entry.tf as f32, entry.doc_len as f32, avg_doc_len);
                *scores.entry(entry.doc_id).or_insert(0.0) += term_idf * tf_comp;
            }
        }
        drop(docs);

        let mut hits: Vec<ScoredId> = scores
            .into_iter()
            .map(|(id, score)| ScoredId::new(id, score))
            .collect();
        sort_by_score_then_id(&mut hits);
        hits.truncate(top_n);
        hits
    }
}
