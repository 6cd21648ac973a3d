//! Seam traits between the ranking core and its collaborators
//!
//! Each trait is object-safe and `Send + Sync` so that implementations can
//! be swapped (in-memory store, remote API, test mocks) behind an `Arc<dyn _>`
//! without touching the pipeline.

use crate::error::Result;
use crate::search_types::ScoredId;
use crate::types::{TopicId, WorkId};
use crate::work::Work;
use chrono::NaiveDate;

/// Produces dense vector representations of text
///
/// Thread safety: implementations are called concurrently from the vector
/// branch of hybrid search.
pub trait Embedder: Send + Sync {
    /// Embed a single text
    ///
    /// # Errors
    /// Returns `Error::Embedding` if the provider fails.
    fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Embed many texts, preserving input order
    ///
    /// The default implementation embeds one text at a time.
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        texts.iter().map(|t| self.embed(t)).collect()
    }
}

/// Nearest-neighbour search over work embeddings
pub trait VectorSearch: Send + Sync {
    /// Return at most `top_n` ids most similar to `query`
    ///
    /// Results are descending by cosine similarity, ties by ascending id.
    /// `min_date` is an inclusive lower bound on publication date.
    fn search_by_vector(
        &self,
        query: &[f32],
        top_n: usize,
        min_date: Option<NaiveDate>,
    ) -> Result<Vec<ScoredId>>;
}

/// Keyword search over work text
pub trait LexicalSearch: Send + Sync {
    /// Return at most `top_n` ids by BM25 score for `query`
    ///
    /// Same ordering and date semantics as [`VectorSearch`].
    fn search_by_text(
        &self,
        query: &str,
        top_n: usize,
        min_date: Option<NaiveDate>,
    ) -> Result<Vec<ScoredId>>;
}

/// Resolves work ids to full records
///
/// Order of the returned works is not guaranteed and duplicates are
/// possible; ids the source does not know are silently absent.
pub trait MetadataSource: Send + Sync {
    /// Fetch full records for `ids`
    ///
    /// # Errors
    /// Returns `Error::Hydration` if the source is unavailable.
    fn fetch_works(&self, ids: &[WorkId]) -> Result<Vec<Work>>;
}

/// Lists works by research topic, the entry point for query-driven ingestion
pub trait TopicWorkSource: Send + Sync {
    /// Works whose primary topic is one of `topics`, published on or after
    /// `published_after`, most recent first
    ///
    /// `limit = None` lists everything. With `require_abstract` set, works
    /// without an abstract are left out.
    ///
    /// # Errors
    /// Returns `Error::Hydration` if the source is unavailable.
    fn works_by_topics(
        &self,
        topics: &[TopicId],
        published_after: NaiveDate,
        require_abstract: bool,
        limit: Option<usize>,
    ) -> Result<Vec<Work>>;
}
