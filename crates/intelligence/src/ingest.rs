//! Ingestion of fetched works into the publication store
//!
//! Works already stored are skipped before anything is embedded, so
//! re-running an ingest over an overlapping topic listing only pays for the
//! new works. Abstracts are embedded in fixed-size chunks and inserted as
//! each chunk completes.

use litrank_core::{validate_topics, Embedder, Error, Result, Work};
use litrank_engine::PublicationStore;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

/// Default number of abstracts embedded per chunk
pub const DEFAULT_CHUNK_SIZE: usize = 2000;

/// Outcome of one ingest run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestReport {
    /// Works newly inserted
    pub inserted: usize,
    /// Works skipped because the store already held them
    pub skipped_known: usize,
    /// Works skipped because they repeated an earlier work of the same run
    pub skipped_duplicate: usize,
}

/// Embeds and stores works
pub struct Ingestor {
    store: Arc<PublicationStore>,
    embedder: Arc<dyn Embedder>,
    chunk_size: usize,
}

impl Ingestor {
    /// Create an ingestor with [`DEFAULT_CHUNK_SIZE`]
    pub fn new(store: Arc<PublicationStore>, embedder: Arc<dyn Embedder>) -> Self {
        Ingestor {
            store,
            embedder,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Builder: abstracts per embedding chunk (at least 1)
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Insert every unknown work of `works`
    ///
    /// # Errors
    /// - `Error::MissingText` if a new work has no abstract; nothing is
    ///   embedded or inserted in that case
    /// - `Error::Embedding` if the embedder fails; chunks completed before
    ///   the failure stay inserted
    pub fn ingest(&self, works: Vec<Work>) -> Result<IngestReport> {
        let start = Instant::now();
        let mut report = IngestReport::default();
        let known = self.store.known_ids();
        let mut batch_ids = HashSet::new();

        let mut fresh = Vec::with_capacity(works.len());
        for work in works {
            if known.contains(&work.id()) {
                report.skipped_known += 1;
            } else if !batch_ids.insert(work.id()) {
                report.skipped_duplicate += 1;
            } else {
                fresh.push(work);
            }
        }

        if let Some(work) = fresh.iter().find(|w| !w.has_text()) {
            return Err(Error::MissingText(work.id()));
        }
        for work in &fresh {
            let issues = validate_topics(work.topics());
            if !issues.is_empty() {
                tracing::warn!(
                    target: "litrank::ingest",
                    work = %work.id(),
                    issues = issues.len(),
                    "Work carries invalid topic scores"
                );
            }
        }

        let total = fresh.len();
        let mut done = 0;
        let mut pending = fresh.into_iter().peekable();
        while pending.peek().is_some() {
            let chunk: Vec<Work> = pending.by_ref().take(self.chunk_size).collect();
            let texts: Vec<String> = chunk
                .iter()
                .map(|w| w.abstract_text().unwrap_or_default().to_string())
                .collect();
            let embeddings = self.embedder.embed_batch(&texts)?;
            if embeddings.len() != chunk.len() {
                return Err(Error::Embedding(format!(
                    "embedder returned {} vectors for {} texts",
                    embeddings.len(),
                    chunk.len()
                )));
            }
            for (work, embedding) in chunk.into_iter().zip(embeddings) {
                if self.store.insert(work, embedding)? {
                    report.inserted += 1;
                } else {
                    report.skipped_known += 1;
                }
            }
            done += texts.len();
            tracing::info!(
                target: "litrank::ingest",
                done,
                total,
                "Embedded chunk"
            );
        }

        tracing::info!(
            target: "litrank::ingest",
            inserted = report.inserted,
            skipped_known = report.skipped_known,
            skipped_duplicate = report.skipped_duplicate,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Ingest complete"
        );
        Ok(report)
    }
}
