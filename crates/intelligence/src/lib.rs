//! Model-backed operations for litrank
//!
//! Everything that talks to an embedding, completion or bibliographic
//! endpoint lives here, together with the pipeline that ties retrieval to
//! those collaborators.
//!
//! This crate provides:
//! - `llm_client`: shared HTTP helpers, `LlmClientError`, retry-once logic
//! - `usage`: `UsageTracker` token and cost accounting
//! - `embed`: `ApiEmbedder` with token-budget batching
//! - `generate`: `CompletionProvider`, `ApiCompleter`, alignment and summary tasks
//! - `rerank`: `ComparisonOracle`, `SetwiseReranker`, `ApiComparisonOracle`
//! - `openalex`: `OpenAlexClient` metadata and topic-listing source
//! - `ingest`: `Ingestor` for at-most-once insertion of fetched works
//! - `topics`: `TopicMatcher` for research descriptions
//! - `summarize`: `Summarizer` for customized summaries
//! - `pipeline`: `RetrievalPipeline`
//!
//! HTTP transport is gated behind the `remote` feature (on by default).
//! Without it every API type fails with `LlmClientError::FeatureDisabled`
//! mapped into the stage's error.
//!
//! # Usage
//!
//! ```ignore
//! use litrank_intelligence::RetrievalPipeline;
//!
//! let pipeline = RetrievalPipeline::new(search, metadata).with_reranker(reranker);
//! let works = pipeline.retrieve("coral reef resilience", 10, None, SearchMode::Hybrid, true)?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod embed;
pub mod generate;
pub mod ingest;
pub mod llm_client;
pub mod openalex;
pub mod pipeline;
pub mod rerank;
pub mod summarize;
pub mod topics;
pub mod usage;

#[cfg(test)]
pub(crate) mod mock;

pub use embed::ApiEmbedder;
pub use generate::{
    ApiCompleter, AlignToExamples, CompletionProvider, CompletionTask, CustomizedSummary, Message,
    ModelTier, Role,
};
pub use ingest::{IngestReport, Ingestor};
pub use llm_client::LlmClientError;
pub use openalex::OpenAlexClient;
pub use pipeline::{RetrievalPipeline, DEFAULT_RERANK_FACTOR};
pub use rerank::{ApiComparisonOracle, ComparisonOracle, RerankCandidate, Reranker, SetwiseReranker};
pub use summarize::Summarizer;
pub use topics::{TopicMatch, TopicMatcher};
pub use usage::UsageTracker;
