//! litrank - Hybrid retrieval and relevance ranking for scientific publications
//!
//! litrank ranks publications against a natural-language query or a user's
//! declared research interest by combining dense vector search, BM25 lexical
//! search, weighted score fusion and optional setwise LLM reranking.
//!
//! # Quick Start
//!
//! ```ignore
//! use litrank::{Litrank, SearchMode};
//!
//! // Open (or create) an engine in a data directory
//! let engine = Litrank::open("/var/data/litrank")?;
//!
//! // Pull works for the topics nearest a query from OpenAlex, then search them
//! let start = chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
//! let (topics, report) = engine.initialize_for_query("coral reef resilience", start, None, 5)?;
//! let hits = engine.retrieve_with("coral reef resilience", 10, None, SearchMode::Hybrid, true)?;
//! engine.save()?;
//! ```
//!
//! # Architecture
//!
//! The [`Litrank`] facade owns a configured [`RetrievalPipeline`] over a
//! [`PublicationStore`]. The component crates are re-exported for callers
//! that assemble their own pipeline:
//!
//! - `litrank-core`: data model, search types, seam traits, errors
//! - `litrank-engine`: vector and lexical indices, stores, profiles, config
//! - `litrank-search`: normalization, fusion, hybrid search, topic relevance
//! - `litrank-intelligence`: model clients, reranking, ingestion, pipeline

mod litrank;

pub use crate::litrank::{
    Collaborators, Litrank, PROFILES_FILE_NAME, SNAPSHOT_FILE_NAME, TOPICS_FILE_NAME,
};

pub use litrank_core::{
    sort_by_score_then_id, validate_topics, Candidate, Embedder, Error, FollowedTopic,
    LexicalSearch, MetadataSource, Result, RetrievalMethod, ScoredId, ScoredWork, SearchMode,
    SummarizedWork, Topic, TopicAssignment, TopicId, TopicIssue, TopicWorkSource, VectorSearch, Work,
    WorkId,
    MAX_AUTHORS,
};
pub use litrank_engine::{
    Bm25Params, LexicalIndex, LitrankConfig, ProfileLog, ProfileVersion, PublicationStore,
    TopicStore, UserProfile, VectorIndex, CONFIG_FILE_NAME,
};
pub use litrank_intelligence::{
    ApiComparisonOracle, ApiCompleter, ApiEmbedder, ComparisonOracle, CompletionProvider,
    IngestReport, Ingestor, LlmClientError, Message, ModelTier, OpenAlexClient, RerankCandidate,
    Reranker, RetrievalPipeline, SetwiseReranker, Summarizer, TopicMatch, TopicMatcher,
    UsageTracker,
};
pub use litrank_search::{
    normalize, score_by_topics, topic_relevance, Fuser, HybridSearch, WeightedSumFuser,
};
