//! Core types and traits for litrank
//!
//! This crate defines the foundational types used throughout the system:
//! - WorkId, TopicId: source-assigned identifiers
//! - Work, ScoredWork, SummarizedWork: bibliographic records
//! - Search types: SearchMode, ScoredId, Candidate, RetrievalMethod
//! - Traits: Embedder, VectorSearch, LexicalSearch, MetadataSource, TopicWorkSource
//! - Topic validation for corrupt upstream records
//! - Error: Error type hierarchy

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod search_types;
pub mod traits;
pub mod types;
pub mod validate;
pub mod work;

pub use error::{Error, Result};
pub use search_types::{sort_by_score_then_id, Candidate, RetrievalMethod, ScoredId, SearchMode};
pub use traits::{Embedder, LexicalSearch, MetadataSource, TopicWorkSource, VectorSearch};
pub use types::{FollowedTopic, Topic, TopicAssignment, TopicId, WorkId};
pub use validate::{validate_topics, TopicIssue};
pub use work::{ScoredWork, SummarizedWork, Work, MAX_AUTHORS};
