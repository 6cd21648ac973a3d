//! Ranking infrastructure for litrank
//!
//! This crate provides:
//! - `normalize`: min-max score normalization
//! - `fuser`: Fuser trait and weighted-sum fusion
//! - `hybrid`: HybridSearch branch orchestration over the core seam traits
//! - `relevance`: topic-interest scoring of works
//!
//! # Usage
//!
//! ```ignore
//! use litrank_search::HybridSearch;
//!
//! let search = HybridSearch::new(embedder, store.clone(), store);
//! let hits = search.search("coral reef resilience", 10, None, SearchMode::Hybrid)?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod fuser;
pub mod hybrid;
pub mod normalize;
pub mod relevance;

pub use fuser::{FusedResult, Fuser, WeightedSumFuser};
pub use hybrid::{HybridSearch, DEFAULT_OVERFETCH_FACTOR};
pub use normalize::{normalize, normalize_hits};
pub use relevance::{score_by_topics, topic_relevance};
