//! Retrieval engine for litrank
//!
//! This crate provides the stateful parts of the system:
//! - `vector`: brute-force cosine `VectorIndex`
//! - `search`: tokenizer, BM25 and the inverted `LexicalIndex`
//! - `store`: `PublicationStore` tying works to both indices, with snapshots
//! - `topics`: research topic catalogue with embedding lookup
//! - `profile`: versioned user configuration
//! - `snapshot`: versioned bincode files shared by the stateful parts
//! - `config`: `litrank.toml` loading

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod profile;
pub mod search;
pub mod snapshot;
pub mod store;
pub mod topics;
pub mod vector;

pub use config::{
    EmbeddingConfig, LitrankConfig, ModelConfig, OpenAlexConfig, RerankConfig, SearchConfig,
    CONFIG_FILE_NAME,
};
pub use profile::{ProfileLog, ProfileVersion, UserProfile};
pub use search::{Bm25Params, LexicalIndex};
pub use store::PublicationStore;
pub use topics::TopicStore;
pub use vector::VectorIndex;
