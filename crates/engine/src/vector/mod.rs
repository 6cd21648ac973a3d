//! Dense vector retrieval
//!
//! - `distance`: cosine similarity and helpers
//! - `index`: brute-force `VectorIndex`

pub mod distance;
mod index;

pub use distance::cosine_similarity;
pub use index::VectorIndex;
