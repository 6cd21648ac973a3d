//! Retrieval Comprehensive Test Suite
//!
//! End-to-end tests through the `Litrank` facade with deterministic local
//! collaborators standing in for the embedding and chat endpoints.
//!
//! ## Test Organization
//!
//! - `facade_tests.rs` - ingestion, retrieval modes, reranking, persistence
//! - `profile_tests.rs` - topic matching, profiles, topic scoring, summaries
//! - `test_utils.rs` - collaborators, corpus, tracing setup

mod facade_tests;
mod profile_tests;
mod test_utils;
