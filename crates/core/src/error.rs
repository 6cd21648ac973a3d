//! Error types for litrank
//!
//! This module defines all error types used throughout the system.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.
//!
//! Variants fall into three groups:
//! - precondition violations (caller bugs, never coerced)
//! - upstream failures, tagged by the pipeline stage that failed
//! - ambient failures (config, I/O, serialization)

use crate::types::WorkId;
use std::io;
use thiserror::Error;

/// Result type alias for litrank operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for litrank
#[derive(Debug, Error)]
pub enum Error {
    /// Min-max normalization was asked to scale an empty score list
    #[error("cannot normalize an empty score list")]
    EmptyScores,

    /// A score outside [0, 1] (or NaN) was used to build a ScoredWork
    #[error("score {0} is outside [0.0, 1.0]")]
    InvalidScore(f32),

    /// Fusion weights must both be finite and non-negative
    #[error("invalid fusion weights: vector={vector}, lexical={lexical}")]
    InvalidWeights {
        /// Weight of the dense branch
        vector: f32,
        /// Weight of the lexical branch
        lexical: f32,
    },

    /// A work without text reached a stage that requires it
    #[error("work {0} has no abstract")]
    MissingText(WorkId),

    /// Search mode string not recognized
    #[error("unsupported search mode '{0}' (expected \"vector\", \"lexical\" or \"hybrid\")")]
    UnsupportedSearchMode(String),

    /// Query or stored vector has the wrong dimension
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Dimension of the index
        expected: usize,
        /// Dimension of the offending vector
        actual: usize,
    },

    /// Invalid argument or state
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Embedding provider failed
    #[error("embedding failed: {0}")]
    Embedding(String),

    /// Vector or lexical index failed
    #[error("index error: {0}")]
    Index(String),

    /// Metadata source failed while hydrating ids
    #[error("hydration failed: {0}")]
    Hydration(String),

    /// Comparison oracle failed or returned unusable output
    #[error("rerank failed: {0}")]
    Rerank(String),

    /// Completion provider failed
    #[error("completion failed: {0}")]
    Completion(String),

    /// Configuration could not be read or parsed
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error (snapshot files, config files)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Serialization/deserialization error
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl Error {
    /// Build an `InvalidInput` error from anything displayable
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Error::InvalidInput(msg.into())
    }

    /// True for errors caused by the caller rather than by an upstream system
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            Error::EmptyScores
                | Error::InvalidScore(_)
                | Error::InvalidWeights { .. }
                | Error::MissingText(_)
                | Error::UnsupportedSearchMode(_)
                | Error::DimensionMismatch { .. }
                | Error::InvalidInput(_)
        )
    }
}

impl From<bincode::Error> for Error {
    fn from(e: bincode::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_invalid_score() {
        let err = Error::InvalidScore(1.5);
        let msg = err.to_string();
        assert!(msg.contains("1.5"));
        assert!(msg.contains("[0.0, 1.0]"));
    }

    #[test]
    fn test_error_display_missing_text() {
        let err = Error::MissingText(WorkId::new(42));
        assert!(err.to_string().contains("W42"));
    }

    #[test]
    fn test_error_display_unsupported_mode() {
        let err = Error::UnsupportedSearchMode("fuzzy".into());
        let msg = err.to_string();
        assert!(msg.contains("fuzzy"));
        assert!(msg.contains("hybrid"));
    }

    #[test]
    fn test_error_display_dimension_mismatch() {
        let err = Error::DimensionMismatch {
            expected: 1024,
            actual: 3,
        };
        let msg = err.to_string();
        assert!(msg.contains("1024"));
        assert!(msg.contains('3'));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "snapshot missing");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_precondition_classification() {
        assert!(Error::EmptyScores.is_precondition());
        assert!(Error::MissingText(WorkId::new(1)).is_precondition());
        assert!(!Error::Embedding("timeout".into()).is_precondition());
        assert!(!Error::Hydration("503".into()).is_precondition());
    }
}
