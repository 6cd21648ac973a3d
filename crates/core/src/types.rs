//! Identifier and topic types
//!
//! This module defines the foundational types:
//! - WorkId: source-assigned publication identifier
//! - TopicId: source-assigned research topic identifier
//! - TopicAssignment: a topic attached to a work with its match score
//! - Topic: a research topic as stored in the topic index
//! - FollowedTopic: a topic a user follows with a personal relevance

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier of a publication
///
/// Assigned by the bibliographic source (OpenAlex renders it as `W<id>`).
/// Two works with equal ids denote the same real publication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WorkId(u64);

impl WorkId {
    /// Wrap a raw numeric id
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Raw numeric value
    pub const fn as_u64(&self) -> u64 {
        self.0
    }

    /// Parse `W12345`, `12345`, or a URL ending in `/W12345`
    ///
    /// # Errors
    /// Returns None if no numeric id can be extracted.
    pub fn parse(s: &str) -> Option<Self> {
        let tail = s.rsplit('/').next().unwrap_or(s);
        let digits = tail.strip_prefix('W').or_else(|| tail.strip_prefix('w')).unwrap_or(tail);
        digits.parse::<u64>().ok().map(Self)
    }
}

impl fmt::Display for WorkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "W{}", self.0)
    }
}

impl From<u64> for WorkId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// Identifier of a research topic (OpenAlex renders it as `T<id>`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TopicId(u32);

impl TopicId {
    /// Wrap a raw numeric id
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Raw numeric value
    pub const fn as_u32(&self) -> u32 {
        self.0
    }

    /// Parse `T123`, `123`, or a URL ending in `/T123`
    pub fn parse(s: &str) -> Option<Self> {
        let tail = s.rsplit('/').next().unwrap_or(s);
        let digits = tail.strip_prefix('T').or_else(|| tail.strip_prefix('t')).unwrap_or(tail);
        digits.parse::<u32>().ok().map(Self)
    }
}

impl fmt::Display for TopicId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

/// A topic attached to a work, with how well the work matches it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicAssignment {
    /// Human-readable topic name
    pub name: String,
    /// Match score reported by the source, nominally in [0, 1]
    pub score: f32,
}

impl TopicAssignment {
    /// Create a new assignment
    pub fn new(name: impl Into<String>, score: f32) -> Self {
        TopicAssignment {
            name: name.into(),
            score,
        }
    }
}

/// A research topic as held by the topic index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Topic {
    /// Topic identifier
    pub id: TopicId,
    /// Display name
    pub name: String,
    /// Optional longer description (embedded for topic matching)
    pub description: Option<String>,
}

impl Topic {
    /// Create a topic without description
    pub fn new(id: TopicId, name: impl Into<String>) -> Self {
        Topic {
            id,
            name: name.into(),
            description: None,
        }
    }

    /// Builder: set description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// A topic followed by a user, with the user's relevance for it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FollowedTopic {
    /// Followed topic
    pub topic_id: TopicId,
    /// How relevant this topic is for the user
    pub relevance: f32,
}

impl FollowedTopic {
    /// Create a followed topic entry
    pub fn new(topic_id: TopicId, relevance: f32) -> Self {
        FollowedTopic {
            topic_id,
            relevance,
        }
    }
}
