//! Topic assignment validation
//!
//! Some upstream records carry a topic whose score field holds the topic id
//! instead of a match score. Such works are corrupt for topic-interest
//! scoring and are reported here rather than silently scored.

use crate::types::{TopicAssignment, TopicId};
use std::collections::BTreeMap;

/// A problem found in a work's topic assignments
#[derive(Debug, Clone, PartialEq)]
pub enum TopicIssue {
    /// The score field equals the numeric topic id
    ScoreIsTopicId(TopicId),
    /// The score is NaN, infinite, or negative
    InvalidScore(TopicId, f32),
}

/// Check a work's topics, returning every issue found
///
/// An empty result means the topics are safe to score.
pub fn validate_topics(topics: &BTreeMap<TopicId, TopicAssignment>) -> Vec<TopicIssue> {
    let mut issues = Vec::new();
    for (id, assignment) in topics {
        let score = assignment.score;
        if !score.is_finite() || score < 0.0 {
            issues.push(TopicIssue::InvalidScore(*id, score));
        } else if id.as_u32() > 1 && score == id.as_u32() as f32 {
            issues.push(TopicIssue::ScoreIsTopicId(*id));
        }
    }
    issues
}
