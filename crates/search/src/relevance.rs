//! Topic-interest relevance
//!
//! Scores works against the topics a user follows: each followed topic the
//! work carries contributes `topic_score × user_relevance`, and the sum is
//! divided by the number of matches that were possible at all,
//! `min(#followed, #work topics)`.

use litrank_core::{validate_topics, FollowedTopic, ScoredWork, TopicIssue, Work};

fn issue_topic(issue: &TopicIssue) -> litrank_core::TopicId {
    match issue {
        TopicIssue::ScoreIsTopicId(id) => *id,
        TopicIssue::InvalidScore(id, _) => *id,
    }
}

/// Relevance of one work, or `None` if a followed topic on it is corrupt
pub fn topic_relevance(work: &Work, followed: &[FollowedTopic]) -> Option<f32> {
    let issues = validate_topics(work.topics());
    if issues
        .iter()
        .any(|i| followed.iter().any(|f| f.topic_id == issue_topic(i)))
    {
        return None;
    }

    let possible = followed.len().min(work.topics().len());
    if possible == 0 {
        return Some(0.0);
    }
    let sum: f32 = followed
        .iter()
        .filter_map(|f| {
            work.topics()
                .get(&f.topic_id)
                .map(|assignment| assignment.score * f.relevance)
        })
        .sum();
    Some((sum / possible as f32).clamp(0.0, 1.0))
}

/// Score every work by the user's followed topics
///
/// Works whose followed topics carry corrupt scores are skipped and logged.
/// The returned list keeps input order.
pub fn score_by_topics(works: Vec<Work>, followed: &[FollowedTopic]) -> Vec<ScoredWork> {
    let mut scored = Vec::with_capacity(works.len());
    for work in works {
        let Some(score) = topic_relevance(&work, followed) else {
            tracing::info!(
                target: "litrank::relevance",
                work = %work.id(),
                "Ignoring work with invalid topic score"
            );
            continue;
        };
        match ScoredWork::new(work, score) {
            Ok(sw) => scored.push(sw),
            Err(e) => {
                tracing::warn!(target: "litrank::relevance", error = %e, "Dropping unscorable work");
            }
        }
    }
    scored
}
