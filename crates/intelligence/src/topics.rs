//! Matching free-text research interests to catalogue topics
//!
//! Topic embeddings are built from short, formulaic cluster descriptions.
//! A user's own description can optionally be rewritten into that style
//! first (alignment) so that it lands closer to the right topics.

use crate::generate::{run_task, AlignToExamples, CompletionProvider};
use litrank_core::{Embedder, Error, FollowedTopic, Result, Topic};
use litrank_engine::{ProfileLog, TopicStore};
use std::sync::Arc;

/// Default number of topics matched per description
pub const DEFAULT_TOPIC_COUNT: usize = 5;

/// Result of matching a description to topics
#[derive(Debug, Clone, PartialEq)]
pub struct TopicMatch {
    /// Text that was embedded (the aligned text when alignment ran)
    pub description: String,
    /// Nearest topics with cosine similarity, most similar first
    pub topics: Vec<(Topic, f32)>,
}

impl TopicMatch {
    /// Topics as followed-topic entries, similarity becoming relevance
    pub fn followed_topics(&self) -> Vec<FollowedTopic> {
        self.topics
            .iter()
            .map(|(topic, similarity)| FollowedTopic::new(topic.id, *similarity))
            .collect()
    }
}

/// Finds topics for a research description
pub struct TopicMatcher {
    embedder: Arc<dyn Embedder>,
    topics: Arc<TopicStore>,
    completer: Option<Arc<dyn CompletionProvider>>,
}

impl TopicMatcher {
    /// Create a matcher without alignment support
    pub fn new(embedder: Arc<dyn Embedder>, topics: Arc<TopicStore>) -> Self {
        TopicMatcher {
            embedder,
            topics,
            completer: None,
        }
    }

    /// Builder: completion provider used for alignment
    pub fn with_completer(mut self, completer: Arc<dyn CompletionProvider>) -> Self {
        self.completer = Some(completer);
        self
    }

    /// Nearest `n` topics to `description`, optionally aligning it first
    ///
    /// # Errors
    /// - `Error::InvalidInput` if `align` is set but no completer is configured
    /// - `Error::Completion` / `Error::Embedding` from the providers
    pub fn match_topics(&self, description: &str, n: usize, align: bool) -> Result<TopicMatch> {
        let description = if align {
            let completer = self.completer.as_ref().ok_or_else(|| {
                Error::invalid_input("alignment requested but no completion provider configured")
            })?;
            let aligned = run_task(completer.as_ref(), &AlignToExamples::new(description))?;
            tracing::debug!(target: "litrank::topics", aligned = %aligned, "Aligned description");
            aligned
        } else {
            description.to_string()
        };

        let embedding = self.embedder.embed(&description)?;
        let topics = self.topics.nearest(&embedding, n)?;
        tracing::debug!(target: "litrank::topics", matched = topics.len(), n, "Matched topics");
        Ok(TopicMatch {
            description,
            topics,
        })
    }

    /// Match topics for `user` and store them with the description in a new
    /// active profile version; returns that version
    pub fn set_area_of_interest(
        &self,
        profiles: &ProfileLog,
        user: &str,
        description: &str,
        n: usize,
        align: bool,
    ) -> Result<u32> {
        // fail on unknown users before paying for model calls
        profiles.user(user)?;
        let matched = self.match_topics(description, n, align)?;
        profiles.set_area_of_interest(user, &matched.description, matched.followed_topics())
    }
}
