//! Bibliographic records
//!
//! - Work: immutable record for one publication
//! - ScoredWork: a Work paired with a validated relevance score in [0, 1]
//! - SummarizedWork: a Work paired with a generated summary

use crate::error::{Error, Result};
use crate::types::{TopicAssignment, TopicId, WorkId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

/// Maximum number of authors kept per work
pub const MAX_AUTHORS: usize = 3;

// ============================================================================
// Work
// ============================================================================

/// An immutable bibliographic record
///
/// Works are value objects: cheap to clone, owned by whichever pipeline
/// stage currently holds them. Only the first [`MAX_AUTHORS`] authors are
/// kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Work {
    id: WorkId,
    title: String,
    authors: Vec<String>,
    abstract_text: Option<String>,
    topics: BTreeMap<TopicId, TopicAssignment>,
    publication_date: NaiveDate,
    created_date: NaiveDate,
    cited_by_count: u32,
}

impl Work {
    /// Create a work with the required fields
    ///
    /// `created_date` defaults to the publication date.
    pub fn new(id: WorkId, title: impl Into<String>, publication_date: NaiveDate) -> Self {
        Work {
            id,
            title: title.into(),
            authors: Vec::new(),
            abstract_text: None,
            topics: BTreeMap::new(),
            publication_date,
            created_date: publication_date,
            cited_by_count: 0,
        }
    }

    /// Builder: set authors (truncated to the first three)
    pub fn with_authors<I, S>(mut self, authors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.authors = authors.into_iter().take(MAX_AUTHORS).map(Into::into).collect();
        self
    }

    /// Builder: set abstract
    pub fn with_abstract(mut self, text: impl Into<String>) -> Self {
        self.abstract_text = Some(text.into());
        self
    }

    /// Builder: attach a topic
    pub fn with_topic(mut self, id: TopicId, assignment: TopicAssignment) -> Self {
        self.topics.insert(id, assignment);
        self
    }

    /// Builder: set the date the record was created upstream
    pub fn with_created_date(mut self, date: NaiveDate) -> Self {
        self.created_date = date;
        self
    }

    /// Builder: set citation count
    pub fn with_cited_by_count(mut self, count: u32) -> Self {
        self.cited_by_count = count;
        self
    }

    /// Source-assigned identifier
    pub fn id(&self) -> WorkId {
        self.id
    }

    /// Title
    pub fn title(&self) -> &str {
        &self.title
    }

    /// First authors, in source order
    pub fn authors(&self) -> &[String] {
        &self.authors
    }

    /// Abstract, if the source provided one
    pub fn abstract_text(&self) -> Option<&str> {
        self.abstract_text.as_deref()
    }

    /// True if the work carries a non-blank abstract
    pub fn has_text(&self) -> bool {
        self.abstract_text
            .as_deref()
            .map(|t| !t.trim().is_empty())
            .unwrap_or(false)
    }

    /// Topics attached to this work
    pub fn topics(&self) -> &BTreeMap<TopicId, TopicAssignment> {
        &self.topics
    }

    /// Publication date
    pub fn publication_date(&self) -> NaiveDate {
        self.publication_date
    }

    /// Upstream creation date
    pub fn created_date(&self) -> NaiveDate {
        self.created_date
    }

    /// Number of citing works
    pub fn cited_by_count(&self) -> u32 {
        self.cited_by_count
    }

    /// Canonical OpenAlex URL
    pub fn openalex_url(&self) -> String {
        format!("https://openalex.org/{}", self.id)
    }

    /// Text used for lexical indexing: title followed by abstract
    pub fn searchable_text(&self) -> String {
        match &self.abstract_text {
            Some(text) => format!("{}\n{}", self.title, text),
            None => self.title.clone(),
        }
    }
}

impl fmt::Display for Work {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "'{}' by [{}] ({})",
            self.title,
            self.authors.join(", "),
            self.openalex_url()
        )
    }
}

// ============================================================================
// ScoredWork
// ============================================================================

/// A work with a relevance score in [0, 1]
///
/// Ordering compares scores only: two different works with equal scores
/// compare as equal. This is a weak order, not identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredWork {
    work: Work,
    score: f32,
}

impl ScoredWork {
    /// Pair a work with a score
    ///
    /// # Errors
    /// Returns `Error::InvalidScore` if `score` is NaN or outside [0, 1].
    pub fn new(work: Work, score: f32) -> Result<Self> {
        if !(0.0..=1.0).contains(&score) {
            return Err(Error::InvalidScore(score));
        }
        // -0.0 + 0.0 == +0.0, keeps total_cmp consistent with ==
        Ok(ScoredWork {
            work,
            score: score + 0.0,
        })
    }

    /// The scored work
    pub fn work(&self) -> &Work {
        &self.work
    }

    /// Relevance score in [0, 1]
    pub fn score(&self) -> f32 {
        self.score
    }

    /// Drop the score
    pub fn into_work(self) -> Work {
        self.work
    }
}

impl PartialEq for ScoredWork {
    fn eq(&self, other: &Self) -> bool {
        self.score == other.score
    }
}

impl Eq for ScoredWork {}

impl PartialOrd for ScoredWork {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScoredWork {
    fn cmp(&self, other: &Self) -> Ordering {
        self.score.total_cmp(&other.score)
    }
}

impl fmt::Display for ScoredWork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Score: {:.3} - {}", self.score, self.work)
    }
}

// ============================================================================
// SummarizedWork
// ============================================================================

/// A work with a generated, reader-facing summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummarizedWork {
    /// The summarized work
    pub work: Work,
    /// Generated summary text
    pub summary: String,
}

impl SummarizedWork {
    /// Pair a work with its summary
    pub fn new(work: Work, summary: impl Into<String>) -> Self {
        SummarizedWork {
            work,
            summary: summary.into(),
        }
    }
}
