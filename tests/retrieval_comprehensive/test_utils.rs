//! Shared helpers: deterministic collaborators and a small corpus

#![allow(dead_code)]

use chrono::NaiveDate;
use litrank::{
    Collaborators, ComparisonOracle, CompletionProvider, Embedder, Litrank, LitrankConfig,
    Message, ModelTier, RerankCandidate, Result, Topic, TopicAssignment, TopicId,
    TopicWorkSource, Work, WorkId,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};

static INIT_TRACING: Once = Once::new();

/// Route engine logs through the test harness' captured output
pub fn init_tracing() {
    INIT_TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .try_init();
    });
}

// ============================================================================
// Collaborators
// ============================================================================

pub const VOCAB: &[&str] = &[
    "coral", "reef", "bleaching", "wireless", "routing", "mesh", "social", "media",
    "adolescents", "ocean", "acidification", "carbonate",
];

/// One dimension per vocabulary word, holding its count
pub struct KeywordEmbedder;

impl Embedder for KeywordEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let lower = text.to_lowercase();
        let words: Vec<&str> = lower
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .collect();
        Ok(VOCAB
            .iter()
            .map(|v| words.iter().filter(|w| *w == v).count() as f32)
            .collect())
    }
}

/// Prefers candidates mentioning `keyword` most often, then lower ids
pub struct KeywordOracle {
    keyword: &'static str,
    calls: AtomicUsize,
}

impl KeywordOracle {
    pub fn new(keyword: &'static str) -> Self {
        KeywordOracle {
            keyword,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ComparisonOracle for KeywordOracle {
    fn compare(&self, _query: &str, candidates: &[RerankCandidate]) -> Result<Vec<WorkId>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut ranked: Vec<(usize, WorkId)> = candidates
            .iter()
            .map(|c| (c.text.to_lowercase().matches(self.keyword).count(), c.id))
            .collect();
        ranked.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
        Ok(ranked.into_iter().map(|(_, id)| id).collect())
    }
}

/// Aligns every description to `aligned` and answers summaries with a
/// reasoning-structure JSON whose final answer is the abstract's first word
pub struct ScriptedCompleter {
    aligned: &'static str,
    calls: AtomicUsize,
}

impl ScriptedCompleter {
    pub fn new(aligned: &'static str) -> Self {
        ScriptedCompleter {
            aligned,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl CompletionProvider for ScriptedCompleter {
    fn complete(&self, messages: &[Message], _tier: ModelTier) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let system = &messages[0].content;
        if system.contains("Description of the area of research") {
            let first = messages[1]
                .content
                .split_whitespace()
                .next()
                .unwrap_or_default()
                .to_string();
            Ok(format!(
                "```json\n{{\"Reasoning Structure\": {{\"FINAL_ANSWER\": \"{}\"}}}}\n```",
                first
            ))
        } else {
            Ok(self.aligned.to_string())
        }
    }
}

/// Lists works of a fixed corpus by any of their topics, newest first
pub struct CorpusSource {
    works: Vec<Work>,
    requests: Mutex<Vec<(Vec<TopicId>, bool)>>,
}

impl CorpusSource {
    pub fn new(works: Vec<Work>) -> Self {
        CorpusSource {
            works,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Requested topics and `require_abstract` flag of every call
    pub fn requests(&self) -> Vec<(Vec<TopicId>, bool)> {
        self.requests.lock().unwrap().clone()
    }
}

impl TopicWorkSource for CorpusSource {
    fn works_by_topics(
        &self,
        topics: &[TopicId],
        published_after: NaiveDate,
        require_abstract: bool,
        limit: Option<usize>,
    ) -> Result<Vec<Work>> {
        self.requests
            .lock()
            .unwrap()
            .push((topics.to_vec(), require_abstract));
        let mut listed: Vec<Work> = self
            .works
            .iter()
            .filter(|w| topics.iter().any(|t| w.topics().contains_key(t)))
            .filter(|w| w.publication_date() >= published_after)
            .filter(|w| !require_abstract || w.abstract_text().is_some())
            .cloned()
            .collect();
        listed.sort_by(|a, b| b.publication_date().cmp(&a.publication_date()));
        listed.truncate(limit.unwrap_or(usize::MAX));
        Ok(listed)
    }
}

pub struct Harness {
    pub engine: Litrank,
    pub oracle: Arc<KeywordOracle>,
    pub completer: Arc<ScriptedCompleter>,
    pub source: Arc<CorpusSource>,
}

/// Deterministic collaborators over [`corpus`]
pub fn keyword_collaborators() -> (
    Collaborators,
    Arc<KeywordOracle>,
    Arc<ScriptedCompleter>,
    Arc<CorpusSource>,
) {
    let oracle = Arc::new(KeywordOracle::new("bleaching"));
    let completer = Arc::new(ScriptedCompleter::new("ocean acidification carbonate"));
    let source = Arc::new(CorpusSource::new(corpus()));
    let collaborators = Collaborators {
        embedder: Arc::new(KeywordEmbedder),
        completer: completer.clone(),
        oracle: oracle.clone(),
        works: source.clone(),
    };
    (collaborators, oracle, completer, source)
}

/// Config sized for `KeywordEmbedder`
pub fn test_config() -> LitrankConfig {
    let mut config = LitrankConfig::default();
    config.embedding.dimensions = VOCAB.len();
    config.embedding.ingest_chunk_size = 3;
    config
}

pub fn harness_with(config: LitrankConfig) -> Harness {
    init_tracing();
    let (collaborators, oracle, completer, source) = keyword_collaborators();
    let engine = Litrank::in_memory(config, collaborators).unwrap();
    Harness {
        engine,
        oracle,
        completer,
        source,
    }
}

pub fn harness() -> Harness {
    harness_with(test_config())
}

// ============================================================================
// Corpus
// ============================================================================

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub const REEF_TOPIC: u32 = 10017;
pub const NETWORK_TOPIC: u32 = 10100;
pub const MEDIA_TOPIC: u32 = 10200;
pub const OCEAN_TOPIC: u32 = 10300;

/// Eight works over four topics
pub fn corpus() -> Vec<Work> {
    let rows: [(u64, &str, &str, NaiveDate, u32, f32); 8] = [
        (1, "Reef decline", "Coral reef decline measured over a decade.", date(2023, 5, 1), REEF_TOPIC, 0.95),
        (2, "Bleaching events", "Coral bleaching events recur; bleaching spreads across the reef.", date(2024, 2, 1), REEF_TOPIC, 0.9),
        (3, "Mesh routing", "Wireless mesh routing metrics compared.", date(2024, 3, 1), NETWORK_TOPIC, 0.85),
        (4, "Teens online", "Social media use among adolescents surveyed.", date(2024, 4, 1), MEDIA_TOPIC, 0.8),
        (5, "Reef recovery", "Coral reef recovery after bleaching.", date(2024, 6, 1), REEF_TOPIC, 0.7),
        (6, "Ad hoc networks", "Wireless routing in ad hoc networks.", date(2022, 1, 1), NETWORK_TOPIC, 0.9),
        (7, "Acid seas", "Ocean acidification lowers carbonate saturation.", date(2023, 9, 1), OCEAN_TOPIC, 0.88),
        (8, "Reefs in acid seas", "Ocean acidification stresses coral reef growth.", date(2024, 1, 1), OCEAN_TOPIC, 0.6),
    ];
    rows.iter()
        .map(|(id, title, abstract_text, published, topic, score)| {
            Work::new(WorkId::new(*id), *title, *published)
                .with_authors(["R. Author", "S. Author"])
                .with_abstract(*abstract_text)
                .with_topic(TopicId::new(*topic), TopicAssignment::new("topic", *score))
        })
        .collect()
}

/// Catalogue of the four corpus topics, embedded from their descriptions
pub fn add_catalogue(engine: &Litrank) {
    for (id, name, description) in [
        (REEF_TOPIC, "Coral Reefs", "coral reef bleaching"),
        (NETWORK_TOPIC, "Mesh Networks", "wireless mesh routing"),
        (MEDIA_TOPIC, "Social Media", "social media adolescents"),
        (OCEAN_TOPIC, "Ocean Chemistry", "ocean acidification carbonate"),
    ] {
        engine
            .add_topic(Topic::new(TopicId::new(id), name).with_description(description))
            .unwrap();
    }
}

pub fn ids(works: &[Work]) -> Vec<u64> {
    works.iter().map(|w| w.id().as_u64()).collect()
}
