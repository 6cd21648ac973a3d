//! Deterministic test doubles for the model-backed seams

use crate::generate::{CompletionProvider, Message, ModelTier};
use crate::rerank::{ComparisonOracle, RerankCandidate};
use litrank_core::{Embedder, Error, Result, WorkId};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Hashed bag-of-words embedder
pub struct MockEmbedder {
    texts: AtomicUsize,
    batches: AtomicUsize,
}

impl MockEmbedder {
    /// Output dimensionality
    pub const DIMENSION: usize = 64;

    pub fn new() -> Self {
        MockEmbedder {
            texts: AtomicUsize::new(0),
            batches: AtomicUsize::new(0),
        }
    }

    pub fn texts_embedded(&self) -> usize {
        self.texts.load(Ordering::SeqCst)
    }

    pub fn batch_calls(&self) -> usize {
        self.batches.load(Ordering::SeqCst)
    }

    fn vectorize(text: &str) -> Vec<f32> {
        let mut v = vec![0.0; Self::DIMENSION];
        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            // FNV-1a
            let mut h: u32 = 0x811c_9dc5;
            for b in word.to_lowercase().bytes() {
                h ^= b as u32;
                h = h.wrapping_mul(0x0100_0193);
            }
            v[h as usize % Self::DIMENSION] += 1.0;
        }
        v
    }
}

impl Embedder for MockEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.texts.fetch_add(1, Ordering::SeqCst);
        Ok(Self::vectorize(text))
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        self.batches.fetch_add(1, Ordering::SeqCst);
        self.texts.fetch_add(texts.len(), Ordering::SeqCst);
        Ok(texts.iter().map(|t| Self::vectorize(t)).collect())
    }
}

/// Completer answering from a closure and recording every call
pub struct MockCompleter {
    reply: Box<dyn Fn(&[Message]) -> Result<String> + Send + Sync>,
    calls: Mutex<Vec<(Vec<Message>, ModelTier)>>,
}

impl MockCompleter {
    pub fn new(reply: impl Fn(&[Message]) -> Result<String> + Send + Sync + 'static) -> Self {
        MockCompleter {
            reply: Box::new(reply),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Always answer `text`
    pub fn replying(text: &str) -> Self {
        let text = text.to_string();
        Self::new(move |_| Ok(text.clone()))
    }

    /// Always fail
    pub fn failing() -> Self {
        Self::new(|_| Err(Error::Completion("model unavailable".into())))
    }

    pub fn calls(&self) -> Vec<(Vec<Message>, ModelTier)> {
        self.calls.lock().unwrap().clone()
    }
}

impl CompletionProvider for MockCompleter {
    fn complete(&self, messages: &[Message], tier: ModelTier) -> Result<String> {
        self.calls.lock().unwrap().push((messages.to_vec(), tier));
        (self.reply)(messages).map(|s| s.trim().to_string())
    }
}

/// Oracle ordering candidates by a fixed scoring function
pub struct ScoreOracle {
    score: Box<dyn Fn(WorkId) -> f32 + Send + Sync>,
    calls: AtomicUsize,
}

impl ScoreOracle {
    pub fn new(score: impl Fn(WorkId) -> f32 + Send + Sync + 'static) -> Self {
        ScoreOracle {
            score: Box::new(score),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ComparisonOracle for ScoreOracle {
    fn compare(&self, _query: &str, candidates: &[RerankCandidate]) -> Result<Vec<WorkId>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut ids: Vec<WorkId> = candidates.iter().map(|c| c.id).collect();
        ids.sort_by(|a, b| {
            (self.score)(*b)
                .partial_cmp(&(self.score)(*a))
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.cmp(b))
        });
        Ok(ids)
    }
}
