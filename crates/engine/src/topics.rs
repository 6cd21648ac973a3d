//! Research topic catalogue with embedding lookup

use crate::snapshot::{read_snapshot, write_snapshot};
use crate::vector::VectorIndex;
use litrank_core::{Result, Topic, TopicId};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Serialize, Deserialize)]
struct CatalogueSnapshot {
    dimension: usize,
    entries: Vec<(Topic, Vec<f32>)>,
}

/// Topics keyed by id, each with an embedding of its description
pub struct TopicStore {
    topics: RwLock<BTreeMap<TopicId, Topic>>,
    vectors: VectorIndex<TopicId>,
}

impl TopicStore {
    /// Create an empty catalogue for embeddings of `dimension` components
    pub fn new(dimension: usize) -> Self {
        TopicStore {
            topics: RwLock::new(BTreeMap::new()),
            vectors: VectorIndex::new(dimension),
        }
    }

    /// Insert or replace a topic and its embedding
    pub fn insert(&self, topic: Topic, embedding: Vec<f32>) -> Result<()> {
        let mut topics = self.topics.write();
        self.vectors.insert(topic.id, embedding, None)?;
        topics.insert(topic.id, topic);
        Ok(())
    }

    /// Look up a topic by id
    pub fn get(&self, id: TopicId) -> Option<Topic> {
        self.topics.read().get(&id).cloned()
    }

    /// Number of topics
    pub fn len(&self) -> usize {
        self.topics.read().len()
    }

    /// True if the catalogue is empty
    pub fn is_empty(&self) -> bool {
        self.topics.read().is_empty()
    }

    /// Embedding dimension
    pub fn dimension(&self) -> usize {
        self.vectors.dimension()
    }

    /// Write every topic and its embedding to `path`
    pub fn save_snapshot(&self, path: &Path) -> Result<()> {
        let entries: Vec<(Topic, Vec<f32>)> = {
            let topics = self.topics.read();
            topics
                .values()
                .filter_map(|t| self.vectors.get(&t.id).map(|v| (t.clone(), v)))
                .collect()
        };
        let count = entries.len();
        write_snapshot(
            path,
            &CatalogueSnapshot {
                dimension: self.dimension(),
                entries,
            },
        )?;
        tracing::debug!(target: "litrank::topics", path = %path.display(), topics = count, "Saved topic catalogue");
        Ok(())
    }

    /// Rebuild a catalogue written by `save_snapshot`
    pub fn load_snapshot(path: &Path) -> Result<Self> {
        let snapshot: CatalogueSnapshot = read_snapshot(path)?;
        let store = TopicStore::new(snapshot.dimension);
        for (topic, embedding) in snapshot.entries {
            store.insert(topic, embedding)?;
        }
        Ok(store)
    }

    /// The `n` topics most similar to `embedding`, with cosine similarity
    pub fn nearest(&self, embedding: &[f32], n: usize) -> Result<Vec<(Topic, f32)>> {
        let hits = self.vectors.nearest(embedding, n, None)?;
        let topics = self.topics.read();
        Ok(hits
            .into_iter()
            .filter_map(|(id, sim)| topics.get(&id).map(|t| (t.clone(), sim)))
            .collect())
    }
}
