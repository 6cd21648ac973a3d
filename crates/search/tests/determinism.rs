//! Determinism and Consistency Tests
//!
//! Validates that ranking is deterministic: same inputs, same order, with
//! ties always broken by ascending work id.

use chrono::NaiveDate;
use litrank_core::{Embedder, Result, RetrievalMethod, ScoredId, SearchMode, Work, WorkId};
use litrank_engine::PublicationStore;
use litrank_search::{Fuser, HybridSearch, WeightedSumFuser};
use proptest::prelude::*;
use std::sync::Arc;

// ============================================================================
// Test Helpers
// ============================================================================

const VOCAB: &[&str] = &["coral", "reef", "wireless", "routing", "social", "media"];

/// Bag-of-words embedder over a tiny fixed vocabulary
struct VocabEmbedder;

impl Embedder for VocabEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let lower = text.to_lowercase();
        Ok(VOCAB
            .iter()
            .map(|w| lower.matches(w).count() as f32)
            .collect())
    }
}

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

fn populate(store: &PublicationStore) {
    let docs = [
        (1, "coral reef", "coral reef bleaching"),
        (2, "reef fish", "reef fish coral"),
        (3, "wireless routing", "ad hoc wireless routing"),
        (4, "social media", "social media and wellbeing"),
        (5, "coral reef", "coral reef bleaching"),
    ];
    for (id, title, abstract_text) in docs {
        let work = Work::new(WorkId::new(id), title, date()).with_abstract(abstract_text);
        let embedding = VocabEmbedder.embed(abstract_text).unwrap();
        store.insert(work, embedding).unwrap();
    }
}

fn hybrid() -> HybridSearch {
    let store = Arc::new(PublicationStore::new(VOCAB.len()));
    populate(&store);
    HybridSearch::new(Arc::new(VocabEmbedder), store.clone(), store)
}

// ============================================================================
// Search Determinism Tests
// ============================================================================

/// Same request produces identical results
#[test]
fn test_search_deterministic() {
    let search = hybrid();
    for mode in [SearchMode::Vector, SearchMode::Lexical, SearchMode::Hybrid] {
        let r1 = search.search("coral reef", 5, None, mode).unwrap();
        let r2 = search.search("coral reef", 5, None, mode).unwrap();
        assert_eq!(r1, r2, "mode {} should be deterministic", mode);
    }
}

/// Identical documents tie and are ordered by ascending id
#[test]
fn test_identical_documents_tie_by_id() {
    let search = hybrid();
    let hits = search
        .search("coral reef bleaching", 5, None, SearchMode::Hybrid)
        .unwrap();
    assert_eq!(hits[0].id, WorkId::new(1));
    assert_eq!(hits[1].id, WorkId::new(5));
    assert_eq!(hits[0].score, hits[1].score);
}

/// Results are sorted descending by score
#[test]
fn test_results_sorted() {
    let search = hybrid();
    let hits = search.search("coral", 5, None, SearchMode::Hybrid).unwrap();
    for pair in hits.windows(2) {
        assert!(
            pair[0].score > pair[1].score
                || (pair[0].score == pair[1].score && pair[0].id < pair[1].id)
        );
    }
}

// ============================================================================
// Fusion Properties
// ============================================================================

fn branch() -> impl Strategy<Value = Vec<ScoredId>> {
    prop::collection::vec((0u64..40, -10.0f32..10.0), 0..30).prop_map(|v| {
        v.into_iter()
            .map(|(id, s)| ScoredId::new(WorkId::new(id), s))
            .collect()
    })
}

proptest! {
    #[test]
    fn prop_fusion_is_order_independent_of_branch_input(
        vector in branch(),
        lexical in branch(),
        k in 1usize..20,
    ) {
        let fuser = WeightedSumFuser::default();
        let forward = fuser
            .fuse(vec![(RetrievalMethod::Vector, vector.clone()), (RetrievalMethod::Lexical, lexical.clone())], k)
            .unwrap();
        let swapped = fuser
            .fuse(vec![(RetrievalMethod::Lexical, lexical), (RetrievalMethod::Vector, vector)], k)
            .unwrap();
        prop_assert_eq!(forward, swapped);
    }

    #[test]
    fn prop_fusion_ignores_order_within_a_branch(
        (vector, vector_shuffled) in branch().prop_flat_map(|v| (Just(v.clone()), Just(v).prop_shuffle())),
        (lexical, lexical_shuffled) in branch().prop_flat_map(|v| (Just(v.clone()), Just(v).prop_shuffle())),
        k in 1usize..20,
    ) {
        let fuser = WeightedSumFuser::default();
        let original = fuser
            .fuse(vec![(RetrievalMethod::Vector, vector), (RetrievalMethod::Lexical, lexical)], k)
            .unwrap();
        let shuffled = fuser
            .fuse(vec![(RetrievalMethod::Vector, vector_shuffled), (RetrievalMethod::Lexical, lexical_shuffled)], k)
            .unwrap();
        prop_assert_eq!(original, shuffled);
    }

    #[test]
    fn prop_agreement_never_lowers_a_score(
        vector in branch(),
        lexical in branch(),
        vector_weight in 0.0f32..5.0,
        lexical_weight in 0.0f32..5.0,
    ) {
        let fuser = WeightedSumFuser::new(vector_weight, lexical_weight).unwrap();
        let scores = |branches: Vec<(RetrievalMethod, Vec<ScoredId>)>| -> std::collections::HashMap<WorkId, f32> {
            fuser
                .fuse(branches, usize::MAX)
                .unwrap()
                .hits
                .into_iter()
                .map(|h| (h.id, h.score))
                .collect()
        };
        let both = scores(vec![
            (RetrievalMethod::Vector, vector.clone()),
            (RetrievalMethod::Lexical, lexical.clone()),
        ]);
        let vector_only = scores(vec![(RetrievalMethod::Vector, vector)]);
        let lexical_only = scores(vec![(RetrievalMethod::Lexical, lexical)]);

        for (id, alone) in vector_only.iter().chain(lexical_only.iter()) {
            prop_assert!(both[id] >= *alone, "{:?}: fused {} < single branch {}", id, both[id], alone);
        }
    }

    #[test]
    fn prop_fused_output_sorted_unique_and_bounded(
        vector in branch(),
        lexical in branch(),
        k in 1usize..20,
    ) {
        let fused = WeightedSumFuser::default()
            .fuse(vec![(RetrievalMethod::Vector, vector), (RetrievalMethod::Lexical, lexical)], k)
            .unwrap();
        prop_assert!(fused.hits.len() <= k);
        let mut seen = std::collections::HashSet::new();
        for hit in &fused.hits {
            prop_assert!(seen.insert(hit.id));
            prop_assert!(hit.score >= 0.0 && hit.score <= 1.0 + 1e-6);
        }
        for pair in fused.hits.windows(2) {
            prop_assert!(
                pair[0].score > pair[1].score
                    || (pair[0].score == pair[1].score && pair[0].id < pair[1].id)
            );
        }
    }
}
