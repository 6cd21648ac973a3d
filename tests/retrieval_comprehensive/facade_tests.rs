//! Ingestion, retrieval and persistence through the facade

use crate::test_utils::*;
use litrank::{
    Error, Litrank, LitrankConfig, SearchMode, TopicId, Work, WorkId, CONFIG_FILE_NAME,
    PROFILES_FILE_NAME, TOPICS_FILE_NAME,
};
use std::collections::HashSet;
use tempfile::TempDir;

// ============================================================================
// Ingestion
// ============================================================================

#[test]
fn test_ingest_then_reingest_is_noop() {
    let h = harness();
    let first = h.engine.ingest(corpus()).unwrap();
    assert_eq!(first.inserted, 8);

    let second = h.engine.ingest(corpus()).unwrap();
    assert_eq!(second.inserted, 0);
    assert_eq!(second.skipped_known, 8);
    assert_eq!(h.engine.store().len(), 8);
}

#[test]
fn test_initialize_for_query_ingests_works_of_matched_topics() {
    let h = harness();
    add_catalogue(&h.engine);

    let (topics, report) = h
        .engine
        .initialize_for_query("coral reef bleaching", date(2024, 1, 1), None, 1)
        .unwrap();
    let topic_ids: Vec<TopicId> = topics.iter().map(|t| t.id).collect();
    assert_eq!(topic_ids, vec![TopicId::new(REEF_TOPIC)]);
    // work 1 is a reef work from 2023
    assert_eq!(report.inserted, 2);
    assert!(h.engine.store().contains(WorkId::new(2)));
    assert!(h.engine.store().contains(WorkId::new(5)));
    assert_eq!(h.engine.store().len(), 2);
    assert_eq!(
        h.source.requests(),
        vec![(vec![TopicId::new(REEF_TOPIC)], true)]
    );

    let again = h
        .engine
        .initialize_for_query("coral reef bleaching", date(2024, 1, 1), None, 1)
        .unwrap()
        .1;
    assert_eq!(again.inserted, 0);
    assert_eq!(again.skipped_known, 2);
}

#[test]
fn test_initialize_for_query_respects_limit() {
    let h = harness();
    add_catalogue(&h.engine);
    let (_, report) = h
        .engine
        .initialize_for_query("coral reef bleaching", date(2023, 1, 1), Some(1), 2)
        .unwrap();
    assert_eq!(report.inserted, 1);
    // newest listed first
    assert!(h.engine.store().contains(WorkId::new(5)));
}

#[test]
fn test_initialize_for_query_without_catalogue_ingests_nothing() {
    let h = harness();
    let (topics, report) = h
        .engine
        .initialize_for_query("coral reef", date(2020, 1, 1), None, 5)
        .unwrap();
    assert!(topics.is_empty());
    assert_eq!(report.inserted, 0);
    assert!(h.engine.store().is_empty());
}

// ============================================================================
// Retrieval
// ============================================================================

#[test]
fn test_default_retrieval_is_hybrid_without_rerank() {
    let h = harness();
    h.engine.ingest(corpus()).unwrap();

    let mut found = ids(&h.engine.retrieve("coral reef", 4, None).unwrap());
    found.sort();
    assert_eq!(found, vec![1, 2, 5, 8]);
    assert_eq!(h.oracle.calls(), 0);
}

#[test]
fn test_retrieval_is_deterministic() {
    let h = harness();
    h.engine.ingest(corpus()).unwrap();
    for mode in [SearchMode::Vector, SearchMode::Lexical, SearchMode::Hybrid] {
        let a = h.engine.retrieve_with("ocean reef", 5, None, mode, false).unwrap();
        let b = h.engine.retrieve_with("ocean reef", 5, None, mode, false).unwrap();
        assert_eq!(ids(&a), ids(&b), "mode {}", mode);
    }
}

#[test]
fn test_min_date_filters_every_mode() {
    let h = harness();
    h.engine.ingest(corpus()).unwrap();
    let cutoff = date(2024, 1, 1);
    for mode in [SearchMode::Vector, SearchMode::Lexical, SearchMode::Hybrid] {
        let works = h
            .engine
            .retrieve_with("wireless routing", 5, Some(cutoff), mode, false)
            .unwrap();
        assert!(works.iter().all(|w| w.publication_date() >= cutoff), "mode {}", mode);
        assert!(!ids(&works).contains(&6), "mode {}", mode);
    }
    let lexical = h
        .engine
        .retrieve_with("wireless routing", 5, Some(cutoff), SearchMode::Lexical, false)
        .unwrap();
    assert_eq!(ids(&lexical), vec![3]);
}

#[test]
fn test_rerank_enabled_in_config() {
    let mut config = test_config();
    config.rerank.enabled = true;
    let h = harness_with(config);
    h.engine.ingest(corpus()).unwrap();

    let works = h.engine.retrieve("coral reef", 1, None).unwrap();
    assert_eq!(ids(&works), vec![2]);
    assert!(h.oracle.calls() > 0);
}

#[test]
fn test_rerank_returns_at_most_n_unique() {
    let h = harness();
    h.engine.ingest(corpus()).unwrap();
    let works = h
        .engine
        .retrieve_with("coral reef ocean", 3, None, SearchMode::Hybrid, true)
        .unwrap();
    assert!(works.len() <= 3);
    let unique: HashSet<u64> = ids(&works).into_iter().collect();
    assert_eq!(unique.len(), works.len());
    assert_eq!(works[0].id(), WorkId::new(2));
}

#[test]
fn test_zero_vector_weight_matches_lexical_order() {
    let mut config = test_config();
    config.search.vector_weight = 0.0;
    config.search.lexical_weight = 1.0;
    let h = harness_with(config);
    h.engine.ingest(corpus()).unwrap();

    let query = "coral reef bleaching";
    let hybrid = h.engine.retrieve_with(query, 2, None, SearchMode::Hybrid, false).unwrap();
    let lexical = h.engine.retrieve_with(query, 2, None, SearchMode::Lexical, false).unwrap();
    assert_eq!(ids(&hybrid), ids(&lexical));
}

#[test]
fn test_invalid_weights_rejected_at_construction() {
    let mut config = test_config();
    config.search.lexical_weight = -0.5;
    let result = Litrank::in_memory(config, keyword_collaborators().0);
    assert!(matches!(result, Err(Error::Config(_))));
}

// ============================================================================
// Persistence
// ============================================================================

fn stored_work(id: u64) -> Work {
    Work::new(WorkId::new(id), format!("Stored work {}", id), date(2024, 5, 1))
        .with_abstract("Coral reef survey.")
}

#[test]
fn test_in_memory_save_is_rejected() {
    let h = harness();
    assert!(matches!(h.engine.save(), Err(Error::InvalidInput(_))));
}

#[test]
fn test_open_writes_config_and_reloads_snapshot() {
    init_tracing();
    let dir = TempDir::new().unwrap();
    let dims = LitrankConfig::default().embedding.dimensions;

    {
        let engine = Litrank::open(dir.path()).unwrap();
        assert!(dir.path().join(CONFIG_FILE_NAME).exists());
        assert!(engine.store().is_empty());
        for id in 1..=3 {
            let mut v = vec![0.0; dims];
            v[id as usize] = 1.0;
            engine.store().insert(stored_work(id), v).unwrap();
        }
        engine.save().unwrap();
    }

    let engine = Litrank::open(dir.path()).unwrap();
    assert_eq!(engine.store().len(), 3);
    assert_eq!(engine.store().get(WorkId::new(2)), Some(stored_work(2)));
    let hits = engine
        .retrieve_with("coral", 3, None, SearchMode::Lexical, false)
        .unwrap();
    assert_eq!(hits.len(), 3);
}

#[test]
fn test_snapshot_dimension_mismatch_is_config_error() {
    let dir = TempDir::new().unwrap();
    {
        let engine = Litrank::open(dir.path()).unwrap();
        let dims = engine.config().embedding.dimensions;
        engine.store().insert(stored_work(1), vec![1.0; dims]).unwrap();
        engine.save().unwrap();
    }

    let mut config = LitrankConfig::default();
    config.embedding.dimensions = 16;
    config.write_to_file(&dir.path().join(CONFIG_FILE_NAME)).unwrap();

    assert!(matches!(Litrank::open(dir.path()), Err(Error::Config(_))));
}

#[test]
fn test_invalid_config_file_fails_open() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join(CONFIG_FILE_NAME),
        "[search]\nvector_weight = -1.0\n",
    )
    .unwrap();
    assert!(matches!(Litrank::open(dir.path()), Err(Error::Config(_))));
}

#[test]
fn test_save_persists_topics_and_profiles() {
    init_tracing();
    let dir = TempDir::new().unwrap();
    test_config()
        .write_to_file(&dir.path().join(CONFIG_FILE_NAME))
        .unwrap();

    {
        let engine = Litrank::open_with(dir.path(), |_, _| keyword_collaborators().0).unwrap();
        add_catalogue(&engine);
        engine.profiles().create_user("ana", "Ana", None).unwrap();
        engine
            .set_area_of_interest("ana", "coral reef health", 1, false)
            .unwrap();
        engine.save().unwrap();
    }
    assert!(dir.path().join(TOPICS_FILE_NAME).exists());
    assert!(dir.path().join(PROFILES_FILE_NAME).exists());

    let engine = Litrank::open_with(dir.path(), |_, _| keyword_collaborators().0).unwrap();
    assert_eq!(engine.topics().len(), 4);
    let matched = engine.match_topics("wireless routing", 1, false).unwrap();
    assert_eq!(matched.topics[0].0.id, TopicId::new(NETWORK_TOPIC));

    let active = engine.profiles().active("ana").unwrap();
    assert_eq!(active.version, 2);
    assert_eq!(active.area_of_interest.as_deref(), Some("coral reef health"));
    assert_eq!(active.followed_topics.len(), 1);
    assert_eq!(active.followed_topics[0].topic_id, TopicId::new(REEF_TOPIC));
}
