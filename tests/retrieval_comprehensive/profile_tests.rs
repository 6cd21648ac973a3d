//! Topic matching, user profiles, topic scoring and summaries

use crate::test_utils::*;
use litrank::{Error, FollowedTopic, SearchMode, TopicAssignment, TopicId, Work, WorkId};

fn with_catalogue(h: &Harness) {
    add_catalogue(&h.engine);
}

// ============================================================================
// Topic Matching
// ============================================================================

#[test]
fn test_match_topics_without_alignment() {
    let h = harness();
    with_catalogue(&h);
    let matched = h.engine.match_topics("coral reef health", 2, false).unwrap();
    assert_eq!(matched.description, "coral reef health");
    assert_eq!(matched.topics.len(), 2);
    assert_eq!(matched.topics[0].0.id, TopicId::new(REEF_TOPIC));
    assert_eq!(h.completer.calls(), 0);
}

#[test]
fn test_area_of_interest_with_alignment() {
    let h = harness();
    with_catalogue(&h);
    h.engine.profiles().create_user("ana", "Ana", None).unwrap();

    let version = h
        .engine
        .set_area_of_interest("ana", "my lab measures pH in seawater", 1, true)
        .unwrap();
    assert_eq!(version, 2);
    assert_eq!(h.completer.calls(), 1);

    let active = h.engine.profiles().active("ana").unwrap();
    assert_eq!(active.version, 2);
    assert_eq!(
        active.area_of_interest.as_deref(),
        Some("ocean acidification carbonate")
    );
    assert_eq!(active.followed_topics.len(), 1);
    assert_eq!(active.followed_topics[0].topic_id, TopicId::new(OCEAN_TOPIC));
}

#[test]
fn test_area_of_interest_for_unknown_user_makes_no_calls() {
    let h = harness();
    with_catalogue(&h);
    let result = h.engine.set_area_of_interest("nobody", "coral", 1, true);
    assert!(matches!(result, Err(Error::InvalidInput(_))));
    assert_eq!(h.completer.calls(), 0);
}

// ============================================================================
// Topic Scoring
// ============================================================================

#[test]
fn test_score_for_user_orders_by_followed_topics() {
    let h = harness();
    h.engine.profiles().create_user("ana", "Ana", None).unwrap();
    h.engine
        .profiles()
        .set_followed_topics("ana", vec![FollowedTopic::new(TopicId::new(REEF_TOPIC), 1.0)])
        .unwrap();

    let scored = h.engine.score_for_user("ana", corpus()).unwrap();
    assert_eq!(scored.len(), 8);
    let order: Vec<u64> = scored.iter().map(|s| s.work().id().as_u64()).collect();
    assert_eq!(order, vec![1, 2, 5, 3, 4, 6, 7, 8]);
    assert!((scored[0].score() - 0.95).abs() < 1e-6);
    assert!(scored[3..].iter().all(|s| s.score() == 0.0));
}

#[test]
fn test_score_for_user_skips_corrupt_topic_scores() {
    let h = harness();
    h.engine.profiles().create_user("ana", "Ana", None).unwrap();
    h.engine
        .profiles()
        .set_followed_topics("ana", vec![FollowedTopic::new(TopicId::new(REEF_TOPIC), 1.0)])
        .unwrap();

    let corrupt = Work::new(WorkId::new(99), "Corrupt", date(2024, 1, 1)).with_topic(
        TopicId::new(REEF_TOPIC),
        TopicAssignment::new("Coral Reefs", REEF_TOPIC as f32),
    );
    let mut works = corpus();
    works.push(corrupt);

    let scored = h.engine.score_for_user("ana", works).unwrap();
    assert_eq!(scored.len(), 8);
    assert!(scored.iter().all(|s| s.work().id() != WorkId::new(99)));
}

#[test]
fn test_removing_followed_topic_zeroes_scores() {
    let h = harness();
    let profiles = h.engine.profiles();
    profiles.create_user("ana", "Ana", None).unwrap();
    profiles
        .set_followed_topics(
            "ana",
            vec![
                FollowedTopic::new(TopicId::new(REEF_TOPIC), 1.0),
                FollowedTopic::new(TopicId::new(OCEAN_TOPIC), 0.5),
            ],
        )
        .unwrap();
    profiles
        .remove_followed_topic("ana", TopicId::new(REEF_TOPIC))
        .unwrap();

    let scored = h.engine.score_for_user("ana", corpus()).unwrap();
    assert_eq!(scored[0].work().id(), WorkId::new(7));
    assert!((scored[0].score() - 0.44).abs() < 1e-6);
    assert!(scored
        .iter()
        .filter(|s| s.work().topics().contains_key(&TopicId::new(REEF_TOPIC)))
        .all(|s| s.score() == 0.0));
    assert_eq!(profiles.history("ana").unwrap().len(), 3);
}

// ============================================================================
// Summaries
// ============================================================================

#[test]
fn test_retrieve_then_summarize() {
    let h = harness();
    h.engine.ingest(corpus()).unwrap();
    let works = h
        .engine
        .retrieve_with("social media", 1, None, SearchMode::Lexical, false)
        .unwrap();
    assert_eq!(works.len(), 1);

    let summaries = h.engine.summarize("adolescent wellbeing", &works).unwrap();
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].work.id(), WorkId::new(4));
    assert_eq!(summaries[0].summary, "Social");
}
