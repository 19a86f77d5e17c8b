//! Vote ledger: upsert semantics, tallies, display counts.

mod common;

use chrono::Utc;
use uuid::Uuid;

use stance_engine::EngineError;
use stance_types::api::{NewEvent, VoteTally};

use common::{date, engine, topic};

fn event_post(engine: &stance_engine::Engine) -> stance_types::models::Post {
    let topic = topic(engine);
    let (post, _) = engine
        .submit_event(
            Uuid::new_v4(),
            topic.id,
            NewEvent {
                title: "Internet voting concept approved".into(),
                source_link: "http://www.lrs.lt/sip/portal.show?p_r=1".into(),
                timestamp: date(2006, 11, 26),
            },
        )
        .unwrap();
    post
}

#[test]
fn user_votes_are_upserted() {
    let engine = engine();
    let post = event_post(&engine);

    assert_eq!(engine.tally_user_votes(post.id).unwrap(), VoteTally::new(0, 0));
    assert_eq!(engine.record_user_vote(Uuid::new_v4(), post.id, 1).unwrap(), VoteTally::new(1, 0));
    assert_eq!(engine.record_user_vote(Uuid::new_v4(), post.id, 1).unwrap(), VoteTally::new(2, 0));
    assert_eq!(engine.record_user_vote(Uuid::new_v4(), post.id, -1).unwrap(), VoteTally::new(2, 1));

    // Same user voting several times
    let user = Uuid::new_v4();
    assert_eq!(engine.record_user_vote(user, post.id, 1).unwrap(), VoteTally::new(3, 1));
    assert_eq!(engine.record_user_vote(user, post.id, -1).unwrap(), VoteTally::new(2, 2));
    assert_eq!(engine.record_user_vote(user, post.id, -1).unwrap(), VoteTally::new(2, 2));
    assert_eq!(engine.record_user_vote(user, post.id, 1).unwrap(), VoteTally::new(3, 1));
    assert_eq!(engine.tally_user_votes(post.id).unwrap(), VoteTally::new(3, 1));

    let (user_rows, _) = engine.ledger_rows(post.id).unwrap();
    assert_eq!(user_rows, 4);

    let cached = engine.post(post.id).unwrap();
    assert_eq!((cached.upvotes, cached.downvotes), (3, 1));

    let votes = engine.user_topic_votes(user, post.topic_id).unwrap();
    assert_eq!(votes.len(), 1);
    assert_eq!(votes[&post.id], 1);
}

#[test]
fn zero_vote_counts_towards_neither_side() {
    let engine = engine();
    let post = event_post(&engine);

    let user = Uuid::new_v4();
    engine.record_user_vote(user, post.id, 1).unwrap();
    assert_eq!(engine.record_user_vote(user, post.id, 0).unwrap(), VoteTally::new(0, 0));
    assert_eq!(engine.ledger_rows(post.id).unwrap().0, 1);
}

#[test]
fn curator_votes_are_upserted() {
    let engine = engine();
    let post = event_post(&engine);

    assert_eq!(engine.tally_curator_votes(post.id).unwrap(), VoteTally::new(0, 0));
    for (vote, expected) in [(1, (1, 0)), (1, (2, 0)), (-1, (2, 1))] {
        let outcome = engine.record_curator_vote(Uuid::new_v4(), post.id, vote).unwrap();
        assert_eq!(outcome.tally, VoteTally::from(expected));
    }

    let curator = Uuid::new_v4();
    assert_eq!(engine.record_curator_vote(curator, post.id, 1).unwrap().tally, VoteTally::new(3, 1));
    assert_eq!(engine.record_curator_vote(curator, post.id, -1).unwrap().tally, VoteTally::new(2, 2));
    assert_eq!(engine.record_curator_vote(curator, post.id, -1).unwrap().tally, VoteTally::new(2, 2));
    assert_eq!(engine.record_curator_vote(curator, post.id, 1).unwrap().tally, VoteTally::new(3, 1));
    assert_eq!(engine.tally_curator_votes(post.id).unwrap(), VoteTally::new(3, 1));

    // Submission is logged in the same table but is not a vote.
    assert_eq!(engine.ledger_rows(post.id).unwrap().1, 4);

    let votes = engine.curator_topic_votes(curator, post.topic_id).unwrap();
    assert_eq!(votes.len(), 1);
    assert_eq!(votes[&post.id], 1);
}

#[test]
fn voting_on_missing_post_is_not_found() {
    let engine = engine();
    let missing = Uuid::new_v4();

    let err = engine.record_user_vote(Uuid::new_v4(), missing, 1).unwrap_err();
    assert!(matches!(err, EngineError::NotFound { entity: "post", id } if id == missing));

    let err = engine.record_curator_vote(Uuid::new_v4(), missing, 1).unwrap_err();
    assert!(matches!(err, EngineError::NotFound { entity: "post", .. }));

    assert!(matches!(
        engine.tally_user_votes(missing),
        Err(EngineError::NotFound { .. })
    ));
}

#[test]
fn display_votes_tie_breaks_differ_by_state() {
    let engine = engine();
    let post = event_post(&engine);

    // Pending: curator tally, tie shows the negative count.
    engine.record_curator_vote(Uuid::new_v4(), post.id, 1).unwrap();
    engine.record_curator_vote(Uuid::new_v4(), post.id, 1).unwrap();
    engine.record_curator_vote(Uuid::new_v4(), post.id, -1).unwrap();
    engine.record_curator_vote(Uuid::new_v4(), post.id, -1).unwrap();
    assert!(!engine.post(post.id).unwrap().is_approved());
    assert_eq!(engine.display_votes(post.id).unwrap(), -2);

    // Approved: user tally, tie shows the positive count.
    engine.record_curator_vote(Uuid::new_v4(), post.id, 1).unwrap();
    engine.record_user_vote(Uuid::new_v4(), post.id, 1).unwrap();
    engine.record_user_vote(Uuid::new_v4(), post.id, 1).unwrap();
    engine.record_user_vote(Uuid::new_v4(), post.id, -1).unwrap();
    engine.record_user_vote(Uuid::new_v4(), post.id, -1).unwrap();
    let approved = engine.post(post.id).unwrap();
    assert!(approved.approved.is_some_and(|at| at <= Utc::now()));
    assert_eq!(engine.display_votes(post.id).unwrap(), 2);
}
