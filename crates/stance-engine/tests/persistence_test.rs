mod common;

use uuid::Uuid;

use stance_db::Database;
use stance_engine::{Engine, EngineConfig};
use stance_types::api::VoteTally;

#[test]
fn ledger_and_approval_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("stance.db");
    let user = Uuid::new_v4();

    let (topic_id, post_id, source_id) = {
        let engine = Engine::new(Database::open(&path).unwrap(), EngineConfig::default());
        let topic = common::topic(&engine);
        let curator = common::curator(&engine, &topic);
        let actor = common::actor(&engine);
        let (post, quote) = common::submit_quote(
            &engine,
            curator,
            &topic,
            &actor,
            "http://lrt.lt/r",
            "q",
            vec![common::argument(-1.0, false, "balsų pirkimas")],
        );
        engine.record_user_vote(user, post.id, 1).unwrap();
        (topic.id, post.id, quote.source_id)
    };

    let engine = Engine::new(Database::open(&path).unwrap(), EngineConfig::default());
    assert!(engine.post(post_id).unwrap().is_approved());
    assert_eq!(engine.tally_user_votes(post_id).unwrap(), VoteTally::new(1, 0));
    assert_eq!(engine.aggregate_source_position(topic_id, source_id).unwrap(), -1.0);

    // Re-voting after reopen still upserts the same ledger row.
    engine.record_user_vote(user, post_id, -1).unwrap();
    assert_eq!(engine.ledger_rows(post_id).unwrap().0, 1);
}
