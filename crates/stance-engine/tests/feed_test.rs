//! Submissions and the topic feed.

mod common;

use uuid::Uuid;

use stance_engine::EngineError;
use stance_types::api::{FeedItem, NewCuratorApplication, NewEvent};
use stance_types::models::{Payload, PayloadKind};

use common::{actor, argument, curator, date, engine, source, quote, submit_quote, topic};

fn new_event(link: &str, y: i32, m: u32, d: u32) -> NewEvent {
    NewEvent {
        title: "Balsavimo internetu koncepcijos patvirtinimas".into(),
        source_link: link.into(),
        timestamp: date(y, m, d),
    }
}

#[test]
fn approved_feed_groups_consecutive_quotes_by_source() {
    let engine = engine();
    let topic = topic(&engine);
    let curator = curator(&engine, &topic);
    let adomenas = actor(&engine);
    let other = engine.create_actor("Andrius", "Kubilius", "seimo narys").unwrap();

    let (event_post, event) = engine
        .submit_event(curator, topic.id, new_event("http://www.lrs.lt/1", 2006, 11, 26))
        .unwrap();
    let (first, _) = submit_quote(
        &engine,
        curator,
        &topic,
        &adomenas,
        "http://kauno.diena.lt/a",
        "Nepasiduokime paranojai.",
        vec![argument(1.0, false, "šiuolaikiška, modernu")],
    );
    let (second, _) = submit_quote(
        &engine,
        curator,
        &topic,
        &adomenas,
        "http://kauno.diena.lt/a",
        "Balsavimas internetu yra neišvengiamas.",
        vec![argument(1.0, false, "didesnis aktyvumas")],
    );
    let (third, _) = engine
        .submit_quote(
            curator,
            topic.id,
            stance_types::api::NewSource {
                actor_id: other.id,
                source_link: "http://lrt.lt/b".into(),
                timestamp: date(2015, 5, 1),
            },
            quote("Rizika per didelė."),
            vec![argument(-1.0, false, "balsų pirkimas")],
        )
        .unwrap();

    // Pending posts stay out of the public listing.
    engine
        .submit_event(Uuid::new_v4(), topic.id, new_event("http://lrs.lt/2", 2017, 1, 1))
        .unwrap();

    let feed = engine.topic_feed(topic.id, false).unwrap();
    assert_eq!(feed.len(), 3);

    let FeedItem::Quotes { source, actor, quotes } = &feed[0] else {
        panic!("expected quote group, got {:?}", feed[0]);
    };
    assert_eq!(actor.id, adomenas.id);
    assert_eq!(source.source_title, "kauno.diena.lt");
    assert_eq!(source.actor_title, "seimo narys");
    assert!((source.position - 1.0).abs() < 1e-9);
    let ids: Vec<Uuid> = quotes.iter().map(|q| q.post.id).collect();
    assert_eq!(ids, vec![second.id, first.id]);
    assert_eq!(quotes[0].arguments.len(), 1);
    assert_eq!(quotes[0].arguments[0].title, "didesnis aktyvumas");

    let FeedItem::Quotes { quotes, .. } = &feed[1] else {
        panic!("expected quote group, got {:?}", feed[1]);
    };
    assert_eq!(quotes.len(), 1);
    assert_eq!(quotes[0].post.id, third.id);

    let FeedItem::Event { post, event: shown } = &feed[2] else {
        panic!("expected event, got {:?}", feed[2]);
    };
    assert_eq!(post.id, event_post.id);
    assert_eq!(shown.id, event.id);
    assert_eq!(shown.source_title, "lrs.lt");
}

#[test]
fn queue_lists_pending_posts_newest_first() {
    let engine = engine();
    let topic = topic(&engine);
    let applicant = Uuid::new_v4();

    let (event_post, _) = engine
        .submit_event(Uuid::new_v4(), topic.id, new_event("http://lrs.lt/3", 2010, 1, 1))
        .unwrap();
    let (application_post, _) = engine
        .submit_curator_application(
            applicant,
            topic.id,
            NewCuratorApplication { title: "mokytojas".into(), photo: None },
        )
        .unwrap();

    let queue = engine.topic_feed(topic.id, true).unwrap();
    assert_eq!(queue.len(), 2);
    assert!(matches!(&queue[0], FeedItem::CuratorApplication { post, .. } if post.id == application_post.id));
    assert!(matches!(&queue[1], FeedItem::Event { post, .. } if post.id == event_post.id));

    // Approving moves the event out of the queue and into the listing.
    engine.record_curator_vote(Uuid::new_v4(), event_post.id, 1).unwrap();
    assert_eq!(engine.topic_feed(topic.id, true).unwrap().len(), 1);
    assert_eq!(engine.topic_feed(topic.id, false).unwrap().len(), 1);

    // Approved applications never show in the public listing.
    engine.record_curator_vote(Uuid::new_v4(), application_post.id, 1).unwrap();
    assert!(engine.topic_feed(topic.id, true).unwrap().is_empty());
    assert_eq!(engine.topic_feed(topic.id, false).unwrap().len(), 1);
}

#[test]
fn events_are_shared_by_link() {
    let engine = engine();
    let topic = topic(&engine);

    let (first_post, first) = engine
        .submit_event(Uuid::new_v4(), topic.id, new_event("http://lrs.lt/4", 2006, 11, 26))
        .unwrap();
    let (second_post, second) = engine
        .submit_event(Uuid::new_v4(), topic.id, new_event("http://lrs.lt/4", 2007, 1, 1))
        .unwrap();

    assert_eq!(first.id, second.id);
    assert_ne!(first_post.id, second_post.id);
    assert_eq!(second_post.timestamp, date(2006, 11, 26));
    assert_eq!(second_post.payload, Payload::Event(first.id));
    assert_eq!(second_post.payload.kind(), PayloadKind::Event);
}

#[test]
fn sources_are_shared_per_actor_and_link() {
    let engine = engine();
    let topic = topic(&engine);
    let first_actor = actor(&engine);
    let second_actor = engine.create_actor("Ingrida", "Šimonytė", "").unwrap();
    let user = Uuid::new_v4();

    let (_, a) = submit_quote(&engine, user, &topic, &first_actor, "http://lrt.lt/s", "a", vec![]);
    let (_, b) = submit_quote(&engine, user, &topic, &first_actor, "http://lrt.lt/s", "b", vec![]);
    let (_, c) = submit_quote(&engine, user, &topic, &second_actor, "http://lrt.lt/s", "c", vec![]);
    assert_eq!(a.source_id, b.source_id);
    assert_ne!(a.source_id, c.source_id);
}

#[test]
fn quote_post_carries_actor_and_source_time() {
    let engine = engine();
    let topic = engine.create_topic("Internet voting", "Balsavimas internetu").unwrap();
    let actor = actor(&engine);

    let (post, quote) = submit_quote(&engine, Uuid::new_v4(), &topic, &actor, "http://lrt.lt/t", "q", vec![]);
    assert_eq!(post.actor_id, Some(actor.id));
    assert_eq!(post.timestamp, date(2016, 3, 22));
    assert_eq!(post.body, "Balsavimas internetu");
    assert_eq!(post.payload, Payload::Quote(quote.id));
}

#[test]
fn submissions_to_unknown_targets_fail() {
    let engine = engine();
    let topic = topic(&engine);
    let actor = actor(&engine);

    assert!(matches!(
        engine.submit_event(Uuid::new_v4(), Uuid::new_v4(), new_event("http://lrs.lt/5", 2010, 1, 1)),
        Err(EngineError::NotFound { entity: "topic", .. })
    ));

    let mut missing = source(&actor, "http://lrt.lt/u");
    missing.actor_id = Uuid::new_v4();
    assert!(matches!(
        engine.submit_quote(Uuid::new_v4(), topic.id, missing, quote("q"), vec![]),
        Err(EngineError::NotFound { entity: "actor", .. })
    ));

    // Nothing was stored by the failed submissions.
    assert!(engine.topic_feed(topic.id, true).unwrap().is_empty());
}

#[test]
fn feed_serializes_with_type_tags() {
    let engine = engine();
    let topic = topic(&engine);
    engine
        .submit_event(Uuid::new_v4(), topic.id, new_event("http://lrs.lt/6", 2010, 1, 1))
        .unwrap();

    let queue = engine.topic_feed(topic.id, true).unwrap();
    let json = serde_json::to_value(&queue).unwrap();
    assert_eq!(json[0]["type"], "event");
    assert_eq!(json[0]["data"]["event"]["source_title"], "lrs.lt");
}
