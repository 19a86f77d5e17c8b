#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use uuid::Uuid;

use stance_db::Database;
use stance_engine::{Engine, EngineConfig};
use stance_types::api::{NewArgument, NewCuratorApplication, NewQuote, NewSource};
use stance_types::models::{Actor, Post, Quote, Topic};

pub fn engine() -> Engine {
    Engine::new(Database::open_in_memory().unwrap(), EngineConfig::default())
}

pub fn date(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
}

pub fn topic(engine: &Engine) -> Topic {
    engine.create_topic("Internet voting", "").unwrap()
}

pub fn actor(engine: &Engine) -> Actor {
    engine.create_actor("Mantas", "Adomėnas", "seimo narys").unwrap()
}

/// A fresh user who holds curator status in `topic`, granted through an
/// application approved by another user's vote.
pub fn curator(engine: &Engine, topic: &Topic) -> Uuid {
    let user = Uuid::new_v4();
    let (post, _) = engine
        .submit_curator_application(
            user,
            topic.id,
            NewCuratorApplication { title: "curator".into(), photo: None },
        )
        .unwrap();
    engine.record_curator_vote(Uuid::new_v4(), post.id, 1).unwrap();
    assert!(engine.is_topic_curator(user, topic.id).unwrap());
    user
}

pub fn argument(position: f64, counterargument: bool, title: &str) -> NewArgument {
    NewArgument {
        title: title.into(),
        position,
        counterargument,
        counterargument_title: None,
    }
}

pub fn source(actor: &Actor, link: &str) -> NewSource {
    NewSource {
        actor_id: actor.id,
        source_link: link.into(),
        timestamp: date(2016, 3, 22),
    }
}

pub fn quote(text: &str) -> NewQuote {
    NewQuote { text: text.into(), reference_link: None }
}

/// Submit a quote as `user` with the given arguments.
pub fn submit_quote(
    engine: &Engine,
    user: Uuid,
    topic: &Topic,
    actor: &Actor,
    link: &str,
    text: &str,
    arguments: Vec<NewArgument>,
) -> (Post, Quote) {
    engine
        .submit_quote(user, topic.id, source(actor, link), quote(text), arguments)
        .unwrap()
}

/// One approved quote post per argument, all from the same source.
pub fn approved_arguments(engine: &Engine, topic: &Topic, args: &[(f64, bool, &str)]) -> Vec<Post> {
    let curator = curator(engine, topic);
    let actor = actor(engine);
    args.iter()
        .enumerate()
        .map(|(i, (position, counter, title))| {
            let (post, _) = submit_quote(
                engine,
                curator,
                topic,
                &actor,
                "http://kauno.diena.lt/a",
                &format!("quote {}", i),
                vec![argument(*position, *counter, title)],
            );
            assert!(post.is_approved());
            post
        })
        .collect()
}
