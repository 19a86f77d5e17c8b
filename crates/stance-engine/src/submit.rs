//! Content submission: events, quotes with their arguments, and curator
//! applications. Each submission wraps its payload in a post and settles the
//! post's initial approval state.

use chrono::{DateTime, Utc};
use rusqlite::Connection;
use tracing::info;
use url::Url;
use uuid::Uuid;

use stance_db::queries::{content, curators, posts, votes};
use stance_db::queries::votes::CuratorAction;
use stance_types::api::{NewArgument, NewCuratorApplication, NewEvent, NewQuote, NewSource, VoteTally};
use stance_types::models::{CuratorApplication, Event, EventKind, Payload, Post, Quote, Source, Topic};

use crate::error::{EngineError, Result};
use crate::{Engine, positions};

/// Display title of a link: its host (and port, if any) without a leading
/// `www.`. Unparseable links are used verbatim.
pub fn source_title_from_link(link: &str) -> String {
    let Ok(url) = Url::parse(link) else {
        return link.to_string();
    };
    let Some(host) = url.host_str() else {
        return link.to_string();
    };
    let host = host.strip_prefix("www.").unwrap_or(host);
    match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    }
}

struct NewPost {
    topic: Topic,
    actor_id: Option<Uuid>,
    timestamp: DateTime<Utc>,
    payload: Payload,
}

impl Engine {
    /// Insert a post and settle its initial approval state: approved with an
    /// implicit +1 curator vote when the submitter curates the topic, pending
    /// otherwise.
    fn create_post(
        &self,
        conn: &Connection,
        user_id: Uuid,
        new: NewPost,
        auto_approve: bool,
        now: DateTime<Utc>,
    ) -> Result<Post> {
        let approve = auto_approve
            && self.config.auto_approve_curator_posts
            && curators::is_topic_curator(conn, user_id, new.topic.id)?;

        let tally = if approve { VoteTally::new(1, 0) } else { VoteTally::default() };
        let post = Post {
            id: Uuid::new_v4(),
            topic_id: new.topic.id,
            actor_id: new.actor_id,
            body: new.topic.default_body.clone(),
            position: 0.0,
            approved: approve.then_some(now),
            upvotes: 0,
            downvotes: 0,
            curator_upvotes: tally.upvotes,
            curator_downvotes: tally.downvotes,
            timestamp: new.timestamp,
            created: now,
            payload: new.payload,
        };
        posts::insert_post(conn, &post)?;
        votes::log_curator_action(conn, user_id, post.id, CuratorAction::Submit, now)?;

        if approve {
            votes::upsert_curator_vote(conn, user_id, post.id, 1, now)?;
            info!(post_id = %post.id, %user_id, "Post auto-approved for topic curator");
        }
        Ok(post)
    }

    /// Submit an event. Events are shared by link: resubmitting a known link
    /// reuses the stored event and only adds a new post.
    pub fn submit_event(&self, user_id: Uuid, topic_id: Uuid, new: NewEvent) -> Result<(Post, Event)> {
        let now = self.now();
        self.db.with_tx(|tx| {
            let topic = content::get_topic(tx, topic_id)?
                .ok_or_else(|| EngineError::not_found("topic", topic_id))?;

            let event = match content::find_event_by_link(tx, &new.source_link)? {
                Some(event) => event,
                None => {
                    let event = Event {
                        id: Uuid::new_v4(),
                        user_id,
                        kind: EventKind::Document,
                        title: new.title,
                        source_title: source_title_from_link(&new.source_link),
                        source_link: new.source_link,
                        timestamp: new.timestamp,
                        position: 0.0,
                    };
                    content::insert_event(tx, &event)?;
                    event
                }
            };

            let post = self.create_post(
                tx,
                user_id,
                NewPost {
                    topic,
                    actor_id: None,
                    timestamp: event.timestamp,
                    payload: Payload::Event(event.id),
                },
                true,
                now,
            )?;
            Ok((post, event))
        })
    }

    /// Submit a quote taken from a source together with its arguments.
    ///
    /// The quote's position is computed once, after its arguments are stored;
    /// it only counts them if the post starts out approved. The source
    /// position is refreshed afterwards.
    pub fn submit_quote(
        &self,
        user_id: Uuid,
        topic_id: Uuid,
        source: NewSource,
        quote: NewQuote,
        arguments: Vec<NewArgument>,
    ) -> Result<(Post, Quote)> {
        let now = self.now();
        self.db.with_tx(|tx| {
            let topic = content::get_topic(tx, topic_id)?
                .ok_or_else(|| EngineError::not_found("topic", topic_id))?;
            let actor = content::get_actor(tx, source.actor_id)?
                .ok_or_else(|| EngineError::not_found("actor", source.actor_id))?;

            let source = match content::find_source(tx, actor.id, &source.source_link)? {
                Some(existing) => existing,
                None => {
                    let created = Source {
                        id: Uuid::new_v4(),
                        actor_id: actor.id,
                        actor_title: actor.title.clone(),
                        source_title: source_title_from_link(&source.source_link),
                        source_link: source.source_link,
                        timestamp: source.timestamp,
                        position: 0.0,
                    };
                    content::insert_source(tx, &created)?;
                    created
                }
            };

            let mut quote = Quote {
                id: Uuid::new_v4(),
                user_id,
                source_id: source.id,
                text: quote.text,
                reference_link: quote.reference_link,
                position: 0.0,
            };
            content::insert_quote(tx, &quote)?;

            let mut post = self.create_post(
                tx,
                user_id,
                NewPost {
                    topic,
                    actor_id: Some(actor.id),
                    timestamp: source.timestamp,
                    payload: Payload::Quote(quote.id),
                },
                true,
                now,
            )?;

            for argument in arguments {
                if let Some(argument) = positions::new_argument(topic_id, post.id, quote.id, argument) {
                    posts::insert_argument(tx, &argument)?;
                }
            }

            let position = positions::quote_position(tx, topic_id, quote.id)?;
            content::update_quote_position(tx, quote.id, position)?;
            posts::update_post_position(tx, post.id, position)?;
            quote.position = position;
            post.position = position;

            positions::refresh_source_position(tx, topic_id, source.id)?;
            Ok((post, quote))
        })
    }

    /// Apply for curator status in a topic. The application is a post like
    /// any other and always starts pending; existing curators vote on it.
    /// A user has a single application record that is reused across topics.
    pub fn submit_curator_application(
        &self,
        user_id: Uuid,
        topic_id: Uuid,
        new: NewCuratorApplication,
    ) -> Result<(Post, CuratorApplication)> {
        let now = self.now();
        self.db.with_tx(|tx| {
            let topic = content::get_topic(tx, topic_id)?
                .ok_or_else(|| EngineError::not_found("topic", topic_id))?;

            let application = match content::find_curator_application_by_user(tx, user_id)? {
                Some(existing) => existing,
                None => {
                    let application = CuratorApplication {
                        id: Uuid::new_v4(),
                        user_id,
                        title: new.title,
                        photo: new.photo,
                    };
                    content::insert_curator_application(tx, &application)?;
                    application
                }
            };

            let post = self.create_post(
                tx,
                user_id,
                NewPost {
                    topic,
                    actor_id: None,
                    timestamp: now,
                    payload: Payload::CuratorApplication(application.id),
                },
                false,
                now,
            )?;
            info!(post_id = %post.id, %user_id, %topic_id, "Curator application submitted");
            Ok((post, application))
        })
    }
}
