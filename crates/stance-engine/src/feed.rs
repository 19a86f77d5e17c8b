use std::collections::HashMap;

use rusqlite::Connection;
use uuid::Uuid;

use stance_db::queries::{content, posts};
use stance_types::api::{FeedItem, QuoteEntry};
use stance_types::models::{Actor, Payload, Post, Source};

use crate::error::{EngineError, Result};
use crate::Engine;

impl Engine {
    /// Posts of a topic in display order.
    ///
    /// With `queue` set this is the moderation queue: every pending post,
    /// newest submission first. Otherwise it is the public listing of
    /// approved content, most recent content first. Runs of quote posts from
    /// the same source collapse into one [`FeedItem::Quotes`].
    pub fn topic_feed(&self, topic_id: Uuid, queue: bool) -> Result<Vec<FeedItem>> {
        self.db.with_conn(|conn| {
            let listing = if queue {
                posts::list_pending_posts(conn, topic_id)?
            } else {
                posts::list_approved_content_posts(conn, topic_id)?
            };
            build_feed(conn, listing)
        })
    }
}

fn build_feed(conn: &Connection, listing: Vec<Post>) -> Result<Vec<FeedItem>> {
    let mut items: Vec<FeedItem> = Vec::new();
    let mut sources: HashMap<Uuid, (Source, Actor)> = HashMap::new();

    for post in listing {
        match post.payload {
            Payload::Event(event_id) => {
                let event = content::get_event(conn, event_id)?
                    .ok_or_else(|| EngineError::not_found("event", event_id))?;
                items.push(FeedItem::Event { post, event });
            }
            Payload::CuratorApplication(application_id) => {
                let application = content::get_curator_application(conn, application_id)?
                    .ok_or_else(|| EngineError::not_found("curator application", application_id))?;
                items.push(FeedItem::CuratorApplication { post, application });
            }
            Payload::Quote(quote_id) => {
                let quote = content::get_quote(conn, quote_id)?
                    .ok_or_else(|| EngineError::not_found("quote", quote_id))?;
                let arguments = posts::list_quote_arguments(conn, quote_id)?;
                let entry = QuoteEntry { post, quote, arguments };

                if let Some(FeedItem::Quotes { source, quotes, .. }) = items.last_mut() {
                    if source.id == entry.quote.source_id {
                        quotes.push(entry);
                        continue;
                    }
                }

                let source_id = entry.quote.source_id;
                if !sources.contains_key(&source_id) {
                    let source = content::get_source(conn, source_id)?
                        .ok_or_else(|| EngineError::not_found("source", source_id))?;
                    let actor = content::get_actor(conn, source.actor_id)?
                        .ok_or_else(|| EngineError::not_found("actor", source.actor_id))?;
                    sources.insert(source_id, (source, actor));
                }
                let (source, actor) = sources[&source_id].clone();
                items.push(FeedItem::Quotes { source, actor, quotes: vec![entry] });
            }
        }
    }

    Ok(items)
}
