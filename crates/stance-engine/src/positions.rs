//! Consensus positions.
//!
//! A quote's or source's position is the unweighted mean of the effective
//! positions of the arguments in scope whose post is approved, or exactly 0
//! when none qualify. Source positions are cached on the source row and
//! refreshed whenever one of its quotes changes approval state or gains or
//! loses an argument. A quote's cached position is only set at submission.

use rusqlite::Connection;
use tracing::{debug, info};
use uuid::Uuid;

use stance_db::queries::{content, positions, posts};
use stance_types::api::NewArgument;
use stance_types::models::{Argument, Payload};

use crate::error::{EngineError, Result};
use crate::Engine;

pub(crate) fn quote_position(conn: &Connection, topic_id: Uuid, quote_id: Uuid) -> Result<f64> {
    Ok(positions::average_quote_position(conn, topic_id, quote_id)?.unwrap_or(0.0))
}

pub(crate) fn source_position(conn: &Connection, topic_id: Uuid, source_id: Uuid) -> Result<f64> {
    Ok(positions::average_source_position(conn, topic_id, source_id)?.unwrap_or(0.0))
}

/// Recompute and persist the cached position of a source.
pub(crate) fn refresh_source_position(
    conn: &Connection,
    topic_id: Uuid,
    source_id: Uuid,
) -> Result<f64> {
    let position = source_position(conn, topic_id, source_id)?;
    content::update_source_position(conn, source_id, position)?;
    debug!(%source_id, %topic_id, position, "Source position refreshed");
    Ok(position)
}

/// Build an argument row for a quote post. Blank titles yield `None`.
pub(crate) fn new_argument(
    topic_id: Uuid,
    post_id: Uuid,
    quote_id: Uuid,
    argument: NewArgument,
) -> Option<Argument> {
    let title = argument.title.trim();
    if title.is_empty() {
        return None;
    }
    Some(Argument {
        id: Uuid::new_v4(),
        topic_id,
        post_id,
        quote_id: Some(quote_id),
        title: title.to_string(),
        position: argument.position,
        counterargument: argument.counterargument,
        counterargument_title: argument.counterargument_title,
    })
}

impl Engine {
    pub fn aggregate_quote_position(&self, topic_id: Uuid, quote_id: Uuid) -> Result<f64> {
        self.db.with_conn(|conn| {
            content::get_quote(conn, quote_id)?
                .ok_or_else(|| EngineError::not_found("quote", quote_id))?;
            quote_position(conn, topic_id, quote_id)
        })
    }

    pub fn aggregate_source_position(&self, topic_id: Uuid, source_id: Uuid) -> Result<f64> {
        self.db.with_conn(|conn| {
            content::get_source(conn, source_id)?
                .ok_or_else(|| EngineError::not_found("source", source_id))?;
            source_position(conn, topic_id, source_id)
        })
    }

    /// Attach an argument to a quote post and refresh the source position.
    /// Returns `None` when the title is blank and nothing was stored.
    pub fn add_argument(&self, post_id: Uuid, argument: NewArgument) -> Result<Option<Argument>> {
        self.db.with_tx(|tx| {
            let post = posts::get_post(tx, post_id)?
                .ok_or_else(|| EngineError::not_found("post", post_id))?;
            let Payload::Quote(quote_id) = post.payload else {
                return Err(EngineError::not_found("quote post", post_id));
            };
            let quote = content::get_quote(tx, quote_id)?
                .ok_or_else(|| EngineError::not_found("quote", quote_id))?;

            let Some(argument) = new_argument(post.topic_id, post.id, quote_id, argument) else {
                return Ok(None);
            };
            posts::insert_argument(tx, &argument)?;
            refresh_source_position(tx, post.topic_id, quote.source_id)?;
            Ok(Some(argument))
        })
    }

    /// Detach an argument and refresh the position of the source it counted towards.
    pub fn remove_argument(&self, argument_id: Uuid) -> Result<()> {
        self.db.with_tx(|tx| {
            let argument = posts::get_argument(tx, argument_id)?
                .ok_or_else(|| EngineError::not_found("argument", argument_id))?;
            posts::delete_argument(tx, argument_id)?;

            if let Some(quote_id) = argument.quote_id {
                let quote = content::get_quote(tx, quote_id)?
                    .ok_or_else(|| EngineError::not_found("quote", quote_id))?;
                refresh_source_position(tx, argument.topic_id, quote.source_id)?;
            }
            Ok(())
        })
    }

    /// Recompute every source's cached position against the topic of its
    /// latest quote post. Returns how many cached values changed.
    pub fn recompute_all_source_positions(&self) -> Result<usize> {
        self.db.with_tx(|tx| {
            let mut changed = 0;
            for (source_id, topic_id) in content::latest_source_topics(tx)? {
                let Some(source) = content::get_source(tx, source_id)? else {
                    continue;
                };
                let position = source_position(tx, topic_id, source_id)?;
                if (position - source.position).abs() > f64::EPSILON {
                    content::update_source_position(tx, source_id, position)?;
                    changed += 1;
                }
            }
            if changed > 0 {
                info!("Reconciled {} source positions", changed);
            }
            Ok(changed)
        })
    }
}
