use chrono::{DateTime, Utc};
use rusqlite::{Connection, Row, params};
use uuid::Uuid;

use stance_types::api::VoteTally;
use stance_types::models::{Argument, Post};

use crate::error::Result;
use crate::models::{ArgumentRow, PostRow, into_models};
use crate::queries::OptionalExt;

// -- Posts --

const POST_COLUMNS: &str = "id, topic_id, actor_id, body, position, approved, upvotes, downvotes,
    curator_upvotes, curator_downvotes, timestamp, created, payload_kind, payload_id";

fn post_row(row: &Row<'_>) -> rusqlite::Result<PostRow> {
    Ok(PostRow {
        id: row.get(0)?,
        topic_id: row.get(1)?,
        actor_id: row.get(2)?,
        body: row.get(3)?,
        position: row.get(4)?,
        approved: row.get(5)?,
        upvotes: row.get(6)?,
        downvotes: row.get(7)?,
        curator_upvotes: row.get(8)?,
        curator_downvotes: row.get(9)?,
        timestamp: row.get(10)?,
        created: row.get(11)?,
        payload_kind: row.get(12)?,
        payload_id: row.get(13)?,
    })
}

pub fn insert_post(conn: &Connection, post: &Post) -> Result<()> {
    conn.execute(
        "INSERT INTO posts (id, topic_id, actor_id, body, position, approved, upvotes, downvotes,
                            curator_upvotes, curator_downvotes, timestamp, created, payload_kind, payload_id)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
        params![
            post.id.to_string(),
            post.topic_id.to_string(),
            post.actor_id.map(|id| id.to_string()),
            post.body,
            post.position,
            post.approved,
            post.upvotes,
            post.downvotes,
            post.curator_upvotes,
            post.curator_downvotes,
            post.timestamp,
            post.created,
            post.payload.kind().as_str(),
            post.payload.id().to_string()
        ],
    )?;
    Ok(())
}

pub fn get_post(conn: &Connection, id: Uuid) -> Result<Option<Post>> {
    let sql = format!("SELECT {} FROM posts WHERE id = ?1", POST_COLUMNS);
    let row = conn.query_row(&sql, [id.to_string()], post_row).optional()?;
    row.map(Post::try_from).transpose()
}

/// Pending posts of a topic, newest submission first.
pub fn list_pending_posts(conn: &Connection, topic_id: Uuid) -> Result<Vec<Post>> {
    let sql = format!(
        "SELECT {} FROM posts
         WHERE topic_id = ?1 AND approved IS NULL
         ORDER BY created DESC, rowid DESC",
        POST_COLUMNS
    );
    query_posts(conn, &sql, topic_id)
}

/// Approved content posts of a topic, most recent content first. Curator
/// applications are moderation business and never part of the public listing.
pub fn list_approved_content_posts(conn: &Connection, topic_id: Uuid) -> Result<Vec<Post>> {
    let sql = format!(
        "SELECT {} FROM posts
         WHERE topic_id = ?1 AND approved IS NOT NULL AND payload_kind != 'curator_application'
         ORDER BY timestamp DESC, rowid DESC",
        POST_COLUMNS
    );
    query_posts(conn, &sql, topic_id)
}

fn query_posts(conn: &Connection, sql: &str, topic_id: Uuid) -> Result<Vec<Post>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map([topic_id.to_string()], post_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    into_models(rows)
}

pub fn update_user_tally(conn: &Connection, id: Uuid, tally: VoteTally) -> Result<()> {
    conn.execute(
        "UPDATE posts SET upvotes = ?1, downvotes = ?2 WHERE id = ?3",
        params![tally.upvotes, tally.downvotes, id.to_string()],
    )?;
    Ok(())
}

/// Persist the curator tally together with the approval marker it produced.
pub fn update_curator_state(
    conn: &Connection,
    id: Uuid,
    tally: VoteTally,
    approved: Option<DateTime<Utc>>,
) -> Result<()> {
    conn.execute(
        "UPDATE posts SET curator_upvotes = ?1, curator_downvotes = ?2, approved = ?3 WHERE id = ?4",
        params![tally.upvotes, tally.downvotes, approved, id.to_string()],
    )?;
    Ok(())
}

pub fn update_post_position(conn: &Connection, id: Uuid, position: f64) -> Result<()> {
    conn.execute(
        "UPDATE posts SET position = ?1 WHERE id = ?2",
        params![position, id.to_string()],
    )?;
    Ok(())
}

// -- Arguments --

const ARGUMENT_COLUMNS: &str =
    "id, topic_id, post_id, quote_id, title, position, counterargument, counterargument_title";

fn argument_row(row: &Row<'_>) -> rusqlite::Result<ArgumentRow> {
    Ok(ArgumentRow {
        id: row.get(0)?,
        topic_id: row.get(1)?,
        post_id: row.get(2)?,
        quote_id: row.get(3)?,
        title: row.get(4)?,
        position: row.get(5)?,
        counterargument: row.get(6)?,
        counterargument_title: row.get(7)?,
    })
}

pub fn insert_argument(conn: &Connection, argument: &Argument) -> Result<()> {
    conn.execute(
        "INSERT INTO arguments (id, topic_id, post_id, quote_id, title, position, counterargument, counterargument_title)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            argument.id.to_string(),
            argument.topic_id.to_string(),
            argument.post_id.to_string(),
            argument.quote_id.map(|id| id.to_string()),
            argument.title,
            argument.position,
            argument.counterargument,
            argument.counterargument_title
        ],
    )?;
    Ok(())
}

pub fn get_argument(conn: &Connection, id: Uuid) -> Result<Option<Argument>> {
    let sql = format!("SELECT {} FROM arguments WHERE id = ?1", ARGUMENT_COLUMNS);
    let row = conn.query_row(&sql, [id.to_string()], argument_row).optional()?;
    row.map(Argument::try_from).transpose()
}

pub fn delete_argument(conn: &Connection, id: Uuid) -> Result<bool> {
    let deleted = conn.execute("DELETE FROM arguments WHERE id = ?1", [id.to_string()])?;
    Ok(deleted > 0)
}

/// Arguments attached to a quote, in the order they were added.
pub fn list_quote_arguments(conn: &Connection, quote_id: Uuid) -> Result<Vec<Argument>> {
    let sql = format!(
        "SELECT {} FROM arguments WHERE quote_id = ?1 ORDER BY rowid",
        ARGUMENT_COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([quote_id.to_string()], argument_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    into_models(rows)
}
