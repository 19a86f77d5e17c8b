use chrono::{DateTime, Utc};
use rusqlite::{Connection, params};
use uuid::Uuid;

use stance_types::api::VoteTally;

use crate::error::Result;
use crate::models::parse_id;

/// Discriminant of a `post_log` row. Only `Vote` rows carry a vote value and
/// are unique per (user, post).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CuratorAction {
    Vote,
    Submit,
}

impl CuratorAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Vote => "vote",
            Self::Submit => "submit",
        }
    }
}

// -- User votes --

pub fn upsert_user_vote(
    conn: &Connection,
    user_id: Uuid,
    post_id: Uuid,
    vote: i64,
    now: DateTime<Utc>,
) -> Result<()> {
    conn.execute(
        "INSERT INTO user_votes (user_id, post_id, vote, updated_at) VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(user_id, post_id) DO UPDATE SET vote = excluded.vote, updated_at = excluded.updated_at",
        params![user_id.to_string(), post_id.to_string(), vote, now],
    )?;
    Ok(())
}

pub fn sum_user_votes(conn: &Connection, post_id: Uuid) -> Result<VoteTally> {
    let tally = conn.query_row(
        "SELECT COALESCE(SUM(CASE WHEN vote > 0 THEN vote ELSE 0 END), 0),
                COALESCE(SUM(CASE WHEN vote < 0 THEN vote ELSE 0 END), 0)
         FROM user_votes WHERE post_id = ?1",
        [post_id.to_string()],
        |row| Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?)),
    )?;
    Ok(VoteTally::new(tally.0, tally.1.abs()))
}

pub fn count_user_votes(conn: &Connection, post_id: Uuid) -> Result<i64> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM user_votes WHERE post_id = ?1",
        [post_id.to_string()],
        |row| row.get(0),
    )?;
    Ok(count)
}

/// The user's own votes on every post of a topic.
pub fn user_topic_votes(conn: &Connection, user_id: Uuid, topic_id: Uuid) -> Result<Vec<(Uuid, i64)>> {
    let mut stmt = conn.prepare(
        "SELECT v.post_id, v.vote
         FROM user_votes v
         JOIN posts p ON v.post_id = p.id
         WHERE v.user_id = ?1 AND p.topic_id = ?2",
    )?;
    let rows = stmt
        .query_map(params![user_id.to_string(), topic_id.to_string()], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    rows.into_iter()
        .map(|(post_id, vote)| Ok((parse_id("user_votes", &post_id)?, vote)))
        .collect()
}

// -- Curator log --

pub fn upsert_curator_vote(
    conn: &Connection,
    user_id: Uuid,
    post_id: Uuid,
    vote: i64,
    now: DateTime<Utc>,
) -> Result<()> {
    conn.execute(
        "INSERT INTO post_log (user_id, post_id, action, vote, created_at) VALUES (?1, ?2, 'vote', ?3, ?4)
         ON CONFLICT(user_id, post_id) WHERE action = 'vote'
         DO UPDATE SET vote = excluded.vote, created_at = excluded.created_at",
        params![user_id.to_string(), post_id.to_string(), vote, now],
    )?;
    Ok(())
}

/// Append a non-vote action to the curator log.
pub fn log_curator_action(
    conn: &Connection,
    user_id: Uuid,
    post_id: Uuid,
    action: CuratorAction,
    now: DateTime<Utc>,
) -> Result<()> {
    conn.execute(
        "INSERT INTO post_log (user_id, post_id, action, vote, created_at) VALUES (?1, ?2, ?3, NULL, ?4)",
        params![user_id.to_string(), post_id.to_string(), action.as_str(), now],
    )?;
    Ok(())
}

pub fn sum_curator_votes(conn: &Connection, post_id: Uuid) -> Result<VoteTally> {
    let tally = conn.query_row(
        "SELECT COALESCE(SUM(CASE WHEN vote > 0 THEN vote ELSE 0 END), 0),
                COALESCE(SUM(CASE WHEN vote < 0 THEN vote ELSE 0 END), 0)
         FROM post_log WHERE post_id = ?1 AND action = 'vote'",
        [post_id.to_string()],
        |row| Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?)),
    )?;
    Ok(VoteTally::new(tally.0, tally.1.abs()))
}

pub fn count_curator_votes(conn: &Connection, post_id: Uuid) -> Result<i64> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM post_log WHERE post_id = ?1 AND action = 'vote'",
        [post_id.to_string()],
        |row| row.get(0),
    )?;
    Ok(count)
}

pub fn curator_topic_votes(
    conn: &Connection,
    user_id: Uuid,
    topic_id: Uuid,
) -> Result<Vec<(Uuid, i64)>> {
    let mut stmt = conn.prepare(
        "SELECT l.post_id, l.vote
         FROM post_log l
         JOIN posts p ON l.post_id = p.id
         WHERE l.user_id = ?1 AND p.topic_id = ?2 AND l.action = 'vote'",
    )?;
    let rows = stmt
        .query_map(params![user_id.to_string(), topic_id.to_string()], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    rows.into_iter()
        .map(|(post_id, vote)| Ok((parse_id("post_log", &post_id)?, vote)))
        .collect()
}
