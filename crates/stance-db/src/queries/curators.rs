use chrono::{DateTime, Utc};
use rusqlite::{Connection, params};
use uuid::Uuid;

use stance_types::models::TopicCurator;

use crate::error::Result;
use crate::models::TopicCuratorRow;
use crate::queries::OptionalExt;

/// Insert or overwrite a user's curator status for a topic.
pub fn upsert_topic_curator(
    conn: &Connection,
    user_id: Uuid,
    topic_id: Uuid,
    approved: Option<DateTime<Utc>>,
) -> Result<()> {
    conn.execute(
        "INSERT INTO topic_curators (user_id, topic_id, approved) VALUES (?1, ?2, ?3)
         ON CONFLICT(user_id, topic_id) DO UPDATE SET approved = excluded.approved",
        params![user_id.to_string(), topic_id.to_string(), approved],
    )?;
    Ok(())
}

pub fn get_topic_curator(conn: &Connection, user_id: Uuid, topic_id: Uuid) -> Result<Option<TopicCurator>> {
    let row = conn
        .query_row(
            "SELECT user_id, topic_id, approved FROM topic_curators WHERE user_id = ?1 AND topic_id = ?2",
            params![user_id.to_string(), topic_id.to_string()],
            |row| {
                Ok(TopicCuratorRow {
                    user_id: row.get(0)?,
                    topic_id: row.get(1)?,
                    approved: row.get(2)?,
                })
            },
        )
        .optional()?;
    row.map(TopicCurator::try_from).transpose()
}

pub fn is_topic_curator(conn: &Connection, user_id: Uuid, topic_id: Uuid) -> Result<bool> {
    let exists = conn.query_row(
        "SELECT EXISTS(
            SELECT 1 FROM topic_curators
            WHERE user_id = ?1 AND topic_id = ?2 AND approved IS NOT NULL
         )",
        params![user_id.to_string(), topic_id.to_string()],
        |row| row.get(0),
    )?;
    Ok(exists)
}
