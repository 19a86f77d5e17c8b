use rusqlite::{Connection, params};
use uuid::Uuid;

use crate::error::Result;
use crate::models::ArgumentCountRow;

// Effective position of one argument: counterarguments are sign-flipped.
const EFFECTIVE_POSITION: &str =
    "CASE WHEN a.counterargument THEN -a.position ELSE a.position END";

/// Mean effective position of the approved arguments attached to a quote.
/// `None` when no argument qualifies.
pub fn average_quote_position(conn: &Connection, topic_id: Uuid, quote_id: Uuid) -> Result<Option<f64>> {
    let sql = format!(
        "SELECT AVG({})
         FROM arguments a
         JOIN posts p ON a.post_id = p.id
         WHERE a.topic_id = ?1 AND a.quote_id = ?2 AND p.approved IS NOT NULL",
        EFFECTIVE_POSITION
    );
    let avg = conn.query_row(
        &sql,
        params![topic_id.to_string(), quote_id.to_string()],
        |row| row.get::<_, Option<f64>>(0),
    )?;
    Ok(avg)
}

/// Mean effective position of the approved arguments across every quote taken
/// from a source. `None` when no argument qualifies.
pub fn average_source_position(conn: &Connection, topic_id: Uuid, source_id: Uuid) -> Result<Option<f64>> {
    let sql = format!(
        "SELECT AVG({})
         FROM arguments a
         JOIN quotes q ON a.quote_id = q.id
         JOIN posts p ON a.post_id = p.id
         WHERE a.topic_id = ?1 AND q.source_id = ?2 AND p.approved IS NOT NULL",
        EFFECTIVE_POSITION
    );
    let avg = conn.query_row(
        &sql,
        params![topic_id.to_string(), source_id.to_string()],
        |row| row.get::<_, Option<f64>>(0),
    )?;
    Ok(avg)
}

/// Direct (non-counter) arguments on approved posts grouped by
/// (position, title), ordered by position desc, count desc, title asc.
pub fn argument_counts(conn: &Connection, topic_id: Uuid) -> Result<Vec<ArgumentCountRow>> {
    let mut stmt = conn.prepare(
        "SELECT a.position, a.title, COUNT(*) AS cnt
         FROM arguments a
         JOIN posts p ON a.post_id = p.id
         WHERE a.topic_id = ?1 AND a.counterargument = 0 AND p.approved IS NOT NULL
         GROUP BY a.position, a.title
         ORDER BY a.position DESC, cnt DESC, a.title ASC",
    )?;
    let rows = stmt
        .query_map([topic_id.to_string()], |row| {
            Ok(ArgumentCountRow {
                position: row.get(0)?,
                title: row.get(1)?,
                count: row.get(2)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}
