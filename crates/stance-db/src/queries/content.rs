use rusqlite::{Connection, Row, params};
use uuid::Uuid;

use stance_types::models::{Actor, CuratorApplication, Event, Quote, Source, Topic};

use crate::error::Result;
use crate::models::{
    ActorRow, CuratorApplicationRow, EventRow, QuoteRow, SourceRow, TopicRow, into_models,
    parse_id,
};
use crate::queries::{OptionalExt, placeholders};

// -- Topics --

pub fn insert_topic(conn: &Connection, topic: &Topic) -> Result<()> {
    conn.execute(
        "INSERT INTO topics (id, title, default_body, created_at) VALUES (?1, ?2, ?3, ?4)",
        params![
            topic.id.to_string(),
            topic.title,
            topic.default_body,
            topic.created_at
        ],
    )?;
    Ok(())
}

pub fn get_topic(conn: &Connection, id: Uuid) -> Result<Option<Topic>> {
    let row = conn
        .query_row(
            "SELECT id, title, default_body, created_at FROM topics WHERE id = ?1",
            [id.to_string()],
            |row| {
                Ok(TopicRow {
                    id: row.get(0)?,
                    title: row.get(1)?,
                    default_body: row.get(2)?,
                    created_at: row.get(3)?,
                })
            },
        )
        .optional()?;
    row.map(Topic::try_from).transpose()
}

// -- Actors --

fn actor_row(row: &Row<'_>) -> rusqlite::Result<ActorRow> {
    Ok(ActorRow {
        id: row.get(0)?,
        first_name: row.get(1)?,
        last_name: row.get(2)?,
        title: row.get(3)?,
    })
}

pub fn insert_actor(conn: &Connection, actor: &Actor) -> Result<()> {
    conn.execute(
        "INSERT INTO actors (id, first_name, last_name, title) VALUES (?1, ?2, ?3, ?4)",
        params![
            actor.id.to_string(),
            actor.first_name,
            actor.last_name,
            actor.title
        ],
    )?;
    Ok(())
}

pub fn get_actor(conn: &Connection, id: Uuid) -> Result<Option<Actor>> {
    let row = conn
        .query_row(
            "SELECT id, first_name, last_name, title FROM actors WHERE id = ?1",
            [id.to_string()],
            actor_row,
        )
        .optional()?;
    row.map(Actor::try_from).transpose()
}

/// Batch-fetch actors for a set of ids. Unknown ids are skipped.
pub fn get_actors(conn: &Connection, ids: &[Uuid]) -> Result<Vec<Actor>> {
    if ids.is_empty() {
        return Ok(vec![]);
    }

    let sql = format!(
        "SELECT id, first_name, last_name, title FROM actors WHERE id IN ({})",
        placeholders(ids.len())
    );
    let ids: Vec<String> = ids.iter().map(Uuid::to_string).collect();

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(rusqlite::params_from_iter(ids.iter()), actor_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    into_models(rows)
}

// -- Events --

fn event_row(row: &Row<'_>) -> rusqlite::Result<EventRow> {
    Ok(EventRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        kind: row.get(2)?,
        title: row.get(3)?,
        source_link: row.get(4)?,
        source_title: row.get(5)?,
        timestamp: row.get(6)?,
        position: row.get(7)?,
    })
}

const EVENT_COLUMNS: &str = "id, user_id, kind, title, source_link, source_title, timestamp, position";

pub fn insert_event(conn: &Connection, event: &Event) -> Result<()> {
    conn.execute(
        "INSERT INTO events (id, user_id, kind, title, source_link, source_title, timestamp, position)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            event.id.to_string(),
            event.user_id.to_string(),
            event.kind.as_str(),
            event.title,
            event.source_link,
            event.source_title,
            event.timestamp,
            event.position
        ],
    )?;
    Ok(())
}

pub fn get_event(conn: &Connection, id: Uuid) -> Result<Option<Event>> {
    let sql = format!("SELECT {} FROM events WHERE id = ?1", EVENT_COLUMNS);
    let row = conn.query_row(&sql, [id.to_string()], event_row).optional()?;
    row.map(Event::try_from).transpose()
}

pub fn find_event_by_link(conn: &Connection, source_link: &str) -> Result<Option<Event>> {
    let sql = format!("SELECT {} FROM events WHERE source_link = ?1", EVENT_COLUMNS);
    let row = conn.query_row(&sql, [source_link], event_row).optional()?;
    row.map(Event::try_from).transpose()
}

// -- Sources --

fn source_row(row: &Row<'_>) -> rusqlite::Result<SourceRow> {
    Ok(SourceRow {
        id: row.get(0)?,
        actor_id: row.get(1)?,
        actor_title: row.get(2)?,
        source_link: row.get(3)?,
        source_title: row.get(4)?,
        timestamp: row.get(5)?,
        position: row.get(6)?,
    })
}

const SOURCE_COLUMNS: &str =
    "id, actor_id, actor_title, source_link, source_title, timestamp, position";

pub fn insert_source(conn: &Connection, source: &Source) -> Result<()> {
    conn.execute(
        "INSERT INTO sources (id, actor_id, actor_title, source_link, source_title, timestamp, position)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            source.id.to_string(),
            source.actor_id.to_string(),
            source.actor_title,
            source.source_link,
            source.source_title,
            source.timestamp,
            source.position
        ],
    )?;
    Ok(())
}

pub fn get_source(conn: &Connection, id: Uuid) -> Result<Option<Source>> {
    let sql = format!("SELECT {} FROM sources WHERE id = ?1", SOURCE_COLUMNS);
    let row = conn.query_row(&sql, [id.to_string()], source_row).optional()?;
    row.map(Source::try_from).transpose()
}

pub fn find_source(conn: &Connection, actor_id: Uuid, source_link: &str) -> Result<Option<Source>> {
    let sql = format!(
        "SELECT {} FROM sources WHERE actor_id = ?1 AND source_link = ?2",
        SOURCE_COLUMNS
    );
    let row = conn
        .query_row(&sql, params![actor_id.to_string(), source_link], source_row)
        .optional()?;
    row.map(Source::try_from).transpose()
}

pub fn update_source_position(conn: &Connection, id: Uuid, position: f64) -> Result<()> {
    conn.execute(
        "UPDATE sources SET position = ?1 WHERE id = ?2",
        params![position, id.to_string()],
    )?;
    Ok(())
}

/// Each source paired with the topic of its most recently submitted quote post.
pub fn latest_source_topics(conn: &Connection) -> Result<Vec<(Uuid, Uuid)>> {
    let mut stmt = conn.prepare(
        "SELECT q.source_id, p.topic_id
         FROM posts p
         JOIN quotes q ON p.payload_kind = 'quote' AND p.payload_id = q.id
         ORDER BY q.source_id, p.created DESC, p.rowid DESC",
    )?;
    let rows = stmt
        .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let mut latest: Vec<(Uuid, Uuid)> = Vec::new();
    for (source_id, topic_id) in rows {
        let source_id = parse_id("quotes", &source_id)?;
        if latest.last().is_some_and(|(prev, _)| *prev == source_id) {
            continue;
        }
        latest.push((source_id, parse_id("posts", &topic_id)?));
    }
    Ok(latest)
}

// -- Quotes --

fn quote_row(row: &Row<'_>) -> rusqlite::Result<QuoteRow> {
    Ok(QuoteRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        source_id: row.get(2)?,
        text: row.get(3)?,
        reference_link: row.get(4)?,
        position: row.get(5)?,
    })
}

pub fn insert_quote(conn: &Connection, quote: &Quote) -> Result<()> {
    conn.execute(
        "INSERT INTO quotes (id, user_id, source_id, text, reference_link, position)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            quote.id.to_string(),
            quote.user_id.to_string(),
            quote.source_id.to_string(),
            quote.text,
            quote.reference_link,
            quote.position
        ],
    )?;
    Ok(())
}

pub fn get_quote(conn: &Connection, id: Uuid) -> Result<Option<Quote>> {
    let row = conn
        .query_row(
            "SELECT id, user_id, source_id, text, reference_link, position FROM quotes WHERE id = ?1",
            [id.to_string()],
            quote_row,
        )
        .optional()?;
    row.map(Quote::try_from).transpose()
}

pub fn update_quote_position(conn: &Connection, id: Uuid, position: f64) -> Result<()> {
    conn.execute(
        "UPDATE quotes SET position = ?1 WHERE id = ?2",
        params![position, id.to_string()],
    )?;
    Ok(())
}

// -- Curator applications --

fn curator_application_row(row: &Row<'_>) -> rusqlite::Result<CuratorApplicationRow> {
    Ok(CuratorApplicationRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        title: row.get(2)?,
        photo: row.get(3)?,
    })
}

pub fn insert_curator_application(conn: &Connection, app: &CuratorApplication) -> Result<()> {
    conn.execute(
        "INSERT INTO curator_applications (id, user_id, title, photo) VALUES (?1, ?2, ?3, ?4)",
        params![app.id.to_string(), app.user_id.to_string(), app.title, app.photo],
    )?;
    Ok(())
}

pub fn get_curator_application(conn: &Connection, id: Uuid) -> Result<Option<CuratorApplication>> {
    let row = conn
        .query_row(
            "SELECT id, user_id, title, photo FROM curator_applications WHERE id = ?1",
            [id.to_string()],
            curator_application_row,
        )
        .optional()?;
    row.map(CuratorApplication::try_from).transpose()
}

pub fn find_curator_application_by_user(
    conn: &Connection,
    user_id: Uuid,
) -> Result<Option<CuratorApplication>> {
    let row = conn
        .query_row(
            "SELECT id, user_id, title, photo FROM curator_applications WHERE user_id = ?1",
            [user_id.to_string()],
            curator_application_row,
        )
        .optional()?;
    row.map(CuratorApplication::try_from).transpose()
}
