use rusqlite::Connection;
use tracing::info;

use crate::Result;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |r| r.get(0),
    )?;

    if version < 1 {
        info!("Running migration v1 (initial schema)");
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS topics (
                id              TEXT PRIMARY KEY,
                title           TEXT NOT NULL,
                default_body    TEXT NOT NULL DEFAULT '',
                created_at      TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS actors (
                id          TEXT PRIMARY KEY,
                first_name  TEXT NOT NULL,
                last_name   TEXT NOT NULL,
                title       TEXT NOT NULL DEFAULT ''
            );

            CREATE TABLE IF NOT EXISTS actor_groups (
                id          TEXT PRIMARY KEY,
                title       TEXT NOT NULL,
                kind        TEXT NOT NULL,
                timestamp   TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS memberships (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                actor_id    TEXT NOT NULL REFERENCES actors(id),
                group_id    TEXT NOT NULL REFERENCES actor_groups(id),
                since       TEXT NOT NULL,
                until       TEXT
            );

            CREATE INDEX IF NOT EXISTS idx_memberships_group
                ON memberships(group_id);
            CREATE INDEX IF NOT EXISTS idx_memberships_actor
                ON memberships(actor_id, since);

            CREATE TABLE IF NOT EXISTS events (
                id              TEXT PRIMARY KEY,
                user_id         TEXT NOT NULL,
                kind            TEXT NOT NULL,
                title           TEXT NOT NULL,
                source_link     TEXT NOT NULL UNIQUE,
                source_title    TEXT NOT NULL,
                timestamp       TEXT NOT NULL,
                position        REAL NOT NULL DEFAULT 0
            );

            CREATE TABLE IF NOT EXISTS sources (
                id              TEXT PRIMARY KEY,
                actor_id        TEXT NOT NULL REFERENCES actors(id),
                actor_title     TEXT NOT NULL,
                source_link     TEXT NOT NULL,
                source_title    TEXT NOT NULL,
                timestamp       TEXT NOT NULL,
                position        REAL NOT NULL DEFAULT 0,
                UNIQUE(actor_id, source_link)
            );

            CREATE TABLE IF NOT EXISTS quotes (
                id              TEXT PRIMARY KEY,
                user_id         TEXT NOT NULL,
                source_id       TEXT NOT NULL REFERENCES sources(id),
                text            TEXT NOT NULL,
                reference_link  TEXT,
                position        REAL NOT NULL DEFAULT 0
            );

            CREATE TABLE IF NOT EXISTS curator_applications (
                id          TEXT PRIMARY KEY,
                user_id     TEXT NOT NULL UNIQUE,
                title       TEXT NOT NULL,
                photo       TEXT
            );

            CREATE TABLE IF NOT EXISTS posts (
                id                  TEXT PRIMARY KEY,
                topic_id            TEXT NOT NULL REFERENCES topics(id),
                actor_id            TEXT REFERENCES actors(id),
                body                TEXT NOT NULL DEFAULT '',
                position            REAL NOT NULL DEFAULT 0,
                approved            TEXT,
                upvotes             INTEGER NOT NULL DEFAULT 0,
                downvotes           INTEGER NOT NULL DEFAULT 0,
                curator_upvotes     INTEGER NOT NULL DEFAULT 0,
                curator_downvotes   INTEGER NOT NULL DEFAULT 0,
                timestamp           TEXT NOT NULL,
                created             TEXT NOT NULL,
                payload_kind        TEXT NOT NULL,
                payload_id          TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_posts_topic
                ON posts(topic_id, approved);
            CREATE INDEX IF NOT EXISTS idx_posts_payload
                ON posts(payload_kind, payload_id);

            CREATE TABLE IF NOT EXISTS arguments (
                id                      TEXT PRIMARY KEY,
                topic_id                TEXT NOT NULL REFERENCES topics(id),
                post_id                 TEXT NOT NULL REFERENCES posts(id),
                quote_id                TEXT REFERENCES quotes(id),
                title                   TEXT NOT NULL,
                position                REAL NOT NULL,
                counterargument         INTEGER NOT NULL DEFAULT 0,
                counterargument_title   TEXT
            );

            CREATE INDEX IF NOT EXISTS idx_arguments_topic
                ON arguments(topic_id, quote_id);

            -- One current vote per (user, post); re-voting overwrites.
            CREATE TABLE IF NOT EXISTS user_votes (
                user_id     TEXT NOT NULL,
                post_id     TEXT NOT NULL REFERENCES posts(id),
                vote        INTEGER NOT NULL,
                updated_at  TEXT NOT NULL,
                PRIMARY KEY (user_id, post_id)
            );

            -- Curator actions. Only action = 'vote' rows are unique per (user, post).
            CREATE TABLE IF NOT EXISTS post_log (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id     TEXT NOT NULL,
                post_id     TEXT NOT NULL REFERENCES posts(id),
                action      TEXT NOT NULL,
                vote        INTEGER,
                created_at  TEXT NOT NULL
            );

            CREATE UNIQUE INDEX IF NOT EXISTS idx_post_log_vote
                ON post_log(user_id, post_id) WHERE action = 'vote';

            CREATE TABLE IF NOT EXISTS topic_curators (
                user_id     TEXT NOT NULL,
                topic_id    TEXT NOT NULL REFERENCES topics(id),
                approved    TEXT,
                PRIMARY KEY (user_id, topic_id)
            );

            INSERT INTO schema_version (version) VALUES (1);
            ",
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}
