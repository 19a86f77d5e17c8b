//! Database row types. These map directly to SQLite rows and keep ids as the
//! TEXT they are stored as; `TryFrom` turns them into `stance-types` models.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use stance_types::models::{
    Actor, Argument, CuratorApplication, Event, Group, Membership, Payload, Post, Quote, Source,
    Topic, TopicCurator,
};

use crate::error::{DbError, Result};

pub(crate) fn parse_id(table: &'static str, raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw).map_err(|e| DbError::InvalidRow {
        table,
        detail: format!("bad id {:?}: {}", raw, e),
    })
}

fn parse_opt_id(table: &'static str, raw: Option<&str>) -> Result<Option<Uuid>> {
    raw.map(|r| parse_id(table, r)).transpose()
}

fn parse_tag<T: std::str::FromStr<Err = String>>(table: &'static str, raw: &str) -> Result<T> {
    raw.parse().map_err(|detail| DbError::InvalidRow { table, detail })
}

pub struct TopicRow {
    pub id: String,
    pub title: String,
    pub default_body: String,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<TopicRow> for Topic {
    type Error = DbError;

    fn try_from(row: TopicRow) -> Result<Self> {
        Ok(Topic {
            id: parse_id("topics", &row.id)?,
            title: row.title,
            default_body: row.default_body,
            created_at: row.created_at,
        })
    }
}

pub struct ActorRow {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub title: String,
}

impl TryFrom<ActorRow> for Actor {
    type Error = DbError;

    fn try_from(row: ActorRow) -> Result<Self> {
        Ok(Actor {
            id: parse_id("actors", &row.id)?,
            first_name: row.first_name,
            last_name: row.last_name,
            title: row.title,
        })
    }
}

pub struct GroupRow {
    pub id: String,
    pub title: String,
    pub kind: String,
    pub timestamp: DateTime<Utc>,
}

impl TryFrom<GroupRow> for Group {
    type Error = DbError;

    fn try_from(row: GroupRow) -> Result<Self> {
        Ok(Group {
            id: parse_id("actor_groups", &row.id)?,
            title: row.title,
            kind: parse_tag("actor_groups", &row.kind)?,
            timestamp: row.timestamp,
        })
    }
}

pub struct MembershipRow {
    pub actor_id: String,
    pub group_id: String,
    pub since: DateTime<Utc>,
    pub until: Option<DateTime<Utc>>,
}

impl TryFrom<MembershipRow> for Membership {
    type Error = DbError;

    fn try_from(row: MembershipRow) -> Result<Self> {
        Ok(Membership {
            actor_id: parse_id("memberships", &row.actor_id)?,
            group_id: parse_id("memberships", &row.group_id)?,
            since: row.since,
            until: row.until,
        })
    }
}

pub struct EventRow {
    pub id: String,
    pub user_id: String,
    pub kind: String,
    pub title: String,
    pub source_link: String,
    pub source_title: String,
    pub timestamp: DateTime<Utc>,
    pub position: f64,
}

impl TryFrom<EventRow> for Event {
    type Error = DbError;

    fn try_from(row: EventRow) -> Result<Self> {
        Ok(Event {
            id: parse_id("events", &row.id)?,
            user_id: parse_id("events", &row.user_id)?,
            kind: parse_tag("events", &row.kind)?,
            title: row.title,
            source_link: row.source_link,
            source_title: row.source_title,
            timestamp: row.timestamp,
            position: row.position,
        })
    }
}

pub struct SourceRow {
    pub id: String,
    pub actor_id: String,
    pub actor_title: String,
    pub source_link: String,
    pub source_title: String,
    pub timestamp: DateTime<Utc>,
    pub position: f64,
}

impl TryFrom<SourceRow> for Source {
    type Error = DbError;

    fn try_from(row: SourceRow) -> Result<Self> {
        Ok(Source {
            id: parse_id("sources", &row.id)?,
            actor_id: parse_id("sources", &row.actor_id)?,
            actor_title: row.actor_title,
            source_link: row.source_link,
            source_title: row.source_title,
            timestamp: row.timestamp,
            position: row.position,
        })
    }
}

pub struct QuoteRow {
    pub id: String,
    pub user_id: String,
    pub source_id: String,
    pub text: String,
    pub reference_link: Option<String>,
    pub position: f64,
}

impl TryFrom<QuoteRow> for Quote {
    type Error = DbError;

    fn try_from(row: QuoteRow) -> Result<Self> {
        Ok(Quote {
            id: parse_id("quotes", &row.id)?,
            user_id: parse_id("quotes", &row.user_id)?,
            source_id: parse_id("quotes", &row.source_id)?,
            text: row.text,
            reference_link: row.reference_link,
            position: row.position,
        })
    }
}

pub struct CuratorApplicationRow {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub photo: Option<String>,
}

impl TryFrom<CuratorApplicationRow> for CuratorApplication {
    type Error = DbError;

    fn try_from(row: CuratorApplicationRow) -> Result<Self> {
        Ok(CuratorApplication {
            id: parse_id("curator_applications", &row.id)?,
            user_id: parse_id("curator_applications", &row.user_id)?,
            title: row.title,
            photo: row.photo,
        })
    }
}

pub struct PostRow {
    pub id: String,
    pub topic_id: String,
    pub actor_id: Option<String>,
    pub body: String,
    pub position: f64,
    pub approved: Option<DateTime<Utc>>,
    pub upvotes: i64,
    pub downvotes: i64,
    pub curator_upvotes: i64,
    pub curator_downvotes: i64,
    pub timestamp: DateTime<Utc>,
    pub created: DateTime<Utc>,
    pub payload_kind: String,
    pub payload_id: String,
}

impl TryFrom<PostRow> for Post {
    type Error = DbError;

    fn try_from(row: PostRow) -> Result<Self> {
        let kind = parse_tag("posts", &row.payload_kind)?;
        Ok(Post {
            id: parse_id("posts", &row.id)?,
            topic_id: parse_id("posts", &row.topic_id)?,
            actor_id: parse_opt_id("posts", row.actor_id.as_deref())?,
            body: row.body,
            position: row.position,
            approved: row.approved,
            upvotes: row.upvotes,
            downvotes: row.downvotes,
            curator_upvotes: row.curator_upvotes,
            curator_downvotes: row.curator_downvotes,
            timestamp: row.timestamp,
            created: row.created,
            payload: Payload::new(kind, parse_id("posts", &row.payload_id)?),
        })
    }
}

pub struct ArgumentRow {
    pub id: String,
    pub topic_id: String,
    pub post_id: String,
    pub quote_id: Option<String>,
    pub title: String,
    pub position: f64,
    pub counterargument: bool,
    pub counterargument_title: Option<String>,
}

impl TryFrom<ArgumentRow> for Argument {
    type Error = DbError;

    fn try_from(row: ArgumentRow) -> Result<Self> {
        Ok(Argument {
            id: parse_id("arguments", &row.id)?,
            topic_id: parse_id("arguments", &row.topic_id)?,
            post_id: parse_id("arguments", &row.post_id)?,
            quote_id: parse_opt_id("arguments", row.quote_id.as_deref())?,
            title: row.title,
            position: row.position,
            counterargument: row.counterargument,
            counterargument_title: row.counterargument_title,
        })
    }
}

pub struct TopicCuratorRow {
    pub user_id: String,
    pub topic_id: String,
    pub approved: Option<DateTime<Utc>>,
}

impl TryFrom<TopicCuratorRow> for TopicCurator {
    type Error = DbError;

    fn try_from(row: TopicCuratorRow) -> Result<Self> {
        Ok(TopicCurator {
            user_id: parse_id("topic_curators", &row.user_id)?,
            topic_id: parse_id("topic_curators", &row.topic_id)?,
            approved: row.approved,
        })
    }
}

/// Grouped talking-point count as returned by the ranking query.
pub struct ArgumentCountRow {
    pub position: f64,
    pub title: String,
    pub count: i64,
}

/// Map a list of rows into models, failing on the first bad row.
pub fn into_models<R, M>(rows: Vec<R>) -> Result<Vec<M>>
where
    M: TryFrom<R, Error = DbError>,
{
    rows.into_iter().map(M::try_from).collect()
}
