//! Registration of the reference entities content hangs off: topics, actors,
//! groups and memberships.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use stance_db::queries::{content, groups};
use stance_types::models::{Actor, Group, GroupKind, Membership, Topic};

use crate::error::{EngineError, Result};
use crate::Engine;

impl Engine {
    pub fn create_topic(&self, title: &str, default_body: &str) -> Result<Topic> {
        let topic = Topic {
            id: Uuid::new_v4(),
            title: title.to_string(),
            default_body: default_body.to_string(),
            created_at: self.now(),
        };
        self.db.with_conn(|conn| {
            content::insert_topic(conn, &topic)?;
            Ok(topic)
        })
    }

    pub fn topic(&self, topic_id: Uuid) -> Result<Topic> {
        self.db.with_conn(|conn| {
            content::get_topic(conn, topic_id)?.ok_or_else(|| EngineError::not_found("topic", topic_id))
        })
    }

    pub fn create_actor(&self, first_name: &str, last_name: &str, title: &str) -> Result<Actor> {
        let actor = Actor {
            id: Uuid::new_v4(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            title: title.to_string(),
        };
        self.db.with_conn(|conn| {
            content::insert_actor(conn, &actor)?;
            Ok(actor)
        })
    }

    pub fn create_group(&self, title: &str, kind: GroupKind, timestamp: DateTime<Utc>) -> Result<Group> {
        let group = Group {
            id: Uuid::new_v4(),
            title: title.to_string(),
            kind,
            timestamp,
        };
        self.db.with_conn(|conn| {
            groups::insert_group(conn, &group)?;
            Ok(group)
        })
    }

    pub fn add_membership(
        &self,
        actor_id: Uuid,
        group_id: Uuid,
        since: DateTime<Utc>,
        until: Option<DateTime<Utc>>,
    ) -> Result<Membership> {
        let membership = Membership { actor_id, group_id, since, until };
        self.db.with_tx(|tx| {
            content::get_actor(tx, actor_id)?.ok_or_else(|| EngineError::not_found("actor", actor_id))?;
            groups::get_group(tx, group_id)?.ok_or_else(|| EngineError::not_found("group", group_id))?;
            groups::insert_membership(tx, &membership)?;
            Ok(membership)
        })
    }
}
