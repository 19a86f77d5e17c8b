use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::Payload;

/// Outcome of one curator-vote recompute on a post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ApprovalEvent {
    /// Curators hold a majority. Emitted on every qualifying recompute, so a
    /// post that was already approved is re-stamped with `at`.
    Approved {
        post_id: Uuid,
        topic_id: Uuid,
        payload: Payload,
        at: DateTime<Utc>,
        was_approved: bool,
    },

    /// No curator majority (including a tie). The post is pending again.
    Pending {
        post_id: Uuid,
        topic_id: Uuid,
        payload: Payload,
        was_approved: bool,
    },
}

impl ApprovalEvent {
    pub fn post_id(&self) -> Uuid {
        match self {
            Self::Approved { post_id, .. } | Self::Pending { post_id, .. } => *post_id,
        }
    }

    pub fn topic_id(&self) -> Uuid {
        match self {
            Self::Approved { topic_id, .. } | Self::Pending { topic_id, .. } => *topic_id,
        }
    }

    pub fn payload(&self) -> Payload {
        match self {
            Self::Approved { payload, .. } | Self::Pending { payload, .. } => *payload,
        }
    }

    /// The approval marker the post carries after this transition.
    pub fn approved_at(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Approved { at, .. } => Some(*at),
            Self::Pending { .. } => None,
        }
    }

    /// Whether the post moved between pending and approved.
    pub fn state_changed(&self) -> bool {
        match self {
            Self::Approved { was_approved, .. } => !was_approved,
            Self::Pending { was_approved, .. } => *was_approved,
        }
    }
}
