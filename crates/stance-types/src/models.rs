use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Topic {
    pub id: Uuid,
    pub title: String,
    /// Body copied onto every post created under this topic.
    pub default_body: String,
    pub created_at: DateTime<Utc>,
}

// -- Posts --

/// Discriminant of the content a post wraps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayloadKind {
    Event,
    Quote,
    CuratorApplication,
}

impl PayloadKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Event => "event",
            Self::Quote => "quote",
            Self::CuratorApplication => "curator_application",
        }
    }
}

impl fmt::Display for PayloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PayloadKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "event" => Ok(Self::Event),
            "quote" => Ok(Self::Quote),
            "curator_application" => Ok(Self::CuratorApplication),
            other => Err(format!("unknown payload kind: {}", other)),
        }
    }
}

/// Reference from a post to the single entity it moderates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Payload {
    Event(Uuid),
    Quote(Uuid),
    CuratorApplication(Uuid),
}

impl Payload {
    pub fn new(kind: PayloadKind, id: Uuid) -> Self {
        match kind {
            PayloadKind::Event => Self::Event(id),
            PayloadKind::Quote => Self::Quote(id),
            PayloadKind::CuratorApplication => Self::CuratorApplication(id),
        }
    }

    pub fn kind(&self) -> PayloadKind {
        match self {
            Self::Event(_) => PayloadKind::Event,
            Self::Quote(_) => PayloadKind::Quote,
            Self::CuratorApplication(_) => PayloadKind::CuratorApplication,
        }
    }

    pub fn id(&self) -> Uuid {
        match self {
            Self::Event(id) | Self::Quote(id) | Self::CuratorApplication(id) => *id,
        }
    }
}

/// A moderatable unit of content within a topic.
///
/// `approved` is `None` while the post is pending and holds the instant of the
/// latest curator majority otherwise. The vote counters are caches of the
/// ledger and are only rewritten by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub topic_id: Uuid,
    pub actor_id: Option<Uuid>,
    pub body: String,
    pub position: f64,
    pub approved: Option<DateTime<Utc>>,
    pub upvotes: i64,
    pub downvotes: i64,
    pub curator_upvotes: i64,
    pub curator_downvotes: i64,
    /// When the underlying content happened (event date, source date).
    pub timestamp: DateTime<Utc>,
    /// When the post was submitted.
    pub created: DateTime<Utc>,
    pub payload: Payload,
}

impl Post {
    pub fn is_approved(&self) -> bool {
        self.approved.is_some()
    }
}

// -- Content --

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Document,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Document => "document",
        }
    }
}

impl FromStr for EventKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "document" => Ok(Self::Document),
            other => Err(format!("unknown event kind: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: EventKind,
    pub title: String,
    pub source_link: String,
    pub source_title: String,
    pub timestamp: DateTime<Utc>,
    pub position: f64,
}

/// A public figure whose statements are tracked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Actor {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub title: String,
}

impl Actor {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// An (actor, link) pair that a set of quotes was taken from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    pub id: Uuid,
    pub actor_id: Uuid,
    /// Actor title at the time the source was recorded.
    pub actor_title: String,
    pub source_link: String,
    pub source_title: String,
    pub timestamp: DateTime<Utc>,
    pub position: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub id: Uuid,
    pub user_id: Uuid,
    pub source_id: Uuid,
    pub text: String,
    pub reference_link: Option<String>,
    pub position: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Argument {
    pub id: Uuid,
    pub topic_id: Uuid,
    pub post_id: Uuid,
    pub quote_id: Option<Uuid>,
    pub title: String,
    pub position: f64,
    pub counterargument: bool,
    pub counterargument_title: Option<String>,
}

impl Argument {
    /// Stance this argument contributes to its quote: counterarguments argue
    /// against the quote, so their sign is flipped.
    pub fn effective_position(&self) -> f64 {
        if self.counterargument {
            -self.position
        } else {
            self.position
        }
    }
}

// -- Curators --

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CuratorApplication {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub photo: Option<String>,
}

/// Curator status of a user within one topic. Written only by the approval
/// state machine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicCurator {
    pub user_id: Uuid,
    pub topic_id: Uuid,
    pub approved: Option<DateTime<Utc>>,
}

// -- Groups --

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupKind {
    Party,
    Faction,
    Committee,
    Other,
}

impl GroupKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Party => "party",
            Self::Faction => "faction",
            Self::Committee => "committee",
            Self::Other => "other",
        }
    }
}

impl FromStr for GroupKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "party" => Ok(Self::Party),
            "faction" => Ok(Self::Faction),
            "committee" => Ok(Self::Committee),
            "other" => Ok(Self::Other),
            other => Err(format!("unknown group kind: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub id: Uuid,
    pub title: String,
    pub kind: GroupKind,
    /// Reference instant used when resolving member affiliations.
    pub timestamp: DateTime<Utc>,
}

/// An actor belonging to a group over a time span. `until = None` means the
/// membership is still open.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Membership {
    pub actor_id: Uuid,
    pub group_id: Uuid,
    pub since: DateTime<Utc>,
    pub until: Option<DateTime<Utc>>,
}

impl Membership {
    pub fn is_active_at(&self, at: DateTime<Utc>) -> bool {
        self.since <= at && self.until.is_none_or(|until| until > at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn argument(position: f64, counterargument: bool) -> Argument {
        Argument {
            id: Uuid::new_v4(),
            topic_id: Uuid::new_v4(),
            post_id: Uuid::new_v4(),
            quote_id: None,
            title: "t".into(),
            position,
            counterargument,
            counterargument_title: None,
        }
    }

    #[test]
    fn counterargument_flips_sign() {
        assert_eq!(argument(1.0, false).effective_position(), 1.0);
        assert_eq!(argument(1.0, true).effective_position(), -1.0);
        assert_eq!(argument(-0.5, true).effective_position(), 0.5);
    }

    #[test]
    fn payload_kind_roundtrips_through_str() {
        for kind in [PayloadKind::Event, PayloadKind::Quote, PayloadKind::CuratorApplication] {
            assert_eq!(kind.as_str().parse::<PayloadKind>().unwrap(), kind);
        }
        assert!("curator".parse::<PayloadKind>().is_err());
    }

    #[test]
    fn membership_span_is_half_open() {
        let since = Utc.with_ymd_and_hms(2012, 11, 16, 0, 0, 0).unwrap();
        let until = Utc.with_ymd_and_hms(2016, 11, 14, 0, 0, 0).unwrap();
        let m = Membership {
            actor_id: Uuid::new_v4(),
            group_id: Uuid::new_v4(),
            since,
            until: Some(until),
        };
        assert!(m.is_active_at(since));
        assert!(!m.is_active_at(until));
        assert!(!m.is_active_at(since - chrono::Duration::days(1)));

        let open = Membership { until: None, ..m };
        assert!(open.is_active_at(until + chrono::Duration::days(365)));
    }
}
