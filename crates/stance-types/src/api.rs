use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::events::ApprovalEvent;
use crate::models::{Actor, Argument, CuratorApplication, Event, Group, Post, Quote, Source};

// -- Votes --

/// Upvote and downvote sums of one ledger slice. `downvotes` is reported as a
/// positive magnitude.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteTally {
    pub upvotes: i64,
    pub downvotes: i64,
}

impl VoteTally {
    pub fn new(upvotes: i64, downvotes: i64) -> Self {
        Self { upvotes, downvotes }
    }

    /// Fold raw vote values into a tally. Zero votes count towards neither side.
    pub fn from_values<I: IntoIterator<Item = i64>>(values: I) -> Self {
        let mut tally = Self::default();
        for value in values {
            if value > 0 {
                tally.upvotes += value;
            } else if value < 0 {
                tally.downvotes += -value;
            }
        }
        tally
    }

    pub fn has_majority(&self) -> bool {
        self.upvotes > self.downvotes
    }
}

impl From<(i64, i64)> for VoteTally {
    fn from((upvotes, downvotes): (i64, i64)) -> Self {
        Self { upvotes, downvotes }
    }
}

/// Result of a curator vote: the recomputed curator tally and the approval
/// transition it caused.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CuratorVoteOutcome {
    pub tally: VoteTally,
    pub approval: ApprovalEvent,
}

// -- Arguments --

/// One talking point and how many approved arguments raised it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArgumentCount {
    pub position: f64,
    pub title: String,
    pub count: i64,
}

// -- Compatibility --

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActorDetail {
    pub actor: Actor,
    /// Political affiliation as of the compared group's reference time.
    pub group: Option<Group>,
    pub distance: f64,
}

/// One row of the two-column compatible/incompatible listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompatibilityRow {
    pub compatible: Option<ActorDetail>,
    pub incompatible: Option<ActorDetail>,
}

// -- Feed --

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteEntry {
    pub post: Post,
    pub quote: Quote,
    pub arguments: Vec<Argument>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum FeedItem {
    Event {
        post: Post,
        event: Event,
    },
    /// Consecutive quote posts taken from the same source.
    Quotes {
        source: Source,
        actor: Actor,
        quotes: Vec<QuoteEntry>,
    },
    CuratorApplication {
        post: Post,
        application: CuratorApplication,
    },
}

// -- Submissions --

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewEvent {
    pub title: String,
    pub source_link: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewSource {
    pub actor_id: Uuid,
    pub source_link: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewQuote {
    pub text: String,
    #[serde(default)]
    pub reference_link: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewArgument {
    pub title: String,
    pub position: f64,
    #[serde(default)]
    pub counterargument: bool,
    #[serde(default)]
    pub counterargument_title: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewCuratorApplication {
    pub title: String,
    #[serde(default)]
    pub photo: Option<String>,
}
