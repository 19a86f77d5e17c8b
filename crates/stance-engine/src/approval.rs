//! Curator consensus state machine.
//!
//! A post is PENDING while its approval marker is absent and APPROVED while it
//! carries a timestamp. Every curator vote recomputes the curator tally; a
//! strict majority of upvotes approves (and re-stamps) the post, anything else
//! puts it back to pending. There is no terminal rejected state.
//!
//! Dependent state is updated by [`TransitionHook`]s, which the engine calls
//! synchronously inside the same transaction as the transition.

use chrono::{DateTime, Utc};
use rusqlite::Connection;
use tracing::{debug, info};
use uuid::Uuid;

use stance_db::queries::{content, curators, posts, votes};
use stance_types::api::VoteTally;
use stance_types::events::ApprovalEvent;
use stance_types::models::{Payload, Post, TopicCurator};

use crate::error::{EngineError, Result};
use crate::{Engine, positions};

/// Reacts to an approval transition of a post.
///
/// Hooks run on every recompute, including re-stamps of an already approved
/// post, and share the transaction of the vote that caused it. An error
/// rolls the vote back.
pub trait TransitionHook: Send + Sync {
    fn name(&self) -> &'static str;

    fn on_transition(&self, conn: &Connection, event: &ApprovalEvent) -> Result<()>;
}

/// Approval marker produced by a curator tally.
pub fn decide(tally: VoteTally, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    tally.has_majority().then_some(now)
}

/// Recompute the curator tally of `post` from the log and persist the tally
/// together with the resulting approval marker.
pub(crate) fn apply_curator_tally(
    conn: &Connection,
    post: &Post,
    now: DateTime<Utc>,
) -> Result<(VoteTally, ApprovalEvent)> {
    let tally = votes::sum_curator_votes(conn, post.id)?;
    let approved = decide(tally, now);
    posts::update_curator_state(conn, post.id, tally, approved)?;

    let was_approved = post.is_approved();
    let event = match approved {
        Some(at) => ApprovalEvent::Approved {
            post_id: post.id,
            topic_id: post.topic_id,
            payload: post.payload,
            at,
            was_approved,
        },
        None => ApprovalEvent::Pending {
            post_id: post.id,
            topic_id: post.topic_id,
            payload: post.payload,
            was_approved,
        },
    };

    if event.state_changed() {
        info!(
            post_id = %post.id,
            payload = %post.payload.kind(),
            upvotes = tally.upvotes,
            downvotes = tally.downvotes,
            "Post {}",
            if approved.is_some() { "approved" } else { "reverted to pending" }
        );
    } else {
        debug!(post_id = %post.id, ?tally, approved = approved.is_some(), "Curator tally recomputed");
    }

    Ok((tally, event))
}

pub(crate) fn run_hooks(
    hooks: &[Box<dyn TransitionHook>],
    conn: &Connection,
    event: &ApprovalEvent,
) -> Result<()> {
    for hook in hooks {
        debug!(hook = hook.name(), post_id = %event.post_id(), "Running transition hook");
        hook.on_transition(conn, event)?;
    }
    Ok(())
}

/// Keeps the applicant's curator membership in lockstep with the approval
/// state of their application post.
pub struct CuratorMembershipCascade;

impl TransitionHook for CuratorMembershipCascade {
    fn name(&self) -> &'static str {
        "curator_membership_cascade"
    }

    fn on_transition(&self, conn: &Connection, event: &ApprovalEvent) -> Result<()> {
        let Payload::CuratorApplication(application_id) = event.payload() else {
            return Ok(());
        };

        let application = content::get_curator_application(conn, application_id)?
            .ok_or_else(|| EngineError::not_found("curator application", application_id))?;

        curators::upsert_topic_curator(
            conn,
            application.user_id,
            event.topic_id(),
            event.approved_at(),
        )?;

        if event.state_changed() {
            info!(
                user_id = %application.user_id,
                topic_id = %event.topic_id(),
                curator = event.approved_at().is_some(),
                "Topic curator membership updated"
            );
        }
        Ok(())
    }
}

/// Recomputes the cached position of the source a quote post belongs to,
/// since only approved arguments count towards it.
pub struct SourcePositionRefresh;

impl TransitionHook for SourcePositionRefresh {
    fn name(&self) -> &'static str {
        "source_position_refresh"
    }

    fn on_transition(&self, conn: &Connection, event: &ApprovalEvent) -> Result<()> {
        let Payload::Quote(quote_id) = event.payload() else {
            return Ok(());
        };

        let quote = content::get_quote(conn, quote_id)?
            .ok_or_else(|| EngineError::not_found("quote", quote_id))?;
        positions::refresh_source_position(conn, event.topic_id(), quote.source_id)?;
        Ok(())
    }
}

impl Engine {
    pub fn is_topic_curator(&self, user_id: Uuid, topic_id: Uuid) -> Result<bool> {
        self.db
            .with_conn(|conn| Ok(curators::is_topic_curator(conn, user_id, topic_id)?))
    }

    pub fn topic_curator(&self, user_id: Uuid, topic_id: Uuid) -> Result<Option<TopicCurator>> {
        self.db
            .with_conn(|conn| Ok(curators::get_topic_curator(conn, user_id, topic_id)?))
    }
}
