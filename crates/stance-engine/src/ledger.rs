//! Vote ledger and tallies.
//!
//! One current vote is kept per (user, post) and per (curator, post). A repeat
//! vote replaces the previous value. After every write the cached counters on
//! the post are recomputed from the ledger; curator writes additionally run
//! the approval state machine.

use std::collections::HashMap;

use tracing::debug;
use uuid::Uuid;

use stance_db::queries::{posts, votes};
use stance_types::api::{CuratorVoteOutcome, VoteTally};
use stance_types::models::Post;

use crate::approval;
use crate::error::{EngineError, Result};
use crate::Engine;

/// Vote count shown next to a post.
///
/// Approved posts show the user tally and a tie favours the positive count;
/// pending posts show the curator tally and need a strict majority to show a
/// positive count.
pub fn display_votes(post: &Post) -> i64 {
    if post.is_approved() {
        if post.upvotes >= post.downvotes {
            post.upvotes
        } else {
            -post.downvotes
        }
    } else if post.curator_upvotes > post.curator_downvotes {
        post.curator_upvotes
    } else {
        -post.curator_downvotes
    }
}

impl Engine {
    /// Upsert a user's vote and refresh the post's cached user tally.
    pub fn record_user_vote(&self, user_id: Uuid, post_id: Uuid, vote: i64) -> Result<VoteTally> {
        let now = self.now();
        self.db.with_tx(|tx| {
            posts::get_post(tx, post_id)?.ok_or_else(|| EngineError::not_found("post", post_id))?;

            votes::upsert_user_vote(tx, user_id, post_id, vote, now)?;
            let tally = votes::sum_user_votes(tx, post_id)?;
            posts::update_user_tally(tx, post_id, tally)?;

            debug!(%post_id, %user_id, vote, ?tally, "User vote recorded");
            Ok(tally)
        })
    }

    /// Upsert a curator's vote, recompute the curator tally and run the
    /// approval transition with its hooks, all in one transaction.
    pub fn record_curator_vote(
        &self,
        curator_id: Uuid,
        post_id: Uuid,
        vote: i64,
    ) -> Result<CuratorVoteOutcome> {
        let now = self.now();
        self.db.with_tx(|tx| {
            let post = posts::get_post(tx, post_id)?
                .ok_or_else(|| EngineError::not_found("post", post_id))?;

            votes::upsert_curator_vote(tx, curator_id, post_id, vote, now)?;
            let (tally, approval) = approval::apply_curator_tally(tx, &post, now)?;
            approval::run_hooks(&self.hooks, tx, &approval)?;

            debug!(%post_id, %curator_id, vote, ?tally, "Curator vote recorded");
            Ok(CuratorVoteOutcome { tally, approval })
        })
    }

    pub fn tally_user_votes(&self, post_id: Uuid) -> Result<VoteTally> {
        self.db.with_conn(|conn| {
            posts::get_post(conn, post_id)?.ok_or_else(|| EngineError::not_found("post", post_id))?;
            Ok(votes::sum_user_votes(conn, post_id)?)
        })
    }

    pub fn tally_curator_votes(&self, post_id: Uuid) -> Result<VoteTally> {
        self.db.with_conn(|conn| {
            posts::get_post(conn, post_id)?.ok_or_else(|| EngineError::not_found("post", post_id))?;
            Ok(votes::sum_curator_votes(conn, post_id)?)
        })
    }

    /// Number of user and curator ledger rows held for a post.
    pub fn ledger_rows(&self, post_id: Uuid) -> Result<(i64, i64)> {
        self.db.with_conn(|conn| {
            Ok((
                votes::count_user_votes(conn, post_id)?,
                votes::count_curator_votes(conn, post_id)?,
            ))
        })
    }

    pub fn post(&self, post_id: Uuid) -> Result<Post> {
        self.db.with_conn(|conn| {
            posts::get_post(conn, post_id)?.ok_or_else(|| EngineError::not_found("post", post_id))
        })
    }

    pub fn display_votes(&self, post_id: Uuid) -> Result<i64> {
        Ok(display_votes(&self.post(post_id)?))
    }

    /// The user's votes on the posts of a topic, keyed by post id.
    pub fn user_topic_votes(&self, user_id: Uuid, topic_id: Uuid) -> Result<HashMap<Uuid, i64>> {
        self.db.with_conn(|conn| {
            Ok(votes::user_topic_votes(conn, user_id, topic_id)?.into_iter().collect())
        })
    }

    /// The curator's votes on the posts of a topic, keyed by post id.
    pub fn curator_topic_votes(&self, user_id: Uuid, topic_id: Uuid) -> Result<HashMap<Uuid, i64>> {
        self.db.with_conn(|conn| {
            Ok(votes::curator_topic_votes(conn, user_id, topic_id)?.into_iter().collect())
        })
    }
}
