//! Position aggregation and moderation engine.
//!
//! Votes go into a ledger keyed by (voter, post); curator votes drive a
//! pending/approved state machine; approved arguments feed consensus
//! positions, talking-point rankings and the compatibility listing.

pub mod approval;
pub mod arguments;
pub mod catalog;
pub mod compatibility;
pub mod config;
pub mod error;
pub mod feed;
pub mod ledger;
pub mod positions;
pub mod submit;

pub use config::EngineConfig;
pub use error::{EngineError, Result};

use chrono::{DateTime, Utc};

use stance_db::Database;

use crate::approval::{CuratorMembershipCascade, SourcePositionRefresh, TransitionHook};

pub struct Engine {
    db: Database,
    config: EngineConfig,
    hooks: Vec<Box<dyn TransitionHook>>,
}

impl Engine {
    /// Build an engine with the standard post-transition hooks: curator
    /// membership cascade and source position refresh.
    pub fn new(db: Database, config: EngineConfig) -> Self {
        Self {
            db,
            config,
            hooks: vec![
                Box::new(CuratorMembershipCascade),
                Box::new(SourcePositionRefresh),
            ],
        }
    }

    /// Register an extra hook, run after the standard ones.
    pub fn with_hook(mut self, hook: impl TransitionHook + 'static) -> Self {
        self.hooks.push(Box::new(hook));
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
