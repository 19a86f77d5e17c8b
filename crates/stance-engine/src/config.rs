use serde::Deserialize;

use stance_types::models::GroupKind;

/// Tunables of the engine. The defaults are what the platform runs with.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Distances strictly below this are compatible, the rest incompatible.
    pub compatibility_threshold: f64,
    /// Maximum number of two-column rows in a compatibility listing.
    pub compatibility_limit: usize,
    /// Group kind that counts as an actor's political affiliation.
    pub affiliation_group_kind: GroupKind,
    /// Posts submitted by a topic curator start out approved.
    pub auto_approve_curator_posts: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            compatibility_threshold: 0.4,
            compatibility_limit: 20,
            affiliation_group_kind: GroupKind::Party,
            auto_approve_curator_posts: true,
        }
    }
}
