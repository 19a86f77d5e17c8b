//! Two-column compatible/incompatible actor listing.
//!
//! Input is an externally computed list of `(actor, distance)` pairs sorted by
//! ascending distance. Actors below the threshold fill the left column in
//! that order; the rest fill the right column most-incompatible first.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use stance_db::queries::{content, groups};
use stance_types::api::{ActorDetail, CompatibilityRow};
use stance_types::models::{Actor, Group, Membership};

use crate::error::{EngineError, Result};
use crate::Engine;

pub type Distance = (Uuid, f64);

/// Pair compatible entries (distance < threshold, ascending) with
/// incompatible ones (distance >= threshold, descending), up to `limit` rows.
pub fn pair_by_threshold(
    distances: &[Distance],
    threshold: f64,
    limit: usize,
) -> Vec<(Option<Distance>, Option<Distance>)> {
    let mut compatible = distances.iter().copied().filter(|(_, d)| *d < threshold);
    let mut incompatible = distances.iter().rev().copied().filter(|(_, d)| *d >= threshold);

    let mut rows = Vec::new();
    while rows.len() < limit {
        match (compatible.next(), incompatible.next()) {
            (None, None) => break,
            pair => rows.push(pair),
        }
    }
    rows
}

/// The group an actor belonged to at `at`: the most recent membership whose
/// span covers that instant. `memberships` must be ordered by `since` desc.
pub fn affiliation_at(memberships: &[(Membership, Group)], actor_id: Uuid, at: DateTime<Utc>) -> Option<Group> {
    memberships
        .iter()
        .find(|(m, _)| m.actor_id == actor_id && m.is_active_at(at))
        .map(|(_, g)| g.clone())
}

impl Engine {
    /// Actors that have been members of a group.
    pub fn group_members(&self, group_id: Uuid) -> Result<Vec<Actor>> {
        self.db.with_conn(|conn| {
            let ids = groups::group_member_ids(conn, group_id)?;
            Ok(content::get_actors(conn, &ids)?)
        })
    }

    /// Build the compatibility listing for a group from precomputed distances.
    pub fn rank_compatibility(
        &self,
        group_id: Uuid,
        distances: &[Distance],
    ) -> Result<Vec<CompatibilityRow>> {
        let pairs = pair_by_threshold(
            distances,
            self.config.compatibility_threshold,
            self.config.compatibility_limit,
        );

        self.db.with_conn(|conn| {
            let group = groups::get_group(conn, group_id)?
                .ok_or_else(|| EngineError::not_found("group", group_id))?;

            let ids: Vec<Uuid> = pairs
                .iter()
                .flat_map(|(l, r)| [l.map(|(id, _)| id), r.map(|(id, _)| id)])
                .flatten()
                .collect();
            let actors: HashMap<Uuid, Actor> = content::get_actors(conn, &ids)?
                .into_iter()
                .map(|a| (a.id, a))
                .collect();
            let memberships =
                groups::memberships_of_kind(conn, &ids, self.config.affiliation_group_kind)?;

            let detail = |entry: Option<Distance>| -> Result<Option<ActorDetail>> {
                let Some((actor_id, distance)) = entry else {
                    return Ok(None);
                };
                let actor = actors
                    .get(&actor_id)
                    .cloned()
                    .ok_or_else(|| EngineError::not_found("actor", actor_id))?;
                Ok(Some(ActorDetail {
                    actor,
                    group: affiliation_at(&memberships, actor_id, group.timestamp),
                    distance,
                }))
            };

            pairs
                .into_iter()
                .map(|(left, right)| {
                    Ok(CompatibilityRow {
                        compatible: detail(left)?,
                        incompatible: detail(right)?,
                    })
                })
                .collect()
        })
    }
}
