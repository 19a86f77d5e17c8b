use rusqlite::{Connection, Row, params};
use uuid::Uuid;

use stance_types::models::{Group, GroupKind, Membership};

use crate::error::Result;
use crate::models::{GroupRow, MembershipRow, parse_id};
use crate::queries::OptionalExt;

fn group_row(row: &Row<'_>) -> rusqlite::Result<GroupRow> {
    Ok(GroupRow {
        id: row.get(0)?,
        title: row.get(1)?,
        kind: row.get(2)?,
        timestamp: row.get(3)?,
    })
}

pub fn insert_group(conn: &Connection, group: &Group) -> Result<()> {
    conn.execute(
        "INSERT INTO actor_groups (id, title, kind, timestamp) VALUES (?1, ?2, ?3, ?4)",
        params![
            group.id.to_string(),
            group.title,
            group.kind.as_str(),
            group.timestamp
        ],
    )?;
    Ok(())
}

pub fn get_group(conn: &Connection, id: Uuid) -> Result<Option<Group>> {
    let row = conn
        .query_row(
            "SELECT id, title, kind, timestamp FROM actor_groups WHERE id = ?1",
            [id.to_string()],
            group_row,
        )
        .optional()?;
    row.map(Group::try_from).transpose()
}

pub fn insert_membership(conn: &Connection, membership: &Membership) -> Result<()> {
    conn.execute(
        "INSERT INTO memberships (actor_id, group_id, since, until) VALUES (?1, ?2, ?3, ?4)",
        params![
            membership.actor_id.to_string(),
            membership.group_id.to_string(),
            membership.since,
            membership.until
        ],
    )?;
    Ok(())
}

/// Distinct actors that have ever been members of a group.
pub fn group_member_ids(conn: &Connection, group_id: Uuid) -> Result<Vec<Uuid>> {
    let mut stmt = conn.prepare(
        "SELECT DISTINCT actor_id FROM memberships WHERE group_id = ?1 ORDER BY actor_id",
    )?;
    let rows = stmt
        .query_map([group_id.to_string()], |row| row.get::<_, String>(0))?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    rows.iter().map(|id| parse_id("memberships", id)).collect()
}

/// Memberships of the given actors in groups of one kind, joined with the
/// group, most recent `since` first.
pub fn memberships_of_kind(
    conn: &Connection,
    actor_ids: &[Uuid],
    kind: GroupKind,
) -> Result<Vec<(Membership, Group)>> {
    if actor_ids.is_empty() {
        return Ok(vec![]);
    }

    // ?1 is the kind; actor ids follow from ?2.
    let actor_placeholders: Vec<String> =
        (2..=actor_ids.len() + 1).map(|i| format!("?{}", i)).collect();
    let sql = format!(
        "SELECT m.actor_id, m.group_id, m.since, m.until, g.id, g.title, g.kind, g.timestamp
         FROM memberships m
         JOIN actor_groups g ON m.group_id = g.id
         WHERE g.kind = ?1 AND m.actor_id IN ({})
         ORDER BY m.since DESC, m.id DESC",
        actor_placeholders.join(", ")
    );

    let mut values: Vec<String> = Vec::with_capacity(actor_ids.len() + 1);
    values.push(kind.as_str().to_string());
    values.extend(actor_ids.iter().map(Uuid::to_string));

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(rusqlite::params_from_iter(values.iter()), |row| {
            Ok((
                MembershipRow {
                    actor_id: row.get(0)?,
                    group_id: row.get(1)?,
                    since: row.get(2)?,
                    until: row.get(3)?,
                },
                GroupRow {
                    id: row.get(4)?,
                    title: row.get(5)?,
                    kind: row.get(6)?,
                    timestamp: row.get(7)?,
                },
            ))
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    rows.into_iter()
        .map(|(m, g)| Ok((Membership::try_from(m)?, Group::try_from(g)?)))
        .collect()
}
