use uuid::Uuid;

use stance_db::queries::positions;
use stance_types::api::ArgumentCount;

use crate::error::Result;
use crate::Engine;

/// Split ranked talking points into (supporting, opposing) display rows.
///
/// Positive and negative arguments keep their ranked order and are zipped
/// side by side; the shorter column is padded with `None`. Neutral
/// (zero-position) points belong to neither column.
pub fn pair_arguments_by_stance(
    ranked: Vec<ArgumentCount>,
) -> Vec<(Option<ArgumentCount>, Option<ArgumentCount>)> {
    let (positive, rest): (Vec<_>, Vec<_>) = ranked.into_iter().partition(|a| a.position > 0.0);
    let negative: Vec<_> = rest.into_iter().filter(|a| a.position < 0.0).collect();

    let rows = positive.len().max(negative.len());
    let mut positive = positive.into_iter();
    let mut negative = negative.into_iter();
    (0..rows).map(|_| (positive.next(), negative.next())).collect()
}

impl Engine {
    /// Most common direct talking points of a topic, ordered by position
    /// desc, count desc, title asc.
    pub fn rank_arguments(&self, topic_id: Uuid) -> Result<Vec<ArgumentCount>> {
        self.db.with_conn(|conn| {
            let rows = positions::argument_counts(conn, topic_id)?;
            Ok(rows
                .into_iter()
                .map(|row| ArgumentCount {
                    position: row.position,
                    title: row.title,
                    count: row.count,
                })
                .collect())
        })
    }
}
