use thiserror::Error;
use uuid::Uuid;

use stance_db::DbError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: Uuid },

    /// The store rejected content that collides with an existing row and
    /// get-or-create could not resolve it.
    #[error("duplicate content: {detail}")]
    DuplicateContent { detail: String },

    #[error(transparent)]
    Store(DbError),
}

impl EngineError {
    pub fn not_found(entity: &'static str, id: Uuid) -> Self {
        Self::NotFound { entity, id }
    }
}

impl From<DbError> for EngineError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Sqlite(rusqlite::Error::SqliteFailure(e, msg))
                if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
            {
                Self::DuplicateContent {
                    detail: msg.unwrap_or_else(|| e.to_string()),
                }
            }
            other => Self::Store(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_violation_maps_to_duplicate_content() {
        let failure = rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE),
            Some("UNIQUE constraint failed: events.source_link".into()),
        );
        let err = EngineError::from(DbError::Sqlite(failure));
        assert!(matches!(err, EngineError::DuplicateContent { .. }));
        assert!(err.to_string().contains("events.source_link"));
    }

    #[test]
    fn other_store_errors_pass_through() {
        let err = EngineError::from(DbError::LockPoisoned("boom".into()));
        assert!(matches!(err, EngineError::Store(DbError::LockPoisoned(_))));
    }
}
