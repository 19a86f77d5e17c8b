use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("DB lock poisoned: {0}")]
    LockPoisoned(String),

    /// A stored value could not be mapped back to its model (bad uuid, unknown tag).
    #[error("invalid row in {table}: {detail}")]
    InvalidRow { table: &'static str, detail: String },
}

pub type Result<T> = std::result::Result<T, DbError>;
