//! Error type for record store operations.

use tapeshelf_core::error::CoreError;
use tapeshelf_core::types::EntityId;

/// PostgreSQL `unique_violation`.
const PG_UNIQUE_VIOLATION: &str = "23505";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A record with this id already exists.
    #[error("{entity} with id {id} already exists")]
    Duplicate { entity: &'static str, id: EntityId },

    /// The backing store could not be reached.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Any other database failure.
    #[error("database error: {0}")]
    Database(sqlx::Error),
}

impl StoreError {
    /// Classify an insert failure, turning unique violations into
    /// [`StoreError::Duplicate`].
    pub(crate) fn on_insert(err: sqlx::Error, entity: &'static str, id: EntityId) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.code().as_deref() == Some(PG_UNIQUE_VIOLATION) {
                return StoreError::Duplicate { entity, id };
            }
        }
        err.into()
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
                StoreError::Unavailable(err.to_string())
            }
            sqlx::Error::Io(_) | sqlx::Error::Tls(_) => StoreError::Unavailable(err.to_string()),
            other => StoreError::Database(other),
        }
    }
}

impl From<StoreError> for CoreError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate { .. } => CoreError::Conflict(err.to_string()),
            StoreError::Unavailable(msg) => {
                tracing::error!(error = %msg, "Record store unavailable");
                CoreError::Unavailable(msg)
            }
            other => {
                tracing::error!(error = %other, "Record store failure");
                CoreError::Internal(other.to_string())
            }
        }
    }
}
