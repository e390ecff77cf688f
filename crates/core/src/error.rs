use crate::types::EntityId;
use crate::validation::ValidationError;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: EntityId },

    #[error("No cabinets found with letter {letter}")]
    LetterNotFound { letter: char },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Precondition failed: {0}")]
    PreconditionFailed(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub fn cabinet_not_found(id: EntityId) -> Self {
        CoreError::NotFound {
            entity: "Cabinet",
            id,
        }
    }

    pub fn cassette_not_found(id: EntityId) -> Self {
        CoreError::NotFound {
            entity: "Cassette",
            id,
        }
    }
}
