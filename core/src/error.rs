use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{entity} '{id}' not found")]
    NotFound { entity: &'static str, id: String },

    #[error("Employee '{employee_id}' is already a member of pool '{pool_id}'")]
    DuplicateMember {
        pool_id: String,
        employee_id: String,
    },

    #[error("Employee '{employee_id}' is already a successor for role '{role_id}'")]
    DuplicateSuccessor {
        role_id: String,
        employee_id: String,
    },

    #[error("Write conflict on {entity} '{id}' after {attempts} attempts")]
    VersionConflict {
        entity: &'static str,
        id: String,
        attempts: u32,
    },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type EngineResult<T> = Result<T, EngineError>;
