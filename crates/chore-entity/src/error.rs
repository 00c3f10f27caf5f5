//! Error types for the chore entity adapter.

use chore_engine::ChoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EntityError {
    #[error(transparent)]
    Chore(#[from] ChoreError),

    #[error("Invalid timezone: {0}")]
    Timezone(String),

    #[error("Invalid attributes: {0}")]
    Attributes(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, EntityError>;
