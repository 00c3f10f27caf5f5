//! Error types for chore-engine operations.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChoreError {
    /// Missing or invalid schedule configuration. Always names the chore so the
    /// host can surface it to the user.
    #[error("({chore}) {message}")]
    Configuration { chore: String, message: String },

    /// A date token that does not follow the `YYYY-MM-DD` (or `YYYY-MM-DD:delta`) form.
    #[error("Invalid date token '{token}': {reason}")]
    Parse { token: String, reason: String },
}

impl ChoreError {
    pub(crate) fn config(chore: &str, message: impl Into<String>) -> Self {
        ChoreError::Configuration {
            chore: chore.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn parse(token: &str, reason: impl ToString) -> Self {
        ChoreError::Parse {
            token: token.to_string(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ChoreError>;
