//! Error types for redacty-core

use thiserror::Error;

pub type Result<T> = std::result::Result<T, AnonymizeError>;

#[derive(Error, Debug)]
pub enum AnonymizeError {
    /// Threshold age is negative. Detected before any query runs.
    #[error("Invalid age: {0} (number of days must be zero or greater)")]
    InvalidAge(i64),

    /// Table or column name that cannot be safely placed in SQL text.
    #[error(
        "Invalid {kind} name '{name}': only letters, digits and '_' are allowed, \
         and it must not start with a digit"
    )]
    InvalidIdentifier { kind: &'static str, name: String },

    #[error("Invalid email pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Failed to read confirmation: {0}")]
    Prompt(#[from] std::io::Error),
}

impl AnonymizeError {
    /// Configuration errors abort the run before any database I/O.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::InvalidAge(_) | Self::InvalidIdentifier { .. })
    }
}
