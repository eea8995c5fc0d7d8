//! Unified error type for the back-office data layer.

use thiserror::Error;

/// Every failure surfaced by the crate. Nothing is retried; callers get the
/// error synchronously and no partial write is left behind.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration file or settings problem
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// Error bubbled up from the ORM or the database driver
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// A field failed validation at write time
    #[error("Invalid {field}: {message}")]
    Validation {
        /// Name of the offending field
        field: &'static str,
        /// Field-specific message
        message: String,
    },

    /// Looked-up record does not exist
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Kind of record
        entity: &'static str,
        /// Identifier that was looked up
        id: String,
    },

    /// A uniqueness rule would be broken by the write
    #[error("Conflict: {message}")]
    Conflict {
        /// Description of the clash
        message: String,
    },

    /// Deletion refused because other records still reference the target
    #[error("Cannot delete {entity} {id}: still referenced by {dependents}")]
    Protected {
        /// Kind of record being deleted
        entity: &'static str,
        /// Identifier of the record being deleted
        id: i64,
        /// Description of the referencing records
        dependents: String,
    },

    /// A lifecycle status change that is not allowed
    #[error("{entity} cannot move from {from} to {to}")]
    InvalidTransition {
        /// Kind of record
        entity: &'static str,
        /// Current status
        from: String,
        /// Requested status
        to: String,
    },

    /// A required singleton configuration has not been set up yet
    #[error("No {what} configured")]
    NotConfigured {
        /// Which configuration is missing
        what: &'static str,
    },

    /// Building or sending an email failed
    #[error("Email error: {message}")]
    Email {
        /// Reason reported by the mail layer
        message: String,
    },

    /// JSON snapshot could not be encoded or decoded
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Filesystem access failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    pub(crate) fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

impl From<lettre::error::Error> for Error {
    fn from(err: lettre::error::Error) -> Self {
        Self::Email {
            message: err.to_string(),
        }
    }
}

impl From<lettre::address::AddressError> for Error {
    fn from(err: lettre::address::AddressError) -> Self {
        Self::Email {
            message: format!("invalid address: {err}"),
        }
    }
}

impl From<lettre::transport::smtp::Error> for Error {
    fn from(err: lettre::transport::smtp::Error) -> Self {
        Self::Email {
            message: err.to_string(),
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
