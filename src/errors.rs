//! Unified error types for `BudgetBuddy`.
//!
//! Every service returns [`Result`]. The variants map onto a small set of
//! [`ErrorKind`]s that decide how the presentation layer reports a failure.

use thiserror::Error;

/// Broad classification of an [`Error`], used to decide how a failure is surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing or invalid caller identity, or a capability the caller lacks
    Auth,
    /// Malformed or out-of-range input
    Validation,
    /// Underlying persistence failure
    Store,
    /// Artifact storage failure
    Upload,
    /// Generative API unreachable or returned something unusable
    ExternalService,
    /// Anything else (configuration, framework, I/O)
    Internal,
}

/// Crate-wide error type.
#[derive(Debug, Error)]
pub enum Error {
    /// No authenticated identity was supplied
    #[error("Authentication required: {message}")]
    Auth {
        /// Why the identity was rejected
        message: String,
    },

    /// Input failed validation
    #[error("Invalid input: {message}")]
    Validation {
        /// Human-readable description of the problem
        message: String,
    },

    /// Amount was zero, negative, or not a finite number
    #[error("Invalid amount: {amount}")]
    InvalidAmount {
        /// The offending amount
        amount: f64,
    },

    /// A referenced record does not exist
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Kind of record (e.g. "Premium request")
        entity: &'static str,
        /// Identifier that was looked up
        id: String,
    },

    /// The caller is authenticated but lacks the required role
    #[error("Not allowed: {message}")]
    Forbidden {
        /// What was attempted
        message: String,
    },

    /// The operation requires a premium profile
    #[error("This feature requires a premium account")]
    PremiumRequired,

    /// A premium request was asked to leave a state it is not in
    #[error("Request {id} is already {status}")]
    InvalidTransition {
        /// Request identifier
        id: i64,
        /// Current (terminal) status
        status: String,
    },

    /// Storing the payment proof artifact failed
    #[error("Upload failed: {message}")]
    Upload {
        /// Underlying cause
        message: String,
    },

    /// The generative insights API failed or returned unusable output
    #[error("External service error: {message}")]
    ExternalService {
        /// Underlying cause
        message: String,
    },

    /// Configuration could not be loaded or is inconsistent
    #[error("Configuration error: {message}")]
    Config {
        /// Underlying cause
        message: String,
    },

    /// Database error from `SeaORM`
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Environment variable error
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Formatting error while building a reply
    #[error("Formatting error: {0}")]
    Fmt(#[from] std::fmt::Error),

    /// Serenity/Poise framework error
    #[error("Serenity/Poise framework error: {0}")]
    Framework(Box<poise::serenity_prelude::Error>),
}

impl From<poise::serenity_prelude::Error> for Error {
    fn from(value: poise::serenity_prelude::Error) -> Self {
        Self::Framework(Box::new(value))
    }
}

impl Error {
    /// Shorthand for a [`Error::Validation`] with the given message.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Classifies this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Auth { .. } | Self::Forbidden { .. } | Self::PremiumRequired => ErrorKind::Auth,
            Self::Validation { .. }
            | Self::InvalidAmount { .. }
            | Self::NotFound { .. }
            | Self::InvalidTransition { .. } => ErrorKind::Validation,
            Self::Database(_) => ErrorKind::Store,
            Self::Upload { .. } => ErrorKind::Upload,
            Self::ExternalService { .. } | Self::Http(_) | Self::Json(_) => {
                ErrorKind::ExternalService
            }
            Self::Config { .. }
            | Self::Io(_)
            | Self::EnvVar(_)
            | Self::Fmt(_)
            | Self::Framework(_) => ErrorKind::Internal,
        }
    }

    /// Short message suitable for showing to the person who issued the command.
    ///
    /// Validation and auth failures carry their own message; store and internal
    /// failures are reported generically since their details only belong in logs.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self.kind() {
            ErrorKind::Auth | ErrorKind::Validation | ErrorKind::Upload => self.to_string(),
            ErrorKind::Store => "Something went wrong while saving your data. Please try again."
                .to_string(),
            ErrorKind::ExternalService | ErrorKind::Internal => {
                "Something went wrong. Please try again later.".to_string()
            }
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        assert_eq!(
            Error::Auth {
                message: "missing".to_string()
            }
            .kind(),
            ErrorKind::Auth
        );
        assert_eq!(Error::PremiumRequired.kind(), ErrorKind::Auth);
        assert_eq!(Error::InvalidAmount { amount: -1.0 }.kind(), ErrorKind::Validation);
        assert_eq!(
            Error::Database(sea_orm::DbErr::Custom("boom".to_string())).kind(),
            ErrorKind::Store
        );
        assert_eq!(
            Error::Upload {
                message: "disk full".to_string()
            }
            .kind(),
            ErrorKind::Upload
        );
    }

    #[test]
    fn test_user_message_hides_store_details() {
        let err = Error::Database(sea_orm::DbErr::Custom("secret table name".to_string()));
        assert!(!err.user_message().contains("secret"));

        let err = Error::validation("Category cannot be empty");
        assert_eq!(err.user_message(), "Invalid input: Category cannot be empty");
    }
}
