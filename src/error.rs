//! Unified error types for the guestbook service and client.

use thiserror::Error;

use crate::message::{MESSAGE_MAX_LEN, NAME_MAX_LEN};

/// Unified error type for the guestbook.
#[derive(Error, Debug)]
pub enum GuestbookError {
    /// Configuration loading error.
    #[error("configuration error: {0}")]
    Config(#[from] envy::Error),

    /// Configuration loaded but failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Storage error.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Client-side API error.
    #[error("client error: {0}")]
    Client(#[from] ClientError),
}

/// Client-caused input errors. Every variant maps to HTTP 400.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// `name` or `message` missing, or empty after trimming.
    #[error("Name and message are required")]
    MissingFields,

    /// Trimmed `name` longer than the limit.
    #[error("Name must be less than {} characters", NAME_MAX_LEN)]
    NameTooLong,

    /// Trimmed `message` longer than the limit.
    #[error("Message must be less than {} characters", MESSAGE_MAX_LEN)]
    MessageTooLong,

    /// Body is not a JSON object with string fields.
    #[error("Invalid request body: {0}")]
    InvalidBody(String),
}

/// Persistence failures. Every variant maps to HTTP 500 with a generic message.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Query or connection failure from the database driver.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Schema migration failure.
    #[error("migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    /// Store refused the operation (used by the in-memory store).
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Errors seen by the guestbook client.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Transport failure: connection refused, DNS, malformed response body.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// API answered with a non-success status or `success: false`.
    #[error("api error (HTTP {status}): {}", .error.as_deref().unwrap_or("no error message"))]
    Api {
        /// HTTP status code.
        status: u16,
        /// Server-provided error text, if any.
        error: Option<String>,
    },

    /// Base URL could not be joined with an endpoint path.
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),
}

impl ClientError {
    /// Server-provided error text, when the API sent one.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ClientError::Api { error, .. } => error.as_deref(),
            _ => None,
        }
    }
}

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, GuestbookError>;
