//! JSON envelopes and error responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::OffsetDateTime;
use tracing::{debug, error};
use utoipa::ToSchema;

use crate::error::{StorageError, ValidationError};
use crate::message::Message;
use crate::metrics;

/// Public message for failed list requests.
pub const FETCH_FAILED: &str = "Failed to fetch messages";
/// Public message for failed create requests.
pub const CREATE_FAILED: &str = "Failed to create message";
/// Public message for unmatched routes.
pub const ROUTE_NOT_FOUND: &str = "Route not found";

/// Root banner response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RootResponse {
    /// Banner text.
    pub message: String,
}

/// Health check response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Always "OK".
    pub status: String,
    /// Server time.
    #[serde(with = "time::serde::rfc3339")]
    #[schema(value_type = String, format = DateTime)]
    pub timestamp: OffsetDateTime,
}

/// `GET /messages` response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageListResponse {
    /// Always true.
    pub success: bool,
    /// Number of entries in `messages`.
    pub count: usize,
    /// Messages, newest first.
    pub messages: Vec<Message>,
}

/// `POST /messages` response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreatedMessageResponse {
    /// Always true.
    pub success: bool,
    /// The stored message.
    pub message: Message,
}

/// Error envelope used for every failure.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Always false.
    pub success: bool,
    /// Human-readable reason.
    pub error: String,
}

impl ErrorResponse {
    /// Build a failure envelope.
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
        }
    }
}

/// Error returned by request handlers.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Client-caused failure, reported verbatim.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Store failure; only `public` reaches the client.
    #[error("{public}: {source}")]
    Storage {
        /// Message sent to the client.
        public: &'static str,
        /// Underlying failure, logged only.
        #[source]
        source: StorageError,
    },
}

impl ApiError {
    /// Store failure while listing.
    pub fn fetch(source: StorageError) -> Self {
        ApiError::Storage {
            public: FETCH_FAILED,
            source,
        }
    }

    /// Store failure while creating.
    pub fn create(source: StorageError) -> Self {
        ApiError::Storage {
            public: CREATE_FAILED,
            source,
        }
    }

    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Storage { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            ApiError::Validation(err) => {
                debug!(reason = %err, "Rejected create request");
                metrics::inc_validation_rejections();
                ErrorResponse::new(err.to_string())
            }
            ApiError::Storage { public, source } => {
                error!(error = %source, "{}", public);
                metrics::inc_storage_errors();
                ErrorResponse::new(public)
            }
        };

        (status, Json(body)).into_response()
    }
}

/// 404 for any route or method the API does not serve.
pub async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(ErrorResponse::new(ROUTE_NOT_FOUND)))
}
