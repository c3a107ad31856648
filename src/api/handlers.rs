//! HTTP API handlers.

use std::fmt;
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use time::OffsetDateTime;
use tracing::{info, instrument};

use crate::error::ValidationError;
use crate::message::{validate, CreateMessageRequest};
use crate::metrics::{self, LatencyTimer};
use crate::store::MessageStore;

use super::response::{
    ApiError, CreatedMessageResponse, ErrorResponse, HealthResponse, MessageListResponse,
    RootResponse,
};

/// Application state shared with handlers.
#[derive(Clone)]
pub struct AppState {
    /// Message storage handle.
    pub store: Arc<dyn MessageStore>,
}

impl AppState {
    /// Create app state around an already shared store.
    pub fn new(store: Arc<dyn MessageStore>) -> Self {
        Self { store }
    }

    /// Create app state that owns the given store.
    pub fn from_store<S: MessageStore + 'static>(store: S) -> Self {
        Self::new(Arc::new(store))
    }
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState").finish_non_exhaustive()
    }
}

/// Banner handler.
#[utoipa::path(
    get,
    path = "/",
    tag = "guestbook",
    responses((status = 200, description = "API is running", body = RootResponse))
)]
pub async fn root() -> impl IntoResponse {
    Json(RootResponse {
        message: "Guestbook API is running!".to_string(),
    })
}

/// Health check handler - always returns 200.
#[utoipa::path(
    get,
    path = "/health",
    tag = "guestbook",
    responses((status = 200, description = "Service is up", body = HealthResponse))
)]
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "OK".to_string(),
        timestamp: OffsetDateTime::now_utc(),
    })
}

/// List all messages, newest first.
#[utoipa::path(
    get,
    path = "/messages",
    tag = "guestbook",
    responses(
        (status = 200, description = "All messages, newest first", body = MessageListResponse),
        (status = 500, description = "Store failure", body = ErrorResponse)
    )
)]
#[instrument(skip_all)]
pub async fn list_messages(
    State(state): State<AppState>,
) -> Result<Json<MessageListResponse>, ApiError> {
    let _timer = LatencyTimer::new("GET /messages");

    let messages = state.store.list_messages().await.map_err(ApiError::fetch)?;
    metrics::inc_messages_listed();

    Ok(Json(MessageListResponse {
        success: true,
        count: messages.len(),
        messages,
    }))
}

/// Validate and store a new message.
#[utoipa::path(
    post,
    path = "/messages",
    tag = "guestbook",
    request_body = CreateMessageRequest,
    responses(
        (status = 201, description = "Message stored", body = CreatedMessageResponse),
        (status = 400, description = "Missing or oversized field", body = ErrorResponse),
        (status = 500, description = "Store failure", body = ErrorResponse)
    )
)]
#[instrument(skip_all)]
pub async fn create_message(
    State(state): State<AppState>,
    payload: Result<Json<CreateMessageRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreatedMessageResponse>), ApiError> {
    let _timer = LatencyTimer::new("POST /messages");

    let Json(request) =
        payload.map_err(|rejection| ValidationError::InvalidBody(rejection.body_text()))?;
    let new = validate(&request)?;

    let message = state
        .store
        .create_message(new)
        .await
        .map_err(ApiError::create)?;

    info!(id = message.id, "Message created");
    metrics::inc_messages_created();

    Ok((
        StatusCode::CREATED,
        Json(CreatedMessageResponse {
            success: true,
            message,
        }),
    ))
}
