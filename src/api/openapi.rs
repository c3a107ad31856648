//! OpenAPI document for the guestbook API.

use axum::Json;
use utoipa::OpenApi;

use super::handlers;

/// Generated OpenAPI description of every public route.
#[derive(OpenApi)]
#[openapi(
    info(title = "Guestbook API", description = "Sign and read the guestbook"),
    paths(
        handlers::root,
        handlers::health,
        handlers::list_messages,
        handlers::create_message
    ),
    tags((name = "guestbook", description = "Guestbook endpoints"))
)]
pub struct ApiDoc;

/// Serve the OpenAPI document as JSON.
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
