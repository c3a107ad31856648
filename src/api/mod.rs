//! HTTP API module: health, message listing and creation.

pub mod handlers;
pub mod openapi;
pub mod response;
pub mod routes;

pub use handlers::AppState;
pub use response::{
    ApiError, CreatedMessageResponse, ErrorResponse, HealthResponse, MessageListResponse,
};
pub use routes::create_router;
