//! HTTP API route definitions.

use axum::{routing::get, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::handlers::{create_message, health, list_messages, root, AppState};
use super::openapi::openapi_json;
use super::response::not_found;

/// Create the API router.
///
/// Unknown paths and unsupported methods on known paths both answer with
/// the 404 envelope.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root).fallback(not_found))
        .route("/health", get(health).fallback(not_found))
        .route(
            "/messages",
            get(list_messages).post(create_message).fallback(not_found),
        )
        .route("/api-docs/openapi.json", get(openapi_json).fallback(not_found))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryMessageStore, MemoryStoreConfig};
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn app() -> Router {
        create_router(AppState::from_store(MemoryMessageStore::new()))
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn post_json(body: &str) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri("/messages")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn health_endpoint_returns_ok() {
        let response = app()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "OK");
        assert!(body["timestamp"].is_string());
    }

    #[tokio::test]
    async fn root_endpoint_returns_banner() {
        let response = app()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!({"message": "Guestbook API is running!"})
        );
    }

    #[tokio::test]
    async fn unknown_route_returns_404_envelope() {
        let response = app()
            .oneshot(Request::builder().uri("/guestbook/entries").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            body_json(response).await,
            json!({"success": false, "error": "Route not found"})
        );
    }

    #[tokio::test]
    async fn unsupported_method_returns_404_envelope() {
        let response = app()
            .oneshot(
                Request::builder()
                    .method(Method::DELETE)
                    .uri("/messages")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["error"], "Route not found");
    }

    #[tokio::test]
    async fn create_returns_201_with_trimmed_record() {
        let response = app()
            .oneshot(post_json(r#"{"name":"  Ada ","message":" Hello! "}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let body = body_json(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["message"]["id"], 1);
        assert_eq!(body["message"]["name"], "Ada");
        assert_eq!(body["message"]["message"], "Hello!");
        assert!(body["message"]["createdAt"].is_string());
    }

    #[tokio::test]
    async fn malformed_body_returns_400_envelope() {
        let response = app().oneshot(post_json("{not json")).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert!(body["error"].as_str().unwrap().starts_with("Invalid request body"));
    }

    #[tokio::test]
    async fn store_failure_returns_generic_500() {
        let store = MemoryMessageStore::with_config(MemoryStoreConfig {
            fail_reads: true,
            ..Default::default()
        });
        let app = create_router(AppState::from_store(store));

        let response = app
            .oneshot(Request::builder().uri("/messages").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(response).await,
            json!({"success": false, "error": "Failed to fetch messages"})
        );
    }

    #[tokio::test]
    async fn openapi_document_is_served() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/api-docs/openapi.json")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert!(body["paths"]["/messages"].is_object());
    }
}
