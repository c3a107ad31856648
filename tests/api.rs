//! HTTP contract tests for the guestbook API.
//!
//! These drive the full router (middleware included) in-process against the
//! in-memory store.

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tower::ServiceExt;

use guestbook::api::{create_router, AppState};
use guestbook::store::MemoryMessageStore;

fn app_with_store() -> (Router, MemoryMessageStore) {
    let store = MemoryMessageStore::new();
    let app = create_router(AppState::from_store(store.clone()));
    (app, store)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

async fn post(app: &Router, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/messages")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

async fn list(app: &Router) -> (StatusCode, Value) {
    let request = Request::builder().uri("/messages").body(Body::empty()).unwrap();
    send(app, request).await
}

#[tokio::test]
async fn example_post_returns_created_record() {
    let (app, _) = app_with_store();

    let (status, body) = post(&app, json!({"name": "Ada", "message": "Hello!"})).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"]["id"], 1);
    assert_eq!(body["message"]["name"], "Ada");
    assert_eq!(body["message"]["message"], "Hello!");
    let created_at = body["message"]["createdAt"].as_str().unwrap();
    assert!(time::OffsetDateTime::parse(
        created_at,
        &time::format_description::well_known::Rfc3339
    )
    .is_ok());
}

#[tokio::test]
async fn valid_lengths_are_accepted_and_trimmed() {
    let (app, _) = app_with_store();

    let cases = [
        ("a".to_string(), "b".to_string()),
        ("n".repeat(100), "m".repeat(1000)),
        (format!("  {}  ", "n".repeat(96)), format!("\n{}\t", "m".repeat(998))),
        ("Grace Hopper".to_string(), "multi\nline\nbody".to_string()),
    ];

    for (name, message) in cases {
        let (status, body) = post(&app, json!({"name": name, "message": message})).await;
        assert_eq!(status, StatusCode::CREATED, "name={:?}", name);
        assert_eq!(body["message"]["name"], name.trim());
        assert_eq!(body["message"]["message"], message.trim());
    }
}

#[tokio::test]
async fn missing_or_empty_fields_are_rejected_without_writing() {
    let (app, store) = app_with_store();

    for payload in [
        json!({}),
        json!({"name": "Ada"}),
        json!({"message": "Hello!"}),
        json!({"name": "", "message": "Hello!"}),
        json!({"name": "Ada", "message": ""}),
        json!({"name": "   ", "message": "Hello!"}),
    ] {
        let (status, body) = post(&app, payload.clone()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "payload={}", payload);
        assert_eq!(
            body,
            json!({"success": false, "error": "Name and message are required"})
        );
    }

    assert!(store.is_empty().await);
    let (_, body) = list(&app).await;
    assert_eq!(body["count"], 0);
}

#[tokio::test]
async fn oversized_fields_are_rejected() {
    let (app, store) = app_with_store();

    let (status, body) = post(&app, json!({"name": "n".repeat(101), "message": "hi"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Name must be less than 100 characters");

    let (status, body) = post(&app, json!({"name": "Ada", "message": "m".repeat(1001)})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Message must be less than 1000 characters");

    assert!(store.is_empty().await);
}

#[tokio::test]
async fn surrounding_whitespace_counts_toward_limits() {
    let (app, store) = app_with_store();

    let (status, body) = post(&app, json!({"name": format!(" {}", "n".repeat(100)), "message": "hi"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Name must be less than 100 characters");

    let (status, body) =
        post(&app, json!({"name": "Ada", "message": format!("{}\n", "m".repeat(1000))})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Message must be less than 1000 characters");

    assert!(store.is_empty().await);
}

#[tokio::test]
async fn non_string_fields_are_rejected() {
    let (app, store) = app_with_store();

    let (status, body) = post(&app, json!({"name": 42, "message": "hi"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn listing_is_newest_first() {
    let (app, _) = app_with_store();

    for name in ["A", "B", "C"] {
        let (status, _) = post(&app, json!({"name": name, "message": "hi"})).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = list(&app).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["count"], 3);

    let names: Vec<&str> = body["messages"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["C", "B", "A"]);
}

#[tokio::test]
async fn empty_store_lists_empty_envelope() {
    let (app, _) = app_with_store();

    let (status, body) = list(&app).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": true, "count": 0, "messages": []}));
}

#[tokio::test]
async fn duplicate_submissions_create_duplicate_rows() {
    let (app, store) = app_with_store();

    let payload = json!({"name": "Ada", "message": "Hello!"});
    let (_, first) = post(&app, payload.clone()).await;
    let (_, second) = post(&app, payload).await;

    assert_ne!(first["message"]["id"], second["message"]["id"]);
    assert_eq!(store.len().await, 2);
}

#[tokio::test]
async fn write_failure_returns_generic_500() {
    let (app, store) = app_with_store();
    store.set_fail_writes(true);

    let (status, body) = post(&app, json!({"name": "Ada", "message": "Hello!"})).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body,
        json!({"success": false, "error": "Failed to create message"})
    );
}

#[tokio::test]
async fn unknown_route_returns_404_envelope() {
    let (app, _) = app_with_store();

    for uri in ["/nope", "/messages/1", "/health/deep"] {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "uri={}", uri);
        assert_eq!(body, json!({"success": false, "error": "Route not found"}));
    }
}

#[tokio::test]
async fn health_always_succeeds() {
    let (app, store) = app_with_store();
    store.set_fail_reads(true);

    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "OK");
}

#[tokio::test]
async fn cors_preflight_is_answered() {
    let (app, _) = app_with_store();

    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/messages")
        .header(header::ORIGIN, "http://localhost:3000")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response
        .headers()
        .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
}
