// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! HTTP contract tests for the submission endpoint.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use contact_intake::config::{Config, DeliveryConfig};
use contact_intake::handlers::{app, AppState};
use contact_intake::limiter::RateLimiter;
use contact_intake::transport::Transport;
use contact_intake::validator::SubmissionValidator;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn test_app(delivery: DeliveryConfig) -> Router {
    let config = Config {
        delivery,
        ..Config::default()
    };
    app(Arc::new(AppState {
        limiter: RateLimiter::new(config.rate_limit.clone()),
        validator: SubmissionValidator::new(config.sanitize.clone()),
        transport: Transport::from_config(&config).unwrap(),
        config,
    }))
}

fn post_contact(body: &Value, caller: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/contact")
        .header("content-type", "application/json")
        .header("x-forwarded-for", caller)
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn valid_payload() -> Value {
    json!({
        "name": "Ada Lovelace",
        "email": "ada@example.com",
        "message": "I would like to discuss a project with you."
    })
}

#[tokio::test]
async fn valid_submission_returns_200_success() {
    let app = test_app(DeliveryConfig::None);

    let response = app
        .oneshot(post_contact(&valid_payload(), "203.0.113.1"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert!(body["message"].as_str().unwrap().len() > 0);
}

#[tokio::test]
async fn transport_absence_yields_note_never_error() {
    let app = test_app(DeliveryConfig::None);

    let response = app
        .oneshot(post_contact(&valid_payload(), "203.0.113.2"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert!(body["note"].as_str().unwrap().contains("pending"));
}

#[tokio::test]
async fn missing_fields_yield_400_with_field_errors() {
    let app = test_app(DeliveryConfig::None);

    let response = app
        .oneshot(post_contact(&json!({}), "203.0.113.3"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(!body["error"].as_str().unwrap().is_empty());
    let field_errors = &body["fieldErrors"];
    assert!(field_errors["name"].is_string());
    assert!(field_errors["email"].is_string());
    assert!(field_errors["message"].is_string());
}

#[tokio::test]
async fn nine_character_message_is_rejected() {
    let app = test_app(DeliveryConfig::None);

    let payload = json!({
        "name": "Ada",
        "email": "ada@example.com",
        "message": "123456789"
    });
    let response = app
        .oneshot(post_contact(&payload, "203.0.113.4"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["fieldErrors"]["message"]
        .as_str()
        .unwrap()
        .contains("at least 10"));
}

#[tokio::test]
async fn bad_email_shape_is_rejected() {
    let app = test_app(DeliveryConfig::None);

    let payload = json!({
        "name": "Ada",
        "email": "ada-at-example.com",
        "message": "a perfectly long message"
    });
    let response = app
        .oneshot(post_contact(&payload, "203.0.113.5"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["fieldErrors"]["email"], "Invalid email format");
}

#[tokio::test]
async fn fourth_request_from_same_caller_is_429() {
    let app = test_app(DeliveryConfig::None);

    for i in 0..3 {
        let response = app
            .clone()
            .oneshot(post_contact(&valid_payload(), "198.51.100.77"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK, "request {} should pass", i + 1);
    }

    let response = app
        .clone()
        .oneshot(post_contact(&valid_payload(), "198.51.100.77"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    let body = body_json(response).await;
    assert!(!body["error"].as_str().unwrap().is_empty());

    // A different caller is unaffected
    let response = app
        .oneshot(post_contact(&valid_payload(), "198.51.100.78"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn missing_forwarded_header_shares_the_unknown_bucket() {
    let app = test_app(DeliveryConfig::None);

    for _ in 0..3 {
        let request = Request::builder()
            .method("POST")
            .uri("/api/contact")
            .header("content-type", "application/json")
            .body(Body::from(valid_payload().to_string()))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let request = Request::builder()
        .method("POST")
        .uri("/api/contact")
        .header("content-type", "application/json")
        .body(Body::from(valid_payload().to_string()))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn duplicate_valid_payloads_both_accepted() {
    let app = test_app(DeliveryConfig::None);

    for _ in 0..2 {
        let response = app
            .clone()
            .oneshot(post_contact(&valid_payload(), "203.0.113.6"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["success"], true);
    }
}

#[tokio::test]
async fn script_content_is_stripped_but_submission_accepted() {
    let app = test_app(DeliveryConfig::None);

    let payload = json!({
        "name": "Ada",
        "email": "ada@example.com",
        "message": "<script>alert(1)</script>Hello, I have a question about your work"
    });
    let response = app
        .oneshot(post_contact(&payload, "203.0.113.7"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn malformed_json_body_is_a_500_with_generic_error() {
    let app = test_app(DeliveryConfig::None);

    let request = Request::builder()
        .method("POST")
        .uri("/api/contact")
        .header("content-type", "application/json")
        .header("x-forwarded-for", "203.0.113.8")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    // Generic message only; no parser detail leaks
    assert_eq!(body["error"], "Internal server error. Please try again later.");
    assert!(body.get("fieldErrors").is_none());
}

#[tokio::test]
async fn health_echo_responds_on_both_routes() {
    let app = test_app(DeliveryConfig::None);

    for uri in ["/health", "/api/contact"] {
        let request = Request::builder()
            .method("GET")
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert!(body["message"].is_string());
    }
}
