// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! HTTP handlers for the contact intake gateway.
//!
//! A submission moves through fixed stages: rate-checked, sanitized,
//! validated, delivery-attempted, responded. A stage failure
//! short-circuits straight to the response; a delivery failure never
//! does — once validated, the caller sees acceptance, at worst with a
//! warning note.

use crate::config::Config;
use crate::limiter::{RateLimitResult, RateLimiter};
use crate::transport::{DeliveryOutcome, Transport};
use crate::validator::{FieldErrors, SubmissionValidator, ValidationResult};
use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};

/// Caller identity when no forwarded-address header is present.
const UNKNOWN_CALLER: &str = "unknown";

/// Shared application state.
pub struct AppState {
    pub limiter: RateLimiter,
    pub validator: SubmissionValidator,
    pub transport: Transport,
    pub config: Config,
}

/// Incoming submission body. Absent fields validate as empty rather than
/// failing JSON deserialization, so they surface as field errors.
#[derive(Debug, Deserialize)]
pub struct SubmissionRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub message: String,
}

/// Success response body.
#[derive(Debug, Serialize)]
pub struct AcceptedResponse {
    pub success: bool,
    pub message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<&'static str>,
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(rename = "fieldErrors", skip_serializing_if = "Option::is_none")]
    pub field_errors: Option<FieldErrors>,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub message: &'static str,
}

/// Build the service router.
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/contact", get(health).post(submit))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health echo for the contact endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        message: "Contact intake endpoint is ready",
    })
}

/// Handle a contact form submission.
pub async fn submit(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let caller = caller_identity(&headers);

    // Rate-check. The identifier is client-supplied and spoofable; the
    // limiter is advisory, not a security boundary.
    if let RateLimitResult::Limited { retry_after } = state.limiter.check(&caller).await {
        info!(caller = %caller, retry_after_secs = retry_after.as_secs(), "Submission rate limited");
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(ErrorResponse {
                error: "Too many submissions. Please try again later.".to_string(),
                field_errors: None,
            }),
        )
            .into_response();
    }

    // A body that is not JSON at all is an internal fault, not a
    // validation failure; detail stays in the server log.
    let request: SubmissionRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            error!(caller = %caller, error = %e, "Malformed submission body");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Internal server error. Please try again later.".to_string(),
                    field_errors: None,
                }),
            )
                .into_response();
        }
    };

    // Sanitize, then validate; every failing field is reported
    let submission = match state
        .validator
        .validate(&request.name, &request.email, &request.message)
    {
        ValidationResult::Valid(submission) => submission,
        ValidationResult::Invalid(field_errors) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: "Submission failed validation".to_string(),
                    field_errors: Some(field_errors),
                }),
            )
                .into_response();
        }
    };

    info!(
        caller = %caller,
        name = %submission.name,
        email = %submission.email,
        message_len = submission.message.len(),
        "Contact form submission accepted"
    );

    // Best-effort delivery; the outcome only decides the note
    let (message, note) = match state.transport.deliver(&submission).await {
        DeliveryOutcome::Delivered => ("Message sent successfully! I'll get back to you soon.", None),
        DeliveryOutcome::Failed => (
            "Message received successfully! I'll get back to you soon.",
            Some("Notification may be delayed"),
        ),
        DeliveryOutcome::Unconfigured => (
            "Message received successfully! I'll get back to you soon.",
            Some("Notification delivery pending"),
        ),
    };

    (
        StatusCode::OK,
        Json(AcceptedResponse {
            success: true,
            message,
            note,
        }),
    )
        .into_response()
}

/// Best-effort caller identifier from request metadata.
///
/// Takes the first hop of `x-forwarded-for`, falling back to a constant
/// token. Trivially spoofable by a client controlling its own headers;
/// documented limitation.
fn caller_identity(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .unwrap_or(UNKNOWN_CALLER)
        .to_string()
}
