// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Client-side submission handler.
//!
//! Holds the three form fields, validates them locally with the same
//! rules the endpoint applies, and issues exactly one POST per submit
//! action. The pending flag models the disabled submit control: while a
//! submission is in flight no second call is made. On success the fields
//! are cleared; on any failure they are preserved for correction.

use crate::validator::EMAIL_PATTERN;
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::debug;

/// Minimum message length, mirroring the server default.
const MIN_MESSAGE_LEN: usize = 10;

/// Normalized result of a submit action, for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionResult {
    pub outcome: Outcome,
    pub message: String,
    pub field_errors: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Accepted,
    AcceptedWithDeliveryWarning,
    RejectedValidation,
    RejectedRateLimited,
    ServerError,
}

/// Wire shape of a 2xx endpoint response.
#[derive(Debug, Deserialize)]
struct AcceptedBody {
    #[allow(dead_code)]
    success: bool,
    message: String,
    note: Option<String>,
}

/// Wire shape of an error endpoint response.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
    #[serde(rename = "fieldErrors")]
    field_errors: Option<BTreeMap<String, String>>,
}

/// Contact form state and submission logic.
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub message: String,
    endpoint: String,
    pending: bool,
    client: reqwest::Client,
}

impl ContactForm {
    /// Create an empty form posting to the given endpoint URL.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            name: String::new(),
            email: String::new(),
            message: String::new(),
            endpoint: endpoint.into(),
            pending: false,
            client: reqwest::Client::new(),
        }
    }

    /// Whether a submission is currently in flight.
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Validate the current field values locally, without any network
    /// call. Mirrors the server rules; all failing fields are reported.
    pub fn validate_local(&self) -> BTreeMap<String, String> {
        let mut errors = BTreeMap::new();

        if self.name.trim().is_empty() {
            errors.insert("name".to_string(), "Name is required".to_string());
        }

        let email = self.email.trim();
        if email.is_empty() {
            errors.insert("email".to_string(), "Email is required".to_string());
        } else if !EMAIL_PATTERN.is_match(email) {
            errors.insert("email".to_string(), "Invalid email format".to_string());
        }

        let message = self.message.trim();
        if message.is_empty() {
            errors.insert("message".to_string(), "Message is required".to_string());
        } else if message.chars().count() < MIN_MESSAGE_LEN {
            errors.insert(
                "message".to_string(),
                format!("Message must be at least {MIN_MESSAGE_LEN} characters long"),
            );
        }

        errors
    }

    /// Submit the form. Exactly one outbound call per invocation, and
    /// none at all when local validation fails or a submission is still
    /// pending. No retries.
    pub async fn submit(&mut self) -> SubmissionResult {
        if self.pending {
            return SubmissionResult {
                outcome: Outcome::ServerError,
                message: "A submission is already in progress".to_string(),
                field_errors: None,
            };
        }

        let local_errors = self.validate_local();
        if !local_errors.is_empty() {
            debug!(fields = ?local_errors.keys().collect::<Vec<_>>(), "Local validation failed");
            return SubmissionResult {
                outcome: Outcome::RejectedValidation,
                message: "Please correct the highlighted fields".to_string(),
                field_errors: Some(local_errors),
            };
        }

        self.pending = true;
        let payload = serde_json::json!({
            "name": self.name,
            "email": self.email,
            "message": self.message,
        });

        let response = self
            .client
            .post(&self.endpoint)
            .json(&payload)
            .send()
            .await;
        self.pending = false;

        let response = match response {
            Ok(response) => response,
            Err(e) => {
                debug!(error = %e, "Submission request failed");
                // Fields are preserved for a manual retry
                return SubmissionResult {
                    outcome: Outcome::ServerError,
                    message: "Network error. Please check your connection and try again."
                        .to_string(),
                    field_errors: None,
                };
            }
        };

        let status = response.status();
        if status.is_success() {
            let body: Option<AcceptedBody> = response.json().await.ok();
            let (message, with_warning) = match body {
                Some(body) => (body.message, body.note.is_some()),
                None => ("Message sent successfully!".to_string(), false),
            };
            self.clear();
            return SubmissionResult {
                outcome: if with_warning {
                    Outcome::AcceptedWithDeliveryWarning
                } else {
                    Outcome::Accepted
                },
                message,
                field_errors: None,
            };
        }

        let body: Option<ErrorBody> = response.json().await.ok();
        let (message, field_errors) = match body {
            Some(body) => (body.error, body.field_errors),
            None => ("Something went wrong. Please try again later.".to_string(), None),
        };

        let outcome = match status.as_u16() {
            400 => Outcome::RejectedValidation,
            429 => Outcome::RejectedRateLimited,
            _ => Outcome::ServerError,
        };

        SubmissionResult {
            outcome,
            message,
            field_errors,
        }
    }

    fn clear(&mut self) {
        self.name.clear();
        self.email.clear();
        self.message.clear();
    }
}
