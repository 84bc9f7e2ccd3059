// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Submission validation.
//!
//! Fields are sanitized first, then validated against the server rules:
//! all three fields non-empty, email matches a simple address shape,
//! message at least the configured minimum length. Every failing field is
//! reported, not just the first.

use crate::config::SanitizeConfig;
use crate::sanitize::sanitize_field;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::LazyLock;
use thiserror::Error;
use tracing::debug;

/// Local-part "@" domain-with-dot, no whitespace. Same shape check on the
/// client and the server.
pub static EMAIL_PATTERN: LazyLock<regex::Regex> =
    LazyLock::new(|| regex::Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex"));

/// A sanitized, validated submission ready for delivery.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Submission {
    pub name: String,
    pub email: String,
    pub message: String,
}

/// Per-field validation error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FieldError {
    #[error("Name is required")]
    NameRequired,

    #[error("Email is required")]
    EmailRequired,

    #[error("Invalid email format")]
    EmailInvalid,

    #[error("Message is required")]
    MessageRequired,

    #[error("Message must be at least {0} characters long")]
    MessageTooShort(usize),
}

/// Field name to error text, ordered for stable serialization.
pub type FieldErrors = BTreeMap<&'static str, String>;

/// Result of validating a submission.
#[derive(Debug, Clone)]
pub enum ValidationResult {
    /// All fields passed; carries the sanitized submission
    Valid(Submission),
    /// One or more fields failed
    Invalid(FieldErrors),
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid(_))
    }
}

/// Sanitizing validator for contact form submissions.
pub struct SubmissionValidator {
    config: SanitizeConfig,
}

impl SubmissionValidator {
    /// Create a new validator with the given sanitization limits.
    pub fn new(config: SanitizeConfig) -> Self {
        Self { config }
    }

    /// Sanitize and validate the three raw fields.
    ///
    /// Sanitization is unconditional and happens before any check, so a
    /// field that is only markup counts as empty.
    pub fn validate(&self, name: &str, email: &str, message: &str) -> ValidationResult {
        let name = sanitize_field(name, &self.config);
        let email = sanitize_field(email, &self.config);
        let message = sanitize_field(message, &self.config);

        let mut errors = FieldErrors::new();

        if name.is_empty() {
            errors.insert("name", FieldError::NameRequired.to_string());
        }

        if email.is_empty() {
            errors.insert("email", FieldError::EmailRequired.to_string());
        } else if !EMAIL_PATTERN.is_match(&email) {
            errors.insert("email", FieldError::EmailInvalid.to_string());
        }

        if message.is_empty() {
            errors.insert("message", FieldError::MessageRequired.to_string());
        } else if message.chars().count() < self.config.min_message_len {
            errors.insert(
                "message",
                FieldError::MessageTooShort(self.config.min_message_len).to_string(),
            );
        }

        if errors.is_empty() {
            ValidationResult::Valid(Submission { name, email, message })
        } else {
            debug!(fields = ?errors.keys().collect::<Vec<_>>(), "Submission validation failed");
            ValidationResult::Invalid(errors)
        }
    }
}
