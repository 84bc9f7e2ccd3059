// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Contact Intake Gateway
//!
//! This crate implements the submission pipeline behind a contact form:
//!
//! - Per-caller sliding-window rate limiting (3 attempts / 15 min default)
//! - Unconditional field sanitization (tag stripping, length capping)
//! - Field-level validation with all failures reported together
//! - Best-effort delivery through exactly one transport (SMTP relay or
//!   outbound webhook), selected by configuration presence
//! - A client-side submission handler mirroring the server rules
//!
//! Delivery failure is absorbed: once a submission validates, the caller
//! always sees acceptance, at worst with a soft warning note.

pub mod client;
pub mod config;
pub mod handlers;
pub mod limiter;
pub mod sanitize;
pub mod transport;
pub mod validator;

pub use config::Config;
pub use limiter::{RateLimitResult, RateLimiter};
pub use transport::{DeliveryOutcome, Transport};
pub use validator::{SubmissionValidator, ValidationResult};
