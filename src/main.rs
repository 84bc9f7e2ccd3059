// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Contact Intake Gateway Service
//!
//! Receives contact form submissions, rate-limits them per caller,
//! sanitizes and validates the fields, and forwards accepted submissions
//! through one configured transport (SMTP relay or outbound webhook).
//! Delivery is best-effort: a transport failure never fails the request.
//!
//! ## Configuration
//!
//! Environment variables (a `.env` file is honored):
//!
//! - `BIND_ADDR`: server bind address (default: 0.0.0.0:8080)
//! - `RATE_LIMIT_MAX`: accepted attempts per caller per window (default: 3)
//! - `RATE_LIMIT_WINDOW_SECS`: trailing window (default: 900)
//! - `DELIVERY_TIMEOUT_SECS`: transport call bound (default: 10)
//! - `EMAIL_USER` + `EMAIL_PASS`: hosted relay credential pair, or
//! - `SMTP_HOST` (+ `SMTP_PORT`, `SMTP_SECURE`, `SMTP_USER`, `SMTP_PASS`):
//!   generic relay, or
//! - `WEBHOOK_URL` (+ `WEBHOOK_SECRET`): outbound webhook
//!
//! With none of the transport variables set, submissions are still
//! accepted and answered with a pending-notification note.

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use contact_intake::{
    config::Config,
    handlers::{app, AppState},
    limiter::RateLimiter,
    transport::Transport,
    validator::SubmissionValidator,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer().json())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    // Load configuration
    let config = Config::from_env();
    info!(
        bind_addr = %config.bind_addr,
        rate_limit_max = config.rate_limit.max_attempts,
        rate_limit_window_secs = config.rate_limit.window_secs,
        delivery_configured = config.delivery.is_configured(),
        "Starting contact intake gateway"
    );

    // Create application state
    let limiter = RateLimiter::new(config.rate_limit.clone());
    let validator = SubmissionValidator::new(config.sanitize.clone());
    let transport = Transport::from_config(&config)?;

    let state = Arc::new(AppState {
        limiter,
        validator,
        transport,
        config: config.clone(),
    });

    // Start server
    let addr: SocketAddr = config.bind_addr.parse()?;
    let listener = TcpListener::bind(addr).await?;
    info!(addr = %addr, "Server listening");

    axum::serve(listener, app(state)).await?;

    Ok(())
}
