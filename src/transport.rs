// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Delivery transport dispatch.
//!
//! A validated submission is handed to exactly one downstream sink: an
//! SMTP relay or an outbound webhook, chosen once at startup from
//! configuration presence. Delivery is a single best-effort attempt,
//! bounded by a timeout; failure is logged and reported as a
//! [`DeliveryOutcome`], never as a request error — the caller-visible
//! result stays accepted.

use crate::config::{Config, DeliveryConfig, SmtpConfig, WebhookConfig};
use crate::validator::Submission;
use chrono::{DateTime, Utc};
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Fixed source label attached to webhook payloads.
const SOURCE_LABEL: &str = "Portfolio Contact Form";

/// Outcome of a delivery attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// The downstream sink accepted the submission
    Delivered,
    /// The attempt failed or timed out; logged, not surfaced as an error
    Failed,
    /// No transport is configured; intake still succeeds
    Unconfigured,
}

/// The configured delivery transport.
pub enum Transport {
    None,
    Smtp(SmtpTransport),
    Webhook(WebhookTransport),
}

impl Transport {
    /// Build the transport selected by the configuration.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let timeout = Duration::from_secs(config.delivery_timeout_secs);
        match &config.delivery {
            DeliveryConfig::None => Ok(Self::None),
            DeliveryConfig::Smtp(smtp) => Ok(Self::Smtp(SmtpTransport::new(smtp, timeout)?)),
            DeliveryConfig::Webhook(webhook) => {
                Ok(Self::Webhook(WebhookTransport::new(webhook, timeout)?))
            }
        }
    }

    /// Attempt delivery of a validated submission. One attempt, no retries.
    pub async fn deliver(&self, submission: &Submission) -> DeliveryOutcome {
        match self {
            Self::None => {
                debug!("No delivery transport configured, skipping notification");
                DeliveryOutcome::Unconfigured
            }
            Self::Smtp(smtp) => smtp.deliver(submission).await,
            Self::Webhook(webhook) => webhook.deliver(submission).await,
        }
    }

    pub fn is_configured(&self) -> bool {
        !matches!(self, Self::None)
    }
}

/// SMTP relay transport.
pub struct SmtpTransport {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
    timeout: Duration,
}

impl SmtpTransport {
    fn new(config: &SmtpConfig, timeout: Duration) -> anyhow::Result<Self> {
        // Implicit TLS for the hosted/secure shape, STARTTLS otherwise
        let relay = if config.secure {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)?
        };
        let mut builder = relay.port(config.port);

        if !config.username.is_empty() {
            builder = builder.credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ));
        }

        Ok(Self {
            mailer: builder.build(),
            from: config.from.parse()?,
            to: config.to.parse()?,
            timeout,
        })
    }

    async fn deliver(&self, submission: &Submission) -> DeliveryOutcome {
        let email = match self.compose(submission) {
            Ok(email) => email,
            Err(e) => {
                error!(error = %e, "Failed to compose notification email");
                return DeliveryOutcome::Failed;
            }
        };

        match tokio::time::timeout(self.timeout, self.mailer.send(email)).await {
            Ok(Ok(_)) => {
                info!(to = %self.to, "Notification email relayed");
                DeliveryOutcome::Delivered
            }
            Ok(Err(e)) => {
                error!(error = %e, "Email relay failed");
                DeliveryOutcome::Failed
            }
            Err(_) => {
                warn!(timeout_secs = self.timeout.as_secs(), "Email relay timed out");
                DeliveryOutcome::Failed
            }
        }
    }

    fn compose(&self, submission: &Submission) -> anyhow::Result<Message> {
        let mut builder = Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(format!(
                "Portfolio Contact: Message from {}",
                submission.name
            ));

        // Make a plain reply reach the submitter; skip on an address
        // lettre cannot represent
        if let Ok(reply_to) = submission.email.parse::<Mailbox>() {
            builder = builder.reply_to(reply_to);
        }

        let email = builder.multipart(MultiPart::alternative_plain_html(
            compose_text_body(submission),
            compose_html_body(submission),
        ))?;
        Ok(email)
    }
}

/// Plain-text notification body.
fn compose_text_body(submission: &Submission) -> String {
    format!(
        "Name: {}\nEmail: {}\nMessage: {}\n\nSent from: {}\nTime: {}\n",
        submission.name,
        submission.email,
        submission.message,
        SOURCE_LABEL,
        Utc::now().to_rfc3339(),
    )
}

/// HTML notification body. Fields are already sanitized (no angle
/// brackets survive), so only newline conversion is needed here.
fn compose_html_body(submission: &Submission) -> String {
    format!(
        concat!(
            "<div style=\"font-family: monospace; max-width: 600px; margin: 0 auto;\">",
            "<h2>New Portfolio Contact</h2>",
            "<p><strong>Name:</strong> {name}</p>",
            "<p><strong>Email:</strong> {email}</p>",
            "<p><strong>Message:</strong></p>",
            "<p>{message}</p>",
            "<hr><p style=\"font-size: 12px;\">Sent from {source}<br>{time}</p>",
            "</div>"
        ),
        name = submission.name,
        email = submission.email,
        message = submission.message.replace('\n', "<br>"),
        source = SOURCE_LABEL,
        time = Utc::now().to_rfc3339(),
    )
}

/// Outbound webhook transport.
pub struct WebhookTransport {
    client: reqwest::Client,
    config: WebhookConfig,
}

/// JSON body POSTed to the webhook sink.
#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    name: &'a str,
    email: &'a str,
    message: &'a str,
    timestamp: DateTime<Utc>,
    source: &'static str,
}

impl WebhookTransport {
    fn new(config: &WebhookConfig, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    async fn deliver(&self, submission: &Submission) -> DeliveryOutcome {
        let payload = WebhookPayload {
            name: &submission.name,
            email: &submission.email,
            message: &submission.message,
            timestamp: Utc::now(),
            source: SOURCE_LABEL,
        };

        let mut request = self.client.post(self.config.url.clone()).json(&payload);
        if let Some(secret) = &self.config.secret {
            request = request.bearer_auth(secret);
        }

        match request.send().await {
            Ok(response) if response.status().is_success() => {
                info!(url = %self.config.url, status = %response.status(), "Webhook delivered");
                DeliveryOutcome::Delivered
            }
            Ok(response) => {
                error!(url = %self.config.url, status = %response.status(), "Webhook rejected submission");
                DeliveryOutcome::Failed
            }
            Err(e) => {
                error!(url = %self.config.url, error = %e, "Webhook call failed");
                DeliveryOutcome::Failed
            }
        }
    }
}
