// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Configuration for the contact intake gateway.
//!
//! Transport selection follows configuration *presence*: the first set of
//! environment variables found (hosted email pair, then generic SMTP, then
//! webhook URL) decides the delivery transport. Absence of all of them is a
//! valid state in which submissions are still accepted.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// Top-level service configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address (default: 0.0.0.0:8080)
    pub bind_addr: String,

    /// Rate limiting configuration
    pub rate_limit: RateLimitConfig,

    /// Sanitization / validation limits
    pub sanitize: SanitizeConfig,

    /// Delivery transport, resolved once at startup
    pub delivery: DeliveryConfig,

    /// Upper bound on any single transport call
    pub delivery_timeout_secs: u64,
}

/// Sliding-window rate limit configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Maximum accepted attempts per caller within the window (default: 3)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Trailing window in seconds (default: 900 = 15 minutes)
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,
}

/// Field sanitization limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SanitizeConfig {
    /// Maximum length of any field after sanitization (default: 1000)
    #[serde(default = "default_max_field_len")]
    pub max_field_len: usize,

    /// Minimum message length after sanitization (default: 10)
    #[serde(default = "default_min_message_len")]
    pub min_message_len: usize,
}

/// Delivery transport choice. Exactly one variant is active per process;
/// `None` means submissions are accepted without any notification attempt.
#[derive(Debug, Clone)]
pub enum DeliveryConfig {
    None,
    Smtp(SmtpConfig),
    Webhook(WebhookConfig),
}

/// SMTP relay configuration covering both credential shapes: a hosted
/// service pair (user + app password, implicit TLS) or a generic
/// host/port/secure-flag relay.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    /// Implicit TLS when true, STARTTLS otherwise
    pub secure: bool,
    pub username: String,
    pub password: String,
    /// Sender address; defaults to the authenticated user
    pub from: String,
    /// Recipient address; defaults to the authenticated user
    pub to: String,
}

/// Outbound webhook configuration.
#[derive(Debug, Clone)]
pub struct WebhookConfig {
    pub url: Url,
    /// Optional bearer token sent as an Authorization header
    pub secret: Option<String>,
}

// Default value functions
fn default_max_attempts() -> u32 {
    3
}

fn default_window_secs() -> u64 {
    900 // 15 minutes
}

fn default_max_field_len() -> usize {
    1000
}

fn default_min_message_len() -> usize {
    10
}

fn default_bind_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_delivery_timeout_secs() -> u64 {
    10
}

const HOSTED_RELAY_HOST: &str = "smtp.gmail.com";
const HOSTED_RELAY_PORT: u16 = 465;

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            window_secs: default_window_secs(),
        }
    }
}

impl Default for SanitizeConfig {
    fn default() -> Self {
        Self {
            max_field_len: default_max_field_len(),
            min_message_len: default_min_message_len(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            rate_limit: RateLimitConfig::default(),
            sanitize: SanitizeConfig::default(),
            delivery: DeliveryConfig::None,
            delivery_timeout_secs: default_delivery_timeout_secs(),
        }
    }
}

impl RateLimitConfig {
    /// Get the trailing window duration
    pub fn window_duration(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// - `BIND_ADDR`: server bind address (default: 0.0.0.0:8080)
    /// - `RATE_LIMIT_MAX`: max attempts per caller per window (default: 3)
    /// - `RATE_LIMIT_WINDOW_SECS`: trailing window (default: 900)
    /// - `MAX_FIELD_LEN` / `MIN_MESSAGE_LEN`: sanitization limits
    /// - `DELIVERY_TIMEOUT_SECS`: transport call bound (default: 10)
    /// - transport selection: see [`DeliveryConfig::from_env`]
    pub fn from_env() -> Self {
        Self {
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| default_bind_addr()),
            rate_limit: RateLimitConfig {
                max_attempts: env_parse("RATE_LIMIT_MAX", default_max_attempts()),
                window_secs: env_parse("RATE_LIMIT_WINDOW_SECS", default_window_secs()),
            },
            sanitize: SanitizeConfig {
                max_field_len: env_parse("MAX_FIELD_LEN", default_max_field_len()),
                min_message_len: env_parse("MIN_MESSAGE_LEN", default_min_message_len()),
            },
            delivery: DeliveryConfig::from_env(),
            delivery_timeout_secs: env_parse(
                "DELIVERY_TIMEOUT_SECS",
                default_delivery_timeout_secs(),
            ),
        }
    }
}

impl DeliveryConfig {
    /// Resolve the transport from environment state, once.
    ///
    /// Order mirrors the original intake route: hosted email pair first,
    /// then generic SMTP, then webhook. A webhook URL that fails to parse
    /// as http(s) is treated as absent.
    pub fn from_env() -> Self {
        if let (Ok(user), Ok(pass)) = (std::env::var("EMAIL_USER"), std::env::var("EMAIL_PASS")) {
            let from = std::env::var("EMAIL_FROM").unwrap_or_else(|_| user.clone());
            let to = std::env::var("EMAIL_TO").unwrap_or_else(|_| user.clone());
            return Self::Smtp(SmtpConfig {
                host: HOSTED_RELAY_HOST.to_string(),
                port: HOSTED_RELAY_PORT,
                secure: true,
                username: user,
                password: pass,
                from,
                to,
            });
        }

        if let Ok(host) = std::env::var("SMTP_HOST") {
            let username = std::env::var("SMTP_USER").unwrap_or_default();
            let from = std::env::var("EMAIL_FROM").unwrap_or_else(|_| username.clone());
            let to = std::env::var("EMAIL_TO").unwrap_or_else(|_| username.clone());
            return Self::Smtp(SmtpConfig {
                host,
                port: env_parse("SMTP_PORT", 587),
                secure: std::env::var("SMTP_SECURE").is_ok_and(|v| v == "true"),
                username,
                password: std::env::var("SMTP_PASS").unwrap_or_default(),
                from,
                to,
            });
        }

        if let Ok(raw) = std::env::var("WEBHOOK_URL") {
            match Url::parse(&raw) {
                Ok(url) if matches!(url.scheme(), "http" | "https") => {
                    return Self::Webhook(WebhookConfig {
                        url,
                        secret: std::env::var("WEBHOOK_SECRET").ok(),
                    });
                }
                _ => {
                    tracing::warn!(url = %raw, "Ignoring unparseable WEBHOOK_URL");
                }
            }
        }

        Self::None
    }

    pub fn is_configured(&self) -> bool {
        !matches!(self, Self::None)
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
