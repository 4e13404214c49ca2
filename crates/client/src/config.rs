//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `PAYDESK_API_BASE_URL` - Backend base URL (default: `http://localhost:5000/api`)
//! - `PAYDESK_TIMEOUT_SECS` - Request timeout in seconds (default: 30)
//! - `PAYDESK_MIN_PAYOUT` - Minimum payout floor in rupees (default: 500)
//! - `PAYDESK_MAX_PAYOUT` - Default maximum payout when the backend sends none
//!
//! ## Optional (session)
//! - `PAYDESK_AUTH_TOKEN` - Session token from a previous login
//! - `PAYDESK_ROLE` - Role of that session (`admin` or `superAdmin`)
//! - `PAYDESK_API_KEY` - Merchant API key (transactions listing)

use core::str::FromStr;
use std::time::Duration;

use paydesk_core::{EligibilityConfig, UserRole};
use rust_decimal::Decimal;
use secrecy::SecretString;
use thiserror::Error;
use url::Url;

use crate::session::Session;

pub const DEFAULT_BASE_URL: &str = "http://localhost:5000/api";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "xxx",
    "todo",
    "insert",
    "put-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Paydesk client configuration.
///
/// Implements `Debug` manually to redact the session credentials.
#[derive(Clone)]
pub struct ClientConfig {
    /// Backend base URL. Always ends with `/`.
    pub base_url: Url,
    /// Per-request timeout
    pub timeout: Duration,
    /// Client-side payout policy
    pub eligibility: EligibilityConfig,
    /// Session token from a previous login
    pub auth_token: Option<SecretString>,
    /// Role of the stored session, if known
    pub role: Option<UserRole>,
    /// Merchant API key
    pub api_key: Option<SecretString>,
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redact = |set: bool| if set { "[REDACTED]" } else { "None" };
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url.as_str())
            .field("timeout", &self.timeout)
            .field("eligibility", &self.eligibility)
            .field("auth_token", &redact(self.auth_token.is_some()))
            .field("role", &self.role)
            .field("api_key", &redact(self.api_key.is_some()))
            .finish()
    }
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let base_url = parse_base_url(
            &get("PAYDESK_API_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        )?;
        let timeout = match get("PAYDESK_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(parse_var("PAYDESK_TIMEOUT_SECS", &raw)?),
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        let minimum_payout_floor = match get("PAYDESK_MIN_PAYOUT") {
            Some(raw) => parse_amount("PAYDESK_MIN_PAYOUT", &raw)?,
            None => EligibilityConfig::default().minimum_payout_floor,
        };
        let default_maximum = get("PAYDESK_MAX_PAYOUT")
            .map(|raw| parse_amount("PAYDESK_MAX_PAYOUT", &raw))
            .transpose()?;

        let role = get("PAYDESK_ROLE")
            .map(|raw| {
                raw.parse::<UserRole>()
                    .map_err(|e| ConfigError::InvalidEnvVar("PAYDESK_ROLE".to_string(), e))
            })
            .transpose()?;

        Ok(Self {
            base_url,
            timeout,
            eligibility: EligibilityConfig {
                minimum_payout_floor,
                default_maximum,
            },
            auth_token: get("PAYDESK_AUTH_TOKEN").map(|v| checked_secret("PAYDESK_AUTH_TOKEN", v)),
            role,
            api_key: get("PAYDESK_API_KEY").map(|v| checked_secret("PAYDESK_API_KEY", v)),
        })
    }

    /// Session built from stored credentials, if any were configured.
    #[must_use]
    pub fn session(&self) -> Option<Session> {
        if self.auth_token.is_none() && self.api_key.is_none() {
            return None;
        }
        Some(Session {
            auth_token: self.auth_token.clone(),
            role: self.role,
            api_key: self.api_key.clone(),
        })
    }

    /// Like [`Self::session`], but a missing session is an error.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingEnvVar` if neither `PAYDESK_AUTH_TOKEN`
    /// nor `PAYDESK_API_KEY` is set.
    pub fn require_session(&self) -> Result<Session, ConfigError> {
        self.session()
            .ok_or_else(|| ConfigError::MissingEnvVar("PAYDESK_AUTH_TOKEN".to_string()))
    }
}

/// Parse a base URL and make sure relative joins append to its path.
fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidEnvVar("PAYDESK_API_BASE_URL".to_string(), reason);

    let mut url = Url::parse(raw.trim()).map_err(|e| invalid(e.to_string()))?;
    if url.cannot_be_a_base() {
        return Err(invalid("URL cannot be a base".to_string()));
    }
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme {}", url.scheme())));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

fn parse_var<T: FromStr>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

fn parse_amount(key: &str, raw: &str) -> Result<Decimal, ConfigError> {
    let amount: Decimal = parse_var(key, raw)?;
    if amount.is_sign_negative() {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "must not be negative".to_string(),
        ));
    }
    Ok(amount)
}

/// Warn about credentials that look like template values.
fn checked_secret(key: &str, value: String) -> SecretString {
    if let Err(e) = validate_not_placeholder(&value, key) {
        tracing::warn!("{key} validation warning: {e}");
    }
    SecretString::from(value)
}

fn validate_not_placeholder(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();
    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }
    Ok(())
}
