//! Error types for the Paydesk API client.

use paydesk_core::{PayoutRequestError, UserRole, WebhookSettingsError};
use serde_json::Value;
use thiserror::Error;

/// Errors that can occur when talking to the payments backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed before a response arrived.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The session is missing or expired.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The session is valid but lacks permission.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Rate limited by the backend.
    #[error("rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Any other non-success status.
    #[error("API error ({status}): {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Message extracted from the response body.
        message: String,
    },

    /// The response body was not the JSON we expected.
    #[error("parse error: {0}")]
    Parse(String),

    /// The configured base URL cannot have endpoint paths appended.
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),

    /// The session does not carry the credential this endpoint needs.
    #[error("missing credential: {0}")]
    MissingCredential(&'static str),

    /// The session role is known and is not allowed to call this endpoint.
    #[error("{required} role required (signed in as {actual})")]
    RoleRequired {
        required: UserRole,
        actual: UserRole,
    },

    /// Rejected locally before any request was sent.
    #[error(transparent)]
    PayoutRequest(#[from] PayoutRequestError),

    /// Webhook settings refused locally before sending.
    #[error(transparent)]
    WebhookSettings(#[from] WebhookSettingsError),

    /// Invalid input for an operator action.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl ApiError {
    /// Whether signing in again may fix this.
    #[must_use]
    pub const fn is_auth(&self) -> bool {
        matches!(
            self,
            Self::Unauthorized(_) | Self::MissingCredential(_)
        )
    }
}

/// Pull a human-readable message out of an error body.
///
/// A plain-text body wins, then a JSON string body, then the JSON `error`
/// field, then the JSON `message` field.
#[must_use]
pub fn error_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }
    match serde_json::from_str::<Value>(trimmed) {
        Ok(Value::String(s)) => Some(s).filter(|s| !s.trim().is_empty()),
        Ok(Value::Object(map)) => ["error", "message"].into_iter().find_map(|key| {
            map.get(key)
                .and_then(Value::as_str)
                .filter(|s| !s.trim().is_empty())
                .map(ToOwned::to_owned)
        }),
        Ok(_) => None,
        Err(_) => Some(trimmed.to_owned()),
    }
}
