//! Explicit authentication context.
//!
//! A [`Session`] is created by [`crate::PaydeskClient::login`] or from
//! configuration and handed to every call. Nothing is stored globally.

use paydesk_core::UserRole;
use secrecy::{ExposeSecret, SecretString};

use crate::error::ApiError;

/// Credentials for one signed-in console user.
///
/// Implements `Debug` manually to redact the token and API key.
#[derive(Clone, Default)]
pub struct Session {
    /// Session token sent as `x-auth-token`.
    pub auth_token: Option<SecretString>,
    /// Role reported at login. `None` when unknown; the backend decides.
    pub role: Option<UserRole>,
    /// Merchant API key sent as `x-api-key`.
    pub api_key: Option<SecretString>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redact = |set: bool| if set { "[REDACTED]" } else { "None" };
        f.debug_struct("Session")
            .field("auth_token", &redact(self.auth_token.is_some()))
            .field("role", &self.role)
            .field("api_key", &redact(self.api_key.is_some()))
            .finish()
    }
}

impl Session {
    /// A session for a token of unknown role.
    #[must_use]
    pub fn new(auth_token: impl Into<String>) -> Self {
        Self {
            auth_token: Some(SecretString::from(auth_token.into())),
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn with_role(mut self, role: UserRole) -> Self {
        self.role = Some(role);
        self
    }

    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(SecretString::from(api_key.into()));
        self
    }

    pub(crate) fn token(&self) -> Result<&str, ApiError> {
        self.auth_token
            .as_ref()
            .map(|secret| secret.expose_secret())
            .ok_or(ApiError::MissingCredential("auth token; log in first"))
    }

    pub(crate) fn key(&self) -> Result<&str, ApiError> {
        self.api_key
            .as_ref()
            .map(|secret| secret.expose_secret())
            .ok_or(ApiError::MissingCredential(
                "API key; set PAYDESK_API_KEY",
            ))
    }

    /// Fail fast when the role is known and is not `required`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::RoleRequired`] on a known, different role.
    pub fn require_role(&self, required: UserRole) -> Result<(), ApiError> {
        match self.role {
            Some(actual) if actual != required => Err(ApiError::RoleRequired { required, actual }),
            _ => Ok(()),
        }
    }
}
