//! Subcommand implementations.

use paydesk_client::{ApiError, ClientConfig, ConfigError, PaydeskClient, Session};
use paydesk_core::ExportError;
use thiserror::Error;

pub mod admin;
pub mod api_key;
pub mod balance;
pub mod login;
pub mod payouts;
pub mod transactions;
pub mod webhook;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Export failed: {0}")]
    Export(#[from] ExportError),

    #[error("Could not write {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Could not render JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Client and configuration shared by every command.
pub struct Context {
    pub config: ClientConfig,
    pub client: PaydeskClient,
}

impl Context {
    /// Load configuration and build the client.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration is invalid or the HTTP client
    /// cannot be built.
    pub fn from_env() -> Result<Self, CommandError> {
        let config = ClientConfig::from_env()?;
        tracing::debug!(?config, "Loaded configuration");
        let client = PaydeskClient::new(&config)?;
        Ok(Self { config, client })
    }

    /// Session from `PAYDESK_AUTH_TOKEN` / `PAYDESK_API_KEY`.
    ///
    /// # Errors
    ///
    /// Returns an error if neither is set.
    pub fn session(&self) -> Result<Session, CommandError> {
        Ok(self.config.require_session()?)
    }
}

/// Turn a stored-session auth failure into a hint to log in again.
fn hint_on_auth(error: ApiError) -> CommandError {
    if error.is_auth() {
        tracing::warn!("Session rejected. Run `paydesk login` and update PAYDESK_AUTH_TOKEN.");
    }
    CommandError::Api(error)
}
