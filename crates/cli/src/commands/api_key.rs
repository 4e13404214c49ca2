//! Merchant API key.
//!
//! Keys are printed as `PAYDESK_API_KEY=...` so they can be pasted into
//! `.env` like the login token.

use paydesk_client::ApiError;
use secrecy::ExposeSecret;

use super::{CommandError, Context, hint_on_auth};
use crate::output;

/// Issue the merchant's API key.
pub async fn create(ctx: &Context) -> Result<(), CommandError> {
    let session = ctx.session()?;
    let response = ctx.client.create_api_key(&session).await.map_err(|e| {
        if matches!(&e, ApiError::Status { message, .. } if message.contains("already")) {
            tracing::warn!("An API key already exists. Run `paydesk api-key show` to fetch it.");
        }
        hint_on_auth(e)
    })?;

    match &response.key {
        Some(key) => output::line(&format!("PAYDESK_API_KEY={}", key.expose_secret())),
        None => output::line(response.message.as_deref().unwrap_or("API key created")),
    }
    Ok(())
}

/// Fetch the existing API key.
pub async fn show(ctx: &Context) -> Result<(), CommandError> {
    let session = ctx.session()?;
    let key = ctx.client.api_key(&session).await.map_err(|e| {
        if matches!(e, ApiError::Parse(_)) {
            tracing::warn!("No API key on record. Run `paydesk api-key create` first.");
        }
        hint_on_auth(e)
    })?;
    output::line(&format!("PAYDESK_API_KEY={}", key.expose_secret()));
    Ok(())
}
