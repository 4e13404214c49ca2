//! Sign in.
//!
//! Prints the session as environment assignments so it can be pasted into
//! `.env` for later commands.

use secrecy::ExposeSecret;

use super::{CommandError, Context};
use crate::output;

/// Sign in and print `PAYDESK_AUTH_TOKEN` / `PAYDESK_ROLE`.
pub async fn run(ctx: &Context, email: &str, password: &str) -> Result<(), CommandError> {
    tracing::info!("Signing in to {}", ctx.client.base_url());
    let session = ctx.client.login(email, password).await?;

    if let Some(token) = &session.auth_token {
        output::line(&format!("PAYDESK_AUTH_TOKEN={}", token.expose_secret()));
    }
    if let Some(role) = session.role {
        output::line(&format!("PAYDESK_ROLE={role}"));
    }
    Ok(())
}
