//! Merchant webhook settings.

use paydesk_core::{WebhookEvent, WebhookSettings};

use super::{CommandError, Context, hint_on_auth};
use crate::output;

/// Print the configured webhook.
pub async fn show(ctx: &Context, json: bool) -> Result<(), CommandError> {
    let session = ctx.session()?;
    let config = ctx
        .client
        .webhook_config(&session)
        .await
        .map_err(hint_on_auth)?;

    match config {
        Some(config) if json => output::line(&serde_json::to_string_pretty(&config)?),
        Some(config) => output::webhook(&config),
        None => output::line("No webhook configured"),
    }
    Ok(())
}

/// Create or replace the webhook.
pub async fn configure(
    ctx: &Context,
    url: &str,
    events: Vec<WebhookEvent>,
    secret: Option<String>,
    inactive: bool,
) -> Result<(), CommandError> {
    let session = ctx.session()?;
    let settings = WebhookSettings {
        secret,
        is_active: !inactive,
        ..WebhookSettings::new(url, events)
    };
    let response = ctx
        .client
        .configure_webhook(&session, &settings)
        .await
        .map_err(hint_on_auth)?;
    output::line(response.message_or("Webhook configured"));
    Ok(())
}

/// Send a test event to the webhook.
pub async fn test(ctx: &Context) -> Result<(), CommandError> {
    let session = ctx.session()?;
    let response = ctx
        .client
        .test_webhook(&session)
        .await
        .map_err(hint_on_auth)?;
    output::line(response.message_or("Test event sent"));
    Ok(())
}

pub async fn delete(ctx: &Context) -> Result<(), CommandError> {
    let session = ctx.session()?;
    let response = ctx
        .client
        .delete_webhook(&session)
        .await
        .map_err(hint_on_auth)?;
    output::line(response.message_or("Webhook deleted"));
    Ok(())
}

/// List the event names `configure` accepts.
pub fn events() {
    for event in WebhookEvent::ALL {
        output::line(&format!("{:<24}{}", event.as_str(), event.description()));
    }
}
