//! Transaction listings.

use paydesk_core::{OrderId, TransactionFilters};

use super::{CommandError, Context, hint_on_auth};
use crate::output;

/// The merchant's own transactions.
pub async fn list(ctx: &Context) -> Result<(), CommandError> {
    let session = ctx.session()?;
    let transactions = ctx.client.transactions(&session).await.map_err(hint_on_auth)?;
    tracing::info!(count = transactions.len(), "Fetched transactions");
    output::transactions(&transactions);
    Ok(())
}

/// Current status of one order.
pub async fn status(ctx: &Context, order_id: &str, json: bool) -> Result<(), CommandError> {
    let session = ctx.session()?;
    let status = ctx
        .client
        .payment_status(&session, &OrderId::from(order_id))
        .await
        .map_err(hint_on_auth)?;
    if json {
        output::line(&serde_json::to_string_pretty(&status)?);
    } else {
        output::payment_status(&status);
    }
    Ok(())
}

/// Operator search across all merchants.
pub async fn search(ctx: &Context, filters: &TransactionFilters) -> Result<(), CommandError> {
    let session = ctx.session()?;
    let transactions = ctx
        .client
        .admin_transactions(&session, filters)
        .await
        .map_err(hint_on_auth)?;
    tracing::info!(count = transactions.len(), "Fetched transactions");
    output::transactions(&transactions);
    Ok(())
}
