//! Operator payout review.
//!
//! These commands need a `superAdmin` session. When `PAYDESK_ROLE` says
//! otherwise they fail before anything is sent.

use paydesk_core::{PayoutFilters, PayoutId, PayoutStatus};

use super::{CommandError, Context, hint_on_auth};
use crate::output;

/// List payouts across all merchants.
pub async fn payouts(
    ctx: &Context,
    status: Option<PayoutStatus>,
    page: Option<u32>,
    limit: Option<u32>,
) -> Result<(), CommandError> {
    let session = ctx.session()?;
    let filters = PayoutFilters {
        status,
        page,
        limit,
    };
    let list = ctx
        .client
        .admin_payouts(&session, &filters)
        .await
        .map_err(hint_on_auth)?;
    tracing::info!(count = list.payouts.len(), "Fetched payouts");
    output::payouts(&list.payouts, list.summary.as_ref());
    Ok(())
}

pub async fn approve(ctx: &Context, id: &str, notes: Option<&str>) -> Result<(), CommandError> {
    let session = ctx.session()?;
    let response = ctx
        .client
        .approve_payout(&session, &PayoutId::from(id), notes)
        .await
        .map_err(hint_on_auth)?;
    output::line(response.message_or("Payout approved"));
    Ok(())
}

pub async fn reject(ctx: &Context, id: &str, reason: &str) -> Result<(), CommandError> {
    let session = ctx.session()?;
    let response = ctx
        .client
        .reject_payout(&session, &PayoutId::from(id), reason)
        .await
        .map_err(hint_on_auth)?;
    output::line(response.message_or("Payout rejected"));
    Ok(())
}

/// Record the bank transfer for an approved payout.
pub async fn process(
    ctx: &Context,
    id: &str,
    utr: &str,
    notes: Option<&str>,
) -> Result<(), CommandError> {
    let session = ctx.session()?;
    let response = ctx
        .client
        .process_payout(&session, &PayoutId::from(id), utr, notes)
        .await
        .map_err(hint_on_auth)?;
    output::line(response.message_or("Payout processed"));
    Ok(())
}
