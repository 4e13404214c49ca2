//! Merchant payout commands and CSV export.

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use paydesk_core::{
    ExportError, PayoutFilters, PayoutId, PayoutRequest, PayoutStatus, default_export_filename,
    write_payouts_csv,
};
use rust_decimal::Decimal;

use super::{CommandError, Context, hint_on_auth};
use crate::output;

/// List the merchant's payouts.
pub async fn list(ctx: &Context) -> Result<(), CommandError> {
    let session = ctx.session()?;
    let list = ctx.client.payouts(&session).await.map_err(hint_on_auth)?;
    tracing::info!(count = list.payouts.len(), "Fetched payouts");
    output::payouts(&list.payouts, list.summary.as_ref());
    Ok(())
}

/// Request a UPI payout.
///
/// Eligibility is evaluated from a fresh balance first, so a request the
/// backend would refuse is never sent.
pub async fn request(
    ctx: &Context,
    amount: Decimal,
    upi_id: &str,
    notes: Option<String>,
) -> Result<(), CommandError> {
    let session = ctx.session()?;
    let overview = ctx
        .client
        .balance_overview(&session)
        .await
        .map_err(hint_on_auth)?;

    let mut payout = PayoutRequest::upi(amount, upi_id.trim());
    if let Some(notes) = notes {
        payout = payout.with_notes(notes);
    }

    let response = ctx
        .client
        .request_payout(&session, &overview.eligibility, &payout)
        .await
        .map_err(hint_on_auth)?;
    output::line(response.message_or("Payout request submitted"));
    Ok(())
}

/// Cancel an open payout.
pub async fn cancel(ctx: &Context, id: &str) -> Result<(), CommandError> {
    let session = ctx.session()?;
    let response = ctx
        .client
        .cancel_payout(&session, &PayoutId::from(id))
        .await
        .map_err(hint_on_auth)?;
    output::line(response.message_or("Payout cancelled"));
    Ok(())
}

/// Write payouts to a CSV file.
///
/// With `all`, exports the operator listing (optionally filtered by status);
/// otherwise the merchant's own payouts.
pub async fn export(
    ctx: &Context,
    all: bool,
    status: Option<PayoutStatus>,
    output: Option<PathBuf>,
) -> Result<(), CommandError> {
    let session = ctx.session()?;
    let list = if all {
        let filters = PayoutFilters {
            status,
            ..PayoutFilters::default()
        };
        ctx.client.admin_payouts(&session, &filters).await
    } else {
        if status.is_some() {
            tracing::warn!("--status only applies with --all; exporting every payout");
        }
        ctx.client.payouts(&session).await
    }
    .map_err(hint_on_auth)?;
    if list.payouts.is_empty() {
        return Err(ExportError::Empty.into());
    }

    let path = output.unwrap_or_else(|| {
        PathBuf::from(default_export_filename(chrono::Local::now().date_naive()))
    });
    let io_error = |source| CommandError::Io {
        path: path.display().to_string(),
        source,
    };

    let file = File::create(&path).map_err(io_error)?;
    let rows = write_payouts_csv(BufWriter::new(file), &list.payouts)?;

    output::line(&format!("Exported {rows} payouts to {}", path.display()));
    Ok(())
}
