//! CSV export of operator payout listings.

use std::io::Write;

use chrono::{DateTime, NaiveDate};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::payout::Payout;
use crate::types::{MerchantId, Money, PayoutId, TransferMode};

/// Column headers, in order.
pub const PAYOUT_CSV_HEADERS: [&str; 15] = [
    "Payout ID",
    "Merchant Name",
    "Merchant ID",
    "Amount",
    "Commission",
    "Net Amount",
    "Status",
    "Transfer Mode",
    "Requested By",
    "Requested At",
    "Approved By",
    "Approved At",
    "Completed At",
    "UTR",
    "Notes",
];

const MISSING: &str = "N/A";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("nothing to export")]
    Empty,

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Write payouts as CSV, one row per payout, with a header row.
///
/// # Errors
///
/// Returns [`ExportError::Empty`] for an empty list, otherwise any CSV or
/// I/O failure from the writer.
pub fn write_payouts_csv<W: Write>(writer: W, payouts: &[Payout]) -> Result<usize, ExportError> {
    if payouts.is_empty() {
        return Err(ExportError::Empty);
    }

    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(PAYOUT_CSV_HEADERS)?;
    for payout in payouts {
        csv.write_record(payout_row(payout))?;
    }
    csv.flush()?;

    tracing::info!(rows = payouts.len(), "Exported payouts to CSV");
    Ok(payouts.len())
}

/// `all_payouts_YYYY-MM-DD.csv` for the given day.
#[must_use]
pub fn default_export_filename(date: NaiveDate) -> String {
    format!("all_payouts_{}.csv", date.format("%Y-%m-%d"))
}

fn payout_row(payout: &Payout) -> [String; 15] {
    let text = |value: Option<&str>| {
        value
            .filter(|s| !s.is_empty())
            .map_or_else(|| MISSING.to_owned(), ToOwned::to_owned)
    };
    // Zero renders as N/A, like a missing amount.
    let money = |value: Option<Decimal>| {
        value
            .filter(|amount| !amount.is_zero())
            .map_or_else(|| MISSING.to_owned(), |amount| Money::inr(amount).to_string())
    };
    let when = |value: Option<&str>| value.map_or_else(|| MISSING.to_owned(), format_timestamp);

    [
        text(payout.payout_id.as_ref().map(PayoutId::as_str)),
        text(payout.merchant_name.as_deref()),
        text(payout.merchant_id.as_ref().map(MerchantId::as_str)),
        money(payout.amount),
        money(payout.commission),
        money(payout.net_amount),
        payout.status.to_string(),
        payout
            .transfer_mode
            .unwrap_or(TransferMode::Upi)
            .label()
            .to_owned(),
        text(payout.requested_by_name.as_deref()),
        when(payout.requested_at.as_deref()),
        text(payout.approved_by_name.as_deref()),
        when(payout.approved_at.as_deref()),
        when(payout.completed_at.as_deref()),
        text(payout.utr.as_deref()),
        text(payout.admin_notes.as_deref()),
    ]
}

/// `DD Mon YYYY, HH:MM` for RFC 3339 input, anything else verbatim.
#[must_use]
pub fn format_timestamp(value: &str) -> String {
    DateTime::parse_from_rfc3339(value).map_or_else(
        |_| value.to_owned(),
        |parsed| parsed.format("%d %b %Y, %H:%M").to_string(),
    )
}
