//! Payout records and payout requests.
//!
//! The payouts endpoints are shared by the merchant and operator screens and
//! have drifted between camelCase and snake_case. Records deserialize
//! leniently: unknown statuses fall back, amounts may be strings, and the
//! merchant reference may be a bare id or a populated object.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::coerce::{lenient_amount, lenient_count, lenient_parse, null_as_default};
use crate::types::{MerchantId, PayoutId, PayoutStatus, TransferMode};

/// One payout request as listed by the backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "PayoutRecord")]
pub struct Payout {
    pub payout_id: Option<PayoutId>,
    pub merchant_id: Option<MerchantId>,
    pub merchant_name: Option<String>,
    pub amount: Option<Decimal>,
    pub commission: Option<Decimal>,
    pub net_amount: Option<Decimal>,
    pub status: PayoutStatus,
    pub transfer_mode: Option<TransferMode>,
    pub beneficiary_details: Option<BeneficiaryDetails>,
    pub requested_by_name: Option<String>,
    pub requested_at: Option<String>,
    pub approved_by_name: Option<String>,
    pub approved_at: Option<String>,
    pub completed_at: Option<String>,
    pub utr: Option<String>,
    pub notes: Option<String>,
    pub admin_notes: Option<String>,
    pub rejection_reason: Option<String>,
}

/// Wire shape of a payout row. Documents often carry several ids and
/// timestamps at once, so those are kept apart here and merged afterwards.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PayoutRecord {
    #[serde(default, alias = "payout_id")]
    payout_id: Option<PayoutId>,
    #[serde(default)]
    id: Option<PayoutId>,
    #[serde(default, rename = "_id")]
    document_id: Option<PayoutId>,
    #[serde(default, alias = "merchant_id", deserialize_with = "merchant_ref")]
    merchant_id: Option<MerchantId>,
    #[serde(default, alias = "merchant_name")]
    merchant_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_amount")]
    amount: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient_amount")]
    commission: Option<Decimal>,
    #[serde(default, alias = "net_amount", deserialize_with = "lenient_amount")]
    net_amount: Option<Decimal>,
    #[serde(default, deserialize_with = "null_as_default")]
    status: PayoutStatus,
    #[serde(default, alias = "transfer_mode", deserialize_with = "lenient_parse")]
    transfer_mode: Option<TransferMode>,
    #[serde(default, alias = "beneficiary_details")]
    beneficiary_details: Option<BeneficiaryDetails>,
    #[serde(default, alias = "requested_by_name")]
    requested_by_name: Option<String>,
    #[serde(default, alias = "requested_at")]
    requested_at: Option<String>,
    #[serde(default, alias = "created_at")]
    created_at: Option<String>,
    #[serde(default, alias = "approved_by_name")]
    approved_by_name: Option<String>,
    #[serde(default, alias = "approved_at")]
    approved_at: Option<String>,
    #[serde(default, alias = "completed_at")]
    completed_at: Option<String>,
    #[serde(default)]
    utr: Option<String>,
    #[serde(default)]
    notes: Option<String>,
    #[serde(default, alias = "admin_notes")]
    admin_notes: Option<String>,
    #[serde(default, alias = "rejection_reason")]
    rejection_reason: Option<String>,
}

impl From<PayoutRecord> for Payout {
    fn from(record: PayoutRecord) -> Self {
        Self {
            payout_id: record.payout_id.or(record.id).or(record.document_id),
            merchant_id: record.merchant_id,
            merchant_name: record.merchant_name,
            amount: record.amount,
            commission: record.commission,
            net_amount: record.net_amount,
            status: record.status,
            transfer_mode: record.transfer_mode,
            beneficiary_details: record.beneficiary_details,
            requested_by_name: record.requested_by_name,
            requested_at: record.requested_at.or(record.created_at),
            approved_by_name: record.approved_by_name,
            approved_at: record.approved_at,
            completed_at: record.completed_at,
            utr: record.utr,
            notes: record.notes,
            admin_notes: record.admin_notes,
            rejection_reason: record.rejection_reason,
        }
    }
}

/// Where the money goes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BeneficiaryDetails {
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "upi_id")]
    pub upi_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "account_number")]
    pub account_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "ifsc_code")]
    pub ifsc_code: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        alias = "account_holder_name"
    )]
    pub account_holder_name: Option<String>,
}

/// Counters the operator payouts listing returns alongside the rows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayoutSummary {
    #[serde(default, deserialize_with = "lenient_count")]
    pub total_payout_requests: Option<u64>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub requested_payouts: Option<u64>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub completed_payouts: Option<u64>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub rejected_payouts: Option<u64>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub failed_payouts: Option<u64>,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub total_pending: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub total_completed: Option<Decimal>,
}

impl PayoutSummary {
    /// Rejected and failed payouts together.
    #[must_use]
    pub fn unsuccessful(&self) -> u64 {
        self.rejected_payouts
            .unwrap_or(0)
            .saturating_add(self.failed_payouts.unwrap_or(0))
    }
}

/// A page of payouts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PayoutList {
    pub payouts: Vec<Payout>,
    pub summary: Option<PayoutSummary>,
}

impl PayoutList {
    /// Parse a listing response.
    ///
    /// Accepts `{ "payouts": [...], "summary": {...} }`, the same under a
    /// `data` key, or a bare array.
    ///
    /// # Errors
    ///
    /// Returns an error if a row is not a JSON object or the summary is not
    /// an object.
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        match value {
            Value::Array(rows) => Ok(Self {
                payouts: serde_json::from_value(Value::Array(rows))?,
                summary: None,
            }),
            Value::Object(mut map) => {
                if let Some(data @ (Value::Object(_) | Value::Array(_))) = map.remove("data") {
                    return Self::from_value(data);
                }
                let payouts = match map.remove("payouts") {
                    Some(Value::Null) | None => Vec::new(),
                    Some(rows) => serde_json::from_value(rows)?,
                };
                let summary = match map.remove("summary") {
                    Some(Value::Null) | None => None,
                    Some(summary) => Some(serde_json::from_value(summary)?),
                };
                Ok(Self { payouts, summary })
            }
            _ => Ok(Self::default()),
        }
    }
}

/// Filters for the operator payouts listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PayoutFilters {
    pub status: Option<PayoutStatus>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl PayoutFilters {
    /// Query-string pairs. Unset filters are left out.
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(status) = self.status {
            pairs.push(("status", status.to_string()));
        }
        if let Some(page) = self.page {
            pairs.push(("page", page.to_string()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        pairs
    }
}

/// Body of a merchant payout request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PayoutRequest {
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub transfer_mode: TransferMode,
    pub beneficiary_details: BeneficiaryDetails,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl PayoutRequest {
    /// A UPI payout to the given handle.
    #[must_use]
    pub fn upi(amount: Decimal, upi_id: impl Into<String>) -> Self {
        Self {
            amount,
            transfer_mode: TransferMode::Upi,
            beneficiary_details: BeneficiaryDetails {
                upi_id: Some(upi_id.into()),
                ..BeneficiaryDetails::default()
            },
            notes: None,
        }
    }

    /// Attach a note for the reviewer.
    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        let notes = notes.into();
        self.notes = (!notes.trim().is_empty()).then_some(notes);
        self
    }
}

/// `merchantId` is either the id itself or a populated merchant document.
fn merchant_ref<'de, D>(deserializer: D) -> Result<Option<MerchantId>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(id)) if !id.is_empty() => Some(MerchantId::new(id)),
        Some(Value::Object(map)) => map
            .get("_id")
            .or_else(|| map.get("id"))
            .and_then(Value::as_str)
            .map(MerchantId::from),
        _ => None,
    })
}
