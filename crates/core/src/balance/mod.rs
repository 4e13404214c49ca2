//! Balance normalization.
//!
//! The balance endpoint has changed shape several times: fields may sit under
//! a `balance` key or at the top level, in snake_case or camelCase, as
//! numbers or numeric strings, or not at all. [`normalize_balance`] turns any
//! of those into a [`NormalizedBalance`] whose amounts are always present,
//! finite and non-negative.
//!
//! # Resolution
//!
//! Every amount is resolved through the declarative table in [`table`]:
//! candidates are tried in ascending priority, the first non-null value
//! wins (a present `0` counts), and a field with no candidate present is
//! zero. Values are never re-derived from other fields.
//!
//! # Malformed values
//!
//! A present value that cannot be read as an amount is replaced by zero and
//! reported as a [`MalformedFieldError`]. The normalizer never fails.

pub mod breakdown;
pub mod table;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::coerce::{Coerced, MalformedFieldError, coerce_amount, coerce_flag};
use crate::eligibility::ServerEligibility;
use crate::settlement::TransactionSummary;
use table::{BALANCE_FIELDS, BalanceField, FieldPath, dotted};

pub use breakdown::{BalanceBreakdown, BreakdownRow, RowSign};

/// Untrusted balance payload exactly as the backend sent it.
///
/// `null` and non-object payloads behave like an empty object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawBalancePayload(Value);

impl RawBalancePayload {
    /// Wrap a JSON value.
    #[must_use]
    pub const fn new(value: Value) -> Self {
        Self(value)
    }

    /// Borrow the underlying JSON.
    #[must_use]
    pub const fn as_value(&self) -> &Value {
        &self.0
    }

    /// Consume the payload and return the underlying JSON.
    #[must_use]
    pub fn into_inner(self) -> Value {
        self.0
    }

    /// Follow a path of object keys. Returns `None` as soon as a segment is
    /// missing or the current value is not an object.
    #[must_use]
    pub fn lookup(&self, path: &[&str]) -> Option<&Value> {
        path.iter()
            .try_fold(&self.0, |current, key| current.as_object()?.get(*key))
    }
}

impl From<Value> for RawBalancePayload {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

impl From<Option<Value>> for RawBalancePayload {
    fn from(value: Option<Value>) -> Self {
        Self(value.unwrap_or(Value::Null))
    }
}

/// Stable, UI-ready balance record.
///
/// All amounts are in rupees and non-negative. Refunds are stored as a
/// positive magnitude; sign is a rendering concern (see [`BalanceBreakdown`]).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedBalance {
    /// Settled funds that can be withdrawn now.
    pub available_balance: Decimal,
    /// Payout requests not yet completed.
    pub pending_balance: Decimal,
    /// Total revenue (gross payments received).
    pub total_balance: Decimal,
    /// Gateway commission deducted from revenue.
    pub commission_deducted: Decimal,
    pub net_revenue: Decimal,
    pub total_paid_out: Decimal,
    pub total_refunded: Decimal,
    pub settled_commission: Decimal,
    pub unsettled_commission: Decimal,
    pub settled_net_revenue: Decimal,
    pub unsettled_net_revenue: Decimal,
    /// Commission rate as the backend describes it, e.g. `"3.8%"`.
    pub commission_rate: Option<String>,
    /// The backend's own payout decision, if it sent one.
    pub server_eligibility: Option<ServerEligibility>,
    pub transaction_summary: Option<TransactionSummary>,
    pub commission_structure: Option<CommissionStructure>,
    pub merchant: Option<MerchantInfo>,
}

impl NormalizedBalance {
    /// Amount for one table field.
    #[must_use]
    pub const fn amount(&self, field: BalanceField) -> Decimal {
        match field {
            BalanceField::AvailableBalance => self.available_balance,
            BalanceField::PendingBalance => self.pending_balance,
            BalanceField::TotalBalance => self.total_balance,
            BalanceField::CommissionDeducted => self.commission_deducted,
            BalanceField::NetRevenue => self.net_revenue,
            BalanceField::TotalPaidOut => self.total_paid_out,
            BalanceField::TotalRefunded => self.total_refunded,
            BalanceField::SettledCommission => self.settled_commission,
            BalanceField::UnsettledCommission => self.unsettled_commission,
            BalanceField::SettledNetRevenue => self.settled_net_revenue,
            BalanceField::UnsettledNetRevenue => self.unsettled_net_revenue,
        }
    }

    const fn slot(&mut self, field: BalanceField) -> &mut Decimal {
        match field {
            BalanceField::AvailableBalance => &mut self.available_balance,
            BalanceField::PendingBalance => &mut self.pending_balance,
            BalanceField::TotalBalance => &mut self.total_balance,
            BalanceField::CommissionDeducted => &mut self.commission_deducted,
            BalanceField::NetRevenue => &mut self.net_revenue,
            BalanceField::TotalPaidOut => &mut self.total_paid_out,
            BalanceField::TotalRefunded => &mut self.total_refunded,
            BalanceField::SettledCommission => &mut self.settled_commission,
            BalanceField::UnsettledCommission => &mut self.unsettled_commission,
            BalanceField::SettledNetRevenue => &mut self.settled_net_revenue,
            BalanceField::UnsettledNetRevenue => &mut self.unsettled_net_revenue,
        }
    }
}

/// Commission tiers as display strings (`"3.8%"`, `"₹18 flat"`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommissionStructure {
    pub payin: Option<String>,
    pub minimum_charge: Option<String>,
    pub payout_500_to_1000: Option<String>,
    pub payout_above_1000: Option<String>,
}

/// Merchant account details echoed by the balance endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerchantInfo {
    pub id: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
}

/// A normalized balance plus every field that had to be defaulted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizationReport {
    pub balance: NormalizedBalance,
    pub warnings: Vec<MalformedFieldError>,
}

/// Normalize a raw balance payload.
///
/// Never fails. Malformed fields are logged and defaulted to zero.
#[must_use]
pub fn normalize_balance(raw: &RawBalancePayload) -> NormalizedBalance {
    normalize_balance_report(raw).balance
}

/// Normalize a raw balance payload and return the defaulted fields as well.
#[must_use]
pub fn normalize_balance_report(raw: &RawBalancePayload) -> NormalizationReport {
    let mut balance = NormalizedBalance::default();
    let mut warnings = Vec::new();

    if !matches!(raw.as_value(), Value::Object(_) | Value::Null) {
        tracing::warn!("Balance payload is not an object; using defaults");
    }

    for rule in BALANCE_FIELDS {
        for candidate in rule.ordered() {
            let Some(value) = raw.lookup(candidate.path) else {
                continue;
            };
            match coerce_amount(value) {
                Coerced::Absent => continue,
                Coerced::Value(amount) => *balance.slot(rule.field) = amount,
                Coerced::Malformed(kind) => warnings.push(MalformedFieldError {
                    field: rule.field.name(),
                    path: dotted(candidate.path),
                    kind,
                }),
            }
            break;
        }
    }

    balance.commission_rate = first_text(
        raw,
        &[
            &["balance", "commission_rate"],
            &["balance", "commissionRate"],
            &["commissionRate"],
        ],
    );
    balance.server_eligibility = server_eligibility(raw, &mut warnings);
    balance.transaction_summary = TransactionSummary::from_payload_with(raw, &mut warnings);
    balance.commission_structure = commission_structure(raw);
    balance.merchant = merchant(raw);

    for warning in &warnings {
        tracing::warn!(
            field = warning.field,
            path = %warning.path,
            kind = %warning.kind,
            "Malformed balance field defaulted"
        );
    }

    NormalizationReport { balance, warnings }
}

fn server_eligibility(
    raw: &RawBalancePayload,
    warnings: &mut Vec<MalformedFieldError>,
) -> Option<ServerEligibility> {
    const BLOCK: &[FieldPath] = &[
        &["payout_eligibility"],
        &["payoutEligibility"],
        &["balance", "payout_eligibility"],
    ];

    let (block_path, block) = BLOCK.iter().find_map(|path| {
        raw.lookup(path)
            .filter(|v| v.is_object())
            .map(|v| (*path, RawBalancePayload::new(v.clone())))
    })?;

    let mut amount = |field: &'static str, keys: [&str; 2]| {
        let (key, value) = keys
            .into_iter()
            .find_map(|key| block.lookup(&[key]).map(|v| (key, v)))?;
        match coerce_amount(value) {
            Coerced::Value(amount) => Some(amount),
            Coerced::Absent => None,
            Coerced::Malformed(kind) => {
                warnings.push(MalformedFieldError {
                    field,
                    path: format!("{}.{key}", dotted(block_path)),
                    kind,
                });
                None
            }
        }
    };

    let minimum_payout_amount = amount(
        "minimum_payout_amount",
        ["minimum_payout_amount", "minimumPayoutAmount"],
    );
    let maximum_payout_amount = amount(
        "maximum_payout_amount",
        ["maximum_payout_amount", "maximumPayoutAmount"],
    );

    let can_request_payout = ["can_request_payout", "canRequestPayout"]
        .into_iter()
        .find_map(|key| block.lookup(&[key]).map(|v| (key, v)))
        .and_then(|(key, value)| match coerce_flag(value) {
            Coerced::Value(flag) => Some(flag),
            Coerced::Absent => None,
            Coerced::Malformed(kind) => {
                warnings.push(MalformedFieldError {
                    field: "can_request_payout",
                    path: format!("{}.{key}", dotted(block_path)),
                    kind,
                });
                None
            }
        });

    let reason = first_text(&block, &[&["reason"], &["message"]]);

    Some(ServerEligibility {
        can_request_payout,
        minimum_payout_amount,
        maximum_payout_amount,
        reason,
    })
}

fn commission_structure(raw: &RawBalancePayload) -> Option<CommissionStructure> {
    let block = raw
        .lookup(&["balance", "commission_structure"])
        .or_else(|| raw.lookup(&["commission_structure"]))
        .filter(|v| v.is_object())?;
    let block = RawBalancePayload::new(block.clone());
    Some(CommissionStructure {
        payin: first_text(&block, &[&["payin"]]),
        minimum_charge: first_text(&block, &[&["minimum_charge"]]),
        payout_500_to_1000: first_text(&block, &[&["payout_500_to_1000"]]),
        payout_above_1000: first_text(&block, &[&["payout_above_1000"]]),
    })
}

fn merchant(raw: &RawBalancePayload) -> Option<MerchantInfo> {
    let block = raw.lookup(&["merchant"]).filter(|v| v.is_object())?;
    let block = RawBalancePayload::new(block.clone());
    Some(MerchantInfo {
        id: first_text(&block, &[&["_id"], &["id"], &["merchantId"]]),
        name: first_text(&block, &[&["name"], &["merchantName"]]),
        email: first_text(&block, &[&["email"]]),
    })
}

fn first_text(raw: &RawBalancePayload, paths: &[&[&str]]) -> Option<String> {
    paths.iter().find_map(|path| match raw.lookup(path)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use core::str::FromStr;
    use serde_json::json;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn normalize(value: Value) -> NormalizedBalance {
        normalize_balance(&RawBalancePayload::from(value))
    }

    #[test]
    fn test_nested_snake_case_beats_top_level_camel_case() {
        let balance = normalize(json!({
            "balance": {"available_balance": 100},
            "availableBalance": 200
        }));
        assert_eq!(balance.available_balance, dec("100"));
    }

    #[test]
    fn test_nested_camel_case_beats_top_level() {
        let balance = normalize(json!({
            "balance": {"availableBalance": "75.25"},
            "availableBalance": 200
        }));
        assert_eq!(balance.available_balance, dec("75.25"));
    }

    #[test]
    fn test_top_level_legacy_fallback() {
        let balance = normalize(json!({
            "availableBalance": 200,
            "pendingBalance": "12",
            "totalBalance": 900
        }));
        assert_eq!(balance.available_balance, dec("200"));
        assert_eq!(balance.pending_balance, dec("12"));
        assert_eq!(balance.total_balance, dec("900"));
    }

    #[test]
    fn test_zero_is_a_present_value() {
        let balance = normalize(json!({
            "balance": {"available_balance": 0},
            "availableBalance": 999
        }));
        assert_eq!(balance.available_balance, Decimal::ZERO);
    }

    #[test]
    fn test_null_falls_through_to_next_candidate() {
        let balance = normalize(json!({
            "balance": {"available_balance": null, "availableBalance": 40}
        }));
        assert_eq!(balance.available_balance, dec("40"));
    }

    #[test]
    fn test_empty_and_null_payloads_default_everything() {
        for value in [json!({}), Value::Null, json!([1, 2, 3]), json!("oops")] {
            assert_eq!(normalize(value), NormalizedBalance::default());
        }
    }

    #[test]
    fn test_missing_payload_via_option() {
        let raw = RawBalancePayload::from(None);
        assert_eq!(normalize_balance(&raw), NormalizedBalance::default());
    }

    #[test]
    fn test_malformed_field_is_zero_and_reported() {
        let raw = RawBalancePayload::from(json!({
            "balance": {"available_balance": "twelve", "total_revenue": 500},
            "availableBalance": 300
        }));
        let report = normalize_balance_report(&raw);
        assert_eq!(report.balance.available_balance, Decimal::ZERO);
        assert_eq!(report.balance.total_balance, dec("500"));
        assert_eq!(report.warnings.len(), 1);
        let warning = &report.warnings[0];
        assert_eq!(warning.field, "available_balance");
        assert_eq!(warning.path, "balance.available_balance");
    }

    #[test]
    fn test_commission_aliases() {
        let balance = normalize(json!({"balance": {"total_commission": 190}}));
        assert_eq!(balance.commission_deducted, dec("190"));

        let balance = normalize(json!({
            "balance": {"commission_deducted": 150, "total_commission": 190}
        }));
        assert_eq!(balance.commission_deducted, dec("150"));
    }

    #[test]
    fn test_net_revenue_is_never_derived() {
        let balance = normalize(json!({
            "balance": {"total_revenue": 5000, "total_refunded": 100, "total_commission": 190}
        }));
        assert_eq!(balance.net_revenue, Decimal::ZERO);
        assert_eq!(balance.total_refunded, dec("100"));
    }

    #[test]
    fn test_settled_splits() {
        let balance = normalize(json!({
            "balance": {
                "settled_commission": "40.5",
                "unsettledCommission": 9.5,
                "settled_net_revenue": 1000,
                "unsettled_net_revenue": 250
            }
        }));
        assert_eq!(balance.settled_commission, dec("40.5"));
        assert_eq!(balance.unsettled_commission, dec("9.5"));
        assert_eq!(balance.settled_net_revenue, dec("1000"));
        assert_eq!(balance.unsettled_net_revenue, dec("250"));
    }

    #[test]
    fn test_idempotent() {
        let raw = RawBalancePayload::from(json!({
            "balance": {"available_balance": "1200.50", "total_revenue": 5000},
            "payout_eligibility": {"can_request_payout": true}
        }));
        assert_eq!(normalize_balance(&raw), normalize_balance(&raw));
    }

    #[test]
    fn test_server_eligibility_block() {
        let balance = normalize(json!({
            "payout_eligibility": {
                "can_request_payout": false,
                "minimum_payout_amount": "500",
                "maximum_payout_amount": 25000,
                "reason": "KYC pending"
            }
        }));
        let server = balance.server_eligibility.unwrap();
        assert_eq!(server.can_request_payout, Some(false));
        assert_eq!(server.minimum_payout_amount, Some(dec("500")));
        assert_eq!(server.maximum_payout_amount, Some(dec("25000")));
        assert_eq!(server.reason.as_deref(), Some("KYC pending"));
    }

    #[test]
    fn test_server_eligibility_camel_case() {
        let balance = normalize(json!({
            "payoutEligibility": {"canRequestPayout": true, "minimumPayoutAmount": 750}
        }));
        let server = balance.server_eligibility.unwrap();
        assert_eq!(server.can_request_payout, Some(true));
        assert_eq!(server.minimum_payout_amount, Some(dec("750")));
        assert_eq!(server.maximum_payout_amount, None);
    }

    #[test]
    fn test_malformed_server_flag_is_ignored() {
        let raw = RawBalancePayload::from(json!({
            "payout_eligibility": {"can_request_payout": "maybe"}
        }));
        let report = normalize_balance_report(&raw);
        let server = report.balance.server_eligibility.unwrap();
        assert_eq!(server.can_request_payout, None);
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].path, "payout_eligibility.can_request_payout");
    }

    #[test]
    fn test_pass_through_sections() {
        let balance = normalize(json!({
            "balance": {
                "commission_rate": "3.8%",
                "commission_structure": {
                    "payin": "3.8%",
                    "minimum_charge": "₹18",
                    "payout_500_to_1000": "₹30 flat",
                    "payout_above_1000": "2.5%"
                }
            },
            "merchant": {"_id": "64f0c2", "name": "Chai Point", "email": "ops@chai.example"}
        }));
        assert_eq!(balance.commission_rate.as_deref(), Some("3.8%"));
        let structure = balance.commission_structure.unwrap();
        assert_eq!(structure.payout_above_1000.as_deref(), Some("2.5%"));
        let merchant = balance.merchant.unwrap();
        assert_eq!(merchant.id.as_deref(), Some("64f0c2"));
        assert_eq!(merchant.name.as_deref(), Some("Chai Point"));
    }

    #[test]
    fn test_lookup_stops_at_non_objects() {
        let raw = RawBalancePayload::from(json!({"balance": 12}));
        assert_eq!(raw.lookup(&["balance", "available_balance"]), None);
        assert_eq!(raw.lookup(&["balance"]), Some(&json!(12)));
    }
}
