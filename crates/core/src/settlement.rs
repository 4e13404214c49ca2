//! Settlement metadata and transaction summary carried by balance payloads.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::balance::RawBalancePayload;
use crate::balance::table::{FieldPath, dotted};
use crate::coerce::{Coerced, MalformedFieldError, coerce_amount, coerce_count};

/// Settled/unsettled transaction counts and the next settlement window.
///
/// `settled + unsettled` should equal the total transaction count, but a
/// mismatch is only a display inconsistency.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementInfo {
    pub settled_transactions: u64,
    pub unsettled_transactions: u64,
    /// Human-readable description, e.g. "T+1 (tomorrow 11:00)".
    pub next_settlement: Option<String>,
}

impl SettlementInfo {
    /// Whether the counts add up to the given total.
    #[must_use]
    pub const fn is_consistent_with(&self, total_transactions: u64) -> bool {
        self.settled_transactions.saturating_add(self.unsettled_transactions)
            == total_transactions
    }

    /// Extract settlement info from a raw balance payload.
    ///
    /// Returns `None` if the payload carries no settlement data at all.
    #[must_use]
    pub fn from_payload(raw: &RawBalancePayload) -> Option<Self> {
        let mut warnings = Vec::new();
        let info = Self::from_payload_with(raw, &mut warnings);
        for warning in &warnings {
            tracing::warn!(%warning, "Settlement field defaulted");
        }
        info
    }

    pub(crate) fn from_payload_with(
        raw: &RawBalancePayload,
        warnings: &mut Vec<MalformedFieldError>,
    ) -> Option<Self> {
        const SETTLED: &[FieldPath] = &[
            &["settlement_info", "settled_transactions"],
            &["settlementInfo", "settledTransactions"],
            &["balance", "settled_transactions"],
            &["transaction_summary", "settled_transactions"],
        ];
        const UNSETTLED: &[FieldPath] = &[
            &["settlement_info", "unsettled_transactions"],
            &["settlementInfo", "unsettledTransactions"],
            &["balance", "unsettled_transactions"],
            &["transaction_summary", "unsettled_transactions"],
        ];
        const NEXT: &[FieldPath] = &[
            &["settlement_info", "next_settlement"],
            &["settlementInfo", "nextSettlement"],
            &["balance", "next_settlement"],
        ];

        let settled = resolve_count(raw, "settled_transactions", SETTLED, warnings);
        let unsettled = resolve_count(raw, "unsettled_transactions", UNSETTLED, warnings);
        let next_settlement = NEXT
            .iter()
            .find_map(|path| raw.lookup(path).and_then(text_of));

        if settled.is_none() && unsettled.is_none() && next_settlement.is_none() {
            return None;
        }

        Some(Self {
            settled_transactions: settled.unwrap_or(0),
            unsettled_transactions: unsettled.unwrap_or(0),
            next_settlement,
        })
    }
}

/// Counters from the backend's `transaction_summary` block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionSummary {
    pub total_transactions: u64,
    pub total_payouts_completed: u64,
    pub pending_payout_requests: u64,
    pub avg_commission_per_transaction: Option<Decimal>,
}

impl TransactionSummary {
    pub(crate) fn from_payload_with(
        raw: &RawBalancePayload,
        warnings: &mut Vec<MalformedFieldError>,
    ) -> Option<Self> {
        const BLOCK: &[FieldPath] = &[&["transaction_summary"], &["transactionSummary"]];

        let block = BLOCK
            .iter()
            .find_map(|path| raw.lookup(path).filter(|v| v.is_object()))?;
        let block = RawBalancePayload::new(block.clone());

        let mut count = |snake: &'static str, camel: &str| {
            resolve_count(&block, snake, &[&[snake], &[camel]], warnings).unwrap_or(0)
        };
        let total_transactions = count("total_transactions", "totalTransactions");
        let total_payouts_completed = count("total_payouts_completed", "totalPayoutsCompleted");
        let pending_payout_requests = count("pending_payout_requests", "pendingPayoutRequests");

        let avg_keys = ["avg_commission_per_transaction", "avgCommissionPerTransaction"];
        let avg_commission_per_transaction = match resolve_amount(&block, &avg_keys) {
            Some((_, Coerced::Value(amount))) => Some(amount),
            Some((key, Coerced::Malformed(kind))) => {
                warnings.push(MalformedFieldError {
                    field: "avg_commission_per_transaction",
                    path: format!("transaction_summary.{key}"),
                    kind,
                });
                None
            }
            Some((_, Coerced::Absent)) | None => None,
        };

        Some(Self {
            total_transactions,
            total_payouts_completed,
            pending_payout_requests,
            avg_commission_per_transaction,
        })
    }
}

fn resolve_count(
    raw: &RawBalancePayload,
    field: &'static str,
    paths: &[&[&str]],
    warnings: &mut Vec<MalformedFieldError>,
) -> Option<u64> {
    for path in paths {
        let Some(value) = raw.lookup(path) else {
            continue;
        };
        match coerce_count(value) {
            Coerced::Absent => {}
            Coerced::Value(count) => return Some(count),
            Coerced::Malformed(kind) => {
                warnings.push(MalformedFieldError {
                    field,
                    path: dotted(path),
                    kind,
                });
                return Some(0);
            }
        }
    }
    None
}

/// First non-null value among top-level keys, coerced as an amount.
fn resolve_amount<'k>(
    raw: &RawBalancePayload,
    keys: &[&'k str],
) -> Option<(&'k str, Coerced<Decimal>)> {
    keys.iter().find_map(|&key| {
        raw.lookup(&[key])
            .filter(|v| !v.is_null())
            .map(|v| (key, coerce_amount(v)))
    })
}

fn text_of(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_absent_settlement_is_none() {
        let raw = RawBalancePayload::from(json!({"balance": {"available_balance": 10}}));
        assert_eq!(SettlementInfo::from_payload(&raw), None);
    }

    #[test]
    fn test_snake_case_settlement_block() {
        let raw = RawBalancePayload::from(json!({
            "settlement_info": {
                "settled_transactions": 8,
                "unsettled_transactions": "2",
                "next_settlement": "T+1 at 11:00"
            }
        }));
        let info = SettlementInfo::from_payload(&raw).unwrap();
        assert_eq!(info.settled_transactions, 8);
        assert_eq!(info.unsettled_transactions, 2);
        assert_eq!(info.next_settlement.as_deref(), Some("T+1 at 11:00"));
        assert!(info.is_consistent_with(10));
        assert!(!info.is_consistent_with(11));
    }

    #[test]
    fn test_camel_case_settlement_block() {
        let raw = RawBalancePayload::from(json!({
            "settlementInfo": {"settledTransactions": 3}
        }));
        let info = SettlementInfo::from_payload(&raw).unwrap();
        assert_eq!(info.settled_transactions, 3);
        assert_eq!(info.unsettled_transactions, 0);
        assert_eq!(info.next_settlement, None);
    }

    #[test]
    fn test_malformed_count_defaults_to_zero() {
        let raw = RawBalancePayload::from(json!({
            "settlement_info": {"settled_transactions": "lots", "unsettled_transactions": 1}
        }));
        let mut warnings = Vec::new();
        let info = SettlementInfo::from_payload_with(&raw, &mut warnings).unwrap();
        assert_eq!(info.settled_transactions, 0);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].path, "settlement_info.settled_transactions");
    }

    #[test]
    fn test_transaction_summary() {
        let raw = RawBalancePayload::from(json!({
            "transaction_summary": {
                "total_transactions": 42,
                "total_payouts_completed": 3,
                "pending_payout_requests": 1,
                "avg_commission_per_transaction": "4.52"
            }
        }));
        let mut warnings = Vec::new();
        let summary = TransactionSummary::from_payload_with(&raw, &mut warnings).unwrap();
        assert_eq!(summary.total_transactions, 42);
        assert_eq!(summary.total_payouts_completed, 3);
        assert_eq!(summary.pending_payout_requests, 1);
        assert_eq!(
            summary.avg_commission_per_transaction,
            Some(Decimal::new(452, 2))
        );
        assert!(warnings.is_empty());
    }
}
