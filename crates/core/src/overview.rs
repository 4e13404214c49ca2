//! One balance payload, fully digested.

use serde::Serialize;

use crate::balance::{BalanceBreakdown, NormalizedBalance, RawBalancePayload, normalize_balance_report};
use crate::coerce::MalformedFieldError;
use crate::eligibility::{EligibilityConfig, PayoutEligibility, evaluate_eligibility};
use crate::settlement::SettlementInfo;

/// Everything the balance screen shows, derived from a single payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BalanceOverview {
    pub balance: NormalizedBalance,
    pub settlement: Option<SettlementInfo>,
    pub eligibility: PayoutEligibility,
    pub breakdown: BalanceBreakdown,
    /// Fields that were present but unusable and were shown as zero.
    #[serde(skip)]
    pub warnings: Vec<MalformedFieldError>,
}

impl BalanceOverview {
    /// Normalize, extract settlement data and evaluate eligibility.
    #[must_use]
    pub fn from_payload(raw: &RawBalancePayload, config: &EligibilityConfig) -> Self {
        let report = normalize_balance_report(raw);
        let mut warnings = report.warnings;
        let logged = warnings.len();
        let settlement = SettlementInfo::from_payload_with(raw, &mut warnings);
        for warning in warnings.iter().skip(logged) {
            tracing::warn!(%warning, "Settlement field defaulted");
        }
        let eligibility = evaluate_eligibility(&report.balance, settlement.as_ref(), config);
        let breakdown = BalanceBreakdown::from(&report.balance);

        if let (Some(settlement), Some(summary)) =
            (&settlement, &report.balance.transaction_summary)
            && !settlement.is_consistent_with(summary.total_transactions)
        {
            tracing::debug!(
                settled = settlement.settled_transactions,
                unsettled = settlement.unsettled_transactions,
                total = summary.total_transactions,
                "Settlement counts do not add up to total transactions"
            );
        }

        Self {
            balance: report.balance,
            settlement,
            eligibility,
            breakdown,
            warnings,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::eligibility::IneligibilityReason;
    use rust_decimal::Decimal;
    use serde_json::json;

    #[test]
    fn test_overview_of_unsettled_merchant() {
        let raw = RawBalancePayload::from(json!({
            "balance": {"available_balance": 0, "total_revenue": "2500"},
            "settlement_info": {"settled_transactions": 0, "unsettled_transactions": 5},
            "transaction_summary": {"total_transactions": 5}
        }));
        let overview = BalanceOverview::from_payload(&raw, &EligibilityConfig::default());
        assert_eq!(overview.balance.total_balance, Decimal::new(2500, 0));
        assert_eq!(overview.settlement.unwrap().unsettled_transactions, 5);
        assert_eq!(
            overview.eligibility.reason,
            Some(IneligibilityReason::NoSettledFunds)
        );
        assert!(overview.warnings.is_empty());
    }

    #[test]
    fn test_overview_collects_every_warning() {
        let raw = RawBalancePayload::from(json!({
            "balance": {"available_balance": true},
            "settlement_info": {"settled_transactions": "many"}
        }));
        let overview = BalanceOverview::from_payload(&raw, &EligibilityConfig::default());
        let paths: Vec<_> = overview.warnings.iter().map(|w| w.path.as_str()).collect();
        assert_eq!(
            paths,
            ["balance.available_balance", "settlement_info.settled_transactions"]
        );
    }

    #[test]
    fn test_extreme_deductions_do_not_panic() {
        let raw = RawBalancePayload::from(json!({
            "balance": {
                "total_refunded": "79228162514264337593543950335",
                "total_commission": "79228162514264337593543950335"
            }
        }));
        let overview = BalanceOverview::from_payload(&raw, &EligibilityConfig::default());
        assert_eq!(overview.balance.total_refunded, Decimal::MAX);
        assert_eq!(overview.balance.commission_deducted, Decimal::MAX);
        assert!(!overview.breakdown.net_revenue_consistent);
    }
}
