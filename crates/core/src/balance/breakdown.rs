//! Revenue breakdown rows for display.

use core::fmt;

use rust_decimal::Decimal;
use serde::Serialize;

use super::NormalizedBalance;
use crate::types::Money;

/// How a row contributes to the running balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RowSign {
    Credit,
    Debit,
    /// A subtotal. Shown as-is.
    Total,
}

/// One labelled amount. `amount` is always a magnitude.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BreakdownRow {
    pub label: &'static str,
    pub amount: Decimal,
    pub sign: RowSign,
}

impl fmt::Display for BreakdownRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match self.sign {
            RowSign::Debit => "- ",
            RowSign::Credit | RowSign::Total => "",
        };
        write!(f, "{prefix}{}", Money::inr(self.amount))
    }
}

/// The revenue-to-available-balance breakdown for one balance snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BalanceBreakdown {
    pub rows: Vec<BreakdownRow>,
    /// `true` when net revenue equals revenue minus refunds and commission.
    /// A mismatch is shown to the user but is not an error.
    pub net_revenue_consistent: bool,
}

impl BalanceBreakdown {
    /// Net revenue implied by the other rows, `None` if it overflows.
    #[must_use]
    pub fn expected_net_revenue(balance: &NormalizedBalance) -> Option<Decimal> {
        balance
            .total_balance
            .checked_sub(balance.total_refunded)?
            .checked_sub(balance.commission_deducted)
    }
}

impl From<&NormalizedBalance> for BalanceBreakdown {
    fn from(balance: &NormalizedBalance) -> Self {
        let row = |label, amount, sign| BreakdownRow {
            label,
            amount,
            sign,
        };
        let rows = vec![
            row("Total Revenue", balance.total_balance, RowSign::Credit),
            row("Total Refunded", balance.total_refunded, RowSign::Debit),
            row(
                "Commission Deducted",
                balance.commission_deducted,
                RowSign::Debit,
            ),
            row("Net Revenue", balance.net_revenue, RowSign::Total),
            row("Total Paid Out", balance.total_paid_out, RowSign::Debit),
            row("Pending Payouts", balance.pending_balance, RowSign::Debit),
            row("Available Balance", balance.available_balance, RowSign::Total),
        ];
        let net_revenue_consistent =
            Self::expected_net_revenue(balance) == Some(balance.net_revenue);
        if !net_revenue_consistent {
            tracing::debug!(
                net_revenue = %balance.net_revenue,
                "Net revenue does not match revenue minus refunds and commission"
            );
        }
        Self {
            rows,
            net_revenue_consistent,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::balance::{RawBalancePayload, normalize_balance};
    use serde_json::json;

    #[test]
    fn test_rows_and_signs() {
        let balance = normalize_balance(&RawBalancePayload::from(json!({
            "balance": {
                "total_revenue": 5000,
                "total_refunded": 100,
                "total_commission": 190,
                "net_revenue": 4710,
                "total_paid_out": 2000,
                "pending_payouts": 500,
                "available_balance": "2210"
            }
        })));
        let breakdown = BalanceBreakdown::from(&balance);
        assert!(breakdown.net_revenue_consistent);

        let rendered: Vec<_> = breakdown
            .rows
            .iter()
            .map(|r| format!("{}: {r}", r.label))
            .collect();
        assert_eq!(
            rendered,
            [
                "Total Revenue: ₹5,000.00",
                "Total Refunded: - ₹100.00",
                "Commission Deducted: - ₹190.00",
                "Net Revenue: ₹4,710.00",
                "Total Paid Out: - ₹2,000.00",
                "Pending Payouts: - ₹500.00",
                "Available Balance: ₹2,210.00",
            ]
        );
    }

    #[test]
    fn test_inconsistent_net_revenue_is_flagged() {
        let balance = NormalizedBalance {
            total_balance: Decimal::new(5000, 0),
            commission_deducted: Decimal::new(190, 0),
            ..NormalizedBalance::default()
        };
        let breakdown = BalanceBreakdown::from(&balance);
        assert!(!breakdown.net_revenue_consistent);
        assert_eq!(
            BalanceBreakdown::expected_net_revenue(&balance),
            Some(Decimal::new(4810, 0))
        );
    }

    #[test]
    fn test_overflowing_deductions_are_inconsistent() {
        let balance = NormalizedBalance {
            total_refunded: Decimal::MAX,
            commission_deducted: Decimal::MAX,
            ..NormalizedBalance::default()
        };
        assert_eq!(BalanceBreakdown::expected_net_revenue(&balance), None);

        let breakdown = BalanceBreakdown::from(&balance);
        assert!(!breakdown.net_revenue_consistent);
        assert_eq!(breakdown.rows[1].amount, Decimal::MAX);
        assert_eq!(breakdown.rows[2].amount, Decimal::MAX);
    }
}
