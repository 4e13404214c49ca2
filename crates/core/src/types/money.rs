//! Type-safe money representation using decimal arithmetic.
//!
//! Amounts coming off the balance endpoint are rupees with paise, so all
//! arithmetic stays in [`Decimal`] and only becomes text at the edges.

use core::fmt;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// An amount with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    /// Amount in the currency's standard unit (rupees, not paise).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Money {
    /// Create a new amount.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// Create an amount in Indian rupees.
    #[must_use]
    pub const fn inr(amount: Decimal) -> Self {
        Self::new(amount, CurrencyCode::INR)
    }
}

impl fmt::Display for Money {
    /// Formats with the currency symbol and two decimals, e.g. `₹12,34,567.89`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rounded = self
            .amount
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
            "-"
        } else {
            ""
        };
        let text = format!("{:.2}", rounded.abs());
        let (whole, fraction) = text.split_once('.').unwrap_or((text.as_str(), "00"));
        let grouped = match self.currency_code {
            CurrencyCode::INR => group_indian(whole),
            _ => group_western(whole),
        };
        write!(
            f,
            "{sign}{}{grouped}.{fraction}",
            self.currency_code.symbol()
        )
    }
}

/// ISO 4217 currency codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    INR,
    USD,
    EUR,
    GBP,
}

impl CurrencyCode {
    /// Display symbol for the currency.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::INR => "₹",
            Self::USD => "$",
            Self::EUR => "€",
            Self::GBP => "£",
        }
    }
}

/// Lakh/crore grouping: last three digits, then pairs (`12,34,567`).
fn group_indian(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_owned();
    }
    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups: Vec<&str> = Vec::new();
    let mut rest = head;
    while rest.len() > 2 {
        let (left, right) = rest.split_at(rest.len() - 2);
        groups.push(right);
        rest = left;
    }
    if !rest.is_empty() {
        groups.push(rest);
    }
    groups.reverse();
    format!("{},{tail}", groups.join(","))
}

/// Thousands grouping (`1,234,567`).
fn group_western(digits: &str) -> String {
    let mut groups: Vec<&str> = Vec::new();
    let mut rest = digits;
    while rest.len() > 3 {
        let (left, right) = rest.split_at(rest.len() - 3);
        groups.push(right);
        rest = left;
    }
    groups.push(rest);
    groups.reverse();
    groups.join(",")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use core::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_inr_small_amounts() {
        assert_eq!(Money::inr(Decimal::ZERO).to_string(), "₹0.00");
        assert_eq!(Money::inr(dec("500")).to_string(), "₹500.00");
        assert_eq!(Money::inr(dec("1200.5")).to_string(), "₹1,200.50");
    }

    #[test]
    fn test_inr_lakh_grouping() {
        assert_eq!(Money::inr(dec("1234567.891")).to_string(), "₹12,34,567.89");
        assert_eq!(Money::inr(dec("100000")).to_string(), "₹1,00,000.00");
    }

    #[test]
    fn test_western_grouping() {
        let usd = Money::new(dec("1234567.5"), CurrencyCode::USD);
        assert_eq!(usd.to_string(), "$1,234,567.50");
    }

    #[test]
    fn test_negative_amount() {
        assert_eq!(Money::inr(dec("-2500")).to_string(), "-₹2,500.00");
    }

    #[test]
    fn test_rounds_half_away_from_zero() {
        assert_eq!(Money::inr(dec("0.005")).to_string(), "₹0.01");
    }
}
