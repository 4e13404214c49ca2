//! Payout eligibility evaluation.
//!
//! Decides whether a merchant may request a payout right now, and within
//! which bounds, from a [`NormalizedBalance`] and optional settlement data.
//! The backend may already have decided; an explicit server decision is
//! never overridden, only filled in when missing.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::balance::NormalizedBalance;
use crate::settlement::SettlementInfo;
use crate::types::Money;

/// Platform-wide absolute minimum payout, in rupees.
pub const DEFAULT_MINIMUM_PAYOUT_FLOOR: Decimal = Decimal::from_parts(500, 0, 0, false, 0);

/// Client-side eligibility policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilityConfig {
    /// Absolute minimum payout regardless of what the server declares.
    pub minimum_payout_floor: Decimal,
    /// Cap applied when the server does not declare one.
    pub default_maximum: Option<Decimal>,
}

impl Default for EligibilityConfig {
    fn default() -> Self {
        Self {
            minimum_payout_floor: DEFAULT_MINIMUM_PAYOUT_FLOOR,
            default_maximum: None,
        }
    }
}

/// The backend's own `payout_eligibility` block, as far as it was supplied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerEligibility {
    pub can_request_payout: Option<bool>,
    pub minimum_payout_amount: Option<Decimal>,
    pub maximum_payout_amount: Option<Decimal>,
    pub reason: Option<String>,
}

/// Why a payout cannot be requested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IneligibilityReason {
    /// The backend said no. Carries its explanation when it gave one.
    BlockedByServer { message: Option<String> },
    /// Nothing has settled yet and nothing is available.
    NoSettledFunds,
    /// Available balance is short of the effective minimum.
    BelowMinimum { minimum: Decimal, shortfall: Decimal },
}

impl fmt::Display for IneligibilityReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BlockedByServer {
                message: Some(message),
            } => f.write_str(message),
            Self::BlockedByServer { message: None } => f.write_str("payout blocked by server"),
            Self::NoSettledFunds => f.write_str("no settled funds available"),
            Self::BelowMinimum { minimum, shortfall } => write!(
                f,
                "balance below minimum payout of {}: short by {}",
                Money::inr(*minimum),
                Money::inr(*shortfall)
            ),
        }
    }
}

/// Derived payout eligibility for one balance snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayoutEligibility {
    pub can_request_payout: bool,
    pub minimum_payout_amount: Decimal,
    pub maximum_payout_amount: Option<Decimal>,
    pub reason: Option<IneligibilityReason>,
}

/// Client-side rejection of a payout request, before it reaches the server.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PayoutRequestError {
    #[error("payout amount must be greater than zero")]
    InvalidAmount,
    #[error("You are not eligible to request a payout at this time: {0}")]
    NotEligible(String),
    #[error("Minimum payout amount is {}", inr(.minimum))]
    BelowMinimum { minimum: Decimal },
    #[error("Maximum payout amount is {}", inr(.maximum))]
    AboveMaximum { maximum: Decimal },
}

const fn inr(amount: &Decimal) -> Money {
    Money::inr(*amount)
}

impl PayoutEligibility {
    /// Human-readable reason, if not eligible.
    #[must_use]
    pub fn reason_text(&self) -> Option<String> {
        self.reason.as_ref().map(ToString::to_string)
    }

    /// Guard a payout request amount against this eligibility.
    ///
    /// # Errors
    ///
    /// Returns a [`PayoutRequestError`] describing the first violated bound.
    pub fn check_request(&self, amount: Decimal) -> Result<(), PayoutRequestError> {
        if amount <= Decimal::ZERO {
            return Err(PayoutRequestError::InvalidAmount);
        }
        if !self.can_request_payout {
            let reason = self
                .reason_text()
                .unwrap_or_else(|| "payout not permitted".to_owned());
            return Err(PayoutRequestError::NotEligible(reason));
        }
        if amount < self.minimum_payout_amount {
            return Err(PayoutRequestError::BelowMinimum {
                minimum: self.minimum_payout_amount,
            });
        }
        if let Some(maximum) = self.maximum_payout_amount
            && amount > maximum
        {
            return Err(PayoutRequestError::AboveMaximum { maximum });
        }
        Ok(())
    }
}

/// Evaluate payout eligibility.
///
/// Pure function of its inputs. The minimum bound is inclusive.
#[must_use]
pub fn evaluate_eligibility(
    balance: &NormalizedBalance,
    settlement: Option<&SettlementInfo>,
    config: &EligibilityConfig,
) -> PayoutEligibility {
    let server = balance.server_eligibility.clone().unwrap_or_default();

    let minimum = server
        .minimum_payout_amount
        .map_or(config.minimum_payout_floor, |declared| {
            declared.max(config.minimum_payout_floor)
        });
    let maximum = server.maximum_payout_amount.or(config.default_maximum);

    let available = balance.available_balance;
    let nothing_settled = settlement.is_some_and(|s| s.settled_transactions == 0);

    let local_reason = if nothing_settled && available.is_zero() {
        Some(IneligibilityReason::NoSettledFunds)
    } else if available < minimum {
        Some(IneligibilityReason::BelowMinimum {
            minimum,
            shortfall: minimum.saturating_sub(available),
        })
    } else {
        None
    };

    let (can_request_payout, reason) = match server.can_request_payout {
        Some(true) => (true, None),
        Some(false) => (
            false,
            Some(IneligibilityReason::BlockedByServer {
                message: server.reason,
            }),
        ),
        None => (local_reason.is_none(), local_reason),
    };

    if let Some(reason) = &reason {
        tracing::debug!(%reason, "Payout not eligible");
    }

    PayoutEligibility {
        can_request_payout,
        minimum_payout_amount: minimum,
        maximum_payout_amount: maximum,
        reason,
    }
}
