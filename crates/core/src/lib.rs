//! Paydesk Core - balance normalization and payout eligibility.
//!
//! This crate provides the logic shared by every Paydesk front end:
//! - `client` - HTTP client for the payments backend
//! - `cli` - Command-line console for merchants and operators
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients. Every function here is safe to call concurrently.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, money and status enums
//! - [`coerce`] - Lenient numeric coercion for untrusted JSON
//! - [`balance`] - Balance Normalizer and revenue breakdown
//! - [`settlement`] - Settlement counts and transaction summary
//! - [`eligibility`] - Payout Eligibility Evaluator and request guard
//! - [`payout`] / [`transaction`] - Listing records and payment status
//! - [`webhook`] - Merchant webhook settings
//! - [`overview`] - Normalized balance, settlement and eligibility in one value
//! - [`export`] - CSV export of payout listings

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod balance;
pub mod coerce;
pub mod eligibility;
pub mod export;
pub mod overview;
pub mod payout;
pub mod settlement;
pub mod transaction;
pub mod types;
pub mod webhook;

pub use balance::{
    BalanceBreakdown, NormalizationReport, NormalizedBalance, RawBalancePayload, normalize_balance,
    normalize_balance_report,
};
pub use coerce::MalformedFieldError;
pub use eligibility::{
    EligibilityConfig, IneligibilityReason, PayoutEligibility, PayoutRequestError,
    ServerEligibility, evaluate_eligibility,
};
pub use export::{ExportError, default_export_filename, write_payouts_csv};
pub use overview::BalanceOverview;
pub use payout::{Payout, PayoutFilters, PayoutList, PayoutRequest, PayoutSummary};
pub use settlement::{SettlementInfo, TransactionSummary};
pub use transaction::{PaymentStatus, Transaction, TransactionFilters};
pub use types::*;
pub use webhook::{WebhookConfig, WebhookEvent, WebhookSettings, WebhookSettingsError};
