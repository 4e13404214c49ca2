//! Plain-text rendering for command results. Everything printed to stdout
//! goes through here.

#![allow(clippy::print_stdout)]

use paydesk_core::{
    BalanceOverview, Money, PaymentStatus, Payout, PayoutSummary, Transaction, WebhookConfig,
};
use rust_decimal::Decimal;

const NOT_AVAILABLE: &str = "N/A";

pub fn line(text: &str) {
    println!("{text}");
}

pub fn overview(overview: &BalanceOverview) {
    println!("Balance");
    for row in &overview.breakdown.rows {
        println!("  {:<22}{:>18}", row.label, row.to_string());
    }
    if !overview.breakdown.net_revenue_consistent {
        println!("  (net revenue does not match revenue less refunds and commission)");
    }

    if let Some(settlement) = &overview.settlement {
        println!();
        println!("Settlement");
        println!("  {:<22}{:>18}", "Settled", settlement.settled_transactions);
        println!("  {:<22}{:>18}", "Unsettled", settlement.unsettled_transactions);
        if let Some(next) = &settlement.next_settlement {
            println!("  {:<22}{next:>18}", "Next settlement");
        }
    }

    let eligibility = &overview.eligibility;
    println!();
    println!("Payouts");
    println!("  {:<22}{:>18}", "Minimum", money(eligibility.minimum_payout_amount));
    if let Some(maximum) = eligibility.maximum_payout_amount {
        println!("  {:<22}{:>18}", "Maximum", money(maximum));
    }
    match eligibility.reason_text() {
        None if eligibility.can_request_payout => println!("  Eligible to request a payout"),
        None => println!("  Not eligible to request a payout"),
        Some(reason) => println!("  Not eligible: {reason}"),
    }

    for warning in &overview.warnings {
        println!("  warning: {warning}");
    }
}

pub fn payouts(payouts: &[Payout], summary: Option<&PayoutSummary>) {
    if payouts.is_empty() {
        println!("No payouts found");
    }
    for payout in payouts {
        println!(
            "{:<26} {:>14} {:<11} {:<14} {}",
            payout.payout_id.as_ref().map_or(NOT_AVAILABLE, |id| id.as_str()),
            optional_money(payout.amount),
            payout.status.to_string(),
            payout.transfer_mode.map_or("UPI", |mode| mode.label()),
            payout.requested_at.as_deref().unwrap_or(NOT_AVAILABLE),
        );
    }

    if let Some(summary) = summary {
        println!();
        if let Some(total) = summary.total_payout_requests {
            println!("Total requests: {total}");
        }
        if let Some(requested) = summary.requested_payouts {
            println!("Awaiting review: {requested}");
        }
        if let Some(completed) = summary.completed_payouts {
            println!("Completed: {completed}");
        }
        println!("Rejected or failed: {}", summary.unsuccessful());
        if let Some(pending) = summary.total_pending {
            println!("Pending amount: {}", money(pending));
        }
    }
}

pub fn transactions(transactions: &[Transaction]) {
    if transactions.is_empty() {
        println!("No transactions found");
    }
    for txn in transactions {
        println!(
            "{:<24} {:>14} {:<10} {:<20} {}",
            txn.reference().unwrap_or(NOT_AVAILABLE),
            optional_money(txn.amount),
            txn.status.to_string(),
            txn.merchant_label()
                .or(txn.customer_name.as_deref())
                .unwrap_or(NOT_AVAILABLE),
            txn.created_at.as_deref().unwrap_or(NOT_AVAILABLE),
        );
    }
}

pub fn payment_status(status: &PaymentStatus) {
    let text = |value: Option<&str>| value.unwrap_or(NOT_AVAILABLE).to_owned();
    let rows = [
        ("Order", text(status.order_id.as_ref().map(|id| id.as_str()))),
        ("Transaction", text(status.transaction_id.as_ref().map(|id| id.as_str()))),
        ("Status", status.status.to_string()),
        ("Amount", optional_money(status.amount)),
        ("Method", text(status.payment_method.as_deref())),
        ("Paid at", text(status.paid_at.as_deref())),
        ("Updated at", text(status.updated_at.as_deref())),
    ];
    for (label, value) in rows {
        println!("{label:<14}{value}");
    }
}

pub fn webhook(config: &WebhookConfig) {
    if let Some(name) = &config.name {
        println!("{:<10}{name}", "Name");
    }
    println!("{:<10}{}", "URL", config.url.as_deref().unwrap_or(NOT_AVAILABLE));
    let state = match config.is_active {
        Some(true) => "active",
        Some(false) => "inactive",
        None => NOT_AVAILABLE,
    };
    println!("{:<10}{state}", "Status");
    println!("{:<10}{}", "Secret", config.masked_secret().as_deref().unwrap_or(NOT_AVAILABLE));
    if config.events.is_empty() {
        println!("{:<10}{NOT_AVAILABLE}", "Events");
    } else {
        println!("{:<10}{}", "Events", config.events.join(", "));
    }
}

fn money(amount: Decimal) -> String {
    Money::inr(amount).to_string()
}

fn optional_money(amount: Option<Decimal>) -> String {
    amount.map_or_else(|| NOT_AVAILABLE.to_string(), money)
}
