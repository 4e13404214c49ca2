//! Paydesk CLI - merchant and operator console for the payments backend.
//!
//! # Usage
//!
//! ```bash
//! # Sign in and print the session variables
//! paydesk login -e ops@example.in -p secret
//!
//! # Show balance, breakdown and payout eligibility
//! paydesk balance
//!
//! # Request a UPI payout
//! paydesk payouts request --amount 1500 --upi-id shop@upi
//!
//! # Review requested payouts and approve one
//! paydesk admin payouts --status requested
//! paydesk admin approve 66b1f0c2 --notes "verified"
//!
//! # Export every payout to CSV
//! paydesk payouts export --all
//!
//! # Point the merchant webhook at your server
//! paydesk webhook configure --url https://shop.example.in/hooks -e payment.success,payout.failed
//! ```
//!
//! # Commands
//!
//! - `login` - Sign in
//! - `balance` - Balance overview
//! - `payouts` - List, request, cancel and export payouts
//! - `transactions` - Merchant transactions (API key)
//! - `payment-status` - Status of one order (API key)
//! - `api-key` - Issue or fetch the merchant API key
//! - `webhook` - Merchant webhook settings
//! - `admin` - Operator payout review and transaction search
//!
//! Logs go to stderr. Set `RUST_LOG` to change verbosity and
//! `PAYDESK_LOG_FORMAT=json` for structured output.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use paydesk_core::{PayoutStatus, WebhookEvent};
use rust_decimal::Decimal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod output;

#[derive(Parser)]
#[command(name = "paydesk")]
#[command(author, version, about = "Paydesk merchant and operator console")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and print the session variables
    Login {
        /// Account email address
        #[arg(short, long)]
        email: String,

        /// Account password
        #[arg(short, long)]
        password: String,
    },
    /// Show balance, revenue breakdown and payout eligibility
    Balance {
        /// Print the overview as JSON
        #[arg(long)]
        json: bool,
    },
    /// Merchant payouts
    Payouts {
        #[command(subcommand)]
        action: PayoutAction,
    },
    /// List the merchant's transactions (needs `PAYDESK_API_KEY`)
    Transactions,
    /// Look up the status of one order (needs `PAYDESK_API_KEY`)
    PaymentStatus {
        /// Order ID
        order_id: String,

        /// Print the status as JSON
        #[arg(long)]
        json: bool,
    },
    /// Merchant API key
    ApiKey {
        #[command(subcommand)]
        action: ApiKeyAction,
    },
    /// Merchant webhook
    Webhook {
        #[command(subcommand)]
        action: WebhookAction,
    },
    /// Operator payout review
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Subcommand)]
enum PayoutAction {
    /// List your payouts
    List,
    /// Request a UPI payout
    Request {
        /// Amount in rupees
        #[arg(short, long)]
        amount: Decimal,

        /// Beneficiary UPI ID
        #[arg(short, long)]
        upi_id: String,

        /// Note for the reviewer
        #[arg(short, long)]
        notes: Option<String>,
    },
    /// Cancel an open payout
    Cancel {
        /// Payout ID
        id: String,
    },
    /// Export payouts to CSV
    Export {
        /// Export every merchant's payouts (operators only)
        #[arg(long)]
        all: bool,

        /// Only payouts with this status (with `--all`)
        #[arg(short, long)]
        status: Option<PayoutStatus>,

        /// Output file (default: `all_payouts_<date>.csv`)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum ApiKeyAction {
    /// Issue a new API key (one per merchant)
    Create,
    /// Print the existing API key
    Show,
}

#[derive(Subcommand)]
enum WebhookAction {
    /// Show the configured webhook
    Show {
        /// Print the webhook as JSON
        #[arg(long)]
        json: bool,
    },
    /// Create or replace the webhook
    Configure {
        /// Endpoint that receives events (http or https)
        #[arg(short, long)]
        url: String,

        /// Events to deliver, comma separated
        #[arg(short, long = "event", value_delimiter = ',', required = true)]
        events: Vec<WebhookEvent>,

        /// Signing secret (generated by the backend when omitted)
        #[arg(short, long)]
        secret: Option<String>,

        /// Save the webhook without enabling it
        #[arg(long)]
        inactive: bool,
    },
    /// Deliver a test event
    Test,
    /// Remove the webhook
    Delete,
    /// List the event names `configure` accepts
    Events,
}

#[derive(Subcommand)]
enum AdminAction {
    /// List payouts across all merchants
    Payouts {
        /// Filter by status
        #[arg(short, long)]
        status: Option<PayoutStatus>,

        /// Page number
        #[arg(long)]
        page: Option<u32>,

        /// Page size
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Approve a requested payout
    Approve {
        /// Payout ID
        id: String,

        /// Approval notes
        #[arg(short, long)]
        notes: Option<String>,
    },
    /// Reject a requested payout
    Reject {
        /// Payout ID
        id: String,

        /// Rejection reason shown to the merchant
        #[arg(short, long)]
        reason: String,
    },
    /// Mark an approved payout as paid
    Process {
        /// Payout ID
        id: String,

        /// Bank UTR number of the transfer
        #[arg(short, long)]
        utr: String,

        /// Processing notes
        #[arg(short, long)]
        notes: Option<String>,
    },
    /// Search transactions across all merchants
    Transactions {
        #[arg(long)]
        merchant_id: Option<String>,

        #[arg(long)]
        merchant_name: Option<String>,

        #[arg(short, long)]
        status: Option<String>,

        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,

        /// End date (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    init_tracing();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

/// Logs go to stderr so command output stays pipeable.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "paydesk=info,paydesk_client=info,paydesk_core=warn".into());

    let json = std::env::var("PAYDESK_LOG_FORMAT").is_ok_and(|format| format == "json");
    let json_layer = json.then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .with_writer(std::io::stderr)
    });
    let text_layer = (!json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .init();
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let ctx = commands::Context::from_env()?;

    match cli.command {
        Commands::Login { email, password } => commands::login::run(&ctx, &email, &password).await?,
        Commands::Balance { json } => commands::balance::show(&ctx, json).await?,
        Commands::Payouts { action } => match action {
            PayoutAction::List => commands::payouts::list(&ctx).await?,
            PayoutAction::Request {
                amount,
                upi_id,
                notes,
            } => commands::payouts::request(&ctx, amount, &upi_id, notes).await?,
            PayoutAction::Cancel { id } => commands::payouts::cancel(&ctx, &id).await?,
            PayoutAction::Export {
                all,
                status,
                output,
            } => commands::payouts::export(&ctx, all, status, output).await?,
        },
        Commands::Transactions => commands::transactions::list(&ctx).await?,
        Commands::PaymentStatus { order_id, json } => {
            commands::transactions::status(&ctx, &order_id, json).await?;
        }
        Commands::ApiKey { action } => match action {
            ApiKeyAction::Create => commands::api_key::create(&ctx).await?,
            ApiKeyAction::Show => commands::api_key::show(&ctx).await?,
        },
        Commands::Webhook { action } => match action {
            WebhookAction::Show { json } => commands::webhook::show(&ctx, json).await?,
            WebhookAction::Configure {
                url,
                events,
                secret,
                inactive,
            } => commands::webhook::configure(&ctx, &url, events, secret, inactive).await?,
            WebhookAction::Test => commands::webhook::test(&ctx).await?,
            WebhookAction::Delete => commands::webhook::delete(&ctx).await?,
            WebhookAction::Events => commands::webhook::events(),
        },
        Commands::Admin { action } => match action {
            AdminAction::Payouts {
                status,
                page,
                limit,
            } => commands::admin::payouts(&ctx, status, page, limit).await?,
            AdminAction::Approve { id, notes } => {
                commands::admin::approve(&ctx, &id, notes.as_deref()).await?;
            }
            AdminAction::Reject { id, reason } => commands::admin::reject(&ctx, &id, &reason).await?,
            AdminAction::Process { id, utr, notes } => {
                commands::admin::process(&ctx, &id, &utr, notes.as_deref()).await?;
            }
            AdminAction::Transactions {
                merchant_id,
                merchant_name,
                status,
                from,
                to,
            } => {
                let filters = paydesk_core::TransactionFilters {
                    merchant_id,
                    merchant_name,
                    status,
                    from,
                    to,
                };
                commands::transactions::search(&ctx, &filters).await?;
            }
        },
    }
    Ok(())
}
