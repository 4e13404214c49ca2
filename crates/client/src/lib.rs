//! Paydesk Client - HTTP access to the payments backend.
//!
//! Wraps the merchant and operator endpoints. Responses are handed to
//! `paydesk-core` for normalization; this crate only moves bytes, attaches
//! credentials and classifies failures.
//!
//! # Example
//!
//! ```rust,ignore
//! use paydesk_client::{ClientConfig, PaydeskClient};
//!
//! let config = ClientConfig::from_env()?;
//! let client = PaydeskClient::new(&config)?;
//! let session = client.login("ops@example.in", "secret").await?;
//! let overview = client.balance_overview(&session).await?;
//! println!("{}", overview.balance.available_balance);
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod client;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod responses;
pub mod session;

pub use client::PaydeskClient;
pub use config::{ClientConfig, ConfigError};
pub use endpoints::{AuthScheme, Endpoint};
pub use error::ApiError;
pub use responses::{ActionResponse, ApiKeyResponse, LoginResponse};
pub use session::Session;
