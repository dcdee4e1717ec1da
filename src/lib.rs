//! # schwab-rs
//!
//! A Rust client for the Charles Schwab trader and market data APIs.
//!
//! ## Features
//!
//! - **Authentication**: OAuth2 authorization code flow with automatic
//!   access token refresh and token persistence
//! - **Accounts**: account numbers and hashes, balances and positions
//! - **Orders**: orders by entered-time range and status
//! - **Option chains**: chains, listed expirations and, with the
//!   `dataframe` feature, polars tables per expiration
//! - **Async and blocking**: [`SchwabClient`] and [`blocking::SchwabClient`]
//!   share request building, token handling and response decoding
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use chrono::{Duration, Utc};
//! use schwab_rs::models::OrderStatus;
//! use schwab_rs::{ClientConfig, Credentials, LocalTokenStore, SchwabClient, Session};
//!
//! #[tokio::main]
//! async fn main() -> schwab_rs::Result<()> {
//!     let session = Session::new(
//!         Credentials::new("app-id", "app-secret", "https://127.0.0.1"),
//!         LocalTokenStore::new("schwab_tokens.json"),
//!     );
//!     let client = SchwabClient::new(session, ClientConfig::default())?;
//!
//!     if client.tokens().is_none() {
//!         println!("authorize at {}", client.authorize_url()?);
//!         let code = "code-from-the-redirect-url";
//!         client.exchange_authorization_code(code).await?;
//!     }
//!
//!     let numbers = client.get_account_numbers().await?;
//!     if let Some(entry) = numbers.first() {
//!         let now = Utc::now();
//!         let orders = client
//!             .get_orders(&entry.hash(), now - Duration::days(7), now, OrderStatus::Filled)
//!             .await?;
//!         println!("{} filled orders this week", orders.len());
//!     }
//!
//!     Ok(())
//! }
//! ```

#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]

pub mod api;
pub mod auth;
pub mod client;
#[cfg(feature = "dataframe")]
pub mod dataframe;
pub mod error;
pub mod models;

pub use client::blocking;

// Re-export primary types at crate root for convenience
pub use auth::{Credentials, LocalTokenStore, Session, TokenStore, Tokens};
pub use client::{ApiEndpoints, ClientConfig, SchwabClient};
pub use error::{Error, Result};
pub use models::{AccountHash, Symbol};

/// Prelude module for convenient imports.
///
/// ```rust
/// use schwab_rs::prelude::*;
/// ```
pub mod prelude {
    pub use crate::auth::{Credentials, LocalTokenStore, Session, TokenStore, Tokens};
    pub use crate::client::{ClientConfig, SchwabClient};
    pub use crate::error::{Error, Result};
    pub use crate::models::{
        // Primitives
        AccountHash, Symbol,
        // Enums
        AccountType, ContractType, ExpirationType, OptionStrategy, OptionType, OrderStatus,
        // Accounts
        AccountNumberWithHashId, Position, SecuritiesAccount,
        // Orders
        Order, OrderLeg,
        // Option chains
        OptionChain, OptionContract, OptionExpiration,
    };
}
