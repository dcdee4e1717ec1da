//! HTTP clients for the Schwab API.
//!
//! [`SchwabClient`] is the async entry point and [`blocking::SchwabClient`]
//! the blocking one. Both expose the same operations and are generic over
//! their transport, which defaults to `reqwest`.
//!
//! # Example
//!
//! ```no_run
//! use schwab_rs::{ClientConfig, Credentials, LocalTokenStore, SchwabClient, Session};
//!
//! # async fn example() -> schwab_rs::Result<()> {
//! let session = Session::new(
//!     Credentials::new("app-id", "app-secret", "https://127.0.0.1"),
//!     LocalTokenStore::new("schwab_tokens.json"),
//! );
//! let client = SchwabClient::new(session, ClientConfig::default())?;
//!
//! let accounts = client.get_accounts(false).await?;
//! println!("Found {} accounts", accounts.len());
//! # Ok(())
//! # }
//! ```

pub mod blocking;
mod config;
mod exchange;
mod http;
mod transport;

pub use config::{ApiEndpoints, ClientConfig, MARKET_DATA_API_URL, OAUTH_URL, TRADER_API_URL};
pub use http::SchwabClient;
pub use transport::{AsyncTransport, BlockingTransport, HttpRequest, HttpResponse};
