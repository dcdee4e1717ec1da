//! Authentication and token management for the Schwab API.
//!
//! The API uses the OAuth2 authorization code flow:
//!
//! 1. The user opens the URL from [`Session::authorize_url`] and approves
//!    the app; the browser is redirected with a `code` parameter.
//! 2. The code is exchanged for an access/refresh token pair.
//! 3. Access tokens live for about 30 minutes. The clients refresh them
//!    with the refresh token, which lives for 7 days.
//!
//! Every new token pair is written to a [`TokenStore`] immediately so a
//! later process can pick it up.
//!
//! ```no_run
//! use schwab_rs::{ClientConfig, Credentials, LocalTokenStore, Session};
//!
//! # fn example() -> schwab_rs::Result<()> {
//! let session = Session::new(
//!     Credentials::new("app-id", "app-secret", "https://127.0.0.1"),
//!     LocalTokenStore::new("schwab_tokens.json"),
//! );
//! println!("visit {}", session.authorize_url(&ClientConfig::default())?);
//! # Ok(())
//! # }
//! ```

mod oauth;
mod session;
mod store;
mod tokens;

pub use oauth::Credentials;
pub use session::Session;
pub use store::{LocalTokenStore, TokenStore};
pub use tokens::Tokens;

pub(crate) use session::{refresh_expired, TokenState};
