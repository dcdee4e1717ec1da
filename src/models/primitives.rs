//! Primitive types and newtypes for type-safe API interactions.
//!
//! Account-scoped requests are addressed by an opaque hash rather than the
//! plaintext account number. Keeping the two in distinct types prevents
//! passing one where the other is expected.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The server-assigned hash that identifies an account in requests.
///
/// # Example
///
/// ```
/// use schwab_rs::AccountHash;
///
/// let hash = AccountHash::new("E5B3A9F0C1");
/// assert_eq!(hash.as_str(), "E5B3A9F0C1");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountHash(String);

impl AccountHash {
    /// Create a new account hash from a string.
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the account hash as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for AccountHash {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<String> for AccountHash {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for AccountHash {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A trading symbol (e.g., "AAPL", "$SPX").
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol(String);

impl Symbol {
    /// Create a new symbol.
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the symbol as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Symbol {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<String> for Symbol {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for Symbol {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}
