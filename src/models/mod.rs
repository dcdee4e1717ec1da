//! Data models for the Schwab API.
//!
//! Models are organized by domain:
//!
//! - [`primitives`] - Identifier newtypes like `AccountHash`
//! - [`enums`] - Order statuses, account types, option sides, etc.
//! - [`account`] - Accounts, balances and positions
//! - [`order`] - Orders, legs and executions
//! - [`option_chain`] - Option chains, contracts and expirations
//!
//! Every payload is decoded into these types and then checked with
//! [`Validate`] before it reaches the caller.

pub mod primitives;
pub mod enums;
pub mod account;
pub mod order;
pub mod option_chain;

pub use primitives::*;
pub use enums::*;
pub use account::*;
pub use order::*;
pub use option_chain::*;

use crate::Result;

/// Invariants checked on a model after it was decoded.
///
/// Decoding catches missing fields and wrong types; `validate` catches
/// payloads that are well-formed but inconsistent.
pub trait Validate {
    /// Check the model's invariants.
    fn validate(&self) -> Result<()>;
}

impl<T: Validate> Validate for Vec<T> {
    fn validate(&self) -> Result<()> {
        self.iter().try_for_each(Validate::validate)
    }
}
