//! Account endpoints.

use super::{decode, segment, Endpoint, Service};
use crate::models::{AccountEnvelope, AccountHash, AccountNumberWithHashId, SecuritiesAccount};
use crate::Result;

fn fields(include_positions: bool) -> Vec<(&'static str, String)> {
    if include_positions {
        vec![("fields", "positions".to_string())]
    } else {
        Vec::new()
    }
}

/// `GET accounts/accountNumbers`: plaintext numbers and their hashes.
#[derive(Debug, Clone, Copy, Default)]
pub struct GetAccountNumbers;

impl Endpoint for GetAccountNumbers {
    type Output = Vec<AccountNumberWithHashId>;

    fn service(&self) -> Service {
        Service::Trader
    }

    fn path(&self) -> String {
        "accounts/accountNumbers".to_string()
    }

    fn parse(&self, body: &[u8]) -> Result<Self::Output> {
        decode("AccountNumberWithHashId", body)
    }
}

/// `GET accounts`: every linked account.
#[derive(Debug, Clone, Copy, Default)]
pub struct GetAccounts {
    /// Include positions in each account
    pub include_positions: bool,
}

impl Endpoint for GetAccounts {
    type Output = Vec<SecuritiesAccount>;

    fn service(&self) -> Service {
        Service::Trader
    }

    fn path(&self) -> String {
        "accounts".to_string()
    }

    fn query(&self) -> Vec<(&'static str, String)> {
        fields(self.include_positions)
    }

    fn parse(&self, body: &[u8]) -> Result<Self::Output> {
        let envelopes: Vec<AccountEnvelope> = decode("SecuritiesAccount", body)?;
        Ok(envelopes
            .into_iter()
            .map(|envelope| envelope.securities_account)
            .collect())
    }
}

/// `GET accounts/{hash}`: one account.
#[derive(Debug, Clone)]
pub struct GetSingleAccount {
    /// Hash of the account
    pub account_hash: AccountHash,
    /// Include positions
    pub include_positions: bool,
}

impl Endpoint for GetSingleAccount {
    type Output = SecuritiesAccount;

    fn service(&self) -> Service {
        Service::Trader
    }

    fn path(&self) -> String {
        format!("accounts/{}", segment(self.account_hash.as_str()))
    }

    fn query(&self) -> Vec<(&'static str, String)> {
        fields(self.include_positions)
    }

    fn parse(&self, body: &[u8]) -> Result<Self::Output> {
        let envelope: AccountEnvelope = decode("SecuritiesAccount", body)?;
        Ok(envelope.securities_account)
    }
}
