//! Account, position and balance models.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::enums::{AccountType, AssetType, OptionType};
use super::primitives::AccountHash;
use super::Validate;
use crate::{Error, Result};

/// Plaintext account number paired with its server-assigned hash.
///
/// Fetched once per session; the hash is what every account-scoped
/// request uses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountNumberWithHashId {
    /// Plaintext account number
    pub account_number: String,
    /// Opaque identifier used in account-scoped requests
    pub hash_value: String,
}

impl AccountNumberWithHashId {
    /// Get the hash as a strongly-typed value.
    pub fn hash(&self) -> AccountHash {
        AccountHash::new(&self.hash_value)
    }
}

impl Validate for AccountNumberWithHashId {
    fn validate(&self) -> Result<()> {
        if self.account_number.is_empty() {
            return Err(Error::validation(
                "AccountNumberWithHashId",
                "accountNumber is empty",
            ));
        }
        if self.hash_value.is_empty() {
            return Err(Error::validation(
                "AccountNumberWithHashId",
                format!("hashValue is empty for account {}", self.account_number),
            ));
        }
        Ok(())
    }
}

/// Wrapper the API puts around every account record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AccountEnvelope {
    pub securities_account: SecuritiesAccount,
}

impl Validate for AccountEnvelope {
    fn validate(&self) -> Result<()> {
        self.securities_account.validate()
    }
}

/// A brokerage account, selected by the `type` discriminator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SecuritiesAccount {
    /// Margin account
    Margin(MarginAccount),
    /// Cash account
    Cash(CashAccount),
}

impl SecuritiesAccount {
    fn base(&self) -> &AccountBase {
        match self {
            SecuritiesAccount::Margin(account) => &account.base,
            SecuritiesAccount::Cash(account) => &account.base,
        }
    }

    /// The account type discriminator.
    pub fn account_type(&self) -> AccountType {
        match self {
            SecuritiesAccount::Margin(_) => AccountType::Margin,
            SecuritiesAccount::Cash(_) => AccountType::Cash,
        }
    }

    /// Plaintext account number.
    pub fn account_number(&self) -> &str {
        &self.base().account_number
    }

    /// Positions held; empty unless positions were requested.
    pub fn positions(&self) -> &[Position] {
        &self.base().positions
    }

    /// Whether the account is flagged as a pattern day trader.
    pub fn is_day_trader(&self) -> bool {
        self.base().is_day_trader
    }

    /// Number of day-trade round trips in the rolling window.
    pub fn round_trips(&self) -> i32 {
        self.base().round_trips
    }

    /// Returns `true` for a margin account.
    pub fn is_margin(&self) -> bool {
        matches!(self, SecuritiesAccount::Margin(_))
    }

    /// Returns `true` for a cash account.
    pub fn is_cash(&self) -> bool {
        matches!(self, SecuritiesAccount::Cash(_))
    }
}

impl Validate for SecuritiesAccount {
    fn validate(&self) -> Result<()> {
        if self.account_number().is_empty() {
            return Err(Error::validation("SecuritiesAccount", "accountNumber is empty"));
        }
        Ok(())
    }
}

/// Fields shared by every account type.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountBase {
    /// Plaintext account number
    pub account_number: String,
    #[serde(default)]
    pub round_trips: i32,
    #[serde(default)]
    pub is_day_trader: bool,
    #[serde(default)]
    pub is_closing_only_restricted: bool,
    #[serde(default)]
    pub pfcb_flag: bool,
    /// Only present when positions were requested
    #[serde(default)]
    pub positions: Vec<Position>,
}

/// A margin account.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarginAccount {
    #[serde(flatten)]
    pub base: AccountBase,
    #[serde(default)]
    pub initial_balances: Option<MarginBalances>,
    #[serde(default)]
    pub current_balances: Option<MarginBalances>,
    #[serde(default)]
    pub projected_balances: Option<MarginBalances>,
}

/// A cash account.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashAccount {
    #[serde(flatten)]
    pub base: AccountBase,
    #[serde(default)]
    pub initial_balances: Option<CashBalances>,
    #[serde(default)]
    pub current_balances: Option<CashBalances>,
    #[serde(default)]
    pub projected_balances: Option<CashBalances>,
}

/// Balances of a margin account.
///
/// Initial, current and projected snapshots share this shape; each
/// snapshot fills in a different subset of fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarginBalances {
    #[serde(default)]
    pub accrued_interest: Option<Decimal>,
    #[serde(default)]
    pub available_funds: Option<Decimal>,
    #[serde(default)]
    pub available_funds_non_marginable_trade: Option<Decimal>,
    #[serde(default)]
    pub bond_value: Option<Decimal>,
    #[serde(default)]
    pub buying_power: Option<Decimal>,
    #[serde(default)]
    pub buying_power_non_marginable_trade: Option<Decimal>,
    #[serde(default)]
    pub cash_balance: Option<Decimal>,
    #[serde(default)]
    pub cash_available_for_trading: Option<Decimal>,
    #[serde(default)]
    pub cash_receipts: Option<Decimal>,
    #[serde(default)]
    pub day_trading_buying_power: Option<Decimal>,
    #[serde(default)]
    pub day_trading_buying_power_call: Option<Decimal>,
    #[serde(default)]
    pub day_trading_equity_call: Option<Decimal>,
    #[serde(default)]
    pub equity: Option<Decimal>,
    #[serde(default)]
    pub equity_percentage: Option<Decimal>,
    #[serde(default)]
    pub liquidation_value: Option<Decimal>,
    #[serde(default)]
    pub long_margin_value: Option<Decimal>,
    #[serde(default)]
    pub long_option_market_value: Option<Decimal>,
    #[serde(default)]
    pub long_stock_value: Option<Decimal>,
    #[serde(default)]
    pub maintenance_call: Option<Decimal>,
    #[serde(default)]
    pub maintenance_requirement: Option<Decimal>,
    #[serde(default)]
    pub margin: Option<Decimal>,
    #[serde(default)]
    pub margin_equity: Option<Decimal>,
    #[serde(default)]
    pub margin_balance: Option<Decimal>,
    #[serde(default)]
    pub money_market_fund: Option<Decimal>,
    #[serde(default)]
    pub mutual_fund_value: Option<Decimal>,
    #[serde(default)]
    pub reg_t_call: Option<Decimal>,
    #[serde(default)]
    pub short_balance: Option<Decimal>,
    #[serde(default)]
    pub short_margin_value: Option<Decimal>,
    #[serde(default)]
    pub short_option_market_value: Option<Decimal>,
    #[serde(default)]
    pub short_stock_value: Option<Decimal>,
    #[serde(default)]
    pub sma: Option<Decimal>,
    #[serde(default)]
    pub total_cash: Option<Decimal>,
    #[serde(default)]
    pub is_in_call: Option<bool>,
    #[serde(default)]
    pub unsettled_cash: Option<Decimal>,
    #[serde(default)]
    pub pending_deposits: Option<Decimal>,
    #[serde(default)]
    pub account_value: Option<Decimal>,
}

/// Balances of a cash account.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashBalances {
    #[serde(default)]
    pub accrued_interest: Option<Decimal>,
    #[serde(default)]
    pub cash_available_for_trading: Option<Decimal>,
    #[serde(default)]
    pub cash_available_for_withdrawal: Option<Decimal>,
    #[serde(default)]
    pub cash_balance: Option<Decimal>,
    #[serde(default)]
    pub bond_value: Option<Decimal>,
    #[serde(default)]
    pub cash_receipts: Option<Decimal>,
    #[serde(default)]
    pub liquidation_value: Option<Decimal>,
    #[serde(default)]
    pub long_option_market_value: Option<Decimal>,
    #[serde(default)]
    pub long_stock_value: Option<Decimal>,
    #[serde(default)]
    pub long_non_marginable_market_value: Option<Decimal>,
    #[serde(default)]
    pub money_market_fund: Option<Decimal>,
    #[serde(default)]
    pub mutual_fund_value: Option<Decimal>,
    #[serde(default)]
    pub short_option_market_value: Option<Decimal>,
    #[serde(default)]
    pub short_stock_value: Option<Decimal>,
    #[serde(default)]
    pub cash_call: Option<Decimal>,
    #[serde(default)]
    pub cash_debit_call_value: Option<Decimal>,
    #[serde(default)]
    pub total_cash: Option<Decimal>,
    #[serde(default)]
    pub unsettled_cash: Option<Decimal>,
    #[serde(default)]
    pub pending_deposits: Option<Decimal>,
    #[serde(default)]
    pub is_in_call: Option<bool>,
}

/// A position held in an account.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    #[serde(default)]
    pub short_quantity: Decimal,
    #[serde(default)]
    pub long_quantity: Decimal,
    #[serde(default)]
    pub average_price: Option<Decimal>,
    #[serde(default)]
    pub current_day_profit_loss: Option<Decimal>,
    #[serde(default)]
    pub current_day_profit_loss_percentage: Option<Decimal>,
    #[serde(default)]
    pub settled_long_quantity: Option<Decimal>,
    #[serde(default)]
    pub settled_short_quantity: Option<Decimal>,
    #[serde(default)]
    pub aged_quantity: Option<Decimal>,
    /// The instrument held
    pub instrument: Instrument,
    #[serde(default)]
    pub market_value: Option<Decimal>,
    #[serde(default)]
    pub maintenance_requirement: Option<Decimal>,
    #[serde(default)]
    pub average_long_price: Option<Decimal>,
    #[serde(default)]
    pub average_short_price: Option<Decimal>,
    #[serde(default)]
    pub tax_lot_average_long_price: Option<Decimal>,
    #[serde(default)]
    pub tax_lot_average_short_price: Option<Decimal>,
    #[serde(default)]
    pub long_open_profit_loss: Option<Decimal>,
    #[serde(default)]
    pub short_open_profit_loss: Option<Decimal>,
    #[serde(default)]
    pub previous_session_long_quantity: Option<Decimal>,
    #[serde(default)]
    pub previous_session_short_quantity: Option<Decimal>,
    #[serde(default)]
    pub current_day_cost: Option<Decimal>,
}

impl Position {
    /// Net quantity, long minus short.
    pub fn net_quantity(&self) -> Decimal {
        self.long_quantity - self.short_quantity
    }
}

/// Instrument description attached to positions and order legs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instrument {
    /// Asset class
    pub asset_type: AssetType,
    #[serde(default)]
    pub cusip: Option<String>,
    /// Trading symbol
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub instrument_id: Option<i64>,
    #[serde(default)]
    pub net_change: Option<Decimal>,
    /// Sub-type, e.g. `"VANILLA"` for options or `"COMMON_STOCK"`
    #[serde(default, rename = "type")]
    pub instrument_type: Option<String>,
    /// Option side, for option instruments
    #[serde(default)]
    pub put_call: Option<OptionType>,
    #[serde(default)]
    pub underlying_symbol: Option<String>,
}
