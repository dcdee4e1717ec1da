//! Enumeration types for the Schwab API.
//!
//! Wire values are SCREAMING_SNAKE_CASE. Enums that only ever arrive from
//! the server carry an `Unknown` catch-all so a new server value does not
//! fail the whole payload.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Type of brokerage account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountType {
    /// Margin account
    Margin,
    /// Cash account
    Cash,
}

/// Current status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    AwaitingParentOrder,
    AwaitingCondition,
    AwaitingStopCondition,
    AwaitingManualReview,
    Accepted,
    AwaitingUrOut,
    PendingActivation,
    Queued,
    /// Order is live at the exchange
    Working,
    Rejected,
    PendingCancel,
    /// Order cancelled
    Canceled,
    PendingReplace,
    Replaced,
    /// Order completely filled
    Filled,
    Expired,
    New,
    AwaitingReleaseTime,
    PendingAcknowledgement,
    PendingRecall,
    /// Status not known to this client
    #[serde(other)]
    Unknown,
}

impl OrderStatus {
    /// Returns `true` if the order can no longer change state.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrderStatus::Rejected
                | OrderStatus::Canceled
                | OrderStatus::Replaced
                | OrderStatus::Filled
                | OrderStatus::Expired
        )
    }

    /// Returns `true` if the order is still working or waiting to work.
    pub fn is_working(&self) -> bool {
        matches!(
            self,
            OrderStatus::AwaitingParentOrder
                | OrderStatus::AwaitingCondition
                | OrderStatus::AwaitingStopCondition
                | OrderStatus::AwaitingManualReview
                | OrderStatus::Accepted
                | OrderStatus::PendingActivation
                | OrderStatus::Queued
                | OrderStatus::Working
                | OrderStatus::New
                | OrderStatus::AwaitingReleaseTime
        )
    }

    /// The value used for this status in query strings.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::AwaitingParentOrder => "AWAITING_PARENT_ORDER",
            OrderStatus::AwaitingCondition => "AWAITING_CONDITION",
            OrderStatus::AwaitingStopCondition => "AWAITING_STOP_CONDITION",
            OrderStatus::AwaitingManualReview => "AWAITING_MANUAL_REVIEW",
            OrderStatus::Accepted => "ACCEPTED",
            OrderStatus::AwaitingUrOut => "AWAITING_UR_OUT",
            OrderStatus::PendingActivation => "PENDING_ACTIVATION",
            OrderStatus::Queued => "QUEUED",
            OrderStatus::Working => "WORKING",
            OrderStatus::Rejected => "REJECTED",
            OrderStatus::PendingCancel => "PENDING_CANCEL",
            OrderStatus::Canceled => "CANCELED",
            OrderStatus::PendingReplace => "PENDING_REPLACE",
            OrderStatus::Replaced => "REPLACED",
            OrderStatus::Filled => "FILLED",
            OrderStatus::Expired => "EXPIRED",
            OrderStatus::New => "NEW",
            OrderStatus::AwaitingReleaseTime => "AWAITING_RELEASE_TIME",
            OrderStatus::PendingAcknowledgement => "PENDING_ACKNOWLEDGEMENT",
            OrderStatus::PendingRecall => "PENDING_RECALL",
            OrderStatus::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Order type specifying how the order should be executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderType {
    Market,
    Limit,
    Stop,
    StopLimit,
    TrailingStop,
    Cabinet,
    NonMarketable,
    MarketOnClose,
    Exercise,
    TrailingStopLimit,
    NetDebit,
    NetCredit,
    NetZero,
    LimitOnClose,
    #[serde(other)]
    Unknown,
}

/// Trading session an order is eligible for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MarketSession {
    Normal,
    Am,
    Pm,
    Seamless,
    #[serde(other)]
    Unknown,
}

/// How long an order remains active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderDuration {
    Day,
    GoodTillCancel,
    FillOrKill,
    ImmediateOrCancel,
    EndOfWeek,
    EndOfMonth,
    NextEndOfMonth,
    #[serde(other)]
    Unknown,
}

/// Instruction for an order leg.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Instruction {
    Buy,
    Sell,
    BuyToCover,
    SellShort,
    BuyToOpen,
    BuyToClose,
    SellToOpen,
    SellToClose,
    Exchange,
    SellShortExempt,
    #[serde(other)]
    Unknown,
}

impl Instruction {
    /// Returns `true` if this is a buy instruction.
    pub fn is_buy(&self) -> bool {
        matches!(
            self,
            Instruction::Buy
                | Instruction::BuyToCover
                | Instruction::BuyToOpen
                | Instruction::BuyToClose
        )
    }
}

/// Asset class of an instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssetType {
    Equity,
    MutualFund,
    Option,
    Future,
    Forex,
    Index,
    CashEquivalent,
    FixedIncome,
    Product,
    Currency,
    CollectiveInvestment,
    #[serde(other)]
    Unknown,
}

/// Side of an option contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OptionType {
    /// Call option
    Call,
    /// Put option
    Put,
}

impl OptionType {
    /// Returns `true` if this is a call option.
    pub fn is_call(&self) -> bool {
        matches!(self, OptionType::Call)
    }

    /// Returns `true` if this is a put option.
    pub fn is_put(&self) -> bool {
        matches!(self, OptionType::Put)
    }
}

/// Which sides of an option chain to request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContractType {
    Call,
    Put,
    #[default]
    All,
}

impl ContractType {
    /// The value used for this contract type in query strings.
    pub fn as_str(&self) -> &'static str {
        match self {
            ContractType::Call => "CALL",
            ContractType::Put => "PUT",
            ContractType::All => "ALL",
        }
    }
}

/// Strategy used to build an option chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OptionStrategy {
    #[default]
    Single,
    Analytical,
    Covered,
    Vertical,
    Calendar,
    Strangle,
    Straddle,
    Butterfly,
    Condor,
    Diagonal,
    Collar,
    Roll,
    #[serde(other)]
    Unknown,
}

impl OptionStrategy {
    /// The value used for this strategy in query strings.
    pub fn as_str(&self) -> &'static str {
        match self {
            OptionStrategy::Single => "SINGLE",
            OptionStrategy::Analytical => "ANALYTICAL",
            OptionStrategy::Covered => "COVERED",
            OptionStrategy::Vertical => "VERTICAL",
            OptionStrategy::Calendar => "CALENDAR",
            OptionStrategy::Strangle => "STRANGLE",
            OptionStrategy::Straddle => "STRADDLE",
            OptionStrategy::Butterfly => "BUTTERFLY",
            OptionStrategy::Condor => "CONDOR",
            OptionStrategy::Diagonal => "DIAGONAL",
            OptionStrategy::Collar => "COLLAR",
            OptionStrategy::Roll => "ROLL",
            OptionStrategy::Unknown => "UNKNOWN",
        }
    }
}

/// Expiration cycle of an option series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExpirationType {
    /// Weekly expiration
    #[serde(rename = "W")]
    Weekly,
    /// Standard (third Friday) expiration
    #[serde(rename = "S")]
    Standard,
    /// Quarterly expiration
    #[serde(rename = "Q")]
    Quarterly,
    /// End of month expiration
    #[serde(rename = "M")]
    EndOfMonth,
    #[serde(other)]
    Unknown,
}
