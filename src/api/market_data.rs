//! Option chain and expiration endpoints.

use chrono::NaiveDate;

use super::{decode, Endpoint, Service};
use crate::models::{
    ContractType, OptionChain, OptionExpiration, OptionExpirationList, OptionStrategy, Symbol,
};
use crate::Result;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parameters of an option chain request.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use schwab_rs::api::OptionChainQuery;
/// use schwab_rs::models::ContractType;
///
/// let query = OptionChainQuery::new("$SPX")
///     .from_date(NaiveDate::from_ymd_opt(2025, 1, 3).unwrap())
///     .to_date(NaiveDate::from_ymd_opt(2025, 1, 10).unwrap())
///     .contract_type(ContractType::Put)
///     .strike_count(20);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct OptionChainQuery {
    symbol: Symbol,
    from_date: Option<NaiveDate>,
    to_date: Option<NaiveDate>,
    contract_type: ContractType,
    strike_count: Option<u32>,
    strategy: Option<OptionStrategy>,
    include_underlying_quote: Option<bool>,
}

impl OptionChainQuery {
    /// Query every contract of `symbol`.
    pub fn new(symbol: impl Into<Symbol>) -> Self {
        Self {
            symbol: symbol.into(),
            from_date: None,
            to_date: None,
            contract_type: ContractType::All,
            strike_count: None,
            strategy: None,
            include_underlying_quote: None,
        }
    }

    /// Only include expirations on or after `date`.
    pub fn from_date(mut self, date: NaiveDate) -> Self {
        self.from_date = Some(date);
        self
    }

    /// Only include expirations on or before `date`.
    pub fn to_date(mut self, date: NaiveDate) -> Self {
        self.to_date = Some(date);
        self
    }

    /// Restrict the side of the chain.
    pub fn contract_type(mut self, contract_type: ContractType) -> Self {
        self.contract_type = contract_type;
        self
    }

    /// Number of strikes above and below the at-the-money price.
    pub fn strike_count(mut self, count: u32) -> Self {
        self.strike_count = Some(count);
        self
    }

    /// Chain strategy.
    pub fn strategy(mut self, strategy: OptionStrategy) -> Self {
        self.strategy = Some(strategy);
        self
    }

    /// Include a quote of the underlying.
    pub fn include_underlying_quote(mut self, include: bool) -> Self {
        self.include_underlying_quote = Some(include);
        self
    }

    /// The underlying symbol.
    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }
}

/// `GET chains`: the option chain of an underlying.
#[derive(Debug, Clone, PartialEq)]
pub struct GetOptionChain {
    /// Query parameters
    pub query: OptionChainQuery,
}

impl Endpoint for GetOptionChain {
    type Output = OptionChain;

    fn service(&self) -> Service {
        Service::MarketData
    }

    fn path(&self) -> String {
        "chains".to_string()
    }

    fn query(&self) -> Vec<(&'static str, String)> {
        let q = &self.query;
        let mut query = vec![
            ("symbol", q.symbol.to_string()),
            ("contractType", q.contract_type.as_str().to_string()),
        ];
        if let Some(count) = q.strike_count {
            query.push(("strikeCount", count.to_string()));
        }
        if let Some(include) = q.include_underlying_quote {
            query.push(("includeUnderlyingQuote", include.to_string()));
        }
        if let Some(strategy) = q.strategy {
            query.push(("strategy", strategy.as_str().to_string()));
        }
        if let Some(from) = q.from_date {
            query.push(("fromDate", from.format(DATE_FORMAT).to_string()));
        }
        if let Some(to) = q.to_date {
            query.push(("toDate", to.format(DATE_FORMAT).to_string()));
        }
        query
    }

    fn parse(&self, body: &[u8]) -> Result<Self::Output> {
        decode("OptionChain", body)
    }
}

/// `GET expirationchain`: listed expirations of an underlying.
#[derive(Debug, Clone, PartialEq)]
pub struct GetOptionExpirations {
    /// Underlying symbol
    pub symbol: Symbol,
}

impl Endpoint for GetOptionExpirations {
    type Output = Vec<OptionExpiration>;

    fn service(&self) -> Service {
        Service::MarketData
    }

    fn path(&self) -> String {
        "expirationchain".to_string()
    }

    fn query(&self) -> Vec<(&'static str, String)> {
        vec![("symbol", self.symbol.to_string())]
    }

    fn parse(&self, body: &[u8]) -> Result<Self::Output> {
        let list: OptionExpirationList = decode("OptionExpirationList", body)?;
        Ok(list.expiration_list)
    }
}
