//! Option chain and option expiration models.

use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

use super::enums::{ExpirationType, OptionStrategy, OptionType};
use super::Validate;
use crate::{Error, Result};

/// Contracts keyed by `"YYYY-MM-DD:DTE"`, then by strike.
///
/// Keys keep the order in which they appear in the payload.
pub type ExpirationMap = IndexMap<String, IndexMap<String, Vec<OptionContract>>>;

/// An option chain for one underlying.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionChain {
    /// Underlying symbol
    #[serde(default)]
    pub symbol: String,
    /// Request status, `"SUCCESS"` on success
    pub status: String,
    #[serde(default)]
    pub underlying: Option<Underlying>,
    #[serde(default)]
    pub strategy: OptionStrategy,
    #[serde(default)]
    pub interval: Option<f64>,
    #[serde(default)]
    pub is_delayed: bool,
    #[serde(default)]
    pub is_index: bool,
    #[serde(default, deserialize_with = "de_lenient_f64")]
    pub interest_rate: Option<f64>,
    #[serde(default, deserialize_with = "de_lenient_f64")]
    pub underlying_price: Option<f64>,
    #[serde(default, deserialize_with = "de_lenient_f64")]
    pub volatility: Option<f64>,
    #[serde(default)]
    pub days_to_expiration: Option<f64>,
    #[serde(default)]
    pub number_of_contracts: Option<i64>,
    /// Call contracts by expiration and strike
    #[serde(default)]
    pub call_exp_date_map: ExpirationMap,
    /// Put contracts by expiration and strike
    #[serde(default)]
    pub put_exp_date_map: ExpirationMap,
}

/// The contracts of one expiration, split by side.
#[derive(Debug, Clone)]
pub struct ExpirationContracts<'a> {
    /// Expiration date
    pub expiration: NaiveDate,
    /// Call contracts in payload order
    pub calls: Vec<&'a OptionContract>,
    /// Put contracts in payload order
    pub puts: Vec<&'a OptionContract>,
}

impl OptionChain {
    /// Returns `true` if the server reported success.
    pub fn is_success(&self) -> bool {
        self.status == "SUCCESS"
    }

    /// Total number of contracts across both sides.
    pub fn contract_count(&self) -> usize {
        count_contracts(&self.call_exp_date_map) + count_contracts(&self.put_exp_date_map)
    }

    /// Group the chain's contracts by expiration date.
    ///
    /// One entry per distinct expiration date, in the order the dates first
    /// appear in the payload: call expirations first, then any expiration
    /// that only has puts. Dates are not re-sorted.
    pub fn expiration_pairs(&self) -> Result<Vec<ExpirationContracts<'_>>> {
        let mut grouped: IndexMap<NaiveDate, ExpirationContracts<'_>> = IndexMap::new();

        for (side, map) in [
            (OptionType::Call, &self.call_exp_date_map),
            (OptionType::Put, &self.put_exp_date_map),
        ] {
            for (key, strikes) in map {
                let expiration = parse_expiration_key(key)?;
                let entry = grouped
                    .entry(expiration)
                    .or_insert_with(|| ExpirationContracts {
                        expiration,
                        calls: Vec::new(),
                        puts: Vec::new(),
                    });
                let bucket = match side {
                    OptionType::Call => &mut entry.calls,
                    OptionType::Put => &mut entry.puts,
                };
                bucket.extend(strikes.values().flatten());
            }
        }

        Ok(grouped.into_values().collect())
    }
}

impl Validate for OptionChain {
    fn validate(&self) -> Result<()> {
        for (side, map) in [
            (OptionType::Call, &self.call_exp_date_map),
            (OptionType::Put, &self.put_exp_date_map),
        ] {
            for (key, strikes) in map {
                parse_expiration_key(key)?;
                for contract in strikes.values().flatten() {
                    if contract.put_call != side {
                        return Err(Error::validation(
                            "OptionChain",
                            format!(
                                "contract {} is a {:?} but listed under {:?} expiration {}",
                                contract.symbol, contract.put_call, side, key
                            ),
                        ));
                    }
                }
            }
        }
        Ok(())
    }
}

fn count_contracts(map: &ExpirationMap) -> usize {
    map.values()
        .flat_map(|strikes| strikes.values())
        .map(Vec::len)
        .sum()
}

/// Parse the date out of an expiration key such as `"2025-01-03:0"`.
pub(crate) fn parse_expiration_key(key: &str) -> Result<NaiveDate> {
    let date = key.split(':').next().unwrap_or(key);
    NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|e| {
        Error::validation("OptionChain", format!("bad expiration key {key:?}: {e}"))
    })
}

/// Quote of the chain's underlying.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Underlying {
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "de_lenient_f64")]
    pub bid: Option<f64>,
    #[serde(default, deserialize_with = "de_lenient_f64")]
    pub ask: Option<f64>,
    #[serde(default, deserialize_with = "de_lenient_f64")]
    pub last: Option<f64>,
    #[serde(default, deserialize_with = "de_lenient_f64")]
    pub mark: Option<f64>,
    #[serde(default, deserialize_with = "de_lenient_f64")]
    pub change: Option<f64>,
    #[serde(default, deserialize_with = "de_lenient_f64")]
    pub percent_change: Option<f64>,
    #[serde(default, deserialize_with = "de_lenient_f64")]
    pub close: Option<f64>,
    #[serde(default, deserialize_with = "de_lenient_f64")]
    pub high_price: Option<f64>,
    #[serde(default, deserialize_with = "de_lenient_f64")]
    pub low_price: Option<f64>,
    #[serde(default, deserialize_with = "de_lenient_f64")]
    pub open_price: Option<f64>,
    #[serde(default)]
    pub total_volume: Option<i64>,
    #[serde(default)]
    pub quote_time: Option<i64>,
    #[serde(default)]
    pub trade_time: Option<i64>,
    #[serde(default)]
    pub exchange_name: Option<String>,
    #[serde(default, deserialize_with = "de_lenient_f64")]
    pub fifty_two_week_high: Option<f64>,
    #[serde(default, deserialize_with = "de_lenient_f64")]
    pub fifty_two_week_low: Option<f64>,
    #[serde(default)]
    pub delayed: bool,
}

/// A single option contract.
///
/// Greeks and theoretical values are optional: the API omits them, sends
/// `null`, or sends the string `"NaN"` when it has no value.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionContract {
    /// Call or put
    pub put_call: OptionType,
    /// OCC option symbol
    pub symbol: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub exchange_name: Option<String>,
    /// Strike price
    pub strike_price: f64,
    #[serde(default, deserialize_with = "de_lenient_f64")]
    pub bid: Option<f64>,
    #[serde(default, deserialize_with = "de_lenient_f64")]
    pub ask: Option<f64>,
    #[serde(default, deserialize_with = "de_lenient_f64")]
    pub last: Option<f64>,
    #[serde(default, deserialize_with = "de_lenient_f64")]
    pub mark: Option<f64>,
    #[serde(default)]
    pub bid_size: Option<i64>,
    #[serde(default)]
    pub ask_size: Option<i64>,
    #[serde(default)]
    pub last_size: Option<i64>,
    #[serde(default, deserialize_with = "de_lenient_f64")]
    pub high_price: Option<f64>,
    #[serde(default, deserialize_with = "de_lenient_f64")]
    pub low_price: Option<f64>,
    #[serde(default, deserialize_with = "de_lenient_f64")]
    pub open_price: Option<f64>,
    #[serde(default, deserialize_with = "de_lenient_f64")]
    pub close_price: Option<f64>,
    #[serde(default)]
    pub total_volume: Option<i64>,
    #[serde(default)]
    pub open_interest: Option<i64>,
    #[serde(default)]
    pub trade_time_in_long: Option<i64>,
    #[serde(default)]
    pub quote_time_in_long: Option<i64>,
    #[serde(default, deserialize_with = "de_lenient_f64")]
    pub net_change: Option<f64>,
    #[serde(default, deserialize_with = "de_lenient_f64")]
    pub volatility: Option<f64>,
    #[serde(default, deserialize_with = "de_lenient_f64")]
    pub delta: Option<f64>,
    #[serde(default, deserialize_with = "de_lenient_f64")]
    pub gamma: Option<f64>,
    #[serde(default, deserialize_with = "de_lenient_f64")]
    pub theta: Option<f64>,
    #[serde(default, deserialize_with = "de_lenient_f64")]
    pub vega: Option<f64>,
    #[serde(default, deserialize_with = "de_lenient_f64")]
    pub rho: Option<f64>,
    #[serde(default, deserialize_with = "de_lenient_f64")]
    pub time_value: Option<f64>,
    #[serde(default, deserialize_with = "de_lenient_f64")]
    pub theoretical_option_value: Option<f64>,
    #[serde(default, deserialize_with = "de_lenient_f64")]
    pub theoretical_volatility: Option<f64>,
    #[serde(default, deserialize_with = "de_lenient_f64")]
    pub intrinsic_value: Option<f64>,
    #[serde(default, deserialize_with = "de_lenient_f64")]
    pub extrinsic_value: Option<f64>,
    #[serde(default, deserialize_with = "de_lenient_f64")]
    pub percent_change: Option<f64>,
    #[serde(default, deserialize_with = "de_lenient_f64")]
    pub mark_change: Option<f64>,
    #[serde(default, deserialize_with = "de_lenient_f64")]
    pub mark_percent_change: Option<f64>,
    /// Expiration timestamp as sent by the server
    #[serde(default)]
    pub expiration_date: Option<String>,
    #[serde(default)]
    pub days_to_expiration: Option<i64>,
    #[serde(default)]
    pub expiration_type: Option<ExpirationType>,
    #[serde(default)]
    pub last_trading_day: Option<i64>,
    #[serde(default, deserialize_with = "de_lenient_f64")]
    pub multiplier: Option<f64>,
    #[serde(default)]
    pub settlement_type: Option<String>,
    #[serde(default)]
    pub deliverable_note: Option<String>,
    #[serde(default)]
    pub option_root: Option<String>,
    #[serde(default)]
    pub exercise_type: Option<String>,
    #[serde(default)]
    pub in_the_money: Option<bool>,
    #[serde(default)]
    pub non_standard: Option<bool>,
    #[serde(default)]
    pub penny_pilot: Option<bool>,
    #[serde(default)]
    pub mini: Option<bool>,
}

impl OptionContract {
    /// Midpoint of bid and ask, when both are quoted.
    pub fn mid(&self) -> Option<f64> {
        match (self.bid, self.ask) {
            (Some(bid), Some(ask)) => Some((bid + ask) / 2.0),
            _ => None,
        }
    }
}

/// Response of the expiration chain endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OptionExpirationList {
    #[serde(default)]
    pub expiration_list: Vec<OptionExpiration>,
}

impl Validate for OptionExpirationList {
    fn validate(&self) -> Result<()> {
        match self.expiration_list.iter().find(|e| e.days_to_expiration < 0) {
            Some(expiration) => Err(Error::validation(
                "OptionExpirationList",
                format!(
                    "expiration {} has negative daysToExpiration {}",
                    expiration.expiration_date, expiration.days_to_expiration
                ),
            )),
            None => Ok(()),
        }
    }
}

/// One listed expiration of an underlying.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionExpiration {
    /// Expiration date
    pub expiration_date: NaiveDate,
    /// Calendar days until expiration
    pub days_to_expiration: i64,
    /// Expiration cycle
    pub expiration_type: ExpirationType,
    /// Whether this is a standard expiration
    pub standard: bool,
    #[serde(default)]
    pub settlement_type: Option<String>,
    #[serde(default)]
    pub option_roots: Option<String>,
}

/// Accept a number, `null`, or a numeric string; `"NaN"` and non-finite
/// values become `None`.
fn de_lenient_f64<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    let value = match Option::<Raw>::deserialize(deserializer)? {
        None => None,
        Some(Raw::Number(n)) => Some(n),
        Some(Raw::Text(s)) => match s.trim() {
            "" => None,
            s if s.eq_ignore_ascii_case("nan") => None,
            s => Some(s.parse::<f64>().map_err(serde::de::Error::custom)?),
        },
    };
    Ok(value.filter(|n| n.is_finite()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contract(put_call: &str, symbol: &str, strike: f64) -> serde_json::Value {
        serde_json::json!({
            "putCall": put_call,
            "symbol": symbol,
            "strikePrice": strike,
            "bid": 1.0,
            "ask": 1.5,
            "delta": "NaN",
            "gamma": null,
            "volatility": 12.5,
            "daysToExpiration": 0,
            "expirationType": "W"
        })
    }

    fn chain_json() -> serde_json::Value {
        serde_json::json!({
            "symbol": "$SPX",
            "status": "SUCCESS",
            "strategy": "SINGLE",
            "isDelayed": false,
            "underlyingPrice": 5900.25,
            "numberOfContracts": 5,
            "callExpDateMap": {
                "2025-01-10:7": {
                    "5800.0": [contract("CALL", "SPXW  250110C05800000", 5800.0)]
                },
                "2025-01-03:0": {
                    "5800.0": [contract("CALL", "SPXW  250103C05800000", 5800.0)],
                    "5900.0": [contract("CALL", "SPXW  250103C05900000", 5900.0)]
                }
            },
            "putExpDateMap": {
                "2025-01-03:0": {
                    "5800.0": [contract("PUT", "SPXW  250103P05800000", 5800.0)]
                },
                "2025-01-17:14": {
                    "5800.0": [contract("PUT", "SPXW  250117P05800000", 5800.0)]
                }
            }
        })
    }

    #[test]
    fn test_deserialize_chain() {
        let chain: OptionChain = serde_json::from_value(chain_json()).unwrap();
        assert!(chain.is_success());
        assert_eq!(chain.contract_count(), 5);
        chain.validate().unwrap();

        let first = &chain.call_exp_date_map["2025-01-03:0"]["5800.0"][0];
        assert_eq!(first.put_call, OptionType::Call);
        assert_eq!(first.delta, None);
        assert_eq!(first.gamma, None);
        assert_eq!(first.volatility, Some(12.5));
        assert_eq!(first.mid(), Some(1.25));
    }

    #[test]
    fn test_expiration_pairs_preserve_payload_order() {
        let chain: OptionChain = serde_json::from_value(chain_json()).unwrap();
        let pairs = chain.expiration_pairs().unwrap();

        let dates: Vec<String> = pairs.iter().map(|p| p.expiration.to_string()).collect();
        assert_eq!(dates, ["2025-01-10", "2025-01-03", "2025-01-17"]);

        assert_eq!(pairs[0].calls.len(), 1);
        assert!(pairs[0].puts.is_empty());
        assert_eq!(pairs[1].calls.len(), 2);
        assert_eq!(pairs[1].puts.len(), 1);
        assert!(pairs[2].calls.is_empty());
        assert_eq!(pairs[2].puts.len(), 1);
    }

    #[test]
    fn test_expiration_pairs_conserve_contracts() {
        let chain: OptionChain = serde_json::from_value(chain_json()).unwrap();
        let pairs = chain.expiration_pairs().unwrap();

        let total: usize = pairs.iter().map(|p| p.calls.len() + p.puts.len()).sum();
        assert_eq!(total, chain.contract_count());
        assert!(pairs.iter().all(|p| p.calls.iter().all(|c| c.put_call.is_call())));
        assert!(pairs.iter().all(|p| p.puts.iter().all(|c| c.put_call.is_put())));
    }

    #[test]
    fn test_put_in_call_map_fails_validation() {
        let mut json = chain_json();
        json["callExpDateMap"]["2025-01-10:7"]["5800.0"][0]["putCall"] = "PUT".into();
        let chain: OptionChain = serde_json::from_value(json).unwrap();
        assert!(matches!(chain.validate(), Err(Error::Validation { .. })));
    }

    #[test]
    fn test_bad_expiration_key_fails_validation() {
        let mut json = chain_json();
        json["putExpDateMap"]["not-a-date:3"] = serde_json::json!({});
        let chain: OptionChain = serde_json::from_value(json).unwrap();
        assert!(chain.validate().is_err());
    }

    #[test]
    fn test_deserialize_expiration() {
        let json = r#"{"expirationList": [
            {"expirationDate": "2022-01-07", "daysToExpiration": 2, "expirationType": "W", "standard": true},
            {"expirationDate": "2022-01-21", "daysToExpiration": 16, "expirationType": "S", "standard": true}
        ]}"#;

        let list: OptionExpirationList = serde_json::from_str(json).unwrap();
        let first = &list.expiration_list[0];
        assert_eq!(first.expiration_date, NaiveDate::from_ymd_opt(2022, 1, 7).unwrap());
        assert_eq!(first.days_to_expiration, 2);
        assert_eq!(first.expiration_type, ExpirationType::Weekly);
        assert!(first.standard);
        assert!(list.validate().is_ok());
    }

    #[test]
    fn test_negative_days_to_expiration_fails_validation() {
        let json = r#"{"expirationList": [
            {"expirationDate": "2022-01-07", "daysToExpiration": 2, "expirationType": "W", "standard": true},
            {"expirationDate": "2021-12-31", "daysToExpiration": -5, "expirationType": "W", "standard": true}
        ]}"#;

        let list: OptionExpirationList = serde_json::from_str(json).unwrap();
        match list.validate() {
            Err(Error::Validation { model, message }) => {
                assert_eq!(model, "OptionExpirationList");
                assert!(message.contains("2021-12-31"));
            }
            other => panic!("expected Validation, got {other:?}"),
        }
    }
}
