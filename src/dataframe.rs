//! Tabular views of option chains.
//!
//! Turns an [`OptionChain`] into one pair of polars `DataFrame`s per
//! expiration, one row per contract. Expirations keep the order of the
//! payload (see [`OptionChain::expiration_pairs`]); they are not sorted.

use chrono::NaiveDate;
use polars::prelude::*;

use crate::models::{OptionChain, OptionContract};
use crate::Result;

/// Calls and puts of one expiration as data frames.
#[derive(Debug, Clone)]
pub struct ExpirationFrames {
    /// Expiration date
    pub expiration: NaiveDate,
    /// One row per call contract
    pub calls: DataFrame,
    /// One row per put contract
    pub puts: DataFrame,
}

impl OptionChain {
    /// Split the chain into per-expiration call and put tables.
    ///
    /// Every contract lands in exactly one row of one table. An expiration
    /// with contracts on only one side gets an empty table, with the same
    /// columns, for the other.
    ///
    /// ```no_run
    /// # fn example(chain: schwab_rs::models::OptionChain) -> schwab_rs::Result<()> {
    /// for frames in chain.to_dataframe_pairs_by_expiration()? {
    ///     println!("{}: {} calls, {} puts", frames.expiration, frames.calls.height(), frames.puts.height());
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub fn to_dataframe_pairs_by_expiration(&self) -> Result<Vec<ExpirationFrames>> {
        self.expiration_pairs()?
            .into_iter()
            .map(|pair| {
                Ok(ExpirationFrames {
                    expiration: pair.expiration,
                    calls: contracts_frame(&pair.calls)?,
                    puts: contracts_frame(&pair.puts)?,
                })
            })
            .collect()
    }
}

fn strings(
    contracts: &[&OptionContract],
    field: fn(&OptionContract) -> Option<&str>,
) -> Vec<Option<String>> {
    contracts.iter().map(|c| field(c).map(str::to_string)).collect()
}

fn floats(contracts: &[&OptionContract], field: fn(&OptionContract) -> Option<f64>) -> Vec<Option<f64>> {
    contracts.iter().map(|c| field(c)).collect()
}

fn ints(contracts: &[&OptionContract], field: fn(&OptionContract) -> Option<i64>) -> Vec<Option<i64>> {
    contracts.iter().map(|c| field(c)).collect()
}

fn contracts_frame(contracts: &[&OptionContract]) -> Result<DataFrame> {
    let symbols: Vec<String> = contracts.iter().map(|c| c.symbol.clone()).collect();
    let sides: Vec<&str> = contracts
        .iter()
        .map(|c| if c.put_call.is_call() { "CALL" } else { "PUT" })
        .collect();
    let strikes: Vec<f64> = contracts.iter().map(|c| c.strike_price).collect();
    let in_the_money: Vec<Option<bool>> = contracts.iter().map(|c| c.in_the_money).collect();

    let frame = DataFrame::new(vec![
        Column::new("symbol".into(), symbols),
        Column::new("put_call".into(), sides),
        Column::new("description".into(), strings(contracts, |c| c.description.as_deref())),
        Column::new("strike_price".into(), strikes),
        Column::new("expiration_date".into(), strings(contracts, |c| c.expiration_date.as_deref())),
        Column::new("days_to_expiration".into(), ints(contracts, |c| c.days_to_expiration)),
        Column::new("bid".into(), floats(contracts, |c| c.bid)),
        Column::new("ask".into(), floats(contracts, |c| c.ask)),
        Column::new("last".into(), floats(contracts, |c| c.last)),
        Column::new("mark".into(), floats(contracts, |c| c.mark)),
        Column::new("bid_size".into(), ints(contracts, |c| c.bid_size)),
        Column::new("ask_size".into(), ints(contracts, |c| c.ask_size)),
        Column::new("total_volume".into(), ints(contracts, |c| c.total_volume)),
        Column::new("open_interest".into(), ints(contracts, |c| c.open_interest)),
        Column::new("net_change".into(), floats(contracts, |c| c.net_change)),
        Column::new("volatility".into(), floats(contracts, |c| c.volatility)),
        Column::new("delta".into(), floats(contracts, |c| c.delta)),
        Column::new("gamma".into(), floats(contracts, |c| c.gamma)),
        Column::new("theta".into(), floats(contracts, |c| c.theta)),
        Column::new("vega".into(), floats(contracts, |c| c.vega)),
        Column::new("rho".into(), floats(contracts, |c| c.rho)),
        Column::new("time_value".into(), floats(contracts, |c| c.time_value)),
        Column::new(
            "theoretical_option_value".into(),
            floats(contracts, |c| c.theoretical_option_value),
        ),
        Column::new("intrinsic_value".into(), floats(contracts, |c| c.intrinsic_value)),
        Column::new("extrinsic_value".into(), floats(contracts, |c| c.extrinsic_value)),
        Column::new("multiplier".into(), floats(contracts, |c| c.multiplier)),
        Column::new("in_the_money".into(), in_the_money),
    ])?;
    Ok(frame)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn contract(put_call: &str, symbol: &str, strike: f64) -> serde_json::Value {
        json!({
            "putCall": put_call,
            "symbol": symbol,
            "strikePrice": strike,
            "bid": 1.0,
            "ask": 1.2,
            "delta": "NaN"
        })
    }

    fn chain() -> OptionChain {
        serde_json::from_value(json!({
            "symbol": "SPY",
            "status": "SUCCESS",
            "callExpDateMap": {
                "2025-01-10:7": {
                    "580.0": [contract("CALL", "SPY   250110C00580000", 580.0)],
                    "585.0": [contract("CALL", "SPY   250110C00585000", 585.0)]
                },
                "2025-01-03:0": {
                    "580.0": [contract("CALL", "SPY   250103C00580000", 580.0)]
                }
            },
            "putExpDateMap": {
                "2025-01-03:0": {
                    "575.0": [contract("PUT", "SPY   250103P00575000", 575.0)]
                },
                "2025-01-17:14": {
                    "570.0": [contract("PUT", "SPY   250117P00570000", 570.0)]
                }
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_pairs_follow_payload_order() {
        let frames = chain().to_dataframe_pairs_by_expiration().unwrap();
        let dates: Vec<_> = frames.iter().map(|f| f.expiration.to_string()).collect();
        assert_eq!(dates, ["2025-01-10", "2025-01-03", "2025-01-17"]);
    }

    #[test]
    fn test_every_contract_lands_once() {
        let chain = chain();
        let frames = chain.to_dataframe_pairs_by_expiration().unwrap();
        let rows: usize = frames
            .iter()
            .map(|f| f.calls.height() + f.puts.height())
            .sum();
        assert_eq!(rows, chain.contract_count());

        let first = &frames[0];
        assert_eq!(first.calls.height(), 2);
        assert_eq!(first.puts.height(), 0);
        assert_eq!(first.puts.width(), first.calls.width());
    }

    #[test]
    fn test_columns_carry_contract_fields() {
        let frames = chain().to_dataframe_pairs_by_expiration().unwrap();
        let calls = &frames[0].calls;

        let strikes = calls.column("strike_price").unwrap().f64().unwrap();
        assert_eq!(strikes.get(0), Some(580.0));
        assert_eq!(strikes.get(1), Some(585.0));

        let delta = calls.column("delta").unwrap().f64().unwrap();
        assert_eq!(delta.get(0), None);

        let side = calls.column("put_call").unwrap().str().unwrap();
        assert_eq!(side.get(0), Some("CALL"));
    }
}
