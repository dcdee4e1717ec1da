//! Order models.
//!
//! Orders are a read-only projection of server state; nothing here is
//! submitted back to the API.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use super::account::Instrument;
use super::enums::*;
use super::Validate;
use crate::{Error, Result};

/// An order as reported by the trader API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Server-assigned order identifier
    pub order_id: i64,
    /// Current order status
    pub status: OrderStatus,
    /// Whether the order can still be cancelled
    #[serde(default)]
    pub cancelable: bool,
    /// Whether the order can still be replaced
    #[serde(default)]
    pub editable: bool,
    #[serde(default)]
    pub session: Option<MarketSession>,
    #[serde(default)]
    pub duration: Option<OrderDuration>,
    #[serde(default)]
    pub order_type: Option<OrderType>,
    #[serde(default)]
    pub complex_order_strategy_type: Option<String>,
    #[serde(default)]
    pub order_strategy_type: Option<String>,
    #[serde(default)]
    pub quantity: Option<Decimal>,
    #[serde(default)]
    pub filled_quantity: Option<Decimal>,
    #[serde(default)]
    pub remaining_quantity: Option<Decimal>,
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub stop_price: Option<Decimal>,
    #[serde(default)]
    pub requested_destination: Option<String>,
    #[serde(default)]
    pub destination_link_name: Option<String>,
    /// When the order was entered
    #[serde(default, deserialize_with = "de_optional_timestamp")]
    pub entered_time: Option<DateTime<Utc>>,
    /// When the order was filled, cancelled or expired
    #[serde(default, deserialize_with = "de_optional_timestamp")]
    pub close_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub tag: Option<String>,
    /// Plaintext account number the order belongs to
    #[serde(default)]
    pub account_number: Option<i64>,
    #[serde(default)]
    pub status_description: Option<String>,
    /// Instructions making up the order
    #[serde(default)]
    pub order_leg_collection: Vec<OrderLeg>,
    /// Fills and other activity
    #[serde(default)]
    pub order_activity_collection: Vec<OrderActivity>,
    /// Child orders for conditional strategies
    #[serde(default)]
    pub child_order_strategies: Vec<Order>,
}

impl Order {
    /// Sum of executed quantity across all activity.
    pub fn executed_quantity(&self) -> Decimal {
        self.order_activity_collection
            .iter()
            .flat_map(|activity| activity.execution_legs.iter())
            .map(|leg| leg.quantity)
            .sum()
    }
}

impl Validate for Order {
    fn validate(&self) -> Result<()> {
        if self.order_id <= 0 {
            return Err(Error::validation(
                "Order",
                format!("orderId must be positive, got {}", self.order_id),
            ));
        }
        for (field, value) in [
            ("quantity", self.quantity),
            ("filledQuantity", self.filled_quantity),
            ("remainingQuantity", self.remaining_quantity),
        ] {
            if value.is_some_and(|q| q < Decimal::ZERO) {
                return Err(Error::validation(
                    "Order",
                    format!("{field} is negative on order {}", self.order_id),
                ));
            }
        }
        let negative_leg = self
            .order_leg_collection
            .iter()
            .find(|leg| leg.quantity < Decimal::ZERO);
        if let Some(leg) = negative_leg {
            return Err(Error::validation(
                "Order",
                format!("leg {:?} of order {} has negative quantity", leg.leg_id, self.order_id),
            ));
        }
        self.child_order_strategies.validate()
    }
}

/// A single instruction within an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLeg {
    #[serde(default)]
    pub order_leg_type: Option<AssetType>,
    #[serde(default)]
    pub leg_id: Option<i64>,
    /// Instrument traded by this leg
    pub instrument: Instrument,
    /// Buy/sell instruction
    pub instruction: Instruction,
    #[serde(default)]
    pub position_effect: Option<String>,
    #[serde(default)]
    pub quantity: Decimal,
}

/// Activity reported against an order, typically an execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderActivity {
    #[serde(default)]
    pub activity_type: Option<String>,
    #[serde(default)]
    pub activity_id: Option<i64>,
    #[serde(default)]
    pub execution_type: Option<String>,
    #[serde(default)]
    pub quantity: Option<Decimal>,
    #[serde(default)]
    pub order_remaining_quantity: Option<Decimal>,
    #[serde(default)]
    pub execution_legs: Vec<ExecutionLeg>,
}

/// A fill against one leg of an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionLeg {
    #[serde(default)]
    pub leg_id: Option<i64>,
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub quantity: Decimal,
    #[serde(default)]
    pub mismarked_quantity: Option<Decimal>,
    #[serde(default)]
    pub instrument_id: Option<i64>,
    #[serde(default, deserialize_with = "de_optional_timestamp")]
    pub time: Option<DateTime<Utc>>,
}

/// Order timestamps arrive as `2024-03-15T14:30:00+0000`, which is not
/// RFC 3339 because the offset lacks a colon.
fn de_optional_timestamp<'de, D>(deserializer: D) -> std::result::Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    raw.map(|s| {
        DateTime::parse_from_rfc3339(&s)
            .or_else(|_| DateTime::parse_from_str(&s, "%Y-%m-%dT%H:%M:%S%z"))
            .or_else(|_| DateTime::parse_from_str(&s, "%Y-%m-%dT%H:%M:%S%.f%z"))
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    })
    .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    const FILLED_ORDER: &str = r#"{
        "session": "NORMAL",
        "duration": "DAY",
        "orderType": "LIMIT",
        "quantity": 1,
        "filledQuantity": 1,
        "remainingQuantity": 0,
        "price": 2.5,
        "orderLegCollection": [{
            "orderLegType": "OPTION",
            "legId": 1,
            "instrument": {
                "assetType": "OPTION",
                "symbol": "SPXW  250103C05800000",
                "putCall": "CALL",
                "underlyingSymbol": "$SPX"
            },
            "instruction": "BUY_TO_OPEN",
            "positionEffect": "OPENING",
            "quantity": 1
        }],
        "orderStrategyType": "SINGLE",
        "orderId": 456,
        "cancelable": false,
        "editable": false,
        "status": "FILLED",
        "enteredTime": "2025-01-02T15:04:05+0000",
        "closeTime": "2025-01-02T15:04:06+0000",
        "accountNumber": 123,
        "orderActivityCollection": [{
            "activityType": "EXECUTION",
            "executionType": "FILL",
            "quantity": 1,
            "orderRemainingQuantity": 0,
            "executionLegs": [{"legId": 1, "price": 2.5, "quantity": 1, "mismarkedQuantity": 0, "time": "2025-01-02T15:04:06+0000"}]
        }]
    }"#;

    #[test]
    fn test_deserialize_filled_order() {
        let order: Order = serde_json::from_str(FILLED_ORDER).unwrap();
        assert_eq!(order.order_id, 456);
        assert!(!order.cancelable);
        assert_eq!(order.status, OrderStatus::Filled);
        assert_eq!(order.price, Some(dec!(2.5)));
        assert_eq!(order.order_leg_collection.len(), 1);
        assert!(order.order_leg_collection[0].instruction.is_buy());
        assert_eq!(order.executed_quantity(), dec!(1));
        assert_eq!(
            order.entered_time,
            Some(Utc.with_ymd_and_hms(2025, 1, 2, 15, 4, 5).unwrap())
        );
    }

    #[test]
    fn test_filled_order_passes_validation() {
        let order: Order = serde_json::from_str(FILLED_ORDER).unwrap();
        assert!(order.validate().is_ok());
    }

    #[test]
    fn test_negative_quantity_fails_validation() {
        let mut order: Order = serde_json::from_str(FILLED_ORDER).unwrap();
        order.filled_quantity = Some(dec!(-1));
        match order.validate() {
            Err(Error::Validation { model, message }) => {
                assert_eq!(model, "Order");
                assert!(message.contains("filledQuantity"));
            }
            other => panic!("expected Validation, got {other:?}"),
        }

        let mut order: Order = serde_json::from_str(FILLED_ORDER).unwrap();
        order.order_leg_collection[0].quantity = dec!(-2);
        assert!(order.validate().is_err());
    }

    #[test]
    fn test_child_orders_are_validated() {
        let mut parent: Order = serde_json::from_str(FILLED_ORDER).unwrap();
        let mut child = parent.clone();
        child.order_id = 0;
        parent.child_order_strategies.push(child);
        let err = parent.validate().unwrap_err();
        assert!(err.to_string().contains("orderId"));
    }

    #[test]
    fn test_order_requires_order_id() {
        let err = serde_json::from_str::<Order>(r#"{"status": "FILLED"}"#).unwrap_err();
        assert!(err.to_string().contains("orderId"));
    }

    #[test]
    fn test_rfc3339_timestamp_accepted() {
        let order: Order = serde_json::from_str(
            r#"{"orderId": 1, "status": "WORKING", "enteredTime": "2025-01-02T15:04:05Z"}"#,
        )
        .unwrap();
        assert!(order.entered_time.is_some());
        assert!(order.close_time.is_none());
    }
}
