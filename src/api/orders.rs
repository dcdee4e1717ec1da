//! Order endpoints.

use chrono::{DateTime, Utc};

use super::{decode, segment, Endpoint, Service};
use crate::models::{AccountHash, Order, OrderStatus};
use crate::Result;

/// Timestamp format the orders endpoint expects.
const ENTERED_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// `GET accounts/{hash}/orders`: orders entered within a time range.
///
/// The range is passed through as given. An empty or inverted range is
/// not rejected here; the server decides what it returns.
#[derive(Debug, Clone)]
pub struct GetOrders {
    /// Hash of the account
    pub account_hash: AccountHash,
    /// Start of the entered-time range
    pub from_entered_time: DateTime<Utc>,
    /// End of the entered-time range
    pub to_entered_time: DateTime<Utc>,
    /// Only return orders with this status
    pub status: OrderStatus,
    /// Cap on the number of orders returned
    pub max_results: Option<u32>,
}

impl Endpoint for GetOrders {
    type Output = Vec<Order>;

    fn service(&self) -> Service {
        Service::Trader
    }

    fn path(&self) -> String {
        format!("accounts/{}/orders", segment(self.account_hash.as_str()))
    }

    fn query(&self) -> Vec<(&'static str, String)> {
        let mut query = vec![
            (
                "fromEnteredTime",
                self.from_entered_time.format(ENTERED_TIME_FORMAT).to_string(),
            ),
            (
                "toEnteredTime",
                self.to_entered_time.format(ENTERED_TIME_FORMAT).to_string(),
            ),
            ("status", self.status.as_str().to_string()),
        ];
        if let Some(max) = self.max_results {
            query.push(("maxResults", max.to_string()));
        }
        query
    }

    fn parse(&self, body: &[u8]) -> Result<Self::Output> {
        decode("Order", body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_query_formats_times_and_status() {
        let endpoint = GetOrders {
            account_hash: AccountHash::new("hash1"),
            from_entered_time: Utc.with_ymd_and_hms(2025, 1, 2, 9, 30, 0).unwrap(),
            to_entered_time: Utc.with_ymd_and_hms(2025, 1, 2, 16, 0, 0).unwrap(),
            status: OrderStatus::Filled,
            max_results: None,
        };

        assert_eq!(endpoint.path(), "accounts/hash1/orders");
        assert_eq!(
            endpoint.query(),
            vec![
                ("fromEnteredTime", "2025-01-02T09:30:00.000Z".to_string()),
                ("toEnteredTime", "2025-01-02T16:00:00.000Z".to_string()),
                ("status", "FILLED".to_string()),
            ]
        );
    }

    #[test]
    fn test_inverted_range_passes_through() {
        let later = Utc.with_ymd_and_hms(2025, 1, 3, 0, 0, 0).unwrap();
        let earlier = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let endpoint = GetOrders {
            account_hash: AccountHash::new("hash1"),
            from_entered_time: later,
            to_entered_time: earlier,
            status: OrderStatus::Working,
            max_results: Some(10),
        };

        let query = endpoint.query();
        assert_eq!(query[0].1, "2025-01-03T00:00:00.000Z");
        assert_eq!(query[1].1, "2025-01-01T00:00:00.000Z");
        assert_eq!(query[3], ("maxResults", "10".to_string()));
        assert!(endpoint.parse(b"[]").unwrap().is_empty());
    }
}
