//! Endpoint definitions for the trader and market data APIs.
//!
//! Each operation is described once, as an [`Endpoint`]: which service it
//! targets, its path and query, and how its response body decodes. The
//! async and blocking clients both execute these same definitions.

mod accounts;
mod market_data;
mod orders;

pub use accounts::{GetAccountNumbers, GetAccounts, GetSingleAccount};
pub use market_data::{GetOptionChain, GetOptionExpirations, OptionChainQuery};
pub use orders::GetOrders;

use reqwest::header::{HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::Method;
use serde::de::DeserializeOwned;

use crate::client::{ClientConfig, HttpRequest};
use crate::models::Validate;
use crate::{Error, Result};

/// The API service an endpoint belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    /// Accounts and orders
    Trader,
    /// Quotes, option chains and expirations
    MarketData,
}

/// A single API operation.
pub trait Endpoint {
    /// What the decoded response is turned into.
    type Output;

    /// The service hosting this endpoint.
    fn service(&self) -> Service;

    /// Request method.
    fn method(&self) -> Method {
        Method::GET
    }

    /// Path relative to the service base URL, without a leading slash.
    fn path(&self) -> String;

    /// Query parameters.
    fn query(&self) -> Vec<(&'static str, String)> {
        Vec::new()
    }

    /// Decode a successful response body.
    fn parse(&self, body: &[u8]) -> Result<Self::Output>;
}

/// Build the authorized request for `endpoint`.
pub(crate) fn build_request<E: Endpoint + ?Sized>(
    config: &ClientConfig,
    endpoint: &E,
    access_token: &str,
) -> Result<HttpRequest> {
    let base = match endpoint.service() {
        Service::Trader => &config.endpoints.trader,
        Service::MarketData => &config.endpoints.market_data,
    };

    let mut url = base.join(&endpoint.path())?;
    let query = endpoint.query();
    if !query.is_empty() {
        url.query_pairs_mut().extend_pairs(query);
    }

    HttpRequest::new(endpoint.method(), url)
        .with_header(ACCEPT, HeaderValue::from_static("application/json"))
        .with_sensitive_header(AUTHORIZATION, &format!("Bearer {access_token}"))
}

/// Decode `body` into `T` and check its invariants.
///
/// Failures name the model and carry serde's message, which names the
/// offending field and its position.
pub(crate) fn decode<T>(model: &'static str, body: &[u8]) -> Result<T>
where
    T: DeserializeOwned + Validate,
{
    let value: T =
        serde_json::from_slice(body).map_err(|e| Error::validation(model, e.to_string()))?;
    value.validate()?;
    Ok(value)
}

/// Encode a single path segment.
pub(crate) fn segment(s: &str) -> String {
    urlencoding::encode(s).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Order;

    struct Probe;

    impl Endpoint for Probe {
        type Output = ();

        fn service(&self) -> Service {
            Service::MarketData
        }

        fn path(&self) -> String {
            "chains".to_string()
        }

        fn query(&self) -> Vec<(&'static str, String)> {
            vec![("symbol", "$SPX".to_string()), ("contractType", "ALL".to_string())]
        }

        fn parse(&self, _body: &[u8]) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_build_request() {
        let request = build_request(&ClientConfig::default(), &Probe, "token-1").unwrap();

        assert_eq!(request.method, Method::GET);
        assert_eq!(
            request.url.as_str(),
            "https://api.schwabapi.com/marketdata/v1/chains?symbol=%24SPX&contractType=ALL"
        );
        assert_eq!(request.authorization(), Some("Bearer token-1"));
        assert!(request.body.is_none());
    }

    #[test]
    fn test_decode_reports_model_and_field() {
        let err = decode::<Vec<Order>>("Order", br#"[{"orderId": "abc", "status": "FILLED"}]"#)
            .unwrap_err();
        match err {
            Error::Validation { model, message } => {
                assert_eq!(model, "Order");
                assert!(message.contains("invalid type"), "{message}");
            }
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn test_segment_encodes_reserved_characters() {
        assert_eq!(segment("A1/B2+C="), "A1%2FB2%2BC%3D");
    }
}
