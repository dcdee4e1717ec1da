//! Transport abstraction shared by the async and blocking clients.
//!
//! Requests are built and responses interpreted without performing any
//! I/O. A transport only moves an [`HttpRequest`] over the wire and hands
//! back the [`HttpResponse`]; the async and blocking clients differ only
//! in which transport trait they drive.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, RETRY_AFTER};
use reqwest::{Method, StatusCode};
use url::Url;

use crate::{Error, Result};

/// A fully built HTTP request.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// Request method
    pub method: Method,
    /// Absolute URL including the query string
    pub url: Url,
    /// Request headers
    pub headers: HeaderMap,
    /// Request body, if any
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    /// Create a request without headers or body.
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: HeaderMap::new(),
            body: None,
        }
    }

    /// Add a header.
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Add a header whose value must not show up in logs or `Debug` output.
    pub(crate) fn with_sensitive_header(self, name: HeaderName, value: &str) -> Result<Self> {
        let mut value = HeaderValue::from_str(value)
            .map_err(|_| Error::InvalidInput(format!("invalid {name} header value")))?;
        value.set_sensitive(true);
        Ok(self.with_header(name, value))
    }

    /// Set the request body.
    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = Some(body);
        self
    }

    /// The `Authorization` header value, if set.
    pub fn authorization(&self) -> Option<&str> {
        self.headers
            .get(reqwest::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
    }
}

/// A raw HTTP response.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// Response status
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// Response body
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Create a response with no headers.
    pub fn new(status: StatusCode, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    /// Create a response carrying a JSON body.
    pub fn json(status: StatusCode, body: &serde_json::Value) -> Self {
        Self::new(status, body.to_string())
    }

    /// Return the body of a successful response, or map the status to an
    /// error.
    pub(crate) fn into_success(self) -> Result<Vec<u8>> {
        let status = self.status;
        if status.is_success() {
            return Ok(self.body);
        }

        let body: serde_json::Value = serde_json::from_slice(&self.body).unwrap_or_default();
        let status_code = status.as_u16();

        match status {
            StatusCode::TOO_MANY_REQUESTS => {
                let retry_after = self
                    .headers
                    .get(RETRY_AFTER)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<u64>().ok())
                    .unwrap_or(60);
                Err(Error::RateLimited {
                    retry_after_secs: retry_after,
                })
            }
            StatusCode::UNAUTHORIZED => Err(Error::Authentication(format!(
                "request unauthorized ({status_code})"
            ))),
            StatusCode::NOT_FOUND => match Error::from_api_response(status_code, body) {
                Error::Api { message, .. } => Err(Error::NotFound(message)),
                other => Err(other),
            },
            _ => Err(Error::from_api_response(status_code, body)),
        }
    }
}

/// A transport that suspends at the network boundary.
#[async_trait]
pub trait AsyncTransport: Send + Sync {
    /// Send `request` and wait for the response.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse>;
}

/// A transport that blocks the calling thread for the round trip.
pub trait BlockingTransport: Send + Sync {
    /// Send `request` and return the response.
    fn send(&self, request: HttpRequest) -> Result<HttpResponse>;
}

#[async_trait]
impl AsyncTransport for reqwest::Client {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let mut builder = self
            .request(request.method, request.url)
            .headers(request.headers);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?.to_vec();

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

impl BlockingTransport for reqwest::blocking::Client {
    fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let mut builder = self
            .request(request.method, request.url)
            .headers(request.headers);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send()?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes()?.to_vec();

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_returns_body() {
        let response = HttpResponse::new(StatusCode::OK, "[]");
        assert_eq!(response.into_success().unwrap(), b"[]");
    }

    #[test]
    fn test_status_mapping() {
        let unauthorized = HttpResponse::new(StatusCode::UNAUTHORIZED, "");
        assert!(unauthorized.into_success().unwrap_err().is_auth_error());

        let not_found = HttpResponse::json(
            StatusCode::NOT_FOUND,
            &serde_json::json!({"message": "no such account"}),
        );
        match not_found.into_success() {
            Err(Error::NotFound(message)) => assert_eq!(message, "no such account"),
            other => panic!("expected NotFound, got {other:?}"),
        }

        let server = HttpResponse::new(StatusCode::BAD_GATEWAY, "<html>");
        match server.into_success() {
            Err(Error::Api { status, .. }) => assert_eq!(status, 502),
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[test]
    fn test_rate_limit_reads_retry_after() {
        let mut response = HttpResponse::new(StatusCode::TOO_MANY_REQUESTS, "");
        response
            .headers
            .insert(RETRY_AFTER, HeaderValue::from_static("12"));
        match response.into_success() {
            Err(Error::RateLimited { retry_after_secs }) => assert_eq!(retry_after_secs, 12),
            other => panic!("expected RateLimited, got {other:?}"),
        }
    }

    #[test]
    fn test_sensitive_header_is_redacted_in_debug() {
        let request = HttpRequest::new(Method::GET, Url::parse("https://example.com").unwrap())
            .with_sensitive_header(reqwest::header::AUTHORIZATION, "Bearer secret-token")
            .unwrap();
        assert_eq!(request.authorization(), Some("Bearer secret-token"));
        assert!(!format!("{request:?}").contains("secret-token"));
    }
}
