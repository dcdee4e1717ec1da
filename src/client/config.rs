//! Client configuration options.

use std::time::Duration;

use url::Url;

use crate::Result;

/// Production trader API base URL.
pub const TRADER_API_URL: &str = "https://api.schwabapi.com/trader/v1/";
/// Production market data API base URL.
pub const MARKET_DATA_API_URL: &str = "https://api.schwabapi.com/marketdata/v1/";
/// Production OAuth base URL.
pub const OAUTH_URL: &str = "https://api.schwabapi.com/v1/oauth/";

/// Base URLs of the API services.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiEndpoints {
    /// Trader API (accounts, orders)
    pub trader: Url,
    /// Market data API (option chains, expirations)
    pub market_data: Url,
    /// OAuth authorization and token endpoints
    pub oauth: Url,
}

impl ApiEndpoints {
    /// Create endpoints from explicit base URLs.
    ///
    /// A trailing slash is added where missing so that relative paths
    /// append instead of replacing the last segment.
    pub fn new(trader: &str, market_data: &str, oauth: &str) -> Result<Self> {
        Ok(Self {
            trader: parse_base(trader)?,
            market_data: parse_base(market_data)?,
            oauth: parse_base(oauth)?,
        })
    }

    /// Point every service at one host, e.g. a local mock server, using the
    /// production path layout.
    pub fn with_host(host: &str) -> Result<Self> {
        let host = host.trim_end_matches('/');
        Self::new(
            &format!("{host}/trader/v1"),
            &format!("{host}/marketdata/v1"),
            &format!("{host}/v1/oauth"),
        )
    }
}

impl Default for ApiEndpoints {
    fn default() -> Self {
        Self {
            trader: Url::parse(TRADER_API_URL).expect("valid trader URL"),
            market_data: Url::parse(MARKET_DATA_API_URL).expect("valid market data URL"),
            oauth: Url::parse(OAUTH_URL).expect("valid OAuth URL"),
        }
    }
}

fn parse_base(url: &str) -> Result<Url> {
    if url.ends_with('/') {
        Ok(Url::parse(url)?)
    } else {
        Ok(Url::parse(&format!("{url}/"))?)
    }
}

/// Configuration for the Schwab clients.
///
/// # Example
///
/// ```
/// use schwab_rs::ClientConfig;
/// use std::time::Duration;
///
/// let config = ClientConfig::default()
///     .with_timeout(Duration::from_secs(60))
///     .with_user_agent("my-app/1.0");
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Request timeout
    pub timeout: Duration,
    /// User-Agent header value
    pub user_agent: String,
    /// Service base URLs
    pub endpoints: ApiEndpoints,
    /// Whether to refresh an expiring access token before a request
    pub auto_refresh_session: bool,
    /// Buffer time (in seconds) before expiry to refresh
    pub refresh_buffer_secs: i64,
    /// Lifetime assumed for newly issued refresh tokens
    pub refresh_token_lifetime: chrono::Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: format!("schwab-rs/{} (Rust)", env!("CARGO_PKG_VERSION")),
            endpoints: ApiEndpoints::default(),
            auto_refresh_session: true,
            refresh_buffer_secs: 60,
            refresh_token_lifetime: chrono::Duration::days(7),
        }
    }
}

impl ClientConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the User-Agent header.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Use different service base URLs.
    pub fn with_endpoints(mut self, endpoints: ApiEndpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// Enable or disable refreshing before a request.
    ///
    /// When disabled, the access token is no longer refreshed early inside
    /// the refresh buffer. A token that has already expired is still
    /// refreshed before the request.
    pub fn with_auto_refresh(mut self, enabled: bool) -> Self {
        self.auto_refresh_session = enabled;
        self
    }

    /// Set the buffer time before expiry to refresh.
    pub fn with_refresh_buffer(mut self, secs: i64) -> Self {
        self.refresh_buffer_secs = secs;
        self
    }

    /// Set the lifetime assumed for newly issued refresh tokens.
    pub fn with_refresh_token_lifetime(mut self, lifetime: chrono::Duration) -> Self {
        self.refresh_token_lifetime = lifetime;
        self
    }

    pub(crate) fn refresh_buffer(&self) -> chrono::Duration {
        chrono::Duration::try_seconds(self.refresh_buffer_secs.max(0))
            .unwrap_or(chrono::Duration::MAX)
    }
}
