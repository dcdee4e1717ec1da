//! Async client for the Schwab API.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use url::Url;

use crate::api::{
    Endpoint, GetAccountNumbers, GetAccounts, GetOptionChain, GetOptionExpirations, GetOrders,
    GetSingleAccount, OptionChainQuery,
};
use crate::auth::{Session, Tokens};
use crate::models::{
    AccountHash, AccountNumberWithHashId, OptionChain, OptionExpiration, Order, OrderStatus,
    SecuritiesAccount, Symbol,
};
use crate::Result;

use super::config::ClientConfig;
use super::exchange::{Call, Step};
use super::transport::AsyncTransport;

/// The async client for the Schwab trader and market data APIs.
///
/// Every call checks the session's access token first and refreshes it
/// when it has expired, or is about to. A request rejected with 401 is
/// refreshed and retried once. New tokens are written to the session's
/// store as soon as they arrive.
///
/// The client is cheap to clone; clones share the transport and session.
///
/// # Example
///
/// ```no_run
/// use schwab_rs::{ClientConfig, Credentials, LocalTokenStore, SchwabClient, Session};
///
/// # async fn example() -> schwab_rs::Result<()> {
/// let session = Session::new(
///     Credentials::new("app-id", "app-secret", "https://127.0.0.1"),
///     LocalTokenStore::new("schwab_tokens.json"),
/// );
/// let client = SchwabClient::new(session, ClientConfig::default())?;
///
/// for entry in client.get_account_numbers().await? {
///     let account = client.get_single_account(&entry.hash(), true).await?;
///     println!("{}: {} positions", entry.account_number, account.positions().len());
/// }
/// # Ok(())
/// # }
/// ```
pub struct SchwabClient<T = reqwest::Client> {
    inner: Arc<ClientInner<T>>,
}

struct ClientInner<T> {
    transport: T,
    session: Session,
    config: ClientConfig,
}

impl<T> Clone for SchwabClient<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl SchwabClient<reqwest::Client> {
    /// Create a client backed by `reqwest`.
    pub fn new(session: Session, config: ClientConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()?;
        Ok(Self::with_transport(http, session, config))
    }
}

impl<T: AsyncTransport> SchwabClient<T> {
    /// Create a client that sends its requests through `transport`.
    pub fn with_transport(transport: T, session: Session, config: ClientConfig) -> Self {
        Self {
            inner: Arc::new(ClientInner {
                transport,
                session,
                config,
            }),
        }
    }

    /// Run one endpoint, refreshing the access token as needed.
    pub async fn execute<E>(&self, endpoint: &E) -> Result<E::Output>
    where
        E: Endpoint + Sync + ?Sized,
    {
        let inner = &*self.inner;
        let mut call = Call::new(&inner.session, &inner.config, endpoint);
        let mut request = call.start()?;
        loop {
            let response = inner.transport.send(request).await?;
            match call.advance(response)? {
                Step::Send(next) => request = next,
                Step::Done(output) => return Ok(output),
            }
        }
    }

    /// Plaintext account numbers and the hashes used to address them.
    pub async fn get_account_numbers(&self) -> Result<Vec<AccountNumberWithHashId>> {
        self.execute(&GetAccountNumbers).await
    }

    /// All linked accounts.
    pub async fn get_accounts(&self, include_positions: bool) -> Result<Vec<SecuritiesAccount>> {
        self.execute(&GetAccounts { include_positions }).await
    }

    /// One account by hash.
    pub async fn get_single_account(
        &self,
        account_hash: &AccountHash,
        include_positions: bool,
    ) -> Result<SecuritiesAccount> {
        self.execute(&GetSingleAccount {
            account_hash: account_hash.clone(),
            include_positions,
        })
        .await
    }

    /// Orders of an account entered between `from` and `to` with `status`.
    pub async fn get_orders(
        &self,
        account_hash: &AccountHash,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        status: OrderStatus,
    ) -> Result<Vec<Order>> {
        self.execute(&GetOrders {
            account_hash: account_hash.clone(),
            from_entered_time: from,
            to_entered_time: to,
            status,
            max_results: None,
        })
        .await
    }

    /// Both sides of the option chain of `symbol` expiring between the two
    /// dates.
    pub async fn download_option_chain(
        &self,
        symbol: impl Into<Symbol>,
        from_date: NaiveDate,
        to_date: NaiveDate,
    ) -> Result<OptionChain> {
        let query = OptionChainQuery::new(symbol)
            .from_date(from_date)
            .to_date(to_date);
        self.download_option_chain_with(query).await
    }

    /// An option chain with full control over the query.
    pub async fn download_option_chain_with(&self, query: OptionChainQuery) -> Result<OptionChain> {
        self.execute(&GetOptionChain { query }).await
    }

    /// Listed expirations of `symbol`.
    pub async fn get_option_expirations(
        &self,
        symbol: impl Into<Symbol>,
    ) -> Result<Vec<OptionExpiration>> {
        self.execute(&GetOptionExpirations {
            symbol: symbol.into(),
        })
        .await
    }

    /// Refresh the access token now.
    pub async fn refresh_tokens(&self) -> Result<Tokens> {
        let inner = &*self.inner;
        let request = inner.session.refresh_request(&inner.config)?;
        let response = inner.transport.send(request).await?;
        inner.session.accept_token_response(&inner.config, response)
    }

    /// Exchange the `code` from the authorization redirect for a token pair.
    pub async fn exchange_authorization_code(&self, code: &str) -> Result<Tokens> {
        let inner = &*self.inner;
        let request = inner.session.code_exchange_request(&inner.config, code)?;
        let response = inner.transport.send(request).await?;
        inner.session.accept_token_response(&inner.config, response)
    }

    /// URL the user visits to authorize the app.
    pub fn authorize_url(&self) -> Result<Url> {
        self.inner.session.authorize_url(&self.inner.config)
    }
}

impl<T> SchwabClient<T> {
    /// The session backing this client.
    pub fn session(&self) -> &Session {
        &self.inner.session
    }

    /// The client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// The current token pair, if any.
    pub fn tokens(&self) -> Option<Tokens> {
        self.inner.session.tokens()
    }
}

impl<T> std::fmt::Debug for SchwabClient<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchwabClient")
            .field("session", &self.inner.session)
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}
