//! Session state shared by the clients.

use std::sync::{Arc, PoisonError, RwLock};

use chrono::Utc;
use url::Url;

use super::oauth::{self, Credentials, Grant};
use super::{TokenStore, Tokens};
use crate::client::{ClientConfig, HttpRequest, HttpResponse};
use crate::{Error, Result};

/// Authentication session for the Schwab API.
///
/// The session owns the app credentials, the current token pair and the
/// store the pair is persisted to. It performs no I/O on the network
/// itself: the clients send the requests it builds and hand back the
/// responses.
///
/// # Thread Safety
///
/// `Session` is cheap to clone and clones share the same token pair, so
/// one session can back an async and a blocking client at once. Refreshes
/// from concurrent calls are not coordinated; the last refresh wins.
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    credentials: Credentials,
    store: Box<dyn TokenStore>,
    tokens: RwLock<Option<Tokens>>,
}

/// What a call has to do before its request can be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TokenState {
    /// The access token can be used as is.
    Valid(String),
    /// The access token must be refreshed first.
    AccessExpired,
    /// Both tokens are expired; the user must authorize again.
    RefreshExpired,
}

impl Session {
    /// Create a session, loading any tokens previously saved in `store`.
    pub fn new(credentials: Credentials, store: impl TokenStore + 'static) -> Self {
        let tokens = store.load_tokens();
        if tokens.is_none() {
            tracing::debug!("no stored tokens; authorization code exchange required");
        }
        Self::from_parts(credentials, Box::new(store), tokens)
    }

    /// Create a session with a known token pair.
    ///
    /// The pair is not written to `store` until it is superseded.
    pub fn with_tokens(
        credentials: Credentials,
        store: impl TokenStore + 'static,
        tokens: Tokens,
    ) -> Self {
        Self::from_parts(credentials, Box::new(store), Some(tokens))
    }

    fn from_parts(
        credentials: Credentials,
        store: Box<dyn TokenStore>,
        tokens: Option<Tokens>,
    ) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                credentials,
                store,
                tokens: RwLock::new(tokens),
            }),
        }
    }

    /// The current token pair, if any.
    pub fn tokens(&self) -> Option<Tokens> {
        self.inner
            .tokens
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The app credentials.
    pub fn credentials(&self) -> &Credentials {
        &self.inner.credentials
    }

    /// URL the user visits to authorize the app and obtain a code for
    /// [`exchange_authorization_code`](crate::SchwabClient::exchange_authorization_code).
    pub fn authorize_url(&self, config: &ClientConfig) -> Result<Url> {
        oauth::authorize_url(&config.endpoints.oauth, &self.inner.credentials)
    }

    /// Decide whether the current access token can be used.
    ///
    /// With `refresh_early` set, a token expiring within `config`'s buffer
    /// counts as expired.
    pub(crate) fn token_state(&self, config: &ClientConfig, refresh_early: bool) -> Result<TokenState> {
        let guard = self.inner.tokens.read().unwrap_or_else(PoisonError::into_inner);
        let tokens = guard.as_ref().ok_or_else(|| {
            Error::Authentication("no tokens available; authorize the app first".to_string())
        })?;

        let access_expired = if refresh_early {
            tokens.access_token_expires_within(config.refresh_buffer())
        } else {
            tokens.is_access_token_expired()
        };

        Ok(if !access_expired {
            TokenState::Valid(tokens.access_token().to_string())
        } else if tokens.is_refresh_token_expired() {
            TokenState::RefreshExpired
        } else {
            TokenState::AccessExpired
        })
    }

    /// Returns `true` if the refresh token is present and not expired.
    pub(crate) fn can_refresh(&self) -> bool {
        self.inner
            .tokens
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|tokens| !tokens.is_refresh_token_expired())
    }

    /// Build the token refresh request.
    pub(crate) fn refresh_request(&self, config: &ClientConfig) -> Result<HttpRequest> {
        let guard = self.inner.tokens.read().unwrap_or_else(PoisonError::into_inner);
        let tokens = guard.as_ref().ok_or_else(|| {
            Error::Authentication("no refresh token available; authorize the app first".to_string())
        })?;
        if tokens.is_refresh_token_expired() {
            return Err(refresh_expired());
        }

        oauth::token_request(
            &config.endpoints.oauth,
            &self.inner.credentials,
            Grant::RefreshToken(tokens.refresh_token()),
        )
    }

    /// Build the authorization code exchange request.
    pub(crate) fn code_exchange_request(&self, config: &ClientConfig, code: &str) -> Result<HttpRequest> {
        if code.is_empty() {
            return Err(Error::InvalidInput("authorization code is empty".to_string()));
        }
        oauth::token_request(
            &config.endpoints.oauth,
            &self.inner.credentials,
            Grant::AuthorizationCode(code),
        )
    }

    /// Turn a token endpoint response into the new token pair, persist it
    /// and make it current.
    ///
    /// The new pair is installed even if persisting it fails; the store
    /// error is still returned.
    pub(crate) fn accept_token_response(
        &self,
        config: &ClientConfig,
        response: HttpResponse,
    ) -> Result<Tokens> {
        let issued_at = Utc::now();
        let token_response = oauth::parse_token_response(response)?;

        let tokens = {
            let mut guard = self.inner.tokens.write().unwrap_or_else(PoisonError::into_inner);
            let tokens = Tokens::from_response(
                token_response,
                issued_at,
                config.refresh_token_lifetime,
                guard.as_ref(),
            )?;
            *guard = Some(tokens.clone());
            tokens
        };

        self.inner.store.save_tokens(&tokens)?;
        tracing::info!(
            access_token_expires_at = %tokens.access_token_expires_at(),
            refresh_token_expires_at = %tokens.refresh_token_expires_at(),
            "obtained new access token"
        );
        Ok(tokens)
    }
}

pub(crate) fn refresh_expired() -> Error {
    Error::Authentication("refresh token expired; authorize the app again".to_string())
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("credentials", &self.inner.credentials)
            .field("tokens", &self.tokens())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::LocalTokenStore;
    use chrono::Duration;
    use reqwest::StatusCode;

    fn credentials() -> Credentials {
        Credentials::new("fake_id", "fake_secret", "https://127.0.0.1")
    }

    fn tokens(access_in: Duration, refresh_in: Duration) -> Tokens {
        let now = Utc::now();
        Tokens::new("access", "refresh", now + access_in, now + refresh_in)
    }

    fn token_response() -> HttpResponse {
        HttpResponse::json(
            StatusCode::OK,
            &serde_json::json!({
                "expires_in": 1800,
                "token_type": "Bearer",
                "scope": "api",
                "refresh_token": "refresh",
                "access_token": "new-access"
            }),
        )
    }

    #[test]
    fn test_token_state() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalTokenStore::new(dir.path().join("tokens.json"));
        let config = ClientConfig::default();

        let valid = Session::with_tokens(
            credentials(),
            store.clone(),
            tokens(Duration::minutes(30), Duration::days(7)),
        );
        assert_eq!(
            valid.token_state(&config, true).unwrap(),
            TokenState::Valid("access".to_string())
        );

        let expiring = Session::with_tokens(
            credentials(),
            store.clone(),
            tokens(Duration::seconds(30), Duration::days(7)),
        );
        assert_eq!(expiring.token_state(&config, true).unwrap(), TokenState::AccessExpired);
        assert!(matches!(
            expiring.token_state(&config, false).unwrap(),
            TokenState::Valid(_)
        ));

        let dead = Session::with_tokens(
            credentials(),
            store,
            tokens(-Duration::hours(1), -Duration::minutes(1)),
        );
        assert_eq!(dead.token_state(&config, true).unwrap(), TokenState::RefreshExpired);
        assert!(!dead.can_refresh());
        assert!(dead.refresh_request(&config).unwrap_err().is_auth_error());
    }

    #[test]
    fn test_no_tokens_is_authentication_error() {
        let dir = tempfile::tempdir().unwrap();
        let session = Session::new(credentials(), LocalTokenStore::new(dir.path().join("t.json")));
        assert!(session.tokens().is_none());
        assert!(session
            .token_state(&ClientConfig::default(), true)
            .unwrap_err()
            .is_auth_error());
    }

    #[test]
    fn test_new_loads_stored_tokens() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalTokenStore::new(dir.path().join("tokens.json"));
        let stored = tokens(Duration::minutes(30), Duration::days(7));
        store.save_tokens(&stored).unwrap();

        let session = Session::new(credentials(), store);
        assert_eq!(session.tokens(), Some(stored));
    }

    #[test]
    fn test_accept_token_response_persists_and_installs() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalTokenStore::new(dir.path().join("tokens.json"));
        let original = tokens(-Duration::minutes(1), Duration::days(3));
        let session = Session::with_tokens(credentials(), store.clone(), original.clone());

        let new_tokens = session
            .accept_token_response(&ClientConfig::default(), token_response())
            .unwrap();

        assert_eq!(new_tokens.access_token(), "new-access");
        assert_eq!(
            new_tokens.refresh_token_expires_at(),
            original.refresh_token_expires_at()
        );
        assert_eq!(session.tokens(), Some(new_tokens.clone()));
        assert_eq!(store.load_tokens(), Some(new_tokens));
    }

    #[test]
    fn test_clones_share_tokens() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalTokenStore::new(dir.path().join("tokens.json"));
        let session = Session::with_tokens(
            credentials(),
            store,
            tokens(-Duration::minutes(1), Duration::days(3)),
        );
        let clone = session.clone();

        session
            .accept_token_response(&ClientConfig::default(), token_response())
            .unwrap();
        assert_eq!(clone.tokens().unwrap().access_token(), "new-access");
    }

    #[test]
    fn test_empty_code_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let session = Session::new(credentials(), LocalTokenStore::new(dir.path().join("t.json")));
        assert!(matches!(
            session.code_exchange_request(&ClientConfig::default(), ""),
            Err(Error::InvalidInput(_))
        ));
    }
}
