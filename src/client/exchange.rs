//! The request/refresh/retry sequence of a single API call.
//!
//! A [`Call`] decides which request goes out next and what to do with each
//! response, but never touches the network. The async and blocking clients
//! drive the same `Call` with their own transport, so token handling and
//! response decoding exist once.
//!
//! A call sends at most one token refresh and retries its request at most
//! once:
//!
//! - access token valid: send the request.
//! - access token expired (or inside the refresh buffer): refresh, then send.
//! - refresh token expired too: fail without sending anything.
//! - request answered 401 before any refresh: refresh, then send again.

use reqwest::StatusCode;

use super::{ClientConfig, HttpRequest, HttpResponse};
use crate::api::{build_request, Endpoint};
use crate::auth::{refresh_expired, Session, TokenState};
use crate::Result;

/// What the driver does next.
#[derive(Debug)]
pub(crate) enum Step<T> {
    /// Send this request and pass the response to [`Call::advance`].
    Send(HttpRequest),
    /// The call is complete.
    Done(T),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Waiting for the token endpoint.
    Refreshing,
    /// Waiting for the endpoint itself.
    Requesting { refreshed: bool },
}

pub(crate) struct Call<'a, E: Endpoint + ?Sized> {
    session: &'a Session,
    config: &'a ClientConfig,
    endpoint: &'a E,
    phase: Phase,
}

impl<'a, E: Endpoint + ?Sized> Call<'a, E> {
    pub(crate) fn new(session: &'a Session, config: &'a ClientConfig, endpoint: &'a E) -> Self {
        Self {
            session,
            config,
            endpoint,
            phase: Phase::Requesting { refreshed: false },
        }
    }

    /// The first request of the call.
    pub(crate) fn start(&mut self) -> Result<HttpRequest> {
        match self
            .session
            .token_state(self.config, self.config.auto_refresh_session)?
        {
            TokenState::Valid(access_token) => self.endpoint_request(&access_token),
            TokenState::AccessExpired => {
                tracing::debug!("access token expired; refreshing before request");
                self.phase = Phase::Refreshing;
                self.session.refresh_request(self.config)
            }
            TokenState::RefreshExpired => Err(refresh_expired()),
        }
    }

    /// Feed the response to the last request sent.
    pub(crate) fn advance(&mut self, response: HttpResponse) -> Result<Step<E::Output>> {
        match self.phase {
            Phase::Refreshing => {
                let tokens = self.session.accept_token_response(self.config, response)?;
                self.phase = Phase::Requesting { refreshed: true };
                Ok(Step::Send(self.endpoint_request(tokens.access_token())?))
            }
            Phase::Requesting { refreshed } => {
                if response.status == StatusCode::UNAUTHORIZED
                    && !refreshed
                    && self.session.can_refresh()
                {
                    tracing::debug!("access token rejected; refreshing and retrying");
                    self.phase = Phase::Refreshing;
                    return Ok(Step::Send(self.session.refresh_request(self.config)?));
                }

                let body = response.into_success()?;
                self.endpoint.parse(&body).map(Step::Done)
            }
        }
    }

    fn endpoint_request(&self, access_token: &str) -> Result<HttpRequest> {
        let request = build_request(self.config, self.endpoint, access_token)?;
        tracing::debug!(method = %request.method, path = request.url.path(), "sending request");
        Ok(request)
    }
}
