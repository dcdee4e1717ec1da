//! OAuth2 grant requests against the authorization server.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::header::{HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use url::Url;

use crate::client::{HttpRequest, HttpResponse};
use crate::{Error, Result};

/// Application credentials registered with the developer portal.
#[derive(Clone)]
pub struct Credentials {
    app_client_id: String,
    app_secret: SecretString,
    redirect_uri: String,
}

impl Credentials {
    /// Create credentials for the app identified by `app_client_id`.
    ///
    /// `redirect_uri` must match the callback URL registered for the app.
    pub fn new(
        app_client_id: impl Into<String>,
        app_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Self {
            app_client_id: app_client_id.into(),
            app_secret: SecretString::from(app_secret.into()),
            redirect_uri: redirect_uri.into(),
        }
    }

    /// The app's client id.
    pub fn app_client_id(&self) -> &str {
        &self.app_client_id
    }

    /// The registered callback URL.
    pub fn redirect_uri(&self) -> &str {
        &self.redirect_uri
    }

    fn basic_auth(&self) -> String {
        let pair = format!("{}:{}", self.app_client_id, self.app_secret.expose_secret());
        format!("Basic {}", STANDARD.encode(pair))
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("app_client_id", &self.app_client_id)
            .field("app_secret", &"[REDACTED]")
            .field("redirect_uri", &self.redirect_uri)
            .finish()
    }
}

/// Grant presented to the token endpoint.
pub(crate) enum Grant<'a> {
    AuthorizationCode(&'a str),
    RefreshToken(&'a str),
}

#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
    #[serde(default = "bearer")]
    pub token_type: String,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub id_token: Option<String>,
}

fn bearer() -> String {
    "Bearer".to_string()
}

/// URL the user visits to authorize the app.
pub(crate) fn authorize_url(oauth_base: &Url, credentials: &Credentials) -> Result<Url> {
    let mut url = oauth_base.join("authorize")?;
    url.query_pairs_mut()
        .append_pair("client_id", &credentials.app_client_id)
        .append_pair("redirect_uri", &credentials.redirect_uri);
    Ok(url)
}

/// Build the token endpoint request for `grant`.
pub(crate) fn token_request(
    oauth_base: &Url,
    credentials: &Credentials,
    grant: Grant<'_>,
) -> Result<HttpRequest> {
    let form = match grant {
        Grant::AuthorizationCode(code) => serde_urlencoded::to_string([
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", credentials.redirect_uri.as_str()),
        ]),
        Grant::RefreshToken(refresh_token) => serde_urlencoded::to_string([
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
        ]),
    }
    .map_err(|e| Error::InvalidInput(format!("cannot encode token request: {e}")))?;

    HttpRequest::new(Method::POST, oauth_base.join("token")?)
        .with_header(
            CONTENT_TYPE,
            HeaderValue::from_static("application/x-www-form-urlencoded"),
        )
        .with_header(ACCEPT, HeaderValue::from_static("application/json"))
        .with_sensitive_header(AUTHORIZATION, &credentials.basic_auth())
        .map(|request| request.with_body(form.into_bytes()))
}

/// Interpret the token endpoint's answer.
///
/// Any rejection is an authentication failure; the caller must not retry.
pub(crate) fn parse_token_response(response: HttpResponse) -> Result<TokenResponse> {
    let status = response.status;
    let body = response.into_success().map_err(|err| match err {
        Error::Api { message, .. } | Error::NotFound(message) => {
            Error::Authentication(format!("token endpoint rejected grant ({status}): {message}"))
        }
        Error::Authentication(message) => Error::Authentication(message),
        other => other,
    })?;

    serde_json::from_slice(&body)
        .map_err(|e| Error::validation("TokenResponse", e.to_string()))
}
