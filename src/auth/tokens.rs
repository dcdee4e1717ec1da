//! The access/refresh token pair.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::oauth::TokenResponse;
use crate::{Error, Result};

/// An access/refresh token pair with expiry metadata.
///
/// `Tokens` is immutable: a refresh produces a new value that supersedes
/// the old one. The serialized form is the JSON written by
/// [`LocalTokenStore`](super::LocalTokenStore).
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tokens {
    access_token: String,
    refresh_token: String,
    access_token_expires_at: DateTime<Utc>,
    refresh_token_expires_at: DateTime<Utc>,
    #[serde(default = "default_token_type")]
    token_type: String,
    #[serde(default)]
    scope: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id_token: Option<String>,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

impl Tokens {
    /// Create a token pair from known values.
    pub fn new(
        access_token: impl Into<String>,
        refresh_token: impl Into<String>,
        access_token_expires_at: DateTime<Utc>,
        refresh_token_expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
            access_token_expires_at,
            refresh_token_expires_at,
            token_type: default_token_type(),
            scope: None,
            id_token: None,
        }
    }

    /// Build tokens from a token endpoint response received at `issued_at`.
    ///
    /// The access token expires `expires_in` seconds after issuance. The
    /// server does not report the refresh token's lifetime: when `previous`
    /// holds the same refresh token its expiry is carried over, otherwise
    /// the refresh token expires `refresh_lifetime` after issuance.
    pub(crate) fn from_response(
        response: TokenResponse,
        issued_at: DateTime<Utc>,
        refresh_lifetime: Duration,
        previous: Option<&Tokens>,
    ) -> Result<Self> {
        let refresh_token_expires_at = match previous {
            Some(prev) if prev.refresh_token == response.refresh_token => {
                prev.refresh_token_expires_at
            }
            _ => issued_at.checked_add_signed(refresh_lifetime).ok_or_else(|| {
                Error::validation("TokenResponse", "refresh token lifetime out of range")
            })?,
        };

        let access_token_expires_at = Duration::try_seconds(response.expires_in)
            .and_then(|lifetime| issued_at.checked_add_signed(lifetime))
            .ok_or_else(|| {
                Error::validation(
                    "TokenResponse",
                    format!("expires_in out of range: {}", response.expires_in),
                )
            })?;

        Ok(Self {
            access_token: response.access_token,
            refresh_token: response.refresh_token,
            access_token_expires_at,
            refresh_token_expires_at,
            token_type: response.token_type,
            scope: response.scope,
            id_token: response.id_token,
        })
    }

    /// The bearer token for API requests.
    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    /// The token used to obtain new access tokens.
    pub fn refresh_token(&self) -> &str {
        &self.refresh_token
    }

    /// When the access token expires.
    pub fn access_token_expires_at(&self) -> DateTime<Utc> {
        self.access_token_expires_at
    }

    /// When the refresh token expires.
    pub fn refresh_token_expires_at(&self) -> DateTime<Utc> {
        self.refresh_token_expires_at
    }

    /// Token type reported by the server, normally `"Bearer"`.
    pub fn token_type(&self) -> &str {
        &self.token_type
    }

    /// Granted scope, if reported.
    pub fn scope(&self) -> Option<&str> {
        self.scope.as_deref()
    }

    /// OpenID identity token, if issued.
    pub fn id_token(&self) -> Option<&str> {
        self.id_token.as_deref()
    }

    /// Check if the access token has expired.
    pub fn is_access_token_expired(&self) -> bool {
        Utc::now() >= self.access_token_expires_at
    }

    /// Check if the refresh token has expired.
    pub fn is_refresh_token_expired(&self) -> bool {
        Utc::now() >= self.refresh_token_expires_at
    }

    /// Check if the access token will expire within the given buffer period.
    pub fn access_token_expires_within(&self, buffer: Duration) -> bool {
        Utc::now()
            .checked_add_signed(buffer)
            .map_or(true, |deadline| deadline >= self.access_token_expires_at)
    }
}

impl std::fmt::Debug for Tokens {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tokens")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .field("access_token_expires_at", &self.access_token_expires_at)
            .field("refresh_token_expires_at", &self.refresh_token_expires_at)
            .field("token_type", &self.token_type)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(refresh_token: &str) -> TokenResponse {
        TokenResponse {
            access_token: "new-access".to_string(),
            refresh_token: refresh_token.to_string(),
            expires_in: 1800,
            token_type: "Bearer".to_string(),
            scope: Some("api".to_string()),
            id_token: None,
        }
    }

    #[test]
    fn test_expiry_checks() {
        let now = Utc::now();
        let tokens = Tokens::new(
            "a",
            "r",
            now - Duration::seconds(1),
            now + Duration::days(7),
        );
        assert!(tokens.is_access_token_expired());
        assert!(!tokens.is_refresh_token_expired());

        let fresh = Tokens::new("a", "r", now + Duration::minutes(30), now + Duration::days(7));
        assert!(!fresh.is_access_token_expired());
        assert!(fresh.access_token_expires_within(Duration::hours(1)));
        assert!(!fresh.access_token_expires_within(Duration::seconds(60)));
    }

    #[test]
    fn test_from_response_derives_expiry_from_issuance() {
        let issued_at = Utc::now();
        let tokens =
            Tokens::from_response(response("refresh"), issued_at, Duration::days(7), None).unwrap();

        assert_eq!(tokens.access_token(), "new-access");
        assert_eq!(tokens.access_token_expires_at(), issued_at + Duration::seconds(1800));
        assert_eq!(tokens.refresh_token_expires_at(), issued_at + Duration::days(7));
        assert_eq!(tokens.scope(), Some("api"));
    }

    #[test]
    fn test_from_response_keeps_refresh_expiry_for_same_token() {
        let issued_at = Utc::now();
        let original_expiry = issued_at + Duration::days(2);
        let previous = Tokens::new("old", "refresh", issued_at, original_expiry);

        let same = Tokens::from_response(
            response("refresh"),
            issued_at,
            Duration::days(7),
            Some(&previous),
        )
        .unwrap();
        assert_eq!(same.refresh_token_expires_at(), original_expiry);

        let rotated = Tokens::from_response(
            response("rotated"),
            issued_at,
            Duration::days(7),
            Some(&previous),
        )
        .unwrap();
        assert_eq!(rotated.refresh_token_expires_at(), issued_at + Duration::days(7));
    }

    #[test]
    fn test_from_response_rejects_out_of_range_lifetimes() {
        let issued_at = Utc::now();

        let mut huge = response("refresh");
        huge.expires_in = 9_000_000_000_000_000;
        match Tokens::from_response(huge, issued_at, Duration::days(7), None) {
            Err(Error::Validation { model, message }) => {
                assert_eq!(model, "TokenResponse");
                assert!(message.contains("expires_in"), "{message}");
            }
            other => panic!("expected Validation, got {other:?}"),
        }

        let mut negative = response("refresh");
        negative.expires_in = i64::MIN;
        assert!(Tokens::from_response(negative, issued_at, Duration::days(7), None).is_err());

        assert!(Tokens::from_response(response("refresh"), issued_at, Duration::MAX, None).is_err());
    }

    #[test]
    fn test_expires_within_huge_buffer() {
        let now = Utc::now();
        let tokens = Tokens::new("a", "r", now + Duration::minutes(30), now + Duration::days(7));
        assert!(tokens.access_token_expires_within(Duration::MAX));
    }

    #[test]
    fn test_json_roundtrip() {
        let now = Utc::now();
        let tokens = Tokens::new("a", "r", now, now + Duration::days(7));
        let json = serde_json::to_string(&tokens).unwrap();
        let parsed: Tokens = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, tokens);
    }

    #[test]
    fn test_debug_redacts_tokens() {
        let now = Utc::now();
        let tokens = Tokens::new("super-secret-access", "super-secret-refresh", now, now);
        let debug_str = format!("{tokens:?}");
        assert!(!debug_str.contains("super-secret"));
        assert!(debug_str.contains("REDACTED"));
    }
}
