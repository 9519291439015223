//! Endpoint-bound bearer credentials.

use std::fmt;

use chrono::{DateTime, TimeZone, Utc};
use notestore_models::{AuthenticationResult, User};

use crate::error::StoreError;

/// A bearer token together with the one endpoint it is valid for.
///
/// Credentials are immutable snapshots: refreshing produces a new value
/// instead of changing an existing one.  The token is never printed by
/// `Debug`.
///
/// * `token`    – bearer token presented on every call.
/// * `endpoint` – content endpoint the token was issued for.
/// * `expires_at` – end of the validity window, when the store reported one.
#[derive(Clone, PartialEq)]
pub struct Credential {
    token: String,
    endpoint: String,
    expires_at: Option<DateTime<Utc>>,
    web_api_url_prefix: Option<String>,
    second_factor_required: bool,
    user: Option<User>,
}

impl Credential {
    /// Pair a token with an endpoint, without expiry information.
    pub fn new(token: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            endpoint: endpoint.into(),
            expires_at: None,
            web_api_url_prefix: None,
            second_factor_required: false,
            user: None,
        }
    }

    /// Set the end of the validity window.
    #[must_use]
    pub fn with_expiration(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// Build a credential from an authentication result that names its own
    /// content endpoint.
    pub fn from_authentication(result: &AuthenticationResult) -> Result<Self, StoreError> {
        let endpoint = result
            .note_store_url
            .as_deref()
            .ok_or(StoreError::MissingField("AuthenticationResult.noteStoreUrl"))?;
        Self::bind(result, endpoint)
    }

    /// Build a credential from an authentication result, falling back to
    /// `endpoint` when the result does not name one.
    ///
    /// Share-key exchanges answer with a token for the endpoint they ran
    /// against and usually leave `note_store_url` empty.
    pub fn bind(result: &AuthenticationResult, endpoint: &str) -> Result<Self, StoreError> {
        if result.authentication_token.is_empty() {
            return Err(StoreError::MissingField(
                "AuthenticationResult.authenticationToken",
            ));
        }
        let endpoint = result.note_store_url.as_deref().unwrap_or(endpoint);
        let expires_at = (result.expiration > 0)
            .then(|| Utc.timestamp_millis_opt(result.expiration).single())
            .flatten();

        Ok(Self {
            token: result.authentication_token.clone(),
            endpoint: endpoint.to_string(),
            expires_at,
            web_api_url_prefix: result.web_api_url_prefix.clone(),
            second_factor_required: result.second_factor_required.unwrap_or(false),
            user: result.user.clone(),
        })
    }

    /// The bearer token.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// The endpoint this credential may be presented to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// End of the validity window, if known.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    /// Whether the validity window has passed.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Whether the validity window has passed at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }

    /// Web API prefix matching the endpoint, if reported.
    pub fn web_api_url_prefix(&self) -> Option<&str> {
        self.web_api_url_prefix.as_deref()
    }

    /// Whether the token was issued pending a second factor.
    pub fn second_factor_required(&self) -> bool {
        self.second_factor_required
    }

    /// Profile of the account the token was issued to, if reported.
    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("token", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .field("expires_at", &self.expires_at)
            .field("second_factor_required", &self.second_factor_required)
            .finish_non_exhaustive()
    }
}
