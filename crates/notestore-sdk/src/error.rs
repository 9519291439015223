//! SDK error types.
//!
//! [`StoreError`] is the single error type returned by every fallible
//! operation in the SDK.  Faults reported by a remote store are mapped onto
//! the taxonomy below without losing their detail; the remaining variants
//! cover failures this layer introduces itself (routing, configuration,
//! encoding).
//!
//! The type is `Clone` so that every caller waiting on a shared linked-store
//! resolution receives the same error.

use std::time::Duration;

use notestore_models::{EdamErrorCode, RpcFault};

/// Why an authentication-related call was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthErrorKind {
    /// Wrong identity/secret, or an unknown or revoked token.
    InvalidCredentials,
    /// The token's validity window has passed.
    ExpiredCredential,
    /// The account needs a second factor the caller did not supply.
    TwoFactorRequired,
    /// A share key could not be exchanged for a notebook credential.
    ShareKeyInvalid,
    /// The credential is valid but does not grant this operation.
    PermissionDenied,
}

impl std::fmt::Display for AuthErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::InvalidCredentials => "invalid credentials",
            Self::ExpiredCredential => "expired credential",
            Self::TwoFactorRequired => "two-factor authentication required",
            Self::ShareKeyInvalid => "invalid share key",
            Self::PermissionDenied => "permission denied",
        };
        f.write_str(label)
    }
}

/// Error type for all SDK operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StoreError {
    /// Authentication failure: bad or expired credential, missing second
    /// factor, or unusable share key.
    #[error("authentication failed: {kind}")]
    Auth {
        /// Failure category.
        kind: AuthErrorKind,
        /// Parameter the store blamed, if any.
        parameter: Option<String>,
    },

    /// The referenced object does not exist or is no longer shared.
    #[error("not found: {}", .identifier.as_deref().unwrap_or("<unknown>"))]
    NotFound {
        /// Name of the identifying field.
        identifier: Option<String>,
        /// The value that could not be found.
        key: Option<String>,
    },

    /// The store rejected the caller's input (malformed, over quota, or not
    /// permitted).
    #[error("validation failed: {code} on {}", .parameter.as_deref().unwrap_or("<none>"))]
    Validation {
        /// Reason code reported by the store.
        code: EdamErrorCode,
        /// Offending parameter, if named.
        parameter: Option<String>,
    },

    /// The store failed on its side, possibly asking the caller to back off.
    #[error("service error: {code}")]
    Service {
        /// Failure category.
        code: EdamErrorCode,
        /// Detail provided by the store.
        message: Option<String>,
        /// How long to wait before retrying, when rate limited.
        retry_after: Option<Duration>,
    },

    /// The transport could not complete the call.
    #[error("transport error: {0}")]
    Transport(String),

    /// A credential was paired with a stub bound to a different endpoint.
    #[error("credential for {credential} used against endpoint {stub}")]
    EndpointMismatch {
        /// Endpoint the credential is bound to.
        credential: String,
        /// Endpoint the stub is bound to.
        stub: String,
    },

    /// A linked notebook reference carries too little to reach its store.
    #[error("linked notebook cannot be resolved: {0}")]
    UnresolvableLinkedNotebook(String),

    /// A store response lacked a field this layer relies on.
    #[error("missing field in store response: {0}")]
    MissingField(&'static str),

    /// The service does not accept this client's protocol version.
    #[error("protocol version {major}.{minor} is not supported by the service")]
    UnsupportedVersion {
        /// Major version offered.
        major: i16,
        /// Minor version offered.
        minor: i16,
    },

    /// Invalid or missing configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// Request or response (de)serialisation failure.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl StoreError {
    /// Shorthand for an [`StoreError::Auth`] without a parameter.
    pub fn auth(kind: AuthErrorKind) -> Self {
        Self::Auth {
            kind,
            parameter: None,
        }
    }

    /// The authentication failure category, if this is an auth error.
    pub fn auth_kind(&self) -> Option<AuthErrorKind> {
        match self {
            Self::Auth { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// Whether this is a [`StoreError::NotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Re-tag a failure of a share-key exchange.
    ///
    /// "Not found" means the notebook is no longer shared and is kept as is;
    /// every other rejection of the exchange itself becomes
    /// [`AuthErrorKind::ShareKeyInvalid`].  Transport and service failures
    /// pass through unchanged.
    pub(crate) fn into_share_key_error(self) -> Self {
        match self {
            Self::Auth { parameter, .. } | Self::Validation { parameter, .. } => Self::Auth {
                kind: AuthErrorKind::ShareKeyInvalid,
                parameter,
            },
            other => other,
        }
    }
}

impl From<RpcFault> for StoreError {
    fn from(fault: RpcFault) -> Self {
        match fault {
            RpcFault::User { code, parameter } => match code {
                EdamErrorCode::InvalidAuth => Self::Auth {
                    kind: AuthErrorKind::InvalidCredentials,
                    parameter,
                },
                EdamErrorCode::AuthExpired => Self::Auth {
                    kind: AuthErrorKind::ExpiredCredential,
                    parameter,
                },
                EdamErrorCode::TwoFactorRequired => Self::Auth {
                    kind: AuthErrorKind::TwoFactorRequired,
                    parameter,
                },
                EdamErrorCode::PermissionDenied
                    if parameter.as_deref() == Some("authenticationToken") =>
                {
                    Self::Auth {
                        kind: AuthErrorKind::PermissionDenied,
                        parameter,
                    }
                }
                code => Self::Validation { code, parameter },
            },
            RpcFault::NotFound { identifier, key } => Self::NotFound { identifier, key },
            RpcFault::System {
                code,
                message,
                rate_limit_duration,
            } => Self::Service {
                code,
                message,
                retry_after: rate_limit_duration.map(|secs| Duration::from_secs(u64::from(secs))),
            },
            RpcFault::Transport { message } => Self::Transport(message),
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(e: reqwest::Error) -> Self {
        StoreError::Transport(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_auth_maps_to_invalid_credentials() {
        let err = StoreError::from(RpcFault::user(EdamErrorCode::InvalidAuth, "password"));
        assert_eq!(err.auth_kind(), Some(AuthErrorKind::InvalidCredentials));
        assert_eq!(err.to_string(), "authentication failed: invalid credentials");
    }

    #[test]
    fn expired_and_two_factor_map_to_auth() {
        let expired = StoreError::from(RpcFault::user(EdamErrorCode::AuthExpired, "authenticationToken"));
        assert_eq!(expired.auth_kind(), Some(AuthErrorKind::ExpiredCredential));

        let second = StoreError::from(RpcFault::user(EdamErrorCode::TwoFactorRequired, "oneTimeCode"));
        assert_eq!(second.auth_kind(), Some(AuthErrorKind::TwoFactorRequired));
    }

    #[test]
    fn other_user_faults_are_validation_errors() {
        let err = StoreError::from(RpcFault::user(EdamErrorCode::QuotaReached, "Note"));
        assert_eq!(
            err,
            StoreError::Validation {
                code: EdamErrorCode::QuotaReached,
                parameter: Some("Note".into()),
            }
        );
        assert_eq!(err.to_string(), "validation failed: QUOTA_REACHED on Note");
    }

    #[test]
    fn permission_denied_on_token_is_auth_but_on_data_is_validation() {
        let token = StoreError::from(RpcFault::user(
            EdamErrorCode::PermissionDenied,
            "authenticationToken",
        ));
        assert_eq!(token.auth_kind(), Some(AuthErrorKind::PermissionDenied));

        let data = StoreError::from(RpcFault::user(EdamErrorCode::PermissionDenied, "Note.notebookGuid"));
        assert!(data.auth_kind().is_none());
    }

    #[test]
    fn rate_limit_carries_retry_after() {
        let err = StoreError::from(RpcFault::System {
            code: EdamErrorCode::RateLimitReached,
            message: None,
            rate_limit_duration: Some(15),
        });
        match err {
            StoreError::Service { retry_after, .. } => {
                assert_eq!(retry_after, Some(Duration::from_secs(15)));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn not_found_passes_through() {
        let err = StoreError::from(RpcFault::not_found("SharedNotebook.shareKey", "k"));
        assert!(err.is_not_found());
        assert!(err.clone().into_share_key_error().is_not_found());
    }

    #[test]
    fn share_key_retagging() {
        let err = StoreError::from(RpcFault::user(EdamErrorCode::InvalidAuth, "shareKey"));
        let retagged = err.into_share_key_error();
        assert_eq!(retagged.auth_kind(), Some(AuthErrorKind::ShareKeyInvalid));

        let transport = StoreError::Transport("reset".into()).into_share_key_error();
        assert_eq!(transport, StoreError::Transport("reset".into()));
    }
}
