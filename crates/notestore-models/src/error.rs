//! Fault vocabulary of the remote protocol.
//!
//! Remote stores report failures as one of the [`RpcFault`] variants.  The
//! faults are plain values: they travel over the wire unchanged and are only
//! interpreted by the SDK layer.

use serde::{Deserialize, Serialize};

/// Numeric error codes carried by user and system faults.
#[derive(
    Serialize,
    Deserialize,
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum EdamErrorCode {
    /// No information available about the error.
    Unknown,
    /// The format of the request data was incorrect.
    BadDataFormat,
    /// Not permitted to perform the action.
    PermissionDenied,
    /// Unexpected problem with the service.
    InternalError,
    /// A required parameter or field was missing.
    DataRequired,
    /// An operation would exceed a per-account limit.
    LimitReached,
    /// The upload quota has been reached.
    QuotaReached,
    /// The authentication token is invalid or the identity/secret pair is wrong.
    InvalidAuth,
    /// The authentication token has expired.
    AuthExpired,
    /// The change would conflict with existing data.
    DataConflict,
    /// The note content did not validate.
    EnmlValidation,
    /// The account shard is temporarily unavailable.
    ShardUnavailable,
    /// A value was shorter than allowed.
    LenTooShort,
    /// A value was longer than allowed.
    LenTooLong,
    /// Too few items were supplied.
    TooFew,
    /// Too many items were supplied.
    TooMany,
    /// The operation is not supported by this store.
    UnsupportedOperation,
    /// The content has been taken down by the service.
    TakenDown,
    /// The caller has been rate limited.
    RateLimitReached,
    /// The business requires a fresh login before granting access.
    BusinessSecurityLoginRequired,
    /// The account requires a second authentication factor.
    TwoFactorRequired,
}

/// A failure reported by a remote store or by the transport reaching it.
///
/// # Examples
///
/// ```
/// use notestore_models::{EdamErrorCode, RpcFault};
///
/// let fault = RpcFault::user(EdamErrorCode::InvalidAuth, "authenticationToken");
/// assert_eq!(
///     fault.to_string(),
///     "user fault INVALID_AUTH on authenticationToken",
/// );
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RpcFault {
    /// The request was rejected because of the caller's input or credentials.
    #[error("user fault {code} on {}", .parameter.as_deref().unwrap_or("<none>"))]
    User {
        /// Why the request was rejected.
        code: EdamErrorCode,
        /// The offending parameter, when the store names one.
        parameter: Option<String>,
    },

    /// A referenced object does not exist (or is no longer shared).
    #[error("not found: {} = {}", .identifier.as_deref().unwrap_or("<unknown>"), .key.as_deref().unwrap_or("<unknown>"))]
    NotFound {
        /// Name of the identifying field, e.g. `Note.guid`.
        identifier: Option<String>,
        /// The value that could not be found.
        key: Option<String>,
    },

    /// The store failed on its side.
    #[error("system fault {code}: {}", .message.as_deref().unwrap_or(""))]
    System {
        /// Failure category.
        code: EdamErrorCode,
        /// Optional human-readable detail.
        message: Option<String>,
        /// Seconds to wait before retrying, set when rate limited.
        rate_limit_duration: Option<u32>,
    },

    /// The call never produced a protocol-level answer.
    #[error("transport failure: {message}")]
    Transport {
        /// Description of the connection or framing problem.
        message: String,
    },
}

impl RpcFault {
    /// Build a [`RpcFault::User`] naming the offending parameter.
    pub fn user(code: EdamErrorCode, parameter: &str) -> Self {
        Self::User {
            code,
            parameter: Some(parameter.to_string()),
        }
    }

    /// Build a [`RpcFault::NotFound`] for `identifier = key`.
    pub fn not_found(identifier: &str, key: &str) -> Self {
        Self::NotFound {
            identifier: Some(identifier.to_string()),
            key: Some(key.to_string()),
        }
    }

    /// Build a [`RpcFault::System`] without a retry hint.
    pub fn system(code: EdamErrorCode, message: &str) -> Self {
        Self::System {
            code,
            message: Some(message.to_string()),
            rate_limit_duration: None,
        }
    }

    /// Build a [`RpcFault::Transport`].
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }
}
