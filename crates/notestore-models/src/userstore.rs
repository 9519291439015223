//! Account records returned by the user store.

use serde::{Deserialize, Serialize};

use crate::types::Timestamp;

/// Major protocol version this workspace speaks.
pub const EDAM_VERSION_MAJOR: i16 = 1;

/// Minor protocol version this workspace speaks.
pub const EDAM_VERSION_MINOR: i16 = 28;

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// Service level of an account.
#[derive(
    Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum PrivilegeLevel {
    /// Regular account.
    #[default]
    Normal,
    /// Paid account.
    Premium,
    /// Service staff.
    Support,
    /// Service administrator.
    Admin,
}

/// Role of a user within their business.
#[derive(
    Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum BusinessUserRole {
    /// Business administrator.
    Admin,
    /// Regular member.
    #[default]
    Normal,
}

/// Business affiliation of a user.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct BusinessUserInfo {
    /// Identifier of the business.
    pub business_id: Option<i32>,
    /// Display name of the business.
    pub business_name: Option<String>,
    /// Role of the user within the business.
    pub role: Option<BusinessUserRole>,
    /// Business email address of the user.
    pub email: Option<String>,
}

/// Profile of an account.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct User {
    /// Numeric account identifier.
    pub id: Option<i32>,
    /// Login name.
    pub username: Option<String>,
    /// Contact email address.
    pub email: Option<String>,
    /// Display name.
    pub name: Option<String>,
    /// Time zone identifier.
    pub timezone: Option<String>,
    /// Service level.
    pub privilege: Option<PrivilegeLevel>,
    /// Creation time.
    pub created: Option<Timestamp>,
    /// Last modification time.
    pub updated: Option<Timestamp>,
    /// Whether the account is active.
    pub active: Option<bool>,
    /// Shard hosting the account's content.
    pub shard_id: Option<String>,
    /// Business affiliation, absent for personal-only accounts.
    pub business_user_info: Option<BusinessUserInfo>,
}

/// The subset of a profile any caller may look up.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct PublicUserInfo {
    /// Numeric account identifier.
    pub user_id: Option<i32>,
    /// Shard hosting the account's content.
    pub shard_id: Option<String>,
    /// Service level.
    pub privilege: Option<PrivilegeLevel>,
    /// Login name.
    pub username: Option<String>,
    /// Content endpoint of the account.
    pub note_store_url: Option<String>,
    /// Web API prefix of the account.
    pub web_api_url_prefix: Option<String>,
}

/// Subscription state of an account.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct PremiumInfo {
    /// Service time when the record was produced.
    pub current_time: Option<Timestamp>,
    /// Whether the account is premium.
    pub premium: Option<bool>,
    /// Whether the subscription renews automatically.
    pub premium_recurring: Option<bool>,
    /// When the subscription ends.
    pub premium_expiration_date: Option<Timestamp>,
    /// Whether the subscription can be extended.
    pub premium_extendable: Option<bool>,
    /// Whether an upgrade is pending.
    pub premium_pending: Option<bool>,
    /// Whether a cancellation is pending.
    pub premium_cancellation_pending: Option<bool>,
    /// Whether extra upload allowance can be purchased.
    pub can_purchase_upload_allowance: Option<bool>,
}

// ---------------------------------------------------------------------------
// Bootstrap
// ---------------------------------------------------------------------------

/// Service parameters of one bootstrap profile.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct BootstrapSettings {
    /// Host clients should talk to.
    pub service_host: Option<String>,
    /// Marketing site URL.
    pub marketing_url: Option<String>,
    /// Support site URL.
    pub support_url: Option<String>,
    /// Email domain of account-specific addresses.
    pub account_email_domain: Option<String>,
    /// Whether social sharing features are enabled.
    pub enable_sharing: Option<bool>,
}

/// A named service configuration (e.g. international vs. regional).
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct BootstrapProfile {
    /// Profile name.
    pub name: Option<String>,
    /// Profile parameters.
    pub settings: Option<BootstrapSettings>,
}

/// The profiles a client may choose from for a given locale.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct BootstrapInfo {
    /// Available profiles, preferred first.
    pub profiles: Vec<BootstrapProfile>,
}

// ---------------------------------------------------------------------------
// AuthenticationResult
// ---------------------------------------------------------------------------

/// Outcome of every authentication and credential-exchange call.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct AuthenticationResult {
    /// Service time when the token was issued.
    pub current_time: Timestamp,
    /// The bearer token.
    pub authentication_token: String,
    /// Service time when the token stops being valid.
    pub expiration: Timestamp,
    /// Profile of the authenticated account.
    pub user: Option<User>,
    /// Public profile of the authenticated account.
    pub public_user_info: Option<PublicUserInfo>,
    /// Content endpoint the token is valid for.
    pub note_store_url: Option<String>,
    /// Web API prefix matching the content endpoint.
    pub web_api_url_prefix: Option<String>,
    /// Whether a second factor must be supplied before the token is usable.
    pub second_factor_required: Option<bool>,
    /// Hint describing where the one-time code was delivered.
    pub second_factor_delivery_hint: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authentication_result_defaults() {
        let result: AuthenticationResult =
            serde_json::from_str(r#"{"authentication_token":"t","expiration":10}"#).unwrap();
        assert_eq!(result.authentication_token, "t");
        assert_eq!(result.expiration, 10);
        assert!(result.note_store_url.is_none());
        assert!(result.second_factor_required.is_none());
    }

    #[test]
    fn business_affiliation_is_optional() {
        let user = User::default();
        assert!(user.business_user_info.is_none());
    }

    #[test]
    fn privilege_level_display() {
        assert_eq!(PrivilegeLevel::Premium.to_string(), "PREMIUM");
    }
}
