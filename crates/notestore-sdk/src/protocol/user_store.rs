//! Account store stub.

use notestore_models::{AuthenticationResult, BootstrapInfo, PremiumInfo, PublicUserInfo, User};

rpc_stub! {
    /// Blocking stub for the account store.
    pub struct UserStoreStub;
    pub const USER_STORE_OPERATIONS;

    /// Ask whether the service accepts this client's protocol version.
    fn check_version(client_name: &str, edam_version_major: i16, edam_version_minor: i16) -> bool;
    /// Service profiles available for a locale.
    fn get_bootstrap_info(locale: &str) -> BootstrapInfo;
    /// Exchange identity + secret for a short-lived token.
    fn authenticate(
        username: &str,
        password: &str,
        consumer_key: &str,
        consumer_secret: &str,
        supports_two_factor: bool,
    ) -> AuthenticationResult;
    /// Exchange identity + secret for a long-lived, device-tagged token.
    fn authenticate_long_session(
        username: &str,
        password: &str,
        consumer_key: &str,
        consumer_secret: &str,
        device_identifier: &str,
        device_description: &str,
        supports_two_factor: bool,
    ) -> AuthenticationResult;
    /// Finish a second-factor challenge.
    fn complete_two_factor_authentication(
        authentication_token: &str,
        one_time_code: &str,
        device_identifier: &str,
        device_description: &str,
    ) -> AuthenticationResult;
    /// Invalidate a token.
    fn revoke_long_session(authentication_token: &str) -> ();
    /// Exchange a personal token for a business-scoped token.
    fn authenticate_to_business(authentication_token: &str) -> AuthenticationResult;
    /// Exchange a token for a fresh one.
    fn refresh_authentication(authentication_token: &str) -> AuthenticationResult;
    /// Profile of the token's account.
    fn get_user(authentication_token: &str) -> User;
    /// Public profile of any account.
    fn get_public_user_info(username: &str) -> PublicUserInfo;
    /// Subscription state of the token's account.
    fn get_premium_info(authentication_token: &str) -> PremiumInfo;
    /// Content endpoint of the token's account.
    fn get_note_store_url(authentication_token: &str) -> String;
}
