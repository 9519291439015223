//! Account store client and credential manager.
//!
//! [`UserStoreClient`] turns an identity/secret login into an endpoint-bound
//! [`Credential`] and manages the lifecycle of that credential afterwards
//! (second factor, business exchange, refresh, revocation).  Identity and
//! secret are only ever passed through to the store; nothing is retained.

use notestore_models::{AuthenticationResult, BootstrapInfo, PremiumInfo, PublicUserInfo, User};
use tracing::info;

use crate::config::ClientConfig;
use crate::credentials::Credential;
use crate::endpoints::Endpoints;
use crate::error::{AuthErrorKind, StoreError};
use crate::protocol::UserStoreStub;
use crate::transport::TransportFactory;

/// Blocking client of the account store.
#[derive(Debug, Clone)]
pub struct UserStoreClient {
    stub: UserStoreStub,
    config: ClientConfig,
}

impl UserStoreClient {
    /// Wrap an existing stub.
    pub fn new(stub: UserStoreStub, config: ClientConfig) -> Self {
        Self { stub, config }
    }

    /// Connect to the account endpoint of the configured service.
    pub fn connect(transports: &dyn TransportFactory, config: ClientConfig) -> Result<Self, StoreError> {
        let endpoint = Endpoints::user_store(&config.service_url);
        let stub = UserStoreStub::new(transports.connect(&endpoint)?);
        Ok(Self::new(stub, config))
    }

    /// The raw stub, for callers that need exact control over arguments.
    pub fn get_client(&self) -> &UserStoreStub {
        &self.stub
    }

    // ------------------------------------------------------------------
    // Service discovery
    // ------------------------------------------------------------------

    /// Whether the service accepts protocol version `major.minor` for
    /// `client_name`.
    pub fn check_version(&self, client_name: &str, major: i16, minor: i16) -> Result<bool, StoreError> {
        self.stub.check_version(client_name, major, minor)
    }

    /// Service profiles offered for `locale`.
    pub fn get_bootstrap_info(&self, locale: &str) -> Result<BootstrapInfo, StoreError> {
        self.stub.get_bootstrap_info(locale)
    }

    // ------------------------------------------------------------------
    // Authentication
    // ------------------------------------------------------------------

    /// Log in with identity and secret, using the configured consumer key
    /// pair.
    ///
    /// When the account requires a second factor and
    /// `supports_two_factor` is set, the returned credential reports
    /// [`Credential::second_factor_required`] and must be completed with
    /// [`complete_two_factor_authentication`](Self::complete_two_factor_authentication)
    /// before it can be used for content operations.
    pub fn authenticate(
        &self,
        username: &str,
        password: &str,
        supports_two_factor: bool,
    ) -> Result<Credential, StoreError> {
        self.authenticate_with_consumer(
            username,
            password,
            &self.config.consumer_key,
            &self.config.consumer_secret,
            supports_two_factor,
        )
    }

    /// Log in with an explicit consumer key pair.
    pub fn authenticate_with_consumer(
        &self,
        username: &str,
        password: &str,
        consumer_key: &str,
        consumer_secret: &str,
        supports_two_factor: bool,
    ) -> Result<Credential, StoreError> {
        let result = self.stub.authenticate(
            username,
            password,
            consumer_key,
            consumer_secret,
            supports_two_factor,
        )?;
        let credential = self.credential_from(&result)?;
        info!(
            username,
            endpoint = credential.endpoint(),
            second_factor = credential.second_factor_required(),
            "authenticated"
        );
        Ok(credential)
    }

    /// Log in for a long-lived session tagged to one device.
    pub fn authenticate_long_session(
        &self,
        username: &str,
        password: &str,
        device_identifier: &str,
        device_description: &str,
        supports_two_factor: bool,
    ) -> Result<Credential, StoreError> {
        let result = self.stub.authenticate_long_session(
            username,
            password,
            &self.config.consumer_key,
            &self.config.consumer_secret,
            device_identifier,
            device_description,
            supports_two_factor,
        )?;
        let credential = self.credential_from(&result)?;
        info!(
            username,
            device = device_identifier,
            endpoint = credential.endpoint(),
            "authenticated long session"
        );
        Ok(credential)
    }

    /// Finish the second-factor challenge begun by a login.
    pub fn complete_two_factor_authentication(
        &self,
        credential: &Credential,
        one_time_code: &str,
        device_identifier: &str,
        device_description: &str,
    ) -> Result<(), StoreError> {
        self.stub.complete_two_factor_authentication(
            credential.token(),
            one_time_code,
            device_identifier,
            device_description,
        )?;
        info!(device = device_identifier, "second factor completed");
        Ok(())
    }

    /// Exchange a personal credential for one scoped to the caller's
    /// business content endpoint.
    ///
    /// The personal credential is neither consumed nor altered.  Fails with
    /// [`StoreError::NotFound`] when the account has no business.
    pub fn authenticate_to_business(&self, personal: &Credential) -> Result<Credential, StoreError> {
        let result = self.stub.authenticate_to_business(personal.token())?;
        let credential = Credential::from_authentication(&result)?;
        info!(endpoint = credential.endpoint(), "authenticated to business");
        Ok(credential)
    }

    /// Obtain a replacement credential with a renewed validity window.
    ///
    /// The store invalidates `credential` when this succeeds.
    pub fn refresh_authentication(&self, credential: &Credential) -> Result<Credential, StoreError> {
        let result = self.stub.refresh_authentication(credential.token())?;
        let refreshed = Credential::bind(&result, credential.endpoint())?;
        info!(endpoint = refreshed.endpoint(), "credential refreshed");
        Ok(refreshed)
    }

    /// Invalidate `credential` on the store.
    ///
    /// Revoking a credential that is already invalid or expired succeeds.
    pub fn revoke_long_session(&self, credential: &Credential) -> Result<(), StoreError> {
        match self.stub.revoke_long_session(credential.token()) {
            Ok(()) => {}
            Err(e)
                if matches!(
                    e.auth_kind(),
                    Some(AuthErrorKind::InvalidCredentials | AuthErrorKind::ExpiredCredential)
                ) => {}
            Err(e) => return Err(e),
        }
        info!(endpoint = credential.endpoint(), "credential revoked");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Account information
    // ------------------------------------------------------------------

    /// Profile of the credential's account.
    pub fn get_user(&self, credential: &Credential) -> Result<User, StoreError> {
        self.stub.get_user(credential.token())
    }

    /// Public profile of any account.
    pub fn get_public_user_info(&self, username: &str) -> Result<PublicUserInfo, StoreError> {
        self.stub.get_public_user_info(username)
    }

    /// Subscription state of the credential's account.
    pub fn get_premium_info(&self, credential: &Credential) -> Result<PremiumInfo, StoreError> {
        self.stub.get_premium_info(credential.token())
    }

    /// Content endpoint of the credential's account.
    pub fn get_note_store_url(&self, credential: &Credential) -> Result<String, StoreError> {
        self.stub.get_note_store_url(credential.token())
    }

    /// Whether the account belongs to a business.
    ///
    /// Cheap pre-check before [`authenticate_to_business`](Self::authenticate_to_business).
    pub fn is_business_user(&self, credential: &Credential) -> Result<bool, StoreError> {
        Ok(self.get_user(credential)?.business_user_info.is_some())
    }

    /// Bind a login result, deriving the endpoint from the user's shard
    /// when the store did not name one.
    fn credential_from(&self, result: &AuthenticationResult) -> Result<Credential, StoreError> {
        if result.note_store_url.is_some() {
            return Credential::from_authentication(result);
        }
        let shard = result
            .user
            .as_ref()
            .and_then(|u| u.shard_id.as_deref())
            .ok_or(StoreError::MissingField("AuthenticationResult.noteStoreUrl"))?;
        Credential::bind(result, &Endpoints::note_store(&self.config.service_url, shard))
    }
}
