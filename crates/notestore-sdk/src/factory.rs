//! Entry point wiring configuration, transports and clients together.

use std::sync::Arc;

use notestore_models::{EDAM_VERSION_MAJOR, EDAM_VERSION_MINOR};
use tracing::info;

use crate::business::BusinessNoteStoreClient;
use crate::config::ClientConfig;
use crate::credentials::Credential;
use crate::error::StoreError;
use crate::linked::LinkedNoteStoreClient;
use crate::note_store::NoteStoreClient;
use crate::transport::{HttpTransportFactory, TransportFactory};
use crate::user_store::UserStoreClient;

/// Builds every client of the SDK from one configuration.
///
/// # Examples
///
/// ```rust,no_run
/// use notestore_sdk::{ClientConfig, ClientFactory};
///
/// # fn run() -> Result<(), notestore_sdk::StoreError> {
/// let factory = ClientFactory::http(ClientConfig::from_env())?;
/// let users = factory.user_store_client()?;
/// let credential = users.authenticate("alice", "secret", false)?;
/// let notes = factory.note_store_client(credential)?;
/// for notebook in notes.list_notebooks()? {
///     println!("{}", notebook.name.unwrap_or_default());
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ClientFactory {
    config: ClientConfig,
    transports: Arc<dyn TransportFactory>,
}

impl ClientFactory {
    /// Use `transports` to reach the service described by `config`.
    pub fn new(config: ClientConfig, transports: Arc<dyn TransportFactory>) -> Self {
        Self { config, transports }
    }

    /// Reach the service over HTTP.
    pub fn http(config: ClientConfig) -> Result<Self, StoreError> {
        let transports = HttpTransportFactory::new(&config)?;
        Ok(Self::new(config, Arc::new(transports)))
    }

    /// The configuration every client is built from.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Account store client, after checking the service accepts this
    /// client's protocol version.
    pub fn user_store_client(&self) -> Result<UserStoreClient, StoreError> {
        let client = UserStoreClient::connect(self.transports.as_ref(), self.config.clone())?;
        let accepted =
            client.check_version(&self.config.user_agent, EDAM_VERSION_MAJOR, EDAM_VERSION_MINOR)?;
        if !accepted {
            return Err(StoreError::UnsupportedVersion {
                major: EDAM_VERSION_MAJOR,
                minor: EDAM_VERSION_MINOR,
            });
        }
        Ok(client)
    }

    /// Personal content client for `credential`.
    pub fn note_store_client(&self, credential: Credential) -> Result<NoteStoreClient, StoreError> {
        NoteStoreClient::connect(self.transports.as_ref(), credential)
    }

    /// Resolver for notebooks other accounts share with the holder of
    /// `personal`.
    pub fn linked_note_store_client(
        &self,
        personal: Credential,
    ) -> Result<LinkedNoteStoreClient, StoreError> {
        let client = Arc::new(self.note_store_client(personal.clone())?);
        Ok(LinkedNoteStoreClient::new(
            client,
            personal,
            Arc::clone(&self.transports),
            self.config.service_url.clone(),
        ))
    }

    /// Resolver for the business the holder of `personal` belongs to.
    ///
    /// Performs the business exchange and fetches the caller's business
    /// user record; fails with [`StoreError::NotFound`] when the account has
    /// no business.
    pub fn business_note_store_client(
        &self,
        personal: Credential,
    ) -> Result<BusinessNoteStoreClient, StoreError> {
        let users = UserStoreClient::connect(self.transports.as_ref(), self.config.clone())?;
        let business_credential = users.authenticate_to_business(&personal)?;
        let business_user = match business_credential.user() {
            Some(user) => user.clone(),
            None => users.get_user(&business_credential)?,
        };
        info!(
            endpoint = business_credential.endpoint(),
            business = business_user
                .business_user_info
                .as_ref()
                .and_then(|b| b.business_name.as_deref())
                .unwrap_or_default(),
            "business resolver ready"
        );

        let personal = Arc::new(self.note_store_client(personal)?);
        let business = Arc::new(self.note_store_client(business_credential)?);
        Ok(BusinessNoteStoreClient::new(
            personal,
            business,
            business_user,
            Arc::clone(&self.transports),
            self.config.service_url.clone(),
        ))
    }
}

impl std::fmt::Debug for ClientFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientFactory")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
