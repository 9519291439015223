//! # Note Store SDK
//!
//! Store-routing and credential-lifecycle layer for the note service.
//!
//! The service is split across several content stores, each at its own
//! endpoint and each wanting its own credential.  This crate turns one login
//! into the right credential for every store and routes each call to the
//! endpoint that hosts its notebook:
//!
//! * [`UserStoreClient`] handles login, second factor, business exchange,
//!   refresh and revocation, plus account queries.
//! * [`NoteStoreClient`] exposes every content operation against one
//!   endpoint, with the credential injected.
//! * [`LinkedNoteStoreClient`] reaches notebooks shared by other accounts,
//!   resolved lazily and cached per endpoint.
//! * [`BusinessNoteStoreClient`] reaches notebooks owned by the caller's
//!   business.
//! * [`ClientFactory`] builds all of the above from a [`ClientConfig`].
//!
//! All calls block.  Network access goes through the [`TransportFactory`]
//! seam; [`HttpTransportFactory`] is the default binding.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use notestore_models::Notebook;
//! use notestore_sdk::{
//!     BusinessNoteStoreOperations, ClientConfig, ClientFactory, LinkedNoteStoreOperations,
//! };
//!
//! # fn run() -> Result<(), notestore_sdk::StoreError> {
//! let factory = ClientFactory::http(ClientConfig::from_env())?;
//! let users = factory.user_store_client()?;
//! let personal = users.authenticate("alice", "secret", false)?;
//!
//! if users.is_business_user(&personal)? {
//!     let business = factory.business_note_store_client(personal)?;
//!     let linked = business.create_notebook(&Notebook::named("Team Notes"))?;
//!     assert!(business.is_notebook_writable(&linked)?);
//! }
//! # Ok(())
//! # }
//! ```

pub mod business;
pub mod completeness;
pub mod config;
pub mod credentials;
pub mod endpoints;
pub mod error;
pub mod factory;
pub mod linked;
pub mod note_store;
pub mod permissions;
pub mod protocol;
pub mod transport;
pub mod user_store;

#[cfg(test)]
pub(crate) mod testing;

pub use business::{BusinessNoteStoreClient, BusinessNoteStoreOperations};
pub use config::ClientConfig;
pub use credentials::Credential;
pub use endpoints::Endpoints;
pub use error::{AuthErrorKind, StoreError};
pub use factory::ClientFactory;
pub use linked::{LinkedNoteStoreClient, LinkedNoteStoreOperations, ResolutionState};
pub use note_store::{NoteStoreClient, NoteStoreHandle};
pub use permissions::NotebookPermissions;
pub use protocol::{NoteStoreStub, UserStoreStub, NOTE_STORE_OPERATIONS, USER_STORE_OPERATIONS};
pub use transport::{HttpTransport, HttpTransportFactory, RpcTransport, TransportFactory};
pub use user_store::UserStoreClient;
