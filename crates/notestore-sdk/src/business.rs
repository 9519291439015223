//! Business notebook resolver.
//!
//! Business notebooks live in the organization's content store.  Members
//! reach them exactly like notebooks shared by another account, through a
//! linked reference, except that the share key is exchanged with the
//! business credential instead of the personal one.  Creating a notebook is
//! the one operation that talks to the business endpoint directly.

use std::sync::Arc;

use notestore_models::{LinkedNotebook, Note, Notebook, User};
use tracing::info;

use crate::error::StoreError;
use crate::linked::{LinkedNoteStoreClient, LinkedNoteStoreOperations};
use crate::note_store::{NoteStoreClient, NoteStoreHandle};
use crate::transport::TransportFactory;

/// Operations of the business resolver, on top of the linked ones.
pub trait BusinessNoteStoreOperations: LinkedNoteStoreOperations {
    /// Create `notebook` in the business store and return the caller's
    /// linked reference to it.
    fn create_notebook(&self, notebook: &Notebook) -> Result<LinkedNotebook, StoreError>;
}

/// Resolver for notebooks owned by the caller's business.
#[derive(Debug)]
pub struct BusinessNoteStoreClient {
    linked: LinkedNoteStoreClient,
    business: Arc<NoteStoreClient>,
    business_user: User,
}

impl BusinessNoteStoreClient {
    /// Build a resolver from the caller's personal client, a client bound
    /// to the business endpoint with the business credential, and the
    /// caller's user record as seen by the business.
    pub fn new(
        personal: Arc<NoteStoreClient>,
        business: Arc<NoteStoreClient>,
        business_user: User,
        transports: Arc<dyn TransportFactory>,
        service_url: impl Into<String>,
    ) -> Self {
        let linked = LinkedNoteStoreClient::new(
            personal,
            business.credential().clone(),
            transports,
            service_url,
        );
        Self {
            linked,
            business,
            business_user,
        }
    }

    /// Client bound to the business content endpoint.
    pub fn business_client(&self) -> &Arc<NoteStoreClient> {
        &self.business
    }

    /// The caller's user record within the business.
    pub fn business_user(&self) -> &User {
        &self.business_user
    }

    /// The underlying linked resolver, for cache inspection and eviction.
    pub fn linked_client(&self) -> &LinkedNoteStoreClient {
        &self.linked
    }
}

impl LinkedNoteStoreOperations for BusinessNoteStoreClient {
    fn get_client(&self, linked: &LinkedNotebook) -> Result<NoteStoreHandle, StoreError> {
        self.linked.get_client(linked)
    }

    fn create_note(&self, note: &Note, linked: &LinkedNotebook) -> Result<Note, StoreError> {
        self.linked.create_note(note, linked)
    }

    /// Linked notebooks in the personal store that belong to a business.
    fn list_notebooks(&self) -> Result<Vec<LinkedNotebook>, StoreError> {
        Ok(self
            .linked
            .personal_client()
            .list_linked_notebooks()?
            .into_iter()
            .filter(LinkedNotebook::is_business)
            .collect())
    }

    fn get_corresponding_notebook(&self, linked: &LinkedNotebook) -> Result<Notebook, StoreError> {
        self.linked.get_corresponding_notebook(linked)
    }

    fn is_notebook_writable(&self, linked: &LinkedNotebook) -> Result<bool, StoreError> {
        self.linked.is_notebook_writable(linked)
    }
}

impl BusinessNoteStoreOperations for BusinessNoteStoreClient {
    fn create_notebook(&self, notebook: &Notebook) -> Result<LinkedNotebook, StoreError> {
        let created = self.business.create_notebook(notebook)?;

        let share_key = created
            .shared_notebooks
            .as_ref()
            .and_then(|shares| shares.first())
            .and_then(|share| share.share_key.clone())
            .ok_or(StoreError::MissingField("Notebook.sharedNotebooks"))?;

        let reference = LinkedNotebook {
            share_name: created.name.clone(),
            username: self.business_user.username.clone(),
            shard_id: self.business_user.shard_id.clone(),
            share_key: Some(share_key),
            note_store_url: Some(self.business.endpoint().to_string()),
            web_api_url_prefix: self
                .business
                .credential()
                .web_api_url_prefix()
                .map(str::to_string),
            business_id: self
                .business_user
                .business_user_info
                .as_ref()
                .and_then(|b| b.business_id),
            notebook_guid: created.guid.clone(),
            ..LinkedNotebook::default()
        };

        let linked = self
            .linked
            .personal_client()
            .create_linked_notebook(&reference)?;
        info!(
            name = created.name.as_deref().unwrap_or_default(),
            endpoint = self.business.endpoint(),
            "business notebook created"
        );
        Ok(linked)
    }
}
