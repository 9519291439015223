//! Personal content client.
//!
//! [`NoteStoreClient`] pairs a [`NoteStoreStub`] with the [`Credential`] it
//! was issued for and injects that credential into every call.  Each content
//! operation of the protocol appears here under the same name, minus the
//! `authentication_token` parameter.  Errors from the stub pass through
//! unchanged.
//!
//! The same type backs linked and business handles: those are personal
//! clients bound to another endpoint with an exchanged credential.

use std::sync::Arc;

use notestore_models::{
    AuthenticationResult, ClientUsageMetrics, Guid, LazyMap, LinkedNotebook, Note,
    NoteCollectionCounts, NoteEmailParameters, NoteFilter, NoteList, NoteVersionId, Notebook,
    NotesMetadataList, NotesMetadataResultSpec, RelatedQuery, RelatedResult, RelatedResultSpec,
    Resource, ResourceAttributes, SavedSearch, SharedNotebook, SharedNotebookRecipientSettings,
    SyncChunk, SyncChunkFilter, SyncState, Tag,
};

use crate::credentials::Credential;
use crate::error::StoreError;
use crate::protocol::NoteStoreStub;
use crate::transport::TransportFactory;

/// Content store client with automatic credential injection.
#[derive(Debug, Clone)]
pub struct NoteStoreClient {
    stub: NoteStoreStub,
    credential: Credential,
}

impl NoteStoreClient {
    /// Open a stub on the credential's own endpoint.
    pub fn connect(
        transports: &dyn TransportFactory,
        credential: Credential,
    ) -> Result<Self, StoreError> {
        let stub = NoteStoreStub::new(transports.connect(credential.endpoint())?);
        Ok(Self { stub, credential })
    }

    /// Pair an existing stub with a credential.
    ///
    /// Fails with [`StoreError::EndpointMismatch`] when the stub is bound to
    /// a different endpoint than the credential.
    pub fn with_stub(stub: NoteStoreStub, credential: Credential) -> Result<Self, StoreError> {
        if stub.endpoint() != credential.endpoint() {
            return Err(StoreError::EndpointMismatch {
                credential: credential.endpoint().to_string(),
                stub: stub.endpoint().to_string(),
            });
        }
        Ok(Self { stub, credential })
    }

    /// The raw stub, for callers that need exact control over arguments.
    pub fn get_client(&self) -> &NoteStoreStub {
        &self.stub
    }

    /// The credential injected into every call.
    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    /// URL of the endpoint this client talks to.
    pub fn endpoint(&self) -> &str {
        self.stub.endpoint()
    }

    fn token(&self) -> &str {
        self.credential.token()
    }

    // ------------------------------------------------------------------
    // Sync
    // ------------------------------------------------------------------

    /// Current sync state of the account.
    pub fn get_sync_state(&self) -> Result<SyncState, StoreError> {
        self.stub.get_sync_state(self.token())
    }

    /// Current sync state, reporting client usage metrics.
    pub fn get_sync_state_with_metrics(
        &self,
        client_metrics: &ClientUsageMetrics,
    ) -> Result<SyncState, StoreError> {
        self.stub.get_sync_state_with_metrics(self.token(), client_metrics)
    }

    /// Changes after `after_usn`.
    pub fn get_sync_chunk(
        &self,
        after_usn: i32,
        max_entries: i32,
        full_sync_only: bool,
    ) -> Result<SyncChunk, StoreError> {
        self.stub
            .get_sync_chunk(self.token(), after_usn, max_entries, full_sync_only)
    }

    /// Changes after `after_usn`, restricted by `filter`.
    pub fn get_filtered_sync_chunk(
        &self,
        after_usn: i32,
        max_entries: i32,
        filter: &SyncChunkFilter,
    ) -> Result<SyncChunk, StoreError> {
        self.stub
            .get_filtered_sync_chunk(self.token(), after_usn, max_entries, filter)
    }

    /// Sync state of the shared notebook behind `linked_notebook`.
    pub fn get_linked_notebook_sync_state(
        &self,
        linked_notebook: &LinkedNotebook,
    ) -> Result<SyncState, StoreError> {
        self.stub
            .get_linked_notebook_sync_state(self.token(), linked_notebook)
    }

    /// Changes after `after_usn` in the shared notebook behind `linked_notebook`.
    pub fn get_linked_notebook_sync_chunk(
        &self,
        linked_notebook: &LinkedNotebook,
        after_usn: i32,
        max_entries: i32,
        full_sync_only: bool,
    ) -> Result<SyncChunk, StoreError> {
        self.stub.get_linked_notebook_sync_chunk(
            self.token(),
            linked_notebook,
            after_usn,
            max_entries,
            full_sync_only,
        )
    }

    // ------------------------------------------------------------------
    // Notebooks
    // ------------------------------------------------------------------

    pub fn list_notebooks(&self) -> Result<Vec<Notebook>, StoreError> {
        self.stub.list_notebooks(self.token())
    }

    pub fn get_notebook(&self, guid: &Guid) -> Result<Notebook, StoreError> {
        self.stub.get_notebook(self.token(), guid)
    }

    pub fn get_default_notebook(&self) -> Result<Notebook, StoreError> {
        self.stub.get_default_notebook(self.token())
    }

    /// Create a notebook; the store assigns its guid.
    pub fn create_notebook(&self, notebook: &Notebook) -> Result<Notebook, StoreError> {
        self.stub.create_notebook(self.token(), notebook)
    }

    /// Returns the new update sequence number.
    pub fn update_notebook(&self, notebook: &Notebook) -> Result<i32, StoreError> {
        self.stub.update_notebook(self.token(), notebook)
    }

    pub fn expunge_notebook(&self, guid: &Guid) -> Result<i32, StoreError> {
        self.stub.expunge_notebook(self.token(), guid)
    }

    // ------------------------------------------------------------------
    // Tags
    // ------------------------------------------------------------------

    pub fn list_tags(&self) -> Result<Vec<Tag>, StoreError> {
        self.stub.list_tags(self.token())
    }

    pub fn list_tags_by_notebook(&self, notebook_guid: &Guid) -> Result<Vec<Tag>, StoreError> {
        self.stub.list_tags_by_notebook(self.token(), notebook_guid)
    }

    pub fn get_tag(&self, guid: &Guid) -> Result<Tag, StoreError> {
        self.stub.get_tag(self.token(), guid)
    }

    pub fn create_tag(&self, tag: &Tag) -> Result<Tag, StoreError> {
        self.stub.create_tag(self.token(), tag)
    }

    pub fn update_tag(&self, tag: &Tag) -> Result<i32, StoreError> {
        self.stub.update_tag(self.token(), tag)
    }

    /// Detach the tag from every note.
    pub fn untag_all(&self, guid: &Guid) -> Result<(), StoreError> {
        self.stub.untag_all(self.token(), guid)
    }

    pub fn expunge_tag(&self, guid: &Guid) -> Result<i32, StoreError> {
        self.stub.expunge_tag(self.token(), guid)
    }

    // ------------------------------------------------------------------
    // Saved searches
    // ------------------------------------------------------------------

    pub fn list_searches(&self) -> Result<Vec<SavedSearch>, StoreError> {
        self.stub.list_searches(self.token())
    }

    pub fn get_search(&self, guid: &Guid) -> Result<SavedSearch, StoreError> {
        self.stub.get_search(self.token(), guid)
    }

    pub fn create_search(&self, search: &SavedSearch) -> Result<SavedSearch, StoreError> {
        self.stub.create_search(self.token(), search)
    }

    pub fn update_search(&self, search: &SavedSearch) -> Result<i32, StoreError> {
        self.stub.update_search(self.token(), search)
    }

    pub fn expunge_search(&self, guid: &Guid) -> Result<i32, StoreError> {
        self.stub.expunge_search(self.token(), guid)
    }

    // ------------------------------------------------------------------
    // Note search
    // ------------------------------------------------------------------

    pub fn find_notes(
        &self,
        filter: &NoteFilter,
        offset: i32,
        max_notes: i32,
    ) -> Result<NoteList, StoreError> {
        self.stub.find_notes(self.token(), filter, offset, max_notes)
    }

    /// Position of `guid` within the notes matching `filter`.
    pub fn find_note_offset(&self, filter: &NoteFilter, guid: &Guid) -> Result<i32, StoreError> {
        self.stub.find_note_offset(self.token(), filter, guid)
    }

    pub fn find_notes_metadata(
        &self,
        filter: &NoteFilter,
        offset: i32,
        max_notes: i32,
        result_spec: &NotesMetadataResultSpec,
    ) -> Result<NotesMetadataList, StoreError> {
        self.stub
            .find_notes_metadata(self.token(), filter, offset, max_notes, result_spec)
    }

    /// Per-notebook and per-tag counts of notes matching `filter`.
    pub fn find_note_counts(
        &self,
        filter: &NoteFilter,
        with_trash: bool,
    ) -> Result<NoteCollectionCounts, StoreError> {
        self.stub.find_note_counts(self.token(), filter, with_trash)
    }

    // ------------------------------------------------------------------
    // Notes
    // ------------------------------------------------------------------

    pub fn get_note(
        &self,
        guid: &Guid,
        with_content: bool,
        with_resources_data: bool,
        with_resources_recognition: bool,
        with_resources_alternate_data: bool,
    ) -> Result<Note, StoreError> {
        self.stub.get_note(
            self.token(),
            guid,
            with_content,
            with_resources_data,
            with_resources_recognition,
            with_resources_alternate_data,
        )
    }

    pub fn get_note_application_data(&self, guid: &Guid) -> Result<LazyMap, StoreError> {
        self.stub.get_note_application_data(self.token(), guid)
    }

    pub fn get_note_application_data_entry(
        &self,
        guid: &Guid,
        key: &str,
    ) -> Result<String, StoreError> {
        self.stub
            .get_note_application_data_entry(self.token(), guid, key)
    }

    pub fn set_note_application_data_entry(
        &self,
        guid: &Guid,
        key: &str,
        value: &str,
    ) -> Result<i32, StoreError> {
        self.stub
            .set_note_application_data_entry(self.token(), guid, key, value)
    }

    pub fn unset_note_application_data_entry(
        &self,
        guid: &Guid,
        key: &str,
    ) -> Result<i32, StoreError> {
        self.stub
            .unset_note_application_data_entry(self.token(), guid, key)
    }

    pub fn get_note_content(&self, guid: &Guid) -> Result<String, StoreError> {
        self.stub.get_note_content(self.token(), guid)
    }

    pub fn get_note_search_text(
        &self,
        guid: &Guid,
        note_only: bool,
        tokenize_for_indexing: bool,
    ) -> Result<String, StoreError> {
        self.stub
            .get_note_search_text(self.token(), guid, note_only, tokenize_for_indexing)
    }

    pub fn get_resource_search_text(&self, guid: &Guid) -> Result<String, StoreError> {
        self.stub.get_resource_search_text(self.token(), guid)
    }

    pub fn get_note_tag_names(&self, guid: &Guid) -> Result<Vec<String>, StoreError> {
        self.stub.get_note_tag_names(self.token(), guid)
    }

    /// Create a note in the notebook named by `note.notebook_guid`, or in
    /// the default notebook when unset.
    pub fn create_note(&self, note: &Note) -> Result<Note, StoreError> {
        self.stub.create_note(self.token(), note)
    }

    pub fn update_note(&self, note: &Note) -> Result<Note, StoreError> {
        self.stub.update_note(self.token(), note)
    }

    /// Move a note to the trash.
    pub fn delete_note(&self, guid: &Guid) -> Result<i32, StoreError> {
        self.stub.delete_note(self.token(), guid)
    }

    /// Remove a note permanently.
    pub fn expunge_note(&self, guid: &Guid) -> Result<i32, StoreError> {
        self.stub.expunge_note(self.token(), guid)
    }

    pub fn expunge_notes(&self, note_guids: &[Guid]) -> Result<i32, StoreError> {
        self.stub.expunge_notes(self.token(), note_guids)
    }

    /// Empty the trash.
    pub fn expunge_inactive_notes(&self) -> Result<i32, StoreError> {
        self.stub.expunge_inactive_notes(self.token())
    }

    pub fn copy_note(&self, note_guid: &Guid, to_notebook_guid: &Guid) -> Result<Note, StoreError> {
        self.stub.copy_note(self.token(), note_guid, to_notebook_guid)
    }

    pub fn list_note_versions(&self, note_guid: &Guid) -> Result<Vec<NoteVersionId>, StoreError> {
        self.stub.list_note_versions(self.token(), note_guid)
    }

    pub fn get_note_version(
        &self,
        note_guid: &Guid,
        update_sequence_num: i32,
        with_resources_data: bool,
        with_resources_recognition: bool,
        with_resources_alternate_data: bool,
    ) -> Result<Note, StoreError> {
        self.stub.get_note_version(
            self.token(),
            note_guid,
            update_sequence_num,
            with_resources_data,
            with_resources_recognition,
            with_resources_alternate_data,
        )
    }

    // ------------------------------------------------------------------
    // Resources
    // ------------------------------------------------------------------

    pub fn get_resource(
        &self,
        guid: &Guid,
        with_data: bool,
        with_recognition: bool,
        with_attributes: bool,
        with_alternate_data: bool,
    ) -> Result<Resource, StoreError> {
        self.stub.get_resource(
            self.token(),
            guid,
            with_data,
            with_recognition,
            with_attributes,
            with_alternate_data,
        )
    }

    pub fn get_resource_application_data(&self, guid: &Guid) -> Result<LazyMap, StoreError> {
        self.stub.get_resource_application_data(self.token(), guid)
    }

    pub fn get_resource_application_data_entry(
        &self,
        guid: &Guid,
        key: &str,
    ) -> Result<String, StoreError> {
        self.stub
            .get_resource_application_data_entry(self.token(), guid, key)
    }

    pub fn set_resource_application_data_entry(
        &self,
        guid: &Guid,
        key: &str,
        value: &str,
    ) -> Result<i32, StoreError> {
        self.stub
            .set_resource_application_data_entry(self.token(), guid, key, value)
    }

    pub fn unset_resource_application_data_entry(
        &self,
        guid: &Guid,
        key: &str,
    ) -> Result<i32, StoreError> {
        self.stub
            .unset_resource_application_data_entry(self.token(), guid, key)
    }

    pub fn update_resource(&self, resource: &Resource) -> Result<i32, StoreError> {
        self.stub.update_resource(self.token(), resource)
    }

    pub fn get_resource_data(&self, guid: &Guid) -> Result<Vec<u8>, StoreError> {
        self.stub.get_resource_data(self.token(), guid)
    }

    /// Look a resource up by the MD5 hash of its body within one note.
    pub fn get_resource_by_hash(
        &self,
        note_guid: &Guid,
        content_hash: &[u8],
        with_data: bool,
        with_recognition: bool,
        with_alternate_data: bool,
    ) -> Result<Resource, StoreError> {
        self.stub.get_resource_by_hash(
            self.token(),
            note_guid,
            content_hash,
            with_data,
            with_recognition,
            with_alternate_data,
        )
    }

    pub fn get_resource_recognition(&self, guid: &Guid) -> Result<Vec<u8>, StoreError> {
        self.stub.get_resource_recognition(self.token(), guid)
    }

    pub fn get_resource_alternate_data(&self, guid: &Guid) -> Result<Vec<u8>, StoreError> {
        self.stub.get_resource_alternate_data(self.token(), guid)
    }

    pub fn get_resource_attributes(&self, guid: &Guid) -> Result<ResourceAttributes, StoreError> {
        self.stub.get_resource_attributes(self.token(), guid)
    }

    // ------------------------------------------------------------------
    // Sharing
    // ------------------------------------------------------------------

    /// A publicly published notebook.  No credential is sent.
    pub fn get_public_notebook(&self, user_id: i32, public_uri: &str) -> Result<Notebook, StoreError> {
        self.stub.get_public_notebook(user_id, public_uri)
    }

    pub fn create_shared_notebook(
        &self,
        shared_notebook: &SharedNotebook,
    ) -> Result<SharedNotebook, StoreError> {
        self.stub.create_shared_notebook(self.token(), shared_notebook)
    }

    pub fn update_shared_notebook(&self, shared_notebook: &SharedNotebook) -> Result<i32, StoreError> {
        self.stub.update_shared_notebook(self.token(), shared_notebook)
    }

    pub fn set_shared_notebook_recipient_settings(
        &self,
        shared_notebook_id: i64,
        recipient_settings: &SharedNotebookRecipientSettings,
    ) -> Result<i32, StoreError> {
        self.stub.set_shared_notebook_recipient_settings(
            self.token(),
            shared_notebook_id,
            recipient_settings,
        )
    }

    pub fn send_message_to_shared_notebook_members(
        &self,
        notebook_guid: &Guid,
        message_text: &str,
        recipients: &[String],
    ) -> Result<i32, StoreError> {
        self.stub.send_message_to_shared_notebook_members(
            self.token(),
            notebook_guid,
            message_text,
            recipients,
        )
    }

    pub fn list_shared_notebooks(&self) -> Result<Vec<SharedNotebook>, StoreError> {
        self.stub.list_shared_notebooks(self.token())
    }

    pub fn expunge_shared_notebooks(&self, shared_notebook_ids: &[i64]) -> Result<i32, StoreError> {
        self.stub
            .expunge_shared_notebooks(self.token(), shared_notebook_ids)
    }

    /// Store a reference to a notebook shared by another account.
    pub fn create_linked_notebook(
        &self,
        linked_notebook: &LinkedNotebook,
    ) -> Result<LinkedNotebook, StoreError> {
        self.stub.create_linked_notebook(self.token(), linked_notebook)
    }

    pub fn update_linked_notebook(&self, linked_notebook: &LinkedNotebook) -> Result<i32, StoreError> {
        self.stub.update_linked_notebook(self.token(), linked_notebook)
    }

    /// Notebooks other accounts have shared with this one.
    pub fn list_linked_notebooks(&self) -> Result<Vec<LinkedNotebook>, StoreError> {
        self.stub.list_linked_notebooks(self.token())
    }

    pub fn expunge_linked_notebook(&self, guid: &Guid) -> Result<i32, StoreError> {
        self.stub.expunge_linked_notebook(self.token(), guid)
    }

    /// Exchange `share_key` for a credential on this endpoint, presenting
    /// this client's own credential as the caller's identity.
    pub fn authenticate_to_shared_notebook(
        &self,
        share_key: &str,
    ) -> Result<AuthenticationResult, StoreError> {
        self.stub
            .authenticate_to_shared_notebook(share_key, self.token())
    }

    /// The shared-notebook record the current credential was issued for.
    pub fn get_shared_notebook_by_auth(&self) -> Result<SharedNotebook, StoreError> {
        self.stub.get_shared_notebook_by_auth(self.token())
    }

    pub fn email_note(&self, parameters: &NoteEmailParameters) -> Result<(), StoreError> {
        self.stub.email_note(self.token(), parameters)
    }

    /// Publish a note; returns its note key.
    pub fn share_note(&self, guid: &Guid) -> Result<String, StoreError> {
        self.stub.share_note(self.token(), guid)
    }

    pub fn stop_sharing_note(&self, guid: &Guid) -> Result<(), StoreError> {
        self.stub.stop_sharing_note(self.token(), guid)
    }

    pub fn authenticate_to_shared_note(
        &self,
        guid: &Guid,
        note_key: &str,
    ) -> Result<AuthenticationResult, StoreError> {
        self.stub
            .authenticate_to_shared_note(guid, note_key, self.token())
    }

    // ------------------------------------------------------------------
    // Related content
    // ------------------------------------------------------------------

    pub fn find_related(
        &self,
        query: &RelatedQuery,
        result_spec: &RelatedResultSpec,
    ) -> Result<RelatedResult, StoreError> {
        self.stub.find_related(self.token(), query, result_spec)
    }
}

/// Shared handle to a resolved content client.
pub type NoteStoreHandle = Arc<NoteStoreClient>;
