//! Content store stub.

use notestore_models::{
    AuthenticationResult, ClientUsageMetrics, Guid, LazyMap, LinkedNotebook, Note,
    NoteCollectionCounts, NoteEmailParameters, NoteFilter, NoteList, NoteVersionId, Notebook,
    NotesMetadataList, NotesMetadataResultSpec, RelatedQuery, RelatedResult, RelatedResultSpec,
    Resource, ResourceAttributes, SavedSearch, SharedNotebook, SharedNotebookRecipientSettings,
    SyncChunk, SyncChunkFilter, SyncState, Tag,
};

rpc_stub! {
    /// Blocking stub for a content store.
    pub struct NoteStoreStub;
    pub const NOTE_STORE_OPERATIONS;

    // -- sync -------------------------------------------------------------
    fn get_sync_state(authentication_token: &str) -> SyncState;
    fn get_sync_state_with_metrics(
        authentication_token: &str,
        client_metrics: &ClientUsageMetrics,
    ) -> SyncState;
    fn get_sync_chunk(
        authentication_token: &str,
        after_usn: i32,
        max_entries: i32,
        full_sync_only: bool,
    ) -> SyncChunk;
    fn get_filtered_sync_chunk(
        authentication_token: &str,
        after_usn: i32,
        max_entries: i32,
        filter: &SyncChunkFilter,
    ) -> SyncChunk;
    fn get_linked_notebook_sync_state(
        authentication_token: &str,
        linked_notebook: &LinkedNotebook,
    ) -> SyncState;
    fn get_linked_notebook_sync_chunk(
        authentication_token: &str,
        linked_notebook: &LinkedNotebook,
        after_usn: i32,
        max_entries: i32,
        full_sync_only: bool,
    ) -> SyncChunk;

    // -- notebooks --------------------------------------------------------
    fn list_notebooks(authentication_token: &str) -> Vec<Notebook>;
    fn get_notebook(authentication_token: &str, guid: &Guid) -> Notebook;
    fn get_default_notebook(authentication_token: &str) -> Notebook;
    fn create_notebook(authentication_token: &str, notebook: &Notebook) -> Notebook;
    fn update_notebook(authentication_token: &str, notebook: &Notebook) -> i32;
    fn expunge_notebook(authentication_token: &str, guid: &Guid) -> i32;

    // -- tags -------------------------------------------------------------
    fn list_tags(authentication_token: &str) -> Vec<Tag>;
    fn list_tags_by_notebook(authentication_token: &str, notebook_guid: &Guid) -> Vec<Tag>;
    fn get_tag(authentication_token: &str, guid: &Guid) -> Tag;
    fn create_tag(authentication_token: &str, tag: &Tag) -> Tag;
    fn update_tag(authentication_token: &str, tag: &Tag) -> i32;
    fn untag_all(authentication_token: &str, guid: &Guid) -> ();
    fn expunge_tag(authentication_token: &str, guid: &Guid) -> i32;

    // -- saved searches ---------------------------------------------------
    fn list_searches(authentication_token: &str) -> Vec<SavedSearch>;
    fn get_search(authentication_token: &str, guid: &Guid) -> SavedSearch;
    fn create_search(authentication_token: &str, search: &SavedSearch) -> SavedSearch;
    fn update_search(authentication_token: &str, search: &SavedSearch) -> i32;
    fn expunge_search(authentication_token: &str, guid: &Guid) -> i32;

    // -- note search ------------------------------------------------------
    fn find_notes(
        authentication_token: &str,
        filter: &NoteFilter,
        offset: i32,
        max_notes: i32,
    ) -> NoteList;
    fn find_note_offset(authentication_token: &str, filter: &NoteFilter, guid: &Guid) -> i32;
    fn find_notes_metadata(
        authentication_token: &str,
        filter: &NoteFilter,
        offset: i32,
        max_notes: i32,
        result_spec: &NotesMetadataResultSpec,
    ) -> NotesMetadataList;
    fn find_note_counts(
        authentication_token: &str,
        filter: &NoteFilter,
        with_trash: bool,
    ) -> NoteCollectionCounts;

    // -- notes ------------------------------------------------------------
    fn get_note(
        authentication_token: &str,
        guid: &Guid,
        with_content: bool,
        with_resources_data: bool,
        with_resources_recognition: bool,
        with_resources_alternate_data: bool,
    ) -> Note;
    fn get_note_application_data(authentication_token: &str, guid: &Guid) -> LazyMap;
    fn get_note_application_data_entry(authentication_token: &str, guid: &Guid, key: &str) -> String;
    fn set_note_application_data_entry(
        authentication_token: &str,
        guid: &Guid,
        key: &str,
        value: &str,
    ) -> i32;
    fn unset_note_application_data_entry(authentication_token: &str, guid: &Guid, key: &str) -> i32;
    fn get_note_content(authentication_token: &str, guid: &Guid) -> String;
    fn get_note_search_text(
        authentication_token: &str,
        guid: &Guid,
        note_only: bool,
        tokenize_for_indexing: bool,
    ) -> String;
    fn get_resource_search_text(authentication_token: &str, guid: &Guid) -> String;
    fn get_note_tag_names(authentication_token: &str, guid: &Guid) -> Vec<String>;
    fn create_note(authentication_token: &str, note: &Note) -> Note;
    fn update_note(authentication_token: &str, note: &Note) -> Note;
    fn delete_note(authentication_token: &str, guid: &Guid) -> i32;
    fn expunge_note(authentication_token: &str, guid: &Guid) -> i32;
    fn expunge_notes(authentication_token: &str, note_guids: &[Guid]) -> i32;
    fn expunge_inactive_notes(authentication_token: &str) -> i32;
    fn copy_note(authentication_token: &str, note_guid: &Guid, to_notebook_guid: &Guid) -> Note;
    fn list_note_versions(authentication_token: &str, note_guid: &Guid) -> Vec<NoteVersionId>;
    fn get_note_version(
        authentication_token: &str,
        note_guid: &Guid,
        update_sequence_num: i32,
        with_resources_data: bool,
        with_resources_recognition: bool,
        with_resources_alternate_data: bool,
    ) -> Note;

    // -- resources --------------------------------------------------------
    fn get_resource(
        authentication_token: &str,
        guid: &Guid,
        with_data: bool,
        with_recognition: bool,
        with_attributes: bool,
        with_alternate_data: bool,
    ) -> Resource;
    fn get_resource_application_data(authentication_token: &str, guid: &Guid) -> LazyMap;
    fn get_resource_application_data_entry(
        authentication_token: &str,
        guid: &Guid,
        key: &str,
    ) -> String;
    fn set_resource_application_data_entry(
        authentication_token: &str,
        guid: &Guid,
        key: &str,
        value: &str,
    ) -> i32;
    fn unset_resource_application_data_entry(
        authentication_token: &str,
        guid: &Guid,
        key: &str,
    ) -> i32;
    fn update_resource(authentication_token: &str, resource: &Resource) -> i32;
    fn get_resource_data(authentication_token: &str, guid: &Guid) -> Vec<u8>;
    fn get_resource_by_hash(
        authentication_token: &str,
        note_guid: &Guid,
        content_hash: &[u8],
        with_data: bool,
        with_recognition: bool,
        with_alternate_data: bool,
    ) -> Resource;
    fn get_resource_recognition(authentication_token: &str, guid: &Guid) -> Vec<u8>;
    fn get_resource_alternate_data(authentication_token: &str, guid: &Guid) -> Vec<u8>;
    fn get_resource_attributes(authentication_token: &str, guid: &Guid) -> ResourceAttributes;

    // -- sharing ----------------------------------------------------------
    /// Does not take a token: public notebooks are readable by anyone.
    fn get_public_notebook(user_id: i32, public_uri: &str) -> Notebook;
    fn create_shared_notebook(
        authentication_token: &str,
        shared_notebook: &SharedNotebook,
    ) -> SharedNotebook;
    fn update_shared_notebook(authentication_token: &str, shared_notebook: &SharedNotebook) -> i32;
    fn set_shared_notebook_recipient_settings(
        authentication_token: &str,
        shared_notebook_id: i64,
        recipient_settings: &SharedNotebookRecipientSettings,
    ) -> i32;
    fn send_message_to_shared_notebook_members(
        authentication_token: &str,
        notebook_guid: &Guid,
        message_text: &str,
        recipients: &[String],
    ) -> i32;
    fn list_shared_notebooks(authentication_token: &str) -> Vec<SharedNotebook>;
    fn expunge_shared_notebooks(authentication_token: &str, shared_notebook_ids: &[i64]) -> i32;
    fn create_linked_notebook(
        authentication_token: &str,
        linked_notebook: &LinkedNotebook,
    ) -> LinkedNotebook;
    fn update_linked_notebook(authentication_token: &str, linked_notebook: &LinkedNotebook) -> i32;
    fn list_linked_notebooks(authentication_token: &str) -> Vec<LinkedNotebook>;
    fn expunge_linked_notebook(authentication_token: &str, guid: &Guid) -> i32;
    /// Exchange a share key for a token scoped to the shared notebook.
    fn authenticate_to_shared_notebook(
        share_key: &str,
        authentication_token: &str,
    ) -> AuthenticationResult;
    fn get_shared_notebook_by_auth(authentication_token: &str) -> SharedNotebook;
    fn email_note(authentication_token: &str, parameters: &NoteEmailParameters) -> ();
    fn share_note(authentication_token: &str, guid: &Guid) -> String;
    fn stop_sharing_note(authentication_token: &str, guid: &Guid) -> ();
    /// Exchange a note key for a token scoped to one shared note.
    fn authenticate_to_shared_note(
        guid: &Guid,
        note_key: &str,
        authentication_token: &str,
    ) -> AuthenticationResult;

    // -- related content --------------------------------------------------
    fn find_related(
        authentication_token: &str,
        query: &RelatedQuery,
        result_spec: &RelatedResultSpec,
    ) -> RelatedResult;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedTransport;
    use notestore_models::{EdamErrorCode, RpcFault};
    use serde_json::json;

    #[test]
    fn manifest_is_complete_and_unique() {
        use std::collections::BTreeSet;
        let unique: BTreeSet<_> = NOTE_STORE_OPERATIONS.iter().collect();
        assert_eq!(unique.len(), NOTE_STORE_OPERATIONS.len());
        assert_eq!(NOTE_STORE_OPERATIONS.len(), 75);
        assert!(NOTE_STORE_OPERATIONS.contains(&"authenticate_to_shared_notebook"));
    }

    #[test]
    fn records_are_encoded_by_parameter_name() {
        let transport = ScriptedTransport::new("https://svc/shard/s1/notestore");
        transport.respond("create_notebook", |params| {
            assert_eq!(params["authentication_token"], "tok");
            assert_eq!(params["notebook"]["name"], "Inbox");
            Ok(json!({ "guid": "nb-1", "name": "Inbox" }))
        });
        let stub = NoteStoreStub::new(transport);
        let created = stub
            .create_notebook("tok", &Notebook::named("Inbox"))
            .unwrap();
        assert_eq!(created.guid, Some(Guid::new("nb-1")));
    }

    #[test]
    fn faults_are_mapped_to_store_errors() {
        let transport = ScriptedTransport::new("https://svc/shard/s1/notestore");
        transport.respond("get_notebook", |_| {
            Err(RpcFault::not_found("Notebook.guid", "missing"))
        });
        transport.respond("list_notebooks", |_| {
            Err(RpcFault::user(EdamErrorCode::AuthExpired, "authenticationToken"))
        });
        let stub = NoteStoreStub::new(transport);
        assert!(stub.get_notebook("tok", &Guid::new("missing")).unwrap_err().is_not_found());
        assert_eq!(
            stub.list_notebooks("tok").unwrap_err().auth_kind(),
            Some(crate::AuthErrorKind::ExpiredCredential)
        );
    }

    #[test]
    fn public_notebook_sends_no_token() {
        let transport = ScriptedTransport::new("https://svc/shard/s1/notestore");
        transport.respond("get_public_notebook", |params| {
            assert!(params.get("authentication_token").is_none());
            assert_eq!(params["user_id"], 7);
            Ok(json!({ "name": "Recipes" }))
        });
        let stub = NoteStoreStub::new(transport);
        let nb = stub.get_public_notebook(7, "recipes").unwrap();
        assert_eq!(nb.name.as_deref(), Some("Recipes"));
    }
}
