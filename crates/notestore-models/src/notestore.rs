//! Request and response records of the content store: sync, search,
//! related-content and email parameters.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::sharing::LinkedNotebook;
use crate::types::{Guid, Note, NoteAttributes, Notebook, Resource, SavedSearch, Tag, Timestamp};

// ---------------------------------------------------------------------------
// Sync
// ---------------------------------------------------------------------------

/// Summary of a store's sync position.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct SyncState {
    /// Service time when the state was produced.
    pub current_time: Timestamp,
    /// Clients that last synced before this time must do a full sync.
    pub full_sync_before: Timestamp,
    /// Highest update sequence number in the store.
    pub update_count: i32,
    /// Bytes uploaded in the current accounting period.
    pub uploaded: Option<i64>,
}

/// Usage counters a client may report along with its sync state request.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct ClientUsageMetrics {
    /// Number of sessions since the last report.
    pub sessions: Option<i32>,
}

/// Selects which object kinds a filtered sync chunk contains.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct SyncChunkFilter {
    /// Include notes.
    pub include_notes: Option<bool>,
    /// Include the resources of included notes.
    pub include_note_resources: Option<bool>,
    /// Include the attributes of included notes.
    pub include_note_attributes: Option<bool>,
    /// Include notebooks.
    pub include_notebooks: Option<bool>,
    /// Include tags.
    pub include_tags: Option<bool>,
    /// Include saved searches.
    pub include_searches: Option<bool>,
    /// Include resources changed independently of their note.
    pub include_resources: Option<bool>,
    /// Include linked notebooks.
    pub include_linked_notebooks: Option<bool>,
    /// Include identifiers of expunged objects.
    pub include_expunged: Option<bool>,
    /// Include full note application data maps.
    pub include_note_application_data_full_map: Option<bool>,
    /// Include full resource application data maps.
    pub include_resource_application_data_full_map: Option<bool>,
    /// Only include notes whose content class matches.
    pub require_note_content_class: Option<String>,
}

/// A batch of changes since a given update sequence number.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct SyncChunk {
    /// Service time when the chunk was produced.
    pub current_time: Timestamp,
    /// Highest sequence number contained in the chunk.
    pub chunk_high_usn: Option<i32>,
    /// Highest sequence number in the store.
    pub update_count: i32,
    /// Changed notes.
    pub notes: Option<Vec<Note>>,
    /// Changed notebooks.
    pub notebooks: Option<Vec<Notebook>>,
    /// Changed tags.
    pub tags: Option<Vec<Tag>>,
    /// Changed saved searches.
    pub searches: Option<Vec<SavedSearch>>,
    /// Changed resources.
    pub resources: Option<Vec<Resource>>,
    /// Identifiers of expunged notes.
    pub expunged_notes: Option<Vec<Guid>>,
    /// Identifiers of expunged notebooks.
    pub expunged_notebooks: Option<Vec<Guid>>,
    /// Identifiers of expunged tags.
    pub expunged_tags: Option<Vec<Guid>>,
    /// Identifiers of expunged saved searches.
    pub expunged_searches: Option<Vec<Guid>>,
    /// Changed linked notebooks.
    pub linked_notebooks: Option<Vec<LinkedNotebook>>,
    /// Identifiers of expunged linked notebooks.
    pub expunged_linked_notebooks: Option<Vec<Guid>>,
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

/// Criteria selecting a set of notes.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct NoteFilter {
    /// Sort order code.
    pub order: Option<i32>,
    /// Sort ascending instead of descending.
    pub ascending: Option<bool>,
    /// Search query in the service's grammar.
    pub words: Option<String>,
    /// Restrict to one notebook.
    pub notebook_guid: Option<Guid>,
    /// Restrict to notes carrying all these tags.
    pub tag_guids: Option<Vec<Guid>>,
    /// Time zone used to interpret relative dates in the query.
    pub timezone: Option<String>,
    /// Search the trash instead of live notes.
    pub inactive: Option<bool>,
    /// Query whose matches should be highlighted.
    pub emphasized: Option<String>,
}

/// One page of full note records matching a filter.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct NoteList {
    /// Offset of the first note in this page.
    pub start_index: i32,
    /// Number of matching notes overall.
    pub total_notes: i32,
    /// The notes of this page.
    pub notes: Vec<Note>,
    /// Query words the service ignored.
    pub stopped_words: Option<Vec<String>>,
    /// Query words the service searched for.
    pub searched_words: Option<Vec<String>>,
    /// Store update count when the search ran.
    pub update_count: Option<i32>,
}

/// Which fields of [`NoteMetadata`] a metadata search fills in.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct NotesMetadataResultSpec {
    /// Fill in the title.
    pub include_title: Option<bool>,
    /// Fill in the content length.
    pub include_content_length: Option<bool>,
    /// Fill in the creation time.
    pub include_created: Option<bool>,
    /// Fill in the modification time.
    pub include_updated: Option<bool>,
    /// Fill in the deletion time.
    pub include_deleted: Option<bool>,
    /// Fill in the update sequence number.
    pub include_update_sequence_num: Option<bool>,
    /// Fill in the notebook identifier.
    pub include_notebook_guid: Option<bool>,
    /// Fill in the tag identifiers.
    pub include_tag_guids: Option<bool>,
    /// Fill in the attributes.
    pub include_attributes: Option<bool>,
    /// Fill in the MIME type of the largest resource.
    pub include_largest_resource_mime: Option<bool>,
    /// Fill in the size of the largest resource.
    pub include_largest_resource_size: Option<bool>,
}

/// Lightweight description of a note returned by metadata searches.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct NoteMetadata {
    /// Identifier of the note.
    pub guid: Guid,
    /// Title of the note.
    pub title: Option<String>,
    /// Content length in bytes.
    pub content_length: Option<i32>,
    /// Creation time.
    pub created: Option<Timestamp>,
    /// Last modification time.
    pub updated: Option<Timestamp>,
    /// Deletion time.
    pub deleted: Option<Timestamp>,
    /// Sequence number of the last change.
    pub update_sequence_num: Option<i32>,
    /// Identifier of the owning notebook.
    pub notebook_guid: Option<Guid>,
    /// Identifiers of the note's tags.
    pub tag_guids: Option<Vec<Guid>>,
    /// Descriptive attributes.
    pub attributes: Option<NoteAttributes>,
    /// MIME type of the largest resource.
    pub largest_resource_mime: Option<String>,
    /// Size of the largest resource.
    pub largest_resource_size: Option<i32>,
}

/// One page of note metadata matching a filter.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct NotesMetadataList {
    /// Offset of the first note in this page.
    pub start_index: i32,
    /// Number of matching notes overall.
    pub total_notes: i32,
    /// The notes of this page.
    pub notes: Vec<NoteMetadata>,
    /// Query words the service ignored.
    pub stopped_words: Option<Vec<String>>,
    /// Query words the service searched for.
    pub searched_words: Option<Vec<String>>,
    /// Store update count when the search ran.
    pub update_count: Option<i32>,
}

/// Number of matching notes per notebook and per tag.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct NoteCollectionCounts {
    /// Matching notes per notebook identifier.
    pub notebook_counts: Option<BTreeMap<Guid, i32>>,
    /// Matching notes per tag identifier.
    pub tag_counts: Option<BTreeMap<Guid, i32>>,
    /// Matching notes in the trash.
    pub trash_count: Option<i32>,
}

/// A stored historical version of a note.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct NoteVersionId {
    /// Sequence number identifying the version.
    pub update_sequence_num: i32,
    /// Modification time recorded in the version.
    pub updated: Timestamp,
    /// When the service saved the version.
    pub saved: Timestamp,
    /// Title recorded in the version.
    pub title: String,
}

// ---------------------------------------------------------------------------
// Related content
// ---------------------------------------------------------------------------

/// What to find related content for.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct RelatedQuery {
    /// An existing note.
    pub note_guid: Option<Guid>,
    /// Free text.
    pub plain_text: Option<String>,
    /// Restricts candidate notes.
    pub filter: Option<NoteFilter>,
    /// A URI the content was found at.
    pub reference_uri: Option<String>,
}

/// How much related content to return.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct RelatedResultSpec {
    /// Maximum number of notes.
    pub max_notes: Option<i32>,
    /// Maximum number of notebooks.
    pub max_notebooks: Option<i32>,
    /// Maximum number of tags.
    pub max_tags: Option<i32>,
    /// Only return notebooks the caller can write to.
    pub writable_notebooks_only: Option<bool>,
    /// Also return the notebooks containing the related notes.
    pub include_containing_notebooks: Option<bool>,
}

/// Content related to a [`RelatedQuery`].
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct RelatedResult {
    /// Related notes.
    pub notes: Option<Vec<Note>>,
    /// Related notebooks.
    pub notebooks: Option<Vec<Notebook>>,
    /// Related tags.
    pub tags: Option<Vec<Tag>>,
    /// Notebooks containing the related notes.
    pub containing_notebooks: Option<Vec<Notebook>>,
}

// ---------------------------------------------------------------------------
// Email
// ---------------------------------------------------------------------------

/// Parameters for sending a note by email.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct NoteEmailParameters {
    /// Identifier of a stored note to send.
    pub guid: Option<Guid>,
    /// An unsaved note to send instead.
    pub note: Option<Note>,
    /// Primary recipients.
    pub to_addresses: Option<Vec<String>>,
    /// Copied recipients.
    pub cc_addresses: Option<Vec<String>>,
    /// Subject line.
    pub subject: Option<String>,
    /// Personal message placed above the note.
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collection_counts_keyed_by_guid() {
        let mut counts = BTreeMap::new();
        counts.insert(Guid::new("nb-1"), 3);
        let value = NoteCollectionCounts {
            notebook_counts: Some(counts),
            ..NoteCollectionCounts::default()
        };
        let json = serde_json::to_value(&value).unwrap();
        assert_eq!(json["notebook_counts"]["nb-1"], 3);
    }

    #[test]
    fn empty_sync_chunk_decodes() {
        let chunk: SyncChunk = serde_json::from_str(r#"{"update_count":42}"#).unwrap();
        assert_eq!(chunk.update_count, 42);
        assert!(chunk.notes.is_none());
    }
}
