//! Core content records: notes, notebooks, tags, saved searches, resources.
//!
//! These records are passed through the SDK unchanged.  Apart from the
//! notebook identifier and restriction fields, the SDK never looks inside
//! them.

use std::collections::{BTreeMap, BTreeSet};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::sharing::{BusinessNotebook, SharedNotebook};
use crate::userstore::User;

/// Milliseconds since the Unix epoch, as used throughout the protocol.
pub type Timestamp = i64;

// ---------------------------------------------------------------------------
// Guid
// ---------------------------------------------------------------------------

/// Globally unique identifier of a stored object.
///
/// # Examples
///
/// ```
/// use notestore_models::Guid;
///
/// let guid = Guid::new("6a1c7cde-notebook");
/// assert_eq!(guid.to_string(), "6a1c7cde-notebook");
///
/// let same: Guid = "6a1c7cde-notebook".into();
/// assert_eq!(guid, same);
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct Guid(String);

impl Guid {
    /// Create a new `Guid` from a string slice.
    pub fn new(guid: &str) -> Self {
        Self(guid.to_string())
    }

    /// Return the inner string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Guid {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Guid {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl FromStr for Guid {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Application data
// ---------------------------------------------------------------------------

/// Application-defined key/value data attached to a note or resource.
///
/// Depending on the call, only the key set or the full map is populated.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct LazyMap {
    /// The keys present in the map, when only keys were requested.
    pub keys_only: Option<BTreeSet<String>>,
    /// The full map, when values were requested.
    pub full_map: Option<BTreeMap<String, String>>,
}

// ---------------------------------------------------------------------------
// Notes and resources
// ---------------------------------------------------------------------------

/// Binary payload of a resource, with its hash and size.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Data {
    /// MD5 hash of the body.
    pub body_hash: Option<Vec<u8>>,
    /// Size of the body in bytes.
    pub size: Option<i32>,
    /// The body itself, when requested.
    pub body: Option<Vec<u8>>,
}

/// Descriptive attributes of a resource.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct ResourceAttributes {
    /// Where the resource was retrieved from.
    pub source_url: Option<String>,
    /// When the resource was captured.
    pub timestamp: Option<Timestamp>,
    /// Capture latitude.
    pub latitude: Option<f64>,
    /// Capture longitude.
    pub longitude: Option<f64>,
    /// Camera manufacturer, for images.
    pub camera_make: Option<String>,
    /// Original file name.
    pub file_name: Option<String>,
    /// Whether the resource is displayed as an attachment.
    pub attachment: Option<bool>,
    /// Application-defined data.
    pub application_data: Option<LazyMap>,
}

/// A file embedded in a note.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Resource {
    /// Identifier of the resource.
    pub guid: Option<Guid>,
    /// Identifier of the owning note.
    pub note_guid: Option<Guid>,
    /// The binary payload.
    pub data: Option<Data>,
    /// MIME type of the payload.
    pub mime: Option<String>,
    /// Width in pixels, for images.
    pub width: Option<i16>,
    /// Height in pixels, for images.
    pub height: Option<i16>,
    /// Whether the resource is live (not deleted).
    pub active: Option<bool>,
    /// Recognition index computed by the service.
    pub recognition: Option<Data>,
    /// Descriptive attributes.
    pub attributes: Option<ResourceAttributes>,
    /// Sequence number of the last change.
    pub update_sequence_num: Option<i32>,
    /// Alternate rendition of the payload.
    pub alternate_data: Option<Data>,
}

/// Descriptive attributes of a note.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct NoteAttributes {
    /// When the note's subject happened.
    pub subject_date: Option<Timestamp>,
    /// Creation latitude.
    pub latitude: Option<f64>,
    /// Creation longitude.
    pub longitude: Option<f64>,
    /// Name of the note's author.
    pub author: Option<String>,
    /// How the note was created (e.g. `mobile.android`).
    pub source: Option<String>,
    /// URL the note was clipped from.
    pub source_url: Option<String>,
    /// Application that created the note.
    pub source_application: Option<String>,
    /// Reminder ordering value.
    pub reminder_order: Option<Timestamp>,
    /// When the reminder fires.
    pub reminder_time: Option<Timestamp>,
    /// When the reminder was completed.
    pub reminder_done_time: Option<Timestamp>,
    /// Application-defined data.
    pub application_data: Option<LazyMap>,
}

/// A single note.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Note {
    /// Identifier of the note, assigned by the store.
    pub guid: Option<Guid>,
    /// Title of the note.
    pub title: Option<String>,
    /// Note body in the service's markup.
    pub content: Option<String>,
    /// MD5 hash of the content.
    pub content_hash: Option<Vec<u8>>,
    /// Length of the content in bytes.
    pub content_length: Option<i32>,
    /// Creation time.
    pub created: Option<Timestamp>,
    /// Last modification time.
    pub updated: Option<Timestamp>,
    /// Deletion time, for notes in the trash.
    pub deleted: Option<Timestamp>,
    /// Whether the note is live (not in the trash).
    pub active: Option<bool>,
    /// Sequence number of the last change.
    pub update_sequence_num: Option<i32>,
    /// Identifier of the notebook the note belongs to.
    pub notebook_guid: Option<Guid>,
    /// Identifiers of the note's tags.
    pub tag_guids: Option<Vec<Guid>>,
    /// Embedded files.
    pub resources: Option<Vec<Resource>>,
    /// Descriptive attributes.
    pub attributes: Option<NoteAttributes>,
    /// Tag names, used when creating tags implicitly.
    pub tag_names: Option<Vec<String>>,
}

// ---------------------------------------------------------------------------
// Tags and searches
// ---------------------------------------------------------------------------

/// A tag that can be attached to notes.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Tag {
    /// Identifier of the tag.
    pub guid: Option<Guid>,
    /// Display name.
    pub name: Option<String>,
    /// Identifier of the parent tag.
    pub parent_guid: Option<Guid>,
    /// Sequence number of the last change.
    pub update_sequence_num: Option<i32>,
}

/// Query syntax of a saved search.
#[derive(
    Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum QueryFormat {
    /// The service's native search grammar.
    #[default]
    User,
    /// SQL-like grammar (reserved).
    Sexp,
}

/// A stored search query.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct SavedSearch {
    /// Identifier of the search.
    pub guid: Option<Guid>,
    /// Display name.
    pub name: Option<String>,
    /// The query text.
    pub query: Option<String>,
    /// Query syntax.
    pub format: Option<QueryFormat>,
    /// Sequence number of the last change.
    pub update_sequence_num: Option<i32>,
}

// ---------------------------------------------------------------------------
// Notebooks
// ---------------------------------------------------------------------------

/// Operations the caller may not perform on a notebook.
///
/// Every flag defaults to "not restricted".
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct NotebookRestrictions {
    /// Notes may not be read.
    pub no_read_notes: Option<bool>,
    /// Notes may not be created.
    pub no_create_notes: Option<bool>,
    /// Notes may not be updated.
    pub no_update_notes: Option<bool>,
    /// Notes may not be expunged.
    pub no_expunge_notes: Option<bool>,
    /// Notes may not be shared.
    pub no_share_notes: Option<bool>,
    /// Notes may not be emailed.
    pub no_email_notes: Option<bool>,
    /// The notebook itself may not be updated.
    pub no_update_notebook: Option<bool>,
    /// The notebook may not be expunged.
    pub no_expunge_notebook: Option<bool>,
    /// Tags may not be created.
    pub no_create_tags: Option<bool>,
    /// Shared-notebook records may not be created.
    pub no_create_shared_notebooks: Option<bool>,
}

/// Public publishing settings of a notebook.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Publishing {
    /// Public URI component.
    pub uri: Option<String>,
    /// Whether notes are listed ascending.
    pub ascending: Option<bool>,
    /// Public description.
    pub public_description: Option<String>,
}

/// A notebook, as seen by the store that hosts it.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Notebook {
    /// Identifier of the notebook.
    pub guid: Option<Guid>,
    /// Display name.
    pub name: Option<String>,
    /// Sequence number of the last change.
    pub update_sequence_num: Option<i32>,
    /// Whether this is the account's default notebook.
    pub default_notebook: Option<bool>,
    /// Creation time.
    pub service_created: Option<Timestamp>,
    /// Last modification time.
    pub service_updated: Option<Timestamp>,
    /// Public publishing settings.
    pub publishing: Option<Publishing>,
    /// Whether the notebook is publicly published.
    pub published: Option<bool>,
    /// Name of the stack the notebook is filed under.
    pub stack: Option<String>,
    /// Identifiers of the notebook's shared-notebook records.
    pub shared_notebook_ids: Option<Vec<i64>>,
    /// The notebook's shared-notebook records.
    pub shared_notebooks: Option<Vec<SharedNotebook>>,
    /// Business library metadata, for business notebooks.
    pub business_notebook: Option<BusinessNotebook>,
    /// The user responsible for the notebook.
    pub contact: Option<User>,
    /// What the caller may not do with the notebook.
    pub restrictions: Option<NotebookRestrictions>,
}

impl Notebook {
    /// Build a notebook record carrying only a name, ready for creation.
    pub fn named(name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            ..Self::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guid_display_and_equality() {
        let a = Guid::new("abc");
        let b: Guid = "abc".into();
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "abc");
        assert_eq!(a.as_str(), "abc");
    }

    #[test]
    fn guid_is_a_plain_string_on_the_wire() {
        let json = serde_json::to_string(&Guid::new("g-1")).unwrap();
        assert_eq!(json, "\"g-1\"");
    }

    #[test]
    fn note_deserializes_from_partial_record() {
        let note: Note =
            serde_json::from_str(r#"{"title":"Hello","notebook_guid":"nb-1"}"#).unwrap();
        assert_eq!(note.title.as_deref(), Some("Hello"));
        assert_eq!(note.notebook_guid, Some(Guid::new("nb-1")));
        assert!(note.guid.is_none());
    }

    #[test]
    fn notebook_named_sets_only_the_name() {
        let nb = Notebook::named("Team Notes");
        assert_eq!(nb.name.as_deref(), Some("Team Notes"));
        assert!(nb.guid.is_none());
        assert!(nb.restrictions.is_none());
    }

    #[test]
    fn query_format_display() {
        assert_eq!(QueryFormat::User.to_string(), "USER");
    }
}
