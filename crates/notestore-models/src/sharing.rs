//! Sharing records: shared notebooks, linked notebooks, privilege levels.
//!
//! A [`SharedNotebook`] lives in the *owner's* store and grants a recipient
//! access to one notebook.  A [`LinkedNotebook`] lives in the *recipient's*
//! store and points back at the owner's store: it carries the share key and
//! the endpoint needed to reach the shared notebook.

use serde::{Deserialize, Serialize};

use crate::types::{Guid, Timestamp};

// ---------------------------------------------------------------------------
// SharedNotebookPrivilegeLevel
// ---------------------------------------------------------------------------

/// Access tier granted on a shared notebook, from weakest to strongest.
#[derive(
    Serialize,
    Deserialize,
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum SharedNotebookPrivilegeLevel {
    /// Read notes only.
    ReadNotebook,
    /// Read notes, see activity and re-share with others.
    ReadNotebookPlusActivity,
    /// Read, create and modify notes.
    ModifyNotebookPlusActivity,
    /// Everything, including managing the notebook's sharing.
    FullAccess,
    /// Full access granted through business membership.
    BusinessFullAccess,
}

impl SharedNotebookPrivilegeLevel {
    /// Whether this tier allows creating or changing notes.
    ///
    /// ```
    /// use notestore_models::SharedNotebookPrivilegeLevel as Level;
    ///
    /// assert!(!Level::ReadNotebook.permits_modification());
    /// assert!(!Level::ReadNotebookPlusActivity.permits_modification());
    /// assert!(Level::ModifyNotebookPlusActivity.permits_modification());
    /// assert!(Level::BusinessFullAccess.permits_modification());
    /// ```
    pub fn permits_modification(self) -> bool {
        self >= Self::ModifyNotebookPlusActivity
    }

    /// Whether this tier allows managing who the notebook is shared with.
    pub fn permits_sharing(self) -> bool {
        self >= Self::FullAccess
    }
}

// ---------------------------------------------------------------------------
// SharedNotebook
// ---------------------------------------------------------------------------

/// Per-recipient notification preferences for a shared notebook.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct SharedNotebookRecipientSettings {
    /// Send reminder notifications by email.
    pub reminder_notify_email: Option<bool>,
    /// Show reminder notifications in the application.
    pub reminder_notify_in_app: Option<bool>,
}

/// Grant of access to one notebook for one recipient, stored by the owner.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct SharedNotebook {
    /// Identifier of the grant.
    pub id: Option<i64>,
    /// Identifier of the owning user.
    pub user_id: Option<i32>,
    /// Identifier of the shared notebook in the owner's store.
    pub notebook_guid: Option<Guid>,
    /// Recipient email address.
    pub email: Option<String>,
    /// Whether the recipient may modify notes (legacy flag).
    pub notebook_modifiable: Option<bool>,
    /// Creation time.
    pub service_created: Option<Timestamp>,
    /// Last modification time.
    pub service_updated: Option<Timestamp>,
    /// Key the recipient exchanges for a notebook-scoped credential.
    pub share_key: Option<String>,
    /// Recipient username, when the recipient has an account.
    pub username: Option<String>,
    /// Access tier granted to the recipient.
    pub privilege: Option<SharedNotebookPrivilegeLevel>,
    /// Recipient notification preferences.
    pub recipient_settings: Option<SharedNotebookRecipientSettings>,
}

// ---------------------------------------------------------------------------
// BusinessNotebook
// ---------------------------------------------------------------------------

/// Business library metadata of a notebook owned by an organization.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct BusinessNotebook {
    /// Description shown in the business library.
    pub notebook_description: Option<String>,
    /// Access tier every business member receives.
    pub privilege: Option<SharedNotebookPrivilegeLevel>,
    /// Whether the notebook is recommended to all members.
    pub recommended: Option<bool>,
}

// ---------------------------------------------------------------------------
// LinkedNotebook
// ---------------------------------------------------------------------------

/// Pointer, stored by a recipient, to a notebook owned by another account.
///
/// # Examples
///
/// ```
/// use notestore_models::LinkedNotebook;
///
/// let linked = LinkedNotebook::new("Team Notes", "s-key", "https://host/shard/s2/notestore");
/// assert_eq!(linked.share_key.as_deref(), Some("s-key"));
/// assert!(!linked.is_business());
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct LinkedNotebook {
    /// Name the recipient sees for the notebook.
    pub share_name: Option<String>,
    /// Username of the owning account.
    pub username: Option<String>,
    /// Shard hosting the owning account.
    pub shard_id: Option<String>,
    /// Key exchanged for a notebook-scoped credential.
    pub share_key: Option<String>,
    /// Public URI, for publicly published notebooks.
    pub uri: Option<String>,
    /// Identifier of this linked record in the recipient's store.
    pub guid: Option<Guid>,
    /// Sequence number of the last change.
    pub update_sequence_num: Option<i32>,
    /// Content endpoint of the owning account.
    pub note_store_url: Option<String>,
    /// Web API prefix of the owning account.
    pub web_api_url_prefix: Option<String>,
    /// Stack the recipient files the notebook under.
    pub stack: Option<String>,
    /// Identifier of the business owning the notebook, for business notebooks.
    pub business_id: Option<i32>,
    /// Identifier of the notebook in the owner's store, when known.
    pub notebook_guid: Option<Guid>,
}

impl LinkedNotebook {
    /// Build a linked reference from the three fields resolution needs.
    pub fn new(share_name: &str, share_key: &str, note_store_url: &str) -> Self {
        Self {
            share_name: Some(share_name.to_string()),
            share_key: Some(share_key.to_string()),
            note_store_url: Some(note_store_url.to_string()),
            ..Self::default()
        }
    }

    /// Whether the notebook is owned by a business.
    pub fn is_business(&self) -> bool {
        self.business_id.is_some()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
