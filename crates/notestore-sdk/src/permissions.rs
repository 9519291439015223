//! Effective permissions on a shared notebook.
//!
//! Derived on demand from the notebook record the hosting store returns;
//! nothing here is cached, so a privilege change on the owner's side is
//! visible on the next lookup.

use notestore_models::{Notebook, SharedNotebookPrivilegeLevel};

/// What the holder of a share key may do with a notebook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotebookPermissions {
    /// Access tier granted by the owner, if the record carries one.
    pub privilege: Option<SharedNotebookPrivilegeLevel>,
    /// Whether the store forbids creating notes regardless of privilege.
    pub no_create_notes: bool,
}

impl NotebookPermissions {
    /// Derive the permissions granted through `share_key`.
    ///
    /// The privilege comes from the shared-notebook record whose share key
    /// matches; business notebooks without such a record fall back to the
    /// business library privilege.
    pub fn derive(notebook: &Notebook, share_key: Option<&str>) -> Self {
        let shared = notebook.shared_notebooks.as_deref().unwrap_or_default();
        let from_share = share_key.and_then(|key| {
            shared
                .iter()
                .find(|s| s.share_key.as_deref() == Some(key))
                .and_then(|s| s.privilege)
        });
        let privilege = from_share.or_else(|| {
            notebook
                .business_notebook
                .as_ref()
                .and_then(|b| b.privilege)
        });
        let no_create_notes = notebook
            .restrictions
            .as_ref()
            .and_then(|r| r.no_create_notes)
            .unwrap_or(false);

        Self {
            privilege,
            no_create_notes,
        }
    }

    /// Whether notes may be created and modified.
    pub fn is_writable(&self) -> bool {
        self.privilege
            .is_some_and(SharedNotebookPrivilegeLevel::permits_modification)
            && !self.no_create_notes
    }
}
