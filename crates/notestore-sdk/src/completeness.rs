//! Completeness of the wrapper clients.
//!
//! Every operation of a protocol stub must be reachable under the same name
//! on each client wrapping it, except for names on that wrapper's explicit
//! ignore-list.  The operation names come from the manifests emitted by the
//! stub declarations ([`USER_STORE_OPERATIONS`](crate::protocol::USER_STORE_OPERATIONS),
//! [`NOTE_STORE_OPERATIONS`](crate::protocol::NOTE_STORE_OPERATIONS)); the
//! names a wrapper declares are read from its source with
//! [`declared_operations`].
//!
//! The check itself runs in this module's tests.

use std::collections::BTreeSet;

/// Account operations [`UserStoreClient`](crate::UserStoreClient) does not
/// wrap.
pub const USER_STORE_CLIENT_IGNORED: &[&str] = &[];

/// Content operations [`NoteStoreClient`](crate::NoteStoreClient) does not
/// wrap.
pub const NOTE_STORE_CLIENT_IGNORED: &[&str] = &[];

/// Content operations the linked resolver leaves to the handle returned by
/// `get_client`.
pub const LINKED_NOTE_STORE_CLIENT_IGNORED: &[&str] = &[
    "get_sync_state",
    "get_sync_state_with_metrics",
    "get_sync_chunk",
    "get_filtered_sync_chunk",
    "get_linked_notebook_sync_state",
    "get_linked_notebook_sync_chunk",
    "get_notebook",
    "get_default_notebook",
    "create_notebook",
    "update_notebook",
    "expunge_notebook",
    "list_tags",
    "list_tags_by_notebook",
    "get_tag",
    "create_tag",
    "update_tag",
    "untag_all",
    "expunge_tag",
    "list_searches",
    "get_search",
    "create_search",
    "update_search",
    "expunge_search",
    "find_notes",
    "find_note_offset",
    "find_notes_metadata",
    "find_note_counts",
    "get_note",
    "get_note_application_data",
    "get_note_application_data_entry",
    "set_note_application_data_entry",
    "unset_note_application_data_entry",
    "get_note_content",
    "get_note_search_text",
    "get_resource_search_text",
    "get_note_tag_names",
    "update_note",
    "delete_note",
    "expunge_note",
    "expunge_notes",
    "expunge_inactive_notes",
    "copy_note",
    "list_note_versions",
    "get_note_version",
    "get_resource",
    "get_resource_application_data",
    "get_resource_application_data_entry",
    "set_resource_application_data_entry",
    "unset_resource_application_data_entry",
    "update_resource",
    "get_resource_data",
    "get_resource_by_hash",
    "get_resource_recognition",
    "get_resource_alternate_data",
    "get_resource_attributes",
    "get_public_notebook",
    "create_shared_notebook",
    "update_shared_notebook",
    "set_shared_notebook_recipient_settings",
    "send_message_to_shared_notebook_members",
    "list_shared_notebooks",
    "expunge_shared_notebooks",
    "create_linked_notebook",
    "update_linked_notebook",
    "list_linked_notebooks",
    "expunge_linked_notebook",
    "authenticate_to_shared_notebook",
    "get_shared_notebook_by_auth",
    "email_note",
    "share_note",
    "stop_sharing_note",
    "authenticate_to_shared_note",
    "find_related",
];

/// Content operations the business resolver leaves to the handle returned
/// by `get_client`.
pub const BUSINESS_NOTE_STORE_CLIENT_IGNORED: &[&str] = &[
    "get_sync_state",
    "get_sync_state_with_metrics",
    "get_sync_chunk",
    "get_filtered_sync_chunk",
    "get_linked_notebook_sync_state",
    "get_linked_notebook_sync_chunk",
    "get_notebook",
    "get_default_notebook",
    "update_notebook",
    "expunge_notebook",
    "list_tags",
    "list_tags_by_notebook",
    "get_tag",
    "create_tag",
    "update_tag",
    "untag_all",
    "expunge_tag",
    "list_searches",
    "get_search",
    "create_search",
    "update_search",
    "expunge_search",
    "find_notes",
    "find_note_offset",
    "find_notes_metadata",
    "find_note_counts",
    "get_note",
    "get_note_application_data",
    "get_note_application_data_entry",
    "set_note_application_data_entry",
    "unset_note_application_data_entry",
    "get_note_content",
    "get_note_search_text",
    "get_resource_search_text",
    "get_note_tag_names",
    "update_note",
    "delete_note",
    "expunge_note",
    "expunge_notes",
    "expunge_inactive_notes",
    "copy_note",
    "list_note_versions",
    "get_note_version",
    "get_resource",
    "get_resource_application_data",
    "get_resource_application_data_entry",
    "set_resource_application_data_entry",
    "unset_resource_application_data_entry",
    "update_resource",
    "get_resource_data",
    "get_resource_by_hash",
    "get_resource_recognition",
    "get_resource_alternate_data",
    "get_resource_attributes",
    "get_public_notebook",
    "create_shared_notebook",
    "update_shared_notebook",
    "set_shared_notebook_recipient_settings",
    "send_message_to_shared_notebook_members",
    "list_shared_notebooks",
    "expunge_shared_notebooks",
    "create_linked_notebook",
    "update_linked_notebook",
    "list_linked_notebooks",
    "expunge_linked_notebook",
    "authenticate_to_shared_notebook",
    "get_shared_notebook_by_auth",
    "email_note",
    "share_note",
    "stop_sharing_note",
    "authenticate_to_shared_note",
    "find_related",
];

/// Names of the functions declared in the `impl` blocks of `type_name`.
///
/// Inherent blocks contribute their `pub fn`s; trait impls contribute every
/// `fn`, since trait methods are public through the trait.  Only top-level
/// blocks are scanned, so test modules are skipped.
pub fn declared_operations(source: &str, type_name: &str) -> BTreeSet<String> {
    let mut declared = BTreeSet::new();
    let mut depth = 0usize;
    // (depth of the block body, whether it is a trait impl)
    let mut current: Option<(usize, bool)> = None;

    for line in source.lines() {
        let code = strip_comment(line);
        let trimmed = code.trim();

        if depth == 0 && current.is_none() {
            if let Some(is_trait) = impl_header(trimmed, type_name) {
                current = Some((1, is_trait));
            }
        } else if let Some((body, is_trait)) = current {
            if depth == body {
                let prefix = if is_trait { "fn " } else { "pub fn " };
                if let Some(name) = fn_name(trimmed, prefix) {
                    declared.insert(name.to_string());
                }
            }
        }

        depth = (depth + count(code, '{')).saturating_sub(count(code, '}'));
        if depth == 0 {
            current = None;
        }
    }
    declared
}

/// Names of the methods declared by `pub trait trait_name`.
pub fn trait_operations(source: &str, trait_name: &str) -> BTreeSet<String> {
    let header = format!("pub trait {trait_name}");
    let mut declared = BTreeSet::new();
    let mut depth = 0usize;
    let mut inside = false;

    for line in source.lines() {
        let code = strip_comment(line);
        let trimmed = code.trim();
        if depth == 0 && trimmed.starts_with(&header) {
            inside = true;
        } else if inside && depth == 1 {
            if let Some(name) = fn_name(trimmed, "fn ") {
                declared.insert(name.to_string());
            }
        }
        depth = (depth + count(code, '{')).saturating_sub(count(code, '}'));
        if depth == 0 {
            inside = false;
        }
    }
    declared
}

/// Protocol operations neither declared nor ignored, in protocol order.
pub fn missing_operations<'a>(
    protocol: &[&'a str],
    declared: &BTreeSet<String>,
    ignored: &[&str],
) -> Vec<&'a str> {
    protocol
        .iter()
        .copied()
        .filter(|op| !declared.contains(*op) && !ignored.contains(op))
        .collect()
}

/// Ignore-list entries that are not protocol operations or are declared
/// after all.
pub fn stale_ignores<'a>(
    protocol: &[&str],
    declared: &BTreeSet<String>,
    ignored: &[&'a str],
) -> Vec<&'a str> {
    ignored
        .iter()
        .copied()
        .filter(|op| !protocol.contains(op) || declared.contains(*op))
        .collect()
}

/// `Some(is_trait_impl)` when `line` opens an impl block for `type_name`.
fn impl_header(line: &str, type_name: &str) -> Option<bool> {
    let rest = line.strip_prefix("impl")?;
    if !(rest.starts_with(' ') || rest.starts_with('<')) || !line.ends_with('{') {
        return None;
    }
    let rest = rest.trim_end_matches('{').trim();
    let (target, is_trait) = match rest.rsplit_once(" for ") {
        Some((_, target)) => (target, true),
        None => (rest, false),
    };
    let target = target.split('<').next()?.trim();
    let target = target.rsplit("::").next()?;
    (target == type_name).then_some(is_trait)
}

fn fn_name<'a>(line: &'a str, prefix: &str) -> Option<&'a str> {
    let rest = line.strip_prefix(prefix)?;
    let end = rest.find(|c: char| !(c.is_alphanumeric() || c == '_'))?;
    Some(&rest[..end])
}

/// Drop a trailing `//` comment, ignoring `//` inside string literals.
fn strip_comment(line: &str) -> &str {
    let mut in_string = false;
    let mut escaped = false;
    let bytes = line.as_bytes();
    for (i, &b) in bytes.iter().enumerate() {
        match b {
            _ if escaped => escaped = false,
            b'\\' if in_string => escaped = true,
            b'"' => in_string = !in_string,
            b'/' if !in_string && bytes.get(i + 1) == Some(&b'/') => return &line[..i],
            _ => {}
        }
    }
    line
}

/// Occurrences of `brace` outside string and char literals.
fn count(code: &str, brace: char) -> usize {
    let mut in_string = false;
    let mut escaped = false;
    let mut n = 0;
    let mut chars = code.chars().peekable();
    while let Some(c) = chars.next() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            '\'' if !in_string => {
                // Skip a char literal such as '{' but not a lifetime.
                let mut ahead = chars.clone();
                if let (Some(_), Some('\'')) = (ahead.next(), ahead.next()) {
                    chars.next();
                    chars.next();
                }
            }
            c if c == brace && !in_string => n += 1,
            _ => {}
        }
    }
    n
}
