//! Content stores of the mock service, one per shard.
//!
//! Access rules:
//!
//! | Token scope | Sees                                                   |
//! |-------------|--------------------------------------------------------|
//! | personal    | notebooks the holder owns on their own shard           |
//! | business    | notebooks the holder's business owns on its shard      |
//! | shared      | notebooks on one shard shared with the holder          |
//!
//! A token presented to a shard it was not issued for is refused.

use std::collections::BTreeMap;

use notestore_models::{
    AuthenticationResult, BusinessNotebook, EdamErrorCode, Guid, LinkedNotebook, Note,
    NoteCollectionCounts, NoteFilter, NoteList, Notebook, NotebookRestrictions, RpcFault,
    SavedSearch, SharedNotebook, SharedNotebookPrivilegeLevel, SyncState, Tag,
};
use notestore_sdk::Endpoints;
use serde_json::{Map, Value};
use tracing::info;

use crate::service::{arg, reply, unsupported, Ctx, Owner, Scope, State, StoredNotebook};

/// The authenticated caller of one content call.
struct Caller {
    user_id: i32,
    username: String,
    business_id: Option<i32>,
    scope: Scope,
}

/// How the caller reaches a notebook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Access {
    Owner,
    Shared(SharedNotebookPrivilegeLevel),
}

impl Access {
    fn can_write(self) -> bool {
        match self {
            Self::Owner => true,
            Self::Shared(level) => level.permits_modification(),
        }
    }
}

pub(crate) fn dispatch(
    state: &mut State,
    ctx: &Ctx<'_>,
    shard: &str,
    method: &str,
    params: &Map<String, Value>,
) -> Result<Value, RpcFault> {
    if method == "get_public_notebook" {
        return public_notebook(state, shard, params);
    }
    if method == "authenticate_to_shared_notebook" {
        return authenticate_to_shared_notebook(state, ctx, shard, params);
    }

    let caller = caller(state, ctx, shard, params)?;
    match method {
        "get_sync_state" => reply(SyncState {
            current_time: ctx.now,
            full_sync_before: 0,
            update_count: state.update_count,
            uploaded: Some(0),
        }),

        // -- notebooks ----------------------------------------------------
        "list_notebooks" => {
            let visible: Vec<Notebook> = state
                .shard(shard)
                .notebooks
                .values()
                .filter_map(|nb| access(&caller, nb).map(|a| present(nb, a)))
                .collect();
            reply(visible)
        }
        "get_notebook" => {
            let guid: Guid = arg(params, "guid")?;
            let (stored, access) = readable_notebook(state, &caller, shard, &guid)?;
            reply(present(&stored, access))
        }
        "get_default_notebook" => {
            let owner = owner_of(&caller)?;
            let notebook = default_notebook(state, shard, owner)?;
            reply(notebook)
        }
        "create_notebook" => create_notebook(state, ctx, &caller, shard, params),
        "update_notebook" => {
            let notebook: Notebook = arg(params, "notebook")?;
            let guid = notebook
                .guid
                .clone()
                .ok_or_else(|| RpcFault::user(EdamErrorCode::DataRequired, "Notebook.guid"))?;
            owned_notebook(state, &caller, shard, &guid)?;
            let usn = state.next_usn();
            if let Some(stored) = state.shard(shard).notebooks.get_mut(&guid) {
                stored.notebook.name = notebook.name.or(stored.notebook.name.take());
                stored.notebook.stack = notebook.stack;
                stored.notebook.update_sequence_num = Some(usn);
                stored.notebook.service_updated = Some(ctx.now);
            }
            reply(usn)
        }
        "expunge_notebook" => {
            let guid: Guid = arg(params, "guid")?;
            owned_notebook(state, &caller, shard, &guid)?;
            let usn = state.next_usn();
            let store = state.shard(shard);
            store.notebooks.remove(&guid);
            store
                .notes
                .retain(|_, n| n.notebook_guid.as_ref() != Some(&guid));
            reply(usn)
        }

        // -- tags ---------------------------------------------------------
        "list_tags" => {
            let owner = owner_of(&caller)?;
            let tags: Vec<Tag> = state
                .shard(shard)
                .tags
                .values()
                .filter(|(o, _)| *o == owner)
                .map(|(_, t)| t.clone())
                .collect();
            reply(tags)
        }
        "get_tag" => {
            let guid: Guid = arg(params, "guid")?;
            let owner = owner_of(&caller)?;
            match state.shard(shard).tags.get(&guid) {
                Some((o, tag)) if *o == owner => reply(tag.clone()),
                _ => Err(RpcFault::not_found("Tag.guid", guid.as_str())),
            }
        }
        "create_tag" => {
            let mut tag: Tag = arg(params, "tag")?;
            let owner = owner_of(&caller)?;
            if tag.name.as_deref().is_none_or(str::is_empty) {
                return Err(RpcFault::user(EdamErrorCode::DataRequired, "Tag.name"));
            }
            let guid = new_guid();
            tag.guid = Some(guid.clone());
            tag.update_sequence_num = Some(state.next_usn());
            state.shard(shard).tags.insert(guid, (owner, tag.clone()));
            reply(tag)
        }
        "expunge_tag" => {
            let guid: Guid = arg(params, "guid")?;
            let owner = owner_of(&caller)?;
            let store = state.shard(shard);
            if !store.tags.get(&guid).is_some_and(|(o, _)| *o == owner) {
                return Err(RpcFault::not_found("Tag.guid", guid.as_str()));
            }
            store.tags.remove(&guid);
            reply(state.next_usn())
        }

        // -- saved searches -----------------------------------------------
        "list_searches" => {
            let searches: Vec<SavedSearch> = state
                .shard(shard)
                .searches
                .values()
                .filter(|(u, _)| *u == caller.user_id)
                .map(|(_, s)| s.clone())
                .collect();
            reply(searches)
        }
        "create_search" => {
            let mut search: SavedSearch = arg(params, "search")?;
            let guid = new_guid();
            search.guid = Some(guid.clone());
            search.update_sequence_num = Some(state.next_usn());
            state
                .shard(shard)
                .searches
                .insert(guid, (caller.user_id, search.clone()));
            reply(search)
        }

        // -- notes --------------------------------------------------------
        "create_note" => create_note(state, ctx, &caller, shard, params),
        "get_note" => {
            let guid: Guid = arg(params, "guid")?;
            let with_content: bool = arg(params, "with_content")?;
            let mut note = readable_note(state, &caller, shard, &guid)?;
            if !with_content {
                note.content = None;
            }
            reply(note)
        }
        "get_note_content" => {
            let guid: Guid = arg(params, "guid")?;
            let note = readable_note(state, &caller, shard, &guid)?;
            reply(note.content.unwrap_or_default())
        }
        "update_note" => {
            let update: Note = arg(params, "note")?;
            let guid = update
                .guid
                .clone()
                .ok_or_else(|| RpcFault::user(EdamErrorCode::DataRequired, "Note.guid"))?;
            writable_note(state, &caller, shard, &guid)?;
            let usn = state.next_usn();
            let note = state
                .shard(shard)
                .notes
                .get_mut(&guid)
                .ok_or_else(|| RpcFault::not_found("Note.guid", guid.as_str()))?;
            if update.title.is_some() {
                note.title = update.title;
            }
            if update.content.is_some() {
                note.content = update.content;
            }
            note.updated = Some(ctx.now);
            note.update_sequence_num = Some(usn);
            reply(note.clone())
        }
        "delete_note" => {
            let guid: Guid = arg(params, "guid")?;
            writable_note(state, &caller, shard, &guid)?;
            let usn = state.next_usn();
            if let Some(note) = state.shard(shard).notes.get_mut(&guid) {
                note.active = Some(false);
                note.deleted = Some(ctx.now);
                note.update_sequence_num = Some(usn);
            }
            reply(usn)
        }
        "expunge_note" => {
            let guid: Guid = arg(params, "guid")?;
            writable_note(state, &caller, shard, &guid)?;
            let usn = state.next_usn();
            state.shard(shard).notes.remove(&guid);
            reply(usn)
        }
        "find_notes" => {
            let filter: NoteFilter = arg(params, "filter")?;
            let offset: i32 = arg(params, "offset")?;
            let max_notes: i32 = arg(params, "max_notes")?;
            let matching = matching_notes(state, &caller, shard, &filter);
            let total = i32::try_from(matching.len()).unwrap_or(i32::MAX);
            let notes = matching
                .into_iter()
                .skip(usize::try_from(offset).unwrap_or(0))
                .take(usize::try_from(max_notes).unwrap_or(0))
                .collect();
            reply(NoteList {
                start_index: offset,
                total_notes: total,
                notes,
                update_count: Some(state.update_count),
                ..NoteList::default()
            })
        }
        "find_note_counts" => {
            let filter: NoteFilter = arg(params, "filter")?;
            let with_trash: bool = arg(params, "with_trash")?;
            let mut counts: BTreeMap<Guid, i32> = BTreeMap::new();
            for note in matching_notes(state, &caller, shard, &filter) {
                if let Some(nb) = note.notebook_guid {
                    *counts.entry(nb).or_default() += 1;
                }
            }
            let trash_count = if with_trash {
                let inactive = NoteFilter {
                    inactive: Some(true),
                    ..filter
                };
                let trashed = matching_notes(state, &caller, shard, &inactive).len();
                Some(i32::try_from(trashed).unwrap_or(i32::MAX))
            } else {
                None
            };
            reply(NoteCollectionCounts {
                notebook_counts: Some(counts),
                trash_count,
                ..NoteCollectionCounts::default()
            })
        }

        // -- sharing ------------------------------------------------------
        "create_shared_notebook" => {
            let mut share: SharedNotebook = arg(params, "shared_notebook")?;
            let guid = share
                .notebook_guid
                .clone()
                .ok_or_else(|| RpcFault::user(EdamErrorCode::DataRequired, "SharedNotebook.notebookGuid"))?;
            owned_notebook(state, &caller, shard, &guid)?;
            let id = state.next_share_id();
            share.id = Some(id);
            share.user_id = Some(caller.user_id);
            share.share_key = Some(new_share_key());
            share.service_created = Some(ctx.now);
            share.privilege = share.privilege.or(Some(SharedNotebookPrivilegeLevel::ReadNotebook));
            if let Some(stored) = state.shard(shard).notebooks.get_mut(&guid) {
                attach_share(&mut stored.notebook, share.clone());
            }
            info!(notebook = %guid, recipient = share.username.as_deref().unwrap_or_default(), "notebook shared");
            reply(share)
        }
        "list_shared_notebooks" => {
            let owner = owner_of(&caller)?;
            let shares: Vec<SharedNotebook> = state
                .shard(shard)
                .notebooks
                .values()
                .filter(|nb| nb.owner == owner)
                .flat_map(|nb| nb.notebook.shared_notebooks.clone().unwrap_or_default())
                .collect();
            reply(shares)
        }
        "get_shared_notebook_by_auth" => {
            let Scope::Shared { share_key, .. } = &caller.scope else {
                return Err(RpcFault::user(EdamErrorCode::PermissionDenied, "authenticationToken"));
            };
            let (_, share) = find_share(state, shard, share_key)
                .ok_or_else(|| RpcFault::not_found("SharedNotebook.shareKey", share_key))?;
            reply(share)
        }
        "create_linked_notebook" => {
            personal_only(&caller)?;
            let mut linked: LinkedNotebook = arg(params, "linked_notebook")?;
            if linked.share_name.as_deref().is_none_or(str::is_empty) {
                return Err(RpcFault::user(EdamErrorCode::DataRequired, "LinkedNotebook.shareName"));
            }
            let guid = new_guid();
            linked.guid = Some(guid.clone());
            linked.update_sequence_num = Some(state.next_usn());
            state
                .shard(shard)
                .linked
                .insert(guid, (caller.user_id, linked.clone()));
            reply(linked)
        }
        "list_linked_notebooks" => {
            personal_only(&caller)?;
            let linked: Vec<LinkedNotebook> = state
                .shard(shard)
                .linked
                .values()
                .filter(|(u, _)| *u == caller.user_id)
                .map(|(_, l)| l.clone())
                .collect();
            reply(linked)
        }
        "update_linked_notebook" => {
            personal_only(&caller)?;
            let linked: LinkedNotebook = arg(params, "linked_notebook")?;
            let guid = linked
                .guid
                .clone()
                .ok_or_else(|| RpcFault::user(EdamErrorCode::DataRequired, "LinkedNotebook.guid"))?;
            let usn = state.next_usn();
            match state.shard(shard).linked.get_mut(&guid) {
                Some((u, stored)) if *u == caller.user_id => {
                    *stored = LinkedNotebook {
                        update_sequence_num: Some(usn),
                        ..linked
                    };
                    reply(usn)
                }
                _ => Err(RpcFault::not_found("LinkedNotebook.guid", guid.as_str())),
            }
        }
        "expunge_linked_notebook" => {
            personal_only(&caller)?;
            let guid: Guid = arg(params, "guid")?;
            let usn = state.next_usn();
            let store = state.shard(shard);
            match store.linked.get(&guid) {
                Some((u, _)) if *u == caller.user_id => {
                    store.linked.remove(&guid);
                    reply(usn)
                }
                _ => Err(RpcFault::not_found("LinkedNotebook.guid", guid.as_str())),
            }
        }

        other => Err(unsupported(other)),
    }
}

// ---------------------------------------------------------------------------
// Authentication
// ---------------------------------------------------------------------------

fn caller(state: &State, ctx: &Ctx<'_>, shard: &str, params: &Map<String, Value>) -> Result<Caller, RpcFault> {
    let token: String = arg(params, "authentication_token")?;
    let record = state.usable_token(ctx, &token)?;
    let account = state.account(record.user_id)?;

    let home = match &record.scope {
        Scope::Personal => Some(account.shard_id.as_str()),
        Scope::Business(id) => state.businesses.get(id).map(|b| b.shard_id.as_str()),
        Scope::Shared { shard, .. } => Some(shard.as_str()),
    };
    if home != Some(shard) {
        return Err(RpcFault::user(EdamErrorCode::PermissionDenied, "authenticationToken"));
    }

    Ok(Caller {
        user_id: record.user_id,
        username: account.username.clone(),
        business_id: account.business_id,
        scope: record.scope,
    })
}

fn authenticate_to_shared_notebook(
    state: &mut State,
    ctx: &Ctx<'_>,
    shard: &str,
    params: &Map<String, Value>,
) -> Result<Value, RpcFault> {
    let share_key: String = arg(params, "share_key")?;
    let token: String = arg(params, "authentication_token")?;
    let record = state.usable_token(ctx, &token)?;
    let account = state.account(record.user_id)?;
    let username = account.username.clone();
    let business_id = account.business_id;

    let (owner, share) = find_share(state, shard, &share_key)
        .ok_or_else(|| RpcFault::not_found("SharedNotebook.shareKey", &share_key))?;
    let addressed_to_caller = share.username.as_deref().is_none_or(|u| u == username)
        || matches!(owner, Owner::Business(b) if Some(b) == business_id);
    if !addressed_to_caller {
        return Err(RpcFault::user(EdamErrorCode::PermissionDenied, "shareKey"));
    }

    let scope = Scope::Shared {
        shard: shard.to_string(),
        share_key,
    };
    let (shared_token, expires) = state.issue_token(ctx, record.user_id, scope, false);
    info!(shard, username = %username, "share key exchanged");
    reply(AuthenticationResult {
        current_time: ctx.now,
        authentication_token: shared_token,
        expiration: expires,
        note_store_url: Some(Endpoints::note_store(ctx.service_url, shard)),
        web_api_url_prefix: Some(Endpoints::web_api_prefix(ctx.service_url, shard)),
        ..AuthenticationResult::default()
    })
}

fn personal_only(caller: &Caller) -> Result<(), RpcFault> {
    if caller.scope == Scope::Personal {
        Ok(())
    } else {
        Err(RpcFault::user(EdamErrorCode::PermissionDenied, "authenticationToken"))
    }
}

/// Owner of objects created with the caller's token.
fn owner_of(caller: &Caller) -> Result<Owner, RpcFault> {
    match caller.scope {
        Scope::Personal => Ok(Owner::User(caller.user_id)),
        Scope::Business(id) => Ok(Owner::Business(id)),
        Scope::Shared { .. } => Err(RpcFault::user(EdamErrorCode::PermissionDenied, "authenticationToken")),
    }
}

// ---------------------------------------------------------------------------
// Notebooks
// ---------------------------------------------------------------------------

fn access(caller: &Caller, stored: &StoredNotebook) -> Option<Access> {
    match &caller.scope {
        Scope::Personal if stored.owner == Owner::User(caller.user_id) => Some(Access::Owner),
        Scope::Business(id) if stored.owner == Owner::Business(*id) => Some(Access::Owner),
        Scope::Shared { .. } => {
            let shares = stored.notebook.shared_notebooks.as_deref().unwrap_or_default();
            let direct = shares
                .iter()
                .find(|s| s.username.as_deref() == Some(caller.username.as_str()))
                .and_then(|s| s.privilege);
            let through_business = match stored.owner {
                Owner::Business(b) if caller.business_id == Some(b) => Some(
                    stored
                        .notebook
                        .business_notebook
                        .as_ref()
                        .and_then(|bn| bn.privilege)
                        .unwrap_or(SharedNotebookPrivilegeLevel::ReadNotebook),
                ),
                _ => None,
            };
            direct.or(through_business).map(Access::Shared)
        }
        _ => None,
    }
}

/// The notebook as the caller sees it.
fn present(stored: &StoredNotebook, access: Access) -> Notebook {
    let mut notebook = stored.notebook.clone();
    if let Access::Shared(level) = access {
        notebook.restrictions = Some(NotebookRestrictions {
            no_create_notes: Some(!level.permits_modification()),
            no_update_notes: Some(!level.permits_modification()),
            no_update_notebook: Some(true),
            no_expunge_notebook: Some(true),
            no_create_shared_notebooks: Some(!level.permits_sharing()),
            ..NotebookRestrictions::default()
        });
    }
    notebook
}

fn readable_notebook(
    state: &mut State,
    caller: &Caller,
    shard: &str,
    guid: &Guid,
) -> Result<(StoredNotebook, Access), RpcFault> {
    let stored = state
        .shard(shard)
        .notebooks
        .get(guid)
        .cloned()
        .ok_or_else(|| RpcFault::not_found("Notebook.guid", guid.as_str()))?;
    let access = access(caller, &stored)
        .ok_or_else(|| RpcFault::user(EdamErrorCode::PermissionDenied, "Notebook.guid"))?;
    Ok((stored, access))
}

fn owned_notebook(state: &mut State, caller: &Caller, shard: &str, guid: &Guid) -> Result<(), RpcFault> {
    match readable_notebook(state, caller, shard, guid)? {
        (_, Access::Owner) => Ok(()),
        _ => Err(RpcFault::user(EdamErrorCode::PermissionDenied, "Notebook.guid")),
    }
}

fn default_notebook(state: &mut State, shard: &str, owner: Owner) -> Result<Notebook, RpcFault> {
    let owned: Vec<&StoredNotebook> = state
        .shard(shard)
        .notebooks
        .values()
        .filter(|nb| nb.owner == owner)
        .collect();
    owned
        .iter()
        .find(|nb| nb.notebook.default_notebook == Some(true))
        .or_else(|| owned.first())
        .map(|nb| nb.notebook.clone())
        .ok_or_else(|| RpcFault::not_found("Notebook.defaultNotebook", "none"))
}

fn create_notebook(
    state: &mut State,
    ctx: &Ctx<'_>,
    caller: &Caller,
    shard: &str,
    params: &Map<String, Value>,
) -> Result<Value, RpcFault> {
    let mut notebook: Notebook = arg(params, "notebook")?;
    let owner = owner_of(caller)?;
    let name = notebook
        .name
        .clone()
        .filter(|n| !n.trim().is_empty())
        .ok_or_else(|| RpcFault::user(EdamErrorCode::DataRequired, "Notebook.name"))?;
    let taken = state
        .shard(shard)
        .notebooks
        .values()
        .any(|nb| nb.owner == owner && nb.notebook.name.as_deref() == Some(name.as_str()));
    if taken {
        return Err(RpcFault::user(EdamErrorCode::DataConflict, "Notebook.name"));
    }
    let first = !state
        .shard(shard)
        .notebooks
        .values()
        .any(|nb| nb.owner == owner);

    let guid = new_guid();
    notebook.guid = Some(guid.clone());
    notebook.update_sequence_num = Some(state.next_usn());
    notebook.service_created = Some(ctx.now);
    notebook.service_updated = Some(ctx.now);
    notebook.default_notebook = Some(first && matches!(owner, Owner::User(_)));
    notebook.shared_notebooks = None;
    notebook.shared_notebook_ids = None;

    if let Owner::Business(_) = owner {
        notebook.business_notebook = Some(BusinessNotebook {
            privilege: Some(SharedNotebookPrivilegeLevel::ReadNotebook),
            ..notebook.business_notebook.take().unwrap_or_default()
        });
        // The creator reaches business notebooks through a share of their own.
        let share = SharedNotebook {
            id: Some(state.next_share_id()),
            user_id: Some(caller.user_id),
            notebook_guid: Some(guid.clone()),
            username: Some(caller.username.clone()),
            share_key: Some(new_share_key()),
            privilege: Some(SharedNotebookPrivilegeLevel::FullAccess),
            service_created: Some(ctx.now),
            ..SharedNotebook::default()
        };
        attach_share(&mut notebook, share);
    }

    state.shard(shard).notebooks.insert(
        guid.clone(),
        StoredNotebook {
            owner,
            notebook: notebook.clone(),
        },
    );
    info!(shard, notebook = %guid, name = %name, "notebook created");
    reply(notebook)
}

fn attach_share(notebook: &mut Notebook, share: SharedNotebook) {
    if let Some(id) = share.id {
        notebook.shared_notebook_ids.get_or_insert_with(Vec::new).push(id);
    }
    notebook.shared_notebooks.get_or_insert_with(Vec::new).push(share);
}

fn find_share(state: &mut State, shard: &str, share_key: &str) -> Option<(Owner, SharedNotebook)> {
    state.shard(shard).notebooks.values().find_map(|nb| {
        nb.notebook
            .shared_notebooks
            .as_deref()
            .unwrap_or_default()
            .iter()
            .find(|s| s.share_key.as_deref() == Some(share_key))
            .map(|s| (nb.owner, s.clone()))
    })
}

fn public_notebook(state: &mut State, shard: &str, params: &Map<String, Value>) -> Result<Value, RpcFault> {
    let user_id: i32 = arg(params, "user_id")?;
    let public_uri: String = arg(params, "public_uri")?;
    let found = state.shard(shard).notebooks.values().find(|nb| {
        nb.owner == Owner::User(user_id)
            && nb.notebook.published == Some(true)
            && nb
                .notebook
                .publishing
                .as_ref()
                .and_then(|p| p.uri.as_deref())
                == Some(public_uri.as_str())
    });
    match found {
        Some(nb) => reply(nb.notebook.clone()),
        None => Err(RpcFault::not_found("Publishing.uri", &public_uri)),
    }
}

// ---------------------------------------------------------------------------
// Notes
// ---------------------------------------------------------------------------

fn create_note(
    state: &mut State,
    ctx: &Ctx<'_>,
    caller: &Caller,
    shard: &str,
    params: &Map<String, Value>,
) -> Result<Value, RpcFault> {
    let mut note: Note = arg(params, "note")?;
    if note.title.as_deref().is_none_or(|t| t.trim().is_empty()) {
        return Err(RpcFault::user(EdamErrorCode::DataRequired, "Note.title"));
    }
    let notebook_guid = match note.notebook_guid.clone() {
        Some(guid) => guid,
        None => default_notebook(state, shard, owner_of(caller)?)?
            .guid
            .ok_or_else(|| RpcFault::system(EdamErrorCode::InternalError, "notebook without guid"))?,
    };
    let (_, access) = readable_notebook(state, caller, shard, &notebook_guid)?;
    if !access.can_write() {
        return Err(RpcFault::user(EdamErrorCode::PermissionDenied, "Note.notebookGuid"));
    }

    let guid = new_guid();
    note.guid = Some(guid.clone());
    note.notebook_guid = Some(notebook_guid);
    note.created = Some(ctx.now);
    note.updated = Some(ctx.now);
    note.active = Some(true);
    note.update_sequence_num = Some(state.next_usn());
    state.shard(shard).notes.insert(guid, note.clone());
    reply(note)
}

fn readable_note(state: &mut State, caller: &Caller, shard: &str, guid: &Guid) -> Result<Note, RpcFault> {
    let note = state
        .shard(shard)
        .notes
        .get(guid)
        .cloned()
        .ok_or_else(|| RpcFault::not_found("Note.guid", guid.as_str()))?;
    let notebook = note
        .notebook_guid
        .clone()
        .ok_or_else(|| RpcFault::system(EdamErrorCode::InternalError, "note without notebook"))?;
    readable_notebook(state, caller, shard, &notebook)?;
    Ok(note)
}

fn writable_note(state: &mut State, caller: &Caller, shard: &str, guid: &Guid) -> Result<(), RpcFault> {
    let note = readable_note(state, caller, shard, guid)?;
    let notebook = note.notebook_guid.unwrap_or_default();
    match readable_notebook(state, caller, shard, &notebook)? {
        (_, access) if access.can_write() => Ok(()),
        _ => Err(RpcFault::user(EdamErrorCode::PermissionDenied, "Note.guid")),
    }
}

fn matching_notes(state: &mut State, caller: &Caller, shard: &str, filter: &NoteFilter) -> Vec<Note> {
    let want_inactive = filter.inactive.unwrap_or(false);
    let words = filter.words.as_deref().map(str::to_lowercase);
    let store = state.shard(shard);
    store
        .notes
        .values()
        .filter(|n| n.active.unwrap_or(true) != want_inactive)
        .filter(|n| {
            filter
                .notebook_guid
                .as_ref()
                .is_none_or(|g| n.notebook_guid.as_ref() == Some(g))
        })
        .filter(|n| {
            words.as_deref().is_none_or(|w| {
                n.title
                    .as_deref()
                    .is_some_and(|t| t.to_lowercase().contains(w))
            })
        })
        .filter(|n| {
            n.notebook_guid
                .as_ref()
                .and_then(|g| store.notebooks.get(g))
                .and_then(|nb| access(caller, nb))
                .is_some()
        })
        .cloned()
        .collect()
}

fn new_guid() -> Guid {
    Guid::new(&uuid::Uuid::new_v4().to_string())
}

fn new_share_key() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}
