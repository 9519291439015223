//! Linked-notebook resolver.
//!
//! A linked notebook lives in another account's content store.  Reaching it
//! takes two steps: exchange the reference's share key for a credential on
//! the owning endpoint, then talk to that endpoint with the exchanged
//! credential.  [`LinkedNoteStoreClient`] does both lazily and caches the
//! resulting handle per endpoint URL and share key.  An exchanged credential
//! only speaks for the notebook whose key produced it, so references on one
//! endpoint share a handle only when they carry the same key.
//!
//! # Resolution
//!
//! ```text
//! Unresolved ──get_client──▶ Authenticating ──exchange ok──▶ Ready
//!      ▲                          │                           │
//!      └────── exchange failed ───┘◀──── credential expired ──┘
//! ```
//!
//! Concurrent callers for one endpoint and key wait on the single in-flight
//! exchange and all receive its handle or its error.  Other slots never block
//! each other.  A failed or expired resolution is evicted so that the next call
//! starts over; nothing else in the resolver changes.

use std::sync::Arc;

use dashmap::DashMap;
use notestore_models::{LinkedNotebook, Note, Notebook};
use once_cell::sync::OnceCell;
use tracing::{info, warn};

use crate::credentials::Credential;
use crate::endpoints::Endpoints;
use crate::error::{AuthErrorKind, StoreError};
use crate::note_store::{NoteStoreClient, NoteStoreHandle};
use crate::permissions::NotebookPermissions;
use crate::protocol::NoteStoreStub;
use crate::transport::TransportFactory;

/// Content operations available on notebooks shared with the caller.
///
/// Anything not listed here is reached through the handle returned by
/// [`get_client`](Self::get_client).
pub trait LinkedNoteStoreOperations {
    /// Resolved content client for the endpoint hosting `linked`.
    ///
    /// Two references with the same endpoint and share key share one handle.
    fn get_client(&self, linked: &LinkedNotebook) -> Result<NoteStoreHandle, StoreError>;

    /// Create `note` inside the notebook `linked` points at.
    fn create_note(&self, note: &Note, linked: &LinkedNotebook) -> Result<Note, StoreError>;

    /// Notebooks visible through this resolver.
    fn list_notebooks(&self) -> Result<Vec<LinkedNotebook>, StoreError>;

    /// Full notebook record `linked` points at, read from its own endpoint.
    fn get_corresponding_notebook(&self, linked: &LinkedNotebook) -> Result<Notebook, StoreError>;

    /// Whether the caller may create and modify notes in `linked`.
    fn is_notebook_writable(&self, linked: &LinkedNotebook) -> Result<bool, StoreError>;
}

/// Where resolution of one endpoint and share key currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionState {
    /// No exchange has run, or the last one was evicted.
    Unresolved,
    /// An exchange is in flight.
    Authenticating,
    /// A handle with an unexpired credential is cached.
    Ready,
}

type Slot = OnceCell<Result<NoteStoreHandle, StoreError>>;

/// Cache key: the endpoint hosting a linked notebook and the share key
/// exchanged there.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct SlotKey {
    endpoint: String,
    share_key: String,
}

/// Resolver for notebooks shared with the caller by other accounts.
pub struct LinkedNoteStoreClient {
    personal: Arc<NoteStoreClient>,
    exchange: Credential,
    transports: Arc<dyn TransportFactory>,
    service_url: String,
    cache: DashMap<SlotKey, Arc<Slot>>,
}

impl LinkedNoteStoreClient {
    /// Build a resolver.
    ///
    /// `personal` answers listing calls; `exchange` is the credential
    /// presented alongside share keys (the personal credential for ordinary
    /// shares, the business credential for business notebooks).
    pub fn new(
        personal: Arc<NoteStoreClient>,
        exchange: Credential,
        transports: Arc<dyn TransportFactory>,
        service_url: impl Into<String>,
    ) -> Self {
        Self {
            personal,
            exchange,
            transports,
            service_url: service_url.into(),
            cache: DashMap::new(),
        }
    }

    /// The caller's personal content client.
    pub fn personal_client(&self) -> &Arc<NoteStoreClient> {
        &self.personal
    }

    /// Resolution state of the handle serving `linked`.
    pub fn resolution_state(&self, linked: &LinkedNotebook) -> Result<ResolutionState, StoreError> {
        let key = self.key(linked)?;
        let Some(slot) = self.cache.get(&key).map(|s| Arc::clone(s.value())) else {
            return Ok(ResolutionState::Unresolved);
        };
        Ok(match slot.get() {
            None => ResolutionState::Authenticating,
            Some(Ok(handle)) if !handle.credential().is_expired() => ResolutionState::Ready,
            Some(_) => ResolutionState::Unresolved,
        })
    }

    /// Drop the cached handle serving `linked`, forcing the next call to
    /// exchange its share key again.  Handles for other keys on the same
    /// endpoint are kept.
    ///
    /// Returns whether anything was cached.
    pub fn evict(&self, linked: &LinkedNotebook) -> Result<bool, StoreError> {
        let key = self.key(linked)?;
        Ok(self.cache.remove(&key).is_some())
    }

    /// Endpoints with at least one cached or in-flight resolution, sorted
    /// and without duplicates.
    pub fn cached_endpoints(&self) -> Vec<String> {
        let mut endpoints: Vec<String> = self.cache.iter().map(|e| e.key().endpoint.clone()).collect();
        endpoints.sort();
        endpoints.dedup();
        endpoints
    }

    fn key(&self, linked: &LinkedNotebook) -> Result<SlotKey, StoreError> {
        let endpoint = Endpoints::for_linked_notebook(&self.service_url, linked)?;
        let share_key = linked
            .share_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(StoreError::MissingField("LinkedNotebook.shareKey"))?;
        Ok(SlotKey {
            endpoint,
            share_key: share_key.to_string(),
        })
    }

    fn slot(&self, key: &SlotKey) -> Arc<Slot> {
        Arc::clone(self.cache.entry(key.clone()).or_default().value())
    }

    /// Remove `slot` unless another caller already replaced it.
    fn discard(&self, key: &SlotKey, slot: &Arc<Slot>) {
        self.cache
            .remove_if(key, |_, current| Arc::ptr_eq(current, slot));
    }

    fn resolve(&self, endpoint: &str, share_key: &str) -> Result<NoteStoreHandle, StoreError> {
        info!(endpoint, "exchanging share key");
        let stub = NoteStoreStub::new(self.transports.connect(endpoint)?);
        let result = stub
            .authenticate_to_shared_notebook(share_key, self.exchange.token())
            .map_err(StoreError::into_share_key_error)?;
        let credential = Credential::bind(&result, endpoint)?;
        let client = NoteStoreClient::with_stub(stub, credential)?;
        info!(endpoint, "linked store resolved");
        Ok(Arc::new(client))
    }
}

impl LinkedNoteStoreOperations for LinkedNoteStoreClient {
    fn get_client(&self, linked: &LinkedNotebook) -> Result<NoteStoreHandle, StoreError> {
        let key = self.key(linked)?;
        let endpoint = &key.endpoint;

        loop {
            let slot = self.slot(&key);
            let mut resolved_here = false;
            let outcome = slot.get_or_init(|| {
                resolved_here = true;
                self.resolve(endpoint, &key.share_key)
            });

            match outcome {
                Ok(handle) if !handle.credential().is_expired() => return Ok(Arc::clone(handle)),
                Ok(_) => {
                    warn!(endpoint = %endpoint, "linked credential expired, evicting");
                    self.discard(&key, &slot);
                    // Exchanged by this call and already expired.
                    if resolved_here {
                        return Err(StoreError::auth(AuthErrorKind::ExpiredCredential));
                    }
                }
                Err(e) => {
                    let e = e.clone();
                    warn!(endpoint = %endpoint, error = %e, "linked resolution failed, evicting");
                    self.discard(&key, &slot);
                    return Err(e);
                }
            }
        }
    }

    fn create_note(&self, note: &Note, linked: &LinkedNotebook) -> Result<Note, StoreError> {
        let handle = self.get_client(linked)?;
        let notebook = self.get_corresponding_notebook(linked)?;
        let mut note = note.clone();
        note.notebook_guid = Some(notebook.guid.ok_or(StoreError::MissingField("Notebook.guid"))?);
        handle.create_note(&note)
    }

    fn list_notebooks(&self) -> Result<Vec<LinkedNotebook>, StoreError> {
        self.personal.list_linked_notebooks()
    }

    fn get_corresponding_notebook(&self, linked: &LinkedNotebook) -> Result<Notebook, StoreError> {
        let handle = self.get_client(linked)?;
        let guid = match &linked.notebook_guid {
            Some(guid) => guid.clone(),
            None => handle
                .get_shared_notebook_by_auth()?
                .notebook_guid
                .ok_or(StoreError::MissingField("SharedNotebook.notebookGuid"))?,
        };
        handle.get_notebook(&guid)
    }

    fn is_notebook_writable(&self, linked: &LinkedNotebook) -> Result<bool, StoreError> {
        let notebook = self.get_corresponding_notebook(linked)?;
        Ok(NotebookPermissions::derive(&notebook, linked.share_key.as_deref()).is_writable())
    }
}

impl std::fmt::Debug for LinkedNoteStoreClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinkedNoteStoreClient")
            .field("personal", &self.personal.endpoint())
            .field("cached", &self.cached_endpoints())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ScriptedFactory, ScriptedTransport};
    use notestore_models::{EdamErrorCode, Guid, RpcFault};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Barrier;
    use std::time::Duration;

    const PERSONAL: &str = "https://svc/shard/s1/notestore";
    const REMOTE_A: &str = "https://svc/shard/s2/notestore";
    const REMOTE_B: &str = "https://svc/shard/s3/notestore";
    const FAR_FUTURE_MS: i64 = 4_102_444_800_000;

    fn resolver(factory: &Arc<ScriptedFactory>) -> LinkedNoteStoreClient {
        let personal_credential = Credential::new("personal", PERSONAL);
        let personal = NoteStoreClient::connect(factory.as_ref(), personal_credential.clone()).unwrap();
        LinkedNoteStoreClient::new(
            Arc::new(personal),
            personal_credential,
            factory.clone(),
            "https://svc",
        )
    }

    fn script_remote(transport: &ScriptedTransport, token: &'static str) {
        transport.respond("authenticate_to_shared_notebook", move |params| {
            assert_eq!(params["authentication_token"], "personal");
            Ok(json!({ "authentication_token": token, "expiration": FAR_FUTURE_MS }))
        });
        transport.respond("get_notebook", |params| {
            Ok(json!({
                "guid": params["guid"],
                "name": "Recipes",
                "shared_notebooks": [
                    { "share_key": "key-a", "privilege": "MODIFY_NOTEBOOK_PLUS_ACTIVITY" },
                    { "share_key": "key-ro", "privilege": "READ_NOTEBOOK_PLUS_ACTIVITY" }
                ]
            }))
        });
        transport.respond("get_shared_notebook_by_auth", |_| {
            Ok(json!({ "notebook_guid": "nb-remote", "share_key": "key-a" }))
        });
    }

    fn linked(key: &str, endpoint: &str) -> LinkedNotebook {
        LinkedNotebook::new("Recipes", key, endpoint)
    }

    #[test]
    fn same_key_on_one_endpoint_shares_one_handle() {
        let factory = ScriptedFactory::new();
        let remote = factory.transport(REMOTE_A);
        script_remote(&remote, "shared-a");
        let resolver = resolver(&factory);

        let first = resolver.get_client(&linked("key-a", REMOTE_A)).unwrap();
        let mut renamed = linked("key-a", REMOTE_A);
        renamed.share_name = Some("Family recipes".to_string());
        let second = resolver.get_client(&renamed).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(remote.calls("authenticate_to_shared_notebook"), 1);
        assert_eq!(first.credential().token(), "shared-a");
        assert_eq!(first.endpoint(), REMOTE_A);
    }

    #[test]
    fn each_share_key_on_one_endpoint_gets_its_own_handle() {
        let factory = ScriptedFactory::new();
        let remote = factory.transport(REMOTE_A);
        remote.respond("authenticate_to_shared_notebook", |params| {
            let key = params["share_key"].as_str().unwrap_or_default();
            Ok(json!({ "authentication_token": format!("tok-{key}"), "expiration": FAR_FUTURE_MS }))
        });
        remote.respond("get_shared_notebook_by_auth", |params| {
            let guid = if params["authentication_token"] == "tok-key-x" { "nb-x" } else { "nb-y" };
            Ok(json!({ "notebook_guid": guid }))
        });
        remote.respond("get_notebook", |params| {
            Ok(json!({ "guid": params["guid"], "name": params["guid"] }))
        });
        let resolver = resolver(&factory);
        let x = linked("key-x", REMOTE_A);
        let y = linked("key-y", REMOTE_A);

        assert_eq!(resolver.get_corresponding_notebook(&x).unwrap().guid, Some(Guid::new("nb-x")));
        assert_eq!(resolver.get_corresponding_notebook(&y).unwrap().guid, Some(Guid::new("nb-y")));

        let hx = resolver.get_client(&x).unwrap();
        let hy = resolver.get_client(&y).unwrap();
        assert!(!Arc::ptr_eq(&hx, &hy));
        assert_eq!(hx.credential().token(), "tok-key-x");
        assert_eq!(hy.credential().token(), "tok-key-y");
        assert_eq!(remote.calls("authenticate_to_shared_notebook"), 2);
        assert_eq!(resolver.cached_endpoints(), vec![REMOTE_A.to_string()]);

        assert!(resolver.evict(&x).unwrap());
        assert_eq!(resolver.resolution_state(&x).unwrap(), ResolutionState::Unresolved);
        assert_eq!(resolver.resolution_state(&y).unwrap(), ResolutionState::Ready);
    }

    #[test]
    fn different_endpoints_resolve_independently() {
        let factory = ScriptedFactory::new();
        let a = factory.transport(REMOTE_A);
        let b = factory.transport(REMOTE_B);
        script_remote(&a, "shared-a");
        script_remote(&b, "shared-b");
        let resolver = resolver(&factory);

        let ha = resolver.get_client(&linked("key-a", REMOTE_A)).unwrap();
        let hb = resolver.get_client(&linked("key-b", REMOTE_B)).unwrap();

        assert!(!Arc::ptr_eq(&ha, &hb));
        assert_eq!(a.calls("authenticate_to_shared_notebook"), 1);
        assert_eq!(b.calls("authenticate_to_shared_notebook"), 1);
        assert_eq!(resolver.cached_endpoints(), vec![REMOTE_A.to_string(), REMOTE_B.to_string()]);
    }

    #[test]
    fn concurrent_callers_collapse_onto_one_exchange() {
        const CALLERS: usize = 8;
        let factory = ScriptedFactory::new();
        let remote = factory.transport(REMOTE_A);
        script_remote(&remote, "shared-a");
        remote.delay_calls(Duration::from_millis(50));
        let resolver = resolver(&factory);
        let barrier = Barrier::new(CALLERS);
        let reference = linked("key-a", REMOTE_A);

        let handles: Vec<NoteStoreHandle> = std::thread::scope(|s| {
            let workers: Vec<_> = (0..CALLERS)
                .map(|_| {
                    s.spawn(|| {
                        barrier.wait();
                        resolver.get_client(&reference).unwrap()
                    })
                })
                .collect();
            workers.into_iter().map(|w| w.join().unwrap()).collect()
        });

        assert_eq!(remote.calls("authenticate_to_shared_notebook"), 1);
        assert!(handles.iter().all(|h| Arc::ptr_eq(h, &handles[0])));
    }

    #[test]
    fn concurrent_waiters_share_the_failure() {
        const CALLERS: usize = 4;
        let factory = ScriptedFactory::new();
        let remote = factory.transport(REMOTE_A);
        remote.respond("authenticate_to_shared_notebook", |_| {
            Err(RpcFault::user(EdamErrorCode::InvalidAuth, "shareKey"))
        });
        remote.delay_calls(Duration::from_millis(50));
        let resolver = resolver(&factory);
        let barrier = Barrier::new(CALLERS);
        let reference = linked("bad", REMOTE_A);

        let errors: Vec<StoreError> = std::thread::scope(|s| {
            let workers: Vec<_> = (0..CALLERS)
                .map(|_| {
                    s.spawn(|| {
                        barrier.wait();
                        resolver.get_client(&reference).unwrap_err()
                    })
                })
                .collect();
            workers.into_iter().map(|w| w.join().unwrap()).collect()
        });

        assert!(errors
            .iter()
            .all(|e| e.auth_kind() == Some(AuthErrorKind::ShareKeyInvalid)));
        // Waiters that arrived after the eviction may have retried; the
        // in-flight exchange was never duplicated.
        assert!(remote.calls("authenticate_to_shared_notebook") <= CALLERS);
        assert_eq!(resolver.resolution_state(&reference).unwrap(), ResolutionState::Unresolved);
    }

    #[test]
    fn failures_are_not_cached() {
        let factory = ScriptedFactory::new();
        let remote = factory.transport(REMOTE_A);
        let attempts = Arc::new(AtomicUsize::new(0));
        let seen = attempts.clone();
        remote.respond("authenticate_to_shared_notebook", move |_| {
            if seen.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(RpcFault::system(EdamErrorCode::ShardUnavailable, "try later"))
            } else {
                Ok(json!({ "authentication_token": "shared", "expiration": FAR_FUTURE_MS }))
            }
        });
        let resolver = resolver(&factory);
        let reference = linked("key-a", REMOTE_A);

        assert!(matches!(
            resolver.get_client(&reference),
            Err(StoreError::Service { .. })
        ));
        assert!(resolver.cached_endpoints().is_empty());
        assert!(resolver.get_client(&reference).is_ok());
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn no_longer_shared_is_not_found() {
        let factory = ScriptedFactory::new();
        let remote = factory.transport(REMOTE_A);
        remote.respond("authenticate_to_shared_notebook", |_| {
            Err(RpcFault::not_found("SharedNotebook.shareKey", "key-a"))
        });
        let resolver = resolver(&factory);
        assert!(resolver
            .get_client(&linked("key-a", REMOTE_A))
            .unwrap_err()
            .is_not_found());
    }

    #[test]
    fn credential_expired_on_arrival_is_reported() {
        let factory = ScriptedFactory::new();
        let remote = factory.transport(REMOTE_A);
        remote.respond("authenticate_to_shared_notebook", |_| {
            Ok(json!({ "authentication_token": "stale", "expiration": 1_000 }))
        });
        let resolver = resolver(&factory);
        let reference = linked("key-a", REMOTE_A);

        let err = resolver.get_client(&reference).unwrap_err();
        assert_eq!(err.auth_kind(), Some(AuthErrorKind::ExpiredCredential));
        assert_eq!(resolver.resolution_state(&reference).unwrap(), ResolutionState::Unresolved);
        assert_eq!(remote.calls("authenticate_to_shared_notebook"), 1);
    }

    #[test]
    fn evict_forces_a_new_exchange() {
        let factory = ScriptedFactory::new();
        let remote = factory.transport(REMOTE_A);
        script_remote(&remote, "shared-a");
        let resolver = resolver(&factory);
        let reference = linked("key-a", REMOTE_A);

        assert_eq!(resolver.resolution_state(&reference).unwrap(), ResolutionState::Unresolved);
        let first = resolver.get_client(&reference).unwrap();
        assert_eq!(resolver.resolution_state(&reference).unwrap(), ResolutionState::Ready);

        assert!(resolver.evict(&reference).unwrap());
        assert!(!resolver.evict(&reference).unwrap());
        let second = resolver.get_client(&reference).unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(remote.calls("authenticate_to_shared_notebook"), 2);
    }

    #[test]
    fn missing_share_key_and_endpoint_are_routing_errors() {
        let factory = ScriptedFactory::new();
        let resolver = resolver(&factory);

        let mut no_key = linked("", REMOTE_A);
        no_key.share_key = None;
        assert_eq!(
            resolver.get_client(&no_key).unwrap_err(),
            StoreError::MissingField("LinkedNotebook.shareKey")
        );

        let nowhere = LinkedNotebook {
            share_key: Some("k".into()),
            ..LinkedNotebook::default()
        };
        assert!(matches!(
            resolver.get_client(&nowhere),
            Err(StoreError::UnresolvableLinkedNotebook(_))
        ));
        assert_eq!(factory.connects(), 1);
    }

    #[test]
    fn corresponding_notebook_prefers_reference_guid() {
        let factory = ScriptedFactory::new();
        let remote = factory.transport(REMOTE_A);
        script_remote(&remote, "shared-a");
        let resolver = resolver(&factory);

        let mut with_guid = linked("key-a", REMOTE_A);
        with_guid.notebook_guid = Some(Guid::new("nb-direct"));
        let notebook = resolver.get_corresponding_notebook(&with_guid).unwrap();
        assert_eq!(notebook.guid, Some(Guid::new("nb-direct")));
        assert_eq!(remote.calls("get_shared_notebook_by_auth"), 0);

        let notebook = resolver
            .get_corresponding_notebook(&linked("key-a", REMOTE_A))
            .unwrap();
        assert_eq!(notebook.guid, Some(Guid::new("nb-remote")));
        assert_eq!(remote.calls("get_shared_notebook_by_auth"), 1);
    }

    #[test]
    fn create_note_targets_remote_notebook() {
        let factory = ScriptedFactory::new();
        let remote = factory.transport(REMOTE_A);
        script_remote(&remote, "shared-a");
        remote.respond("create_note", |params| {
            assert_eq!(params["authentication_token"], "shared-a");
            assert_eq!(params["note"]["notebook_guid"], "nb-remote");
            let mut note = params["note"].clone();
            note["guid"] = json!("note-1");
            Ok(note)
        });
        let resolver = resolver(&factory);

        let note = Note {
            title: Some("Soup".into()),
            ..Note::default()
        };
        let created = resolver.create_note(&note, &linked("key-a", REMOTE_A)).unwrap();
        assert_eq!(created.guid, Some(Guid::new("note-1")));
        assert_eq!(created.notebook_guid, Some(Guid::new("nb-remote")));
    }

    #[test]
    fn writability_follows_share_privilege() {
        let factory = ScriptedFactory::new();
        let remote = factory.transport(REMOTE_A);
        script_remote(&remote, "shared-a");
        let resolver = resolver(&factory);

        assert!(resolver.is_notebook_writable(&linked("key-a", REMOTE_A)).unwrap());
        assert!(!resolver.is_notebook_writable(&linked("key-ro", REMOTE_A)).unwrap());
    }

    #[test]
    fn listing_goes_to_personal_store() {
        let factory = ScriptedFactory::new();
        factory.transport(PERSONAL).respond("list_linked_notebooks", |params| {
            assert_eq!(params["authentication_token"], "personal");
            Ok(json!([{ "share_name": "Recipes", "share_key": "key-a" }]))
        });
        let resolver = resolver(&factory);
        let listed = resolver.list_notebooks().unwrap();
        assert_eq!(listed.len(), 1);
        assert!(resolver.cached_endpoints().is_empty());
    }
}
