mod common;

use std::sync::Arc;

use common::{note_store_url, Fixture};
use notestore_models::{LinkedNotebook, Note, Notebook, SharedNotebook, SharedNotebookPrivilegeLevel};
use notestore_sdk::{AuthErrorKind, LinkedNoteStoreOperations, NoteStoreClient, ResolutionState, StoreError};

/// Bob shares a new notebook with alice at `privilege` and returns alice's
/// reference to it.
fn share_with_alice(
    bob: &NoteStoreClient,
    name: &str,
    privilege: SharedNotebookPrivilegeLevel,
) -> LinkedNotebook {
    let notebook = bob.create_notebook(&Notebook::named(name)).unwrap();
    let share = bob
        .create_shared_notebook(&SharedNotebook {
            notebook_guid: notebook.guid.clone(),
            username: Some("alice".into()),
            privilege: Some(privilege),
            ..SharedNotebook::default()
        })
        .unwrap();
    LinkedNotebook {
        notebook_guid: notebook.guid,
        ..LinkedNotebook::new(name, share.share_key.as_deref().unwrap(), &note_store_url("s2"))
    }
}

#[test]
fn recipient_writes_into_a_modifiable_share() {
    let fx = Fixture::new();
    let bob = fx.factory.note_store_client(fx.login("bob")).unwrap();
    let reference = share_with_alice(&bob, "Recipes", SharedNotebookPrivilegeLevel::ModifyNotebookPlusActivity);

    let alice = fx.login("alice");
    let linked = fx.factory.linked_note_store_client(alice).unwrap();
    let stored = linked.personal_client().create_linked_notebook(&reference).unwrap();
    assert_eq!(linked.list_notebooks().unwrap(), vec![stored.clone()]);

    assert!(linked.is_notebook_writable(&stored).unwrap());
    let note = linked
        .create_note(
            &Note {
                title: Some("Soup".into()),
                ..Note::default()
            },
            &stored,
        )
        .unwrap();
    assert_eq!(note.notebook_guid, reference.notebook_guid);

    // The owner sees the recipient's note.
    let guid = note.guid.unwrap();
    let seen = bob.get_note(&guid, false, false, false, false).unwrap();
    assert_eq!(seen.title.as_deref(), Some("Soup"));
}

#[test]
fn read_only_share_refuses_notes() {
    let fx = Fixture::new();
    let bob = fx.factory.note_store_client(fx.login("bob")).unwrap();
    let reference = share_with_alice(&bob, "Archive", SharedNotebookPrivilegeLevel::ReadNotebook);

    let linked = fx.factory.linked_note_store_client(fx.login("alice")).unwrap();
    assert!(!linked.is_notebook_writable(&reference).unwrap());

    let err = linked
        .create_note(
            &Note {
                title: Some("Graffiti".into()),
                ..Note::default()
            },
            &reference,
        )
        .unwrap_err();
    assert!(matches!(err, StoreError::Validation { .. }));
}

#[test]
fn each_share_key_on_one_endpoint_resolves_its_own_notebook() {
    let fx = Fixture::new();
    let bob = fx.factory.note_store_client(fx.login("bob")).unwrap();
    let recipes = share_with_alice(&bob, "Recipes", SharedNotebookPrivilegeLevel::FullAccess);
    let archive = share_with_alice(&bob, "Archive", SharedNotebookPrivilegeLevel::ReadNotebook);
    let recipes_guid = recipes.notebook_guid.clone();
    let archive_guid = archive.notebook_guid.clone();
    // References as another client would store them, without the notebook guid.
    let recipes = LinkedNotebook { notebook_guid: None, ..recipes };
    let archive = LinkedNotebook { notebook_guid: None, ..archive };

    let linked = fx.factory.linked_note_store_client(fx.login("alice")).unwrap();
    assert_eq!(linked.get_corresponding_notebook(&recipes).unwrap().guid, recipes_guid);
    assert_eq!(linked.get_corresponding_notebook(&archive).unwrap().guid, archive_guid);

    let a = linked.get_client(&recipes).unwrap();
    let b = linked.get_client(&archive).unwrap();
    assert!(!Arc::ptr_eq(&a, &b));
    assert!(Arc::ptr_eq(&a, &linked.get_client(&recipes).unwrap()));
    assert_eq!(fx.service.calls("authenticate_to_shared_notebook"), 2);
    assert_eq!(linked.cached_endpoints(), vec![note_store_url("s2")]);

    assert!(linked.is_notebook_writable(&recipes).unwrap());
    assert!(!linked.is_notebook_writable(&archive).unwrap());
}

#[test]
fn unknown_share_key_is_not_found_and_not_cached() {
    let fx = Fixture::new();
    let linked = fx.factory.linked_note_store_client(fx.login("alice")).unwrap();
    let bogus = LinkedNotebook::new("Gone", "no-such-key", &note_store_url("s2"));

    assert!(linked.get_client(&bogus).unwrap_err().is_not_found());
    assert_eq!(linked.resolution_state(&bogus).unwrap(), ResolutionState::Unresolved);
    assert!(linked.get_client(&bogus).is_err());
    assert_eq!(fx.service.calls("authenticate_to_shared_notebook"), 2);
}

#[test]
fn share_addressed_to_someone_else_is_an_invalid_key() {
    let fx = Fixture::new();
    let bob = fx.factory.note_store_client(fx.login("bob")).unwrap();
    let reference = share_with_alice(&bob, "Recipes", SharedNotebookPrivilegeLevel::ReadNotebook);

    let carol_users = fx.users();
    let carol = carol_users.authenticate("carol", "carol-pw", true).unwrap();
    carol_users
        .complete_two_factor_authentication(&carol, common::ONE_TIME_CODE, "laptop", "Carol's laptop")
        .unwrap();

    let linked = fx.factory.linked_note_store_client(carol).unwrap();
    let err = linked.get_client(&reference).unwrap_err();
    assert_eq!(err.auth_kind(), Some(AuthErrorKind::ShareKeyInvalid));
}

#[test]
fn evicted_handles_are_exchanged_again() {
    let fx = Fixture::new();
    let bob = fx.factory.note_store_client(fx.login("bob")).unwrap();
    let reference = share_with_alice(&bob, "Recipes", SharedNotebookPrivilegeLevel::FullAccess);

    let linked = fx.factory.linked_note_store_client(fx.login("alice")).unwrap();
    let before = linked.get_client(&reference).unwrap();
    assert!(linked.evict(&reference).unwrap());
    assert!(!linked.evict(&reference).unwrap());

    let after = linked.get_client(&reference).unwrap();
    assert!(!Arc::ptr_eq(&before, &after));
    assert_eq!(fx.service.calls("authenticate_to_shared_notebook"), 2);
}
