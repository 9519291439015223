mod common;

use std::sync::Arc;

use common::{note_store_url, Fixture};
use notestore_models::{Note, Notebook};
use notestore_sdk::{AuthErrorKind, BusinessNoteStoreOperations, LinkedNoteStoreOperations, ResolutionState};

#[test]
fn team_notes_end_to_end() {
    let fx = Fixture::new();
    let alice = fx.login("alice");
    assert!(fx.users().is_business_user(&alice).unwrap());

    let business = fx.factory.business_note_store_client(alice).unwrap();
    assert_eq!(business.business_client().endpoint(), note_store_url("b1"));

    let linked = business.create_notebook(&Notebook::named("Team Notes")).unwrap();
    assert_eq!(linked.share_name.as_deref(), Some("Team Notes"));
    assert_eq!(linked.note_store_url.as_deref(), Some(note_store_url("b1").as_str()));
    assert_eq!(linked.business_id, Some(1));
    assert!(linked.guid.is_some());

    let listed = business.list_notebooks().unwrap();
    assert_eq!(listed, vec![linked.clone()]);

    assert_eq!(
        business.linked_client().resolution_state(&linked).unwrap(),
        ResolutionState::Unresolved
    );
    let notebook = business.get_corresponding_notebook(&linked).unwrap();
    assert_eq!(notebook.name.as_deref(), Some("Team Notes"));
    assert!(business.is_notebook_writable(&linked).unwrap());
    assert_eq!(
        business.linked_client().resolution_state(&linked).unwrap(),
        ResolutionState::Ready
    );

    let note = business
        .create_note(
            &Note {
                title: Some("Kickoff agenda".into()),
                ..Note::default()
            },
            &linked,
        )
        .unwrap();
    assert_eq!(note.notebook_guid, notebook.guid);

    let first = business.get_client(&linked).unwrap();
    let second = business.get_client(&linked).unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(fx.service.calls("authenticate_to_shared_notebook"), 1);
}

#[test]
fn business_exchange_is_repeatable() {
    let fx = Fixture::new();
    let users = fx.users();
    let alice = fx.login("alice");

    let once = users.authenticate_to_business(&alice).unwrap();
    let twice = users.authenticate_to_business(&alice).unwrap();
    assert_eq!(once.endpoint(), twice.endpoint());
    assert_ne!(once.token(), twice.token());

    // The personal credential keeps working.
    assert!(users.get_user(&alice).is_ok());
}

#[test]
fn business_credential_outlives_a_revoked_personal_one() {
    let fx = Fixture::new();
    let alice = fx.login("alice");
    let business = fx.factory.business_note_store_client(alice.clone()).unwrap();
    business.create_notebook(&Notebook::named("Roadmap")).unwrap();

    fx.users().revoke_long_session(&alice).unwrap();

    let notebooks = business.business_client().list_notebooks().unwrap();
    assert!(notebooks.iter().any(|n| n.name.as_deref() == Some("Roadmap")));

    let err = business
        .linked_client()
        .personal_client()
        .list_notebooks()
        .unwrap_err();
    assert_eq!(err.auth_kind(), Some(AuthErrorKind::InvalidCredentials));
    assert_eq!(
        fx.users().get_user(&alice).unwrap_err().auth_kind(),
        Some(AuthErrorKind::InvalidCredentials)
    );
}

#[test]
fn non_members_have_no_business() {
    let fx = Fixture::new();
    let err = fx
        .factory
        .business_note_store_client(fx.login("bob"))
        .unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn business_listing_skips_personal_shares() {
    let fx = Fixture::new();
    let bob_notes = fx.factory.note_store_client(fx.login("bob")).unwrap();
    let recipes = bob_notes.create_notebook(&Notebook::named("Recipes")).unwrap();
    let share = bob_notes
        .create_shared_notebook(&notestore_models::SharedNotebook {
            notebook_guid: recipes.guid.clone(),
            username: Some("alice".into()),
            ..Default::default()
        })
        .unwrap();

    let alice = fx.login("alice");
    let alice_notes = fx.factory.note_store_client(alice.clone()).unwrap();
    alice_notes
        .create_linked_notebook(&notestore_models::LinkedNotebook::new(
            "Recipes",
            share.share_key.as_deref().unwrap(),
            &note_store_url("s2"),
        ))
        .unwrap();

    let business = fx.factory.business_note_store_client(alice).unwrap();
    business.create_notebook(&Notebook::named("Roadmap")).unwrap();

    let names: Vec<_> = business
        .list_notebooks()
        .unwrap()
        .into_iter()
        .filter_map(|l| l.share_name)
        .collect();
    assert_eq!(names, vec!["Roadmap".to_string()]);
}
