mod common;

use common::{note_store_url, Fixture, ONE_TIME_CODE};
use notestore_models::Notebook;
use notestore_sdk::{AuthErrorKind, Credential, StoreError};

#[test]
fn login_binds_personal_endpoint() {
    let fx = Fixture::new();
    let credential = fx.login("bob");

    assert_eq!(credential.endpoint(), note_store_url("s2"));
    assert!(!credential.is_expired());
    assert!(!credential.second_factor_required());
    assert_eq!(
        credential.user().and_then(|u| u.username.as_deref()),
        Some("bob")
    );
    assert_eq!(fx.service.calls("check_version"), 1);
}

#[test]
fn wrong_password_is_invalid_credentials() {
    let fx = Fixture::new();
    let err = fx.users().authenticate("bob", "nope", false).unwrap_err();
    assert_eq!(err.auth_kind(), Some(AuthErrorKind::InvalidCredentials));
}

#[test]
fn refresh_replaces_the_credential() {
    let fx = Fixture::new();
    let users = fx.users();
    let original = fx.login("bob");

    let refreshed = users.refresh_authentication(&original).unwrap();
    assert_ne!(refreshed.token(), original.token());
    assert_eq!(refreshed.endpoint(), original.endpoint());

    assert!(users.get_user(&refreshed).is_ok());
    assert_eq!(
        users.get_user(&original).unwrap_err().auth_kind(),
        Some(AuthErrorKind::InvalidCredentials)
    );
}

#[test]
fn revoke_is_idempotent() {
    let fx = Fixture::new();
    let users = fx.users();
    let credential = fx.login("bob");

    users.revoke_long_session(&credential).unwrap();
    assert_eq!(
        users.get_user(&credential).unwrap_err().auth_kind(),
        Some(AuthErrorKind::InvalidCredentials)
    );
    users.revoke_long_session(&credential).unwrap();
}

#[test]
fn second_factor_gates_content_access() {
    let fx = Fixture::new();
    let users = fx.users();

    let refused = users.authenticate("carol", "carol-pw", false).unwrap_err();
    assert_eq!(refused.auth_kind(), Some(AuthErrorKind::TwoFactorRequired));

    let pending = users.authenticate("carol", "carol-pw", true).unwrap();
    assert!(pending.second_factor_required());

    let notes = fx.factory.note_store_client(pending.clone()).unwrap();
    assert_eq!(
        notes.list_notebooks().unwrap_err().auth_kind(),
        Some(AuthErrorKind::PermissionDenied)
    );

    let wrong = users
        .complete_two_factor_authentication(&pending, "000000", "laptop", "Carol's laptop")
        .unwrap_err();
    assert_eq!(wrong.auth_kind(), Some(AuthErrorKind::InvalidCredentials));

    users
        .complete_two_factor_authentication(&pending, ONE_TIME_CODE, "laptop", "Carol's laptop")
        .unwrap();
    assert!(notes.list_notebooks().unwrap().is_empty());
}

#[test]
fn long_session_login_works_like_a_normal_one() {
    let fx = Fixture::new();
    let credential = fx
        .users()
        .authenticate_long_session("bob", "bob-pw", "phone", "Bob's phone", false)
        .unwrap();
    assert_eq!(credential.endpoint(), note_store_url("s2"));
}

#[test]
fn account_queries() {
    let fx = Fixture::new();
    let users = fx.users();
    let alice = fx.login("alice");
    let bob = fx.login("bob");

    assert!(users.is_business_user(&alice).unwrap());
    assert!(!users.is_business_user(&bob).unwrap());
    assert_eq!(users.get_note_store_url(&bob).unwrap(), note_store_url("s2"));

    let public = users.get_public_user_info("alice").unwrap();
    assert_eq!(public.shard_id.as_deref(), Some("s1"));
    assert!(users.get_public_user_info("nobody").unwrap_err().is_not_found());
}

#[test]
fn credential_is_refused_on_a_foreign_shard() {
    let fx = Fixture::new();
    let bob = fx.login("bob");
    let misrouted = Credential::new(bob.token(), note_store_url("s1"));

    let notes = fx.factory.note_store_client(misrouted).unwrap();
    let err = notes.create_notebook(&Notebook::named("Elsewhere")).unwrap_err();
    assert_eq!(err.auth_kind(), Some(AuthErrorKind::PermissionDenied));
}

#[test]
fn personal_notebooks_and_notes() {
    let fx = Fixture::new();
    let notes = fx.factory.note_store_client(fx.login("bob")).unwrap();

    let inbox = notes.create_notebook(&Notebook::named("Inbox")).unwrap();
    assert_eq!(inbox.default_notebook, Some(true));
    assert_eq!(notes.get_default_notebook().unwrap().guid, inbox.guid);

    let note = notes
        .create_note(&notestore_models::Note {
            title: Some("Groceries".into()),
            content: Some("<en-note>milk</en-note>".into()),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(note.notebook_guid, inbox.guid);

    let guid = note.guid.unwrap();
    assert_eq!(notes.get_note_content(&guid).unwrap(), "<en-note>milk</en-note>");

    let err = notes.create_notebook(&Notebook::named("Inbox")).unwrap_err();
    assert!(matches!(err, StoreError::Validation { .. }));
}
