// tests/auth_tests.rs

use std::sync::Arc;

use crm_core::models::auth::LoginOutcome;
use crm_core::models::UpdateUser;
use crm_core::storage::MemoryBackend;
use crm_core::{CrmError, CrmStore};

fn seeded_store() -> CrmStore {
    CrmStore::in_memory().expect("abre o armazenamento em memória")
}

#[test]
fn login_succeeds_with_any_password() {
    let store = seeded_store();

    let outcome = store.login("admin@acme.com", "literalmente-qualquer-coisa").unwrap();
    let session = outcome.into_session().expect("login do seed deve passar");
    assert_eq!(session.user.email, "admin@acme.com");
    assert_eq!(session.company.name, "Acme Corporation");
}

#[test]
fn login_is_case_insensitive_on_email() {
    let store = seeded_store();
    let outcome = store.login("ADMIN@ACME.COM", "x").unwrap();
    assert!(outcome.is_success());
}

#[test]
fn unknown_email_is_a_failure_not_an_error() {
    let store = seeded_store();
    match store.login("ninguem@acme.com", "x").unwrap() {
        LoginOutcome::Failure { reason } => assert!(!reason.is_empty()),
        LoginOutcome::Success(_) => panic!("e-mail desconhecido não deveria logar"),
    }
}

#[test]
fn deactivated_user_cannot_login() {
    let store = seeded_store();
    let session = store.login("admin@acme.com", "x").unwrap().into_session().unwrap();

    let rep = store
        .users()
        .unwrap()
        .into_iter()
        .find(|u| u.email == "jane.doe@acme.com")
        .unwrap();
    store
        .settings()
        .deactivate_user(&session, rep.id)
        .unwrap();

    let outcome = store.login("jane.doe@acme.com", "x").unwrap();
    assert!(!outcome.is_success());
}

#[test]
fn logout_clears_the_persisted_session() {
    let store = seeded_store();
    store.login("admin@acme.com", "x").unwrap();
    assert!(store.current_session().unwrap().is_some());

    store.logout().unwrap();
    assert!(store.current_session().unwrap().is_none());
    assert!(matches!(
        store.leads(),
        Err(CrmError::AuthenticationRequired)
    ));
}

#[test]
fn session_survives_reopening_the_same_backend() {
    let backend = Arc::new(MemoryBackend::new());
    let store = CrmStore::with_backend(backend.clone(), true).unwrap();
    store.login("admin@acme.com", "x").unwrap();

    let reopened = CrmStore::with_backend(backend, true).unwrap();
    let session = reopened.current_session().unwrap().expect("sessão persistida");
    assert_eq!(session.user.email, "admin@acme.com");
}

#[test]
fn deactivating_the_logged_user_invalidates_the_session() {
    let store = seeded_store();
    let session = store.login("admin@acme.com", "x").unwrap().into_session().unwrap();

    store
        .settings()
        .update_user(
            &session,
            session.user.id,
            UpdateUser {
                is_active: Some(false),
                ..UpdateUser::default()
            },
        )
        .unwrap();

    assert!(store.current_session().unwrap().is_none());
}
