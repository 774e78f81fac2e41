// tests/storage_tests.rs

use crm_core::models::CreateLead;
use crm_core::storage::{
    check_schema_version, FileBackend, StorageBackend, KEY_SCHEMA_VERSION,
};
use crm_core::{AppConfig, CrmError, CrmStore};

#[test]
fn file_backend_roundtrips_keys() {
    let dir = tempfile::tempdir().unwrap();
    let backend = FileBackend::new(dir.path()).unwrap();

    backend.put("crm_leads/abc", r#"{"x":1}"#).unwrap();
    assert_eq!(
        backend.get("crm_leads/abc").unwrap().as_deref(),
        Some(r#"{"x":1}"#)
    );

    backend.put("crm_leads/def", r#"{"x":2}"#).unwrap();
    assert_eq!(backend.list("crm_leads").unwrap().len(), 2);
    // Prefixo sem registros não é erro.
    assert!(backend.list("crm_deals").unwrap().is_empty());

    backend.remove("crm_leads/abc").unwrap();
    assert!(backend.get("crm_leads/abc").unwrap().is_none());
    // Remover de novo é inofensivo.
    backend.remove("crm_leads/abc").unwrap();
}

#[test]
fn writes_touch_only_their_own_key() {
    let dir = tempfile::tempdir().unwrap();
    let backend = FileBackend::new(dir.path()).unwrap();

    backend.put("crm_leads/a", "1").unwrap();
    backend.put("crm_leads/b", "2").unwrap();
    backend.put("crm_leads/a", "3").unwrap();

    assert_eq!(backend.get("crm_leads/b").unwrap().as_deref(), Some("2"));
    assert_eq!(backend.get("crm_leads/a").unwrap().as_deref(), Some("3"));
}

#[test]
fn data_survives_reopening_the_store() {
    let dir = tempfile::tempdir().unwrap();
    let config = AppConfig {
        data_dir: Some(dir.path().to_path_buf()),
        seed_demo_data: true,
    };

    let lead_id = {
        let store = CrmStore::open(&config).unwrap();
        store.login("admin@acme.com", "x").unwrap();
        store
            .create_lead(CreateLead {
                name: "Persistente".to_string(),
                email: None,
                phone: None,
                source: None,
                status: None,
                score: None,
                estimated_value: None,
                owner_id: None,
            })
            .unwrap()
            .id
    };

    let store = CrmStore::open(&config).unwrap();
    // Sessão e dados sobrevivem à reabertura; o seed não roda de novo.
    assert!(store.current_session().unwrap().is_some());
    let leads = store.leads().unwrap();
    assert_eq!(leads.len(), 3);
    assert!(leads.iter().any(|l| l.id == lead_id));
}

#[test]
fn decimals_and_dates_rehydrate_losslessly() {
    let dir = tempfile::tempdir().unwrap();
    let config = AppConfig {
        data_dir: Some(dir.path().to_path_buf()),
        seed_demo_data: true,
    };

    let before = {
        let store = CrmStore::open(&config).unwrap();
        store.login("admin@acme.com", "x").unwrap();
        store.deals().unwrap()
    };

    let store = CrmStore::open(&config).unwrap();
    assert_eq!(store.deals().unwrap(), before);
}

#[test]
fn fresh_storage_is_stamped_with_the_schema_version() {
    let dir = tempfile::tempdir().unwrap();
    let backend = FileBackend::new(dir.path()).unwrap();

    check_schema_version(&backend).unwrap();
    assert!(backend.get(KEY_SCHEMA_VERSION).unwrap().is_some());
    // Reabrir com a mesma versão passa.
    check_schema_version(&backend).unwrap();
}

#[test]
fn schema_version_mismatch_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    let backend = FileBackend::new(dir.path()).unwrap();
    backend.put(KEY_SCHEMA_VERSION, "999").unwrap();

    match check_schema_version(&backend) {
        Err(CrmError::SchemaVersionMismatch { found, .. }) => assert_eq!(found, 999),
        other => panic!("esperava SchemaVersionMismatch, veio {other:?}"),
    }
}
