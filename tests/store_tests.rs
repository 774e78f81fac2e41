// tests/store_tests.rs

use std::sync::Arc;

use crm_core::models::auth::{CreateUser, UserRole};
use crm_core::models::{
    CreateAccount, CreateCompany, CreateContact, CreateDeal, CreateLead, CreatePipeline,
    CreatePipelineStage, LeadStatus, UpdateLead,
};
use crm_core::storage::MemoryBackend;
use crm_core::{CrmError, CrmStore};
use rust_decimal::Decimal;
use uuid::Uuid;

fn logged_store() -> CrmStore {
    let store = CrmStore::in_memory().unwrap();
    store.login("admin@acme.com", "x").unwrap();
    store
}

#[test]
fn every_collection_requires_a_session() {
    let store = CrmStore::with_backend(Arc::new(MemoryBackend::new()), false).unwrap();

    assert!(matches!(store.leads(), Err(CrmError::AuthenticationRequired)));
    assert!(matches!(store.accounts(), Err(CrmError::AuthenticationRequired)));
    assert!(matches!(store.contacts(), Err(CrmError::AuthenticationRequired)));
    assert!(matches!(store.deals(), Err(CrmError::AuthenticationRequired)));
    assert!(matches!(store.pipelines(), Err(CrmError::AuthenticationRequired)));
    assert!(matches!(store.activities_list(), Err(CrmError::AuthenticationRequired)));
    assert!(matches!(store.dashboard_metrics(), Err(CrmError::AuthenticationRequired)));
    assert!(matches!(store.users(), Err(CrmError::AuthenticationRequired)));
    assert!(matches!(store.audit_logs(), Err(CrmError::AuthenticationRequired)));
}

#[test]
fn create_then_get_roundtrips() {
    let store = logged_store();

    let lead = store
        .create_lead(CreateLead {
            name: "Nova Oportunidade".to_string(),
            email: None,
            phone: None,
            source: None,
            status: None,
            score: None,
            estimated_value: None,
            owner_id: None,
        })
        .unwrap();

    let fetched = store.get_lead(lead.id).unwrap();
    assert_eq!(fetched, lead);
    assert_eq!(fetched.status, LeadStatus::New);
    assert_eq!(fetched.score, 0);
}

#[test]
fn listing_is_stable_across_reads() {
    let store = logged_store();
    let first = store.leads().unwrap();
    let second = store.leads().unwrap();
    assert_eq!(first, second);
    assert_eq!(first.len(), 2);
}

#[test]
fn update_merges_only_the_provided_fields() {
    let store = logged_store();
    let lead = store.leads().unwrap().into_iter().next().unwrap();

    let updated = store
        .update_lead(
            lead.id,
            UpdateLead {
                score: Some(90),
                ..UpdateLead::default()
            },
        )
        .unwrap();

    assert_eq!(updated.score, 90);
    assert_eq!(updated.name, lead.name);
    assert_eq!(updated.status, lead.status);
    assert!(updated.updated_at > lead.updated_at);
}

#[test]
fn missing_record_is_a_typed_not_found() {
    let store = logged_store();
    let ghost = Uuid::new_v4();
    match store.get_lead(ghost) {
        Err(CrmError::NotFound { id, .. }) => assert_eq!(id, ghost),
        other => panic!("esperava NotFound, veio {other:?}"),
    }
}

#[test]
fn invalid_payload_is_rejected() {
    let store = logged_store();
    let result = store.create_lead(CreateLead {
        name: String::new(),
        email: None,
        phone: None,
        source: None,
        status: None,
        score: None,
        estimated_value: None,
        owner_id: None,
    });
    assert!(matches!(result, Err(CrmError::ValidationError(_))));
}

#[test]
fn deal_requires_an_existing_pipeline_and_stage() {
    let store = logged_store();
    let result = store.create_deal(CreateDeal {
        title: "Negócio órfão".to_string(),
        pipeline_id: Uuid::new_v4(),
        stage_id: Uuid::new_v4(),
        value: Decimal::from(100),
        probability: None,
        expected_close_date: None,
        owner_id: None,
        account_id: None,
        contact_id: None,
    });
    assert!(matches!(
        result,
        Err(CrmError::InvalidReference { field: "pipeline_id", .. })
    ));
}

#[test]
fn lead_owner_must_be_an_active_user_of_the_company() {
    let store = logged_store();
    let ghost = Uuid::new_v4();
    let result = store.create_lead(CreateLead {
        name: "Sem dono".to_string(),
        email: None,
        phone: None,
        source: None,
        status: None,
        score: None,
        estimated_value: None,
        owner_id: Some(ghost),
    });
    assert!(matches!(
        result,
        Err(CrmError::InvalidReference { field: "owner_id", id }) if id == ghost
    ));
}

#[test]
fn deal_stage_must_belong_to_the_deal_pipeline() {
    let store = logged_store();
    let sales = store.pipelines().unwrap().into_iter().next().unwrap();

    let other = store
        .create_pipeline(CreatePipeline {
            name: "Funil paralelo".to_string(),
            is_default: None,
            stages: vec![
                CreatePipelineStage {
                    name: "Entrada".to_string(),
                    probability: 20,
                    is_closed_won: false,
                    is_closed_lost: false,
                },
                CreatePipelineStage {
                    name: "Ganhou".to_string(),
                    probability: 100,
                    is_closed_won: true,
                    is_closed_lost: false,
                },
                CreatePipelineStage {
                    name: "Perdeu".to_string(),
                    probability: 0,
                    is_closed_won: false,
                    is_closed_lost: true,
                },
            ],
        })
        .unwrap();
    let foreign_stage = other.stages[0].id;

    // Estágio real, mas de outro pipeline: referência inválida.
    let result = store.create_deal(CreateDeal {
        title: "Negócio cruzado".to_string(),
        pipeline_id: sales.id,
        stage_id: foreign_stage,
        value: Decimal::from(500),
        probability: None,
        expected_close_date: None,
        owner_id: None,
        account_id: None,
        contact_id: None,
    });
    assert!(matches!(
        result,
        Err(CrmError::InvalidReference { field: "stage_id", id }) if id == foreign_stage
    ));

    // O mesmo vale para a transição de um negócio existente.
    let deal = store.deals().unwrap().into_iter().next().unwrap();
    assert!(matches!(
        store.move_deal_stage(deal.id, foreign_stage),
        Err(CrmError::InvalidReference { field: "stage_id", .. })
    ));
}

#[test]
fn contact_requires_an_existing_account() {
    let store = logged_store();
    let result = store.create_contact(CreateContact {
        first_name: "Ana".to_string(),
        last_name: "Lima".to_string(),
        email: None,
        phone: None,
        title: None,
        account_id: Some(Uuid::new_v4()),
        is_primary: None,
    });
    assert!(matches!(
        result,
        Err(CrmError::InvalidReference { field: "account_id", .. })
    ));
}

#[test]
fn pipeline_needs_exactly_one_won_and_one_lost_stage() {
    let store = logged_store();
    let result = store.create_pipeline(CreatePipeline {
        name: "Funil torto".to_string(),
        is_default: None,
        stages: vec![
            CreatePipelineStage {
                name: "A".to_string(),
                probability: 10,
                is_closed_won: false,
                is_closed_lost: false,
            },
            CreatePipelineStage {
                name: "B".to_string(),
                probability: 100,
                is_closed_won: true,
                is_closed_lost: false,
            },
        ],
    });
    assert!(matches!(result, Err(CrmError::ValidationMessage(_))));
}

#[test]
fn moving_a_deal_syncs_probability_with_the_stage() {
    let store = logged_store();
    let pipeline = store.pipelines().unwrap().into_iter().next().unwrap();
    let proposal = pipeline
        .stages
        .iter()
        .find(|s| s.name == "Proposal")
        .unwrap();
    let deal = store
        .deals()
        .unwrap()
        .into_iter()
        .find(|d| d.title == "Globex plant expansion")
        .unwrap();

    let moved = store.move_deal_stage(deal.id, proposal.id).unwrap();
    assert_eq!(moved.stage_id, proposal.id);
    assert_eq!(moved.probability, 35);
}

#[test]
fn duplicate_email_is_rejected() {
    let store = logged_store();
    let result = store.create_user(CreateUser {
        email: "admin@acme.com".to_string(),
        full_name: "Sósia".to_string(),
        role: UserRole::User,
        permissions: None,
    });
    assert!(matches!(result, Err(CrmError::EmailAlreadyExists)));
}

#[test]
fn tenants_never_see_each_other() {
    let store = logged_store();
    let acme_lead = store.leads().unwrap().into_iter().next().unwrap();
    store.logout().unwrap();

    store
        .create_company(
            CreateCompany {
                name: "Umbrella Ltda".to_string(),
                settings: None,
                subscription_tier: None,
            },
            CreateUser {
                email: "root@umbrella.com".to_string(),
                full_name: "Umbrella Root".to_string(),
                role: UserRole::CompanyAdmin,
                permissions: None,
            },
        )
        .unwrap();
    store.login("root@umbrella.com", "x").unwrap();

    assert!(store.leads().unwrap().is_empty());
    assert!(matches!(
        store.get_lead(acme_lead.id),
        Err(CrmError::NotFound { .. })
    ));

    // E a conta criada aqui não vaza para a Acme.
    let account = store
        .create_account(CreateAccount {
            name: "Hive".to_string(),
            industry: None,
            website: None,
            phone: None,
        })
        .unwrap();
    store.logout().unwrap();
    store.login("admin@acme.com", "x").unwrap();
    assert!(store
        .accounts()
        .unwrap()
        .iter()
        .all(|a| a.id != account.id));
}

#[test]
fn mutations_leave_an_audit_trail() {
    let store = logged_store();
    let before = store.audit_logs().unwrap().len();

    store
        .create_account(CreateAccount {
            name: "Auditada SA".to_string(),
            industry: None,
            website: None,
            phone: None,
        })
        .unwrap();

    let after = store.audit_logs().unwrap();
    assert_eq!(after.len(), before + 1);
}
