// tests/workflow_tests.rs

use crm_core::models::base::EntityKind;
use crm_core::models::{
    CreateDeal, CreateLead, CreateWorkflowTemplate, ExecutionStatus, LeadStatus, TriggerEvent,
    UpdateLead, UpdateWorkflowTemplate, WorkflowAction, WorkflowTrigger,
};
use crm_core::{CrmEvent, CrmStore};
use rust_decimal::Decimal;
use serde_json::json;

fn logged_store() -> CrmStore {
    let store = CrmStore::in_memory().unwrap();
    store.login("admin@acme.com", "x").unwrap();
    store
}

fn new_lead(store: &CrmStore, name: &str, status: Option<LeadStatus>) -> CrmEvent {
    let lead = store
        .create_lead(CreateLead {
            name: name.to_string(),
            email: None,
            phone: None,
            source: None,
            status,
            score: None,
            estimated_value: None,
            owner_id: None,
        })
        .unwrap();
    CrmEvent::EntityCreated {
        kind: EntityKind::Lead,
        id: lead.id,
        company_id: lead.company_id,
    }
}

#[test]
fn bus_delivers_mutation_events() {
    let store = logged_store();
    let rx = store.events().subscribe();

    let event = new_lead(&store, "Assinado", None);
    let received = rx.try_iter().find(|e| *e == event);
    assert!(received.is_some());
}

#[test]
fn seeded_template_runs_on_new_leads() {
    let store = logged_store();
    let tasks_before = store.activities_list().unwrap().len();

    let event = new_lead(&store, "Gatilho", None);
    let executions = store.dispatch_workflows(&event).unwrap();

    assert_eq!(executions.len(), 1);
    assert_eq!(executions[0].status, ExecutionStatus::Completed);
    assert_eq!(executions[0].log.len(), 2);

    let tasks = store.activities_list().unwrap();
    assert_eq!(tasks.len(), tasks_before + 1);
    assert!(tasks.iter().any(|a| a.title == "Follow up with new lead"));
}

#[test]
fn redispatching_the_same_mutation_is_skipped() {
    let store = logged_store();
    let event = new_lead(&store, "Uma vez só", None);

    let first = store.dispatch_workflows(&event).unwrap();
    assert_eq!(first[0].status, ExecutionStatus::Completed);

    let tasks_after_first = store.activities_list().unwrap().len();
    let second = store.dispatch_workflows(&event).unwrap();
    assert_eq!(second[0].status, ExecutionStatus::Skipped);
    // Nenhuma ação rodou de novo.
    assert_eq!(store.activities_list().unwrap().len(), tasks_after_first);
}

#[test]
fn filters_gate_the_trigger() {
    let store = logged_store();
    store
        .create_workflow_template(CreateWorkflowTemplate {
            name: "Só qualificados".to_string(),
            description: None,
            trigger: WorkflowTrigger {
                event: TriggerEvent::Created,
                entity: EntityKind::Lead,
                filters: json!({ "status": "qualified" })
                    .as_object()
                    .cloned()
                    .unwrap(),
            },
            actions: vec![WorkflowAction::Notify {
                message: "Lead quente".to_string(),
            }],
            enabled: Some(true),
        })
        .unwrap();

    let cold = new_lead(&store, "Frio", Some(LeadStatus::New));
    let hot = new_lead(&store, "Quente", Some(LeadStatus::Qualified));

    // O seed tem um template sem filtro que casa com os dois; o filtrado só
    // com o qualificado.
    assert_eq!(store.dispatch_workflows(&cold).unwrap().len(), 1);
    assert_eq!(store.dispatch_workflows(&hot).unwrap().len(), 2);
}

#[test]
fn update_field_action_patches_the_entity() {
    let store = logged_store();
    store
        .create_workflow_template(CreateWorkflowTemplate {
            name: "Pontuação mínima".to_string(),
            description: None,
            trigger: WorkflowTrigger {
                event: TriggerEvent::Updated,
                entity: EntityKind::Lead,
                filters: serde_json::Map::new(),
            },
            actions: vec![WorkflowAction::UpdateField {
                field: "score".to_string(),
                value: json!(90),
            }],
            enabled: Some(true),
        })
        .unwrap();

    let lead = store.leads().unwrap().into_iter().next().unwrap();
    store
        .update_lead(
            lead.id,
            UpdateLead {
                source: Some("evento".to_string()),
                ..UpdateLead::default()
            },
        )
        .unwrap();

    let event = CrmEvent::EntityUpdated {
        kind: EntityKind::Lead,
        id: lead.id,
        company_id: lead.company_id,
    };
    let executions = store.dispatch_workflows(&event).unwrap();
    assert_eq!(executions[0].status, ExecutionStatus::Completed);
    assert_eq!(store.get_lead(lead.id).unwrap().score, 90);
}

#[test]
fn update_field_with_unknown_field_fails_the_execution() {
    let store = logged_store();
    store
        .create_workflow_template(CreateWorkflowTemplate {
            name: "Campo torto".to_string(),
            description: None,
            trigger: WorkflowTrigger {
                event: TriggerEvent::Created,
                entity: EntityKind::Lead,
                filters: json!({ "name": "Quebra" }).as_object().cloned().unwrap(),
            },
            actions: vec![WorkflowAction::UpdateField {
                field: "naoExiste".to_string(),
                value: json!(true),
            }],
            enabled: Some(true),
        })
        .unwrap();

    let event = new_lead(&store, "Quebra", None);
    let executions = store.dispatch_workflows(&event).unwrap();
    let failed = executions
        .iter()
        .find(|e| e.status == ExecutionStatus::Failed)
        .expect("a execução do template torto deve falhar");
    assert!(failed.log.iter().any(|line| line.contains("naoExiste")));
}

#[test]
fn update_field_cannot_touch_reserved_fields() {
    let store = logged_store();
    store
        .create_workflow_template(CreateWorkflowTemplate {
            name: "Sequestro de tenant".to_string(),
            description: None,
            trigger: WorkflowTrigger {
                event: TriggerEvent::Created,
                entity: EntityKind::Lead,
                filters: json!({ "name": "Alvo" }).as_object().cloned().unwrap(),
            },
            actions: vec![WorkflowAction::UpdateField {
                field: "companyId".to_string(),
                value: json!(uuid::Uuid::new_v4()),
            }],
            enabled: Some(true),
        })
        .unwrap();

    let event = new_lead(&store, "Alvo", None);
    let executions = store.dispatch_workflows(&event).unwrap();
    let failed = executions
        .iter()
        .find(|e| e.status == ExecutionStatus::Failed)
        .expect("patch em campo reservado deve falhar a execução");
    assert!(failed.log.iter().any(|line| line.contains("companyId")));

    // O lead continua no tenant de origem.
    assert!(store.leads().unwrap().iter().any(|l| l.name == "Alvo"));
}

#[test]
fn move_stage_action_moves_deals() {
    let store = logged_store();
    let pipeline = store.pipelines().unwrap().into_iter().next().unwrap();
    let qualification = pipeline.stages.iter().find(|s| s.name == "Qualification").unwrap();
    let proposal = pipeline.stages.iter().find(|s| s.name == "Proposal").unwrap();

    store
        .create_workflow_template(CreateWorkflowTemplate {
            name: "Avança negócio novo".to_string(),
            description: None,
            trigger: WorkflowTrigger {
                event: TriggerEvent::Created,
                entity: EntityKind::Deal,
                filters: serde_json::Map::new(),
            },
            actions: vec![WorkflowAction::MoveStage {
                stage_id: proposal.id,
            }],
            enabled: Some(true),
        })
        .unwrap();

    let deal = store
        .create_deal(CreateDeal {
            title: "Automático".to_string(),
            pipeline_id: pipeline.id,
            stage_id: qualification.id,
            value: Decimal::from(1_000),
            probability: None,
            expected_close_date: None,
            owner_id: None,
            account_id: None,
            contact_id: None,
        })
        .unwrap();

    let event = CrmEvent::EntityCreated {
        kind: EntityKind::Deal,
        id: deal.id,
        company_id: deal.company_id,
    };
    let executions = store.dispatch_workflows(&event).unwrap();
    assert_eq!(executions[0].status, ExecutionStatus::Completed);

    let moved = store.get_deal(deal.id).unwrap();
    assert_eq!(moved.stage_id, proposal.id);
    assert_eq!(moved.probability, 35);
}

#[test]
fn disabled_templates_never_run() {
    let store = logged_store();
    let template = store
        .workflow_templates()
        .unwrap()
        .into_iter()
        .find(|t| t.name == "New lead follow-up")
        .unwrap();
    store
        .update_workflow_template(
            template.id,
            UpdateWorkflowTemplate {
                enabled: Some(false),
                ..UpdateWorkflowTemplate::default()
            },
        )
        .unwrap();

    let event = new_lead(&store, "Ignorado", None);
    assert!(store.dispatch_workflows(&event).unwrap().is_empty());
}

#[test]
fn executions_are_recorded_per_tenant() {
    let store = logged_store();
    let event = new_lead(&store, "Registrado", None);
    store.dispatch_workflows(&event).unwrap();

    let executions = store.workflow_executions().unwrap();
    assert_eq!(executions.len(), 1);
    assert!(executions[0].idempotency_key.contains("created"));
}
