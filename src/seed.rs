// src/seed.rs

use rust_decimal::Decimal;
use serde_json::json;

use crate::common::error::{CrmError, CrmResult};
use crate::models::activity::{ActivityKind, CreateActivity, Priority};
use crate::models::auth::{CreateUser, UserRole};
use crate::models::base::EntityKind;
use crate::models::crm::{CreateAccount, CreateContact, CreateDeal, CreateLead, LeadStatus};
use crate::models::custom::{CreateCustomField, CreateDashboard, FieldType};
use crate::models::pipeline::{CreatePipeline, CreatePipelineStage};
use crate::models::tenancy::{CompanySettings, CreateCompany, SubscriptionTier};
use crate::models::workflow::{CreateWorkflowTemplate, WorkflowAction, WorkflowTrigger, TriggerEvent};
use crate::services::{
    ActivityService, CrmService, SettingsService, TenancyService, WorkflowService,
};

// Carga de demonstração para um armazenamento vazio: um tenant completo
// (Acme Corporation) com usuários, pipeline, leads, negócios e afins, criado
// pelos mesmos serviços que o uso normal atravessa.
pub(crate) fn load_demo_data(
    tenancy: &TenancyService,
    settings: &SettingsService,
    crm: &CrmService,
    activities: &ActivityService,
    workflows: &WorkflowService,
) -> CrmResult<()> {
    let session = tenancy.create_company(
        CreateCompany {
            name: "Acme Corporation".to_string(),
            settings: Some(CompanySettings {
                currency: "USD".to_string(),
                timezone: "America/New_York".to_string(),
                date_format: "MM/DD/YYYY".to_string(),
                features: vec![
                    "leads".to_string(),
                    "deals".to_string(),
                    "workflows".to_string(),
                ],
            }),
            subscription_tier: Some(SubscriptionTier::Professional),
        },
        CreateUser {
            email: "admin@acme.com".to_string(),
            full_name: "Acme Admin".to_string(),
            role: UserRole::CompanyAdmin,
            permissions: Some(vec!["*".to_string()]),
        },
    )?;

    let rep = settings.create_user(
        &session,
        CreateUser {
            email: "jane.doe@acme.com".to_string(),
            full_name: "Jane Doe".to_string(),
            role: UserRole::SalesRep,
            permissions: None,
        },
    )?;

    let pipeline = crm.create_pipeline(
        &session,
        CreatePipeline {
            name: "Sales Pipeline".to_string(),
            is_default: Some(true),
            stages: vec![
                CreatePipelineStage {
                    name: "Qualification".to_string(),
                    probability: 10,
                    is_closed_won: false,
                    is_closed_lost: false,
                },
                CreatePipelineStage {
                    name: "Proposal".to_string(),
                    probability: 35,
                    is_closed_won: false,
                    is_closed_lost: false,
                },
                CreatePipelineStage {
                    name: "Negotiation".to_string(),
                    probability: 60,
                    is_closed_won: false,
                    is_closed_lost: false,
                },
                CreatePipelineStage {
                    name: "Closed Won".to_string(),
                    probability: 100,
                    is_closed_won: true,
                    is_closed_lost: false,
                },
                CreatePipelineStage {
                    name: "Closed Lost".to_string(),
                    probability: 0,
                    is_closed_won: false,
                    is_closed_lost: true,
                },
            ],
        },
    )?;
    let stage_id = |name: &str| {
        pipeline
            .stages
            .iter()
            .find(|s| s.name == name)
            .map(|s| s.id)
            .ok_or_else(|| CrmError::ValidationMessage(format!("Estágio ausente na carga: {name}")))
    };

    crm.create_lead(
        &session,
        CreateLead {
            name: "John Carter".to_string(),
            email: Some("john.carter@globex.com".to_string()),
            phone: Some("+1 555 0101".to_string()),
            source: Some("website".to_string()),
            status: Some(LeadStatus::Qualified),
            score: Some(75),
            estimated_value: Some(Decimal::from(50_000)),
            owner_id: Some(rep.id),
        },
    )?;
    crm.create_lead(
        &session,
        CreateLead {
            name: "Maria Santos".to_string(),
            email: Some("maria.santos@initech.com".to_string()),
            phone: None,
            source: Some("referral".to_string()),
            status: Some(LeadStatus::New),
            score: Some(40),
            estimated_value: None,
            owner_id: None,
        },
    )?;

    let account = crm.create_account(
        &session,
        CreateAccount {
            name: "Globex Industries".to_string(),
            industry: Some("Manufacturing".to_string()),
            website: Some("https://globex.example.com".to_string()),
            phone: Some("+1 555 0100".to_string()),
        },
    )?;
    let contact = crm.create_contact(
        &session,
        CreateContact {
            first_name: "Sarah".to_string(),
            last_name: "Connor".to_string(),
            email: Some("sarah.connor@globex.com".to_string()),
            phone: None,
            title: Some("VP of Operations".to_string()),
            account_id: Some(account.id),
            is_primary: Some(true),
        },
    )?;
    crm.create_contact(
        &session,
        CreateContact {
            first_name: "Tom".to_string(),
            last_name: "Reyes".to_string(),
            email: Some("tom.reyes@globex.com".to_string()),
            phone: None,
            title: Some("Procurement Analyst".to_string()),
            account_id: Some(account.id),
            is_primary: Some(false),
        },
    )?;

    let expansion = crm.create_deal(
        &session,
        CreateDeal {
            title: "Globex plant expansion".to_string(),
            pipeline_id: pipeline.id,
            stage_id: stage_id("Negotiation")?,
            value: Decimal::from(75_000),
            probability: None,
            expected_close_date: None,
            owner_id: Some(rep.id),
            account_id: Some(account.id),
            contact_id: Some(contact.id),
        },
    )?;
    crm.create_deal(
        &session,
        CreateDeal {
            title: "Starter package".to_string(),
            pipeline_id: pipeline.id,
            stage_id: stage_id("Closed Won")?,
            value: Decimal::from(25_000),
            probability: None,
            expected_close_date: None,
            owner_id: None,
            account_id: Some(account.id),
            contact_id: None,
        },
    )?;

    activities.create_activity(
        &session,
        CreateActivity {
            kind: Some(ActivityKind::Call),
            title: "Discovery call with Globex".to_string(),
            description: Some("Revisar escopo da expansão da planta.".to_string()),
            due_date: None,
            priority: Some(Priority::High),
            lead_id: None,
            contact_id: Some(contact.id),
            deal_id: Some(expansion.id),
            owner_id: Some(rep.id),
        },
    )?;
    activities.create_activity(
        &session,
        CreateActivity {
            kind: Some(ActivityKind::Task),
            title: "Send proposal draft".to_string(),
            description: None,
            due_date: None,
            priority: None,
            lead_id: None,
            contact_id: None,
            deal_id: Some(expansion.id),
            owner_id: None,
        },
    )?;

    workflows.create_template(
        &session,
        CreateWorkflowTemplate {
            name: "New lead follow-up".to_string(),
            description: Some("Cria a tarefa de primeiro contato para todo lead novo.".to_string()),
            trigger: WorkflowTrigger {
                event: TriggerEvent::Created,
                entity: EntityKind::Lead,
                filters: serde_json::Map::new(),
            },
            actions: vec![
                WorkflowAction::CreateTask {
                    title: "Follow up with new lead".to_string(),
                    priority: Some(Priority::High),
                    due_in_days: Some(3),
                },
                WorkflowAction::Notify {
                    message: "Novo lead aguardando contato.".to_string(),
                },
            ],
            enabled: Some(true),
        },
    )?;

    settings.create_custom_field(
        &session,
        CreateCustomField {
            entity: EntityKind::Lead,
            name: "Region".to_string(),
            key_name: "region".to_string(),
            field_type: FieldType::Select,
            options: Some(json!(["North", "South", "East", "West"])),
            is_required: Some(false),
        },
    )?;

    settings.create_dashboard(
        &session,
        CreateDashboard {
            name: "Sales Overview".to_string(),
            widgets: Some(json!([
                { "type": "metric", "metric": "totalLeads" },
                { "type": "metric", "metric": "totalDealValue" },
                { "type": "funnel", "pipelineId": pipeline.id },
            ])),
            is_default: Some(true),
        },
    )?;

    tracing::info!("✅ Carga de demonstração concluída");
    Ok(())
}
