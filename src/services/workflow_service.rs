// src/services/workflow_service.rs

use std::sync::Arc;

use chrono::{Duration, Utc};
use serde_json::Value;
use uuid::Uuid;
use validator::Validate;

use crate::common::error::{CrmError, CrmResult};
use crate::db::{ActivityRepository, AuditRepository, CrmRepository, WorkflowRepository};
use crate::events::{CrmEvent, EventBus};
use crate::models::activity::{Activity, ActivityKind, Priority};
use crate::models::auth::Session;
use crate::models::base::{next_timestamp, EntityKind};
use crate::models::custom::AuditAction;
use crate::models::workflow::{
    CreateWorkflowTemplate, ExecutionStatus, TriggerEvent, UpdateWorkflowTemplate, WorkflowAction,
    WorkflowExecution, WorkflowTemplate,
};

// Interpretador de workflows. O despacho é explícito: quem mutou a entidade
// chama `dispatch` com o evento publicado — o motor nunca se inscreve no
// barramento, para que suas próprias ações não redisparem workflows.
#[derive(Clone)]
pub struct WorkflowService {
    workflows: WorkflowRepository,
    crm: CrmRepository,
    activities: ActivityRepository,
    audit: AuditRepository,
    events: Arc<EventBus>,
}

impl WorkflowService {
    pub fn new(
        workflows: WorkflowRepository,
        crm: CrmRepository,
        activities: ActivityRepository,
        audit: AuditRepository,
        events: Arc<EventBus>,
    ) -> Self {
        Self {
            workflows,
            crm,
            activities,
            audit,
            events,
        }
    }

    // =========================================================================
    //  TEMPLATES
    // =========================================================================

    pub fn list_templates(&self, session: &Session) -> CrmResult<Vec<WorkflowTemplate>> {
        self.workflows.templates.list(session.company.id)
    }

    pub fn get_template(&self, session: &Session, id: Uuid) -> CrmResult<WorkflowTemplate> {
        self.workflows.templates.get(session.company.id, id)
    }

    pub fn create_template(
        &self,
        session: &Session,
        payload: CreateWorkflowTemplate,
    ) -> CrmResult<WorkflowTemplate> {
        payload.validate()?;
        if payload.actions.is_empty() {
            return Err(CrmError::ValidationMessage(
                "O workflow precisa de ao menos uma ação.".to_string(),
            ));
        }
        let changes = serde_json::to_value(&payload)?;

        let now = Utc::now();
        let template = WorkflowTemplate {
            id: Uuid::new_v4(),
            company_id: session.company.id,
            name: payload.name,
            description: payload.description,
            trigger: payload.trigger,
            actions: payload.actions,
            enabled: payload.enabled.unwrap_or(true),
            created_at: now,
            updated_at: now,
            created_by: session.user.id,
            updated_by: session.user.id,
            deleted_at: None,
        };
        self.workflows.templates.insert(&template)?;

        self.audit.record(
            session.company.id,
            session.user.id,
            EntityKind::WorkflowTemplate,
            template.id,
            AuditAction::Created,
            changes,
        )?;
        self.events.publish(&CrmEvent::EntityCreated {
            kind: EntityKind::WorkflowTemplate,
            id: template.id,
            company_id: session.company.id,
        });
        Ok(template)
    }

    pub fn update_template(
        &self,
        session: &Session,
        id: Uuid,
        payload: UpdateWorkflowTemplate,
    ) -> CrmResult<WorkflowTemplate> {
        payload.validate()?;
        let changes = serde_json::to_value(&payload)?;

        let mut template = self.workflows.templates.get(session.company.id, id)?;
        if let Some(name) = payload.name {
            template.name = name;
        }
        if let Some(description) = payload.description {
            template.description = Some(description);
        }
        if let Some(trigger) = payload.trigger {
            template.trigger = trigger;
        }
        if let Some(actions) = payload.actions {
            if actions.is_empty() {
                return Err(CrmError::ValidationMessage(
                    "O workflow precisa de ao menos uma ação.".to_string(),
                ));
            }
            template.actions = actions;
        }
        if let Some(enabled) = payload.enabled {
            template.enabled = enabled;
        }
        template.updated_at = next_timestamp(template.updated_at);
        template.updated_by = session.user.id;

        self.workflows.templates.save(&template)?;

        self.audit.record(
            session.company.id,
            session.user.id,
            EntityKind::WorkflowTemplate,
            template.id,
            AuditAction::Updated,
            changes,
        )?;
        self.events.publish(&CrmEvent::EntityUpdated {
            kind: EntityKind::WorkflowTemplate,
            id: template.id,
            company_id: session.company.id,
        });
        Ok(template)
    }

    pub fn list_executions(&self, session: &Session) -> CrmResult<Vec<WorkflowExecution>> {
        self.workflows.executions.list(session.company.id)
    }

    // =========================================================================
    //  DESPACHO
    // =========================================================================

    // Avalia todos os templates habilitados contra o evento e executa os que
    // casarem. Retorna os registros de execução gravados (inclusive Skipped).
    pub fn dispatch(
        &self,
        session: &Session,
        event: &CrmEvent,
    ) -> CrmResult<Vec<WorkflowExecution>> {
        let (trigger_event, kind, entity_id) = match *event {
            CrmEvent::EntityCreated { kind, id, .. } => (TriggerEvent::Created, kind, id),
            CrmEvent::EntityUpdated { kind, id, .. } => (TriggerEvent::Updated, kind, id),
            _ => return Ok(Vec::new()),
        };

        let Some(doc) = self.load_entity_json(session, kind, entity_id)? else {
            return Ok(Vec::new());
        };

        let mut executions = Vec::new();
        for template in self.workflows.templates.list(session.company.id)? {
            if !template.enabled
                || template.trigger.event != trigger_event
                || template.trigger.entity != kind
            {
                continue;
            }
            if !filters_match(&template.trigger.filters, &doc) {
                continue;
            }
            executions.push(self.run_template(session, &template, trigger_event, kind, entity_id, &doc)?);
        }
        Ok(executions)
    }

    // JSON da entidade que disparou o evento, para filtros e chave de
    // idempotência. Tipos fora do alcance dos gatilhos retornam None.
    fn load_entity_json(
        &self,
        session: &Session,
        kind: EntityKind,
        id: Uuid,
    ) -> CrmResult<Option<Value>> {
        let company_id = session.company.id;
        let doc = match kind {
            EntityKind::Lead => self
                .crm
                .leads
                .find(company_id, id)?
                .map(|e| serde_json::to_value(&e))
                .transpose()?,
            EntityKind::Account => self
                .crm
                .accounts
                .find(company_id, id)?
                .map(|e| serde_json::to_value(&e))
                .transpose()?,
            EntityKind::Contact => self
                .crm
                .contacts
                .find(company_id, id)?
                .map(|e| serde_json::to_value(&e))
                .transpose()?,
            EntityKind::Deal => self
                .crm
                .deals
                .find(company_id, id)?
                .map(|e| serde_json::to_value(&e))
                .transpose()?,
            EntityKind::Activity => self
                .activities
                .repo
                .find(company_id, id)?
                .map(|e| serde_json::to_value(&e))
                .transpose()?,
            _ => None,
        };
        Ok(doc)
    }

    fn run_template(
        &self,
        session: &Session,
        template: &WorkflowTemplate,
        trigger_event: TriggerEvent,
        kind: EntityKind,
        entity_id: Uuid,
        doc: &Value,
    ) -> CrmResult<WorkflowExecution> {
        let event_name = match trigger_event {
            TriggerEvent::Created => "created",
            TriggerEvent::Updated => "updated",
        };
        let updated_at = doc
            .get("updatedAt")
            .and_then(Value::as_str)
            .unwrap_or_default();
        let idempotency_key =
            format!("{}:{event_name}:{entity_id}:{updated_at}", template.id);

        // A mesma mutação nunca executa duas vezes; o redespacho fica
        // registrado como Skipped para fins de auditoria.
        if self
            .workflows
            .find_execution_by_key(session.company.id, &idempotency_key)?
            .is_some()
        {
            let execution = self.record_execution(
                session,
                template,
                entity_id,
                ExecutionStatus::Skipped,
                vec!["Mutação já processada; execução ignorada.".to_string()],
                idempotency_key,
            )?;
            return Ok(execution);
        }

        let mut log = Vec::new();
        let mut status = ExecutionStatus::Completed;
        for action in &template.actions {
            match self.run_action(session, kind, entity_id, action, &mut log) {
                Ok(()) => {}
                Err(err) => {
                    log.push(format!("Ação falhou: {err}"));
                    status = ExecutionStatus::Failed;
                    break;
                }
            }
        }

        tracing::info!(
            workflow = %template.name,
            entity = %kind,
            ?status,
            "Workflow executado"
        );
        self.record_execution(session, template, entity_id, status, log, idempotency_key)
    }

    fn run_action(
        &self,
        session: &Session,
        kind: EntityKind,
        entity_id: Uuid,
        action: &WorkflowAction,
        log: &mut Vec<String>,
    ) -> CrmResult<()> {
        let company_id = session.company.id;
        match action {
            WorkflowAction::UpdateField { field, value } => {
                self.patch_entity(session, kind, entity_id, field, value.clone())?;
                log.push(format!("Campo '{field}' atualizado."));
            }
            WorkflowAction::CreateTask {
                title,
                priority,
                due_in_days,
            } => {
                let now = Utc::now();
                let activity = Activity {
                    id: Uuid::new_v4(),
                    company_id,
                    kind: ActivityKind::Task,
                    title: title.clone(),
                    description: None,
                    due_date: due_in_days.map(|days| now + Duration::days(days)),
                    completed: false,
                    completed_at: None,
                    priority: priority.unwrap_or(Priority::Medium),
                    lead_id: (kind == EntityKind::Lead).then_some(entity_id),
                    contact_id: (kind == EntityKind::Contact).then_some(entity_id),
                    deal_id: (kind == EntityKind::Deal).then_some(entity_id),
                    owner_id: session.user.id,
                    created_at: now,
                    updated_at: now,
                    created_by: session.user.id,
                    updated_by: session.user.id,
                    deleted_at: None,
                };
                self.activities.repo.insert(&activity)?;
                log.push(format!("Tarefa '{title}' criada."));
            }
            WorkflowAction::MoveStage { stage_id } => {
                if kind != EntityKind::Deal {
                    return Err(CrmError::ValidationMessage(
                        "A ação move_stage só se aplica a negócios.".to_string(),
                    ));
                }
                let mut deal = self.crm.deals.get(company_id, entity_id)?;
                let pipeline = self.crm.pipelines.get(company_id, deal.pipeline_id)?;
                let stage = pipeline
                    .stage(*stage_id)
                    .ok_or(CrmError::InvalidReference {
                        field: "stage_id",
                        id: *stage_id,
                    })?;
                deal.stage_id = stage.id;
                deal.probability = stage.probability;
                deal.updated_at = next_timestamp(deal.updated_at);
                deal.updated_by = session.user.id;
                self.crm.deals.save(&deal)?;
                log.push(format!("Negócio movido para o estágio '{}'.", stage.name));
            }
            WorkflowAction::SendEmail { template } => {
                log.push(format!("E-mail '{template}' registrado para envio."));
            }
            WorkflowAction::Notify { message } => {
                log.push(format!("Notificação: {message}"));
            }
            WorkflowAction::CallWebhook { url } => {
                log.push(format!("Webhook registrado: {url}"));
            }
        }
        Ok(())
    }

    fn patch_entity(
        &self,
        session: &Session,
        kind: EntityKind,
        id: Uuid,
        field: &str,
        value: Value,
    ) -> CrmResult<()> {
        let company_id = session.company.id;
        let actor = session.user.id;
        match kind {
            EntityKind::Lead => {
                self.crm.leads.patch_json(company_id, id, field, value, actor)?;
            }
            EntityKind::Account => {
                self.crm
                    .accounts
                    .patch_json(company_id, id, field, value, actor)?;
            }
            EntityKind::Contact => {
                self.crm
                    .contacts
                    .patch_json(company_id, id, field, value, actor)?;
            }
            EntityKind::Deal => {
                self.crm.deals.patch_json(company_id, id, field, value, actor)?;
            }
            EntityKind::Activity => {
                self.activities
                    .repo
                    .patch_json(company_id, id, field, value, actor)?;
            }
            other => {
                return Err(CrmError::ValidationMessage(format!(
                    "A ação update_field não se aplica a {other}."
                )));
            }
        }
        Ok(())
    }

    fn record_execution(
        &self,
        session: &Session,
        template: &WorkflowTemplate,
        entity_id: Uuid,
        status: ExecutionStatus,
        log: Vec<String>,
        idempotency_key: String,
    ) -> CrmResult<WorkflowExecution> {
        let now = Utc::now();
        let execution = WorkflowExecution {
            id: Uuid::new_v4(),
            company_id: session.company.id,
            workflow_id: template.id,
            entity_id,
            status,
            log,
            idempotency_key,
            started_at: now,
            finished_at: Some(now),
            created_at: now,
            updated_at: now,
            created_by: session.user.id,
            updated_by: session.user.id,
            deleted_at: None,
        };
        self.workflows.executions.insert(&execution)?;
        Ok(execution)
    }
}

// Filtros de igualdade estrita contra o JSON serializado da entidade.
fn filters_match(filters: &serde_json::Map<String, Value>, doc: &Value) -> bool {
    filters
        .iter()
        .all(|(key, expected)| doc.get(key) == Some(expected))
}
