// src/models/workflow.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;
use validator::Validate;

use crate::models::activity::Priority;
use crate::models::base::{stored_entity, EntityKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerEvent {
    Created,
    Updated,
}

// Gatilho declarativo: evento + tipo de entidade + filtros de igualdade.
// As chaves dos filtros são os nomes de campo serializados (camelCase),
// comparadas contra o JSON da entidade que disparou o evento.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowTrigger {
    pub event: TriggerEvent,
    pub entity: EntityKind,
    #[serde(default)]
    pub filters: Map<String, Value>,
}

// Ações executadas em ordem pelo interpretador. `SendEmail`, `Notify` e
// `CallWebhook` apenas registram no log de execução: não há infraestrutura
// de entrega no núcleo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WorkflowAction {
    UpdateField {
        field: String,
        value: Value,
    },
    CreateTask {
        title: String,
        priority: Option<Priority>,
        due_in_days: Option<i64>,
    },
    MoveStage {
        stage_id: Uuid,
    },
    SendEmail {
        template: String,
    },
    Notify {
        message: String,
    },
    CallWebhook {
        url: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowTemplate {
    pub id: Uuid,
    pub company_id: Uuid,

    pub name: String,
    pub description: Option<String>,
    pub trigger: WorkflowTrigger,
    pub actions: Vec<WorkflowAction>,
    pub enabled: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: Uuid,
    pub updated_by: Uuid,
    pub deleted_at: Option<DateTime<Utc>>,
}

stored_entity!(
    WorkflowTemplate,
    "crm_workflow_templates",
    EntityKind::WorkflowTemplate
);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    Running,
    Completed,
    Failed,
    Skipped,
}

// Registro de uma passada do interpretador. `idempotency_key` identifica a
// mutação que disparou o workflow: redespachar a mesma mutação não executa
// as ações de novo (no máximo uma execução por mutação).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowExecution {
    pub id: Uuid,
    pub company_id: Uuid,

    pub workflow_id: Uuid,
    pub entity_id: Uuid,
    pub status: ExecutionStatus,
    pub log: Vec<String>,
    pub idempotency_key: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: Uuid,
    pub updated_by: Uuid,
    pub deleted_at: Option<DateTime<Utc>>,
}

stored_entity!(
    WorkflowExecution,
    "crm_workflow_executions",
    EntityKind::WorkflowExecution
);

// --- Payloads ---

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateWorkflowTemplate {
    #[validate(length(min = 1, message = "O nome do workflow é obrigatório."))]
    pub name: String,
    pub description: Option<String>,
    pub trigger: WorkflowTrigger,
    pub actions: Vec<WorkflowAction>,
    pub enabled: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateWorkflowTemplate {
    #[validate(length(min = 1, message = "O nome do workflow é obrigatório."))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub trigger: Option<WorkflowTrigger>,
    pub actions: Option<Vec<WorkflowAction>>,
    pub enabled: Option<bool>,
}
