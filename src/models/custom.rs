// src/models/custom.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;
use validator::Validate;

use crate::models::base::{stored_entity, EntityKind};

// --- CAMPOS PERSONALIZADOS (O Molde) ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FieldType {
    Text,
    Number,
    Date,
    Boolean,
    Select,
    Multiselect,
}

// Extensão de esquema por tenant: define um campo adicional para um tipo
// de entidade. `key_name` é única por (empresa, tipo de entidade).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomField {
    pub id: Uuid,
    pub company_id: Uuid,

    pub entity: EntityKind,
    pub name: String,     // Ex: "Região"
    pub key_name: String, // Ex: "region"
    pub field_type: FieldType,

    // Opções para Selects (Ex: ["A", "B"]).
    // Usamos 'Value' porque pode ser um array de strings ou objetos.
    pub options: Option<Value>,
    pub is_required: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: Uuid,
    pub updated_by: Uuid,
    pub deleted_at: Option<DateTime<Utc>>,
}

stored_entity!(CustomField, "crm_custom_fields", EntityKind::CustomField);

// --- DASHBOARD (metadado de relatório) ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub id: Uuid,
    pub company_id: Uuid,

    pub name: String,
    // Layout livre definido pelo consumidor; o núcleo só armazena.
    pub widgets: Value,
    pub is_default: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: Uuid,
    pub updated_by: Uuid,
    pub deleted_at: Option<DateTime<Utc>>,
}

stored_entity!(Dashboard, "crm_dashboards", EntityKind::Dashboard);

// --- AUDITORIA ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Created,
    Updated,
}

// Trilha de mutações: quem fez o quê, em qual registro, com qual payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLog {
    pub id: Uuid,
    pub company_id: Uuid,

    pub entity: EntityKind,
    pub entity_id: Uuid,
    pub action: AuditAction,
    pub actor_id: Uuid,
    pub changes: Value,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: Uuid,
    pub updated_by: Uuid,
    pub deleted_at: Option<DateTime<Utc>>,
}

stored_entity!(AuditLog, "crm_audit_logs", EntityKind::AuditLog);

// --- Payloads ---

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCustomField {
    pub entity: EntityKind,
    #[validate(length(min = 1, message = "O nome do campo é obrigatório."))]
    pub name: String,
    #[validate(length(min = 1, message = "A chave do campo é obrigatória."))]
    pub key_name: String,
    pub field_type: FieldType,
    pub options: Option<Value>,
    pub is_required: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateDashboard {
    #[validate(length(min = 1, message = "O nome do dashboard é obrigatório."))]
    pub name: String,
    pub widgets: Option<Value>,
    pub is_default: Option<bool>,
}
