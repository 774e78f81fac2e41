// src/models/base.rs

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// Tipos de entidade persistidos pelo núcleo. O nome serializado (snake_case)
// é o mesmo usado nos gatilhos de workflow e no log de auditoria.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Company,
    User,
    Lead,
    Account,
    Contact,
    Pipeline,
    Deal,
    Activity,
    WorkflowTemplate,
    WorkflowExecution,
    CustomField,
    Dashboard,
    AuditLog,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Company => "company",
            EntityKind::User => "user",
            EntityKind::Lead => "lead",
            EntityKind::Account => "account",
            EntityKind::Contact => "contact",
            EntityKind::Pipeline => "pipeline",
            EntityKind::Deal => "deal",
            EntityKind::Activity => "activity",
            EntityKind::WorkflowTemplate => "workflow_template",
            EntityKind::WorkflowExecution => "workflow_execution",
            EntityKind::CustomField => "custom_field",
            EntityKind::Dashboard => "dashboard",
            EntityKind::AuditLog => "audit_log",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Contrato mínimo que o repositório genérico precisa de cada entidade:
// prefixo de chave no armazenamento, tipo, id e tenant.
pub trait StoredEntity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    const PREFIX: &'static str;
    const KIND: EntityKind;

    fn id(&self) -> Uuid;
    fn company_id(&self) -> Uuid;
    fn created_at(&self) -> DateTime<Utc>;
    fn updated_at(&self) -> DateTime<Utc>;
    fn deleted_at(&self) -> Option<DateTime<Utc>>;
}

// Implementa StoredEntity para os structs que carregam os campos base inline.
macro_rules! stored_entity {
    ($ty:ty, $prefix:expr, $kind:expr) => {
        impl $crate::models::base::StoredEntity for $ty {
            const PREFIX: &'static str = $prefix;
            const KIND: $crate::models::base::EntityKind = $kind;

            fn id(&self) -> uuid::Uuid {
                self.id
            }

            fn company_id(&self) -> uuid::Uuid {
                self.company_id
            }

            fn created_at(&self) -> chrono::DateTime<chrono::Utc> {
                self.created_at
            }

            fn updated_at(&self) -> chrono::DateTime<chrono::Utc> {
                self.updated_at
            }

            fn deleted_at(&self) -> Option<chrono::DateTime<chrono::Utc>> {
                self.deleted_at
            }
        }
    };
}

pub(crate) use stored_entity;

// `updated_at` deve crescer estritamente mesmo quando duas mutações caem no
// mesmo tick do relógio.
pub(crate) fn next_timestamp(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = Utc::now();
    if now > previous {
        now
    } else {
        previous + Duration::microseconds(1)
    }
}
