// src/db/custom_repo.rs

use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;
use uuid::Uuid;

use crate::common::error::CrmResult;
use crate::db::repository::Repository;
use crate::models::base::EntityKind;
use crate::models::custom::{AuditAction, AuditLog, CustomField, Dashboard};
use crate::storage::StorageBackend;

// Metadados de extensão de esquema e de relatório.
#[derive(Clone)]
pub struct CustomRepository {
    pub fields: Repository<CustomField>,
    pub dashboards: Repository<Dashboard>,
}

impl CustomRepository {
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self {
            fields: Repository::new(Arc::clone(&backend)),
            dashboards: Repository::new(backend),
        }
    }

    // `key_name` é única por (empresa, tipo de entidade).
    pub fn key_taken(&self, company_id: Uuid, entity: EntityKind, key_name: &str) -> CrmResult<bool> {
        Ok(self
            .fields
            .list(company_id)?
            .iter()
            .any(|f| f.entity == entity && f.key_name == key_name))
    }
}

// Trilha de auditoria: os serviços mutadores registram uma entrada por
// criação/atualização, com o payload da mudança em `changes`.
#[derive(Clone)]
pub struct AuditRepository {
    repo: Repository<AuditLog>,
}

impl AuditRepository {
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self {
            repo: Repository::new(backend),
        }
    }

    pub fn record(
        &self,
        company_id: Uuid,
        actor_id: Uuid,
        entity: EntityKind,
        entity_id: Uuid,
        action: AuditAction,
        changes: Value,
    ) -> CrmResult<()> {
        let now = Utc::now();
        let entry = AuditLog {
            id: Uuid::new_v4(),
            company_id,
            entity,
            entity_id,
            action,
            actor_id,
            changes,
            created_at: now,
            updated_at: now,
            created_by: actor_id,
            updated_by: actor_id,
            deleted_at: None,
        };
        self.repo.insert(&entry)
    }

    pub fn list(&self, company_id: Uuid) -> CrmResult<Vec<AuditLog>> {
        self.repo.list(company_id)
    }
}
