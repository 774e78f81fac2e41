// src/db/workflow_repo.rs

use std::sync::Arc;

use uuid::Uuid;

use crate::common::error::CrmResult;
use crate::db::repository::Repository;
use crate::models::workflow::{WorkflowExecution, WorkflowTemplate};
use crate::storage::StorageBackend;

#[derive(Clone)]
pub struct WorkflowRepository {
    pub templates: Repository<WorkflowTemplate>,
    pub executions: Repository<WorkflowExecution>,
}

impl WorkflowRepository {
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self {
            templates: Repository::new(Arc::clone(&backend)),
            executions: Repository::new(backend),
        }
    }

    // Deduplicação por chave de idempotência: uma execução por mutação.
    pub fn find_execution_by_key(
        &self,
        company_id: Uuid,
        idempotency_key: &str,
    ) -> CrmResult<Option<WorkflowExecution>> {
        Ok(self
            .executions
            .list(company_id)?
            .into_iter()
            .find(|e| e.idempotency_key == idempotency_key))
    }
}
