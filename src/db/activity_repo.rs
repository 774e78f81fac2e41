// src/db/activity_repo.rs

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::common::error::CrmResult;
use crate::db::repository::Repository;
use crate::models::activity::Activity;
use crate::storage::StorageBackend;

#[derive(Clone)]
pub struct ActivityRepository {
    pub repo: Repository<Activity>,
}

impl ActivityRepository {
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self {
            repo: Repository::new(backend),
        }
    }

    pub fn list_overdue(&self, company_id: Uuid) -> CrmResult<Vec<Activity>> {
        let now = Utc::now();
        Ok(self
            .repo
            .list(company_id)?
            .into_iter()
            .filter(|a| !a.completed && a.due_date.is_some_and(|due| due < now))
            .collect())
    }
}
