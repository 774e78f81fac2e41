// src/db/tenancy_repo.rs

use std::sync::Arc;

use uuid::Uuid;

use crate::common::error::{CrmError, CrmResult};
use crate::db::repository::Repository;
use crate::models::base::EntityKind;
use crate::models::tenancy::Company;
use crate::storage::StorageBackend;

// Companies são a raiz do tenant: não há escopo acima delas, então este
// repositório expõe busca direta por id.
#[derive(Clone)]
pub struct CompanyRepository {
    repo: Repository<Company>,
}

impl CompanyRepository {
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self {
            repo: Repository::new(backend),
        }
    }

    pub fn find_by_id(&self, id: Uuid) -> CrmResult<Option<Company>> {
        // O tenant de uma Company é ela mesma.
        self.repo.find(id, id)
    }

    pub fn get(&self, id: Uuid) -> CrmResult<Company> {
        self.find_by_id(id)?.ok_or(CrmError::NotFound {
            kind: EntityKind::Company,
            id,
        })
    }

    pub fn insert(&self, company: &Company) -> CrmResult<()> {
        self.repo.insert(company)
    }

    pub fn save(&self, company: &Company) -> CrmResult<()> {
        self.repo.save(company)
    }

    // Usado na abertura do armazenamento para decidir se o seed roda.
    pub fn any_exists(&self) -> CrmResult<bool> {
        Ok(!self.repo.list_all()?.is_empty())
    }
}
