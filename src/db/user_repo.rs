// src/db/user_repo.rs

use std::sync::Arc;

use uuid::Uuid;

use crate::common::error::CrmResult;
use crate::db::repository::Repository;
use crate::models::auth::User;
use crate::storage::StorageBackend;

// O repositório de usuários. A busca por e-mail é deliberadamente sem
// escopo de tenant: é o caminho do login, antes de existir sessão.
#[derive(Clone)]
pub struct UserRepository {
    repo: Repository<User>,
}

impl UserRepository {
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self {
            repo: Repository::new(backend),
        }
    }

    pub fn find_by_email(&self, email: &str) -> CrmResult<Option<User>> {
        Ok(self
            .repo
            .list_all()?
            .into_iter()
            .find(|u| u.email.eq_ignore_ascii_case(email)))
    }

    pub fn email_taken(&self, email: &str, exclude: Option<Uuid>) -> CrmResult<bool> {
        Ok(self
            .repo
            .list_all()?
            .iter()
            .any(|u| u.email.eq_ignore_ascii_case(email) && Some(u.id) != exclude))
    }

    pub fn list(&self, company_id: Uuid) -> CrmResult<Vec<User>> {
        self.repo.list(company_id)
    }

    pub fn find(&self, company_id: Uuid, id: Uuid) -> CrmResult<Option<User>> {
        self.repo.find(company_id, id)
    }

    pub fn get(&self, company_id: Uuid, id: Uuid) -> CrmResult<User> {
        self.repo.get(company_id, id)
    }

    pub fn insert(&self, user: &User) -> CrmResult<()> {
        self.repo.insert(user)
    }

    pub fn save(&self, user: &User) -> CrmResult<()> {
        self.repo.save(user)
    }
}
