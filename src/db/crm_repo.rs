// src/db/crm_repo.rs

use std::sync::Arc;

use crate::db::repository::Repository;
use crate::models::crm::{Account, Contact, Deal, Lead};
use crate::models::pipeline::Pipeline;
use crate::storage::StorageBackend;

// Coleções centrais do CRM agrupadas num único repositório, uma por campo.
// O serviço decide as regras; aqui é só acesso tipado ao armazenamento.
#[derive(Clone)]
pub struct CrmRepository {
    pub leads: Repository<Lead>,
    pub accounts: Repository<Account>,
    pub contacts: Repository<Contact>,
    pub deals: Repository<Deal>,
    pub pipelines: Repository<Pipeline>,
}

impl CrmRepository {
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self {
            leads: Repository::new(Arc::clone(&backend)),
            accounts: Repository::new(Arc::clone(&backend)),
            contacts: Repository::new(Arc::clone(&backend)),
            deals: Repository::new(Arc::clone(&backend)),
            pipelines: Repository::new(backend),
        }
    }
}
