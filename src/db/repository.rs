// src/db/repository.rs

use std::marker::PhantomData;
use std::sync::Arc;

use serde_json::Value;
use uuid::Uuid;

use crate::common::error::{CrmError, CrmResult};
use crate::models::base::{next_timestamp, StoredEntity};
use crate::storage::StorageBackend;

// Repositório genérico: CRUD com escopo de tenant sobre o armazenamento
// chave-valor. Cada entidade vive em `<PREFIX>/<id>`; leitura por id é um
// lookup de chave, escrita toca um único documento.
pub struct Repository<T> {
    backend: Arc<dyn StorageBackend>,
    _entity: PhantomData<fn() -> T>,
}

impl<T> Clone for Repository<T> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            _entity: PhantomData,
        }
    }
}

impl<T: StoredEntity> Repository<T> {
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self {
            backend,
            _entity: PhantomData,
        }
    }

    fn key(id: Uuid) -> String {
        format!("{}/{}", T::PREFIX, id)
    }

    // Coleção do tenant, sem os registros marcados como removidos, em ordem
    // estável (criação, depois id) para leituras idempotentes.
    pub fn list(&self, company_id: Uuid) -> CrmResult<Vec<T>> {
        let mut records = Vec::new();
        for raw in self.backend.list(T::PREFIX)? {
            let record: T = serde_json::from_str(&raw)?;
            if record.company_id() == company_id && record.deleted_at().is_none() {
                records.push(record);
            }
        }
        records.sort_by(|a, b| {
            a.created_at()
                .cmp(&b.created_at())
                .then_with(|| a.id().cmp(&b.id()))
        });
        Ok(records)
    }

    // Varredura sem escopo; reservada aos fluxos que precisam cruzar
    // tenants (login por e-mail, verificação de seed).
    pub fn list_all(&self) -> CrmResult<Vec<T>> {
        let mut records = Vec::new();
        for raw in self.backend.list(T::PREFIX)? {
            let record: T = serde_json::from_str(&raw)?;
            if record.deleted_at().is_none() {
                records.push(record);
            }
        }
        Ok(records)
    }

    pub fn find(&self, company_id: Uuid, id: Uuid) -> CrmResult<Option<T>> {
        match self.backend.get(&Self::key(id))? {
            None => Ok(None),
            Some(raw) => {
                let record: T = serde_json::from_str(&raw)?;
                if record.company_id() == company_id && record.deleted_at().is_none() {
                    Ok(Some(record))
                } else {
                    // Registro de outro tenant é invisível, não "encontrado".
                    Ok(None)
                }
            }
        }
    }

    pub fn get(&self, company_id: Uuid, id: Uuid) -> CrmResult<T> {
        self.find(company_id, id)?.ok_or(CrmError::NotFound {
            kind: T::KIND,
            id,
        })
    }

    pub fn exists(&self, company_id: Uuid, id: Uuid) -> CrmResult<bool> {
        Ok(self.find(company_id, id)?.is_some())
    }

    pub fn insert(&self, record: &T) -> CrmResult<()> {
        self.save(record)
    }

    pub fn save(&self, record: &T) -> CrmResult<()> {
        let raw = serde_json::to_string(record)?;
        self.backend.put(&Self::key(record.id()), &raw)
    }

    // Atualização de um único campo no nível do documento JSON; usada pelo
    // interpretador de workflows (ação `update_field`). A chave do campo é
    // o nome serializado (camelCase). Os campos base (id, tenant, carimbos)
    // são reservados: patchá-los re-endereçaria ou re-domiciliaria o registro.
    const RESERVED_FIELDS: [&'static str; 7] = [
        "id",
        "companyId",
        "createdAt",
        "updatedAt",
        "createdBy",
        "updatedBy",
        "deletedAt",
    ];

    pub fn patch_json(
        &self,
        company_id: Uuid,
        id: Uuid,
        field: &str,
        value: Value,
        actor: Uuid,
    ) -> CrmResult<T> {
        if Self::RESERVED_FIELDS.contains(&field) {
            return Err(CrmError::ValidationMessage(format!(
                "Campo reservado não pode ser alterado: '{field}'"
            )));
        }

        let record = self.get(company_id, id)?;
        let mut doc = serde_json::to_value(&record)?;

        let Some(map) = doc.as_object_mut() else {
            return Err(CrmError::ValidationMessage(
                "Documento de entidade não é um objeto JSON.".to_string(),
            ));
        };
        if !map.contains_key(field) {
            return Err(CrmError::ValidationMessage(format!(
                "Campo desconhecido em {}: '{field}'",
                T::KIND
            )));
        }
        map.insert(field.to_string(), value);
        map.insert(
            "updatedAt".to_string(),
            serde_json::to_value(next_timestamp(record.updated_at()))?,
        );
        map.insert("updatedBy".to_string(), serde_json::to_value(actor)?);

        let patched: T = serde_json::from_value(doc)?;
        self.save(&patched)?;
        Ok(patched)
    }
}
