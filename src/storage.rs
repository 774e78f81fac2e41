// src/storage.rs

pub mod file;
pub mod memory;

pub use file::FileBackend;
pub use memory::MemoryBackend;

use crate::common::error::{CrmError, CrmResult};

// Chaves fixas fora das coleções.
pub const KEY_CURRENT_USER: &str = "crm_current_user";
pub const KEY_CURRENT_COMPANY: &str = "crm_current_company";
pub const KEY_SCHEMA_VERSION: &str = "crm_schema_version";

pub const SCHEMA_VERSION: u32 = 1;

// Armazenamento chave-valor de documentos JSON. Registros ficam em
// `<prefixo>/<uuid>` e cada escrita toca apenas a própria chave (nada de
// reserializar a coleção inteira).
pub trait StorageBackend: Send + Sync {
    fn get(&self, key: &str) -> CrmResult<Option<String>>;
    fn put(&self, key: &str, value: &str) -> CrmResult<()>;
    fn remove(&self, key: &str) -> CrmResult<()>;
    // Valores de todas as chaves sob `<prefixo>/`, em ordem de chave.
    fn list(&self, prefix: &str) -> CrmResult<Vec<String>>;
}

// Um armazenamento recém-criado recebe a versão atual; um existente com
// versão diferente é recusado em vez de quebrar na desserialização.
pub fn check_schema_version(backend: &dyn StorageBackend) -> CrmResult<()> {
    match backend.get(KEY_SCHEMA_VERSION)? {
        None => {
            backend.put(KEY_SCHEMA_VERSION, &SCHEMA_VERSION.to_string())?;
            Ok(())
        }
        Some(raw) => {
            let found: u32 = raw.trim().parse().map_err(|_| {
                CrmError::ValidationMessage(format!("Versão de esquema ilegível: '{raw}'"))
            })?;
            if found == SCHEMA_VERSION {
                Ok(())
            } else {
                Err(CrmError::SchemaVersionMismatch {
                    found,
                    expected: SCHEMA_VERSION,
                })
            }
        }
    }
}
