// src/storage/memory.rs

use std::collections::BTreeMap;

use parking_lot::RwLock;

use crate::common::error::CrmResult;
use crate::storage::StorageBackend;

// Backend em memória para testes e uso efêmero. O BTreeMap mantém as
// chaves ordenadas, então `list` sai determinístico de graça.
#[derive(Default)]
pub struct MemoryBackend {
    entries: RwLock<BTreeMap<String, String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageBackend for MemoryBackend {
    fn get(&self, key: &str) -> CrmResult<Option<String>> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn put(&self, key: &str, value: &str) -> CrmResult<()> {
        self.entries
            .write()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> CrmResult<()> {
        self.entries.write().remove(key);
        Ok(())
    }

    fn list(&self, prefix: &str) -> CrmResult<Vec<String>> {
        let scope = format!("{prefix}/");
        let entries = self.entries.read();
        Ok(entries
            .range(scope.clone()..)
            .take_while(|(k, _)| k.starts_with(&scope))
            .map(|(_, v)| v.clone())
            .collect())
    }
}
