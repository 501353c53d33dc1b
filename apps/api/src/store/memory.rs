use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use super::{KvStore, StoreError, Versioned};

/// In-memory store used by tests and local development. The `BTreeMap`
/// keeps keys ordered, which makes prefix scans a bounded range walk.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, Versioned>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KvStore for MemoryStore {
    async fn put(&self, key: &str, value: Value) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().unwrap();
        let version = entries.get(key).map(|v| v.version + 1).unwrap_or(1);
        entries.insert(key.to_string(), Versioned { value, version });
        Ok(())
    }

    async fn put_if_absent(&self, key: &str, value: Value) -> Result<bool, StoreError> {
        let mut entries = self.entries.lock().unwrap();
        if entries.contains_key(key) {
            return Ok(false);
        }
        entries.insert(key.to_string(), Versioned { value, version: 1 });
        Ok(true)
    }

    async fn get(&self, key: &str) -> Result<Option<Versioned>, StoreError> {
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    async fn put_if_version(
        &self,
        key: &str,
        value: Value,
        expected: i64,
    ) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().unwrap();
        match entries.get_mut(key) {
            Some(entry) if entry.version == expected => {
                *entry = Versioned {
                    value,
                    version: expected + 1,
                };
                Ok(())
            }
            _ => Err(StoreError::VersionConflict {
                key: key.to_string(),
                expected,
            }),
        }
    }

    async fn scan_by_prefix(&self, prefix: &str) -> Result<Vec<(String, Versioned)>, StoreError> {
        let entries = self.entries.lock().unwrap();
        Ok(entries
            .range(prefix.to_string()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(key, entry)| (key.clone(), entry.clone()))
            .collect())
    }
}
