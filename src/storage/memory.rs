use crate::prelude::HashMap;
use crate::traits::StorageChannel;
use crate::{Error, Result};
use std::sync::{Arc, Mutex};

/// In-memory storage channel.
///
/// Clones share the same entries, the way every handle to a browser's
/// `localStorage` sees the same data. An optional byte quota makes writes
/// fail like a full browser store.
#[derive(Debug, Clone)]
pub struct MemoryStorage {
    name: String,
    entries: Arc<Mutex<HashMap<String, String>>>,
    quota_bytes: Option<usize>,
}

impl MemoryStorage {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Arc::new(Mutex::new(HashMap::default())),
            quota_bytes: None,
        }
    }

    /// Limit the total size of keys plus values
    pub fn with_quota(mut self, quota_bytes: usize) -> Self {
        self.quota_bytes = Some(quota_bytes);
        self
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.entries.lock().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove every entry
    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.clear();
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|_| Error::Storage(format!("{} storage lock poisoned", self.name)))
    }
}

impl StorageChannel for MemoryStorage {
    fn name(&self) -> &str {
        &self.name
    }

    fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<()> {
        let quota = self.quota_bytes;
        let mut entries = self.lock()?;

        if let Some(quota) = quota {
            let used: usize = entries
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum();
            if used + key.len() + value.len() > quota {
                return Err(Error::Storage(format!(
                    "{} quota exceeded writing {}",
                    self.name, key
                )));
            }
        }

        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.lock()?.remove(key);
        Ok(())
    }
}
