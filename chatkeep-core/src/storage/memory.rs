//! In-process session storage

use std::collections::HashMap;

use parking_lot::Mutex;

use super::SessionStorage;

/// Session storage held in memory for the lifetime of the process
///
/// An optional byte quota mimics the quota limits of browser session
/// storage: a write whose key plus value would push the total over the
/// quota is rejected with [`crate::Error::StorageWrite`].
#[derive(Debug, Default)]
pub struct MemoryStorage {
    slots: Mutex<HashMap<String, String>>,
    quota: Option<usize>,
}

impl MemoryStorage {
    /// Create an unbounded storage
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a storage that rejects writes beyond `bytes` in total
    pub fn with_quota(bytes: usize) -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
            quota: Some(bytes),
        }
    }

    /// Number of occupied slots
    pub fn len(&self) -> usize {
        self.slots.lock().len()
    }

    /// Whether no slot is occupied
    pub fn is_empty(&self) -> bool {
        self.slots.lock().is_empty()
    }
}

impl SessionStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> crate::Result<Option<String>> {
        Ok(self.slots.lock().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> crate::Result<()> {
        let mut slots = self.slots.lock();

        if let Some(quota) = self.quota {
            let used: usize = slots
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum();
            let needed = used + key.len() + value.len();
            if needed > quota {
                return Err(crate::Error::StorageWrite(format!(
                    "quota exceeded: {} bytes needed, {} allowed",
                    needed, quota
                )));
            }
        }

        slots.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> crate::Result<()> {
        self.slots.lock().remove(key);
        Ok(())
    }
}
