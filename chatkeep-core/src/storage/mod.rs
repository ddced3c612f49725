//! Session-scoped key-value storage
//!
//! The message store mirrors its sequence into a single string slot of a
//! [`SessionStorage`]. Backends are shared behind an `Arc` so the lifecycle
//! listeners can purge the same slot the store writes.

pub mod file;
pub mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use std::sync::Arc;

use crate::config::schema::{SessionConfig, StorageBackend};

/// String-keyed storage slots that live as long as the owning session
pub trait SessionStorage: Send + Sync {
    /// Read a slot; `Ok(None)` when the key is absent
    fn get_item(&self, key: &str) -> crate::Result<Option<String>>;

    /// Write a slot, replacing any previous value
    fn set_item(&self, key: &str, value: &str) -> crate::Result<()>;

    /// Remove a slot; removing an absent key succeeds
    fn remove_item(&self, key: &str) -> crate::Result<()>;
}

/// Build the storage backend selected by the session configuration
pub fn open_storage(config: &SessionConfig) -> Arc<dyn SessionStorage> {
    match config.backend {
        StorageBackend::Memory => Arc::new(MemoryStorage::new()),
        StorageBackend::File => Arc::new(FileStorage::new(&config.dir)),
    }
}
