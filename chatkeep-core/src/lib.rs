//! Core types for chatkeep
//!
//! This crate provides the session-scoped chat message store, the codec
//! used to mirror it into storage, the storage backends, and the lifecycle
//! listeners that purge a session when its owner goes away.

pub mod config;
pub mod error;
pub mod lifecycle;
pub mod logging;
pub mod session;
pub mod storage;
pub mod utils;

pub use error::{Error, Result};
pub use lifecycle::{attach_cleanup_listeners, CleanupListeners, LifecycleEvent, LifecycleEvents};
pub use session::{ChatMessage, MessageStore, NewMessage, Role, StoreSettings};
pub use storage::{FileStorage, MemoryStorage, SessionStorage};
