//! The session-scoped message store

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::codec;
use super::message::{ChatMessage, NewMessage, Role, DEFAULT_WELCOME_MESSAGE, WELCOME_MESSAGE_ID};
use crate::config::schema::SessionConfig;
use crate::storage::SessionStorage;
use crate::utils::{now_millis, truncate};

/// Default storage slot key
pub const DEFAULT_STORAGE_KEY: &str = "chat_messages";

/// Default retention cap
pub const DEFAULT_MAX_MESSAGES: usize = 100;

/// Settings fixed for the lifetime of a store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreSettings {
    /// Storage slot holding the encoded sequence
    pub storage_key: String,
    /// Maximum number of retained messages; 0 is treated as 1
    pub max_messages: usize,
    /// Id of the welcome message
    pub welcome_id: String,
    /// Greeting text of the welcome message
    pub welcome_message: String,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            max_messages: DEFAULT_MAX_MESSAGES,
            welcome_id: WELCOME_MESSAGE_ID.to_string(),
            welcome_message: DEFAULT_WELCOME_MESSAGE.to_string(),
        }
    }
}

impl From<&SessionConfig> for StoreSettings {
    fn from(config: &SessionConfig) -> Self {
        Self {
            storage_key: config.storage_key.clone(),
            max_messages: config.max_messages,
            welcome_id: config.welcome_id.clone(),
            welcome_message: config.welcome_message.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StoreState {
    Uninitialized,
    Ready,
}

/// Ordered, capped chat history mirrored into a session storage slot
///
/// The in-memory sequence is authoritative. Storage is best-effort: read,
/// write and remove failures are logged and never reach the caller.
/// Once initialized the sequence is never empty; the reset state is a
/// single welcome message.
pub struct MessageStore {
    storage: Arc<dyn SessionStorage>,
    settings: StoreSettings,
    messages: Vec<ChatMessage>,
    state: StoreState,
}

impl MessageStore {
    /// Create an uninitialized store over `storage`
    pub fn new(storage: Arc<dyn SessionStorage>, settings: StoreSettings) -> Self {
        Self {
            storage,
            settings,
            messages: Vec::new(),
            state: StoreState::Uninitialized,
        }
    }

    /// Create a store and restore it from storage right away
    pub fn open(storage: Arc<dyn SessionStorage>, settings: StoreSettings) -> Self {
        let mut store = Self::new(storage, settings);
        store.initialize();
        store
    }

    /// Restore the persisted sequence, or seed the welcome message
    ///
    /// Runs once; later calls are no-ops. A slot that cannot be read or
    /// decoded is removed so the bad value is not retried.
    pub fn initialize(&mut self) {
        if self.state == StoreState::Ready {
            return;
        }
        self.state = StoreState::Ready;

        let key = &self.settings.storage_key;
        let restored = match self.storage.get_item(key) {
            Ok(Some(raw)) => match codec::decode(&raw) {
                Ok(messages) => Some(messages),
                Err(e) => {
                    warn!(key = %key, error = %e, "Discarding corrupted chat session");
                    self.purge();
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!(key = %key, error = %e, "Failed to read chat session");
                self.purge();
                None
            }
        };

        match restored {
            Some(messages) => {
                info!(count = messages.len(), "Restored chat session");
                self.messages = messages;
                if self.enforce_cap() > 0 {
                    self.persist();
                }
            }
            None => {
                debug!("Starting fresh chat session");
                self.messages = vec![self.welcome()];
            }
        }
    }

    /// Append a message stamped with the current time, evicting the oldest
    /// entries beyond the retention cap
    pub fn append(&mut self, message: NewMessage) {
        self.initialize();

        let message = message.stamp(now_millis());
        debug!(
            id = %message.id,
            role = %message.role,
            preview = %truncate(&message.content, 48),
            "Appending chat message"
        );
        self.messages.push(message);
        self.enforce_cap();
        self.persist();
    }

    /// Replace the content of the last message if it is an assistant reply
    ///
    /// Returns `false` without touching memory or storage when the last
    /// message is from the user.
    pub fn update_last_content(&mut self, content: impl Into<String>) -> bool {
        self.initialize();

        match self.messages.last_mut() {
            Some(last) if last.role == Role::Assistant => {
                last.content = content.into();
            }
            _ => return false,
        }
        self.persist();
        true
    }

    /// Reset to the welcome message and remove the storage slot
    pub fn clear(&mut self) {
        self.state = StoreState::Ready;
        self.messages = vec![self.welcome()];
        self.purge();
        info!(key = %self.settings.storage_key, "Cleared chat session");
    }

    /// Number of messages currently held
    pub fn count(&self) -> usize {
        self.messages.len()
    }

    /// Current sequence in display order
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Most recent message
    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    pub fn is_ready(&self) -> bool {
        self.state == StoreState::Ready
    }

    pub fn settings(&self) -> &StoreSettings {
        &self.settings
    }

    pub fn storage_key(&self) -> &str {
        &self.settings.storage_key
    }

    fn welcome(&self) -> ChatMessage {
        ChatMessage::welcome(
            self.settings.welcome_id.as_str(),
            self.settings.welcome_message.as_str(),
            now_millis(),
        )
    }

    /// Drop the oldest messages beyond the cap; a cap of 0 keeps one
    fn enforce_cap(&mut self) -> usize {
        let cap = self.settings.max_messages.max(1);
        let excess = self.messages.len().saturating_sub(cap);
        if excess > 0 {
            self.messages.drain(..excess);
            debug!(evicted = excess, "Evicted oldest chat messages");
        }
        excess
    }

    fn persist(&self) {
        let key = &self.settings.storage_key;
        let encoded = match codec::encode(&self.messages) {
            Ok(encoded) => encoded,
            Err(e) => {
                warn!(key = %key, error = %e, "Failed to encode chat session");
                return;
            }
        };
        if let Err(e) = self.storage.set_item(key, &encoded) {
            warn!(key = %key, error = %e, "Failed to persist chat session");
        }
    }

    fn purge(&self) {
        purge_slot(self.storage.as_ref(), &self.settings.storage_key);
    }
}

impl std::fmt::Debug for MessageStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageStore")
            .field("settings", &self.settings)
            .field("state", &self.state)
            .field("count", &self.messages.len())
            .finish()
    }
}

/// Remove a session slot, logging instead of failing
pub(crate) fn purge_slot(storage: &dyn SessionStorage, key: &str) {
    if let Err(e) = storage.remove_item(key) {
        warn!(key = %key, error = %e, "Failed to remove chat session");
    }
}
