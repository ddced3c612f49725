//! Chat session history
//!
//! The store keeps the chat history of one session in memory and mirrors
//! it as a JSON array into a session storage slot.

pub mod codec;
pub mod message;
pub mod store;

pub use message::{ChatMessage, NewMessage, Role, DEFAULT_WELCOME_MESSAGE, WELCOME_MESSAGE_ID};
pub use store::{MessageStore, StoreSettings, DEFAULT_MAX_MESSAGES, DEFAULT_STORAGE_KEY};
