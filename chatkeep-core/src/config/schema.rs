//! Configuration schema definitions

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::session::message::{DEFAULT_WELCOME_MESSAGE, WELCOME_MESSAGE_ID};
use crate::session::store::{DEFAULT_MAX_MESSAGES, DEFAULT_STORAGE_KEY};

/// Root configuration for chatkeep
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Chat session configuration
    #[serde(default)]
    pub session: SessionConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (text, json)
    #[serde(default = "default_log_format")]
    pub format: String,
    /// Directory for log files
    #[serde(default = "default_log_dir")]
    pub dir: String,
    /// Module-specific overrides
    #[serde(default)]
    pub overrides: HashMap<String, String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_log_dir() -> String {
    "logs".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            dir: default_log_dir(),
            overrides: HashMap::new(),
        }
    }
}

/// Where the session slot lives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Gone when the process exits
    #[default]
    Memory,
    /// One JSON file per slot under `session.dir`
    File,
}

/// Chat session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Storage slot key
    #[serde(default = "default_storage_key")]
    pub storage_key: String,
    /// Retention cap
    #[serde(default = "default_max_messages")]
    pub max_messages: usize,
    /// Welcome message id
    #[serde(default = "default_welcome_id")]
    pub welcome_id: String,
    /// Welcome message text
    #[serde(default = "default_welcome_message")]
    pub welcome_message: String,
    /// Storage backend
    #[serde(default)]
    pub backend: StorageBackend,
    /// Directory for the file backend
    #[serde(default = "default_session_dir")]
    pub dir: String,
}

fn default_storage_key() -> String {
    DEFAULT_STORAGE_KEY.to_string()
}

fn default_max_messages() -> usize {
    DEFAULT_MAX_MESSAGES
}

fn default_welcome_id() -> String {
    WELCOME_MESSAGE_ID.to_string()
}

fn default_welcome_message() -> String {
    DEFAULT_WELCOME_MESSAGE.to_string()
}

fn default_session_dir() -> String {
    "sessions".to_string()
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            storage_key: default_storage_key(),
            max_messages: default_max_messages(),
            welcome_id: default_welcome_id(),
            welcome_message: default_welcome_message(),
            backend: StorageBackend::default(),
            dir: default_session_dir(),
        }
    }
}
