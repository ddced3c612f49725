//! Configuration validation rules.

use super::schema::{Config, StorageBackend};

/// Validate configuration and return aggregated validation errors.
pub fn validate_config(config: &Config) -> crate::Result<()> {
    let mut errors = Vec::new();
    let session = &config.session;

    if session.storage_key.trim().is_empty() {
        errors.push("session.storage_key must not be empty".to_string());
    }
    if session.max_messages == 0 {
        errors.push("session.max_messages must be > 0".to_string());
    }
    if session.welcome_id.trim().is_empty() {
        errors.push("session.welcome_id must not be empty".to_string());
    }
    if session.welcome_message.trim().is_empty() {
        errors.push("session.welcome_message must not be empty".to_string());
    }
    if session.backend == StorageBackend::File && session.dir.trim().is_empty() {
        errors.push("session.dir is required when backend is file".to_string());
    }

    let format = config.logging.format.to_ascii_lowercase();
    if format != "text" && format != "json" {
        errors.push(format!(
            "logging.format must be text or json, got {}",
            config.logging.format
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(crate::Error::Validation(errors.join("; ")))
    }
}
