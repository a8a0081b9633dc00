//! Settings validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges and formats (log level, addresses, intervals)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Runs before settings are accepted into the system

use std::net::SocketAddr;

use crate::config::schema::Settings;
use crate::error::ValidationError;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

pub fn validate_settings(settings: &Settings) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if settings.store.path.trim().is_empty() {
        errors.push(ValidationError::new("store.path", "must not be empty"));
    }
    if settings.vault.directory.trim().is_empty() {
        errors.push(ValidationError::new("vault.directory", "must not be empty"));
    }

    let level = settings.observability.log_level.to_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::new(
            "observability.log_level",
            format!("'{}' is not one of {}", settings.observability.log_level, LOG_LEVELS.join(", ")),
        ));
    }
    if let Some(addr) = &settings.observability.metrics_address {
        if addr.parse::<SocketAddr>().is_err() {
            errors.push(ValidationError::new(
                "observability.metrics_address",
                format!("'{}' is not a socket address", addr),
            ));
        }
    }

    if settings.watch.enabled && settings.watch.poll_interval_secs == 0 {
        errors.push(ValidationError::new("watch.poll_interval_secs", "must be greater than 0"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(validate_settings(&Settings::default()).is_ok());
    }

    #[test]
    fn test_reports_all_errors() {
        let mut settings = Settings::default();
        settings.store.path = String::new();
        settings.observability.log_level = "loud".into();
        settings.observability.metrics_address = Some("nowhere".into());
        settings.watch.poll_interval_secs = 0;

        let errors = validate_settings(&settings).unwrap_err();
        assert_eq!(errors.len(), 4);
    }
}
