//! Settings loading from disk.

use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::config::schema::Settings;
use crate::config::validation::validate_settings;
use crate::error::{join_issues, ValidationError};

/// Error type for settings loading.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_issues(.0))]
    Validation(Vec<ValidationError>),
}

/// Load and validate settings from a TOML file.
pub fn load_settings(path: &Path) -> Result<Settings, SettingsError> {
    let content = fs::read_to_string(path)?;
    parse_settings(&content)
}

/// Parse and validate settings from TOML text.
pub fn parse_settings(content: &str) -> Result<Settings, SettingsError> {
    let settings: Settings = toml::from_str(content)?;
    validate_settings(&settings).map_err(SettingsError::Validation)?;
    Ok(settings)
}

/// Settings from `path` when given, defaults otherwise.
pub fn load_or_default(path: Option<&Path>) -> Result<Settings, SettingsError> {
    match path {
        Some(path) => load_settings(path),
        None => Ok(Settings::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_settings() {
        let settings = parse_settings("[store]\npath = \"/var/strongbox/strongbox.json\"\n").unwrap();
        assert_eq!(settings.store.path, "/var/strongbox/strongbox.json");
        assert_eq!(settings.observability.log_level, "info");
        assert!(settings.watch.enabled);
    }

    #[test]
    fn test_full_settings() {
        let settings = parse_settings(
            r#"
[store]
path = "conf/strongbox.json"

[vault]
directory = "/srv/vault"

[observability]
log_level = "debug"
metrics_address = "127.0.0.1:9090"

[watch]
enabled = false
poll_interval_secs = 5
"#,
        )
        .unwrap();
        assert_eq!(settings.vault.directory, "/srv/vault");
        assert_eq!(settings.observability.metrics_address.as_deref(), Some("127.0.0.1:9090"));
        assert!(!settings.watch.enabled);
    }

    #[test]
    fn test_parse_and_validation_errors() {
        assert!(matches!(parse_settings("[store"), Err(SettingsError::Parse(_))));
        assert!(matches!(
            parse_settings("[observability]\nlog_level = \"chatty\"\n"),
            Err(SettingsError::Validation(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_settings(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, SettingsError::Io(_)));
        assert!(load_or_default(None).is_ok());
    }
}
