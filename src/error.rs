//! Error types for configuration operations.

use thiserror::Error;

/// A single semantic problem found in an argument or document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Failures while reading or writing the persisted document.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("codec error: {0}")]
    Codec(#[from] serde_json::Error),
}

/// Errors surfaced by [`crate::manager::ConfigurationManager`].
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// Malformed or out-of-range input. Carries every problem found.
    #[error("validation failed: {}", join_issues(.0))]
    Validation(Vec<ValidationError>),

    /// Referenced storage, repository, rule set or rule is absent.
    #[error("not found: {0}")]
    NotFound(String),

    /// Unsafe overwrite or deletion without force.
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("persistence failed: {0}")]
    Persistence(#[from] StoreError),
}

impl ConfigurationError {
    /// Shorthand for a single-issue validation failure.
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        ConfigurationError::Validation(vec![ValidationError::new(field, message)])
    }

    /// Short label used for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            ConfigurationError::Validation(_) => "validation",
            ConfigurationError::NotFound(_) => "not_found",
            ConfigurationError::Conflict(_) => "conflict",
            ConfigurationError::Persistence(_) => "persistence",
        }
    }
}

pub(crate) fn join_issues(issues: &[ValidationError]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

pub type Result<T, E = ConfigurationError> = std::result::Result<T, E>;
