//! # Migration Error Types
//!
//! Unified error handling for the migration engine, its HTTP adapters and the CLI.
//!
//! Most failures in a migration run are local to a single resource and end up as
//! counters in the [`MigrationReport`](crate::report::MigrationReport) rather than
//! as propagated errors. The variants here cover the cases where a caller needs
//! to know *why* an individual operation could not complete.

use thiserror::Error;

/// Result alias used throughout the crate
pub type MigrateResult<T> = Result<T, MigrationError>;

/// Error types for migration operations
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("JSON serialization/deserialization failed: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("YAML serialization failed: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("API error: {status} - {body}")]
    ApiError { status: u16, body: String },

    #[error("Remote resource '{identifier}' is missing git reference field '{field}'")]
    MissingGitReference { identifier: String, field: String },

    #[error("Resource '{identifier}' has unusable source data: {reason}")]
    MalformedResource { identifier: String, reason: String },

    #[error("Resource '{identifier}' not found in source ({scope})")]
    ResourceNotFound { identifier: String, scope: String },

    #[error("Unknown resource type: {0}")]
    UnknownResourceType(String),

    #[error("Invalid scope: {0}")]
    InvalidScope(String),

    #[error("Destination credentials are required unless running in dry-run mode")]
    MissingDestination,

    #[error("Invalid phase transition for '{phase}': {from} -> {to}")]
    InvalidPhaseTransition {
        phase: String,
        from: String,
        to: String,
    },

    #[error("Phase order violation: '{phase}' runs before its predecessor '{predecessor}'")]
    PhaseOrderViolation { phase: String, predecessor: String },
}

impl MigrationError {
    /// Create an API error from a non-success HTTP response
    pub fn api_error(status: u16, body: impl Into<String>) -> Self {
        Self::ApiError {
            status,
            body: body.into(),
        }
    }

    /// Create a configuration error
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::ConfigError(message.into())
    }

    /// Create a missing git reference error for a Remote-classified resource
    pub fn missing_git_reference(identifier: impl Into<String>, field: impl Into<String>) -> Self {
        Self::MissingGitReference {
            identifier: identifier.into(),
            field: field.into(),
        }
    }

    /// Create an error for source data that cannot be turned into a write payload
    pub fn malformed_resource(identifier: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedResource {
            identifier: identifier.into(),
            reason: reason.into(),
        }
    }

    /// HTTP status and response body, when this error carries an API response
    #[must_use]
    pub fn api_response(&self) -> Option<(u16, &str)> {
        match self {
            MigrationError::ApiError { status, body } => Some((*status, body.as_str())),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_exposes_response() {
        let err = MigrationError::api_error(409, "already exists");
        assert_eq!(err.api_response(), Some((409, "already exists")));
        assert_eq!(err.to_string(), "API error: 409 - already exists");
    }

    #[test]
    fn test_non_api_error_has_no_response() {
        let err = MigrationError::config_error("missing base url");
        assert!(err.api_response().is_none());
        assert_eq!(err.to_string(), "Configuration error: missing base url");
    }

    #[test]
    fn test_missing_git_reference_message() {
        let err = MigrationError::missing_git_reference("deploy", "branch");
        assert_eq!(
            err.to_string(),
            "Remote resource 'deploy' is missing git reference field 'branch'"
        );
    }
}
