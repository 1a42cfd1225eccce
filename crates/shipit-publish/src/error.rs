//! Publish error types

use thiserror::Error;

/// Publish-related errors
#[derive(Debug, Error)]
pub enum PublishError {
    /// No usable credentials, or the service rejected them
    #[error("Authentication failed for {service}: {reason}")]
    AuthenticationFailed { service: String, reason: String },

    /// API error returned by the remote service
    #[error("API error from {service}: {status} - {message}")]
    ApiError {
        service: String,
        status: u16,
        message: String,
    },

    /// Group is not one the forge is configured for
    #[error("Unknown group '{group}' on {service}")]
    UnknownGroup { service: String, group: String },

    /// No file matched the configured artifact patterns
    #[error("No release artifacts found: {0}")]
    MissingArtifact(String),

    /// Invalid service configuration
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Invalid endpoint URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for publish operations
pub type Result<T> = std::result::Result<T, PublishError>;

impl PublishError {
    /// Authentication failure for a service
    pub fn auth(service: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::AuthenticationFailed {
            service: service.into(),
            reason: reason.into(),
        }
    }
}
