//! Error types for the cfexport CLI

use std::time::Duration;
use thiserror::Error;

/// Result type alias for cfexport operations
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for the application
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Mutation(#[from] MutationError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Export run did not finish within {0:?}")]
    Deadline(Duration),
}

/// API-related errors
///
/// Any of these aborts the export run: a manifest built from an incomplete
/// view of the platform is worse than no manifest. The one exception is
/// `NotFound` from the identity provider, which the manifest builder handles
/// per user.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Authentication failed. Check EXPORTER_ADMIN_USER and EXPORTER_ADMIN_PASSWORD.")]
    Unauthorized,

    #[error("Access denied. The configured account cannot read this resource.")]
    Forbidden,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Rate limit exceeded. Retry after {0:?}")]
    RateLimit(Duration),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid API response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Network("Request timed out".to_string())
        } else if err.is_connect() {
            ApiError::Network("Failed to connect to API".to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("API endpoint not configured. Set EXPORTER_API_URL or pass --api-url.")]
    MissingApiUrl,

    #[error("Administrator user not configured. Set EXPORTER_ADMIN_USER or pass --admin-user.")]
    MissingAdminUser,

    #[error("Administrator password not configured. Set EXPORTER_ADMIN_PASSWORD or pass --admin-password.")]
    MissingAdminPassword,

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

/// Mutation-engine errors
///
/// A required-field violation signals a mismatch between the mapping table
/// and the manifest, not a legitimately optional upstream field.
#[derive(Debug, Error)]
pub enum MutationError {
    #[error("Required field '{field}' is missing from the source manifest")]
    RequiredField { field: String },
}
