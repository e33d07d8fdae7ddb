//! Error types for the CareLink MCP Server
//!
//! A single error enumeration carries every failure kind the server can
//! produce. Each domain kind has a stable code and an HTTP-style status for
//! reference; messages are written to be safe to surface to the caller.

use thiserror::Error;

/// Main error type for the CareLink MCP Server
#[derive(Error, Debug)]
pub enum EmrError {
    /// Missing or invalid configuration
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// EMR API authentication failed
    #[error("Authentication failed: {message}")]
    Auth { message: String },

    /// Resource absent. The message names only the resource kind, never the
    /// identifier that was looked up.
    #[error("{resource} not found")]
    NotFound { resource: String },

    /// Bad or missing input, with the offending field attached
    #[error("{message}")]
    Validation { message: String, field: String },

    /// Error from the upstream EMR API
    #[error("EMR API error: {message}")]
    Api {
        message: String,
        api_status: Option<u16>,
    },

    /// Too many requests against the upstream API
    #[error("Rate limit exceeded")]
    RateLimit { retry_after_secs: Option<u64> },

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP client errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl EmrError {
    /// Convenience constructor for validation failures
    pub fn validation(message: impl Into<String>, field: impl Into<String>) -> Self {
        EmrError::Validation {
            message: message.into(),
            field: field.into(),
        }
    }

    /// Convenience constructor for not-found failures
    pub fn not_found(resource: impl Into<String>) -> Self {
        EmrError::NotFound {
            resource: resource.into(),
        }
    }

    /// Stable code for this error kind
    pub fn code(&self) -> &'static str {
        match self {
            EmrError::Config { .. } => "CONFIG_ERROR",
            EmrError::Auth { .. } => "AUTH_ERROR",
            EmrError::NotFound { .. } => "NOT_FOUND",
            EmrError::Validation { .. } => "VALIDATION_ERROR",
            EmrError::Api { .. } => "API_ERROR",
            EmrError::RateLimit { .. } => "RATE_LIMIT",
            EmrError::Io(_) => "IO_ERROR",
            EmrError::Json(_) => "JSON_ERROR",
            EmrError::Http(_) => "HTTP_ERROR",
        }
    }

    /// HTTP-style status code for reference
    pub fn status_code(&self) -> u16 {
        match self {
            EmrError::Config { .. } => 500,
            EmrError::Auth { .. } => 401,
            EmrError::NotFound { .. } => 404,
            EmrError::Validation { .. } => 400,
            EmrError::Api { .. } => 502,
            EmrError::RateLimit { .. } => 429,
            EmrError::Io(_) | EmrError::Json(_) | EmrError::Http(_) => 500,
        }
    }
}

/// Result type alias for CareLink MCP operations
pub type Result<T> = std::result::Result<T, EmrError>;

/// Format an error as a single text line for a tool response.
///
/// Domain errors carry their stable code; everything else collapses to a
/// bare message so no internal detail crosses the protocol boundary.
pub fn format_error(error: &EmrError) -> String {
    match error {
        EmrError::Io(e) => format!("Error: {}", e),
        EmrError::Json(e) => format!("Error: {}", e),
        EmrError::Http(e) => format!("Error: {}", e),
        other => format!("Error [{}]: {}", other.code(), other),
    }
}
