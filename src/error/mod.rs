//! Error handling for homeseek.
//!
//! This module provides:
//! - [`HsError`]: The main error enum for all homeseek operations
//! - [`ErrorCode`]: Standardized error codes for machine parsing
//! - [`StructuredError`]: Rich error type with suggestion and context
//!
//! Only embedding and backend failures ever reach a search caller.
//! [`HsError::LocationExtraction`] is produced by language model providers
//! and absorbed by the location module.

mod codes;

use std::io;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub use codes::ErrorCode;

/// Main error type for homeseek operations.
#[derive(Error, Debug)]
pub enum HsError {
    #[error("Config file not found: {}", .0.display())]
    ConfigNotFound(PathBuf),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Missing required config: {0}")]
    MissingConfig(String),

    #[error("Embedding generation error: {0}")]
    EmbeddingGeneration(String),

    #[error("Embedding provider error: {0}")]
    EmbeddingProvider(String),

    #[error("Location extraction error: {0}")]
    LocationExtraction(String),

    #[error("Invalid search parameters: {0}")]
    InvalidParams(String),

    #[error("Search backend error: {0}")]
    Backend(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl HsError {
    /// Get the error code for this error.
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::ConfigNotFound(_) => ErrorCode::ConfigNotFound,
            Self::Config(_) => ErrorCode::ConfigInvalid,
            Self::MissingConfig(_) => ErrorCode::ConfigMissingRequired,
            Self::EmbeddingGeneration(_) => ErrorCode::EmbeddingInvalidInput,
            Self::EmbeddingProvider(_) => ErrorCode::EmbeddingProviderFailed,
            Self::LocationExtraction(_) => ErrorCode::LocationExtractionFailed,
            Self::InvalidParams(_) => ErrorCode::SearchParamsInvalid,
            Self::Backend(_) => ErrorCode::SearchBackendFailed,
            Self::Http(err) => {
                if err.is_timeout() {
                    ErrorCode::NetworkTimeout
                } else if err
                    .status()
                    .is_some_and(|s| s.as_u16() == 401 || s.as_u16() == 403)
                {
                    ErrorCode::NetworkAuthFailed
                } else {
                    ErrorCode::NetworkUnreachable
                }
            }
            Self::Json(_) => ErrorCode::SerializationError,
            Self::Io(_) => ErrorCode::IoError,
        }
    }

    /// Whether this error belongs to the configuration family.
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::ConfigNotFound(_) | Self::Config(_) | Self::MissingConfig(_)
        )
    }

    /// Get context information for this error as JSON.
    #[must_use]
    pub fn context(&self) -> Option<Value> {
        match self {
            Self::ConfigNotFound(path) => Some(serde_json::json!({ "path": path.display().to_string() })),
            Self::MissingConfig(key) => Some(serde_json::json!({ "config_key": key })),
            Self::InvalidParams(reason) => Some(serde_json::json!({ "reason": reason })),
            Self::Http(err) => err
                .url()
                .map(|url| serde_json::json!({ "host": url.host_str(), "path": url.path() })),
            _ => None,
        }
    }

    /// Convert this error to a structured error.
    #[must_use]
    pub fn to_structured(&self) -> StructuredError {
        StructuredError::from_hs_error(self)
    }
}

/// A structured error with machine-readable code, suggestion, and context.
///
/// Printed by the binary in `--robot` mode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredError {
    /// The error code (e.g., "CONFIG_MISSING_REQUIRED")
    pub code: ErrorCode,

    /// The numeric error code (e.g., 103)
    pub numeric_code: u16,

    /// Human-readable error message
    pub message: String,

    /// Actionable suggestion for recovery
    pub suggestion: String,

    /// Additional context for debugging
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,

    /// Whether this error is potentially recoverable by the user
    pub recoverable: bool,

    /// Error category (e.g., "config", "search", "network")
    pub category: String,
}

impl StructuredError {
    /// Create a new structured error.
    #[must_use]
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            numeric_code: code.numeric(),
            suggestion: code.suggestion().to_string(),
            context: None,
            recoverable: code.is_recoverable(),
            category: code.category().to_string(),
            code,
            message: message.into(),
        }
    }

    /// Create a structured error from an `HsError`.
    #[must_use]
    pub fn from_hs_error(err: &HsError) -> Self {
        let mut structured = Self::new(err.code(), err.to_string());
        structured.context = err.context();
        structured
    }
}

impl std::fmt::Display for StructuredError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl From<HsError> for StructuredError {
    fn from(err: HsError) -> Self {
        Self::from_hs_error(&err)
    }
}

impl From<&HsError> for StructuredError {
    fn from(err: &HsError) -> Self {
        Self::from_hs_error(err)
    }
}

/// Result type alias using `HsError`.
pub type Result<T> = std::result::Result<T, HsError>;
