//! Standardized error codes for machine-parseable output.
//!
//! Error codes follow a numeric taxonomy:
//! - 1xx: Config errors
//! - 2xx: Embedding errors
//! - 3xx: Location extraction errors
//! - 4xx: Search errors
//! - 5xx: Network errors
//! - 9xx: Internal errors

use serde::{Deserialize, Serialize};

/// Standardized error codes for robot mode output.
///
/// Each variant maps to a numeric code (e.g., `ConfigMissingRequired` -> E103).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // ========================================
    // Config errors (1xx)
    // ========================================
    /// E101: Config file not found
    ConfigNotFound,
    /// E102: Config file has invalid syntax or values
    ConfigInvalid,
    /// E103: Required config value (usually a credential) is missing
    ConfigMissingRequired,

    // ========================================
    // Embedding errors (2xx)
    // ========================================
    /// E201: Text could not be embedded (empty input, service not initialized)
    EmbeddingInvalidInput,
    /// E202: Embedding provider failed or returned a malformed response
    EmbeddingProviderFailed,

    // ========================================
    // Location errors (3xx)
    // ========================================
    /// E301: Language model could not extract a location
    LocationExtractionFailed,

    // ========================================
    // Search errors (4xx)
    // ========================================
    /// E401: Search parameters failed validation
    SearchParamsInvalid,
    /// E402: Search backend rejected or failed the query
    SearchBackendFailed,

    // ========================================
    // Network errors (5xx)
    // ========================================
    /// E501: Cannot reach remote server
    NetworkUnreachable,
    /// E502: Network request timed out
    NetworkTimeout,
    /// E503: Authentication with remote failed
    NetworkAuthFailed,

    // ========================================
    // Internal errors (9xx)
    // ========================================
    /// E901: Serialization/deserialization failed
    SerializationError,
    /// E902: IO operation failed
    IoError,
}

impl ErrorCode {
    /// Get the numeric error code (e.g., `ConfigInvalid` -> 102).
    #[must_use]
    pub const fn numeric(&self) -> u16 {
        match self {
            Self::ConfigNotFound => 101,
            Self::ConfigInvalid => 102,
            Self::ConfigMissingRequired => 103,

            Self::EmbeddingInvalidInput => 201,
            Self::EmbeddingProviderFailed => 202,

            Self::LocationExtractionFailed => 301,

            Self::SearchParamsInvalid => 401,
            Self::SearchBackendFailed => 402,

            Self::NetworkUnreachable => 501,
            Self::NetworkTimeout => 502,
            Self::NetworkAuthFailed => 503,

            Self::SerializationError => 901,
            Self::IoError => 902,
        }
    }

    /// Get the error code as a formatted string (e.g., "E101").
    #[must_use]
    pub fn code_string(&self) -> String {
        format!("E{}", self.numeric())
    }

    /// Get the default suggestion for this error code.
    #[must_use]
    pub const fn suggestion(&self) -> &'static str {
        match self {
            Self::ConfigNotFound => "Pass --config <path> or create ~/.config/homeseek/config.toml",
            Self::ConfigInvalid => "Check TOML syntax and value ranges in the config file and HOMESEEK_* variables",
            Self::ConfigMissingRequired => "Set the missing credential, e.g. HOMESEEK_EMBEDDING_API_KEY or [embedding].api_key",

            Self::EmbeddingInvalidInput => "Provide non-empty query text; initialize the embedding service before use",
            Self::EmbeddingProviderFailed => "Check [embedding].base_url, model and dims against the provider",

            Self::LocationExtractionFailed => "Check [location] model settings; search continues without location filters",

            Self::SearchParamsInvalid => "Use --size > 0, --rank-constant > 0 and --rank-window-size >= --size",
            Self::SearchBackendFailed => "Check [backend].url and [backend].index, and that the index has an embedding field",

            Self::NetworkUnreachable => "Check your network connection and ensure the remote server is accessible",
            Self::NetworkTimeout => "The remote server may be slow; raise timeout_secs for the affected section",
            Self::NetworkAuthFailed => "Verify the API key configured for the affected section",

            Self::SerializationError => "The remote response was not valid JSON for the expected shape",
            Self::IoError => "File operation failed. Check path exists and permissions are correct",
        }
    }

    /// Check if this error is potentially recoverable by the user.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        match self {
            Self::ConfigNotFound
            | Self::ConfigInvalid
            | Self::ConfigMissingRequired
            | Self::EmbeddingInvalidInput
            | Self::LocationExtractionFailed
            | Self::SearchParamsInvalid
            | Self::NetworkUnreachable
            | Self::NetworkTimeout
            | Self::NetworkAuthFailed
            | Self::IoError => true,

            Self::EmbeddingProviderFailed
            | Self::SearchBackendFailed
            | Self::SerializationError => false,
        }
    }

    /// Get the error category name.
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match self.numeric() / 100 {
            1 => "config",
            2 => "embedding",
            3 => "location",
            4 => "search",
            5 => "network",
            9 => "internal",
            _ => "unknown",
        }
    }

    /// Iterate over all error codes.
    pub fn all() -> impl Iterator<Item = Self> {
        [
            Self::ConfigNotFound,
            Self::ConfigInvalid,
            Self::ConfigMissingRequired,
            Self::EmbeddingInvalidInput,
            Self::EmbeddingProviderFailed,
            Self::LocationExtractionFailed,
            Self::SearchParamsInvalid,
            Self::SearchBackendFailed,
            Self::NetworkUnreachable,
            Self::NetworkTimeout,
            Self::NetworkAuthFailed,
            Self::SerializationError,
            Self::IoError,
        ]
        .into_iter()
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code_string())
    }
}
