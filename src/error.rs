//! Error types for codeproxy
//!
//! This module defines the error taxonomy used by the request pipeline,
//! using `thiserror` for ergonomic error handling. Library functions return
//! [`Result`], an `anyhow` alias; the HTTP layer downcasts back to
//! [`CodeproxyError`] to pick a status code.

use thiserror::Error;

/// Main error type for codeproxy operations
#[derive(Error, Debug)]
pub enum CodeproxyError {
    /// Empty or missing prompt
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration-related errors, including a missing provider credential
    #[error("Configuration error: {0}")]
    Config(String),

    /// Provider rejected the credential (HTTP 401)
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// Provider answered with a non-success status after all retries
    #[error("Provider error: status={status}, {body}")]
    Provider {
        /// Last HTTP status returned by the provider
        status: u16,
        /// Last response body returned by the provider
        body: String,
    },

    /// Provider call timed out on the final attempt
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// Provider could not be reached on the final attempt
    #[error("Provider unavailable: {0}")]
    Unavailable(String),

    /// Retry loop finished without reaching a terminal outcome
    #[error("Failed to get response after {attempts} attempts")]
    ExhaustedRetries {
        /// Number of attempts that were made
        attempts: u32,
    },

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP client errors outside the provider retry loop
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl CodeproxyError {
    /// Short, stable label used for metrics and log fields
    ///
    /// # Examples
    ///
    /// ```
    /// use codeproxy::error::CodeproxyError;
    ///
    /// let error = CodeproxyError::Timeout("60s".to_string());
    /// assert_eq!(error.kind(), "timeout");
    /// ```
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::Config(_) => "configuration",
            Self::Authentication(_) => "authentication",
            Self::Provider { .. } => "provider",
            Self::Timeout(_) => "timeout",
            Self::Unavailable(_) => "unavailable",
            Self::ExhaustedRetries { .. } => "exhausted_retries",
            Self::Io(_) => "io",
            Self::Serialization(_) => "serialization",
            Self::Yaml(_) => "yaml",
            Self::Http(_) => "http",
        }
    }

    /// HTTP status code this error maps to at the server boundary
    ///
    /// Provider errors mirror the upstream status when it is a valid error
    /// status; everything unexpected maps to 500.
    ///
    /// # Examples
    ///
    /// ```
    /// use codeproxy::error::CodeproxyError;
    ///
    /// let error = CodeproxyError::Provider { status: 502, body: "bad gateway".into() };
    /// assert_eq!(error.status_code(), 502);
    /// assert_eq!(CodeproxyError::Validation("empty".into()).status_code(), 400);
    /// ```
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::Authentication(_) => 401,
            Self::Provider { status, .. } if (400..=599).contains(status) => *status,
            Self::Timeout(_) => 504,
            Self::Unavailable(_) => 503,
            _ => 500,
        }
    }
}

/// Result type alias for codeproxy operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation.
pub type Result<T> = anyhow::Result<T>;
