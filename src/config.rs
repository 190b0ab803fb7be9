//! Configuration management for codeproxy
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.
//! Precedence, lowest to highest: built-in defaults, YAML file, environment
//! (including a `.env` file loaded by the binary), CLI flags.

use crate::classifier::Category;
use crate::error::{CodeproxyError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Main configuration structure for codeproxy
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Remote inference provider settings
    #[serde(default)]
    pub provider: ProviderConfig,
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Session transcript settings
    #[serde(default)]
    pub session: SessionConfig,
    /// Prompt classification settings
    #[serde(default)]
    pub classifier: ClassifierConfig,
}

/// Hugging Face Inference API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// API credential; requests fail with a configuration error when absent
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,

    /// Model identifier, appended to `{api_base}/models/`
    #[serde(default = "default_model")]
    pub model: String,

    /// Base URL of the inference API (useful for tests and local mocks)
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// `max_length` generation parameter
    #[serde(default = "default_max_length")]
    pub max_length: u32,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Per-attempt HTTP timeout (seconds)
    #[serde(default = "default_provider_timeout")]
    pub timeout_seconds: u64,

    /// Retry behavior for provider calls
    #[serde(default)]
    pub retry: RetryConfig,
}

fn default_model() -> String {
    "mistralai/Mistral-7B-Instruct-v0.2".to_string()
}

fn default_api_base() -> String {
    "https://api-inference.huggingface.co".to_string()
}

fn default_max_length() -> u32 {
    2000
}

fn default_temperature() -> f32 {
    0.5
}

fn default_provider_timeout() -> u64 {
    60
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            api_base: default_api_base(),
            max_length: default_max_length(),
            temperature: default_temperature(),
            timeout_seconds: default_provider_timeout(),
            retry: RetryConfig::default(),
        }
    }
}

impl ProviderConfig {
    /// Credential masked for logging: first five characters, then asterisks
    ///
    /// # Examples
    ///
    /// ```
    /// use codeproxy::config::ProviderConfig;
    ///
    /// let config = ProviderConfig {
    ///     api_key: Some("hf_abcdefghij".to_string()),
    ///     ..Default::default()
    /// };
    /// assert_eq!(config.masked_api_key().as_deref(), Some("hf_ab******"));
    /// ```
    pub fn masked_api_key(&self) -> Option<String> {
        self.api_key
            .as_deref()
            .map(|key| format!("{}******", key.chars().take(5).collect::<String>()))
    }

    /// Per-attempt timeout as a `Duration`
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

/// Retry configuration for provider calls
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total attempts, including the first
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Delay before the second attempt; doubles on every further attempt
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
}

fn default_max_attempts() -> u32 {
    3
}

fn default_base_delay_ms() -> u64 {
    1000
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address
    #[serde(default = "default_host")]
    pub host: String,

    /// Bind port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Publish the explanation/code split alongside the raw text for the
    /// `both` response shape
    #[serde(default)]
    pub split_combined: bool,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            split_combined: false,
        }
    }
}

impl ServerConfig {
    /// `host:port` string suitable for binding
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Session transcript configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Maximum transcript lines kept per session
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,

    /// Transcript lines carried into follow-up task prompts
    #[serde(default = "default_context_lines")]
    pub context_lines: usize,
}

fn default_max_entries() -> usize {
    crate::session::DEFAULT_MAX_ENTRIES
}

fn default_context_lines() -> usize {
    crate::prompts::DEFAULT_CONTEXT_LINES
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_entries: default_max_entries(),
            context_lines: default_context_lines(),
        }
    }
}

/// Prompt classification configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ClassifierConfig {
    /// Category for prompts that match no conversational rule
    #[serde(default)]
    pub fallback: Category,
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Returns
    ///
    /// Returns the loaded and merged configuration
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| CodeproxyError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| CodeproxyError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        // Provider overrides
        if let Ok(api_key) = std::env::var("HF_API_KEY") {
            let api_key = api_key.trim().to_string();
            self.provider.api_key = (!api_key.is_empty()).then_some(api_key);
        }

        if let Ok(model) = std::env::var("HF_MODEL") {
            self.provider.model = model;
        }

        if let Ok(api_base) = std::env::var("CODEPROXY_API_BASE") {
            self.provider.api_base = api_base;
        }

        if let Ok(max_length) = std::env::var("MAX_LENGTH") {
            if let Ok(value) = max_length.parse() {
                self.provider.max_length = value;
            } else {
                tracing::warn!("Invalid MAX_LENGTH: {}", max_length);
            }
        }

        if let Ok(temperature) = std::env::var("TEMPERATURE") {
            if let Ok(value) = temperature.parse() {
                self.provider.temperature = value;
            } else {
                tracing::warn!("Invalid TEMPERATURE: {}", temperature);
            }
        }

        if let Ok(timeout) = std::env::var("CODEPROXY_TIMEOUT_SECONDS") {
            if let Ok(value) = timeout.parse() {
                self.provider.timeout_seconds = value;
            } else {
                tracing::warn!("Invalid CODEPROXY_TIMEOUT_SECONDS: {}", timeout);
            }
        }

        if let Ok(attempts) = std::env::var("CODEPROXY_MAX_ATTEMPTS") {
            if let Ok(value) = attempts.parse() {
                self.provider.retry.max_attempts = value;
            } else {
                tracing::warn!("Invalid CODEPROXY_MAX_ATTEMPTS: {}", attempts);
            }
        }

        // Server overrides
        if let Ok(host) = std::env::var("CODEPROXY_HOST") {
            self.server.host = host;
        }

        if let Ok(port) = std::env::var("CODEPROXY_PORT") {
            if let Ok(value) = port.parse() {
                self.server.port = value;
            } else {
                tracing::warn!("Invalid CODEPROXY_PORT: {}", port);
            }
        }

        if let Ok(split) = std::env::var("CODEPROXY_SPLIT_COMBINED") {
            match split.to_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => self.server.split_combined = true,
                "0" | "false" | "no" | "off" => self.server.split_combined = false,
                _ => tracing::warn!("Invalid CODEPROXY_SPLIT_COMBINED: {}", split),
            }
        }

        if let Ok(fallback) = std::env::var("CODEPROXY_CLASSIFIER_FALLBACK") {
            match fallback.to_lowercase().as_str() {
                "conversation" => self.classifier.fallback = Category::Conversation,
                "task" => self.classifier.fallback = Category::Task,
                _ => tracing::warn!("Invalid CODEPROXY_CLASSIFIER_FALLBACK: {}", fallback),
            }
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if cli.verbose {
            tracing::debug!("Verbose mode enabled");
        }

        if let crate::cli::Commands::Serve { host, port } = &cli.command {
            if let Some(host) = host {
                self.server.host = host.clone();
            }
            if let Some(port) = port {
                self.server.port = *port;
            }
        }
    }

    /// Validate the configuration
    ///
    /// A missing credential is not a validation failure: the server starts
    /// and every generate request fails with a configuration error instead.
    ///
    /// # Errors
    ///
    /// Returns error if any validation check fails
    pub fn validate(&self) -> Result<()> {
        if self.provider.model.trim().is_empty() {
            return Err(CodeproxyError::Config("provider.model cannot be empty".to_string()).into());
        }

        if self.provider.api_base.trim().is_empty() {
            return Err(
                CodeproxyError::Config("provider.api_base cannot be empty".to_string()).into(),
            );
        }

        if self.provider.max_length == 0 {
            return Err(CodeproxyError::Config(
                "provider.max_length must be greater than 0".to_string(),
            )
            .into());
        }

        if !(0.0..=2.0).contains(&self.provider.temperature) {
            return Err(CodeproxyError::Config(
                "provider.temperature must be between 0.0 and 2.0".to_string(),
            )
            .into());
        }

        if self.provider.timeout_seconds == 0 {
            return Err(CodeproxyError::Config(
                "provider.timeout_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        if !(1..=10).contains(&self.provider.retry.max_attempts) {
            return Err(CodeproxyError::Config(
                "provider.retry.max_attempts must be between 1 and 10".to_string(),
            )
            .into());
        }

        if self.server.port == 0 {
            return Err(
                CodeproxyError::Config("server.port must be greater than 0".to_string()).into(),
            );
        }

        if self.session.max_entries < 2 {
            return Err(CodeproxyError::Config(
                "session.max_entries must hold at least one exchange (2 lines)".to_string(),
            )
            .into());
        }

        if self.session.context_lines > self.session.max_entries {
            return Err(CodeproxyError::Config(
                "session.context_lines cannot exceed session.max_entries".to_string(),
            )
            .into());
        }

        if self.provider.api_key.is_none() {
            tracing::warn!("HF_API_KEY is not set; generate requests will fail until it is");
        }

        Ok(())
    }
}
