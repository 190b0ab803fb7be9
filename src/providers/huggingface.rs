//! Hugging Face Inference API provider
//!
//! Sends instruction prompts to `{api_base}/models/{model}` and interprets
//! the response status through a [`RetryPolicy`]. Success payloads are a
//! JSON list of `{"generated_text": ...}` objects.

use crate::config::ProviderConfig;
use crate::error::{CodeproxyError, Result};
use crate::metrics::record_provider_attempt;
use crate::providers::retry::{RetryPolicy, StatusClass};
use crate::providers::Provider;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

/// Returned when a 200 payload carries no usable text
pub const NO_RESPONSE: &str = "No response generated";

/// Hugging Face Inference API provider
///
/// # Examples
///
/// ```no_run
/// use codeproxy::config::ProviderConfig;
/// use codeproxy::providers::{HuggingFaceProvider, Provider};
///
/// # async fn example() -> codeproxy::error::Result<()> {
/// let config = ProviderConfig {
///     api_key: Some("hf_xxx".to_string()),
///     ..Default::default()
/// };
/// let provider = HuggingFaceProvider::new(config)?;
/// let text = provider.generate("<s>[INST] hello [/INST]").await?;
/// # Ok(())
/// # }
/// ```
pub struct HuggingFaceProvider {
    client: Client,
    config: ProviderConfig,
    policy: RetryPolicy,
}

/// Request body for the inference endpoint
#[derive(Debug, Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a str,
    parameters: InferenceParameters,
}

#[derive(Debug, Serialize)]
struct InferenceParameters {
    max_length: u32,
    temperature: f32,
    return_full_text: bool,
}

impl HuggingFaceProvider {
    /// Create a provider; the retry policy comes from `config.retry`
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails
    ///
    /// # Examples
    ///
    /// ```
    /// use codeproxy::config::ProviderConfig;
    /// use codeproxy::providers::HuggingFaceProvider;
    ///
    /// let provider = HuggingFaceProvider::new(ProviderConfig::default());
    /// assert!(provider.is_ok());
    /// ```
    pub fn new(config: ProviderConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("codeproxy/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| CodeproxyError::Config(format!("Failed to create HTTP client: {}", e)))?;

        tracing::info!(
            "Initialized Hugging Face provider: model={}, api_base={}, key={}",
            config.model,
            config.api_base,
            config.masked_api_key().as_deref().unwrap_or("<missing>")
        );

        let policy = RetryPolicy::from_config(&config.retry);
        Ok(Self {
            client,
            config,
            policy,
        })
    }

    /// Replace the retry policy
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Active retry policy
    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Inference endpoint for the configured model
    ///
    /// # Examples
    ///
    /// ```
    /// use codeproxy::config::ProviderConfig;
    /// use codeproxy::providers::HuggingFaceProvider;
    ///
    /// let config = ProviderConfig {
    ///     api_base: "http://localhost:9000/".to_string(),
    ///     model: "org/model".to_string(),
    ///     ..Default::default()
    /// };
    /// let provider = HuggingFaceProvider::new(config).unwrap();
    /// assert_eq!(provider.endpoint(), "http://localhost:9000/models/org/model");
    /// ```
    pub fn endpoint(&self) -> String {
        format!(
            "{}/models/{}",
            self.config.api_base.trim_end_matches('/'),
            self.config.model
        )
    }

    fn api_key(&self) -> Result<&str> {
        self.config
            .api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| CodeproxyError::Config("HF_API_KEY is missing.".to_string()).into())
    }

    /// Send one request and read its whole body
    ///
    /// A failure while reading the body is a transport failure like a failed
    /// send, so a stalled or reset body is retried instead of parsed.
    async fn send_once(
        &self,
        url: &str,
        api_key: &str,
        request: &InferenceRequest<'_>,
    ) -> std::result::Result<(u16, String), reqwest::Error> {
        let response = self
            .client
            .post(url)
            .bearer_auth(api_key)
            .json(request)
            .send()
            .await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok((status, body))
    }
}

/// Pull the generated text out of a 200 payload
///
/// A leading echo of the instruction is removed. Payloads that are not a
/// non-empty list whose first element has a string `generated_text` yield
/// [`NO_RESPONSE`].
pub fn extract_generated_text(body: &str, instruction: &str) -> String {
    let Ok(payload) = serde_json::from_str::<serde_json::Value>(body) else {
        tracing::warn!("Provider returned a non-JSON success payload");
        return NO_RESPONSE.to_string();
    };

    let Some(text) = payload
        .as_array()
        .and_then(|items| items.first())
        .and_then(|item| item.get("generated_text"))
        .and_then(|text| text.as_str())
    else {
        tracing::warn!("Provider payload has no generated_text");
        return NO_RESPONSE.to_string();
    };

    match text.strip_prefix(instruction) {
        Some(rest) => rest.trim_start().to_string(),
        None => text.to_string(),
    }
}

#[async_trait]
impl Provider for HuggingFaceProvider {
    async fn generate(&self, instruction: &str) -> Result<String> {
        let api_key = self.api_key()?;
        let url = self.endpoint();
        let request = InferenceRequest {
            inputs: instruction,
            parameters: InferenceParameters {
                max_length: self.config.max_length,
                temperature: self.config.temperature,
                return_full_text: false,
            },
        };

        let attempts = self.policy.max_attempts();
        for attempt in 0..attempts {
            let is_final = self.policy.is_final(attempt);
            tracing::info!("Attempt {} - Sending request to {}", attempt + 1, url);

            match self.send_once(&url, api_key, &request).await {
                Ok((status, body)) => {
                    record_provider_attempt(&status.to_string());
                    tracing::debug!("Provider status code: {}", status);

                    match StatusClass::of(status) {
                        StatusClass::Success => {
                            let text = extract_generated_text(&body, instruction);
                            tracing::info!("Received response of length: {}", text.len());
                            return Ok(text);
                        }
                        StatusClass::Unauthorized => {
                            tracing::error!("Authentication error: invalid API key");
                            return Err(CodeproxyError::Authentication(
                                "Invalid API Key. Check your HF_API_KEY.".to_string(),
                            )
                            .into());
                        }
                        StatusClass::Transient => {
                            if status == 503 {
                                tracing::warn!("Model is loading, waiting...");
                            } else {
                                tracing::warn!("Rate limited, retrying...");
                            }
                            if is_final {
                                return Err(CodeproxyError::Provider { status, body }.into());
                            }
                        }
                        StatusClass::Failure => {
                            tracing::error!("Provider error {}: {}", status, body);
                            if is_final {
                                return Err(CodeproxyError::Provider { status, body }.into());
                            }
                        }
                    }
                }
                Err(e) if e.is_timeout() => {
                    record_provider_attempt("timeout");
                    tracing::warn!("Request timed out, retrying...");
                    if is_final {
                        return Err(CodeproxyError::Timeout(format!(
                            "Request timed out after {}s",
                            self.config.timeout_seconds
                        ))
                        .into());
                    }
                }
                Err(e) => {
                    record_provider_attempt("connection");
                    tracing::warn!("Connection error: {}, retrying...", e);
                    if is_final {
                        return Err(CodeproxyError::Unavailable(format!(
                            "Could not connect to Hugging Face API: {}",
                            e
                        ))
                        .into());
                    }
                }
            }

            let delay = self.policy.delay_for(attempt);
            tracing::debug!("Backing off for {:?} before attempt {}", delay, attempt + 2);
            tokio::time::sleep(delay).await;
        }

        Err(CodeproxyError::ExhaustedRetries { attempts }.into())
    }

    fn model(&self) -> String {
        self.config.model.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_generated_text() {
        let body = r#"[{"generated_text": "def f(): pass"}]"#;
        assert_eq!(extract_generated_text(body, "prompt"), "def f(): pass");
    }

    #[test]
    fn test_extract_strips_echoed_instruction() {
        let body = r#"[{"generated_text": "<s>[INST] hi [/INST]  Hello!"}]"#;
        assert_eq!(
            extract_generated_text(body, "<s>[INST] hi [/INST]"),
            "Hello!"
        );
    }

    #[test]
    fn test_extract_keeps_text_that_only_mentions_instruction() {
        let body = r#"[{"generated_text": "Sure: hi"}]"#;
        assert_eq!(extract_generated_text(body, "hi"), "Sure: hi");
    }

    #[test]
    fn test_extract_empty_list() {
        assert_eq!(extract_generated_text("[]", "p"), NO_RESPONSE);
    }

    #[test]
    fn test_extract_malformed_payloads() {
        assert_eq!(extract_generated_text("not json", "p"), NO_RESPONSE);
        assert_eq!(
            extract_generated_text(r#"{"generated_text": "x"}"#, "p"),
            NO_RESPONSE
        );
        assert_eq!(
            extract_generated_text(r#"[{"text": "x"}]"#, "p"),
            NO_RESPONSE
        );
    }

    #[test]
    fn test_extract_empty_generated_text_is_returned() {
        assert_eq!(extract_generated_text(r#"[{"generated_text": ""}]"#, "p"), "");
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let config = ProviderConfig {
            api_base: "https://example.test/".to_string(),
            model: "a/b".to_string(),
            ..Default::default()
        };
        let provider = HuggingFaceProvider::new(config).unwrap();
        assert_eq!(provider.endpoint(), "https://example.test/models/a/b");
    }

    #[tokio::test]
    async fn test_missing_api_key_is_configuration_error() {
        let provider = HuggingFaceProvider::new(ProviderConfig::default()).unwrap();
        let err = provider.generate("prompt").await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CodeproxyError>(),
            Some(CodeproxyError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_zero_attempts_exhausts_retries() {
        let config = ProviderConfig {
            api_key: Some("hf_key".to_string()),
            ..Default::default()
        };
        let provider = HuggingFaceProvider::new(config)
            .unwrap()
            .with_retry_policy(RetryPolicy::new(0, std::time::Duration::ZERO));
        let err = provider.generate("prompt").await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CodeproxyError>(),
            Some(CodeproxyError::ExhaustedRetries { attempts: 0 })
        ));
    }

    #[test]
    fn test_model_accessor() {
        let provider = HuggingFaceProvider::new(ProviderConfig::default()).unwrap();
        assert_eq!(provider.model(), "mistralai/Mistral-7B-Instruct-v0.2");
    }
}
