//! Provider module for codeproxy
//!
//! This module contains the remote text-generation abstraction and the
//! Hugging Face Inference API implementation with its retry policy.

pub mod huggingface;
pub mod retry;

pub use huggingface::{HuggingFaceProvider, NO_RESPONSE};
pub use retry::{RetryPolicy, StatusClass};

use crate::config::ProviderConfig;
use crate::error::Result;
use async_trait::async_trait;

/// Remote text-generation backend
///
/// Implementations own their retry behavior; callers see either generated
/// text or a terminal error.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Send an instruction prompt and return the generated text
    ///
    /// # Errors
    ///
    /// Returns a `CodeproxyError` describing the terminal failure: missing
    /// credential, rejected credential, upstream status, timeout, or
    /// connection failure.
    async fn generate(&self, instruction: &str) -> Result<String>;

    /// Identifier of the model this provider talks to
    fn model(&self) -> String;
}

/// Create the provider described by `config`
///
/// # Examples
///
/// ```
/// use codeproxy::config::ProviderConfig;
/// use codeproxy::providers::create_provider;
///
/// let provider = create_provider(&ProviderConfig::default()).unwrap();
/// assert_eq!(provider.model(), "mistralai/Mistral-7B-Instruct-v0.2");
/// ```
pub fn create_provider(config: &ProviderConfig) -> Result<Box<dyn Provider>> {
    Ok(Box::new(HuggingFaceProvider::new(config.clone())?))
}
