//! Per-request orchestration of the generate pipeline
//!
//! An exchange moves through
//! `Received -> Classified -> Prompted -> Called -> Decomposed -> Stored -> Responded`.
//! It stops early in `Error` when the prompt is empty (from `Received`) or
//! the provider fails (from `Called`). Retries live in the provider, never
//! here.

use crate::classifier::{Category, Classifier};
use crate::config::Config;
use crate::decompose::decompose;
use crate::error::{CodeproxyError, Result};
use crate::exchange::{ExchangeRequest, ExchangeResponse, MessageType, ResponseShape};
use crate::metrics::ExchangeMetrics;
use crate::prompts::PromptBuilder;
use crate::providers::Provider;
use crate::session::SessionStore;

use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// Pipeline stage of one exchange, used in logs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Received,
    Classified,
    Prompted,
    Called,
    Decomposed,
    Stored,
    Responded,
    Error,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Received => "received",
            Self::Classified => "classified",
            Self::Prompted => "prompted",
            Self::Called => "called",
            Self::Decomposed => "decomposed",
            Self::Stored => "stored",
            Self::Responded => "responded",
            Self::Error => "error",
        };
        write!(f, "{}", name)
    }
}

/// Composes classifier, prompt builder, provider, decomposer and session
/// store into the `POST /generate/` behavior
pub struct Orchestrator {
    provider: Arc<dyn Provider>,
    sessions: Arc<dyn SessionStore>,
    classifier: Classifier,
    prompts: PromptBuilder,
    split_combined: bool,
}

impl Orchestrator {
    /// Create an orchestrator with default classifier and prompt settings
    pub fn new(provider: Arc<dyn Provider>, sessions: Arc<dyn SessionStore>) -> Self {
        Self {
            provider,
            sessions,
            classifier: Classifier::default(),
            prompts: PromptBuilder::default(),
            split_combined: false,
        }
    }

    /// Create an orchestrator using the classifier, session and server
    /// settings of `config`
    pub fn from_config(
        config: &Config,
        provider: Arc<dyn Provider>,
        sessions: Arc<dyn SessionStore>,
    ) -> Self {
        Self::new(provider, sessions)
            .with_classifier(Classifier::new(config.classifier.fallback))
            .with_prompt_builder(PromptBuilder::new(config.session.context_lines))
            .with_split_combined(config.server.split_combined)
    }

    /// Replace the classifier
    pub fn with_classifier(mut self, classifier: Classifier) -> Self {
        self.classifier = classifier;
        self
    }

    /// Replace the prompt builder
    pub fn with_prompt_builder(mut self, prompts: PromptBuilder) -> Self {
        self.prompts = prompts;
        self
    }

    /// Publish the explanation/code split for the `both` shape
    pub fn with_split_combined(mut self, split_combined: bool) -> Self {
        self.split_combined = split_combined;
        self
    }

    /// Model served by the underlying provider
    pub fn model(&self) -> String {
        self.provider.model()
    }

    /// Shared session store
    pub fn sessions(&self) -> &Arc<dyn SessionStore> {
        &self.sessions
    }

    /// Run one exchange end to end
    ///
    /// # Errors
    ///
    /// Returns `CodeproxyError::Validation` for an empty prompt, or the
    /// provider's terminal error. Failed exchanges leave the session
    /// untouched.
    pub async fn handle(&self, request: ExchangeRequest) -> Result<ExchangeResponse> {
        let metrics = ExchangeMetrics::start();
        match self.run(request).await {
            Ok(response) => {
                metrics.record_success(response.message_type);
                Ok(response)
            }
            Err(e) => {
                let kind = e
                    .downcast_ref::<CodeproxyError>()
                    .map(CodeproxyError::kind)
                    .unwrap_or("unexpected");
                metrics.record_error(kind);
                tracing::debug!(stage = %Stage::Error, kind, "Exchange failed: {}", e);
                Err(e)
            }
        }
    }

    async fn run(&self, request: ExchangeRequest) -> Result<ExchangeResponse> {
        let prompt = request.prompt.trim();
        if prompt.is_empty() {
            return Err(CodeproxyError::Validation("Prompt cannot be empty".to_string()).into());
        }

        let shape = request.response_type;
        let session_id = request
            .session_id
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        tracing::debug!(stage = %Stage::Received, %session_id, %shape);

        let category = self.classifier.classify(prompt);
        tracing::debug!(stage = %Stage::Classified, %session_id, %category);

        let history = self.sessions.get(&session_id);
        let instruction = self.prompts.build(category, shape, prompt, &history);
        tracing::debug!(
            stage = %Stage::Prompted,
            %session_id,
            "Sending prompt to model: {}...",
            preview(&instruction, 100)
        );

        let raw = self.provider.generate(&instruction).await?;
        tracing::debug!(stage = %Stage::Called, %session_id, length = raw.len());

        let response = self.shape_response(category, shape, &raw, session_id);
        tracing::debug!(stage = %Stage::Decomposed, session_id = %response.session_id);

        self.sessions.append(
            &response.session_id,
            vec![format!("User: {}", prompt), format!("AI: {}", raw)],
        );
        tracing::debug!(stage = %Stage::Stored, session_id = %response.session_id);

        tracing::info!(
            stage = %Stage::Responded,
            session_id = %response.session_id,
            message_type = ?response.message_type,
            "Exchange completed"
        );
        Ok(response)
    }

    fn shape_response(
        &self,
        category: Category,
        shape: ResponseShape,
        raw: &str,
        session_id: String,
    ) -> ExchangeResponse {
        let mut response = ExchangeResponse {
            response: None,
            generated_code: None,
            explanation: None,
            session_id,
            message_type: MessageType::Conversation,
        };

        if category == Category::Conversation {
            response.response = Some(raw.to_string());
            return response;
        }

        response.message_type = MessageType::Code;
        let parts = decompose(raw, shape);
        match shape {
            ResponseShape::Code => response.generated_code = parts.code,
            ResponseShape::Explanation => response.explanation = parts.explanation,
            ResponseShape::Both => {
                response.response = Some(raw.to_string());
                if self.split_combined {
                    response.explanation = parts.explanation;
                    response.generated_code = parts.code;
                }
            }
        }
        response
    }
}

/// First `limit` characters of `text`, on a char boundary
fn preview(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
