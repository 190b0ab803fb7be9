//! Request and response types for a single prompt exchange
//!
//! These types are shared by the orchestrator, the HTTP server and the
//! terminal client, so their serde shapes are the wire format of
//! `POST /generate/`.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Output composition requested by the client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ResponseShape {
    /// Code only
    Code,
    /// Explanation only, no code
    Explanation,
    /// Explanation followed by a fenced code block
    #[default]
    Both,
}

impl ResponseShape {
    /// Parse a response shape, treating anything unknown as [`ResponseShape::Both`]
    ///
    /// # Examples
    ///
    /// ```
    /// use codeproxy::exchange::ResponseShape;
    ///
    /// assert_eq!(ResponseShape::parse_lenient("CODE"), ResponseShape::Code);
    /// assert_eq!(ResponseShape::parse_lenient("poem"), ResponseShape::Both);
    /// ```
    pub fn parse_lenient(s: &str) -> Self {
        Self::parse_str(s).unwrap_or_default()
    }

    /// Parse a response shape strictly
    pub fn parse_str(s: &str) -> Result<Self, String> {
        match s.trim().to_lowercase().as_str() {
            "code" => Ok(Self::Code),
            "explanation" => Ok(Self::Explanation),
            "both" => Ok(Self::Both),
            other => Err(format!("Unknown response type: {}", other)),
        }
    }
}

impl fmt::Display for ResponseShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Code => write!(f, "code"),
            Self::Explanation => write!(f, "explanation"),
            Self::Both => write!(f, "both"),
        }
    }
}

impl<'de> Deserialize<'de> for ResponseShape {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().map(Self::parse_lenient).unwrap_or_default())
    }
}

/// Tag attached to every successful payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    /// Reply to a conversational prompt
    Conversation,
    /// Reply to a programming task
    Code,
}

/// Body of `POST /generate/`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeRequest {
    /// The user's prompt or question
    pub prompt: String,
    /// Session to read context from and append to; generated when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    /// Requested output composition
    #[serde(default)]
    pub response_type: ResponseShape,
}

impl ExchangeRequest {
    /// Build a request for a prompt with the default shape and no session
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            session_id: None,
            response_type: ResponseShape::default(),
        }
    }

    /// Attach a session identifier
    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    /// Select a response shape
    pub fn with_shape(mut self, shape: ResponseShape) -> Self {
        self.response_type = shape;
        self
    }
}

/// Successful payload of `POST /generate/`
///
/// Exactly which of `response`, `generated_code` and `explanation` are set
/// depends on the category and response shape of the exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeResponse {
    /// Raw model text (conversation, or task with the `both` shape)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    /// Extracted code
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_code: Option<String>,
    /// Explanation with code removed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    /// Session the exchange was recorded in
    pub session_id: String,
    /// Whether the prompt was treated as conversation or code
    pub message_type: MessageType,
}
