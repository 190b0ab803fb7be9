//! Wire types for the history and health endpoints

use serde::{Deserialize, Serialize};

/// Body of `POST /clear_history/` and `POST /get_history/`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryRequest {
    pub session_id: String,
}

/// Outcome of a history lookup or clear
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryStatus {
    Success,
    NotFound,
}

/// Response of `POST /get_history/`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub status: HistoryStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl HistoryResponse {
    pub fn found(history: Vec<String>) -> Self {
        Self {
            status: HistoryStatus::Success,
            history: Some(history),
            message: None,
        }
    }

    pub fn not_found() -> Self {
        Self {
            status: HistoryStatus::NotFound,
            history: None,
            message: Some(SESSION_NOT_FOUND.to_string()),
        }
    }
}

/// Response of `POST /clear_history/`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClearHistoryResponse {
    pub status: HistoryStatus,
    pub message: String,
}

impl ClearHistoryResponse {
    pub fn cleared() -> Self {
        Self {
            status: HistoryStatus::Success,
            message: "Conversation history cleared".to_string(),
        }
    }

    pub fn not_found() -> Self {
        Self {
            status: HistoryStatus::NotFound,
            message: SESSION_NOT_FOUND.to_string(),
        }
    }
}

/// Response of `GET /health`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub model: String,
}

const SESSION_NOT_FOUND: &str = "Session ID not found";
