//! Route handlers and the error-to-response mapping

use crate::error::CodeproxyError;
use crate::exchange::{ExchangeRequest, ExchangeResponse};
use crate::server::types::{
    ClearHistoryResponse, HealthResponse, HistoryRequest, HistoryResponse,
};
use crate::server::AppState;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;

/// Error returned by handlers, rendered as `{"detail": message}`
#[derive(Debug)]
pub struct ApiError {
    pub status_code: StatusCode,
    pub detail: String,
}

impl ApiError {
    pub fn new(status_code: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status_code,
            detail: detail.into(),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.detail)
    }
}

impl std::error::Error for ApiError {}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        let Some(error) = err.downcast_ref::<CodeproxyError>() else {
            return Self::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Unexpected error: {}", err),
            );
        };

        let status_code = StatusCode::from_u16(error.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let detail = match error {
            CodeproxyError::Validation(msg)
            | CodeproxyError::Config(msg)
            | CodeproxyError::Authentication(msg) => msg.clone(),
            CodeproxyError::Provider { body, .. } => format!("HF API Error: {}", body),
            CodeproxyError::Timeout(_) => "Request timed out".to_string(),
            CodeproxyError::Unavailable(_) => "Could not connect to Hugging Face API".to_string(),
            CodeproxyError::ExhaustedRetries { .. } => {
                "Failed to get response after multiple attempts".to_string()
            }
            other => format!("Unexpected error: {}", other),
        };
        Self::new(status_code, detail)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status_code.is_server_error() {
            tracing::error!(status = self.status_code.as_u16(), "{}", self.detail);
        } else {
            tracing::warn!(status = self.status_code.as_u16(), "{}", self.detail);
        }
        (self.status_code, Json(json!({ "detail": self.detail }))).into_response()
    }
}

pub async fn generate(
    State(state): State<AppState>,
    Json(request): Json<ExchangeRequest>,
) -> Result<Json<ExchangeResponse>, ApiError> {
    let response = state.orchestrator.handle(request).await?;
    Ok(Json(response))
}

pub async fn clear_history(
    State(state): State<AppState>,
    Json(request): Json<HistoryRequest>,
) -> Json<ClearHistoryResponse> {
    if state.orchestrator.sessions().clear(&request.session_id) {
        tracing::info!(session_id = %request.session_id, "Cleared conversation history");
        Json(ClearHistoryResponse::cleared())
    } else {
        Json(ClearHistoryResponse::not_found())
    }
}

pub async fn get_history(
    State(state): State<AppState>,
    Json(request): Json<HistoryRequest>,
) -> Json<HistoryResponse> {
    let sessions = state.orchestrator.sessions();
    if sessions.exists(&request.session_id) {
        Json(HistoryResponse::found(sessions.get(&request.session_id)))
    } else {
        Json(HistoryResponse::not_found())
    }
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        model: state.orchestrator.model(),
    })
}
