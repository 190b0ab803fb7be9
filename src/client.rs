//! HTTP client for a running codeproxy server
//!
//! Used by the `chat` and `ask` commands. Error bodies of the form
//! `{"detail": ...}` are mapped back onto [`CodeproxyError`].

use crate::error::{CodeproxyError, Result};
use crate::exchange::{ExchangeRequest, ExchangeResponse};
use crate::server::types::{
    ClearHistoryResponse, HealthResponse, HistoryRequest, HistoryResponse,
};

use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use url::Url;

/// Default address of a local server
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8000";

/// Default request timeout in seconds
///
/// Covers three provider timeouts plus backoff with the default server
/// configuration. Raise it when the server allows more attempts.
pub const DEFAULT_CLIENT_TIMEOUT_SECS: u64 = 240;

/// Client for the generate, history and health endpoints
///
/// # Examples
///
/// ```no_run
/// use codeproxy::client::GatewayClient;
/// use codeproxy::exchange::ExchangeRequest;
///
/// # async fn example() -> codeproxy::error::Result<()> {
/// let client = GatewayClient::new("http://127.0.0.1:8000")?;
/// let reply = client.generate(&ExchangeRequest::new("hello")).await?;
/// println!("{:?}", reply.response);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct GatewayClient {
    client: Client,
    base: Url,
    timeout: Duration,
}

impl GatewayClient {
    /// Create a client for the server at `base_url` with the default timeout
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `base_url` is not a valid URL
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_timeout(base_url, Duration::from_secs(DEFAULT_CLIENT_TIMEOUT_SECS))
    }

    /// Create a client whose requests give up after `timeout`
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `base_url` is not a valid URL
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self> {
        let mut base = Url::parse(base_url)
            .map_err(|e| CodeproxyError::Config(format!("Invalid server URL {}: {}", base_url, e)))?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("codeproxy/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| CodeproxyError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base,
            timeout,
        })
    }

    /// Per-request timeout
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Server base URL, always ending in `/`
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Run one exchange
    pub async fn generate(&self, request: &ExchangeRequest) -> Result<ExchangeResponse> {
        self.post("generate/", request).await
    }

    /// Read a session transcript
    pub async fn history(&self, session_id: &str) -> Result<HistoryResponse> {
        self.post("get_history/", &history_request(session_id)).await
    }

    /// Empty a session transcript
    pub async fn clear_history(&self, session_id: &str) -> Result<ClearHistoryResponse> {
        self.post("clear_history/", &history_request(session_id))
            .await
    }

    /// Check server liveness
    pub async fn health(&self) -> Result<HealthResponse> {
        let url = self.endpoint("health")?;
        let response = self.client.get(url).send().await.map_err(transport_error)?;
        decode(response).await
    }

    async fn post<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(path)?;
        tracing::debug!("POST {}", url);
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(transport_error)?;
        decode(response).await
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base
            .join(path)
            .map_err(|e| CodeproxyError::Config(format!("Invalid endpoint {}: {}", path, e)).into())
    }
}

fn history_request(session_id: &str) -> HistoryRequest {
    HistoryRequest {
        session_id: session_id.to_string(),
    }
}

fn transport_error(e: reqwest::Error) -> anyhow::Error {
    if e.is_timeout() {
        CodeproxyError::Timeout(e.to_string()).into()
    } else if e.is_connect() {
        CodeproxyError::Unavailable(format!("Cannot connect to backend: {}", e)).into()
    } else {
        CodeproxyError::Http(e).into()
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    let body = response.text().await.map_err(transport_error)?;

    if status.is_success() {
        return Ok(serde_json::from_str(&body).map_err(CodeproxyError::Serialization)?);
    }

    let detail = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|value| value.get("detail").and_then(|d| d.as_str()).map(String::from))
        .unwrap_or(body);

    Err(match status.as_u16() {
        400 => CodeproxyError::Validation(detail),
        401 => CodeproxyError::Authentication(detail),
        code => CodeproxyError::Provider { status: code, body: detail },
    }
    .into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let client = GatewayClient::new("http://localhost:9000/api").unwrap();
        assert_eq!(client.base_url().as_str(), "http://localhost:9000/api/");
        assert_eq!(
            client.endpoint("generate/").unwrap().as_str(),
            "http://localhost:9000/api/generate/"
        );
    }

    #[test]
    fn test_root_url() {
        let client = GatewayClient::new(DEFAULT_SERVER_URL).unwrap();
        assert_eq!(
            client.endpoint("health").unwrap().as_str(),
            "http://127.0.0.1:8000/health"
        );
    }

    #[test]
    fn test_timeout_defaults_and_overrides() {
        let client = GatewayClient::new(DEFAULT_SERVER_URL).unwrap();
        assert_eq!(client.timeout(), Duration::from_secs(DEFAULT_CLIENT_TIMEOUT_SECS));

        let client =
            GatewayClient::with_timeout(DEFAULT_SERVER_URL, Duration::from_secs(900)).unwrap();
        assert_eq!(client.timeout(), Duration::from_secs(900));
    }

    #[test]
    fn test_invalid_url_is_config_error() {
        let err = GatewayClient::new("not a url").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CodeproxyError>(),
            Some(CodeproxyError::Config(_))
        ));
    }
}
