use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

use codeproxy::config::{Config, ProviderConfig, RetryConfig};
use codeproxy::providers::HuggingFaceProvider;
use codeproxy::server::AppState;
use codeproxy::session::MemorySessionStore;
use codeproxy::Orchestrator;

pub const TEST_API_KEY: &str = "hf_test_key";
pub const TEST_MODEL: &str = "test-org/test-model";

/// Provider settings pointing at a mock server with a fast backoff
#[allow(dead_code)]
pub fn provider_config(api_base: &str) -> ProviderConfig {
    ProviderConfig {
        api_key: Some(TEST_API_KEY.to_string()),
        model: TEST_MODEL.to_string(),
        api_base: api_base.to_string(),
        timeout_seconds: 5,
        retry: RetryConfig {
            max_attempts: 3,
            base_delay_ms: 10,
        },
        ..Default::default()
    }
}

/// Full configuration pointing at a mock provider
#[allow(dead_code)]
pub fn test_config(api_base: &str) -> Config {
    Config {
        provider: provider_config(api_base),
        ..Default::default()
    }
}

/// Application state backed by the Hugging Face provider at `api_base`
#[allow(dead_code)]
pub fn app_state(config: &Config) -> AppState {
    AppState::from_config(config).expect("failed to build app state")
}

/// Orchestrator over a caller-supplied session store
#[allow(dead_code)]
pub fn orchestrator_with_store(config: &Config, store: Arc<MemorySessionStore>) -> Orchestrator {
    let provider =
        HuggingFaceProvider::new(config.provider.clone()).expect("failed to build provider");
    Orchestrator::from_config(config, Arc::new(provider), store)
}

/// Success payload in the shape returned by the inference API
#[allow(dead_code)]
pub fn generated(text: &str) -> serde_json::Value {
    serde_json::json!([{ "generated_text": text }])
}

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}
