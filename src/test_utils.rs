//! Test utilities for codeproxy
//!
//! Provides a scripted in-memory [`Provider`] so orchestrator and server
//! tests run without a network, plus small assertion helpers.

use crate::error::{CodeproxyError, Result};
use crate::providers::Provider;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// One scripted provider outcome
#[derive(Debug, Clone)]
pub enum Scripted {
    /// Return this text
    Text(String),
    /// Fail with a provider error carrying this status
    Status(u16),
    /// Fail with a timeout
    Timeout,
}

/// Provider that replays scripted outcomes and records every instruction
///
/// When the script runs out, the last outcome repeats.
#[derive(Debug)]
pub struct ScriptedProvider {
    script: Mutex<VecDeque<Scripted>>,
    last: Mutex<Option<Scripted>>,
    instructions: Mutex<Vec<String>>,
}

impl ScriptedProvider {
    /// Provider that always returns `text`
    pub fn replying(text: &str) -> Self {
        Self::new(vec![Scripted::Text(text.to_string())])
    }

    /// Provider that replays `script` in order
    pub fn new(script: Vec<Scripted>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            last: Mutex::new(None),
            instructions: Mutex::new(Vec::new()),
        }
    }

    /// Instructions received so far
    pub fn instructions(&self) -> Vec<String> {
        self.instructions.lock().expect("instructions lock").clone()
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    async fn generate(&self, instruction: &str) -> Result<String> {
        self.instructions
            .lock()
            .expect("instructions lock")
            .push(instruction.to_string());

        let next = self.script.lock().expect("script lock").pop_front();
        let outcome = match next {
            Some(outcome) => {
                *self.last.lock().expect("last lock") = Some(outcome.clone());
                outcome
            }
            None => self
                .last
                .lock()
                .expect("last lock")
                .clone()
                .unwrap_or_else(|| Scripted::Text(String::new())),
        };

        match outcome {
            Scripted::Text(text) => Ok(text),
            Scripted::Status(status) => Err(CodeproxyError::Provider {
                status,
                body: format!("scripted status {}", status),
            }
            .into()),
            Scripted::Timeout => Err(CodeproxyError::Timeout("scripted".to_string()).into()),
        }
    }

    fn model(&self) -> String {
        "scripted/test-model".to_string()
    }
}

/// Assert that an error contains the expected message
///
/// # Panics
///
/// Panics if the result is Ok or if the error doesn't contain the expected message
pub fn assert_error_contains<T: std::fmt::Debug>(result: Result<T>, expected: &str) {
    match result {
        Ok(value) => panic!("Expected error containing '{}', got Ok({:?})", expected, value),
        Err(e) => {
            let message = e.to_string();
            assert!(
                message.contains(expected),
                "Error message '{}' does not contain '{}'",
                message,
                expected
            );
        }
    }
}
