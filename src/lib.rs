//! codeproxy - Hugging Face code-assistant gateway library
//!
//! This library provides a small HTTP service in front of a hosted
//! text-generation model. Each request is classified, wrapped in an
//! instruction template, sent to the model with retry and backoff, split
//! into explanation and code, and recorded in a bounded per-session
//! transcript.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `classifier`: Conversation vs. programming-task heuristics
//! - `prompts`: Instruction templates and the prompt builder
//! - `providers`: Remote model abstraction, Hugging Face client, retry policy
//! - `decompose`: Fenced code block extraction
//! - `session`: Bounded transcript storage
//! - `orchestrator`: The per-request pipeline
//! - `server`: axum routes and error mapping
//! - `client`, `commands`, `cli`: Terminal client and command-line interface
//! - `config`, `error`, `metrics`: Ambient configuration, errors and metrics
//!
//! # Example
//!
//! ```no_run
//! use codeproxy::{Config, Orchestrator};
//! use codeproxy::exchange::ExchangeRequest;
//! use codeproxy::providers::create_provider;
//! use codeproxy::session::MemorySessionStore;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config/config.yaml", &Default::default())?;
//!     config.validate()?;
//!
//!     let provider = create_provider(&config.provider)?;
//!     let sessions = Arc::new(MemorySessionStore::new(config.session.max_entries));
//!     let orchestrator = Orchestrator::from_config(&config, Arc::from(provider), sessions);
//!     let reply = orchestrator.handle(ExchangeRequest::new("hello")).await?;
//!     println!("{:?}", reply.response);
//!     Ok(())
//! }
//! ```

pub mod classifier;
pub mod cli;
pub mod client;
pub mod commands;
pub mod config;
pub mod decompose;
pub mod error;
pub mod exchange;
pub mod metrics;
pub mod orchestrator;
pub mod prompts;
pub mod providers;
pub mod server;
pub mod session;

// Re-export commonly used types
pub use classifier::{Category, Classifier};
pub use config::Config;
pub use error::{CodeproxyError, Result};
pub use exchange::{ExchangeRequest, ExchangeResponse, MessageType, ResponseShape};
pub use orchestrator::Orchestrator;
pub use session::{MemorySessionStore, SessionStore};

#[cfg(test)]
pub mod test_utils;
