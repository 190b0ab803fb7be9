//! Command-line interface definition for codeproxy
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands to run the server and to talk to a running one.

use clap::{Parser, Subcommand};

use crate::client::{DEFAULT_CLIENT_TIMEOUT_SECS, DEFAULT_SERVER_URL};

/// codeproxy - Hugging Face code-assistant gateway
///
/// Serves a small HTTP API in front of a hosted text-generation model and
/// ships a terminal client for it.
#[derive(Parser, Debug, Clone)]
#[command(name = "codeproxy")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub json_logs: bool,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for codeproxy
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start the HTTP server
    Serve {
        /// Address to bind (overrides config and CODEPROXY_HOST)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind (overrides config and CODEPROXY_PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Start an interactive terminal session against a running server
    Chat {
        /// Server base URL
        #[arg(short, long, env = "CODEPROXY_URL", default_value = DEFAULT_SERVER_URL)]
        url: String,

        /// Response shape: code, explanation or both
        #[arg(short, long, default_value = "both")]
        response_type: String,

        /// Resume an existing session instead of starting a new one
        #[arg(short, long)]
        session: Option<String>,

        /// Seconds to wait for each server reply
        #[arg(short, long, env = "CODEPROXY_CLIENT_TIMEOUT", default_value_t = DEFAULT_CLIENT_TIMEOUT_SECS)]
        timeout: u64,
    },

    /// Send a single prompt and print the reply
    Ask {
        /// Prompt to send
        prompt: String,

        /// Server base URL
        #[arg(short, long, env = "CODEPROXY_URL", default_value = DEFAULT_SERVER_URL)]
        url: String,

        /// Response shape: code, explanation or both
        #[arg(short, long, default_value = "both")]
        response_type: String,

        /// Session to record the exchange in
        #[arg(short, long)]
        session: Option<String>,

        /// Seconds to wait for each server reply
        #[arg(short, long, env = "CODEPROXY_CLIENT_TIMEOUT", default_value_t = DEFAULT_CLIENT_TIMEOUT_SECS)]
        timeout: u64,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: Some("config/config.yaml".to_string()),
            verbose: false,
            json_logs: false,
            command: Commands::Serve {
                host: None,
                port: None,
            },
        }
    }
}
