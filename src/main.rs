//! codeproxy - Hugging Face code-assistant gateway
//!
#![doc = "Main entry point for the codeproxy server and terminal client."]

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use codeproxy::cli::{Cli, Commands};
use codeproxy::commands;
use codeproxy::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Pick up HF_API_KEY and friends from a local .env before anything reads them
    if let Ok(path) = dotenvy::dotenv() {
        eprintln!("Loaded environment from {}", path.display());
    }

    // Parse command line arguments
    let cli = Cli::parse_args();

    // Initialize tracing
    init_tracing(cli.verbose, cli.json_logs);

    // Execute command
    match cli.command.clone() {
        Commands::Serve { .. } => {
            let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
            let config = Config::load(config_path, &cli)?;
            config.validate()?;

            tracing::info!("Starting HTTP server");
            commands::serve::run_serve(config).await?;
            Ok(())
        }
        Commands::Chat {
            url,
            response_type,
            session,
            timeout,
        } => {
            tracing::info!("Starting interactive chat against {}", url);
            if let Some(id) = &session {
                tracing::debug!("Resuming session: {}", id);
            }
            commands::chat::run_chat(url, response_type, session, timeout).await?;
            Ok(())
        }
        Commands::Ask {
            prompt,
            url,
            response_type,
            session,
            timeout,
        } => {
            tracing::debug!("Sending one-shot prompt to {}", url);
            commands::ask::run_ask(url, prompt, response_type, session, timeout).await?;
            Ok(())
        }
    }
}

/// Initialize tracing subscriber with environment filter
fn init_tracing(verbose: bool, json: bool) {
    let default_filter = if verbose {
        "codeproxy=debug,tower_http=debug"
    } else {
        "codeproxy=info,tower_http=info"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let registry = tracing_subscriber::registry().with(env_filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
