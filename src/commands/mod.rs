/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint.

- `serve`: Run the HTTP server
- `chat`: Interactive terminal client for a running server
- `ask`: Send one prompt and print the reply

The client commands talk to the server through [`GatewayClient`] and
render replies with the same fence parser the server uses.
*/

use crate::client::GatewayClient;
use crate::config::Config;
use crate::decompose::decompose;
use crate::error::{CodeproxyError, Result};
use crate::exchange::{ExchangeRequest, ExchangeResponse, ResponseShape};

use std::time::Duration;

// Special commands parser for the chat client
pub mod special_commands;

/// A reply split for display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedReply {
    pub explanation: String,
    pub code: Option<String>,
}

/// Split a server reply into explanation and code
///
/// Returns `None` when the reply carries no usable text (empty, or the
/// literal `none`).
///
/// # Examples
///
/// ```
/// use codeproxy::commands::split_reply;
/// use codeproxy::exchange::{ExchangeResponse, MessageType};
///
/// let reply = ExchangeResponse {
///     response: Some("Try this:\n```python\nprint(1)\n```".to_string()),
///     generated_code: None,
///     explanation: None,
///     session_id: "s1".to_string(),
///     message_type: MessageType::Code,
/// };
/// let rendered = split_reply(&reply).unwrap();
/// assert_eq!(rendered.explanation, "Try this:");
/// assert_eq!(rendered.code.as_deref(), Some("print(1)"));
/// ```
pub fn split_reply(reply: &ExchangeResponse) -> Option<RenderedReply> {
    let rendered = if reply.explanation.is_some() || reply.generated_code.is_some() {
        RenderedReply {
            explanation: reply.explanation.clone().unwrap_or_default(),
            code: reply.generated_code.clone(),
        }
    } else if let Some(raw) = &reply.response {
        let parts = decompose(raw, ResponseShape::Both);
        RenderedReply {
            explanation: parts.explanation.unwrap_or_default(),
            code: parts.code,
        }
    } else {
        return None;
    };

    let empty_explanation = {
        let text = rendered.explanation.trim();
        text.is_empty() || text.eq_ignore_ascii_case("none")
    };
    let empty_code = rendered
        .code
        .as_deref()
        .map_or(true, |code| code.trim().is_empty());

    if empty_explanation && empty_code {
        None
    } else {
        Some(rendered)
    }
}

/// Print a rendered reply: explanation first, then the code block
pub fn print_reply(reply: &RenderedReply) {
    use colored::Colorize;

    if !reply.explanation.trim().is_empty() {
        println!("\n{} {}", "AI:".yellow().bold(), reply.explanation);
    }
    if let Some(code) = &reply.code {
        println!("\n{}", "Generated code:".bright_black());
        println!("{}", code.cyan());
    }
    println!();
}

fn describe_error(err: &anyhow::Error) -> String {
    match err.downcast_ref::<CodeproxyError>() {
        Some(CodeproxyError::Unavailable(_)) => {
            "Cannot connect to backend. Is `codeproxy serve` running?".to_string()
        }
        Some(CodeproxyError::Provider { status, body }) => {
            format!("API Error: {} - {}", status, body)
        }
        Some(other) => other.to_string(),
        None => err.to_string(),
    }
}

// Server command handler
pub mod serve {
    //! Runs the HTTP server until interrupted.

    use super::*;

    /// Start the server with a validated configuration
    ///
    /// # Errors
    ///
    /// Returns error if the server cannot start
    pub async fn run_serve(config: Config) -> Result<()> {
        crate::metrics::init_metrics_exporter();
        crate::server::run(config).await
    }
}

// Chat command handler
pub mod chat {
    //! Interactive chat client.
    //!
    //! Runs a readline loop that sends each line to `/generate/` and keeps
    //! the session id returned by the server, so follow-up prompts share
    //! context.

    use super::special_commands::{parse_special_command, print_help, SpecialCommand};
    use super::*;
    use crate::server::types::HistoryStatus;
    use rustyline::error::ReadlineError;
    use rustyline::DefaultEditor;

    /// Client-side chat state
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct ChatState {
        pub session_id: Option<String>,
        pub shape: ResponseShape,
    }

    impl ChatState {
        pub fn new(session_id: Option<String>, shape: ResponseShape) -> Self {
            Self { session_id, shape }
        }

        /// Build the request for a prompt in this session
        pub fn request(&self, prompt: &str) -> ExchangeRequest {
            let request = ExchangeRequest::new(prompt).with_shape(self.shape);
            match &self.session_id {
                Some(id) => request.with_session(id.clone()),
                None => request,
            }
        }

        /// Adopt the session id assigned by the server
        pub fn adopt(&mut self, reply: &ExchangeResponse) {
            if self.session_id.as_deref() != Some(reply.session_id.as_str()) {
                tracing::debug!("Session id set to {}", reply.session_id);
                self.session_id = Some(reply.session_id.clone());
            }
        }
    }

    /// Start the interactive chat client
    ///
    /// # Arguments
    ///
    /// * `url` - Server base URL
    /// * `response_type` - Initial response shape
    /// * `session` - Session to resume, if any
    /// * `timeout_seconds` - How long to wait for each server reply
    ///
    /// # Errors
    ///
    /// Returns error if the client or the line editor cannot be created
    pub async fn run_chat(
        url: String,
        response_type: String,
        session: Option<String>,
        timeout_seconds: u64,
    ) -> Result<()> {
        use colored::Colorize;

        let client = GatewayClient::with_timeout(&url, Duration::from_secs(timeout_seconds))?;
        let mut state = ChatState::new(session, ResponseShape::parse_lenient(&response_type));
        let mut rl = DefaultEditor::new()?;

        print_welcome_banner(&client, &state).await;

        loop {
            let prompt = format!("{} ", "You >".green().bold());
            match rl.readline(&prompt) {
                Ok(line) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        println!("{}", "Please enter a prompt.".yellow());
                        continue;
                    }

                    match parse_special_command(trimmed) {
                        Ok(SpecialCommand::None) => {}
                        Ok(SpecialCommand::Exit) => break,
                        Ok(command) => {
                            handle_special_command(&client, &mut state, command).await;
                            continue;
                        }
                        Err(e) => {
                            eprintln!("{}", e.to_string().red());
                            continue;
                        }
                    }

                    rl.add_history_entry(trimmed)?;

                    match client.generate(&state.request(trimmed)).await {
                        Ok(reply) => {
                            state.adopt(&reply);
                            match split_reply(&reply) {
                                Some(rendered) => print_reply(&rendered),
                                None => println!(
                                    "{}",
                                    "No valid response generated. Try a different prompt.\n"
                                        .yellow()
                                ),
                            }
                        }
                        Err(e) => eprintln!("{}\n", describe_error(&e).red()),
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("CTRL-C");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    println!("CTRL-D");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {:?}", err);
                    break;
                }
            }
        }

        println!("Goodbye!");
        Ok(())
    }

    async fn handle_special_command(
        client: &GatewayClient,
        state: &mut ChatState,
        command: SpecialCommand,
    ) {
        use colored::Colorize;

        match command {
            SpecialCommand::ShowHistory => {
                let Some(id) = state.session_id.as_deref() else {
                    println!("No session yet. Send a prompt first.\n");
                    return;
                };
                match client.history(id).await {
                    Ok(reply) if reply.status == HistoryStatus::Success => {
                        let lines = reply.history.unwrap_or_default();
                        if lines.is_empty() {
                            println!("History is empty.\n");
                        }
                        for line in lines {
                            println!("{}", line);
                        }
                        println!();
                    }
                    Ok(reply) => println!(
                        "{}\n",
                        reply.message.unwrap_or_default().yellow()
                    ),
                    Err(e) => eprintln!("{}\n", describe_error(&e).red()),
                }
            }
            SpecialCommand::ClearHistory => {
                let Some(id) = state.session_id.as_deref() else {
                    println!("No session yet. Nothing to clear.\n");
                    return;
                };
                match client.clear_history(id).await {
                    Ok(reply) => println!("{}\n", reply.message),
                    Err(e) => eprintln!("{}\n", describe_error(&e).red()),
                }
            }
            SpecialCommand::ShowSession => {
                println!(
                    "Session:       {}",
                    state.session_id.as_deref().unwrap_or("<new>")
                );
                println!("Response type: {}\n", state.shape);
            }
            SpecialCommand::NewSession => {
                state.session_id = None;
                println!("Started a new session.\n");
            }
            SpecialCommand::SetShape(shape) => {
                state.shape = shape;
                println!("Response type set to {}\n", shape);
            }
            SpecialCommand::Help => print_help(),
            SpecialCommand::Exit | SpecialCommand::None => {}
        }
    }

    async fn print_welcome_banner(client: &GatewayClient, state: &ChatState) {
        use colored::Colorize;

        println!("{}", "codeproxy chat".cyan().bold());
        match client.health().await {
            Ok(health) => println!("Server: {} (model: {})", client.base_url(), health.model),
            Err(e) => println!(
                "Server: {} {}",
                client.base_url(),
                format!("({})", describe_error(&e)).yellow()
            ),
        }
        println!("Response type: {}", state.shape);
        println!("Type '/help' for commands, '/exit' to quit.\n");
    }

}

// One-shot command handler
pub mod ask {
    //! Sends a single prompt and prints the reply.

    use super::*;

    /// Send one prompt to the server and print the reply
    ///
    /// # Errors
    ///
    /// Returns error if the prompt is empty or the request fails
    pub async fn run_ask(
        url: String,
        prompt: String,
        response_type: String,
        session: Option<String>,
        timeout_seconds: u64,
    ) -> Result<()> {
        if prompt.trim().is_empty() {
            return Err(CodeproxyError::Validation("Prompt cannot be empty".to_string()).into());
        }

        let client = GatewayClient::with_timeout(&url, Duration::from_secs(timeout_seconds))?;
        let mut request =
            ExchangeRequest::new(prompt).with_shape(ResponseShape::parse_lenient(&response_type));
        if let Some(id) = session {
            request = request.with_session(id);
        }

        let reply = client
            .generate(&request)
            .await
            .map_err(|e| anyhow::anyhow!(describe_error(&e)))?;
        match split_reply(&reply) {
            Some(rendered) => print_reply(&rendered),
            None => eprintln!("No valid response generated. Try a different prompt."),
        }
        println!("session: {}", reply.session_id);
        Ok(())
    }
}
