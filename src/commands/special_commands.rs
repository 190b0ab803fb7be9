//! Special commands parser for the interactive chat client
//!
//! Special commands act on the client session instead of being sent to the
//! model. They are prefixed with `/` and are case-insensitive; `exit` and
//! `quit` also work without the slash.

use crate::exchange::ResponseShape;
use thiserror::Error;

/// Errors that can occur when parsing special commands
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Unknown command was entered
    #[error("Unknown command: {0}\n\nType '/help' to see available commands")]
    UnknownCommand(String),

    /// Command was given an unsupported argument
    #[error("Unsupported argument for {command}: {arg}\n\nType '/help' to see valid usage")]
    UnsupportedArgument { command: String, arg: String },

    /// Command requires an argument but none was provided
    #[error("Command {command} requires an argument\n\nUsage: {usage}")]
    MissingArgument { command: String, usage: String },
}

/// Special commands available in the chat client
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecialCommand {
    /// Print the server-side transcript of the current session
    ShowHistory,

    /// Clear the server-side transcript of the current session
    ClearHistory,

    /// Print the current session id and response shape
    ShowSession,

    /// Start a fresh session; the server assigns the id on the next prompt
    NewSession,

    /// Change the response shape used for later prompts
    SetShape(ResponseShape),

    /// Display help information
    Help,

    /// Exit the interactive session
    Exit,

    /// Not a special command; send the input as a prompt
    None,
}

/// Parse a line of user input into a special command
///
/// # Errors
///
/// Returns `CommandError` for unknown commands and bad arguments
///
/// # Examples
///
/// ```
/// use codeproxy::commands::special_commands::{parse_special_command, SpecialCommand};
///
/// assert_eq!(parse_special_command("/history").unwrap(), SpecialCommand::ShowHistory);
/// assert_eq!(parse_special_command("quit").unwrap(), SpecialCommand::Exit);
/// assert_eq!(parse_special_command("write a parser").unwrap(), SpecialCommand::None);
/// ```
pub fn parse_special_command(input: &str) -> Result<SpecialCommand, CommandError> {
    let trimmed = input.trim();
    let lower = trimmed.to_lowercase();

    if !trimmed.starts_with('/') && lower != "exit" && lower != "quit" {
        return Ok(SpecialCommand::None);
    }

    match lower.as_str() {
        "/history" => Ok(SpecialCommand::ShowHistory),
        "/clear" => Ok(SpecialCommand::ClearHistory),
        "/session" => Ok(SpecialCommand::ShowSession),
        "/new" => Ok(SpecialCommand::NewSession),

        "/shape" => Err(CommandError::MissingArgument {
            command: "/shape".to_string(),
            usage: "/shape <code|explanation|both>".to_string(),
        }),
        input if input.starts_with("/shape ") => {
            let arg = input["/shape ".len()..].trim();
            ResponseShape::parse_str(arg)
                .map(SpecialCommand::SetShape)
                .map_err(|_| CommandError::UnsupportedArgument {
                    command: "/shape".to_string(),
                    arg: arg.to_string(),
                })
        }

        "/help" | "/?" => Ok(SpecialCommand::Help),
        "/exit" | "/quit" | "exit" | "quit" => Ok(SpecialCommand::Exit),

        _ => Err(CommandError::UnknownCommand(trimmed.to_string())),
    }
}

/// Print help for the chat client
pub fn print_help() {
    println!(
        r#"
Special Commands
================

SESSION:
  /history        - Show the transcript kept by the server
  /clear          - Clear the transcript kept by the server
  /session        - Show the current session id and response type
  /new            - Start a new session

RESPONSE TYPE:
  /shape code         - Reply with code only
  /shape explanation  - Reply with explanation only
  /shape both         - Reply with explanation and code

OTHER:
  /help           - Show this help message
  /exit           - Exit (also: exit, quit, Ctrl-D)
"#
    );
}
