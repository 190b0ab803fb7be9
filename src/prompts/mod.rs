//! Instruction prompt construction
//!
//! This module turns a classified prompt, the requested response shape and
//! recent session history into the single instruction string sent to the
//! model. Construction is pure: no I/O and no session mutation.

pub mod templates;

use crate::classifier::Category;
use crate::exchange::ResponseShape;

/// Default number of transcript lines carried into a follow-up prompt
/// (the three most recent exchanges)
pub const DEFAULT_CONTEXT_LINES: usize = 6;

/// Builds instruction prompts with a bounded history window
///
/// # Examples
///
/// ```
/// use codeproxy::classifier::Category;
/// use codeproxy::exchange::ResponseShape;
/// use codeproxy::prompts::PromptBuilder;
///
/// let builder = PromptBuilder::new(2);
/// let history = vec![
///     "User: a".to_string(),
///     "AI: b".to_string(),
///     "User: c".to_string(),
///     "AI: d".to_string(),
/// ];
/// let prompt = builder.build(Category::Task, ResponseShape::Code, "e", &history);
/// assert!(prompt.contains("User: c\nAI: d"));
/// assert!(!prompt.contains("User: a"));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptBuilder {
    context_lines: usize,
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_CONTEXT_LINES)
    }
}

impl PromptBuilder {
    /// Create a builder that keeps at most `context_lines` history lines
    pub fn new(context_lines: usize) -> Self {
        Self { context_lines }
    }

    /// Maximum number of history lines included in a follow-up prompt
    pub fn context_lines(&self) -> usize {
        self.context_lines
    }

    /// Build the instruction string for one exchange
    ///
    /// Conversation never carries history or shape scaffolding. For tasks,
    /// non-empty history replaces the shape template.
    pub fn build(
        &self,
        category: Category,
        shape: ResponseShape,
        prompt: &str,
        history: &[String],
    ) -> String {
        if category == Category::Conversation {
            return templates::conversation_prompt(prompt);
        }

        let context = recent_lines(history, self.context_lines);
        if !context.is_empty() {
            return templates::history_prompt(context, prompt);
        }

        match shape {
            ResponseShape::Code => templates::code_prompt(prompt),
            ResponseShape::Explanation => templates::explanation_prompt(prompt),
            ResponseShape::Both => templates::combined_prompt(prompt),
        }
    }
}

/// Build an instruction with the default history window
///
/// # Examples
///
/// ```
/// use codeproxy::classifier::Category;
/// use codeproxy::exchange::ResponseShape;
/// use codeproxy::prompts::build_instruction;
///
/// let prompt = build_instruction(Category::Conversation, ResponseShape::Code, "hello", &[]);
/// assert_eq!(prompt, "<s>[INST] hello [/INST]");
/// ```
pub fn build_instruction(
    category: Category,
    shape: ResponseShape,
    prompt: &str,
    history: &[String],
) -> String {
    PromptBuilder::default().build(category, shape, prompt, history)
}

fn recent_lines(history: &[String], limit: usize) -> &[String] {
    let start = history.len().saturating_sub(limit);
    &history[start..]
}
