//! Instruction templates in Mistral-instruct framing
//!
//! Every template wraps its body in `<s>[INST] ... [/INST]`. The wording is
//! what the hosted instruct models are tuned on, so changes here change the
//! shape of the generated text.

/// Minimal wrapper used for conversational prompts
pub fn conversation_prompt(prompt: &str) -> String {
    format!("<s>[INST] {} [/INST]", prompt)
}

/// Code-only request; the trailing fence opener biases the model to answer
/// inside a code block
pub fn code_prompt(prompt: &str) -> String {
    format!(
        "<s>[INST] Write Python code for the following request. Return only the code without explanation.\n\
User request: {}\n\
```python\n\
[/INST]",
        prompt
    )
}

/// Explanation-only request
pub fn explanation_prompt(prompt: &str) -> String {
    format!(
        "<s>[INST] Explain how to solve this programming task. Don't include code, just explain the approach clearly.\n\
User request: {} [/INST]",
        prompt
    )
}

/// Explanation followed by a fenced code block
pub fn combined_prompt(prompt: &str) -> String {
    format!(
        "<s>[INST] Write Python code for the following request and provide an explanation.\n\
User request: {}\n\
\n\
First give a clear explanation of your approach, then include the code in a Python code block (```python). [/INST]",
        prompt
    )
}

/// Follow-up request carrying recent transcript lines
pub fn history_prompt(history: &[String], prompt: &str) -> String {
    format!(
        "<s>[INST] Previous conversation:\n{}\n\n{} [/INST]",
        history.join("\n"),
        prompt
    )
}
