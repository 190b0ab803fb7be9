//! Fenced code block detection and response decomposition
//!
//! Generated text is split on the Markdown fence convention:
//!
//! ```text
//! fence    := "```" language? [ \t]* newline content "```"
//! language := [A-Za-z0-9_+#.-]+
//! content  := any text, matched lazily up to the first closing fence
//! ```
//!
//! Only the first block counts as code; every block is removed when
//! producing an explanation.

use crate::exchange::ResponseShape;
use regex::Regex;
use std::ops::Range;
use std::sync::OnceLock;

fn fence_regex() -> &'static Regex {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    FENCE.get_or_init(|| {
        Regex::new(r"(?s)```([A-Za-z0-9_+#.-]*)[ \t]*\r?\n(.*?)```")
            .expect("fence pattern is a valid regex")
    })
}

/// A fenced code block found in generated text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FencedBlock {
    /// Language hint after the opening fence, if any
    pub language: Option<String>,
    /// Block body with surrounding whitespace trimmed
    pub content: String,
    /// Byte range of the whole block, fences included
    pub span: Range<usize>,
}

/// Find the first fenced code block in `text`
///
/// # Examples
///
/// ```
/// use codeproxy::decompose::find_fenced_block;
///
/// let block = find_fenced_block("Here:\n```python\nprint(1)\n```").unwrap();
/// assert_eq!(block.language.as_deref(), Some("python"));
/// assert_eq!(block.content, "print(1)");
/// assert!(find_fenced_block("no code here").is_none());
/// ```
pub fn find_fenced_block(text: &str) -> Option<FencedBlock> {
    let captures = fence_regex().captures(text)?;
    let whole = captures.get(0)?;
    let language = captures
        .get(1)
        .map(|m| m.as_str())
        .filter(|lang| !lang.is_empty())
        .map(str::to_string);
    let content = captures
        .get(2)
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default();

    Some(FencedBlock {
        language,
        content,
        span: whole.range(),
    })
}

/// Remove every fenced block from `text` and trim the remainder
pub fn strip_fenced_blocks(text: &str) -> String {
    fence_regex().replace_all(text, "").trim().to_string()
}

/// Explanation and code extracted from generated text
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Decomposed {
    /// Prose with code removed
    pub explanation: Option<String>,
    /// Code block content
    pub code: Option<String>,
}

/// Split generated text according to the requested response shape
///
/// - `Code`: the first block's content, or the whole text when there is no block
/// - `Explanation`: the text with all blocks removed
/// - `Both`: both of the above, `code` only when a block exists
///
/// # Examples
///
/// ```
/// use codeproxy::decompose::decompose;
/// use codeproxy::exchange::ResponseShape;
///
/// let parts = decompose("Here:\n```python\nprint(1)\n```", ResponseShape::Both);
/// assert_eq!(parts.explanation.as_deref(), Some("Here:"));
/// assert_eq!(parts.code.as_deref(), Some("print(1)"));
/// ```
pub fn decompose(raw: &str, shape: ResponseShape) -> Decomposed {
    match shape {
        ResponseShape::Code => Decomposed {
            explanation: None,
            code: Some(
                find_fenced_block(raw)
                    .map(|block| block.content)
                    .unwrap_or_else(|| raw.to_string()),
            ),
        },
        ResponseShape::Explanation => Decomposed {
            explanation: Some(strip_fenced_blocks(raw)),
            code: None,
        },
        ResponseShape::Both => Decomposed {
            explanation: Some(strip_fenced_blocks(raw)),
            code: find_fenced_block(raw).map(|block| block.content),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "Here:\n```python\nprint(1)\n```";

    #[test]
    fn test_find_block_with_language() {
        let block = find_fenced_block(SAMPLE).unwrap();
        assert_eq!(block.language.as_deref(), Some("python"));
        assert_eq!(block.content, "print(1)");
        assert_eq!(&SAMPLE[block.span.clone()], "```python\nprint(1)\n```");
    }

    #[test]
    fn test_find_block_without_language() {
        let block = find_fenced_block("```\nlet x = 1;\n```").unwrap();
        assert!(block.language.is_none());
        assert_eq!(block.content, "let x = 1;");
    }

    #[test]
    fn test_find_block_other_language_tags() {
        let block = find_fenced_block("```c++\nint main() {}\n```").unwrap();
        assert_eq!(block.language.as_deref(), Some("c++"));

        let block = find_fenced_block("```rust  \nfn main() {}\n```").unwrap();
        assert_eq!(block.language.as_deref(), Some("rust"));
        assert_eq!(block.content, "fn main() {}");
    }

    #[test]
    fn test_first_block_wins() {
        let text = "A\n```py\nfirst()\n```\nB\n```py\nsecond()\n```";
        assert_eq!(find_fenced_block(text).unwrap().content, "first()");
    }

    #[test]
    fn test_multiline_content_is_verbatim() {
        let text = "```python\ndef f(x):\n    return x * 2\n\nprint(f(2))\n```";
        let block = find_fenced_block(text).unwrap();
        assert_eq!(block.content, "def f(x):\n    return x * 2\n\nprint(f(2))");
    }

    #[test]
    fn test_unclosed_fence_is_not_a_block() {
        assert!(find_fenced_block("```python\nprint(1)\n").is_none());
    }

    #[test]
    fn test_crlf_line_endings() {
        let block = find_fenced_block("Intro\r\n```python\r\nprint(1)\r\n```").unwrap();
        assert_eq!(block.content, "print(1)");
    }

    #[test]
    fn test_code_shape_extracts_block() {
        let parts = decompose(SAMPLE, ResponseShape::Code);
        assert_eq!(parts.code.as_deref(), Some("print(1)"));
        assert!(parts.explanation.is_none());
    }

    #[test]
    fn test_code_shape_without_block_returns_raw_text() {
        let parts = decompose("print(1)", ResponseShape::Code);
        assert_eq!(parts.code.as_deref(), Some("print(1)"));
    }

    #[test]
    fn test_explanation_shape_removes_all_blocks() {
        let text = "Step one.\n```py\na()\n```\nStep two.\n```py\nb()\n```\nDone.";
        let parts = decompose(text, ResponseShape::Explanation);
        let explanation = parts.explanation.unwrap();
        assert!(!explanation.contains("```"));
        assert!(explanation.starts_with("Step one."));
        assert!(explanation.ends_with("Done."));
        assert!(parts.code.is_none());
    }

    #[test]
    fn test_both_shape_round_trip() {
        let parts = decompose(SAMPLE, ResponseShape::Both);
        assert_eq!(parts.explanation.as_deref(), Some("Here:"));
        assert_eq!(parts.code.as_deref(), Some("print(1)"));
    }

    #[test]
    fn test_both_shape_without_block() {
        let parts = decompose("Just prose.", ResponseShape::Both);
        assert_eq!(parts.explanation.as_deref(), Some("Just prose."));
        assert!(parts.code.is_none());
    }

    #[test]
    fn test_explanation_is_idempotent() {
        let once = decompose(SAMPLE, ResponseShape::Explanation)
            .explanation
            .unwrap();
        let twice = decompose(&once, ResponseShape::Explanation)
            .explanation
            .unwrap();
        assert_eq!(once, twice);

        let plain = "No fences in this answer.";
        assert_eq!(
            decompose(plain, ResponseShape::Explanation)
                .explanation
                .as_deref(),
            Some(plain)
        );
    }

    #[test]
    fn test_decompose_is_deterministic() {
        assert_eq!(
            decompose(SAMPLE, ResponseShape::Both),
            decompose(SAMPLE, ResponseShape::Both)
        );
    }
}
