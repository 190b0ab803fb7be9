//! Prompt classification
//!
//! Decides whether an incoming prompt is small talk or a programming task.
//! The result selects the prompt template and whether the reply is
//! decomposed into explanation and code.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Conversational markers, matched against the lowercased prompt as
/// prefixes and as substrings
const CONVERSATIONAL_MARKERS: &[&str] = &[
    "hi",
    "hello",
    "hey",
    "hi there",
    "hello there",
    "hey there",
    "how are you",
    "good morning",
    "good afternoon",
    "good evening",
    "what's up",
    "how's it going",
    "nice to meet you",
    "bye",
    "goodbye",
    "thank you",
    "thanks",
    "ok",
    "okay",
    "yes",
    "no",
    "maybe",
    "help",
    "who are you",
    "what can you do",
    "what are you",
    "tell me about",
    "can you",
    "could you",
    "would you",
    "do you",
    "i want to",
    "i need",
    "please",
    "explain",
    "describe",
];

/// Prompts with at most this many words are treated as conversation
const SHORT_MESSAGE_WORDS: usize = 5;

/// Category of an incoming prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Small talk, greetings, meta questions
    #[default]
    Conversation,
    /// A programming request
    Task,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Conversation => write!(f, "conversation"),
            Self::Task => write!(f, "task"),
        }
    }
}

/// Classifier with a configurable fallback category
///
/// Every heuristic rule resolves to [`Category::Conversation`]; the fallback
/// only applies to prompts that match none of them.
///
/// # Examples
///
/// ```
/// use codeproxy::classifier::{Category, Classifier};
///
/// let classifier = Classifier::new(Category::Task);
/// assert_eq!(classifier.classify("hello"), Category::Conversation);
/// assert_eq!(
///     classifier.classify("write a binary search over sorted integers in rust"),
///     Category::Task
/// );
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Classifier {
    fallback: Category,
}

impl Classifier {
    /// Create a classifier that returns `fallback` for unmatched prompts
    pub fn new(fallback: Category) -> Self {
        Self { fallback }
    }

    /// Category returned when no rule matches
    pub fn fallback(&self) -> Category {
        self.fallback
    }

    /// Classify a raw prompt
    pub fn classify(&self, text: &str) -> Category {
        if is_conversational(text) {
            Category::Conversation
        } else {
            self.fallback
        }
    }
}

/// Classify a prompt with the default fallback (conversation)
///
/// # Examples
///
/// ```
/// use codeproxy::classifier::{classify, Category};
///
/// assert_eq!(classify("Thanks!"), Category::Conversation);
/// assert_eq!(classify("  Is recursion slow?  "), Category::Conversation);
/// ```
pub fn classify(text: &str) -> Category {
    Classifier::default().classify(text)
}

fn is_conversational(text: &str) -> bool {
    let normalized = text.trim().to_lowercase();

    CONVERSATIONAL_MARKERS
        .iter()
        .any(|marker| normalized.starts_with(marker) || normalized.contains(marker))
        || normalized.ends_with('?')
        || normalized.split_whitespace().count() <= SHORT_MESSAGE_WORDS
}
