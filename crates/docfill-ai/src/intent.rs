//! User intent classification
//!
//! Keyword fast path first; otherwise one single-word LLM classification.
//! Any failure or unknown word means [`Intent::Answer`].

use crate::llm::LlmService;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// What a user message is trying to do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    Answer,
    Question,
    Help,
    Navigate,
    Unclear,
}

impl Intent {
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Answer => "answer",
            Intent::Question => "question",
            Intent::Help => "help",
            Intent::Navigate => "navigate",
            Intent::Unclear => "unclear",
        }
    }

    fn from_word(word: &str) -> Option<Intent> {
        match word {
            "answer" => Some(Intent::Answer),
            "question" => Some(Intent::Question),
            "help" => Some(Intent::Help),
            "navigate" => Some(Intent::Navigate),
            "unclear" => Some(Intent::Unclear),
            _ => None,
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Navigation commands, only at the start of the message
static NAVIGATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*(?:(?:go|skip|jump)(?:\s+back)?\s+to|back\s+to|go\s+back|change\s+the)\b")
        .expect("static regex")
});
/// Requests for help, as a whole message or an opening phrase
static HELP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*(?:(?:please\s+)?help(?:\s+me)?[\s.!?]*$|i\s+need\s+help\b|what\s+do\s+i\b|i\s+don'?t\s+understand\b)")
        .expect("static regex")
});
const QUESTION_WORDS: [&str; 8] = ["why", "what", "how", "which", "who", "when", "can", "should"];

/// Text after a leading navigation command, `None` if there is no command
///
/// `"go back to the investor name"` yields `"the investor name"`; a bare
/// `"go back"` yields `""`.
#[must_use]
pub fn navigation_target(message: &str) -> Option<&str> {
    NAVIGATION.find(message).map(|m| message[m.end()..].trim())
}

/// Keyword classification, `None` when the LLM should decide
#[must_use]
pub fn fast_path(message: &str) -> Option<Intent> {
    let lower = message.trim().to_lowercase();
    if lower.is_empty() {
        return None;
    }
    if NAVIGATION.is_match(&lower) {
        return Some(Intent::Navigate);
    }
    if HELP.is_match(&lower) {
        return Some(Intent::Help);
    }
    let first_word = lower
        .split(|c: char| !c.is_alphanumeric())
        .next()
        .unwrap_or_default();
    if lower.ends_with('?') || QUESTION_WORDS.contains(&first_word) {
        return Some(Intent::Question);
    }
    None
}

const CLASSIFIER_SYSTEM_PROMPT: &str =
    "Classify the user's message. Reply with exactly one word: answer, question, help, navigate, or unclear.";

/// Intent classifier with an LLM second stage
#[derive(Clone)]
pub struct IntentClassifier {
    llm: Arc<dyn LlmService>,
}

impl fmt::Debug for IntentClassifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntentClassifier")
            .field("llm", &self.llm.name())
            .finish()
    }
}

impl IntentClassifier {
    #[must_use]
    pub fn new(llm: Arc<dyn LlmService>) -> Self {
        Self { llm }
    }

    /// Classify `message` given the field currently being asked about
    pub async fn classify(&self, message: &str, active_field: Option<&str>) -> Intent {
        if let Some(intent) = fast_path(message) {
            return intent;
        }

        let prompt = match active_field {
            Some(field) => format!("We asked the user for \"{field}\". They replied: \"{message}\""),
            None => format!("The user said: \"{message}\""),
        };
        match self.llm.complete(&prompt, Some(CLASSIFIER_SYSTEM_PROMPT)).await {
            Ok(reply) => {
                let word = reply
                    .trim()
                    .split_whitespace()
                    .next()
                    .unwrap_or_default()
                    .trim_matches(|c: char| !c.is_alphabetic())
                    .to_lowercase();
                Intent::from_word(&word).unwrap_or(Intent::Answer)
            }
            Err(err) => {
                tracing::debug!(error = %err, "intent classification unavailable, assuming answer");
                Intent::Answer
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{NoopLlm, ScriptedLlm};

    #[test]
    fn fast_path_keywords() {
        assert_eq!(fast_path("go to the investor name"), Some(Intent::Navigate));
        assert_eq!(fast_path("go back"), Some(Intent::Navigate));
        assert_eq!(fast_path("Can I go back?"), Some(Intent::Question));
        assert_eq!(fast_path("help"), Some(Intent::Help));
        assert_eq!(fast_path("I don't understand"), Some(Intent::Help));
        assert_eq!(fast_path("What is a valuation cap?"), Some(Intent::Question));
        assert_eq!(fast_path("is this required?"), Some(Intent::Question));
        assert_eq!(fast_path("Acme Inc."), None);
        assert_eq!(fast_path("$100,000"), None);
    }

    #[test]
    fn keywords_inside_names_are_answers() {
        for name in ["Helpful Labs Inc.", "Ego Tools LLC", "Drawback Tools Inc.", "Self Help Inc.", "Go Tomorrow LLC"] {
            assert_eq!(fast_path(name), None, "{name}");
        }
        assert_eq!(fast_path("Help!"), Some(Intent::Help));
        assert_eq!(fast_path("please help me"), Some(Intent::Help));
    }

    #[test]
    fn navigation_target_follows_command() {
        assert_eq!(navigation_target("Go back to the Investor Name"), Some("the Investor Name"));
        assert_eq!(navigation_target("jump to amount"), Some("amount"));
        assert_eq!(navigation_target("go back"), Some(""));
        assert_eq!(navigation_target("Ego Tools LLC"), None);
        assert_eq!(navigation_target("Drawback Tools Inc."), None);
    }

    #[tokio::test]
    async fn llm_word_is_used() {
        let llm = Arc::new(ScriptedLlm::new().with_response(" Question.\n"));
        let classifier = IntentClassifier::new(llm);
        assert_eq!(classifier.classify("tell me more", Some("Amount")).await, Intent::Question);
    }

    #[tokio::test]
    async fn failures_and_noise_default_to_answer() {
        let classifier = IntentClassifier::new(Arc::new(NoopLlm));
        assert_eq!(classifier.classify("Acme Inc.", None).await, Intent::Answer);

        let noisy = IntentClassifier::new(Arc::new(ScriptedLlm::new().with_response("banana")));
        assert_eq!(noisy.classify("Acme Inc.", None).await, Intent::Answer);
    }
}
