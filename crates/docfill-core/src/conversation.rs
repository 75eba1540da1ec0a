//! Conversation state machine
//!
//! ```text
//! filling ──(last answer)──▶ review ──confirm──▶ complete
//!                              ▲  │
//!                    (valid)   │  └─change <name>──▶ changing
//!                              └────────────────────────┘
//! ```
//!
//! Each call consumes one user message and returns the reply plus the
//! updated session. Only the user's own answers write to `filled`; question,
//! help and navigation turns never do.

use crate::session::{Role, Session, SessionStatus};
use docfill_ai::{navigation_target, Intent, IntentClassifier, LlmService};
use docfill_model::{normalize_key, Field, FieldType};
use docfill_validation::{ConversationalValidator, FieldError, FieldValidator, ValidationResult};
use std::fmt;
use std::fmt::Write as _;
use std::sync::Arc;

pub const REVIEW_MENU: &str =
    "Type 'confirm' to finalize, 'review' to check your answers, or 'change <field name>' to edit an answer.";
pub const READY_MESSAGE: &str = "Your document is complete and ready to download.";
const LEFT_BLANK: &str = "(left blank)";
const SKIP: &str = "skip";

const CONFIRM_WORDS: [&str; 3] = ["confirm", "done", "finalize"];
const CHECK_WORDS: [&str; 2] = ["review", "check"];

const EXPLAIN_SYSTEM_PROMPT: &str = "You help people fill in legal documents. \
Answer in two or three plain sentences. Do not give legal advice.";

/// Reply and updated session for one turn
#[derive(Debug, Clone)]
pub struct ConversationTurn {
    pub reply: String,
    pub session: Session,
}

/// Stateless turn handler; all state lives in the [`Session`]
#[derive(Clone)]
pub struct Conversation {
    classifier: IntentClassifier,
    llm: Arc<dyn LlmService>,
    validator: ConversationalValidator,
}

impl fmt::Debug for Conversation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Conversation")
            .field("llm", &self.llm.name())
            .field("validator", &self.validator)
            .finish()
    }
}

impl Conversation {
    #[must_use]
    pub fn new(llm: Arc<dyn LlmService>) -> Self {
        Self {
            classifier: IntentClassifier::new(llm.clone()),
            llm,
            validator: ConversationalValidator::new(),
        }
    }

    /// Process one user message
    pub async fn advance(&self, message: &str, mut session: Session) -> ConversationTurn {
        if session.is_complete() {
            return ConversationTurn {
                reply: READY_MESSAGE.to_string(),
                session,
            };
        }

        session.begin();
        let message = message.trim();
        session.push_message(Role::User, message);

        let reply = match session.status {
            SessionStatus::Parsing | SessionStatus::Filling => self.collect(message, &mut session).await,
            SessionStatus::Review => review(message, &mut session),
            SessionStatus::Changing => self.change(message, &mut session),
            SessionStatus::Complete => READY_MESSAGE.to_string(),
        };

        session.push_message(Role::Assistant, reply.as_str());
        session.touch();
        tracing::debug!(
            session_id = %session.id,
            status = %session.status,
            filled = session.filled.len(),
            "advanced conversation"
        );
        ConversationTurn { reply, session }
    }

    async fn collect(&self, message: &str, session: &mut Session) -> String {
        let Some(field) = session.active_field().cloned() else {
            session.status = SessionStatus::Review;
            return summary(session);
        };

        if message.eq_ignore_ascii_case(SKIP) {
            if field.required {
                return format!(
                    "The {} is required, so it can't be skipped.\n\n{}",
                    label(&field),
                    question_for(&field)
                );
            }
            session.filled.insert(field.id.clone(), "");
            return advance_pointer(session);
        }

        match self.classifier.classify(message, Some(&field.placeholder)).await {
            Intent::Navigate => match navigate(message, session, &field) {
                Some(reply) => reply,
                None => self.answer(message, session, &field),
            },
            Intent::Question | Intent::Help => self.explain(message, &field).await,
            Intent::Answer | Intent::Unclear => self.answer(message, session, &field),
        }
    }

    fn answer(&self, message: &str, session: &mut Session, field: &Field) -> String {
        let result = self.validator.validate_value(field, Some(message));
        if let Some(error) = result.first_error() {
            tracing::debug!(session_id = %session.id, field = %field.id, code = error.code.as_str(), "answer rejected");
            return retry_prompt(error);
        }
        session.filled.insert(field.id.clone(), message);
        with_notes(&result, advance_pointer(session))
    }

    fn change(&self, message: &str, session: &mut Session) -> String {
        let Some(field) = session.pending().cloned() else {
            session.pending_field = None;
            session.status = SessionStatus::Review;
            return summary(session);
        };

        let result = if !field.required && message.eq_ignore_ascii_case(SKIP) {
            session.filled.insert(field.id.clone(), "");
            ValidationResult::new()
        } else {
            let result = self.validator.validate_value(&field, Some(message));
            if let Some(error) = result.first_error() {
                return retry_prompt(error);
            }
            session.filled.insert(field.id.clone(), message);
            result
        };

        session.pending_field = None;
        session.status = SessionStatus::Review;
        with_notes(&result, format!("Updated the {}.\n\n{}", label(&field), summary(session)))
    }

    /// Answer a question about `field` without consuming the turn
    async fn explain(&self, message: &str, field: &Field) -> String {
        let mut prompt = format!(
            "The user is filling in \"{}\" (type: {}) in a legal document.",
            field.placeholder, field.field_type
        );
        if let Some(description) = &field.description {
            let _ = write!(prompt, " Field description: {description}.");
        }
        let _ = write!(prompt, " They asked: \"{message}\"");

        let answer = match self.llm.complete(&prompt, Some(EXPLAIN_SYSTEM_PROMPT)).await {
            Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
            Ok(_) => fallback_help(field),
            Err(err) => {
                tracing::debug!(error = %err, field = %field.id, "question answering unavailable");
                fallback_help(field)
            }
        };
        format!("{answer}\n\n{}", question_for(field))
    }
}

/// Process one user message against `session`
pub async fn advance_conversation(conversation: &Conversation, message: &str, session: Session) -> ConversationTurn {
    conversation.advance(message, session).await
}

/// First reply for a freshly started session
#[must_use]
pub fn opening_message(session: &mut Session) -> String {
    session.begin();
    let reply = match session.active_field() {
        Some(field) => format!(
            "I found {} field{} to fill in your {} document. Let's go through them.\n\n{}",
            session.fields.len(),
            if session.fields.len() == 1 { "" } else { "s" },
            session.document_type,
            question_for(field)
        ),
        None => format!("I didn't find any fields to fill in this document.\n\n{REVIEW_MENU}"),
    };
    session.push_message(Role::Assistant, reply.as_str());
    reply
}

/// Review state: confirm, check, change, or a menu reminder
fn review(message: &str, session: &mut Session) -> String {
    let lower = message.to_lowercase();

    if let Some(pos) = lower.find("change") {
        let target = &lower[pos + "change".len()..];
        return match session.find_field(target) {
            Some(index) => {
                let field = &session.fields[index];
                let current = display_value(session.filled.get(&field.id));
                let reply = format!("What should the new {} be? (currently: {current})", label(field));
                session.pending_field = Some(field.id.clone());
                session.status = SessionStatus::Changing;
                reply
            }
            None => format!(
                "I couldn't find that field. The fields are: {}.\n\n{REVIEW_MENU}",
                field_list(session)
            ),
        };
    }

    if CONFIRM_WORDS.iter().any(|w| lower.contains(w)) {
        session.status = SessionStatus::Complete;
        tracing::info!(session_id = %session.id, filled = session.filled.len(), "session confirmed");
        return READY_MESSAGE.to_string();
    }

    if CHECK_WORDS.iter().any(|w| lower.contains(w)) {
        return quality_report(session);
    }

    REVIEW_MENU.to_string()
}

/// Jump to another field; `None` when no field is named, so the message
/// is taken as an answer instead
fn navigate(message: &str, session: &mut Session, current: &Field) -> Option<String> {
    let index = match navigation_target(message) {
        Some("") => {
            return Some(format!(
                "Which field? The fields are: {}.\n\n{}",
                field_list(session),
                question_for(current)
            ))
        }
        Some(target) => session.find_field(target)?,
        None => {
            let spoken = normalize_key(message);
            session
                .find_field(message)
                .filter(|&i| spoken.contains(&session.fields[i].normalized_key()))?
        }
    };

    let field = &session.fields[index];
    let reply = if let Some(value) = session.filled.get(&field.id) {
        format!(
            "You already answered the {} ({}). You can change it when we review.\n\n{}",
            label(field),
            display_value(Some(value)),
            question_for(current)
        )
    } else {
        let question = question_for(field);
        session.active_index = index;
        question
    };
    Some(reply)
}

/// Move to the next unanswered field, or into review when none is left
fn advance_pointer(session: &mut Session) -> String {
    match session.next_unfilled_after(session.active_index) {
        Some(next) => {
            session.active_index = next;
            question_for(&session.fields[next])
        }
        None => {
            session.status = SessionStatus::Review;
            summary(session)
        }
    }
}

/// Human label for a placeholder
fn label(field: &Field) -> String {
    normalize_key(&field.placeholder)
}

fn display_value(value: Option<&str>) -> &str {
    match value {
        Some(v) if !v.trim().is_empty() => v,
        _ => LEFT_BLANK,
    }
}

fn field_list(session: &Session) -> String {
    session.fields.iter().map(label).collect::<Vec<_>>().join(", ")
}

/// Question for a field, using its enrichment when present
#[must_use]
pub fn question_for(field: &Field) -> String {
    let label = label(field);
    let mut question = match field.description.as_deref().map(str::trim) {
        Some(description) if !description.is_empty() => format!("{description}\nWhat is the {label}?"),
        _ => format!("What is the {label}?"),
    };

    let hint = if field.field_type == FieldType::Enum && !field.options.is_empty() {
        Some(format!("options: {}", field.options.join(", ")))
    } else if !field.examples.is_empty() {
        Some(format!("e.g. {}", field.examples.iter().take(2).cloned().collect::<Vec<_>>().join(" or ")))
    } else {
        match field.field_type {
            FieldType::Currency => Some("e.g. $100,000".to_string()),
            FieldType::Date => Some("e.g. January 15, 2024".to_string()),
            FieldType::Text | FieldType::Enum => None,
        }
    };
    if let Some(hint) = hint {
        let _ = write!(question, " ({hint})");
    }
    if !field.required {
        question.push_str(" You can type 'skip' to leave it blank.");
    }
    question
}

fn fallback_help(field: &Field) -> String {
    let mut help = match field.description.as_deref() {
        Some(description) => description.trim_end_matches('.').to_string() + ".",
        None => format!("This is the {} for your document.", label(field)),
    };
    if let Some(context) = &field.legal_context {
        let _ = write!(help, " {}", context.trim());
    }
    if !field.examples.is_empty() {
        let _ = write!(help, " For example: {}.", field.examples.join(", "));
    }
    help
}

/// Full list of answers followed by the command menu
#[must_use]
pub fn summary(session: &Session) -> String {
    let mut text = String::from("Here's a summary of your answers:\n");
    for field in &session.fields {
        let _ = writeln!(text, "- {}: {}", label(field), display_value(session.filled.get(&field.id)));
    }
    text.push('\n');
    text.push_str(REVIEW_MENU);
    text
}

fn quality_report(session: &Session) -> String {
    let short: Vec<String> = session
        .fields
        .iter()
        .filter_map(|f| {
            let value = session.filled.get(&f.id)?.trim();
            (!value.is_empty() && value.chars().count() < 3).then(|| format!("- {}: \"{value}\"", label(f)))
        })
        .collect();

    if short.is_empty() {
        format!("Everything looks good.\n\n{REVIEW_MENU}")
    } else {
        format!("A few answers look short:\n{}\n\n{REVIEW_MENU}", short.join("\n"))
    }
}

fn retry_prompt(error: &FieldError) -> String {
    let message = error.message.trim_end_matches('.');
    match &error.suggestion {
        Some(suggestion) => format!("{message}. {suggestion}"),
        None => format!("{message}."),
    }
}

fn with_notes(result: &ValidationResult, reply: String) -> String {
    if result.warnings.is_empty() {
        return reply;
    }
    let mut text = String::new();
    for warning in &result.warnings {
        let _ = write!(text, "Note: {}.", warning.message.trim_end_matches('.'));
        if let Some(suggestion) = &warning.suggestion {
            let _ = write!(text, " {suggestion}.");
        }
        text.push('\n');
    }
    text.push('\n');
    text.push_str(&reply);
    text
}
