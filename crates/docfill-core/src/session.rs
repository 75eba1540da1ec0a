//! Session record
//!
//! One uploaded template plus everything the conversation has learned about
//! it. Sessions are plain values: the store hands out clones and a turn
//! returns an updated copy.

use chrono::{DateTime, Utc};
use docfill_document::DocumentType;
use docfill_model::{normalize_key, Field, FilledFields};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use ulid::Ulid;

/// Sortable session identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Ulid);

impl SessionId {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for SessionId {
    type Err = ulid::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ulid::from_string(s).map(Self)
    }
}

/// Where a session is in its lifecycle
///
/// `Filling` is the collecting state of the conversation and `Review` the
/// reviewing state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Parsing,
    Filling,
    Review,
    Changing,
    Complete,
}

impl SessionStatus {
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Parsing => "parsing",
            Self::Filling => "filling",
            Self::Review => "review",
            Self::Changing => "changing",
            Self::Complete => "complete",
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One line of conversation history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationMessage {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

/// A template being filled
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub id: SessionId,
    /// Original template bytes
    #[serde(skip)]
    pub buffer: Arc<Vec<u8>>,
    pub document_type: DocumentType,
    /// Fields in parser order
    pub fields: Vec<Field>,
    /// Answers keyed by field id
    pub filled: FilledFields,
    pub history: Vec<ConversationMessage>,
    pub status: SessionStatus,
    /// Index into `fields` of the field being asked about while filling
    pub active_index: usize,
    /// Field id awaiting a replacement value while changing
    pub pending_field: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    /// New session in the `Parsing` state
    #[must_use]
    pub fn new(buffer: Vec<u8>, fields: Vec<Field>, document_type: DocumentType) -> Self {
        let now = Utc::now();
        Self {
            id: SessionId::new(),
            buffer: Arc::new(buffer),
            document_type,
            fields,
            filled: FilledFields::new(),
            history: Vec::new(),
            status: SessionStatus::Parsing,
            active_index: 0,
            pending_field: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Leave `Parsing`: ask the first field, or go straight to review when
    /// there is nothing to ask.
    pub fn begin(&mut self) {
        if self.status != SessionStatus::Parsing {
            return;
        }
        self.active_index = 0;
        self.status = if self.fields.is_empty() {
            SessionStatus::Review
        } else {
            SessionStatus::Filling
        };
    }

    /// Field currently being asked about
    #[must_use]
    pub fn active_field(&self) -> Option<&Field> {
        match self.status {
            SessionStatus::Filling => self.fields.get(self.active_index),
            _ => None,
        }
    }

    /// Field awaiting a replacement value
    #[must_use]
    pub fn pending(&self) -> Option<&Field> {
        let id = self.pending_field.as_deref()?;
        self.field(id)
    }

    #[must_use]
    pub fn field(&self, id: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.id == id)
    }

    /// First unanswered field after `index`, wrapping around
    #[must_use]
    pub fn next_unfilled_after(&self, index: usize) -> Option<usize> {
        let len = self.fields.len();
        (1..=len)
            .map(|step| (index + step) % len)
            .find(|&i| !self.filled.contains(&self.fields[i].id))
    }

    /// Index of the field whose placeholder best matches `query`.
    ///
    /// Matching is substring in either direction over normalized keys; the
    /// longest matching placeholder wins.
    #[must_use]
    pub fn find_field(&self, query: &str) -> Option<usize> {
        let query = normalize_key(query);
        if query.is_empty() {
            return None;
        }
        self.fields
            .iter()
            .enumerate()
            .filter_map(|(i, f)| {
                let key = f.normalized_key();
                (!key.is_empty() && (query.contains(&key) || key.contains(&query))).then_some((i, key.len()))
            })
            .max_by_key(|&(i, len)| (len, std::cmp::Reverse(i)))
            .map(|(i, _)| i)
    }

    #[inline]
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.status == SessionStatus::Complete
    }

    pub fn push_message(&mut self, role: Role, content: impl Into<String>) {
        self.history.push(ConversationMessage {
            role,
            content: content.into(),
            timestamp: Utc::now(),
        });
    }

    #[inline]
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
