//! Session orchestration
//!
//! Ties the pipeline together for one upload:
//! parse → detect → session → conversation turns → export.

use crate::config::DocfillConfig;
use crate::conversation::{opening_message, Conversation};
use crate::error::{DocfillError, DocfillResult};
use crate::session::{Session, SessionId, SessionStatus};
use crate::store::{InMemorySessionStore, SessionStore};
use docfill_ai::{build_service, HybridDetector, LlmService};
use docfill_document::{
    generate, DocumentParser, DocumentType, GenerateOptions, GeneratedDocument, ValueMap,
};
use docfill_model::Field;
use docfill_validation::{FieldValidator, LegalValidator, ValidationResult};
use std::fmt;
use std::sync::Arc;

/// A freshly created session and its opening reply
#[derive(Debug, Clone)]
pub struct StartedSession {
    pub session_id: SessionId,
    pub document_type: DocumentType,
    pub fields: Vec<Field>,
    pub reply: String,
}

/// Session lifecycle over an injected store
#[derive(Clone)]
pub struct SessionManager {
    store: Arc<dyn SessionStore>,
    parser: DocumentParser,
    detector: HybridDetector,
    conversation: Conversation,
    validator: LegalValidator,
    config: DocfillConfig,
}

impl fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionManager")
            .field("detector", &self.detector)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl SessionManager {
    #[must_use]
    pub fn new(config: DocfillConfig, llm: Arc<dyn LlmService>, store: Arc<dyn SessionStore>) -> Self {
        Self {
            parser: DocumentParser::new().with_max_document_bytes(config.max_document_bytes),
            detector: HybridDetector::new(llm.clone(), config.enrichment_cache()),
            conversation: Conversation::new(llm),
            validator: LegalValidator::new(),
            store,
            config,
        }
    }

    /// Configured provider with an in-memory store
    #[must_use]
    pub fn from_config(config: DocfillConfig) -> Self {
        let llm = build_service(&config.llm);
        Self::new(config, llm, Arc::new(InMemorySessionStore::new()))
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &DocfillConfig {
        &self.config
    }

    /// Parse and enrich an upload, then open a session on it
    ///
    /// # Errors
    /// `Parse` when the buffer is not a readable template
    pub async fn start_session(&self, buffer: Vec<u8>) -> DocfillResult<StartedSession> {
        let parsed = self.parser.parse(&buffer)?;
        let detection = self
            .detector
            .detect(parsed.fields, &parsed.text, Some(parsed.metadata.document_type))
            .await;

        let mut session = Session::new(parsed.buffer, detection.fields, detection.document_type);
        let reply = opening_message(&mut session);
        let started = StartedSession {
            session_id: session.id,
            document_type: session.document_type,
            fields: session.fields.clone(),
            reply,
        };

        tracing::info!(
            session_id = %session.id,
            fingerprint = %parsed.metadata.fingerprint.short(),
            fields = started.fields.len(),
            enrichment = ?detection.source,
            "session started"
        );
        self.store.set(session).await;
        Ok(started)
    }

    /// Current snapshot of a session
    ///
    /// # Errors
    /// `SessionNotFound` for unknown or expired ids
    pub async fn session(&self, id: &SessionId) -> DocfillResult<Session> {
        self.store
            .get(id)
            .await
            .ok_or(DocfillError::SessionNotFound(*id))
    }

    /// Run one conversation turn and persist the result
    ///
    /// # Errors
    /// `SessionNotFound` for unknown or expired ids
    pub async fn handle_message(&self, id: &SessionId, message: &str) -> DocfillResult<String> {
        let session = self.session(id).await?;
        let turn = self.conversation.advance(message, session).await;
        self.store.set(turn.session).await;
        Ok(turn.reply)
    }

    /// Legal-grade check of the session's answers
    ///
    /// # Errors
    /// `SessionNotFound` for unknown or expired ids
    pub async fn validate(&self, id: &SessionId) -> DocfillResult<ValidationResult> {
        let session = self.session(id).await?;
        Ok(self.validator.validate(&session.fields, &session.filled))
    }

    /// Render the session's answers into its template
    ///
    /// Answers are checked with the legal-grade validator first; any error
    /// blocks generation, warnings do not. Values are keyed by placeholder,
    /// which is the template's tag name. Blank answers are left out so
    /// required tags surface as missing.
    ///
    /// # Errors
    /// - `SessionNotFound` for unknown or expired ids
    /// - `Validation` when any answer fails legal-grade validation
    /// - `Generation` when tags are unbound or the output cannot be written
    pub async fn export(&self, id: &SessionId, options: Option<GenerateOptions>) -> DocfillResult<GeneratedDocument> {
        let session = self.session(id).await?;
        let report = self.validator.validate(&session.fields, &session.filled);
        if !report.is_valid() {
            tracing::warn!(
                session_id = %id,
                errors = report.errors.len(),
                "export blocked by validation errors"
            );
            return Err(DocfillError::Validation(report));
        }

        let values = value_map(&session);
        let options = options.unwrap_or_else(|| self.config.generate_options());

        let document = generate(&session.buffer, &values, &options)?;
        if session.status != SessionStatus::Complete {
            tracing::debug!(session_id = %id, status = %session.status, "exported before confirmation");
        }
        tracing::info!(
            session_id = %id,
            checksum = %document.metadata.checksum.short(),
            size_bytes = document.metadata.size_bytes,
            "session exported"
        );
        Ok(document)
    }

    /// Drop a session; returns whether it existed
    pub async fn end_session(&self, id: &SessionId) -> bool {
        self.store.delete(id).await.is_some()
    }

    /// Evict sessions idle longer than the configured TTL
    pub async fn cleanup(&self) -> usize {
        self.store.cleanup(self.config.session_ttl()).await
    }
}

/// Non-blank answers keyed by placeholder, in field order
#[must_use]
pub fn value_map(session: &Session) -> ValueMap {
    session
        .fields
        .iter()
        .filter_map(|field| {
            let value = session.filled.get(&field.id)?;
            (!value.trim().is_empty()).then(|| (field.placeholder.clone(), value.to_string()))
        })
        .collect()
}
