//! Request dispatcher
//!
//! Every operation the core exposes, as one tagged request routed by a single
//! function over a fixed set of services.

use crate::config::DocfillConfig;
use crate::conversation::{Conversation, ConversationTurn};
use crate::error::DocfillResult;
use crate::session::Session;
use docfill_ai::{build_service, HybridDetector, LlmService};
use docfill_document::{
    generate, DocumentParser, DocumentType, GenerateOptions, GeneratedDocument, ParsedDocument,
    ValueMap,
};
use docfill_model::{Field, FilledFields};
use docfill_validation::{FieldValidator, LegalValidator, ValidationResult};
use std::sync::Arc;

/// Operations accepted by [`dispatch`]
#[derive(Debug, Clone)]
pub enum Request {
    /// Template bytes to fields
    Parse { buffer: Vec<u8> },
    /// Enrich parsed fields
    Detect {
        fields: Vec<Field>,
        text: String,
        document_type: Option<DocumentType>,
    },
    /// Legal-grade validation of a value map keyed by field id
    Validate { fields: Vec<Field>, filled: FilledFields },
    /// One conversation turn
    Advance { message: String, session: Box<Session> },
    /// Render values into a template
    Generate {
        template: Vec<u8>,
        values: ValueMap,
        options: GenerateOptions,
    },
}

impl Request {
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Parse { .. } => "parse",
            Self::Detect { .. } => "detect",
            Self::Validate { .. } => "validate",
            Self::Advance { .. } => "advance",
            Self::Generate { .. } => "generate",
        }
    }
}

/// One response per request kind
#[derive(Debug, Clone)]
pub enum Response {
    Parsed(Box<ParsedDocument>),
    Detected(Vec<Field>),
    Validated(ValidationResult),
    Advanced(Box<ConversationTurn>),
    Generated(Box<GeneratedDocument>),
}

/// Services a request can be routed to
#[derive(Debug, Clone)]
pub struct Services {
    pub parser: DocumentParser,
    pub detector: HybridDetector,
    pub validator: LegalValidator,
    pub conversation: Conversation,
}

impl Services {
    #[must_use]
    pub fn new(config: &DocfillConfig, llm: Arc<dyn LlmService>) -> Self {
        Self {
            parser: DocumentParser::new().with_max_document_bytes(config.max_document_bytes),
            detector: HybridDetector::new(llm.clone(), config.enrichment_cache()),
            validator: LegalValidator::new(),
            conversation: Conversation::new(llm),
        }
    }

    /// Services backed by the configured LLM provider
    #[must_use]
    pub fn from_config(config: &DocfillConfig) -> Self {
        Self::new(config, build_service(&config.llm))
    }
}

/// Route a request to its service
///
/// # Errors
/// `Parse` and `Generation` failures propagate; validation outcomes and AI
/// degradation never produce an error.
pub async fn dispatch(services: &Services, request: Request) -> DocfillResult<Response> {
    let kind = request.kind();
    tracing::debug!(request = kind, "dispatching");

    let response = match request {
        Request::Parse { buffer } => Response::Parsed(Box::new(services.parser.parse(&buffer)?)),
        Request::Detect {
            fields,
            text,
            document_type,
        } => Response::Detected(services.detector.detect_fields(fields, &text, document_type).await),
        Request::Validate { fields, filled } => {
            Response::Validated(services.validator.validate(&fields, &filled))
        }
        Request::Advance { message, session } => {
            let turn = services.conversation.advance(&message, *session).await;
            Response::Advanced(Box::new(turn))
        }
        Request::Generate {
            template,
            values,
            options,
        } => Response::Generated(Box::new(generate(&template, &values, &options)?)),
    };
    Ok(response)
}
