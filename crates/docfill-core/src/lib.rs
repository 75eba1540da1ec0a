//! Docfill Core
//!
//! Sessions, the conversation state machine and the request dispatcher that
//! drive a template from upload to a filled document.
//!
//! # Flow
//!
//! ```text
//! upload ─▶ parse ─▶ detect ─▶ Session ─▶ advance_conversation* ─▶ confirm ─▶ export
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use docfill_core::{DocfillConfig, SessionManager};
//!
//! let manager = SessionManager::from_config(DocfillConfig::default());
//! let started = manager.start_session(template_bytes).await?;
//! println!("{}", started.reply);
//!
//! let reply = manager.handle_message(&started.session_id, "Acme Inc.").await?;
//! // ... answer the remaining questions, then "confirm"
//! let document = manager.export(&started.session_id, None).await?;
//! std::fs::write("filled.docx", &document.buffer)?;
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod config;
pub mod conversation;
pub mod dispatch;
pub mod error;
pub mod manager;
pub mod session;
pub mod store;

pub use config::DocfillConfig;
pub use conversation::{
    advance_conversation, opening_message, question_for, summary, Conversation, ConversationTurn,
    READY_MESSAGE, REVIEW_MENU,
};
pub use dispatch::{dispatch, Request, Response, Services};
pub use error::{DocfillError, DocfillResult};
pub use manager::{value_map, SessionManager, StartedSession};
pub use session::{ConversationMessage, Role, Session, SessionId, SessionStatus};
pub use store::{InMemorySessionStore, SessionStore};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for embedding docfill
    pub use crate::{
        advance_conversation, dispatch, Conversation, DocfillConfig, DocfillError, Request,
        Response, Services, Session, SessionId, SessionManager, SessionStatus, SessionStore,
    };
    pub use docfill_document::{GenerateOptions, GeneratedDocument};
    pub use docfill_model::{Field, FieldType, FilledFields};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
