//! Docfill Validation
//!
//! Pure validators over a field list and a candidate value map. Results are
//! data: errors block, warnings inform.
//!
//! Two variants share one per-field flow ([`FieldValidator`]):
//! - [`LegalValidator`] gates generation with strict parsing and business
//!   plausibility warnings
//! - [`ConversationalValidator`] checks each chat answer with looser rules
//!
//! # Example
//!
//! ```rust
//! use docfill_model::{Field, FilledFields};
//! use docfill_validation::{validate, ErrorCode};
//!
//! let fields = vec![Field::new("1", "Company Name", 0)];
//! let result = validate(&fields, &FilledFields::new());
//! assert!(!result.is_valid());
//! assert_eq!(result.errors[0].code, ErrorCode::RequiredFieldMissing);
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod result;
mod rules;
mod validator;

pub use result::{ErrorCode, FieldError, FieldReport, FieldWarning, Severity, ValidationResult};
pub use validator::{validate, ConversationalValidator, FieldValidator, LegalValidator};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
