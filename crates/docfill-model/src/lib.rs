//! Docfill Model
//!
//! The shared data contract for every docfill component.
//!
//! # Core Concepts
//!
//! - [`Field`]: A detected, typed fillable slot in a document template
//! - [`FieldType`]: `text | date | currency | enum`, inferred from the label
//! - [`FilledFields`]: User answers keyed by field id
//! - [`ContentHash`]: 32-byte digest for fingerprints and checksums
//! - [`format`]: Currency, date and spelled-out number formatters
//!
//! # Example
//!
//! ```rust
//! use docfill_model::{Field, FieldType};
//! use docfill_model::format::{format_currency, parse_currency, CurrencyOptions};
//!
//! let field = Field::new("1", "Purchase Amount", 0);
//! assert_eq!(field.field_type, FieldType::Currency);
//!
//! let text = format_currency(100_000.0, CurrencyOptions::default()).unwrap();
//! assert_eq!(text, "$100,000");
//! assert_eq!(parse_currency(&text).unwrap(), 100_000.0);
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod field;
pub mod format;
mod hash;

pub use field::{
    normalize_key, Field, FieldSource, FieldType, FilledFields, RuleKind, UnknownFieldType,
    ValidationRule,
};
pub use format::FormatError;
pub use hash::{ContentHash, HashError};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
