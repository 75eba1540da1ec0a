//! Docfill Document Layer
//!
//! The boundary between `.docx` bytes and the typed field model.
//!
//! # Core Operations
//!
//! - **Ingress**: [`parse`] a template buffer into a [`ParsedDocument`]
//! - **Cleanup**: [`smart_deduplication`] collapses label variants
//! - **Egress**: [`generate`] renders values back into the original container
//!
//! # Architecture
//!
//! ```text
//! bytes → DocxContainer → text → tokens → Field[] → dedup
//!            ↓                                  ↓
//!        render(data) ← transform(values) ← FilledFields
//!            ↓
//!          bytes
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use docfill_document::{generate, parse, GenerateOptions, ValueMap};
//!
//! let parsed = parse(&template)?;
//! let mut values = ValueMap::new();
//! for field in &parsed.fields {
//!     values.insert(field.placeholder.clone(), "value".to_string());
//! }
//! let doc = generate(&template, &values, &GenerateOptions::default())?;
//! std::fs::write("out.docx", &doc.buffer)?;
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod container;
pub mod error;
pub mod generator;
pub mod parser;
pub mod template;
mod wordml;

pub use container::{DocxContainer, DOCUMENT_PART};
pub use error::{ContainerError, DocumentError, DocumentResult, GenerationError, ParseError};
pub use generator::{
    find_missing_tags, generate, transform_for_legal_formatting, AuditAction, AuditEntry,
    GenerateOptions, GeneratedDocument, GenerationMetadata, ValueMap,
};
pub use parser::{
    detect_document_type, merge_fields, parse, smart_deduplication, DocumentMetadata,
    DocumentParser, DocumentType, ParsedDocument, DEFAULT_MAX_DOCUMENT_BYTES,
};
pub use template::{leaf_tags, Bindings, TemplateData};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for parsing and generating documents
    pub use crate::error::{DocumentError, GenerationError, ParseError};
    pub use crate::generator::{generate, GenerateOptions, GeneratedDocument, ValueMap};
    pub use crate::parser::{parse, smart_deduplication, DocumentType, ParsedDocument};
    pub use docfill_model::{Field, FieldType, FilledFields};
}

#[cfg(test)]
mod integration_tests {
    use super::*;
    use docfill_test_utils::DocxBuilder;
    use pretty_assertions::assert_eq;

    #[test]
    fn parse_then_generate_with_brackets_and_blanks() {
        let template = DocxBuilder::new()
            .paragraph("Agreement between [Company Name] and {investor_name}.")
            .paragraph("Signed: ________")
            .build();
        let parsed = parse(&template).unwrap();

        let values: ValueMap = parsed
            .fields
            .iter()
            .map(|f| {
                let value = match f.placeholder.as_str() {
                    "investor_name" => "Jane Roe",
                    "Company Name" => "Acme Inc.",
                    _ => "J. Roe",
                };
                (f.placeholder.clone(), value.to_string())
            })
            .collect();

        let doc = generate(&template, &values, &GenerateOptions::default()).unwrap();
        let text = DocxContainer::from_bytes(&doc.buffer)
            .unwrap()
            .extract_text()
            .unwrap();
        assert_eq!(text, "Agreement between Acme Inc. and Jane Roe.\nSigned: J. Roe");
    }

    #[test]
    fn split_run_tags_parse_and_render() {
        let template = DocxBuilder::new()
            .paragraph_runs(&["Valuation cap: {valuation", "_cap_formatted}"])
            .build();
        let parsed = parse(&template).unwrap();
        assert_eq!(parsed.fields.len(), 1);
        assert_eq!(parsed.fields[0].placeholder, "valuation_cap_formatted");

        let mut values = ValueMap::new();
        values.insert("valuation_cap".to_string(), "5000000".to_string());
        let doc = generate(&template, &values, &GenerateOptions::default()).unwrap();
        let text = DocxContainer::from_bytes(&doc.buffer)
            .unwrap()
            .extract_text()
            .unwrap();
        assert_eq!(text, "Valuation cap: $5,000,000");
    }
}
