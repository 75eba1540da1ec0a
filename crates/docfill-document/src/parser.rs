//! Template parsing: buffer → typed, deduplicated field list
//!
//! # Example
//!
//! ```rust,ignore
//! let parsed = DocumentParser::default().parse(&buffer)?;
//! for field in &parsed.fields {
//!     println!("{} ({})", field.placeholder, field.field_type);
//! }
//! ```

use crate::container::DocxContainer;
use crate::error::ParseError;
use crate::template::{blank_name, tokenize, TokenKind};
use docfill_model::{ContentHash, Field, FieldSource, FieldType};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Default upper bound on template size (10 MiB)
pub const DEFAULT_MAX_DOCUMENT_BYTES: usize = 10 * 1024 * 1024;

/// Coarse template classification used in enrichment cache keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    Safe,
    Nda,
    Employment,
    Lease,
    PurchaseAgreement,
    #[default]
    Generic,
}

impl DocumentType {
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::Safe => "safe",
            DocumentType::Nda => "nda",
            DocumentType::Employment => "employment",
            DocumentType::Lease => "lease",
            DocumentType::PurchaseAgreement => "purchase_agreement",
            DocumentType::Generic => "generic",
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a document by keyword presence. First match wins.
#[must_use]
pub fn detect_document_type(text: &str) -> DocumentType {
    let lower = text.to_lowercase();
    let has = |words: &[&str]| words.iter().any(|w| lower.contains(w));

    if has(&["simple agreement for future equity", "safe", "valuation cap"]) {
        DocumentType::Safe
    } else if has(&["non-disclosure", "nondisclosure", "confidential information"]) {
        DocumentType::Nda
    } else if has(&["employment", "employee", "employer"]) {
        DocumentType::Employment
    } else if has(&["lease", "landlord", "tenant"]) {
        DocumentType::Lease
    } else if has(&["purchase agreement", "buyer", "seller"]) {
        DocumentType::PurchaseAgreement
    } else {
        DocumentType::Generic
    }
}

/// Text statistics and identity of a parsed template
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub word_count: usize,
    pub character_count: usize,
    /// Hash of the original buffer
    pub fingerprint: ContentHash,
    pub document_type: DocumentType,
}

/// Parse-time snapshot of a template
#[derive(Debug, Clone)]
pub struct ParsedDocument {
    /// Original bytes, kept for regeneration
    pub buffer: Vec<u8>,
    /// Extracted visible text, one line per paragraph
    pub text: String,
    /// Template-tag fields before merging
    pub structured_fields: Vec<Field>,
    /// Bracket and underscore fields before merging
    pub unstructured_fields: Vec<Field>,
    /// Merged and deduplicated fields in reading order
    pub fields: Vec<Field>,
    pub metadata: DocumentMetadata,
}

/// Parser with a size limit
#[derive(Debug, Clone)]
pub struct DocumentParser {
    max_document_bytes: usize,
}

impl Default for DocumentParser {
    fn default() -> Self {
        Self {
            max_document_bytes: DEFAULT_MAX_DOCUMENT_BYTES,
        }
    }
}

impl DocumentParser {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum accepted buffer size
    #[inline]
    #[must_use]
    pub fn with_max_document_bytes(mut self, max: usize) -> Self {
        self.max_document_bytes = max;
        self
    }

    /// Parse a template buffer. All-or-nothing.
    ///
    /// # Errors
    /// - `ParseError::Empty` for an empty buffer
    /// - `ParseError::TooLarge` above the configured limit
    /// - `ParseError::Container` if the buffer is not a readable document
    pub fn parse(&self, buffer: &[u8]) -> Result<ParsedDocument, ParseError> {
        if buffer.is_empty() {
            return Err(ParseError::Empty);
        }
        if buffer.len() > self.max_document_bytes {
            return Err(ParseError::TooLarge {
                size: buffer.len(),
                max: self.max_document_bytes,
            });
        }

        let container = DocxContainer::from_bytes(buffer)?;
        let text = container.extract_text()?;

        let structured_fields = extract_structured_fields(&text);
        let unstructured_fields = extract_unstructured_fields(&text);
        let merged = merge_fields(&structured_fields, &unstructured_fields);
        let fields = smart_deduplication(merged);

        let metadata = DocumentMetadata {
            word_count: text.split_whitespace().count(),
            character_count: text.chars().count(),
            fingerprint: ContentHash::fingerprint(buffer),
            document_type: detect_document_type(&text),
        };

        tracing::info!(
            fingerprint = %metadata.fingerprint.short(),
            fields = fields.len(),
            structured = structured_fields.len(),
            unstructured = unstructured_fields.len(),
            document_type = %metadata.document_type,
            "parsed template"
        );

        Ok(ParsedDocument {
            buffer: buffer.to_vec(),
            text,
            structured_fields,
            unstructured_fields,
            fields,
            metadata,
        })
    }
}

/// Parse with default limits
///
/// # Errors
/// See [`DocumentParser::parse`]
pub fn parse(buffer: &[u8]) -> Result<ParsedDocument, ParseError> {
    DocumentParser::default().parse(buffer)
}

/// Leaf `{tag}` fields, unique by name, first-seen order, all required
#[must_use]
pub fn extract_structured_fields(text: &str) -> Vec<Field> {
    let mut seen = HashSet::new();
    let mut fields = Vec::new();
    for token in tokenize(text) {
        if let TokenKind::Value(name) = token.kind {
            if seen.insert(name.clone()) {
                let order = fields.len();
                fields.push(Field::new(name.clone(), name, order));
            }
        }
    }
    fields
}

/// Bracket labels (required, unique by label) and underscore blanks
/// (optional, `Blank_N`)
#[must_use]
pub fn extract_unstructured_fields(text: &str) -> Vec<Field> {
    let mut seen = HashSet::new();
    let mut fields = Vec::new();
    let mut blanks = 0;
    for token in tokenize(text) {
        let order = fields.len();
        match token.kind {
            TokenKind::Bracket(label) => {
                if seen.insert(label.clone()) {
                    fields.push(Field::new(label.clone(), label, order).with_source(FieldSource::Bracket));
                }
            }
            TokenKind::Blank => {
                blanks += 1;
                let name = blank_name(blanks);
                fields.push(
                    Field::new(name.clone(), name, order)
                        .with_type(FieldType::Text)
                        .with_required(false)
                        .with_source(FieldSource::Underscore),
                );
            }
            _ => {}
        }
    }
    fields
}

/// Structured fields first; an unstructured field whose trimmed, case-folded
/// label matches a structured one is dropped. Orders are renumbered.
#[must_use]
pub fn merge_fields(structured: &[Field], unstructured: &[Field]) -> Vec<Field> {
    let taken: HashSet<String> = structured
        .iter()
        .map(|f| f.placeholder.trim().to_lowercase())
        .collect();

    structured
        .iter()
        .cloned()
        .chain(
            unstructured
                .iter()
                .filter(|f| !taken.contains(&f.placeholder.trim().to_lowercase()))
                .cloned(),
        )
        .enumerate()
        .map(|(order, mut field)| {
            field.order = order;
            field
        })
        .collect()
}

/// Collapse fields whose placeholders normalize to the same key.
///
/// The first occurrence keeps its slot; a later duplicate replaces it only
/// when its type is more specific. Orders are renumbered, so applying this
/// twice equals applying it once.
#[must_use]
pub fn smart_deduplication(fields: Vec<Field>) -> Vec<Field> {
    let mut by_key: IndexMap<String, Field> = IndexMap::with_capacity(fields.len());
    for field in fields {
        let key = field.normalized_key();
        match by_key.get_mut(&key) {
            Some(existing) => {
                if field.field_type.is_more_specific_than(existing.field_type) {
                    tracing::debug!(
                        placeholder = %field.placeholder,
                        from = %existing.field_type,
                        to = %field.field_type,
                        "dedup promoted field type"
                    );
                    *existing = field;
                }
            }
            None => {
                by_key.insert(key, field);
            }
        }
    }

    by_key
        .into_values()
        .enumerate()
        .map(|(order, mut field)| {
            field.order = order;
            field
        })
        .collect()
}
