//! Document generation: template + values → filled document
//!
//! Values are first expanded with legal-formatting siblings
//! (`{key}_formatted`, `{key}_words`), then every leaf tag of the template is
//! checked for a binding before anything is rendered.

use crate::container::DocxContainer;
use crate::error::GenerationError;
use crate::template::{leaf_tags, render, Bindings, TemplateData};
use chrono::{DateTime, Local, Utc};
use docfill_model::format::{
    currency_to_words, format_currency, format_legal_date, number_to_words, parse_currency,
    CurrencyOptions, DateOptions,
};
use docfill_model::{ContentHash, FieldType};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Key injected with today's date in long form
pub const CURRENT_DATE_KEY: &str = "current_date";
/// Key injected with a fresh document identifier
pub const DOCUMENT_ID_KEY: &str = "document_id";

/// Raw values keyed by template tag or placeholder, in fill order
pub type ValueMap = IndexMap<String, String>;

/// Generation options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateOptions {
    /// Deflate level 0-9; 0 stores entries uncompressed
    pub compression_level: u32,
    /// Attach an audit log to the result
    pub include_audit_log: bool,
    /// Suggested output file name, carried into metadata
    pub output_name: Option<String>,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            compression_level: 6,
            include_audit_log: true,
            output_name: None,
        }
    }
}

impl GenerateOptions {
    #[inline]
    #[must_use]
    pub fn with_compression_level(mut self, level: u32) -> Self {
        self.compression_level = level.min(9);
        self
    }

    #[inline]
    #[must_use]
    pub fn with_audit_log(mut self, enabled: bool) -> Self {
        self.include_audit_log = enabled;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_output_name(mut self, name: impl Into<String>) -> Self {
        self.output_name = Some(name.into());
        self
    }
}

/// Audit actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    FieldFilled,
    DocumentGenerated,
}

/// One audit log line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub action: AuditAction,
    /// Field name for `field_filled`
    pub field: Option<String>,
    /// New value for `field_filled`
    pub value: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// Generation statistics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationMetadata {
    pub generated_at: DateTime<Utc>,
    pub duration_ms: u64,
    /// Number of input values
    pub field_count: usize,
    pub size_bytes: usize,
    /// SHA-256 of the output buffer
    pub checksum: ContentHash,
    pub output_name: Option<String>,
}

/// A rendered document
#[derive(Debug, Clone)]
pub struct GeneratedDocument {
    pub buffer: Vec<u8>,
    pub metadata: GenerationMetadata,
    pub audit_log: Option<Vec<AuditEntry>>,
    /// Transformed data the template was bound with
    pub data: TemplateData,
}

/// Expand raw values with formatted siblings.
///
/// Every raw value is kept under its own key. Currency-like keys (or values
/// containing `$`) gain `{key}_formatted` and `{key}_words`; date-like keys
/// gain `{key}_formatted`; plain integers gain `{key}_words`. Siblings are
/// only added when the value actually parses. `current_date` and
/// `document_id` are injected unless already supplied.
#[must_use]
pub fn transform_for_legal_formatting(values: &ValueMap) -> TemplateData {
    let mut data = TemplateData::new();

    for (key, value) in values {
        data.insert(key.clone(), value.clone());
        let label_type = FieldType::infer_from_label(key);

        if value.contains('$') || label_type == FieldType::Currency {
            if let Ok(amount) = parse_currency(value) {
                if let Ok(formatted) = format_currency(amount, CurrencyOptions::default()) {
                    data.insert(format!("{key}_formatted"), formatted);
                }
                if let Ok(words) = currency_to_words(amount) {
                    data.insert(format!("{key}_words"), words);
                }
            }
        } else if label_type == FieldType::Date {
            if let Ok(formatted) = format_legal_date(value.as_str(), DateOptions::default()) {
                data.insert(format!("{key}_formatted"), formatted);
            }
        } else if let Ok(number) = value.trim().parse::<u64>() {
            data.insert(format!("{key}_words"), number_to_words(number));
        }
    }

    data.entry(CURRENT_DATE_KEY.to_string())
        .or_insert_with(|| Local::now().format("%B %-d, %Y").to_string());
    data.entry(DOCUMENT_ID_KEY.to_string())
        .or_insert_with(|| uuid::Uuid::new_v4().to_string());
    data
}

/// Leaf tags of the template with no usable binding in `data`
#[must_use]
pub fn find_missing_tags(template_text: &str, data: &TemplateData) -> Vec<String> {
    let bindings = Bindings::new(data);
    leaf_tags(template_text)
        .into_iter()
        .filter(|tag| bindings.get(tag).map_or(true, |v| v.trim().is_empty()))
        .collect()
}

/// Render `values` into `template`.
///
/// # Errors
/// - `GenerationError::InvalidTemplate` if the template cannot be opened
/// - `GenerationError::MissingTags` listing every unbound leaf tag; nothing is rendered
/// - `GenerationError::Render` / `GenerationError::Serialize` on output failures
pub fn generate(
    template: &[u8],
    values: &ValueMap,
    options: &GenerateOptions,
) -> Result<GeneratedDocument, GenerationError> {
    let started = Instant::now();

    let container = DocxContainer::from_bytes(template).map_err(GenerationError::InvalidTemplate)?;
    let template_text = container
        .extract_text()
        .map_err(GenerationError::InvalidTemplate)?;

    let data = transform_for_legal_formatting(values);

    let missing = find_missing_tags(&template_text, &data);
    if !missing.is_empty() {
        tracing::warn!(missing = ?missing, "generation blocked by unbound tags");
        return Err(GenerationError::MissingTags { tags: missing });
    }

    let outcome = render(&container, &data).map_err(|e| GenerationError::Render(e.to_string()))?;
    if !outcome.unbound_tags.is_empty() {
        tracing::warn!(tags = ?outcome.unbound_tags, "rendered with missing markers");
    }

    let buffer = outcome
        .container
        .to_bytes(options.compression_level)
        .map_err(GenerationError::Serialize)?;

    let generated_at = Utc::now();
    let metadata = GenerationMetadata {
        generated_at,
        duration_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
        field_count: values.len(),
        size_bytes: buffer.len(),
        checksum: ContentHash::checksum(&buffer),
        output_name: options.output_name.clone(),
    };

    let audit_log = options.include_audit_log.then(|| {
        let mut log: Vec<AuditEntry> = values
            .iter()
            .map(|(field, value)| AuditEntry {
                action: AuditAction::FieldFilled,
                field: Some(field.clone()),
                value: Some(value.clone()),
                timestamp: generated_at,
            })
            .collect();
        log.push(AuditEntry {
            action: AuditAction::DocumentGenerated,
            field: None,
            value: None,
            timestamp: generated_at,
        });
        log
    });

    tracing::info!(
        fields = metadata.field_count,
        size_bytes = metadata.size_bytes,
        checksum = %metadata.checksum.short(),
        duration_ms = metadata.duration_ms,
        "generated document"
    );

    Ok(GeneratedDocument {
        buffer,
        metadata,
        audit_log,
        data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use docfill_test_utils::DocxBuilder;
    use pretty_assertions::assert_eq;

    fn values(pairs: &[(&str, &str)]) -> ValueMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn safe_template() -> Vec<u8> {
        DocxBuilder::new()
            .paragraph("Company: {company_name}")
            .paragraph("Investor: {investor_name}")
            .paragraph("Amount: {purchase_amount_formatted} ({purchase_amount_words})")
            .build()
    }

    #[test]
    fn transform_adds_currency_siblings() {
        let data = transform_for_legal_formatting(&values(&[("purchase_amount", "$100,000")]));
        assert_eq!(data["purchase_amount"], "$100,000");
        assert_eq!(data["purchase_amount_formatted"], "$100,000");
        assert_eq!(data["purchase_amount_words"], "One hundred thousand dollars");
        assert!(data.contains_key(CURRENT_DATE_KEY));
        assert!(data.contains_key(DOCUMENT_ID_KEY));
    }

    #[test]
    fn transform_adds_date_and_number_siblings() {
        let data = transform_for_legal_formatting(&values(&[
            ("effective_date", "1/15/2024"),
            ("share_count", "42"),
            ("company_name", "Acme"),
        ]));
        assert_eq!(data["effective_date_formatted"], "January 15, 2024");
        assert_eq!(data["share_count_words"], "Forty-two");
        assert!(!data.contains_key("company_name_formatted"));
    }

    #[test]
    fn transform_keeps_caller_document_id() {
        let data = transform_for_legal_formatting(&values(&[(DOCUMENT_ID_KEY, "DOC-1")]));
        assert_eq!(data[DOCUMENT_ID_KEY], "DOC-1");
    }

    #[test]
    fn missing_tag_blocks_generation() {
        let template = DocxBuilder::new()
            .paragraph("Hello {name}, see {missing_field}")
            .build();
        let err = generate(&template, &values(&[("name", "Ada")]), &GenerateOptions::default())
            .unwrap_err();
        assert_eq!(err.code(), "MISSING_TAGS");
        assert_eq!(err.missing_tags(), ["missing_field".to_string()]);
    }

    #[test]
    fn empty_values_count_as_missing() {
        let template = DocxBuilder::new().paragraph("{name}").build();
        let err = generate(&template, &values(&[("name", "  ")]), &GenerateOptions::default())
            .unwrap_err();
        assert_eq!(err.missing_tags(), ["name".to_string()]);
    }

    #[test]
    fn tag_variants_are_bound_by_normalized_key() {
        let template = DocxBuilder::new()
            .paragraph("{company_name} and {Company Name}")
            .build();
        let doc = generate(&template, &values(&[("Company Name", "Acme Inc.")]), &GenerateOptions::default())
            .unwrap();
        let text = DocxContainer::from_bytes(&doc.buffer).unwrap().extract_text().unwrap();
        assert_eq!(text, "Acme Inc. and Acme Inc.");
    }

    #[test]
    fn corrupt_template_is_distinct_from_missing_tags() {
        let err = generate(b"garbage", &ValueMap::new(), &GenerateOptions::default()).unwrap_err();
        assert_eq!(err.code(), "TEMPLATE_INVALID");
    }

    #[test]
    fn generates_filled_document() {
        let template = safe_template();
        let doc = generate(
            &template,
            &values(&[
                ("company_name", "Acme Inc."),
                ("investor_name", "John Doe"),
                ("purchase_amount", "$100,000"),
            ]),
            &GenerateOptions::default().with_output_name("safe.docx"),
        )
        .unwrap();

        let text = DocxContainer::from_bytes(&doc.buffer)
            .unwrap()
            .extract_text()
            .unwrap();
        assert_eq!(
            text,
            "Company: Acme Inc.\nInvestor: John Doe\nAmount: $100,000 (One hundred thousand dollars)"
        );
        assert_eq!(doc.metadata.field_count, 3);
        assert_eq!(doc.metadata.size_bytes, doc.buffer.len());
        assert_eq!(doc.metadata.checksum, ContentHash::checksum(&doc.buffer));
        assert_eq!(doc.metadata.output_name.as_deref(), Some("safe.docx"));
    }

    #[test]
    fn checksum_is_deterministic_for_identical_input() {
        let template = safe_template();
        let input = values(&[
            ("company_name", "Acme Inc."),
            ("investor_name", "John Doe"),
            ("purchase_amount", "$100,000"),
        ]);
        let a = generate(&template, &input, &GenerateOptions::default()).unwrap();
        let b = generate(&template, &input, &GenerateOptions::default()).unwrap();
        assert_eq!(a.metadata.checksum, b.metadata.checksum);

        let other = values(&[
            ("company_name", "Other LLC"),
            ("investor_name", "John Doe"),
            ("purchase_amount", "$100,000"),
        ]);
        let c = generate(&template, &other, &GenerateOptions::default()).unwrap();
        assert_ne!(a.metadata.checksum, c.metadata.checksum);
    }

    #[test]
    fn audit_log_is_ordered_and_optional() {
        let template = DocxBuilder::new().paragraph("{a} {b}").build();
        let input = values(&[("b", "2"), ("a", "1")]);

        let doc = generate(&template, &input, &GenerateOptions::default()).unwrap();
        let log = doc.audit_log.unwrap();
        assert_eq!(log.len(), 3);
        assert_eq!(log[0].field.as_deref(), Some("b"));
        assert_eq!(log[1].field.as_deref(), Some("a"));
        assert_eq!(log[2].action, AuditAction::DocumentGenerated);

        let quiet = generate(&template, &input, &GenerateOptions::default().with_audit_log(false)).unwrap();
        assert!(quiet.audit_log.is_none());
    }

    #[test]
    fn non_text_parts_survive_regeneration() {
        let template = DocxBuilder::new()
            .paragraph("{x}")
            .part("word/styles.xml", b"<w:styles/>".to_vec())
            .build();
        let doc = generate(&template, &values(&[("x", "y")]), &GenerateOptions::default()).unwrap();
        let before = DocxContainer::from_bytes(&template).unwrap();
        let after = DocxContainer::from_bytes(&doc.buffer).unwrap();
        assert_eq!(before.part_names(), after.part_names());
        assert_eq!(after.part_str("word/styles.xml").unwrap(), "<w:styles/>");
    }
}
