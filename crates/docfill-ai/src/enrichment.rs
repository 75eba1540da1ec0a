//! Enrichment records: schema, response parsing, fallback and application
//!
//! Model output is untrusted. A response is accepted only if a JSON array can
//! be located in it, every element deserializes into [`EnrichmentRecord`],
//! and the element count equals the field count. Anything else is rejected
//! and replaced by [`fallback_enrichment`].

use crate::error::{AiResult, AiServiceError};
use docfill_document::DocumentType;
use docfill_model::{Field, FieldType, ValidationRule};
use serde::{Deserialize, Serialize};

/// Additive metadata for one field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichmentRecord {
    pub description: String,
    #[serde(default)]
    pub examples: Vec<String>,
    #[serde(default)]
    pub validation: Vec<ValidationRule>,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default, alias = "legalContext")]
    pub legal_context: Option<String>,
    #[serde(default, alias = "bestPractices")]
    pub best_practices: Vec<String>,
}

/// System instruction for batch enrichment
pub const ENRICHMENT_SYSTEM_PROMPT: &str = "You are a legal document assistant. \
Respond with a JSON array only, no commentary.";

/// One prompt covering every field, in order
#[must_use]
pub fn build_enrichment_prompt(fields: &[Field], document_text: &str, document_type: DocumentType) -> String {
    let excerpt: String = document_text.chars().take(2000).collect();
    let listing: String = fields
        .iter()
        .enumerate()
        .map(|(i, f)| format!("{}. \"{}\" (type: {})\n", i + 1, f.placeholder, f.field_type))
        .collect();

    format!(
        "Document type: {document_type}\n\
         Document excerpt:\n{excerpt}\n\n\
         Fields ({count}):\n{listing}\n\
         Return a JSON array with exactly {count} objects, one per field in the same order. \
         Each object has: \"description\" (one sentence), \"examples\" (2-3 realistic values), \
         \"validation\" (array of {{\"kind\", \"value\", \"message\"}} where kind is one of \
         required, min_length, max_length, pattern, range, enum_choice), and optionally \
         \"options\", \"legal_context\" and \"best_practices\".",
        count = fields.len()
    )
}

/// Slice out the outermost JSON array, tolerating fences and prose
fn locate_array(text: &str) -> Option<&str> {
    let start = text.find('[')?;
    let end = text.rfind(']')?;
    (end > start).then(|| &text[start..=end])
}

/// Decode and check a model response.
///
/// # Errors
/// - `InvalidResponse` when no array is present or it does not decode
/// - `Schema` when the count differs from `expected` or a description is blank
pub fn parse_enrichment_response(text: &str, expected: usize) -> AiResult<Vec<EnrichmentRecord>> {
    let array = locate_array(text)
        .ok_or_else(|| AiServiceError::InvalidResponse("no JSON array in response".to_string()))?;
    let records: Vec<EnrichmentRecord> = serde_json::from_str(array)?;

    if records.len() != expected {
        return Err(AiServiceError::Schema(format!(
            "expected {expected} records, got {}",
            records.len()
        )));
    }
    if let Some(i) = records.iter().position(|r| r.description.trim().is_empty()) {
        return Err(AiServiceError::Schema(format!("record {i} has an empty description")));
    }
    Ok(records)
}

/// Deterministic enrichment from the field's type alone
#[must_use]
pub fn fallback_enrichment(field: &Field) -> EnrichmentRecord {
    let examples: Vec<String> = match field.field_type {
        FieldType::Currency => vec!["$50,000", "$100,000", "$250,000"],
        FieldType::Date => vec!["January 15, 2024", "March 1, 2024"],
        FieldType::Enum if !field.options.is_empty() => {
            field.options.iter().take(3).map(String::as_str).collect()
        }
        FieldType::Text | FieldType::Enum => vec!["Acme Inc.", "Jane Smith"],
    }
    .into_iter()
    .map(str::to_string)
    .collect();

    EnrichmentRecord {
        description: format!("Enter the {}", field.placeholder),
        examples,
        validation: if field.required {
            vec![ValidationRule::required()]
        } else {
            Vec::new()
        },
        options: Vec::new(),
        legal_context: None,
        best_practices: Vec::new(),
    }
}

/// Merge a record into a field without touching identity, type or order
pub fn apply_enrichment(field: &mut Field, record: &EnrichmentRecord, confidence: f64) {
    field.description = Some(record.description.clone());
    field.examples = record.examples.clone();
    for rule in &record.validation {
        if !field.validation.contains(rule) {
            field.validation.push(rule.clone());
        }
    }
    if field.options.is_empty() {
        field.options = record.options.clone();
    }
    if record.legal_context.is_some() {
        field.legal_context = record.legal_context.clone();
    }
    if !record.best_practices.is_empty() {
        field.best_practices = record.best_practices.clone();
    }
    field.confidence = Some(confidence);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const TWO_RECORDS: &str = r#"[
        {"description": "Legal name of the company", "examples": ["Acme Inc."],
         "validation": [{"kind": "required"}]},
        {"description": "Amount invested", "examples": ["$100,000"], "legalContext": "SAFE purchase"}
    ]"#;

    #[test]
    fn parses_plain_array() {
        let records = parse_enrichment_response(TWO_RECORDS, 2).unwrap();
        assert_eq!(records[1].legal_context.as_deref(), Some("SAFE purchase"));
    }

    #[test]
    fn tolerates_fences_and_prose() {
        let wrapped = format!("Sure! Here you go:\n```json\n{TWO_RECORDS}\n```\nAnything else?");
        assert_eq!(parse_enrichment_response(&wrapped, 2).unwrap().len(), 2);
    }

    #[test]
    fn count_mismatch_is_schema_error() {
        assert!(matches!(
            parse_enrichment_response(TWO_RECORDS, 3),
            Err(AiServiceError::Schema(_))
        ));
    }

    #[test]
    fn wrong_shape_is_rejected() {
        assert!(matches!(
            parse_enrichment_response(r#"[{"examples": []}]"#, 1),
            Err(AiServiceError::InvalidResponse(_))
        ));
        assert!(matches!(
            parse_enrichment_response(r#"[{"description": "  "}]"#, 1),
            Err(AiServiceError::Schema(_))
        ));
        assert!(parse_enrichment_response("no array here", 1).is_err());
    }

    #[test]
    fn fallback_by_type() {
        let amount = Field::new("a", "Purchase Amount", 0);
        let record = fallback_enrichment(&amount);
        assert_eq!(record.examples[1], "$100,000");
        assert_eq!(record.validation, vec![ValidationRule::required()]);

        let blank = Field::new("b", "Blank_1", 1).with_required(false);
        assert!(fallback_enrichment(&blank).validation.is_empty());
    }

    #[test]
    fn apply_is_additive() {
        let mut field = Field::new("1", "Company Name", 0);
        let before = field.clone();
        let records = parse_enrichment_response(TWO_RECORDS, 2).unwrap();
        apply_enrichment(&mut field, &records[0], 0.9);

        assert_eq!(field.id, before.id);
        assert_eq!(field.field_type, before.field_type);
        assert_eq!(field.order, before.order);
        assert_eq!(field.description.as_deref(), Some("Legal name of the company"));
        assert_eq!(field.confidence, Some(0.9));
    }

    #[test]
    fn prompt_lists_every_field() {
        let fields = vec![Field::new("1", "Company Name", 0), Field::new("2", "Purchase Amount", 1)];
        let prompt = build_enrichment_prompt(&fields, "text", DocumentType::Safe);
        assert!(prompt.contains("1. \"Company Name\" (type: text)"));
        assert!(prompt.contains("2. \"Purchase Amount\" (type: currency)"));
        assert!(prompt.contains("exactly 2 objects"));
    }
}
