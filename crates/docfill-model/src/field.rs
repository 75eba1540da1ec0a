//! Field model shared by every docfill component
//!
//! A [`Field`] is created by the parser, enriched additively by the detector,
//! and read by the validator and the conversation. [`FilledFields`] holds the
//! raw user answers keyed by field id.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

static SEPARATOR_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[_\s-]+").expect("static regex"));

/// Semantic type of a field, inferred from its label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// Free text
    #[default]
    Text,
    /// Calendar date
    Date,
    /// Monetary amount
    Currency,
    /// One of a fixed set of options
    Enum,
}

impl FieldType {
    /// Lowercase wire name
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Date => "date",
            FieldType::Currency => "currency",
            FieldType::Enum => "enum",
        }
    }

    /// True when `self` carries more information than `other`.
    ///
    /// Only `Text` is considered unspecific.
    #[inline]
    #[must_use]
    pub fn is_more_specific_than(&self, other: FieldType) -> bool {
        *self != FieldType::Text && other == FieldType::Text
    }

    /// Lexical type inference from a placeholder label
    #[must_use]
    pub fn infer_from_label(label: &str) -> FieldType {
        let lower = label.to_lowercase();
        if lower.contains("date")
            || lower.contains("day")
            || lower.contains("month")
            || lower.contains("year")
        {
            return FieldType::Date;
        }
        const CURRENCY_WORDS: [&str; 8] = [
            "amount",
            "price",
            "cost",
            "valuation",
            "cap",
            "investment",
            "purchase",
            "$",
        ];
        if CURRENCY_WORDS.iter().any(|w| lower.contains(w)) {
            return FieldType::Currency;
        }
        FieldType::Text
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldType {
    type Err = UnknownFieldType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "text" => Ok(FieldType::Text),
            "date" => Ok(FieldType::Date),
            "currency" => Ok(FieldType::Currency),
            "enum" => Ok(FieldType::Enum),
            other => Err(UnknownFieldType(other.to_string())),
        }
    }
}

/// Returned when a field type name is not recognized
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown field type: '{0}'")]
pub struct UnknownFieldType(pub String);

/// Where in the document a field was detected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FieldSource {
    /// Template-syntax tag such as `{company_name}`
    #[default]
    Structured,
    /// Bracketed placeholder such as `[Company Name]`
    Bracket,
    /// Run of underscores
    Underscore,
}

/// Kind of a validation hint attached by enrichment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    Required,
    MinLength,
    MaxLength,
    Pattern,
    Range,
    EnumChoice,
}

/// Validation hint. Advisory metadata; the validator's own rules are authoritative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationRule {
    /// Rule kind
    pub kind: RuleKind,
    /// Rule parameter (length, regex, bounds, choice list)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,
    /// Human-readable message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ValidationRule {
    /// A bare "required" rule
    #[inline]
    #[must_use]
    pub fn required() -> Self {
        Self {
            kind: RuleKind::Required,
            value: None,
            message: Some("This field is required".to_string()),
        }
    }
}

/// A detected placeholder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    /// Stable identifier, unique within one parse result
    pub id: String,
    /// Label exactly as extracted
    pub placeholder: String,
    /// Inferred semantic type
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Whether a value must be supplied before generation
    pub required: bool,
    /// Position in reading order
    pub order: usize,
    /// Detection source
    #[serde(default)]
    pub source: FieldSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub validation: Vec<ValidationRule>,
    /// Enum choices
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legal_context: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub best_practices: Vec<String>,
    /// Enrichment confidence (0.0 - 1.0)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

impl Field {
    /// Create a field with an inferred type
    #[must_use]
    pub fn new(id: impl Into<String>, placeholder: impl Into<String>, order: usize) -> Self {
        let placeholder = placeholder.into();
        Self {
            id: id.into(),
            field_type: FieldType::infer_from_label(&placeholder),
            placeholder,
            required: true,
            order,
            source: FieldSource::Structured,
            description: None,
            examples: Vec::new(),
            validation: Vec::new(),
            options: Vec::new(),
            legal_context: None,
            best_practices: Vec::new(),
            confidence: None,
        }
    }

    /// Override the inferred type
    #[inline]
    #[must_use]
    pub fn with_type(mut self, field_type: FieldType) -> Self {
        self.field_type = field_type;
        self
    }

    /// Set the required flag
    #[inline]
    #[must_use]
    pub fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Set the detection source
    #[inline]
    #[must_use]
    pub fn with_source(mut self, source: FieldSource) -> Self {
        self.source = source;
        self
    }

    /// Deduplication key for this field's placeholder
    #[inline]
    #[must_use]
    pub fn normalized_key(&self) -> String {
        normalize_key(&self.placeholder)
    }

    /// True once enrichment has attached a description
    #[inline]
    #[must_use]
    pub fn is_enriched(&self) -> bool {
        self.description.is_some()
    }
}

/// Case-fold and collapse `[_\s-]+` to a single space.
#[must_use]
pub fn normalize_key(placeholder: &str) -> String {
    SEPARATOR_RUN
        .replace_all(&placeholder.to_lowercase(), " ")
        .trim()
        .to_string()
}

/// Raw user answers keyed by field id, in insertion order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilledFields(IndexMap<String, String>);

impl FilledFields {
    /// Create empty map
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a value, returning the previous one
    pub fn insert(&mut self, field_id: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(field_id.into(), value.into())
    }

    #[inline]
    #[must_use]
    pub fn get(&self, field_id: &str) -> Option<&str> {
        self.0.get(field_id).map(String::as_str)
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, field_id: &str) -> bool {
        self.0.contains_key(field_id)
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate `(field_id, value)` pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FilledFields {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}
