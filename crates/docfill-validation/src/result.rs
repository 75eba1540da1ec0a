//! Validation outcomes
//!
//! Outcomes are plain data. A failed check is an entry in
//! [`ValidationResult::errors`], never an `Err`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Machine-readable error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    RequiredFieldMissing,
    InvalidCurrency,
    InvalidAmount,
    InvalidDate,
    ValueTooShort,
    InvalidEmail,
    PlaceholderValue,
    /// Value is not one of an enum field's options
    InvalidOption,
}

impl ErrorCode {
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::RequiredFieldMissing => "REQUIRED_FIELD_MISSING",
            ErrorCode::InvalidCurrency => "INVALID_CURRENCY",
            ErrorCode::InvalidAmount => "INVALID_AMOUNT",
            ErrorCode::InvalidDate => "INVALID_DATE",
            ErrorCode::ValueTooShort => "VALUE_TOO_SHORT",
            ErrorCode::InvalidEmail => "INVALID_EMAIL",
            ErrorCode::PlaceholderValue => "PLACEHOLDER_VALUE",
            ErrorCode::InvalidOption => "INVALID_OPTION",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Warning severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

/// Blocking problem with one field's value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field_id: String,
    /// Placeholder text of the field
    pub field: String,
    pub code: ErrorCode,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

/// Non-blocking note about one field's value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldWarning {
    pub field_id: String,
    pub field: String,
    pub message: String,
    pub severity: Severity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

/// Errors and warnings from one validation call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub errors: Vec<FieldError>,
    pub warnings: Vec<FieldWarning>,
}

impl ValidationResult {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// True when there are no errors. Warnings never block.
    #[inline]
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Whether any error carries `code`
    #[must_use]
    pub fn has_error(&self, code: ErrorCode) -> bool {
        self.errors.iter().any(|e| e.code == code)
    }

    /// First error, if any
    #[must_use]
    pub fn first_error(&self) -> Option<&FieldError> {
        self.errors.first()
    }

    /// Append another result
    pub fn merge(&mut self, other: ValidationResult) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }
}

/// Collects issues for a single field
#[derive(Debug)]
pub struct FieldReport<'a> {
    field_id: &'a str,
    field: &'a str,
    result: ValidationResult,
}

impl<'a> FieldReport<'a> {
    pub fn new(field_id: &'a str, field: &'a str) -> Self {
        Self {
            field_id,
            field,
            result: ValidationResult::new(),
        }
    }

    pub fn error(&mut self, code: ErrorCode, message: impl Into<String>, suggestion: Option<&str>) {
        self.result.errors.push(FieldError {
            field_id: self.field_id.to_string(),
            field: self.field.to_string(),
            code,
            message: message.into(),
            suggestion: suggestion.map(str::to_string),
        });
    }

    pub fn warn(&mut self, severity: Severity, message: impl Into<String>, suggestion: Option<&str>) {
        self.result.warnings.push(FieldWarning {
            field_id: self.field_id.to_string(),
            field: self.field.to_string(),
            message: message.into(),
            severity,
            suggestion: suggestion.map(str::to_string),
        });
    }

    pub fn finish(self) -> ValidationResult {
        self.result
    }
}
