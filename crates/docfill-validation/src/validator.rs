//! Field validators
//!
//! [`FieldValidator`] owns the per-field flow shared by every variant:
//! baseline emptiness check, dispatch by type, then domain rules keyed by the
//! placeholder name. Variants only supply the type and domain checks.
//!
//! - [`LegalValidator`]: final gating before generation
//! - [`ConversationalValidator`]: per-turn checks with friendlier thresholds

use crate::result::{ErrorCode, FieldReport, Severity, ValidationResult};
use crate::rules::{
    is_common_state, is_email_shaped, is_entity_name_field, is_placeholder_echo, looks_like_date,
    mentions_us_state, names_state, CURRENCY_SUGGESTION, DATE_SUGGESTION, DELAWARE_SUGGESTION,
};
use chrono::{Local, NaiveDate};
use docfill_model::format::{parse_currency, parse_flexible_date};
use docfill_model::{Field, FieldType, FilledFields};

/// Per-field validation flow.
///
/// Implementors provide the type-specific and domain checks;
/// [`FieldValidator::validate_value`] enforces the shared order.
pub trait FieldValidator {
    fn check_currency(&self, report: &mut FieldReport<'_>, value: &str);

    fn check_date(&self, report: &mut FieldReport<'_>, value: &str);

    fn check_text(&self, report: &mut FieldReport<'_>, field: &Field, value: &str);

    fn check_domain(&self, report: &mut FieldReport<'_>, field: &Field, value: &str);

    /// Validate one candidate value (`None` when the user gave nothing)
    fn validate_value(&self, field: &Field, value: Option<&str>) -> ValidationResult {
        let mut report = FieldReport::new(&field.id, &field.placeholder);
        let value = value.map(str::trim).filter(|v| !v.is_empty());

        let Some(value) = value else {
            if field.required {
                report.error(
                    ErrorCode::RequiredFieldMissing,
                    format!("{} is required", field.placeholder),
                    Some(&format!("Please provide a value for {}", field.placeholder)),
                );
            }
            return report.finish();
        };

        match field.field_type {
            FieldType::Currency => self.check_currency(&mut report, value),
            FieldType::Date => self.check_date(&mut report, value),
            FieldType::Text => self.check_text(&mut report, field, value),
            FieldType::Enum => check_enum(&mut report, field, value),
        }
        self.check_domain(&mut report, field, value);
        report.finish()
    }

    /// Validate every field against a value map keyed by field id
    fn validate(&self, fields: &[Field], filled: &FilledFields) -> ValidationResult {
        let mut result = ValidationResult::new();
        for field in fields {
            result.merge(self.validate_value(field, filled.get(&field.id)));
        }
        tracing::debug!(
            fields = fields.len(),
            errors = result.errors.len(),
            warnings = result.warnings.len(),
            "validated fields"
        );
        result
    }
}

fn check_enum(report: &mut FieldReport<'_>, field: &Field, value: &str) {
    if field.options.is_empty() {
        return;
    }
    let lower = value.to_lowercase();
    if !field.options.iter().any(|o| o.to_lowercase() == lower) {
        report.error(
            ErrorCode::InvalidOption,
            format!("'{value}' is not one of the allowed options"),
            Some(&format!("Choose one of: {}", field.options.join(", "))),
        );
    }
}

fn check_email(report: &mut FieldReport<'_>, field: &Field, value: &str) {
    if field.placeholder.to_lowercase().contains("email") && !is_email_shaped(value) {
        report.error(
            ErrorCode::InvalidEmail,
            "Please enter a valid email address",
            Some("Example: name@company.com"),
        );
    }
}

fn check_placeholder_echo(report: &mut FieldReport<'_>, field: &Field, value: &str) {
    if is_entity_name_field(&field.placeholder.to_lowercase()) && is_placeholder_echo(value, &field.placeholder) {
        report.error(
            ErrorCode::PlaceholderValue,
            format!("Please enter the actual {}, not the placeholder text", field.placeholder),
            Some("Example: Acme Inc."),
        );
    }
}

/// Shared currency parse with `INVALID_CURRENCY` / `INVALID_AMOUNT`
fn parse_positive_amount(report: &mut FieldReport<'_>, value: &str) -> Option<f64> {
    let Ok(amount) = parse_currency(value) else {
        report.error(
            ErrorCode::InvalidCurrency,
            format!("'{value}' is not a valid amount"),
            Some(CURRENCY_SUGGESTION),
        );
        return None;
    };
    if amount <= 0.0 {
        report.error(
            ErrorCode::InvalidAmount,
            "Amount must be greater than zero",
            Some(CURRENCY_SUGGESTION),
        );
        return None;
    }
    Some(amount)
}

/// Legal-grade validator used before generation
#[derive(Debug, Clone)]
pub struct LegalValidator {
    /// Amounts above this produce a warning
    pub large_amount_warning: f64,
    /// Text longer than this (in chars) produces a warning
    pub long_text_warning: usize,
    /// Valuation caps below this produce a warning
    pub min_valuation_cap: f64,
    /// Dates further than this from today produce a warning
    pub date_window_days: i64,
    today: Option<NaiveDate>,
}

impl Default for LegalValidator {
    fn default() -> Self {
        Self {
            large_amount_warning: 1e8,
            long_text_warning: 500,
            min_valuation_cap: 1_000_000.0,
            date_window_days: 365,
            today: None,
        }
    }
}

impl LegalValidator {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fix "today" for the date-window check
    #[inline]
    #[must_use]
    pub fn with_reference_date(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Local::now().date_naive())
    }
}

impl FieldValidator for LegalValidator {
    fn check_currency(&self, report: &mut FieldReport<'_>, value: &str) {
        if let Some(amount) = parse_positive_amount(report, value) {
            if amount > self.large_amount_warning {
                report.warn(
                    Severity::Medium,
                    "This amount is unusually large, please double-check it",
                    None,
                );
            }
        }
    }

    fn check_date(&self, report: &mut FieldReport<'_>, value: &str) {
        match parse_flexible_date(value) {
            Ok(date) => {
                let distance = (date - self.today()).num_days().abs();
                if distance > self.date_window_days {
                    report.warn(
                        Severity::Low,
                        "This date is more than a year from today",
                        Some("Confirm the date is intentional"),
                    );
                }
            }
            Err(_) => report.error(
                ErrorCode::InvalidDate,
                format!("'{value}' is not a recognizable date"),
                Some(DATE_SUGGESTION),
            ),
        }
    }

    fn check_text(&self, report: &mut FieldReport<'_>, field: &Field, value: &str) {
        let length = value.chars().count();
        if length < 2 {
            report.error(
                ErrorCode::ValueTooShort,
                "Value must be at least 2 characters",
                None,
            );
        } else if length > self.long_text_warning {
            report.warn(Severity::Low, "This value is very long", Some("Consider shortening it"));
        }
        check_email(report, field, value);
    }

    fn check_domain(&self, report: &mut FieldReport<'_>, field: &Field, value: &str) {
        let name = field.placeholder.to_lowercase();

        if names_state(&field.placeholder) && name.contains("incorporation") && !is_common_state(value) {
            report.warn(
                Severity::Low,
                format!("{value} is an uncommon state of incorporation"),
                Some(DELAWARE_SUGGESTION),
            );
        }

        if name.contains("valuation") && name.contains("cap") {
            if let Ok(amount) = parse_currency(value) {
                if amount > 0.0 && amount < self.min_valuation_cap {
                    report.warn(
                        Severity::Medium,
                        "Valuation caps are typically at least $1,000,000",
                        None,
                    );
                }
            }
        }

        check_placeholder_echo(report, field, value);
    }
}

/// Lenient validator used on each conversational turn
#[derive(Debug, Clone)]
pub struct ConversationalValidator {
    /// Amounts above this produce a warning
    pub large_amount_warning: f64,
}

impl Default for ConversationalValidator {
    fn default() -> Self {
        Self {
            large_amount_warning: 1e12,
        }
    }
}

impl ConversationalValidator {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl FieldValidator for ConversationalValidator {
    fn check_currency(&self, report: &mut FieldReport<'_>, value: &str) {
        if let Some(amount) = parse_positive_amount(report, value) {
            if amount > self.large_amount_warning {
                report.warn(
                    Severity::High,
                    "That amount seems too large, please double-check it",
                    None,
                );
            }
        }
    }

    fn check_date(&self, report: &mut FieldReport<'_>, value: &str) {
        if !looks_like_date(value) {
            report.error(
                ErrorCode::InvalidDate,
                "That doesn't look like a date",
                Some(DATE_SUGGESTION),
            );
        }
    }

    fn check_text(&self, report: &mut FieldReport<'_>, field: &Field, value: &str) {
        check_email(report, field, value);
    }

    fn check_domain(&self, report: &mut FieldReport<'_>, field: &Field, value: &str) {
        if names_state(&field.placeholder) && !mentions_us_state(value) {
            report.warn(
                Severity::Low,
                format!("{value} doesn't match a US state name"),
                Some(DELAWARE_SUGGESTION),
            );
        }
        check_placeholder_echo(report, field, value);
    }
}

/// Validate with the legal-grade rules
#[must_use]
pub fn validate(fields: &[Field], filled: &FilledFields) -> ValidationResult {
    LegalValidator::default().validate(fields, filled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use docfill_test_utils::field;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    fn legal() -> LegalValidator {
        LegalValidator::new().with_reference_date(today())
    }

    fn codes(result: &ValidationResult) -> Vec<ErrorCode> {
        result.errors.iter().map(|e| e.code).collect()
    }

    #[test]
    fn required_field_gating() {
        let fields = vec![field("1", "Company Name", FieldType::Text, 0)];
        let result = validate(&fields, &FilledFields::new());
        assert!(!result.is_valid());
        assert_eq!(codes(&result), vec![ErrorCode::RequiredFieldMissing]);
        assert_eq!(result.errors[0].field, "Company Name");
    }

    #[test]
    fn whitespace_counts_as_missing_in_both_validators() {
        let f = field("1", "Company Name", FieldType::Text, 0);
        for result in [
            legal().validate_value(&f, Some("   ")),
            ConversationalValidator::new().validate_value(&f, Some("\t")),
        ] {
            assert_eq!(codes(&result), vec![ErrorCode::RequiredFieldMissing]);
        }
    }

    #[test]
    fn optional_empty_skips_checks() {
        let f = field("1", "Purchase Amount", FieldType::Currency, 0).with_required(false);
        assert_eq!(legal().validate_value(&f, Some("")), ValidationResult::new());
    }

    #[test]
    fn currency_boundaries() {
        let f = field("1", "Purchase Amount", FieldType::Currency, 0);
        let v = legal();
        assert_eq!(codes(&v.validate_value(&f, Some("0"))), vec![ErrorCode::InvalidAmount]);
        assert_eq!(codes(&v.validate_value(&f, Some("-100"))), vec![ErrorCode::InvalidAmount]);
        assert_eq!(codes(&v.validate_value(&f, Some("lots"))), vec![ErrorCode::InvalidCurrency]);
        let ok = v.validate_value(&f, Some("$100,000"));
        assert!(ok.is_valid());
        assert!(ok.warnings.is_empty());
    }

    #[test]
    fn invalid_currency_carries_suggestion() {
        let f = field("1", "Purchase Amount", FieldType::Currency, 0);
        let result = ConversationalValidator::new().validate_value(&f, Some("abc"));
        assert_eq!(
            result.errors[0].suggestion.as_deref(),
            Some("Try formats like: 100000, $100,000")
        );
    }

    #[test]
    fn large_amount_thresholds_differ_by_variant() {
        let f = field("1", "Purchase Amount", FieldType::Currency, 0);
        let amount = Some("500,000,000");
        let strict = legal().validate_value(&f, amount);
        let lenient = ConversationalValidator::new().validate_value(&f, amount);
        assert!(strict.is_valid() && lenient.is_valid());
        assert_eq!(strict.warnings.len(), 1);
        assert!(lenient.warnings.is_empty());

        let huge = ConversationalValidator::new().validate_value(&f, Some("2000000000000"));
        assert_eq!(huge.warnings.len(), 1);
    }

    #[test]
    fn dates_strict_and_lenient() {
        let f = field("1", "Effective Date", FieldType::Date, 0);
        assert!(legal().validate_value(&f, Some("January 15, 2024")).is_valid());
        assert_eq!(
            codes(&legal().validate_value(&f, Some("next spring"))),
            vec![ErrorCode::InvalidDate]
        );
        assert!(ConversationalValidator::new()
            .validate_value(&f, Some("early March"))
            .is_valid());
        assert_eq!(
            codes(&ConversationalValidator::new().validate_value(&f, Some("whenever"))),
            vec![ErrorCode::InvalidDate]
        );
    }

    #[test]
    fn far_dates_warn_without_blocking() {
        let f = field("1", "Effective Date", FieldType::Date, 0);
        let result = legal().validate_value(&f, Some("1/15/2020"));
        assert!(result.is_valid());
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn text_rules() {
        let f = field("1", "Signer Title", FieldType::Text, 0);
        assert_eq!(codes(&legal().validate_value(&f, Some("x"))), vec![ErrorCode::ValueTooShort]);
        let long = "a".repeat(501);
        let result = legal().validate_value(&f, Some(&long));
        assert!(result.is_valid());
        assert_eq!(result.warnings.len(), 1);

        let email = field("2", "Investor Email", FieldType::Text, 1);
        assert_eq!(
            codes(&legal().validate_value(&email, Some("not-an-email"))),
            vec![ErrorCode::InvalidEmail]
        );
        assert!(legal().validate_value(&email, Some("jo@fund.vc")).is_valid());
    }

    #[test]
    fn placeholder_echo_is_rejected() {
        let f = field("1", "Company Name", FieldType::Text, 0);
        for value in ["[Company Name]", "________", "company", "name"] {
            let result = legal().validate_value(&f, Some(value));
            assert!(result.has_error(ErrorCode::PlaceholderValue), "{value}");
            let lenient = ConversationalValidator::new().validate_value(&f, Some(value));
            assert!(lenient.has_error(ErrorCode::PlaceholderValue), "{value}");
        }
        assert!(legal().validate_value(&f, Some("Acme Inc.")).is_valid());
    }

    #[test]
    fn state_of_incorporation_rules() {
        let f = field("1", "State of Incorporation", FieldType::Text, 0);
        let strict = legal().validate_value(&f, Some("Ohio"));
        assert!(strict.is_valid());
        assert_eq!(strict.warnings.len(), 1);
        assert!(legal().validate_value(&f, Some("Delaware")).warnings.is_empty());

        let lenient = ConversationalValidator::new();
        assert!(lenient.validate_value(&f, Some("State of Ohio")).warnings.is_empty());
        let unknown = lenient.validate_value(&f, Some("Ontario"));
        assert_eq!(
            unknown.warnings[0].suggestion.as_deref(),
            Some("Most startups incorporate in Delaware")
        );
    }

    #[test]
    fn state_rules_ignore_words_containing_state() {
        let lenient = ConversationalValidator::new();
        let address = field("1", "Real Estate Address", FieldType::Text, 0);
        assert!(lenient.validate_value(&address, Some("12 Main St")).warnings.is_empty());
        let statement = field("2", "Statement Reference", FieldType::Text, 1);
        assert!(lenient.validate_value(&statement, Some("Q3 report")).warnings.is_empty());
        let company_state = field("3", "company_state", FieldType::Text, 2);
        assert_eq!(lenient.validate_value(&company_state, Some("Ontario")).warnings.len(), 1);
    }

    #[test]
    fn low_valuation_cap_warns() {
        let f = field("1", "Valuation Cap", FieldType::Currency, 0);
        let result = legal().validate_value(&f, Some("$500,000"));
        assert!(result.is_valid());
        assert_eq!(result.warnings.len(), 1);
        assert!(legal().validate_value(&f, Some("$5,000,000")).warnings.is_empty());
    }

    #[test]
    fn enum_options_are_enforced() {
        let mut f = field("1", "Entity Type", FieldType::Enum, 0);
        f.options = vec!["Corporation".to_string(), "LLC".to_string()];
        assert!(legal().validate_value(&f, Some("llc")).is_valid());
        assert_eq!(
            codes(&legal().validate_value(&f, Some("Partnership"))),
            vec![ErrorCode::InvalidOption]
        );
    }

    #[test]
    fn validation_does_not_mutate_inputs() {
        let fields = vec![field("1", "Company Name", FieldType::Text, 0)];
        let filled: FilledFields = [("1", "Acme Inc.")].into_iter().collect();
        let before = (fields.clone(), filled.clone());
        let result = validate(&fields, &filled);
        assert!(result.is_valid());
        assert_eq!((fields, filled), before);
    }

    proptest! {
        #[test]
        fn positive_whole_amounts_pass_both_validators(amount in 1u64..1_000_000_000_000u64) {
            let f = field("1", "Purchase Amount", FieldType::Currency, 0);
            let value = format!("${amount}");
            prop_assert!(legal().validate_value(&f, Some(&value)).is_valid());
            prop_assert!(ConversationalValidator::new().validate_value(&f, Some(&value)).is_valid());
        }
    }
}
