//! Shared checks used by both validators

use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("static regex"));

static MONTH_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(jan|feb|mar|apr|may|jun|jul|aug|sep|sept|oct|nov|dec)[a-z]*\b")
        .expect("static regex")
});

pub(crate) const CURRENCY_SUGGESTION: &str = "Try formats like: 100000, $100,000";
pub(crate) const DATE_SUGGESTION: &str = "Try formats like: January 15, 2024 or 01/15/2024";
pub(crate) const DELAWARE_SUGGESTION: &str = "Most startups incorporate in Delaware";

/// States legal templates usually see for incorporation
pub(crate) const COMMON_STATES: [&str; 10] = [
    "delaware",
    "california",
    "new york",
    "texas",
    "nevada",
    "florida",
    "washington",
    "massachusetts",
    "wyoming",
    "colorado",
];

pub(crate) const US_STATES: [&str; 50] = [
    "alabama", "alaska", "arizona", "arkansas", "california", "colorado", "connecticut",
    "delaware", "florida", "georgia", "hawaii", "idaho", "illinois", "indiana", "iowa",
    "kansas", "kentucky", "louisiana", "maine", "maryland", "massachusetts", "michigan",
    "minnesota", "mississippi", "missouri", "montana", "nebraska", "nevada", "new hampshire",
    "new jersey", "new mexico", "new york", "north carolina", "north dakota", "ohio", "oklahoma",
    "oregon", "pennsylvania", "rhode island", "south carolina", "south dakota", "tennessee",
    "texas", "utah", "vermont", "virginia", "washington", "west virginia", "wisconsin", "wyoming",
];

/// Basic `local@domain.tld` shape
pub(crate) fn is_email_shaped(value: &str) -> bool {
    EMAIL.is_match(value.trim())
}

/// Anything with a digit or a month name could be a date
pub(crate) fn looks_like_date(value: &str) -> bool {
    value.chars().any(|c| c.is_ascii_digit()) || MONTH_NAME.is_match(value)
}

/// Placeholder names that refer to an entity name
pub(crate) fn is_entity_name_field(placeholder_lower: &str) -> bool {
    (placeholder_lower.contains("company") || placeholder_lower.contains("investor"))
        && placeholder_lower.contains("name")
}

/// Placeholder names with `state` as a word, so "Real Estate" and
/// "Statement Date" stay out of the state checks
pub(crate) fn names_state(placeholder: &str) -> bool {
    docfill_model::normalize_key(placeholder)
        .split(' ')
        .any(|word| word == "state")
}

/// Values that echo the prompt instead of answering it
pub(crate) fn is_placeholder_echo(value: &str, placeholder: &str) -> bool {
    let trimmed = value.trim();
    let lower = trimmed.to_lowercase();
    if trimmed.starts_with('[') && trimmed.ends_with(']') {
        return true;
    }
    if !trimmed.is_empty() && trimmed.chars().all(|c| c == '_') {
        return true;
    }
    matches!(
        lower.as_str(),
        "company" | "investor" | "name" | "company name" | "investor name"
    ) || docfill_model::normalize_key(trimmed) == docfill_model::normalize_key(placeholder)
}

/// Exact match against the common-states list
pub(crate) fn is_common_state(value: &str) -> bool {
    let lower = value.trim().to_lowercase();
    COMMON_STATES.iter().any(|s| lower == *s)
}

/// Substring match against all 50 state names
pub(crate) fn mentions_us_state(value: &str) -> bool {
    let lower = value.to_lowercase();
    US_STATES.iter().any(|s| lower.contains(s))
}
