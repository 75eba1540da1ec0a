use super::FormatError;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Timelike};
use once_cell::sync::Lazy;
use regex::Regex;

static ORDINAL_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(\d{1,2})(st|nd|rd|th)\b").expect("static regex"));
static WEEKDAY_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(mon|tue|tues|wed|thu|thur|thurs|fri|sat|sun)[a-z]*,?\s+").expect("static regex")
});

/// Layouts tried in order before the generic fallbacks
const DATE_LAYOUTS: [&str; 12] = [
    "%m/%d/%y",
    "%m/%d/%Y",
    "%m-%d-%Y",
    "%Y-%m-%d",
    "%B %d, %Y",
    "%B %d %Y",
    "%d %B %Y",
    "%d %B, %Y",
    "%Y/%m/%d",
    "%d.%m.%Y",
    "%B %d,%Y",
    "%d-%b-%Y",
];

/// Anything [`format_legal_date`] accepts
#[derive(Debug, Clone, PartialEq)]
pub enum DateInput {
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    /// Milliseconds since the Unix epoch (UTC)
    Timestamp(i64),
    Text(String),
}

impl From<NaiveDate> for DateInput {
    fn from(value: NaiveDate) -> Self {
        DateInput::Date(value)
    }
}

impl From<NaiveDateTime> for DateInput {
    fn from(value: NaiveDateTime) -> Self {
        DateInput::DateTime(value)
    }
}

impl From<i64> for DateInput {
    fn from(value: i64) -> Self {
        DateInput::Timestamp(value)
    }
}

impl From<&str> for DateInput {
    fn from(value: &str) -> Self {
        DateInput::Text(value.to_string())
    }
}

impl From<String> for DateInput {
    fn from(value: String) -> Self {
        DateInput::Text(value)
    }
}

/// Options for [`format_legal_date`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateOptions {
    /// Append `at h:mm AM/PM`
    pub include_time: bool,
}

/// Render a date in long legal form: `"January 15, 2024"`.
///
/// # Errors
/// `FormatError::InvalidDate` when text input cannot be parsed or a timestamp
/// is out of range.
pub fn format_legal_date(input: impl Into<DateInput>, options: DateOptions) -> Result<String, FormatError> {
    let moment = match input.into() {
        DateInput::Date(d) => d.and_hms_opt(0, 0, 0).unwrap_or_default(),
        DateInput::DateTime(dt) => dt,
        DateInput::Timestamp(ms) => DateTime::from_timestamp_millis(ms)
            .map(|dt| dt.naive_utc())
            .ok_or_else(|| FormatError::InvalidDate(ms.to_string()))?,
        DateInput::Text(text) => parse_flexible_datetime(&text)?,
    };

    let mut out = moment.format("%B %-d, %Y").to_string();
    if options.include_time {
        let (pm, hour) = moment.hour12();
        out.push_str(&format!(
            " at {}:{:02} {}",
            hour,
            moment.minute(),
            if pm { "PM" } else { "AM" }
        ));
    }
    Ok(out)
}

/// Parse a date written in any of the common layouts.
///
/// Ordinal suffixes (`15th`) and a leading weekday (`Monday,`) are ignored.
///
/// # Errors
/// `FormatError::InvalidDate` if no layout matches.
pub fn parse_flexible_date(input: &str) -> Result<NaiveDate, FormatError> {
    parse_flexible_datetime(input).map(|dt| dt.date())
}

fn parse_flexible_datetime(input: &str) -> Result<NaiveDateTime, FormatError> {
    let cleaned = clean(input);
    if cleaned.is_empty() {
        return Err(FormatError::InvalidDate(input.to_string()));
    }

    for layout in DATE_LAYOUTS {
        if let Ok(date) = NaiveDate::parse_from_str(&cleaned, layout) {
            return date
                .and_hms_opt(0, 0, 0)
                .ok_or_else(|| FormatError::InvalidDate(input.to_string()));
        }
    }

    // Generic fallbacks: full timestamps
    if let Ok(dt) = DateTime::parse_from_rfc3339(&cleaned) {
        return Ok(dt.naive_utc());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(&cleaned) {
        return Ok(dt.naive_utc());
    }
    for layout in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(&cleaned, layout) {
            return Ok(dt);
        }
    }

    Err(FormatError::InvalidDate(input.to_string()))
}

fn clean(input: &str) -> String {
    let collapsed = input.split_whitespace().collect::<Vec<_>>().join(" ");
    let without_weekday = WEEKDAY_PREFIX.replace(&collapsed, "");
    ORDINAL_SUFFIX.replace_all(&without_weekday, "$1").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonicalizes_numeric_and_long_forms() {
        for input in ["1/15/2024", "January 15, 2024", "2024-01-15", "Jan 15, 2024", "15 January 2024"] {
            let date = parse_flexible_date(input).unwrap();
            assert_eq!(
                format_legal_date(date, DateOptions::default()).unwrap(),
                "January 15, 2024",
                "input: {input}"
            );
        }
    }

    #[test]
    fn strips_ordinals_and_weekdays() {
        let date = parse_flexible_date("Monday, January 15th, 2024").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
    }

    #[test]
    fn two_digit_years_are_modern() {
        let date = parse_flexible_date("1/15/24").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
    }

    #[test]
    fn formats_text_input_directly() {
        assert_eq!(
            format_legal_date("03/01/2025", DateOptions::default()).unwrap(),
            "March 1, 2025"
        );
    }

    #[test]
    fn formats_with_time() {
        let dt = NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(15, 4, 0)
            .unwrap();
        assert_eq!(
            format_legal_date(dt, DateOptions { include_time: true }).unwrap(),
            "January 15, 2024 at 3:04 PM"
        );
    }

    #[test]
    fn formats_timestamp() {
        // 2024-01-15T00:00:00Z
        assert_eq!(
            format_legal_date(1_705_276_800_000_i64, DateOptions::default()).unwrap(),
            "January 15, 2024"
        );
    }

    #[test]
    fn rejects_unparseable() {
        assert!(matches!(
            parse_flexible_date("next tuesday-ish"),
            Err(FormatError::InvalidDate(_))
        ));
        assert!(parse_flexible_date("13/45/2024").is_err());
        assert!(parse_flexible_date("   ").is_err());
    }
}
