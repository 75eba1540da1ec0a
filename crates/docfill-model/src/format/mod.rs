//! Legal-text formatters
//!
//! Pure conversions between machine values and the text legal documents use:
//! - Currency: `100000` ⇄ `"$100,000"`
//! - Dates: `"1/15/2024"` → `"January 15, 2024"`
//! - Words: `100000` → `"One hundred thousand"`

mod currency;
mod date;
mod words;

pub use currency::{format_currency, parse_currency, CurrencyOptions};
pub use date::{format_legal_date, parse_flexible_date, DateInput, DateOptions};
pub use words::{currency_to_words, number_to_words};

/// Errors produced by the formatters
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormatError {
    /// Input is not a usable monetary amount
    #[error("invalid amount: '{0}'")]
    InvalidAmount(String),

    /// Input is not a recognizable date
    #[error("invalid date: '{0}'")]
    InvalidDate(String),
}
