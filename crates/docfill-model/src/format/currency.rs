use super::FormatError;

/// Options for [`format_currency`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CurrencyOptions {
    /// Always print two decimal places. When false, cents appear only if nonzero.
    pub include_cents: bool,
}

impl CurrencyOptions {
    #[inline]
    #[must_use]
    pub fn with_cents() -> Self {
        Self { include_cents: true }
    }
}

/// Format an amount as US currency, e.g. `"$100,000"` or `"$1,250.50"`.
///
/// # Errors
/// `FormatError::InvalidAmount` for NaN or infinite input.
pub fn format_currency(amount: f64, options: CurrencyOptions) -> Result<String, FormatError> {
    if !amount.is_finite() {
        return Err(FormatError::InvalidAmount(amount.to_string()));
    }

    let total_cents = (amount.abs() * 100.0).round() as u128;
    let dollars = total_cents / 100;
    let cents = total_cents % 100;

    let mut out = String::new();
    if amount < 0.0 && total_cents > 0 {
        out.push('-');
    }
    out.push('$');
    out.push_str(&group_thousands(dollars));
    if options.include_cents || cents != 0 {
        out.push_str(&format!(".{cents:02}"));
    }
    Ok(out)
}

/// Parse a currency string such as `"$100,000"`, `"USD 1,250.50"` or `"-100"`.
///
/// # Errors
/// `FormatError::InvalidAmount` when the residue after stripping symbols and
/// separators is not a finite number.
pub fn parse_currency(input: &str) -> Result<f64, FormatError> {
    let mut residue = input.trim().to_string();
    for token in ["USD", "usd"] {
        residue = residue.replace(token, "");
    }
    let residue: String = residue
        .chars()
        .filter(|c| *c != '$' && *c != ',' && !c.is_whitespace())
        .collect();

    if residue.is_empty() {
        return Err(FormatError::InvalidAmount(input.to_string()));
    }

    match residue.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(FormatError::InvalidAmount(input.to_string())),
    }
}

fn group_thousands(value: u128) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}
