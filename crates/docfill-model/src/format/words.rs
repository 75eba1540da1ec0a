use super::FormatError;

const ONES: [&str; 20] = [
    "zero", "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten",
    "eleven", "twelve", "thirteen", "fourteen", "fifteen", "sixteen", "seventeen", "eighteen",
    "nineteen",
];
const TENS: [&str; 10] = [
    "", "", "twenty", "thirty", "forty", "fifty", "sixty", "seventy", "eighty", "ninety",
];
const SCALES: [&str; 7] = [
    "",
    "thousand",
    "million",
    "billion",
    "trillion",
    "quadrillion",
    "quintillion",
];

/// Spell out an integer: `100000` → `"One hundred thousand"`.
#[must_use]
pub fn number_to_words(value: u64) -> String {
    capitalize(&spell(value))
}

/// Spell out a dollar amount for legal text.
///
/// `1250.5` → `"One thousand two hundred fifty dollars and fifty cents"`.
/// Cents are appended only when nonzero.
///
/// # Errors
/// `FormatError::InvalidAmount` for negative or non-finite amounts.
pub fn currency_to_words(amount: f64) -> Result<String, FormatError> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(FormatError::InvalidAmount(amount.to_string()));
    }
    let total_cents = (amount * 100.0).round();
    if total_cents > u64::MAX as f64 {
        return Err(FormatError::InvalidAmount(amount.to_string()));
    }
    let total_cents = total_cents as u64;
    let dollars = total_cents / 100;
    let cents = total_cents % 100;

    let mut out = spell(dollars);
    out.push_str(if dollars == 1 { " dollar" } else { " dollars" });
    if cents != 0 {
        out.push_str(" and ");
        out.push_str(&spell(cents));
        out.push_str(if cents == 1 { " cent" } else { " cents" });
    }
    Ok(capitalize(&out))
}

fn spell(value: u64) -> String {
    if value == 0 {
        return ONES[0].to_string();
    }

    let mut groups = Vec::new();
    let mut rest = value;
    while rest > 0 {
        groups.push((rest % 1000) as usize);
        rest /= 1000;
    }

    let mut parts: Vec<String> = Vec::new();
    for (scale, group) in groups.iter().enumerate().rev() {
        if *group == 0 {
            continue;
        }
        let mut chunk = spell_hundreds(*group);
        if scale > 0 {
            chunk.push(' ');
            chunk.push_str(SCALES[scale]);
        }
        parts.push(chunk);
    }
    parts.join(" ")
}

fn spell_hundreds(value: usize) -> String {
    let hundreds = value / 100;
    let remainder = value % 100;
    let mut parts = Vec::new();
    if hundreds > 0 {
        parts.push(format!("{} hundred", ONES[hundreds]));
    }
    if remainder > 0 {
        if remainder < 20 {
            parts.push(ONES[remainder].to_string());
        } else if remainder % 10 == 0 {
            parts.push(TENS[remainder / 10].to_string());
        } else {
            parts.push(format!("{}-{}", TENS[remainder / 10], ONES[remainder % 10]));
        }
    }
    parts.join(" ")
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_numbers() {
        assert_eq!(number_to_words(0), "Zero");
        assert_eq!(number_to_words(7), "Seven");
        assert_eq!(number_to_words(42), "Forty-two");
        assert_eq!(number_to_words(115), "One hundred fifteen");
    }

    #[test]
    fn scaled_numbers() {
        assert_eq!(number_to_words(100_000), "One hundred thousand");
        assert_eq!(number_to_words(1_000_001), "One million one");
        assert_eq!(
            number_to_words(8_000_000_250),
            "Eight billion two hundred fifty"
        );
    }

    #[test]
    fn currency_without_cents() {
        assert_eq!(
            currency_to_words(100_000.0).unwrap(),
            "One hundred thousand dollars"
        );
        assert_eq!(currency_to_words(1.0).unwrap(), "One dollar");
    }

    #[test]
    fn currency_with_cents() {
        assert_eq!(
            currency_to_words(1250.5).unwrap(),
            "One thousand two hundred fifty dollars and fifty cents"
        );
        assert_eq!(currency_to_words(0.01).unwrap(), "Zero dollars and one cent");
    }

    #[test]
    fn currency_rejects_negative() {
        assert!(currency_to_words(-5.0).is_err());
    }
}
