//! Locale-formatted amount parsing.
//!
//! Filings report amounts as text such as `"1,234,567"`, `"-12"` or
//! `"(1,234)"` (parenthesized negative). Anything that cannot be read as a
//! finite number is reported as `None`.

/// Parses a filing amount into a number.
///
/// Grouping separators (`,`) are stripped and surrounding whitespace is
/// trimmed. A value wrapped in parentheses is negated. Empty input, a lone
/// `-`, and unparseable or non-finite text all yield `None`.
///
/// # Example
///
/// ```
/// use dart_core::amount::parse_amount;
///
/// assert_eq!(parse_amount("1,234"), Some(1234.0));
/// assert_eq!(parse_amount("(1,234)"), Some(-1234.0));
/// assert_eq!(parse_amount("-"), None);
/// ```
#[must_use]
pub fn parse_amount(text: &str) -> Option<f64> {
    let cleaned: String = text.chars().filter(|&c| c != ',').collect();
    let trimmed = cleaned.trim();
    if trimmed.is_empty() || trimmed == "-" {
        return None;
    }

    match trimmed
        .strip_prefix('(')
        .and_then(|rest| rest.strip_suffix(')'))
    {
        Some(inner) => parse_decimal(inner).map(|v| -v),
        None => parse_decimal(trimmed),
    }
}

/// Parses plain decimal text, rejecting words like `inf` and `NaN` that the
/// float parser would otherwise accept.
fn parse_decimal(text: &str) -> Option<f64> {
    let text = text.trim();
    if text.is_empty() || text.bytes().any(|b| b.is_ascii_alphabetic() && b != b'e' && b != b'E') {
        return None;
    }
    text.parse::<f64>().ok().filter(|v| v.is_finite())
}
