//! Locale-formatted number parsing.
//!
//! The source pages render numbers the Russian way: a space (often a
//! non-breaking one) between thousands and a comma before the decimals,
//! e.g. `"1 234,56"`.

/// Parse locale-formatted numeric text.
///
/// Strips every whitespace character, turns the decimal comma into a point
/// and parses the result. Returns `None` for empty input, for anything that
/// is not a numeric literal and for non-finite values, so callers never have
/// to handle a parse failure.
///
/// # Example
/// ```
/// use sectorlens_data::numeric::parse_number;
///
/// assert_eq!(parse_number("1 234,56"), Some(1234.56));
/// assert_eq!(parse_number("n/a"), None);
/// ```
pub fn parse_number(raw: &str) -> Option<f64> {
    let normalized: String = raw
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| if c == ',' { '.' } else { c })
        .collect();

    if normalized.is_empty() {
        return None;
    }

    normalized
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}
