//! Cell text to number conversion.
//!
//! Exchange pages format numbers with thousands separators, trailing `%`
//! signs and `N/A` placeholders. Anything that does not yield a finite
//! number is `None`; callers decide whether that drops the row.

const PLACEHOLDER: &str = "N/A";

/// Parse a price or volume cell: `"1,234.50"` -> `1234.5`.
pub fn parse_number(text: &str) -> Option<f64> {
    let cleaned = text.replace(',', "");
    parse_cleaned(&cleaned)
}

/// Parse a percentage cell. The bare number is returned: `"1.23%"` -> `1.23`.
pub fn parse_percent(text: &str) -> Option<f64> {
    let cleaned = text.replace([',', '%'], "");
    parse_cleaned(&cleaned)
}

fn parse_cleaned(cleaned: &str) -> Option<f64> {
    let trimmed = cleaned.trim();
    if trimmed.is_empty() || trimmed == PLACEHOLDER {
        return None;
    }

    let end = numeric_prefix_len(trimmed);
    if end == 0 {
        return None;
    }

    trimmed[..end]
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

/// Length of the longest leading `[+-]digits[.digits][e[+-]digits]` run.
/// Trailing annotations such as `"12.5 (est)"` are ignored.
fn numeric_prefix_len(text: &str) -> usize {
    let bytes = text.as_bytes();
    let mut pos = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        pos += 1;
    }

    let int_start = pos;
    while pos < bytes.len() && bytes[pos].is_ascii_digit() {
        pos += 1;
    }
    let mut digits = pos - int_start;

    if pos < bytes.len() && bytes[pos] == b'.' {
        let frac_start = pos + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        let frac_digits = frac_end - frac_start;
        if digits + frac_digits > 0 {
            digits += frac_digits;
            pos = frac_end;
        }
    }

    if digits == 0 {
        return 0;
    }

    if pos < bytes.len() && matches!(bytes[pos], b'e' | b'E') {
        let mut exp = pos + 1;
        if exp < bytes.len() && matches!(bytes[exp], b'+' | b'-') {
            exp += 1;
        }
        let exp_digits_start = exp;
        while exp < bytes.len() && bytes[exp].is_ascii_digit() {
            exp += 1;
        }
        if exp > exp_digits_start {
            pos = exp;
        }
    }

    pos
}
