//! Lenient numeric parsing for form fields.
//!
//! Both parsers read the longest numeric prefix after leading whitespace and
//! ignore whatever follows, so "120 bpm" reads as 120 and "98.6F" as 98.6.
//! Text without a leading number yields `None`. Like a browser form, integers
//! accept a `0x` hex prefix and decimals accept `Infinity`.

const INFINITY: &str = "Infinity";

/// Parse a leading integer, e.g. "  72.9" → 72 or "0x80" → 128.
pub fn parse_int(text: &str) -> Option<i64> {
    let s = text.trim_start();
    let (negative, rest) = split_sign(s);
    let (radix, digits) = match rest.get(..2) {
        Some("0x") | Some("0X") => (16, &rest[2..]),
        _ => (10, rest),
    };

    let mut value: i64 = 0;
    let mut seen_digit = false;
    for c in digits.chars() {
        let Some(d) = c.to_digit(radix) else { break };
        seen_digit = true;
        value = value
            .saturating_mul(i64::from(radix))
            .saturating_add(i64::from(d));
    }

    if !seen_digit {
        return None;
    }
    Some(if negative { -value } else { value })
}

/// Parse a leading decimal number, e.g. "101.4 F" → 101.4.
pub fn parse_float(text: &str) -> Option<f64> {
    let s = text.trim_start();
    let (negative, unsigned) = split_sign(s);
    if unsigned.starts_with(INFINITY) {
        return Some(if negative {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        });
    }
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end += 1;
    }

    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut mantissa_digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        mantissa_digits += frac_end - frac_start;
        end = frac_end;
    }

    if mantissa_digits == 0 {
        return None;
    }

    // Exponent only counts when digits follow it
    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && matches!(bytes[exp_end], b'+' | b'-') {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    // Slice is ASCII-only by construction
    s[..end].parse::<f64>().ok()
}

/// Integer field value as stored on a record: unparsable → 0, negatives clamp to 0.
pub fn lenient_u32(text: &str) -> u32 {
    parse_int(text)
        .map(|v| v.clamp(0, i64::from(u32::MAX)) as u32)
        .unwrap_or(0)
}

/// Decimal field value as stored on a record: unparsable or non-finite → 0.
pub fn lenient_f64(text: &str) -> f64 {
    parse_float(text).filter(|v| v.is_finite()).unwrap_or(0.0)
}

fn split_sign(s: &str) -> (bool, &str) {
    if let Some(rest) = s.strip_prefix('-') {
        (true, rest)
    } else if let Some(rest) = s.strip_prefix('+') {
        (false, rest)
    } else {
        (false, s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_int_prefix() {
        assert_eq!(parse_int("130"), Some(130));
        assert_eq!(parse_int("  72"), Some(72));
        assert_eq!(parse_int("120.9"), Some(120));
        assert_eq!(parse_int("88bpm"), Some(88));
        assert_eq!(parse_int("-4"), Some(-4));
        assert_eq!(parse_int("+7"), Some(7));
    }

    #[test]
    fn test_parse_int_rejects_non_numeric() {
        assert_eq!(parse_int(""), None);
        assert_eq!(parse_int("   "), None);
        assert_eq!(parse_int("abc"), None);
        assert_eq!(parse_int("-"), None);
        assert_eq!(parse_int(".5"), None);
    }

    #[test]
    fn test_parse_int_hex_prefix() {
        assert_eq!(parse_int("0x80"), Some(128));
        assert_eq!(parse_int(" 0XfF"), Some(255));
        assert_eq!(parse_int("-0x10"), Some(-16));
        assert_eq!(parse_int("0x"), None);
        assert_eq!(parse_int("0xg"), None);
        assert_eq!(parse_int("08"), Some(8));
    }

    #[test]
    fn test_parse_float_infinity() {
        assert_eq!(parse_float("Infinity"), Some(f64::INFINITY));
        assert_eq!(parse_float(" -Infinity°"), Some(f64::NEG_INFINITY));
        assert_eq!(parse_float("infinity"), None);
        assert_eq!(parse_float("Inf"), None);
        assert_eq!(lenient_f64("Infinity"), 0.0);
        assert_eq!(parse_float("0x10"), Some(0.0));
    }

    #[test]
    fn test_parse_int_saturates() {
        assert_eq!(parse_int("99999999999999999999999"), Some(i64::MAX));
    }

    #[test]
    fn test_parse_float_prefix() {
        assert_eq!(parse_float("101.4"), Some(101.4));
        assert_eq!(parse_float(" 98.6F"), Some(98.6));
        assert_eq!(parse_float(".5"), Some(0.5));
        assert_eq!(parse_float("5."), Some(5.0));
        assert_eq!(parse_float("1e2"), Some(100.0));
        assert_eq!(parse_float("1e"), Some(1.0));
        assert_eq!(parse_float("-3.25x"), Some(-3.25));
    }

    #[test]
    fn test_parse_float_rejects_non_numeric() {
        assert_eq!(parse_float(""), None);
        assert_eq!(parse_float("."), None);
        assert_eq!(parse_float("fever"), None);
        assert_eq!(parse_float("+"), None);
    }

    #[test]
    fn test_lenient_defaults() {
        assert_eq!(lenient_u32(""), 0);
        assert_eq!(lenient_u32("-12"), 0);
        assert_eq!(lenient_u32("65"), 65);
        assert_eq!(lenient_f64("n/a"), 0.0);
        assert_eq!(lenient_f64("89.5"), 89.5);
    }
}
