//! Lenient conversions from text and attribute values.
//!
//! Every conversion is total: input that does not start with a number
//! yields zero, and out-of-range integers are clamped to the target
//! type's bounds.

/// Interprets `text` as a boolean.
///
/// After trimming whitespace, `true`, `1`, `yes` and `on` (ignoring ASCII
/// case) are true; anything else, including the empty string, is false.
///
/// ```
/// use xmlarbor::util::convert::to_bool;
///
/// assert!(to_bool(" TRUE "));
/// assert!(to_bool("on"));
/// assert!(!to_bool("0"));
/// assert!(!to_bool(""));
/// ```
#[must_use]
pub fn to_bool(text: &str) -> bool {
    let text = text.trim_matches(is_space);
    ["true", "1", "yes", "on"]
        .iter()
        .any(|token| text.eq_ignore_ascii_case(token))
}

/// Interprets the leading integer of `text` as an `i32`, clamping on
/// overflow.
///
/// Leading whitespace and a sign are accepted, `0x`/`0X` selects
/// hexadecimal, and parsing stops at the first non-digit.
///
/// ```
/// use xmlarbor::util::convert::to_i32;
///
/// assert_eq!(to_i32("42abc"), 42);
/// assert_eq!(to_i32("  -0x1F"), -31);
/// assert_eq!(to_i32("abc"), 0);
/// assert_eq!(to_i32("99999999999"), i32::MAX);
/// ```
#[must_use]
pub fn to_i32(text: &str) -> i32 {
    let value = to_i64(text);
    i32::try_from(value).unwrap_or(if value < 0 { i32::MIN } else { i32::MAX })
}

/// Like [`to_i32`] for `u32`; negative input yields 0.
#[must_use]
pub fn to_u32(text: &str) -> u32 {
    let (negative, magnitude) = leading_integer(text);
    if negative {
        0
    } else {
        u32::try_from(magnitude).unwrap_or(u32::MAX)
    }
}

/// Like [`to_i32`] for `i64`.
#[must_use]
pub fn to_i64(text: &str) -> i64 {
    let (negative, magnitude) = leading_integer(text);
    if negative {
        0i64.checked_sub_unsigned(magnitude).unwrap_or(i64::MIN)
    } else {
        i64::try_from(magnitude).unwrap_or(i64::MAX)
    }
}

/// Interprets the longest leading decimal number of `text` as an `f64`.
///
/// ```
/// use xmlarbor::util::convert::to_f64;
///
/// assert_eq!(to_f64(" 2.5e2px"), 250.0);
/// assert_eq!(to_f64("-.5"), -0.5);
/// assert_eq!(to_f64("x"), 0.0);
/// ```
#[must_use]
pub fn to_f64(text: &str) -> f64 {
    let text = text.trim_start_matches(is_space);
    let bytes = text.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    let int_digits = count_digits(&bytes[end..]);
    end += int_digits;
    let mut frac_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        frac_digits = count_digits(&bytes[end + 1..]);
        if int_digits + frac_digits > 0 {
            end += 1 + frac_digits;
        }
    }
    if int_digits + frac_digits == 0 {
        return 0.0;
    }
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits = count_digits(bytes.get(exp_end..).unwrap_or_default());
        if exp_digits > 0 {
            end = exp_end + exp_digits;
        }
    }
    text[..end].parse().unwrap_or(0.0)
}

fn is_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n')
}

fn count_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}

/// Returns the sign and saturated magnitude of the leading integer.
fn leading_integer(text: &str) -> (bool, u64) {
    let mut bytes = text.trim_start_matches(is_space).as_bytes();
    let negative = match bytes.first() {
        Some(b'-') => {
            bytes = &bytes[1..];
            true
        }
        Some(b'+') => {
            bytes = &bytes[1..];
            false
        }
        _ => false,
    };
    let radix = if bytes.len() > 2 && bytes[0] == b'0' && matches!(bytes[1], b'x' | b'X') {
        bytes = &bytes[2..];
        16
    } else {
        10
    };
    let magnitude = bytes
        .iter()
        .map_while(|&b| char::from(b).to_digit(radix))
        .fold(0u64, |acc, digit| {
            acc.saturating_mul(u64::from(radix))
                .saturating_add(u64::from(digit))
        });
    (negative, magnitude)
}
