//! Round decimal strings without going through binary floating point.
//!
//! Rounding the textual representation directly avoids the double-rounding
//! artifacts that show up when a decimal string is converted to an `f64`,
//! rounded, and converted back. The fractional digits are truncated half-up
//! at the requested precision, and a carry out of the fraction propagates
//! into the integer digits:
//!
//! ```
//! # use tstext::round::round_decimal;
//! assert_eq!(round_decimal("99.96", 1), "100.0");
//! assert_eq!(round_decimal("12.345", 2), "12.35");
//! assert_eq!(round_decimal("5", 2), "5");
//! ```

/// Round the decimal string `s` to at most `precision` fractional digits.
///
/// Rounding is half-up on the magnitude, so `-0.96` at precision 1 becomes
/// `-1.0`. A string without a decimal point, or whose fraction already has no
/// more than `precision` digits, is returned unchanged. Strings that are not
/// plain decimal numbers (an optional sign, integer digits, an optional
/// fraction) are also returned unchanged rather than mangled.
pub fn round_decimal(s: &str, precision: u32) -> String {
    let Some(dot) = s.find('.') else {
        return s.to_string();
    };

    let head = &s[..dot];
    let frac = &s[dot + 1..];
    let p = precision as usize;

    if frac.len() <= p {
        return s.to_string();
    }

    let (sign, int_digits) = match head.as_bytes().first() {
        Some(b'-') => ("-", &head[1..]),
        Some(b'+') => ("+", &head[1..]),
        _ => ("", head),
    };
    if !int_digits.bytes().all(|b| b.is_ascii_digit()) || !frac.bytes().all(|b| b.is_ascii_digit())
    {
        return s.to_string();
    }

    let mut kept: Vec<u8> = frac.as_bytes()[..p].to_vec();
    let round_up = frac.as_bytes()[p] >= b'5';

    let mut int_part: Vec<u8> = int_digits.as_bytes().to_vec();
    if round_up && increment_digits(&mut kept) {
        // Carry out of the fraction: the integer magnitude grows, possibly
        // gaining a digit (99.96 -> 100.0).
        if increment_digits(&mut int_part) {
            int_part.insert(0, b'1');
        }
    }

    let int_str = String::from_utf8(int_part).expect("digit bytes are valid UTF-8");
    let kept_str = String::from_utf8(kept).expect("digit bytes are valid UTF-8");
    if p == 0 {
        format!("{sign}{int_str}")
    } else {
        format!("{sign}{int_str}.{kept_str}")
    }
}

/// Add one to an ASCII digit string in place; returns `true` on carry out.
///
/// An empty slice is treated as zero digits wide, so the carry immediately
/// propagates out.
fn increment_digits(digits: &mut [u8]) -> bool {
    for d in digits.iter_mut().rev() {
        if *d == b'9' {
            *d = b'0';
        } else {
            *d += 1;
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_decimal_point_unchanged() {
        assert_eq!(round_decimal("5", 2), "5");
        assert_eq!(round_decimal("-17", 0), "-17");
    }

    #[test]
    fn test_short_fraction_unchanged() {
        assert_eq!(round_decimal("1.2", 3), "1.2");
        assert_eq!(round_decimal("12.35", 2), "12.35");
    }

    #[test]
    fn test_half_up() {
        assert_eq!(round_decimal("12.345", 2), "12.35");
        assert_eq!(round_decimal("12.344", 2), "12.34");
        assert_eq!(round_decimal("1.25", 1), "1.3");
        assert_eq!(round_decimal("1.249", 1), "1.2");
    }

    #[test]
    fn test_carry_into_integer_part() {
        assert_eq!(round_decimal("99.96", 1), "100.0");
        assert_eq!(round_decimal("9.99", 1), "10.0");
        assert_eq!(round_decimal("2.999", 2), "3.00");
    }

    #[test]
    fn test_negative_rounds_away_from_zero() {
        assert_eq!(round_decimal("-0.96", 1), "-1.0");
        assert_eq!(round_decimal("-99.96", 1), "-100.0");
    }

    #[test]
    fn test_leading_fraction_zeros_preserved() {
        assert_eq!(round_decimal("0.005", 2), "0.01");
        assert_eq!(round_decimal("0.0049", 3), "0.005");
        assert_eq!(round_decimal("1.0004", 3), "1.000");
    }

    #[test]
    fn test_zero_precision_drops_point() {
        assert_eq!(round_decimal("12.6", 0), "13");
        assert_eq!(round_decimal("12.4", 0), "12");
        assert_eq!(round_decimal("-12.5", 0), "-13");
    }

    #[test]
    fn test_non_numeric_left_alone() {
        assert_eq!(round_decimal("n/a", 2), "n/a");
        assert_eq!(round_decimal("1.2e3", 0), "1.2e3");
    }
}
