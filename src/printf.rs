//! Render values through C-style `%` format strings.
//!
//! # Basic usage
//!
//! [`format_values`] walks a format string, copying literal characters through
//! and consuming one value from the input slice per `%` directive:
//!
//! ```
//! use tstext::field_specs::FieldValue;
//! use tstext::printf::format_values;
//!
//! let values = [FieldValue::Str("Station".to_string()), FieldValue::Integer(42)];
//! let s = format_values(&values, "%s=%4d").unwrap();
//! assert_eq!(s, "Station=  42");
//! ```
//!
//! Supported directives are `%c`, `%s`, `%d`, and `%f`/`%F`, with the flags
//! `-` (left justify), `0` (zero pad), and `#` (force a decimal point), plus
//! optional width and `.precision`. `%%` emits a literal percent sign.
//!
//! # Float handling
//!
//! Real values are expanded from their exact shortest decimal digits (via
//! `ryu_floating_decimal`) into a plain decimal string, shifting the decimal
//! point by the exponent, before the fraction is rounded half-up with
//! [`round_decimal`](crate::round::round_decimal). This keeps the digit
//! sequence exact instead of round-tripping through binary floating point. A
//! NaN renders as the literal three-character token `NaN`, padded to width.
//!
//! # String justification
//!
//! `%s` pads on the right (left justification) whether or not the `-` flag is
//! present. The legacy behavior this code reproduces documented strings as
//! left justified by default, unlike numeric fields.

use std::fmt::Display;

use ryu_floating_decimal::d2d;

use crate::field_specs::FieldValue;
use crate::round::round_decimal;

/// A type alias for `Result` with [`FormatError`] as the error type.
pub type FmtResult<T> = Result<T, FormatError>;

/// Errors that can occur while rendering values through a format string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// Indicates that the format string has more directives than there were
    /// values to consume.
    TooFewValues { needed: usize, given: usize },
    /// Indicates an unrecognized conversion character after a `%`.
    InvalidSpecifier { found: char, position: usize },
    /// Indicates that the format string ended in the middle of a directive.
    IncompleteDirective { position: usize },
    /// Indicates a value that cannot be converted for its directive, e.g. a
    /// non-numeric string given to `%d`.
    TypeMismatch { conversion: char, value: String, index: usize },
}

impl Display for FormatError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TooFewValues { needed, given } => {
                write!(f, "Format string needs at least {needed} values but only {given} were given")
            }
            Self::InvalidSpecifier { found, position } => {
                write!(f, "Unrecognized conversion character '{found}' at position {position}")
            }
            Self::IncompleteDirective { position } => {
                write!(f, "Format string ended inside the directive starting at position {position}")
            }
            Self::TypeMismatch { conversion, value, index } => {
                write!(f, "Value {index} ('{value}') cannot be formatted with '%{conversion}'")
            }
        }
    }
}

impl std::error::Error for FormatError {}

#[derive(Debug, Clone, Copy, Default)]
struct Directive {
    left_justify: bool,
    zero_pad: bool,
    alt_form: bool,
    width: usize,
    precision: Option<usize>,
}

/// Render `values` according to `format`.
///
/// Literal characters pass through unchanged and each directive consumes one
/// value in order. It is an error for the directives to outnumber the values;
/// leftover values are ignored.
pub fn format_values(values: &[FieldValue], format: &str) -> FmtResult<String> {
    let mut out = String::with_capacity(format.len());
    let mut vi = 0usize;
    let mut chars = format.char_indices().peekable();

    while let Some((pos, c)) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }

        if let Some((_, '%')) = chars.peek() {
            chars.next();
            out.push('%');
            continue;
        }

        let mut dir = Directive::default();
        loop {
            match chars.peek() {
                Some((_, '-')) => dir.left_justify = true,
                Some((_, '0')) => dir.zero_pad = true,
                Some((_, '#')) => dir.alt_form = true,
                _ => break,
            }
            chars.next();
        }

        while let Some(&(_, d)) = chars.peek() {
            if let Some(n) = d.to_digit(10) {
                dir.width = dir.width * 10 + n as usize;
                chars.next();
            } else {
                break;
            }
        }

        if let Some((_, '.')) = chars.peek() {
            chars.next();
            let mut prec = 0usize;
            while let Some(&(_, d)) = chars.peek() {
                if let Some(n) = d.to_digit(10) {
                    prec = prec * 10 + n as usize;
                    chars.next();
                } else {
                    break;
                }
            }
            dir.precision = Some(prec);
        }

        let conv = match chars.next() {
            Some((_, conv)) => conv,
            None => return Err(FormatError::IncompleteDirective { position: pos }),
        };

        if !matches!(conv, 'c' | 's' | 'd' | 'f' | 'F') {
            return Err(FormatError::InvalidSpecifier { found: conv, position: pos });
        }

        let value = values.get(vi).ok_or(FormatError::TooFewValues {
            needed: vi + 1,
            given: values.len(),
        })?;

        match conv {
            'c' => out.push_str(&value.to_string()),
            's' => push_str_value(&mut out, value, &dir),
            'd' => push_int_value(&mut out, value, &dir, vi)?,
            'f' | 'F' => push_float_value(&mut out, value, &dir, vi)?,
            _ => unreachable!(),
        }
        vi += 1;
    }

    Ok(out)
}

fn push_padded(out: &mut String, body: &str, width: usize, left_justify: bool) {
    let len = body.chars().count();
    if len >= width {
        out.push_str(body);
    } else if left_justify {
        out.push_str(body);
        push_spaces(out, width - len);
    } else {
        push_spaces(out, width - len);
        out.push_str(body);
    }
}

fn push_spaces(out: &mut String, n: usize) {
    for _ in 0..n {
        out.push(' ');
    }
}

/// `%s`: truncate to precision, pad to width. Strings are left justified even
/// without the `-` flag; see the module docs.
fn push_str_value(out: &mut String, value: &FieldValue, dir: &Directive) {
    let s = value.to_string();
    let s = if let Some(p) = dir.precision {
        s.chars().take(p).collect()
    } else {
        s
    };
    push_padded(out, &s, dir.width, true);
}

fn push_int_value(out: &mut String, value: &FieldValue, dir: &Directive, index: usize) -> FmtResult<()> {
    let n: i64 = match value {
        FieldValue::Integer(i) => *i,
        FieldValue::Real(v) => *v as i64,
        FieldValue::Character(_) | FieldValue::Str(_) => {
            let text = value.to_string();
            let trimmed = text.trim();
            if trimmed.is_empty() {
                // A blank value still consumes its directive and renders as
                // width spaces.
                push_spaces(out, dir.width);
                return Ok(());
            }
            trimmed.strip_prefix('+').unwrap_or(trimmed).parse().map_err(|_| {
                FormatError::TypeMismatch { conversion: 'd', value: text.clone(), index }
            })?
        }
    };

    let mut buf = itoa::Buffer::new();
    let digits = buf.format(n.unsigned_abs());
    let sign = if n < 0 { "-" } else { "" };
    push_signed_padded(out, sign, digits, dir);
    Ok(())
}

fn push_float_value(
    out: &mut String,
    value: &FieldValue,
    dir: &Directive,
    index: usize,
) -> FmtResult<()> {
    let v: f64 = match value {
        FieldValue::Real(v) => *v,
        FieldValue::Integer(i) => *i as f64,
        FieldValue::Character(_) | FieldValue::Str(_) => {
            let text = value.to_string();
            let trimmed = text.trim();
            if trimmed.is_empty() {
                push_spaces(out, dir.width);
                return Ok(());
            }
            trimmed.parse().map_err(|_| FormatError::TypeMismatch {
                conversion: 'f',
                value: text.clone(),
                index,
            })?
        }
    };

    if v.is_nan() {
        push_padded(out, "NaN", dir.width, dir.left_justify);
        return Ok(());
    }
    if v.is_infinite() {
        let body = if v < 0.0 { "-Inf" } else { "Inf" };
        push_padded(out, body, dir.width, dir.left_justify);
        return Ok(());
    }

    let precision = dir.precision.unwrap_or(6);
    let (neg, int_part, frac_part) = expand_decimal(v);

    let (int_part, mut frac_part) = if frac_part.len() > precision {
        let rounded = round_decimal(&format!("{int_part}.{frac_part}"), precision as u32);
        match rounded.split_once('.') {
            Some((i, f)) => (i.to_string(), f.to_string()),
            None => (rounded, String::new()),
        }
    } else {
        (int_part, frac_part)
    };
    while frac_part.len() < precision {
        frac_part.push('0');
    }

    let body = if precision == 0 {
        if dir.alt_form {
            format!("{int_part}.")
        } else {
            int_part
        }
    } else {
        format!("{int_part}.{frac_part}")
    };

    let sign = if neg { "-" } else { "" };
    push_signed_padded(out, sign, &body, dir);
    Ok(())
}

/// Pad a signed numeric body to the directive width. With the `0` flag the
/// padding zeros go between the sign and the digits.
fn push_signed_padded(out: &mut String, sign: &str, body: &str, dir: &Directive) {
    let len = sign.len() + body.chars().count();
    if dir.zero_pad && !dir.left_justify && len < dir.width {
        out.push_str(sign);
        for _ in 0..(dir.width - len) {
            out.push('0');
        }
        out.push_str(body);
    } else {
        let joined = format!("{sign}{body}");
        push_padded(out, &joined, dir.width, dir.left_justify);
    }
}

/// Expand `v` into sign, integer digits, and fraction digits in plain decimal.
///
/// Works from the exact shortest decimal mantissa/exponent decomposition, so
/// values whose default rendering would be scientific notation (1e-7, 3e20)
/// come out as fully written digit strings with the decimal point shifted by
/// the exponent.
fn expand_decimal(v: f64) -> (bool, String, String) {
    let neg = v < 0.0;
    let fd = d2d(v);
    if fd.mantissa == 0 {
        return (neg, "0".to_string(), String::new());
    }

    let mut buf = itoa::Buffer::new();
    let digits = buf.format(fd.mantissa);
    let exponent = fd.exponent;

    if exponent >= 0 {
        let mut int_part = digits.to_string();
        for _ in 0..exponent {
            int_part.push('0');
        }
        (neg, int_part, String::new())
    } else {
        let shift = (-exponent) as usize;
        if shift >= digits.len() {
            let mut frac = String::new();
            for _ in 0..(shift - digits.len()) {
                frac.push('0');
            }
            frac.push_str(digits);
            (neg, "0".to_string(), frac)
        } else {
            let split = digits.len() - shift;
            (neg, digits[..split].to_string(), digits[split..].to_string())
        }
    }
}
