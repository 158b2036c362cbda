//! Decode fixed-width records into typed values.
//!
//! A fixed-format record has its field boundaries defined by character
//! counts rather than delimiters. Given a parsed [`FieldFormat`], the reader
//! consumes each field's width in order and converts the columns to a
//! [`FieldValue`]:
//!
//! ```
//! use tstext::field_specs::{FieldFormat, FieldValue};
//! use tstext::fixed::read_fixed;
//!
//! let ff = FieldFormat::parse("s8x1i4").unwrap();
//! let vals = read_fixed("GAGE-001 2024", &ff).unwrap();
//! assert_eq!(vals, vec![
//!     FieldValue::Str("GAGE-001".to_string()),
//!     FieldValue::Integer(2024),
//! ]);
//! ```
//!
//! Short records are not an error: once the record is exhausted, the
//! remaining fields receive their type's default (0, 0.0, the empty string,
//! or a NUL character). Blank numeric columns also decode to zero. The only
//! fatal condition is non-blank numeric text that does not convert.

use std::fmt::Display;

use crate::field_specs::{FieldFormat, FieldSpec, FieldType, FieldValue, SpecError};

/// A type alias for `Result` with [`ReadError`] as the error type.
pub type ReadResult<T> = Result<T, ReadError>;

/// An error while decoding a fixed-width record.
#[derive(Debug, Clone, PartialEq)]
pub enum ReadError {
    /// Indicates numeric text in one field that could not be converted. The
    /// index counts fields (including skips) within the descriptor.
    BadField { index: usize, text: String, kind: &'static str },
    /// Indicates an invalid field descriptor.
    Spec(SpecError),
}

impl Display for ReadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BadField { index, text, kind } => {
                write!(f, "Could not parse '{text}' in field {index} as a {kind}")
            }
            Self::Spec(e) => write!(f, "Invalid descriptor: {e}"),
        }
    }
}

impl std::error::Error for ReadError {}

impl From<SpecError> for ReadError {
    fn from(value: SpecError) -> Self {
        Self::Spec(value)
    }
}

/// Decode `record` according to `format`.
///
/// Returns one value per data-producing field, in descriptor order. Space
/// fields are consumed but never appended to the output.
pub fn read_fixed(record: &str, format: &FieldFormat) -> ReadResult<Vec<FieldValue>> {
    let chars: Vec<char> = record.chars().collect();
    let mut pos = 0usize;
    let mut values = Vec::with_capacity(format.data_len());

    for (index, spec) in format.iter_specs().enumerate() {
        let width = spec.width() as usize;
        let end = (pos + width).min(chars.len());
        let piece: String = if pos < chars.len() {
            chars[pos..end].iter().collect()
        } else {
            String::new()
        };
        pos += width;

        let value = match spec {
            FieldSpec::Skip { .. } => continue,
            FieldSpec::Character { .. } => {
                FieldValue::Character(piece.chars().next().unwrap_or('\0'))
            }
            FieldSpec::Integer { .. } => FieldValue::Integer(parse_int(&piece, index)?),
            FieldSpec::Float { .. } | FieldSpec::Double { .. } => {
                FieldValue::Real(parse_real(&piece, index)?)
            }
            // Raw columns, untrimmed; a short record just yields what is left.
            FieldSpec::Str { .. } => FieldValue::Str(piece),
        };
        values.push(value);
    }

    Ok(values)
}

/// Decode `record` with parallel type and width sequences.
///
/// This is a convenience over [`FieldFormat::from_types_widths`] followed by
/// [`read_fixed`].
pub fn read_fixed_types(
    record: &str,
    types: &[FieldType],
    widths: &[u32],
) -> ReadResult<Vec<FieldValue>> {
    let format = FieldFormat::from_types_widths(types, widths)?;
    read_fixed(record, &format)
}

fn parse_int(piece: &str, index: usize) -> ReadResult<i64> {
    let trimmed = piece.trim();
    if trimmed.is_empty() {
        return Ok(0);
    }
    let trimmed = trimmed.strip_prefix('+').unwrap_or(trimmed);
    trimmed.parse().map_err(|_| ReadError::BadField {
        index,
        text: piece.to_string(),
        kind: "integer",
    })
}

fn parse_real(piece: &str, index: usize) -> ReadResult<f64> {
    let trimmed = piece.trim();
    if trimmed.is_empty() {
        return Ok(0.0);
    }
    trimmed.parse().map_err(|_| ReadError::BadField {
        index,
        text: piece.to_string(),
        kind: "real",
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_char_int_record() -> ReadResult<()> {
        let vals = read_fixed_types(
            "AB12",
            &[FieldType::Character, FieldType::Character, FieldType::Integer],
            &[1, 1, 2],
        )?;
        assert_eq!(vals, vec![
            FieldValue::Character('A'),
            FieldValue::Character('B'),
            FieldValue::Integer(12),
        ]);
        Ok(())
    }

    #[test]
    fn test_short_record_defaults() -> ReadResult<()> {
        // The record ends before the integer field; it defaults to 0 with no
        // error.
        let vals = read_fixed_types(
            "AB",
            &[FieldType::Character, FieldType::Character, FieldType::Integer],
            &[1, 1, 2],
        )?;
        assert_eq!(vals, vec![
            FieldValue::Character('A'),
            FieldValue::Character('B'),
            FieldValue::Integer(0),
        ]);
        Ok(())
    }

    #[test]
    fn test_all_defaults_past_end() -> ReadResult<()> {
        let ff = FieldFormat::parse("c1i4f8s6").map_err(ReadError::from)?;
        let vals = read_fixed("", &ff)?;
        assert_eq!(vals, vec![
            FieldValue::Character('\0'),
            FieldValue::Integer(0),
            FieldValue::Real(0.0),
            FieldValue::Str(String::new()),
        ]);
        Ok(())
    }

    #[test]
    fn test_blank_numeric_columns_are_zero() -> ReadResult<()> {
        let ff = FieldFormat::parse("i4f6").map_err(ReadError::from)?;
        let vals = read_fixed("          ", &ff)?;
        assert_eq!(vals, vec![FieldValue::Integer(0), FieldValue::Real(0.0)]);
        Ok(())
    }

    #[test]
    fn test_leading_plus_stripped() -> ReadResult<()> {
        let ff = FieldFormat::parse("i4").map_err(ReadError::from)?;
        let vals = read_fixed("  +7", &ff)?;
        assert_eq!(vals, vec![FieldValue::Integer(7)]);
        Ok(())
    }

    #[test]
    fn test_real_fields() -> ReadResult<()> {
        let ff = FieldFormat::parse("f8.2d8").map_err(ReadError::from)?;
        let vals = read_fixed("   12.25  -3.5e2", &ff)?;
        assert_eq!(vals, vec![FieldValue::Real(12.25), FieldValue::Real(-350.0)]);
        Ok(())
    }

    #[test]
    fn test_string_untrimmed() -> ReadResult<()> {
        let ff = FieldFormat::parse("s6i2").map_err(ReadError::from)?;
        let vals = read_fixed(" abc  42", &ff)?;
        assert_eq!(vals, vec![FieldValue::Str(" abc  ".to_string()), FieldValue::Integer(42)]);
        Ok(())
    }

    #[test]
    fn test_skip_fields_consumed_not_emitted() -> ReadResult<()> {
        let ff = FieldFormat::parse("i2x3i2").map_err(ReadError::from)?;
        let vals = read_fixed("12   34", &ff)?;
        assert_eq!(vals, vec![FieldValue::Integer(12), FieldValue::Integer(34)]);
        Ok(())
    }

    #[test]
    fn test_malformed_numeric_is_fatal() {
        let ff = FieldFormat::parse("i2i4").unwrap();
        let e = read_fixed("12 abc", &ff);
        assert_eq!(
            e,
            Err(ReadError::BadField { index: 1, text: " abc".to_string(), kind: "integer" })
        );
    }

    #[test]
    fn test_partial_last_field() -> ReadResult<()> {
        // The record runs out mid-field; the available columns are used.
        let ff = FieldFormat::parse("i4").map_err(ReadError::from)?;
        let vals = read_fixed("12", &ff)?;
        assert_eq!(vals, vec![FieldValue::Integer(12)]);
        Ok(())
    }
}
