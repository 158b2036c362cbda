//! Represent fixed-width field descriptors as Rust types.
//!
//! The first step in reading a fixed-format record such as a StateMod or
//! HydroBase card line is to parse its compact descriptor string (e.g.
//! `"a10i5f8.2"`) into a [`FieldFormat`] with its `parse` method:
//!
//! ```
//! # use tstext::field_specs::FieldFormat;
//! let ff = FieldFormat::parse("a10i5f8.2").unwrap();
//! assert_eq!(ff.data_len(), 3);
//! ```
//!
//! From there, this can be used for [fixed-field reading](crate::fixed) or you
//! can inspect the fields directly with the `into_specs`, `iter_specs`, and
//! `iter_data_specs` methods on [`FieldFormat`].
use std::fmt::Display;

use pest::{iterators::Pair, Parser};

type SpecResult<T> = std::result::Result<T, SpecError>;

/// An error in a field descriptor string or descriptor construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecError {
    /// Indicates that a descriptor string could not be parsed.
    Syntax { spec: String, reason: String },
    /// Indicates that parallel type and width sequences had different lengths.
    LengthMismatch { ntypes: usize, nwidths: usize },
}

impl SpecError {
    fn from_pest(spec: &str, e: pest::error::Error<Rule>) -> Self {
        Self::Syntax { spec: spec.to_string(), reason: e.to_string() }
    }
}

impl Display for SpecError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Syntax { spec, reason } => {
                write!(f, "Invalid field descriptor '{spec}': {reason}")
            }
            Self::LengthMismatch { ntypes, nwidths } => {
                write!(f, "Got {ntypes} field types but {nwidths} field widths")
            }
        }
    }
}

impl std::error::Error for SpecError {}

#[derive(Parser)]
#[grammar = "field.pest"]
pub(crate) struct FieldParser;

/// The six kinds of field a fixed-format record can contain.
///
/// `Space` columns exist only for alignment; they are consumed while reading
/// but never produce a value. `Float` and `Double` both decode to a
/// [`FieldValue::Real`], the distinction only matters for display precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Character,
    Double,
    Float,
    Integer,
    String,
    Space,
}

impl FieldType {
    /// Build the [`FieldSpec`] for this type occupying `width` columns.
    pub fn with_width(self, width: u32) -> FieldSpec {
        match self {
            FieldType::Character => FieldSpec::Character { width },
            FieldType::Double => FieldSpec::Double { width, precision: None },
            FieldType::Float => FieldSpec::Float { width, precision: None },
            FieldType::Integer => FieldSpec::Integer { width },
            FieldType::String => FieldSpec::Str { width },
            FieldType::Space => FieldSpec::Skip { width },
        }
    }
}

/// A representation of a full entry in a field descriptor, i.e. one `c`, `i`, etc.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldSpec {
    /// A single-character field. Only the first character of the consumed
    /// columns is kept; the descriptor width defaults to 1 when omitted.
    Character { width: u32 },

    /// An integer field. Blank columns decode to 0 and a leading `+` is
    /// accepted and stripped.
    Integer { width: u32 },

    /// A single-precision real field. If the descriptor included a precision
    /// (i.e. the 2 in "f8.2"), it is stored in the `precision` inner field;
    /// otherwise that will be `None`. The precision is display metadata only
    /// and does not affect reading.
    Float { width: u32, precision: Option<u32> },

    /// A double-precision real field; same shape as [`FieldSpec::Float`].
    Double { width: u32, precision: Option<u32> },

    /// A string field. The consumed columns are kept verbatim, untrimmed.
    Str { width: u32 },

    /// Alignment filler; consumed while reading but never emitted.
    Skip { width: u32 },
}

impl FieldSpec {
    /// The number of record columns this field consumes.
    pub fn width(&self) -> u32 {
        match *self {
            FieldSpec::Character { width } => width,
            FieldSpec::Integer { width } => width,
            FieldSpec::Float { width, .. } => width,
            FieldSpec::Double { width, .. } => width,
            FieldSpec::Str { width } => width,
            FieldSpec::Skip { width } => width,
        }
    }

    /// The [`FieldType`] this spec was built from.
    pub fn field_type(&self) -> FieldType {
        match self {
            FieldSpec::Character { .. } => FieldType::Character,
            FieldSpec::Integer { .. } => FieldType::Integer,
            FieldSpec::Float { .. } => FieldType::Float,
            FieldSpec::Double { .. } => FieldType::Double,
            FieldSpec::Str { .. } => FieldType::String,
            FieldSpec::Skip { .. } => FieldType::Space,
        }
    }

    /// Returns `true` if the field is alignment filler, `false` otherwise.
    pub fn is_skip(&self) -> bool {
        matches!(self, FieldSpec::Skip { .. })
    }
}

impl Display for FieldSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldSpec::Character { width } => write!(f, "c{width}"),
            FieldSpec::Integer { width } => write!(f, "i{width}"),
            FieldSpec::Float { width, precision } => {
                if let Some(p) = precision {
                    write!(f, "f{width}.{p}")
                } else {
                    write!(f, "f{width}")
                }
            }
            FieldSpec::Double { width, precision } => {
                if let Some(p) = precision {
                    write!(f, "d{width}.{p}")
                } else {
                    write!(f, "d{width}")
                }
            }
            FieldSpec::Str { width } => write!(f, "s{width}"),
            FieldSpec::Skip { width } => write!(f, "x{width}"),
        }
    }
}

/// A representation of any scalar value decoded from a record.
///
/// Both float and double descriptors decode to the `Real` variant; the
/// width/precision distinction only matters when writing. String fields are
/// mapped to `String`s, with the assumption that fixed-format data is ASCII.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Character(char),
    Integer(i64),
    Real(f64),
    Str(String),
}

impl Display for FieldValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldValue::Character(c) => write!(f, "{c}"),
            FieldValue::Integer(i) => write!(f, "{i}"),
            FieldValue::Real(v) => write!(f, "{v}"),
            FieldValue::Str(s) => write!(f, "{s}"),
        }
    }
}

/// An iterator over specs in a field descriptor.
///
/// This can iterate over all specs or only data-producing (non-skip) ones.
/// Which set it yields will be documented by the functions that return it.
pub struct SpecIter<'i> {
    all: bool,
    specs: std::slice::Iter<'i, FieldSpec>,
}

impl<'i> Iterator for SpecIter<'i> {
    type Item = &'i FieldSpec;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let element = self.specs.next()?;
            if self.all || !element.is_skip() {
                return Some(element);
            }
        }
    }
}

/// A wrapper struct containing a full descriptor string's field specs.
///
/// Generally the first step in handling a fixed-format record will be to pass
/// its descriptor to this struct's `parse` method:
///
/// ```
/// # use tstext::field_specs::FieldFormat;
/// let ff = FieldFormat::parse("c1x1i2").unwrap();
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldFormat {
    pub(crate) specs: Vec<FieldSpec>,
}

impl FieldFormat {
    /// Parse a compact field descriptor string and return a `FieldFormat`.
    ///
    /// The letters `c`, `i`, `f`, `d`, `s` (or `a`), and `x` introduce
    /// character, integer, float, double, string, and space fields. All but
    /// `c` and `x` require a width; `f` and `d` accept an optional
    /// `.precision`. Spaces, tabs, carriage returns, and newlines are all
    /// considered whitespace and ignored in parsing.
    ///
    /// Returns an error if the descriptor has invalid syntax.
    pub fn parse(spec_str: &str) -> SpecResult<Self> {
        let tree = FieldParser::parse(Rule::format, spec_str)
            .map_err(|e| SpecError::from_pest(spec_str, e))?
            .next()
            .ok_or_else(|| SpecError::Syntax {
                spec: spec_str.to_string(),
                reason: "empty parse tree".to_string(),
            })?;

        let mut specs = vec![];
        for pair in tree.into_inner() {
            let spec = match pair.as_rule() {
                Rule::EOI => break,
                Rule::charf => FieldSpec::Character { width: consume_width(pair).unwrap_or(1) },
                Rule::intf => FieldSpec::Integer { width: consume_width(pair).unwrap_or(1) },
                Rule::floatf => {
                    let (width, precision) = consume_width_and_prec(pair);
                    FieldSpec::Float { width: width.unwrap_or(1), precision }
                }
                Rule::doublef => {
                    let (width, precision) = consume_width_and_prec(pair);
                    FieldSpec::Double { width: width.unwrap_or(1), precision }
                }
                Rule::stringf => FieldSpec::Str { width: consume_width(pair).unwrap_or(1) },
                Rule::skipf => FieldSpec::Skip { width: consume_width(pair).unwrap_or(1) },
                // Widths and precisions only occur inside field rules, and the
                // field rule itself is silent.
                _ => {
                    return Err(SpecError::Syntax {
                        spec: spec_str.to_string(),
                        reason: format!("unexpected rule {:?}", pair.as_rule()),
                    })
                }
            };
            specs.push(spec);
        }

        Ok(Self { specs })
    }

    /// Build a `FieldFormat` from parallel type and width sequences.
    ///
    /// Returns an error if the sequences have different lengths.
    pub fn from_types_widths(types: &[FieldType], widths: &[u32]) -> SpecResult<Self> {
        if types.len() != widths.len() {
            return Err(SpecError::LengthMismatch { ntypes: types.len(), nwidths: widths.len() });
        }
        let specs = types
            .iter()
            .zip(widths.iter())
            .map(|(&t, &w)| t.with_width(w))
            .collect();
        Ok(Self { specs })
    }

    /// Consume the `FieldFormat` instance and return the inner `Vec<FieldSpec>`.
    pub fn into_specs(self) -> Vec<FieldSpec> {
        self.specs
    }

    /// Iterate over all specs in this format (including skips).
    pub fn iter_specs(&self) -> SpecIter {
        SpecIter { specs: self.specs.iter(), all: true }
    }

    /// Iterate over data-producing (non-skip) specs in this format.
    pub fn iter_data_specs(&self) -> SpecIter {
        SpecIter { specs: self.specs.iter(), all: false }
    }

    /// Return the number of data-producing specs in this format.
    pub fn data_len(&self) -> usize {
        self.iter_data_specs().count()
    }
}

impl Display for FieldFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for spec in self.specs.iter() {
            write!(f, "{spec}")?;
        }
        Ok(())
    }
}

fn consume_width(pair: Pair<Rule>) -> Option<u32> {
    let inner = pair.into_inner().next()?;
    if let Rule::width = inner.as_rule() {
        inner.as_str().parse().ok()
    } else {
        None
    }
}

fn consume_width_and_prec(pair: Pair<Rule>) -> (Option<u32>, Option<u32>) {
    let mut width = None;
    let mut prec = None;
    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::width => width = inner.as_str().parse().ok(),
            Rule::prec => prec = inner.as_str().parse().ok(),
            _ => {}
        }
    }
    (width, prec)
}
