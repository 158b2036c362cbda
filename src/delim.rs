//! Assemble aligned time series into one delimited text document.
//!
//! # Basic usage
//!
//! [`write_delimited`] takes one or more [`TimeSeries`] sharing an
//! [`Interval`] and produces comment lines, a header row, and one data row per
//! time step:
//!
//! ```
//! use chrono::NaiveDate;
//! use tstext::delim::{write_delimited, DelimitedWriteOptions, Interval, TimeSeries};
//!
//! let t0 = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
//! let mut ts = TimeSeries::new("TS1", Interval::Month(1));
//! ts.push(t0, 1.5);
//!
//! let opts = DelimitedWriteOptions::default().precision(1);
//! let text = write_delimited(&[ts], &opts).unwrap();
//! assert_eq!(text, "Date,TS1\n2024-01,1.5\n");
//! ```
//!
//! Rows run inclusively from the earliest series start to the latest series
//! end; where a series has no sample, or its sample equals its missing-value
//! sentinel, the cell renders the configured missing text (or the sentinel
//! itself through the [formatter](crate::printf)) instead of being skipped.
//! Every row therefore has exactly `series count + 1` cells.
//!
//! Cells containing the delimiter or a quote are quoted with doubled-quote
//! escaping, so splitting the output with
//! [`break_string_list`](crate::tokenize::break_string_list) and
//! `allow_quoted` recovers the original cells.

use std::fmt::Display;

use chrono::{Duration, Months, NaiveDateTime};
use itertools::Itertools;

use crate::field_specs::FieldValue;
use crate::printf::{format_values, FormatError};

/// The spacing between consecutive samples of a time series.
///
/// Regular variants carry a multiplier (e.g. `Minute(15)` for quarter-hour
/// data). `Irregular` marks a series whose samples are not evenly spaced;
/// such a series can only be written on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interval {
    Minute(u32),
    Hour(u32),
    Day(u32),
    Month(u32),
    Year(u32),
    Irregular,
}

impl Interval {
    /// `true` for [`Interval::Irregular`], `false` otherwise.
    pub fn is_irregular(&self) -> bool {
        matches!(self, Interval::Irregular)
    }

    /// The timestamp one step after `t`, or `None` for irregular intervals
    /// and calendar overflow.
    pub fn advance(&self, t: NaiveDateTime) -> Option<NaiveDateTime> {
        match *self {
            Interval::Minute(n) => t.checked_add_signed(Duration::minutes(n as i64)),
            Interval::Hour(n) => t.checked_add_signed(Duration::hours(n as i64)),
            Interval::Day(n) => t.checked_add_signed(Duration::days(n as i64)),
            Interval::Month(n) => t.checked_add_months(Months::new(n)),
            Interval::Year(n) => t.checked_add_months(Months::new(n.saturating_mul(12))),
            Interval::Irregular => None,
        }
    }

    /// Format `t` at the granularity this interval implies. Monthly data gets
    /// a year-month label, daily data a full date, and so on.
    pub fn label(&self, t: &NaiveDateTime) -> String {
        let fmt = match self {
            Interval::Year(_) => "%Y",
            Interval::Month(_) => "%Y-%m",
            Interval::Day(_) => "%Y-%m-%d",
            Interval::Hour(_) | Interval::Minute(_) => "%Y-%m-%d %H:%M",
            Interval::Irregular => "%Y-%m-%d %H:%M:%S",
        };
        t.format(fmt).to_string()
    }
}

impl Display for Interval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Interval::Minute(n) => write!(f, "{n}Minute"),
            Interval::Hour(n) => write!(f, "{n}Hour"),
            Interval::Day(n) => write!(f, "{n}Day"),
            Interval::Month(n) => write!(f, "{n}Month"),
            Interval::Year(n) => write!(f, "{n}Year"),
            Interval::Irregular => write!(f, "Irregular"),
        }
    }
}

/// One named series of `(timestamp, value)` samples.
///
/// Samples are kept sorted by timestamp. A value equal to the series
/// missing-value sentinel (default -999.0), or a NaN, counts as missing.
#[derive(Debug, Clone)]
pub struct TimeSeries {
    name: String,
    interval: Interval,
    missing_value: f64,
    samples: Vec<(NaiveDateTime, f64)>,
}

impl TimeSeries {
    pub fn new(name: impl Into<String>, interval: Interval) -> Self {
        Self { name: name.into(), interval, missing_value: -999.0, samples: vec![] }
    }

    /// Set the sentinel that marks a sample as missing. NaN is also always
    /// treated as missing.
    pub fn with_missing_value(mut self, missing_value: f64) -> Self {
        self.missing_value = missing_value;
        self
    }

    /// Insert or overwrite the sample at `t`.
    pub fn push(&mut self, t: NaiveDateTime, value: f64) {
        match self.samples.binary_search_by_key(&t, |&(ts, _)| ts) {
            Ok(i) => self.samples[i].1 = value,
            Err(i) => self.samples.insert(i, (t, value)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn interval(&self) -> Interval {
        self.interval
    }

    pub fn missing_value(&self) -> f64 {
        self.missing_value
    }

    pub fn samples(&self) -> &[(NaiveDateTime, f64)] {
        &self.samples
    }

    /// Timestamp of the first sample, if any.
    pub fn start(&self) -> Option<NaiveDateTime> {
        self.samples.first().map(|&(t, _)| t)
    }

    /// Timestamp of the last sample, if any.
    pub fn end(&self) -> Option<NaiveDateTime> {
        self.samples.last().map(|&(t, _)| t)
    }

    /// The value recorded exactly at `t`, if any.
    pub fn value_at(&self, t: NaiveDateTime) -> Option<f64> {
        self.samples
            .binary_search_by_key(&t, |&(ts, _)| ts)
            .ok()
            .map(|i| self.samples[i].1)
    }

    /// `true` if `value` is NaN or equals the missing-value sentinel.
    pub fn is_missing(&self, value: f64) -> bool {
        value.is_nan() || value == self.missing_value
    }
}

/// Settings for writing a delimited document.
///
/// To use, instantiate the default version with
/// `DelimitedWriteOptions::default()` and modify the desired settings with the
/// public methods:
///
/// ```
/// # use tstext::delim::DelimitedWriteOptions;
/// let opts = DelimitedWriteOptions::default()
///     .delimiter('\t')
///     .precision(3)
///     .missing_text("NA");
/// ```
#[derive(Debug, Clone)]
pub struct DelimitedWriteOptions {
    date_column: String,
    delimiter: char,
    precision: u32,
    missing_text: Option<String>,
    comments: Vec<String>,
}

impl Default for DelimitedWriteOptions {
    fn default() -> Self {
        Self {
            date_column: "Date".to_string(),
            delimiter: ',',
            precision: 2,
            missing_text: None,
            comments: vec![],
        }
    }
}

impl DelimitedWriteOptions {
    /// Set the header name of the date/time column. Default is `Date`.
    pub fn date_column(mut self, name: impl Into<String>) -> Self {
        self.date_column = name.into();
        self
    }

    /// Set the cell delimiter. Default is a comma.
    pub fn delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Set the number of fractional digits for data values. Default is 2.
    pub fn precision(mut self, precision: u32) -> Self {
        self.precision = precision;
        self
    }

    /// Set the text written for missing values. When unset, a series' own
    /// missing-value sentinel is formatted like any other number.
    pub fn missing_text(mut self, text: impl Into<String>) -> Self {
        self.missing_text = Some(text.into());
        self
    }

    /// Set comment lines emitted before the header. Each line is prefixed
    /// with `#` if it does not already start with one.
    pub fn comments(mut self, comments: Vec<String>) -> Self {
        self.comments = comments;
        self
    }
}

/// Errors that can occur while assembling a delimited document.
#[derive(Debug, Clone, PartialEq)]
pub enum WriteError {
    /// Indicates that no series were given.
    NoSeries,
    /// Indicates that the series do not all share one regular interval.
    IntervalMismatch { expected: Interval, found: Interval, series: String },
    /// Indicates an irregular series written together with other series.
    IrregularLimit { count: usize },
    /// Indicates a failure formatting a data value.
    Format(FormatError),
}

impl Display for WriteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoSeries => write!(f, "No time series were given to write"),
            Self::IntervalMismatch { expected, found, series } => {
                write!(f, "Series '{series}' has interval {found}, but {expected} was expected")
            }
            Self::IrregularLimit { count } => {
                write!(f, "An irregular series must be written alone, but {count} series were given")
            }
            Self::Format(e) => write!(f, "Error formatting a data value: {e}"),
        }
    }
}

impl std::error::Error for WriteError {}

impl From<FormatError> for WriteError {
    fn from(value: FormatError) -> Self {
        Self::Format(value)
    }
}

/// Compose comment, header, and data rows for `series` into one document.
///
/// All series must share the same regular interval; an irregular series is
/// only accepted alone and emits one row per sample at its own timestamps.
/// Rows cover the earliest start through the latest end inclusive.
pub fn write_delimited(
    series: &[TimeSeries],
    opts: &DelimitedWriteOptions,
) -> Result<String, WriteError> {
    if series.is_empty() {
        return Err(WriteError::NoSeries);
    }

    let n_irregular = series.iter().filter(|ts| ts.interval.is_irregular()).count();
    if n_irregular > 0 && series.len() > 1 {
        return Err(WriteError::IrregularLimit { count: series.len() });
    }
    let expected = series[0].interval;
    for ts in &series[1..] {
        if ts.interval != expected {
            return Err(WriteError::IntervalMismatch {
                expected,
                found: ts.interval,
                series: ts.name.clone(),
            });
        }
    }

    let delim = opts.delimiter.to_string();
    let mut out = String::new();

    for comment in &opts.comments {
        if !comment.starts_with('#') {
            out.push_str("# ");
        }
        out.push_str(comment);
        out.push('\n');
    }

    let header = std::iter::once(opts.date_column.as_str())
        .chain(series.iter().map(|ts| ts.name.as_str()))
        .map(|cell| quote_cell(cell, opts.delimiter))
        .join(&delim);
    out.push_str(&header);
    out.push('\n');

    let value_fmt = format!("%.{}f", opts.precision);

    if expected.is_irregular() {
        let ts = &series[0];
        for &(t, _) in ts.samples() {
            push_row(&mut out, series, t, &expected, &value_fmt, opts, &delim)?;
        }
        return Ok(out);
    }

    let start = series.iter().filter_map(|ts| ts.start()).min();
    let end = series.iter().filter_map(|ts| ts.end()).max();
    let (start, end) = match (start, end) {
        (Some(s), Some(e)) => (s, e),
        // All series empty: header only.
        _ => return Ok(out),
    };

    let mut t = start;
    while t <= end {
        push_row(&mut out, series, t, &expected, &value_fmt, opts, &delim)?;
        match expected.advance(t) {
            Some(next) => t = next,
            None => break,
        }
    }

    Ok(out)
}

fn push_row(
    out: &mut String,
    series: &[TimeSeries],
    t: NaiveDateTime,
    interval: &Interval,
    value_fmt: &str,
    opts: &DelimitedWriteOptions,
    delim: &str,
) -> Result<(), WriteError> {
    let mut cells: Vec<String> = Vec::with_capacity(series.len() + 1);
    cells.push(quote_cell(&interval.label(&t), opts.delimiter));
    for ts in series {
        cells.push(value_cell(ts, t, value_fmt, opts)?);
    }
    out.push_str(&cells.iter().join(delim));
    out.push('\n');
    Ok(())
}

fn value_cell(
    ts: &TimeSeries,
    t: NaiveDateTime,
    value_fmt: &str,
    opts: &DelimitedWriteOptions,
) -> Result<String, WriteError> {
    let missing = match ts.value_at(t) {
        None => true,
        Some(v) => ts.is_missing(v),
    };
    if missing {
        if let Some(text) = &opts.missing_text {
            return Ok(quote_cell(text, opts.delimiter));
        }
        // No configured text: the sentinel itself goes through the formatter
        // (NaN comes out as the literal token).
        let formatted = format_values(&[FieldValue::Real(ts.missing_value)], value_fmt)?;
        return Ok(quote_cell(&formatted, opts.delimiter));
    }
    let v = ts.value_at(t).unwrap_or(ts.missing_value);
    let formatted = format_values(&[FieldValue::Real(v)], value_fmt)?;
    Ok(quote_cell(&formatted, opts.delimiter))
}

/// Quote a cell whose text contains the delimiter or a quote, doubling any
/// embedded quotes so the tokenizer can round-trip the output.
fn quote_cell(cell: &str, delimiter: char) -> String {
    if cell.contains(delimiter) || cell.contains('"') {
        let escaped = cell.replace('"', "\"\"");
        format!("\"{escaped}\"")
    } else {
        cell.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenize::{break_string_list, SplitOptions};
    use chrono::NaiveDate;

    fn dt(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn monthly(name: &str, start: (i32, u32), values: &[f64]) -> TimeSeries {
        let mut ts = TimeSeries::new(name, Interval::Month(1));
        let mut t = dt(start.0, start.1, 1);
        for &v in values {
            ts.push(t, v);
            t = Interval::Month(1).advance(t).unwrap();
        }
        ts
    }

    #[test]
    fn test_single_series_document() {
        let ts = monthly("TS1", (2024, 1), &[1.0, 2.5, 3.25]);
        let opts = DelimitedWriteOptions::default();
        let text = write_delimited(&[ts], &opts).unwrap();
        assert_eq!(text, "Date,TS1\n2024-01,1.00\n2024-02,2.50\n2024-03,3.25\n");
    }

    #[test]
    fn test_missing_value_text() {
        // Spec'd end-to-end case: two monthly series, one NaN sample, the
        // missing cell must equal the configured text exactly.
        let ts1 = monthly("TS1", (2024, 1), &[1.0, 2.0, 3.0]);
        let ts2 = monthly("TS2", (2024, 1), &[4.0, f64::NAN, 6.0]);
        let opts = DelimitedWriteOptions::default().precision(1).missing_text("MISSING");
        let text = write_delimited(&[ts1, ts2], &opts).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Date,TS1,TS2");
        assert_eq!(lines[2], "2024-02,2.0,MISSING");
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn test_missing_sentinel_goes_through_formatter() {
        let mut ts = TimeSeries::new("TS1", Interval::Month(1)).with_missing_value(-999.0);
        ts.push(dt(2024, 1, 1), 1.0);
        ts.push(dt(2024, 2, 1), -999.0);
        let opts = DelimitedWriteOptions::default().precision(1);
        let text = write_delimited(&[ts], &opts).unwrap();
        assert_eq!(text, "Date,TS1\n2024-01,1.0\n2024-02,-999.0\n");
    }

    #[test]
    fn test_gap_is_rendered_not_skipped() {
        let mut ts = TimeSeries::new("TS1", Interval::Day(1));
        ts.push(dt(2024, 3, 1), 1.0);
        ts.push(dt(2024, 3, 3), 3.0);
        let opts = DelimitedWriteOptions::default().precision(0).missing_text("NA");
        let text = write_delimited(&[ts], &opts).unwrap();
        assert_eq!(text, "Date,TS1\n2024-03-01,1\n2024-03-02,NA\n2024-03-03,3\n");
    }

    #[test]
    fn test_union_period_across_series() {
        let ts1 = monthly("TS1", (2024, 1), &[1.0, 2.0]);
        let ts2 = monthly("TS2", (2024, 2), &[5.0, 6.0]);
        let opts = DelimitedWriteOptions::default().precision(0).missing_text("NA");
        let text = write_delimited(&[ts1, ts2], &opts).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, vec![
            "Date,TS1,TS2",
            "2024-01,1,NA",
            "2024-02,2,5",
            "2024-03,NA,6",
        ]);
    }

    #[test]
    fn test_comments_are_prefixed() {
        let ts = monthly("TS1", (2024, 1), &[1.0]);
        let opts = DelimitedWriteOptions::default()
            .precision(0)
            .comments(vec!["generated by test".to_string(), "# already prefixed".to_string()]);
        let text = write_delimited(&[ts], &opts).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "# generated by test");
        assert_eq!(lines[1], "# already prefixed");
        assert_eq!(lines[2], "Date,TS1");
    }

    #[test]
    fn test_interval_mismatch_is_fatal() {
        let ts1 = monthly("TS1", (2024, 1), &[1.0]);
        let mut ts2 = TimeSeries::new("TS2", Interval::Day(1));
        ts2.push(dt(2024, 1, 1), 2.0);
        let e = write_delimited(&[ts1, ts2], &DelimitedWriteOptions::default());
        assert_eq!(
            e,
            Err(WriteError::IntervalMismatch {
                expected: Interval::Month(1),
                found: Interval::Day(1),
                series: "TS2".to_string(),
            })
        );
    }

    #[test]
    fn test_irregular_must_be_alone() {
        let ts1 = monthly("TS1", (2024, 1), &[1.0]);
        let mut ts2 = TimeSeries::new("TS2", Interval::Irregular);
        ts2.push(dt(2024, 1, 1), 2.0);
        let e = write_delimited(&[ts1, ts2], &DelimitedWriteOptions::default());
        assert_eq!(e, Err(WriteError::IrregularLimit { count: 2 }));
    }

    #[test]
    fn test_single_irregular_series() {
        let mut ts = TimeSeries::new("Events", Interval::Irregular);
        ts.push(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap().and_hms_opt(3, 15, 30).unwrap(),
            1.5,
        );
        ts.push(
            NaiveDate::from_ymd_opt(2024, 1, 5).unwrap().and_hms_opt(22, 0, 0).unwrap(),
            2.5,
        );
        let opts = DelimitedWriteOptions::default().precision(1);
        let text = write_delimited(&[ts], &opts).unwrap();
        assert_eq!(
            text,
            "Date,Events\n2024-01-01 03:15:30,1.5\n2024-01-05 22:00:00,2.5\n"
        );
    }

    #[test]
    fn test_no_series_is_an_error() {
        let e = write_delimited(&[], &DelimitedWriteOptions::default());
        assert_eq!(e, Err(WriteError::NoSeries));
    }

    #[test]
    fn test_empty_series_header_only() {
        let ts = TimeSeries::new("TS1", Interval::Month(1));
        let text = write_delimited(&[ts], &DelimitedWriteOptions::default()).unwrap();
        assert_eq!(text, "Date,TS1\n");
    }

    #[test]
    fn test_tokenizer_round_trip() {
        // Splitting the output on its own delimiter, respecting its quoting,
        // must recover the cell count of every row.
        let mut ts1 = monthly("Flow, gaged", (2024, 1), &[1.0, 2.0]);
        ts1 = ts1.with_missing_value(f64::NAN);
        let ts2 = monthly("TS2", (2024, 1), &[3.0, 4.0]);
        let opts = DelimitedWriteOptions::default().missing_text("no, data");
        let text = write_delimited(&[ts1, ts2], &opts).unwrap();

        let split_opts = SplitOptions::default().allow_quoted(true);
        for line in text.lines() {
            let cells = break_string_list(line, ",", &split_opts);
            assert_eq!(cells.len(), 3, "row '{line}' did not split into 3 cells");
        }
        assert!(text.contains("\"Flow, gaged\""));
    }
}
