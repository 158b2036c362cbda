//! Quote-aware splitting of delimited strings.
//!
//! # Basic usage
//!
//! [`break_string_list`] splits one line of delimited text into its tokens.
//! Which characters count as delimiters and how blanks and quotes are handled
//! is controlled by a [`SplitOptions`]:
//!
//! ```
//! use tstext::tokenize::{break_string_list, SplitOptions};
//!
//! let opts = SplitOptions::default().allow_quoted(true);
//! let tokens = break_string_list("a,\"b,c\",d", ",", &opts);
//! assert_eq!(tokens, vec!["a", "b,c", "d"]);
//! ```
//!
//! Characters inside a matching pair of double or single quotes are never
//! treated as delimiters. A doubled quote inside a quoted field is the escape
//! for a literal quote, and a backslash-escaped `\"` passes through as those
//! two characters regardless of quote state.
//!
//! # Blank handling
//!
//! With `skip_blanks` set, consecutive delimiters collapse into a single
//! separator and delimiters before the first token produce nothing:
//!
//! ```
//! # use tstext::tokenize::{break_string_list, SplitOptions};
//! let opts = SplitOptions::default().skip_blanks(true);
//! assert_eq!(break_string_list(",a,,b", ",", &opts), vec!["a", "b"]);
//!
//! let opts = SplitOptions::default();
//! assert_eq!(break_string_list("a,,b", ",", &opts), vec!["a", "", "b"]);
//! ```
//!
//! A quoted empty field (`""`) counts as a real token and survives
//! `skip_blanks`.
//!
//! An unterminated quote at the end of the input is not an error: whatever was
//! accumulated is emitted as the final token.

/// Settings for splitting delimited strings.
///
/// To use, instantiate the default version with `SplitOptions::default()` and
/// modify the desired settings with the public methods:
///
/// ```
/// # use tstext::tokenize::SplitOptions;
/// let opts = SplitOptions::default().skip_blanks(true).allow_quoted(true);
/// ```
#[derive(Debug, Clone, Default)]
pub struct SplitOptions {
    skip_blanks: bool,
    allow_quoted: bool,
    retain_quotes: bool,
}

impl SplitOptions {
    /// Set whether runs of delimiters collapse to one separator.
    ///
    /// Default is `false`, i.e. every delimiter ends a token, so consecutive
    /// delimiters produce empty tokens.
    pub fn skip_blanks(mut self, skip_blanks: bool) -> Self {
        self.skip_blanks = skip_blanks;
        self
    }

    /// Set whether quote characters protect embedded delimiters.
    ///
    /// Default is `false`, i.e. quotes are ordinary characters.
    pub fn allow_quoted(mut self, allow_quoted: bool) -> Self {
        self.allow_quoted = allow_quoted;
        self
    }

    /// Set whether the quotes bounding a quoted field are kept in the token.
    ///
    /// Default is `false`, i.e. bounding quotes are stripped. Only meaningful
    /// together with `allow_quoted`.
    pub fn retain_quotes(mut self, retain_quotes: bool) -> Self {
        self.retain_quotes = retain_quotes;
        self
    }
}

/// Split `input` into tokens at any character of `delimiters`.
///
/// The scan is a single pass over the characters of `input`; no state is
/// retained between calls. Token order matches input order. An empty input
/// produces an empty vector.
pub fn break_string_list(input: &str, delimiters: &str, opts: &SplitOptions) -> Vec<String> {
    let mut tokens: Vec<String> = vec![];
    let mut current = String::new();
    // A quoted empty field is still a token, so emptiness alone cannot decide
    // whether to emit.
    let mut current_quoted = false;
    let mut quote_char: Option<char> = None;

    let mut chars = input.chars().peekable();
    while let Some(c) = chars.next() {
        // Backslash-escaped double quote passes through untouched, whether or
        // not we are inside a quoted field.
        if c == '\\' && chars.peek() == Some(&'"') {
            chars.next();
            current.push('\\');
            current.push('"');
            continue;
        }

        if let Some(q) = quote_char {
            if c == q {
                // A doubled quote is an escaped literal quote; the field
                // stays open.
                if chars.peek() == Some(&q) {
                    chars.next();
                    if opts.retain_quotes {
                        current.push(q);
                    }
                    current.push(q);
                } else {
                    if opts.retain_quotes {
                        current.push(q);
                    }
                    quote_char = None;
                }
            } else {
                current.push(c);
            }
            continue;
        }

        if opts.allow_quoted && (c == '"' || c == '\'') {
            quote_char = Some(c);
            current_quoted = true;
            if opts.retain_quotes {
                current.push(c);
            }
            continue;
        }

        if delimiters.contains(c) {
            push_token(&mut tokens, &mut current, &mut current_quoted, opts);
        } else {
            current.push(c);
        }
    }

    // Emit the trailing token. An unterminated quoted field still counts, and
    // a bare trailing delimiter leaves an empty final token (filtered inside
    // push_token when skipping blanks). Only a fully empty input yields no
    // trailing token at all.
    if !input.is_empty() {
        push_token(&mut tokens, &mut current, &mut current_quoted, opts);
    }

    tokens
}

/// Split on commas with default options; the common case for simple CSV text.
pub fn break_string_list_simple(input: &str) -> Vec<String> {
    break_string_list(input, ",", &SplitOptions::default())
}

fn push_token(tokens: &mut Vec<String>, current: &mut String, quoted: &mut bool, opts: &SplitOptions) {
    let token = std::mem::take(current);
    let was_quoted = std::mem::take(quoted);
    if opts.skip_blanks && token.is_empty() && !was_quoted {
        return;
    }
    tokens.push(token);
}
