//! Error types for CONL parsing and serialization.
//!
//! Parsing is all-or-nothing: the first error aborts the parse and no
//! partial tree is returned. Every parse error carries the 1-based line
//! number of the offending token so callers can point users at the exact
//! place in the document.
//!
//! ## Examples
//!
//! ```rust
//! use conl::{parse_str, ParseError};
//!
//! let err = parse_str("a = 1\na = 2\n").unwrap_err();
//! assert!(matches!(err, ParseError::DuplicateKey { line: 2, .. }));
//! assert_eq!(err.line(), Some(2));
//! ```

use std::fmt;
use thiserror::Error;

/// All the ways a CONL document can be rejected.
///
/// Each variant except [`ParseError::Message`] carries the 1-based source
/// line at which the offending token begins.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// A line's indentation matches neither the current level nor any
    /// enclosing level.
    #[error("line {line}: inconsistent indentation")]
    InconsistentIndent { line: usize },

    /// A quoted scalar was not closed before the end of the line.
    #[error("line {line}: unclosed quotes")]
    UnterminatedQuote { line: usize },

    /// An unrecognized escape sequence inside a quoted scalar.
    #[error("line {line}: invalid escape code: \\{escape}")]
    InvalidEscape { line: usize, escape: String },

    /// A `\{H}` escape named a codepoint above U+10FFFF or a surrogate.
    #[error("line {line}: invalid codepoint: \\{{{digits}}}")]
    InvalidCodepoint { line: usize, digits: String },

    /// A line that matches no production of the key/value/list-item grammar.
    #[error("line {line}: {msg}")]
    MalformedLine { line: usize, msg: String },

    /// The same decoded key appeared twice in one map section.
    #[error("line {line}: duplicate key: {key}")]
    DuplicateKey { line: usize, key: String },

    /// A section begun as a map contained a list item, or vice versa.
    #[error("line {line}: expected {expected}, found {found}")]
    MixedSectionKind {
        line: usize,
        expected: &'static str,
        found: &'static str,
    },

    /// A caller-configured depth or size guard tripped.
    #[error("line {line}: {msg}")]
    ResourceLimitExceeded { line: usize, msg: String },

    /// The input was not valid UTF-8.
    #[error("line {line}: invalid UTF-8")]
    InvalidUtf8 { line: usize },

    /// A value of one shape was coerced to an incompatible shape.
    #[error("expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    /// Conversion or serde-reported error, not tied to a source line.
    #[error("{0}")]
    Message(String),
}

impl ParseError {
    /// The 1-based source line this error points at, if any.
    ///
    /// [`ParseError::Message`] errors come from typed conversions rather
    /// than the document text and have no line.
    #[must_use]
    pub fn line(&self) -> Option<usize> {
        match self {
            ParseError::InconsistentIndent { line }
            | ParseError::UnterminatedQuote { line }
            | ParseError::InvalidEscape { line, .. }
            | ParseError::InvalidCodepoint { line, .. }
            | ParseError::MalformedLine { line, .. }
            | ParseError::DuplicateKey { line, .. }
            | ParseError::MixedSectionKind { line, .. }
            | ParseError::ResourceLimitExceeded { line, .. }
            | ParseError::InvalidUtf8 { line } => Some(*line),
            ParseError::TypeMismatch { .. } | ParseError::Message(_) => None,
        }
    }

    /// Creates a [`ParseError::MalformedLine`] at the given line.
    pub(crate) fn malformed(line: usize, msg: impl Into<String>) -> Self {
        ParseError::MalformedLine {
            line,
            msg: msg.into(),
        }
    }

    /// Creates a [`ParseError::ResourceLimitExceeded`] at the given line.
    pub(crate) fn limit(line: usize, msg: impl Into<String>) -> Self {
        ParseError::ResourceLimitExceeded {
            line,
            msg: msg.into(),
        }
    }

    /// Creates a custom error with a display message.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use conl::ParseError;
    ///
    /// let err = ParseError::custom("expected an integer");
    /// assert_eq!(err.to_string(), "expected an integer");
    /// ```
    pub fn custom<T: fmt::Display>(msg: T) -> Self {
        ParseError::Message(msg.to_string())
    }
}

impl serde::ser::Error for ParseError {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        ParseError::Message(msg.to_string())
    }
}

impl serde::de::Error for ParseError {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        ParseError::Message(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ParseError>;
