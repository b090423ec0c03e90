//! Configuration knobs for parsing and serialization.
//!
//! The grammar itself has no tunables; these options are the resource
//! guards and formatting choices the surrounding application supplies:
//!
//! - [`ParseOptions`]: nesting-depth and document-size limits
//! - [`SerializeOptions`]: indentation width for emitted documents
//!
//! ## Examples
//!
//! ```rust
//! use conl::{parse_with_options, ParseOptions};
//!
//! let options = ParseOptions::new().with_max_depth(4);
//! let doc = b"a\n  b\n    c = 1\n";
//! assert!(parse_with_options(doc, options).is_ok());
//! ```

/// Resource guards for a parse call.
///
/// Parsing is a bounded, allocation-only computation; the only guards worth
/// having are a cap on nesting depth (stack memory under adversarial input)
/// and a cap on document size. Tripping either yields
/// [`crate::ParseError::ResourceLimitExceeded`].
///
/// # Examples
///
/// ```rust
/// use conl::ParseOptions;
///
/// let options = ParseOptions::new()
///     .with_max_depth(32)
///     .with_max_document_size(1 << 20);
/// assert_eq!(options.max_depth, 32);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParseOptions {
    /// Maximum nesting depth of the value tree. Default 128.
    pub max_depth: usize,
    /// Maximum document size in bytes. `None` (the default) means unlimited.
    pub max_document_size: Option<usize>,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            max_depth: 128,
            max_document_size: None,
        }
    }
}

impl ParseOptions {
    /// Creates the default options (depth 128, unlimited size).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum nesting depth.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Sets the maximum document size in bytes.
    #[must_use]
    pub fn with_max_document_size(mut self, bytes: usize) -> Self {
        self.max_document_size = Some(bytes);
        self
    }
}

/// Formatting choices for [`crate::serialize_with_options`].
///
/// The serializer always indents with spaces, one fixed-width unit per
/// nesting level, so sibling lines can never have prefix-incomparable
/// indentation.
///
/// # Examples
///
/// ```rust
/// use conl::SerializeOptions;
///
/// let options = SerializeOptions::new().with_indent(4);
/// assert_eq!(options.indent, 4);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SerializeOptions {
    /// Spaces per nesting level. Default 2.
    pub indent: usize,
}

impl Default for SerializeOptions {
    fn default() -> Self {
        SerializeOptions { indent: 2 }
    }
}

impl SerializeOptions {
    /// Creates the default options (2-space indent).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the indentation width in spaces. Widths below 1 are treated as 1.
    #[must_use]
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent.max(1);
        self
    }
}
