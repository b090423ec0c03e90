//! Lexical scanning of CONL documents.
//!
//! This module turns raw text into the typed token stream that
//! [`crate::parse`] consumes and that syntax highlighters can consume
//! directly via [`tokenize`]. The scanner works strictly left-to-right,
//! one physical line at a time, and owns the two pieces of state the
//! grammar needs: the stack of previously-seen indentation prefixes
//! (from which synthetic [`Token::Indent`]/[`Token::Outdent`] tokens are
//! generated) and the multiline-block capture that suspends indentation
//! tracking until the block ends.
//!
//! Blank and comment-only lines (`;` to end of line) produce no tokens and
//! leave the indentation level untouched. Every other line yields either a
//! map-key or a list-item token, optionally followed by the scalar that
//! completes it on the same line.

use std::collections::VecDeque;

use crate::error::{ParseError, Result};
use crate::scalar::{self, blank_prefix, is_blank, is_blank_str};

/// A single token of a CONL document, annotated with the 1-based source
/// line on which it starts.
///
/// Scalar text on [`Token::MapKey`], [`Token::Scalar`] and
/// [`Token::MultilineScalar`] is already decoded: quotes are stripped,
/// escapes resolved, multiline blocks dedented.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// The start of a nested section. The first `MapKey` or `ListItem`
    /// that follows tells you whether it is a map or a list.
    Indent { line: usize },
    /// The end of a section; one per `Indent`.
    Outdent { line: usize },
    /// A map key. Its value is the next `Scalar`, `MultilineScalar` or
    /// `Indent`..`Outdent` run, or nothing at all.
    MapKey { line: usize, text: String },
    /// A list item. Its value follows just like a map key's.
    ListItem { line: usize },
    /// A single-line scalar value.
    Scalar { line: usize, text: String },
    /// A multiline scalar value. The hint is the optional syntax tag after
    /// the `"""` opener; it never carries semantic meaning.
    MultilineScalar {
        line: usize,
        text: String,
        hint: String,
    },
    /// The end of the document, emitted exactly once after all sections
    /// have been closed.
    EndOfDocument { line: usize },
}

impl Token {
    /// The 1-based line on which this token starts.
    #[must_use]
    pub fn line_number(&self) -> usize {
        match self {
            Token::Indent { line }
            | Token::Outdent { line }
            | Token::MapKey { line, .. }
            | Token::ListItem { line }
            | Token::Scalar { line, .. }
            | Token::MultilineScalar { line, .. }
            | Token::EndOfDocument { line } => *line,
        }
    }

    /// A stable, human-readable name for the token kind, for error
    /// messages and editor integration.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Token::Indent { .. } => "indent",
            Token::Outdent { .. } => "outdent",
            Token::MapKey { .. } => "map key",
            Token::ListItem { .. } => "list item",
            Token::Scalar { .. } => "scalar",
            Token::MultilineScalar { .. } => "multiline scalar",
            Token::EndOfDocument { .. } => "end of document",
        }
    }
}

/// How the indentation of a new line relates to the stack.
enum IndentShift {
    Unchanged,
    Deeper,
    Shallower(usize),
}

/// The ordered stack of indentation prefixes seen so far.
///
/// The bottom entry is always the empty string. Every other entry strictly
/// extends the entry below it, so a new line's blank prefix either matches
/// the top (same section), extends it (one new level), or matches some
/// enclosing entry (closing every level above it). Anything else is the
/// one condition under which indentation is rejected.
struct IndentTracker<'a> {
    stack: Vec<&'a str>,
}

impl<'a> IndentTracker<'a> {
    fn new() -> Self {
        IndentTracker { stack: vec![""] }
    }

    fn depth(&self) -> usize {
        self.stack.len()
    }

    fn advance(&mut self, level: &'a str, line: usize) -> Result<IndentShift> {
        let top = *self.stack.last().expect("stack is never empty");
        if level == top {
            return Ok(IndentShift::Unchanged);
        }
        if level.len() > top.len() && level.starts_with(top) {
            self.stack.push(level);
            return Ok(IndentShift::Deeper);
        }
        let mut popped = 0;
        while self.stack.len() > 1 {
            self.stack.pop();
            popped += 1;
            if level == *self.stack.last().expect("stack is never empty") {
                return Ok(IndentShift::Shallower(popped));
            }
        }
        Err(ParseError::InconsistentIndent { line })
    }
}

enum State {
    Active,
    Ended,
    Done,
}

/// A lazy, forward-only iterator over the tokens of one document.
///
/// Yields `Result<Token, ParseError>`; after the first error (or after
/// [`Token::EndOfDocument`]) the iterator is fused and yields `None`
/// forever. A fresh call to [`tokenize`] is required to re-read.
pub struct Tokens<'a> {
    input: &'a str,
    pos: usize,
    line: usize,
    indents: IndentTracker<'a>,
    queue: VecDeque<Token>,
    error: Option<ParseError>,
    state: State,
}

/// Scans `input` into a stream of CONL tokens.
///
/// This is the low-level interface: it performs the full lexical analysis
/// (including quoted-scalar decoding and multiline extraction) but none of
/// the structural validation [`crate::parse`] adds on top. Errors surface
/// exactly as they would from `parse`, and the caller may stop early.
///
/// # Examples
///
/// ```rust
/// use conl::{tokenize, Token};
///
/// let names: Vec<_> = tokenize("port = 8080\n")
///     .map(|t| t.unwrap().name())
///     .collect();
/// assert_eq!(names, vec!["map key", "scalar", "end of document"]);
/// ```
pub fn tokenize(input: &str) -> Tokens<'_> {
    Tokens {
        input,
        pos: 0,
        line: 1,
        indents: IndentTracker::new(),
        queue: VecDeque::new(),
        error: None,
        state: State::Active,
    }
}

impl<'a> Tokens<'a> {
    /// The next physical line, the bytes it occupies including its
    /// terminator, and whether a terminator was present.
    fn peek_line(&self) -> Option<(&'a str, usize, bool)> {
        if self.pos >= self.input.len() {
            return None;
        }
        let rest = &self.input[self.pos..];
        match rest.find(['\r', '\n']) {
            None => Some((rest, rest.len(), false)),
            Some(i) => {
                let term = if rest[i..].starts_with("\r\n") { 2 } else { 1 };
                Some((&rest[..i], i + term, true))
            }
        }
    }

    fn next_line(&mut self) -> Option<&'a str> {
        let (raw, consumed, terminated) = self.peek_line()?;
        self.pos += consumed;
        if terminated {
            self.line += 1;
        }
        Some(raw)
    }

    /// Scans forward until at least one token is queued or the document
    /// ends. Blank and comment-only lines are skipped here without ever
    /// touching the indent stack.
    fn fill(&mut self) -> Result<()> {
        loop {
            let lno = self.line;
            let Some(raw) = self.next_line() else {
                for _ in 1..self.indents.depth() {
                    self.queue.push_back(Token::Outdent { line: self.line });
                }
                self.queue.push_back(Token::EndOfDocument { line: self.line });
                self.state = State::Ended;
                return Ok(());
            };

            let level = blank_prefix(raw);
            let rest = &raw[level.len()..];
            if rest.is_empty() || rest.starts_with(';') {
                continue;
            }

            match self.indents.advance(level, lno)? {
                IndentShift::Unchanged => {}
                IndentShift::Deeper => self.queue.push_back(Token::Indent { line: lno }),
                IndentShift::Shallower(n) => {
                    for _ in 0..n {
                        self.queue.push_back(Token::Outdent { line: lno });
                    }
                }
            }

            self.scan_content(level, rest, lno)?;
            return Ok(());
        }
    }

    fn scan_content(&mut self, level: &'a str, rest: &'a str, lno: usize) -> Result<()> {
        if let Some(after) = rest.strip_prefix('=') {
            self.queue.push_back(Token::ListItem { line: lno });
            if let Some(token) = self.scan_value(level, after, lno)? {
                self.queue.push_back(token);
            }
            return Ok(());
        }

        let (key, tail) = if rest.starts_with('"') {
            let (text, tail) = scalar::decode_quoted(rest, lno)?;
            let tail = tail.trim_start_matches(is_blank);
            if !(tail.is_empty() || tail.starts_with('=') || tail.starts_with(';')) {
                return Err(ParseError::malformed(lno, "extra characters after quotes"));
            }
            (text, tail)
        } else {
            let end = rest.find(['=', ';']).unwrap_or(rest.len());
            (rest[..end].trim_end_matches(is_blank).to_string(), &rest[end..])
        };

        self.queue.push_back(Token::MapKey { line: lno, text: key });
        if let Some(after) = tail.strip_prefix('=') {
            if let Some(token) = self.scan_value(level, after, lno)? {
                self.queue.push_back(token);
            }
        }
        Ok(())
    }

    /// Scans the value part after the `=` of a key or list item. Returns
    /// `None` when the line ends (or a comment starts) before any value.
    fn scan_value(&mut self, level: &'a str, after_eq: &'a str, lno: usize) -> Result<Option<Token>> {
        let rest = after_eq.trim_start_matches(is_blank);
        if rest.is_empty() || rest.starts_with(';') {
            return Ok(None);
        }

        if let Some(after) = rest.strip_prefix("\"\"\"") {
            let hint_end = after.find(';').unwrap_or(after.len());
            let hint = after[..hint_end].trim_matches(is_blank).to_string();
            let text = self.capture_multiline(level);
            return Ok(Some(Token::MultilineScalar {
                line: lno,
                text,
                hint,
            }));
        }

        if rest.starts_with('"') {
            let (text, tail) = scalar::decode_quoted(rest, lno)?;
            let tail = tail.trim_start_matches(is_blank);
            if !(tail.is_empty() || tail.starts_with(';')) {
                return Err(ParseError::malformed(lno, "extra characters after quotes"));
            }
            return Ok(Some(Token::Scalar { line: lno, text }));
        }

        let end = rest.find(';').unwrap_or(rest.len());
        let text = rest[..end].trim_end_matches(is_blank);
        Ok(Some(Token::Scalar {
            line: lno,
            text: text.to_string(),
        }))
    }

    /// Consumes the body of a multiline block: every following line that
    /// is blank-only or whose blank prefix strictly extends the opener
    /// line's level. The terminating line is left for normal scanning.
    /// Indentation tracking is suspended for the whole body.
    fn capture_multiline(&mut self, level: &str) -> String {
        let mut lines: Vec<&'a str> = Vec::new();
        while let Some((raw, consumed, terminated)) = self.peek_line() {
            let prefix = blank_prefix(raw);
            let in_block =
                is_blank_str(raw) || (prefix.len() > level.len() && prefix.starts_with(level));
            if !in_block {
                break;
            }
            self.pos += consumed;
            if terminated {
                self.line += 1;
            }
            lines.push(raw);
        }
        scalar::normalize_multiline(&lines)
    }
}

impl<'a> Iterator for Tokens<'a> {
    type Item = Result<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            // tokens already scanned on the failing line come out before
            // the error itself
            if let Some(token) = self.queue.pop_front() {
                return Some(Ok(token));
            }
            if let Some(err) = self.error.take() {
                self.state = State::Done;
                return Some(Err(err));
            }
            match self.state {
                State::Done => return None,
                State::Ended => {
                    self.state = State::Done;
                    return None;
                }
                State::Active => {
                    if let Err(err) = self.fill() {
                        self.error = Some(err);
                        self.state = State::Ended;
                    }
                }
            }
        }
    }
}
