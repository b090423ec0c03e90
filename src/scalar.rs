//! Scalar text decoding.
//!
//! CONL has two escaping subsystems that never mix: quoted scalars with
//! backslash escapes on a single line, and multiline blocks where the only
//! transformation is dedenting against a baseline indent. Both produce
//! plain Unicode text; nothing here assigns types.

use crate::error::{ParseError, Result};

/// A blank is a space or tab, never any other Unicode whitespace.
pub(crate) fn is_blank(c: char) -> bool {
    c == ' ' || c == '\t'
}

pub(crate) fn is_blank_str(s: &str) -> bool {
    s.chars().all(is_blank)
}

/// The literal run of blank characters at the start of a line.
pub(crate) fn blank_prefix(line: &str) -> &str {
    let end = line
        .char_indices()
        .find(|&(_, c)| !is_blank(c))
        .map_or(line.len(), |(i, _)| i);
    &line[..end]
}

/// Decodes a quoted scalar starting at the opening `"` of `raw`.
///
/// Returns the decoded text and the remainder of the line after the
/// closing quote. `raw` is always a single physical line; quoting does not
/// span lines, so running out of input means the quote was never closed.
pub(crate) fn decode_quoted<'a>(raw: &'a str, line: usize) -> Result<(String, &'a str)> {
    debug_assert!(raw.starts_with('"'));
    let mut out = String::new();
    let mut chars = raw.char_indices();
    chars.next();

    while let Some((i, c)) = chars.next() {
        match c {
            '"' => return Ok((out, &raw[i + 1..])),
            '\\' => {
                let Some((_, escape)) = chars.next() else {
                    return Err(ParseError::UnterminatedQuote { line });
                };
                match escape {
                    '\\' => out.push('\\'),
                    '"' => out.push('"'),
                    't' => out.push('\t'),
                    'r' => out.push('\r'),
                    'n' => out.push('\n'),
                    '{' => {
                        let mut digits = String::new();
                        loop {
                            match chars.next() {
                                None => return Err(ParseError::UnterminatedQuote { line }),
                                Some((_, '}')) => break,
                                Some((_, d)) => digits.push(d),
                            }
                        }
                        out.push(codepoint(&digits, line)?);
                    }
                    other => {
                        return Err(ParseError::InvalidEscape {
                            line,
                            escape: other.to_string(),
                        })
                    }
                }
            }
            _ => out.push(c),
        }
    }
    Err(ParseError::UnterminatedQuote { line })
}

/// Resolves the hex digits of a `\{H}` escape to a single character.
fn codepoint(digits: &str, line: usize) -> Result<char> {
    if digits.is_empty() || digits.len() > 8 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ParseError::InvalidEscape {
            line,
            escape: format!("{{{digits}}}"),
        });
    }
    let value = u32::from_str_radix(digits, 16).expect("digits are validated hex");
    if value > 0x0010_FFFF || (0xD800..=0xDFFF).contains(&value) {
        return Err(ParseError::InvalidCodepoint {
            line,
            digits: digits.to_string(),
        });
    }
    char::from_u32(value).ok_or(ParseError::InvalidCodepoint {
        line,
        digits: digits.to_string(),
    })
}

/// Normalizes a captured multiline block into its scalar text.
///
/// `lines` are the body's physical lines with line endings already removed.
/// The baseline indent is the blank prefix of the first non-blank line;
/// that exact prefix is stripped wherever it occurs, lines that fall short
/// of it contribute a bare line break, and the whole result is trimmed of
/// boundary blanks and newlines.
pub(crate) fn normalize_multiline(lines: &[&str]) -> String {
    let baseline = lines
        .iter()
        .find(|l| !is_blank_str(l))
        .map_or("", |l| blank_prefix(l));

    let mut out = String::new();
    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        if let Some(rest) = line.strip_prefix(baseline) {
            out.push_str(rest);
        }
    }
    out.trim_matches(|c| c == ' ' || c == '\t' || c == '\n').to_string()
}
