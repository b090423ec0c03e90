//! The CONL syntax as implemented by this crate.
//!
//! CONL is an indentation-structured configuration format whose data model
//! matches JSON (scalars, ordered maps, ordered lists) but whose syntax is
//! line-based rather than bracket-delimited, and whose scalars stay untyped
//! text until the consumer decides otherwise.
//!
//! # Documents
//!
//! A document is UTF-8 text, conventionally in a `.conl` file. The top
//! level is a single section: a run of map entries or a run of list items.
//! An empty document (or one containing only blanks and comments) parses
//! to [`crate::Value::Absent`].
//!
//! # Comments and blank lines
//!
//! `;` starts a comment that runs to the end of the line. Lines that are
//! empty, all blanks, or blanks followed by a comment are skipped
//! entirely: they produce no tokens and leave the indentation level
//! untouched, so a comment may sit at any column.
//!
//! ```text
//! ; database settings
//! host = db.internal   ; resolved via VPN
//! ```
//!
//! # Map entries
//!
//! A map entry is a key, an optional `=`, and an optional value:
//!
//! ```text
//! name = value
//! key-with-no-value
//! nested
//!   inner = 1
//! ```
//!
//! A bare key may not start with a blank or `"`, may not end with a blank,
//! and may not contain `;`, `=`, or a line break; anything else needs the
//! quoted form. A key with no value and no nested section parses to
//! `Absent`. Keys must be unique within their section.
//!
//! # List items
//!
//! A list item is `=` followed by an optional value, or by a nested
//! section on the following, deeper-indented lines:
//!
//! ```text
//! = first
//! = second
//! =
//!   nested = yes
//! ```
//!
//! A section is either all map entries or all list items; mixing the two
//! at one level is an error.
//!
//! # Indentation
//!
//! A line's level is its literal run of leading blanks (spaces or tabs,
//! compared verbatim, no tab expansion). A deeper line must extend its
//! parent's level character-for-character; a shallower line must return
//! exactly to some enclosing level. Anything else is rejected as
//! inconsistent indentation.
//!
//! # Scalars
//!
//! A bare scalar runs to `;` or the end of the line, with surrounding
//! blanks trimmed and inner blanks kept. Values may contain `=`. Quoted
//! scalars are delimited by `"` on a single line and support the escapes
//! `\\`, `\"`, `\t`, `\r`, `\n`, and `\{H}` with 1-8 hex digits naming a
//! Unicode scalar value (surrogates and codepoints above U+10FFFF are
//! rejected).
//!
//! # Multiline scalars
//!
//! `"""` after the `=` opens a multiline scalar; an optional hint (for
//! syntax highlighters, discarded by the parser) may follow it:
//!
//! ```text
//! script = """bash
//!   #!/bin/bash
//!   echo hello
//! ```
//!
//! The body is every following line that is blank-only or indented deeper
//! than the opener line. The blank prefix of the first non-blank body line
//! is stripped from each line, deeper indentation survives verbatim,
//! blank-only lines become paragraph breaks, and the whole block is
//! trimmed of boundary blanks and newlines. `;` is ordinary text inside
//! the body. Line endings are normalized to `\n`.
//!
//! # No typed literals
//!
//! There is no null, boolean, or number grammar: `no`, `true`, `8080`, and
//! `10GB` are all plain text to the parser. Typed interpretation belongs
//! to the consumer — in Rust, usually a serde target type via
//! [`crate::from_str`].
