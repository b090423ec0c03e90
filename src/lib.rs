//! # conl
//!
//! A parser and serializer for CONL, an indentation-structured
//! configuration format with the data model of JSON and none of its
//! punctuation.
//!
//! ## What is CONL?
//!
//! CONL documents are lines of `key = value` pairs and `= item` list
//! entries, nested by indentation, with `;` comments and `"""` multiline
//! scalars:
//!
//! ```text
//! name = demo          ; scalars are untyped text
//! ports
//!   = 80
//!   = 443
//! motd = """
//!   hello
//!   world
//! ```
//!
//! Every leaf is a string until the consumer decides otherwise: there is
//! no boolean, null, or number grammar, so `8080` and `10GB` reach your
//! code untouched. See the [`syntax`] module for the full grammar.
//!
//! ## Parsing to a value tree
//!
//! ```rust
//! use conl::Value;
//!
//! let doc = conl::parse_str("name = demo\nports\n  = 80\n  = 443\n").unwrap();
//! assert_eq!(doc.get("name").and_then(|v| v.as_str()), Some("demo"));
//! assert_eq!(doc.get("ports").unwrap().as_list().unwrap().len(), 2);
//!
//! let text = conl::serialize(&doc);
//! assert_eq!(conl::parse_str(&text).unwrap(), doc);
//! ```
//!
//! Parse errors carry the 1-based line number of the offending token and
//! reject the whole document; there is no partial tree.
//!
//! ## Typed configuration via serde
//!
//! The parser never guesses types; the serde layer converts scalar text
//! when a target type asks for it:
//!
//! ```rust
//! use serde::Deserialize;
//!
//! #[derive(Deserialize, Debug, PartialEq)]
//! struct Config {
//!     name: String,
//!     ports: Vec<u16>,
//!     verbose: Option<bool>,
//! }
//!
//! let config: Config = conl::from_str("name = demo\nports\n  = 80\n  = 443\n").unwrap();
//! assert_eq!(config.ports, vec![80, 443]);
//! assert_eq!(config.verbose, None);
//! ```
//!
//! ## Token stream for editors
//!
//! Syntax highlighters can consume the raw token stream without building a
//! tree; see [`tokenize`].

pub mod de;
pub mod error;
pub mod macros;
pub mod map;
pub mod options;
mod scalar;
pub mod ser;
pub mod syntax;
pub mod token;
pub mod value;

pub use de::Deserializer;
pub use error::{ParseError, Result};
pub use map::ConlMap;
pub use options::{ParseOptions, SerializeOptions};
pub use ser::ValueSerializer;
pub use token::{tokenize, Token, Tokens};
pub use value::Value;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::io;

/// Parses a CONL document into a [`Value`] tree.
///
/// The input must be valid UTF-8. Parsing is a single forward pass; on the
/// first error the whole document is rejected.
///
/// # Examples
///
/// ```rust
/// let doc = conl::parse(b"a = b\n").unwrap();
/// assert_eq!(doc.get("a").and_then(|v| v.as_str()), Some("b"));
/// ```
///
/// # Errors
///
/// Returns a [`ParseError`] carrying the offending line for invalid UTF-8,
/// inconsistent indentation, malformed lines, bad escapes, duplicate keys,
/// or mixed map/list sections.
pub fn parse(input: &[u8]) -> Result<Value> {
    parse_with_options(input, ParseOptions::default())
}

/// Parses a CONL document from a string slice. See [`parse`].
pub fn parse_str(input: &str) -> Result<Value> {
    de::build_tree(input, ParseOptions::default())
}

/// Parses a CONL document with caller-supplied resource guards.
///
/// # Errors
///
/// In addition to the [`parse`] errors, returns
/// [`ParseError::ResourceLimitExceeded`] when the document is larger or
/// nests deeper than `options` allows.
pub fn parse_with_options(input: &[u8], options: ParseOptions) -> Result<Value> {
    if let Some(max) = options.max_document_size {
        if input.len() > max {
            return Err(ParseError::limit(
                1,
                format!("document exceeds maximum size ({max} bytes)"),
            ));
        }
    }
    let text = std::str::from_utf8(input).map_err(|e| ParseError::InvalidUtf8 {
        line: line_of_offset(input, e.valid_up_to()),
    })?;
    de::build_tree(text, options)
}

fn line_of_offset(input: &[u8], offset: usize) -> usize {
    let mut line = 1;
    let mut i = 0;
    while i < offset {
        match input[i] {
            b'\n' => line += 1,
            b'\r' => {
                line += 1;
                if input.get(i + 1) == Some(&b'\n') {
                    i += 1;
                }
            }
            _ => {}
        }
        i += 1;
    }
    line
}

/// Serializes a [`Value`] tree as canonical CONL text.
///
/// Serialization is total: it never fails for trees satisfying the data
/// model invariants. Re-parsing the output yields a structurally equal
/// tree, with the one caveat that empty maps and lists come back as
/// [`Value::Absent`] (the text format cannot spell them).
///
/// # Examples
///
/// ```rust
/// use conl::conl;
///
/// let value = conl!({ "a": "b", "list": ["1", "2"] });
/// assert_eq!(conl::serialize(&value), "a = b\nlist\n  = 1\n  = 2\n");
/// ```
#[must_use]
pub fn serialize(value: &Value) -> String {
    ser::to_text(value, &SerializeOptions::default())
}

/// Serializes a [`Value`] tree with a custom indentation width.
#[must_use]
pub fn serialize_with_options(value: &Value, options: SerializeOptions) -> String {
    ser::to_text(value, &options)
}

/// Serializes any `T: Serialize` to CONL text.
///
/// # Examples
///
/// ```rust
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Point { x: i32, y: i32 }
///
/// let text = conl::to_string(&Point { x: 1, y: 2 }).unwrap();
/// assert_eq!(text, "x = 1\ny = 2\n");
/// ```
///
/// # Errors
///
/// Returns an error for values CONL cannot express, such as maps whose
/// keys are not scalar text.
pub fn to_string<T>(value: &T) -> Result<String>
where
    T: ?Sized + Serialize,
{
    Ok(serialize(&to_value(value)?))
}

/// Serializes any `T: Serialize` to CONL bytes.
///
/// # Errors
///
/// See [`to_string`].
pub fn to_vec<T>(value: &T) -> Result<Vec<u8>>
where
    T: ?Sized + Serialize,
{
    to_string(value).map(String::into_bytes)
}

/// Serializes any `T: Serialize` to a writer as CONL text.
///
/// # Errors
///
/// Returns an error if serialization fails or writing fails.
pub fn to_writer<W, T>(mut writer: W, value: &T) -> Result<()>
where
    W: io::Write,
    T: ?Sized + Serialize,
{
    let text = to_string(value)?;
    writer
        .write_all(text.as_bytes())
        .map_err(|e| ParseError::custom(e.to_string()))
}

/// Converts any `T: Serialize` into a [`Value`] tree.
///
/// # Examples
///
/// ```rust
/// use conl::Value;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Point { x: i32, y: i32 }
///
/// let value = conl::to_value(&Point { x: 1, y: 2 }).unwrap();
/// assert_eq!(value.get("x"), Some(&Value::from("1")));
/// ```
///
/// # Errors
///
/// See [`to_string`].
pub fn to_value<T>(value: &T) -> Result<Value>
where
    T: ?Sized + Serialize,
{
    value.serialize(ValueSerializer)
}

/// Deserializes an instance of `T` from CONL text.
///
/// The document is parsed into a [`Value`] tree first; scalar text is
/// converted to integers, floats, and booleans only where `T` requires
/// them. [`Value::Absent`] deserializes to `None`, unit, or an empty
/// container.
///
/// # Examples
///
/// ```rust
/// use serde::Deserialize;
///
/// #[derive(Deserialize, PartialEq, Debug)]
/// struct Point { x: i32, y: i32 }
///
/// let point: Point = conl::from_str("x = 1\ny = 2\n").unwrap();
/// assert_eq!(point, Point { x: 1, y: 2 });
/// ```
///
/// # Errors
///
/// Returns an error if the input is not valid CONL or its scalars cannot
/// be converted to the shapes `T` requires.
pub fn from_str<T>(input: &str) -> Result<T>
where
    T: DeserializeOwned,
{
    from_value(&parse_str(input)?)
}

/// Deserializes an instance of `T` from CONL bytes. See [`from_str`].
///
/// # Errors
///
/// See [`from_str`]; additionally rejects invalid UTF-8.
pub fn from_slice<T>(input: &[u8]) -> Result<T>
where
    T: DeserializeOwned,
{
    from_value(&parse(input)?)
}

/// Deserializes an instance of `T` from a reader of CONL text.
///
/// # Errors
///
/// See [`from_slice`]; additionally reports read failures.
pub fn from_reader<R, T>(mut reader: R) -> Result<T>
where
    R: io::Read,
    T: DeserializeOwned,
{
    let mut buffer = Vec::new();
    reader
        .read_to_end(&mut buffer)
        .map_err(|e| ParseError::custom(e.to_string()))?;
    from_slice(&buffer)
}

/// Deserializes an instance of `T` from an already-parsed [`Value`].
///
/// # Errors
///
/// Returns an error if the tree's shape or scalar text does not match `T`.
pub fn from_value<'de, T>(value: &'de Value) -> Result<T>
where
    T: Deserialize<'de>,
{
    T::deserialize(Deserializer::from_value(value))
}
