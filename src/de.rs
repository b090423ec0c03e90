//! Building value trees from the token stream, and deserializing typed
//! values out of them.
//!
//! The first half of this module is the structural layer of
//! [`crate::parse`]: a consumer of [`crate::token::Tokens`] that decides,
//! per section, whether it is a map or a list from its first structural
//! token, enforces key uniqueness and section-kind consistency, and
//! assembles the [`Value`] tree. It runs on an explicit stack of
//! in-progress section frames rather than native recursion, so nesting
//! depth is bounded by [`ParseOptions::max_depth`] instead of the thread
//! stack.
//!
//! The second half is the serde [`Deserializer`]. CONL defers all typing
//! to the consumer, and for Rust programs the consumer is serde: scalar
//! text is converted to integers, floats and booleans only here, when a
//! target type asks for them.
//!
//! ```rust
//! use serde::Deserialize;
//!
//! #[derive(Deserialize, Debug, PartialEq)]
//! struct Server {
//!     host: String,
//!     port: u16,
//! }
//!
//! let server: Server = conl::from_str("host = localhost\nport = 8080\n").unwrap();
//! assert_eq!(server.port, 8080);
//! ```

use crate::error::{ParseError, Result};
use crate::token::{tokenize, Token};
use crate::{ConlMap, ParseOptions, Value};
use serde::de::{self, IntoDeserializer, Visitor};
use serde::forward_to_deserialize_any;
use serde::Deserializer as _;

/// One in-progress section. A section's kind is unknown until its first
/// structural token arrives.
enum Frame {
    Unresolved,
    Map {
        entries: ConlMap,
        pending: Option<String>,
    },
    List {
        items: Vec<Value>,
        pending: bool,
    },
}

impl Frame {
    fn begin_map_entry(&mut self, key: String, line: usize) -> Result<()> {
        match self {
            Frame::Unresolved => {
                *self = Frame::Map {
                    entries: ConlMap::new(),
                    pending: Some(key),
                };
                Ok(())
            }
            Frame::Map { entries, pending } => {
                if let Some(previous) = pending.take() {
                    entries.insert(previous, Value::Absent);
                }
                if entries.contains_key(&key) {
                    return Err(ParseError::DuplicateKey { line, key });
                }
                *pending = Some(key);
                Ok(())
            }
            Frame::List { .. } => Err(ParseError::MixedSectionKind {
                line,
                expected: "list item",
                found: "map key",
            }),
        }
    }

    fn begin_list_item(&mut self, line: usize) -> Result<()> {
        match self {
            Frame::Unresolved => {
                *self = Frame::List {
                    items: Vec::new(),
                    pending: true,
                };
                Ok(())
            }
            Frame::List { items, pending } => {
                if *pending {
                    items.push(Value::Absent);
                }
                *pending = true;
                Ok(())
            }
            Frame::Map { .. } => Err(ParseError::MixedSectionKind {
                line,
                expected: "map key",
                found: "list item",
            }),
        }
    }

    /// Whether the last key or item is still waiting for its value.
    fn has_pending(&self) -> bool {
        match self {
            Frame::Unresolved => false,
            Frame::Map { pending, .. } => pending.is_some(),
            Frame::List { pending, .. } => *pending,
        }
    }

    fn attach(&mut self, value: Value) {
        match self {
            Frame::Map { entries, pending } => {
                let key = pending.take().expect("scanner pairs values with keys");
                entries.insert(key, value);
            }
            Frame::List { items, pending } => {
                debug_assert!(*pending, "scanner pairs values with items");
                *pending = false;
                items.push(value);
            }
            Frame::Unresolved => unreachable!("value token before key or item"),
        }
    }

    fn finish(self) -> Value {
        match self {
            Frame::Unresolved => Value::Absent,
            Frame::Map {
                mut entries,
                pending,
            } => {
                if let Some(key) = pending {
                    entries.insert(key, Value::Absent);
                }
                Value::Map(entries)
            }
            Frame::List { mut items, pending } => {
                if pending {
                    items.push(Value::Absent);
                }
                Value::List(items)
            }
        }
    }
}

/// Consumes the token stream of `input` into a [`Value`] tree.
pub(crate) fn build_tree(input: &str, options: ParseOptions) -> Result<Value> {
    let mut stack = vec![Frame::Unresolved];

    for token in tokenize(input) {
        match token? {
            Token::MapKey { line, text } => {
                let frame = stack.last_mut().expect("stack is never empty");
                frame.begin_map_entry(text, line)?;
            }
            Token::ListItem { line } => {
                let frame = stack.last_mut().expect("stack is never empty");
                frame.begin_list_item(line)?;
            }
            Token::Scalar { text, .. } | Token::MultilineScalar { text, .. } => {
                let frame = stack.last_mut().expect("stack is never empty");
                frame.attach(Value::Scalar(text));
            }
            Token::Indent { line } => {
                if !stack.last().expect("stack is never empty").has_pending() {
                    return Err(ParseError::malformed(line, "unexpected indent"));
                }
                if stack.len() >= options.max_depth {
                    return Err(ParseError::limit(
                        line,
                        format!("maximum nesting depth ({}) exceeded", options.max_depth),
                    ));
                }
                stack.push(Frame::Unresolved);
            }
            Token::Outdent { .. } => {
                let value = stack.pop().expect("stack is never empty").finish();
                stack
                    .last_mut()
                    .expect("outdents never exceed indents")
                    .attach(value);
            }
            Token::EndOfDocument { .. } => {
                let value = stack.pop().expect("stack is never empty").finish();
                debug_assert!(stack.is_empty(), "all sections closed before end");
                return Ok(value);
            }
        }
    }
    unreachable!("token stream always ends with end of document or an error")
}

/// A serde deserializer reading from a parsed [`Value`].
///
/// Created by [`crate::from_str`] and friends, or directly via
/// [`Deserializer::from_value`] when the tree is already at hand.
pub struct Deserializer<'de> {
    value: &'de Value,
}

impl<'de> Deserializer<'de> {
    #[must_use]
    pub fn from_value(value: &'de Value) -> Self {
        Deserializer { value }
    }

    fn scalar(&self, expected: &'static str) -> Result<&'de str> {
        match self.value {
            Value::Scalar(s) => Ok(s),
            other => Err(ParseError::TypeMismatch {
                expected,
                found: other.kind(),
            }),
        }
    }
}

macro_rules! deserialize_parsed {
    ($method:ident, $ty:ty, $visit:ident, $expected:literal) => {
        fn $method<V>(self, visitor: V) -> Result<V::Value>
        where
            V: Visitor<'de>,
        {
            let text = self.scalar($expected)?;
            let parsed = text.parse::<$ty>().map_err(|_| {
                ParseError::custom(format!(concat!("cannot convert {:?} to ", $expected), text))
            })?;
            visitor.$visit(parsed)
        }
    };
}

impl<'de> de::Deserializer<'de> for Deserializer<'de> {
    type Error = ParseError;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        match self.value {
            Value::Scalar(s) => visitor.visit_borrowed_str(s),
            Value::Map(map) => visitor.visit_map(MapDeserializer::new(map)),
            Value::List(items) => visitor.visit_seq(SeqDeserializer::new(items)),
            Value::Absent => visitor.visit_unit(),
        }
    }

    fn deserialize_bool<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        match self.scalar("a boolean")? {
            "true" => visitor.visit_bool(true),
            "false" => visitor.visit_bool(false),
            other => Err(ParseError::custom(format!(
                "cannot convert {other:?} to a boolean"
            ))),
        }
    }

    deserialize_parsed!(deserialize_i8, i8, visit_i8, "an integer");
    deserialize_parsed!(deserialize_i16, i16, visit_i16, "an integer");
    deserialize_parsed!(deserialize_i32, i32, visit_i32, "an integer");
    deserialize_parsed!(deserialize_i64, i64, visit_i64, "an integer");
    deserialize_parsed!(deserialize_u8, u8, visit_u8, "an integer");
    deserialize_parsed!(deserialize_u16, u16, visit_u16, "an integer");
    deserialize_parsed!(deserialize_u32, u32, visit_u32, "an integer");
    deserialize_parsed!(deserialize_u64, u64, visit_u64, "an integer");
    deserialize_parsed!(deserialize_f32, f32, visit_f32, "a number");
    deserialize_parsed!(deserialize_f64, f64, visit_f64, "a number");

    fn deserialize_char<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        let text = self.scalar("a character")?;
        let mut chars = text.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => visitor.visit_char(c),
            _ => Err(ParseError::custom(format!(
                "cannot convert {text:?} to a character"
            ))),
        }
    }

    fn deserialize_str<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        // Absent coerces to the empty string, like Value::as_scalar
        match self.value {
            Value::Absent => visitor.visit_borrowed_str(""),
            _ => visitor.visit_borrowed_str(self.scalar("a scalar")?),
        }
    }

    fn deserialize_string<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        self.deserialize_str(visitor)
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        match self.value {
            Value::Absent => visitor.visit_none(),
            _ => visitor.visit_some(self),
        }
    }

    fn deserialize_unit<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        match self.value {
            Value::Absent => visitor.visit_unit(),
            other => Err(ParseError::TypeMismatch {
                expected: "nothing",
                found: other.kind(),
            }),
        }
    }

    fn deserialize_unit_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        self.deserialize_unit(visitor)
    }

    fn deserialize_newtype_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_seq<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        match self.value {
            Value::List(items) => visitor.visit_seq(SeqDeserializer::new(items)),
            Value::Absent => visitor.visit_seq(SeqDeserializer::new(&[])),
            other => Err(ParseError::TypeMismatch {
                expected: "a list",
                found: other.kind(),
            }),
        }
    }

    fn deserialize_tuple<V>(self, _len: usize, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        self.deserialize_seq(visitor)
    }

    fn deserialize_tuple_struct<V>(
        self,
        _name: &'static str,
        _len: usize,
        visitor: V,
    ) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        self.deserialize_seq(visitor)
    }

    fn deserialize_map<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        match self.value {
            Value::Map(map) => visitor.visit_map(MapDeserializer::new(map)),
            Value::Absent => visitor.visit_map(MapDeserializer::empty()),
            other => Err(ParseError::TypeMismatch {
                expected: "a map",
                found: other.kind(),
            }),
        }
    }

    fn deserialize_struct<V>(
        self,
        _name: &'static str,
        _fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        self.deserialize_map(visitor)
    }

    fn deserialize_enum<V>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        match self.value {
            Value::Scalar(variant) => visitor.visit_enum(EnumDeserializer {
                variant,
                value: None,
            }),
            Value::Map(map) if map.len() == 1 => {
                let (variant, value) = map.iter().next().expect("map has one entry");
                visitor.visit_enum(EnumDeserializer {
                    variant,
                    value: Some(value),
                })
            }
            other => Err(ParseError::TypeMismatch {
                expected: "a variant name or single-entry map",
                found: other.kind(),
            }),
        }
    }

    fn deserialize_identifier<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        self.deserialize_str(visitor)
    }

    fn deserialize_ignored_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        self.deserialize_any(visitor)
    }

    forward_to_deserialize_any! { bytes byte_buf }
}

struct SeqDeserializer<'de> {
    iter: std::slice::Iter<'de, Value>,
}

impl<'de> SeqDeserializer<'de> {
    fn new(items: &'de [Value]) -> Self {
        SeqDeserializer { iter: items.iter() }
    }
}

impl<'de> de::SeqAccess<'de> for SeqDeserializer<'de> {
    type Error = ParseError;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>>
    where
        T: de::DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some(value) => seed.deserialize(Deserializer::from_value(value)).map(Some),
            None => Ok(None),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.iter.len())
    }
}

struct MapDeserializer<'de> {
    iter: Option<indexmap::map::Iter<'de, String, Value>>,
    value: Option<&'de Value>,
}

impl<'de> MapDeserializer<'de> {
    fn new(map: &'de ConlMap) -> Self {
        MapDeserializer {
            iter: Some(map.iter()),
            value: None,
        }
    }

    fn empty() -> Self {
        MapDeserializer {
            iter: None,
            value: None,
        }
    }
}

impl<'de> de::MapAccess<'de> for MapDeserializer<'de> {
    type Error = ParseError;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>>
    where
        K: de::DeserializeSeed<'de>,
    {
        match self.iter.as_mut().and_then(Iterator::next) {
            Some((key, value)) => {
                self.value = Some(value);
                seed.deserialize(key.as_str().into_deserializer()).map(Some)
            }
            None => Ok(None),
        }
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value>
    where
        V: de::DeserializeSeed<'de>,
    {
        let value = self.value.take().expect("next_value called before next_key");
        seed.deserialize(Deserializer::from_value(value))
    }
}

struct EnumDeserializer<'de> {
    variant: &'de str,
    value: Option<&'de Value>,
}

impl<'de> de::EnumAccess<'de> for EnumDeserializer<'de> {
    type Error = ParseError;
    type Variant = VariantDeserializer<'de>;

    fn variant_seed<V>(self, seed: V) -> Result<(V::Value, Self::Variant)>
    where
        V: de::DeserializeSeed<'de>,
    {
        let variant = seed.deserialize(self.variant.into_deserializer())?;
        Ok((variant, VariantDeserializer { value: self.value }))
    }
}

struct VariantDeserializer<'de> {
    value: Option<&'de Value>,
}

impl<'de> de::VariantAccess<'de> for VariantDeserializer<'de> {
    type Error = ParseError;

    fn unit_variant(self) -> Result<()> {
        match self.value {
            None | Some(Value::Absent) => Ok(()),
            Some(other) => Err(ParseError::TypeMismatch {
                expected: "nothing",
                found: other.kind(),
            }),
        }
    }

    fn newtype_variant_seed<T>(self, seed: T) -> Result<T::Value>
    where
        T: de::DeserializeSeed<'de>,
    {
        match self.value {
            Some(value) => seed.deserialize(Deserializer::from_value(value)),
            None => Err(ParseError::custom("expected a value for newtype variant")),
        }
    }

    fn tuple_variant<V>(self, _len: usize, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        match self.value {
            Some(value) => Deserializer::from_value(value).deserialize_seq(visitor),
            None => Err(ParseError::custom("expected a list for tuple variant")),
        }
    }

    fn struct_variant<V>(self, _fields: &'static [&'static str], visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        match self.value {
            Some(value) => Deserializer::from_value(value).deserialize_map(visitor),
            None => Err(ParseError::custom("expected a map for struct variant")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree(input: &str) -> Result<Value> {
        build_tree(input, ParseOptions::default())
    }

    #[test]
    fn test_scalar_entry() {
        let mut expected = ConlMap::new();
        expected.insert("a".to_string(), Value::from("b"));
        assert_eq!(tree("a = b\n").unwrap(), Value::Map(expected));
    }

    #[test]
    fn test_nested_list() {
        let value = tree("list\n  = 1\n  = 2\n").unwrap();
        let list = value.get("list").unwrap();
        assert_eq!(
            list.as_list().unwrap(),
            &[Value::from("1"), Value::from("2")]
        );
    }

    #[test]
    fn test_duplicate_key() {
        assert_eq!(
            tree("a = 1\na = 2\n").unwrap_err(),
            ParseError::DuplicateKey {
                line: 2,
                key: "a".to_string(),
            }
        );
    }

    #[test]
    fn test_duplicate_quoted_key_is_detected_after_decoding() {
        // "\t" and a literal tab decode to the same key
        let err = tree("\"\\t\" = 1\n\"\t\" = 2\n").unwrap_err();
        assert!(matches!(err, ParseError::DuplicateKey { line: 2, .. }));
    }

    #[test]
    fn test_duplicate_key_survives_interleaved_comments() {
        let err = tree("a = 1\n; note\n\na = 2\n").unwrap_err();
        assert!(matches!(err, ParseError::DuplicateKey { line: 4, .. }));
    }

    #[test]
    fn test_mixed_section_kind() {
        assert_eq!(
            tree("a = 1\n= 2\n").unwrap_err(),
            ParseError::MixedSectionKind {
                line: 2,
                expected: "map key",
                found: "list item",
            }
        );
        assert_eq!(
            tree("= 1\na = 2\n").unwrap_err(),
            ParseError::MixedSectionKind {
                line: 2,
                expected: "list item",
                found: "map key",
            }
        );
    }

    #[test]
    fn test_absent_entries() {
        let value = tree("a\nb = 1\n").unwrap();
        assert_eq!(value.get("a"), Some(&Value::Absent));

        let value = tree("=\n= 1\n").unwrap();
        assert_eq!(
            value.as_list().unwrap(),
            &[Value::Absent, Value::from("1")]
        );
    }

    #[test]
    fn test_empty_document_is_absent() {
        assert_eq!(tree("").unwrap(), Value::Absent);
        assert_eq!(tree("; only a comment\n").unwrap(), Value::Absent);
    }

    #[test]
    fn test_indent_after_value_is_rejected() {
        let err = tree("a = 1\n  b = 2\n").unwrap_err();
        assert_eq!(err, ParseError::malformed(2, "unexpected indent"));
    }

    #[test]
    fn test_indented_first_line_is_rejected() {
        let err = tree("  a = 1\n").unwrap_err();
        assert_eq!(err, ParseError::malformed(1, "unexpected indent"));
    }

    #[test]
    fn test_depth_guard() {
        let options = ParseOptions::new().with_max_depth(2);
        assert!(build_tree("a\n  b = 1\n", options).is_ok());
        let err = build_tree("a\n  b\n    c = 1\n", options).unwrap_err();
        assert!(matches!(err, ParseError::ResourceLimitExceeded { line: 3, .. }));
    }

    #[test]
    fn test_deep_section_ordering() {
        let value = tree("outer\n  z = 1\n  a = 2\ntail = 3\n").unwrap();
        let outer = value.get("outer").unwrap().as_map().unwrap();
        let keys: Vec<_> = outer.keys().cloned().collect();
        assert_eq!(keys, vec!["z", "a"]);
        assert_eq!(value.get("tail").and_then(|v| v.as_str()), Some("3"));
    }
}
