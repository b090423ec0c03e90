//! Serializing value trees back to CONL text, and serializing arbitrary
//! Rust values into trees.
//!
//! The emitter is the inverse of parsing: given a [`Value`] it produces
//! minimal, re-parseable text, choosing per scalar between bare text, a
//! multiline block and a quoted scalar with minimal escaping. Nesting is
//! always indented with a fixed-width run of spaces per level, so sibling
//! lines can never end up with prefix-incomparable indentation.
//!
//! Serialization is total: any tree that satisfies the data-model
//! invariants emits successfully. The one caveat is shape, not failure: a
//! document is a map or list at the top level, so a top-level `Scalar` is
//! emitted in value syntax and an empty map or list is emitted the same
//! way as `Absent` (a key or item with no value) — the text format has no
//! spelling that distinguishes them.
//!
//! ## Examples
//!
//! ```rust
//! use conl::{ConlMap, Value};
//!
//! let mut map = ConlMap::new();
//! map.insert("name".to_string(), Value::from("demo"));
//! map.insert("motd".to_string(), Value::from("hello\nworld"));
//!
//! let text = conl::serialize(&Value::Map(map));
//! assert_eq!(text, "name = demo\nmotd = \"\"\"\n  hello\n  world\n");
//! ```

use crate::error::{ParseError, Result};
use crate::scalar::is_blank;
use crate::{ConlMap, SerializeOptions, Value};
use serde::{ser, Serialize};

/// Emits `value` as canonical CONL text.
pub(crate) fn to_text(value: &Value, options: &SerializeOptions) -> String {
    let mut emitter = Emitter {
        out: String::with_capacity(256),
        unit: options.indent.max(1),
    };
    match value {
        Value::Absent => {}
        Value::Scalar(s) => emitter.emit_scalar(s, 0),
        Value::Map(map) => emitter.emit_map(map, 0),
        Value::List(items) => emitter.emit_list(items, 0),
    }
    emitter.out
}

struct Emitter {
    out: String,
    unit: usize,
}

impl Emitter {
    fn pad(&mut self, depth: usize) {
        for _ in 0..depth * self.unit {
            self.out.push(' ');
        }
    }

    fn emit_map(&mut self, map: &ConlMap, depth: usize) {
        for (key, value) in map.iter() {
            self.pad(depth);
            self.emit_key(key);
            self.emit_entry_value(value, depth);
        }
    }

    fn emit_list(&mut self, items: &[Value], depth: usize) {
        for item in items {
            self.pad(depth);
            self.out.push('=');
            self.emit_entry_value(item, depth);
        }
    }

    /// Emits everything after a key or `=`, including the line break and
    /// any nested section.
    fn emit_entry_value(&mut self, value: &Value, depth: usize) {
        match value {
            Value::Absent => self.out.push('\n'),
            Value::Map(map) if map.is_empty() => self.out.push('\n'),
            Value::List(items) if items.is_empty() => self.out.push('\n'),
            Value::Scalar(s) => {
                // a list line already ends in '=', a key line needs one
                if !self.out.ends_with('=') {
                    self.out.push_str(" =");
                }
                self.out.push(' ');
                self.emit_scalar(s, depth);
            }
            Value::Map(map) => {
                self.out.push('\n');
                self.emit_map(map, depth + 1);
            }
            Value::List(items) => {
                self.out.push('\n');
                self.emit_list(items, depth + 1);
            }
        }
    }

    fn emit_key(&mut self, key: &str) {
        if bare_key_safe(key) {
            self.out.push_str(key);
        } else {
            self.quote(key);
        }
    }

    fn emit_scalar(&mut self, s: &str, depth: usize) {
        if bare_value_safe(s) {
            self.out.push_str(s);
            self.out.push('\n');
        } else if multiline_safe(s) {
            self.out.push_str("\"\"\"\n");
            for line in s.split('\n') {
                if !line.is_empty() {
                    self.pad(depth + 1);
                    self.out.push_str(line);
                }
                self.out.push('\n');
            }
        } else {
            self.quote(s);
            self.out.push('\n');
        }
    }

    fn quote(&mut self, s: &str) {
        self.out.push('"');
        for c in s.chars() {
            match c {
                '\\' => self.out.push_str("\\\\"),
                '"' => self.out.push_str("\\\""),
                '\t' => self.out.push_str("\\t"),
                '\r' => self.out.push_str("\\r"),
                '\n' => self.out.push_str("\\n"),
                c if (c as u32) < 0x20 => {
                    self.out.push_str(&format!("\\{{{:X}}}", c as u32));
                }
                c => self.out.push(c),
            }
        }
        self.out.push('"');
    }
}

/// A key can stay bare unless it is empty, opens with a quote or blank,
/// ends with a blank, or contains one of the key delimiters.
fn bare_key_safe(key: &str) -> bool {
    !key.is_empty()
        && !key.starts_with('"')
        && !key.starts_with(is_blank)
        && !key.ends_with(is_blank)
        && !key.contains([';', '=', '\r', '\n'])
}

/// A value can stay bare unless it is empty, opens with a quote, spans
/// lines, contains a comment marker, or has boundary blanks that trimming
/// would eat. Embedded `=` is fine in value position.
fn bare_value_safe(s: &str) -> bool {
    !s.is_empty()
        && !s.starts_with('"')
        && !s.starts_with(is_blank)
        && !s.ends_with(is_blank)
        && !s.contains([';', '\r', '\n'])
}

/// Multiline blocks cannot carry a CR or boundary blanks/newlines; those
/// fall back to quoted escapes.
fn multiline_safe(s: &str) -> bool {
    s.contains('\n')
        && !s.contains('\r')
        && s.trim_matches(|c| c == ' ' || c == '\t' || c == '\n') == s
}

/// A serde serializer producing a [`Value`] tree.
///
/// This is the typed entry into the emitter: [`crate::to_string`] runs any
/// `T: Serialize` through it and then emits the resulting tree. Primitives
/// become scalar text (`true`, `42`, `2.5`), `None` and unit become
/// [`Value::Absent`], sequences become lists, maps and structs become maps.
pub struct ValueSerializer;

fn scalar(text: impl Into<String>) -> Value {
    Value::Scalar(text.into())
}

impl ser::Serializer for ValueSerializer {
    type Ok = Value;
    type Error = ParseError;

    type SerializeSeq = SerializeVec;
    type SerializeTuple = SerializeVec;
    type SerializeTupleStruct = SerializeVec;
    type SerializeTupleVariant = SerializeTupleVariant;
    type SerializeMap = SerializeMap;
    type SerializeStruct = SerializeMap;
    type SerializeStructVariant = SerializeStructVariant;

    fn serialize_bool(self, v: bool) -> Result<Value> {
        Ok(scalar(if v { "true" } else { "false" }))
    }

    fn serialize_i8(self, v: i8) -> Result<Value> {
        Ok(scalar(v.to_string()))
    }

    fn serialize_i16(self, v: i16) -> Result<Value> {
        Ok(scalar(v.to_string()))
    }

    fn serialize_i32(self, v: i32) -> Result<Value> {
        Ok(scalar(v.to_string()))
    }

    fn serialize_i64(self, v: i64) -> Result<Value> {
        Ok(scalar(v.to_string()))
    }

    fn serialize_u8(self, v: u8) -> Result<Value> {
        Ok(scalar(v.to_string()))
    }

    fn serialize_u16(self, v: u16) -> Result<Value> {
        Ok(scalar(v.to_string()))
    }

    fn serialize_u32(self, v: u32) -> Result<Value> {
        Ok(scalar(v.to_string()))
    }

    fn serialize_u64(self, v: u64) -> Result<Value> {
        Ok(scalar(v.to_string()))
    }

    fn serialize_f32(self, v: f32) -> Result<Value> {
        Ok(scalar(v.to_string()))
    }

    fn serialize_f64(self, v: f64) -> Result<Value> {
        Ok(scalar(v.to_string()))
    }

    fn serialize_char(self, v: char) -> Result<Value> {
        Ok(scalar(v.to_string()))
    }

    fn serialize_str(self, v: &str) -> Result<Value> {
        Ok(scalar(v))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Value> {
        Ok(Value::List(
            v.iter().map(|b| scalar(b.to_string())).collect(),
        ))
    }

    fn serialize_none(self) -> Result<Value> {
        Ok(Value::Absent)
    }

    fn serialize_some<T>(self, value: &T) -> Result<Value>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Value> {
        Ok(Value::Absent)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Value> {
        Ok(Value::Absent)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Value> {
        Ok(scalar(variant))
    }

    fn serialize_newtype_struct<T>(self, _name: &'static str, value: &T) -> Result<Value>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Value>
    where
        T: ?Sized + Serialize,
    {
        let mut map = ConlMap::new();
        map.insert(variant.to_string(), value.serialize(ValueSerializer)?);
        Ok(Value::Map(map))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<Self::SerializeSeq> {
        Ok(SerializeVec {
            items: Vec::with_capacity(len.unwrap_or(0)),
        })
    }

    fn serialize_tuple(self, len: usize) -> Result<Self::SerializeTuple> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<Self::SerializeTupleStruct> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        Ok(SerializeTupleVariant {
            variant,
            items: Vec::with_capacity(len),
        })
    }

    fn serialize_map(self, len: Option<usize>) -> Result<Self::SerializeMap> {
        Ok(SerializeMap {
            map: ConlMap::with_capacity(len.unwrap_or(0)),
            next_key: None,
        })
    }

    fn serialize_struct(self, _name: &'static str, len: usize) -> Result<Self::SerializeStruct> {
        self.serialize_map(Some(len))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        Ok(SerializeStructVariant {
            variant,
            map: ConlMap::with_capacity(len),
        })
    }
}

pub struct SerializeVec {
    items: Vec<Value>,
}

impl ser::SerializeSeq for SerializeVec {
    type Ok = Value;
    type Error = ParseError;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.items.push(value.serialize(ValueSerializer)?);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        Ok(Value::List(self.items))
    }
}

impl ser::SerializeTuple for SerializeVec {
    type Ok = Value;
    type Error = ParseError;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<Value> {
        ser::SerializeSeq::end(self)
    }
}

impl ser::SerializeTupleStruct for SerializeVec {
    type Ok = Value;
    type Error = ParseError;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<Value> {
        ser::SerializeSeq::end(self)
    }
}

pub struct SerializeTupleVariant {
    variant: &'static str,
    items: Vec<Value>,
}

impl ser::SerializeTupleVariant for SerializeTupleVariant {
    type Ok = Value;
    type Error = ParseError;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.items.push(value.serialize(ValueSerializer)?);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        let mut map = ConlMap::new();
        map.insert(self.variant.to_string(), Value::List(self.items));
        Ok(Value::Map(map))
    }
}

pub struct SerializeMap {
    map: ConlMap,
    next_key: Option<String>,
}

impl ser::SerializeMap for SerializeMap {
    type Ok = Value;
    type Error = ParseError;

    fn serialize_key<T>(&mut self, key: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        match key.serialize(ValueSerializer)? {
            Value::Scalar(text) => {
                self.next_key = Some(text);
                Ok(())
            }
            other => Err(ParseError::custom(format!(
                "map keys must be scalar text, found {}",
                other.kind()
            ))),
        }
    }

    fn serialize_value<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        let key = self.next_key.take().expect("serialize_value before key");
        self.map.insert(key, value.serialize(ValueSerializer)?);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        Ok(Value::Map(self.map))
    }
}

impl ser::SerializeStruct for SerializeMap {
    type Ok = Value;
    type Error = ParseError;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.map
            .insert(key.to_string(), value.serialize(ValueSerializer)?);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        Ok(Value::Map(self.map))
    }
}

pub struct SerializeStructVariant {
    variant: &'static str,
    map: ConlMap,
}

impl ser::SerializeStructVariant for SerializeStructVariant {
    type Ok = Value;
    type Error = ParseError;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.map
            .insert(key.to_string(), value.serialize(ValueSerializer)?);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        let mut outer = ConlMap::new();
        outer.insert(self.variant.to_string(), Value::Map(self.map));
        Ok(Value::Map(outer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(entries: &[(&str, Value)]) -> Value {
        let mut out = ConlMap::new();
        for (key, value) in entries {
            out.insert(key.to_string(), value.clone());
        }
        Value::Map(out)
    }

    fn emit(value: &Value) -> String {
        to_text(value, &SerializeOptions::default())
    }

    #[test]
    fn test_bare_entries() {
        let value = map(&[("a", Value::from("b")), ("c", Value::from("d e"))]);
        assert_eq!(emit(&value), "a = b\nc = d e\n");
    }

    #[test]
    fn test_nested_sections() {
        let value = map(&[
            (
                "server",
                map(&[("host", Value::from("localhost")), ("port", Value::from("8080"))]),
            ),
            (
                "tags",
                Value::List(vec![Value::from("a"), Value::from("b")]),
            ),
        ]);
        assert_eq!(
            emit(&value),
            "server\n  host = localhost\n  port = 8080\ntags\n  = a\n  = b\n"
        );
    }

    #[test]
    fn test_absent_and_empty_containers() {
        let value = map(&[
            ("absent", Value::Absent),
            ("empty_map", Value::Map(ConlMap::new())),
            ("empty_list", Value::List(vec![])),
        ]);
        assert_eq!(emit(&value), "absent\nempty_map\nempty_list\n");
    }

    #[test]
    fn test_quoting_choices() {
        let value = map(&[
            ("empty", Value::from("")),
            ("comment", Value::from("a ; b")),
            ("padded", Value::from(" x ")),
            ("quoteish", Value::from("\"x\"")),
        ]);
        assert_eq!(
            emit(&value),
            "empty = \"\"\ncomment = \"a ; b\"\npadded = \" x \"\nquoteish = \"\\\"x\\\"\"\n"
        );
    }

    #[test]
    fn test_key_quoting() {
        let value = map(&[
            ("with = sign", Value::from("1")),
            ("", Value::from("2")),
            (" padded", Value::from("3")),
        ]);
        assert_eq!(
            emit(&value),
            "\"with = sign\" = 1\n\"\" = 2\n\" padded\" = 3\n"
        );
    }

    #[test]
    fn test_multiline_choice() {
        let value = map(&[("text", Value::from("line1\n\nline2"))]);
        assert_eq!(emit(&value), "text = \"\"\"\n  line1\n\n  line2\n");
    }

    #[test]
    fn test_multiline_rejected_for_boundary_blanks() {
        // trailing newline forces quoted form
        let value = map(&[("text", Value::from("a\nb\n"))]);
        assert_eq!(emit(&value), "text = \"a\\nb\\n\"\n");
    }

    #[test]
    fn test_control_characters_escaped() {
        let value = map(&[("bell", Value::from("a\u{7}b"))]);
        assert_eq!(emit(&value), "bell = \"a\\{7}b\"\n");
    }

    #[test]
    fn test_list_of_nested_maps() {
        let value = Value::List(vec![
            map(&[("a", Value::from("1"))]),
            Value::Absent,
        ]);
        assert_eq!(emit(&value), "=\n  a = 1\n=\n");
    }

    #[test]
    fn test_empty_document() {
        assert_eq!(emit(&Value::Absent), "");
    }
}
