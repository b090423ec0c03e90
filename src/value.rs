//! The parsed representation of a CONL document.
//!
//! This module provides the [`Value`] enum: scalars, ordered maps, lists,
//! and the [`Value::Absent`] marker for keys and items written with no
//! value. Scalars are untyped text; deciding whether `10GB` is a size or a
//! string belongs to the consumer, never to the parser.
//!
//! ## Absent
//!
//! `Absent` is distinct from an empty map, an empty list, and an empty
//! string. A key written with no value and no nested section parses to
//! `Absent`, and the coercion helpers resolve it on demand:
//!
//! ```rust
//! use conl::{parse_str, Value};
//!
//! let doc = parse_str("plugins\n").unwrap();
//! let plugins = doc.as_map().unwrap().get("plugins").unwrap().clone();
//! assert_eq!(plugins, Value::Absent);
//! assert!(plugins.as_map().unwrap().is_empty());
//! assert!(plugins.as_list().unwrap().is_empty());
//! assert_eq!(plugins.as_scalar().unwrap(), "");
//! ```

use crate::error::{ParseError, Result};
use crate::ConlMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::OnceLock;

/// Any CONL value.
///
/// The tree is built by [`crate::parse`] and consumed by
/// [`crate::serialize`]; it has no back-references and cannot form cycles.
///
/// # Examples
///
/// ```rust
/// use conl::{ConlMap, Value};
///
/// let scalar = Value::from("8080");
/// assert!(scalar.is_scalar());
///
/// let mut map = ConlMap::new();
/// map.insert("port".to_string(), scalar);
/// let value = Value::Map(map);
/// assert_eq!(value.get("port").and_then(|v| v.as_str()), Some("8080"));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum Value {
    /// Arbitrary Unicode text; the format's only leaf type.
    Scalar(String),
    /// An ordered map with unique keys.
    Map(ConlMap),
    /// An ordered list.
    List(Vec<Value>),
    /// A key or item written with no value and no nested section, or the
    /// result of parsing an empty document.
    #[default]
    Absent,
}

fn empty_map() -> &'static ConlMap {
    static EMPTY: OnceLock<ConlMap> = OnceLock::new();
    EMPTY.get_or_init(ConlMap::new)
}

impl Value {
    /// Returns `true` if the value is a scalar.
    #[inline]
    #[must_use]
    pub const fn is_scalar(&self) -> bool {
        matches!(self, Value::Scalar(_))
    }

    /// Returns `true` if the value is a map.
    #[inline]
    #[must_use]
    pub const fn is_map(&self) -> bool {
        matches!(self, Value::Map(_))
    }

    /// Returns `true` if the value is a list.
    #[inline]
    #[must_use]
    pub const fn is_list(&self) -> bool {
        matches!(self, Value::List(_))
    }

    /// Returns `true` if the value is absent.
    #[inline]
    #[must_use]
    pub const fn is_absent(&self) -> bool {
        matches!(self, Value::Absent)
    }

    /// A stable name for this value's shape, used in error messages.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Value::Scalar(_) => "a scalar",
            Value::Map(_) => "a map",
            Value::List(_) => "a list",
            Value::Absent => "nothing",
        }
    }

    /// If the value is a scalar, returns its text. Otherwise returns `None`.
    ///
    /// Unlike [`Value::as_scalar`] this does not coerce `Absent`.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Scalar(s) => Some(s),
            _ => None,
        }
    }

    /// If the value is a map, looks up `key` in it.
    #[inline]
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Map(map) => map.get(key),
            _ => None,
        }
    }

    /// Coerces this value to scalar text.
    ///
    /// `Absent` coerces to the empty string; maps and lists are a
    /// [`ParseError::TypeMismatch`].
    pub fn as_scalar(&self) -> Result<&str> {
        match self {
            Value::Scalar(s) => Ok(s),
            Value::Absent => Ok(""),
            other => Err(ParseError::TypeMismatch {
                expected: "a scalar",
                found: other.kind(),
            }),
        }
    }

    /// Coerces this value to a list slice.
    ///
    /// `Absent` coerces to the empty list; maps and scalars are a
    /// [`ParseError::TypeMismatch`].
    pub fn as_list(&self) -> Result<&[Value]> {
        match self {
            Value::List(items) => Ok(items),
            Value::Absent => Ok(&[]),
            other => Err(ParseError::TypeMismatch {
                expected: "a list",
                found: other.kind(),
            }),
        }
    }

    /// Coerces this value to a map.
    ///
    /// `Absent` coerces to the empty map; lists and scalars are a
    /// [`ParseError::TypeMismatch`].
    pub fn as_map(&self) -> Result<&ConlMap> {
        match self {
            Value::Map(map) => Ok(map),
            Value::Absent => Ok(empty_map()),
            other => Err(ParseError::TypeMismatch {
                expected: "a map",
                found: other.kind(),
            }),
        }
    }
}

/// Formats the value as canonical CONL text.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::serialize(self))
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::Scalar(s) => serializer.serialize_str(s),
            Value::List(items) => {
                use serde::ser::SerializeSeq;
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Map(map) => {
                use serde::ser::SerializeMap;
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (k, v) in map.iter() {
                    out.serialize_entry(k, v)?;
                }
                out.end()
            }
            Value::Absent => serializer.serialize_unit(),
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::{self, Visitor};

        struct ValueVisitor;

        impl<'de> Visitor<'de> for ValueVisitor {
            type Value = Value;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("any CONL value")
            }

            // Typed inputs from JSON-like sources become scalar text;
            // CONL itself never produces them.
            fn visit_bool<E>(self, value: bool) -> std::result::Result<Value, E> {
                Ok(Value::Scalar(value.to_string()))
            }

            fn visit_i64<E>(self, value: i64) -> std::result::Result<Value, E> {
                Ok(Value::Scalar(value.to_string()))
            }

            fn visit_u64<E>(self, value: u64) -> std::result::Result<Value, E> {
                Ok(Value::Scalar(value.to_string()))
            }

            fn visit_f64<E>(self, value: f64) -> std::result::Result<Value, E> {
                Ok(Value::Scalar(value.to_string()))
            }

            fn visit_str<E>(self, value: &str) -> std::result::Result<Value, E> {
                Ok(Value::Scalar(value.to_string()))
            }

            fn visit_string<E>(self, value: String) -> std::result::Result<Value, E> {
                Ok(Value::Scalar(value))
            }

            fn visit_unit<E>(self) -> std::result::Result<Value, E> {
                Ok(Value::Absent)
            }

            fn visit_none<E>(self) -> std::result::Result<Value, E> {
                Ok(Value::Absent)
            }

            fn visit_some<D>(self, deserializer: D) -> std::result::Result<Value, D::Error>
            where
                D: Deserializer<'de>,
            {
                Deserialize::deserialize(deserializer)
            }

            fn visit_seq<A>(self, mut seq: A) -> std::result::Result<Value, A::Error>
            where
                A: de::SeqAccess<'de>,
            {
                let mut items = Vec::new();
                while let Some(item) = seq.next_element()? {
                    items.push(item);
                }
                Ok(Value::List(items))
            }

            fn visit_map<A>(self, mut access: A) -> std::result::Result<Value, A::Error>
            where
                A: de::MapAccess<'de>,
            {
                let mut map = ConlMap::new();
                while let Some((key, value)) = access.next_entry()? {
                    map.insert(key, value);
                }
                Ok(Value::Map(map))
            }
        }

        deserializer.deserialize_any(ValueVisitor)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Scalar(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Scalar(value.to_string())
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::List(value)
    }
}

impl From<ConlMap> for Value {
    fn from(value: ConlMap) -> Self {
        Value::Map(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_map() -> ConlMap {
        let mut map = ConlMap::new();
        map.insert("a".to_string(), Value::from("1"));
        map
    }

    #[test]
    fn test_shape_predicates() {
        assert!(Value::from("x").is_scalar());
        assert!(Value::Map(ConlMap::new()).is_map());
        assert!(Value::List(vec![]).is_list());
        assert!(Value::Absent.is_absent());
        assert!(Value::default().is_absent());
    }

    #[test]
    fn test_absent_coercions() {
        assert_eq!(Value::Absent.as_scalar().unwrap(), "");
        assert!(Value::Absent.as_list().unwrap().is_empty());
        assert!(Value::Absent.as_map().unwrap().is_empty());
    }

    #[test]
    fn test_mismatched_coercions() {
        let list = Value::List(vec![Value::from("1")]);
        assert_eq!(
            list.as_scalar().unwrap_err(),
            ParseError::TypeMismatch {
                expected: "a scalar",
                found: "a list",
            }
        );
        assert!(Value::from("x").as_map().is_err());
        assert!(Value::Map(sample_map()).as_list().is_err());
    }

    #[test]
    fn test_successful_coercions() {
        assert_eq!(Value::from("text").as_scalar().unwrap(), "text");
        assert_eq!(Value::Map(sample_map()).as_map().unwrap().len(), 1);
        assert_eq!(
            Value::List(vec![Value::from("1"), Value::from("2")])
                .as_list()
                .unwrap()
                .len(),
            2
        );
    }

    #[test]
    fn test_get() {
        let value = Value::Map(sample_map());
        assert_eq!(value.get("a").and_then(|v| v.as_str()), Some("1"));
        assert_eq!(value.get("missing"), None);
        assert_eq!(Value::from("x").get("a"), None);
    }
}
