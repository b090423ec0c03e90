/// Builds a [`crate::Value`] tree from a literal.
///
/// Scalar leaves are written as string literals (CONL scalars are untyped
/// text), maps as `{ "key": value }`, lists as `[ ... ]`, and a missing
/// value as `absent`.
///
/// ```rust
/// use conl::conl;
///
/// let config = conl!({
///     "name": "demo",
///     "features": ["alpha", "beta"],
///     "plugins": absent,
/// });
/// assert_eq!(config.get("name").and_then(|v| v.as_str()), Some("demo"));
/// ```
#[macro_export]
macro_rules! conl {
    // A key or item written with no value
    (absent) => {
        $crate::Value::Absent
    };

    ([]) => {
        $crate::Value::List(vec![])
    };

    ([ $($elem:tt),* $(,)? ]) => {
        $crate::Value::List(vec![$($crate::conl!($elem)),*])
    };

    ({}) => {
        $crate::Value::Map($crate::ConlMap::new())
    };

    ({ $($key:literal : $value:tt),* $(,)? }) => {{
        let mut map = $crate::ConlMap::new();
        $(
            map.insert($key.to_string(), $crate::conl!($value));
        )*
        $crate::Value::Map(map)
    }};

    // Any expression convertible into a Value, usually a string
    ($other:expr) => {
        $crate::Value::from($other)
    };
}

#[cfg(test)]
mod tests {
    use crate::{ConlMap, Value};

    #[test]
    fn test_conl_macro_leaves() {
        assert_eq!(conl!(absent), Value::Absent);
        assert_eq!(conl!("hello"), Value::Scalar("hello".to_string()));
        assert_eq!(conl!("42"), Value::Scalar("42".to_string()));
    }

    #[test]
    fn test_conl_macro_lists() {
        assert_eq!(conl!([]), Value::List(vec![]));

        let list = conl!(["1", "2", "3"]);
        assert_eq!(
            list.as_list().unwrap(),
            &[Value::from("1"), Value::from("2"), Value::from("3")]
        );
    }

    #[test]
    fn test_conl_macro_maps() {
        assert_eq!(conl!({}), Value::Map(ConlMap::new()));

        let map = conl!({
            "name": "Alice",
            "groups": ["admin", "dev"],
            "shell": absent
        });
        assert_eq!(map.get("name"), Some(&Value::from("Alice")));
        assert_eq!(map.get("shell"), Some(&Value::Absent));
        assert_eq!(map.get("groups").unwrap().as_list().unwrap().len(), 2);
    }

    #[test]
    fn test_conl_macro_nesting() {
        let value = conl!({
            "outer": {
                "inner": ["a", { "deep": "yes" }]
            }
        });
        let inner = value.get("outer").unwrap().get("inner").unwrap();
        assert_eq!(
            inner.as_list().unwrap()[1].get("deep").and_then(|v| v.as_str()),
            Some("yes")
        );
    }
}
