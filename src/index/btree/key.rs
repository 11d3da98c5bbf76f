//! Column values usable as index keys.

use std::fmt;

/// A dynamically typed column value with a total order.
///
/// Tables in SawitDB are schemaless, so one column can hold integers in some
/// rows and text in others. `IndexKey` gives such columns a stable
/// cross-type order:
///
/// ```text
/// Null < Bool(false) < Bool(true) < Int(i64::MIN) < ... < Int(i64::MAX) < Text("") < Text(..)
/// ```
///
/// Within a type the natural order applies (text compares bytewise). Floats
/// are not representable; callers index them through a scaled `Int`.
///
/// # Example
/// ```
/// use sawitdb::index::IndexKey;
///
/// assert!(IndexKey::Null < IndexKey::from(false));
/// assert!(IndexKey::from(i64::MAX) < IndexKey::from(""));
/// assert!(IndexKey::from("Ayu") < IndexKey::from("Budi"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum IndexKey {
    Null,
    Bool(bool),
    Int(i64),
    Text(String),
}

impl From<bool> for IndexKey {
    fn from(v: bool) -> Self {
        IndexKey::Bool(v)
    }
}

impl From<i64> for IndexKey {
    fn from(v: i64) -> Self {
        IndexKey::Int(v)
    }
}

impl From<i32> for IndexKey {
    fn from(v: i32) -> Self {
        IndexKey::Int(i64::from(v))
    }
}

impl From<&str> for IndexKey {
    fn from(v: &str) -> Self {
        IndexKey::Text(v.to_string())
    }
}

impl From<String> for IndexKey {
    fn from(v: String) -> Self {
        IndexKey::Text(v)
    }
}

impl<T: Into<IndexKey>> From<Option<T>> for IndexKey {
    fn from(v: Option<T>) -> Self {
        v.map_or(IndexKey::Null, Into::into)
    }
}

impl fmt::Display for IndexKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexKey::Null => write!(f, "NULL"),
            IndexKey::Bool(v) => write!(f, "{}", v),
            IndexKey::Int(v) => write!(f, "{}", v),
            IndexKey::Text(v) => write!(f, "'{}'", v),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cross_type_order() {
        let mut keys = vec![
            IndexKey::from("a"),
            IndexKey::from(3),
            IndexKey::Null,
            IndexKey::from(true),
            IndexKey::from(-5),
            IndexKey::from(false),
            IndexKey::from(""),
        ];
        keys.sort();

        assert_eq!(
            keys,
            vec![
                IndexKey::Null,
                IndexKey::Bool(false),
                IndexKey::Bool(true),
                IndexKey::Int(-5),
                IndexKey::Int(3),
                IndexKey::Text(String::new()),
                IndexKey::Text("a".to_string()),
            ]
        );
    }

    #[test]
    fn test_option_maps_none_to_null() {
        assert_eq!(IndexKey::from(None::<i64>), IndexKey::Null);
        assert_eq!(IndexKey::from(Some(7i64)), IndexKey::Int(7));
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", IndexKey::Null), "NULL");
        assert_eq!(format!("{}", IndexKey::from(17)), "17");
        assert_eq!(format!("{}", IndexKey::from("Ayu")), "'Ayu'");
        assert_eq!(format!("{}", IndexKey::from(true)), "true");
    }
}
