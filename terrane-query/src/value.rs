//! Values bound into statements.
//!
//! [`SqlValue`] is the closed set of values the engine knows how to bind
//! or inline. `Null` is a real value (it still carries a parameter type at
//! the binding site). `Geometry` is the one variant that is never bound as
//! a parameter; spatial values are inlined as WKT literals by the
//! builders; [`crate::param::ParameterMap::add`] rejects them.
//!
//! ```rust
//! use terrane_query::value::SqlValue;
//!
//! let v: SqlValue = 42i64.into();
//! assert_eq!(v, SqlValue::Int(42));
//!
//! let v: SqlValue = Option::<i64>::None.into();
//! assert!(v.is_null());
//! ```

use chrono::NaiveDateTime;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::geometry::Polygon;

/// A row of values for INSERT/MERGE, keyed by column name.
///
/// Keys not among the declared columns are ignored; declared columns
/// absent from the row bind NULL of the declared type.
pub type Row = IndexMap<String, SqlValue>;

/// A value bound into a statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SqlValue {
    /// SQL NULL.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Text value.
    String(String),
    /// Date and time of day.
    DateTime(NaiveDateTime),
    /// Raw bytes.
    Bytes(Vec<u8>),
    /// Polygon geometry; inlined as a WKT literal, never parameterized.
    Geometry(Polygon),
}

impl SqlValue {
    /// Check if this is SQL NULL.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Short name of the variant, used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Int(_) => "integer",
            Self::String(_) => "string",
            Self::DateTime(_) => "datetime",
            Self::Bytes(_) => "bytes",
            Self::Geometry(_) => "geometry",
        }
    }
}

impl From<bool> for SqlValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for SqlValue {
    fn from(v: i32) -> Self {
        Self::Int(v as i64)
    }
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<NaiveDateTime> for SqlValue {
    fn from(v: NaiveDateTime) -> Self {
        Self::DateTime(v)
    }
}

impl From<Vec<u8>> for SqlValue {
    fn from(v: Vec<u8>) -> Self {
        Self::Bytes(v)
    }
}

impl From<Polygon> for SqlValue {
    fn from(v: Polygon) -> Self {
        Self::Geometry(v)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => Self::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_conversions() {
        assert_eq!(SqlValue::from(7i32), SqlValue::Int(7));
        assert_eq!(SqlValue::from(true), SqlValue::Bool(true));
        assert_eq!(SqlValue::from("x"), SqlValue::String("x".into()));
        assert_eq!(SqlValue::from(vec![1u8, 2]), SqlValue::Bytes(vec![1, 2]));
        assert_eq!(SqlValue::from(Some(3i64)), SqlValue::Int(3));
        assert_eq!(SqlValue::from(Option::<bool>::None), SqlValue::Null);
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(SqlValue::Null.kind_name(), "null");
        assert_eq!(SqlValue::Int(1).kind_name(), "integer");
        assert_eq!(SqlValue::Bytes(vec![]).kind_name(), "bytes");
    }
}
