//! Property types, column descriptors, and sort order.
//!
//! The engine maps an abstract property-type system onto concrete SQL
//! Server parameter types:
//!
//! ```rust
//! use terrane_query::types::{PropertyType, SqlParamType};
//!
//! assert_eq!(PropertyType::Boolean.to_sql_type(), SqlParamType::Bit);
//! assert_eq!(PropertyType::Spatial.to_sql_type(), SqlParamType::Geometry);
//!
//! // Parsing from the schema spelling fails outside the supported set.
//! let ty: PropertyType = "dateTime".parse().unwrap();
//! assert_eq!(ty, PropertyType::DateTime);
//! assert!("point3d".parse::<PropertyType>().is_err());
//! ```

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use std::fmt;
use std::str::FromStr;

use crate::error::StatementError;

/// Abstract property type, as declared by a schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PropertyType {
    /// True/false flag.
    Boolean,
    /// Whole number.
    Integer,
    /// Text.
    String,
    /// Date and time of day.
    DateTime,
    /// Opaque byte stream.
    Binary,
    /// Planar geometry (polygon footprints).
    Spatial,
}

impl PropertyType {
    /// Map this abstract type to the concrete database parameter type.
    ///
    /// Total over the enum; the "unknown type" failure mode lives at the
    /// string boundary in [`FromStr`].
    pub fn to_sql_type(self) -> SqlParamType {
        match self {
            Self::Boolean => SqlParamType::Bit,
            Self::Integer => SqlParamType::BigInt,
            Self::String => SqlParamType::NVarChar,
            Self::DateTime => SqlParamType::DateTime2,
            Self::Binary => SqlParamType::VarBinary,
            Self::Spatial => SqlParamType::Geometry,
        }
    }
}

impl FromStr for PropertyType {
    type Err = StatementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "boolean" | "bool" => Ok(Self::Boolean),
            "int" | "integer" | "long" => Ok(Self::Integer),
            "string" => Ok(Self::String),
            "dateTime" | "datetime" => Ok(Self::DateTime),
            "binary" => Ok(Self::Binary),
            "spatial" | "geometry" => Ok(Self::Spatial),
            other => Err(StatementError::UnsupportedPropertyType(other.to_string())),
        }
    }
}

/// Concrete SQL Server parameter type used when binding values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SqlParamType {
    /// `bit`
    Bit,
    /// `bigint`
    BigInt,
    /// `nvarchar(max)`
    NVarChar,
    /// `datetime2`
    DateTime2,
    /// `varbinary(max)`
    VarBinary,
    /// `geometry`. Never bound as a parameter; values are inlined as WKT.
    Geometry,
}

impl SqlParamType {
    /// The T-SQL spelling of this type.
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Bit => "bit",
            Self::BigInt => "bigint",
            Self::NVarChar => "nvarchar(max)",
            Self::DateTime2 => "datetime2",
            Self::VarBinary => "varbinary(max)",
            Self::Geometry => "geometry",
        }
    }
}

impl fmt::Display for SqlParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_sql())
    }
}

/// Sort order for ORDER BY terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortOrder {
    /// Ascending order.
    Asc,
    /// Descending order.
    Desc,
}

impl SortOrder {
    /// Get the SQL keyword for this sort order.
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

impl Default for SortOrder {
    fn default() -> Self {
        Self::Asc
    }
}

/// A single ORDER BY term. The order of terms in the statement follows
/// the order they were added to the builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderByTerm {
    table: Option<SmolStr>,
    column: SmolStr,
    order: SortOrder,
}

impl OrderByTerm {
    /// Create a new ORDER BY term.
    pub fn new(table: Option<&str>, column: &str, order: SortOrder) -> Self {
        Self {
            table: table.filter(|t| !t.is_empty()).map(SmolStr::new),
            column: SmolStr::new(column),
            order,
        }
    }

    /// Write `alias.column ASC` into a buffer.
    pub fn write_sql(&self, buffer: &mut String) {
        if let Some(table) = &self.table {
            buffer.push_str(table);
            buffer.push('.');
        }
        buffer.push_str(&self.column);
        buffer.push(' ');
        buffer.push_str(self.order.as_sql());
    }
}

/// What a declared column holds, which decides how it is selected and how
/// row values for it are emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnKind {
    /// Ordinary scalar property.
    Property,
    /// Geometry column; selection expands to WKT text plus SRID, row
    /// values are inlined as `geometry::STGeomFromText(...)`.
    Spatial,
    /// Opaque stream selected and bound as raw bytes.
    Stream,
}

/// A declared column: name, kind, and the parameter type used when
/// binding values (including NULLs) for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    name: SmolStr,
    kind: ColumnKind,
    ty: SqlParamType,
}

impl Column {
    /// Declare an ordinary column with the given parameter type.
    pub fn new(name: &str, ty: SqlParamType) -> Self {
        Self {
            name: SmolStr::new(name),
            kind: ColumnKind::Property,
            ty,
        }
    }

    /// Declare a spatial (geometry) column.
    pub fn spatial(name: &str) -> Self {
        Self {
            name: SmolStr::new(name),
            kind: ColumnKind::Spatial,
            ty: SqlParamType::Geometry,
        }
    }

    /// Declare a binary stream column.
    pub fn binary(name: &str) -> Self {
        Self {
            name: SmolStr::new(name),
            kind: ColumnKind::Stream,
            ty: SqlParamType::VarBinary,
        }
    }

    /// The column name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The column kind.
    pub fn kind(&self) -> ColumnKind {
        self.kind
    }

    /// The parameter type values for this column bind as.
    pub fn param_type(&self) -> SqlParamType {
        self.ty
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_type_mapping_is_total() {
        let all = [
            PropertyType::Boolean,
            PropertyType::Integer,
            PropertyType::String,
            PropertyType::DateTime,
            PropertyType::Binary,
            PropertyType::Spatial,
        ];
        let expected = [
            SqlParamType::Bit,
            SqlParamType::BigInt,
            SqlParamType::NVarChar,
            SqlParamType::DateTime2,
            SqlParamType::VarBinary,
            SqlParamType::Geometry,
        ];
        for (ty, want) in all.into_iter().zip(expected) {
            assert_eq!(ty.to_sql_type(), want);
        }
    }

    #[test]
    fn test_parse_rejects_unknown_names() {
        let err = "point3d".parse::<PropertyType>().unwrap_err();
        assert_eq!(
            err,
            StatementError::UnsupportedPropertyType("point3d".into())
        );
        assert!(!err.is_misuse());
    }

    #[test]
    fn test_order_by_term_sql() {
        let mut buf = String::new();
        OrderByTerm::new(Some("idx"), "CreatedOn", SortOrder::Desc).write_sql(&mut buf);
        assert_eq!(buf, "idx.CreatedOn DESC");

        let mut buf = String::new();
        OrderByTerm::new(None, "Id", SortOrder::Asc).write_sql(&mut buf);
        assert_eq!(buf, "Id ASC");
    }

    #[test]
    fn test_empty_table_is_unqualified() {
        let mut buf = String::new();
        OrderByTerm::new(Some(""), "Id", SortOrder::Asc).write_sql(&mut buf);
        assert_eq!(buf, "Id ASC");
    }
}
