//! # terrane-query
//!
//! Statement builders for the Terrane T-SQL construction engine.
//!
//! This crate assembles parameterized SELECT, paged SELECT, INSERT,
//! DELETE, and MERGE (upsert) statements from a table/column/predicate
//! model. Every builder keeps user-supplied values out of the SQL text:
//! values are bound into an ordered [`ParameterMap`] under generated
//! names (`@p1`, `@p2`, ...), and the finalize step returns the SQL text
//! together with that map. Executing the statement is the caller's job;
//! the engine is a pure in-memory accumulator with no I/O.
//!
//! The one deliberate exception to parameterization is geometry: spatial
//! values are inlined as `geometry::STGeomFromText(...)` literals built
//! from numeric coordinates only (see [`geometry`]).
//!
//! ## Selecting
//!
//! ```rust
//! use terrane_query::prelude::*;
//!
//! let index = TableDescriptor::new("SpatialIndex", "idx");
//! let mut builder = SelectStatementBuilder::new(index).unwrap();
//! builder.select_property(Some("idx"), "Id");
//! builder.select_property(Some("idx"), "Name");
//! builder
//!     .comparison(
//!         Some("idx"),
//!         "Source",
//!         CompareOp::Eq,
//!         "USGS".into(),
//!         SqlParamType::NVarChar,
//!     )
//!     .unwrap();
//! builder.add_order_by(Some("idx"), "Name", SortOrder::Asc);
//!
//! let statement = builder.build().unwrap();
//! assert_eq!(
//!     statement.sql,
//!     "SELECT idx.Id, idx.Name FROM SpatialIndex idx \
//!      WHERE idx.Source = @p1 ORDER BY idx.Name ASC"
//! );
//! ```
//!
//! ## Paging
//!
//! The target dialect has no native LIMIT/OFFSET; paged selection wraps
//! the query in a `ROW_NUMBER()` window and slices an inclusive row
//! range. At least one ORDER BY term is required, since windowed numbering is
//! undefined without a deterministic order.
//!
//! ```rust
//! use terrane_query::prelude::*;
//!
//! let index = TableDescriptor::new("SpatialIndex", "idx");
//! let mut builder = SelectStatementBuilder::paged(index, 1, 25).unwrap();
//! builder.select_property(Some("idx"), "Id");
//! builder.add_order_by(Some("idx"), "Id", SortOrder::Asc);
//!
//! let statement = builder.build().unwrap();
//! assert!(statement.sql.contains("ROW_NUMBER() OVER (ORDER BY idx.Id ASC)"));
//! assert!(statement.sql.contains("WHERE RowNum >= 1 AND RowNum <= 25"));
//! ```
//!
//! ## Inserting
//!
//! ```rust
//! use terrane_query::prelude::*;
//!
//! let mut builder = InsertStatementBuilder::new();
//! builder.set_table("SpatialIndex");
//! builder.add_column("Id", SqlParamType::BigInt).unwrap();
//! builder.add_column("Name", SqlParamType::NVarChar).unwrap();
//! builder.end_columns().unwrap();
//!
//! let mut row = Row::new();
//! row.insert("Id".into(), 1i64.into());
//! row.insert("Name".into(), "quad-12".into());
//! builder.add_row(&row, None).unwrap();
//!
//! let statement = builder.build().unwrap();
//! assert_eq!(statement.params.len(), 2);
//! ```

pub mod delete;
pub mod error;
pub mod fragment;
pub mod geometry;
pub mod insert;
pub mod logging;
pub mod merge;
pub mod param;
pub mod select;
pub mod table;
pub mod types;
pub mod value;
pub mod where_clause;

pub use delete::DeleteStatementBuilder;
pub use error::{StatementError, StatementResult};
pub use fragment::SqlFragment;
pub use geometry::{BoundingBox, DEFAULT_SRID, Polygon};
pub use insert::{DUPLICATE_KEY_ERROR, InsertStatementBuilder, WhereTemplate};
pub use merge::MergeStatementBuilder;
pub use param::{Parameter, ParameterMap, Statement};
pub use select::{ReadMap, ReadPosition, SelectMode, SelectStatement, SelectStatementBuilder};
pub use table::{Join, TableDescriptor};
pub use types::{Column, ColumnKind, OrderByTerm, PropertyType, SortOrder, SqlParamType};
pub use value::{Row, SqlValue};
pub use where_clause::{CompareOp, LogicalOp, WhereClause};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::delete::DeleteStatementBuilder;
    pub use crate::error::{StatementError, StatementResult};
    pub use crate::geometry::{BoundingBox, Polygon};
    pub use crate::insert::{InsertStatementBuilder, WhereTemplate};
    pub use crate::merge::MergeStatementBuilder;
    pub use crate::param::{ParameterMap, Statement};
    pub use crate::select::{ReadPosition, SelectStatement, SelectStatementBuilder};
    pub use crate::table::TableDescriptor;
    pub use crate::types::{PropertyType, SortOrder, SqlParamType};
    pub use crate::value::{Row, SqlValue};
    pub use crate::where_clause::{CompareOp, LogicalOp, WhereClause};
}
