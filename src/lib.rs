//! # Terrane
//!
//! Parameterized T-SQL statement construction for spatial index stores.
//!
//! Terrane assembles SELECT, paged SELECT, INSERT, DELETE, and MERGE
//! (upsert) statements from a table/column/predicate model. User-supplied
//! values never reach the SQL text: every builder returns the statement
//! together with an ordered parameter map for the caller's driver to bind
//! and execute.
//!
//! ## Quick Start
//!
//! ```rust
//! use terrane::prelude::*;
//!
//! let index = TableDescriptor::new("SpatialIndex", "idx");
//! let mut builder = SelectStatementBuilder::new(index)?;
//! builder.select_property(Some("idx"), "Id");
//! builder
//!     .comparison(
//!         Some("idx"),
//!         "Source",
//!         CompareOp::Eq,
//!         "USGS".into(),
//!         SqlParamType::NVarChar,
//!     )?;
//! builder.add_order_by(Some("idx"), "Id", SortOrder::Asc);
//!
//! let statement = builder.build()?;
//! assert_eq!(
//!     statement.sql,
//!     "SELECT idx.Id FROM SpatialIndex idx WHERE idx.Source = @p1 ORDER BY idx.Id ASC"
//! );
//! # Ok::<(), terrane::query::StatementError>(())
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

/// Statement builders and supporting types.
pub mod query {
    pub use terrane_query::*;
}

/// Prelude module for convenient imports.
pub mod prelude {
    pub use terrane_query::prelude::*;
}

// Re-export key types at the crate root
pub use terrane_query::{ParameterMap, Statement, StatementError, StatementResult};
