//! Incremental WHERE clause assembly.
//!
//! [`WhereClause`] is a low-level, write-only accumulator: callers append
//! operators, group markers, and predicates in the order they should
//! appear, and the assembler emits parameters into the statement's
//! [`ParameterMap`](crate::param::ParameterMap) as it goes. It does not
//! validate clause well-formedness; producing syntactically valid SQL is
//! the caller's job.
//!
//! ```rust
//! use terrane_query::param::ParameterMap;
//! use terrane_query::types::SqlParamType;
//! use terrane_query::value::SqlValue;
//! use terrane_query::where_clause::{CompareOp, LogicalOp, WhereClause};
//!
//! let mut params = ParameterMap::new();
//! let mut clause = WhereClause::new();
//! clause
//!     .comparison(
//!         &mut params,
//!         Some("idx"),
//!         "Source",
//!         CompareOp::Eq,
//!         SqlValue::from("USGS"),
//!         SqlParamType::NVarChar,
//!     )
//!     .unwrap();
//! clause.push_operator(LogicalOp::And);
//! clause
//!     .comparison(
//!         &mut params,
//!         Some("idx"),
//!         "DeletedOn",
//!         CompareOp::IsNull,
//!         SqlValue::Null,
//!         SqlParamType::DateTime2,
//!     )
//!     .unwrap();
//!
//! assert_eq!(clause.render(), "idx.Source = @p1 AND idx.DeletedOn IS NULL");
//! assert_eq!(params.len(), 1);
//! ```

use smallvec::SmallVec;
use smol_str::SmolStr;
use std::fmt::Write;

use crate::error::{StatementError, StatementResult};
use crate::fragment::{self, SqlFragment};
use crate::geometry::{BoundingBox, Polygon};
use crate::param::ParameterMap;
use crate::types::SqlParamType;
use crate::value::SqlValue;

/// Boolean connective between predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    /// `AND`
    And,
    /// `OR`
    Or,
}

impl LogicalOp {
    /// The SQL keyword.
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
        }
    }
}

/// Relational operator for [`WhereClause::comparison`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    /// `=`
    Eq,
    /// `<>`
    Ne,
    /// `<`
    Lt,
    /// `<=`
    Lte,
    /// `>`
    Gt,
    /// `>=`
    Gte,
    /// `LIKE`
    Like,
    /// `IN`. The right side is a comma-separated string; each part
    /// becomes one parameter.
    In,
    /// `IS NULL`, binds no parameter.
    IsNull,
    /// `IS NOT NULL`, binds no parameter.
    IsNotNull,
}

impl CompareOp {
    /// The SQL spelling of this operator.
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "<>",
            Self::Lt => "<",
            Self::Lte => "<=",
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::Like => "LIKE",
            Self::In => "IN",
            Self::IsNull => "IS NULL",
            Self::IsNotNull => "IS NOT NULL",
        }
    }
}

/// Write-only predicate accumulator for one statement.
#[derive(Debug, Clone, Default)]
pub struct WhereClause {
    fragments: SmallVec<[SqlFragment; 8]>,
    index_hint: Option<SmolStr>,
}

impl WhereClause {
    /// Create an empty clause.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `AND ` / `OR ` around the predicates already written.
    /// Spacing is handled here; predicates do not pad themselves.
    pub fn push_operator(&mut self, op: LogicalOp) {
        self.fragments.push(SqlFragment::owned(format!(" {} ", op.as_sql())));
    }

    /// Open a group: literal `(`.
    pub fn start_group(&mut self) {
        self.fragments.push(SqlFragment::literal("("));
    }

    /// Close a group: literal `)`.
    pub fn end_group(&mut self) {
        self.fragments.push(SqlFragment::literal(")"));
    }

    /// Append a relational predicate on `column`, qualified by `table`
    /// when present.
    ///
    /// `IsNull`/`IsNotNull` ignore the value and bind nothing. `In` splits
    /// a comma-separated string right side into one parameter per part, in
    /// left-to-right order. Every other operator binds exactly one
    /// parameter and renders as `column <op> @pN` with single spaces.
    pub fn comparison(
        &mut self,
        params: &mut ParameterMap,
        table: Option<&str>,
        column: &str,
        op: CompareOp,
        value: SqlValue,
        ty: SqlParamType,
    ) -> StatementResult<()> {
        match op {
            CompareOp::IsNull => {
                self.fragments.push(SqlFragment::column(table, column));
                self.fragments.push(SqlFragment::literal(" IS NULL"));
            }
            CompareOp::IsNotNull => {
                self.fragments.push(SqlFragment::column(table, column));
                self.fragments.push(SqlFragment::literal(" IS NOT NULL"));
            }
            CompareOp::In => {
                let SqlValue::String(list) = value else {
                    return Err(StatementError::unsupported_comparison(
                        "IN",
                        format!("right side must be a comma-separated string, got {}", value.kind_name()),
                    ));
                };
                self.fragments.push(SqlFragment::column(table, column));
                self.fragments.push(SqlFragment::literal(" IN ("));
                for (i, part) in list.split(',').enumerate() {
                    if i > 0 {
                        self.fragments.push(SqlFragment::literal(","));
                    }
                    let name = params.bind_next(SqlValue::String(part.to_string()), ty)?;
                    self.fragments.push(SqlFragment::Param(name));
                }
                self.fragments.push(SqlFragment::literal(")"));
            }
            _ => {
                let name = params.bind_next(value, ty)?;
                self.fragments.push(SqlFragment::column(table, column));
                self.fragments.push(SqlFragment::owned(format!(" {} ", op.as_sql())));
                self.fragments.push(SqlFragment::Param(name));
            }
        }
        Ok(())
    }

    /// Append a spatial intersection predicate:
    /// `column.STIntersects(geometry::STGeomFromText('wkt', srid)) = 1`.
    ///
    /// The polygon is inlined; see [`crate::geometry`] for the trust
    /// boundary. An optional index hint attaches to the statement; it may
    /// be set once, and a later call with a different hint fails.
    pub fn spatial_intersects(
        &mut self,
        table: Option<&str>,
        column: &str,
        polygon: &Polygon,
        index_hint: Option<&str>,
    ) -> StatementResult<()> {
        if let Some(requested) = index_hint {
            match &self.index_hint {
                Some(existing) if existing != requested => {
                    return Err(StatementError::ConflictingIndexHint {
                        existing: existing.to_string(),
                        requested: requested.to_string(),
                    });
                }
                _ => self.index_hint = Some(SmolStr::new(requested)),
            }
        }
        self.fragments.push(SqlFragment::column(table, column));
        self.fragments
            .push(SqlFragment::owned(format!(".STIntersects({}) = 1", polygon.to_sql())));
        Ok(())
    }

    /// Append an axis-aligned overlap test over stored extent columns:
    /// the 1-D interval overlap test applied to both axes. Box bounds are
    /// inlined as numeric literals; no parameters are bound.
    pub fn bounding_box(
        &mut self,
        table: Option<&str>,
        min_x_col: &str,
        max_x_col: &str,
        min_y_col: &str,
        max_y_col: &str,
        bbox: &BoundingBox,
    ) {
        self.fragments.push(SqlFragment::literal("("));
        self.fragments.push(SqlFragment::column(table, min_x_col));
        self.fragments.push(SqlFragment::owned(format!(" < {} AND ", bbox.max_x)));
        self.fragments.push(SqlFragment::column(table, max_x_col));
        self.fragments.push(SqlFragment::owned(format!(" > {} AND ", bbox.min_x)));
        self.fragments.push(SqlFragment::column(table, min_y_col));
        self.fragments.push(SqlFragment::owned(format!(" < {} AND ", bbox.max_y)));
        self.fragments.push(SqlFragment::column(table, max_y_col));
        self.fragments.push(SqlFragment::owned(format!(" > {}", bbox.min_y)));
        self.fragments.push(SqlFragment::literal(")"));
    }

    /// The statement-level index hint, if one was set.
    pub fn index_hint(&self) -> Option<&str> {
        self.index_hint.as_deref()
    }

    /// Whether no predicates have been written.
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Flatten the accumulated fragments into SQL text.
    pub fn render(&self) -> String {
        fragment::render(&self.fragments)
    }

    /// Write the rendered clause into a buffer, prefixed with ` WHERE `,
    /// when any predicates were written.
    pub fn write_where(&self, buffer: &mut String) {
        if !self.is_empty() {
            let _ = write!(buffer, " WHERE {}", self.render());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn params() -> ParameterMap {
        ParameterMap::new()
    }

    #[test]
    fn test_relational_operator_spacing() {
        let mut p = params();
        let mut clause = WhereClause::new();
        clause
            .comparison(&mut p, None, "Name", CompareOp::Like, "a%".into(), SqlParamType::NVarChar)
            .unwrap();
        assert_eq!(clause.render(), "Name LIKE @p1");
    }

    #[test]
    fn test_is_null_binds_nothing() {
        let mut p = params();
        let mut clause = WhereClause::new();
        clause
            .comparison(
                &mut p,
                Some("idx"),
                "DeletedOn",
                CompareOp::IsNotNull,
                SqlValue::Null,
                SqlParamType::DateTime2,
            )
            .unwrap();
        assert_eq!(clause.render(), "idx.DeletedOn IS NOT NULL");
        assert!(p.is_empty());
    }

    #[test]
    fn test_in_list_expansion() {
        let mut p = params();
        let mut clause = WhereClause::new();
        clause
            .comparison(
                &mut p,
                None,
                "Source",
                CompareOp::In,
                "A,B,C".into(),
                SqlParamType::NVarChar,
            )
            .unwrap();
        assert_eq!(clause.render(), "Source IN (@p1,@p2,@p3)");
        assert_eq!(p.len(), 3);
        let values: Vec<_> = p.iter().map(|(_, param)| param.value.clone()).collect();
        assert_eq!(
            values,
            vec![
                SqlValue::String("A".into()),
                SqlValue::String("B".into()),
                SqlValue::String("C".into()),
            ]
        );
    }

    #[test]
    fn test_in_rejects_non_string_right_side() {
        let mut p = params();
        let mut clause = WhereClause::new();
        let err = clause
            .comparison(&mut p, None, "Id", CompareOp::In, SqlValue::Int(3), SqlParamType::BigInt)
            .unwrap_err();
        assert!(matches!(err, StatementError::UnsupportedComparison { op: "IN", .. }));
        assert!(!err.is_misuse());
    }

    #[test]
    fn test_operators_and_groups_are_not_validated() {
        let mut p = params();
        let mut clause = WhereClause::new();
        clause.start_group();
        clause
            .comparison(&mut p, None, "A", CompareOp::Eq, SqlValue::Int(1), SqlParamType::BigInt)
            .unwrap();
        clause.push_operator(LogicalOp::Or);
        clause
            .comparison(&mut p, None, "B", CompareOp::Gt, SqlValue::Int(2), SqlParamType::BigInt)
            .unwrap();
        // Deliberately unbalanced: the accumulator is permissive.
        assert_eq!(clause.render(), "(A = @p1 OR B > @p2");
    }

    #[test]
    fn test_bounding_box_overlap() {
        let mut clause = WhereClause::new();
        clause.bounding_box(
            None,
            "minX",
            "maxX",
            "minY",
            "maxY",
            &BoundingBox::new(0.0, 5.0, 3.0, 9.0),
        );
        assert_eq!(
            clause.render(),
            "(minX < 5 AND maxX > 0 AND minY < 9 AND maxY > 3)"
        );
    }

    #[test]
    fn test_bounding_box_with_table_qualifier() {
        let mut clause = WhereClause::new();
        clause.bounding_box(
            Some("t"),
            "minX",
            "maxX",
            "minY",
            "maxY",
            &BoundingBox::new(0.0, 5.0, 3.0, 9.0),
        );
        assert_eq!(
            clause.render(),
            "(t.minX < 5 AND t.maxX > 0 AND t.minY < 9 AND t.maxY > 3)"
        );
    }

    #[test]
    fn test_spatial_intersects_inlines_geometry() {
        let mut clause = WhereClause::new();
        let polygon = Polygon::new(4326).with_ring(vec![(0.0, 0.0), (1.0, 0.0), (0.0, 0.0)]);
        clause
            .spatial_intersects(Some("idx"), "Footprint", &polygon, Some("IX_Spatial"))
            .unwrap();
        assert_eq!(
            clause.render(),
            "idx.Footprint.STIntersects(geometry::STGeomFromText('POLYGON ((0 0, 1 0, 0 0))', 4326)) = 1"
        );
        assert_eq!(clause.index_hint(), Some("IX_Spatial"));
    }

    #[test]
    fn test_conflicting_index_hint_is_rejected() {
        let mut clause = WhereClause::new();
        let polygon = Polygon::new(4326).with_ring(vec![(0.0, 0.0)]);
        clause
            .spatial_intersects(None, "Footprint", &polygon, Some("IX_Spatial"))
            .unwrap();
        // Same hint again is fine.
        clause
            .spatial_intersects(None, "Footprint", &polygon, Some("IX_Spatial"))
            .unwrap();
        let err = clause
            .spatial_intersects(None, "Footprint", &polygon, Some("IX_Other"))
            .unwrap_err();
        assert!(matches!(err, StatementError::ConflictingIndexHint { .. }));
        assert!(err.is_misuse());
    }

    #[test]
    fn test_write_where_prefixes_only_when_nonempty() {
        let clause = WhereClause::new();
        let mut sql = String::from("SELECT 1");
        clause.write_where(&mut sql);
        assert_eq!(sql, "SELECT 1");

        let mut p = params();
        let mut clause = WhereClause::new();
        clause
            .comparison(&mut p, None, "Id", CompareOp::Eq, SqlValue::Int(1), SqlParamType::BigInt)
            .unwrap();
        let mut sql = String::from("SELECT 1 FROM T t");
        clause.write_where(&mut sql);
        assert_eq!(sql, "SELECT 1 FROM T t WHERE Id = @p1");
    }
}
