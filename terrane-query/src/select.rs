//! SELECT statement construction, standard and paged.
//!
//! One builder covers both shapes; the finalize strategy is the closed
//! [`SelectMode`]: `Standard` emits the query directly, `Paged` wraps it
//! in a `ROW_NUMBER()` windowing subquery to slice an inclusive row range
//! (the engine's target dialect has no native LIMIT/OFFSET).
//!
//! Alongside the SQL text, the builder maintains a [`ReadMap`]: for every
//! selected property it records the zero-based position(s) its value
//! occupies in the result row. Spatial properties expand to two selected
//! expressions (WKT text and SRID) and therefore two positions. The map is
//! built in lock-step with the SELECT list and is the contract between
//! statement construction and the caller's row-reading code.
//!
//! ```rust
//! use terrane_query::select::SelectStatementBuilder;
//! use terrane_query::table::TableDescriptor;
//! use terrane_query::types::SortOrder;
//!
//! let mut builder =
//!     SelectStatementBuilder::new(TableDescriptor::new("SpatialIndex", "idx")).unwrap();
//! builder.select_property(Some("idx"), "Id");
//! builder.add_order_by(Some("idx"), "Id", SortOrder::Asc);
//! let statement = builder.build().unwrap();
//! assert_eq!(
//!     statement.sql,
//!     "SELECT idx.Id FROM SpatialIndex idx ORDER BY idx.Id ASC"
//! );
//! ```

use smallvec::SmallVec;
use smol_str::SmolStr;
use std::fmt::Write;
use tracing::debug;

use crate::error::{StatementError, StatementResult};
use crate::geometry::{BoundingBox, Polygon};
use crate::param::ParameterMap;
use crate::table::TableDescriptor;
use crate::types::{ColumnKind, OrderByTerm, SortOrder, SqlParamType};
use crate::value::SqlValue;
use crate::where_clause::{CompareOp, LogicalOp, WhereClause};

/// Finalize strategy for a SELECT statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectMode {
    /// Emit the query as-is.
    Standard,
    /// Wrap the query in a `ROW_NUMBER()` window and keep only rows whose
    /// number falls in the inclusive range `[lower, upper]`.
    Paged {
        /// First row number kept (1-based, inclusive).
        lower: u64,
        /// Last row number kept (inclusive).
        upper: u64,
    },
}

/// Where a selected property's value(s) land in the result row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadPosition {
    /// Ordinary property: one position.
    Property(usize),
    /// Spatial property: WKT text and SRID positions.
    Spatial {
        /// Position of the WKT text expression.
        wkt: usize,
        /// Position of the SRID expression.
        srid: usize,
    },
    /// Stream column: one position.
    Stream(usize),
}

/// Positional index over the SELECT list, keyed by property name and
/// ordered by selection.
#[derive(Debug, Clone, Default)]
pub struct ReadMap {
    entries: Vec<(SmolStr, ReadPosition)>,
}

impl ReadMap {
    fn push(&mut self, property: &str, position: ReadPosition) {
        self.entries.push((SmolStr::new(property), position));
    }

    /// Look up a property's position(s) by name.
    pub fn position(&self, property: &str) -> Option<ReadPosition> {
        self.entries
            .iter()
            .find(|(name, _)| name == property)
            .map(|(_, position)| *position)
    }

    /// Iterate `(property, position)` in selection order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, ReadPosition)> {
        self.entries.iter().map(|(name, pos)| (name.as_str(), *pos))
    }

    /// Number of selected properties (spatial counts once).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been selected.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A finalized SELECT: SQL text, parameters, and the positional read map.
#[derive(Debug, Clone)]
pub struct SelectStatement {
    /// The SQL text.
    pub sql: String,
    /// Parameters referenced by the SQL text.
    pub params: ParameterMap,
    /// Positional index over the SELECT list.
    pub read_map: ReadMap,
}

#[derive(Debug, Clone)]
struct SelectColumn {
    table: Option<SmolStr>,
    name: SmolStr,
    kind: ColumnKind,
}

impl SelectColumn {
    fn qualified(&self) -> String {
        match &self.table {
            Some(table) => format!("{}.{}", table, self.name),
            None => self.name.to_string(),
        }
    }

    /// The select-list expressions this column contributes, in order.
    fn expressions(&self, out: &mut Vec<String>) {
        let base = self.qualified();
        match self.kind {
            ColumnKind::Property | ColumnKind::Stream => out.push(base),
            ColumnKind::Spatial => {
                out.push(format!("{}.STAsText()", base));
                out.push(format!("{}.STSrid", base));
            }
        }
    }
}

/// Builder for standard and paged SELECT statements.
#[derive(Debug, Clone)]
pub struct SelectStatementBuilder {
    from: TableDescriptor,
    joins: SmallVec<[TableDescriptor; 2]>,
    columns: SmallVec<[SelectColumn; 8]>,
    where_clause: WhereClause,
    order_by: SmallVec<[OrderByTerm; 2]>,
    params: ParameterMap,
    read_map: ReadMap,
    mode: SelectMode,
    next_position: usize,
}

impl SelectStatementBuilder {
    /// Create a standard SELECT over `from`.
    ///
    /// The FROM descriptor must not carry join fields.
    pub fn new(from: TableDescriptor) -> StatementResult<Self> {
        if from.is_joined() {
            return Err(StatementError::JoinOnFromTable(from.name().to_string()));
        }
        Ok(Self {
            from,
            joins: SmallVec::new(),
            columns: SmallVec::new(),
            where_clause: WhereClause::new(),
            order_by: SmallVec::new(),
            params: ParameterMap::new(),
            read_map: ReadMap::default(),
            mode: SelectMode::Standard,
            next_position: 0,
        })
    }

    /// Create a paged SELECT over `from`, keeping row numbers in the
    /// inclusive range `[lower, upper]`.
    pub fn paged(from: TableDescriptor, lower: u64, upper: u64) -> StatementResult<Self> {
        let mut builder = Self::new(from)?;
        builder.mode = SelectMode::Paged { lower, upper };
        Ok(builder)
    }

    /// Add a LEFT JOIN target, deduplicating structurally equal
    /// descriptors.
    ///
    /// Returns the join's index and `true` when it was newly added, or the
    /// index of the structurally equal existing join and `false`. The
    /// descriptor must carry join fields.
    pub fn add_left_join(&mut self, table: TableDescriptor) -> StatementResult<(usize, bool)> {
        if !table.is_joined() {
            return Err(StatementError::JoinNotConfigured(table.name().to_string()));
        }
        if let Some(existing) = self.joins.iter().position(|j| *j == table) {
            return Ok((existing, false));
        }
        self.joins.push(table);
        Ok((self.joins.len() - 1, true))
    }

    /// The join descriptors added so far, in statement order.
    pub fn joins(&self) -> &[TableDescriptor] {
        &self.joins
    }

    /// Select an ordinary property column.
    pub fn select_property(&mut self, table: Option<&str>, property: &str) {
        self.push_column(table, property, ColumnKind::Property);
    }

    /// Select a spatial column; expands to WKT text plus SRID.
    pub fn select_spatial(&mut self, table: Option<&str>, property: &str) {
        self.push_column(table, property, ColumnKind::Spatial);
    }

    /// Select an opaque stream column as-is.
    pub fn select_stream(&mut self, table: Option<&str>, property: &str) {
        self.push_column(table, property, ColumnKind::Stream);
    }

    fn push_column(&mut self, table: Option<&str>, property: &str, kind: ColumnKind) {
        let position = match kind {
            ColumnKind::Property => {
                let p = ReadPosition::Property(self.next_position);
                self.next_position += 1;
                p
            }
            ColumnKind::Spatial => {
                let p = ReadPosition::Spatial {
                    wkt: self.next_position,
                    srid: self.next_position + 1,
                };
                self.next_position += 2;
                p
            }
            ColumnKind::Stream => {
                let p = ReadPosition::Stream(self.next_position);
                self.next_position += 1;
                p
            }
        };
        self.columns.push(SelectColumn {
            table: table.filter(|t| !t.is_empty()).map(SmolStr::new),
            name: SmolStr::new(property),
            kind,
        });
        self.read_map.push(property, position);
    }

    /// Append `AND`/`OR` to the predicate accumulator.
    pub fn push_operator(&mut self, op: LogicalOp) {
        self.where_clause.push_operator(op);
    }

    /// Open a predicate group.
    pub fn start_group(&mut self) {
        self.where_clause.start_group();
    }

    /// Close a predicate group.
    pub fn end_group(&mut self) {
        self.where_clause.end_group();
    }

    /// Append a relational predicate. See
    /// [`WhereClause::comparison`](crate::where_clause::WhereClause::comparison).
    pub fn comparison(
        &mut self,
        table: Option<&str>,
        column: &str,
        op: CompareOp,
        value: SqlValue,
        ty: SqlParamType,
    ) -> StatementResult<()> {
        self.where_clause
            .comparison(&mut self.params, table, column, op, value, ty)
    }

    /// Append a spatial intersection predicate with an optional
    /// statement-level index hint.
    pub fn spatial_intersects(
        &mut self,
        table: Option<&str>,
        column: &str,
        polygon: &Polygon,
        index_hint: Option<&str>,
    ) -> StatementResult<()> {
        self.where_clause
            .spatial_intersects(table, column, polygon, index_hint)
    }

    /// Append an axis-aligned bounding-box overlap predicate.
    pub fn bounding_box(
        &mut self,
        table: Option<&str>,
        min_x_col: &str,
        max_x_col: &str,
        min_y_col: &str,
        max_y_col: &str,
        bbox: &BoundingBox,
    ) {
        self.where_clause
            .bounding_box(table, min_x_col, max_x_col, min_y_col, max_y_col, bbox);
    }

    /// Append an ORDER BY term; the order of calls is the order of terms.
    pub fn add_order_by(&mut self, table: Option<&str>, column: &str, order: SortOrder) {
        self.order_by.push(OrderByTerm::new(table, column, order));
    }

    /// Finalize the statement.
    pub fn build(self) -> StatementResult<SelectStatement> {
        let mut expressions = Vec::with_capacity(self.columns.len());
        for column in &self.columns {
            column.expressions(&mut expressions);
        }
        if expressions.is_empty() {
            return Err(StatementError::NoColumns);
        }

        let sql = match self.mode {
            SelectMode::Standard => self.build_standard(&expressions),
            SelectMode::Paged { lower, upper } => self.build_paged(&expressions, lower, upper)?,
        };

        debug!(
            mode = ?self.mode,
            columns = expressions.len(),
            parameters = self.params.len(),
            "built select statement"
        );
        Ok(SelectStatement {
            sql,
            params: self.params,
            read_map: self.read_map,
        })
    }

    /// Write `FROM name alias [WITH (INDEX(hint))] [LEFT JOIN ...]*`.
    fn write_from(&self, sql: &mut String) {
        let _ = write!(sql, " FROM {} {}", self.from.name(), self.from.alias());
        if let Some(hint) = self.where_clause.index_hint() {
            let _ = write!(sql, " WITH (INDEX({}))", hint);
        }
        for table in &self.joins {
            // add_left_join only admits descriptors with join fields.
            let Some(join) = table.join() else { continue };
            let _ = write!(
                sql,
                " LEFT JOIN {} {} ON {}.{} = {}.{}",
                table.name(),
                table.alias(),
                table.alias(),
                join.own_key(),
                join.first_alias(),
                join.first_key()
            );
        }
    }

    fn write_order_terms(&self, sql: &mut String) {
        for (i, term) in self.order_by.iter().enumerate() {
            if i > 0 {
                sql.push_str(", ");
            }
            term.write_sql(sql);
        }
    }

    fn build_standard(&self, expressions: &[String]) -> String {
        let mut sql = String::from("SELECT ");
        sql.push_str(&expressions.join(", "));
        self.write_from(&mut sql);
        self.where_clause.write_where(&mut sql);
        if !self.order_by.is_empty() {
            sql.push_str(" ORDER BY ");
            self.write_order_terms(&mut sql);
        }
        sql
    }

    /// The windowed-pagination rewrite. Every inner expression gets a
    /// synthetic alias (`col0`, `col1`, ...) to survive the subquery
    /// boundary; the outer SELECT re-projects the aliases in original
    /// order. The inner query carries no ORDER BY of its own; the order
    /// terms move into the `OVER` clause.
    fn build_paged(
        &self,
        expressions: &[String],
        lower: u64,
        upper: u64,
    ) -> StatementResult<String> {
        if self.order_by.is_empty() {
            return Err(StatementError::MissingOrderBy);
        }

        let mut outer = String::new();
        for i in 0..expressions.len() {
            if i > 0 {
                outer.push_str(", ");
            }
            let _ = write!(outer, "col{}", i);
        }

        let mut inner = String::from("SELECT ROW_NUMBER() OVER (ORDER BY ");
        self.write_order_terms(&mut inner);
        inner.push_str(") AS RowNum");
        for (i, expression) in expressions.iter().enumerate() {
            let _ = write!(inner, ", {} AS col{}", expression, i);
        }
        self.write_from(&mut inner);
        self.where_clause.write_where(&mut inner);

        Ok(format!(
            "SELECT {} FROM ({}) AS Results WHERE RowNum >= {} AND RowNum <= {} ORDER BY RowNum",
            outer, inner, lower, upper
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn from_table() -> TableDescriptor {
        TableDescriptor::new("SpatialIndex", "idx")
    }

    #[test]
    fn test_from_table_must_not_be_joined() {
        let first = from_table();
        let joined = TableDescriptor::new("Meta", "m").with_join(&first, "Id", "IndexId");
        let err = SelectStatementBuilder::new(joined).unwrap_err();
        assert!(matches!(err, StatementError::JoinOnFromTable(_)));
        assert!(err.is_misuse());
    }

    #[test]
    fn test_join_target_must_be_joined() {
        let mut builder = SelectStatementBuilder::new(from_table()).unwrap();
        let err = builder
            .add_left_join(TableDescriptor::new("Meta", "m"))
            .unwrap_err();
        assert!(matches!(err, StatementError::JoinNotConfigured(_)));
    }

    #[test]
    fn test_join_deduplication() {
        let first = from_table();
        let mut builder = SelectStatementBuilder::new(first.clone()).unwrap();
        let join_a = TableDescriptor::new("Meta", "m").with_join(&first, "Id", "IndexId");
        let join_b = TableDescriptor::new("Meta", "m").with_join(&first, "Id", "IndexId");

        assert_eq!(builder.add_left_join(join_a).unwrap(), (0, true));
        assert_eq!(builder.add_left_join(join_b).unwrap(), (0, false));
        assert_eq!(builder.joins().len(), 1);

        builder.select_property(Some("idx"), "Id");
        let statement = builder.build().unwrap();
        assert_eq!(statement.sql.matches("LEFT JOIN").count(), 1);
        assert!(
            statement
                .sql
                .contains("LEFT JOIN Meta m ON m.IndexId = idx.Id")
        );
    }

    #[test]
    fn test_standard_select_full_shape() {
        let first = from_table();
        let mut builder = SelectStatementBuilder::new(first.clone()).unwrap();
        builder.select_property(Some("idx"), "Id");
        builder.select_property(Some("idx"), "Name");
        builder
            .comparison(
                Some("idx"),
                "Source",
                CompareOp::Eq,
                "USGS".into(),
                SqlParamType::NVarChar,
            )
            .unwrap();
        builder.add_order_by(Some("idx"), "Name", SortOrder::Asc);

        let statement = builder.build().unwrap();
        assert_eq!(
            statement.sql,
            "SELECT idx.Id, idx.Name FROM SpatialIndex idx WHERE idx.Source = @p1 ORDER BY idx.Name ASC"
        );
        assert_eq!(statement.params.len(), 1);
    }

    #[test]
    fn test_spatial_column_expands_to_two_positions() {
        let mut builder = SelectStatementBuilder::new(from_table()).unwrap();
        builder.select_property(Some("idx"), "Id");
        builder.select_spatial(Some("idx"), "Footprint");
        builder.select_stream(Some("idx"), "Thumbnail");

        let statement = builder.build().unwrap();
        assert_eq!(
            statement.sql,
            "SELECT idx.Id, idx.Footprint.STAsText(), idx.Footprint.STSrid, idx.Thumbnail \
             FROM SpatialIndex idx"
        );
        assert_eq!(
            statement.read_map.position("Id"),
            Some(ReadPosition::Property(0))
        );
        assert_eq!(
            statement.read_map.position("Footprint"),
            Some(ReadPosition::Spatial { wkt: 1, srid: 2 })
        );
        assert_eq!(
            statement.read_map.position("Thumbnail"),
            Some(ReadPosition::Stream(3))
        );
    }

    #[test]
    fn test_no_columns_is_an_error() {
        let builder = SelectStatementBuilder::new(from_table()).unwrap();
        let err = builder.build().unwrap_err();
        assert_eq!(err, StatementError::NoColumns);
    }

    #[test]
    fn test_index_hint_lands_after_from() {
        let mut builder = SelectStatementBuilder::new(from_table()).unwrap();
        builder.select_property(Some("idx"), "Id");
        let polygon = Polygon::new(4326).with_ring(vec![(0.0, 0.0), (1.0, 1.0), (0.0, 0.0)]);
        builder
            .spatial_intersects(Some("idx"), "Footprint", &polygon, Some("IX_Spatial"))
            .unwrap();

        let statement = builder.build().unwrap();
        assert!(
            statement
                .sql
                .contains("FROM SpatialIndex idx WITH (INDEX(IX_Spatial)) WHERE")
        );
    }

    #[test]
    fn test_paged_requires_order_by() {
        let mut builder = SelectStatementBuilder::paged(from_table(), 1, 10).unwrap();
        builder.select_property(Some("idx"), "Id");
        let err = builder.build().unwrap_err();
        assert_eq!(err, StatementError::MissingOrderBy);
        assert!(!err.is_misuse());
    }

    #[test]
    fn test_paged_rewrite_shape() {
        let mut builder = SelectStatementBuilder::paged(from_table(), 11, 20).unwrap();
        builder.select_property(Some("idx"), "Id");
        builder.select_property(Some("idx"), "Name");
        builder.add_order_by(Some("idx"), "Name", SortOrder::Asc);
        builder.add_order_by(Some("idx"), "Id", SortOrder::Desc);

        let statement = builder.build().unwrap();
        assert_eq!(
            statement.sql,
            "SELECT col0, col1 FROM (SELECT ROW_NUMBER() OVER (ORDER BY idx.Name ASC, idx.Id DESC) \
             AS RowNum, idx.Id AS col0, idx.Name AS col1 FROM SpatialIndex idx) AS Results \
             WHERE RowNum >= 11 AND RowNum <= 20 ORDER BY RowNum"
        );
    }

    #[test]
    fn test_paged_alias_correspondence_with_spatial_expansion() {
        let mut builder = SelectStatementBuilder::paged(from_table(), 1, 5).unwrap();
        builder.select_spatial(Some("idx"), "Footprint");
        builder.select_property(Some("idx"), "Name");
        builder.add_order_by(Some("idx"), "Name", SortOrder::Asc);

        let statement = builder.build().unwrap();
        // Aliases must track the expanded expression list in order.
        assert!(
            statement
                .sql
                .contains("idx.Footprint.STAsText() AS col0")
        );
        assert!(statement.sql.contains("idx.Footprint.STSrid AS col1"));
        assert!(statement.sql.contains("idx.Name AS col2"));
        assert!(statement.sql.starts_with("SELECT col0, col1, col2 FROM ("));
        assert_eq!(
            statement.read_map.position("Footprint"),
            Some(ReadPosition::Spatial { wkt: 0, srid: 1 })
        );
    }

    #[test]
    fn test_paged_inner_query_has_no_own_order_by() {
        let mut builder = SelectStatementBuilder::paged(from_table(), 1, 5).unwrap();
        builder.select_property(Some("idx"), "Id");
        builder.add_order_by(Some("idx"), "Id", SortOrder::Asc);

        let statement = builder.build().unwrap();
        // Exactly two ORDER BY spellings: the OVER clause and the outer RowNum.
        assert_eq!(statement.sql.matches("ORDER BY").count(), 2);
        assert!(statement.sql.ends_with("ORDER BY RowNum"));
        assert!(statement.sql.contains("OVER (ORDER BY idx.Id ASC)"));
    }

    #[test]
    fn test_where_parameters_flow_into_paged_inner_query() {
        let mut builder = SelectStatementBuilder::paged(from_table(), 1, 5).unwrap();
        builder.select_property(Some("idx"), "Id");
        builder.add_order_by(Some("idx"), "Id", SortOrder::Asc);
        builder
            .comparison(
                Some("idx"),
                "Source",
                CompareOp::In,
                "A,B".into(),
                SqlParamType::NVarChar,
            )
            .unwrap();

        let statement = builder.build().unwrap();
        assert!(statement.sql.contains("WHERE idx.Source IN (@p1,@p2)"));
        assert_eq!(statement.params.len(), 2);
    }
}
