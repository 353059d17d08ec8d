//! Multi-row INSERT statement construction.
//!
//! The builder runs through a strict lifecycle: declare columns, close the
//! column list, add rows, finalize. Driving it out of order is a misuse
//! error. Each row's values become uniquely named bound parameters,
//! except spatial values, which are inlined as
//! `geometry::STGeomFromText(...)` expressions (the geometry column type
//! is not representable as a simple bound parameter; see
//! [`crate::geometry`] for why that is safe).
//!
//! With [`activate_delete_before_insert`], every row is preceded by a
//! DELETE built from a per-row [`WhereTemplate`], and the row's INSERT is
//! wrapped in a TRY/CATCH that swallows only SQL Server's duplicate-key
//! error and rethrows anything else: "delete the conflicting row, then
//! insert" without masking unrelated failures.
//!
//! [`activate_delete_before_insert`]: InsertStatementBuilder::activate_delete_before_insert
//!
//! ```rust
//! use terrane_query::insert::InsertStatementBuilder;
//! use terrane_query::types::SqlParamType;
//! use terrane_query::value::Row;
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
//! assert_eq!(
//!     statement.sql,
//!     "INSERT INTO SpatialIndex (Id, Name) VALUES (@p1, @p2)"
//! );
//! ```

use indexmap::IndexMap;
use smallvec::SmallVec;
use smol_str::SmolStr;
use std::fmt::Write;
use tracing::debug;

use crate::error::{StatementError, StatementResult};
use crate::param::{Parameter, ParameterMap, Statement};
use crate::types::{Column, ColumnKind, SqlParamType};
use crate::value::{Row, SqlValue};

/// SQL Server error number for a unique-constraint violation. The
/// delete-before-insert TRY/CATCH swallows exactly this error.
pub const DUPLICATE_KEY_ERROR: i32 = 2627;

/// A WHERE text template with named `{placeholder}`s and per-placeholder
/// typed values. At row-add time every placeholder is rewritten to a
/// fresh statement-unique parameter name, so one template can serve many
/// rows without parameter collisions.
#[derive(Debug, Clone, Default)]
pub struct WhereTemplate {
    text: String,
    bindings: IndexMap<String, Parameter>,
}

impl WhereTemplate {
    /// Create a template from WHERE text such as
    /// `"Id = {id} AND Source = {source}"`.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bindings: IndexMap::new(),
        }
    }

    /// Bind a placeholder's value and type. Re-binding a name replaces
    /// the previous value.
    pub fn bind(
        &mut self,
        name: impl Into<String>,
        value: SqlValue,
        ty: SqlParamType,
    ) -> StatementResult<()> {
        if matches!(value, SqlValue::Geometry(_)) {
            return Err(StatementError::GeometryParameter);
        }
        self.bindings.insert(name.into(), Parameter { value, ty });
        Ok(())
    }

    /// Rewrite every `{placeholder}` to a fresh parameter name, binding
    /// the template's values into `params`. A placeholder with no bound
    /// value is a misuse error. A `{` without a closing `}` is kept as
    /// literal text.
    fn instantiate(&self, params: &mut ParameterMap) -> StatementResult<String> {
        let mut out = String::with_capacity(self.text.len() + 8);
        let mut rest = self.text.as_str();
        while let Some(start) = rest.find('{') {
            out.push_str(&rest[..start]);
            let after = &rest[start + 1..];
            let Some(end) = after.find('}') else {
                out.push('{');
                rest = after;
                continue;
            };
            let placeholder = &after[..end];
            let bound = self
                .bindings
                .get(placeholder)
                .ok_or_else(|| StatementError::UnboundPlaceholder(placeholder.to_string()))?;
            let name = params.bind_next(bound.value.clone(), bound.ty)?;
            out.push_str(&name);
            rest = &after[end + 1..];
        }
        out.push_str(rest);
        Ok(out)
    }
}

/// Render one row tuple `(v1, v2, ...)` against the declared columns.
///
/// Shared by INSERT and MERGE: missing declared columns bind NULL of the
/// declared type, undeclared row keys are ignored, and spatial columns
/// inline their geometry instead of binding.
pub(crate) fn render_row_values(
    columns: &[Column],
    row: &Row,
    params: &mut ParameterMap,
) -> StatementResult<String> {
    let mut parts: Vec<String> = Vec::with_capacity(columns.len());
    for column in columns {
        let value = row.get(column.name());
        if column.kind() == ColumnKind::Spatial {
            match value {
                Some(SqlValue::Geometry(polygon)) => parts.push(polygon.to_sql()),
                Some(SqlValue::Null) | None => parts.push("NULL".to_string()),
                Some(other) => {
                    return Err(StatementError::unsupported_value(
                        column.name(),
                        format!("spatial column requires geometry, got {}", other.kind_name()),
                    ));
                }
            }
            continue;
        }
        match value {
            Some(SqlValue::Geometry(_)) => {
                return Err(StatementError::unsupported_value(
                    column.name(),
                    "geometry value for a non-spatial column",
                ));
            }
            Some(value) => {
                let name = params.bind_next(value.clone(), column.param_type())?;
                parts.push(name.to_string());
            }
            None => {
                let name = params.bind_next(SqlValue::Null, column.param_type())?;
                parts.push(name.to_string());
            }
        }
    }
    Ok(format!("({})", parts.join(", ")))
}

/// Write the declared column names as `(c1, c2, ...)`.
pub(crate) fn write_column_list(columns: &[Column], sql: &mut String) {
    sql.push('(');
    for (i, column) in columns.iter().enumerate() {
        if i > 0 {
            sql.push_str(", ");
        }
        sql.push_str(column.name());
    }
    sql.push(')');
}

/// Builder for multi-row INSERT statements.
#[derive(Debug, Clone, Default)]
pub struct InsertStatementBuilder {
    table: Option<SmolStr>,
    columns: SmallVec<[Column; 8]>,
    columns_closed: bool,
    delete_before_insert: bool,
    params: ParameterMap,
    rows: Vec<String>,
    deletes: Vec<String>,
}

impl InsertStatementBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the target table name.
    pub fn set_table(&mut self, name: &str) {
        self.table = Some(SmolStr::new(name));
    }

    fn push_column(&mut self, column: Column) -> StatementResult<()> {
        if self.columns_closed {
            return Err(StatementError::ColumnsClosed);
        }
        self.columns.push(column);
        Ok(())
    }

    /// Declare an ordinary column; only valid before
    /// [`end_columns`](Self::end_columns).
    pub fn add_column(&mut self, name: &str, ty: SqlParamType) -> StatementResult<()> {
        self.push_column(Column::new(name, ty))
    }

    /// Declare a spatial column; row values for it are inlined.
    pub fn add_spatial_column(&mut self, name: &str) -> StatementResult<()> {
        self.push_column(Column::spatial(name))
    }

    /// Declare a binary stream column.
    pub fn add_binary_column(&mut self, name: &str) -> StatementResult<()> {
        self.push_column(Column::binary(name))
    }

    /// Precede every row with a DELETE built from its [`WhereTemplate`]
    /// and wrap the row's INSERT in duplicate-key suppression. Must be
    /// called before the column list is closed.
    pub fn activate_delete_before_insert(&mut self) -> StatementResult<()> {
        if self.columns_closed {
            return Err(StatementError::DeleteBeforeInsertClosed);
        }
        self.delete_before_insert = true;
        Ok(())
    }

    /// Close the column list; after this, rows may be added and no more
    /// columns may be declared.
    pub fn end_columns(&mut self) -> StatementResult<()> {
        if self.columns_closed {
            return Err(StatementError::ColumnsClosed);
        }
        self.columns_closed = true;
        Ok(())
    }

    /// Add one row. Requires the column list to be closed. When
    /// delete-before-insert is active, `template` supplies the per-row
    /// DELETE condition and is mandatory.
    pub fn add_row(&mut self, row: &Row, template: Option<&WhereTemplate>) -> StatementResult<()> {
        if !self.columns_closed {
            return Err(StatementError::ColumnsOpen);
        }
        if self.delete_before_insert {
            let template = template.ok_or(StatementError::MissingTemplate)?;
            self.deletes.push(template.instantiate(&mut self.params)?);
        }
        self.rows
            .push(render_row_values(&self.columns, row, &mut self.params)?);
        Ok(())
    }

    /// Finalize the statement. Fails before the column list is closed,
    /// without a table name, or with zero rows.
    pub fn build(self) -> StatementResult<Statement> {
        if !self.columns_closed {
            return Err(StatementError::ColumnsOpen);
        }
        let table = self.table.as_deref().ok_or(StatementError::MissingTable)?;
        if self.columns.is_empty() {
            return Err(StatementError::NoColumns);
        }
        if self.rows.is_empty() {
            return Err(StatementError::NoRows);
        }

        let mut columns = String::new();
        write_column_list(&self.columns, &mut columns);

        let sql = if self.delete_before_insert {
            let mut sql = String::new();
            for (delete, row) in self.deletes.iter().zip(&self.rows) {
                let _ = writeln!(sql, "DELETE FROM {} WHERE {};", table, delete);
                sql.push_str("BEGIN TRY\n");
                let _ = writeln!(sql, "INSERT INTO {} {} VALUES {};", table, columns, row);
                sql.push_str("END TRY\nBEGIN CATCH\n");
                let _ = writeln!(sql, "IF ERROR_NUMBER() <> {} THROW;", DUPLICATE_KEY_ERROR);
                sql.push_str("END CATCH;\n");
            }
            sql.pop();
            sql
        } else {
            format!(
                "INSERT INTO {} {} VALUES {}",
                table,
                columns,
                self.rows.join(", ")
            )
        };

        debug!(
            table = %table,
            rows = self.rows.len(),
            parameters = self.params.len(),
            delete_before_insert = self.delete_before_insert,
            "built insert statement"
        );
        Ok(Statement {
            sql,
            params: self.params,
        })
    }
}
