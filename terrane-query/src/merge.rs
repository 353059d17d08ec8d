//! MERGE (upsert) statement construction.
//!
//! Builds a single statement that updates matching rows and inserts the
//! rest:
//!
//! ```text
//! MERGE <table> AS t USING (VALUES (...), (...)) AS s (<cols>)
//! ON <on> WHEN MATCHED [AND (<matched>)] THEN UPDATE SET c = s.c, ...
//! WHEN NOT MATCHED [AND (<not_matched>)] THEN INSERT (<cols>)
//! VALUES (s.c, ...);
//! ```
//!
//! Column lifecycle and row handling follow
//! [`InsertStatementBuilder`](crate::insert::InsertStatementBuilder),
//! including the inlined-geometry exception; there is no
//! delete-before-insert option, because MERGE already resolves conflicts.
//! The ON clause is mandatory.

use smallvec::SmallVec;
use smol_str::SmolStr;
use std::fmt::Write;
use tracing::debug;

use crate::error::{StatementError, StatementResult};
use crate::insert::{render_row_values, write_column_list};
use crate::param::{ParameterMap, Statement};
use crate::types::{Column, SqlParamType};
use crate::value::Row;

/// Builder for MERGE upsert statements. The target table is aliased `t`,
/// the source rows `s`.
#[derive(Debug, Clone, Default)]
pub struct MergeStatementBuilder {
    table: Option<SmolStr>,
    columns: SmallVec<[Column; 8]>,
    columns_closed: bool,
    params: ParameterMap,
    rows: Vec<String>,
    on: Option<String>,
    matched: Option<String>,
    not_matched: Option<String>,
}

impl MergeStatementBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the target table name.
    pub fn set_table(&mut self, name: &str) {
        self.table = Some(SmolStr::new(name));
    }

    /// Set the mandatory ON clause, e.g. `"t.Id = s.Id"`.
    pub fn set_on(&mut self, on: impl Into<String>) {
        self.on = Some(on.into());
    }

    /// Refine the WHEN MATCHED branch with an extra condition.
    pub fn set_when_matched(&mut self, condition: impl Into<String>) {
        self.matched = Some(condition.into());
    }

    /// Refine the WHEN NOT MATCHED branch with an extra condition.
    pub fn set_when_not_matched(&mut self, condition: impl Into<String>) {
        self.not_matched = Some(condition.into());
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

    /// Close the column list.
    pub fn end_columns(&mut self) -> StatementResult<()> {
        if self.columns_closed {
            return Err(StatementError::ColumnsClosed);
        }
        self.columns_closed = true;
        Ok(())
    }

    /// Add one source row. Requires the column list to be closed.
    pub fn add_row(&mut self, row: &Row) -> StatementResult<()> {
        if !self.columns_closed {
            return Err(StatementError::ColumnsOpen);
        }
        self.rows
            .push(render_row_values(&self.columns, row, &mut self.params)?);
        Ok(())
    }

    /// Finalize the statement. Fails before the column list is closed,
    /// without a table name, without an ON clause, or with zero rows.
    pub fn build(self) -> StatementResult<Statement> {
        if !self.columns_closed {
            return Err(StatementError::ColumnsOpen);
        }
        let table = self.table.as_deref().ok_or(StatementError::MissingTable)?;
        if self.columns.is_empty() {
            return Err(StatementError::NoColumns);
        }
        let on = self.on.as_deref().ok_or(StatementError::MissingOnClause)?;
        if self.rows.is_empty() {
            return Err(StatementError::NoRows);
        }

        let mut columns = String::new();
        write_column_list(&self.columns, &mut columns);

        let mut sql = format!(
            "MERGE {} AS t USING (VALUES {}) AS s {} ON {}",
            table,
            self.rows.join(", "),
            columns,
            on
        );

        sql.push_str(" WHEN MATCHED");
        if let Some(matched) = &self.matched {
            let _ = write!(sql, " AND ({})", matched);
        }
        sql.push_str(" THEN UPDATE SET ");
        for (i, column) in self.columns.iter().enumerate() {
            if i > 0 {
                sql.push_str(", ");
            }
            let _ = write!(sql, "{} = s.{}", column.name(), column.name());
        }

        sql.push_str(" WHEN NOT MATCHED");
        if let Some(not_matched) = &self.not_matched {
            let _ = write!(sql, " AND ({})", not_matched);
        }
        let _ = write!(sql, " THEN INSERT {} VALUES (", columns);
        for (i, column) in self.columns.iter().enumerate() {
            if i > 0 {
                sql.push_str(", ");
            }
            let _ = write!(sql, "s.{}", column.name());
        }
        sql.push_str(");");

        debug!(
            table = %table,
            rows = self.rows.len(),
            parameters = self.params.len(),
            "built merge statement"
        );
        Ok(Statement {
            sql,
            params: self.params,
        })
    }
}
