//! Parameterized DELETE statement construction.
//!
//! The simplest builder: a table name plus one or more conditions, ANDed
//! together. Conditions share the comparison logic of
//! [`WhereClause`](crate::where_clause::WhereClause), including the
//! comma-split IN-list expansion.
//!
//! ```rust
//! use terrane_query::delete::DeleteStatementBuilder;
//! use terrane_query::types::SqlParamType;
//! use terrane_query::where_clause::CompareOp;
//!
//! let mut builder = DeleteStatementBuilder::new();
//! builder.set_table("SpatialIndex");
//! builder
//!     .add_condition("Source", CompareOp::Eq, "USGS".into(), SqlParamType::NVarChar)
//!     .unwrap();
//! let statement = builder.build().unwrap();
//! assert_eq!(statement.sql, "DELETE FROM SpatialIndex WHERE Source = @p1");
//! ```

use smol_str::SmolStr;
use tracing::debug;

use crate::error::{StatementError, StatementResult};
use crate::param::{ParameterMap, Statement};
use crate::types::SqlParamType;
use crate::value::SqlValue;
use crate::where_clause::{CompareOp, LogicalOp, WhereClause};

/// Builder for DELETE statements.
#[derive(Debug, Clone, Default)]
pub struct DeleteStatementBuilder {
    table: Option<SmolStr>,
    where_clause: WhereClause,
    params: ParameterMap,
    conditions: usize,
}

impl DeleteStatementBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the target table name.
    pub fn set_table(&mut self, name: &str) {
        self.table = Some(SmolStr::new(name));
    }

    /// Add a condition; conditions are ANDed in the order added.
    pub fn add_condition(
        &mut self,
        column: &str,
        op: CompareOp,
        value: SqlValue,
        ty: SqlParamType,
    ) -> StatementResult<()> {
        if self.conditions > 0 {
            self.where_clause.push_operator(LogicalOp::And);
        }
        self.where_clause
            .comparison(&mut self.params, None, column, op, value, ty)?;
        self.conditions += 1;
        Ok(())
    }

    /// Finalize the statement. Fails without a table name or with zero
    /// conditions.
    pub fn build(self) -> StatementResult<Statement> {
        let table = self.table.as_deref().ok_or(StatementError::MissingTable)?;
        if self.conditions == 0 {
            return Err(StatementError::NoConditions);
        }

        let sql = format!("DELETE FROM {} WHERE {}", table, self.where_clause.render());
        debug!(
            table = %table,
            conditions = self.conditions,
            parameters = self.params.len(),
            "built delete statement"
        );
        Ok(Statement {
            sql,
            params: self.params,
        })
    }
}
