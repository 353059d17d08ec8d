//! Error types for statement construction.
//!
//! Every builder operation returns a [`StatementResult`]. Errors fall into
//! two classes:
//!
//! - **Misuse** (`is_misuse() == true`): the calling code drove a builder
//!   out of sequence: adding a column after the column list was closed,
//!   finalizing without a table name, binding the same parameter twice.
//!   These indicate a defect in the caller and abort construction.
//! - **Reported** (`is_misuse() == false`): conditions a caller can surface
//!   cleanly, such as paging requested without an ORDER BY, an unsupported
//!   operator/value combination, malformed geometry input.
//!
//! There is no partial-statement recovery: a failed build is simply not
//! executed.
//!
//! ```rust
//! use terrane_query::error::StatementError;
//!
//! let err = StatementError::MissingOrderBy;
//! assert!(!err.is_misuse());
//!
//! let err = StatementError::MissingTable;
//! assert!(err.is_misuse());
//! ```

use thiserror::Error;

/// Result type for statement construction.
pub type StatementResult<T> = Result<T, StatementError>;

/// Errors raised while assembling a statement.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StatementError {
    /// A column was declared after the column list was closed.
    #[error("column list is already closed")]
    ColumnsClosed,

    /// Rows were added or the statement finalized before the column list
    /// was closed.
    #[error("column list is still open; close it before adding rows")]
    ColumnsOpen,

    /// The statement was finalized without a table name.
    #[error("no table name has been set")]
    MissingTable,

    /// An INSERT or MERGE statement was finalized with no rows.
    #[error("statement has no rows")]
    NoRows,

    /// A DELETE statement was finalized with no conditions.
    #[error("statement has no conditions")]
    NoConditions,

    /// A SELECT statement was finalized with no output columns.
    #[error("no select columns have been declared")]
    NoColumns,

    /// A MERGE statement was finalized without an ON clause.
    #[error("MERGE requires an ON clause")]
    MissingOnClause,

    /// A descriptor without join fields was added as a LEFT JOIN target.
    #[error("table '{0}' is not configured as a join target")]
    JoinNotConfigured(String),

    /// A descriptor with join fields was used as the FROM table.
    #[error("table '{0}' carries join fields and cannot be the FROM table")]
    JoinOnFromTable(String),

    /// A parameter name was bound twice within one statement.
    #[error("parameter '{0}' is already bound")]
    DuplicateParameter(String),

    /// A geometry value was offered as a bound parameter. Geometry is
    /// inlined as a WKT literal and never parameterized.
    #[error("geometry values cannot be bound as parameters")]
    GeometryParameter,

    /// A second, different index hint was requested for one statement.
    #[error("index hint '{requested}' conflicts with previously set hint '{existing}'")]
    ConflictingIndexHint {
        /// The hint already attached to the statement.
        existing: String,
        /// The hint the later call asked for.
        requested: String,
    },

    /// A where-template placeholder has no bound value.
    #[error("placeholder '{{{0}}}' has no bound value")]
    UnboundPlaceholder(String),

    /// Delete-before-insert is active but a row was added without a
    /// where template.
    #[error("delete-before-insert requires a where template for each row")]
    MissingTemplate,

    /// Delete-before-insert was activated after the column list closed.
    #[error("delete-before-insert must be activated before the column list is closed")]
    DeleteBeforeInsertClosed,

    /// Paged selection was requested without any ORDER BY terms.
    /// Windowed row numbering is undefined without a deterministic order.
    #[error("paged selection requires at least one ORDER BY term")]
    MissingOrderBy,

    /// The operator cannot be applied to the supplied right-side value.
    #[error("unsupported comparison: {op} {detail}")]
    UnsupportedComparison {
        /// SQL spelling of the operator.
        op: &'static str,
        /// What made the combination unsupported.
        detail: String,
    },

    /// A property type name outside the supported set.
    #[error("unsupported property type '{0}'")]
    UnsupportedPropertyType(String),

    /// A row value does not fit the declared column.
    #[error("unsupported value for column '{column}': {detail}")]
    UnsupportedValue {
        /// The declared column the value was offered for.
        column: String,
        /// What made the value unsupported.
        detail: String,
    },

    /// Geometry input that could not be parsed into a polygon.
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),
}

impl StatementError {
    /// Create an unsupported-comparison error.
    pub fn unsupported_comparison(op: &'static str, detail: impl Into<String>) -> Self {
        Self::UnsupportedComparison {
            op,
            detail: detail.into(),
        }
    }

    /// Create an unsupported-value error.
    pub fn unsupported_value(column: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::UnsupportedValue {
            column: column.into(),
            detail: detail.into(),
        }
    }

    /// Create an invalid-geometry error.
    pub fn invalid_geometry(detail: impl Into<String>) -> Self {
        Self::InvalidGeometry(detail.into())
    }

    /// Whether this error indicates a defect in the calling code rather
    /// than a condition the caller can report and recover from.
    pub fn is_misuse(&self) -> bool {
        !matches!(
            self,
            Self::MissingOrderBy
                | Self::UnsupportedComparison { .. }
                | Self::UnsupportedPropertyType(_)
                | Self::UnsupportedValue { .. }
                | Self::InvalidGeometry(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_misuse_classification() {
        assert!(StatementError::ColumnsClosed.is_misuse());
        assert!(StatementError::MissingTable.is_misuse());
        assert!(StatementError::DuplicateParameter("@p1".into()).is_misuse());
        assert!(StatementError::GeometryParameter.is_misuse());

        assert!(!StatementError::MissingOrderBy.is_misuse());
        assert!(!StatementError::unsupported_comparison("IN", "non-string right side").is_misuse());
        assert!(!StatementError::invalid_geometry("not an object").is_misuse());
    }

    #[test]
    fn test_error_display() {
        let err = StatementError::ConflictingIndexHint {
            existing: "IX_Spatial".into(),
            requested: "IX_Other".into(),
        };
        assert_eq!(
            err.to_string(),
            "index hint 'IX_Other' conflicts with previously set hint 'IX_Spatial'"
        );

        let err = StatementError::UnboundPlaceholder("id".into());
        assert_eq!(err.to_string(), "placeholder '{id}' has no bound value");
    }
}
