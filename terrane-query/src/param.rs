//! Parameter maps and finalized statements.
//!
//! Every builder owns one [`ParameterMap`]: an ordered, name-keyed
//! collection of typed values that grows monotonically while the statement
//! is assembled and is handed to the caller alongside the SQL text. Names
//! are generated from a per-builder counter (`@p1`, `@p2`, ...) and are
//! unique within one statement; binding the same name twice is a misuse
//! error.
//!
//! ```rust
//! use terrane_query::param::ParameterMap;
//! use terrane_query::types::SqlParamType;
//! use terrane_query::value::SqlValue;
//!
//! let mut params = ParameterMap::new();
//! let name = params.bind_next(SqlValue::Int(7), SqlParamType::BigInt).unwrap();
//! assert_eq!(name.as_str(), "@p1");
//! assert_eq!(params.len(), 1);
//! ```

use indexmap::IndexMap;
use smol_str::SmolStr;

use crate::error::{StatementError, StatementResult};
use crate::types::SqlParamType;
use crate::value::SqlValue;

/// A typed value bound under a parameter name. The value may be
/// [`SqlValue::Null`]; the type still drives the binding.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    /// The bound value.
    pub value: SqlValue,
    /// The concrete type the value binds as.
    pub ty: SqlParamType,
}

/// Ordered, name-keyed parameter collection for one statement.
#[derive(Debug, Clone, Default)]
pub struct ParameterMap {
    entries: IndexMap<SmolStr, Parameter>,
    counter: usize,
}

impl ParameterMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate the next statement-unique parameter name.
    ///
    /// Names are never reused within one map, including names that were
    /// generated but not bound.
    pub fn next_name(&mut self) -> SmolStr {
        self.counter += 1;
        SmolStr::new(format!("@p{}", self.counter))
    }

    /// Bind a value under an explicit name.
    ///
    /// Fails on a duplicate name and on geometry values, which are inlined
    /// as WKT literals rather than bound.
    pub fn add(
        &mut self,
        name: impl Into<SmolStr>,
        value: SqlValue,
        ty: SqlParamType,
    ) -> StatementResult<()> {
        if matches!(value, SqlValue::Geometry(_)) {
            return Err(StatementError::GeometryParameter);
        }
        let name = name.into();
        if self.entries.contains_key(&name) {
            return Err(StatementError::DuplicateParameter(name.to_string()));
        }
        self.entries.insert(name, Parameter { value, ty });
        Ok(())
    }

    /// Bind a value under a freshly generated name and return the name.
    pub fn bind_next(&mut self, value: SqlValue, ty: SqlParamType) -> StatementResult<SmolStr> {
        let name = self.next_name();
        self.add(name.clone(), value, ty)?;
        Ok(name)
    }

    /// Look up a bound parameter by name.
    pub fn get(&self, name: &str) -> Option<&Parameter> {
        self.entries.get(name)
    }

    /// Number of bound parameters.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no parameters are bound.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(name, parameter)` pairs in binding order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Parameter)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Parameter names in binding order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(|k| k.as_str())
    }
}

/// A finalized statement: SQL text plus the parameters it references.
#[derive(Debug, Clone)]
pub struct Statement {
    /// The SQL text.
    pub sql: String,
    /// Parameters referenced by the SQL text, in binding order.
    pub params: ParameterMap,
}
