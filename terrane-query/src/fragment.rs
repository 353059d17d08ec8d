//! Typed SQL fragments.
//!
//! Clauses are accumulated as a sequence of typed fragments and flattened
//! once at finalization, instead of being concatenated into a string as
//! they arrive. The accumulator stays write-only and permissive (nothing
//! validates grouping or clause order), but every piece carries its kind,
//! so parameter references and identifiers are never spliced by hand.

use smol_str::SmolStr;
use std::borrow::Cow;

/// One piece of a clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlFragment {
    /// Literal SQL text (keywords, punctuation, inlined trusted literals).
    Literal(Cow<'static, str>),
    /// An optionally table-qualified column reference.
    Column {
        /// Qualifying table alias; omitted when `None`.
        table: Option<SmolStr>,
        /// Column name.
        name: SmolStr,
    },
    /// A reference to a bound parameter, by name.
    Param(SmolStr),
}

impl SqlFragment {
    /// A static literal fragment.
    pub fn literal(text: &'static str) -> Self {
        Self::Literal(Cow::Borrowed(text))
    }

    /// An owned literal fragment.
    pub fn owned(text: String) -> Self {
        Self::Literal(Cow::Owned(text))
    }

    /// A column reference; empty table qualifiers are dropped.
    pub fn column(table: Option<&str>, name: &str) -> Self {
        Self::Column {
            table: table.filter(|t| !t.is_empty()).map(SmolStr::new),
            name: SmolStr::new(name),
        }
    }

    /// Write this fragment into a buffer.
    pub fn write_sql(&self, buffer: &mut String) {
        match self {
            Self::Literal(text) => buffer.push_str(text),
            Self::Column { table, name } => {
                if let Some(table) = table {
                    buffer.push_str(table);
                    buffer.push('.');
                }
                buffer.push_str(name);
            }
            Self::Param(name) => buffer.push_str(name),
        }
    }
}

/// Flatten a fragment sequence into SQL text.
pub fn render(fragments: &[SqlFragment]) -> String {
    let mut sql = String::with_capacity(fragments.len() * 8);
    for fragment in fragments {
        fragment.write_sql(&mut sql);
    }
    sql
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_render_mixed_fragments() {
        let fragments = vec![
            SqlFragment::column(Some("idx"), "Name"),
            SqlFragment::literal(" = "),
            SqlFragment::Param(SmolStr::new("@p1")),
        ];
        assert_eq!(render(&fragments), "idx.Name = @p1");
    }

    #[test]
    fn test_empty_table_qualifier_is_dropped() {
        let mut sql = String::new();
        SqlFragment::column(Some(""), "Name").write_sql(&mut sql);
        assert_eq!(sql, "Name");

        let mut sql = String::new();
        SqlFragment::column(None, "Name").write_sql(&mut sql);
        assert_eq!(sql, "Name");
    }

    #[test]
    fn test_unbalanced_groups_render_as_written() {
        // The accumulator does not validate nesting.
        let fragments = vec![
            SqlFragment::literal("("),
            SqlFragment::column(None, "A"),
            SqlFragment::literal(" IS NULL"),
        ];
        assert_eq!(render(&fragments), "(A IS NULL");
    }
}
