//! Table descriptors and join configuration.
//!
//! A [`TableDescriptor`] names a table and its statement alias. A
//! descriptor used as a query's FROM table carries no join fields; a
//! descriptor used as a LEFT JOIN target carries all of them. The
//! `Option<Join>` makes partial configuration unrepresentable.
//!
//! Equality is structural over name, alias, and join fields, which is what
//! join deduplication needs: two independently constructed descriptors of
//! the same join compare equal.
//!
//! ```rust
//! use terrane_query::table::TableDescriptor;
//!
//! let index = TableDescriptor::new("SpatialIndex", "idx");
//! let meta = TableDescriptor::new("IndexMetadata", "meta")
//!     .with_join(&index, "Id", "IndexId");
//!
//! assert!(meta.is_joined());
//! assert_eq!(meta.join().unwrap().first_alias(), "idx");
//! ```

use smol_str::SmolStr;

/// How a descriptor joins to the query's first table: the first table's
/// name and alias, the key column on the first table, and the
/// foreign-key column on this table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Join {
    first_table: SmolStr,
    first_alias: SmolStr,
    first_key: SmolStr,
    own_key: SmolStr,
}

impl Join {
    /// Name of the joined-to table.
    pub fn first_table(&self) -> &str {
        &self.first_table
    }

    /// Alias of the joined-to table.
    pub fn first_alias(&self) -> &str {
        &self.first_alias
    }

    /// Key column on the joined-to table.
    pub fn first_key(&self) -> &str {
        &self.first_key
    }

    /// Foreign-key column on the owning table.
    pub fn own_key(&self) -> &str {
        &self.own_key
    }
}

/// A table name, its statement alias, and optional join configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDescriptor {
    name: SmolStr,
    alias: SmolStr,
    join: Option<Join>,
}

impl TableDescriptor {
    /// Create a descriptor with no join fields.
    pub fn new(name: &str, alias: &str) -> Self {
        Self {
            name: SmolStr::new(name),
            alias: SmolStr::new(alias),
            join: None,
        }
    }

    /// Configure this descriptor as a LEFT JOIN target: joined to `first`
    /// on `first.first_key = self.own_key`. All join fields are set
    /// together.
    pub fn with_join(mut self, first: &TableDescriptor, first_key: &str, own_key: &str) -> Self {
        self.join = Some(Join {
            first_table: first.name.clone(),
            first_alias: first.alias.clone(),
            first_key: SmolStr::new(first_key),
            own_key: SmolStr::new(own_key),
        });
        self
    }

    /// The table name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The statement alias.
    pub fn alias(&self) -> &str {
        &self.alias
    }

    /// The join configuration, if this descriptor is a join target.
    pub fn join(&self) -> Option<&Join> {
        self.join.as_ref()
    }

    /// Whether join fields are set.
    pub fn is_joined(&self) -> bool {
        self.join.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_structural_equality() {
        let first = TableDescriptor::new("SpatialIndex", "idx");
        let a = TableDescriptor::new("IndexMetadata", "meta").with_join(&first, "Id", "IndexId");
        let b = TableDescriptor::new("IndexMetadata", "meta").with_join(&first, "Id", "IndexId");
        assert_eq!(a, b);
    }

    #[test]
    fn test_inequality_on_join_fields() {
        let first = TableDescriptor::new("SpatialIndex", "idx");
        let a = TableDescriptor::new("IndexMetadata", "meta").with_join(&first, "Id", "IndexId");
        let b = TableDescriptor::new("IndexMetadata", "meta").with_join(&first, "Id", "OwnerId");
        assert_ne!(a, b);

        let plain = TableDescriptor::new("IndexMetadata", "meta");
        assert_ne!(a, plain);
    }

    #[test]
    fn test_join_captures_first_table_identity() {
        let first = TableDescriptor::new("SpatialIndex", "idx");
        let joined = TableDescriptor::new("Thumbnails", "th").with_join(&first, "Id", "EntryId");
        let join = joined.join().unwrap();
        assert_eq!(join.first_table(), "SpatialIndex");
        assert_eq!(join.first_alias(), "idx");
        assert_eq!(join.first_key(), "Id");
        assert_eq!(join.own_key(), "EntryId");
    }
}
