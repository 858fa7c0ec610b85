//! Output of shredding: one table of values and levels per leaf column.

use crate::common::{DefinitionLevel, RepetitionLevel};
use crate::encoder::EncodedValue;
use crate::error::{Result, ShredError};
use crate::schema_tree::SchemaTree;
use std::collections::HashMap;
use std::fmt;
use std::ops::Range;

/// Three parallel sequences of a leaf column. They are always of the same
/// length, a `None` value is a null entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnTable {
    path_str: String,
    values: Vec<Option<EncodedValue>>,
    definition_levels: Vec<DefinitionLevel>,
    repetition_levels: Vec<RepetitionLevel>,
}

impl ColumnTable {
    pub fn new(path_str: impl Into<String>) -> Self {
        Self {
            path_str: path_str.into(),
            ..Default::default()
        }
    }

    /// Dotted path of the leaf column.
    pub fn path_str(&self) -> &str {
        &self.path_str
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[Option<EncodedValue>] {
        &self.values
    }

    pub fn definition_levels(&self) -> &[DefinitionLevel] {
        &self.definition_levels
    }

    pub fn repetition_levels(&self) -> &[RepetitionLevel] {
        &self.repetition_levels
    }

    /// Count of records with entries in this column. Every record starts
    /// with an entry at repetition level zero.
    pub fn record_count(&self) -> usize {
        self.repetition_levels.iter().filter(|rl| **rl == 0).count()
    }

    pub fn push(
        &mut self,
        value: Option<EncodedValue>,
        definition_level: DefinitionLevel,
        repetition_level: RepetitionLevel,
    ) {
        self.values.push(value);
        self.definition_levels.push(definition_level);
        self.repetition_levels.push(repetition_level);
    }

    pub fn push_null(
        &mut self,
        definition_level: DefinitionLevel,
        repetition_level: RepetitionLevel,
    ) {
        self.push(None, definition_level, repetition_level)
    }

    /// Shortens the table to its first `len` entries.
    pub fn truncate(&mut self, len: usize) {
        self.values.truncate(len);
        self.definition_levels.truncate(len);
        self.repetition_levels.truncate(len);
    }

    /// Moves all entries of `other` to the end of this table.
    pub fn append(&mut self, other: &mut ColumnTable) {
        self.values.append(&mut other.values);
        self.definition_levels.append(&mut other.definition_levels);
        self.repetition_levels.append(&mut other.repetition_levels);
    }

    /// Returns the entries as `(value, definition level, repetition level)`.
    pub fn iter(
        &self,
    ) -> impl ExactSizeIterator<Item = (Option<&EncodedValue>, DefinitionLevel, RepetitionLevel)>
    {
        self.values
            .iter()
            .zip(&self.definition_levels)
            .zip(&self.repetition_levels)
            .map(|((value, dl), rl)| (value.as_ref(), *dl, *rl))
    }
}

impl fmt::Display for ColumnTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.path_str)?;
        for (value, dl, rl) in self.iter() {
            match value {
                Some(value) => writeln!(f, "  rep={rl} def={dl} {value}")?,
                None => writeln!(f, "  rep={rl} def={dl} NULL")?,
            }
        }
        Ok(())
    }
}

/// Column tables for every leaf of a schema, in leaf order.
///
/// The set is created with an empty table for each leaf, so that columns
/// of absent fields still receive their null entries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnTableSet {
    tables: Vec<ColumnTable>,
    index: HashMap<String, usize>,
}

impl ColumnTableSet {
    pub fn new(tree: &SchemaTree) -> Self {
        let tables = tree
            .leaves()
            .map(|leaf| ColumnTable::new(leaf.path_str()))
            .collect::<Vec<_>>();
        let index = tables
            .iter()
            .enumerate()
            .map(|(ordinal, table)| (table.path_str.clone(), ordinal))
            .collect();

        Self { tables, index }
    }

    /// Count of leaf columns.
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn get(&self, path: &str) -> Option<&ColumnTable> {
        self.index.get(path).map(|ordinal| &self.tables[*ordinal])
    }

    /// Returns the table of a leaf column by its dotted path.
    pub fn try_get(&self, path: &str) -> Result<&ColumnTable> {
        self.get(path).ok_or_else(|| ShredError::ColumnNotFound {
            path_str: path.to_string(),
        })
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = &ColumnTable> {
        self.tables.iter()
    }

    /// Dotted paths of the leaf columns in leaf order.
    pub fn paths(&self) -> impl ExactSizeIterator<Item = &str> {
        self.tables.iter().map(ColumnTable::path_str)
    }

    /// Total number of entries across all columns.
    pub fn entry_count(&self) -> usize {
        self.tables.iter().map(ColumnTable::len).sum()
    }

    pub(crate) fn table_mut(&mut self, ordinal: usize) -> &mut ColumnTable {
        &mut self.tables[ordinal]
    }

    /// Length of every table, used to roll back a failed record.
    pub(crate) fn lengths(&self) -> Vec<usize> {
        self.tables.iter().map(ColumnTable::len).collect()
    }

    pub(crate) fn truncate(&mut self, lengths: &[usize]) {
        for (table, len) in self.tables.iter_mut().zip(lengths) {
            table.truncate(*len);
        }
    }

    /// Appends one null entry to every leaf column in `leaves`.
    pub(crate) fn push_nulls(
        &mut self,
        leaves: Range<usize>,
        definition_level: DefinitionLevel,
        repetition_level: RepetitionLevel,
    ) {
        for table in &mut self.tables[leaves] {
            table.push_null(definition_level, repetition_level);
        }
    }

    /// Concatenates the tables of `other` after the tables of this set,
    /// column by column. Both sets must have the same columns.
    pub fn append(&mut self, mut other: ColumnTableSet) -> Result<()> {
        if let Some(table) = other
            .tables
            .iter()
            .find(|table| !self.index.contains_key(table.path_str()))
        {
            return Err(ShredError::ColumnNotFound {
                path_str: table.path_str.clone(),
            });
        }
        if let Some(table) = self
            .tables
            .iter()
            .find(|table| !other.index.contains_key(table.path_str()))
        {
            return Err(ShredError::ColumnNotFound {
                path_str: table.path_str.clone(),
            });
        }

        for table in &mut other.tables {
            let ordinal = self.index[table.path_str()];
            self.tables[ordinal].append(table);
        }

        Ok(())
    }

    /// Merges partial sets in order. Returns an empty set for `tree` when
    /// there are no partial sets.
    pub fn concat(
        tree: &SchemaTree,
        parts: impl IntoIterator<Item = ColumnTableSet>,
    ) -> Result<ColumnTableSet> {
        let mut parts = parts.into_iter();
        let Some(mut merged) = parts.next() else {
            return Ok(ColumnTableSet::new(tree));
        };
        for part in parts {
            merged.append(part)?;
        }
        Ok(merged)
    }
}

impl IntoIterator for ColumnTableSet {
    type Item = ColumnTable;
    type IntoIter = std::vec::IntoIter<ColumnTable>;

    fn into_iter(self) -> Self::IntoIter {
        self.tables.into_iter()
    }
}

impl fmt::Display for ColumnTableSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for table in &self.tables {
            write!(f, "{table}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{optional_group, optional_string, repeated_string, SchemaBuilder};

    fn tree() -> SchemaTree {
        let schema = SchemaBuilder::new("t")
            .field(optional_string("name"))
            .field(optional_group(
                "g",
                vec![optional_string("a"), repeated_string("b")],
            ))
            .build();
        SchemaTree::try_new(&schema).unwrap()
    }

    #[test]
    fn test_new_set_has_empty_table_per_leaf() {
        let set = ColumnTableSet::new(&tree());

        assert_eq!(set.paths().collect::<Vec<_>>(), vec!["name", "g.a", "g.b"]);
        assert!(set.iter().all(ColumnTable::is_empty));
        assert!(set.get("g").is_none());
        assert!(matches!(
            set.try_get("missing"),
            Err(ShredError::ColumnNotFound { .. })
        ));
    }

    #[test]
    fn test_push_nulls_for_leaf_range() {
        let tree = tree();
        let mut set = ColumnTableSet::new(&tree);
        set.push_nulls(tree.lookup("g").unwrap().leaf_range(), 0, 0);

        assert!(set.get("name").unwrap().is_empty());
        for path in ["g.a", "g.b"] {
            let table = set.get(path).unwrap();
            assert_eq!(table.values(), &[None::<EncodedValue>]);
            assert_eq!(table.definition_levels(), &[0]);
            assert_eq!(table.repetition_levels(), &[0]);
        }
    }

    #[test]
    fn test_append_preserves_order() {
        let tree = tree();
        let mut first = ColumnTableSet::new(&tree);
        first.table_mut(0).push(Some(EncodedValue::from("x")), 1, 0);
        let mut second = ColumnTableSet::new(&tree);
        second.table_mut(0).push(Some(EncodedValue::from("y")), 1, 0);
        second.table_mut(0).push_null(0, 0);

        first.append(second).unwrap();

        let name = first.get("name").unwrap();
        assert_eq!(
            name.values(),
            &[
                Some(EncodedValue::from("x")),
                Some(EncodedValue::from("y")),
                None
            ]
        );
        assert_eq!(name.definition_levels(), &[1, 1, 0]);
        assert_eq!(name.record_count(), 3);
    }

    #[test]
    fn test_append_mismatched_columns() {
        let mut set = ColumnTableSet::new(&tree());
        let other = SchemaTree::try_new(
            &SchemaBuilder::new("other")
                .field(optional_string("z"))
                .build(),
        )
        .unwrap();

        let result = set.append(ColumnTableSet::new(&other));
        assert!(
            matches!(result, Err(ShredError::ColumnNotFound { ref path_str }) if path_str == "z"),
            "Expected column not found error, found: {:?}",
            result
        );
    }

    #[test]
    fn test_display_table() {
        let mut table = ColumnTable::new("name");
        table.push(Some(EncodedValue::from("a")), 1, 0);
        table.push_null(0, 0);

        assert_eq!(table.to_string(), "name\n  rep=0 def=1 \"a\"\n  rep=0 def=0 NULL\n");
    }
}
