//! Reassembly of records from shredded column tables.
//!
//! Columns are read one at a time. For every entry the lineage of the leaf
//! is walked from the top-level field down, creating the maps and lists of
//! the record on first use. The definition level tells how far down the
//! lineage the entry is defined. The repetition level tells, for every
//! repeated node on the way, whether the entry continues the current
//! element, starts the next element or starts a new list.
//!
//! Nulls and absent fields are not distinguished by the levels, and both are
//! reassembled as absent fields. A bare repeated field which is empty is
//! also reassembled as absent.

use crate::column::{ColumnTable, ColumnTableSet};
use crate::common::{DefinitionLevel, RepetitionLevel};
use crate::encoder::{EncodedValue, PrimitiveEncoder};
use crate::error::{Result, ShredError};
use crate::schema_tree::{NodeKind, NodeRole, SchemaNode, SchemaTree};
use crate::value::Value;
use tracing::debug;

/// Rebuilds [`Value`] records from the columns produced by a
/// [`Shredder`](crate::shredder::Shredder) for the same schema tree.
#[derive(Debug, Clone, Copy)]
pub struct RecordAssembler<'a> {
    tree: &'a SchemaTree,
}

impl<'a> RecordAssembler<'a> {
    pub fn new(tree: &'a SchemaTree) -> Self {
        Self { tree }
    }

    pub fn assemble(&self, columns: &ColumnTableSet) -> Result<Vec<Value>> {
        let Some(first) = self.tree.leaves().next() else {
            return Ok(vec![]);
        };
        let record_count = columns.try_get(first.path_str())?.record_count();
        debug!(schema = self.tree.name(), record_count, "assembling records");

        let mut records = vec![Value::Map(vec![]); record_count];
        for leaf in self.tree.leaves() {
            let table = columns.try_get(leaf.path_str())?;
            if table.record_count() != record_count {
                return Err(ShredError::inconsistent(
                    leaf.path_str(),
                    format!(
                        "expected {record_count} records, found {}",
                        table.record_count()
                    ),
                ));
            }
            ColumnReader::try_new(self.tree, leaf, table)?.read_into(&mut records)?;
        }

        Ok(records)
    }
}

/// State for reading a single column into the records.
struct ColumnReader<'a> {
    leaf: &'a SchemaNode,
    table: &'a ColumnTable,
    lineage: Vec<&'a SchemaNode>,
    /// Current element index of every repeated node in the lineage
    indices: Vec<usize>,
    encoder: PrimitiveEncoder<'a>,
}

impl<'a> ColumnReader<'a> {
    fn try_new(tree: &'a SchemaTree, leaf: &'a SchemaNode, table: &'a ColumnTable) -> Result<Self> {
        let Some(primitive) = leaf.primitive_type() else {
            return Err(ShredError::inconsistent(
                leaf.path_str(),
                "column of a group node",
            ));
        };
        let lineage = tree.lineage(leaf.id());

        Ok(Self {
            leaf,
            table,
            indices: vec![0; lineage.len()],
            lineage,
            encoder: PrimitiveEncoder::new(primitive, leaf.path_str()),
        })
    }

    fn read_into(&mut self, records: &mut [Value]) -> Result<()> {
        let table = self.table;
        let mut record_index = None;

        for (value, dl, rl) in table.iter() {
            if dl > self.leaf.max_definition_level() || rl > self.leaf.max_repetition_level() {
                return Err(self.inconsistent(format!(
                    "levels out of bounds: def={dl} rep={rl}"
                )));
            }

            if rl == 0 {
                record_index = Some(record_index.map_or(0, |i| i + 1));
            }
            let Some(record) = record_index.and_then(|i| records.get_mut(i)) else {
                return Err(self.inconsistent("column does not start a record"));
            };

            self.read_entry(record, value, dl, rl)?;
        }

        Ok(())
    }

    fn read_entry(
        &mut self,
        record: &mut Value,
        value: Option<&EncodedValue>,
        dl: DefinitionLevel,
        rl: RepetitionLevel,
    ) -> Result<()> {
        let mut current = record;
        let mut position = 0;

        while position < self.lineage.len() {
            let node = self.lineage[position];
            let defined = (!node.is_optional() && !node.is_repeated())
                || dl >= node.max_definition_level();
            if !defined {
                return Ok(());
            }

            if node.is_repeated() {
                let max = node.max_repetition_level();
                self.indices[position] = match rl {
                    rl if rl < max => 0,
                    rl if rl == max => self.indices[position] + 1,
                    _ => self.indices[position],
                };
            }
            let index = self.indices[position];
            let is_leaf = position + 1 == self.lineage.len();

            current = match node.role() {
                NodeRole::Field => {
                    let slot = field_slot(current, node.name(), self.leaf)?;
                    if node.is_repeated() {
                        if slot.is_null() {
                            *slot = Value::List(vec![]);
                        }
                        list_slot(slot, index, self.leaf)?
                    } else {
                        slot
                    }
                }
                NodeRole::MapEntries => {
                    let Value::Map(pairs) = current else {
                        return Err(self.inconsistent("expected a map value"));
                    };
                    if index == pairs.len() {
                        pairs.push((String::new(), Value::Null));
                    }
                    let Some((key, slot)) = pairs.get_mut(index) else {
                        return Err(self.inconsistent("map entry index skipped"));
                    };

                    if self.lineage[position + 1].role() == NodeRole::MapKey {
                        *key = match self.decode(value)? {
                            Some(Value::String(s)) => s,
                            Some(other) => other.to_string(),
                            None => return Err(self.inconsistent("map key is null")),
                        };
                        return Ok(());
                    }
                    slot
                }
                NodeRole::ListElements => list_slot(current, index, self.leaf)?,
                NodeRole::MapKey | NodeRole::MapValue | NodeRole::ListElement => current,
                NodeRole::Root => return Err(self.inconsistent("root in lineage")),
            };

            if is_leaf {
                if let Some(decoded) = self.decode(value)? {
                    *current = decoded;
                }
                return Ok(());
            }
            // Wrappers hold the element or value of the next node
            let holds_value = !matches!(
                node.role(),
                NodeRole::ListElements | NodeRole::MapEntries
            );
            if holds_value && current.is_null() {
                *current = container(node);
            }

            position += 1;
        }

        Ok(())
    }

    fn decode(&self, value: Option<&EncodedValue>) -> Result<Option<Value>> {
        value.map(|value| self.encoder.decode(value)).transpose()
    }

    fn inconsistent(&self, reason: impl Into<String>) -> ShredError {
        ShredError::inconsistent(self.leaf.path_str(), reason)
    }
}

/// Empty value for a group node.
fn container(node: &SchemaNode) -> Value {
    match node.kind() {
        NodeKind::List { .. } => Value::List(vec![]),
        NodeKind::Struct | NodeKind::Map { .. } | NodeKind::Primitive(_) => Value::Map(vec![]),
    }
}

/// Returns the named member of a struct value, inserting a null member if
/// it does not exist yet.
fn field_slot<'v>(current: &'v mut Value, name: &str, leaf: &SchemaNode) -> Result<&'v mut Value> {
    let Value::Map(entries) = current else {
        return Err(ShredError::inconsistent(
            leaf.path_str(),
            format!("expected a struct value for field: {name}"),
        ));
    };

    let position = match entries.iter().position(|(key, _)| key == name) {
        Some(position) => position,
        None => {
            entries.push((name.to_string(), Value::Null));
            entries.len() - 1
        }
    };

    Ok(&mut entries[position].1)
}

/// Returns the element at `index`, appending a null element if `index` is
/// one past the end.
fn list_slot<'v>(current: &'v mut Value, index: usize, leaf: &SchemaNode) -> Result<&'v mut Value> {
    let Value::List(items) = current else {
        return Err(ShredError::inconsistent(
            leaf.path_str(),
            "expected a list value",
        ));
    };
    if index == items.len() {
        items.push(Value::Null);
    }

    items
        .get_mut(index)
        .ok_or_else(|| ShredError::inconsistent(leaf.path_str(), "list element index skipped"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{
        integer, optional_group, optional_integer, optional_list, optional_map, optional_string,
        repeated_string, string, SchemaBuilder,
    };
    use crate::shredder::Shredder;
    use crate::value::ValueBuilder;

    fn round_trip(tree: &SchemaTree, records: &[Value]) -> Vec<Value> {
        let columns = Shredder::new(tree).shred_batch(records).unwrap();
        RecordAssembler::new(tree).assemble(&columns).unwrap()
    }

    #[test]
    fn test_flat_records() {
        let schema = SchemaBuilder::new("flat")
            .field(optional_string("name"))
            .field(repeated_string("tags"))
            .build();
        let tree = SchemaTree::try_new(&schema).unwrap();

        let records = vec![
            ValueBuilder::new()
                .field("name", "a")
                .repeated("tags", vec!["x", "y"])
                .build(),
            ValueBuilder::new().repeated("tags", vec!["z"]).build(),
            ValueBuilder::new().field("name", "c").build(),
        ];

        assert_eq!(round_trip(&tree, &records), records);
    }

    #[test]
    fn test_nulls_become_absent() {
        let schema = SchemaBuilder::new("flat")
            .field(optional_string("name"))
            .field(repeated_string("tags"))
            .build();
        let tree = SchemaTree::try_new(&schema).unwrap();

        let records = vec![ValueBuilder::new()
            .null("name")
            .repeated("tags", Vec::<&str>::new())
            .build()];

        assert_eq!(round_trip(&tree, &records), vec![Value::Map(vec![])]);
    }

    #[test]
    fn test_maps_and_lists() {
        let schema = SchemaBuilder::new("nested")
            .field(integer("id"))
            .field(optional_map("attrs", string("key"), optional_integer("value")))
            .field(optional_list("scores", optional_integer("element")))
            .build();
        let tree = SchemaTree::try_new(&schema).unwrap();

        let records = vec![
            ValueBuilder::new()
                .field("id", 1)
                .field(
                    "attrs",
                    ValueBuilder::new().field("a", 1).null("b").build(),
                )
                .field(
                    "scores",
                    Value::List(vec![Value::from(1), Value::Null, Value::from(3)]),
                )
                .build(),
            ValueBuilder::new()
                .field("id", 2)
                .field("attrs", ValueBuilder::new().build())
                .repeated("scores", Vec::<i64>::new())
                .build(),
            ValueBuilder::new().field("id", 3).build(),
        ];

        assert_eq!(round_trip(&tree, &records), records);
    }

    #[test]
    fn test_groups() {
        let schema = SchemaBuilder::new("groups")
            .field(optional_group(
                "outer",
                vec![
                    optional_group("inner", vec![optional_integer("x")]),
                    repeated_string("ys"),
                ],
            ))
            .build();
        let tree = SchemaTree::try_new(&schema).unwrap();

        let records = vec![
            ValueBuilder::new()
                .field(
                    "outer",
                    ValueBuilder::new()
                        .field("inner", ValueBuilder::new().field("x", 5).build())
                        .repeated("ys", vec!["p", "q"])
                        .build(),
                )
                .build(),
            ValueBuilder::new()
                .field(
                    "outer",
                    ValueBuilder::new()
                        .field("inner", ValueBuilder::new().build())
                        .build(),
                )
                .build(),
        ];

        assert_eq!(round_trip(&tree, &records), records);
    }

    #[test]
    fn test_inconsistent_columns() {
        let schema = SchemaBuilder::new("flat")
            .field(optional_string("name"))
            .field(optional_string("other"))
            .build();
        let tree = SchemaTree::try_new(&schema).unwrap();

        let mut columns = ColumnTableSet::new(&tree);
        columns
            .table_mut(0)
            .push(Some(EncodedValue::from("a")), 1, 0);

        let result = RecordAssembler::new(&tree).assemble(&columns);
        assert!(
            matches!(result, Err(ShredError::InconsistentColumn { ref path_str, .. }) if path_str == "other"),
            "Expected inconsistent column error, found: {:?}",
            result
        );
    }
}
