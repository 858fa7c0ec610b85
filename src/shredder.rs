//! Shredding of nested records into column tables.
//!
//! A record is traversed depth-first together with the [`SchemaTree`]. For
//! every leaf reachable from the record an entry `(value, definition level,
//! repetition level)` is appended to the leaf's [`ColumnTable`]. A subtree
//! which is absent, null or empty emits one null entry for every leaf
//! beneath it, at the levels where the absence was detected.
//!
//! [`ColumnTable`]: crate::column::ColumnTable

use crate::column::ColumnTableSet;
use crate::common::{DefinitionLevel, RepetitionLevel};
use crate::encoder::PrimitiveEncoder;
use crate::error::{Result, ShredError};
use crate::field::PrimitiveType;
use crate::resolver::{FieldNameResolver, IdentityResolver};
use crate::schema_tree::{NodeId, NodeKind, SchemaNode, SchemaTree};
use crate::value::Value;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::ops::Range;
use std::sync::Arc;
use tracing::{debug, trace};

/// What to do with record keys which are not defined in the schema.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownFieldPolicy {
    /// Drop the key and its whole subtree.
    #[default]
    Ignore,
    /// Fail with [`ShredError::StructContainsUndefinedProperty`].
    Reject,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShredOptions {
    unknown_fields: UnknownFieldPolicy,
    /// Partition count for parallel batches, `0` uses one partition per
    /// thread of the rayon pool.
    partitions: usize,
    /// Smallest number of records worth a partition of its own.
    min_partition_len: usize,
}

impl Default for ShredOptions {
    fn default() -> Self {
        Self {
            unknown_fields: UnknownFieldPolicy::default(),
            partitions: 0,
            min_partition_len: 1024,
        }
    }
}

impl ShredOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_unknown_fields(mut self, policy: UnknownFieldPolicy) -> Self {
        self.unknown_fields = policy;
        self
    }

    pub fn with_partitions(mut self, partitions: usize) -> Self {
        self.partitions = partitions;
        self
    }

    pub fn with_min_partition_len(mut self, min_partition_len: usize) -> Self {
        self.min_partition_len = min_partition_len;
        self
    }

    pub fn unknown_fields(&self) -> UnknownFieldPolicy {
        self.unknown_fields
    }

    pub fn partitions(&self) -> usize {
        self.partitions
    }

    pub fn min_partition_len(&self) -> usize {
        self.min_partition_len
    }
}

/// A value paired with the schema node it is shredded against.
#[derive(Debug)]
struct Frame<'v> {
    node: NodeId,
    value: &'v Value,
    definition_level: DefinitionLevel,
    repetition_level: RepetitionLevel,
    /// Set for one element of a bare repeated field. The element is not
    /// expanded again.
    element: bool,
}

#[derive(Debug)]
enum WorkItem<'v> {
    Value(Frame<'v>),
    /// The key of a map entry
    MapKey {
        node: NodeId,
        key: &'v str,
        definition_level: DefinitionLevel,
        repetition_level: RepetitionLevel,
    },
    /// Null entries for all leaves at or beneath `node`
    Absent {
        node: NodeId,
        definition_level: DefinitionLevel,
        repetition_level: RepetitionLevel,
    },
}

/// Shreds records of one schema into column tables.
///
/// The shredder only borrows the schema tree, and can be shared by any
/// number of threads.
///
/// ```
/// use striper::schema::{optional_string, repeated_string};
/// use striper::{ColumnTableSet, SchemaBuilder, SchemaTree, Shredder, ValueBuilder};
///
/// let schema = SchemaBuilder::new("example")
///     .field(optional_string("name"))
///     .field(repeated_string("tags"))
///     .build();
/// let tree = SchemaTree::try_new(&schema).unwrap();
///
/// let record = ValueBuilder::new()
///     .field("name", "a")
///     .repeated("tags", vec!["x", "y"])
///     .build();
///
/// let mut columns = ColumnTableSet::new(&tree);
/// Shredder::new(&tree).shred_record(&record, &mut columns).unwrap();
///
/// let tags = columns.get("tags").unwrap();
/// assert_eq!(tags.definition_levels(), &[1, 1]);
/// assert_eq!(tags.repetition_levels(), &[0, 1]);
/// ```
#[derive(Debug, Clone)]
pub struct Shredder<'a> {
    tree: &'a SchemaTree,
    options: ShredOptions,
    resolver: Arc<dyn FieldNameResolver>,
}

impl<'a> Shredder<'a> {
    pub fn new(tree: &'a SchemaTree) -> Self {
        Self {
            tree,
            options: ShredOptions::default(),
            resolver: Arc::new(IdentityResolver),
        }
    }

    pub fn with_options(mut self, options: ShredOptions) -> Self {
        self.options = options;
        self
    }

    /// Sets the translation of record keys into schema field names.
    pub fn with_resolver(mut self, resolver: Arc<dyn FieldNameResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn tree(&self) -> &'a SchemaTree {
        self.tree
    }

    pub fn options(&self) -> &ShredOptions {
        &self.options
    }

    /// Shreds one record into `columns`.
    ///
    /// The record is shredded completely or not at all. On error the
    /// entries already appended for this record are removed again.
    pub fn shred_record(&self, record: &Value, columns: &mut ColumnTableSet) -> Result<()> {
        self.check_columns(columns)?;
        let lengths = columns.lengths();
        self.shred_record_unchecked(record, columns).inspect_err(|_| {
            columns.truncate(&lengths);
        })
    }

    /// Shreds the records in `range` into a new set of column tables.
    ///
    /// The range is clamped to the bounds of `records`.
    pub fn shred_range(&self, records: &[Value], range: Range<usize>) -> Result<ColumnTableSet> {
        let end = range.end.min(records.len());
        let start = range.start.min(end);

        let mut columns = ColumnTableSet::new(self.tree);
        for record in &records[start..end] {
            self.shred_record_unchecked(record, &mut columns)?;
        }

        Ok(columns)
    }

    /// Shreds all records sequentially.
    pub fn shred_batch(&self, records: &[Value]) -> Result<ColumnTableSet> {
        debug!(schema = self.tree.name(), records = records.len(), "shredding batch");
        self.shred_range(records, 0..records.len())
    }

    /// Shreds the records in order-preserving partitions on the rayon
    /// thread pool. The partial tables are concatenated in partition order
    /// after every partition has completed, so the output is identical to
    /// [`Shredder::shred_batch`].
    pub fn shred_partitioned(&self, records: &[Value]) -> Result<ColumnTableSet> {
        let partitions = self.partition_count(records.len());
        if partitions <= 1 {
            return self.shred_batch(records);
        }

        let chunk_len = records.len().div_ceil(partitions);
        debug!(
            schema = self.tree.name(),
            records = records.len(),
            partitions,
            chunk_len,
            "shredding partitioned batch"
        );

        let parts = records
            .par_chunks(chunk_len)
            .map(|chunk| self.shred_range(chunk, 0..chunk.len()))
            .collect::<Result<Vec<_>>>()?;

        ColumnTableSet::concat(self.tree, parts)
    }

    /// Fails unless `columns` holds exactly the leaf columns of the tree.
    fn check_columns(&self, columns: &ColumnTableSet) -> Result<()> {
        let mut paths = columns.paths();
        for leaf in self.tree.leaves() {
            if paths.next() != Some(leaf.path_str()) {
                return Err(ShredError::ColumnNotFound {
                    path_str: leaf.path_str().to_string(),
                });
            }
        }
        match paths.next() {
            Some(path_str) => Err(ShredError::ColumnNotFound {
                path_str: path_str.to_string(),
            }),
            None => Ok(()),
        }
    }

    fn partition_count(&self, len: usize) -> usize {
        let partitions = match self.options.partitions {
            0 => rayon::current_num_threads(),
            n => n,
        };
        let by_len = len / self.options.min_partition_len.max(1);

        partitions.min(by_len).max(1)
    }

    fn shred_record_unchecked(&self, record: &Value, columns: &mut ColumnTableSet) -> Result<()> {
        let root = self.tree.root();
        if !matches!(record, Value::Map(_)) {
            return Err(mismatch(root, "Map", record));
        }

        let mut stack = vec![WorkItem::Value(Frame {
            node: root.id(),
            value: record,
            definition_level: 0,
            repetition_level: 0,
            element: false,
        })];

        while let Some(item) = stack.pop() {
            match item {
                WorkItem::Value(frame) => self.shred_frame(frame, &mut stack, columns)?,
                WorkItem::MapKey {
                    node,
                    key,
                    definition_level,
                    repetition_level,
                } => {
                    let node = self.tree.node(node);
                    if let NodeKind::Primitive(primitive) = node.kind() {
                        let encoded = PrimitiveEncoder::new(primitive, node.path_str())
                            .encode(&Value::from(key))?;
                        columns.table_mut(node.leaf_range().start).push(
                            Some(encoded),
                            definition_level,
                            repetition_level,
                        );
                    }
                }
                WorkItem::Absent {
                    node,
                    definition_level,
                    repetition_level,
                } => {
                    let node = self.tree.node(node);
                    trace!(
                        path = node.path_str(),
                        definition_level,
                        repetition_level,
                        "absent value"
                    );
                    columns.push_nulls(node.leaf_range(), definition_level, repetition_level);
                }
            }
        }

        Ok(())
    }

    fn shred_frame<'v>(
        &self,
        frame: Frame<'v>,
        stack: &mut Vec<WorkItem<'v>>,
        columns: &mut ColumnTableSet,
    ) -> Result<()> {
        let node = self.tree.node(frame.node);

        if node.is_repeated() && !frame.element {
            return self.shred_repeated(node, frame, stack, columns);
        }

        match node.kind() {
            NodeKind::Primitive(primitive) => self.shred_primitive(node, primitive, frame, columns),
            NodeKind::Struct => self.shred_struct(node, frame, stack),
            NodeKind::Map {
                entries,
                key,
                value,
            } => {
                let Value::Map(pairs) = frame.value else {
                    return Err(mismatch(node, "Map", frame.value));
                };
                if pairs.is_empty() {
                    columns.push_nulls(
                        node.leaf_range(),
                        frame.definition_level,
                        frame.repetition_level,
                    );
                    return Ok(());
                }

                let max_repetition_level = self.tree.node(*entries).max_repetition_level();
                let value_node = self.tree.node(*value);
                let definition_level = frame.definition_level + 1;

                for (i, (k, v)) in pairs.iter().enumerate().rev() {
                    let repetition_level = if i == 0 {
                        frame.repetition_level
                    } else {
                        max_repetition_level
                    };

                    stack.push(self.nested_item(value_node, v, definition_level, repetition_level));
                    stack.push(WorkItem::MapKey {
                        node: *key,
                        key: k,
                        definition_level,
                        repetition_level,
                    });
                }
                Ok(())
            }
            NodeKind::List { elements, element } => {
                let Value::List(items) = frame.value else {
                    return Err(mismatch(node, "List", frame.value));
                };
                if items.is_empty() {
                    columns.push_nulls(
                        node.leaf_range(),
                        frame.definition_level,
                        frame.repetition_level,
                    );
                    return Ok(());
                }

                let max_repetition_level = self.tree.node(*elements).max_repetition_level();
                let element_node = self.tree.node(*element);
                let definition_level = frame.definition_level + 1;

                for (i, item) in items.iter().enumerate().rev() {
                    let repetition_level = if i == 0 {
                        frame.repetition_level
                    } else {
                        max_repetition_level
                    };
                    stack.push(self.nested_item(
                        element_node,
                        item,
                        definition_level,
                        repetition_level,
                    ));
                }
                Ok(())
            }
        }
    }

    /// Work item for a map value or list element. A null is an absent value
    /// when the node is optional. Otherwise it is shredded, and rejected by
    /// the node it reaches.
    fn nested_item<'v>(
        &self,
        node: &SchemaNode,
        value: &'v Value,
        definition_level: DefinitionLevel,
        repetition_level: RepetitionLevel,
    ) -> WorkItem<'v> {
        if value.is_null() && node.is_optional() {
            WorkItem::Absent {
                node: node.id(),
                definition_level,
                repetition_level,
            }
        } else {
            WorkItem::Value(Frame {
                node: node.id(),
                value,
                definition_level: definition_level + DefinitionLevel::from(node.is_optional()),
                repetition_level,
                element: false,
            })
        }
    }

    /// Expands a bare repeated field into one frame per element.
    fn shred_repeated<'v>(
        &self,
        node: &SchemaNode,
        frame: Frame<'v>,
        stack: &mut Vec<WorkItem<'v>>,
        columns: &mut ColumnTableSet,
    ) -> Result<()> {
        let Value::List(items) = frame.value else {
            return Err(mismatch(node, "List", frame.value));
        };
        if items.is_empty() {
            columns.push_nulls(
                node.leaf_range(),
                frame.definition_level,
                frame.repetition_level,
            );
            return Ok(());
        }

        for (i, item) in items.iter().enumerate().rev() {
            let repetition_level = if i == 0 {
                frame.repetition_level
            } else {
                node.max_repetition_level()
            };
            stack.push(WorkItem::Value(Frame {
                node: node.id(),
                value: item,
                definition_level: frame.definition_level + 1,
                repetition_level,
                element: true,
            }));
        }

        Ok(())
    }

    fn shred_struct<'v>(
        &self,
        node: &SchemaNode,
        frame: Frame<'v>,
        stack: &mut Vec<WorkItem<'v>>,
    ) -> Result<()> {
        let Value::Map(entries) = frame.value else {
            return Err(mismatch(node, "Map", frame.value));
        };

        let children = node.children();
        let mut slots: Vec<Option<&'v Value>> = vec![None; children.len()];

        for (key, value) in entries {
            let name = self.resolver.resolve(key);
            let position = children
                .iter()
                .position(|id| self.tree.node(*id).name() == name);

            match position {
                Some(position) => {
                    slots[position].get_or_insert(value);
                }
                None => match self.options.unknown_fields {
                    UnknownFieldPolicy::Ignore => {
                        trace!(path = %node.path(), key = key.as_str(), "dropped unknown field");
                    }
                    UnknownFieldPolicy::Reject => {
                        return Err(ShredError::StructContainsUndefinedProperty {
                            undefined_property_name: key.clone(),
                            path_str: node.path().to_string(),
                        });
                    }
                },
            }
        }

        for (id, slot) in children.iter().zip(slots).rev() {
            let child = self.tree.node(*id);
            let item = match slot {
                Some(value) if !value.is_null() => WorkItem::Value(Frame {
                    node: *id,
                    value,
                    definition_level: frame.definition_level
                        + DefinitionLevel::from(child.is_optional()),
                    repetition_level: frame.repetition_level,
                    element: false,
                }),
                _ => WorkItem::Absent {
                    node: *id,
                    definition_level: frame.definition_level,
                    repetition_level: frame.repetition_level,
                },
            };
            stack.push(item);
        }

        Ok(())
    }

    fn shred_primitive(
        &self,
        node: &SchemaNode,
        primitive: &PrimitiveType,
        frame: Frame<'_>,
        columns: &mut ColumnTableSet,
    ) -> Result<()> {
        match frame.value {
            Value::Map(_) => Err(mismatch(node, primitive.type_label(), frame.value)),
            // Only a byte array holds a list, as a single blob
            Value::List(_) if !primitive.physical().is_byte_array() => {
                Err(mismatch(node, primitive.type_label(), frame.value))
            }
            value => {
                let encoded = PrimitiveEncoder::new(primitive, node.path_str()).encode(value)?;
                columns.table_mut(node.leaf_range().start).push(
                    Some(encoded),
                    frame.definition_level,
                    frame.repetition_level,
                );
                Ok(())
            }
        }
    }
}

fn mismatch(node: &SchemaNode, expected: impl Into<String>, found: &Value) -> ShredError {
    ShredError::mismatch(node.path().to_string(), expected, found.type_label())
}
