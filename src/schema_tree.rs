//! An immutable, indexed view of a [`Schema`] used while shredding.
//!
//! The tree expands map and list fields into the physical layout stored in
//! columns:
//!
//! ```text
//! optional group attrs (MAP) {        optional group tags (LIST) {
//!   repeated group key_value {          repeated group list {
//!     required binary key (UTF8);         optional binary element (UTF8);
//!     optional int64 value;             }
//!   }                                 }
//! }
//! ```
//!
//! Every node carries its dotted path, and the maximum definition and
//! repetition levels reachable at that path. Leaves are numbered in
//! depth-first order, so the leaves beneath any node form a contiguous range.

use crate::common::{DefinitionLevel, RepetitionLevel};
use crate::error::{Result, ShredError};
use crate::field::{DataType, Field, LogicalType, PhysicalType, PrimitiveType, Repetition};
use crate::path_vector::PathVector;
use crate::schema::Schema;
use std::collections::{HashMap, HashSet};
use std::ops::Range;

/// Index of a node in the [`SchemaTree`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Structural kind of a schema node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NodeKind {
    Primitive(PrimitiveType),
    Struct,
    Map {
        entries: NodeId,
        key: NodeId,
        value: NodeId,
    },
    List {
        elements: NodeId,
        element: NodeId,
    },
}

impl NodeKind {
    pub fn type_label(&self) -> String {
        match self {
            NodeKind::Primitive(primitive) => primitive.type_label(),
            NodeKind::Struct => "Struct".into(),
            NodeKind::Map { .. } => "Map".into(),
            NodeKind::List { .. } => "List".into(),
        }
    }
}

/// How a node is reached from its parent in a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeRole {
    /// The top-level message.
    Root,
    /// A named member of a struct.
    Field,
    /// The repeated `key_value` group of a map.
    MapEntries,
    MapKey,
    MapValue,
    /// The repeated `list` group of a list.
    ListElements,
    ListElement,
}

#[derive(Debug)]
pub struct SchemaNode {
    id: NodeId,
    name: String,
    path: PathVector,
    path_str: String,
    repetition: Repetition,
    kind: NodeKind,
    role: NodeRole,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    max_definition_level: DefinitionLevel,
    max_repetition_level: RepetitionLevel,
    leaves: Range<usize>,
}

impl SchemaNode {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &PathVector {
        &self.path
    }

    /// Dotted path of the node, the root is an empty string.
    pub fn path_str(&self) -> &str {
        &self.path_str
    }

    pub fn repetition(&self) -> Repetition {
        self.repetition
    }

    pub fn is_optional(&self) -> bool {
        self.repetition == Repetition::Optional
    }

    pub fn is_repeated(&self) -> bool {
        self.repetition == Repetition::Repeated
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn role(&self) -> NodeRole {
        self.role
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Count of optional and repeated nodes from the root to this node,
    /// inclusive.
    pub fn max_definition_level(&self) -> DefinitionLevel {
        self.max_definition_level
    }

    /// Count of repeated nodes from the root to this node, inclusive.
    pub fn max_repetition_level(&self) -> RepetitionLevel {
        self.max_repetition_level
    }

    /// Ordinals of the leaves at or beneath this node.
    pub fn leaf_range(&self) -> Range<usize> {
        self.leaves.clone()
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Primitive(_))
    }

    pub fn primitive_type(&self) -> Option<&PrimitiveType> {
        match &self.kind {
            NodeKind::Primitive(primitive) => Some(primitive),
            _ => None,
        }
    }
}

/// Immutable tree built once from a [`Schema`]. It is never mutated after
/// construction and can be shared freely across threads.
#[derive(Debug)]
pub struct SchemaTree {
    name: String,
    nodes: Vec<SchemaNode>,
    path_index: HashMap<String, NodeId>,
    leaves: Vec<NodeId>,
}

impl SchemaTree {
    /// Builds the tree, failing with [`ShredError::MalformedSchema`] if the
    /// schema definition is inconsistent.
    pub fn try_new(schema: &Schema) -> Result<Self> {
        TreeBuilder::default().build(schema)
    }

    /// Name of the top-level message.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn root(&self) -> &SchemaNode {
        &self.nodes[0]
    }

    pub fn node(&self, id: NodeId) -> &SchemaNode {
        &self.nodes[id.0]
    }

    /// Returns all nodes in depth-first order, starting with the root.
    pub fn nodes(&self) -> &[SchemaNode] {
        &self.nodes
    }

    /// Looks up a node by its dotted path.
    pub fn lookup(&self, path: &str) -> Option<&SchemaNode> {
        self.path_index.get(path).map(|id| self.node(*id))
    }

    pub fn max_repetition_level(&self, path: &str) -> Option<RepetitionLevel> {
        self.lookup(path).map(SchemaNode::max_repetition_level)
    }

    pub fn max_definition_level(&self, path: &str) -> Option<DefinitionLevel> {
        self.lookup(path).map(SchemaNode::max_definition_level)
    }

    /// Returns the child of `parent` named `name`.
    pub fn child(&self, parent: NodeId, name: &str) -> Option<&SchemaNode> {
        self.node(parent)
            .children
            .iter()
            .map(|id| self.node(*id))
            .find(|child| child.name == name)
    }

    pub fn children(&self, parent: NodeId) -> impl DoubleEndedIterator<Item = &SchemaNode> {
        self.node(parent).children.iter().map(|id| self.node(*id))
    }

    /// Leaf nodes in column order.
    pub fn leaves(&self) -> impl ExactSizeIterator<Item = &SchemaNode> {
        self.leaves.iter().map(|id| self.node(*id))
    }

    pub fn leaf_count(&self) -> usize {
        self.leaves.len()
    }

    /// Leaf nodes at or beneath `id`.
    pub fn leaves_under(&self, id: NodeId) -> impl ExactSizeIterator<Item = &SchemaNode> {
        self.leaves[self.node(id).leaf_range()]
            .iter()
            .map(|id| self.node(*id))
    }

    /// Nodes from the first node below the root down to `id`, inclusive.
    pub fn lineage(&self, id: NodeId) -> Vec<&SchemaNode> {
        let mut lineage = vec![];
        let mut current = Some(id);
        while let Some(id) = current {
            let node = self.node(id);
            if node.role == NodeRole::Root {
                break;
            }
            lineage.push(node);
            current = node.parent;
        }
        lineage.reverse();
        lineage
    }
}

#[derive(Debug)]
enum DraftKind {
    Primitive(PrimitiveType),
    Struct,
    Map,
    List,
}

#[derive(Debug)]
struct NodeDraft {
    name: String,
    path: PathVector,
    repetition: Repetition,
    kind: DraftKind,
    role: NodeRole,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    max_definition_level: DefinitionLevel,
    max_repetition_level: RepetitionLevel,
    leaf_ordinal: Option<usize>,
}

/// Work item for the depth-first construction of the tree.
enum Pending<'a> {
    Field {
        field: &'a Field,
        parent: NodeId,
        role: NodeRole,
    },
    MapEntries {
        key: &'a Field,
        value: &'a Field,
        parent: NodeId,
    },
    ListElements {
        element: &'a Field,
        parent: NodeId,
    },
}

#[derive(Default)]
struct TreeBuilder {
    drafts: Vec<NodeDraft>,
    leaves: Vec<NodeId>,
}

impl TreeBuilder {
    fn build(mut self, schema: &Schema) -> Result<SchemaTree> {
        self.drafts.push(NodeDraft {
            name: schema.name().to_string(),
            path: PathVector::root(),
            repetition: Repetition::Required,
            kind: DraftKind::Struct,
            role: NodeRole::Root,
            parent: None,
            children: vec![],
            max_definition_level: 0,
            max_repetition_level: 0,
            leaf_ordinal: None,
        });

        let root = NodeId(0);
        check_sibling_names(&PathVector::root(), schema.fields())?;

        // Children are pushed in reverse so they are created in declared
        // order, which keeps the leaves of every subtree contiguous.
        let mut stack: Vec<Pending> = schema
            .fields()
            .iter()
            .rev()
            .map(|field| Pending::Field {
                field,
                parent: root,
                role: NodeRole::Field,
            })
            .collect();

        while let Some(pending) = stack.pop() {
            match pending {
                Pending::Field {
                    field,
                    parent,
                    role,
                } => {
                    let id = self.push_field(field, parent, role)?;
                    match field.data_type() {
                        DataType::Primitive(_) => {}
                        DataType::Struct(fields) => {
                            stack.extend(fields.iter().rev().map(|field| Pending::Field {
                                field,
                                parent: id,
                                role: NodeRole::Field,
                            }));
                        }
                        DataType::Map { key, value } => stack.push(Pending::MapEntries {
                            key,
                            value,
                            parent: id,
                        }),
                        DataType::List(element) => stack.push(Pending::ListElements {
                            element,
                            parent: id,
                        }),
                    }
                }
                Pending::MapEntries { key, value, parent } => {
                    let id = self.push_wrapper("key_value", parent, NodeRole::MapEntries)?;
                    stack.push(Pending::Field {
                        field: value,
                        parent: id,
                        role: NodeRole::MapValue,
                    });
                    stack.push(Pending::Field {
                        field: key,
                        parent: id,
                        role: NodeRole::MapKey,
                    });
                }
                Pending::ListElements { element, parent } => {
                    let id = self.push_wrapper("list", parent, NodeRole::ListElements)?;
                    stack.push(Pending::Field {
                        field: element,
                        parent: id,
                        role: NodeRole::ListElement,
                    });
                }
            }
        }

        Ok(self.finish(schema.name()))
    }

    fn push_node(
        &mut self,
        name: &str,
        repetition: Repetition,
        kind: DraftKind,
        role: NodeRole,
        parent: NodeId,
    ) -> Result<NodeId> {
        let id = NodeId(self.drafts.len());
        let parent_draft = &self.drafts[parent.0];
        let path = parent_draft.path.append_name(name);

        let max_definition_level = match repetition {
            Repetition::Required => Some(parent_draft.max_definition_level),
            Repetition::Optional | Repetition::Repeated => {
                parent_draft.max_definition_level.checked_add(1)
            }
        };
        let max_repetition_level = match repetition {
            Repetition::Repeated => parent_draft.max_repetition_level.checked_add(1),
            Repetition::Required | Repetition::Optional => {
                Some(parent_draft.max_repetition_level)
            }
        };
        let (Some(max_definition_level), Some(max_repetition_level)) =
            (max_definition_level, max_repetition_level)
        else {
            return Err(ShredError::malformed(
                path.to_string(),
                "nesting exceeds the maximum definition or repetition level",
            ));
        };

        let leaf_ordinal = match kind {
            DraftKind::Primitive(_) => {
                self.leaves.push(id);
                Some(self.leaves.len() - 1)
            }
            _ => None,
        };

        self.drafts[parent.0].children.push(id);
        self.drafts.push(NodeDraft {
            name: name.to_string(),
            path,
            repetition,
            kind,
            role,
            parent: Some(parent),
            children: vec![],
            max_definition_level,
            max_repetition_level,
            leaf_ordinal,
        });

        Ok(id)
    }

    fn push_wrapper(&mut self, name: &str, parent: NodeId, role: NodeRole) -> Result<NodeId> {
        self.push_node(name, Repetition::Repeated, DraftKind::Struct, role, parent)
    }

    fn push_field(&mut self, field: &Field, parent: NodeId, role: NodeRole) -> Result<NodeId> {
        let path = self.drafts[parent.0].path.append_name(field.name());
        validate_field(&path, field, role)?;

        let kind = match field.data_type() {
            DataType::Primitive(primitive) => DraftKind::Primitive(*primitive),
            DataType::Struct(_) => DraftKind::Struct,
            DataType::Map { .. } => DraftKind::Map,
            DataType::List(_) => DraftKind::List,
        };

        self.push_node(field.name(), field.repetition(), kind, role, parent)
    }

    /// Resolves map and list wrapper ids, and computes the leaf range of
    /// every node. Drafts are in depth-first pre-order, so a reverse pass
    /// sees all descendants of a node before the node itself.
    fn finish(self, name: &str) -> SchemaTree {
        let total_leaves = self.leaves.len();
        let mut ranges = vec![total_leaves..total_leaves; self.drafts.len()];

        for (index, draft) in self.drafts.iter().enumerate().rev() {
            ranges[index] = match draft.leaf_ordinal {
                Some(ordinal) => ordinal..ordinal + 1,
                None => {
                    let start = draft
                        .children
                        .iter()
                        .map(|child| ranges[child.0].start)
                        .min();
                    let end = draft
                        .children
                        .iter()
                        .map(|child| ranges[child.0].end)
                        .max();
                    match (start, end) {
                        (Some(start), Some(end)) => start..end,
                        // Only an empty root has no children
                        _ => 0..0,
                    }
                }
            };
        }

        let kinds = self
            .drafts
            .iter()
            .map(|draft| match draft.kind {
                DraftKind::Primitive(primitive) => NodeKind::Primitive(primitive),
                DraftKind::Struct => NodeKind::Struct,
                DraftKind::Map => {
                    let entries = draft.children[0];
                    let entry_children = &self.drafts[entries.0].children;
                    NodeKind::Map {
                        entries,
                        key: entry_children[0],
                        value: entry_children[1],
                    }
                }
                DraftKind::List => {
                    let elements = draft.children[0];
                    NodeKind::List {
                        elements,
                        element: self.drafts[elements.0].children[0],
                    }
                }
            })
            .collect::<Vec<_>>();

        let nodes = self
            .drafts
            .into_iter()
            .zip(kinds)
            .zip(ranges)
            .enumerate()
            .map(|(index, ((draft, kind), leaves))| SchemaNode {
                id: NodeId(index),
                name: draft.name,
                path_str: draft.path.dotted(),
                path: draft.path,
                repetition: draft.repetition,
                kind,
                role: draft.role,
                parent: draft.parent,
                children: draft.children,
                max_definition_level: draft.max_definition_level,
                max_repetition_level: draft.max_repetition_level,
                leaves,
            })
            .collect::<Vec<_>>();

        let path_index = nodes
            .iter()
            .map(|node| (node.path_str.clone(), node.id))
            .collect();

        SchemaTree {
            name: name.to_string(),
            nodes,
            path_index,
            leaves: self.leaves,
        }
    }
}

fn check_sibling_names(path: &PathVector, fields: &[Field]) -> Result<()> {
    let mut seen = HashSet::new();
    for field in fields {
        if !seen.insert(field.name()) {
            return Err(ShredError::malformed(
                path.to_string(),
                format!("duplicate field name: {}", field.name()),
            ));
        }
    }
    Ok(())
}

fn validate_field(path: &PathVector, field: &Field, role: NodeRole) -> Result<()> {
    let path_str = path.to_string();

    if field.name().is_empty() || field.name().contains('.') {
        return Err(ShredError::malformed(
            path_str,
            format!("invalid field name: {:?}", field.name()),
        ));
    }

    match role {
        NodeRole::MapKey => {
            if !field.is_required() || !field.data_type().is_primitive() {
                return Err(ShredError::malformed(
                    path_str,
                    "map key must be a required primitive",
                ));
            }
        }
        NodeRole::MapValue | NodeRole::ListElement if field.is_repeated() => {
            return Err(ShredError::malformed(
                path_str,
                "map value or list element cannot be repeated",
            ));
        }
        _ => {}
    }

    match field.data_type() {
        DataType::Primitive(primitive) => validate_primitive(&path_str, primitive),
        DataType::Struct(fields) => {
            if fields.is_empty() {
                return Err(ShredError::malformed(path_str, "group has no fields"));
            }
            check_sibling_names(path, fields)
        }
        DataType::Map { .. } | DataType::List(_) if field.is_repeated() => Err(
            ShredError::malformed(path_str, "map or list field cannot be repeated"),
        ),
        DataType::Map { .. } | DataType::List(_) => Ok(()),
    }
}

fn validate_primitive(path_str: &str, primitive: &PrimitiveType) -> Result<()> {
    let physical = primitive.physical();

    if physical == PhysicalType::FixedLenByteArray && !primitive.length().is_some_and(|n| n > 0) {
        return Err(ShredError::malformed(
            path_str,
            "fixed length byte array requires a positive length",
        ));
    }

    let Some(logical) = primitive.logical() else {
        return Ok(());
    };

    if !logical.is_compatible_with(physical) {
        return Err(ShredError::malformed(
            path_str,
            format!("{logical} cannot annotate {physical}"),
        ));
    }

    match logical {
        LogicalType::Interval if primitive.length() != Some(12) => Err(ShredError::malformed(
            path_str,
            "INTERVAL must be a 12 byte fixed length byte array",
        )),
        LogicalType::Decimal => {
            let precision = primitive.precision().unwrap_or(0);
            let max_precision = primitive.max_decimal_precision();
            if precision == 0 || precision > max_precision {
                Err(ShredError::malformed(
                    path_str,
                    format!(
                        "DECIMAL precision must be in 1..={max_precision} for {}",
                        primitive.physical_label()
                    ),
                ))
            } else if primitive.scale() > precision {
                Err(ShredError::malformed(
                    path_str,
                    "DECIMAL scale cannot exceed precision",
                ))
            } else {
                Ok(())
            }
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{
        integer, optional_group, optional_integer, optional_list, optional_map, optional_string,
        primitive, repeated_group, repeated_integer, repeated_string, string, SchemaBuilder,
    };

    fn leaf_paths(tree: &SchemaTree) -> Vec<&str> {
        tree.leaves().map(SchemaNode::path_str).collect()
    }

    #[test]
    fn test_empty_schema() {
        let tree = SchemaTree::try_new(&SchemaBuilder::new("empty").build()).unwrap();

        assert_eq!(tree.name(), "empty");
        assert_eq!(tree.leaf_count(), 0);
        assert_eq!(tree.root().leaf_range(), 0..0);
        assert!(tree.lookup("").is_some());
    }

    #[test]
    fn test_flat_schema() {
        let schema = SchemaBuilder::new("flat")
            .field(optional_string("name"))
            .field(repeated_string("tags"))
            .build();
        let tree = SchemaTree::try_new(&schema).unwrap();

        assert_eq!(leaf_paths(&tree), vec!["name", "tags"]);
        assert_eq!(tree.max_definition_level("name"), Some(1));
        assert_eq!(tree.max_repetition_level("name"), Some(0));
        assert_eq!(tree.max_definition_level("tags"), Some(1));
        assert_eq!(tree.max_repetition_level("tags"), Some(1));
    }

    #[test]
    fn test_map_and_list_wrappers() {
        let schema = SchemaBuilder::new("wrapped")
            .field(optional_map("attrs", string("key"), optional_integer("value")))
            .field(optional_list("scores", optional_integer("element")))
            .build();
        let tree = SchemaTree::try_new(&schema).unwrap();

        assert_eq!(
            leaf_paths(&tree),
            vec!["attrs.key_value.key", "attrs.key_value.value", "scores.list.element"]
        );

        assert_eq!(tree.max_definition_level("attrs"), Some(1));
        assert_eq!(tree.max_repetition_level("attrs.key_value"), Some(1));
        assert_eq!(tree.max_definition_level("attrs.key_value.key"), Some(2));
        assert_eq!(tree.max_definition_level("attrs.key_value.value"), Some(3));
        assert_eq!(tree.max_definition_level("scores.list.element"), Some(3));
        assert_eq!(tree.max_repetition_level("scores.list.element"), Some(1));

        let attrs = tree.lookup("attrs").unwrap();
        match attrs.kind() {
            NodeKind::Map { entries, key, value } => {
                assert_eq!(tree.node(*entries).path_str(), "attrs.key_value");
                assert_eq!(tree.node(*key).role(), NodeRole::MapKey);
                assert_eq!(tree.node(*value).role(), NodeRole::MapValue);
            }
            other => panic!("Expected Map node, found: {:?}", other),
        }
        assert_eq!(attrs.leaf_range(), 0..2);
    }

    /// Levels of the document schema from the Dremel paper.
    #[test]
    fn test_document_levels() {
        let schema = SchemaBuilder::new("Document")
            .field(integer("DocId"))
            .field(optional_group(
                "Links",
                vec![repeated_integer("Backward"), repeated_integer("Forward")],
            ))
            .field(repeated_group(
                "Name",
                vec![
                    repeated_group("Language", vec![string("Code"), optional_string("Country")]),
                    optional_string("Url"),
                ],
            ))
            .build();
        let tree = SchemaTree::try_new(&schema).unwrap();

        let levels = tree
            .leaves()
            .map(|leaf| {
                (
                    leaf.path_str(),
                    leaf.max_definition_level(),
                    leaf.max_repetition_level(),
                )
            })
            .collect::<Vec<_>>();

        assert_eq!(
            levels,
            vec![
                ("DocId", 0, 0),
                ("Links.Backward", 2, 1),
                ("Links.Forward", 2, 1),
                ("Name.Language.Code", 2, 2),
                ("Name.Language.Country", 3, 2),
                ("Name.Url", 2, 1),
            ]
        );

        let name = tree.lookup("Name").unwrap();
        assert_eq!(name.leaf_range(), 3..6);
        let under_name = tree
            .leaves_under(name.id())
            .map(SchemaNode::path_str)
            .collect::<Vec<_>>();
        assert_eq!(
            under_name,
            vec!["Name.Language.Code", "Name.Language.Country", "Name.Url"]
        );

        let lineage = tree
            .lineage(tree.lookup("Name.Language.Country").unwrap().id())
            .into_iter()
            .map(SchemaNode::name)
            .collect::<Vec<_>>();
        assert_eq!(lineage, vec!["Name", "Language", "Country"]);
    }

    fn assert_malformed(schema: Schema, expected_path: &str) {
        match SchemaTree::try_new(&schema) {
            Err(ShredError::MalformedSchema { path_str, .. }) => {
                assert_eq!(path_str, expected_path)
            }
            other => panic!("Expected malformed schema error, found: {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_field_names() {
        let schema = SchemaBuilder::new("dup")
            .field(integer("a"))
            .field(optional_string("a"))
            .build();
        assert_malformed(schema, "<root>");
    }

    #[test]
    fn test_empty_group() {
        let schema = SchemaBuilder::new("empty_group")
            .field(optional_group("g", vec![]))
            .build();
        assert_malformed(schema, "g");
    }

    #[test]
    fn test_optional_map_key() {
        let schema = SchemaBuilder::new("bad_map")
            .field(optional_map("m", optional_string("key"), integer("value")))
            .build();
        assert_malformed(schema, "m.key_value.key");
    }

    #[test]
    fn test_repeated_list_element() {
        let schema = SchemaBuilder::new("bad_list")
            .field(optional_list("l", repeated_integer("element")))
            .build();
        assert_malformed(schema, "l.list.element");
    }

    #[test]
    fn test_invalid_primitive_annotations() {
        let utf8_int = PrimitiveType::new(PhysicalType::Int32).with_logical(LogicalType::Utf8);
        let schema = SchemaBuilder::new("bad")
            .field(primitive("s", utf8_int, Repetition::Required))
            .build();
        assert_malformed(schema, "s");

        let no_length = PrimitiveType::new(PhysicalType::FixedLenByteArray);
        let schema = SchemaBuilder::new("bad")
            .field(primitive("f", no_length, Repetition::Required))
            .build();
        assert_malformed(schema, "f");

        let wide = PrimitiveType::decimal(PhysicalType::Int32, 12, 2);
        let schema = SchemaBuilder::new("bad")
            .field(primitive("d", wide, Repetition::Required))
            .build();
        assert_malformed(schema, "d");
    }

    #[test]
    fn test_decimal_precision_fits_fixed_length() {
        let narrow =
            PrimitiveType::decimal(PhysicalType::FixedLenByteArray, 38, 0).with_length(4);
        let schema = SchemaBuilder::new("bad")
            .field(primitive("d", narrow, Repetition::Required))
            .build();
        assert_malformed(schema, "d");

        let overflow =
            PrimitiveType::decimal(PhysicalType::FixedLenByteArray, 10, 2).with_length(4);
        let schema = SchemaBuilder::new("bad")
            .field(primitive("d", overflow, Repetition::Required))
            .build();
        assert_malformed(schema, "d");

        let exact = PrimitiveType::decimal(PhysicalType::FixedLenByteArray, 9, 2).with_length(4);
        let schema = SchemaBuilder::new("ok")
            .field(primitive("d", exact, Repetition::Required))
            .build();
        assert!(SchemaTree::try_new(&schema).is_ok());
    }

    #[test]
    fn test_dotted_field_name() {
        let schema = SchemaBuilder::new("bad").field(integer("a.b")).build();
        assert_malformed(schema, "a.b");
    }
}
