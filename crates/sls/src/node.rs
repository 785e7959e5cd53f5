//! Parse-time node model.
//!
//! Nodes sit between raw parser events and final [`Value`]s: each one
//! carries its shape plus the aggregation mark resolved from its tag.
//! Nodes are owned by the loader and never escape it.

use crate::error::Location;
use crate::value::Value;

#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub kind: NodeKind,
    /// Set when the node carried the aggregation directive.
    pub aggregate: bool,
    pub location: Location,
}

#[derive(Debug, Clone)]
pub(crate) enum NodeKind {
    /// Scalars are typed eagerly; only the tag handling is deferred.
    Scalar(Value),
    Sequence(Vec<Node>),
    /// Keys are coerced to strings when the entry completes.
    Mapping(Vec<(String, Node)>),
}

impl Node {
    pub fn new(kind: NodeKind, aggregate: bool, location: Location) -> Self {
        Node {
            kind,
            aggregate,
            location,
        }
    }

    /// True if this node or any descendant carries the directive.
    pub fn contains_aggregate(&self) -> bool {
        self.aggregate
            || match &self.kind {
                NodeKind::Scalar(_) => false,
                NodeKind::Sequence(items) => items.iter().any(Node::contains_aggregate),
                NodeKind::Mapping(entries) => {
                    entries.iter().any(|(_, child)| child.contains_aggregate())
                }
            }
    }
}
