//! Shared test helper functions for constructing test fixtures.
//!
//! Compiled only in test builds; provides common constructors for [`Node`],
//! [`Edge`], and [`GraphSnapshot`] used across unit test modules.
//!
//! Integration tests in `crates/kgaudit-core/tests/` define their own local
//! helpers because they link against the non-test library build where this
//! module is not available.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::enums::{EdgeType, EdgeTypeTag, NodeType, NodeTypeTag};
use crate::snapshot::{Edge, GraphSnapshot, Node, PropertyMap};

/// Creates a node of the given known type with no properties.
pub fn node(id: &str, node_type: NodeType) -> Node {
    Node {
        id: id.to_owned(),
        node_type: NodeTypeTag::Known(node_type),
        properties: BTreeMap::new(),
    }
}

/// Creates a node with the given properties.
pub fn node_with(id: &str, node_type: NodeType, props: &[(&str, Value)]) -> Node {
    Node {
        id: id.to_owned(),
        node_type: NodeTypeTag::Known(node_type),
        properties: props
            .iter()
            .map(|(k, v)| ((*k).to_owned(), v.clone()))
            .collect(),
    }
}

/// Creates a fully-populated Page node that passes schema validation.
pub fn page(id: &str) -> Node {
    node_with(
        id,
        NodeType::Page,
        &[
            ("url", Value::String(format!("https://example.com/{id}"))),
            ("title", Value::String(format!("Title of {id}"))),
        ],
    )
}

/// Creates a fully-populated Section node that passes schema validation.
pub fn section(id: &str, page_id: &str, order: u64) -> Node {
    node_with(
        id,
        NodeType::Section,
        &[
            ("page_id", Value::String(page_id.to_owned())),
            ("order", Value::from(order)),
        ],
    )
}

/// Creates a fully-populated ContentItem node that passes schema validation.
pub fn content_item(id: &str, hash: &str) -> Node {
    node_with(
        id,
        NodeType::ContentItem,
        &[
            ("hash", Value::String(hash.to_owned())),
            ("text", Value::String(format!("text of {id}"))),
        ],
    )
}

/// Creates an edge of the given known type with no properties.
pub fn edge(source: &str, target: &str, edge_type: EdgeType) -> Edge {
    Edge {
        source_id: source.to_owned(),
        target_id: target.to_owned(),
        edge_type: EdgeTypeTag::Known(edge_type),
        properties: BTreeMap::new(),
    }
}

/// Creates an edge with the given properties.
pub fn edge_with(
    source: &str,
    target: &str,
    edge_type: EdgeType,
    props: &[(&str, Value)],
) -> Edge {
    Edge {
        source_id: source.to_owned(),
        target_id: target.to_owned(),
        edge_type: EdgeTypeTag::Known(edge_type),
        properties: props
            .iter()
            .map(|(k, v)| ((*k).to_owned(), v.clone()))
            .collect(),
    }
}

/// Creates a CONTAINS edge carrying the required `order` property.
pub fn contains(source: &str, target: &str, order: u64) -> Edge {
    edge_with(source, target, EdgeType::Contains, &[("order", Value::from(order))])
}

/// Assembles a snapshot from node and edge lists.
pub fn snapshot(nodes: Vec<Node>, edges: Vec<Edge>) -> GraphSnapshot {
    GraphSnapshot { nodes, edges }
}

/// Returns an empty property map.
pub fn no_props() -> PropertyMap {
    BTreeMap::new()
}
