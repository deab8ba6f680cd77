/// Serialized graph snapshot: the engine's immutable input.
///
/// [`GraphSnapshot`] is the root type for the JSON document produced by the
/// upstream graph-construction stage. Once deserialized it is read-only for
/// the whole run; no component in this crate ever mutates it.
///
/// Deserialization is deliberately lenient about per-entity content: ids are
/// raw strings and an absent `type` key becomes an unknown tag, so a single
/// malformed node or edge never aborts the load. The schema validator owns
/// rejection (id shape via [`crate::newtypes::NodeId`], type strings via the
/// tag enums); only a document that is not the expected JSON shape is fatal.
///
/// Property bags are `BTreeMap<String, serde_json::Value>` so that
/// re-serialization has stable key order.
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::enums::{EdgeType, EdgeTypeTag, NodeTypeTag};

/// A string-keyed property bag with deterministic iteration order.
pub type PropertyMap = BTreeMap<String, Value>;

/// A single node in the content graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Unique identifier for this node within the snapshot. Shape is checked
    /// by the schema validator, not here.
    pub id: String,

    /// Node type (known or unrecognized string); `Unknown("")` when absent.
    #[serde(rename = "type", default)]
    pub node_type: NodeTypeTag,

    /// Arbitrary scalar/array properties attached by the upstream stages.
    #[serde(default)]
    pub properties: PropertyMap,
}

impl Node {
    /// Returns the property value for `key`, if present.
    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    /// Returns the property as a string slice if present and a string.
    pub fn property_str(&self, key: &str) -> Option<&str> {
        self.properties.get(key).and_then(Value::as_str)
    }
}

/// A directed edge between two nodes in the content graph.
///
/// Multiple edges between the same pair with different types are permitted
/// (multigraph). Duplicate identical `(source, target, type)` edges are a
/// validation warning, never silently merged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    /// Id of the source (tail) node.
    pub source_id: String,

    /// Id of the target (head) node.
    pub target_id: String,

    /// Edge type (known or unrecognized string); `Unknown("")` when absent.
    #[serde(rename = "type", default)]
    pub edge_type: EdgeTypeTag,

    /// Arbitrary scalar properties attached by the upstream stages.
    #[serde(default)]
    pub properties: PropertyMap,
}

impl Edge {
    /// Returns the property value for `key`, if present.
    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    /// Returns `true` if this edge's type is in the hierarchical set.
    pub fn is_hierarchical(&self) -> bool {
        self.edge_type.known().is_some_and(EdgeType::is_hierarchical)
    }

    /// A stable human-readable reference for this edge, used in issue output.
    pub fn describe(&self) -> String {
        format!(
            "{} -> {} [{}]",
            self.source_id,
            self.target_id,
            self.edge_type.as_str()
        )
    }
}

/// The top-level graph snapshot document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    /// All graph nodes, in upstream emission order.
    pub nodes: Vec<Node>,

    /// All graph edges, in upstream emission order.
    pub edges: Vec<Edge>,
}

impl GraphSnapshot {
    /// Returns the number of nodes in the snapshot.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the number of edges in the snapshot.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
