/// In-memory graph built from a [`GraphSnapshot`] using `petgraph`.
///
/// Wraps a `StableDiGraph` with typed node and edge weights plus an
/// `id → NodeIndex` map for O(1) lookup. Construction is infallible: the
/// snapshot is untrusted input, so conditions that would be build errors in a
/// trusted pipeline (duplicate node ids, unresolvable edge endpoints) are
/// recorded on the side and surfaced later as validation issues. Edges with a
/// missing endpoint are excluded from the petgraph structure; quality metrics
/// therefore run over the resolved subgraph.
///
/// # Two-pass construction
///
/// 1. **Node pass** — inserts nodes and records the id mapping; a repeated id
///    keeps the first occurrence and logs the duplicate.
/// 2. **Edge pass** — resolves `source_id`/`target_id`; unresolved endpoints
///    are logged as [`DanglingRef`] entries with the edge's snapshot index.
use std::collections::{BTreeSet, HashMap};

use petgraph::Direction;
use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use petgraph::visit::EdgeRef;

use crate::enums::{EdgeTypeTag, NodeTypeTag};
use crate::snapshot::GraphSnapshot;

/// Weight stored inline on each petgraph node.
///
/// Kept small for cache-friendly traversal; full property data is reached via
/// `data_index` into the originating snapshot's node vector.
#[derive(Debug, Clone)]
pub struct NodeWeight {
    /// Graph-local identifier copied from the snapshot node's `id` field.
    pub local_id: String,
    /// Node type tag.
    pub node_type: NodeTypeTag,
    /// Index into `GraphSnapshot::nodes` for the full node.
    pub data_index: usize,
}

/// Weight stored inline on each petgraph edge.
#[derive(Debug, Clone)]
pub struct EdgeWeight {
    /// Edge type tag.
    pub edge_type: EdgeTypeTag,
    /// Index into `GraphSnapshot::edges` for the full edge.
    pub data_index: usize,
}

/// Which endpoint of an edge failed to resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// The edge's `source_id`.
    Source,
    /// The edge's `target_id`.
    Target,
}

impl Endpoint {
    /// Returns the field name of this endpoint.
    pub fn as_str(self) -> &'static str {
        match self {
            Endpoint::Source => "source",
            Endpoint::Target => "target",
        }
    }
}

/// An edge endpoint that did not resolve to any node in the snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DanglingRef {
    /// Index of the offending edge in `GraphSnapshot::edges`.
    pub edge_index: usize,
    /// Which endpoint is missing.
    pub endpoint: Endpoint,
    /// The node id that could not be resolved.
    pub missing_id: String,
}

/// A directed labeled property multigraph built from a [`GraphSnapshot`].
#[derive(Debug)]
pub struct ContentGraph {
    graph: StableDiGraph<NodeWeight, EdgeWeight>,
    id_to_index: HashMap<String, NodeIndex>,
    dangling: Vec<DanglingRef>,
    duplicate_ids: Vec<String>,
}

impl ContentGraph {
    /// Returns the number of resolved nodes in the graph.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Returns the number of resolved edges in the graph.
    ///
    /// Edges with a missing endpoint are excluded; see [`ContentGraph::dangling`].
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Looks up the [`NodeIndex`] for a graph-local node id.
    pub fn node_index(&self, id: &str) -> Option<NodeIndex> {
        self.id_to_index.get(id).copied()
    }

    /// Returns the [`NodeWeight`] for the given index, if present.
    pub fn node_weight(&self, idx: NodeIndex) -> Option<&NodeWeight> {
        self.graph.node_weight(idx)
    }

    /// Returns a reference to the underlying [`StableDiGraph`] for traversal.
    pub fn graph(&self) -> &StableDiGraph<NodeWeight, EdgeWeight> {
        &self.graph
    }

    /// Edge endpoints that did not resolve, in snapshot edge order.
    pub fn dangling(&self) -> &[DanglingRef] {
        &self.dangling
    }

    /// Node ids that appeared more than once, in snapshot node order.
    pub fn duplicate_ids(&self) -> &[String] {
        &self.duplicate_ids
    }

    /// Total degree (in + out, all edge types) of the node at `idx`.
    pub fn total_degree(&self, idx: NodeIndex) -> usize {
        self.graph.edges_directed(idx, Direction::Outgoing).count()
            + self.graph.edges_directed(idx, Direction::Incoming).count()
    }

    /// Distinct neighbors of `idx` in the undirected projection, excluding
    /// `idx` itself. Parallel edges collapse to one neighbor entry.
    pub fn undirected_neighbors(&self, idx: NodeIndex) -> BTreeSet<NodeIndex> {
        let mut out: BTreeSet<NodeIndex> = BTreeSet::new();
        for e in self.graph.edges_directed(idx, Direction::Outgoing) {
            if e.target() != idx {
                out.insert(e.target());
            }
        }
        for e in self.graph.edges_directed(idx, Direction::Incoming) {
            if e.source() != idx {
                out.insert(e.source());
            }
        }
        out
    }

    /// Successor node indices of `idx` via edges of the given type.
    ///
    /// Returned sorted so traversal order is deterministic.
    pub fn typed_successors(&self, idx: NodeIndex, edge_type: &EdgeTypeTag) -> Vec<NodeIndex> {
        let mut out: Vec<NodeIndex> = self
            .graph
            .edges_directed(idx, Direction::Outgoing)
            .filter(|e| &e.weight().edge_type == edge_type)
            .map(|e| e.target())
            .collect();
        out.sort_unstable();
        out
    }

    /// Count of in-edges of the given type at `idx`.
    pub fn typed_in_degree(&self, idx: NodeIndex, edge_type: &EdgeTypeTag) -> usize {
        self.graph
            .edges_directed(idx, Direction::Incoming)
            .filter(|e| &e.weight().edge_type == edge_type)
            .count()
    }

    /// Node indices in insertion (snapshot) order.
    pub fn node_indices(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.node_indices()
    }
}

/// Constructs a [`ContentGraph`] from a deserialized snapshot. O(N + E).
pub fn build_graph(snapshot: &GraphSnapshot) -> ContentGraph {
    let mut graph: StableDiGraph<NodeWeight, EdgeWeight> =
        StableDiGraph::with_capacity(snapshot.nodes.len(), snapshot.edges.len());
    let mut id_to_index: HashMap<String, NodeIndex> =
        HashMap::with_capacity(snapshot.nodes.len());
    let mut duplicate_ids: Vec<String> = Vec::new();
    let mut dangling: Vec<DanglingRef> = Vec::new();

    for (data_index, node) in snapshot.nodes.iter().enumerate() {
        let local_id = node.id.to_string();
        if id_to_index.contains_key(&local_id) {
            duplicate_ids.push(local_id);
            continue;
        }
        let idx = graph.add_node(NodeWeight {
            local_id: local_id.clone(),
            node_type: node.node_type.clone(),
            data_index,
        });
        id_to_index.insert(local_id, idx);
    }

    for (data_index, edge) in snapshot.edges.iter().enumerate() {
        let source = id_to_index.get(edge.source_id.as_str()).copied();
        let target = id_to_index.get(edge.target_id.as_str()).copied();

        if source.is_none() {
            dangling.push(DanglingRef {
                edge_index: data_index,
                endpoint: Endpoint::Source,
                missing_id: edge.source_id.to_string(),
            });
        }
        if target.is_none() {
            dangling.push(DanglingRef {
                edge_index: data_index,
                endpoint: Endpoint::Target,
                missing_id: edge.target_id.to_string(),
            });
        }

        if let (Some(s), Some(t)) = (source, target) {
            graph.add_edge(
                s,
                t,
                EdgeWeight {
                    edge_type: edge.edge_type.clone(),
                    data_index,
                },
            );
        }
    }

    ContentGraph {
        graph,
        id_to_index,
        dangling,
        duplicate_ids,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
