/// Referential integrity checks: orphans, dangling edges, hierarchy cycles,
/// and multi-parent violations.
///
/// All checks are read-only over the snapshot and the built graph. Degree for
/// orphan detection is computed over the full snapshot edge list, so an edge
/// whose other endpoint is missing still gives its resolvable endpoint a
/// degree; such a node is reported as a dangling-edge problem, not an orphan.
use std::collections::HashMap;

use petgraph::stable_graph::NodeIndex;

use crate::budget::{CheckRun, Deadline};
use crate::enums::{EdgeType, EdgeTypeTag, NodeTypeTag};
use crate::graph::ContentGraph;
use crate::issue::{IssueCategory, IssueRef, Severity, ValidationIssue};
use crate::snapshot::GraphSnapshot;

/// Runs all integrity checks and merges their results.
pub fn check_integrity(
    snapshot: &GraphSnapshot,
    graph: &ContentGraph,
    deadline: &Deadline,
) -> CheckRun {
    let mut run = CheckRun::new();
    run.absorb(detect_dangling_edges(snapshot, graph, deadline));
    run.absorb(detect_orphans(snapshot, graph, deadline));
    run.absorb(detect_cycles(graph, deadline));
    run.absorb(detect_multi_parents(graph, deadline));
    run
}

// ---------------------------------------------------------------------------
// Dangling edges
// ---------------------------------------------------------------------------

/// Reports every edge endpoint that does not resolve to a node.
///
/// One CRITICAL issue per unresolved endpoint; an edge with two missing
/// endpoints yields two issues. One check is counted per snapshot edge.
pub fn detect_dangling_edges(
    snapshot: &GraphSnapshot,
    graph: &ContentGraph,
    deadline: &Deadline,
) -> CheckRun {
    let mut run = CheckRun::new();
    if deadline.expired() {
        run.issues.push(deadline.timeout_issue("dangling-edge detector"));
        return run;
    }
    run.checks = snapshot.edges.len();
    for d in graph.dangling() {
        let Some(edge) = snapshot.edges.get(d.edge_index) else {
            continue;
        };
        run.issues.push(ValidationIssue::new(
            Severity::Critical,
            IssueCategory::DanglingEdge,
            IssueRef::edge(
                edge.source_id.as_str(),
                edge.target_id.as_str(),
                edge.edge_type.as_str(),
            ),
            format!(
                "{} \"{}\" does not resolve to a node",
                d.endpoint.as_str(),
                d.missing_id
            ),
        ));
    }
    run
}

// ---------------------------------------------------------------------------
// Orphans
// ---------------------------------------------------------------------------

/// Reports nodes with total degree zero across all edge types.
///
/// Degree is taken over the full snapshot edge list, dangling edges included.
/// Primary content types (Page, Section, ContentItem, Entity) orphan at
/// ERROR; taxonomy types (Topic, Category, Persona) are often pre-seeded
/// ahead of content, so they orphan at WARNING, as do unknown-typed nodes.
pub fn detect_orphans(
    snapshot: &GraphSnapshot,
    graph: &ContentGraph,
    deadline: &Deadline,
) -> CheckRun {
    let mut run = CheckRun::new();

    let mut degree: HashMap<&str, usize> = HashMap::with_capacity(snapshot.nodes.len());
    for edge in &snapshot.edges {
        *degree.entry(edge.source_id.as_str()).or_insert(0) += 1;
        *degree.entry(edge.target_id.as_str()).or_insert(0) += 1;
    }

    for idx in graph.node_indices() {
        if deadline.expired() {
            run.issues.push(deadline.timeout_issue("orphan detector"));
            return run;
        }
        run.checks += 1;
        let Some(weight) = graph.node_weight(idx) else {
            continue;
        };
        if degree.get(weight.local_id.as_str()).copied().unwrap_or(0) > 0 {
            continue;
        }
        let (severity, noun) = match &weight.node_type {
            NodeTypeTag::Known(t) if t.is_taxonomy() => (Severity::Warning, "taxonomy node"),
            NodeTypeTag::Known(_) => (Severity::Error, "node"),
            NodeTypeTag::Unknown(_) => (Severity::Warning, "unknown-typed node"),
        };
        run.issues.push(ValidationIssue::new(
            severity,
            IssueCategory::Orphan,
            IssueRef::node(weight.local_id.as_str()),
            format!("{noun} has no edges"),
        ));
    }
    run
}

// ---------------------------------------------------------------------------
// Hierarchy cycles
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    White,
    Gray,
    Black,
}

/// Detects cycles in each hierarchical edge-type subgraph.
///
/// Each hierarchical type (CONTAINS, BELONGS_TO, CHILD_OF) is checked in its
/// own subgraph: a Page containing a Section that BELONGS_TO the Page is two
/// acyclic single-type hierarchies, not a cycle. Detection is an iterative
/// three-color DFS; every back edge yields one CRITICAL issue carrying the
/// node chain of the cycle. Roots are visited in node-id order so output is
/// deterministic.
pub fn detect_cycles(graph: &ContentGraph, deadline: &Deadline) -> CheckRun {
    let mut run = CheckRun::new();
    for edge_type in EdgeType::HIERARCHICAL {
        if deadline.expired() {
            run.issues.push(deadline.timeout_issue("cycle detector"));
            return run;
        }
        run.absorb(detect_cycles_for(graph, edge_type));
    }
    run
}

fn detect_cycles_for(graph: &ContentGraph, edge_type: EdgeType) -> CheckRun {
    let mut run = CheckRun::new();
    let tag = EdgeTypeTag::Known(edge_type);

    let mut roots: Vec<NodeIndex> = graph.node_indices().collect();
    roots.sort_by(|a, b| local_id(graph, *a).cmp(local_id(graph, *b)));

    let mut color: HashMap<NodeIndex, Color> = HashMap::with_capacity(roots.len());
    for root in roots {
        run.checks += 1;
        if color.get(&root).copied().unwrap_or(Color::White) != Color::White {
            continue;
        }

        // Explicit stack of (node, successors, next successor cursor); `path`
        // mirrors the gray chain so a back edge can be expanded into a cycle.
        let mut path: Vec<NodeIndex> = vec![root];
        let mut stack: Vec<(NodeIndex, Vec<NodeIndex>, usize)> =
            vec![(root, graph.typed_successors(root, &tag), 0)];
        color.insert(root, Color::Gray);

        while let Some((_, succs, cursor)) = stack.last_mut() {
            if *cursor < succs.len() {
                let next = succs[*cursor];
                *cursor += 1;
                match color.get(&next).copied().unwrap_or(Color::White) {
                    Color::White => {
                        color.insert(next, Color::Gray);
                        path.push(next);
                        stack.push((next, graph.typed_successors(next, &tag), 0));
                    }
                    Color::Gray => {
                        run.issues.push(cycle_issue(graph, edge_type, &path, next));
                    }
                    Color::Black => {}
                }
            } else if let Some((done, _, _)) = stack.pop() {
                color.insert(done, Color::Black);
                path.pop();
            }
        }
    }
    run
}

/// Builds the CRITICAL issue for one back edge, with the cycle's node chain
/// starting at the gray node the back edge points to.
fn cycle_issue(
    graph: &ContentGraph,
    edge_type: EdgeType,
    path: &[NodeIndex],
    back_to: NodeIndex,
) -> ValidationIssue {
    let start = path.iter().position(|&n| n == back_to).unwrap_or(0);
    let mut chain: Vec<&str> = path[start..].iter().map(|&n| local_id(graph, n)).collect();
    chain.push(local_id(graph, back_to));
    ValidationIssue::new(
        Severity::Critical,
        IssueCategory::HierarchyCycle,
        IssueRef::node(local_id(graph, back_to)),
        format!(
            "{} hierarchy contains a cycle: {}",
            edge_type.as_str(),
            chain.join(" -> ")
        ),
    )
}

fn local_id(graph: &ContentGraph, idx: NodeIndex) -> &str {
    graph.node_weight(idx).map_or("", |w| w.local_id.as_str())
}

// ---------------------------------------------------------------------------
// Multi-parent violations
// ---------------------------------------------------------------------------

/// Reports nodes with more than one parent via the same hierarchical edge
/// type. A Section contained by two Pages is an ERROR; a node with a
/// CONTAINS parent and a CHILD_OF parent is fine.
pub fn detect_multi_parents(graph: &ContentGraph, deadline: &Deadline) -> CheckRun {
    let mut run = CheckRun::new();

    let mut nodes: Vec<NodeIndex> = graph.node_indices().collect();
    nodes.sort_by(|a, b| local_id(graph, *a).cmp(local_id(graph, *b)));

    for edge_type in EdgeType::HIERARCHICAL {
        let tag = EdgeTypeTag::Known(edge_type);
        for &idx in &nodes {
            if deadline.expired() {
                run.issues.push(deadline.timeout_issue("hierarchy checker"));
                return run;
            }
            run.checks += 1;
            let parents = graph.typed_in_degree(idx, &tag);
            if parents > 1 {
                run.issues.push(ValidationIssue::new(
                    Severity::Error,
                    IssueCategory::Hierarchy,
                    IssueRef::node(local_id(graph, idx)),
                    format!("node has {parents} parents via {}", edge_type.as_str()),
                ));
            }
        }
    }
    run
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use super::*;
    use crate::enums::NodeType;
    use crate::graph::build_graph;
    use crate::test_helpers::{edge, node, snapshot};

    fn ids(issues: &[ValidationIssue]) -> Vec<String> {
        issues.iter().map(|i| i.reference.to_string()).collect()
    }

    #[test]
    fn dangling_target_is_one_critical() {
        let snap = snapshot(
            vec![node("p1", NodeType::Page)],
            vec![edge("p1", "ghost", EdgeType::Contains)],
        );
        let g = build_graph(&snap);
        let r = detect_dangling_edges(&snap, &g, &Deadline::unlimited());
        assert_eq!(r.checks, 1);
        assert_eq!(r.issues.len(), 1);
        assert_eq!(r.issues[0].severity, Severity::Critical);
        assert!(r.issues[0].message.contains("ghost"));
    }

    #[test]
    fn both_endpoints_missing_yields_two_issues() {
        let snap = snapshot(vec![], vec![edge("a", "b", EdgeType::LinksTo)]);
        let g = build_graph(&snap);
        let r = detect_dangling_edges(&snap, &g, &Deadline::unlimited());
        assert_eq!(r.issues.len(), 2);
    }

    #[test]
    fn orphan_severity_depends_on_node_type() {
        let snap = snapshot(
            vec![
                node("p1", NodeType::Page),
                node("t1", NodeType::Topic),
                node("per1", NodeType::Persona),
            ],
            vec![],
        );
        let g = build_graph(&snap);
        let r = detect_orphans(&snap, &g, &Deadline::unlimited());
        assert_eq!(r.checks, 3);
        assert_eq!(r.issues.len(), 3);
        let page = r
            .issues
            .iter()
            .find(|i| i.reference == IssueRef::node("p1"))
            .expect("p1 issue");
        assert_eq!(page.severity, Severity::Error);
        let topic = r
            .issues
            .iter()
            .find(|i| i.reference == IssueRef::node("t1"))
            .expect("t1 issue");
        assert_eq!(topic.severity, Severity::Warning);
    }

    #[test]
    fn dangling_edge_still_gives_its_resolved_endpoint_degree() {
        let snap = snapshot(
            vec![node("p1", NodeType::Page)],
            vec![edge("p1", "ghost", EdgeType::Contains)],
        );
        let g = build_graph(&snap);
        let r = detect_orphans(&snap, &g, &Deadline::unlimited());
        assert!(r.issues.is_empty(), "p1 is not an orphan: {:?}", r.issues);
    }

    #[test]
    fn three_node_cycle_yields_one_critical() {
        let snap = snapshot(
            vec![
                node("a", NodeType::Page),
                node("b", NodeType::Section),
                node("c", NodeType::ContentItem),
            ],
            vec![
                edge("a", "b", EdgeType::Contains),
                edge("b", "c", EdgeType::Contains),
                edge("c", "a", EdgeType::Contains),
            ],
        );
        let g = build_graph(&snap);
        let r = detect_cycles(&g, &Deadline::unlimited());
        assert_eq!(r.issues.len(), 1);
        assert_eq!(r.issues[0].severity, Severity::Critical);
        assert!(
            r.issues[0].message.contains("a -> b -> c -> a"),
            "message: {}",
            r.issues[0].message
        );
    }

    #[test]
    fn chain_has_no_cycle() {
        let snap = snapshot(
            vec![
                node("a", NodeType::Page),
                node("b", NodeType::Section),
                node("c", NodeType::ContentItem),
            ],
            vec![
                edge("a", "b", EdgeType::Contains),
                edge("b", "c", EdgeType::Contains),
            ],
        );
        let g = build_graph(&snap);
        let r = detect_cycles(&g, &Deadline::unlimited());
        assert!(r.issues.is_empty());
    }

    #[test]
    fn self_loop_is_a_cycle() {
        let snap = snapshot(
            vec![node("t1", NodeType::Topic)],
            vec![edge("t1", "t1", EdgeType::ChildOf)],
        );
        let g = build_graph(&snap);
        let r = detect_cycles(&g, &Deadline::unlimited());
        assert_eq!(r.issues.len(), 1);
        assert!(r.issues[0].message.contains("t1 -> t1"));
    }

    #[test]
    fn cross_type_loop_is_not_a_cycle() {
        // p1 CONTAINS s1, s1 BELONGS_TO p1: loops only across types.
        let snap = snapshot(
            vec![node("p1", NodeType::Page), node("s1", NodeType::Section)],
            vec![
                edge("p1", "s1", EdgeType::Contains),
                edge("s1", "p1", EdgeType::BelongsTo),
            ],
        );
        let g = build_graph(&snap);
        let r = detect_cycles(&g, &Deadline::unlimited());
        assert!(r.issues.is_empty(), "issues: {:?}", r.issues);
    }

    #[test]
    fn two_disjoint_cycles_yield_two_issues() {
        let snap = snapshot(
            vec![
                node("a", NodeType::Topic),
                node("b", NodeType::Topic),
                node("x", NodeType::Topic),
                node("y", NodeType::Topic),
            ],
            vec![
                edge("a", "b", EdgeType::ChildOf),
                edge("b", "a", EdgeType::ChildOf),
                edge("x", "y", EdgeType::ChildOf),
                edge("y", "x", EdgeType::ChildOf),
            ],
        );
        let g = build_graph(&snap);
        let r = detect_cycles(&g, &Deadline::unlimited());
        assert_eq!(r.issues.len(), 2);
    }

    #[test]
    fn multi_parent_same_type_is_error() {
        let snap = snapshot(
            vec![
                node("p1", NodeType::Page),
                node("p2", NodeType::Page),
                node("s1", NodeType::Section),
            ],
            vec![
                edge("p1", "s1", EdgeType::Contains),
                edge("p2", "s1", EdgeType::Contains),
            ],
        );
        let g = build_graph(&snap);
        let r = detect_multi_parents(&g, &Deadline::unlimited());
        assert_eq!(r.issues.len(), 1);
        assert_eq!(r.issues[0].severity, Severity::Error);
        assert_eq!(ids(&r.issues), ["node \"s1\"".to_owned()]);
    }

    #[test]
    fn parents_via_different_types_are_fine() {
        let snap = snapshot(
            vec![
                node("p1", NodeType::Page),
                node("t1", NodeType::Topic),
                node("s1", NodeType::Section),
            ],
            vec![
                edge("p1", "s1", EdgeType::Contains),
                edge("t1", "s1", EdgeType::ChildOf),
            ],
        );
        let g = build_graph(&snap);
        let r = detect_multi_parents(&g, &Deadline::unlimited());
        assert!(r.issues.is_empty());
    }

    #[test]
    fn check_integrity_merges_all_checks() {
        let snap = snapshot(
            vec![node("p1", NodeType::Page), node("lonely", NodeType::Entity)],
            vec![edge("p1", "ghost", EdgeType::Contains)],
        );
        let g = build_graph(&snap);
        let r = check_integrity(&snap, &g, &Deadline::unlimited());
        assert!(
            r.issues
                .iter()
                .any(|i| i.category == IssueCategory::DanglingEdge)
        );
        assert!(r.issues.iter().any(|i| i.category == IssueCategory::Orphan));
        // 1 edge + 2 orphan checks + cycle roots (2 nodes x 3 types)
        // + multi-parent checks (2 nodes x 3 types).
        assert_eq!(r.checks, 1 + 2 + 6 + 6);
    }
}
