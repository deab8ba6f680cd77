/// Graph-theoretic quality metrics over the resolved content graph.
///
/// Counting conventions, fixed here rather than left to interpretation:
/// `density` and `avg_degree` use directed edge counting (self-loops excluded
/// from density); components, path metrics and the clustering coefficient use
/// the undirected projection, where an edge in either direction connects the
/// pair. Path metrics are sampled: with fewer BFS sources than nodes the
/// reported `diameter` is a lower bound of the true diameter.
///
/// Determinism: all node iteration is in id order, sampling uses a seeded
/// `StdRng`, and every reported float is rounded to 4 decimal places.
use std::cmp::Reverse;
use std::collections::{BTreeSet, HashMap, VecDeque};

use petgraph::stable_graph::NodeIndex;
use petgraph::visit::{EdgeRef, IntoEdgeReferences};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::index::sample;
use serde::Serialize;

use crate::budget::Deadline;
use crate::enums::{NodeType, NodeTypeTag};
use crate::graph::ContentGraph;
use crate::issue::ValidationIssue;
use crate::report::round4;

/// Tuning knobs for the quality metrics run.
#[derive(Debug, Clone)]
pub struct QualityConfig {
    /// Minimum total degree for a node to count as a hub.
    pub hub_threshold: usize,
    /// Number of BFS sources for sampled path metrics (capped at node count).
    pub sample_size: usize,
    /// Seed for source sampling; fixed so runs are reproducible.
    pub rng_seed: u64,
    /// Maximum number of hub nodes listed in the report.
    pub max_hubs: usize,
    /// Weights of the quality-score components.
    pub weights: ScoreWeights,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            hub_threshold: 10,
            sample_size: 100,
            rng_seed: 42,
            max_hubs: 50,
            weights: ScoreWeights::default(),
        }
    }
}

/// Relative weights of the four quality-score components. They are
/// normalized by their sum, so only ratios matter.
#[derive(Debug, Clone)]
pub struct ScoreWeights {
    /// Weight of directed density.
    pub density: f64,
    /// Weight of `1 − isolated_node_pct/100`.
    pub isolation: f64,
    /// Weight of `largest_component_pct/100`.
    pub connectivity: f64,
    /// Weight of the clustering coefficient.
    pub clustering: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            density: 1.0,
            isolation: 1.0,
            connectivity: 1.0,
            clustering: 1.0,
        }
    }
}

/// A high-degree node listed in the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HubNode {
    /// The node's graph-local id.
    pub id: String,
    /// The node's total (in + out) degree.
    pub degree: usize,
}

/// The quality section of the final report.
///
/// The composite `quality_score` is a convenience summary, not a certified
/// metric; `score_formula` records exactly how it was computed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QualityReport {
    /// `|E| / (|V| × (|V| − 1))`, directed, self-loops excluded; 0 if |V| ≤ 1.
    pub density: f64,
    /// Sum of in+out degree over all nodes, divided by node count.
    pub avg_degree: f64,
    /// Number of connected components of the undirected projection.
    pub connected_components: usize,
    /// Node count of the largest component.
    pub largest_component_size: usize,
    /// Largest component size as a percentage of all nodes.
    pub largest_component_pct: f64,
    /// Percentage of degree-0 nodes among non-taxonomy nodes.
    pub isolated_node_pct: f64,
    /// Mean finite BFS distance (≥ 1) across all samples; 0 if none.
    pub avg_path_length: f64,
    /// Max finite BFS distance seen; a lower bound when sources are sampled.
    pub diameter: usize,
    /// Number of BFS sources actually sampled.
    pub sampled_sources: usize,
    /// Nodes with total degree ≥ the hub threshold, highest degree first.
    pub hub_nodes: Vec<HubNode>,
    /// Mean local clustering coefficient over nodes with undirected degree ≥ 2.
    pub clustering_coefficient: f64,
    /// Weighted composite in `[0, 100]`; see `score_formula`.
    pub quality_score: f64,
    /// The exact formula used for `quality_score`.
    pub score_formula: String,
}

/// Computes all quality metrics for the graph.
///
/// Only timeout findings are returned as issues; the metrics themselves are
/// never issues.
pub fn compute(
    graph: &ContentGraph,
    config: &QualityConfig,
    deadline: &Deadline,
) -> (QualityReport, Vec<ValidationIssue>) {
    let mut issues: Vec<ValidationIssue> = Vec::new();

    // Id-sorted node list: the single iteration order for everything below.
    let mut nodes: Vec<NodeIndex> = graph.node_indices().collect();
    nodes.sort_by(|a, b| local_id(graph, *a).cmp(local_id(graph, *b)));
    let node_count = nodes.len();

    let non_loop_edges = graph
        .graph()
        .edge_references()
        .filter(|e| e.source() != e.target())
        .count();
    let density = if node_count <= 1 {
        0.0
    } else {
        non_loop_edges as f64 / (node_count as f64 * (node_count as f64 - 1.0))
    };

    let degree_sum: usize = nodes.iter().map(|&n| graph.total_degree(n)).sum();
    let avg_degree = if node_count == 0 {
        0.0
    } else {
        degree_sum as f64 / node_count as f64
    };

    // Undirected adjacency, computed once and shared by components, path
    // metrics, and clustering.
    let adjacency: HashMap<NodeIndex, BTreeSet<NodeIndex>> = nodes
        .iter()
        .map(|&n| (n, graph.undirected_neighbors(n)))
        .collect();

    let (connected_components, largest_component_size) = components(&nodes, &adjacency);
    let largest_component_pct = if node_count == 0 {
        0.0
    } else {
        largest_component_size as f64 / node_count as f64 * 100.0
    };

    let isolated_node_pct = isolated_pct(graph, &nodes);

    let (avg_path_length, diameter, sampled_sources) =
        path_metrics(&nodes, &adjacency, config, deadline, &mut issues);

    let hub_nodes = hubs(graph, &nodes, config);

    let clustering_coefficient = clustering(&nodes, &adjacency);

    let (quality_score, score_formula) = score(
        &config.weights,
        density,
        isolated_node_pct,
        largest_component_pct,
        clustering_coefficient,
    );

    let report = QualityReport {
        density: round4(density),
        avg_degree: round4(avg_degree),
        connected_components,
        largest_component_size,
        largest_component_pct: round4(largest_component_pct),
        isolated_node_pct: round4(isolated_node_pct),
        avg_path_length: round4(avg_path_length),
        diameter,
        sampled_sources,
        hub_nodes,
        clustering_coefficient: round4(clustering_coefficient),
        quality_score: round4(quality_score),
        score_formula,
    };
    (report, issues)
}

fn local_id(graph: &ContentGraph, idx: NodeIndex) -> &str {
    graph.node_weight(idx).map_or("", |w| w.local_id.as_str())
}

// ---------------------------------------------------------------------------
// Connectivity
// ---------------------------------------------------------------------------

/// BFS component sweep over the undirected projection. Returns component
/// count and the largest component's size.
fn components(
    nodes: &[NodeIndex],
    adjacency: &HashMap<NodeIndex, BTreeSet<NodeIndex>>,
) -> (usize, usize) {
    let mut visited: BTreeSet<NodeIndex> = BTreeSet::new();
    let mut count = 0_usize;
    let mut largest = 0_usize;

    for &root in nodes {
        if !visited.insert(root) {
            continue;
        }
        count += 1;
        let mut size = 1_usize;
        let mut queue: VecDeque<NodeIndex> = VecDeque::from([root]);
        while let Some(current) = queue.pop_front() {
            if let Some(neighbors) = adjacency.get(&current) {
                for &next in neighbors {
                    if visited.insert(next) {
                        size += 1;
                        queue.push_back(next);
                    }
                }
            }
        }
        largest = largest.max(size);
    }
    (count, largest)
}

/// Percentage of degree-0 nodes, counted over non-taxonomy nodes only.
/// Topic and Category nodes are routinely pre-seeded without edges, so they
/// are excluded from both numerator and denominator.
fn isolated_pct(graph: &ContentGraph, nodes: &[NodeIndex]) -> f64 {
    let mut eligible = 0_usize;
    let mut isolated = 0_usize;
    for &idx in nodes {
        let excluded = graph.node_weight(idx).is_some_and(|w| {
            matches!(
                w.node_type,
                NodeTypeTag::Known(NodeType::Topic) | NodeTypeTag::Known(NodeType::Category)
            )
        });
        if excluded {
            continue;
        }
        eligible += 1;
        if graph.total_degree(idx) == 0 {
            isolated += 1;
        }
    }
    if eligible == 0 {
        0.0
    } else {
        isolated as f64 / eligible as f64 * 100.0
    }
}

// ---------------------------------------------------------------------------
// Sampled path metrics
// ---------------------------------------------------------------------------

/// Seeded BFS sampling over the undirected projection. Returns
/// `(avg_path_length, diameter, sources_used)`.
fn path_metrics(
    nodes: &[NodeIndex],
    adjacency: &HashMap<NodeIndex, BTreeSet<NodeIndex>>,
    config: &QualityConfig,
    deadline: &Deadline,
    issues: &mut Vec<ValidationIssue>,
) -> (f64, usize, usize) {
    let want = config.sample_size.min(nodes.len());
    if want == 0 {
        return (0.0, 0, 0);
    }

    let mut rng = StdRng::seed_from_u64(config.rng_seed);
    let mut chosen: Vec<usize> = sample(&mut rng, nodes.len(), want).into_vec();
    chosen.sort_unstable();

    let mut distance_sum = 0_u64;
    let mut distance_count = 0_u64;
    let mut diameter = 0_usize;
    let mut used = 0_usize;

    for position in chosen {
        if deadline.expired() {
            issues.push(deadline.timeout_issue("quality metrics engine"));
            break;
        }
        let source = nodes[position];
        used += 1;

        let mut dist: HashMap<NodeIndex, usize> = HashMap::from([(source, 0)]);
        let mut queue: VecDeque<NodeIndex> = VecDeque::from([source]);
        while let Some(current) = queue.pop_front() {
            let d = dist.get(&current).copied().unwrap_or(0);
            if let Some(neighbors) = adjacency.get(&current) {
                for &next in neighbors {
                    if !dist.contains_key(&next) {
                        dist.insert(next, d + 1);
                        queue.push_back(next);
                        distance_sum += (d + 1) as u64;
                        distance_count += 1;
                        diameter = diameter.max(d + 1);
                    }
                }
            }
        }
    }

    let avg = if distance_count == 0 {
        0.0
    } else {
        distance_sum as f64 / distance_count as f64
    };
    (avg, diameter, used)
}

// ---------------------------------------------------------------------------
// Hubs and clustering
// ---------------------------------------------------------------------------

fn hubs(graph: &ContentGraph, nodes: &[NodeIndex], config: &QualityConfig) -> Vec<HubNode> {
    let mut hubs: Vec<HubNode> = nodes
        .iter()
        .filter_map(|&idx| {
            let degree = graph.total_degree(idx);
            (degree >= config.hub_threshold).then(|| HubNode {
                id: local_id(graph, idx).to_owned(),
                degree,
            })
        })
        .collect();
    hubs.sort_by(|a, b| (Reverse(a.degree), &a.id).cmp(&(Reverse(b.degree), &b.id)));
    hubs.truncate(config.max_hubs);
    hubs
}

/// Mean local clustering coefficient over nodes with undirected degree ≥ 2.
/// Lower-degree nodes are excluded from the average, not counted as zero.
fn clustering(nodes: &[NodeIndex], adjacency: &HashMap<NodeIndex, BTreeSet<NodeIndex>>) -> f64 {
    let mut sum = 0.0_f64;
    let mut counted = 0_usize;

    for &idx in nodes {
        let Some(neighbors) = adjacency.get(&idx) else {
            continue;
        };
        let k = neighbors.len();
        if k < 2 {
            continue;
        }
        let members: Vec<NodeIndex> = neighbors.iter().copied().collect();
        let mut links = 0_usize;
        for (i, &a) in members.iter().enumerate() {
            for &b in &members[i + 1..] {
                if adjacency.get(&a).is_some_and(|set| set.contains(&b)) {
                    links += 1;
                }
            }
        }
        sum += links as f64 / (k as f64 * (k as f64 - 1.0) / 2.0);
        counted += 1;
    }

    if counted == 0 { 0.0 } else { sum / counted as f64 }
}

// ---------------------------------------------------------------------------
// Composite score
// ---------------------------------------------------------------------------

/// Weighted mean of the four normalized components, scaled to `[0, 100]`.
fn score(
    weights: &ScoreWeights,
    density: f64,
    isolated_node_pct: f64,
    largest_component_pct: f64,
    clustering_coefficient: f64,
) -> (f64, String) {
    let total = weights.density + weights.isolation + weights.connectivity + weights.clustering;
    if total <= 0.0 {
        return (0.0, "no positive weights configured; score fixed at 0".to_owned());
    }
    let weighted = weights.density * density
        + weights.isolation * (1.0 - isolated_node_pct / 100.0)
        + weights.connectivity * (largest_component_pct / 100.0)
        + weights.clustering * clustering_coefficient;
    let score = (100.0 * weighted / total).clamp(0.0, 100.0);
    let formula = format!(
        "clamp(0, 100, 100 * ({:.4}*density + {:.4}*(1 - isolated_node_pct/100) \
         + {:.4}*(largest_component_pct/100) + {:.4}*clustering_coefficient) / {:.4})",
        weights.density, weights.isolation, weights.connectivity, weights.clustering, total
    );
    (score, formula)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use super::*;
    use crate::enums::EdgeType;
    use crate::graph::build_graph;
    use crate::test_helpers::{edge, node, snapshot};

    fn compute_default(snap: &crate::snapshot::GraphSnapshot) -> QualityReport {
        let graph = build_graph(snap);
        let (report, issues) = compute(&graph, &QualityConfig::default(), &Deadline::unlimited());
        assert!(issues.is_empty(), "unexpected issues: {issues:?}");
        report
    }

    fn chain3() -> crate::snapshot::GraphSnapshot {
        snapshot(
            vec![
                node("p1", NodeType::Page),
                node("s1", NodeType::Section),
                node("c1", NodeType::ContentItem),
            ],
            vec![
                edge("p1", "s1", EdgeType::Contains),
                edge("s1", "c1", EdgeType::Contains),
            ],
        )
    }

    #[test]
    fn chain_metrics_match_hand_computation() {
        let report = compute_default(&chain3());
        // 2 edges over 3*2 ordered pairs.
        assert_eq!(report.density, 0.3333);
        // Degree sum 1+2+1 over 3 nodes.
        assert_eq!(report.avg_degree, 1.3333);
        assert_eq!(report.connected_components, 1);
        assert_eq!(report.largest_component_size, 3);
        assert_eq!(report.largest_component_pct, 100.0);
        assert_eq!(report.isolated_node_pct, 0.0);
        assert_eq!(report.diameter, 2);
        assert_eq!(report.sampled_sources, 3);
        // Distances sampled from all 3 sources: 1,2 + 1,1 + 1,2.
        assert_eq!(report.avg_path_length, 1.3333);
    }

    #[test]
    fn empty_graph_is_all_zeros() {
        let report = compute_default(&snapshot(vec![], vec![]));
        assert_eq!(report.density, 0.0);
        assert_eq!(report.avg_degree, 0.0);
        assert_eq!(report.connected_components, 0);
        assert_eq!(report.isolated_node_pct, 0.0);
        assert_eq!(report.diameter, 0);
        assert_eq!(report.sampled_sources, 0);
        assert!(report.hub_nodes.is_empty());
    }

    #[test]
    fn single_node_density_is_zero() {
        let report = compute_default(&snapshot(vec![node("p1", NodeType::Page)], vec![]));
        assert_eq!(report.density, 0.0);
        assert_eq!(report.connected_components, 1);
    }

    #[test]
    fn complete_directed_4_graph_has_density_one() {
        let ids = ["a", "b", "c", "d"];
        let nodes = ids.iter().map(|id| node(id, NodeType::Page)).collect();
        let mut edges = Vec::new();
        for s in ids {
            for t in ids {
                if s != t {
                    edges.push(edge(s, t, EdgeType::LinksTo));
                }
            }
        }
        let report = compute_default(&snapshot(nodes, edges));
        assert_eq!(report.density, 1.0);
        assert_eq!(report.clustering_coefficient, 1.0);
    }

    #[test]
    fn self_loop_is_excluded_from_density() {
        let snap = snapshot(
            vec![node("a", NodeType::Page), node("b", NodeType::Page)],
            vec![
                edge("a", "a", EdgeType::LinksTo),
                edge("a", "b", EdgeType::LinksTo),
            ],
        );
        let report = compute_default(&snap);
        // 1 of 2 ordered pairs.
        assert_eq!(report.density, 0.5);
        // Self-loop still counts into total degree: (2+1)+1 over 2.
        assert_eq!(report.avg_degree, 2.0);
    }

    #[test]
    fn isolated_pct_ignores_taxonomy_nodes() {
        let snap = snapshot(
            vec![
                node("p1", NodeType::Page),
                node("p2", NodeType::Page),
                node("t1", NodeType::Topic),
                node("cat1", NodeType::Category),
            ],
            vec![edge("p1", "p2", EdgeType::LinksTo)],
        );
        let report = compute_default(&snap);
        // t1 and cat1 are excluded entirely; p1 and p2 are connected.
        assert_eq!(report.isolated_node_pct, 0.0);
        assert_eq!(report.connected_components, 3);
    }

    #[test]
    fn hubs_sorted_by_degree_then_id() {
        let mut nodes = vec![node("hub-b", NodeType::Page), node("hub-a", NodeType::Page)];
        let mut edges = Vec::new();
        for i in 0..3 {
            let spoke = format!("spoke-{i}");
            nodes.push(node(&spoke, NodeType::Page));
            edges.push(edge("hub-a", &spoke, EdgeType::LinksTo));
            edges.push(edge("hub-b", &spoke, EdgeType::LinksTo));
        }
        edges.push(edge("hub-b", "hub-a", EdgeType::LinksTo));
        let graph = build_graph(&snapshot(nodes, edges));
        let config = QualityConfig {
            hub_threshold: 4,
            ..QualityConfig::default()
        };
        let (report, _) = compute(&graph, &config, &Deadline::unlimited());
        assert_eq!(report.hub_nodes.len(), 2);
        assert_eq!(report.hub_nodes[0].id, "hub-a");
        assert_eq!(report.hub_nodes[0].degree, 4);
        assert_eq!(report.hub_nodes[1].id, "hub-b");
    }

    #[test]
    fn max_hubs_caps_the_list() {
        let mut nodes = vec![node("center", NodeType::Page)];
        let mut edges = Vec::new();
        for i in 0..5 {
            let other = format!("n{i}");
            nodes.push(node(&other, NodeType::Page));
            edges.push(edge("center", &other, EdgeType::LinksTo));
        }
        let graph = build_graph(&snapshot(nodes, edges));
        let config = QualityConfig {
            hub_threshold: 1,
            max_hubs: 2,
            ..QualityConfig::default()
        };
        let (report, _) = compute(&graph, &config, &Deadline::unlimited());
        assert_eq!(report.hub_nodes.len(), 2);
        assert_eq!(report.hub_nodes[0].id, "center");
    }

    #[test]
    fn clustering_excludes_low_degree_nodes() {
        // Triangle a-b-c plus pendant d: d and its neighbor contribute per
        // their own neighborhoods; d (degree 1) is excluded.
        let snap = snapshot(
            vec![
                node("a", NodeType::Page),
                node("b", NodeType::Page),
                node("c", NodeType::Page),
                node("d", NodeType::Page),
            ],
            vec![
                edge("a", "b", EdgeType::LinksTo),
                edge("b", "c", EdgeType::LinksTo),
                edge("c", "a", EdgeType::LinksTo),
                edge("c", "d", EdgeType::LinksTo),
            ],
        );
        let report = compute_default(&snap);
        // a: 1.0, b: 1.0, c: 1/3 (one connected pair of three); d excluded.
        assert_eq!(report.clustering_coefficient, round4((1.0 + 1.0 + 1.0 / 3.0) / 3.0));
    }

    #[test]
    fn same_seed_same_report() {
        let snap = chain3();
        let a = compute_default(&snap);
        let b = compute_default(&snap);
        assert_eq!(a, b);
        let json_a = serde_json::to_string(&a).expect("serialize");
        let json_b = serde_json::to_string(&b).expect("serialize");
        assert_eq!(json_a, json_b);
    }

    #[test]
    fn sampling_caps_sources_at_sample_size() {
        let mut nodes = Vec::new();
        for i in 0..10 {
            nodes.push(node(&format!("n{i:02}"), NodeType::Page));
        }
        let graph = build_graph(&snapshot(nodes, vec![]));
        let config = QualityConfig {
            sample_size: 4,
            ..QualityConfig::default()
        };
        let (report, _) = compute(&graph, &config, &Deadline::unlimited());
        assert_eq!(report.sampled_sources, 4);
    }

    #[test]
    fn expired_deadline_yields_timeout_issue() {
        let graph = build_graph(&chain3());
        let (report, issues) = compute(
            &graph,
            &QualityConfig::default(),
            &Deadline::new(Some(std::time::Duration::ZERO)),
        );
        assert_eq!(report.sampled_sources, 0);
        assert_eq!(issues.len(), 1);
        assert!(issues[0].message.contains("quality metrics engine"));
    }

    #[test]
    fn score_formula_names_the_weights() {
        let report = compute_default(&chain3());
        assert!(report.score_formula.contains("clamp(0, 100"));
        assert!(report.quality_score > 0.0);
        assert!(report.quality_score <= 100.0);
    }
}
