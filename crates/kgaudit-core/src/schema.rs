/// Node/edge type and property conformance checks.
///
/// The schema validator walks the snapshot once per entity kind and pushes
/// issues; it has no side effects beyond the returned [`CheckRun`] and never
/// raises on a malformed entity — a bad node or edge yields an issue and the
/// walk continues.
///
/// Required properties per node type:
/// - `Page` — `url`, `title`.
/// - `Section` — `page_id`, `order`.
/// - `ContentItem` — `hash`, `text`.
///
/// Score properties (`importance`, `confidence`, `relevance`) must be numbers
/// in `[0, 1]` wherever they appear. Hierarchical edges must carry a
/// non-negative integer `order`; semantic edges must carry `confidence` or
/// `relevance` in `[0, 1]`.
use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::budget::{CheckRun, Deadline};
use crate::enums::{EdgeTypeTag, NodeType, NodeTypeTag};
use crate::issue::{IssueCategory, IssueRef, Severity, ValidationIssue};
use crate::newtypes::NodeId;
use crate::snapshot::{Edge, GraphSnapshot, Node};

/// Score-valued properties constrained to `[0, 1]`.
const SCORE_FIELDS: [&str; 3] = ["importance", "confidence", "relevance"];

/// Matches an absolute http(s) URL prefix.
static URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://").unwrap_or_else(|_| {
        // Never reached: the pattern above is always valid.
        Regex::new("a^").unwrap_or_else(|_| {
            Regex::new(".").unwrap_or_else(|_| {
                Regex::new(".").unwrap_or_else(|_| unreachable!("regex engine broken"))
            })
        })
    })
});

/// Runs all schema checks over the snapshot.
///
/// One check is counted per node and per edge. A duplicate
/// `(source, target, type)` triple yields one WARNING per repetition beyond
/// the first; duplicates are never merged.
pub fn validate_schema(snapshot: &GraphSnapshot, deadline: &Deadline) -> CheckRun {
    let mut run = CheckRun::new();

    let mut seen_ids: HashSet<&str> = HashSet::with_capacity(snapshot.nodes.len());
    for node in &snapshot.nodes {
        if deadline.expired() {
            run.issues.push(deadline.timeout_issue("schema validator"));
            return run;
        }
        run.checks += 1;
        // Ids arrive as raw strings; the NodeId shape gate lives here so a
        // malformed id is a finding, not a load failure.
        if NodeId::try_from(node.id.as_str()).is_err() {
            run.issues.push(ValidationIssue::new(
                Severity::Critical,
                IssueCategory::Schema,
                IssueRef::node(node.id.as_str()),
                format!("node id {:?} is not a valid identifier", node.id),
            ));
        }
        if !seen_ids.insert(node.id.as_str()) {
            run.issues.push(ValidationIssue::new(
                Severity::Critical,
                IssueCategory::Schema,
                IssueRef::node(node.id.as_str()),
                format!("duplicate node id \"{}\"", node.id),
            ));
        }
        check_node(node, &mut run.issues);
    }

    let mut seen_triples: HashSet<(&str, &str, &str)> =
        HashSet::with_capacity(snapshot.edges.len());
    for e in &snapshot.edges {
        if deadline.expired() {
            run.issues.push(deadline.timeout_issue("schema validator"));
            return run;
        }
        run.checks += 1;
        let triple = (e.source_id.as_str(), e.target_id.as_str(), e.edge_type.as_str());
        if !seen_triples.insert(triple) {
            run.issues.push(ValidationIssue::new(
                Severity::Warning,
                IssueCategory::Schema,
                edge_ref(e),
                format!("duplicate edge {}", e.describe()),
            ));
        }
        check_edge(e, &mut run.issues);
    }

    run
}

// ---------------------------------------------------------------------------
// Node checks
// ---------------------------------------------------------------------------

/// Required property names for a known node type.
pub(crate) fn required_properties(node_type: NodeType) -> &'static [&'static str] {
    match node_type {
        NodeType::Page => &["url", "title"],
        NodeType::Section => &["page_id", "order"],
        NodeType::ContentItem => &["hash", "text"],
        NodeType::Topic | NodeType::Category | NodeType::Persona | NodeType::Entity => &[],
    }
}

fn check_node(node: &Node, issues: &mut Vec<ValidationIssue>) {
    let node_type = match &node.node_type {
        NodeTypeTag::Known(t) => *t,
        NodeTypeTag::Unknown(s) => {
            issues.push(ValidationIssue::new(
                Severity::Critical,
                IssueCategory::Schema,
                IssueRef::node(node.id.as_str()),
                format!("unknown node type \"{s}\""),
            ));
            return;
        }
    };

    for field in required_properties(node_type) {
        match node.property(field) {
            None | Some(Value::Null) => {
                issues.push(ValidationIssue::new(
                    Severity::Error,
                    IssueCategory::Schema,
                    IssueRef::node(node.id.as_str()),
                    format!(
                        "{} node is missing required property \"{field}\"",
                        node_type.as_str()
                    ),
                ));
            }
            Some(_) => {}
        }
    }

    for field in SCORE_FIELDS {
        if let Some(value) = node.property(field) {
            if !score_in_range(value) {
                issues.push(ValidationIssue::new(
                    Severity::Error,
                    IssueCategory::Schema,
                    IssueRef::node(node.id.as_str()),
                    format!("property \"{field}\" must be a number in [0, 1], got {value}"),
                ));
            }
        }
    }

    if node_type == NodeType::Page {
        if let Some(url) = node.property_str("url") {
            if !URL_RE.is_match(url) {
                issues.push(ValidationIssue::new(
                    Severity::Warning,
                    IssueCategory::Schema,
                    IssueRef::node(node.id.as_str()),
                    format!("Page url \"{url}\" is not an absolute http(s) URL"),
                ));
            }
        }
    }

    if node_type == NodeType::Section {
        if let Some(order) = node.property("order") {
            if !is_non_negative_integer(order) {
                issues.push(ValidationIssue::new(
                    Severity::Error,
                    IssueCategory::Schema,
                    IssueRef::node(node.id.as_str()),
                    format!("Section \"order\" must be a non-negative integer, got {order}"),
                ));
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Edge checks
// ---------------------------------------------------------------------------

fn check_edge(e: &Edge, issues: &mut Vec<ValidationIssue>) {
    let edge_type = match &e.edge_type {
        EdgeTypeTag::Known(t) => *t,
        EdgeTypeTag::Unknown(s) => {
            issues.push(ValidationIssue::new(
                Severity::Critical,
                IssueCategory::Schema,
                edge_ref(e),
                format!("unknown edge type \"{s}\""),
            ));
            return;
        }
    };

    if edge_type.is_hierarchical() {
        match e.property("order") {
            Some(v) if is_non_negative_integer(v) => {}
            Some(v) => {
                issues.push(ValidationIssue::new(
                    Severity::Error,
                    IssueCategory::Schema,
                    edge_ref(e),
                    format!(
                        "hierarchical edge \"order\" must be a non-negative integer, got {v}"
                    ),
                ));
            }
            None => {
                issues.push(ValidationIssue::new(
                    Severity::Error,
                    IssueCategory::Schema,
                    edge_ref(e),
                    "hierarchical edge is missing required property \"order\"",
                ));
            }
        }
    }

    if edge_type.is_semantic() {
        let score = e.property("confidence").or_else(|| e.property("relevance"));
        match score {
            Some(v) if score_in_range(v) => {}
            Some(v) => {
                issues.push(ValidationIssue::new(
                    Severity::Error,
                    IssueCategory::Schema,
                    edge_ref(e),
                    format!("semantic edge score must be a number in [0, 1], got {v}"),
                ));
            }
            None => {
                issues.push(ValidationIssue::new(
                    Severity::Error,
                    IssueCategory::Schema,
                    edge_ref(e),
                    "semantic edge must carry \"confidence\" or \"relevance\"",
                ));
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Value helpers
// ---------------------------------------------------------------------------

fn edge_ref(e: &Edge) -> IssueRef {
    IssueRef::edge(
        e.source_id.as_str(),
        e.target_id.as_str(),
        e.edge_type.as_str(),
    )
}

/// Returns `true` if `value` is a number in `[0, 1]`.
fn score_in_range(value: &Value) -> bool {
    value.as_f64().is_some_and(|x| (0.0..=1.0).contains(&x))
}

/// Returns `true` if `value` is an integer ≥ 0.
fn is_non_negative_integer(value: &Value) -> bool {
    value.as_u64().is_some()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
