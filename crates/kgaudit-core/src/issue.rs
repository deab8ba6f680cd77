/// Issue types produced by the validation engine.
///
/// This module defines [`Severity`], [`IssueCategory`], [`IssueRef`], and
/// [`ValidationIssue`] — the types that represent every finding produced by
/// the sub-validators. Issues are pure value objects: created once, never
/// mutated, and accumulated into the final report. The engine never fails
/// fast; a malformed entity yields an issue and processing continues.
use std::fmt;

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

// ---------------------------------------------------------------------------
// Severity
// ---------------------------------------------------------------------------

/// The severity level of a validation finding.
///
/// CRITICAL and ERROR findings block the integrity pass criterion;
/// WARNING and INFO do not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    /// Structural corruption: dangling references, cycles, unknown types.
    Critical,
    /// Conformance violation: missing required fields, out-of-range scores,
    /// orphaned primary content.
    Error,
    /// Suspect but tolerated: duplicate edges, pre-seeded taxonomy orphans,
    /// timeouts with partial results.
    Warning,
    /// Informational notes, e.g. a skipped sub-validator.
    Info,
}

impl Severity {
    /// Returns the lowercase string form used in serialized reports.
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        }
    }

    /// Returns `true` if this severity blocks the integrity pass criterion.
    pub fn is_blocking(self) -> bool {
        matches!(self, Severity::Critical | Severity::Error)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Severity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// IssueCategory
// ---------------------------------------------------------------------------

/// Machine-readable category for a validation finding.
///
/// [`IssueCategory::as_str`] returns the stable string used in serialized
/// output; categories map one-to-one onto the error taxonomy
/// (schema violation, orphan, dangling edge, cycle, coverage, timeout).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IssueCategory {
    /// Node/edge type or property conformance violation.
    Schema,
    /// A non-taxonomy node with total degree zero.
    Orphan,
    /// An edge whose source or target id does not resolve to a node.
    DanglingEdge,
    /// A cycle in a hierarchical edge-type subgraph.
    HierarchyCycle,
    /// A node with more than one parent via the same hierarchical edge type.
    Hierarchy,
    /// Coverage below threshold, or a completeness annotation.
    Completeness,
    /// A sub-validator exceeded its time budget; partial results kept.
    Timeout,
    /// An unexpected internal failure while processing one entity.
    Internal,
}

impl IssueCategory {
    /// Returns the stable category string used in serialized reports.
    pub fn as_str(self) -> &'static str {
        match self {
            IssueCategory::Schema => "schema",
            IssueCategory::Orphan => "orphan",
            IssueCategory::DanglingEdge => "dangling_edge",
            IssueCategory::HierarchyCycle => "hierarchy_cycle",
            IssueCategory::Hierarchy => "hierarchy",
            IssueCategory::Completeness => "completeness",
            IssueCategory::Timeout => "timeout",
            IssueCategory::Internal => "internal",
        }
    }
}

impl fmt::Display for IssueCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// IssueRef
// ---------------------------------------------------------------------------

/// The graph location a finding refers to.
///
/// Rendered as a stable string in serialized output: `node "<id>"`,
/// `edge "<src> -> <dst> [<TYPE>]"`, or `(global)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueRef {
    /// A node, referenced by its graph-local id.
    Node {
        /// The node's `id` string.
        node_id: String,
    },
    /// An edge, referenced by endpoints and type (edges carry no own id).
    Edge {
        /// The edge's `source_id` string.
        source_id: String,
        /// The edge's `target_id` string.
        target_id: String,
        /// The edge's type string.
        edge_type: String,
    },
    /// A finding not attributable to a specific node or edge.
    Global,
}

impl IssueRef {
    /// Convenience constructor for node references.
    pub fn node(id: impl Into<String>) -> Self {
        Self::Node { node_id: id.into() }
    }

    /// Convenience constructor for edge references.
    pub fn edge(
        source_id: impl Into<String>,
        target_id: impl Into<String>,
        edge_type: impl Into<String>,
    ) -> Self {
        Self::Edge {
            source_id: source_id.into(),
            target_id: target_id.into(),
            edge_type: edge_type.into(),
        }
    }
}

impl fmt::Display for IssueRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Node { node_id } => write!(f, "node \"{node_id}\""),
            Self::Edge {
                source_id,
                target_id,
                edge_type,
            } => write!(f, "edge \"{source_id} -> {target_id} [{edge_type}]\""),
            Self::Global => f.write_str("(global)"),
        }
    }
}

// ---------------------------------------------------------------------------
// ValidationIssue
// ---------------------------------------------------------------------------

/// A single validation finding.
///
/// Serializes as `{"severity", "category", "message", "ref"}` with that key
/// order, `ref` being the rendered [`IssueRef`] string.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationIssue {
    /// The severity of this finding.
    pub severity: Severity,
    /// The category of this finding.
    pub category: IssueCategory,
    /// A human-readable explanation of the problem.
    pub message: String,
    /// Where in the graph the problem was detected.
    pub reference: IssueRef,
}

impl ValidationIssue {
    /// Constructs a new [`ValidationIssue`].
    pub fn new(
        severity: Severity,
        category: IssueCategory,
        reference: IssueRef,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            category,
            message: message.into(),
            reference,
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.severity {
            Severity::Critical => 'C',
            Severity::Error => 'E',
            Severity::Warning => 'W',
            Severity::Info => 'I',
        };
        write!(
            f,
            "[{tag}] {} {}: {}",
            self.category, self.reference, self.message
        )
    }
}

impl Serialize for ValidationIssue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("ValidationIssue", 4)?;
        s.serialize_field("severity", self.severity.as_str())?;
        s.serialize_field("category", self.category.as_str())?;
        s.serialize_field("message", &self.message)?;
        s.serialize_field("ref", &self.reference.to_string())?;
        s.end()
    }
}

// ---------------------------------------------------------------------------
// Issue list helpers
// ---------------------------------------------------------------------------

/// Returns `true` if `issues` contains no CRITICAL or ERROR entries.
///
/// This is the integrity pass criterion: WARNING and INFO do not block.
pub fn passes(issues: &[ValidationIssue]) -> bool {
    !issues.iter().any(|i| i.severity.is_blocking())
}

/// Counts the issues at the given severity.
pub fn count_at(issues: &[ValidationIssue], severity: Severity) -> usize {
    issues.iter().filter(|i| i.severity == severity).count()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use super::*;

    #[test]
    fn severity_blocking_split() {
        assert!(Severity::Critical.is_blocking());
        assert!(Severity::Error.is_blocking());
        assert!(!Severity::Warning.is_blocking());
        assert!(!Severity::Info.is_blocking());
    }

    #[test]
    fn issue_serializes_with_stable_keys() {
        let issue = ValidationIssue::new(
            Severity::Critical,
            IssueCategory::DanglingEdge,
            IssueRef::edge("a", "ghost", "CONTAINS"),
            "target \"ghost\" does not resolve to a node",
        );
        let json = serde_json::to_string(&issue).expect("serialize");
        assert_eq!(
            json,
            "{\"severity\":\"critical\",\"category\":\"dangling_edge\",\
             \"message\":\"target \\\"ghost\\\" does not resolve to a node\",\
             \"ref\":\"edge \\\"a -> ghost [CONTAINS]\\\"\"}"
        );
    }

    #[test]
    fn issue_display_has_severity_tag() {
        let issue = ValidationIssue::new(
            Severity::Warning,
            IssueCategory::Orphan,
            IssueRef::node("t1"),
            "taxonomy node has no edges",
        );
        let line = issue.to_string();
        assert!(line.starts_with("[W] orphan"), "line: {line}");
        assert!(line.contains("node \"t1\""), "line: {line}");
    }

    #[test]
    fn passes_ignores_warnings_and_info() {
        let issues = vec![
            ValidationIssue::new(
                Severity::Warning,
                IssueCategory::Schema,
                IssueRef::Global,
                "w",
            ),
            ValidationIssue::new(Severity::Info, IssueCategory::Completeness, IssueRef::Global, "i"),
        ];
        assert!(passes(&issues));
    }

    #[test]
    fn passes_fails_on_any_error() {
        let issues = vec![ValidationIssue::new(
            Severity::Error,
            IssueCategory::Orphan,
            IssueRef::node("p1"),
            "orphan",
        )];
        assert!(!passes(&issues));
        assert_eq!(count_at(&issues, Severity::Error), 1);
        assert_eq!(count_at(&issues, Severity::Critical), 0);
    }

    #[test]
    fn global_ref_renders_as_global() {
        assert_eq!(IssueRef::Global.to_string(), "(global)");
    }
}
