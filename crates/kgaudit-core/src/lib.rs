#![deny(clippy::print_stdout, clippy::print_stderr)]

pub mod budget;
pub mod completeness;
pub mod enums;
pub mod expected;
pub mod graph;
pub mod integrity;
pub mod issue;
pub mod newtypes;
pub mod orchestrator;
pub mod quality;
pub mod report;
pub mod schema;
pub mod snapshot;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use budget::{CheckRun, Deadline};
pub use completeness::{CompletenessConfig, CompletenessReport, analyze_completeness};
pub use enums::{EdgeType, EdgeTypeTag, NodeType, NodeTypeTag};
pub use expected::ExpectedEntityIndex;
pub use graph::{
    ContentGraph, DanglingRef, EdgeWeight, Endpoint, NodeWeight, build_graph,
};
pub use integrity::{
    check_integrity, detect_cycles, detect_dangling_edges, detect_multi_parents, detect_orphans,
};
pub use issue::{IssueCategory, IssueRef, Severity, ValidationIssue, count_at, passes};
pub use newtypes::{NewtypeError, NodeId};
pub use orchestrator::{
    EngineConfig, EngineError, EngineState, LoadError, ValidationOrchestrator,
};
pub use quality::{HubNode, QualityConfig, QualityReport, ScoreWeights, compute};
pub use report::{
    IntegritySection, IntegritySummary, OverallStatus, Report, ReportFormat, SeverityCounts,
};
pub use schema::validate_schema;
pub use snapshot::{Edge, GraphSnapshot, Node, PropertyMap};

/// Returns the current version of the kgaudit-core library.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
