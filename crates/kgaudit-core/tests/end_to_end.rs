//! End-to-end runs of the full validation engine through the public API.
#![allow(clippy::expect_used)]

use kgaudit_core::{
    Deadline, EngineConfig, EngineState, IssueCategory, OverallStatus, ReportFormat, Severity,
    ValidationOrchestrator, build_graph, detect_cycles, detect_orphans,
};

const CHAIN_GRAPH: &str = r#"{
    "nodes": [
        { "id": "P1", "type": "Page",
          "properties": { "url": "https://example.com/p1", "title": "Page one" } },
        { "id": "S1", "type": "Section",
          "properties": { "page_id": "P1", "order": 0 } },
        { "id": "C1", "type": "ContentItem",
          "properties": { "hash": "hash-c1", "text": "hello" } }
    ],
    "edges": [
        { "source_id": "P1", "target_id": "S1", "type": "CONTAINS",
          "properties": { "order": 0 } },
        { "source_id": "S1", "target_id": "C1", "type": "CONTAINS",
          "properties": { "order": 0 } }
    ]
}"#;

const CHAIN_EXPECTED: &str = r#"{
    "expected_pages": ["P1"],
    "expected_sections_by_page": { "P1": ["S1"] },
    "expected_content_by_section": { "S1": ["hash-c1"] }
}"#;

fn run_chain() -> ValidationOrchestrator {
    let mut orch = ValidationOrchestrator::new(EngineConfig::default());
    orch.load_graph_str(CHAIN_GRAPH).expect("load graph");
    orch.load_expected_str(CHAIN_EXPECTED).expect("load expected");
    orch.run().expect("run");
    orch
}

#[test]
fn chain_scenario_succeeds_across_all_sections() {
    let orch = run_chain();
    assert_eq!(orch.state(), EngineState::Reported);
    let report = orch.report().expect("report present");

    assert_eq!(report.overall_status, OverallStatus::Success);
    assert!(report.integrity.summary.is_valid);
    assert_eq!(report.integrity.issues_by_severity.critical, 0);
    assert_eq!(report.integrity.issues_by_severity.error, 0);

    let completeness = report.completeness.as_ref().expect("completeness present");
    assert_eq!(completeness.node_completeness["Page"], 100.0);
    assert_eq!(completeness.node_completeness["Section"], 100.0);
    assert_eq!(completeness.node_completeness["ContentItem"], 100.0);
    assert_eq!(completeness.edge_completeness, 100.0);
    assert!(completeness.passes_requirements);

    let quality = report.quality.as_ref().expect("quality present");
    assert_eq!(quality.density, 0.3333);
    assert_eq!(quality.avg_degree, 1.3333);
    assert_eq!(quality.connected_components, 1);
    assert_eq!(quality.largest_component_pct, 100.0);
    assert_eq!(quality.isolated_node_pct, 0.0);
}

#[test]
fn emitted_documents_are_byte_identical_across_runs() {
    let a = run_chain()
        .emit(&[ReportFormat::Json, ReportFormat::Markdown])
        .expect("emit");
    let b = run_chain()
        .emit(&[ReportFormat::Json, ReportFormat::Markdown])
        .expect("emit");
    assert_eq!(a, b);
    assert!(a[0].starts_with('{'));
    assert!(a[1].starts_with("# Knowledge graph validation report"));
}

#[test]
fn contains_cycle_yields_one_critical_and_chain_yields_none() {
    let cycle: kgaudit_core::GraphSnapshot = serde_json::from_str(
        r#"{
            "nodes": [
                { "id": "A", "type": "Page" },
                { "id": "B", "type": "Page" },
                { "id": "C", "type": "Page" }
            ],
            "edges": [
                { "source_id": "A", "target_id": "B", "type": "CONTAINS" },
                { "source_id": "B", "target_id": "C", "type": "CONTAINS" },
                { "source_id": "C", "target_id": "A", "type": "CONTAINS" }
            ]
        }"#,
    )
    .expect("deserialize");
    let run = detect_cycles(&build_graph(&cycle), &Deadline::unlimited());
    assert_eq!(run.issues.len(), 1);
    assert_eq!(run.issues[0].severity, Severity::Critical);
    for id in ["A", "B", "C"] {
        assert!(
            run.issues[0].message.contains(id),
            "cycle message should mention {id}: {}",
            run.issues[0].message
        );
    }

    let chain: kgaudit_core::GraphSnapshot = serde_json::from_str(
        r#"{
            "nodes": [
                { "id": "A", "type": "Page" },
                { "id": "B", "type": "Page" },
                { "id": "C", "type": "Page" }
            ],
            "edges": [
                { "source_id": "A", "target_id": "B", "type": "CONTAINS" },
                { "source_id": "B", "target_id": "C", "type": "CONTAINS" }
            ]
        }"#,
    )
    .expect("deserialize");
    let run = detect_cycles(&build_graph(&chain), &Deadline::unlimited());
    assert!(run.issues.is_empty());
}

#[test]
fn edgeless_non_taxonomy_nodes_yield_one_error_orphan_each() {
    let nodes: Vec<String> = (0..7)
        .map(|i| format!(r#"{{ "id": "e{i}", "type": "Entity" }}"#))
        .collect();
    let raw = format!(r#"{{ "nodes": [{}], "edges": [] }}"#, nodes.join(", "));
    let snap: kgaudit_core::GraphSnapshot = serde_json::from_str(&raw).expect("deserialize");
    let run = detect_orphans(&snap, &build_graph(&snap), &Deadline::unlimited());
    assert_eq!(run.issues.len(), 7);
    assert!(run.issues.iter().all(|i| i.severity == Severity::Error));
    assert!(run.issues.iter().all(|i| i.category == IssueCategory::Orphan));
}

#[test]
fn dangling_edge_is_reported_exactly_once_and_fails_the_run() {
    let raw = r#"{
        "nodes": [{ "id": "X", "type": "Page",
                    "properties": { "url": "https://example.com", "title": "X" } }],
        "edges": [{ "source_id": "X", "target_id": "missing-id", "type": "LINKS_TO" }]
    }"#;
    let mut orch = ValidationOrchestrator::new(EngineConfig::default());
    orch.load_graph_str(raw).expect("load graph");
    let report = orch.run().expect("run");

    assert_eq!(report.overall_status, OverallStatus::Failed);
    let dangling: Vec<_> = report
        .integrity
        .issues
        .iter()
        .filter(|i| i.category == IssueCategory::DanglingEdge)
        .collect();
    assert_eq!(dangling.len(), 1);
    assert_eq!(dangling[0].severity, Severity::Critical);
    assert!(dangling[0].message.contains("missing-id"));
}

#[test]
fn report_json_matches_the_published_shape() {
    let orch = run_chain();
    let json = orch.emit(&[ReportFormat::Json]).expect("emit");
    let value: serde_json::Value = serde_json::from_str(&json[0]).expect("valid json");

    assert_eq!(value["overall_status"], "success");
    assert!(value["integrity"]["summary"]["total_checks"].is_u64());
    assert!(value["integrity"]["summary"]["success_rate"].is_number());
    assert!(value["integrity"]["issues_by_severity"]["critical"].is_u64());
    assert!(value["integrity"]["issues"].is_array());
    assert!(value["completeness"]["node_completeness"]["Page"].is_number());
    assert!(value["completeness"]["property_completeness"]["Page"]["url"].is_number());
    assert!(value["completeness"]["missing_entities"].is_object());
    assert!(value["completeness"]["passes_requirements"].is_boolean());
    assert!(value["quality"]["density"].is_number());
    assert!(value["quality"]["hub_nodes"].is_array());
    assert!(value["quality"]["quality_score"].is_number());
}
