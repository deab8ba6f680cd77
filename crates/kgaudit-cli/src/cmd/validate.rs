//! The `validate` subcommand: run the engine end to end over one snapshot.
//!
//! Drives a [`ValidationOrchestrator`] through load → run → emit, prints
//! issues and a summary in the selected output format, optionally writes
//! `report.json` and `report.md` to a directory, and maps the overall status
//! to the process exit code (0 success, 1 failed, 2 load error).
use std::io::Write as _;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use kgaudit_core::{
    EngineConfig, EngineError, OverallStatus, QualityConfig, Report, ReportFormat,
    ValidationOrchestrator,
};

use crate::cli::OutputFormat;
use crate::error::CliError;
use crate::format::{FormatterConfig, write_issue_human, write_summary_human, write_timing_human};
use crate::io::write_output;

/// Tuning knobs collected from the `validate` CLI flags.
#[derive(Debug, Clone)]
pub struct ValidateOptions {
    /// Minimum total degree for a node to count as a hub.
    pub hub_threshold: usize,
    /// Number of BFS sources for sampled path metrics.
    pub sample_size: usize,
    /// Seed for the path-metric source sampling.
    pub seed: u64,
    /// Per-sub-validator time budget in milliseconds.
    pub time_budget_ms: Option<u64>,
    /// Directory to write `report.json` and `report.md` into.
    pub output_dir: Option<PathBuf>,
}

/// Runs validation over already-read input documents.
///
/// # Errors
///
/// - [`CliError::LoadFailed`] (exit 2) when either document fails to parse.
/// - [`CliError::ValidationFailed`] (exit 1) when the run completes with an
///   overall status of failed.
/// - [`CliError::EmitFailed`] / [`CliError::IoError`] when rendering or
///   writing the report fails.
pub fn run(
    graph_content: &str,
    expected_content: Option<&str>,
    options: &ValidateOptions,
    format: &OutputFormat,
    formatter: &FormatterConfig,
) -> Result<(), CliError> {
    let config = EngineConfig {
        quality: QualityConfig {
            hub_threshold: options.hub_threshold,
            sample_size: options.sample_size,
            rng_seed: options.seed,
            ..QualityConfig::default()
        },
        time_budget: options.time_budget_ms.map(Duration::from_millis),
        ..EngineConfig::default()
    };

    let mut orchestrator = ValidationOrchestrator::new(config);
    orchestrator
        .load_graph_str(graph_content)
        .map_err(engine_to_cli)?;
    if let Some(raw) = expected_content {
        orchestrator.load_expected_str(raw).map_err(engine_to_cli)?;
    }

    let started = Instant::now();
    orchestrator.run().map_err(engine_to_cli)?;
    let elapsed = started.elapsed();

    let Some(report) = orchestrator.report() else {
        return Err(CliError::EmitFailed {
            detail: "no report was produced".to_owned(),
        });
    };

    if let Some(dir) = &options.output_dir {
        std::fs::create_dir_all(dir).map_err(|e| CliError::IoError {
            source: dir.display().to_string(),
            detail: e.to_string(),
        })?;
        let formats = [ReportFormat::Json, ReportFormat::Markdown];
        let documents = orchestrator.emit(&formats).map_err(engine_to_cli)?;
        for (fmt, document) in formats.iter().zip(&documents) {
            write_output(dir, fmt.file_name(), document)?;
        }
    }

    match format {
        OutputFormat::Json => {
            let documents = orchestrator
                .emit(&[ReportFormat::Json])
                .map_err(engine_to_cli)?;
            if let Some(document) = documents.first() {
                println!("{document}");
            }
        }
        OutputFormat::Human => {
            print_human(report, elapsed, formatter).map_err(|e| CliError::IoError {
                source: "stderr".to_owned(),
                detail: e.to_string(),
            })?;
        }
    }

    match report.overall_status {
        OverallStatus::Success => Ok(()),
        OverallStatus::Failed => Err(CliError::ValidationFailed),
    }
}

/// Writes the issue list, summary line, and optional timing to stderr.
fn print_human(
    report: &Report,
    elapsed: Duration,
    formatter: &FormatterConfig,
) -> std::io::Result<()> {
    let stderr = std::io::stderr();
    let mut handle = stderr.lock();
    for issue in &report.integrity.issues {
        write_issue_human(&mut handle, issue, formatter)?;
    }
    write_summary_human(
        &mut handle,
        report.overall_status.as_str(),
        report.integrity.summary.total_checks,
        report.integrity.issues_by_severity,
        formatter,
    )?;
    write_timing_human(&mut handle, "validated", elapsed, formatter)?;
    handle.flush()
}

/// Maps orchestrator errors onto CLI exit semantics.
fn engine_to_cli(e: EngineError) -> CliError {
    match e {
        EngineError::Load(load) => CliError::LoadFailed {
            detail: load.to_string(),
        },
        EngineError::InvalidState { .. } | EngineError::Emit(_) => CliError::EmitFailed {
            detail: e.to_string(),
        },
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]
    #![allow(clippy::panic)]
    #![allow(clippy::wildcard_enum_match_arm)]

    use super::*;

    const CHAIN: &str = r#"{
        "nodes": [
            { "id": "p1", "type": "Page",
              "properties": { "url": "https://example.com/p1", "title": "P1" } },
            { "id": "s1", "type": "Section",
              "properties": { "page_id": "p1", "order": 0 } },
            { "id": "c1", "type": "ContentItem",
              "properties": { "hash": "h1", "text": "body" } }
        ],
        "edges": [
            { "source_id": "p1", "target_id": "s1", "type": "CONTAINS",
              "properties": { "order": 0 } },
            { "source_id": "s1", "target_id": "c1", "type": "CONTAINS",
              "properties": { "order": 0 } }
        ]
    }"#;

    const DANGLING: &str = r#"{
        "nodes": [
            { "id": "p1", "type": "Page",
              "properties": { "url": "https://example.com/p1", "title": "P1" } }
        ],
        "edges": [
            { "source_id": "p1", "target_id": "ghost", "type": "CONTAINS",
              "properties": { "order": 0 } }
        ]
    }"#;

    fn default_options() -> ValidateOptions {
        ValidateOptions {
            hub_threshold: 10,
            sample_size: 100,
            seed: 42,
            time_budget_ms: None,
            output_dir: None,
        }
    }

    fn silent_formatter() -> FormatterConfig {
        FormatterConfig {
            colors: false,
            quiet: true,
            verbose: false,
        }
    }

    #[test]
    fn valid_chain_succeeds() {
        let result = run(
            CHAIN,
            None,
            &default_options(),
            &OutputFormat::Human,
            &silent_formatter(),
        );
        assert!(result.is_ok(), "result: {result:?}");
    }

    #[test]
    fn unparseable_graph_exits_with_two() {
        let err = run(
            "{ not json",
            None,
            &default_options(),
            &OutputFormat::Human,
            &silent_formatter(),
        )
        .expect_err("should fail to load");
        assert_eq!(err.exit_code(), 2);
        assert!(matches!(err, CliError::LoadFailed { .. }));
    }

    #[test]
    fn unparseable_expected_index_exits_with_two() {
        let err = run(
            CHAIN,
            Some("[1, 2]"),
            &default_options(),
            &OutputFormat::Human,
            &silent_formatter(),
        )
        .expect_err("should fail to load");
        assert_eq!(err.exit_code(), 2);
        assert!(matches!(err, CliError::LoadFailed { .. }));
    }

    #[test]
    fn dangling_edge_exits_with_one() {
        let err = run(
            DANGLING,
            None,
            &default_options(),
            &OutputFormat::Human,
            &silent_formatter(),
        )
        .expect_err("should fail validation");
        assert_eq!(err.exit_code(), 1);
        assert!(matches!(err, CliError::ValidationFailed));
    }

    #[test]
    fn output_dir_receives_both_report_files() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let options = ValidateOptions {
            output_dir: Some(dir.path().to_path_buf()),
            ..default_options()
        };
        run(CHAIN, None, &options, &OutputFormat::Human, &silent_formatter())
            .expect("should succeed");

        let json =
            std::fs::read_to_string(dir.path().join("report.json")).expect("report.json");
        let parsed: serde_json::Value = serde_json::from_str(&json).expect("valid JSON");
        assert_eq!(parsed["overall_status"], "success");

        let markdown =
            std::fs::read_to_string(dir.path().join("report.md")).expect("report.md");
        assert!(markdown.starts_with("# Knowledge graph validation report"));
    }

    #[test]
    fn output_dir_is_created_when_missing() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let nested = dir.path().join("reports").join("latest");
        let options = ValidateOptions {
            output_dir: Some(nested.clone()),
            ..default_options()
        };
        run(CHAIN, None, &options, &OutputFormat::Human, &silent_formatter())
            .expect("should succeed");
        assert!(nested.join("report.json").is_file());
    }

    #[test]
    fn tuning_flags_reach_the_quality_config() {
        // A hub threshold of 1 turns every connected node into a hub, which
        // only shows up if the options actually flow through.
        let dir = tempfile::tempdir().expect("create temp dir");
        let options = ValidateOptions {
            hub_threshold: 1,
            output_dir: Some(dir.path().to_path_buf()),
            ..default_options()
        };
        run(CHAIN, None, &options, &OutputFormat::Human, &silent_formatter())
            .expect("should succeed");
        let json =
            std::fs::read_to_string(dir.path().join("report.json")).expect("report.json");
        let parsed: serde_json::Value = serde_json::from_str(&json).expect("valid JSON");
        let hubs = parsed["quality"]["hub_nodes"]
            .as_array()
            .expect("hub_nodes array");
        assert_eq!(hubs.len(), 3, "all three chain nodes have degree >= 1");
    }
}
