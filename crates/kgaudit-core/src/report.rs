/// The aggregated validation report and its serialized forms.
///
/// One [`Report`] per run. JSON is the machine-readable source of truth;
/// the Markdown rendering is derived from the same struct, never computed
/// independently. Serialization is deterministic: struct-declaration key
/// order, `BTreeMap` collections, and floats rounded to 4 decimal places
/// before they enter the report, so identical inputs and config produce
/// byte-identical documents.
use serde::Serialize;

use crate::budget::CheckRun;
use crate::completeness::CompletenessReport;
use crate::issue::{Severity, ValidationIssue, count_at, passes};
use crate::quality::QualityReport;

/// Rounds to 4 decimal places; applied to every float before reporting.
pub(crate) fn round4(x: f64) -> f64 {
    (x * 10_000.0).round() / 10_000.0
}

// ---------------------------------------------------------------------------
// Overall status
// ---------------------------------------------------------------------------

/// The aggregate verdict of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverallStatus {
    /// Integrity passed and completeness (if run) met its thresholds.
    Success,
    /// At least one blocking issue, or completeness missed a threshold.
    Failed,
}

impl OverallStatus {
    /// Returns the serialized string form.
    pub fn as_str(self) -> &'static str {
        match self {
            OverallStatus::Success => "success",
            OverallStatus::Failed => "failed",
        }
    }
}

impl Serialize for OverallStatus {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Integrity section
// ---------------------------------------------------------------------------

/// Check counts and the pass verdict for schema + integrity checks.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntegritySummary {
    /// Individual (entity, sub-check) evaluations performed.
    pub total_checks: usize,
    /// Checks that produced no CRITICAL or ERROR finding.
    pub passed: usize,
    /// CRITICAL and ERROR findings.
    pub failed: usize,
    /// `passed / total_checks × 100`; 100 when no checks ran.
    pub success_rate: f64,
    /// `true` if no CRITICAL or ERROR issue was found.
    pub is_valid: bool,
}

/// Issue counts bucketed by severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SeverityCounts {
    /// CRITICAL findings.
    pub critical: usize,
    /// ERROR findings.
    pub error: usize,
    /// WARNING findings.
    pub warning: usize,
    /// INFO findings.
    pub info: usize,
}

impl SeverityCounts {
    /// Tallies a list of issues.
    pub fn tally(issues: &[ValidationIssue]) -> Self {
        Self {
            critical: count_at(issues, Severity::Critical),
            error: count_at(issues, Severity::Error),
            warning: count_at(issues, Severity::Warning),
            info: count_at(issues, Severity::Info),
        }
    }

    /// Total number of issues across all severities.
    pub fn total(self) -> usize {
        self.critical + self.error + self.warning + self.info
    }
}

/// The integrity section of the report: summary, severity counts, and the
/// full issue list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntegritySection {
    /// Aggregate counts and the pass verdict.
    pub summary: IntegritySummary,
    /// Issue counts by severity.
    pub issues_by_severity: SeverityCounts,
    /// Every issue found, in detection order.
    pub issues: Vec<ValidationIssue>,
}

impl IntegritySection {
    /// Builds the section from the merged schema + integrity run.
    pub fn from_run(run: CheckRun) -> Self {
        let failed = run
            .issues
            .iter()
            .filter(|i| i.severity.is_blocking())
            .count();
        let passed = run.checks.saturating_sub(failed);
        let success_rate = if run.checks == 0 {
            100.0
        } else {
            round4(passed as f64 / run.checks as f64 * 100.0)
        };
        Self {
            summary: IntegritySummary {
                total_checks: run.checks,
                passed,
                failed,
                success_rate,
                is_valid: passes(&run.issues),
            },
            issues_by_severity: SeverityCounts::tally(&run.issues),
            issues: run.issues,
        }
    }
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// The aggregated report for one validation run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    /// The aggregate verdict.
    pub overall_status: OverallStatus,
    /// Schema + integrity findings.
    pub integrity: IntegritySection,
    /// Coverage analysis; `null` when no expected index was supplied.
    pub completeness: Option<CompletenessReport>,
    /// Graph quality metrics; `null` only if the metrics engine failed.
    pub quality: Option<QualityReport>,
}

impl Report {
    /// Serializes the report as compact JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serializes the report as pretty-printed JSON.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Renders the human-readable Markdown document.
    ///
    /// Derived from this struct only, so it can never disagree with the JSON.
    pub fn to_markdown(&self) -> String {
        let mut lines: Vec<String> = vec![
            "# Knowledge graph validation report".to_owned(),
            String::new(),
            format!("Overall status: **{}**", self.overall_status.as_str()),
            String::new(),
        ];
        self.markdown_integrity(&mut lines);
        self.markdown_completeness(&mut lines);
        self.markdown_quality(&mut lines);
        let mut out = lines.join("\n");
        out.push('\n');
        out
    }

    fn markdown_integrity(&self, lines: &mut Vec<String>) {
        let s = &self.integrity.summary;
        let by = self.integrity.issues_by_severity;
        lines.push("## Integrity".to_owned());
        lines.push(String::new());
        lines.push("| Metric | Value |".to_owned());
        lines.push("| --- | --- |".to_owned());
        lines.push(format!("| Total checks | {} |", s.total_checks));
        lines.push(format!("| Passed | {} |", s.passed));
        lines.push(format!("| Failed | {} |", s.failed));
        lines.push(format!("| Success rate | {:.4}% |", s.success_rate));
        lines.push(format!("| Valid | {} |", s.is_valid));
        lines.push(String::new());
        lines.push(format!(
            "Issues: {} critical, {} error, {} warning, {} info",
            by.critical, by.error, by.warning, by.info
        ));
        lines.push(String::new());
        if self.integrity.issues.is_empty() {
            lines.push("No issues found.".to_owned());
        } else {
            for issue in &self.integrity.issues {
                lines.push(format!("- {issue}"));
            }
        }
        lines.push(String::new());
    }

    fn markdown_completeness(&self, lines: &mut Vec<String>) {
        lines.push("## Completeness".to_owned());
        lines.push(String::new());
        let Some(c) = &self.completeness else {
            lines.push("Skipped: no expected-entity index was supplied.".to_owned());
            lines.push(String::new());
            return;
        };
        lines.push("| Metric | Value |".to_owned());
        lines.push("| --- | --- |".to_owned());
        for (kind, pct) in &c.node_completeness {
            lines.push(format!("| {kind} nodes | {pct:.4}% |"));
        }
        lines.push(format!("| Containment edges | {:.4}% |", c.edge_completeness));
        for (kind, fields) in &c.property_completeness {
            for (field, pct) in fields {
                lines.push(format!("| {kind}.{field} property | {pct:.4}% |"));
            }
        }
        lines.push(format!("| Passes requirements | {} |", c.passes_requirements));
        lines.push(String::new());
        if !c.missing_entities.is_empty() {
            lines.push("Missing entities (sampled):".to_owned());
            lines.push(String::new());
            for (kind, entities) in &c.missing_entities {
                for entity in entities {
                    lines.push(format!("- {kind}: {entity}"));
                }
            }
            lines.push(String::new());
        }
        for warning in &c.warnings {
            lines.push(format!("> {warning}"));
            lines.push(String::new());
        }
    }

    fn markdown_quality(&self, lines: &mut Vec<String>) {
        lines.push("## Quality".to_owned());
        lines.push(String::new());
        let Some(q) = &self.quality else {
            lines.push("Quality metrics are unavailable for this run.".to_owned());
            return;
        };
        lines.push("| Metric | Value |".to_owned());
        lines.push("| --- | --- |".to_owned());
        lines.push(format!("| Density | {:.4} |", q.density));
        lines.push(format!("| Average degree | {:.4} |", q.avg_degree));
        lines.push(format!("| Connected components | {} |", q.connected_components));
        lines.push(format!(
            "| Largest component | {} ({:.4}%) |",
            q.largest_component_size, q.largest_component_pct
        ));
        lines.push(format!("| Isolated nodes | {:.4}% |", q.isolated_node_pct));
        lines.push(format!("| Average path length | {:.4} |", q.avg_path_length));
        lines.push(format!("| Diameter (sampled lower bound) | {} |", q.diameter));
        lines.push(format!("| BFS sources sampled | {} |", q.sampled_sources));
        lines.push(format!(
            "| Clustering coefficient | {:.4} |",
            q.clustering_coefficient
        ));
        lines.push(format!("| Quality score | {:.4} |", q.quality_score));
        lines.push(String::new());
        if !q.hub_nodes.is_empty() {
            lines.push("Hub nodes:".to_owned());
            lines.push(String::new());
            lines.push("| Node | Degree |".to_owned());
            lines.push("| --- | --- |".to_owned());
            for hub in &q.hub_nodes {
                lines.push(format!("| {} | {} |", hub.id, hub.degree));
            }
            lines.push(String::new());
        }
        lines.push(format!("Score formula: `{}`", q.score_formula));
    }
}

// ---------------------------------------------------------------------------
// Output formats
// ---------------------------------------------------------------------------

/// Requested serialization format for [`Report`] emission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    /// Machine-readable pretty-printed JSON.
    Json,
    /// Human-readable Markdown derived from the JSON structure.
    Markdown,
}

impl ReportFormat {
    /// Conventional file name for this format under an output directory.
    pub fn file_name(self) -> &'static str {
        match self {
            ReportFormat::Json => "report.json",
            ReportFormat::Markdown => "report.md",
        }
    }

    /// Renders the report in this format.
    pub fn render(self, report: &Report) -> Result<String, serde_json::Error> {
        match self {
            ReportFormat::Json => report.to_json_pretty(),
            ReportFormat::Markdown => Ok(report.to_markdown()),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
