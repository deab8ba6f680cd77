/// Run lifecycle: load, validate, aggregate, emit.
///
/// The orchestrator owns the state machine
/// `Init → Loaded → Validating → Reported`, with the terminal `FailedLoad`
/// reachable only before validation starts. A malformed input document is the
/// single fatal condition in the engine; every other problem becomes an issue
/// in the report. Each sub-validator runs under `catch_unwind`, so an
/// unexpected panic while processing one entity is converted into a CRITICAL
/// `internal` issue and the run continues with the remaining sub-validators.
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::Duration;

use crate::budget::{CheckRun, Deadline};
use crate::completeness::{CompletenessConfig, CompletenessReport, analyze_completeness};
use crate::expected::ExpectedEntityIndex;
use crate::graph::build_graph;
use crate::integrity::check_integrity;
use crate::issue::{IssueCategory, IssueRef, Severity, ValidationIssue};
use crate::quality::{QualityConfig, QualityReport, compute};
use crate::report::{IntegritySection, OverallStatus, Report, ReportFormat};
use crate::schema::validate_schema;
use crate::snapshot::GraphSnapshot;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// A fatal input-parsing failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// The graph snapshot document could not be parsed.
    Graph {
        /// Parser diagnostic.
        detail: String,
    },
    /// The expected-entity index document could not be parsed.
    ExpectedIndex {
        /// Parser diagnostic.
        detail: String,
    },
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Graph { detail } => write!(f, "failed to parse graph snapshot: {detail}"),
            Self::ExpectedIndex { detail } => {
                write!(f, "failed to parse expected-entity index: {detail}")
            }
        }
    }
}

impl std::error::Error for LoadError {}

/// Errors surfaced by the orchestrator's lifecycle methods.
#[derive(Debug)]
pub enum EngineError {
    /// Input parsing failed; the run is in `FailedLoad`.
    Load(LoadError),
    /// A lifecycle method was called from the wrong state.
    InvalidState {
        /// The operation that was attempted.
        operation: &'static str,
        /// The state the orchestrator was actually in.
        state: EngineState,
    },
    /// Report serialization failed during `emit`.
    Emit(serde_json::Error),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Load(e) => e.fmt(f),
            Self::InvalidState { operation, state } => {
                write!(f, "cannot {operation} from state {state}")
            }
            Self::Emit(e) => write!(f, "failed to serialize report: {e}"),
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Load(e) => Some(e),
            Self::InvalidState { .. } => None,
            Self::Emit(e) => Some(e),
        }
    }
}

impl From<LoadError> for EngineError {
    fn from(e: LoadError) -> Self {
        Self::Load(e)
    }
}

// ---------------------------------------------------------------------------
// State machine
// ---------------------------------------------------------------------------

/// Lifecycle state of a validation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// Nothing loaded yet.
    Init,
    /// A graph snapshot was loaded successfully.
    Loaded,
    /// Sub-validators are running.
    Validating,
    /// Terminal: a report is available.
    Reported,
    /// Terminal: input parsing failed.
    FailedLoad,
}

impl EngineState {
    /// Returns the state name used in error messages.
    pub fn as_str(self) -> &'static str {
        match self {
            EngineState::Init => "init",
            EngineState::Loaded => "loaded",
            EngineState::Validating => "validating",
            EngineState::Reported => "reported",
            EngineState::FailedLoad => "failed-load",
        }
    }
}

impl fmt::Display for EngineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Configuration for one validation run.
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    /// Completeness thresholds and sampling limits.
    pub completeness: CompletenessConfig,
    /// Quality metric tuning.
    pub quality: QualityConfig,
    /// Per-sub-validator time budget; `None` means unlimited.
    pub time_budget: Option<Duration>,
}

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

/// Drives one validation run from raw input documents to an emitted report.
#[derive(Debug)]
pub struct ValidationOrchestrator {
    config: EngineConfig,
    state: EngineState,
    snapshot: Option<GraphSnapshot>,
    expected: Option<ExpectedEntityIndex>,
    report: Option<Report>,
}

impl ValidationOrchestrator {
    /// Creates an orchestrator in the `Init` state.
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            state: EngineState::Init,
            snapshot: None,
            expected: None,
            report: None,
        }
    }

    /// Returns the current lifecycle state.
    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Parses and stores the graph snapshot document.
    ///
    /// A parse failure is fatal: the run transitions to `FailedLoad` and
    /// nothing else can be done with this orchestrator.
    pub fn load_graph_str(&mut self, raw: &str) -> Result<(), EngineError> {
        if self.state != EngineState::Init {
            return Err(EngineError::InvalidState {
                operation: "load a graph",
                state: self.state,
            });
        }
        match serde_json::from_str::<GraphSnapshot>(raw) {
            Ok(snapshot) => {
                self.snapshot = Some(snapshot);
                self.state = EngineState::Loaded;
                Ok(())
            }
            Err(e) => {
                self.state = EngineState::FailedLoad;
                Err(LoadError::Graph {
                    detail: e.to_string(),
                }
                .into())
            }
        }
    }

    /// Parses and stores the optional expected-entity index.
    ///
    /// May be called once after the graph has loaded. A parse failure is
    /// fatal, same as a graph load failure.
    pub fn load_expected_str(&mut self, raw: &str) -> Result<(), EngineError> {
        if self.state != EngineState::Loaded {
            return Err(EngineError::InvalidState {
                operation: "load an expected-entity index",
                state: self.state,
            });
        }
        match serde_json::from_str::<ExpectedEntityIndex>(raw) {
            Ok(index) => {
                self.expected = Some(index);
                Ok(())
            }
            Err(e) => {
                self.state = EngineState::FailedLoad;
                Err(LoadError::ExpectedIndex {
                    detail: e.to_string(),
                }
                .into())
            }
        }
    }

    /// Runs every sub-validator and aggregates the report.
    ///
    /// `overall_status` is `success` iff the integrity checks pass and
    /// completeness was either skipped or met its thresholds.
    pub fn run(&mut self) -> Result<&Report, EngineError> {
        if self.state != EngineState::Loaded {
            return Err(EngineError::InvalidState {
                operation: "run validation",
                state: self.state,
            });
        }
        self.state = EngineState::Validating;

        // Taking the snapshot out keeps the borrow checker simple; the run
        // is single-shot so it is never needed again.
        let Some(snapshot) = self.snapshot.take() else {
            return Err(EngineError::InvalidState {
                operation: "run validation",
                state: self.state,
            });
        };
        let graph = build_graph(&snapshot);
        let budget = self.config.time_budget;

        let mut merged = CheckRun::new();

        match guarded("schema validator", || {
            validate_schema(&snapshot, &Deadline::new(budget))
        }) {
            Ok(run) => merged.absorb(run),
            Err(issue) => merged.issues.push(issue),
        }

        match guarded("integrity checker", || {
            check_integrity(&snapshot, &graph, &Deadline::new(budget))
        }) {
            Ok(run) => merged.absorb(run),
            Err(issue) => merged.issues.push(issue),
        }

        let mut completeness_failed = false;
        let completeness: Option<CompletenessReport> = match &self.expected {
            Some(expected) => {
                match guarded("completeness analyzer", || {
                    analyze_completeness(
                        &snapshot,
                        expected,
                        &self.config.completeness,
                        &Deadline::new(budget),
                    )
                }) {
                    Ok(report) => Some(report),
                    Err(issue) => {
                        // Thresholds could not be verified, so the run fails.
                        completeness_failed = true;
                        merged.issues.push(issue);
                        None
                    }
                }
            }
            None => {
                merged.issues.push(ValidationIssue::new(
                    Severity::Info,
                    IssueCategory::Completeness,
                    IssueRef::Global,
                    "completeness skipped: no expected-entity index supplied",
                ));
                None
            }
        };

        let quality: Option<QualityReport> = match guarded("quality metrics engine", || {
            compute(&graph, &self.config.quality, &Deadline::new(budget))
        }) {
            Ok((report, issues)) => {
                merged.issues.extend(issues);
                Some(report)
            }
            Err(issue) => {
                merged.issues.push(issue);
                None
            }
        };

        let integrity = IntegritySection::from_run(merged);
        let completeness_ok = match &completeness {
            Some(c) => c.passes_requirements,
            None => !completeness_failed,
        };
        let overall_status = if integrity.summary.is_valid && completeness_ok {
            OverallStatus::Success
        } else {
            OverallStatus::Failed
        };

        self.report = Some(Report {
            overall_status,
            integrity,
            completeness,
            quality,
        });
        self.state = EngineState::Reported;
        self.report.as_ref().ok_or(EngineError::InvalidState {
            operation: "read the report",
            state: self.state,
        })
    }

    /// Returns the aggregated report, if the run has completed.
    pub fn report(&self) -> Option<&Report> {
        self.report.as_ref()
    }

    /// Renders the report in each requested format, in request order.
    pub fn emit(&self, formats: &[ReportFormat]) -> Result<Vec<String>, EngineError> {
        let Some(report) = (self.state == EngineState::Reported)
            .then(|| self.report.as_ref())
            .flatten()
        else {
            return Err(EngineError::InvalidState {
                operation: "emit a report",
                state: self.state,
            });
        };
        formats
            .iter()
            .map(|format| format.render(report).map_err(EngineError::Emit))
            .collect()
    }
}

/// Runs one sub-validator, converting a panic into a CRITICAL `internal`
/// issue so a single bad entity never aborts the run.
fn guarded<T>(validator: &str, f: impl FnOnce() -> T) -> Result<T, ValidationIssue> {
    catch_unwind(AssertUnwindSafe(f)).map_err(|payload| {
        let detail = payload
            .downcast_ref::<&str>()
            .map(|s| (*s).to_owned())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_owned());
        ValidationIssue::new(
            Severity::Critical,
            IssueCategory::Internal,
            IssueRef::Global,
            format!("{validator} failed unexpectedly: {detail}"),
        )
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
