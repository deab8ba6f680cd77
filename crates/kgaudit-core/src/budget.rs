/// Per-sub-validator time budgets.
///
/// Every sub-validator accepts a [`Deadline`] and checks it between entities.
/// Expiry never aborts the run: the sub-validator stops early, keeps the
/// findings it already produced, and records a WARNING `timeout` issue.
/// Cancellation granularity is per sub-validator; there is no cancellation
/// mid-entity-check.
use std::time::{Duration, Instant};

use crate::issue::{IssueCategory, IssueRef, Severity, ValidationIssue};

/// A deadline for one sub-validator run.
///
/// A deadline without a budget never expires.
#[derive(Debug, Clone)]
pub struct Deadline {
    start: Instant,
    budget: Option<Duration>,
}

impl Deadline {
    /// Starts a deadline with the given budget; `None` means unlimited.
    pub fn new(budget: Option<Duration>) -> Self {
        Self {
            start: Instant::now(),
            budget,
        }
    }

    /// Starts a deadline that never expires.
    pub fn unlimited() -> Self {
        Self::new(None)
    }

    /// Returns `true` once the budget has been exhausted.
    pub fn expired(&self) -> bool {
        match self.budget {
            Some(budget) => self.start.elapsed() >= budget,
            None => false,
        }
    }

    /// Builds the WARNING issue recorded when a sub-validator times out.
    ///
    /// `validator` names the sub-validator; its findings so far are preserved.
    pub fn timeout_issue(&self, validator: &str) -> ValidationIssue {
        ValidationIssue::new(
            Severity::Warning,
            IssueCategory::Timeout,
            IssueRef::Global,
            format!("{validator} exceeded its time budget; partial results kept"),
        )
    }
}

/// The outcome of one sub-validator run: how many checks were evaluated and
/// what they found.
///
/// `checks` counts (entity, sub-check) evaluations and feeds the integrity
/// summary's `total_checks`.
#[derive(Debug, Clone, Default)]
pub struct CheckRun {
    /// Number of individual checks evaluated.
    pub checks: usize,
    /// Findings produced by those checks.
    pub issues: Vec<ValidationIssue>,
}

impl CheckRun {
    /// Creates an empty run.
    pub fn new() -> Self {
        Self::default()
    }

    /// Merges another run into this one.
    pub fn absorb(&mut self, other: CheckRun) {
        self.checks += other.checks;
        self.issues.extend(other.issues);
    }
}
