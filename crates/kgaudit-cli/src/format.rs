//! Human-readable issue formatting for stderr.
//!
//! One line per [`kgaudit_core::ValidationIssue`], color-coded by severity.
//! Colors are disabled when `--no-color` is set, the `NO_COLOR` environment
//! variable is present (per <https://no-color.org>), or stderr is not a TTY.
//! Quiet mode suppresses WARNING and INFO lines and the summary; verbose mode
//! adds timing lines.
use std::io::{IsTerminal as _, Write};
use std::time::Duration;

use kgaudit_core::{Severity, SeverityCounts, ValidationIssue};

// ---------------------------------------------------------------------------
// Color support detection
// ---------------------------------------------------------------------------

/// Returns `true` if ANSI color codes should be emitted to stderr.
pub fn colors_enabled(no_color_flag: bool) -> bool {
    if no_color_flag {
        return false;
    }
    // Presence of NO_COLOR (any value) disables color.
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    std::io::stderr().is_terminal()
}

// ---------------------------------------------------------------------------
// ANSI escape sequences
// ---------------------------------------------------------------------------

const ANSI_BOLD_RED: &str = "\x1b[1;31m";
const ANSI_RED: &str = "\x1b[31m";
const ANSI_YELLOW: &str = "\x1b[33m";
const ANSI_CYAN: &str = "\x1b[36m";
const ANSI_RESET: &str = "\x1b[0m";

// ---------------------------------------------------------------------------
// FormatterConfig
// ---------------------------------------------------------------------------

/// Configuration for the issue formatter, derived from CLI flags.
#[derive(Debug, Clone)]
pub struct FormatterConfig {
    /// Whether ANSI colors are enabled.
    pub colors: bool,
    /// Suppress all non-blocking stderr output.
    pub quiet: bool,
    /// Emit timing lines to stderr.
    pub verbose: bool,
}

impl FormatterConfig {
    /// Constructs a [`FormatterConfig`] from the raw CLI flags.
    ///
    /// `no_color_flag` is the `--no-color` boolean. Color detection also
    /// checks the `NO_COLOR` env var and the stderr TTY state.
    pub fn from_flags(no_color_flag: bool, quiet: bool, verbose: bool) -> Self {
        Self {
            colors: colors_enabled(no_color_flag),
            quiet,
            verbose,
        }
    }
}

// ---------------------------------------------------------------------------
// Issue lines
// ---------------------------------------------------------------------------

/// Writes a single [`ValidationIssue`] to `writer`, one line per issue.
///
/// Format: `[E] orphan node "p1": non-taxonomy node has no edges`. The
/// severity tag is color-coded when `config.colors` is set: `[C]` bold red,
/// `[E]` red, `[W]` yellow, `[I]` cyan. Quiet mode suppresses `[W]` and `[I]`.
///
/// # Errors
///
/// Returns an error only if writing to `writer` fails.
pub fn write_issue_human<W: Write>(
    writer: &mut W,
    issue: &ValidationIssue,
    config: &FormatterConfig,
) -> std::io::Result<()> {
    if config.quiet && !issue.severity.is_blocking() {
        return Ok(());
    }

    if config.colors {
        let color = match issue.severity {
            Severity::Critical => ANSI_BOLD_RED,
            Severity::Error => ANSI_RED,
            Severity::Warning => ANSI_YELLOW,
            Severity::Info => ANSI_CYAN,
        };
        // The Display form starts with the `[C]`-style tag; color just that.
        let line = issue.to_string();
        match line.split_once(' ') {
            Some((tag, rest)) => writeln!(writer, "{color}{tag}{ANSI_RESET} {rest}"),
            None => writeln!(writer, "{color}{line}{ANSI_RESET}"),
        }
    } else {
        writeln!(writer, "{issue}")
    }
}

/// Writes the overall summary line for human mode.
///
/// Format: `overall: failed - 14 checks, 1 critical, 2 errors, 0 warnings, 0 info`.
/// Suppressed in quiet mode.
///
/// # Errors
///
/// Returns an error only if writing to `writer` fails.
pub fn write_summary_human<W: Write>(
    writer: &mut W,
    status: &str,
    checks: usize,
    counts: SeverityCounts,
    config: &FormatterConfig,
) -> std::io::Result<()> {
    if config.quiet {
        return Ok(());
    }
    writeln!(
        writer,
        "overall: {status} - {checks} {}, {} critical, {} {}, {} {}, {} info",
        pluralize(checks, "check", "checks"),
        counts.critical,
        counts.error,
        pluralize(counts.error, "error", "errors"),
        counts.warning,
        pluralize(counts.warning, "warning", "warnings"),
        counts.info,
    )
}

/// Writes a timing line in verbose mode; a no-op otherwise.
///
/// # Errors
///
/// Returns an error only if writing to `writer` fails.
pub fn write_timing_human<W: Write>(
    writer: &mut W,
    label: &str,
    duration: Duration,
    config: &FormatterConfig,
) -> std::io::Result<()> {
    if !config.verbose {
        return Ok(());
    }
    writeln!(writer, "{label} in {}ms", duration.as_millis())
}

fn pluralize<'a>(count: usize, singular: &'a str, plural: &'a str) -> &'a str {
    if count == 1 { singular } else { plural }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
