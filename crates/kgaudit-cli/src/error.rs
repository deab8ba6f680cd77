//! CLI error type and exit-code mapping.
//!
//! Exit codes:
//! - `0` — validation ran and the overall status is success.
//! - `1` — validation ran and the overall status is failed, or the report
//!   could not be emitted.
//! - `2` — the graph or expected-entity input could not be loaded (missing
//!   file, oversized file, invalid UTF-8, or JSON that does not parse).
use std::fmt;
use std::path::PathBuf;

/// Errors surfaced by the `kgaudit` binary.
#[derive(Debug)]
pub enum CliError {
    /// Input file does not exist.
    FileNotFound { path: PathBuf },
    /// Input file exists but cannot be read due to permissions.
    PermissionDenied { path: PathBuf },
    /// Input exceeds the configured size cap.
    FileTooLarge {
        source: String,
        limit: u64,
        actual: Option<u64>,
    },
    /// Input bytes are not valid UTF-8.
    InvalidUtf8 { source: String, byte_offset: usize },
    /// Reading from stdin failed.
    StdinReadError { detail: String },
    /// Any other I/O failure while reading an input or writing a report file.
    IoError { source: String, detail: String },
    /// Graph or expected-entity JSON did not parse into the published shape.
    LoadFailed { detail: String },
    /// Validation completed and the overall status is failed.
    ValidationFailed,
    /// The report could not be serialized or written.
    EmitFailed { detail: String },
}

impl CliError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::FileNotFound { .. }
            | CliError::PermissionDenied { .. }
            | CliError::FileTooLarge { .. }
            | CliError::InvalidUtf8 { .. }
            | CliError::StdinReadError { .. }
            | CliError::IoError { .. }
            | CliError::LoadFailed { .. } => 2,
            CliError::ValidationFailed | CliError::EmitFailed { .. } => 1,
        }
    }

    /// One-line message for stderr, prefixed with `error:`.
    pub fn message(&self) -> String {
        format!("error: {self}")
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::FileNotFound { path } => {
                write!(f, "file not found: {}", path.display())
            }
            CliError::PermissionDenied { path } => {
                write!(f, "permission denied: {}", path.display())
            }
            CliError::FileTooLarge {
                source,
                limit,
                actual,
            } => match actual {
                Some(actual) => write!(
                    f,
                    "{source} is too large: {actual} bytes exceeds the {limit}-byte limit"
                ),
                None => write!(f, "{source} is too large: exceeds the {limit}-byte limit"),
            },
            CliError::InvalidUtf8 {
                source,
                byte_offset,
            } => {
                write!(f, "{source} is not valid UTF-8 at byte {byte_offset}")
            }
            CliError::StdinReadError { detail } => {
                write!(f, "failed to read stdin: {detail}")
            }
            CliError::IoError { source, detail } => {
                write!(f, "I/O error on {source}: {detail}")
            }
            CliError::LoadFailed { detail } => write!(f, "load failed: {detail}"),
            CliError::ValidationFailed => write!(f, "validation failed"),
            CliError::EmitFailed { detail } => write!(f, "failed to emit report: {detail}"),
        }
    }
}

impl std::error::Error for CliError {}

// ---------------------------------------------------------------------------
