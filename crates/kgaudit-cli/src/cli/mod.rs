//! Clap CLI definition: root struct, subcommands, and shared argument types.
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// A CLI argument that is either a filesystem path or the stdin sentinel `"-"`.
///
/// Parsing `"-"` yields [`PathOrStdin::Stdin`]; anything else yields
/// [`PathOrStdin::Path`]. This avoids stringly-typed handling of the stdin
/// sentinel throughout the codebase.
#[derive(Clone, Debug)]
pub enum PathOrStdin {
    /// Read from standard input.
    Stdin,
    /// Read from the given filesystem path.
    Path(PathBuf),
}

impl std::str::FromStr for PathOrStdin {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "-" {
            Ok(PathOrStdin::Stdin)
        } else {
            Ok(PathOrStdin::Path(PathBuf::from(s)))
        }
    }
}

/// Output format for CLI commands.
///
/// `Human` emits a colored issue list and summary line to stderr. `Json`
/// emits the full report as a single JSON object to stdout.
#[derive(Clone, Debug, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable, optionally colored output (default).
    Human,
    /// Full report as structured JSON on stdout.
    Json,
}

/// All top-level subcommands exposed by the `kgaudit` binary.
#[derive(Subcommand)]
pub enum Command {
    /// Validate a graph snapshot and compute its quality metrics.
    Validate {
        /// Path to the graph snapshot JSON, or `-` for stdin.
        #[arg(long, value_name = "FILE")]
        graph: PathOrStdin,

        /// Path to the optional expected-entity index JSON, or `-` for stdin
        /// (at most one of --graph/--expected may be `-`).
        #[arg(long, value_name = "FILE")]
        expected: Option<PathOrStdin>,

        /// Directory to write `report.json` and `report.md` into.
        /// Created if it does not exist.
        #[arg(long, value_name = "DIR")]
        output_dir: Option<PathBuf>,

        /// Minimum total degree for a node to count as a hub.
        #[arg(long, default_value = "10", value_name = "N")]
        hub_threshold: usize,

        /// Number of BFS sources for sampled path metrics.
        #[arg(long, default_value = "100", value_name = "N")]
        sample_size: usize,

        /// Seed for the path-metric source sampling.
        #[arg(long, default_value = "42", value_name = "N")]
        seed: u64,

        /// Per-sub-validator time budget in milliseconds (default: unlimited).
        #[arg(long, value_name = "MS")]
        time_budget_ms: Option<u64>,
    },

    /// Print the kgaudit-core library version.
    Version,
}

/// Root CLI struct for the `kgaudit` binary.
///
/// All global flags are defined here and marked `global = true` so that clap
/// propagates them to every subcommand.
#[derive(Parser)]
#[command(
    name = "kgaudit",
    version,
    about = "Knowledge-graph validation and quality metrics",
    long_about = "Validates a content knowledge-graph snapshot (schema, integrity,\n\
                  completeness against an expected-entity index) and computes graph\n\
                  quality metrics, emitting a deterministic JSON/Markdown report."
)]
pub struct Cli {
    /// Active subcommand.
    #[command(subcommand)]
    pub command: Command,

    /// Output format: human (default) or json.
    #[arg(long, short = 'f', default_value = "human", global = true)]
    pub format: OutputFormat,

    /// Suppress all stderr output except errors (incompatible with `--verbose`).
    #[arg(long, short = 'q', global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Increase stderr verbosity (incompatible with `--quiet`).
    #[arg(long, short = 'v', global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Maximum input file size in bytes.
    ///
    /// Can also be set via the `KGAUDIT_MAX_FILE_SIZE` environment variable.
    /// The CLI flag takes precedence over the environment variable.
    /// Default: 268435456 (256 MB).
    #[arg(
        long,
        global = true,
        env = "KGAUDIT_MAX_FILE_SIZE",
        default_value = "268435456"
    )]
    pub max_file_size: u64,

    /// Disable ANSI color codes in human output.
    ///
    /// Also respects the `NO_COLOR` environment variable per
    /// <https://no-color.org>.
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,
}
