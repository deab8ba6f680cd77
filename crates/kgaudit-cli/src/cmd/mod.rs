//! Subcommand dispatch.
use crate::error::CliError;
use crate::format::FormatterConfig;
use crate::io::read_input;
use crate::{Cli, Command, PathOrStdin};

pub mod validate;

/// Routes a parsed [`Cli`] to its subcommand implementation.
///
/// # Errors
///
/// Returns the [`CliError`] of the failing subcommand; `main` maps it to an
/// exit code.
pub fn dispatch(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::Version => {
            println!("kgaudit {}", kgaudit_core::version());
            Ok(())
        }
        Command::Validate {
            graph,
            expected,
            output_dir,
            hub_threshold,
            sample_size,
            seed,
            time_budget_ms,
        } => {
            if matches!(graph, PathOrStdin::Stdin)
                && matches!(expected, Some(PathOrStdin::Stdin))
            {
                return Err(CliError::StdinReadError {
                    detail: "at most one of --graph/--expected may be \"-\"".to_owned(),
                });
            }

            let graph_content = read_input(&graph, cli.max_file_size)?;
            let expected_content = match &expected {
                Some(source) => Some(read_input(source, cli.max_file_size)?),
                None => None,
            };

            let options = validate::ValidateOptions {
                hub_threshold,
                sample_size,
                seed,
                time_budget_ms,
                output_dir,
            };
            let formatter = FormatterConfig::from_flags(cli.no_color, cli.quiet, cli.verbose);
            validate::run(
                &graph_content,
                expected_content.as_deref(),
                &options,
                &cli.format,
                &formatter,
            )
        }
    }
}
