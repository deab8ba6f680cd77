mod cli;
mod cmd;
mod error;
mod format;
mod io;

pub use cli::{Cli, Command, OutputFormat, PathOrStdin};

use clap::Parser;

fn main() {
    let cli = Cli::parse();
    if let Err(e) = cmd::dispatch(cli) {
        eprintln!("{}", e.message());
        std::process::exit(e.exit_code());
    }
}
