use std::process::ExitCode;

use clap::Parser;
use external_hooks::cli::Commands;

/// Run arbitrary executables as pre-receive hooks and merge checks.
#[derive(Debug, Parser)]
#[command(name = "external-hooks", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

fn main() -> miette::Result<ExitCode> {
    external_hooks::logging::init();
    Cli::parse().command.execute()
}
