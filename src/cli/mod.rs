mod render;
mod run;
mod validate;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Subcommand;

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the configured hook as a git pre-receive hook (reads ref updates on stdin)
    Run {
        /// Path to the KDL config file
        #[arg(long)]
        config: PathBuf,
        /// Repository directory the hook runs in
        #[arg(long, default_value = ".")]
        repo_dir: PathBuf,
    },
    /// Print the wrapper script that would be installed for the configured hook
    Render {
        /// Path to the KDL config file
        #[arg(long)]
        config: PathBuf,
    },
    /// Check the configured hook settings before activating them
    Validate {
        /// Path to the KDL config file
        #[arg(long)]
        config: PathBuf,
        /// Validate as a system administrator (allows paths outside safe mode)
        #[arg(long)]
        system_admin: bool,
    },
}

impl Commands {
    pub fn execute(self) -> miette::Result<ExitCode> {
        match self {
            Commands::Run { config, repo_dir } => run::run(&config, &repo_dir),
            Commands::Render { config } => render::render(&config),
            Commands::Validate {
                config,
                system_admin,
            } => validate::validate(&config, system_admin),
        }
    }
}
