use std::path::Path;
use std::process::ExitCode;

use tracing::debug;

use crate::config::Config;
use crate::hook::HookExecutor;

/// Execute the validate subcommand: print `ok`, or the first failing field
/// as `<field>: <message>` and exit 1.
pub fn validate(config_path: &Path, system_admin: bool) -> miette::Result<ExitCode> {
    let config = Config::load(config_path)?;
    match HookExecutor::from_host(&config.host).validate(&config.hook, system_admin) {
        Ok(executable) => {
            debug!(executable = %executable.display(), "settings are valid");
            println!("ok");
            Ok(ExitCode::SUCCESS)
        }
        Err(error) => {
            println!("{error}");
            Ok(ExitCode::FAILURE)
        }
    }
}
