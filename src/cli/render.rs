use std::path::Path;
use std::process::ExitCode;

use miette::miette;

use crate::config::{Config, HookConfiguration};
use crate::executable::ExecutableResolver;
use crate::script;

/// Execute the render subcommand: print the wrapper script for the
/// configured hook to stdout.
pub fn render(config_path: &Path) -> miette::Result<ExitCode> {
    let config = Config::load(config_path)?;
    let hook = HookConfiguration::from_settings(&config.hook);
    let executable = ExecutableResolver::for_host(&config.host)
        .resolve(&hook.executable, hook.safe_mode)
        .ok_or_else(|| {
            miette!(
                "executable {:?} cannot be resolved inside the sandbox",
                hook.executable
            )
        })?;

    print!("{}", script::render(&executable, &hook.args, hook.async_mode));
    Ok(ExitCode::SUCCESS)
}
