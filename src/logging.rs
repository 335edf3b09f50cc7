use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter directives.
pub const LOG_ENV: &str = "EXTERNAL_HOOKS_LOG";

const DEFAULT_FILTER: &str = "external_hooks=warn";

/// Install the stderr subscriber. Stdout stays free for command output.
///
/// Filter directives come from `EXTERNAL_HOOKS_LOG`, e.g.
/// `EXTERNAL_HOOKS_LOG=external_hooks=debug`. Calling this more than once is
/// harmless.
pub fn init() {
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
