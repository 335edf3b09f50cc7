use std::io::Read;
use std::path::Path;
use std::process::ExitCode;

use miette::{miette, IntoDiagnostic};

use crate::config::Config;
use crate::domain::RefChange;
use crate::hook::{HookExecutor, PreReceiveHook, PushRequest};
use crate::protocol::Environment;

/// Execute the run subcommand: read `<old> <new> <ref>` lines from stdin and
/// decide the push with the configured hook.
///
/// A rejection is reported on stderr with exit code 1, the way git expects
/// from a refusing pre-receive hook.
pub fn run(config_path: &Path, repo_dir: &Path) -> miette::Result<ExitCode> {
    let config = Config::load(config_path)?;

    let mut input = String::new();
    std::io::stdin()
        .read_to_string(&mut input)
        .into_diagnostic()?;
    let ref_changes = parse_ref_changes(&input)?;

    let hook = PreReceiveHook::new(HookExecutor::from_host(&config.host));
    let result = hook.pre_update(
        &config.hook,
        &PushRequest {
            repository_dir: repo_dir,
            ref_changes: &ref_changes,
            environment: local_environment(repo_dir),
        },
    );

    if result.is_accepted() {
        return Ok(ExitCode::SUCCESS);
    }
    eprintln!("{}", result.summary());
    eprintln!("{}", result.detail());
    Ok(ExitCode::FAILURE)
}

/// The `STASH_*` variables derivable without a host: the repository name
/// from the directory (minus a bare repository's `.git` suffix) and the user
/// from `$USER`.
fn local_environment(repo_dir: &Path) -> Environment {
    let mut env = Environment::new();
    let dir = repo_dir
        .canonicalize()
        .unwrap_or_else(|_| repo_dir.to_path_buf());
    if let Some(name) = dir.file_name().and_then(|n| n.to_str()) {
        let name = name.strip_suffix(".git").unwrap_or(name);
        env.insert("STASH_REPO_NAME".into(), name.to_string());
    }
    if let Ok(user) = std::env::var("USER") {
        env.insert("STASH_USER_NAME".into(), user);
    }
    env
}

fn parse_ref_changes(input: &str) -> miette::Result<Vec<RefChange>> {
    input
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| {
            line.parse::<RefChange>()
                .map_err(|e| miette!("stdin line {}: {e}", index + 1))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_lines_in_order_skipping_blanks() {
        let changes = parse_ref_changes("a b refs/heads/x\n\nc d refs/tags/y\n").unwrap();
        assert_eq!(
            changes,
            vec![
                RefChange::new("a", "b", "refs/heads/x"),
                RefChange::new("c", "d", "refs/tags/y"),
            ]
        );
    }

    #[test]
    fn local_environment_names_the_repository() {
        let dir = tempfile::TempDir::new().unwrap();
        let repo = dir.path().join("api.git");
        std::fs::create_dir(&repo).unwrap();

        let env = local_environment(&repo);
        assert_eq!(env.get("STASH_REPO_NAME").map(String::as_str), Some("api"));
    }

    #[test]
    fn reports_the_bad_line() {
        let err = parse_ref_changes("a b refs/heads/x\nbroken\n").unwrap_err();
        assert!(err.to_string().starts_with("stdin line 2:"));
    }
}
