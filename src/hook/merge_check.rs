use std::path::Path;
use std::sync::Arc;

use tracing::{debug, error};

use super::{run_error, ExecuteError, HookExecutor};
use crate::config::{HookConfiguration, Settings};
use crate::domain::PullRequest;
use crate::host::{CheckKey, CheckStore, HostError, PullRequestActions, PullRequestCheck};
use crate::license::LicenseGate;
use crate::protocol::{
    pull_request_environment, push_environment, ExecutionResult, HostOutcome, PushContext, Veto,
};
use crate::runner::RunnerError;

pub const MERGE_FAILED: &str = "Merge request failed";
pub const PRESENTED_SUMMARY: &str = "Merge check failed";
pub const PRESENTED_DETAIL: &str = "See Pull-Request comments for more info";
pub const SUCCESS_COMMENT: &str = "External Hooks: Checks successful";

/// A merge attempt on a pull request.
#[derive(Debug, Clone, Copy)]
pub struct MergeCheckRequest<'a> {
    pub pull_request: &'a PullRequest,
    /// Storage directory of the target repository.
    pub repository_dir: &'a Path,
    pub context: &'a PushContext,
}

/// Vetoes pull-request merges, remembering the decision per pull-request
/// version so repeated checks of the same version never rerun the hook.
pub struct MergeCheck {
    executor: HookExecutor,
    checks: Arc<dyn CheckStore>,
    actions: Arc<dyn PullRequestActions>,
}

impl MergeCheck {
    pub fn new(
        executor: HookExecutor,
        checks: Arc<dyn CheckStore>,
        actions: Arc<dyn PullRequestActions>,
    ) -> Self {
        Self {
            executor,
            checks,
            actions,
        }
    }

    pub fn executor(&self) -> &HookExecutor {
        &self.executor
    }

    pub fn pre_update(
        &self,
        settings: &Settings,
        request: &MergeCheckRequest<'_>,
    ) -> ExecutionResult {
        if !self.executor.license().is_valid() {
            return LicenseGate::rejection();
        }
        let config = HookConfiguration::from_settings(settings);
        let pr = request.pull_request;
        let key = CheckKey::for_pull_request(pr);

        if let Some(check) = self.last_check(&key) {
            if check.version == pr.version {
                debug!(pull_request = pr.id, version = pr.version, "replaying last check result");
                return present(check.result(), &config);
            }
        }

        let mut env = push_environment(request.context);
        env.extend(pull_request_environment(pr, &request.context.base_url));
        let ref_changes = [pr.merge_ref_change()];

        let result = match self.executor.execute(
            &config,
            request.repository_dir,
            &ref_changes,
            &env,
            MERGE_FAILED,
        ) {
            Ok(result) => result,
            Err(ExecuteError::Unresolvable(_)) => run_error(),
            Err(ExecuteError::Runner(e)) => {
                ExecutionResult::rejected(MERGE_FAILED, failure_detail(&e))
            }
        };

        if let Err(e) = self
            .checks
            .save(PullRequestCheck::record(key, pr.version, &result))
        {
            error!(pull_request = pr.id, error = %e, "unable to save check result");
        }
        present(result, &config)
    }

    /// Post-decision side effects, run once per pull-request version.
    ///
    /// `outcome` is the host's combined decision over every merge check.
    pub fn on_end(
        &self,
        settings: &Settings,
        pull_request: &PullRequest,
        outcome: &HostOutcome,
    ) -> Result<(), HostError> {
        let key = CheckKey::for_pull_request(pull_request);
        let Some(mut check) = self.last_check(&key) else {
            return Ok(());
        };
        if check.version == pull_request.version && check.handled {
            return Ok(());
        }

        let config = HookConfiguration::from_settings(settings);
        if outcome.is_rejected() {
            if config.add_comments {
                let comment = rejection_comment(outcome, check.result().veto());
                self.actions.add_comment(pull_request, &comment)?;
            }
            if config.decline_on_rejection {
                debug!(pull_request = pull_request.id, "declining pull request");
                self.actions.decline(pull_request, pull_request.version)?;
            }
        } else if config.add_comments {
            self.actions.add_comment(pull_request, SUCCESS_COMMENT)?;
        }

        check.handled = true;
        self.checks.save(check)
    }

    /// The single stored record for `key`. Lookup failures and duplicate
    /// records both count as no record.
    fn last_check(&self, key: &CheckKey) -> Option<PullRequestCheck> {
        match self.checks.find(key) {
            Ok(mut found) if found.len() == 1 => found.pop(),
            Ok(found) if found.is_empty() => None,
            Ok(found) => {
                error!(?key, count = found.len(), "more than one check record exists");
                None
            }
            Err(e) => {
                error!(?key, error = %e, "unable to load check record");
                None
            }
        }
    }
}

fn failure_detail(error: &RunnerError) -> &'static str {
    match error {
        RunnerError::Interrupted => "Interrupted",
        RunnerError::TimedOut(_) => "Timed out",
        RunnerError::Spawn { .. } | RunnerError::Io(_) => "I/O Error",
    }
}

/// With comments enabled, the merging user is pointed at the comment
/// instead of seeing the full output.
fn present(result: ExecutionResult, config: &HookConfiguration) -> ExecutionResult {
    if config.add_comments && !result.is_accepted() {
        ExecutionResult::rejected(PRESENTED_SUMMARY, PRESENTED_DETAIL)
    } else {
        result
    }
}

/// One paragraph per veto. A presented veto is replaced by the full
/// result it stands for.
fn rejection_comment(outcome: &HostOutcome, full: Option<Veto>) -> String {
    let presented = Veto::new(PRESENTED_SUMMARY, PRESENTED_DETAIL);
    outcome
        .vetoes
        .iter()
        .map(|veto| match &full {
            Some(full) if *veto == presented => full,
            _ => veto,
        })
        .map(|veto| {
            if veto.detail.is_empty() {
                veto.summary.clone()
            } else {
                format!("{}\n{}", veto.summary, veto.detail)
            }
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}
