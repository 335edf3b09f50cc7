//! The in-process hook families, built on one shared execution core.

mod merge_check;
mod pre_receive;

pub use merge_check::{
    MergeCheck, MergeCheckRequest, MERGE_FAILED, PRESENTED_DETAIL, PRESENTED_SUMMARY,
    SUCCESS_COMMENT,
};
pub use pre_receive::{PreReceiveHook, PushRequest, PUSH_REJECTED};

use std::path::{Path, PathBuf};

use tracing::error;

use crate::config::{HookConfiguration, HostConfig, Settings};
use crate::domain::RefChange;
use crate::executable::{ExecutableResolver, FieldError, SettingsValidator};
use crate::license::LicenseGate;
use crate::protocol::{Environment, ExecutionResult};
use crate::runner::{HookRunner, Invocation, RunnerError};

pub const RUN_ERROR_SUMMARY: &str = "Error while running the Hook";
pub const RUN_ERROR_DETAIL: &str =
    "External Hooks Plugin was not able to run hook in the repo. Check logs for more info.";

#[derive(Debug, thiserror::Error)]
pub enum ExecuteError {
    #[error("executable {0:?} cannot be resolved")]
    Unresolvable(String),
    #[error(transparent)]
    Runner(#[from] RunnerError),
}

/// Resolves the configured executable and runs it through [`HookRunner`].
#[derive(Clone)]
pub struct HookExecutor {
    runner: HookRunner,
    resolver: ExecutableResolver,
    license: LicenseGate,
    clustered: bool,
}

impl HookExecutor {
    pub fn new(
        runner: HookRunner,
        resolver: ExecutableResolver,
        license: LicenseGate,
        clustered: bool,
    ) -> Self {
        Self {
            runner,
            resolver,
            license,
            clustered,
        }
    }

    pub fn from_host(host: &HostConfig) -> Self {
        Self::new(
            HookRunner::new().with_timeout(host.timeout),
            ExecutableResolver::for_host(host),
            LicenseGate::new(host.license),
            host.clustered,
        )
    }

    pub fn license(&self) -> &LicenseGate {
        &self.license
    }

    pub fn validator(&self) -> SettingsValidator {
        SettingsValidator::new(self.resolver.clone(), self.license.clone(), self.clustered)
    }

    pub fn validate(&self, settings: &Settings, system_admin: bool) -> Result<PathBuf, FieldError> {
        self.validator().validate(settings, system_admin)
    }

    pub fn execute(
        &self,
        config: &HookConfiguration,
        working_dir: &Path,
        ref_changes: &[RefChange],
        env: &Environment,
        summary: &str,
    ) -> Result<ExecutionResult, ExecuteError> {
        let Some(executable) = self.resolver.resolve(&config.executable, config.safe_mode) else {
            error!(
                executable = %config.executable,
                working_dir = %working_dir.display(),
                "executable cannot be resolved"
            );
            return Err(ExecuteError::Unresolvable(config.executable.clone()));
        };
        let invocation = Invocation {
            executable: &executable,
            args: &config.args,
            working_dir,
            env,
            ref_changes,
        };
        Ok(self.runner.run(&invocation, summary)?)
    }
}

fn run_error() -> ExecutionResult {
    ExecutionResult::rejected(RUN_ERROR_SUMMARY, RUN_ERROR_DETAIL)
}
