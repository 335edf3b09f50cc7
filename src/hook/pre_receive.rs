use std::path::Path;

use super::{run_error, ExecuteError, HookExecutor};
use crate::config::{HookConfiguration, Settings};
use crate::domain::RefChange;
use crate::license::LicenseGate;
use crate::protocol::{Environment, ExecutionResult};

pub const PUSH_REJECTED: &str = "Push rejected by External Hook";

const INTERNAL_ERROR_SUMMARY: &str = "Internal Error";
const INTERNAL_ERROR_DETAIL: &str =
    "Internal Error occurred during External Hooks execution.\nCheck logs for more info.";

/// A push about to be applied to a repository.
#[derive(Debug, Clone)]
pub struct PushRequest<'a> {
    pub repository_dir: &'a Path,
    pub ref_changes: &'a [RefChange],
    pub environment: Environment,
}

/// Vetoes pushes when the configured executable exits nonzero.
#[derive(Clone)]
pub struct PreReceiveHook {
    executor: HookExecutor,
}

impl PreReceiveHook {
    pub fn new(executor: HookExecutor) -> Self {
        Self { executor }
    }

    pub fn executor(&self) -> &HookExecutor {
        &self.executor
    }

    /// Always resolves to a decision; execution failures become rejections.
    pub fn pre_update(&self, settings: &Settings, request: &PushRequest<'_>) -> ExecutionResult {
        if !self.executor.license().is_valid() {
            return LicenseGate::rejection();
        }
        let config = HookConfiguration::from_settings(settings);
        match self.executor.execute(
            &config,
            request.repository_dir,
            request.ref_changes,
            &request.environment,
            PUSH_REJECTED,
        ) {
            Ok(result) => result,
            Err(ExecuteError::Unresolvable(_)) => run_error(),
            Err(ExecuteError::Runner(_)) => {
                ExecutionResult::rejected(INTERNAL_ERROR_SUMMARY, INTERNAL_ERROR_DETAIL)
            }
        }
    }
}
