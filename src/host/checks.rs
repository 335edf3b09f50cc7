//! The persisted "last merge check" record per pull request.

use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};

use super::HostError;
use crate::domain::PullRequest;
use crate::protocol::ExecutionResult;

/// Identifies a pull request within its target repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CheckKey {
    pub project_id: i64,
    pub repository_id: i64,
    pub pull_request_id: i64,
}

impl CheckKey {
    pub fn for_pull_request(pr: &PullRequest) -> Self {
        let target = &pr.to_ref.repository;
        Self {
            project_id: target.project.id,
            repository_id: target.id,
            pull_request_id: pr.id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestCheck {
    pub key: CheckKey,
    pub version: i32,
    pub accepted: bool,
    /// Post-decision side effects already ran for `version`.
    pub handled: bool,
    pub summary: String,
    pub detail: String,
}

impl PullRequestCheck {
    /// A fresh, unhandled record of `result` at `version`.
    pub fn record(key: CheckKey, version: i32, result: &ExecutionResult) -> Self {
        Self {
            key,
            version,
            accepted: result.is_accepted(),
            handled: false,
            summary: result.summary().to_string(),
            detail: result.detail().to_string(),
        }
    }

    pub fn result(&self) -> ExecutionResult {
        if self.accepted {
            ExecutionResult::accepted()
        } else {
            ExecutionResult::rejected(self.summary.clone(), self.detail.clone())
        }
    }
}

pub trait CheckStore: Send + Sync {
    /// Every record stored under `key`. More than one is an invariant
    /// violation the caller has to deal with.
    fn find(&self, key: &CheckKey) -> Result<Vec<PullRequestCheck>, HostError>;
    /// Insert or replace the record for `check.key`.
    fn save(&self, check: PullRequestCheck) -> Result<(), HostError>;
}

/// Keeps one record per key; saving replaces.
#[derive(Debug, Default)]
pub struct MemoryCheckStore {
    records: Mutex<BTreeMap<CheckKey, PullRequestCheck>>,
}

impl MemoryCheckStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CheckStore for MemoryCheckStore {
    fn find(&self, key: &CheckKey) -> Result<Vec<PullRequestCheck>, HostError> {
        let records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(records.get(key).cloned().into_iter().collect())
    }

    fn save(&self, check: PullRequestCheck) -> Result<(), HostError> {
        let mut records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        records.insert(check.key, check);
        Ok(())
    }
}
