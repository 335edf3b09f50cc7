//! Collaborators owned by the hosting source-control server.
//!
//! The crate never talks to the host directly; everything it needs is one of
//! the traits below, injected by whoever embeds it.

pub mod checks;

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::Settings;
use crate::domain::{Project, PullRequest, Repository, Scope};

pub use checks::{CheckKey, CheckStore, MemoryCheckStore, PullRequestCheck};

/// Failure reported by a host collaborator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HostError {
    #[error("{0} not found")]
    NotFound(String),
    #[error("permission denied: {0}")]
    PermissionDenied(String),
    #[error("host request failed: {0}")]
    Failed(String),
}

/// When the host runs an installed hook script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HookScriptType {
    Pre,
    Post,
}

/// Host events that fire a hook script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Trigger {
    RepoPush,
    BranchCreate,
    BranchDelete,
    TagCreate,
    TagDelete,
    FileEdit,
    PullRequestMerge,
}

impl Trigger {
    pub fn id(self) -> &'static str {
        match self {
            Trigger::RepoPush => "repo-push",
            Trigger::BranchCreate => "branch-create",
            Trigger::BranchDelete => "branch-delete",
            Trigger::TagCreate => "tag-create",
            Trigger::TagDelete => "tag-delete",
            Trigger::FileEdit => "file-edit",
            Trigger::PullRequestMerge => "pull-request-merge",
        }
    }
}

/// Everything that updates refs from the outside.
pub const PUSH_TRIGGERS: &[Trigger] = &[
    Trigger::RepoPush,
    Trigger::BranchCreate,
    Trigger::BranchDelete,
    Trigger::TagCreate,
    Trigger::TagDelete,
    Trigger::FileEdit,
];

/// A script stored by the host and run natively on hook events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookScript {
    pub id: i64,
    pub name: String,
    pub plugin_key: String,
    pub script_type: HookScriptType,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookScriptCreateRequest {
    pub name: String,
    pub plugin_key: String,
    pub script_type: HookScriptType,
    pub content: String,
}

pub trait HookScriptService: Send + Sync {
    fn find_by_id(&self, id: i64) -> Result<Option<HookScript>, HostError>;
    fn create(&self, request: HookScriptCreateRequest) -> Result<HookScript, HostError>;
    fn delete(&self, script: &HookScript) -> Result<(), HostError>;
    /// Attach `script` to `scope`, firing on `triggers`.
    fn set_configuration(
        &self,
        script: &HookScript,
        scope: Scope,
        triggers: &[Trigger],
    ) -> Result<(), HostError>;
}

/// A hook as seen from one scope.
///
/// `scope` is where the hook is actually configured, which may be an
/// ancestor of the scope it was looked up from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryHook {
    pub key: String,
    pub scope: Scope,
    pub enabled: bool,
    pub configured: bool,
}

impl RepositoryHook {
    pub fn is_active(&self) -> bool {
        self.enabled && self.configured
    }

    /// Active only because an ancestor of `scope` is configured.
    pub fn is_inherited_at(&self, scope: Scope) -> bool {
        self.is_active() && self.scope.is_ancestor_of(&scope)
    }
}

pub trait RepositoryHookService: Send + Sync {
    /// Hooks effective at `scope`.
    fn search(&self, scope: Scope) -> Result<Vec<RepositoryHook>, HostError>;
    fn settings(&self, scope: Scope, hook_key: &str) -> Result<Option<Settings>, HostError>;
}

/// Offset-based paging, the way the host lists large collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub start: usize,
    pub limit: usize,
}

impl PageRequest {
    pub const DEFAULT_LIMIT: usize = 100;

    pub fn first() -> Self {
        Self {
            start: 0,
            limit: Self::DEFAULT_LIMIT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub values: Vec<T>,
    /// Request for the following page; `None` on the last page.
    pub next: Option<PageRequest>,
}

impl<T> Page<T> {
    pub fn last(values: Vec<T>) -> Self {
        Self { values, next: None }
    }
}

/// Read access to every project and repository.
pub trait Directory: Send + Sync {
    fn projects(&self, page: PageRequest) -> Result<Page<Project>, HostError>;
    fn repositories(
        &self,
        project: &Project,
        page: PageRequest,
    ) -> Result<Page<Repository>, HostError>;
}

pub trait PullRequestActions: Send + Sync {
    fn add_comment(&self, pull_request: &PullRequest, text: &str) -> Result<(), HostError>;
    fn decline(&self, pull_request: &PullRequest, version: i32) -> Result<(), HostError>;
}

/// Cluster-wide job scheduling. A job scheduled here runs on one node only.
pub trait Scheduler: Send + Sync {
    fn schedule_once(&self, job_id: &str, delay: Duration) -> Result<(), HostError>;
    fn unschedule(&self, job_id: &str) -> Result<(), HostError>;
}
