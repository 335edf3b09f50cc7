//! Keeping host hook scripts in sync with hook configuration.

mod coordinator;
mod family;
mod installer;
mod job;
mod sweep;

pub use coordinator::HooksCoordinator;
pub use family::{
    is_own_hook, HookFamily, FAMILIES, MERGE_CHECK, PLUGIN_KEY, POST_RECEIVE, PRE_RECEIVE,
};
pub use installer::HookScriptInstaller;
pub use job::{ProvisioningJob, SweepReport, JOB_ID, MAX_CLUSTER_DELAY};
pub use sweep::{HookProvisioner, ScopeReport};

use crate::domain::Scope;
use crate::host::HostError;
use crate::store::StoreError;

/// Failure installing or removing one hook script.
#[derive(Debug, thiserror::Error)]
pub enum ProvisionError {
    #[error(transparent)]
    Host(#[from] HostError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("executable {0:?} cannot be resolved inside the sandbox")]
    UnresolvableExecutable(String),
    #[error("hook {hook} has no settings at {scope}")]
    MissingSettings { hook: String, scope: Scope },
}
