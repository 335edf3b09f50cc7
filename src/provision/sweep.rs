use std::sync::Arc;

use tracing::{debug, error, info};

use super::{is_own_hook, HooksCoordinator};
use crate::domain::Scope;
use crate::host::{HostError, RepositoryHookService};

/// Outcome of provisioning one scope.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScopeReport {
    pub created: usize,
    pub failed: usize,
}

/// Re-creates the hook scripts of every hook configured at a scope.
pub struct HookProvisioner {
    hooks: Arc<dyn RepositoryHookService>,
    coordinator: HooksCoordinator,
}

impl HookProvisioner {
    pub fn new(hooks: Arc<dyn RepositoryHookService>, coordinator: HooksCoordinator) -> Self {
        Self { hooks, coordinator }
    }

    pub fn coordinator(&self) -> &HooksCoordinator {
        &self.coordinator
    }

    /// Install scripts for this plugin's enabled and configured hooks at
    /// `scope`. Hooks already active through an ancestor are skipped; a
    /// failing hook is logged and does not stop the others.
    pub fn install(&self, scope: Scope) -> Result<ScopeReport, HostError> {
        debug!(%scope, "creating hook scripts");
        let mut report = ScopeReport::default();

        for hook in self.hooks.search(scope)? {
            if !is_own_hook(&hook.key) || !hook.is_active() {
                continue;
            }
            if hook.is_inherited_at(scope) {
                info!(
                    hook = %hook.key,
                    %scope,
                    from = %hook.scope,
                    "hook is enabled and configured through inheritance"
                );
                continue;
            }
            match self.coordinator.enable(scope, &hook.key) {
                Ok(true) => report.created += 1,
                Ok(false) => {}
                Err(e) => {
                    error!(hook = %hook.key, %scope, error = %e, "unable to install hook script");
                    report.failed += 1;
                }
            }
        }

        info!(created = report.created, %scope, "created hook scripts");
        Ok(report)
    }
}
