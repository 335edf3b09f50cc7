use std::sync::Arc;

use tracing::debug;

use super::{HookScriptInstaller, ProvisionError};
use crate::domain::Scope;
use crate::host::RepositoryHookService;

/// Routes hook enable/disable events to the installer of the matching family.
pub struct HooksCoordinator {
    hooks: Arc<dyn RepositoryHookService>,
    installers: Vec<HookScriptInstaller>,
}

impl HooksCoordinator {
    pub fn new(
        hooks: Arc<dyn RepositoryHookService>,
        installers: Vec<HookScriptInstaller>,
    ) -> Self {
        Self { hooks, installers }
    }

    /// Install the script for `hook_key` at `scope` from the settings stored
    /// there. Returns `false` when no installer handles the key, e.g. for
    /// in-process families.
    pub fn enable(&self, scope: Scope, hook_key: &str) -> Result<bool, ProvisionError> {
        let Some(installer) = self.installer_for(hook_key) else {
            debug!(hook = hook_key, "no hook script needed");
            return Ok(false);
        };
        let settings = self
            .hooks
            .settings(scope, hook_key)?
            .ok_or_else(|| ProvisionError::MissingSettings {
                hook: hook_key.to_string(),
                scope,
            })?;
        installer.install(&settings, scope)?;
        Ok(true)
    }

    pub fn disable(&self, scope: Scope, hook_key: &str) -> Result<(), ProvisionError> {
        for installer in &self.installers {
            installer.uninstall(hook_key, scope)?;
        }
        Ok(())
    }

    fn installer_for(&self, hook_key: &str) -> Option<&HookScriptInstaller> {
        self.installers
            .iter()
            .find(|installer| installer.family().matches(hook_key))
    }
}
