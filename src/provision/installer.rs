use std::sync::Arc;

use tracing::{debug, info, warn};

use super::{HookFamily, ProvisionError, PLUGIN_KEY};
use crate::config::{HookConfiguration, Settings};
use crate::domain::Scope;
use crate::executable::ExecutableResolver;
use crate::host::{HookScript, HookScriptCreateRequest, HookScriptService, HookScriptType, Trigger};
use crate::script;
use crate::store::KeyValueStore;

/// Materializes one hook family's wrapper script at a scope.
///
/// The host-side script id is remembered under
/// `<family-key>:<scope-type>[:<resource-id>]` so that reinstalling replaces
/// the previous script and uninstalling can find it.
pub struct HookScriptInstaller {
    family: HookFamily,
    script_type: HookScriptType,
    scripts: Arc<dyn HookScriptService>,
    store: Arc<dyn KeyValueStore>,
    resolver: ExecutableResolver,
}

impl HookScriptInstaller {
    /// `None` for families that install no script.
    pub fn new(
        family: HookFamily,
        scripts: Arc<dyn HookScriptService>,
        store: Arc<dyn KeyValueStore>,
        resolver: ExecutableResolver,
    ) -> Option<Self> {
        Some(Self {
            script_type: family.script_type?,
            family,
            scripts,
            store,
            resolver,
        })
    }

    pub fn family(&self) -> HookFamily {
        self.family
    }

    pub fn record_key(&self, scope: Scope) -> String {
        let mut key = format!("{}:{}", self.family.key(), scope.scope_type().id());
        if let Some(id) = scope.resource_id() {
            key.push_str(&format!(":{id}"));
        }
        key
    }

    /// Render the script for `settings` and install it at `scope`, replacing
    /// any script installed there before.
    pub fn install(&self, settings: &Settings, scope: Scope) -> Result<HookScript, ProvisionError> {
        let config = HookConfiguration::from_settings(settings);
        let executable = self
            .resolver
            .resolve(&config.executable, config.safe_mode)
            .ok_or_else(|| ProvisionError::UnresolvableExecutable(config.executable.clone()))?;
        let content = script::render(&executable, &config.args, config.async_mode);

        let key = self.record_key(scope);
        if let Some(previous) = self.recorded_script(&key)? {
            debug!(id = previous.id, %scope, "replacing hook script");
            self.scripts.delete(&previous)?;
        }

        let created = self.scripts.create(HookScriptCreateRequest {
            name: self.family.component_id.to_string(),
            plugin_key: PLUGIN_KEY.to_string(),
            script_type: self.script_type,
            content,
        })?;
        self.store.put(&key, &created.id.to_string())?;
        self.scripts
            .set_configuration(&created, scope, self.family.triggers)?;

        info!(
            id = created.id,
            %scope,
            triggers = %list_triggers(self.family.triggers),
            "created hook script"
        );
        Ok(created)
    }

    /// Remove the script installed at `scope`. Keys of other families are
    /// ignored.
    pub fn uninstall(&self, hook_key: &str, scope: Scope) -> Result<(), ProvisionError> {
        if !self.family.matches(hook_key) {
            return Ok(());
        }
        let key = self.record_key(scope);
        let Some(raw) = self.store.get(&key)? else {
            return Ok(());
        };

        match self.find(&raw)? {
            Some(script) => {
                self.scripts.delete(&script)?;
                info!(id = script.id, %scope, "deleted hook script");
            }
            None => warn!(id = %raw, %scope, "hook script to delete is already gone"),
        }
        self.store.remove(&key)?;
        Ok(())
    }

    /// The live script recorded under `key`. A record pointing at a script
    /// the host no longer has is dropped.
    fn recorded_script(&self, key: &str) -> Result<Option<HookScript>, ProvisionError> {
        let Some(raw) = self.store.get(key)? else {
            return Ok(None);
        };
        let script = self.find(&raw)?;
        if script.is_none() {
            warn!(id = %raw, key, "stored hook script id is stale, clearing it");
            self.store.remove(key)?;
        }
        Ok(script)
    }

    fn find(&self, raw_id: &str) -> Result<Option<HookScript>, ProvisionError> {
        match raw_id.parse::<i64>() {
            Ok(id) => Ok(self.scripts.find_by_id(id)?),
            Err(_) => Ok(None),
        }
    }
}

fn list_triggers(triggers: &[Trigger]) -> String {
    let ids: Vec<_> = triggers.iter().map(|t| t.id()).collect();
    format!("[{}]", ids.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::settings;
    use crate::host::{HostError, PUSH_TRIGGERS};
    use crate::provision::{MERGE_CHECK, POST_RECEIVE, PRE_RECEIVE};
    use crate::store::MemoryStore;
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Scripts {
        live: Mutex<BTreeMap<i64, HookScript>>,
        configured: Mutex<Vec<(i64, Scope, Vec<Trigger>)>>,
        next_id: Mutex<i64>,
    }

    impl HookScriptService for Scripts {
        fn find_by_id(&self, id: i64) -> Result<Option<HookScript>, HostError> {
            Ok(self.live.lock().unwrap().get(&id).cloned())
        }

        fn create(&self, request: HookScriptCreateRequest) -> Result<HookScript, HostError> {
            let mut next = self.next_id.lock().unwrap();
            *next += 1;
            let script = HookScript {
                id: *next,
                name: request.name,
                plugin_key: request.plugin_key,
                script_type: request.script_type,
                content: request.content,
            };
            self.live.lock().unwrap().insert(script.id, script.clone());
            Ok(script)
        }

        fn delete(&self, script: &HookScript) -> Result<(), HostError> {
            self.live.lock().unwrap().remove(&script.id);
            Ok(())
        }

        fn set_configuration(
            &self,
            script: &HookScript,
            scope: Scope,
            triggers: &[Trigger],
        ) -> Result<(), HostError> {
            self.configured
                .lock()
                .unwrap()
                .push((script.id, scope, triggers.to_vec()));
            Ok(())
        }
    }

    struct Fixture {
        scripts: Arc<Scripts>,
        store: Arc<MemoryStore>,
        installer: HookScriptInstaller,
    }

    fn fixture(family: HookFamily) -> Fixture {
        let scripts = Arc::new(Scripts::default());
        let store = Arc::new(MemoryStore::new());
        let installer = HookScriptInstaller::new(
            family,
            scripts.clone(),
            store.clone(),
            ExecutableResolver::new("/srv/host"),
        )
        .unwrap();
        Fixture {
            scripts,
            store,
            installer,
        }
    }

    fn hook_settings() -> Settings {
        Settings::new()
            .with_string(settings::EXE, "check.sh")
            .with_string(settings::PARAMS, "--strict\r\n\r\nit's")
            .with_bool(settings::SAFE_PATH, true)
    }

    #[test]
    fn merge_check_has_no_installer() {
        let installer = HookScriptInstaller::new(
            MERGE_CHECK,
            Arc::new(Scripts::default()),
            Arc::new(MemoryStore::new()),
            ExecutableResolver::new("/srv/host"),
        );
        assert!(installer.is_none());
    }

    #[test]
    fn record_key_includes_scope_identity() {
        let f = fixture(PRE_RECEIVE);
        let family = PRE_RECEIVE.key();
        assert_eq!(f.installer.record_key(Scope::Global), format!("{family}:global"));
        assert_eq!(
            f.installer.record_key(Scope::project(7)),
            format!("{family}:project:7")
        );
        assert_eq!(
            f.installer.record_key(Scope::repository(42, 7)),
            format!("{family}:repository:42")
        );
    }

    #[test]
    fn install_creates_records_and_configures() {
        let f = fixture(PRE_RECEIVE);
        let scope = Scope::repository(42, 7);
        let script = f.installer.install(&hook_settings(), scope).unwrap();

        assert_eq!(script.script_type, HookScriptType::Pre);
        assert_eq!(script.plugin_key, PLUGIN_KEY);
        assert!(script
            .content
            .contains("'/srv/host/external-hooks/check.sh' '--strict' 'it'\"'\"'s'"));
        assert_eq!(
            f.store.get(&f.installer.record_key(scope)).unwrap(),
            Some(script.id.to_string())
        );
        assert_eq!(
            f.scripts.configured.lock().unwrap().as_slice(),
            &[(script.id, scope, PUSH_TRIGGERS.to_vec())]
        );
    }

    #[test]
    fn reinstall_replaces_previous_script() {
        let f = fixture(POST_RECEIVE);
        let scope = Scope::project(7);
        let first = f.installer.install(&hook_settings(), scope).unwrap();
        let second = f.installer.install(&hook_settings(), scope).unwrap();

        let live = f.scripts.live.lock().unwrap();
        assert_eq!(live.len(), 1);
        assert!(live.contains_key(&second.id));
        assert!(!live.contains_key(&first.id));
    }

    #[test]
    fn stale_record_heals_on_install() {
        let f = fixture(PRE_RECEIVE);
        let scope = Scope::project(7);
        f.store.put(&f.installer.record_key(scope), "999").unwrap();

        let script = f.installer.install(&hook_settings(), scope).unwrap();
        assert_eq!(f.scripts.live.lock().unwrap().len(), 1);
        assert_eq!(
            f.store.get(&f.installer.record_key(scope)).unwrap(),
            Some(script.id.to_string())
        );
    }

    #[test]
    fn escaping_executable_is_not_installed() {
        let f = fixture(PRE_RECEIVE);
        let settings = hook_settings().with_string(settings::EXE, "../../../bin/sh");
        let err = f.installer.install(&settings, Scope::Global).unwrap_err();
        assert!(matches!(err, ProvisionError::UnresolvableExecutable(_)));
        assert!(f.scripts.live.lock().unwrap().is_empty());
    }

    #[test]
    fn uninstall_deletes_script_and_record() {
        let f = fixture(PRE_RECEIVE);
        let scope = Scope::project(7);
        f.installer.install(&hook_settings(), scope).unwrap();

        f.installer.uninstall(&PRE_RECEIVE.key(), scope).unwrap();
        assert!(f.scripts.live.lock().unwrap().is_empty());
        assert_eq!(f.store.get(&f.installer.record_key(scope)).unwrap(), None);
    }

    #[test]
    fn uninstall_ignores_other_families() {
        let f = fixture(PRE_RECEIVE);
        let scope = Scope::project(7);
        f.installer.install(&hook_settings(), scope).unwrap();

        f.installer.uninstall(&POST_RECEIVE.key(), scope).unwrap();
        assert_eq!(f.scripts.live.lock().unwrap().len(), 1);
    }

    #[test]
    fn uninstall_of_vanished_script_clears_record() {
        let f = fixture(PRE_RECEIVE);
        let scope = Scope::project(7);
        f.store.put(&f.installer.record_key(scope), "999").unwrap();

        f.installer.uninstall(&PRE_RECEIVE.key(), scope).unwrap();
        assert_eq!(f.store.get(&f.installer.record_key(scope)).unwrap(), None);
    }
}
