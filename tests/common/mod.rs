// Shared helpers for integration tests: in-memory host fakes, domain
// builders and a driver for the built binary.
#![allow(dead_code)]

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::Mutex;
use std::time::Duration;

use external_hooks::config::Settings;
use external_hooks::domain::{
    NamedLink, Project, PullRequest, PullRequestRef, Repository, RepositoryPermissions, Scope,
    User,
};
use external_hooks::host::{
    Directory, HookScript, HookScriptCreateRequest, HookScriptService, HostError, Page,
    PageRequest, PullRequestActions, RepositoryHook, RepositoryHookService, Scheduler, Trigger,
};
use external_hooks::protocol::PushContext;

// ---- Binary driver ----

pub fn binary_path() -> PathBuf {
    let path = PathBuf::from(env!("CARGO_BIN_EXE_external-hooks"));
    assert!(path.exists(), "binary not found at {}", path.display());
    path
}

/// Runs the binary with the given args and stdin.
/// Returns (stdout, stderr, exit_code).
pub fn run_binary(args: &[&str], stdin_input: &str) -> (String, String, i32) {
    let output = Command::new(binary_path())
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .and_then(|mut child| {
            use std::io::{ErrorKind, Write};
            let write_result = child
                .stdin
                .take()
                .unwrap()
                .write_all(stdin_input.as_bytes());
            if let Err(e) = write_result {
                if e.kind() != ErrorKind::BrokenPipe {
                    return Err(e);
                }
            }
            child.wait_with_output()
        })
        .expect("failed to execute binary");

    let stdout = String::from_utf8(output.stdout).expect("stdout not valid UTF-8");
    let stderr = String::from_utf8(output.stderr).expect("stderr not valid UTF-8");
    let exit_code = output.status.code().unwrap_or(-1);
    (stdout, stderr, exit_code)
}

/// Write `body` as a shell script under `dir` with the given mode.
pub fn write_script(dir: &Path, name: &str, body: &str, mode: u32) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, format!("#!/bin/sh\n{body}")).unwrap();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&path, fs::Permissions::from_mode(mode)).unwrap();
    }
    #[cfg(not(unix))]
    let _ = mode;
    path
}

/// Settings running `/bin/sh <script>` so freshly written files are never
/// exec'd directly.
pub fn sh_settings(script: &Path) -> Settings {
    Settings::new()
        .with_string("exe", "/bin/sh")
        .with_string("params", script.to_string_lossy())
}

// ---- Domain builders ----

pub fn project(id: i64) -> Project {
    Project {
        id,
        key: format!("PRJ{id}"),
        name: format!("Project {id}"),
    }
}

pub fn repository(id: i64, project_id: i64) -> Repository {
    Repository {
        id,
        slug: format!("repo-{id}"),
        name: format!("Repo {id}"),
        project: project(project_id),
        is_fork: false,
        clone_links: vec![
            NamedLink::new("ssh", format!("ssh://git@host/prj{project_id}/repo-{id}.git")),
            NamedLink::new("http", format!("https://host/scm/prj{project_id}/repo-{id}.git")),
        ],
    }
}

pub fn user() -> User {
    User {
        id: 5,
        name: "alice".into(),
        display_name: "Alice".into(),
        slug: "alice".into(),
        email: Some("alice@example.com".into()),
    }
}

pub fn push_context(repository: Repository) -> PushContext {
    PushContext {
        user: user(),
        repository,
        permissions: RepositoryPermissions {
            admin: false,
            write: true,
            direct_admin: false,
            direct_write: false,
        },
        base_url: "https://host".into(),
    }
}

pub fn pull_request(id: i64, version: i32) -> PullRequest {
    let target = repository(11, 3);
    PullRequest {
        id,
        version,
        title: "Add feature".into(),
        author: user(),
        from_ref: PullRequestRef {
            id: "refs/heads/feature".into(),
            display_id: "feature".into(),
            latest_commit: "f00d".into(),
            repository: target.clone(),
        },
        to_ref: PullRequestRef {
            id: "refs/heads/master".into(),
            display_id: "master".into(),
            latest_commit: "beef".into(),
            repository: target,
        },
    }
}

// ---- Host fakes ----

#[derive(Default)]
pub struct FakeScripts {
    pub live: Mutex<BTreeMap<i64, HookScript>>,
    pub configured: Mutex<Vec<(i64, Scope, Vec<Trigger>)>>,
    pub created: Mutex<usize>,
    /// Content substring that makes `create` fail.
    pub fail_on: Mutex<Option<String>>,
}

impl FakeScripts {
    pub fn live_count(&self) -> usize {
        self.live.lock().unwrap().len()
    }

    pub fn created_count(&self) -> usize {
        *self.created.lock().unwrap()
    }

    /// Drop a script behind the installer's back.
    pub fn vanish(&self, id: i64) {
        self.live.lock().unwrap().remove(&id);
    }
}

impl HookScriptService for FakeScripts {
    fn find_by_id(&self, id: i64) -> Result<Option<HookScript>, HostError> {
        Ok(self.live.lock().unwrap().get(&id).cloned())
    }

    fn create(&self, request: HookScriptCreateRequest) -> Result<HookScript, HostError> {
        if let Some(needle) = self.fail_on.lock().unwrap().as_deref() {
            if request.content.contains(needle) {
                return Err(HostError::Failed("create refused".into()));
            }
        }
        let mut created = self.created.lock().unwrap();
        *created += 1;
        let script = HookScript {
            id: 100 + *created as i64,
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

/// Hooks and their settings, configured per scope. `search` reports hooks
/// configured at the scope itself or any of its ancestors.
#[derive(Default)]
pub struct FakeHooks {
    pub hooks: Mutex<Vec<RepositoryHook>>,
    pub settings: Mutex<BTreeMap<(String, String), Settings>>,
}

impl FakeHooks {
    pub fn configure(&self, key: &str, scope: Scope, enabled: bool, settings: Settings) {
        self.hooks.lock().unwrap().push(RepositoryHook {
            key: key.to_string(),
            scope,
            enabled,
            configured: !settings.is_empty(),
        });
        self.settings
            .lock()
            .unwrap()
            .insert((key.to_string(), scope.to_string()), settings);
    }
}

impl RepositoryHookService for FakeHooks {
    fn search(&self, scope: Scope) -> Result<Vec<RepositoryHook>, HostError> {
        Ok(self
            .hooks
            .lock()
            .unwrap()
            .iter()
            .filter(|hook| hook.scope == scope || hook.scope.is_ancestor_of(&scope))
            .cloned()
            .collect())
    }

    fn settings(&self, scope: Scope, hook_key: &str) -> Result<Option<Settings>, HostError> {
        Ok(self
            .settings
            .lock()
            .unwrap()
            .get(&(hook_key.to_string(), scope.to_string()))
            .cloned())
    }
}

/// Projects and repositories served in a single page each.
#[derive(Default)]
pub struct FakeDirectory {
    pub projects: Vec<Project>,
    pub repositories: Vec<Repository>,
}

impl Directory for FakeDirectory {
    fn projects(&self, _page: PageRequest) -> Result<Page<Project>, HostError> {
        Ok(Page::last(self.projects.clone()))
    }

    fn repositories(
        &self,
        project: &Project,
        _page: PageRequest,
    ) -> Result<Page<Repository>, HostError> {
        Ok(Page::last(
            self.repositories
                .iter()
                .filter(|r| r.project.id == project.id)
                .cloned()
                .collect(),
        ))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Comment(i64, String),
    Decline(i64, i32),
}

#[derive(Default)]
pub struct FakeActions {
    pub actions: Mutex<Vec<Action>>,
}

impl FakeActions {
    pub fn taken(&self) -> Vec<Action> {
        self.actions.lock().unwrap().clone()
    }
}

impl PullRequestActions for FakeActions {
    fn add_comment(&self, pull_request: &PullRequest, text: &str) -> Result<(), HostError> {
        self.actions
            .lock()
            .unwrap()
            .push(Action::Comment(pull_request.id, text.to_string()));
        Ok(())
    }

    fn decline(&self, pull_request: &PullRequest, version: i32) -> Result<(), HostError> {
        self.actions
            .lock()
            .unwrap()
            .push(Action::Decline(pull_request.id, version));
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeScheduler {
    pub scheduled: Mutex<Vec<(String, Duration)>>,
    pub unscheduled: Mutex<Vec<String>>,
}

impl Scheduler for FakeScheduler {
    fn schedule_once(&self, job_id: &str, delay: Duration) -> Result<(), HostError> {
        self.scheduled
            .lock()
            .unwrap()
            .push((job_id.to_string(), delay));
        Ok(())
    }

    fn unschedule(&self, job_id: &str) -> Result<(), HostError> {
        self.unscheduled.lock().unwrap().push(job_id.to_string());
        Ok(())
    }
}
