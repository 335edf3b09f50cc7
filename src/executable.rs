//! Resolution and validation of the configured hook executable.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::config::{settings, HostConfig, Settings};
use crate::domain::SandboxedPath;
use crate::license::LicenseGate;

/// Directory under the (shared) home that safe-mode paths are confined to.
pub const SANDBOX_DIR: &str = "external-hooks";

/// Resolves configured executable paths, honouring safe mode.
#[derive(Debug, Clone)]
pub struct ExecutableResolver {
    home: PathBuf,
}

impl ExecutableResolver {
    pub fn new(home: impl Into<PathBuf>) -> Self {
        Self { home: home.into() }
    }

    /// Uses the shared home in clustered deployments, the node home otherwise.
    pub fn for_host(host: &HostConfig) -> Self {
        let home = match (&host.shared_home, host.clustered) {
            (Some(shared), true) => shared.clone(),
            _ => host.home.clone(),
        };
        Self::new(home)
    }

    pub fn sandbox_dir(&self) -> PathBuf {
        self.home.join(SANDBOX_DIR)
    }

    /// Without safe mode the path is used verbatim. In safe mode it is
    /// normalized and anchored under [`Self::sandbox_dir`]; `None` if it
    /// would climb out.
    pub fn resolve(&self, path: &str, safe_mode: bool) -> Option<PathBuf> {
        if !safe_mode {
            return Some(PathBuf::from(path));
        }
        let relative = SandboxedPath::new(path)?;
        Some(self.sandbox_dir().join(relative.as_str()))
    }
}

/// A validation failure attached to one settings field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    fn exe(message: &str) -> Self {
        Self {
            field: settings::EXE,
            message: message.to_string(),
        }
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

pub const UNLICENSED: &str = "External Hooks Add-on is Unlicensed.";
pub const LICENSE_EXPIRED: &str = "License for External Hooks is expired.";
pub const SAFE_MODE_REQUIRED: &str =
    "Running in clustered mode. You must use \"safe mode\" option.";
pub const SYSTEM_ADMIN_REQUIRED: &str = "You should be a System Administrator to edit this \
    field without \"safe mode\" option.";
pub const BLANK_EXECUTABLE: &str = "Executable is blank, please specify something";
pub const MISSING_EXECUTABLE: &str = "Executable does not exist";
pub const NOT_EXECUTABLE: &str = "Specified path is not executable file. Check executable flag.";

/// Checks hook settings before they are activated at a scope.
#[derive(Debug, Clone)]
pub struct SettingsValidator {
    resolver: ExecutableResolver,
    license: LicenseGate,
    clustered: bool,
}

impl SettingsValidator {
    pub fn new(resolver: ExecutableResolver, license: LicenseGate, clustered: bool) -> Self {
        Self {
            resolver,
            license,
            clustered,
        }
    }

    /// First failing check wins; the order is part of the contract.
    pub fn validate(&self, settings: &Settings, system_admin: bool) -> Result<PathBuf, FieldError> {
        if !self.license.is_defined() {
            return Err(FieldError::exe(UNLICENSED));
        }
        if !self.license.is_valid() {
            return Err(FieldError::exe(LICENSE_EXPIRED));
        }

        let safe_mode = settings.get_bool(settings::SAFE_PATH, false);
        if self.clustered && !safe_mode {
            return Err(FieldError::exe(SAFE_MODE_REQUIRED));
        }
        if !safe_mode && !system_admin {
            return Err(FieldError::exe(SYSTEM_ADMIN_REQUIRED));
        }

        let path = settings.get_string(settings::EXE).unwrap_or_default();
        if path.is_empty() {
            return Err(FieldError::exe(BLANK_EXECUTABLE));
        }

        let executable = self
            .resolver
            .resolve(path, safe_mode)
            .filter(|p| p.is_file())
            .ok_or_else(|| FieldError::exe(MISSING_EXECUTABLE))?;
        if !is_executable(&executable) {
            return Err(FieldError::exe(NOT_EXECUTABLE));
        }

        info!(executable = %executable.display(), "hook executable accepted");
        Ok(executable)
    }
}

/// Check if the file at the given path has an executable bit set (Unix only).
/// On non-Unix platforms, returns true if the file exists.
pub fn is_executable(path: &Path) -> bool {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::metadata(path)
            .map(|m| m.permissions().mode() & 0o111 != 0)
            .unwrap_or(false)
    }
    #[cfg(not(unix))]
    {
        path.exists()
    }
}
