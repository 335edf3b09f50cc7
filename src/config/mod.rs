mod document;
pub mod settings;

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use document::{ConfigDocument, ConfigSection};

use crate::license::License;

pub use settings::{HookConfiguration, SettingValue, Settings};

/// Top-level configuration loaded from a KDL file.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Settings of the configured hook, keyed like the host stores them.
    pub hook: Settings,
    pub host: HostConfig,
}

/// Facts about the hosting installation.
#[derive(Debug, Clone)]
pub struct HostConfig {
    pub home: PathBuf,
    /// Home shared by all nodes; used instead of `home` when clustered.
    pub shared_home: Option<PathBuf>,
    pub clustered: bool,
    pub timeout: Option<Duration>,
    pub license: Option<License>,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            home: PathBuf::from("."),
            shared_home: None,
            clustered: false,
            timeout: None,
            license: None,
        }
    }
}

/// Errors that can occur when loading or parsing a config file.
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    #[diagnostic(code(external_hooks::config::not_found))]
    NotFound(PathBuf),
    #[error("failed to read config: {0}")]
    #[diagnostic(code(external_hooks::config::read))]
    ReadError(#[from] std::io::Error),
    #[error("invalid KDL syntax: {0}")]
    #[diagnostic(code(external_hooks::config::syntax))]
    ParseError(String),
    #[error("invalid config: {0}")]
    #[diagnostic(
        code(external_hooks::config::invalid),
        help("see the `hook` and `host` sections in the README")
    )]
    ValidationError(String),
}

impl Config {
    /// Load a config from a KDL file at the given path.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        Self::from_document(&ConfigDocument::load(path)?)
    }

    /// Parse a KDL string into a Config.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        Self::from_document(&ConfigDocument::parse(content)?)
    }

    fn from_document(doc: &ConfigDocument) -> Result<Self, ConfigError> {
        let hook = match doc.section("hook") {
            Some(section) => parse_hook(&section)?,
            None => Settings::default(),
        };
        let host = match doc.section("host") {
            Some(section) => parse_host(&section)?,
            None => HostConfig::default(),
        };
        Ok(Config { hook, host })
    }
}

fn parse_hook(section: &ConfigSection<'_>) -> Result<Settings, ConfigError> {
    let mut hook = Settings::new();
    for node in section.nodes() {
        hook = match node.name() {
            settings::EXE => hook.with_string(settings::EXE, node.string()?),
            settings::PARAMS => {
                let params = node.strings()?.join(settings::PARAMS_SEPARATOR);
                hook.with_string(settings::PARAMS, params)
            }
            key @ (settings::SAFE_PATH
            | settings::ASYNC
            | settings::ADD_COMMENTS
            | settings::DECLINE_ON_REJECTION) => hook.with_bool(key, node.boolean()?),
            other => {
                return Err(ConfigError::ValidationError(format!(
                    "line {}: unknown hook setting '{other}'",
                    node.line()
                )))
            }
        };
    }
    Ok(hook)
}

fn parse_host(section: &ConfigSection<'_>) -> Result<HostConfig, ConfigError> {
    let mut host = HostConfig::default();
    if let Some(node) = section.node("home") {
        host.home = PathBuf::from(node.string()?);
    }
    if let Some(node) = section.node("shared-home") {
        host.shared_home = Some(PathBuf::from(node.string()?));
    }
    if let Some(node) = section.node("clustered") {
        host.clustered = node.boolean()?;
    }
    if let Some(node) = section.node("timeout") {
        host.timeout = Some(Duration::from_secs(node.unsigned()?));
    }
    if let Some(node) = section.node("license") {
        let expires = match node.unsigned_property("expires")? {
            Some(secs) => Some(
                SystemTime::UNIX_EPOCH
                    .checked_add(Duration::from_secs(secs))
                    .ok_or_else(|| {
                        ConfigError::ValidationError(format!(
                            "line {}: 'license' expires={secs} is out of range",
                            node.line()
                        ))
                    })?,
            ),
            None => None,
        };
        host.license = Some(License::new(expires));
    }
    if host.clustered && host.shared_home.is_none() {
        return Err(ConfigError::ValidationError(
            "clustered hosts need a 'shared-home'".to_string(),
        ));
    }
    Ok(host)
}
