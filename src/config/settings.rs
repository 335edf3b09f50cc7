//! Per-scope hook settings as the host persists them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub const EXE: &str = "exe";
pub const PARAMS: &str = "params";
pub const SAFE_PATH: &str = "safe_path";
pub const ASYNC: &str = "async";
pub const ADD_COMMENTS: &str = "add_comments";
pub const DECLINE_ON_REJECTION: &str = "decline_pull_request_on_rejection";

/// Separator between arguments in the multi-line `params` field.
pub const PARAMS_SEPARATOR: &str = "\r\n";

/// A single stored setting value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    Bool(bool),
    String(String),
}

/// Key/value settings attached to a hook at one scope.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Settings(BTreeMap<String, SettingValue>);

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_string(mut self, key: &str, value: impl Into<String>) -> Self {
        self.0
            .insert(key.to_string(), SettingValue::String(value.into()));
        self
    }

    pub fn with_bool(mut self, key: &str, value: bool) -> Self {
        self.0.insert(key.to_string(), SettingValue::Bool(value));
        self
    }

    pub fn get_string(&self, key: &str) -> Option<&str> {
        match self.0.get(key) {
            Some(SettingValue::String(s)) => Some(s),
            _ => None,
        }
    }

    /// Boolean setting; string values `"true"`/`"false"` are accepted too.
    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        match self.0.get(key) {
            Some(SettingValue::Bool(b)) => *b,
            Some(SettingValue::String(s)) => s.parse().unwrap_or(default),
            None => default,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Typed view over [`Settings`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookConfiguration {
    pub executable: String,
    pub args: Vec<String>,
    pub safe_mode: bool,
    pub async_mode: bool,
    pub add_comments: bool,
    pub decline_on_rejection: bool,
}

impl HookConfiguration {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            executable: settings.get_string(EXE).unwrap_or_default().to_string(),
            args: split_params(settings.get_string(PARAMS)),
            safe_mode: settings.get_bool(SAFE_PATH, false),
            async_mode: settings.get_bool(ASYNC, false),
            add_comments: settings.get_bool(ADD_COMMENTS, false),
            decline_on_rejection: settings.get_bool(DECLINE_ON_REJECTION, false),
        }
    }
}

/// Split the `params` field into arguments: one per CRLF-separated line,
/// empty lines dropped.
pub fn split_params(params: Option<&str>) -> Vec<String> {
    match params {
        Some(p) if !p.trim().is_empty() => p
            .split(PARAMS_SEPARATOR)
            .filter(|arg| !arg.is_empty())
            .map(String::from)
            .collect(),
        _ => Vec::new(),
    }
}
