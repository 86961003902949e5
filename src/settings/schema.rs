//! Typed view of the settings document.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Deserialize;
use serde_yaml::Value;

use crate::cache::CacheOptions;
use crate::commander::CommanderSettings;
use crate::logger::{LoggerSettings, DEFAULT_FLAVOR};

/// Top-level document. Every section is optional; unknown keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SettingsDocument {
    pub version: Option<Value>,
    pub arguments: Option<Value>,
    pub description: Option<String>,
    pub usage: Option<String>,
    pub logger: Option<LoggerSection>,
    pub cache: Option<CacheSection>,
    pub settings: Option<BTreeMap<String, Value>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoggerSection {
    pub activated: Option<bool>,
    pub strings: Option<Value>,
    pub path: Option<PathBuf>,
    pub threshold: Option<String>,
    pub exceptions: Option<bool>,
    pub flavor: Option<String>,
    pub title_flavor: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct CacheSection {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub directory: Option<PathBuf>,
    pub filename: Option<String>,
    pub auto_write: Option<bool>,
}

pub const DEFAULT_CACHE_TYPE: &str = "line";

impl SettingsDocument {
    pub fn commander_settings(&self) -> CommanderSettings {
        CommanderSettings {
            version: self.version.clone(),
            arguments: self.arguments.clone(),
            description: self.description.clone(),
            usage: self.usage.clone(),
        }
    }
}

impl LoggerSection {
    /// Apply defaults. A set `verbose` flag clears any threshold.
    pub fn into_settings(self, verbose: bool) -> LoggerSettings {
        LoggerSettings {
            activated: self.activated.unwrap_or(true),
            strings: self.strings,
            output_path: self.path,
            threshold: if verbose { None } else { self.threshold },
            triggers_exceptions: self.exceptions.unwrap_or(true),
            flavor: self.flavor.unwrap_or_else(|| DEFAULT_FLAVOR.to_string()),
            title_flavor: self.title_flavor.unwrap_or_else(|| DEFAULT_FLAVOR.to_string()),
        }
    }
}

impl CacheSection {
    pub fn kind(&self) -> &str {
        self.kind.as_deref().unwrap_or(DEFAULT_CACHE_TYPE)
    }

    pub fn options(&self) -> CacheOptions {
        CacheOptions {
            directory: self.directory.clone(),
            filename: self.filename.clone(),
            auto_write: self.auto_write,
        }
    }
}
