//! Settings context: the loaded configuration shared by the application.
//!
//! A [`Settings`] value owns the configured [`Commander`] and [`Logger`],
//! the active cache (if the document declares one) and the free-form
//! `settings` values. It is created explicitly at process start and passed
//! to whoever needs it.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_yaml::Value;

use crate::cache::{Cache, CacheKind, CacheRegistry};
use crate::commander::Commander;
use crate::logger::{Logger, LoggerSettings};

pub mod error;
pub mod loader;
pub mod schema;

pub use error::SettingsError;
pub use loader::{default_settings_path, parse_document};
pub use schema::SettingsDocument;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    Unloaded,
    Loaded,
}

#[derive(Debug)]
pub struct Settings {
    commander: Commander,
    logger: Logger,
    cache: Option<Box<dyn Cache>>,
    /// Registry name that resolved `cache`.
    cache_name: Option<String>,
    values: BTreeMap<String, Value>,
    registry: CacheRegistry,
    source: Option<String>,
    state: LoadState,
}

impl Default for Settings {
    fn default() -> Self {
        Self::new(Commander::from_env())
    }
}

impl Settings {
    pub fn new(commander: Commander) -> Self {
        Self {
            commander,
            logger: Logger::new(),
            cache: None,
            cache_name: None,
            values: BTreeMap::new(),
            registry: CacheRegistry::default(),
            source: None,
            state: LoadState::Unloaded,
        }
    }

    /// Replace the cache registry. Must happen before `load`.
    pub fn with_cache_registry(mut self, registry: CacheRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn is_loaded(&self) -> bool {
        self.state == LoadState::Loaded
    }

    /// Where the last successful load read from.
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn commander(&self) -> &Commander {
        &self.commander
    }

    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    pub fn cache_registry(&self) -> &CacheRegistry {
        &self.registry
    }

    pub fn cache(&self) -> Option<&dyn Cache> {
        self.cache.as_deref()
    }

    pub fn cache_name(&self) -> Option<&str> {
        self.cache_name.as_deref()
    }

    pub fn cache_mut(&mut self) -> Option<&mut (dyn Cache + 'static)> {
        self.cache.as_deref_mut()
    }

    pub fn values(&self) -> &BTreeMap<String, Value> {
        &self.values
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Typed lookup. `None` when the key is missing or has another shape.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.values.get(key)?;
        serde_yaml::from_value(value.clone()).ok()
    }

    pub fn summary(&self) -> SettingsSummary {
        let commander = self.commander.settings();
        SettingsSummary {
            source: self.source.clone(),
            loaded: self.is_loaded(),
            version: commander.and_then(|c| c.version.clone()),
            description: commander.and_then(|c| c.description.clone()),
            usage: commander.and_then(|c| c.usage.clone()),
            verbose: self.commander.opts().verbose,
            logger: self.logger.settings().clone(),
            cache: self.cache.as_ref().map(|cache| CacheSummary {
                name: self.cache_name.clone().unwrap_or_else(|| cache.kind().name().to_string()),
                kind: cache.kind(),
                path: cache.path().to_path_buf(),
            }),
            values: self.values.clone(),
        }
    }
}

/// Printable snapshot of a [`Settings`] value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SettingsSummary {
    pub source: Option<String>,
    pub loaded: bool,
    pub version: Option<Value>,
    pub description: Option<String>,
    pub usage: Option<String>,
    pub verbose: bool,
    pub logger: LoggerSettings,
    pub cache: Option<CacheSummary>,
    pub values: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheSummary {
    pub name: String,
    pub kind: CacheKind,
    pub path: PathBuf,
}
