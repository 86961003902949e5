//! Cache backends and the name → factory registry used by the settings loader.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod line_cacher;

pub use line_cacher::LineCacher;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache I/O failed for {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Raw constructor arguments taken from the `cache` section.
///
/// Every field is optional; each backend applies its own defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheOptions {
    pub directory: Option<PathBuf>,
    pub filename: Option<String>,
    pub auto_write: Option<bool>,
}

/// A configured cache backend.
pub trait Cache: fmt::Debug {
    fn kind(&self) -> CacheKind;

    /// The options this cache was constructed with, before defaulting.
    fn options(&self) -> &CacheOptions;

    fn path(&self) -> &Path;

    fn get(&self) -> Option<&str>;

    fn set(&mut self, value: &str) -> Result<(), CacheError>;

    fn flush(&mut self) -> Result<(), CacheError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheKind {
    Line,
}

impl CacheKind {
    pub const ALL: [CacheKind; 1] = [CacheKind::Line];

    pub fn name(self) -> &'static str {
        match self {
            CacheKind::Line => "line",
        }
    }
}

impl fmt::Display for CacheKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CacheKind {
    type Err = String;

    // Exact match only: "Line" is not "line".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CacheKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| format!("unknown cache kind '{}'", s))
    }
}

pub type CacheFactory = fn(CacheOptions) -> Result<Box<dyn Cache>, CacheError>;

/// Fixed lookup table from cache type name to constructor.
///
/// Built once before loading; the loader only ever reads from it.
#[derive(Clone)]
pub struct CacheRegistry {
    factories: BTreeMap<String, CacheFactory>,
}

impl Default for CacheRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        for kind in CacheKind::ALL {
            registry.factories.insert(kind.name().to_string(), factory_for(kind));
        }
        registry
    }
}

impl fmt::Debug for CacheRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheRegistry").field("names", &self.names()).finish()
    }
}

impl CacheRegistry {
    pub fn empty() -> Self {
        Self { factories: BTreeMap::new() }
    }

    pub fn register(mut self, name: impl Into<String>, factory: CacheFactory) -> Self {
        self.factories.insert(name.into(), factory);
        self
    }

    pub fn lookup(&self, name: &str) -> Option<CacheFactory> {
        self.factories.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        self.factories.keys().cloned().collect()
    }
}

fn factory_for(kind: CacheKind) -> CacheFactory {
    match kind {
        CacheKind::Line => open_line,
    }
}

fn open_line(options: CacheOptions) -> Result<Box<dyn Cache>, CacheError> {
    Ok(Box::new(LineCacher::open(options)?))
}
