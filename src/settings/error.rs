//! Settings loading errors.

use std::path::PathBuf;

use thiserror::Error;

use crate::cache::CacheError;
use crate::commander::CommanderError;
use crate::logger::LoggerError;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed reading settings file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed settings in {origin}: {source}")]
    MalformedConfiguration {
        origin: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid cache type '{name}' (known types: {})", known.join(", "))]
    UnknownCacheType { name: String, known: Vec<String> },

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error(transparent)]
    Commander(#[from] CommanderError),

    #[error(transparent)]
    Logger(#[from] LoggerError),
}
