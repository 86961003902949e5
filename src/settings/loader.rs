//! Settings file loading

use std::fs;
use std::path::{Path, PathBuf};

use serde_yaml::Value;

use super::schema::SettingsDocument;
use super::{LoadState, Settings, SettingsError};

/// Title used when the loader reports through the logger.
const LOG_TITLE: &str = "SETTINGS";

/// `<cwd>/config/settings.yml`
pub fn default_settings_path() -> Result<PathBuf, SettingsError> {
    let relative = Path::new("config").join("settings.yml");
    let cwd = std::env::current_dir()
        .map_err(|source| SettingsError::Read { path: relative.clone(), source })?;
    Ok(cwd.join(relative))
}

/// Parse a YAML document. An empty document is an empty tree.
pub fn parse_document(content: &str, origin: &str) -> Result<SettingsDocument, SettingsError> {
    let malformed = |source| SettingsError::MalformedConfiguration { origin: origin.to_string(), source };

    let raw: Value = serde_yaml::from_str(content).map_err(malformed)?;
    if raw.is_null() {
        return Ok(SettingsDocument::default());
    }
    serde_yaml::from_value(raw).map_err(malformed)
}

impl Settings {
    /// Load `path`, or `<cwd>/config/settings.yml` when `None`.
    ///
    /// A failed load keeps whatever steps completed before the failure.
    pub fn load(&mut self, path: Option<&Path>) -> Result<(), SettingsError> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => default_settings_path()?,
        };

        let content = fs::read_to_string(&path)
            .map_err(|source| SettingsError::Read { path: path.clone(), source })?;

        self.load_str(&content, &path.display().to_string())
    }

    /// Apply an in-memory document. `origin` names it in errors.
    pub fn load_str(&mut self, content: &str, origin: &str) -> Result<(), SettingsError> {
        let document = parse_document(content, origin)?;
        tracing::debug!(origin, "settings document parsed");
        self.apply(document)?;

        self.source = Some(origin.to_string());
        self.state = LoadState::Loaded;
        Ok(())
    }

    fn apply(&mut self, document: SettingsDocument) -> Result<(), SettingsError> {
        // The commander goes first: the logger step reads its verbose flag.
        self.commander.configure(document.commander_settings())?;

        let verbose = self.commander.opts().verbose;
        let logger_settings = document.logger.unwrap_or_default().into_settings(verbose);
        self.logger.configure(logger_settings)?;

        if let Some(section) = document.cache {
            let name = section.kind();
            let Some(factory) = self.registry.lookup(name) else {
                let known = self.registry.names();
                let message = format!(
                    "Wrong type of cache supplied: '{}' (known types: {})",
                    name,
                    known.join(", ")
                );
                // The report is best-effort; the cache error is what the caller gets.
                if let Err(e) = self.logger.write(&message, LOG_TITLE) {
                    tracing::warn!("failed to report unknown cache type: {}", e);
                }
                return Err(SettingsError::UnknownCacheType { name: name.to_string(), known });
            };

            let cache = factory(section.options())?;
            tracing::debug!(kind = name, path = %cache.path().display(), "cache initialized");
            self.cache = Some(cache);
            self.cache_name = Some(name.to_string());
        }

        if let Some(values) = document.settings {
            tracing::debug!(count = values.len(), "merging free-form settings");
            self.values.extend(values);
        }

        Ok(())
    }
}
