//! Single-line file cache.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::{Cache, CacheError, CacheKind, CacheOptions};

pub const DEFAULT_DIRECTORY: &str = "config";
pub const DEFAULT_FILENAME: &str = "cache.txt";

/// Keeps one line of text, persisted to `<directory>/<filename>`.
#[derive(Debug)]
pub struct LineCacher {
    options: CacheOptions,
    path: PathBuf,
    auto_write: bool,
    value: Option<String>,
    dirty: bool,
}

impl LineCacher {
    /// Build the cache, reading the current line if the file already exists.
    pub fn open(options: CacheOptions) -> Result<Self, CacheError> {
        let directory =
            options.directory.clone().unwrap_or_else(|| PathBuf::from(DEFAULT_DIRECTORY));
        let filename = options.filename.clone().unwrap_or_else(|| DEFAULT_FILENAME.to_string());
        let path = directory.join(filename);
        let auto_write = options.auto_write.unwrap_or(false);

        let value = match fs::read_to_string(&path) {
            Ok(content) => content.lines().next().map(str::to_string),
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(source) => return Err(CacheError::Io { path, source }),
        };

        tracing::debug!(path = %path.display(), auto_write, "line cache opened");

        Ok(Self { options, path, auto_write, value, dirty: false })
    }

    pub fn auto_write(&self) -> bool {
        self.auto_write
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    fn write_file(&mut self) -> Result<(), CacheError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|source| CacheError::Io { path: parent.to_path_buf(), source })?;
        }
        let content = self.value.as_deref().unwrap_or("");
        fs::write(&self.path, content)
            .map_err(|source| CacheError::Io { path: self.path.clone(), source })?;
        self.dirty = false;
        Ok(())
    }
}

impl Cache for LineCacher {
    fn kind(&self) -> CacheKind {
        CacheKind::Line
    }

    fn options(&self) -> &CacheOptions {
        &self.options
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn get(&self) -> Option<&str> {
        self.value.as_deref()
    }

    fn set(&mut self, value: &str) -> Result<(), CacheError> {
        // Only the first line is kept.
        let line = value.lines().next().unwrap_or("");
        self.value = Some(line.to_string());
        self.dirty = true;
        if self.auto_write {
            self.write_file()?;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<(), CacheError> {
        if !self.dirty {
            return Ok(());
        }
        self.write_file()
    }
}
