//! clikit: YAML-driven settings for command-line tools
//!
//! One `settings.yml` describes the command line, the logger, an optional
//! cache and arbitrary application values. [`Settings::load`] reads it and
//! configures each piece in order.

pub mod cache;
pub mod commander;
pub mod logger;
pub mod settings;

pub use cache::{Cache, CacheKind, CacheOptions, CacheRegistry, LineCacher};
pub use commander::{Commander, CommanderSettings, Opts};
pub use logger::{LogLevel, Logger, LoggerSettings};
pub use settings::{LoadState, Settings, SettingsError, SettingsSummary};
