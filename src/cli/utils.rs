//! Shared CLI utilities.

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use clikit::{Commander, Settings};

/// Arguments common to every subcommand that loads a settings file.
#[derive(Args, Debug, Clone)]
pub struct LoadArgs {
    /// Settings file (default: ./config/settings.yml)
    #[arg(value_name = "CONFIG")]
    pub config: Option<PathBuf>,

    /// Arguments handed to the application's own parser
    #[arg(last = true, value_name = "APP_ARGS")]
    pub app_args: Vec<String>,
}

/// Build the argv the loaded settings will parse: program name, `--verbose`
/// when requested, then everything after `--`.
pub fn app_argv(verbose: bool, app_args: &[String]) -> Vec<String> {
    let mut argv = vec![env!("CARGO_PKG_NAME").to_string()];
    if verbose {
        argv.push("--verbose".to_string());
    }
    argv.extend(app_args.iter().cloned());
    argv
}

pub fn load_settings(args: &LoadArgs, verbose: bool) -> Result<Settings> {
    let commander = Commander::with_args(app_argv(verbose, &args.app_args));
    let mut settings = Settings::new(commander);
    let shown = args
        .config
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "config/settings.yml".to_string());
    settings
        .load(args.config.as_deref())
        .with_context(|| format!("Failed loading settings from {}", shown))?;
    Ok(settings)
}
