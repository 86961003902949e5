//! Check command implementation

use anyhow::Result;
use clap::Args;

use super::utils::{load_settings, LoadArgs};

#[derive(Args)]
pub struct CheckArgs {
    #[command(flatten)]
    pub load: LoadArgs,
}

pub fn run(args: CheckArgs, verbose: bool) -> Result<()> {
    let settings = load_settings(&args.load, verbose)?;

    println!("OK: {}", settings.source().unwrap_or("<unknown>"));
    if let Some(cache) = settings.cache() {
        let name = settings.cache_name().unwrap_or_else(|| cache.kind().name());
        println!("Cache: {} ({})", name, cache.path().display());
    }
    println!("Settings: {}", settings.values().len());
    Ok(())
}
