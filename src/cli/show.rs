//! Show command implementation

use anyhow::Result;
use clap::Args;

use super::utils::{load_settings, LoadArgs};

#[derive(Args)]
pub struct ShowArgs {
    #[command(flatten)]
    pub load: LoadArgs,

    /// Print JSON instead of YAML
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: ShowArgs, verbose: bool) -> Result<()> {
    let settings = load_settings(&args.load, verbose)?;
    let summary = settings.summary();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print!("{}", serde_yaml::to_string(&summary)?);
    }
    Ok(())
}
