//! clikit: inspect and validate settings files
//!
//! Loads a `settings.yml` the same way an application built on the library
//! would, then reports the result.

use anyhow::Result;

mod cli;

fn main() -> Result<()> {
    cli::run()
}
