//! `billtrack serve` — HTTP surface plus the scheduled sync loop.

use anyhow::{Context, Result};
use clap::Args;

use billtrack_core::Config;
use billtrack_server::serve_blocking;

/// Arguments for `billtrack serve`.
#[derive(Args, Debug)]
pub struct ServeArgs {}

impl ServeArgs {
    pub fn run(self) -> Result<()> {
        let cfg = Config::from_env().context("configuration incomplete")?;
        serve_blocking(cfg).context("server exited with an error")?;
        Ok(())
    }
}
