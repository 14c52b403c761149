//! `billtrack run` — one full sync pass from the terminal.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use billtrack_client::ClientStats;
use billtrack_core::Config;
use billtrack_server::run_full_pass;

/// Arguments for `billtrack run`.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Emit machine-readable JSON instead of the summary.
    #[arg(long)]
    pub json: bool,
}

impl RunArgs {
    pub fn run(self) -> Result<()> {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
            .init();
        let cfg = Config::from_env().context("configuration incomplete")?;
        let stats = Arc::new(ClientStats::default());

        let report = run_full_pass(&cfg, stats.clone());

        if self.json {
            println!(
                "{}",
                serde_json::json!({
                    "report": report,
                    "client": stats.snapshot(),
                })
            );
            return Ok(());
        }

        println!(
            "{} new, {} changed, {} errors",
            report.new_bills.len().to_string().green().bold(),
            report.history_changes.len().to_string().yellow().bold(),
            report.dev_errors.len().to_string().red().bold(),
        );
        for alert in &report.new_bills {
            println!("\n{}", alert.green());
        }
        for alert in &report.history_changes {
            println!("\n{}", alert.yellow());
        }
        for error in &report.dev_errors {
            println!("\n{}", error.red());
        }
        let snap = stats.snapshot();
        println!(
            "\n{} upstream calls, {} cache hits, {} misses",
            snap.upstream_calls, snap.cache_hits, snap.cache_misses
        );
        Ok(())
    }
}
