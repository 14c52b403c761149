//! `billtrack stats` — row statistics from the latest snapshots.

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use billtrack_core::Config;
use billtrack_sync::{SheetStats, SnapshotStore, WORKSHEETS};

/// Arguments for `billtrack stats`.
#[derive(Args, Debug)]
pub struct StatsArgs {
    /// Limit to one tracking year.
    #[arg(long)]
    pub year: Option<i32>,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct WorksheetStats {
    worksheet: String,
    year: i32,
    stats: SheetStats,
}

#[derive(Tabled)]
struct StatsRow {
    #[tabled(rename = "Worksheet")]
    worksheet: String,
    #[tabled(rename = "Year")]
    year: i32,
    #[tabled(rename = "Rows")]
    rows: usize,
    #[tabled(rename = "States")]
    states: usize,
    #[tabled(rename = "Unknown status")]
    unknown_status: usize,
    #[tabled(rename = "Missing URL")]
    missing_url: usize,
}

impl StatsArgs {
    pub fn run(self) -> Result<()> {
        let cfg = Config::from_env().context("configuration incomplete")?;
        let snapshots = SnapshotStore::new(&cfg.data_dir);

        let years: Vec<i32> = match self.year {
            Some(year) => vec![year],
            None => cfg.years.clone(),
        };

        let mut collected = Vec::new();
        for year in years {
            for spec in &WORKSHEETS {
                if let Some(rows) = snapshots.load(spec.name, year) {
                    collected.push(WorksheetStats {
                        worksheet: spec.name.to_string(),
                        year,
                        stats: SheetStats::from_rows(&rows),
                    });
                }
            }
        }

        if self.json {
            println!("{}", serde_json::to_string_pretty(&collected)?);
            return Ok(());
        }

        if collected.is_empty() {
            println!("no snapshots yet; run `billtrack run` first");
            return Ok(());
        }

        let rows: Vec<StatsRow> = collected
            .iter()
            .map(|w| StatsRow {
                worksheet: w.worksheet.clone(),
                year: w.year,
                rows: w.stats.total_rows,
                states: w.stats.by_state.len(),
                unknown_status: w.stats.unknown_status,
                missing_url: w.stats.missing_url,
            })
            .collect();
        let mut table = Table::new(rows);
        table.with(Style::rounded());
        println!("{table}");
        Ok(())
    }
}
