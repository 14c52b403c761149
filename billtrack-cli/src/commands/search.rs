//! `billtrack search` — surface untracked candidate bills.

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use clap::Args;
use colored::Colorize;

use billtrack_client::{ClientStats, LegiScanClient, SearchHit};
use billtrack_core::Config;
use billtrack_server::runner::LiveSearch;
use billtrack_sync::{discover, IgnoreList, KnownBills, SnapshotStore, WORKSHEETS};

/// Arguments for `billtrack search`.
#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Search terms; each is queried separately.
    #[arg(required = true)]
    pub terms: Vec<String>,

    /// Include bills that are already tracked or ignored.
    #[arg(long)]
    pub all: bool,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

impl SearchArgs {
    pub fn run(self) -> Result<()> {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
            .init();
        let cfg = Config::from_env().context("configuration incomplete")?;
        let stats = Arc::new(ClientStats::default());
        let client = LegiScanClient::from_config(&cfg, stats);
        let search = LiveSearch::new(&cfg, &client);

        let known = if self.all {
            KnownBills::default()
        } else {
            known_bills(&cfg)
        };
        let ignore = if self.all {
            IgnoreList::default()
        } else {
            IgnoreList::load(&IgnoreList::default_path(&cfg.data_dir))
                .context("cannot read ignore list")?
        };

        let hits = discover(&search, &self.terms, &known, &ignore);

        if self.json {
            println!("{}", serde_json::to_string_pretty(&hits)?);
            return Ok(());
        }

        if hits.is_empty() {
            println!("no untracked bills found");
            return Ok(());
        }
        println!("{} candidate bills:\n", hits.len());
        for hit in &hits {
            print_hit(hit);
        }
        Ok(())
    }
}

/// Identity sets from every worksheet snapshot across configured years.
fn known_bills(cfg: &Config) -> KnownBills {
    let snapshots = SnapshotStore::new(&cfg.data_dir);
    let mut known = KnownBills::default();
    for year in &cfg.years {
        for spec in &WORKSHEETS {
            if let Some(rows) = snapshots.load(spec.name, *year) {
                for row in &rows {
                    known.add(row);
                }
            }
        }
    }
    known
}

fn print_hit(hit: &SearchHit) {
    let date = hit.last_action_date.as_deref().unwrap_or("undated");
    let line = format!(
        "{} {} — {}\n  {} ({})\n  {}",
        hit.state, hit.bill_number, hit.title, hit.last_action, date, hit.url
    );
    // Recent activity gets attention first.
    match age_days(hit.last_action_date.as_deref()) {
        Some(age) if age <= 7 => println!("{}\n", line.red()),
        Some(age) if age <= 30 => println!("{}\n", line.yellow()),
        _ => println!("{line}\n"),
    }
}

fn age_days(date: Option<&str>) -> Option<i64> {
    let date = NaiveDate::parse_from_str(date?, "%Y-%m-%d").ok()?;
    Some((Utc::now().date_naive() - date).num_days())
}
