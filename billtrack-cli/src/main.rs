//! Billtrack — legislative bill tracker CLI.
//!
//! # Usage
//!
//! ```text
//! billtrack run [--json]
//! billtrack serve
//! billtrack search <terms>... [--all] [--json]
//! billtrack stats [--year <year>] [--json]
//! ```

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{run::RunArgs, search::SearchArgs, serve::ServeArgs, stats::StatsArgs};

#[derive(Parser, Debug)]
#[command(
    name = "billtrack",
    version,
    about = "Track state legislation in Google Sheets via the LegiScan API",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run one full sync pass over every configured worksheet.
    Run(RunArgs),

    /// Start the HTTP server and the scheduled sync loop.
    Serve(ServeArgs),

    /// Search for untracked candidate bills.
    Search(SearchArgs),

    /// Show per-worksheet row statistics from the latest snapshots.
    Stats(StatsArgs),
}

fn main() -> Result<()> {
    // A missing .env is fine; deployments use real environment variables.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run(args) => args.run(),
        Commands::Serve(args) => args.run(),
        Commands::Search(args) => args.run(),
        Commands::Stats(args) => args.run(),
    }
}
