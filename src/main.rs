use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::error;

use profile_scout_lib::ScoutApp;
use profile_scout_lib::infrastructure::logging::{init_logging, log_system_info};
use profile_scout_lib::infrastructure::ConfigManager;

#[derive(Parser)]
#[command(
    name = "profile-scout",
    about = "Find developer profiles on GitHub user search and summarize them",
    version
)]
struct Cli {
    /// TOML configuration file layered over the defaults
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pretty: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search, extract and summarize profiles
    Scrape {
        /// Search keyword
        #[arg(long, short)]
        query: Option<String>,
        /// Number of result pages (1-5)
        #[arg(long, short)]
        pages: Option<u32>,
    },
    /// Serve `[!]<keyword> [pages]` lines from stdin with a shared result cache
    ///
    /// Each line gets one JSON reply on stdout. Repeated requests are served
    /// from the cache; a leading `!` forces a fresh run.
    Batch,
    /// Report readiness and whether summaries are enabled
    Health,
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let out = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{out}");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let config = ConfigManager::new(cli.config.clone())
        .load()
        .context("Failed to load configuration")?;
    init_logging(&config.logging)?;
    log_system_info();

    let app = ScoutApp::from_config(config)?;

    match cli.command {
        Commands::Scrape { query, pages } => {
            let request = app.request(query, pages);
            match app.scrape(&request, false).await {
                Ok(batch) => print_json(batch.as_ref(), cli.pretty)?,
                Err(e) => {
                    error!("{}", e);
                    return Err(e.into());
                }
            }
        }
        Commands::Batch => {
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            let summary = app.run_batch(stdin, &mut tokio::io::stdout()).await?;
            if summary.failures > 0 {
                anyhow::bail!("{} of {} batch requests failed", summary.failures, summary.requests);
            }
        }
        Commands::Health => print_json(&app.health(), cli.pretty)?,
    }

    Ok(())
}
