// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

mod commands;

use bazaar_core::{ExitCode, ENV_BAZAAR_DB, ENV_BAZAAR_LOG_JSON};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode as ProcessExitCode;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "bazaar")]
#[command(about = "Import and browse a bazaar catalog database")]
#[command(version)]
struct Cli {
    /// SQLite catalog file.
    #[arg(long, global = true, env = ENV_BAZAAR_DB, default_value = "bazaar.sqlite")]
    db: PathBuf,
    #[arg(long, global = true, default_value_t = false)]
    pretty: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load items from a JSON array of item records.
    Import {
        #[arg(long)]
        items: PathBuf,
    },
    /// One keyset page.
    Page {
        #[command(flatten)]
        query: QueryArgs,
        #[arg(long)]
        first: Option<usize>,
        #[arg(long)]
        after: Option<String>,
        #[arg(long, default_value_t = false)]
        total: bool,
    },
    Count {
        #[command(flatten)]
        query: QueryArgs,
    },
    /// Zero-based offset page.
    OffsetPage {
        #[command(flatten)]
        query: QueryArgs,
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        page: i64,
        #[arg(long)]
        page_size: Option<usize>,
    },
    /// Reachable options per facet.
    Facets {
        #[command(flatten)]
        query: QueryArgs,
    },
    /// SQLite query plan of the first-page query.
    Explain {
        #[command(flatten)]
        query: QueryArgs,
        #[arg(long)]
        first: Option<usize>,
    },
}

#[derive(Args, Debug, Clone, Default)]
struct QueryArgs {
    /// alphabetical | release-date | rating | popularity
    #[arg(long)]
    sort: Option<String>,
    #[arg(long, value_enum)]
    direction: Option<DirectionArg>,
    #[arg(long)]
    search: Option<String>,
    /// `facet=value`, repeatable; values of one facet are all required.
    #[arg(long = "filter")]
    filters: Vec<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DirectionArg {
    Asc,
    Desc,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let log_json = std::env::var(ENV_BAZAAR_LOG_JSON)
        .map(|v| matches!(v.as_str(), "1" | "true" | "TRUE" | "yes" | "YES"))
        .unwrap_or(false);
    // stdout carries command output; logs go to stderr.
    if log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() -> ProcessExitCode {
    init_tracing();
    let cli = Cli::parse();
    match commands::run(cli).await {
        Ok(()) => ProcessExitCode::from(ExitCode::Success as u8),
        Err(err) => {
            let body = serde_json::to_string(&err).unwrap_or_else(|_| err.to_string());
            eprintln!("{body}");
            ProcessExitCode::from(err.exit_code() as u8)
        }
    }
}
