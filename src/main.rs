//! # Main — CLI Entry Point
//!
//! Routes subcommands to the dashboard views in `cli.rs`. Handles shared
//! concerns: `.env` loading, logging setup, settings resolution, and the
//! tokio runtime the backend client runs on.
//!
//! ## Subcommands
//!
//! `refresh` asks the backend to reload its form data. `metrics`, `charts`,
//! `projects`, `search`, `report` and `insights` print one view each.
//! `browse` opens an interactive session that keeps sort and page state
//! across commands.
//!
//! ## Global Options
//!
//! - `--api-url` / `TRLBOARD_API_URL`: backend base URL.
//! - `--user` / `TRLBOARD_USER`: Basic-auth username (default `admin`).
//! - `--password` / `TRLBOARD_PASSWORD`: Basic-auth password (required).
//! - `--page-size`: table rows per page (default 10).
//! - `--config`: settings file (default `~/.trlboard/config.toml`).

mod cli;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use trlboard::ranking::SortKey;

#[derive(Parser)]
#[command(name = "trlboard", about = "Browse TRL project evaluations from the terminal")]
struct Cli {
    /// Backend base URL (or set TRLBOARD_API_URL)
    #[arg(long, env = "TRLBOARD_API_URL", global = true)]
    api_url: Option<String>,

    /// Username for HTTP Basic auth (or set TRLBOARD_USER)
    #[arg(long, env = "TRLBOARD_USER", global = true)]
    user: Option<String>,

    /// Password for HTTP Basic auth (or set TRLBOARD_PASSWORD)
    #[arg(long, env = "TRLBOARD_PASSWORD", hide_env_values = true, global = true)]
    password: Option<String>,

    /// Projects per table page
    #[arg(long, global = true)]
    page_size: Option<usize>,

    /// Settings file (defaults to ~/.trlboard/config.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask the backend to reload its form data
    Refresh,
    /// Show the headline metric cards
    Metrics,
    /// List the available charts, or print one figure as JSON
    Charts {
        /// Chart id to print (e.g. distribucion_trl)
        #[arg(long)]
        id: Option<String>,
    },
    /// Show the ranked project table
    Projects {
        /// Sort column: approved, trl-1-3, trl-4-7, trl-8-9, total
        #[arg(long, default_value = "total")]
        sort: SortKey,
        /// Sort ascending instead of descending
        #[arg(long)]
        ascending: bool,
        /// Page to show (clamped to the last page)
        #[arg(long, default_value_t = 1)]
        page: usize,
        /// Print the page as JSON with the backend's field labels
        #[arg(long)]
        json: bool,
    },
    /// Search projects by name (case-insensitive substring)
    Search {
        /// Text to look for in project names
        name: String,
        /// Print the full detail of every match
        #[arg(long)]
        detail: bool,
    },
    /// Download the report for one project
    Report {
        /// Project name (first case-insensitive match)
        name: String,
        /// Output file (defaults to report_<name>_<date>.<ext>)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Show aggregate insights and the top projects
    Insights,
    /// Interactive session: tabs, sorting, paging and search
    Browse,
}

fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    // LOG_FORMAT=json for log shippers, human-readable on stderr otherwise
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_default();
    if log_format == "json" {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
    }

    let cli = Cli::parse();
    let ctx = cli::Context::from_cli(&cli)?;
    let rt = tokio::runtime::Runtime::new()?;

    match &cli.command {
        Commands::Refresh => rt.block_on(cli::run_refresh(&ctx)),
        Commands::Metrics => rt.block_on(cli::run_metrics(&ctx)),
        Commands::Charts { id } => rt.block_on(cli::run_charts(&ctx, id.as_deref())),
        Commands::Projects {
            sort,
            ascending,
            page,
            json,
        } => rt.block_on(cli::run_projects(&ctx, *sort, *ascending, *page, *json)),
        Commands::Search { name, detail } => rt.block_on(cli::run_search(&ctx, name, *detail)),
        Commands::Report { name, out } => rt.block_on(cli::run_report(&ctx, name, out.as_deref())),
        Commands::Insights => rt.block_on(cli::run_insights(&ctx)),
        Commands::Browse => cli::run_browse(&rt, &ctx),
    }
}
