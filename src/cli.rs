//! # CLI Execution Functions
//!
//! Extracted from `main.rs` to keep the entry point slim. Each subcommand
//! fetches what it needs from the backend and prints one view; `browse` runs
//! the interactive loop on top of [`DashboardSession`].

use anyhow::{Context as _, Result};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use trlboard::api::ReportDocument;
use trlboard::browse::{self, BrowseAction, BrowseCommand};
use trlboard::client::ApiClient;
use trlboard::config::{Credentials, Overrides, Settings};
use trlboard::ranking::{SortDirection, SortKey, SortSpec};
use trlboard::render;
use trlboard::session::{DashboardSession, LoadStatus, Tab};

use super::Cli;

/// Resolved settings plus the credential every request needs.
pub struct Context {
    pub settings: Settings,
    pub credentials: Credentials,
}

impl Context {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let settings = Settings::load(cli.config.as_deref())?.apply_overrides(Overrides {
            api_url: cli.api_url.clone(),
            username: cli.user.clone(),
            page_size: cli.page_size,
        })?;
        let credentials = Credentials::new(
            settings.username.clone(),
            cli.password.clone().unwrap_or_default(),
        )?;
        info!(api_url = %settings.base_url(), user = %credentials.username, "using backend");
        Ok(Context {
            settings,
            credentials,
        })
    }

    fn client(&self) -> Result<ApiClient> {
        ApiClient::new(&self.settings, &self.credentials)
    }
}

fn loaded() -> LoadStatus {
    LoadStatus::Success("Data loaded".to_string())
}

// ── Single Views ────────────────────────────────────────────────

pub async fn run_refresh(ctx: &Context) -> Result<()> {
    let ack = ctx.client()?.refresh_data().await?;
    info!(message = %ack.mensaje, "backend data reloaded");
    println!("{}", ack.mensaje);
    Ok(())
}

pub async fn run_metrics(ctx: &Context) -> Result<()> {
    let metrics = ctx.client()?.main_metrics().await?;
    print!("{}", render::render_metrics(Some(&metrics), &loaded()));
    Ok(())
}

/// Without an id, list the charts; with one, print that figure's JSON so it
/// can be piped into a plotting tool.
pub async fn run_charts(ctx: &Context, id: Option<&str>) -> Result<()> {
    let bundle = ctx.client()?.charts().await?;
    match id {
        Some(id) => {
            let figure = bundle
                .figure(id)
                .with_context(|| format!("chart '{}' not found or not valid JSON", id))?;
            println!("{}", serde_json::to_string_pretty(&figure)?);
        }
        None => print!("{}", render::render_charts(Some(&bundle), &loaded())),
    }
    Ok(())
}

pub async fn run_projects(
    ctx: &Context,
    sort: SortKey,
    ascending: bool,
    page: usize,
    json: bool,
) -> Result<()> {
    let projects = ctx.client()?.projects().await?;
    let mut session = DashboardSession::new(ctx.settings.page_size)?;
    session.set_projects(projects);
    let direction = if ascending {
        SortDirection::Ascending
    } else {
        SortDirection::Descending
    };
    session.set_sort(SortSpec::new(sort, direction));
    let shown = session.go_to_page(page);
    if shown != page {
        warn!(requested = page, shown, "page out of range, clamped");
    }

    let view = session.table();
    if json {
        let page = view.page();
        let out = serde_json::json!({
            "sort": view.sort,
            "page": page.page_number,
            "page_size": page.page_size,
            "total_pages": page.total_pages,
            "total_items": page.total_items,
            "proyectos": page.items,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else if session.projects().is_empty() {
        println!("No projects available.");
    } else {
        print!("{}", render::render_table(&view));
    }
    Ok(())
}

pub async fn run_search(ctx: &Context, name: &str, detail: bool) -> Result<()> {
    let results = ctx.client()?.search(name).await?;
    info!(term = name, hits = results.len(), "search finished");
    if detail && !results.is_empty() {
        for (i, hit) in results.iter().enumerate() {
            if i > 0 {
                println!();
            }
            print!("{}", render::render_project_detail(hit));
        }
    } else {
        print!("{}", render::render_search_results(&results));
    }
    Ok(())
}

/// `report_<name>_<yyyymmdd>.<ext>` in the current directory.
fn default_report_path(name: &str, doc: &ReportDocument) -> PathBuf {
    let slug: String = name
        .trim()
        .chars()
        .map(|c| if c.is_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect();
    let date = chrono::Local::now().format("%Y%m%d");
    PathBuf::from(format!("report_{}_{}.{}", slug, date, doc.extension()))
}

pub async fn run_report(ctx: &Context, name: &str, out: Option<&Path>) -> Result<()> {
    let doc = ctx.client()?.project_report(name).await?;
    let path = match out {
        Some(p) => p.to_path_buf(),
        None => default_report_path(name, &doc),
    };
    std::fs::write(&path, &doc.body)
        .with_context(|| format!("cannot write report to {}", path.display()))?;
    info!(project = name, path = %path.display(), bytes = doc.body.len(), "report saved");
    println!("Saved report to {}", path.display());
    Ok(())
}

pub async fn run_insights(ctx: &Context) -> Result<()> {
    let report = ctx.client()?.general_insights().await?;
    print!("{}", render::render_insights(Some(&report), &loaded()));
    Ok(())
}

// ── Interactive Session ─────────────────────────────────────────

fn refresh_session(rt: &tokio::runtime::Runtime, client: &ApiClient, session: &mut DashboardSession) {
    session.begin_loading();
    match rt.block_on(client.fetch_snapshot()) {
        Ok(snapshot) => session.apply_snapshot(snapshot),
        Err(e) => session.fail(&e),
    }
}

/// Read commands from stdin until `quit` or end of input.
pub fn run_browse(rt: &tokio::runtime::Runtime, ctx: &Context) -> Result<()> {
    let client = ctx.client()?;
    let mut session = DashboardSession::new(ctx.settings.page_size)?;
    refresh_session(rt, &client, &mut session);
    print!("{}", render::render_session(&session));
    println!("\nType 'help' for commands.");

    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    let mut lines = stdin.lock().lines();
    loop {
        print!("> ");
        stdout.flush()?;
        let Some(line) = lines.next() else {
            break;
        };
        let line = line.context("failed to read command")?;
        if line.trim().is_empty() {
            continue;
        }
        let command = match line.parse::<BrowseCommand>() {
            Ok(c) => c,
            Err(e) => {
                println!("error: {:#}", e);
                continue;
            }
        };
        match browse::apply(&mut session, command) {
            BrowseAction::Redraw => print!("{}", render::render_session(&session)),
            BrowseAction::Print(text) => print!("{}", text),
            BrowseAction::Refresh => {
                refresh_session(rt, &client, &mut session);
                print!("{}", render::render_session(&session));
            }
            BrowseAction::Search(term) => match rt.block_on(client.search(&term)) {
                Ok(results) => {
                    session.set_search_results(results);
                    session.set_tab(Tab::Search);
                    print!("{}", render::render_session(&session));
                }
                Err(e) => println!("Search failed: {:#}", e),
            },
            BrowseAction::Quit => break,
        }
    }
    Ok(())
}
