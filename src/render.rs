//! # Render — Plain-Text Dashboard Views
//!
//! Turns session state into terminal text: metric cards, the sortable project
//! table with its pagination footer, search results, a per-project detail
//! view, the insights summary, and the chart index. Every function returns a
//! `String` so the views can be tested without a terminal.

use crate::api::{ChartBundle, InsightsReport, MainMetrics, ProjectDetail};
use crate::pagination::Page;
use crate::ranking::{SortKey, SortSpec};
use crate::record::{derive_total_score, ProjectRecord};
use crate::session::{DashboardSession, LoadStatus, Tab, TableView};

const NAME_WIDTH_MAX: usize = 40;
const BAR_WIDTH: usize = 20;

/// Score as the table shows it: integers without decimals, otherwise at most
/// two decimals with trailing zeros dropped.
pub fn format_score(value: f64) -> String {
    if !value.is_finite() {
        return "-".to_string();
    }
    if value.fract() == 0.0 {
        return format!("{:.0}", value);
    }
    let s = format!("{:.2}", value);
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        text.to_string()
    } else {
        let mut out: String = text.chars().take(width.saturating_sub(1)).collect();
        out.push('…');
        out
    }
}

/// Empty-state line: before the first refresh vs. after one that had no data.
fn empty_state(status: &LoadStatus, what: &str) -> String {
    if status.is_idle() {
        format!("Refresh the data to see the {}.\n", what)
    } else {
        format!("No {} available.\n", what)
    }
}

pub fn render_status(status: &LoadStatus) -> Option<String> {
    match status {
        LoadStatus::Idle => None,
        LoadStatus::Loading => Some("… Refreshing data".to_string()),
        LoadStatus::Success(msg) => Some(format!("✓ {}", msg)),
        LoadStatus::Error(msg) => Some(format!("✗ {}", msg)),
    }
}

pub fn render_tabs(active: Tab) -> String {
    Tab::ALL
        .iter()
        .map(|tab| {
            if *tab == active {
                format!("[{}]", tab.title())
            } else {
                format!(" {} ", tab.title())
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn render_metrics(metrics: Option<&MainMetrics>, status: &LoadStatus) -> String {
    let Some(m) = metrics else {
        return empty_state(status, "metrics");
    };
    let cards = [
        ("Total projects", m.formularios.to_string()),
        ("Max TRL", m.trl_max.to_string()),
        ("Approved", m.aprobados.to_string()),
        ("With advisor", m.docente_si.to_string()),
        ("Without advisor", m.docente_no.to_string()),
    ];
    let mut out = String::new();
    for (title, value) in cards {
        out.push_str(&format!("  {:<16} {:>8}\n", title, value));
    }
    out
}

fn header_cell(key: SortKey, sort: SortSpec) -> String {
    if key == sort.key {
        format!("{} {}", key.header(), sort.direction.marker())
    } else {
        key.header().to_string()
    }
}

/// Footer and page buttons, e.g. `Showing 11 to 20 of 23 projects` and
/// `< Previous  1 [2] 3  Next >`.
pub fn render_page_controls<T>(page: &Page<'_, T>) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Showing {} to {} of {} projects\n",
        page.first_shown(),
        page.last_shown(),
        page.total_items
    ));
    let previous = if page.has_previous() { "< Previous" } else { "  Previous" };
    let next = if page.has_next() { "Next >" } else { "Next  " };
    let numbers = (1..=page.total_pages)
        .map(|p| {
            if p == page.page_number {
                format!("[{}]", p)
            } else {
                p.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ");
    out.push_str(&format!("{}  {}  {}\n", previous, numbers, next));
    out
}

pub fn render_table(view: &TableView) -> String {
    let page = view.page();
    let name_width = page
        .items
        .iter()
        .map(|r| r.name.chars().count())
        .chain(std::iter::once("Project".len()))
        .max()
        .unwrap_or(0)
        .min(NAME_WIDTH_MAX);

    let mut out = String::new();
    out.push_str(&format!(
        "{:<nw$}  {:<10}  {:>9}  {:>9}  {:>9}  {:>9}  {}\n",
        "Project",
        header_cell(SortKey::Approved, view.sort),
        header_cell(SortKey::Trl13, view.sort),
        header_cell(SortKey::Trl47, view.sort),
        header_cell(SortKey::Trl89, view.sort),
        header_cell(SortKey::TotalScore, view.sort),
        "Segment",
        nw = name_width,
    ));
    out.push_str(&format!("{}\n", "-".repeat(name_width + 70)));
    for record in page.items {
        out.push_str(&format!("{}\n", render_row(record, name_width)));
    }
    out.push('\n');
    out.push_str(&render_page_controls(&page));
    out
}

fn render_row(record: &ProjectRecord, name_width: usize) -> String {
    format!(
        "{:<nw$}  {:<10}  {:>9}  {:>9}  {:>9}  {:>9}  {}",
        truncate(&record.name, name_width),
        record.approved.label(),
        format_score(record.trl_1_3),
        format_score(record.trl_4_7),
        format_score(record.trl_8_9),
        format_score(derive_total_score(record)),
        record.segment_label(),
        nw = name_width,
    )
}

pub fn render_projects(session: &DashboardSession) -> String {
    if session.projects().is_empty() {
        return empty_state(session.status(), "projects");
    }
    render_table(&session.table())
}

pub fn render_search_results(results: &[ProjectDetail]) -> String {
    if results.is_empty() {
        return "No matching projects.\n".to_string();
    }
    let mut out = String::new();
    for (i, detail) in results.iter().enumerate() {
        out.push_str(&format!(
            "{:>3}. {}  [{}]\n",
            i + 1,
            detail.record.name,
            detail.record.approved.label()
        ));
    }
    out
}

fn score_bar(label: &str, value: f64) -> String {
    let clamped = if value.is_finite() { value.clamp(0.0, 100.0) } else { 0.0 };
    let filled = ((clamped / 100.0) * BAR_WIDTH as f64).round() as usize;
    format!(
        "  {:<22} [{}{}] {}%",
        label,
        "#".repeat(filled),
        ".".repeat(BAR_WIDTH - filled),
        format_score(value)
    )
}

pub fn render_project_detail(detail: &ProjectDetail) -> String {
    let r = &detail.record;
    let mut out = String::new();
    out.push_str(&format!("Project:   {}\n", r.name));
    out.push_str(&format!("Approved:  {}\n", r.approved.label()));
    if let Some(level) = detail.trl_level {
        out.push_str(&format!("TRL level: {}\n", format_score(level)));
    }
    out.push_str(&format!("Segment:   {}\n", r.segment_label()));
    let advisor = match detail.has_advisor {
        Some(true) => "Sí",
        Some(false) => "No",
        None => "N/A",
    };
    out.push_str(&format!("Advisor:   {}\n", advisor));
    if let Some(english) = detail.english_level.as_deref().filter(|s| !s.is_empty()) {
        out.push_str(&format!("English:   {}\n", english));
    }
    if let Some(location) = detail.location.as_deref().filter(|s| !s.is_empty()) {
        out.push_str(&format!("Location:  {}\n", location));
    }
    if let Some(industry) = detail.industry.as_deref().filter(|s| !s.is_empty()) {
        out.push_str(&format!("Industry:  {}\n", industry));
    }
    out.push('\n');
    out.push_str(&format!("{}\n", score_bar("TRL 1-3 (basic)", r.trl_1_3)));
    out.push_str(&format!("{}\n", score_bar("TRL 4-7 (intermediate)", r.trl_4_7)));
    out.push_str(&format!("{}\n", score_bar("TRL 8-9 (advanced)", r.trl_8_9)));
    out.push_str(&format!("  Total: {}\n", format_score(derive_total_score(r))));
    if !detail.insights.is_empty() {
        out.push('\n');
        for line in &detail.insights {
            out.push_str(&format!("  - {}\n", line));
        }
    }
    out
}

pub fn render_insights(report: Option<&InsightsReport>, status: &LoadStatus) -> String {
    let Some(report) = report else {
        return empty_state(status, "insights");
    };
    let m = &report.metricas;
    let mut out = String::new();
    out.push_str(&format!(
        "Approval: {} of {} projects approved ({:.1}%)\n",
        m.aprobados, m.total_proyectos, m.porcentaje_aprobados
    ));
    if !report.top_proyectos.is_empty() {
        out.push_str("\nTop projects:\n");
        for (i, top) in report.top_proyectos.iter().enumerate() {
            out.push_str(&format!("  {}. {} ({} pts)\n", i + 1, top.name, format_score(top.total_score)));
        }
    }
    if !m.distribucion_trl.is_empty() {
        out.push_str("\nTRL distribution:\n");
        for (segment, count) in &m.distribucion_trl {
            out.push_str(&format!("  {:<12} {}\n", segment, count));
        }
    }
    if !m.promedios.is_empty() {
        out.push_str("\nAverage scores:\n");
        for (band, mean) in &m.promedios {
            out.push_str(&format!("  {:<12} {:.1}\n", band, mean));
        }
    }
    if !report.insights.is_empty() {
        out.push_str("\nInsights:\n");
        for line in &report.insights {
            out.push_str(&format!("  - {}\n", line));
        }
    }
    out
}

pub fn render_charts(charts: Option<&ChartBundle>, status: &LoadStatus) -> String {
    let Some(bundle) = charts.filter(|b| !b.is_empty()) else {
        return empty_state(status, "charts");
    };
    let mut out = String::new();
    for (id, title) in bundle.entries() {
        let detail = match bundle.trace_count(id) {
            Some(n) => format!("{} trace(s)", n),
            None => "unreadable figure".to_string(),
        };
        out.push_str(&format!("  {:<26} {:<24} {}\n", title, id, detail));
    }
    out
}

/// Full screen for the session's active tab.
pub fn render_session(session: &DashboardSession) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n", render_tabs(session.tab())));
    if let Some(status) = render_status(session.status()) {
        out.push_str(&format!("{}\n", status));
    }
    out.push('\n');
    let body = match session.tab() {
        Tab::Metrics => render_metrics(session.metrics(), session.status()),
        Tab::Charts => render_charts(session.charts(), session.status()),
        Tab::Search => render_search_results(session.search_results()),
        Tab::Projects => render_projects(session),
        Tab::Insights => render_insights(session.insights(), session.status()),
    };
    out.push_str(&body);
    out
}
