//! # Session — Dashboard View State
//!
//! Caller-side state of one dashboard session: the last loaded data, the
//! table's sort and page, the active tab, and the load status line.
//!
//! Data is replaced wholesale on every refresh; the sort and page survive
//! refreshes until the user changes them. The table view is recomputed from
//! the full collection on every call to [`DashboardSession::table`], so there
//! is no derived state to invalidate.
//!
//! Page navigation is clamped here, not in [`crate::pagination`]: the engine
//! happily returns an empty page past the end, while the session never
//! navigates outside `1..=total_pages`.

use crate::api::{ChartBundle, DashboardSnapshot, InsightsReport, MainMetrics, ProjectDetail};
use crate::client::is_unauthorized;
use crate::pagination::{paginate, total_pages, Page, PageSpec};
use crate::ranking::{rank, request_sort, SortKey, SortSpec};
use crate::record::ProjectRecord;
use anyhow::Result;
use tracing::{debug, warn};

/// Dashboard tabs, in navigation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Tab {
    #[default]
    Metrics,
    Charts,
    Search,
    Projects,
    Insights,
}

impl Tab {
    pub const ALL: [Tab; 5] = [Tab::Metrics, Tab::Charts, Tab::Search, Tab::Projects, Tab::Insights];

    pub fn title(self) -> &'static str {
        match self {
            Tab::Metrics => "Metrics",
            Tab::Charts => "Charts",
            Tab::Search => "Search",
            Tab::Projects => "All projects",
            Tab::Insights => "Insights",
        }
    }
}

impl std::str::FromStr for Tab {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "metrics" => Ok(Tab::Metrics),
            "charts" => Ok(Tab::Charts),
            "search" => Ok(Tab::Search),
            "projects" | "projects-table" | "table" => Ok(Tab::Projects),
            "insights" => Ok(Tab::Insights),
            other => Err(anyhow::anyhow!("unknown tab '{}'", other)),
        }
    }
}

/// Status line shown under the data controls.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadStatus {
    #[default]
    Idle,
    Loading,
    Success(String),
    Error(String),
}

impl LoadStatus {
    pub fn is_idle(&self) -> bool {
        matches!(self, LoadStatus::Idle)
    }
}

/// Ordered collection plus the page currently shown.
#[derive(Debug, Clone, PartialEq)]
pub struct TableView {
    pub sort: SortSpec,
    pub ordered: Vec<ProjectRecord>,
    pub page: PageSpec,
}

impl TableView {
    pub fn page(&self) -> Page<'_, ProjectRecord> {
        paginate(&self.ordered, self.page)
    }
}

#[derive(Debug, Clone, Default)]
pub struct DashboardSession {
    projects: Vec<ProjectRecord>,
    metrics: Option<MainMetrics>,
    charts: Option<ChartBundle>,
    insights: Option<InsightsReport>,
    search_results: Vec<ProjectDetail>,
    sort: SortSpec,
    page: PageSpec,
    tab: Tab,
    status: LoadStatus,
}

impl DashboardSession {
    pub fn new(page_size: usize) -> Result<Self> {
        Ok(DashboardSession {
            page: PageSpec::first(page_size)?,
            ..Default::default()
        })
    }

    pub fn begin_loading(&mut self) {
        self.status = LoadStatus::Loading;
    }

    /// Replace all loaded data. Sort and page are kept.
    pub fn apply_snapshot(&mut self, snapshot: DashboardSnapshot) {
        debug!(projects = snapshot.projects.len(), "applying snapshot");
        self.projects = snapshot.projects;
        self.metrics = Some(snapshot.metrics);
        self.charts = Some(snapshot.charts);
        self.insights = Some(snapshot.insights);
        self.status = LoadStatus::Success("Data refreshed".to_string());
    }

    /// Replace only the project collection (table-only refresh).
    pub fn set_projects(&mut self, projects: Vec<ProjectRecord>) {
        self.projects = projects;
    }

    /// Record a failed refresh. Previously loaded data stays visible.
    pub fn fail(&mut self, err: &anyhow::Error) {
        warn!(error = %format!("{:#}", err), "dashboard refresh failed");
        let message = if is_unauthorized(err) {
            "Failed to refresh data. Check the password.".to_string()
        } else {
            format!("Failed to refresh data: {:#}", err)
        };
        self.status = LoadStatus::Error(message);
    }

    pub fn status(&self) -> &LoadStatus {
        &self.status
    }

    pub fn projects(&self) -> &[ProjectRecord] {
        &self.projects
    }

    pub fn metrics(&self) -> Option<&MainMetrics> {
        self.metrics.as_ref()
    }

    pub fn charts(&self) -> Option<&ChartBundle> {
        self.charts.as_ref()
    }

    pub fn insights(&self) -> Option<&InsightsReport> {
        self.insights.as_ref()
    }

    pub fn search_results(&self) -> &[ProjectDetail] {
        &self.search_results
    }

    pub fn set_search_results(&mut self, results: Vec<ProjectDetail>) {
        self.search_results = results;
    }

    pub fn tab(&self) -> Tab {
        self.tab
    }

    pub fn set_tab(&mut self, tab: Tab) {
        self.tab = tab;
    }

    pub fn sort(&self) -> SortSpec {
        self.sort
    }

    pub fn set_sort(&mut self, sort: SortSpec) {
        self.sort = sort;
    }

    pub fn page_spec(&self) -> PageSpec {
        self.page
    }

    /// Column-header click.
    pub fn click_header(&mut self, key: SortKey) -> SortSpec {
        self.sort = request_sort(self.sort, key);
        self.sort
    }

    pub fn total_pages(&self) -> usize {
        total_pages(self.projects.len(), self.page.page_size())
    }

    /// Jump to `page`, clamped to the pages that exist (page 1 when empty).
    pub fn go_to_page(&mut self, page: usize) -> usize {
        let last = self.total_pages().max(1);
        self.page = self.page.with_page(page.clamp(1, last));
        self.page.page_number()
    }

    pub fn next_page(&mut self) -> usize {
        self.go_to_page(self.page.page_number().saturating_add(1))
    }

    pub fn previous_page(&mut self) -> usize {
        self.go_to_page(self.page.page_number().saturating_sub(1))
    }

    /// Rank and paginate the current collection.
    pub fn table(&self) -> TableView {
        TableView {
            sort: self.sort,
            ordered: rank(&self.projects, self.sort),
            page: self.page,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::InsightMetrics;
    use crate::client::ApiError;
    use crate::record::Approval;
    use crate::ranking::SortDirection;

    fn snapshot(n: usize) -> DashboardSnapshot {
        let projects = (0..n)
            .map(|i| {
                let approved = if i % 3 == 0 { Approval::Yes } else { Approval::No };
                ProjectRecord::new(format!("P{:02}", i), approved, i as f64, 0.0, 0.0)
            })
            .collect();
        DashboardSnapshot {
            projects,
            metrics: MainMetrics {
                formularios: n as u64,
                trl_max: 9,
                aprobados: 0,
                docente_si: 0,
                docente_no: n as u64,
            },
            charts: ChartBundle::default(),
            insights: InsightsReport {
                metricas: InsightMetrics {
                    total_proyectos: n as u64,
                    aprobados: 0,
                    porcentaje_aprobados: 0.0,
                    distribucion_trl: Default::default(),
                    promedios: Default::default(),
                },
                top_proyectos: Vec::new(),
                insights: Vec::new(),
            },
        }
    }

    #[test]
    fn starts_idle_on_metrics_tab() {
        let s = DashboardSession::new(10).unwrap();
        assert!(s.status().is_idle());
        assert_eq!(s.tab(), Tab::Metrics);
        assert_eq!(s.sort(), SortSpec::default());
        assert!(s.table().ordered.is_empty());
        assert_eq!(s.table().page().total_pages, 0);
    }

    #[test]
    fn rejects_zero_page_size() {
        assert!(DashboardSession::new(0).is_err());
    }

    #[test]
    fn snapshot_replaces_data_and_keeps_sort_and_page() {
        let mut s = DashboardSession::new(5).unwrap();
        s.apply_snapshot(snapshot(30));
        s.click_header(SortKey::Trl13);
        s.go_to_page(3);

        s.apply_snapshot(snapshot(12));
        assert_eq!(s.projects().len(), 12);
        assert_eq!(s.sort(), SortSpec::descending(SortKey::Trl13));
        assert_eq!(s.page_spec().page_number(), 3);
        assert_eq!(s.status(), &LoadStatus::Success("Data refreshed".into()));
    }

    #[test]
    fn navigation_is_clamped() {
        let mut s = DashboardSession::new(10).unwrap();
        s.apply_snapshot(snapshot(25));
        assert_eq!(s.total_pages(), 3);
        assert_eq!(s.previous_page(), 1);
        assert_eq!(s.go_to_page(99), 3);
        assert_eq!(s.next_page(), 3);
        assert_eq!(s.previous_page(), 2);
        assert_eq!(s.go_to_page(0), 1);
    }

    #[test]
    fn navigation_on_empty_collection_stays_on_page_one() {
        let mut s = DashboardSession::new(10).unwrap();
        assert_eq!(s.next_page(), 1);
        assert_eq!(s.go_to_page(4), 1);
    }

    #[test]
    fn table_is_approval_first_and_paged() {
        let mut s = DashboardSession::new(4).unwrap();
        s.apply_snapshot(snapshot(12));
        s.set_sort(SortSpec::new(SortKey::Trl13, SortDirection::Ascending));
        let view = s.table();
        let page = view.page();
        // approved rows are i = 0, 3, 6, 9
        let names: Vec<&str> = page.items.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["P00", "P03", "P06", "P09"]);
        assert_eq!(page.total_pages, 3);
    }

    #[test]
    fn header_clicks_toggle_then_reset() {
        let mut s = DashboardSession::new(10).unwrap();
        assert_eq!(s.click_header(SortKey::TotalScore), SortSpec::ascending(SortKey::TotalScore));
        assert_eq!(s.click_header(SortKey::TotalScore), SortSpec::descending(SortKey::TotalScore));
        assert_eq!(s.click_header(SortKey::Trl89), SortSpec::descending(SortKey::Trl89));
    }

    #[test]
    fn unauthorized_failure_hints_at_password_and_keeps_data() {
        let mut s = DashboardSession::new(10).unwrap();
        s.apply_snapshot(snapshot(3));
        s.begin_loading();
        assert_eq!(s.status(), &LoadStatus::Loading);
        let err = anyhow::Error::from(ApiError::Unauthorized).context("GET /proyectos");
        s.fail(&err);
        match s.status() {
            LoadStatus::Error(msg) => assert!(msg.contains("Check the password")),
            other => panic!("unexpected status {:?}", other),
        }
        assert_eq!(s.projects().len(), 3);
    }

    #[test]
    fn tab_names_parse() {
        assert_eq!("projects-table".parse::<Tab>().unwrap(), Tab::Projects);
        assert_eq!("Insights".parse::<Tab>().unwrap(), Tab::Insights);
        assert!("settings".parse::<Tab>().is_err());
    }
}
