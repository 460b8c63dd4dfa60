//! # Client — Evaluation Backend REST Client
//!
//! Async HTTP client for the evaluation backend. Every request carries the
//! shared dashboard credential as an HTTP Basic `Authorization` header; the
//! backend is the one that checks it.
//!
//! ## Endpoints
//!
//! | Method | Path                          | Call                    |
//! |--------|-------------------------------|-------------------------|
//! | POST   | `/actualizar-datos`           | [`ApiClient::refresh_data`] |
//! | GET    | `/metricas-principales`       | [`ApiClient::main_metrics`] |
//! | GET    | `/datos-graficos`             | [`ApiClient::charts`] |
//! | GET    | `/proyectos`                  | [`ApiClient::projects`] |
//! | POST   | `/buscar-proyecto`            | [`ApiClient::search`] |
//! | GET    | `/reporte-proyecto/{nombre}`  | [`ApiClient::project_report`] |
//! | GET    | `/insights-generales`         | [`ApiClient::general_insights`] |
//!
//! Non-2xx responses become an [`ApiError`] inside the returned
//! `anyhow::Error`, so callers can `downcast_ref` to tell a bad password from
//! a missing project or a server failure.

use crate::api::{
    ChartBundle, DashboardSnapshot, InsightsReport, MainMetrics, ProjectDetail, ProjectEnvelope,
    RefreshAck, ReportDocument, SearchRequest,
};
use crate::config::{Credentials, Settings};
use crate::record::ProjectRecord;
use anyhow::{Context, Result};
use base64::Engine;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info};

/// Classified backend failure.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("backend rejected the credentials (HTTP 401)")]
    Unauthorized,
    #[error("not found: {0}")]
    NotFound(String),
    #[error("backend returned HTTP {status}: {detail}")]
    Status { status: u16, detail: String },
}

/// True when `err` (or anything it wraps) is a rejected credential.
pub fn is_unauthorized(err: &anyhow::Error) -> bool {
    matches!(err.downcast_ref::<ApiError>(), Some(ApiError::Unauthorized))
}

/// True when `err` (or anything it wraps) is a 404 from the backend.
pub fn is_not_found(err: &anyhow::Error) -> bool {
    matches!(err.downcast_ref::<ApiError>(), Some(ApiError::NotFound(_)))
}

/// `Authorization` header value for HTTP Basic auth.
pub fn basic_auth_value(username: &str, password: &str) -> String {
    let token = base64::engine::general_purpose::STANDARD.encode(format!("{}:{}", username, password));
    format!("Basic {}", token)
}

/// FastAPI reports errors as `{"detail": "..."}`; fall back to the raw body.
fn error_detail(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("detail").and_then(|d| d.as_str()).map(str::to_string))
        .unwrap_or_else(|| body.trim().chars().take(200).collect())
}

pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    auth_header: String,
}

impl ApiClient {
    pub fn new(settings: &Settings, credentials: &Credentials) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(settings.timeout())
            .build()
            .context("failed to build HTTP client")?;
        Ok(ApiClient {
            http,
            base_url: settings.base_url().to_string(),
            auth_header: basic_auth_value(&credentials.username, credentials.password()),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let detail = error_detail(&body);
        let err = match status {
            StatusCode::UNAUTHORIZED => ApiError::Unauthorized,
            StatusCode::NOT_FOUND => ApiError::NotFound(detail),
            _ => ApiError::Status {
                status: status.as_u16(),
                detail,
            },
        };
        Err(err.into())
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        debug!(path, "GET");
        let response = self
            .http
            .get(self.url(path))
            .header(reqwest::header::AUTHORIZATION, &self.auth_header)
            .send()
            .await
            .with_context(|| format!("GET {} failed", path))?;
        let response = Self::check(response).await.with_context(|| format!("GET {}", path))?;
        response
            .json::<T>()
            .await
            .with_context(|| format!("GET {}: unexpected response body", path))
    }

    async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        debug!(path, "POST");
        let response = self
            .http
            .post(self.url(path))
            .header(reqwest::header::AUTHORIZATION, &self.auth_header)
            .json(body)
            .send()
            .await
            .with_context(|| format!("POST {} failed", path))?;
        let response = Self::check(response).await.with_context(|| format!("POST {}", path))?;
        response
            .json::<T>()
            .await
            .with_context(|| format!("POST {}: unexpected response body", path))
    }

    /// Ask the backend to (re)load its form data.
    pub async fn refresh_data(&self) -> Result<RefreshAck> {
        self.post_json("/actualizar-datos", &serde_json::json!({})).await
    }

    pub async fn main_metrics(&self) -> Result<MainMetrics> {
        self.get_json("/metricas-principales").await
    }

    pub async fn charts(&self) -> Result<ChartBundle> {
        self.get_json("/datos-graficos").await
    }

    /// Full project table.
    pub async fn projects(&self) -> Result<Vec<ProjectRecord>> {
        let envelope: ProjectEnvelope<ProjectRecord> = self.get_json("/proyectos").await?;
        Ok(envelope.proyectos)
    }

    /// Case-insensitive substring search by project name.
    ///
    /// A blank term returns no results without contacting the backend, and a
    /// backend 404 ("no project matched") is an empty result, not an error.
    pub async fn search(&self, name: &str) -> Result<Vec<ProjectDetail>> {
        let term = name.trim();
        if term.is_empty() {
            return Ok(Vec::new());
        }
        let request = SearchRequest { nombre: term };
        match self
            .post_json::<_, ProjectEnvelope<ProjectDetail>>("/buscar-proyecto", &request)
            .await
        {
            Ok(envelope) => Ok(envelope.proyectos),
            Err(e) if is_not_found(&e) => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    }

    /// Per-project report document as produced by the backend.
    pub async fn project_report(&self, name: &str) -> Result<ReportDocument> {
        let path = format!("/reporte-proyecto/{}", urlencoding::encode(name));
        debug!(path = %path, "GET report");
        let response = self
            .http
            .get(self.url(&path))
            .header(reqwest::header::AUTHORIZATION, &self.auth_header)
            .send()
            .await
            .with_context(|| format!("GET {} failed", path))?;
        let response = Self::check(response)
            .await
            .with_context(|| format!("report for '{}'", name))?;
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = response.bytes().await.context("failed to read report body")?;
        Ok(ReportDocument {
            content_type,
            body: bytes.to_vec(),
        })
    }

    pub async fn general_insights(&self) -> Result<InsightsReport> {
        self.get_json("/insights-generales").await
    }

    /// Load everything the dashboard shows in one go.
    ///
    /// The four requests run concurrently; if any fails the whole snapshot
    /// fails and nothing is applied.
    pub async fn fetch_snapshot(&self) -> Result<DashboardSnapshot> {
        let (projects, metrics, charts, insights) = tokio::try_join!(
            self.projects(),
            self.main_metrics(),
            self.charts(),
            self.general_insights(),
        )?;
        info!(projects = projects.len(), charts = charts.graficos.len(), "dashboard data loaded");
        Ok(DashboardSnapshot {
            projects,
            metrics,
            charts,
            insights,
        })
    }
}
