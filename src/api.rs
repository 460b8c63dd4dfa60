//! # API — Backend Wire Types
//!
//! Response bodies of the evaluation backend, other than the project rows
//! themselves (see [`crate::record`]). Field names follow the backend's
//! JSON; aggregation happens server-side, so these are plain data.

use crate::record::ProjectRecord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// `POST /actualizar-datos` acknowledgement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefreshAck {
    pub mensaje: String,
}

/// `GET /metricas-principales`: headline counters for the metric cards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MainMetrics {
    /// Number of submitted forms (one per project).
    pub formularios: u64,
    pub trl_max: i64,
    pub aprobados: u64,
    pub docente_si: u64,
    pub docente_no: u64,
}

/// Known chart ids and their titles, in display order.
pub const CHART_TITLES: [(&str, &str); 7] = [
    ("distribucion_trl", "TRL distribution"),
    ("proporcion_aprobados", "Approved proportion"),
    ("aprobacion_por_trl", "Approval by TRL"),
    ("puntaje_trl13", "TRL 1-3 score"),
    ("distribucion_industria", "Distribution by industry"),
    ("nivel_ingles", "English level"),
    ("ubicacion_geografica", "Geographic location"),
];

/// `GET /datos-graficos`: Plotly figures, each serialized to a JSON string.
///
/// Figures are kept as strings and parsed on demand; rendering them is left
/// to whatever plotting tool consumes the bundle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartBundle {
    pub graficos: BTreeMap<String, String>,
}

impl ChartBundle {
    /// Parse one figure. `None` when missing or not valid JSON.
    pub fn figure(&self, id: &str) -> Option<serde_json::Value> {
        let raw = self.graficos.get(id)?;
        serde_json::from_str(raw).ok()
    }

    /// Number of traces in a figure's `data` array.
    pub fn trace_count(&self, id: &str) -> Option<usize> {
        self.figure(id)?
            .get("data")
            .and_then(|d| d.as_array())
            .map(|traces| traces.len())
    }

    /// Chart ids with their display titles: known charts first in display
    /// order, then any extra ids the backend sent, titled by their id.
    pub fn entries(&self) -> Vec<(&str, &str)> {
        let mut out: Vec<(&str, &str)> = CHART_TITLES
            .iter()
            .filter(|(id, _)| self.graficos.contains_key(*id))
            .map(|(id, title)| (*id, *title))
            .collect();
        for id in self.graficos.keys() {
            if !CHART_TITLES.iter().any(|(known, _)| *known == id.as_str()) {
                out.push((id.as_str(), id.as_str()));
            }
        }
        out
    }

    pub fn is_empty(&self) -> bool {
        self.graficos.is_empty()
    }
}

/// Aggregates block of `GET /insights-generales`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightMetrics {
    pub total_proyectos: u64,
    pub aprobados: u64,
    pub porcentaje_aprobados: f64,
    /// Segment label ("TRL 1-3", ...) to project count.
    #[serde(default)]
    pub distribucion_trl: BTreeMap<String, u64>,
    /// Band label ("TRL 1-3", ..., "Total") to mean score.
    #[serde(default)]
    pub promedios: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopProject {
    #[serde(rename = "Nombre del Proyecto")]
    pub name: String,
    #[serde(rename = "Puntaje Total")]
    pub total_score: f64,
}

/// `GET /insights-generales`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightsReport {
    pub metricas: InsightMetrics,
    #[serde(default)]
    pub top_proyectos: Vec<TopProject>,
    #[serde(default)]
    pub insights: Vec<String>,
}

/// `POST /buscar-proyecto` request body.
#[derive(Debug, Clone, Serialize)]
pub struct SearchRequest<'a> {
    pub nombre: &'a str,
}

/// One search hit: the table row plus the per-project details the backend
/// attaches to full search results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectDetail {
    #[serde(flatten)]
    pub record: ProjectRecord,
    #[serde(rename = "Nivel TRL", default)]
    pub trl_level: Option<f64>,
    #[serde(rename = "Docente Acompañante", default, deserialize_with = "lenient_bool")]
    pub has_advisor: Option<bool>,
    #[serde(rename = "Nivel de Inglés", default)]
    pub english_level: Option<String>,
    #[serde(rename = "Ubicación", default)]
    pub location: Option<String>,
    #[serde(rename = "Industria", default)]
    pub industry: Option<String>,
    #[serde(rename = "Insights", default)]
    pub insights: Vec<String>,
}

/// `GET /reporte-proyecto/{nombre}` body, whatever format the backend chose.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportDocument {
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl ReportDocument {
    /// File extension matching the content type (`html` when unknown).
    pub fn extension(&self) -> &'static str {
        let mime = self
            .content_type
            .as_deref()
            .and_then(|ct| ct.split(';').next())
            .map(|m| m.trim().to_ascii_lowercase())
            .unwrap_or_default();
        match mime.as_str() {
            "application/pdf" => "pdf",
            "application/json" => "json",
            "text/plain" => "txt",
            _ => "html",
        }
    }
}

/// Everything one dashboard refresh loads.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardSnapshot {
    pub projects: Vec<ProjectRecord>,
    pub metrics: MainMetrics,
    pub charts: ChartBundle,
    pub insights: InsightsReport,
}

/// `{"proyectos": [...]}` envelope shared by the list and search endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectEnvelope<T> {
    pub proyectos: Vec<T>,
}

/// The backend sends the advisor flag as a JSON bool, but blank search
/// fields come back as `""`. Anything that is not a bool or a yes/no string
/// is treated as unknown.
fn lenient_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Bool(b)) => Some(b),
        Some(serde_json::Value::String(s)) => match s.trim().to_lowercase().as_str() {
            "si" | "sí" | "true" => Some(true),
            "no" | "false" => Some(false),
            _ => None,
        },
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Approval;

    #[test]
    fn parses_main_metrics() {
        let json = r#"{"formularios": 12, "trl_max": 8, "aprobados": 5, "docente_si": 7, "docente_no": 5}"#;
        let m: MainMetrics = serde_json::from_str(json).unwrap();
        assert_eq!(m.formularios, 12);
        assert_eq!(m.trl_max, 8);
        assert_eq!(m.docente_si + m.docente_no, 12);
    }

    #[test]
    fn chart_bundle_parses_figures_lazily() {
        let json = r#"{"graficos": {
            "distribucion_trl": "{\"data\": [{\"type\": \"bar\"}, {\"type\": \"bar\"}], \"layout\": {}}",
            "nivel_ingles": "not json",
            "extra_chart": "{}"
        }}"#;
        let bundle: ChartBundle = serde_json::from_str(json).unwrap();
        assert_eq!(bundle.trace_count("distribucion_trl"), Some(2));
        assert!(bundle.figure("nivel_ingles").is_none());
        assert!(bundle.figure("missing").is_none());
        let ids: Vec<&str> = bundle.entries().iter().map(|(id, _)| *id).collect();
        assert_eq!(ids, ["distribucion_trl", "nivel_ingles", "extra_chart"]);
    }

    #[test]
    fn parses_insights_report() {
        let json = r#"{
            "metricas": {
                "total_proyectos": 4,
                "aprobados": 1,
                "porcentaje_aprobados": 25.0,
                "distribucion_trl": {"TRL 1-3": 3, "TRL 8-9": 1},
                "promedios": {"TRL 1-3": 30.5, "TRL 4-7": 12.0, "TRL 8-9": 4.0, "Total": 46.5}
            },
            "top_proyectos": [{"Nombre del Proyecto": "Uno", "Puntaje Total": 88.0}],
            "insights": ["a", "b"]
        }"#;
        let report: InsightsReport = serde_json::from_str(json).unwrap();
        assert_eq!(report.metricas.distribucion_trl["TRL 1-3"], 3);
        assert_eq!(report.metricas.promedios["Total"], 46.5);
        assert_eq!(report.top_proyectos[0].name, "Uno");
        assert_eq!(report.insights.len(), 2);
    }

    #[test]
    fn project_detail_flattens_record_fields() {
        let json = r#"{
            "Nombre del Proyecto": "Sensor",
            "Aprobado": "Sí",
            "Puntaje TRL 1-3": 40,
            "Puntaje TRL 4-7": 10,
            "Puntaje TRL 8-9": 0,
            "Puntaje Total": 50,
            "Segmento TRL": "TRL 1-3",
            "Nivel TRL": 2,
            "Docente Acompañante": true,
            "Nivel de Inglés": "Intermedio",
            "Ubicación": "Huancayo",
            "Industria": "Salud",
            "Insights": ["x"]
        }"#;
        let detail: ProjectDetail = serde_json::from_str(json).unwrap();
        assert_eq!(detail.record.name, "Sensor");
        assert_eq!(detail.record.approved, Approval::Yes);
        assert_eq!(detail.trl_level, Some(2.0));
        assert_eq!(detail.has_advisor, Some(true));
        assert_eq!(detail.location.as_deref(), Some("Huancayo"));
        assert_eq!(detail.insights, vec!["x".to_string()]);
    }

    #[test]
    fn report_extension_follows_content_type() {
        let doc = |ct: Option<&str>| ReportDocument {
            content_type: ct.map(str::to_string),
            body: Vec::new(),
        };
        assert_eq!(doc(Some("application/pdf")).extension(), "pdf");
        assert_eq!(doc(Some("text/html; charset=utf-8")).extension(), "html");
        assert_eq!(doc(None).extension(), "html");
    }

    #[test]
    fn project_detail_tolerates_blank_advisor() {
        let json = r#"{
            "Nombre del Proyecto": "Blank",
            "Aprobado": "No",
            "Puntaje TRL 1-3": 0,
            "Puntaje TRL 4-7": 0,
            "Puntaje TRL 8-9": 0,
            "Docente Acompañante": ""
        }"#;
        let detail: ProjectDetail = serde_json::from_str(json).unwrap();
        assert_eq!(detail.has_advisor, None);
        assert!(detail.insights.is_empty());
    }
}
