//! # Record — Evaluated Project Records
//!
//! Typed form of one row of the backend's project table. The backend keys
//! every field by its Spanish display label (`"Nombre del Proyecto"`,
//! `"Puntaje TRL 1-3"`, ...); those labels live only in the serde attributes
//! below, so the rest of the crate works with named fields.
//!
//! Required fields are validated at deserialization: a row missing its name,
//! approval flag, or any of the three TRL band scores is rejected before it
//! reaches the ranking engine. `total_score` and `segment` are optional.

use serde::{Deserialize, Serialize};

/// Wire label for the project name.
pub const LABEL_NAME: &str = "Nombre del Proyecto";
/// Wire label for the approval flag.
pub const LABEL_APPROVED: &str = "Aprobado";
pub const LABEL_TRL_1_3: &str = "Puntaje TRL 1-3";
pub const LABEL_TRL_4_7: &str = "Puntaje TRL 4-7";
pub const LABEL_TRL_8_9: &str = "Puntaje TRL 8-9";
pub const LABEL_TOTAL: &str = "Puntaje Total";
pub const LABEL_SEGMENT: &str = "Segmento TRL";

/// Placeholder shown when a record carries no TRL segment.
pub const SEGMENT_FALLBACK: &str = "N/A";

/// Approval outcome. The backend writes `"Sí"` / `"No"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Approval {
    #[serde(rename = "Sí", alias = "Si", alias = "SI", alias = "sí", alias = "si")]
    Yes,
    #[serde(rename = "No", alias = "NO", alias = "no")]
    No,
}

impl Approval {
    pub fn is_approved(self) -> bool {
        self == Approval::Yes
    }

    /// Label as the backend spells it.
    pub fn label(self) -> &'static str {
        match self {
            Approval::Yes => "Sí",
            Approval::No => "No",
        }
    }
}

impl std::fmt::Display for Approval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One evaluated project as served by `GET /proyectos`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectRecord {
    #[serde(rename = "Nombre del Proyecto")]
    pub name: String,
    #[serde(rename = "Aprobado")]
    pub approved: Approval,
    #[serde(rename = "Puntaje TRL 1-3")]
    pub trl_1_3: f64,
    #[serde(rename = "Puntaje TRL 4-7")]
    pub trl_4_7: f64,
    #[serde(rename = "Puntaje TRL 8-9")]
    pub trl_8_9: f64,
    /// Explicit total. `None` when the field is absent or `null`.
    #[serde(rename = "Puntaje Total", default, skip_serializing_if = "Option::is_none")]
    pub total_score: Option<f64>,
    #[serde(rename = "Segmento TRL", default, skip_serializing_if = "Option::is_none")]
    pub segment: Option<String>,
}

impl ProjectRecord {
    /// Build a record with no explicit total and no segment.
    pub fn new(name: impl Into<String>, approved: Approval, trl_1_3: f64, trl_4_7: f64, trl_8_9: f64) -> Self {
        ProjectRecord {
            name: name.into(),
            approved,
            trl_1_3,
            trl_4_7,
            trl_8_9,
            total_score: None,
            segment: None,
        }
    }

    pub fn with_total(mut self, total: f64) -> Self {
        self.total_score = Some(total);
        self
    }

    pub fn with_segment(mut self, segment: impl Into<String>) -> Self {
        self.segment = Some(segment.into());
        self
    }

    /// Sum of the three band scores.
    pub fn band_sum(&self) -> f64 {
        self.trl_1_3 + self.trl_4_7 + self.trl_8_9
    }

    /// Segment label for display, `"N/A"` when absent or blank.
    pub fn segment_label(&self) -> &str {
        match self.segment.as_deref() {
            Some(s) if !s.trim().is_empty() => s,
            _ => SEGMENT_FALLBACK,
        }
    }
}

/// Total score shown in the project table.
///
/// An explicit `total_score` wins, including an explicit `0`; only an absent
/// (or `NaN`) total is recomputed from the three band scores.
pub fn derive_total_score(record: &ProjectRecord) -> f64 {
    match record.total_score {
        Some(total) if !total.is_nan() => total,
        _ => record.band_sum(),
    }
}

/// Parse the `{"proyectos": [...]}` envelope returned by `GET /proyectos`.
pub fn parse_project_list(json: &str) -> anyhow::Result<Vec<ProjectRecord>> {
    let envelope: crate::api::ProjectEnvelope<ProjectRecord> = serde_json::from_str(json)?;
    Ok(envelope.proyectos)
}
