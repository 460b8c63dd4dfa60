//! # Ranking — Approval-First Project Ordering
//!
//! Orders a project collection for the table view. Approved projects always
//! come first; the user-selected [`SortSpec`] only orders records *within*
//! each approval group. The sort is stable, so projects sharing a key value
//! (very common for totals) keep the order the backend sent them in.
//!
//! ## Sort values
//!
//! | Key          | Value compared                                   |
//! |--------------|--------------------------------------------------|
//! | `Approved`   | approval flag (constant within a group: a tie)   |
//! | `Trl13` ...  | the band score                                   |
//! | `TotalScore` | [`derive_total_score`], i.e. the rendered total  |
//!
//! `NaN` compares as negative infinity: last when descending, first when
//! ascending. Together with `f64::total_cmp` this keeps the comparator total.
//!
//! ## Header clicks
//!
//! [`request_sort`] is the column-header state transition: a second click on
//! the active key flips descending to ascending, anything else resets to
//! descending on the requested key. There is no unsorted state.

use crate::record::{derive_total_score, Approval, ProjectRecord};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Sortable table column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    Approved,
    Trl13,
    Trl47,
    Trl89,
    TotalScore,
}

impl SortKey {
    pub const ALL: [SortKey; 5] = [
        SortKey::Approved,
        SortKey::Trl13,
        SortKey::Trl47,
        SortKey::Trl89,
        SortKey::TotalScore,
    ];

    /// Column header text.
    pub fn header(self) -> &'static str {
        match self {
            SortKey::Approved => "Approved",
            SortKey::Trl13 => "TRL 1-3",
            SortKey::Trl47 => "TRL 4-7",
            SortKey::Trl89 => "TRL 8-9",
            SortKey::TotalScore => "Total",
        }
    }

    /// Short name accepted on the command line.
    pub fn slug(self) -> &'static str {
        match self {
            SortKey::Approved => "approved",
            SortKey::Trl13 => "trl-1-3",
            SortKey::Trl47 => "trl-4-7",
            SortKey::Trl89 => "trl-8-9",
            SortKey::TotalScore => "total",
        }
    }
}

impl std::fmt::Display for SortKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.slug())
    }
}

impl std::str::FromStr for SortKey {
    type Err = anyhow::Error;

    /// Accepts the CLI slugs, a few compact spellings, and the backend's
    /// display labels.
    fn from_str(s: &str) -> anyhow::Result<Self> {
        let normalized = s.trim().to_lowercase().replace(['_', ' '], "-");
        match normalized.as_str() {
            "approved" | "aprobado" => Ok(SortKey::Approved),
            "trl-1-3" | "trl13" | "puntaje-trl-1-3" => Ok(SortKey::Trl13),
            "trl-4-7" | "trl47" | "puntaje-trl-4-7" => Ok(SortKey::Trl47),
            "trl-8-9" | "trl89" | "puntaje-trl-8-9" => Ok(SortKey::Trl89),
            "total" | "total-score" | "puntaje-total" => Ok(SortKey::TotalScore),
            _ => Err(anyhow::anyhow!(
                "unknown sort key '{}' (expected one of: approved, trl-1-3, trl-4-7, trl-8-9, total)",
                s
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Ascending,
    #[default]
    Descending,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    /// Arrow marker for the active column header.
    pub fn marker(self) -> &'static str {
        match self {
            SortDirection::Ascending => "▲",
            SortDirection::Descending => "▼",
        }
    }
}

/// Active sort column and direction. Defaults to total score, descending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortSpec {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(key: SortKey, direction: SortDirection) -> Self {
        SortSpec { key, direction }
    }

    pub fn descending(key: SortKey) -> Self {
        SortSpec::new(key, SortDirection::Descending)
    }

    pub fn ascending(key: SortKey) -> Self {
        SortSpec::new(key, SortDirection::Ascending)
    }
}

impl Default for SortSpec {
    fn default() -> Self {
        SortSpec::descending(SortKey::TotalScore)
    }
}

/// Column-header click transition.
pub fn request_sort(current: SortSpec, requested: SortKey) -> SortSpec {
    if current.key == requested && current.direction == SortDirection::Descending {
        SortSpec::ascending(requested)
    } else {
        SortSpec::descending(requested)
    }
}

/// Approved projects sort before rejected ones, independent of the sort spec.
fn approval_rank(approval: Approval) -> u8 {
    match approval {
        Approval::Yes => 0,
        Approval::No => 1,
    }
}

/// `NaN` becomes negative infinity so it orders as the minimum. Adding
/// `0.0` folds `-0.0` into `0.0`, which `total_cmp` would otherwise split.
fn sort_float(value: f64) -> f64 {
    if value.is_nan() {
        f64::NEG_INFINITY
    } else {
        value + 0.0
    }
}

fn compare_float(a: f64, b: f64) -> Ordering {
    sort_float(a).total_cmp(&sort_float(b))
}

/// Natural (ascending) ordering of the key values of two records.
fn compare_key(a: &ProjectRecord, b: &ProjectRecord, key: SortKey) -> Ordering {
    match key {
        SortKey::Approved => a.approved.cmp(&b.approved),
        SortKey::Trl13 => compare_float(a.trl_1_3, b.trl_1_3),
        SortKey::Trl47 => compare_float(a.trl_4_7, b.trl_4_7),
        SortKey::Trl89 => compare_float(a.trl_8_9, b.trl_8_9),
        SortKey::TotalScore => compare_float(derive_total_score(a), derive_total_score(b)),
    }
}

/// Pairwise comparator used by [`rank`].
pub fn compare(a: &ProjectRecord, b: &ProjectRecord, spec: SortSpec) -> Ordering {
    approval_rank(a.approved)
        .cmp(&approval_rank(b.approved))
        .then_with(|| {
            let natural = compare_key(a, b, spec.key);
            match spec.direction {
                SortDirection::Ascending => natural,
                SortDirection::Descending => natural.reverse(),
            }
        })
}

/// Return a new, approval-first ordering of `records`. The input is untouched.
pub fn rank(records: &[ProjectRecord], spec: SortSpec) -> Vec<ProjectRecord> {
    let mut ordered = records.to_vec();
    // `sort_by` is stable: ties keep their input order.
    ordered.sort_by(|a, b| compare(a, b, spec));
    ordered
}
