//! Node types for the Site → Subject → Event → Procedure containment
//! tree, plus the page envelope returned by hierarchy loaders.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{AssetId, EventId, ProcedureId, SiteId, SubjectId};

/// A clinical site (top level of the containment tree).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Site {
    pub id: SiteId,
    pub name: String,
    #[serde(default)]
    pub country_name: String,
    /// Number of subjects enrolled, as reported by the store.
    #[serde(default)]
    pub subject_count: u64,
}

/// A subject enrolled at a site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    pub id: SubjectId,
    pub number: String,
    #[serde(default)]
    pub study_arm: String,
    #[serde(default)]
    pub event_count: u64,
}

/// A study event (visit) for a subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyEvent {
    pub id: EventId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub procedure_count: u64,
}

/// A procedure performed during an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcedureNode {
    pub id: ProcedureId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub asset_count: u64,
}

/// Asset as listed underneath a procedure in the tree view.
///
/// The full flattened shape lives in [`crate::AssetRecord`]; tree
/// rendering only needs a handful of fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetSummary {
    pub id: AssetId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uploaded_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub reviewed: bool,
}

/// One page of loader results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based page number this slice came from.
    pub page: i64,
    pub limit: i64,
    /// Total matching items across all pages.
    pub total: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, page: i64, limit: i64, total: u64) -> Self {
        Self {
            items,
            page,
            limit,
            total,
        }
    }

    /// A page holding everything (used by fixtures and small listings).
    pub fn complete(items: Vec<T>) -> Self {
        let total = items.len() as u64;
        Self {
            items,
            page: 1,
            limit: total.max(1) as i64,
            total,
        }
    }
}
