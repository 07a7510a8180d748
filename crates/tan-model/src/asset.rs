//! Asset rows and records.
//!
//! [`AssetRow`] is the raw storage shape: nested optional associations,
//! exactly as a relational backend would hydrate them. [`AssetRecord`]
//! is the flattened display shape handed to downstream consumers, with
//! every optional association defaulting to an empty string or `false`
//! so renderers never deal with nulls.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{AssetId, ProcedureId, SiteId, SubjectId};

/// Trial association on a stored asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrialRef {
    pub id: String,
    pub name: String,
}

/// Site association, including the country it sits in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteRef {
    pub id: SiteId,
    pub name: String,
    #[serde(default)]
    pub country_name: String,
    /// Two-letter storage code the country filter compares against.
    #[serde(default)]
    pub country_code: String,
}

/// Subject association.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectRef {
    pub id: SubjectId,
    pub number: String,
    #[serde(default)]
    pub study_arm: String,
}

/// Procedure association, carrying the event it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcedureRef {
    pub id: ProcedureId,
    pub name: String,
    #[serde(default)]
    pub event_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
}

/// Review association. Present only once an asset has a review record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewInfo {
    #[serde(default)]
    pub reviewer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub evaluator: String,
}

/// A comment attached to an asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentRef {
    #[serde(default)]
    pub author: String,
    pub body: String,
}

/// Raw storage row for an asset, associations nested and optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetRow {
    pub id: AssetId,
    pub filename: String,
    /// Soft-delete marker; deleted rows never leave the store.
    #[serde(default)]
    pub deleted: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub uploaded_by: String,
    /// Kind of the direct container ("Site" or a library kind), if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container_name: Option<String>,
    /// Tri-state review flag: `None` means never reviewed.
    #[serde(default)]
    pub reviewed: Option<bool>,
    /// Tri-state processing flag: `None` means no processing record.
    #[serde(default)]
    pub processed: Option<bool>,
    #[serde(default)]
    pub duration_seconds: Option<f64>,
    #[serde(default)]
    pub file_size_bytes: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trial: Option<TrialRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site: Option<SiteRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<SubjectRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub procedure: Option<ProcedureRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review: Option<ReviewInfo>,
    #[serde(default)]
    pub comments: Vec<CommentRef>,
}

/// Container kind value that marks a site-owned asset.
pub const SITE_CONTAINER_TYPE: &str = "Site";

impl AssetRow {
    /// True when the asset is owned by a Site container.
    pub fn is_site_owned(&self) -> bool {
        self.container_id.is_some()
            && self.container_type.as_deref() == Some(SITE_CONTAINER_TYPE)
    }
}

/// Flattened asset shape exposed to downstream consumers.
///
/// All association-derived fields default to `""`/`false` when the
/// association is absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetRecord {
    pub id: AssetId,
    pub title: String,
    pub trial_id: String,
    pub trial_name: String,
    pub site_id: String,
    pub site_name: String,
    pub country_name: String,
    pub subject_number: String,
    pub study_arm_name: String,
    pub event_name: String,
    pub procedure_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub procedure_date: Option<NaiveDate>,
    pub upload_date: DateTime<Utc>,
    pub uploaded_by: String,
    pub duration_seconds: f64,
    pub file_size_bytes: u64,
    pub file_size_display: String,
    pub processed: bool,
    pub reviewed: bool,
    pub reviewed_by: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review_date: Option<DateTime<Utc>>,
    pub evaluator: String,
    pub comments: Vec<String>,
    pub external_link: String,
}

impl AssetRecord {
    /// Flatten a storage row into the display shape.
    pub fn from_row(row: AssetRow) -> Self {
        let trial = row.trial.unwrap_or(TrialRef {
            id: String::new(),
            name: String::new(),
        });
        let site = row.site;
        let subject = row.subject;
        let procedure = row.procedure;
        let review = row.review;

        Self {
            id: row.id,
            title: row.filename,
            trial_id: trial.id,
            trial_name: trial.name,
            site_id: site
                .as_ref()
                .map(|s| s.id.as_str().to_string())
                .unwrap_or_default(),
            site_name: site.as_ref().map(|s| s.name.clone()).unwrap_or_default(),
            country_name: site.map(|s| s.country_name).unwrap_or_default(),
            subject_number: subject
                .as_ref()
                .map(|s| s.number.clone())
                .unwrap_or_default(),
            study_arm_name: subject.map(|s| s.study_arm).unwrap_or_default(),
            event_name: procedure
                .as_ref()
                .map(|p| p.event_name.clone())
                .unwrap_or_default(),
            procedure_name: procedure
                .as_ref()
                .map(|p| p.name.clone())
                .unwrap_or_default(),
            procedure_date: procedure.and_then(|p| p.date),
            upload_date: row.created_at,
            uploaded_by: row.uploaded_by,
            duration_seconds: row.duration_seconds.unwrap_or(0.0),
            file_size_bytes: row.file_size_bytes.unwrap_or(0),
            file_size_display: format_file_size(row.file_size_bytes.unwrap_or(0)),
            processed: row.processed.unwrap_or(false),
            reviewed: row.reviewed.unwrap_or(false),
            reviewed_by: review
                .as_ref()
                .map(|r| r.reviewer.clone())
                .unwrap_or_default(),
            review_date: review.as_ref().and_then(|r| r.reviewed_at),
            evaluator: review.map(|r| r.evaluator).unwrap_or_default(),
            comments: row.comments.into_iter().map(|c| c.body).collect(),
            external_link: row.external_link.unwrap_or_default(),
        }
    }
}

/// Human-readable byte count ("482 B", "1.2 MB", "3.4 GB").
pub fn format_file_size(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;
    const GB: f64 = MB * 1024.0;

    let bytes_f = bytes as f64;
    if bytes_f >= GB {
        format!("{:.1} GB", bytes_f / GB)
    } else if bytes_f >= MB {
        format!("{:.1} MB", bytes_f / MB)
    } else if bytes_f >= KB {
        format!("{:.1} KB", bytes_f / KB)
    } else {
        format!("{bytes} B")
    }
}
