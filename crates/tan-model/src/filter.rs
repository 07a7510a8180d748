//! The declarative filter/sort/pagination specification.
//!
//! A [`FilterSpec`] is the wire shape accepted by the query endpoint
//! (JSON, camelCase). Every dimension is optional: an empty categorical
//! set means *unconstrained*, never *exclude all*. Validation of
//! cross-field rules (view mode vs. libraries, date syntax) happens in
//! the filter compiler, not here.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Review-state dimension of a filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewStatusFilter {
    /// No restriction.
    #[default]
    All,
    /// Only assets that have been reviewed.
    Reviewed,
    /// Assets awaiting review: explicitly not reviewed *or* never reviewed.
    Pending,
}

/// Processing-state dimension of a filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessedFilter {
    /// No restriction.
    #[default]
    All,
    /// Only processed assets.
    Yes,
    /// Unprocessed assets, including those with no processing record.
    No,
}

/// Mutually exclusive restriction of the asset population by container kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataViewMode {
    /// Site-owned and library-owned assets alike.
    #[default]
    All,
    /// Only assets owned by a Site container.
    Sites,
    /// Only assets owned by a Library container (or no container).
    Library,
}

/// Requested sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    /// Newest-first is the default presentation.
    #[default]
    Desc,
}

/// Optional inclusive date window over the asset creation timestamp.
///
/// Bounds are ISO `YYYY-MM-DD` strings; they are parsed by the compiler
/// so a malformed date surfaces as a validation error rather than a
/// deserialization failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
}

impl DateRange {
    pub fn is_empty(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }
}

/// Declarative filter/sort/pagination request for the flat asset view.
///
/// `Default` produces the unconstrained spec: every set empty, no date
/// window, `all` statuses, default sort, page 1.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterSpec {
    /// Trial names to include. Empty = unconstrained.
    pub trials: BTreeSet<String>,
    /// Site names to include. Empty = unconstrained.
    pub sites: BTreeSet<String>,
    /// Library (container) names to include. Only valid when
    /// `data_view_mode` is `all` or `library`.
    pub libraries: BTreeSet<String>,
    /// Country display names; resolved to storage codes at compile time.
    pub countries: BTreeSet<String>,
    /// Study arm names to include.
    pub study_arms: BTreeSet<String>,
    /// Procedure names to include.
    pub procedures: BTreeSet<String>,
    /// Creation-date window, inclusive on both ends.
    pub date_range: DateRange,
    pub review_status: ReviewStatusFilter,
    pub processed_status: ProcessedFilter,
    /// Free-text search over filename, subject number, trial name and
    /// container name. Empty = no search predicate.
    pub search_term: String,
    /// Sort field name, resolved through a fixed allow-list.
    pub sort_by: String,
    pub sort_order: SortOrder,
    /// 1-based page number; values below 1 are clamped up.
    pub page: i64,
    /// Page size; clamped to the compiler's bounds.
    pub limit: i64,
    pub data_view_mode: DataViewMode,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_spec_is_unconstrained() {
        let spec = FilterSpec::default();
        assert!(spec.trials.is_empty());
        assert!(spec.date_range.is_empty());
        assert_eq!(spec.review_status, ReviewStatusFilter::All);
        assert_eq!(spec.data_view_mode, DataViewMode::All);
        assert_eq!(spec.sort_order, SortOrder::Desc);
    }

    #[test]
    fn test_spec_deserializes_camel_case_with_defaults() {
        let json = r#"{
            "trials": ["Trial A"],
            "dateRange": {"start": "2024-01-01"},
            "reviewStatus": "pending",
            "dataViewMode": "sites",
            "sortBy": "uploadDate",
            "page": 2,
            "limit": 50
        }"#;
        let spec: FilterSpec = serde_json::from_str(json).unwrap();
        assert!(spec.trials.contains("Trial A"));
        assert_eq!(spec.date_range.start.as_deref(), Some("2024-01-01"));
        assert!(spec.date_range.end.is_none());
        assert_eq!(spec.review_status, ReviewStatusFilter::Pending);
        assert_eq!(spec.data_view_mode, DataViewMode::Sites);
        assert_eq!(spec.page, 2);
        assert_eq!(spec.limit, 50);
        // Unspecified fields fall back to defaults.
        assert!(spec.sites.is_empty());
        assert_eq!(spec.processed_status, ProcessedFilter::All);
    }
}
