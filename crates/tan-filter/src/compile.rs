//! The filter compiler.

use chrono::{NaiveDate, TimeDelta, Utc};
use tan_model::{DataViewMode, FilterSpec, ProcessedFilter, ReviewStatusFilter, country};
use tracing::debug;

use crate::error::FilterError;
use crate::predicate::{ParamValue, Predicate, QueryBuilder};
use crate::sort::SortKey;

/// Page size used when the request asks for 0 or a negative limit.
pub const DEFAULT_LIMIT: i64 = 1000;
/// Hard ceiling on page size.
pub const MAX_LIMIT: i64 = 5000;

/// A fully compiled filter/sort/pagination request.
///
/// `predicates` is ordered and `params` is the flattened,
/// order-significant parameter list; predicates reference parameters by
/// index, and one parameter may be referenced from several branches of
/// a predicate (the search term is bound exactly once).
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledQuery {
    pub predicates: Vec<Predicate>,
    pub params: Vec<ParamValue>,
    pub sort: SortKey,
    /// Clamped to `[1, MAX_LIMIT]`.
    pub limit: i64,
    /// Clamped to `>= 1`.
    pub page: i64,
    /// `(page - 1) * limit`, saturating at `i64::MAX`.
    pub offset: i64,
}

/// Compile a declarative filter specification into a backing-store
/// query.
///
/// Fails with a [`FilterError`] on an incompatible view-mode/libraries
/// combination or a malformed date bound; on failure no partial query
/// exists and no store access has happened.
pub fn compile(spec: &FilterSpec) -> crate::Result<CompiledQuery> {
    // Cross-field validation up front: the library filter only makes
    // sense when library-owned assets are part of the population.
    if spec.data_view_mode == DataViewMode::Sites && !spec.libraries.is_empty() {
        return Err(FilterError::LibrariesOutsideLibraryMode);
    }

    let start = parse_bound(spec.date_range.start.as_deref(), "start")?;
    let end = parse_bound(spec.date_range.end.as_deref(), "end")?;

    let mut builder = QueryBuilder::new();

    // Rule 1: soft-deleted rows are never visible.
    builder.push(Predicate::NotDeleted);

    // Rule 2: multi-valued categorical dimensions. Empty set = no
    // predicate; non-empty = one IN predicate over one list parameter.
    builder.push_in_list(spec.trials.iter().cloned(), Predicate::TrialIn);
    builder.push_in_list(spec.sites.iter().cloned(), Predicate::SiteIn);
    builder.push_in_list(spec.study_arms.iter().cloned(), Predicate::StudyArmIn);
    builder.push_in_list(spec.procedures.iter().cloned(), Predicate::ProcedureIn);

    // Rule 3: countries resolve display names to storage codes, with
    // unresolved names passing through as literal codes.
    builder.push_in_list(
        spec.countries.iter().map(|name| country::resolve(name)),
        Predicate::CountryIn,
    );

    // Rule 4: creation-date window. The end bound is compiled as an
    // exclusive comparison against midnight *after* the end date, which
    // keeps the entire end day inside the window.
    if let Some(start) = start {
        let bound = start.and_hms_opt(0, 0, 0).unwrap_or_default().and_utc();
        let param = builder.bind(ParamValue::Timestamp(bound));
        builder.push(Predicate::CreatedOnOrAfter(param));
    }
    if let Some(end) = end {
        let next_midnight = end
            .checked_add_signed(TimeDelta::days(1))
            .unwrap_or(end)
            .and_hms_opt(0, 0, 0)
            .unwrap_or_default()
            .and_utc();
        let param = builder.bind(ParamValue::Timestamp(next_midnight));
        builder.push(Predicate::CreatedBefore(param));
    }

    // Rules 5 and 6: tri-state review/processed dimensions. "Pending"
    // and "no" must match rows where the flag was never set at all.
    match spec.review_status {
        ReviewStatusFilter::All => {}
        ReviewStatusFilter::Reviewed => builder.push(Predicate::Reviewed),
        ReviewStatusFilter::Pending => builder.push(Predicate::ReviewPending),
    }
    match spec.processed_status {
        ProcessedFilter::All => {}
        ProcessedFilter::Yes => builder.push(Predicate::Processed),
        ProcessedFilter::No => builder.push(Predicate::Unprocessed),
    }

    // Rule 7: free-text search. The wildcarded pattern is bound once
    // and shared by every branch of the OR-group.
    let term = spec.search_term.trim();
    if !term.is_empty() {
        let param = builder.bind(ParamValue::Text(format!("%{term}%")));
        builder.push(Predicate::Search(param));
    }

    // Rule 8: view-mode restriction, applied before the libraries
    // filter it guards.
    match spec.data_view_mode {
        DataViewMode::All => {}
        DataViewMode::Sites => builder.push(Predicate::SiteAssetsOnly),
        DataViewMode::Library => builder.push(Predicate::LibraryAssetsOnly),
    }
    builder.push_in_list(spec.libraries.iter().cloned(), Predicate::LibraryIn);

    // Rules 9 and 10: sort allow-list and pagination clamps.
    let sort = SortKey::resolve(&spec.sort_by, spec.sort_order);
    let limit = if spec.limit < 1 {
        DEFAULT_LIMIT
    } else {
        spec.limit.min(MAX_LIMIT)
    };
    let page = spec.page.max(1);
    // Saturating: an absurd page number must not overflow into a
    // negative offset.
    let offset = (page - 1).saturating_mul(limit);

    let (predicates, params) = builder.finish();
    debug!(
        predicates = predicates.len(),
        params = params.len(),
        page,
        limit,
        "compiled filter spec"
    );

    Ok(CompiledQuery {
        predicates,
        params,
        sort,
        limit,
        page,
        offset,
    })
}

fn parse_bound(
    value: Option<&str>,
    field: &'static str,
) -> crate::Result<Option<NaiveDate>> {
    let Some(raw) = value else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .map(Some)
        .map_err(|source| FilterError::MalformedDate {
            field,
            value: raw.to_string(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tan_model::{DateRange, SortOrder};

    use crate::sort::SortColumn;

    fn spec() -> FilterSpec {
        FilterSpec::default()
    }

    #[test]
    fn test_empty_spec_compiles_to_base_predicate_only() {
        let q = compile(&spec()).unwrap();
        assert_eq!(q.predicates, vec![Predicate::NotDeleted]);
        assert!(q.params.is_empty());
        assert_eq!(q.sort.column, SortColumn::CreatedAt);
        assert_eq!(q.sort.order, SortOrder::Desc);
    }

    #[test]
    fn test_default_limit_applies_when_unset() {
        let q = compile(&spec()).unwrap();
        assert_eq!(q.limit, DEFAULT_LIMIT);
        assert_eq!(q.page, 1);
        assert_eq!(q.offset, 0);
    }

    #[test]
    fn test_trial_scenario_two_predicates_upload_date_desc() {
        let mut s = spec();
        s.trials.insert("Trial A".to_string());
        s.sort_by = "uploadDate".to_string();
        s.sort_order = SortOrder::Desc;
        s.page = 1;
        s.limit = 1000;

        let q = compile(&s).unwrap();
        assert_eq!(
            q.predicates,
            vec![Predicate::NotDeleted, Predicate::TrialIn(crate::ParamRef(0))]
        );
        assert_eq!(
            q.params,
            vec![ParamValue::TextList(vec!["Trial A".to_string()])]
        );
        assert_eq!(q.sort.column, SortColumn::CreatedAt);
        assert_eq!(q.sort.order, SortOrder::Desc);
    }

    #[test]
    fn test_sites_mode_with_libraries_is_a_validation_error() {
        let mut s = spec();
        s.data_view_mode = DataViewMode::Sites;
        s.libraries.insert("Reference Scans".to_string());
        let err = compile(&s).unwrap_err();
        assert!(matches!(err, FilterError::LibrariesOutsideLibraryMode));
    }

    #[test]
    fn test_libraries_allowed_in_all_and_library_modes() {
        for mode in [DataViewMode::All, DataViewMode::Library] {
            let mut s = spec();
            s.data_view_mode = mode;
            s.libraries.insert("Reference Scans".to_string());
            let q = compile(&s).unwrap();
            assert!(
                q.predicates
                    .iter()
                    .any(|p| matches!(p, Predicate::LibraryIn(_)))
            );
        }
    }

    #[test]
    fn test_malformed_date_is_a_validation_error() {
        let mut s = spec();
        s.date_range = DateRange {
            start: Some("03/10/2024".to_string()),
            end: None,
        };
        let err = compile(&s).unwrap_err();
        assert!(matches!(err, FilterError::MalformedDate { field: "start", .. }));
    }

    #[test]
    fn test_end_bound_covers_entire_end_day() {
        let mut s = spec();
        s.date_range = DateRange {
            start: None,
            end: Some("2024-03-10".to_string()),
        };
        let q = compile(&s).unwrap();
        let bound = q
            .params
            .iter()
            .find_map(|p| match p {
                ParamValue::Timestamp(ts) => Some(*ts),
                _ => None,
            })
            .unwrap();
        // Exclusive bound at the following midnight: 23:59:59 on the
        // end date is inside the window.
        assert_eq!(bound, Utc.with_ymd_and_hms(2024, 3, 11, 0, 0, 0).unwrap());
        let record_at = Utc.with_ymd_and_hms(2024, 3, 10, 23, 59, 59).unwrap();
        assert!(record_at < bound);
    }

    #[test]
    fn test_country_names_resolve_with_passthrough() {
        let mut s = spec();
        s.countries.insert("Netherlands".to_string());
        s.countries.insert("Atlantis".to_string());
        let q = compile(&s).unwrap();
        let list = q
            .params
            .iter()
            .find_map(|p| match p {
                ParamValue::TextList(values) => Some(values.clone()),
                _ => None,
            })
            .unwrap();
        assert!(list.contains(&"NL".to_string()));
        assert!(list.contains(&"Atlantis".to_string()));
    }

    #[test]
    fn test_search_term_binds_exactly_one_parameter() {
        let mut s = spec();
        s.search_term = "baseline".to_string();
        let q = compile(&s).unwrap();
        assert_eq!(q.params.len(), 1);
        assert_eq!(q.params[0], ParamValue::Text("%baseline%".to_string()));
        assert_eq!(
            q.predicates
                .iter()
                .filter(|p| matches!(p, Predicate::Search(_)))
                .count(),
            1
        );
    }

    #[test]
    fn test_blank_search_term_emits_no_predicate() {
        let mut s = spec();
        s.search_term = "   ".to_string();
        let q = compile(&s).unwrap();
        assert!(!q.predicates.iter().any(|p| matches!(p, Predicate::Search(_))));
    }

    #[test]
    fn test_pagination_clamps() {
        let mut s = spec();
        s.limit = 10_000;
        s.page = 0;
        let q = compile(&s).unwrap();
        assert_eq!(q.limit, MAX_LIMIT);
        assert_eq!(q.page, 1);
        assert_eq!(q.offset, 0);

        s.limit = -5;
        s.page = 3;
        let q = compile(&s).unwrap();
        assert_eq!(q.limit, DEFAULT_LIMIT);
        assert_eq!(q.offset, 2 * DEFAULT_LIMIT);
    }

    #[test]
    fn test_huge_page_number_saturates_offset() {
        // Page numbers are wire input; the largest representable value
        // must compile to a saturated, non-negative offset.
        let mut s = spec();
        s.page = i64::MAX;
        s.limit = 1000;
        let q = compile(&s).unwrap();
        assert_eq!(q.page, i64::MAX);
        assert_eq!(q.offset, i64::MAX);
        assert!(q.offset >= 0);
    }

    #[test]
    fn test_pending_review_and_unprocessed_predicates() {
        let mut s = spec();
        s.review_status = ReviewStatusFilter::Pending;
        s.processed_status = ProcessedFilter::No;
        let q = compile(&s).unwrap();
        assert!(q.predicates.contains(&Predicate::ReviewPending));
        assert!(q.predicates.contains(&Predicate::Unprocessed));
    }

    #[test]
    fn test_view_mode_precedes_library_filter() {
        let mut s = spec();
        s.data_view_mode = DataViewMode::Library;
        s.libraries.insert("Reference Scans".to_string());
        let q = compile(&s).unwrap();
        let mode_pos = q
            .predicates
            .iter()
            .position(|p| matches!(p, Predicate::LibraryAssetsOnly))
            .unwrap();
        let lib_pos = q
            .predicates
            .iter()
            .position(|p| matches!(p, Predicate::LibraryIn(_)))
            .unwrap();
        assert!(mode_pos < lib_pos);
    }
}
