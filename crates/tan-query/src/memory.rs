//! In-process storage port.
//!
//! `MemoryStore` evaluates compiled predicates directly over a vector
//! of rows, clause-for-clause equivalent to the SQL rendered by
//! [`crate::sql`]. It backs the CLI's fixture mode and gives tests a
//! reference implementation of predicate semantics without a database.

use std::cmp::Ordering;

use chrono::{DateTime, NaiveDate, Utc};
use tan_filter::{CompiledQuery, ParamRef, ParamValue, Predicate, SortColumn};
use tan_model::{AssetRow, SITE_CONTAINER_TYPE, SortOrder};

use crate::error::StorageError;
use crate::port::StoragePort;

/// Storage port over in-process rows.
#[derive(Debug, Default)]
pub struct MemoryStore {
    rows: Vec<AssetRow>,
}

impl MemoryStore {
    pub fn new(rows: Vec<AssetRow>) -> Self {
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn matching<'a>(
        &'a self,
        query: &CompiledQuery,
    ) -> Result<Vec<&'a AssetRow>, StorageError> {
        let mut matched = Vec::new();
        for row in &self.rows {
            if matches_all(row, &query.predicates, &query.params)? {
                matched.push(row);
            }
        }
        Ok(matched)
    }
}

impl StoragePort for MemoryStore {
    async fn count(&self, query: &CompiledQuery) -> Result<u64, StorageError> {
        Ok(self.matching(query)?.len() as u64)
    }

    async fn fetch_page(
        &self,
        query: &CompiledQuery,
    ) -> Result<Vec<AssetRow>, StorageError> {
        let mut matched = self.matching(query)?;
        let column = query.sort.column;
        let order = query.sort.order;
        matched.sort_by(|a, b| {
            compare_rows(a, b, column, order)
                // Stable tiebreak mirroring the rendered ORDER BY.
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(matched
            .into_iter()
            .skip(query.offset.max(0) as usize)
            .take(query.limit.max(0) as usize)
            .cloned()
            .collect())
    }
}

fn matches_all(
    row: &AssetRow,
    predicates: &[Predicate],
    params: &[ParamValue],
) -> Result<bool, StorageError> {
    for predicate in predicates {
        if !matches(row, predicate, params)? {
            return Ok(false);
        }
    }
    Ok(true)
}

fn matches(
    row: &AssetRow,
    predicate: &Predicate,
    params: &[ParamValue],
) -> Result<bool, StorageError> {
    Ok(match predicate {
        Predicate::NotDeleted => !row.deleted,
        Predicate::TrialIn(p) => in_list(trial_name(row), list_param(params, *p)?),
        Predicate::SiteIn(p) => in_list(site_name(row), list_param(params, *p)?),
        Predicate::CountryIn(p) => in_list(country_code(row), list_param(params, *p)?),
        Predicate::StudyArmIn(p) => in_list(study_arm(row), list_param(params, *p)?),
        Predicate::ProcedureIn(p) => {
            in_list(procedure_name(row), list_param(params, *p)?)
        }
        Predicate::LibraryIn(p) => {
            in_list(row.container_name.as_deref(), list_param(params, *p)?)
        }
        Predicate::CreatedOnOrAfter(p) => row.created_at >= timestamp_param(params, *p)?,
        Predicate::CreatedBefore(p) => row.created_at < timestamp_param(params, *p)?,
        Predicate::Reviewed => row.reviewed == Some(true),
        Predicate::ReviewPending => !matches!(row.reviewed, Some(true)),
        Predicate::Processed => row.processed == Some(true),
        Predicate::Unprocessed => !matches!(row.processed, Some(true)),
        Predicate::SiteAssetsOnly => row.is_site_owned(),
        Predicate::LibraryAssetsOnly => {
            row.container_id.is_none()
                || row.container_type.as_deref() != Some(SITE_CONTAINER_TYPE)
        }
        Predicate::Search(p) => {
            let pattern = text_param(params, *p)?;
            ilike(Some(row.filename.as_str()), pattern)
                || ilike(subject_number(row), pattern)
                || ilike(trial_name(row), pattern)
                || ilike(row.container_name.as_deref(), pattern)
        }
    })
}

fn list_param(params: &[ParamValue], p: ParamRef) -> Result<&[String], StorageError> {
    match params.get(p.0) {
        Some(ParamValue::TextList(values)) => Ok(values),
        Some(_) => Err(StorageError::ParameterType {
            position: p.position(),
        }),
        None => Err(StorageError::MissingParameter {
            position: p.position(),
        }),
    }
}

fn text_param(params: &[ParamValue], p: ParamRef) -> Result<&str, StorageError> {
    match params.get(p.0) {
        Some(ParamValue::Text(value)) => Ok(value),
        Some(_) => Err(StorageError::ParameterType {
            position: p.position(),
        }),
        None => Err(StorageError::MissingParameter {
            position: p.position(),
        }),
    }
}

fn timestamp_param(
    params: &[ParamValue],
    p: ParamRef,
) -> Result<DateTime<Utc>, StorageError> {
    match params.get(p.0) {
        Some(ParamValue::Timestamp(ts)) => Ok(*ts),
        Some(_) => Err(StorageError::ParameterType {
            position: p.position(),
        }),
        None => Err(StorageError::MissingParameter {
            position: p.position(),
        }),
    }
}

/// NULL never matches an IN list.
fn in_list(value: Option<&str>, list: &[String]) -> bool {
    match value {
        Some(value) => list.iter().any(|item| item == value),
        None => false,
    }
}

/// Case-insensitive `%term%` containment, matching how the rendered
/// ILIKE behaves for the one pattern shape the compiler emits.
fn ilike(value: Option<&str>, pattern: &str) -> bool {
    let Some(value) = value else {
        return false;
    };
    let needle = pattern.trim_matches('%').to_lowercase();
    value.to_lowercase().contains(&needle)
}

fn trial_name(row: &AssetRow) -> Option<&str> {
    row.trial.as_ref().map(|t| t.name.as_str())
}

fn site_name(row: &AssetRow) -> Option<&str> {
    row.site.as_ref().map(|s| s.name.as_str())
}

fn country_code(row: &AssetRow) -> Option<&str> {
    row.site.as_ref().map(|s| s.country_code.as_str())
}

fn country_name(row: &AssetRow) -> Option<&str> {
    row.site.as_ref().map(|s| s.country_name.as_str())
}

fn study_arm(row: &AssetRow) -> Option<&str> {
    row.subject.as_ref().map(|s| s.study_arm.as_str())
}

fn subject_number(row: &AssetRow) -> Option<&str> {
    row.subject.as_ref().map(|s| s.number.as_str())
}

fn procedure_name(row: &AssetRow) -> Option<&str> {
    row.procedure.as_ref().map(|p| p.name.as_str())
}

fn event_name(row: &AssetRow) -> Option<&str> {
    row.procedure.as_ref().map(|p| p.event_name.as_str())
}

fn procedure_date(row: &AssetRow) -> Option<NaiveDate> {
    row.procedure.as_ref().and_then(|p| p.date)
}

/// f64 with a total order, for duration sorting.
#[derive(PartialEq)]
struct TotalF64(f64);

impl Eq for TotalF64 {}

impl PartialOrd for TotalF64 {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TotalF64 {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// Compare two rows on one column with nulls-last semantics.
///
/// Direction applies only when both values are present; a missing value
/// sorts after every present one in either direction, mirroring
/// `NULLS LAST`.
fn compare_rows(a: &AssetRow, b: &AssetRow, column: SortColumn, order: SortOrder) -> Ordering {
    match column {
        SortColumn::CreatedAt => directed(Some(a.created_at), Some(b.created_at), order),
        SortColumn::Filename => directed(
            Some(a.filename.as_str()),
            Some(b.filename.as_str()),
            order,
        ),
        SortColumn::TrialName => directed(trial_name(a), trial_name(b), order),
        SortColumn::SiteName => directed(site_name(a), site_name(b), order),
        SortColumn::CountryName => directed(country_name(a), country_name(b), order),
        SortColumn::SubjectNumber => directed(subject_number(a), subject_number(b), order),
        SortColumn::StudyArmName => directed(study_arm(a), study_arm(b), order),
        SortColumn::EventName => directed(event_name(a), event_name(b), order),
        SortColumn::ProcedureName => directed(procedure_name(a), procedure_name(b), order),
        SortColumn::ProcedureDate => directed(procedure_date(a), procedure_date(b), order),
        SortColumn::FileSizeBytes => directed(a.file_size_bytes, b.file_size_bytes, order),
        SortColumn::DurationSeconds => directed(
            a.duration_seconds.map(TotalF64),
            b.duration_seconds.map(TotalF64),
            order,
        ),
        SortColumn::UploadedBy => directed(
            Some(a.uploaded_by.as_str()),
            Some(b.uploaded_by.as_str()),
            order,
        ),
    }
}

fn directed<T: Ord>(a: Option<T>, b: Option<T>, order: SortOrder) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => {
            let natural = a.cmp(&b);
            match order {
                SortOrder::Asc => natural,
                SortOrder::Desc => natural.reverse(),
            }
        }
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tan_filter::compile;
    use tan_model::{AssetId, FilterSpec, SiteId, SiteRef, TrialRef};

    fn row(id: &str, created: DateTime<Utc>) -> AssetRow {
        AssetRow {
            id: AssetId::new(id),
            filename: format!("{id}.mp4"),
            deleted: false,
            created_at: created,
            uploaded_by: String::new(),
            container_type: None,
            container_id: None,
            container_name: None,
            reviewed: None,
            processed: None,
            duration_seconds: None,
            file_size_bytes: None,
            external_link: None,
            trial: None,
            site: None,
            subject: None,
            procedure: None,
            review: None,
            comments: Vec::new(),
        }
    }

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
    }

    #[test]
    fn test_end_of_day_inclusivity() {
        let inside = row("a", at(2024, 3, 10, 23, 59, 59));
        let outside = row("b", at(2024, 3, 11, 0, 0, 0));
        let store = MemoryStore::new(vec![inside, outside]);

        let spec = FilterSpec {
            date_range: tan_model::DateRange {
                start: None,
                end: Some("2024-03-10".to_string()),
            },
            ..FilterSpec::default()
        };
        let q = compile(&spec).unwrap();
        let rows = futures_block(store.fetch_page(&q)).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, AssetId::new("a"));
    }

    #[test]
    fn test_pending_review_matches_false_and_null() {
        let mut never = row("never", at(2024, 1, 1, 0, 0, 0));
        never.reviewed = None;
        let mut rejected = row("rejected", at(2024, 1, 2, 0, 0, 0));
        rejected.reviewed = Some(false);
        let mut done = row("done", at(2024, 1, 3, 0, 0, 0));
        done.reviewed = Some(true);
        let store = MemoryStore::new(vec![never, rejected, done]);

        let spec = FilterSpec {
            review_status: tan_model::ReviewStatusFilter::Pending,
            ..FilterSpec::default()
        };
        let q = compile(&spec).unwrap();
        assert_eq!(futures_block(store.count(&q)).unwrap(), 2);
    }

    #[test]
    fn test_soft_deleted_rows_are_invisible() {
        let mut deleted = row("gone", at(2024, 1, 1, 0, 0, 0));
        deleted.deleted = true;
        let store = MemoryStore::new(vec![deleted, row("kept", at(2024, 1, 2, 0, 0, 0))]);
        let q = compile(&FilterSpec::default()).unwrap();
        assert_eq!(futures_block(store.count(&q)).unwrap(), 1);
    }

    #[test]
    fn test_search_spans_filename_and_trial_name() {
        let mut by_trial = row("t", at(2024, 1, 1, 0, 0, 0));
        by_trial.trial = Some(TrialRef {
            id: "T1".to_string(),
            name: "Baseline Study".to_string(),
        });
        let by_name = row("baseline_echo", at(2024, 1, 2, 0, 0, 0));
        let miss = row("followup", at(2024, 1, 3, 0, 0, 0));
        let store = MemoryStore::new(vec![by_trial, by_name, miss]);

        let spec = FilterSpec {
            search_term: "BASELINE".to_string(),
            ..FilterSpec::default()
        };
        let q = compile(&spec).unwrap();
        assert_eq!(futures_block(store.count(&q)).unwrap(), 2);
    }

    #[test]
    fn test_sites_mode_requires_site_container() {
        let mut owned = row("owned", at(2024, 1, 1, 0, 0, 0));
        owned.container_type = Some("Site".to_string());
        owned.container_id = Some("S1".to_string());
        let mut library = row("lib", at(2024, 1, 2, 0, 0, 0));
        library.container_type = Some("Library".to_string());
        library.container_id = Some("L1".to_string());
        let orphan = row("orphan", at(2024, 1, 3, 0, 0, 0));
        // Container reference without a recorded kind: not site-owned.
        let mut typeless = row("typeless", at(2024, 1, 4, 0, 0, 0));
        typeless.container_id = Some("X1".to_string());
        let store = MemoryStore::new(vec![owned, library, orphan, typeless]);

        let sites = FilterSpec {
            data_view_mode: tan_model::DataViewMode::Sites,
            ..FilterSpec::default()
        };
        let q = compile(&sites).unwrap();
        assert_eq!(futures_block(store.count(&q)).unwrap(), 1);

        let library_mode = FilterSpec {
            data_view_mode: tan_model::DataViewMode::Library,
            ..FilterSpec::default()
        };
        let q = compile(&library_mode).unwrap();
        assert_eq!(futures_block(store.count(&q)).unwrap(), 3);
    }

    #[test]
    fn test_country_filter_compares_storage_codes() {
        let mut dutch = row("nl", at(2024, 1, 1, 0, 0, 0));
        dutch.site = Some(SiteRef {
            id: SiteId::new("S1"),
            name: "AMC".to_string(),
            country_name: "Netherlands".to_string(),
            country_code: "NL".to_string(),
        });
        let bare = row("none", at(2024, 1, 2, 0, 0, 0));
        let store = MemoryStore::new(vec![dutch, bare]);

        let mut spec = FilterSpec::default();
        spec.countries.insert("Netherlands".to_string());
        let q = compile(&spec).unwrap();
        assert_eq!(futures_block(store.count(&q)).unwrap(), 1);
    }

    #[test]
    fn test_sort_nulls_last_with_id_tiebreak() {
        let mut big = row("b", at(2024, 1, 1, 0, 0, 0));
        big.file_size_bytes = Some(100);
        let mut small = row("a", at(2024, 1, 1, 0, 0, 0));
        small.file_size_bytes = Some(1);
        let unsized_row = row("c", at(2024, 1, 1, 0, 0, 0));
        let store = MemoryStore::new(vec![unsized_row, big, small]);

        let spec = FilterSpec {
            sort_by: "fileSize".to_string(),
            sort_order: tan_model::SortOrder::Desc,
            ..FilterSpec::default()
        };
        let q = compile(&spec).unwrap();
        let rows = futures_block(store.fetch_page(&q)).unwrap();
        let ids: Vec<&str> = rows.iter().map(|r| r.id.as_str()).collect();
        // Missing sizes sort last even under DESC.
        assert_eq!(ids, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_offset_and_limit_slice_the_sorted_set() {
        let rows: Vec<AssetRow> = (0..5)
            .map(|i| row(&format!("r{i}"), at(2024, 1, 1 + i, 0, 0, 0)))
            .collect();
        let store = MemoryStore::new(rows);
        let spec = FilterSpec {
            sort_by: "uploadDate".to_string(),
            sort_order: tan_model::SortOrder::Asc,
            page: 2,
            limit: 2,
            ..FilterSpec::default()
        };
        let q = compile(&spec).unwrap();
        let page = futures_block(store.fetch_page(&q)).unwrap();
        let ids: Vec<&str> = page.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["r2", "r3"]);
    }

    /// Drive a ready-after-no-IO future to completion without a runtime.
    fn futures_block<F: Future>(future: F) -> F::Output {
        let mut future = Box::pin(future);
        let waker = std::task::Waker::noop();
        let mut cx = std::task::Context::from_waker(waker);
        match future.as_mut().poll(&mut cx) {
            std::task::Poll::Ready(output) => output,
            std::task::Poll::Pending => unreachable!("memory store futures are ready"),
        }
    }
}
