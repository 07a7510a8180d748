//! Subcommand implementations.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::Context;
use comfy_table::{ContentArrangement, Table, presets::UTF8_FULL_CONDENSED};
use tan_filter::ParamValue;
use tan_hierarchy::HierarchyExplorer;
use tan_model::{
    AssetRow, DataViewMode, DateRange, EventId, FilterSpec, ProcedureId, ProcessedFilter,
    ReviewStatusFilter, SiteId, SortOrder, SubjectId,
};
use tan_query::sql::{render_count, render_select};
use tan_query::{ApiResponse, AssetPage, MemoryStore, execute_spec};
use tracing::{debug, info, trace};

use crate::cli::{
    BrowseArgs, FilterArgs, OrderArg, ProcessedArg, QueryArgs, ReviewArg, SqlArgs, ViewArg,
};
use crate::fixture::HierarchyFixture;
use crate::logging::redact_value;

/// Single-threaded runtime; all explorer state is thread-local by design.
fn runtime() -> anyhow::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .context("failed to build async runtime")
}

// ----- query ------------------------------------------------------------

pub fn run_query(args: &QueryArgs) -> anyhow::Result<i32> {
    let spec = build_spec(&args.filter)?;
    let rows = load_assets(&args.assets)?;
    info!(rows = rows.len(), "loaded asset fixture");
    let store = MemoryStore::new(rows);

    let result = runtime()?.block_on(execute_spec(&spec, &store, &args.link_base));

    if args.json {
        let status = ApiResponse::status_code(&result);
        let body = ApiResponse::from_result(result);
        println!("{}", serde_json::to_string_pretty(&body)?);
        return Ok(if status == 200 { 0 } else { 1 });
    }

    let page = result?;
    print_asset_table(&page);
    Ok(0)
}

fn load_assets(path: &Path) -> anyhow::Result<Vec<AssetRow>> {
    let file =
        File::open(path).with_context(|| format!("cannot open {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("invalid asset fixture {}", path.display()))
}

fn print_asset_table(page: &AssetPage) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            "Title", "Trial", "Site", "Subject", "Procedure", "Uploaded", "Size", "Reviewed",
        ]);
    for record in &page.records {
        trace!(title = redact_value(&record.title), "rendering record");
        table.add_row(vec![
            record.title.clone(),
            record.trial_name.clone(),
            record.site_name.clone(),
            record.subject_number.clone(),
            record.procedure_name.clone(),
            record.upload_date.format("%Y-%m-%d").to_string(),
            record.file_size_display.clone(),
            if record.reviewed { "yes" } else { "no" }.to_string(),
        ]);
    }
    println!("{table}");
    println!(
        "page {page} of {total_pages} ({total} matching)",
        page = page.meta.page,
        total_pages = page.meta.total_pages,
        total = page.meta.total,
    );
}

// ----- sql --------------------------------------------------------------

pub fn run_sql(args: &SqlArgs) -> anyhow::Result<i32> {
    let spec = build_spec(&args.filter)?;
    let query = tan_filter::compile(&spec)?;
    debug!(predicates = query.predicates.len(), "compiled filter");

    let select = render_select(&query);
    let count = render_count(&query);
    println!("-- select");
    println!("{}", select.text);
    println!("-- count");
    println!("{}", count.text);
    if !select.params.is_empty() {
        println!("-- params");
        for (index, param) in select.params.iter().enumerate() {
            println!("  ${} = {}", index + 1, format_param(param));
        }
    }
    Ok(0)
}

fn format_param(param: &ParamValue) -> String {
    match param {
        ParamValue::Text(value) => format!("'{value}'"),
        ParamValue::TextList(values) => {
            let quoted: Vec<String> = values.iter().map(|v| format!("'{v}'")).collect();
            format!("{{{}}}", quoted.join(", "))
        }
        ParamValue::Timestamp(at) => at.to_rfc3339(),
    }
}

// ----- browse -----------------------------------------------------------

pub fn run_browse(args: &BrowseArgs) -> anyhow::Result<i32> {
    let fixture = HierarchyFixture::load(&args.tree)?;
    info!(sites = fixture.sites.len(), "loaded hierarchy fixture");
    let explorer = HierarchyExplorer::new(fixture);
    runtime()?.block_on(browse(&explorer, args))
}

async fn browse(
    explorer: &HierarchyExplorer<HierarchyFixture>,
    args: &BrowseArgs,
) -> anyhow::Result<i32> {
    let Some(site) = &args.site else {
        print_sites(explorer.source());
        return Ok(0);
    };

    let subjects = explorer.select_site(SiteId::new(site.as_str())).await;
    let subjects = loaded(subjects.data(), subjects.error())?;
    let Some(subject) = &args.subject else {
        let mut table = level_table(vec!["Subject", "Study arm", "Events"]);
        for s in subjects {
            table.add_row(vec![
                s.number.clone(),
                s.study_arm.clone(),
                s.event_count.to_string(),
            ]);
        }
        println!("{table}");
        return Ok(0);
    };

    let events = explorer
        .select_subject(SubjectId::new(subject.as_str()))
        .await
        .context("no site selected")?;
    let events = loaded(events.data(), events.error())?;
    let Some(event) = &args.event else {
        let mut table = level_table(vec!["Event", "Date", "Procedures"]);
        for e in events {
            table.add_row(vec![
                e.name.clone(),
                e.date.map(|d| d.to_string()).unwrap_or_default(),
                e.procedure_count.to_string(),
            ]);
        }
        println!("{table}");
        return Ok(0);
    };

    let procedures = explorer
        .select_event(EventId::new(event.as_str()))
        .await
        .context("no subject selected")?;
    let procedures = loaded(procedures.data(), procedures.error())?;
    let Some(procedure) = &args.procedure else {
        let mut table = level_table(vec!["Procedure", "Date", "Assets"]);
        for p in procedures {
            table.add_row(vec![
                p.name.clone(),
                p.date.map(|d| d.to_string()).unwrap_or_default(),
                p.asset_count.to_string(),
            ]);
        }
        println!("{table}");
        return Ok(0);
    };

    let assets = explorer
        .select_procedure(ProcedureId::new(procedure.as_str()))
        .await
        .context("no event selected")?;
    let assets = loaded(assets.data(), assets.error())?;
    let mut table = level_table(vec!["Asset", "Uploaded", "Reviewed"]);
    for a in assets {
        table.add_row(vec![
            a.title.clone(),
            a.uploaded_at
                .map(|at| at.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            if a.reviewed { "yes" } else { "no" }.to_string(),
        ]);
    }
    println!("{table}");
    Ok(0)
}

/// Unwrap a loaded cache entry, surfacing the retained fetch error.
fn loaded<T: Clone>(
    data: Option<&[T]>,
    error: Option<&tan_hierarchy::HierarchyError>,
) -> anyhow::Result<Vec<T>> {
    if let Some(error) = error {
        anyhow::bail!("{error}");
    }
    Ok(data.unwrap_or_default().to_vec())
}

fn print_sites(fixture: &HierarchyFixture) {
    let mut table = level_table(vec!["Site", "Country", "Subjects"]);
    for site in fixture.site_nodes() {
        table.add_row(vec![
            site.name,
            site.country_name,
            site.subject_count.to_string(),
        ]);
    }
    println!("{table}");
}

fn level_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

// ----- filter assembly --------------------------------------------------

/// Build a [`FilterSpec`] from CLI flags, optionally layered over a
/// JSON spec file. Flags override the file for the fields they set.
fn build_spec(args: &FilterArgs) -> anyhow::Result<FilterSpec> {
    let mut spec = match &args.spec {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("cannot open {}", path.display()))?;
            serde_json::from_reader(BufReader::new(file))
                .with_context(|| format!("invalid filter spec {}", path.display()))?
        }
        None => FilterSpec::default(),
    };

    if !args.trials.is_empty() {
        spec.trials = args.trials.iter().cloned().collect();
    }
    if !args.sites.is_empty() {
        spec.sites = args.sites.iter().cloned().collect();
    }
    if !args.libraries.is_empty() {
        spec.libraries = args.libraries.iter().cloned().collect();
    }
    if !args.countries.is_empty() {
        spec.countries = args.countries.iter().cloned().collect();
    }
    if !args.study_arms.is_empty() {
        spec.study_arms = args.study_arms.iter().cloned().collect();
    }
    if !args.procedures.is_empty() {
        spec.procedures = args.procedures.iter().cloned().collect();
    }
    if args.from.is_some() || args.to.is_some() {
        spec.date_range = DateRange {
            start: args.from.clone().or(spec.date_range.start),
            end: args.to.clone().or(spec.date_range.end),
        };
    }
    if let Some(review) = args.review {
        spec.review_status = match review {
            ReviewArg::All => ReviewStatusFilter::All,
            ReviewArg::Reviewed => ReviewStatusFilter::Reviewed,
            ReviewArg::Pending => ReviewStatusFilter::Pending,
        };
    }
    if let Some(processed) = args.processed {
        spec.processed_status = match processed {
            ProcessedArg::All => ProcessedFilter::All,
            ProcessedArg::Yes => ProcessedFilter::Yes,
            ProcessedArg::No => ProcessedFilter::No,
        };
    }
    if let Some(search) = &args.search {
        spec.search_term = search.clone();
    }
    if let Some(sort_by) = &args.sort_by {
        spec.sort_by = sort_by.clone();
    }
    if let Some(order) = args.order {
        spec.sort_order = match order {
            OrderArg::Asc => SortOrder::Asc,
            OrderArg::Desc => SortOrder::Desc,
        };
    }
    if let Some(page) = args.page {
        spec.page = page;
    }
    if let Some(limit) = args.limit {
        spec.limit = limit;
    }
    if let Some(view) = args.view {
        spec.data_view_mode = match view {
            ViewArg::All => DataViewMode::All,
            ViewArg::Sites => DataViewMode::Sites,
            ViewArg::Library => DataViewMode::Library,
        };
    }
    Ok(spec)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_filter_args() -> FilterArgs {
        FilterArgs {
            spec: None,
            trials: Vec::new(),
            sites: Vec::new(),
            libraries: Vec::new(),
            countries: Vec::new(),
            study_arms: Vec::new(),
            procedures: Vec::new(),
            from: None,
            to: None,
            review: None,
            processed: None,
            search: None,
            sort_by: None,
            order: None,
            page: None,
            limit: None,
            view: None,
        }
    }

    #[test]
    fn test_bare_flags_build_default_spec() {
        let spec = build_spec(&empty_filter_args()).unwrap();
        assert_eq!(spec, FilterSpec::default());
    }

    #[test]
    fn test_flags_populate_spec_fields() {
        let mut args = empty_filter_args();
        args.trials = vec!["Trial A".to_string()];
        args.review = Some(ReviewArg::Pending);
        args.from = Some("2024-01-01".to_string());
        args.page = Some(3);
        args.view = Some(ViewArg::Sites);

        let spec = build_spec(&args).unwrap();
        assert!(spec.trials.contains("Trial A"));
        assert_eq!(spec.review_status, ReviewStatusFilter::Pending);
        assert_eq!(spec.date_range.start.as_deref(), Some("2024-01-01"));
        assert!(spec.date_range.end.is_none());
        assert_eq!(spec.page, 3);
        assert_eq!(spec.data_view_mode, DataViewMode::Sites);
    }

    #[test]
    fn test_param_formatting() {
        assert_eq!(
            format_param(&ParamValue::Text("%echo%".to_string())),
            "'%echo%'"
        );
        assert_eq!(
            format_param(&ParamValue::TextList(vec![
                "Trial A".to_string(),
                "Trial B".to_string()
            ])),
            "{'Trial A', 'Trial B'}"
        );
    }
}
