//! The query executor.

use tan_filter::CompiledQuery;
use tan_model::{AssetRecord, FilterSpec};
use tracing::debug;

use crate::error::QueryError;
use crate::pagination::{PageLinks, PageMeta};
use crate::port::StoragePort;

/// One served page of flattened asset records plus its envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetPage {
    pub records: Vec<AssetRecord>,
    pub meta: PageMeta,
    pub links: PageLinks,
}

/// Execute a compiled query against a storage port.
///
/// Runs `count` then `fetch_page`, both against the same compiled
/// query value, flattens the rows and builds the pagination envelope.
/// Any store failure propagates whole; no partial page is returned.
pub async fn execute<S: StoragePort>(
    query: &CompiledQuery,
    store: &S,
    links_base: &str,
) -> Result<AssetPage, QueryError> {
    let total = store.count(query).await?;
    let rows = store.fetch_page(query).await?;
    debug!(total, returned = rows.len(), page = query.page, "executed asset query");

    let records: Vec<AssetRecord> = rows.into_iter().map(AssetRecord::from_row).collect();
    let meta = PageMeta::new(query.page, query.limit, total);
    let links = PageLinks::build(links_base, &meta);
    Ok(AssetPage {
        records,
        meta,
        links,
    })
}

/// Compile a filter specification and execute it in one step - the
/// whole query-endpoint flow minus the HTTP layer.
pub async fn execute_spec<S: StoragePort>(
    spec: &FilterSpec,
    store: &S,
    links_base: &str,
) -> Result<AssetPage, QueryError> {
    let query = tan_filter::compile(spec)?;
    execute(&query, store, links_base).await
}
