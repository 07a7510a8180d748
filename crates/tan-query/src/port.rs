//! The storage port.

use tan_filter::CompiledQuery;
use tan_model::AssetRow;

use crate::error::StorageError;

/// Backing store the executor runs compiled queries against.
///
/// Both operations take the whole [`CompiledQuery`] so the predicate
/// set seen by `count` and by `fetch_page` is the same value by
/// construction; if they diverged, `total` and the returned page would
/// disagree. `count` must ignore sort and pagination; `fetch_page`
/// applies them.
pub trait StoragePort {
    /// Number of rows matching the query's predicates.
    fn count(
        &self,
        query: &CompiledQuery,
    ) -> impl Future<Output = Result<u64, StorageError>>;

    /// One page of matching rows, sorted and offset per the query.
    fn fetch_page(
        &self,
        query: &CompiledQuery,
    ) -> impl Future<Output = Result<Vec<AssetRow>, StorageError>>;
}
