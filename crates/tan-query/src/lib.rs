//! Query execution for the flat asset view.
//!
//! A [`CompiledQuery`](tan_filter::CompiledQuery) is executed against a
//! [`StoragePort`]: one `count`, one `fetch_page`, both fed the same
//! compiled predicate list, then rows are flattened into
//! [`AssetRecord`](tan_model::AssetRecord)s and wrapped in the
//! pagination envelope.
//!
//! Two port implementations live here:
//!
//! - [`sql`] renders the compiled predicates to parameterized SQL with
//!   `$n` placeholders for a relational backend (the backend itself is
//!   an external collaborator);
//! - [`MemoryStore`] evaluates the predicates directly over in-process
//!   rows, serving as the reference semantics and as the CLI's store.

mod api;
mod error;
mod executor;
mod memory;
mod pagination;
mod port;

pub mod sql;

pub use api::{ApiResponse, QueryErrorBody, QuerySuccessBody};
pub use error::{QueryError, StorageError};
pub use executor::{AssetPage, execute, execute_spec};
pub use memory::MemoryStore;
pub use pagination::{PageLinks, PageMeta};
pub use port::StoragePort;
