//! Lazy disclosure of the Site → Subject → Event → Procedure tree.
//!
//! Two pieces:
//!
//! - [`NodeCache`] - a generic keyed cache with a per-key lifecycle
//!   state machine (`Empty → Loading → Loaded | Errored`) and fetch
//!   deduplication: while a key is `Loading`, concurrent requests never
//!   issue a second loader call.
//! - [`HierarchyExplorer`] - owns one cache per hierarchy level plus the
//!   expand/collapse visibility set and the single-drill-down
//!   selection, issuing fetches through an injected
//!   [`HierarchySource`].
//!
//! All state lives on one logical thread (interior mutability, no
//! locks); the only suspension points are the loader calls themselves,
//! so entry transitions are atomic with respect to other keys. Loaded
//! data is never evicted by collapsing a parent - only explicit
//! invalidation forces a refetch.

mod cache;
mod error;
mod explorer;
mod source;

pub use cache::{CacheEntry, FetchStatus, NodeCache};
pub use error::HierarchyError;
pub use explorer::{DEFAULT_PAGE_LIMIT, HierarchyExplorer, Selection};
pub use source::HierarchySource;
