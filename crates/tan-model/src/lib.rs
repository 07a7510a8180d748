//! Domain model for Trial Asset Navigator.
//!
//! This crate defines the shared data vocabulary of the workspace:
//!
//! - `ids` - newtype identifiers for every hierarchy level
//! - `filter` - the declarative [`FilterSpec`] accepted by the query endpoint
//! - `asset` - raw storage rows ([`AssetRow`]) and the flattened
//!   [`AssetRecord`] exposed to downstream consumers
//! - `hierarchy` - node types for the Site → Subject → Event → Procedure
//!   containment tree, plus the [`Page`] envelope returned by loaders
//! - `path` - structural hierarchy-path keys ([`NodePath`] and friends)
//! - `country` - the static country name → storage code lookup table
//!
//! Everything here is plain data: no I/O, no async, no storage coupling.

mod asset;
mod filter;
mod hierarchy;
mod ids;
mod path;

pub mod country;

pub use asset::{
    AssetRecord, AssetRow, CommentRef, ProcedureRef, ReviewInfo, SITE_CONTAINER_TYPE, SiteRef,
    SubjectRef, TrialRef, format_file_size,
};
pub use filter::{
    DataViewMode, DateRange, FilterSpec, ProcessedFilter, ReviewStatusFilter, SortOrder,
};
pub use hierarchy::{AssetSummary, Page, ProcedureNode, Site, StudyEvent, Subject};
pub use ids::{AssetId, EventId, ProcedureId, SiteId, SubjectId};
pub use path::{EventPath, HierarchyLevel, NodePath, ProcedurePath, SitePath, SubjectPath};
