//! Injected per-level loaders.

use tan_model::{
    AssetSummary, EventId, Page, ProcedureId, ProcedureNode, SiteId, StudyEvent, Subject,
    SubjectId,
};

use crate::error::HierarchyError;

/// API-client boundary the explorer fetches through.
///
/// Implementations must validate path integrity server-side: if any
/// ancestor id does not belong to the claimed parent, the call resolves
/// to [`HierarchyError::NotFound`] rather than trusting the supplied
/// ids.
pub trait HierarchySource {
    fn list_subjects(
        &self,
        site: &SiteId,
        page: i64,
        limit: i64,
    ) -> impl Future<Output = Result<Page<Subject>, HierarchyError>>;

    fn list_events(
        &self,
        site: &SiteId,
        subject: &SubjectId,
        page: i64,
        limit: i64,
    ) -> impl Future<Output = Result<Page<StudyEvent>, HierarchyError>>;

    fn list_procedures(
        &self,
        site: &SiteId,
        subject: &SubjectId,
        event: &EventId,
        page: i64,
        limit: i64,
    ) -> impl Future<Output = Result<Page<ProcedureNode>, HierarchyError>>;

    fn list_assets(
        &self,
        site: &SiteId,
        subject: &SubjectId,
        event: &EventId,
        procedure: &ProcedureId,
        page: i64,
        limit: i64,
    ) -> impl Future<Output = Result<Page<AssetSummary>, HierarchyError>>;
}
