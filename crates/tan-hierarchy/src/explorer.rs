//! The hierarchy explorer.
//!
//! Owns one [`NodeCache`] per level, the expand/collapse visibility
//! set and the single-drill-down selection. Visibility and caching are
//! deliberately independent: collapsing a node removes only its own
//! membership bit, so re-expanding restores the previously fetched
//! subtree (and its descendants' expansion bits) verbatim, with zero
//! additional loader calls.

use std::cell::RefCell;
use std::collections::HashSet;

use tan_model::{
    AssetSummary, EventId, EventPath, NodePath, ProcedureId, ProcedureNode, ProcedurePath,
    SiteId, SitePath, StudyEvent, Subject, SubjectId, SubjectPath,
};
use tracing::debug;

use crate::cache::{CacheEntry, NodeCache};
use crate::source::HierarchySource;

/// Children pages fetched through the explorer use this limit unless
/// configured otherwise.
pub const DEFAULT_PAGE_LIMIT: i64 = 200;

/// At most one drilled-into child per level.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub site: Option<SiteId>,
    pub subject: Option<SubjectId>,
    pub event: Option<EventId>,
    pub procedure: Option<ProcedureId>,
}

impl Selection {
    /// Drop selections strictly deeper than `depth` (0 = site).
    fn truncate_below(&mut self, depth: usize) {
        if depth < 3 {
            self.procedure = None;
        }
        if depth < 2 {
            self.event = None;
        }
        if depth < 1 {
            self.subject = None;
        }
    }

    /// Path of the selected site, if any.
    pub fn site_path(&self) -> Option<SitePath> {
        self.site.clone().map(SitePath::new)
    }

    pub fn subject_path(&self) -> Option<SubjectPath> {
        Some(self.site_path()?.subject(self.subject.clone()?))
    }

    pub fn event_path(&self) -> Option<EventPath> {
        Some(self.subject_path()?.event(self.event.clone()?))
    }

    pub fn procedure_path(&self) -> Option<ProcedurePath> {
        Some(self.event_path()?.procedure(self.procedure.clone()?))
    }
}

/// Orchestrates the four per-level caches over an injected source.
///
/// All methods take `&self`; state lives behind interior mutability on
/// one logical thread. Fetches for different paths may be in flight
/// concurrently, each key's state machine independent of its siblings.
pub struct HierarchyExplorer<S> {
    source: S,
    page_limit: i64,
    subjects: NodeCache<SitePath, Subject>,
    events: NodeCache<SubjectPath, StudyEvent>,
    procedures: NodeCache<EventPath, ProcedureNode>,
    assets: NodeCache<ProcedurePath, AssetSummary>,
    expanded: RefCell<HashSet<NodePath>>,
    selection: RefCell<Selection>,
}

impl<S: HierarchySource> HierarchyExplorer<S> {
    pub fn new(source: S) -> Self {
        Self::with_page_limit(source, DEFAULT_PAGE_LIMIT)
    }

    pub fn with_page_limit(source: S, page_limit: i64) -> Self {
        Self {
            source,
            page_limit,
            subjects: NodeCache::new(),
            events: NodeCache::new(),
            procedures: NodeCache::new(),
            assets: NodeCache::new(),
            expanded: RefCell::new(HashSet::new()),
            selection: RefCell::new(Selection::default()),
        }
    }

    /// The injected source, for callers that need direct loader access
    /// (deep pagination of one level, for example).
    pub fn source(&self) -> &S {
        &self.source
    }

    // ----- visibility ---------------------------------------------------

    /// Expand or collapse one node. Returns true when the node is
    /// expanded afterwards.
    ///
    /// Collapse removes only this path's own membership bit:
    /// descendants disappear because rendering stops descending, but
    /// their caches and expansion bits survive and are restored
    /// verbatim on re-expand. Expanding fetches the node's children
    /// through the level cache - a cache hit if they were ever loaded.
    pub async fn toggle_expand(&self, path: &NodePath) -> bool {
        if self.expanded.borrow_mut().remove(path) {
            debug!(%path, "collapsed");
            return false;
        }
        self.expanded.borrow_mut().insert(path.clone());
        debug!(%path, "expanded");
        self.fetch_children(path).await;
        true
    }

    pub fn is_expanded(&self, path: &NodePath) -> bool {
        self.expanded.borrow().contains(path)
    }

    /// A node is visible when every proper ancestor is expanded.
    /// Rendering descends only into expanded paths, so a collapsed
    /// parent hides (without clearing) the whole subtree.
    pub fn is_visible(&self, path: &NodePath) -> bool {
        let mut ancestor = path.parent();
        while let Some(current) = ancestor {
            if !self.is_expanded(&current) {
                return false;
            }
            ancestor = current.parent();
        }
        true
    }

    async fn fetch_children(&self, path: &NodePath) {
        match path {
            NodePath::Site(p) => {
                self.subjects_of(p).await;
            }
            NodePath::Subject(p) => {
                self.events_of(p).await;
            }
            NodePath::Event(p) => {
                self.procedures_of(p).await;
            }
            NodePath::Procedure(p) => {
                self.assets_of(p).await;
            }
        }
    }

    // ----- per-level reads ----------------------------------------------

    /// Subjects of a site, fetching if the entry is empty.
    pub async fn subjects_of(&self, path: &SitePath) -> CacheEntry<Subject> {
        self.subjects
            .get_or_fetch(path, || async move {
                self.source
                    .list_subjects(&path.site, 1, self.page_limit)
                    .await
                    .map(|page| page.items)
            })
            .await
    }

    pub async fn events_of(&self, path: &SubjectPath) -> CacheEntry<StudyEvent> {
        self.events
            .get_or_fetch(path, || async move {
                self.source
                    .list_events(&path.site, &path.subject, 1, self.page_limit)
                    .await
                    .map(|page| page.items)
            })
            .await
    }

    pub async fn procedures_of(&self, path: &EventPath) -> CacheEntry<ProcedureNode> {
        self.procedures
            .get_or_fetch(path, || async move {
                self.source
                    .list_procedures(&path.site, &path.subject, &path.event, 1, self.page_limit)
                    .await
                    .map(|page| page.items)
            })
            .await
    }

    pub async fn assets_of(&self, path: &ProcedurePath) -> CacheEntry<AssetSummary> {
        self.assets
            .get_or_fetch(path, || async move {
                self.source
                    .list_assets(
                        &path.site,
                        &path.subject,
                        &path.event,
                        &path.procedure,
                        1,
                        self.page_limit,
                    )
                    .await
                    .map(|page| page.items)
            })
            .await
    }

    /// Synchronous snapshots, for rendering without triggering fetches.
    pub fn subjects_entry(&self, path: &SitePath) -> CacheEntry<Subject> {
        self.subjects.entry(path)
    }

    pub fn events_entry(&self, path: &SubjectPath) -> CacheEntry<StudyEvent> {
        self.events.entry(path)
    }

    pub fn procedures_entry(&self, path: &EventPath) -> CacheEntry<ProcedureNode> {
        self.procedures.entry(path)
    }

    pub fn assets_entry(&self, path: &ProcedurePath) -> CacheEntry<AssetSummary> {
        self.assets.entry(path)
    }

    // ----- single-drill-down selection ----------------------------------

    pub fn selection(&self) -> Selection {
        self.selection.borrow().clone()
    }

    /// Drill into a site, replacing any previous drill-down below the
    /// root. Previously selected branches keep their caches; coming
    /// back to them is a cache hit.
    pub async fn select_site(&self, site: SiteId) -> CacheEntry<Subject> {
        {
            let mut selection = self.selection.borrow_mut();
            selection.site = Some(site.clone());
            selection.truncate_below(0);
        }
        self.subjects_of(&SitePath::new(site)).await
    }

    /// Drill into a subject of the selected site. `None` when no site
    /// is selected.
    pub async fn select_subject(&self, subject: SubjectId) -> Option<CacheEntry<StudyEvent>> {
        let path = {
            let mut selection = self.selection.borrow_mut();
            let site_path = selection.site_path()?;
            selection.subject = Some(subject.clone());
            selection.truncate_below(1);
            site_path.subject(subject)
        };
        Some(self.events_of(&path).await)
    }

    /// Drill into an event of the selected subject.
    pub async fn select_event(&self, event: EventId) -> Option<CacheEntry<ProcedureNode>> {
        let path = {
            let mut selection = self.selection.borrow_mut();
            let subject_path = selection.subject_path()?;
            selection.event = Some(event.clone());
            selection.truncate_below(2);
            subject_path.event(event)
        };
        Some(self.procedures_of(&path).await)
    }

    /// Drill into a procedure of the selected event.
    pub async fn select_procedure(
        &self,
        procedure: ProcedureId,
    ) -> Option<CacheEntry<AssetSummary>> {
        let path = {
            let mut selection = self.selection.borrow_mut();
            let event_path = selection.event_path()?;
            selection.procedure = Some(procedure.clone());
            selection.truncate_below(3);
            event_path.procedure(procedure)
        };
        Some(self.assets_of(&path).await)
    }

    /// Jump back to a breadcrumb level (0 = site). Selections strictly
    /// deeper are cleared; no cache entry is touched, so drilling back
    /// down is served from cache.
    pub fn navigate_breadcrumb(&self, level_index: usize) {
        self.selection.borrow_mut().truncate_below(level_index);
    }

    // ----- explicit refresh ---------------------------------------------

    pub fn invalidate_subjects(&self, path: &SitePath) -> bool {
        self.subjects.invalidate(path)
    }

    pub fn invalidate_events(&self, path: &SubjectPath) -> bool {
        self.events.invalidate(path)
    }

    pub fn invalidate_procedures(&self, path: &EventPath) -> bool {
        self.procedures.invalidate(path)
    }

    pub fn invalidate_assets(&self, path: &ProcedurePath) -> bool {
        self.assets.invalidate(path)
    }

    /// Session reset: drop every cache entry, all expansion bits and
    /// the selection.
    pub fn reset(&self) {
        self.subjects.clear();
        self.events.clear();
        self.procedures.clear();
        self.assets.clear();
        self.expanded.borrow_mut().clear();
        *self.selection.borrow_mut() = Selection::default();
    }
}
