//! Hierarchy fixture loaded from a JSON tree.
//!
//! `browse` runs against a file shaped like the real containment tree:
//! sites holding subjects holding events holding procedures holding
//! assets. The fixture implements [`HierarchySource`] with the same
//! path-integrity rule a live backend enforces: an ancestor id that
//! does not belong to its claimed parent resolves to `NotFound`.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::Deserialize;
use tan_hierarchy::{HierarchyError, HierarchySource};
use tan_model::{
    AssetId, AssetSummary, EventId, Page, ProcedureId, ProcedureNode, Site, SiteId, StudyEvent,
    Subject, SubjectId,
};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HierarchyFixture {
    #[serde(default)]
    pub sites: Vec<SiteFixture>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteFixture {
    pub id: SiteId,
    pub name: String,
    #[serde(default)]
    pub country_name: String,
    #[serde(default)]
    pub subjects: Vec<SubjectFixture>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectFixture {
    pub id: SubjectId,
    pub number: String,
    #[serde(default)]
    pub study_arm: String,
    #[serde(default)]
    pub events: Vec<EventFixture>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventFixture {
    pub id: EventId,
    pub name: String,
    #[serde(default)]
    pub date: Option<chrono::NaiveDate>,
    #[serde(default)]
    pub procedures: Vec<ProcedureFixture>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcedureFixture {
    pub id: ProcedureId,
    pub name: String,
    #[serde(default)]
    pub date: Option<chrono::NaiveDate>,
    #[serde(default)]
    pub assets: Vec<AssetFixture>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetFixture {
    pub id: AssetId,
    pub title: String,
    #[serde(default)]
    pub uploaded_at: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default)]
    pub reviewed: bool,
}

impl HierarchyFixture {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let file = File::open(path)
            .map_err(|e| anyhow::anyhow!("cannot open {}: {e}", path.display()))?;
        let fixture = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| anyhow::anyhow!("invalid hierarchy fixture {}: {e}", path.display()))?;
        Ok(fixture)
    }

    /// Top-level site listing (the one level not served through a cache).
    pub fn site_nodes(&self) -> Vec<Site> {
        self.sites
            .iter()
            .map(|s| Site {
                id: s.id.clone(),
                name: s.name.clone(),
                country_name: s.country_name.clone(),
                subject_count: s.subjects.len() as u64,
            })
            .collect()
    }

    fn site(&self, site: &SiteId) -> Result<&SiteFixture, HierarchyError> {
        self.sites
            .iter()
            .find(|s| &s.id == site)
            .ok_or_else(|| HierarchyError::not_found(site))
    }

    fn subject(
        &self,
        site: &SiteId,
        subject: &SubjectId,
    ) -> Result<&SubjectFixture, HierarchyError> {
        self.site(site)?
            .subjects
            .iter()
            .find(|s| &s.id == subject)
            .ok_or_else(|| HierarchyError::not_found(format!("{site}/{subject}")))
    }

    fn event(
        &self,
        site: &SiteId,
        subject: &SubjectId,
        event: &EventId,
    ) -> Result<&EventFixture, HierarchyError> {
        self.subject(site, subject)?
            .events
            .iter()
            .find(|e| &e.id == event)
            .ok_or_else(|| HierarchyError::not_found(format!("{site}/{subject}/{event}")))
    }

    fn procedure(
        &self,
        site: &SiteId,
        subject: &SubjectId,
        event: &EventId,
        procedure: &ProcedureId,
    ) -> Result<&ProcedureFixture, HierarchyError> {
        self.event(site, subject, event)?
            .procedures
            .iter()
            .find(|p| &p.id == procedure)
            .ok_or_else(|| {
                HierarchyError::not_found(format!("{site}/{subject}/{event}/{procedure}"))
            })
    }
}

/// Slice one page out of a full child listing.
fn paged<T>(items: Vec<T>, page: i64, limit: i64) -> Page<T> {
    let total = items.len() as u64;
    let offset = (page.max(1) - 1).saturating_mul(limit.max(0)) as usize;
    let items = items
        .into_iter()
        .skip(offset)
        .take(limit.max(0) as usize)
        .collect();
    Page::new(items, page.max(1), limit, total)
}

impl HierarchySource for HierarchyFixture {
    async fn list_subjects(
        &self,
        site: &SiteId,
        page: i64,
        limit: i64,
    ) -> Result<Page<Subject>, HierarchyError> {
        let subjects = self
            .site(site)?
            .subjects
            .iter()
            .map(|s| Subject {
                id: s.id.clone(),
                number: s.number.clone(),
                study_arm: s.study_arm.clone(),
                event_count: s.events.len() as u64,
            })
            .collect();
        Ok(paged(subjects, page, limit))
    }

    async fn list_events(
        &self,
        site: &SiteId,
        subject: &SubjectId,
        page: i64,
        limit: i64,
    ) -> Result<Page<StudyEvent>, HierarchyError> {
        let events = self
            .subject(site, subject)?
            .events
            .iter()
            .map(|e| StudyEvent {
                id: e.id.clone(),
                name: e.name.clone(),
                date: e.date,
                procedure_count: e.procedures.len() as u64,
            })
            .collect();
        Ok(paged(events, page, limit))
    }

    async fn list_procedures(
        &self,
        site: &SiteId,
        subject: &SubjectId,
        event: &EventId,
        page: i64,
        limit: i64,
    ) -> Result<Page<ProcedureNode>, HierarchyError> {
        let procedures = self
            .event(site, subject, event)?
            .procedures
            .iter()
            .map(|p| ProcedureNode {
                id: p.id.clone(),
                name: p.name.clone(),
                date: p.date,
                asset_count: p.assets.len() as u64,
            })
            .collect();
        Ok(paged(procedures, page, limit))
    }

    async fn list_assets(
        &self,
        site: &SiteId,
        subject: &SubjectId,
        event: &EventId,
        procedure: &ProcedureId,
        page: i64,
        limit: i64,
    ) -> Result<Page<AssetSummary>, HierarchyError> {
        let assets = self
            .procedure(site, subject, event, procedure)?
            .assets
            .iter()
            .map(|a| AssetSummary {
                id: a.id.clone(),
                title: a.title.clone(),
                uploaded_at: a.uploaded_at,
                reviewed: a.reviewed,
            })
            .collect();
        Ok(paged(assets, page, limit))
    }
}
