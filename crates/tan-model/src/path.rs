//! Structural hierarchy-path keys.
//!
//! A node in the containment tree is addressed by the ordered tuple of
//! its ancestor ids. Paths are value types with derived `Eq + Hash`, so
//! they are stable, collision-free cache keys regardless of what
//! characters the underlying ids contain (joined-string keys would
//! collide whenever an id contains the separator).

use std::fmt;

use crate::ids::{EventId, ProcedureId, SiteId, SubjectId};

/// Depth of a node in the containment tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HierarchyLevel {
    Site,
    Subject,
    Event,
    Procedure,
}

impl HierarchyLevel {
    /// Zero-based depth, `Site` being 0.
    pub fn depth(self) -> usize {
        match self {
            Self::Site => 0,
            Self::Subject => 1,
            Self::Event => 2,
            Self::Procedure => 3,
        }
    }
}

/// Path to a site node: `(site)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SitePath {
    pub site: SiteId,
}

/// Path to a subject node: `(site, subject)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubjectPath {
    pub site: SiteId,
    pub subject: SubjectId,
}

/// Path to an event node: `(site, subject, event)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EventPath {
    pub site: SiteId,
    pub subject: SubjectId,
    pub event: EventId,
}

/// Path to a procedure node: `(site, subject, event, procedure)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProcedurePath {
    pub site: SiteId,
    pub subject: SubjectId,
    pub event: EventId,
    pub procedure: ProcedureId,
}

impl SitePath {
    pub fn new(site: impl Into<SiteId>) -> Self {
        Self { site: site.into() }
    }

    pub fn subject(&self, subject: impl Into<SubjectId>) -> SubjectPath {
        SubjectPath {
            site: self.site.clone(),
            subject: subject.into(),
        }
    }
}

impl SubjectPath {
    pub fn event(&self, event: impl Into<EventId>) -> EventPath {
        EventPath {
            site: self.site.clone(),
            subject: self.subject.clone(),
            event: event.into(),
        }
    }

    pub fn parent(&self) -> SitePath {
        SitePath {
            site: self.site.clone(),
        }
    }
}

impl EventPath {
    pub fn procedure(&self, procedure: impl Into<ProcedureId>) -> ProcedurePath {
        ProcedurePath {
            site: self.site.clone(),
            subject: self.subject.clone(),
            event: self.event.clone(),
            procedure: procedure.into(),
        }
    }

    pub fn parent(&self) -> SubjectPath {
        SubjectPath {
            site: self.site.clone(),
            subject: self.subject.clone(),
        }
    }
}

impl ProcedurePath {
    pub fn parent(&self) -> EventPath {
        EventPath {
            site: self.site.clone(),
            subject: self.subject.clone(),
            event: self.event.clone(),
        }
    }
}

/// Any node path, unified for the expanded-set and rendering layers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NodePath {
    Site(SitePath),
    Subject(SubjectPath),
    Event(EventPath),
    Procedure(ProcedurePath),
}

impl NodePath {
    pub fn level(&self) -> HierarchyLevel {
        match self {
            Self::Site(_) => HierarchyLevel::Site,
            Self::Subject(_) => HierarchyLevel::Subject,
            Self::Event(_) => HierarchyLevel::Event,
            Self::Procedure(_) => HierarchyLevel::Procedure,
        }
    }

    /// Path of the parent node, `None` at the site level.
    pub fn parent(&self) -> Option<NodePath> {
        match self {
            Self::Site(_) => None,
            Self::Subject(p) => Some(Self::Site(p.parent())),
            Self::Event(p) => Some(Self::Subject(p.parent())),
            Self::Procedure(p) => Some(Self::Event(p.parent())),
        }
    }

    /// True if `self` is `other` or lies underneath it.
    pub fn starts_with(&self, other: &NodePath) -> bool {
        if self == other {
            return true;
        }
        match self.parent() {
            Some(parent) => parent.starts_with(other),
            None => false,
        }
    }
}

impl From<SitePath> for NodePath {
    fn from(path: SitePath) -> Self {
        Self::Site(path)
    }
}

impl From<SubjectPath> for NodePath {
    fn from(path: SubjectPath) -> Self {
        Self::Subject(path)
    }
}

impl From<EventPath> for NodePath {
    fn from(path: EventPath) -> Self {
        Self::Event(path)
    }
}

impl From<ProcedurePath> for NodePath {
    fn from(path: ProcedurePath) -> Self {
        Self::Procedure(path)
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Site(p) => write!(f, "site {}", p.site),
            Self::Subject(p) => write!(f, "site {} / subject {}", p.site, p.subject),
            Self::Event(p) => {
                write!(f, "site {} / subject {} / event {}", p.site, p.subject, p.event)
            }
            Self::Procedure(p) => write!(
                f,
                "site {} / subject {} / event {} / procedure {}",
                p.site, p.subject, p.event, p.procedure
            ),
        }
    }
}
