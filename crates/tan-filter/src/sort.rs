//! Sort-field resolution.
//!
//! `sortBy` values come from the wire and are resolved through a fixed
//! allow-list; anything unknown (or empty) falls back to the default
//! upload-timestamp column instead of erroring. A compiled sort always
//! carries a stable tiebreak so result order is deterministic across
//! pages.

use tan_model::SortOrder;

/// Storage columns a query may be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortColumn {
    /// Upload/creation timestamp - the default.
    CreatedAt,
    Filename,
    TrialName,
    SiteName,
    CountryName,
    SubjectNumber,
    StudyArmName,
    EventName,
    ProcedureName,
    ProcedureDate,
    FileSizeBytes,
    DurationSeconds,
    UploadedBy,
}

impl SortColumn {
    /// Resolve a wire-level field name. Unknown or empty input resolves
    /// to [`SortColumn::CreatedAt`].
    pub fn resolve(sort_by: &str) -> Self {
        match sort_by.trim() {
            "uploadDate" | "createdAt" => Self::CreatedAt,
            "filename" | "title" => Self::Filename,
            "trialName" => Self::TrialName,
            "siteName" => Self::SiteName,
            "countryName" => Self::CountryName,
            "subjectNumber" => Self::SubjectNumber,
            "studyArmName" => Self::StudyArmName,
            "eventName" => Self::EventName,
            "procedureName" => Self::ProcedureName,
            "procedureDate" => Self::ProcedureDate,
            "fileSize" => Self::FileSizeBytes,
            "duration" => Self::DurationSeconds,
            "uploadedBy" => Self::UploadedBy,
            _ => Self::CreatedAt,
        }
    }

    /// Storage column name, for SQL rendering.
    pub fn column_name(self) -> &'static str {
        match self {
            Self::CreatedAt => "created_at",
            Self::Filename => "filename",
            Self::TrialName => "trial_name",
            Self::SiteName => "site_name",
            Self::CountryName => "country_name",
            Self::SubjectNumber => "subject_number",
            Self::StudyArmName => "study_arm_name",
            Self::EventName => "event_name",
            Self::ProcedureName => "procedure_name",
            Self::ProcedureDate => "procedure_date",
            Self::FileSizeBytes => "file_size_bytes",
            Self::DurationSeconds => "duration_seconds",
            Self::UploadedBy => "uploaded_by",
        }
    }
}

/// Fully resolved sort: column plus direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortKey {
    pub column: SortColumn,
    pub order: SortOrder,
}

impl SortKey {
    pub fn resolve(sort_by: &str, order: SortOrder) -> Self {
        Self {
            column: SortColumn::resolve(sort_by),
            order,
        }
    }
}
