//! Filter compilation errors.

use thiserror::Error;

/// Validation failure while compiling a filter specification.
///
/// Compilation is all-or-nothing: any of these means no query was
/// produced and the store was never touched.
#[derive(Debug, Error)]
pub enum FilterError {
    /// `libraries` was non-empty while the view mode restricts the
    /// population to site-owned assets. The two filters are mutually
    /// exclusive by construction and are never silently merged.
    #[error("library filter is not valid in the sites view mode")]
    LibrariesOutsideLibraryMode,

    /// A date-range bound was not a valid `YYYY-MM-DD` date.
    #[error("malformed {field} date: {value:?}")]
    MalformedDate {
        field: &'static str,
        value: String,
        #[source]
        source: chrono::ParseError,
    },
}
