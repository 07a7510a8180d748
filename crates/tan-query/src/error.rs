//! Query-layer errors.

use thiserror::Error;

/// Failure inside a storage port.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backend itself failed (connection, timeout, malformed row).
    #[error("storage backend error: {message}")]
    Backend { message: String },

    /// A predicate referenced a parameter position that is not in the
    /// compiled parameter list.
    #[error("parameter ${position} referenced by a predicate is missing")]
    MissingParameter { position: usize },

    /// A parameter was present but of the wrong kind for its predicate.
    #[error("parameter ${position} has the wrong type for its predicate")]
    ParameterType { position: usize },
}

impl StorageError {
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }
}

/// Failure while serving a query request.
#[derive(Debug, Error)]
pub enum QueryError {
    /// The filter specification failed validation; the store was never
    /// touched.
    #[error(transparent)]
    Validation(#[from] tan_filter::FilterError),

    /// Store access failed; no partial page is returned.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl QueryError {
    /// True for errors the endpoint maps to a 400 response.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}
