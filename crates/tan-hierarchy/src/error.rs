//! Hierarchy fetch errors.
//!
//! Entries retain the error that put them in the `Errored` state, so
//! the type is `Clone` and carries owned data only.

use thiserror::Error;

/// Failure while loading one node's children.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HierarchyError {
    /// An ancestor id in the requested path does not belong to the
    /// claimed parent (or does not exist). The 404-equivalent.
    #[error("hierarchy path not found: {path}")]
    NotFound { path: String },

    /// The underlying loader failed (network, backend, decode).
    #[error("loader failed: {message}")]
    Loader { message: String },
}

impl HierarchyError {
    pub fn not_found(path: impl std::fmt::Display) -> Self {
        Self::NotFound {
            path: path.to_string(),
        }
    }

    pub fn loader(message: impl Into<String>) -> Self {
        Self::Loader {
            message: message.into(),
        }
    }
}
