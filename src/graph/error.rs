//! Fatal graph construction errors.
//!
//! Unresolved native ids are not errors; they are skipped while building.
//! The variants here are the cases where continuing would produce a graph
//! that is silently wrong.

use crate::stats::DatabaseId;

/// Errors that abort a graph build.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// A module reason type that the reason table does not classify.
    #[error("Unknown reason type '{reason_type}' on module #{module_id}; add it to the reason table")]
    UnknownReasonType {
        /// The unclassified reason type
        reason_type: String,
        /// Module carrying the reason
        module_id: DatabaseId,
    },

    /// A concatenated module entry that does not exist as a module row.
    #[error("Concatenated module '{identifier}' of module #{super_module_id} has no module row")]
    MissingConcatenatedModule {
        /// Identifier listed in the super-module's `modules`
        identifier: String,
        /// The super-module listing it
        super_module_id: DatabaseId,
    },
}

/// Result type alias for graph construction.
pub type GraphResult<T> = Result<T, GraphError>;
