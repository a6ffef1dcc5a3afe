//! Error types for the canvas engine and its external collaborators.
//!
//! Rejected input (dragging a pinned object, interacting before the container
//! is measured) is not an error; those calls are silent no-ops. Everything
//! here is recoverable: the caller keeps its edit session and can retry.

use crate::context::ViewContext;

/// A flat position row that does not describe a valid scope.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecordError {
    #[error("{context} position requires {field}")]
    MissingQualifier { context: ViewContext, field: &'static str },

    #[error("{context} position must not carry {field}")]
    UnexpectedQualifier { context: ViewContext, field: &'static str },
}

/// Failure reported by a position store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The store could not be reached.
    #[error("position store unavailable: {0}")]
    Unavailable(String),

    /// The store refused the payload (validation, permissions).
    #[error("position store rejected save: {0}")]
    Rejected(String),
}

/// Failure reported by the entity data provider.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    #[error("entity provider fetch failed: {0}")]
    Fetch(String),
}

/// Failure of a commit (merge + save) or of a save-then-switch.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommitError {
    #[error("edit mode is not active")]
    NotEditing,

    #[error("no view is loaded")]
    NoView,

    #[error("a save is already in flight")]
    SaveInFlight,

    #[error("save ticket {0} is not the save in flight")]
    StaleTicket(u64),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Failure of an engine lifecycle call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("edit mode is not active")]
    NotEditing,

    #[error("unsaved position edits would be lost")]
    UnsavedEdits,

    #[error("a save is in flight")]
    SaveInFlight,
}
