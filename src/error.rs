//! Error types
//!
//! Nothing in the core is fatal. Collaborator failures are collected and
//! handed back to the host; tuning errors only happen at load time.

use thiserror::Error;

use crate::sim::EntityHandle;

/// A host collaborator (scene, HUD, audio) failed to handle an event.
///
/// Core state is already final when these are produced, so the session
/// keeps running and the host decides how loudly to report them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CollaboratorError {
    #[error("scene failed to add {handle}: {reason}")]
    SceneAdd { handle: EntityHandle, reason: String },

    #[error("scene failed to remove {handle}: {reason}")]
    SceneRemove { handle: EntityHandle, reason: String },

    #[error("notifier failed on {event}: {reason}")]
    Notifier { event: &'static str, reason: String },
}

/// Invalid gameplay tuning
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("failed to parse tuning JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("tuning value `{field}` out of range: {value}")]
    OutOfRange { field: &'static str, value: f64 },
}
