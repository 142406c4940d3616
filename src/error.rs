//! Error types
//!
//! Nothing here is fatal to gameplay: callers log and carry on with
//! defaults, no sound, or no persistence.

use crate::engine::GameMode;

/// Rejected engine commands
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// `start_*` while a session is playing or paused
    #[error("a {mode} session is already in progress")]
    AlreadyPlaying { mode: GameMode },
}

/// Storage collaborator failures
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// No backing store (no window, storage disabled, private mode)
    #[error("storage unavailable")]
    Unavailable,

    /// Stored value could not be encoded or decoded
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Backend rejected the operation
    #[error("storage backend error: {0}")]
    Backend(String),
}
