//! Vanish and persistence errors.

use std::path::PathBuf;

use thiserror::Error;

/// Failure of an operation that was rejected before any state changed.
#[derive(Debug, Error)]
pub enum VanishError {
    #[error("unknown vanish mode: {0}")]
    UnknownMode(String),

    #[error("unknown vanish group: {0}")]
    UnknownGroup(String),

    #[error("{player} lacks permission {permission}")]
    PermissionDenied { player: String, permission: String },

    #[error("player not found: {0}")]
    PlayerNotFound(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Failure reading or writing one of the data files.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("store unavailable: {0}")]
    Unavailable(String),
}
