//! Error types for playback management
//!
//! Controller commands are total and never fail. These errors only come out
//! of the ports around the controller: configuration, persistence and the
//! catalog.

use cadence_core::CoreError;
use thiserror::Error;

/// Playback errors
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// Configuration rejected by `PlayerConfig::validate`
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Key-value store failure
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Catalog collaborator failure
    #[error("Catalog error: {0}")]
    Catalog(#[from] CoreError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Snapshot encoding error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
