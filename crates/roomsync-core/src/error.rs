//! Error types for the Roomsync crates.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for the Roomsync workspace.
///
/// This provides typed, structured error variants with automatic conversion
/// from common error types via the `From` trait.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum RoomsyncError {
    /// A session record could not be decoded or is structurally invalid
    #[error("Malformed record: {0}")]
    MalformedRecord(String),

    /// A pull request to the record service failed
    #[error("Fetch error: {message}")]
    Fetch {
        message: String,
        code: Option<u16>,
    },

    /// Both the delta catch-up and the full-record fallback failed;
    /// the session can no longer be kept in sync
    #[error("Sync failed: {0}")]
    SyncFailed(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl RoomsyncError {
    /// Creates a MalformedRecord error
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedRecord(message.into())
    }

    /// Creates a Fetch error
    pub fn fetch(message: impl Into<String>, code: Option<u16>) -> Self {
        Self::Fetch {
            message: message.into(),
            code,
        }
    }

    /// Creates a SyncFailed error
    pub fn sync_failed(message: impl Into<String>) -> Self {
        Self::SyncFailed(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Check if this is a Fetch error
    pub fn is_fetch(&self) -> bool {
        matches!(self, Self::Fetch { .. })
    }

    /// Check if this is a SyncFailed error
    pub fn is_sync_failed(&self) -> bool {
        matches!(self, Self::SyncFailed(_))
    }

    /// The transport status code attached to this error, if any.
    pub fn code(&self) -> Option<u16> {
        match self {
            Self::Fetch { code, .. } => *code,
            _ => None,
        }
    }
}

impl From<serde_json::Error> for RoomsyncError {
    fn from(err: serde_json::Error) -> Self {
        Self::MalformedRecord(err.to_string())
    }
}

/// Conversion from anyhow::Error (transitional, used at outer seams)
impl From<anyhow::Error> for RoomsyncError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// A type alias for `Result<T, RoomsyncError>`.
pub type Result<T> = std::result::Result<T, RoomsyncError>;
