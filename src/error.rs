//! Centralized error types for promptshell.

use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the promptshell library.
#[derive(Error, Debug)]
pub enum PromptError {
    /// Durable storage could not be read or written.
    #[error("Storage error at '{path}': {source}")]
    Storage {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The stored workspace record is corrupt or has an unexpected shape.
    ///
    /// Never fatal: the loader recovers by falling back to seeded defaults.
    #[error("Corrupt stored workspace: {0}")]
    CorruptState(String),

    /// The workspace record could not be serialized.
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// An attachment file could not be read.
    ///
    /// Recovered per-attachment by downgrading to reference-only storage.
    #[error("Could not read attachment '{name}': {source}")]
    AttachmentRead {
        name: String,
        source: std::io::Error,
    },

    /// A message was submitted with no content and no attachments.
    #[error("Message has no content and no attachments")]
    EmptyMessage,

    /// No group with the given id exists in the workspace.
    #[error("Group not found: {0}")]
    GroupNotFound(String),

    /// No message with the given id exists in the group.
    #[error("Message not found in group '{group_id}': {message_id}")]
    MessageNotFound {
        group_id: String,
        message_id: String,
    },

    /// No attachment with the given id exists in the message.
    #[error("Attachment not found in message '{message_id}': {attachment_id}")]
    AttachmentNotFound {
        message_id: String,
        attachment_id: String,
    },
}

/// Convenience alias for `Result<T, PromptError>`.
pub type Result<T> = std::result::Result<T, PromptError>;

impl PromptError {
    /// Create a `Storage` variant from a path and an `io::Error`.
    pub fn storage(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Storage {
            path: path.into(),
            source,
        }
    }
}
