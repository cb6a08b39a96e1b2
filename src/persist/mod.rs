//! Durable storage for the workspace record.
//!
//! The whole workspace persists as one JSON document
//! `{groups, selectedGroupId, lastSavedAt}` under a single fixed location.
//! Loading never fails: an absent, corrupt or wrong-shaped record falls back
//! to the seeded default workspace.

pub mod autosave;

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{PromptError, Result};
use crate::normalize::normalize_group;
use crate::workspace::Workspace;

/// File name of the single durable record, namespaced by the app directory.
pub const STORAGE_FILE: &str = "workspace.json";

/// Abstraction over the durable store holding the single workspace record.
///
/// The file-backed implementation is the real one; tests substitute
/// counting or failing backends.
pub trait StorageBackend: Send + Sync {
    /// Read the stored record. `Ok(None)` when no record exists yet.
    fn load(&self) -> Result<Option<String>>;

    /// Durably replace the stored record.
    fn store(&self, payload: &str) -> Result<()>;
}

/// Stores the record as a JSON file on disk.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    /// Create a backend writing to the given file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the record file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StorageBackend for FileStorage {
    fn load(&self) -> Result<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }
        std::fs::read_to_string(&self.path)
            .map(Some)
            .map_err(|e| PromptError::storage(&self.path, e))
    }

    fn store(&self, payload: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| PromptError::storage(parent, e))?;
        }
        std::fs::write(&self.path, payload).map_err(|e| PromptError::storage(&self.path, e))
    }
}

/// Wire shape of the durable record.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StoredState<'a> {
    groups: &'a [crate::model::Group],
    selected_group_id: &'a Option<String>,
    last_saved_at: Option<DateTime<Utc>>,
}

/// Serialize the workspace and write it to the backend.
///
/// `saved_at` becomes the record's `lastSavedAt`; the caller updates the
/// in-memory workspace only after the write succeeds.
pub fn write_record(
    backend: &dyn StorageBackend,
    workspace: &Workspace,
    saved_at: DateTime<Utc>,
) -> Result<()> {
    let record = StoredState {
        groups: &workspace.groups,
        selected_group_id: &workspace.selected_group_id,
        last_saved_at: Some(saved_at),
    };
    let payload = serde_json::to_string(&record)?;
    backend.store(&payload)
}

/// Load the initial workspace from the backend. Never fails.
///
/// Any error (unreadable record, parse failure, `groups` not array-shaped)
/// is treated as "no stored data" and yields the seeded default workspace.
/// Stored groups pass through the normalizer; a selected id that no longer
/// references an existing group falls back to the first group.
pub fn load_initial(backend: &dyn StorageBackend) -> Workspace {
    let stored = match backend.load() {
        Ok(Some(stored)) => stored,
        Ok(None) => {
            debug!("No stored workspace, seeding defaults");
            return Workspace::with_defaults();
        }
        Err(e) => {
            warn!(error = %e, "Could not read stored workspace, seeding defaults");
            return Workspace::with_defaults();
        }
    };

    let parsed: Value = match serde_json::from_str(&stored) {
        Ok(value) => value,
        Err(e) => {
            warn!(error = %PromptError::CorruptState(e.to_string()), "Discarding stored workspace");
            return Workspace::with_defaults();
        }
    };

    let Some(groups_raw) = parsed.get("groups").and_then(Value::as_array) else {
        warn!("Stored workspace has no group list, seeding defaults");
        return Workspace::with_defaults();
    };

    let groups: Vec<_> = groups_raw.iter().map(normalize_group).collect();

    let stored_selection = parsed
        .get("selectedGroupId")
        .and_then(Value::as_str)
        .filter(|id| groups.iter().any(|g| g.id == *id))
        .map(str::to_string);
    let selected_group_id = stored_selection.or_else(|| groups.first().map(|g| g.id.clone()));

    let last_saved_at = parsed
        .get("lastSavedAt")
        .and_then(Value::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc));

    Workspace {
        groups,
        selected_group_id,
        last_saved_at,
    }
}
