//! Debounced save pipeline.
//!
//! Mutations schedule a save instead of writing immediately; a burst of
//! edits coalesces into a single write that fires after a quiet period.
//! The tri-state save status is published over a watch channel so the
//! presentation layer can render an indicator.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error};

use super::{write_record, StorageBackend};
use crate::workspace::Workspace;

/// Quiet period before a scheduled save fires.
pub const SAVE_DELAY: Duration = Duration::from_millis(700);

/// Save status shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveStatus {
    /// A save is scheduled or in flight.
    Saving,
    /// The last write succeeded (also the initial state).
    Saved,
    /// The last write failed; the in-memory workspace stays authoritative.
    /// No automatic retry: the next mutation schedules a new attempt.
    Error,
}

/// Schedules, coalesces and executes writes of the workspace record.
///
/// Only one debounce timer is live at a time: scheduling replaces any
/// not-yet-fired timer.
pub struct SavePipeline {
    backend: Arc<dyn StorageBackend>,
    delay: Duration,
    status_tx: watch::Sender<SaveStatus>,
    pending: Option<JoinHandle<()>>,
}

impl SavePipeline {
    /// Create a pipeline over the given backend.
    pub fn new(backend: Arc<dyn StorageBackend>, delay: Duration) -> Self {
        let (status_tx, _) = watch::channel(SaveStatus::Saved);
        Self {
            backend,
            delay,
            status_tx,
            pending: None,
        }
    }

    /// Current save status.
    pub fn status(&self) -> SaveStatus {
        *self.status_tx.borrow()
    }

    /// Subscribe to save-status changes.
    pub fn subscribe(&self) -> watch::Receiver<SaveStatus> {
        self.status_tx.subscribe()
    }

    /// (Re)start the debounce timer. The status flips to `Saving` right
    /// away; the actual write happens once the timer fires without another
    /// `schedule` call replacing it.
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule(&mut self, workspace: Arc<Mutex<Workspace>>) {
        self.status_tx.send_replace(SaveStatus::Saving);
        if let Some(previous) = self.pending.take() {
            previous.abort();
        }
        let backend = Arc::clone(&self.backend);
        let status_tx = self.status_tx.clone();
        let delay = self.delay;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let status = flush(backend.as_ref(), &workspace);
            status_tx.send_replace(status);
        }));
    }

    /// Cancel any pending timer and persist immediately.
    pub fn flush_now(&mut self, workspace: &Mutex<Workspace>) -> SaveStatus {
        if let Some(previous) = self.pending.take() {
            previous.abort();
        }
        let status = flush(self.backend.as_ref(), workspace);
        self.status_tx.send_replace(status);
        status
    }
}

/// Serialize and write the workspace. All failures are converted into the
/// `Error` status here; nothing escapes this boundary.
fn flush(backend: &dyn StorageBackend, workspace: &Mutex<Workspace>) -> SaveStatus {
    let saved_at = Utc::now();
    let result = {
        let guard = lock(workspace);
        write_record(backend, &guard, saved_at)
    };
    match result {
        Ok(()) => {
            lock(workspace).last_saved_at = Some(saved_at);
            debug!(%saved_at, "Workspace persisted");
            SaveStatus::Saved
        }
        Err(e) => {
            error!(error = %e, "Could not persist workspace");
            SaveStatus::Error
        }
    }
}

fn lock(workspace: &Mutex<Workspace>) -> MutexGuard<'_, Workspace> {
    workspace.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{PromptError, Result};

    struct FailingBackend;

    impl StorageBackend for FailingBackend {
        fn load(&self) -> Result<Option<String>> {
            Ok(None)
        }
        fn store(&self, _payload: &str) -> Result<()> {
            Err(PromptError::storage(
                "/dev/full",
                std::io::Error::other("quota exceeded"),
            ))
        }
    }

    #[tokio::test]
    async fn test_flush_now_failure_sets_error_status() {
        let workspace = Mutex::new(Workspace::with_defaults());
        let mut pipeline = SavePipeline::new(Arc::new(FailingBackend), SAVE_DELAY);
        assert_eq!(pipeline.status(), SaveStatus::Saved);
        assert_eq!(pipeline.flush_now(&workspace), SaveStatus::Error);
        assert_eq!(pipeline.status(), SaveStatus::Error);
        // The in-memory workspace never saw a successful save.
        assert!(lock(&workspace).last_saved_at.is_none());
    }

    #[tokio::test]
    async fn test_schedule_flips_status_to_saving() {
        let workspace = Arc::new(Mutex::new(Workspace::with_defaults()));
        let mut pipeline = SavePipeline::new(Arc::new(FailingBackend), SAVE_DELAY);
        pipeline.schedule(Arc::clone(&workspace));
        assert_eq!(pipeline.status(), SaveStatus::Saving);
    }
}
