//! Editor session: the context object threading workspace and persistence.
//!
//! The presentation layer never touches the workspace directly. It issues
//! [`Command`]s through [`Session::dispatch`] and reads projections
//! (snapshot, sidebar summaries, save-status labels) back out. Every
//! mutation that changes persisted shape schedules a debounced save.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;

use crate::codec::{self, CodecWarning, PendingFile, INLINE_CEILING};
use crate::error::{PromptError, Result};
use crate::format;
use crate::i18n;
use crate::model::Role;
use crate::persist::autosave::{SavePipeline, SaveStatus, SAVE_DELAY};
use crate::persist::{load_initial, StorageBackend};
use crate::workspace::Workspace;

/// A user intent forwarded from the presentation layer.
///
/// Deleting a group is unconditional here: the confirmation prompt is the
/// presentation layer's job.
#[derive(Debug)]
pub enum Command {
    /// Select a group (no-op when the id does not exist).
    SelectGroup { id: String },
    /// Create a new group and select it.
    CreateGroup,
    /// Delete a group (pre-confirmed by the caller).
    DeleteGroup { id: String },
    /// Rename a group.
    RenameGroup { id: String, title: String },
    /// Add a message; pending files pass through the attachment codec first.
    AddMessage {
        group_id: String,
        role: Role,
        content: String,
        files: Vec<PendingFile>,
    },
    /// Replace a message's content.
    EditMessage {
        group_id: String,
        message_id: String,
        content: String,
    },
    /// Delete a message.
    DeleteMessage {
        group_id: String,
        message_id: String,
    },
    /// Delete one attachment of a message.
    DeleteAttachment {
        group_id: String,
        message_id: String,
        attachment_id: String,
    },
}

/// Tuning knobs for a session. Defaults match the shipped behavior.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Debounce delay before a scheduled save fires.
    pub save_delay: Duration,
    /// Largest attachment stored inline.
    pub inline_ceiling: u64,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            save_delay: SAVE_DELAY,
            inline_ceiling: INLINE_CEILING,
        }
    }
}

/// Sidebar projection of one group for the presentation layer.
#[derive(Debug, Clone)]
pub struct GroupSummary {
    /// Group id.
    pub id: String,
    /// Title, or the localized "Untitled" placeholder.
    pub title: String,
    /// Whether this is the selected group.
    pub selected: bool,
    /// Number of messages in the group.
    pub message_count: usize,
    /// Relative last-activity label ("5 min ago").
    pub updated_label: String,
}

/// One editing session over the workspace singleton.
pub struct Session {
    workspace: Arc<Mutex<Workspace>>,
    pipeline: SavePipeline,
    inline_ceiling: u64,
}

impl Session {
    /// Load (or seed) the workspace from the backend with default options.
    pub fn load(backend: Arc<dyn StorageBackend>) -> Self {
        Self::load_with(backend, SessionOptions::default())
    }

    /// Load (or seed) the workspace from the backend.
    pub fn load_with(backend: Arc<dyn StorageBackend>, options: SessionOptions) -> Self {
        let workspace = load_initial(backend.as_ref());
        Self {
            workspace: Arc::new(Mutex::new(workspace)),
            pipeline: SavePipeline::new(backend, options.save_delay),
            inline_ceiling: options.inline_ceiling,
        }
    }

    /// Apply a command and schedule a save.
    ///
    /// The only suspension point is attachment encoding in `AddMessage`:
    /// the message is appended only after every file resolved, so the store
    /// never holds a half-encoded entry. Returns the codec's non-fatal
    /// warnings (empty for every other command).
    pub async fn dispatch(&mut self, command: Command) -> Result<Vec<CodecWarning>> {
        match command {
            Command::SelectGroup { id } => {
                if self.lock().select_group(&id) {
                    self.schedule();
                }
                Ok(Vec::new())
            }
            Command::CreateGroup => {
                self.lock().create_group();
                self.schedule();
                Ok(Vec::new())
            }
            Command::DeleteGroup { id } => {
                self.lock().delete_group(&id)?;
                self.schedule();
                Ok(Vec::new())
            }
            Command::RenameGroup { id, title } => {
                self.lock().rename_group(&id, &title)?;
                self.schedule();
                Ok(Vec::new())
            }
            Command::AddMessage {
                group_id,
                role,
                content,
                files,
            } => {
                // Reject empty submissions before doing any encoding work.
                if content.trim().is_empty() && files.is_empty() {
                    return Err(PromptError::EmptyMessage);
                }
                let (attachments, warnings) =
                    codec::encode_all(&files, self.inline_ceiling).await;
                self.lock().add_message(&group_id, role, &content, attachments)?;
                self.schedule();
                Ok(warnings)
            }
            Command::EditMessage {
                group_id,
                message_id,
                content,
            } => {
                self.lock()
                    .edit_message_content(&group_id, &message_id, &content)?;
                self.schedule();
                Ok(Vec::new())
            }
            Command::DeleteMessage {
                group_id,
                message_id,
            } => {
                self.lock().delete_message(&group_id, &message_id)?;
                self.schedule();
                Ok(Vec::new())
            }
            Command::DeleteAttachment {
                group_id,
                message_id,
                attachment_id,
            } => {
                self.lock()
                    .delete_attachment(&group_id, &message_id, &attachment_id)?;
                self.schedule();
                Ok(Vec::new())
            }
        }
    }

    /// Clone of the current workspace state.
    pub fn snapshot(&self) -> Workspace {
        self.lock().clone()
    }

    /// Sidebar projection: one summary per group, in display order.
    pub fn sidebar(&self) -> Vec<GroupSummary> {
        let now = Utc::now();
        let ws = self.lock();
        ws.groups
            .iter()
            .map(|group| GroupSummary {
                id: group.id.clone(),
                title: if group.title.is_empty() {
                    i18n::untitled_group().to_string()
                } else {
                    group.title.clone()
                },
                selected: ws.selected_group_id.as_deref() == Some(group.id.as_str()),
                message_count: group.messages.len(),
                updated_label: format::relative_time(group.updated_at, now),
            })
            .collect()
    }

    /// Current save status.
    pub fn save_status(&self) -> SaveStatus {
        self.pipeline.status()
    }

    /// Watch channel for save-status changes.
    pub fn status_watch(&self) -> watch::Receiver<SaveStatus> {
        self.pipeline.subscribe()
    }

    /// Localized save-indicator label for the current status.
    pub fn status_label(&self) -> String {
        match self.pipeline.status() {
            SaveStatus::Saving => i18n::save_saving().to_string(),
            SaveStatus::Error => i18n::save_error().to_string(),
            SaveStatus::Saved => match self.lock().last_saved_at {
                Some(ts) => format!(
                    "{} {}",
                    i18n::save_saved(),
                    format::relative_time(ts, Utc::now())
                ),
                None => i18n::save_saved().to_string(),
            },
        }
    }

    /// Localized "last saved" line for the current workspace.
    pub fn last_saved_label(&self) -> String {
        format::last_saved_label(self.lock().last_saved_at)
    }

    /// Cancel any pending debounce timer and persist immediately.
    ///
    /// Used before process exit and by tests; the scheduled pipeline is the
    /// normal path.
    pub fn flush(&mut self) -> SaveStatus {
        self.pipeline.flush_now(&self.workspace)
    }

    fn schedule(&mut self) {
        self.pipeline.schedule(Arc::clone(&self.workspace));
    }

    fn lock(&self) -> MutexGuard<'_, Workspace> {
        self.workspace
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
