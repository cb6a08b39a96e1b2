//! Integration tests for the session, save pipeline and durable record.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use promptshell::codec::{FileData, PendingFile};
use promptshell::error::{PromptError, Result};
use promptshell::model::Role;
use promptshell::persist::autosave::SaveStatus;
use promptshell::persist::{FileStorage, StorageBackend};
use promptshell::session::{Command, Session, SessionOptions};

/// Records every stored payload; starts empty.
#[derive(Default)]
struct CountingBackend {
    writes: Mutex<Vec<String>>,
}

impl CountingBackend {
    fn write_count(&self) -> usize {
        self.writes.lock().unwrap().len()
    }

    fn last_write(&self) -> Option<String> {
        self.writes.lock().unwrap().last().cloned()
    }
}

impl StorageBackend for CountingBackend {
    fn load(&self) -> Result<Option<String>> {
        Ok(None)
    }
    fn store(&self, payload: &str) -> Result<()> {
        self.writes.lock().unwrap().push(payload.to_string());
        Ok(())
    }
}

/// Pre-seeded read-only record.
struct PresetBackend(String);

impl StorageBackend for PresetBackend {
    fn load(&self) -> Result<Option<String>> {
        Ok(Some(self.0.clone()))
    }
    fn store(&self, _payload: &str) -> Result<()> {
        Ok(())
    }
}

/// Every write fails, as if the storage quota were exceeded.
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

fn session_with(backend: Arc<dyn StorageBackend>) -> Session {
    Session::load_with(backend, SessionOptions::default())
}

// ─── Test 1: Fresh load with no stored data seeds 3 groups ──────────

#[tokio::test]
async fn test_fresh_load_seeds_defaults() {
    let session = session_with(Arc::new(CountingBackend::default()));
    let snapshot = session.snapshot();
    assert_eq!(snapshot.groups.len(), 3);
    assert_eq!(
        snapshot.selected_group_id.as_deref(),
        Some(snapshot.groups[0].id.as_str())
    );
    assert!(snapshot.last_saved_at.is_none());
    assert_eq!(session.save_status(), SaveStatus::Saved);
}

// ─── Test 2: N schedules within the window → one persist ────────────

#[tokio::test(start_paused = true)]
async fn test_debounce_coalesces_to_single_write() {
    let backend = Arc::new(CountingBackend::default());
    let mut session = session_with(backend.clone());
    let group_id = session.snapshot().groups[0].id.clone();

    for i in 0..5 {
        session
            .dispatch(Command::RenameGroup {
                id: group_id.clone(),
                title: format!("title {i}"),
            })
            .await
            .unwrap();
    }
    assert_eq!(session.save_status(), SaveStatus::Saving);
    assert_eq!(backend.write_count(), 0);

    // 300 ms in: still inside the debounce window, nothing written.
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(backend.write_count(), 0);

    // Another mutation restarts the window.
    session
        .dispatch(Command::RenameGroup {
            id: group_id.clone(),
            title: "final".into(),
        })
        .await
        .unwrap();

    // 500 ms after the restart: the original timer would have fired by now
    // had it not been replaced.
    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(backend.write_count(), 0);

    // Past 700 ms after the last call: exactly one write.
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(backend.write_count(), 1);
    assert_eq!(session.save_status(), SaveStatus::Saved);

    let record: serde_json::Value =
        serde_json::from_str(&backend.last_write().unwrap()).unwrap();
    assert_eq!(record["groups"][0]["title"], "final");
}

// ─── Test 3: Persisted record contents after add ────────────────────

#[tokio::test(start_paused = true)]
async fn test_persisted_record_contains_message() {
    let backend = Arc::new(CountingBackend::default());
    let mut session = session_with(backend.clone());
    let group_id = session.snapshot().groups[0].id.clone();
    let before = chrono::Utc::now();

    session
        .dispatch(Command::AddMessage {
            group_id: group_id.clone(),
            role: Role::User,
            content: "hello".into(),
            files: Vec::new(),
        })
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_millis(800)).await;
    assert_eq!(backend.write_count(), 1);

    let record: serde_json::Value =
        serde_json::from_str(&backend.last_write().unwrap()).unwrap();
    let group = record["groups"]
        .as_array()
        .unwrap()
        .iter()
        .find(|g| g["id"] == group_id.as_str())
        .unwrap();
    let message = group["messages"].as_array().unwrap().last().unwrap();
    assert_eq!(message["content"], "hello");
    assert_eq!(message["role"], "user");

    let saved_at = record["lastSavedAt"].as_str().unwrap();
    let saved_at = chrono::DateTime::parse_from_rfc3339(saved_at).unwrap();
    assert!(saved_at >= before);
    assert_eq!(session.snapshot().last_saved_at, Some(saved_at.to_utc()));
}

// ─── Test 4: Storage failure → error status, memory authoritative ───

#[tokio::test(start_paused = true)]
async fn test_storage_failure_keeps_memory_usable() {
    let mut session = session_with(Arc::new(FailingBackend));
    let group_id = session.snapshot().groups[0].id.clone();

    session
        .dispatch(Command::AddMessage {
            group_id: group_id.clone(),
            role: Role::User,
            content: "first".into(),
            files: Vec::new(),
        })
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(800)).await;
    assert_eq!(session.save_status(), SaveStatus::Error);
    assert!(session.snapshot().last_saved_at.is_none());

    // The in-memory workspace is unaffected and still accepts mutations.
    session
        .dispatch(Command::AddMessage {
            group_id: group_id.clone(),
            role: Role::Assistant,
            content: "second".into(),
            files: Vec::new(),
        })
        .await
        .unwrap();
    let snapshot = session.snapshot();
    let group = snapshot.group(&group_id).unwrap();
    assert!(group.messages.iter().any(|m| m.content == "first"));
    assert!(group.messages.iter().any(|m| m.content == "second"));
}

// ─── Test 5: Empty submission rejected, nothing scheduled ───────────

#[tokio::test]
async fn test_empty_submission_is_rejected() {
    let backend = Arc::new(CountingBackend::default());
    let mut session = session_with(backend.clone());
    let group_id = session.snapshot().groups[0].id.clone();
    let before = session.snapshot().group(&group_id).unwrap().clone();

    let err = session
        .dispatch(Command::AddMessage {
            group_id: group_id.clone(),
            role: Role::User,
            content: "   ".into(),
            files: Vec::new(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, PromptError::EmptyMessage));

    let after = session.snapshot().group(&group_id).unwrap().clone();
    assert_eq!(after.messages.len(), before.messages.len());
    assert_eq!(after.updated_at, before.updated_at);
    assert_eq!(session.save_status(), SaveStatus::Saved);
}

// ─── Test 6: Attachment read failure surfaces as warning ────────────

#[tokio::test]
async fn test_unreadable_attachment_downgrades_with_warning() {
    let mut session = session_with(Arc::new(CountingBackend::default()));
    let group_id = session.snapshot().groups[0].id.clone();

    let warnings = session
        .dispatch(Command::AddMessage {
            group_id: group_id.clone(),
            role: Role::User,
            content: String::new(),
            files: vec![PendingFile {
                name: "gone.txt".into(),
                mime_type: "text/plain".into(),
                size_bytes: 4,
                data: FileData::Path(PathBuf::from("/nonexistent/gone.txt")),
            }],
        })
        .await
        .unwrap();
    assert_eq!(warnings.len(), 1);

    let snapshot = session.snapshot();
    let message = snapshot.group(&group_id).unwrap().messages.last().unwrap();
    assert_eq!(message.attachments.len(), 1);
    assert!(!message.attachments[0].is_inline());
    assert_eq!(message.attachments[0].name, "gone.txt");
}

// ─── Test 7: Corrupt stored record falls back to defaults ───────────

#[tokio::test]
async fn test_corrupt_record_reseeds() {
    let session = session_with(Arc::new(PresetBackend("{{{ not json".into())));
    assert_eq!(session.snapshot().groups.len(), 3);
}

// ─── Test 8: Full round-trip through the file backend ───────────────

#[tokio::test]
async fn test_file_backend_roundtrip_across_sessions() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("workspace.json");

    let mut session = session_with(Arc::new(FileStorage::new(&path)));
    let group_id = session.snapshot().groups[1].id.clone();
    session
        .dispatch(Command::AddMessage {
            group_id: group_id.clone(),
            role: Role::User,
            content: "persisted across sessions".into(),
            files: vec![PendingFile::from_bytes(
                "note.txt",
                "text/plain",
                b"inline bytes".to_vec(),
            )],
        })
        .await
        .unwrap();
    session
        .dispatch(Command::SelectGroup {
            id: group_id.clone(),
        })
        .await
        .unwrap();
    assert_eq!(session.flush(), SaveStatus::Saved);

    let reloaded = session_with(Arc::new(FileStorage::new(&path)));
    let snapshot = reloaded.snapshot();
    assert_eq!(snapshot.selected_group_id.as_deref(), Some(group_id.as_str()));
    assert!(snapshot.last_saved_at.is_some());

    let message = snapshot
        .group(&group_id)
        .unwrap()
        .messages
        .iter()
        .find(|m| m.content == "persisted across sessions")
        .unwrap();
    assert_eq!(
        message.attachments[0].inline_bytes().as_deref(),
        Some(b"inline bytes".as_slice())
    );
}

// ─── Test 9: Status watch observes the saving → saved transition ────

#[tokio::test(start_paused = true)]
async fn test_status_watch_signals_transitions() {
    let mut session = session_with(Arc::new(CountingBackend::default()));
    let mut watch = session.status_watch();
    assert_eq!(*watch.borrow(), SaveStatus::Saved);

    session.dispatch(Command::CreateGroup).await.unwrap();
    watch.changed().await.unwrap();
    assert_eq!(*watch.borrow(), SaveStatus::Saving);

    tokio::time::sleep(Duration::from_millis(800)).await;
    assert_eq!(*watch.borrow(), SaveStatus::Saved);
}
