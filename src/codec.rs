//! Attachment codec.
//!
//! Decides whether a pending file is embedded inline in the persisted record
//! (as a base64 data URI) or kept as a reference-only entry, and performs the
//! read + encode. Read failures never fail the surrounding operation: the
//! attachment downgrades to reference-only and a warning is handed back on a
//! side channel.

use std::path::{Path, PathBuf};

use base64::Engine;
use tracing::warn;

use crate::error::{PromptError, Result};
use crate::i18n;
use crate::id::create_id;
use crate::model::Attachment;

/// Largest file size (in bytes) that is stored inline. 10 MiB.
pub const INLINE_CEILING: u64 = 10 * 1024 * 1024;

/// Where the bytes of a pending file come from.
#[derive(Debug, Clone)]
pub enum FileData {
    /// Read from disk at encode time.
    Path(PathBuf),
    /// Already in memory (tests, clipboard pastes).
    Bytes(Vec<u8>),
}

/// A user-selected file that has not yet passed through the codec.
#[derive(Debug, Clone)]
pub struct PendingFile {
    /// Filename shown to the user and persisted as attachment metadata.
    pub name: String,
    /// MIME content type; empty means unknown.
    pub mime_type: String,
    /// Size in bytes, as reported by the source.
    pub size_bytes: u64,
    /// Byte source.
    pub data: FileData,
}

impl PendingFile {
    /// Build a pending file from a path on disk.
    ///
    /// The size comes from file metadata; the MIME type is derived from the
    /// extension.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let meta = std::fs::metadata(path).map_err(|e| PromptError::AttachmentRead {
            name: name.clone(),
            source: e,
        })?;
        Ok(Self {
            mime_type: mime_for_extension(path).to_string(),
            size_bytes: meta.len(),
            data: FileData::Path(path.to_path_buf()),
            name,
        })
    }

    /// Build a pending file from in-memory bytes.
    pub fn from_bytes(
        name: impl Into<String>,
        mime_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            size_bytes: bytes.len() as u64,
            data: FileData::Bytes(bytes),
        }
    }
}

/// Non-fatal problem encountered while encoding an attachment.
#[derive(Debug, Clone)]
pub struct CodecWarning {
    /// Name of the affected file.
    pub file: String,
    /// Human-readable reason.
    pub reason: String,
}

/// Convert a pending file into a persistable [`Attachment`].
///
/// Files at or under `ceiling` bytes are read fully and embedded as a data
/// URI; larger files are never read and stay reference-only. A failed read
/// also downgrades to reference-only, reported through the returned warning.
pub async fn encode(file: &PendingFile, ceiling: u64) -> (Attachment, Option<CodecWarning>) {
    let mut warning = None;
    let mut inline_data = String::new();

    if file.size_bytes <= ceiling {
        match read_bytes(file).await {
            Ok(bytes) => inline_data = to_data_uri(&file.mime_type, &bytes),
            Err(e) => {
                warn!(file = %file.name, error = %e, "Attachment read failed, keeping reference only");
                warning = Some(CodecWarning {
                    file: file.name.clone(),
                    reason: format!("{}: {e}", i18n::warn_attachment_reference_only()),
                });
            }
        }
    } else if file.mime_type.starts_with("image/") {
        // Images lose their preview when oversized; worth telling the user.
        warn!(file = %file.name, size = file.size_bytes, "Image exceeds inline ceiling, keeping reference only");
        warning = Some(CodecWarning {
            file: file.name.clone(),
            reason: i18n::warn_attachment_reference_only().to_string(),
        });
    }

    let attachment = Attachment {
        id: create_id("att"),
        name: if file.name.is_empty() {
            i18n::attachment_fallback_name().to_string()
        } else {
            file.name.clone()
        },
        mime_type: if file.mime_type.is_empty() {
            "application/octet-stream".to_string()
        } else {
            file.mime_type.clone()
        },
        size_bytes: file.size_bytes,
        inline_data,
    };
    (attachment, warning)
}

/// Encode a batch of pending files independently.
///
/// A failure in one item never aborts its siblings: each file's own encode
/// decides its own fallback, and all warnings are collected.
pub async fn encode_all(
    files: &[PendingFile],
    ceiling: u64,
) -> (Vec<Attachment>, Vec<CodecWarning>) {
    let mut attachments = Vec::with_capacity(files.len());
    let mut warnings = Vec::new();
    for file in files {
        let (attachment, warning) = encode(file, ceiling).await;
        attachments.push(attachment);
        warnings.extend(warning);
    }
    (attachments, warnings)
}

async fn read_bytes(file: &PendingFile) -> std::io::Result<Vec<u8>> {
    match &file.data {
        FileData::Bytes(bytes) => Ok(bytes.clone()),
        FileData::Path(path) => tokio::fs::read(path).await,
    }
}

fn to_data_uri(mime_type: &str, bytes: &[u8]) -> String {
    let mime = if mime_type.is_empty() {
        "application/octet-stream"
    } else {
        mime_type
    };
    format!(
        "data:{mime};base64,{}",
        base64::engine::general_purpose::STANDARD.encode(bytes)
    )
}

/// Best-effort MIME type from a file extension.
fn mime_for_extension(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "pdf" => "application/pdf",
        "txt" | "log" => "text/plain",
        "md" => "text/markdown",
        "html" | "htm" => "text/html",
        "css" => "text/css",
        "csv" => "text/csv",
        "json" => "application/json",
        "toml" => "application/toml",
        "zip" => "application/zip",
        _ => "application/octet-stream",
    }
}
