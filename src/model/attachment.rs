//! Attachment records.
//!
//! Small files are embedded in the persisted record as a base64 data URI;
//! anything above the inline ceiling keeps metadata only.

use base64::Engine;
use serde::{Deserialize, Serialize};

/// A file attached to a message.
///
/// `inline_data` is a `data:` URI when the source file fit under the inline
/// ceiling and was read successfully; otherwise it is empty and the
/// attachment is reference-only (metadata retained, bytes not persisted).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    /// Globally unique identifier, immutable after creation.
    pub id: String,

    /// Original filename. Generated if missing from the source.
    pub name: String,

    /// MIME content type (e.g. `"image/png"`, `"application/pdf"`).
    pub mime_type: String,

    /// Size of the source file in bytes.
    pub size_bytes: u64,

    /// `data:{mime};base64,{payload}` URI, or empty for reference-only.
    #[serde(default)]
    pub inline_data: String,
}

impl Attachment {
    /// `true` if the attachment carries its bytes inline.
    pub fn is_inline(&self) -> bool {
        !self.inline_data.is_empty()
    }

    /// `true` if the MIME type denotes an image.
    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with("image/")
    }

    /// Decode the inline data URI back to the original bytes.
    ///
    /// Returns `None` for reference-only attachments or a malformed URI.
    pub fn inline_bytes(&self) -> Option<Vec<u8>> {
        let payload = self.inline_data.split_once(";base64,")?.1;
        base64::engine::general_purpose::STANDARD.decode(payload).ok()
    }
}
