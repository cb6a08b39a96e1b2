//! Defensive normalization of untrusted stored records.
//!
//! Stored workspace data is edited by hand often enough (and was written by
//! older versions of the program) that every field must be repaired
//! independently: wrong-typed or missing fields get defaults, invalid roles
//! coerce to `user`, non-array collections become empty. The functions are
//! pure (no I/O) and idempotent: normalizing an already-normal entity yields
//! an equal entity, except that absent ids are generated fresh.

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::i18n;
use crate::id::create_id;
use crate::model::{Attachment, Group, Message, Role};

/// Rebuild a possibly-malformed stored group into the canonical shape.
pub fn normalize_group(raw: &Value) -> Group {
    let created_at = timestamp_field(raw, "createdAt").unwrap_or_else(Utc::now);
    // updatedAt falls back to createdAt and is clamped to never precede it.
    let updated_at = timestamp_field(raw, "updatedAt")
        .unwrap_or(created_at)
        .max(created_at);

    Group {
        id: string_field(raw, "id").unwrap_or_else(|| create_id("group")),
        title: string_field(raw, "title")
            .unwrap_or_else(|| i18n::default_group_title().to_string()),
        created_at,
        updated_at,
        messages: raw
            .get("messages")
            .and_then(Value::as_array)
            .map(|items| items.iter().map(normalize_message).collect())
            .unwrap_or_default(),
    }
}

/// Rebuild a possibly-malformed stored message.
///
/// Any role outside `{system, user, assistant}` coerces to `user`.
pub fn normalize_message(raw: &Value) -> Message {
    Message {
        id: string_field(raw, "id").unwrap_or_else(|| create_id("msg")),
        role: raw
            .get("role")
            .and_then(Value::as_str)
            .and_then(Role::from_str_opt)
            .unwrap_or_default(),
        content: raw
            .get("content")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        attachments: raw
            .get("attachments")
            .and_then(Value::as_array)
            .map(|items| items.iter().map(normalize_attachment).collect())
            .unwrap_or_default(),
    }
}

/// Rebuild a possibly-malformed stored attachment.
pub fn normalize_attachment(raw: &Value) -> Attachment {
    Attachment {
        id: string_field(raw, "id").unwrap_or_else(|| create_id("att")),
        name: string_field(raw, "name")
            .unwrap_or_else(|| i18n::attachment_fallback_name().to_string()),
        mime_type: string_field(raw, "mimeType")
            .unwrap_or_else(|| "application/octet-stream".to_string()),
        size_bytes: raw
            .get("sizeBytes")
            .and_then(Value::as_u64)
            .unwrap_or_default(),
        inline_data: raw
            .get("inlineData")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
    }
}

/// Non-empty string field, or `None`.
fn string_field(raw: &Value, key: &str) -> Option<String> {
    raw.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// RFC 3339 timestamp field, or `None` when absent or unparseable.
fn timestamp_field(raw: &Value, key: &str) -> Option<DateTime<Utc>> {
    raw.get(key)
        .and_then(Value::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_valid_roles_preserved() {
        for (raw, expected) in [
            ("system", Role::System),
            ("user", Role::User),
            ("assistant", Role::Assistant),
        ] {
            let msg = normalize_message(&json!({ "role": raw }));
            assert_eq!(msg.role, expected, "role '{raw}' should be preserved");
        }
    }

    #[test]
    fn test_invalid_roles_coerce_to_user() {
        for raw in [json!("moderator"), json!(""), json!(42), json!(null), json!({})] {
            let msg = normalize_message(&json!({ "role": raw.clone() }));
            assert_eq!(msg.role, Role::User, "role {raw} should coerce to user");
        }
        // Missing role entirely
        assert_eq!(normalize_message(&json!({})).role, Role::User);
    }

    #[test]
    fn test_every_field_defaulted() {
        let group = normalize_group(&json!({}));
        assert!(group.id.starts_with("group-"));
        assert!(!group.title.is_empty());
        assert!(group.messages.is_empty());
        assert!(group.updated_at >= group.created_at);

        let att = normalize_attachment(&json!(null));
        assert!(att.id.starts_with("att-"));
        assert_eq!(att.mime_type, "application/octet-stream");
        assert_eq!(att.size_bytes, 0);
        assert!(att.inline_data.is_empty());
    }

    #[test]
    fn test_non_array_collections_become_empty() {
        let group = normalize_group(&json!({ "messages": "oops" }));
        assert!(group.messages.is_empty());
        let msg = normalize_message(&json!({ "attachments": 7 }));
        assert!(msg.attachments.is_empty());
    }

    #[test]
    fn test_updated_at_clamped_to_created_at() {
        let group = normalize_group(&json!({
            "createdAt": "2024-05-10T12:00:00Z",
            "updatedAt": "2023-01-01T00:00:00Z",
        }));
        assert_eq!(group.updated_at, group.created_at);
    }

    #[test]
    fn test_idempotent_modulo_id_generation() {
        let raw = json!({
            "id": "group-abc",
            "title": "Research",
            "createdAt": "2024-05-10T12:00:00Z",
            "updatedAt": "2024-05-11T08:30:00Z",
            "messages": [
                {
                    "id": "msg-1",
                    "role": "weird-role",
                    "content": "hello",
                    "attachments": [
                        { "id": "att-1", "name": "", "sizeBytes": -3 }
                    ],
                },
                "not an object",
            ],
        });
        let once = normalize_group(&raw);
        let twice = normalize_group(&serde_json::to_value(&once).unwrap());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_malformed_timestamps_fall_back() {
        let group = normalize_group(&json!({ "createdAt": "yesterday-ish" }));
        assert!(group.updated_at >= group.created_at);
    }
}
