//! Core group and message types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::attachment::Attachment;
use crate::i18n;

/// Role of a message within a prompt conversation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Instructions that frame the assistant's behavior.
    System,
    /// Input authored by the person building the prompt.
    #[default]
    User,
    /// Example or expected assistant output.
    Assistant,
}

impl Role {
    /// Parse a role string. Anything outside the three-valued set is `None`;
    /// the normalizer coerces those to [`Role::User`].
    pub fn from_str_opt(value: &str) -> Option<Self> {
        match value {
            "system" => Some(Self::System),
            "user" => Some(Self::User),
            "assistant" => Some(Self::Assistant),
            _ => None,
        }
    }

    /// Wire name of the role (`"system"`, `"user"`, `"assistant"`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }

    /// Localized human-readable label for display.
    pub fn label(self) -> &'static str {
        match self {
            Self::System => i18n::role_system(),
            Self::User => i18n::role_user(),
            Self::Assistant => i18n::role_assistant(),
        }
    }
}

/// A single role-tagged unit of text within a group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Globally unique identifier.
    pub id: String,

    /// Message role. Untrusted input with an invalid role normalizes to `user`.
    pub role: Role,

    /// Free-form text content.
    pub content: String,

    /// Ordered attachments owned by this message.
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

/// A named, ordered collection of messages: one reusable prompt context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    /// Globally unique identifier.
    pub id: String,

    /// User-editable title.
    pub title: String,

    /// Creation timestamp (ISO-8601 on the wire).
    pub created_at: DateTime<Utc>,

    /// Last-modification timestamp. Invariant: `updated_at >= created_at`.
    pub updated_at: DateTime<Utc>,

    /// Ordered messages owned by this group.
    #[serde(default)]
    pub messages: Vec<Message>,
}

impl Group {
    /// Bump `updated_at` after a mutation to the title or any message.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Find a message by id.
    pub fn message(&self, message_id: &str) -> Option<&Message> {
        self.messages.iter().find(|m| m.id == message_id)
    }

    /// Find a message by id, mutably.
    pub fn message_mut(&mut self, message_id: &str) -> Option<&mut Message> {
        self.messages.iter_mut().find(|m| m.id == message_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_wire_names() {
        assert_eq!(Role::from_str_opt("system"), Some(Role::System));
        assert_eq!(Role::from_str_opt("user"), Some(Role::User));
        assert_eq!(Role::from_str_opt("assistant"), Some(Role::Assistant));
        assert_eq!(Role::from_str_opt("moderator"), None);
        assert_eq!(Role::Assistant.as_str(), "assistant");
    }

    #[test]
    fn test_role_serde_lowercase() {
        assert_eq!(serde_json::to_string(&Role::System).unwrap(), "\"system\"");
        let parsed: Role = serde_json::from_str("\"assistant\"").unwrap();
        assert_eq!(parsed, Role::Assistant);
    }

    #[test]
    fn test_group_serializes_camel_case() {
        let group = Group {
            id: "group-1".into(),
            title: "t".into(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            messages: vec![],
        };
        let json = serde_json::to_value(&group).unwrap();
        assert!(json.get("createdAt").is_some());
        assert!(json.get("updatedAt").is_some());
    }
}
