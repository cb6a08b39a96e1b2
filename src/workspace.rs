//! In-memory workspace: the tree of groups, messages and attachments.
//!
//! This is the only legal mutation surface over the workspace state. Every
//! mutation runs to completion synchronously; the caller (the session) is
//! responsible for scheduling persistence afterwards.

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use crate::error::{PromptError, Result};
use crate::i18n;
use crate::id::create_id;
use crate::model::{Attachment, Group, Message, Role};

/// The whole editor state for one session.
#[derive(Debug, Clone)]
pub struct Workspace {
    /// Groups, most recently created first.
    pub groups: Vec<Group>,
    /// Id of the selected group. Must reference an existing group or be `None`.
    pub selected_group_id: Option<String>,
    /// Timestamp of the last successful persist, `None` before the first one.
    pub last_saved_at: Option<DateTime<Utc>>,
}

impl Workspace {
    /// An empty workspace with nothing selected.
    pub fn empty() -> Self {
        Self {
            groups: Vec::new(),
            selected_group_id: None,
            last_saved_at: None,
        }
    }

    /// First-run workspace: three example groups, the first one selected.
    pub fn with_defaults() -> Self {
        let groups = seed_groups();
        Self {
            selected_group_id: groups.first().map(|g| g.id.clone()),
            groups,
            last_saved_at: None,
        }
    }

    /// Find a group by id.
    pub fn group(&self, id: &str) -> Option<&Group> {
        self.groups.iter().find(|g| g.id == id)
    }

    fn group_mut(&mut self, id: &str) -> Result<&mut Group> {
        self.groups
            .iter_mut()
            .find(|g| g.id == id)
            .ok_or_else(|| PromptError::GroupNotFound(id.to_string()))
    }

    /// The currently selected group, if any.
    pub fn selected_group(&self) -> Option<&Group> {
        let id = self.selected_group_id.as_deref()?;
        self.group(id)
    }

    /// Select a group. No-op when the id does not exist.
    /// Returns `true` if the selection was applied.
    pub fn select_group(&mut self, id: &str) -> bool {
        if self.group(id).is_none() {
            return false;
        }
        self.selected_group_id = Some(id.to_string());
        true
    }

    /// Create a new group with one seed system message, prepend it and
    /// select it. Always succeeds.
    pub fn create_group(&mut self) -> &Group {
        let group = new_group();
        debug!(group_id = %group.id, "Created group");
        self.selected_group_id = Some(group.id.clone());
        self.groups.insert(0, group);
        &self.groups[0]
    }

    /// Remove a group. Unconditional once invoked: confirmation is the
    /// presentation layer's responsibility. If the removed group was
    /// selected, the new first group (or nothing) becomes selected.
    pub fn delete_group(&mut self, id: &str) -> Result<()> {
        let before = self.groups.len();
        self.groups.retain(|g| g.id != id);
        if self.groups.len() == before {
            return Err(PromptError::GroupNotFound(id.to_string()));
        }
        if self.selected_group_id.as_deref() == Some(id) {
            self.selected_group_id = self.groups.first().map(|g| g.id.clone());
        }
        debug!(group_id = %id, "Deleted group");
        Ok(())
    }

    /// Set a group's title.
    pub fn rename_group(&mut self, id: &str, title: &str) -> Result<()> {
        let group = self.group_mut(id)?;
        group.title = title.to_string();
        group.touch();
        Ok(())
    }

    /// Append a message to a group.
    ///
    /// Rejected with [`PromptError::EmptyMessage`] when the content is
    /// empty/whitespace-only and there are no attachments; nothing is
    /// mutated in that case.
    pub fn add_message(
        &mut self,
        group_id: &str,
        role: Role,
        content: &str,
        attachments: Vec<Attachment>,
    ) -> Result<&Message> {
        let content = content.trim();
        if content.is_empty() && attachments.is_empty() {
            return Err(PromptError::EmptyMessage);
        }
        let group = self.group_mut(group_id)?;
        group.messages.push(Message {
            id: create_id("msg"),
            role,
            content: content.to_string(),
            attachments,
        });
        group.touch();
        Ok(group.messages.last().expect("just pushed"))
    }

    /// Replace a message's content in place.
    pub fn edit_message_content(
        &mut self,
        group_id: &str,
        message_id: &str,
        content: &str,
    ) -> Result<()> {
        let group = self.group_mut(group_id)?;
        let message =
            group
                .message_mut(message_id)
                .ok_or_else(|| PromptError::MessageNotFound {
                    group_id: group_id.to_string(),
                    message_id: message_id.to_string(),
                })?;
        message.content = content.to_string();
        group.touch();
        Ok(())
    }

    /// Remove a message by id.
    pub fn delete_message(&mut self, group_id: &str, message_id: &str) -> Result<()> {
        let group = self.group_mut(group_id)?;
        let before = group.messages.len();
        group.messages.retain(|m| m.id != message_id);
        if group.messages.len() == before {
            return Err(PromptError::MessageNotFound {
                group_id: group_id.to_string(),
                message_id: message_id.to_string(),
            });
        }
        group.touch();
        Ok(())
    }

    /// Remove an attachment from a message by id.
    pub fn delete_attachment(
        &mut self,
        group_id: &str,
        message_id: &str,
        attachment_id: &str,
    ) -> Result<()> {
        let group = self.group_mut(group_id)?;
        let message =
            group
                .message_mut(message_id)
                .ok_or_else(|| PromptError::MessageNotFound {
                    group_id: group_id.to_string(),
                    message_id: message_id.to_string(),
                })?;
        let before = message.attachments.len();
        message.attachments.retain(|a| a.id != attachment_id);
        if message.attachments.len() == before {
            return Err(PromptError::AttachmentNotFound {
                message_id: message_id.to_string(),
                attachment_id: attachment_id.to_string(),
            });
        }
        group.touch();
        Ok(())
    }
}

/// A fresh group with one seed system message.
fn new_group() -> Group {
    let now = Utc::now();
    Group {
        id: create_id("group"),
        title: i18n::new_group_title().to_string(),
        created_at: now,
        updated_at: now,
        messages: vec![Message {
            id: create_id("msg"),
            role: Role::System,
            content: i18n::seed_new_group_system().to_string(),
            attachments: Vec::new(),
        }],
    }
}

/// The three first-run example groups, with staggered timestamps so the
/// sidebar shows plausible relative activity.
fn seed_groups() -> Vec<Group> {
    let now = Utc::now();
    let msg = |role: Role, content: &str| Message {
        id: create_id("msg"),
        role,
        content: content.to_string(),
        attachments: Vec::new(),
    };

    vec![
        Group {
            id: create_id("group"),
            title: i18n::seed_launch_title().to_string(),
            created_at: now - Duration::hours(24),
            updated_at: now - Duration::minutes(30),
            messages: vec![
                msg(Role::System, i18n::seed_launch_system()),
                msg(Role::User, i18n::seed_launch_user()),
                msg(Role::Assistant, i18n::seed_launch_assistant()),
            ],
        },
        Group {
            id: create_id("group"),
            title: i18n::seed_story_title().to_string(),
            created_at: now - Duration::hours(48),
            updated_at: now - Duration::hours(4),
            messages: vec![
                msg(Role::System, i18n::seed_story_system()),
                msg(Role::User, i18n::seed_story_user()),
            ],
        },
        Group {
            id: create_id("group"),
            title: i18n::seed_ux_title().to_string(),
            created_at: now - Duration::hours(12),
            updated_at: now - Duration::minutes(15),
            messages: vec![
                msg(Role::System, i18n::seed_ux_system()),
                msg(Role::Assistant, i18n::seed_ux_assistant()),
            ],
        },
    ]
}
