//! Data model: groups, messages, attachments.

pub mod attachment;
pub mod group;

pub use attachment::Attachment;
pub use group::{Group, Message, Role};
