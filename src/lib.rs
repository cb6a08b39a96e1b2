//! `promptshell` — local-first manager for reusable prompt groups.
//!
//! This crate provides the core library: the in-memory workspace of
//! role-tagged messages with attachments, defensive normalization of stored
//! records, the attachment codec, and the debounced save pipeline.

pub mod codec;
pub mod config;
pub mod error;
pub mod format;
pub mod i18n;
pub mod id;
pub mod model;
pub mod normalize;
pub mod persist;
pub mod session;
pub mod workspace;
