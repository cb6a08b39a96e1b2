//! Human-readable labels for timestamps and file sizes.

use chrono::{DateTime, Utc};
use humansize::{format_size, BINARY};

use crate::i18n::{self, Lang};

/// Relative description of a past timestamp ("5 min ago" / "hace 5 min").
///
/// Timestamps in the future (clock skew) read as "just now". Anything older
/// than a week falls back to a plain date.
pub fn relative_time(target: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let diff = now.signed_duration_since(target);
    let minutes = diff.num_minutes();
    if minutes < 1 {
        return i18n::rel_just_now().to_string();
    }
    let hours = diff.num_hours();
    let days = diff.num_days();
    match i18n::lang() {
        Lang::En => {
            if hours < 1 {
                format!("{minutes} min ago")
            } else if days < 1 {
                format!("{hours} h ago")
            } else if days < 7 {
                format!("{days} d ago")
            } else {
                target.format("%-d %b %Y").to_string()
            }
        }
        Lang::Es => {
            if hours < 1 {
                format!("hace {minutes} min")
            } else if days < 1 {
                format!("hace {hours} h")
            } else if days < 7 {
                format!("hace {days} d")
            } else {
                target.format("%-d %b %Y").to_string()
            }
        }
    }
}

/// Exact human-readable timestamp for the last-saved display.
pub fn exact_timestamp(target: DateTime<Utc>) -> String {
    target.format("%-d %b %Y \u{b7} %H:%M").to_string()
}

/// Label for the last successful save, or a "no saves yet" placeholder.
pub fn last_saved_label(last_saved_at: Option<DateTime<Utc>>) -> String {
    match last_saved_at {
        Some(ts) => format!("{} \u{b7} {}", i18n::last_saved_prefix(), exact_timestamp(ts)),
        None => i18n::no_saves_yet().to_string(),
    }
}

/// File size with binary units ("1.21 MiB").
pub fn file_size(bytes: u64) -> String {
    format_size(bytes, BINARY)
}
