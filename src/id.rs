//! Prefixed unique identifiers for groups, messages and attachments.

use uuid::Uuid;

/// Generate a collision-resistant identifier with a type prefix,
/// e.g. `"group-7f9c…"`, `"msg-…"`, `"att-…"`.
///
/// Backed by a v4 UUID (cryptographically strong randomness). Never blocks,
/// never fails; uniqueness within a workspace lifetime is overwhelming.
pub fn create_id(prefix: &str) -> String {
    format!("{prefix}-{}", Uuid::new_v4())
}

/// Degraded-mode identifier: millisecond timestamp plus a random suffix.
///
/// Kept for environments without a usable entropy source. Weaker than
/// [`create_id`] but still unique enough for a single-user workspace.
pub fn create_composite_id(prefix: &str) -> String {
    let millis = chrono::Utc::now().timestamp_millis().max(0) as u128;
    let salt = u128::from_le_bytes(*Uuid::new_v4().as_bytes()) & 0xFFFF_FFFF;
    format!("{prefix}-{}-{}", to_base36(millis), to_base36(salt))
}

fn to_base36(mut value: u128) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();
    String::from_utf8(out).expect("base36 digits are ASCII")
}
