//! Slug derivation for events.
//!
//! A slug is the lowercased display name with every run of characters
//! outside `[a-z0-9]` collapsed to a single dash, followed by a short base-36
//! suffix derived from the current time. The suffix is strictly increasing
//! within a process, so two events created in the same millisecond still get
//! distinct slugs.

use chrono::Utc;
use std::sync::atomic::{AtomicI64, Ordering};

/// Maximum length of the name-derived part of a slug.
pub const MAX_SLUG_BASE_LEN: usize = 50;

/// Base used when a name has no usable characters.
const FALLBACK_BASE: &str = "event";

static LAST_SUFFIX_MILLIS: AtomicI64 = AtomicI64::new(0);

/// Normalize a display name into the name-derived part of a slug.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;

    for c in name.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }

    // Only ASCII is pushed, so byte truncation stays on a char boundary.
    slug.truncate(MAX_SLUG_BASE_LEN);
    let slug = slug.trim_end_matches('-');

    if slug.is_empty() {
        FALLBACK_BASE.to_string()
    } else {
        slug.to_string()
    }
}

/// Time-derived base-36 suffix, strictly increasing across calls.
pub fn unique_suffix() -> String {
    let now = Utc::now().timestamp_millis();
    let previous = LAST_SUFFIX_MILLIS
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
            Some(now.max(last + 1))
        })
        .unwrap_or(now);
    to_base36(now.max(previous + 1))
}

/// Full slug for a new event: `slugify(name)` + `-` + [`unique_suffix`].
pub fn derive_slug(name: &str) -> String {
    format!("{}-{}", slugify(name), unique_suffix())
}

fn to_base36(mut value: i64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

    if value <= 0 {
        return "0".to_string();
    }

    let mut out = Vec::new();
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();
    String::from_utf8_lossy(&out).into_owned()
}
