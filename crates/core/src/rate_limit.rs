//! Fixed-window rate limiting rules.
//!
//! Windows are keyed by `(action, actor)` and start at the first hit; a
//! window expires `period_seconds` after that first hit, not on a rolling
//! basis. The counter itself is incremented atomically in SQL (see
//! `RateLimitRepo`); this module holds the key builders, the limits, and
//! the window arithmetic.

use crate::types::{DbId, Timestamp};

/// Max flags one reporter may file against a single item per window.
pub const FLAG_LIMIT: i64 = 3;

/// Flag rate-limit window: 24 hours.
pub const FLAG_WINDOW_SECS: i64 = 24 * 60 * 60;

/// Max jobs one requester may create per window.
pub const JOB_CREATE_LIMIT: i64 = 10;

/// Job-creation rate-limit window: 1 hour.
pub const JOB_CREATE_WINDOW_SECS: i64 = 60 * 60;

/// Action key for flagging a specific item. The item is part of the key so
/// the 3-per-24h cap applies per reporter *per item*.
pub fn flag_action_key(item_type: &str, item_id: DbId) -> String {
    format!("flag:{item_type}:{item_id}")
}

/// Action key for job creation.
pub fn job_create_action_key() -> String {
    "job:create".to_string()
}

/// Whether a window that started at `window_start` has expired at `now`.
pub fn window_expired(window_start: Timestamp, now: Timestamp, period_secs: i64) -> bool {
    (now - window_start).num_seconds() >= period_secs
}

/// Seconds until the window that started at `window_start` resets.
/// Clamped to zero for already-expired windows.
pub fn retry_after_secs(window_start: Timestamp, now: Timestamp, period_secs: i64) -> i64 {
    (period_secs - (now - window_start).num_seconds()).max(0)
}
