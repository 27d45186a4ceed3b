//! Repository for the `rate_limits` table.

use chrono::Utc;
use hourbank_core::rate_limit;
use hourbank_core::types::{DbId, Timestamp};
use sqlx::PgPool;

/// Outcome of a rate-limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitDecision {
    Allowed,
    Limited { retry_after_secs: i64 },
}

/// Fixed-window counters, incremented atomically.
pub struct RateLimitRepo;

impl RateLimitRepo {
    /// Increment the counter for `(action, actor)` and compare against
    /// `limit`, all in one upsert so two concurrent requests cannot both
    /// pass a check meant to block the second.
    ///
    /// The window starts at the first hit and resets `period_secs` after
    /// it (fixed-window semantics). The expiry check and the conditional
    /// reset happen inside the statement itself.
    pub async fn check_and_increment(
        pool: &PgPool,
        action: &str,
        actor_id: DbId,
        limit: i64,
        period_secs: i64,
    ) -> Result<RateLimitDecision, sqlx::Error> {
        let (count, window_start): (i64, Timestamp) = sqlx::query_as(
            "INSERT INTO rate_limits (action, actor_id, window_start, count) \
             VALUES ($1, $2, NOW(), 1) \
             ON CONFLICT (action, actor_id) DO UPDATE SET \
                 count = CASE \
                     WHEN rate_limits.window_start <= NOW() - make_interval(secs => $3::double precision) \
                     THEN 1 ELSE rate_limits.count + 1 END, \
                 window_start = CASE \
                     WHEN rate_limits.window_start <= NOW() - make_interval(secs => $3::double precision) \
                     THEN NOW() ELSE rate_limits.window_start END \
             RETURNING count, window_start",
        )
        .bind(action)
        .bind(actor_id)
        .bind(period_secs)
        .fetch_one(pool)
        .await?;

        if count > limit {
            let retry_after_secs =
                rate_limit::retry_after_secs(window_start, Utc::now(), period_secs);
            Ok(RateLimitDecision::Limited { retry_after_secs })
        } else {
            Ok(RateLimitDecision::Allowed)
        }
    }
}
