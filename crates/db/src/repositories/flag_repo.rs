//! Repository for the `flags` table.

use hourbank_core::types::DbId;
use sqlx::PgPool;

use crate::models::flag::{CreateFlag, Flag};

/// Column list for `flags` queries.
const COLUMNS: &str = "id, flagged_item_type, flagged_item_id, flagged_user_id, reporter_id, \
     reason_slug, context_note, status, created_at, reviewed_at, reviewer_id, resolution_note";

/// Provides flag creation and moderation operations.
pub struct FlagRepo;

impl FlagRepo {
    /// Persist a flag with status `open`, returning the full row.
    pub async fn create(
        pool: &PgPool,
        reporter_id: DbId,
        input: &CreateFlag,
    ) -> Result<Flag, sqlx::Error> {
        let query = format!(
            "INSERT INTO flags \
                 (flagged_item_type, flagged_item_id, flagged_user_id, reporter_id, \
                  reason_slug, context_note) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Flag>(&query)
            .bind(&input.flagged_item_type)
            .bind(input.flagged_item_id)
            .bind(input.flagged_user_id)
            .bind(reporter_id)
            .bind(&input.reason_slug)
            .bind(input.context_note.as_deref())
            .fetch_one(pool)
            .await
    }

    /// Fetch a flag by id.
    pub async fn get(pool: &PgPool, flag_id: DbId) -> Result<Option<Flag>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM flags WHERE id = $1");
        sqlx::query_as::<_, Flag>(&query)
            .bind(flag_id)
            .fetch_optional(pool)
            .await
    }

    /// Moderator review queue, newest first, optionally filtered by status.
    pub async fn list_for_review(
        pool: &PgPool,
        status: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Flag>, sqlx::Error> {
        let filter = if status.is_some() {
            "WHERE status = $1"
        } else {
            "WHERE $1::text IS NULL"
        };
        let query = format!(
            "SELECT {COLUMNS} FROM flags \
             {filter} \
             ORDER BY created_at DESC \
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Flag>(&query)
            .bind(status)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Set a flag's status and stamp the reviewing moderator.
    ///
    /// Deliberately no transition guard: any status is reachable from any
    /// other, so moderators can correct earlier decisions. A `None`
    /// resolution note leaves the existing note in place.
    pub async fn update_status(
        pool: &PgPool,
        flag_id: DbId,
        status: &str,
        reviewer_id: DbId,
        resolution_note: Option<&str>,
    ) -> Result<Option<Flag>, sqlx::Error> {
        let query = format!(
            "UPDATE flags \
             SET status = $2, reviewed_at = NOW(), reviewer_id = $3, \
                 resolution_note = COALESCE($4, resolution_note) \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Flag>(&query)
            .bind(flag_id)
            .bind(status)
            .bind(reviewer_id)
            .bind(resolution_note)
            .fetch_optional(pool)
            .await
    }

    /// Whether an item currently has an `open` flag. This backs the
    /// visibility soft gate; the stored `visibility`/`is_public` columns
    /// remain the authoritative immediate-hide markers.
    pub async fn has_open_flag(
        pool: &PgPool,
        item_type: &str,
        item_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let exists: Option<bool> = sqlx::query_scalar(
            "SELECT EXISTS ( \
                 SELECT 1 FROM flags \
                 WHERE flagged_item_type = $1 AND flagged_item_id = $2 AND status = 'open' \
             )",
        )
        .bind(item_type)
        .bind(item_id)
        .fetch_one(pool)
        .await?;
        Ok(exists.unwrap_or(false))
    }

    /// Count flags against a user that are still open or under review --
    /// the number the auto-downgrade threshold is compared against.
    pub async fn count_open_against_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<i64, sqlx::Error> {
        let count: Option<i64> = sqlx::query_scalar(
            "SELECT COUNT(*) FROM flags \
             WHERE flagged_user_id = $1 AND status IN ('open', 'under_review')",
        )
        .bind(user_id)
        .fetch_one(pool)
        .await?;
        Ok(count.unwrap_or(0))
    }
}
