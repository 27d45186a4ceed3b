//! Repository for the `jobs` table.
//!
//! Claim, release, and complete are compare-and-swap statements: the state
//! condition is part of the `WHERE` clause, so of any number of concurrent
//! attempts at most one sees `rows_affected > 0`. Completion runs in a
//! transaction that also inserts the exchange row, making "exactly one
//! exchange per job" atomic.

use hourbank_core::types::DbId;
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::models::job::{CreateJob, Job};

/// Column list for `jobs` queries.
const COLUMNS: &str =
    "id, title, description, hours, requester_id, provider_id, visibility, completed_at, created_at";

/// Provides lifecycle operations for jobs.
pub struct JobRepo;

impl JobRepo {
    /// Create an open, public job for the requester.
    pub async fn create(
        pool: &PgPool,
        requester_id: DbId,
        input: &CreateJob,
    ) -> Result<Job, sqlx::Error> {
        let query = format!(
            "INSERT INTO jobs (title, description, hours, requester_id) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Job>(&query)
            .bind(&input.title)
            .bind(input.description.as_deref().unwrap_or(""))
            .bind(input.hours)
            .bind(requester_id)
            .fetch_one(pool)
            .await
    }

    /// Fetch a job by id.
    pub async fn get(pool: &PgPool, job_id: DbId) -> Result<Option<Job>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM jobs WHERE id = $1");
        sqlx::query_as::<_, Job>(&query)
            .bind(job_id)
            .fetch_optional(pool)
            .await
    }

    /// List jobs visible to a viewer, newest first.
    ///
    /// Public jobs are visible to everyone; hidden/private jobs only to
    /// their own parties (and to moderators via `include_hidden`). When
    /// `apply_flag_gate` is set, jobs with an open flag are additionally
    /// suppressed -- the soft gate used when auto-hide is enabled. The
    /// gate never hides a job from its own requester or provider, matching
    /// the by-id read path.
    pub async fn list_visible(
        pool: &PgPool,
        viewer_id: DbId,
        include_hidden: bool,
        apply_flag_gate: bool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Job>, sqlx::Error> {
        let flag_gate = if apply_flag_gate {
            "AND (requester_id = $1 OR provider_id = $1 OR NOT EXISTS (
                 SELECT 1 FROM flags f
                 WHERE f.flagged_item_type = 'job'
                   AND f.flagged_item_id = jobs.id
                   AND f.status = 'open'
             ))"
        } else {
            ""
        };
        let query = format!(
            "SELECT {COLUMNS} FROM jobs \
             WHERE (visibility = 'public' OR requester_id = $1 OR provider_id = $1 OR $2) \
             {flag_gate} \
             ORDER BY created_at DESC \
             LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, Job>(&query)
            .bind(viewer_id)
            .bind(include_hidden)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Assign a provider, but only if the job is still open.
    ///
    /// Returns `true` if this caller won the claim.
    pub async fn claim(pool: &PgPool, job_id: DbId, provider_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE jobs SET provider_id = $2 \
             WHERE id = $1 AND provider_id IS NULL AND completed_at IS NULL",
        )
        .bind(job_id)
        .bind(provider_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Clear the provider, but only if `provider_id` still holds the job
    /// and it is not completed.
    ///
    /// Returns `true` if the release took effect.
    pub async fn release(
        pool: &PgPool,
        job_id: DbId,
        provider_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE jobs SET provider_id = NULL \
             WHERE id = $1 AND provider_id = $2 AND completed_at IS NULL",
        )
        .bind(job_id)
        .bind(provider_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Complete a job and mint its exchange in one transaction.
    ///
    /// The `completed_at IS NULL` condition on the UPDATE is the
    /// double-completion guard: concurrent calls race on it and exactly one
    /// proceeds to the exchange insert. An `hours_override`, when given,
    /// becomes the job's hours of record and the hours credited.
    ///
    /// Returns the new exchange id, or `None` if the job was not in a
    /// completable state (already completed or unclaimed).
    pub async fn complete(
        pool: &PgPool,
        job_id: DbId,
        hours_override: Option<Decimal>,
    ) -> Result<Option<DbId>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let row: Option<(DbId, DbId, Decimal)> = sqlx::query_as(
            "UPDATE jobs \
             SET completed_at = NOW(), hours = COALESCE($2, hours) \
             WHERE id = $1 AND completed_at IS NULL AND provider_id IS NOT NULL \
             RETURNING provider_id, requester_id, hours",
        )
        .bind(job_id)
        .bind(hours_override)
        .fetch_optional(&mut *tx)
        .await?;

        let Some((provider_id, requester_id, hours)) = row else {
            tx.rollback().await?;
            return Ok(None);
        };

        let exchange_id: DbId = sqlx::query_scalar(
            "INSERT INTO exchanges (job_id, provider_id, requester_id, hours) \
             VALUES ($1, $2, $3, $4) \
             RETURNING id",
        )
        .bind(job_id)
        .bind(provider_id)
        .bind(requester_id)
        .bind(hours)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(exchange_id))
    }

    /// Delete an uncompleted job. The `completed_at IS NULL` condition
    /// backs the handler-level guard: a completed job anchors an immutable
    /// exchange and must never be deleted.
    ///
    /// Returns `true` if a row was deleted.
    pub async fn delete(pool: &PgPool, job_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM jobs WHERE id = $1 AND completed_at IS NULL")
            .bind(job_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Set a job's visibility (moderation remove/restore path).
    ///
    /// Returns `true` if the job existed.
    pub async fn set_visibility(
        pool: &PgPool,
        job_id: DbId,
        visibility: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE jobs SET visibility = $2 WHERE id = $1")
            .bind(job_id)
            .bind(visibility)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
