//! Repository for the `appreciations` table.

use hourbank_core::types::DbId;
use sqlx::PgPool;

use crate::models::appreciation::{Appreciation, CreateAppreciation};

/// Column list for `appreciations` queries.
const COLUMNS: &str =
    "id, exchange_id, from_user_id, to_user_id, tag_slug, message, is_public, created_at";

/// Provides operations for the appreciation side-ledger.
pub struct AppreciationRepo;

impl AppreciationRepo {
    /// Persist an appreciation, returning the full row.
    ///
    /// No uniqueness constraint: the client sends one request per selected
    /// tag, so repeated (exchange, from, tag) rows are expected.
    pub async fn create(
        pool: &PgPool,
        from_user_id: DbId,
        input: &CreateAppreciation,
    ) -> Result<Appreciation, sqlx::Error> {
        let query = format!(
            "INSERT INTO appreciations \
                 (exchange_id, from_user_id, to_user_id, tag_slug, message, is_public) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Appreciation>(&query)
            .bind(input.exchange_id)
            .bind(from_user_id)
            .bind(input.to_user_id)
            .bind(&input.tag_slug)
            .bind(input.message.as_deref())
            .bind(input.is_public.unwrap_or(true))
            .fetch_one(pool)
            .await
    }

    /// Fetch an appreciation by id.
    pub async fn get(pool: &PgPool, id: DbId) -> Result<Option<Appreciation>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM appreciations WHERE id = $1");
        sqlx::query_as::<_, Appreciation>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Public appreciations received by a user, newest first.
    pub async fn list_public_for_user(
        pool: &PgPool,
        user_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Appreciation>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM appreciations \
             WHERE to_user_id = $1 AND is_public = TRUE \
             ORDER BY created_at DESC \
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Appreciation>(&query)
            .bind(user_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Appreciations a user has sent, newest first. Authors always see
    /// their own rows, hidden or not.
    pub async fn list_sent_by_user(
        pool: &PgPool,
        user_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Appreciation>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM appreciations \
             WHERE from_user_id = $1 \
             ORDER BY created_at DESC \
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Appreciation>(&query)
            .bind(user_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// All appreciations attached to an exchange.
    pub async fn list_for_exchange(
        pool: &PgPool,
        exchange_id: DbId,
    ) -> Result<Vec<Appreciation>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM appreciations \
             WHERE exchange_id = $1 \
             ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, Appreciation>(&query)
            .bind(exchange_id)
            .fetch_all(pool)
            .await
    }

    /// Toggle public visibility (moderation remove/restore path).
    ///
    /// Returns `true` if the appreciation existed.
    pub async fn set_public(
        pool: &PgPool,
        id: DbId,
        is_public: bool,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE appreciations SET is_public = $2 WHERE id = $1")
            .bind(id)
            .bind(is_public)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
