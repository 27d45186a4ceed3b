//! Repository for the `messages` table.
//!
//! Only the send capability and the hide toggle live in core scope; there
//! is no inbox or thread surface here.

use hourbank_core::types::DbId;
use sqlx::PgPool;

use crate::models::message::Message;

/// Column list for `messages` queries.
const COLUMNS: &str =
    "id, from_user_id, to_user_id, body, message_type, related_id, is_read, created_at";

/// Provides the outbound message capability.
pub struct MessageRepo;

impl MessageRepo {
    /// Deliver a message. `from_user_id = None` marks a system message.
    ///
    /// Returns the generated id.
    pub async fn send(
        pool: &PgPool,
        from_user_id: Option<DbId>,
        to_user_id: DbId,
        body: &str,
        message_type: &str,
        related_id: Option<DbId>,
    ) -> Result<DbId, sqlx::Error> {
        sqlx::query_scalar(
            "INSERT INTO messages (from_user_id, to_user_id, body, message_type, related_id) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING id",
        )
        .bind(from_user_id)
        .bind(to_user_id)
        .bind(body)
        .bind(message_type)
        .bind(related_id)
        .fetch_one(pool)
        .await
    }

    /// Fetch a message by id (moderation preview path).
    pub async fn get(pool: &PgPool, message_id: DbId) -> Result<Option<Message>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM messages WHERE id = $1");
        sqlx::query_as::<_, Message>(&query)
            .bind(message_id)
            .fetch_optional(pool)
            .await
    }

    /// Mark a message read. Flagging a message marks it read as its
    /// immediate visibility action.
    ///
    /// Returns `true` if the message existed.
    pub async fn mark_read(pool: &PgPool, message_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE messages SET is_read = TRUE WHERE id = $1")
            .bind(message_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Messages delivered to a user, newest first. Exists for tests and for
    /// the host application's inbox, which is outside core scope.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Message>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM messages \
             WHERE to_user_id = $1 \
             ORDER BY created_at DESC \
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Message>(&query)
            .bind(user_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }
}
