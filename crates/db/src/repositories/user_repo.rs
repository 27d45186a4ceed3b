//! Repository for the `users` table.

use hourbank_core::roles::{ROLE_ADMIN, ROLE_MEMBER, ROLE_MODERATOR};
use hourbank_core::types::DbId;
use sqlx::PgPool;

use crate::models::user::{CreateUser, User};

/// Column list for `users` queries.
const COLUMNS: &str = "id, username, email, password_hash, role, is_active, created_at";

/// Provides CRUD and role operations for users.
pub struct UserRepo;

impl UserRepo {
    /// Create a user, returning the full row.
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (username, email, password_hash, role) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.username)
            .bind(&input.email)
            .bind(&input.password_hash)
            .bind(input.role.as_deref().unwrap_or(ROLE_MEMBER))
            .fetch_one(pool)
            .await
    }

    /// Fetch a user by id.
    pub async fn get(pool: &PgPool, user_id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Fetch a user by username (login path).
    pub async fn find_by_username(
        pool: &PgPool,
        username: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE username = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(username)
            .fetch_optional(pool)
            .await
    }

    /// Set a user's role unconditionally (manual moderation action).
    ///
    /// Returns `true` if the user existed and was updated.
    pub async fn set_role(pool: &PgPool, user_id: DbId, role: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE users SET role = $2 WHERE id = $1")
            .bind(user_id)
            .bind(role)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Demote a member to `to_role`, but only if their current role is still
    /// exactly `member`. The conditional write makes repeated auto-downgrade
    /// checks a no-op on the role.
    ///
    /// Returns `true` if the role actually changed.
    pub async fn downgrade_member(
        pool: &PgPool,
        user_id: DbId,
        to_role: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE users SET role = $2 WHERE id = $1 AND role = $3")
            .bind(user_id)
            .bind(to_role)
            .bind(ROLE_MEMBER)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// List every active user holding moderation capability.
    pub async fn list_moderators(pool: &PgPool) -> Result<Vec<User>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM users \
             WHERE role IN ($1, $2) AND is_active = TRUE \
             ORDER BY id"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(ROLE_MODERATOR)
            .bind(ROLE_ADMIN)
            .fetch_all(pool)
            .await
    }
}
