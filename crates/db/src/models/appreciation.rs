//! Appreciation entity models and DTOs.

use hourbank_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `appreciations` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Appreciation {
    pub id: DbId,
    pub exchange_id: DbId,
    pub from_user_id: DbId,
    pub to_user_id: DbId,
    pub tag_slug: String,
    pub message: Option<String>,
    pub is_public: bool,
    pub created_at: Timestamp,
}

/// DTO for creating an appreciation.
#[derive(Debug, Deserialize)]
pub struct CreateAppreciation {
    pub exchange_id: DbId,
    pub to_user_id: DbId,
    pub tag_slug: String,
    pub message: Option<String>,
    pub is_public: Option<bool>,
}
