//! Flag entity models and DTOs.

use hourbank_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `flags` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Flag {
    pub id: DbId,
    pub flagged_item_type: String,
    pub flagged_item_id: DbId,
    pub flagged_user_id: Option<DbId>,
    pub reporter_id: DbId,
    pub reason_slug: String,
    pub context_note: Option<String>,
    pub status: String,
    pub created_at: Timestamp,
    pub reviewed_at: Option<Timestamp>,
    pub reviewer_id: Option<DbId>,
    pub resolution_note: Option<String>,
}

/// DTO for submitting a flag.
#[derive(Debug, Deserialize)]
pub struct CreateFlag {
    pub flagged_item_type: String,
    pub flagged_item_id: DbId,
    /// The user implicated, when distinct from the item id itself.
    pub flagged_user_id: Option<DbId>,
    pub reason_slug: String,
    pub context_note: Option<String>,
}

/// DTO for a moderator status update.
#[derive(Debug, Deserialize)]
pub struct UpdateFlagStatus {
    pub status: String,
    pub resolution_note: Option<String>,
}
