//! Private-note entity models and DTOs.
//!
//! Notes are readable only by their author. There is deliberately no model
//! here that carries a note without its `author_id`, and every repository
//! read filters on it.

use hourbank_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `private_notes` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PrivateNote {
    pub id: DbId,
    pub author_id: DbId,
    pub subject_id: DbId,
    pub tag_slug: String,
    pub note: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a private note.
#[derive(Debug, Deserialize)]
pub struct CreatePrivateNote {
    pub subject_id: DbId,
    pub tag_slug: String,
    pub note: Option<String>,
}

/// DTO for updating one's own note.
#[derive(Debug, Deserialize)]
pub struct UpdatePrivateNote {
    pub tag_slug: Option<String>,
    pub note: Option<String>,
}
