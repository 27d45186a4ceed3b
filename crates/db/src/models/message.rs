//! Message models for the outbound notification capability.

use hourbank_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// Message type for a direct member-to-member message.
pub const TYPE_DIRECT: &str = "direct";

/// Message type for job lifecycle notifications (claimed, released, completed).
pub const TYPE_JOB_UPDATE: &str = "job_update";

/// Message type for moderation alerts sent to moderators.
pub const TYPE_MOD_ALERT: &str = "mod_alert";

/// A row from the `messages` table. `from_user_id` is `None` for system
/// messages such as moderation alerts.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Message {
    pub id: DbId,
    pub from_user_id: Option<DbId>,
    pub to_user_id: DbId,
    pub body: String,
    pub message_type: String,
    pub related_id: Option<DbId>,
    pub is_read: bool,
    pub created_at: Timestamp,
}
