//! Flag and moderation rules.
//!
//! Flags reference content or users by `(kind, id)`. The kind set is closed
//! so visibility dispatch is exhaustive at compile time, and the status set
//! is closed but deliberately unguarded: moderators may move a flag from any
//! status to any other (corrections included), matching long-standing
//! moderator workflow. Invalid status *strings* still fail validation.

use serde::{Deserialize, Serialize};

use crate::roles::ROLE_MEMBER;

/// What a flag points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlaggedItemKind {
    Job,
    Appreciation,
    Message,
    User,
}

impl FlaggedItemKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FlaggedItemKind::Job => "job",
            FlaggedItemKind::Appreciation => "appreciation",
            FlaggedItemKind::Message => "message",
            FlaggedItemKind::User => "user",
        }
    }

    pub fn parse(s: &str) -> Result<Self, String> {
        match s {
            "job" => Ok(FlaggedItemKind::Job),
            "appreciation" => Ok(FlaggedItemKind::Appreciation),
            "message" => Ok(FlaggedItemKind::Message),
            "user" => Ok(FlaggedItemKind::User),
            other => Err(format!(
                "Invalid flagged item type '{other}'. Must be one of: job, appreciation, message, user"
            )),
        }
    }

    /// Whether flagging this kind immediately suppresses content visibility
    /// (when auto-hide is enabled). User flags hide nothing.
    pub fn supports_auto_hide(self) -> bool {
        !matches!(self, FlaggedItemKind::User)
    }
}

/// Moderation status of a flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlagStatus {
    Open,
    UnderReview,
    Resolved,
    Removed,
    Restored,
}

impl FlagStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            FlagStatus::Open => "open",
            FlagStatus::UnderReview => "under_review",
            FlagStatus::Resolved => "resolved",
            FlagStatus::Removed => "removed",
            FlagStatus::Restored => "restored",
        }
    }

    pub fn parse(s: &str) -> Result<Self, String> {
        match s {
            "open" => Ok(FlagStatus::Open),
            "under_review" => Ok(FlagStatus::UnderReview),
            "resolved" => Ok(FlagStatus::Resolved),
            "removed" => Ok(FlagStatus::Removed),
            "restored" => Ok(FlagStatus::Restored),
            other => Err(format!(
                "Invalid flag status '{other}'. Must be one of: open, under_review, resolved, removed, restored"
            )),
        }
    }

    /// Statuses that count toward the auto-downgrade threshold and the
    /// auto-hide soft gate.
    pub fn counts_as_open(self) -> bool {
        matches!(self, FlagStatus::Open | FlagStatus::UnderReview)
    }
}

/// Decide whether a user should be demoted to the limited tier.
///
/// Only users whose current role is exactly the base member role are ever
/// demoted; moderators and admins are never auto-downgraded, and an already
/// limited user stays limited (the role write is a no-op).
pub fn should_downgrade(open_flag_count: i64, threshold: i64, current_role: &str) -> bool {
    open_flag_count >= threshold && current_role == ROLE_MEMBER
}
