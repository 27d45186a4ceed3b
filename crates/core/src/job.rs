//! Job lifecycle rules.
//!
//! A job moves `open -> claimed -> completed`, with `claimed -> open` on
//! release. The guards here are pure functions over row facts; the
//! repository layer enforces the same conditions once more inside its
//! compare-and-swap statements so concurrent transitions cannot both win.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::roles::ROLE_ADMIN;
use crate::types::DbId;

/// Visibility of a job listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobVisibility {
    Public,
    Hidden,
    Private,
}

impl JobVisibility {
    pub fn as_str(self) -> &'static str {
        match self {
            JobVisibility::Public => "public",
            JobVisibility::Hidden => "hidden",
            JobVisibility::Private => "private",
        }
    }

    pub fn parse(s: &str) -> Result<Self, String> {
        match s {
            "public" => Ok(JobVisibility::Public),
            "hidden" => Ok(JobVisibility::Hidden),
            "private" => Ok(JobVisibility::Private),
            other => Err(format!(
                "Invalid visibility '{other}'. Must be one of: public, hidden, private"
            )),
        }
    }
}

/// Derived job status. Never stored; computed from `provider_id` and
/// `completed_at`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Open,
    Claimed,
    Completed,
}

impl JobStatus {
    pub fn derive(provider_id: Option<DbId>, completed: bool) -> Self {
        if completed {
            JobStatus::Completed
        } else if provider_id.is_some() {
            JobStatus::Claimed
        } else {
            JobStatus::Open
        }
    }
}

/// Guard for `claim`: the claimant must not be the requester, the job must
/// still be open, and nobody else may hold it.
pub fn check_claim(
    requester_id: DbId,
    provider_id: Option<DbId>,
    completed: bool,
    claimant_id: DbId,
) -> Result<(), CoreError> {
    if claimant_id == requester_id {
        return Err(CoreError::Forbidden(
            "You cannot claim your own job".into(),
        ));
    }
    if completed {
        return Err(CoreError::Conflict("Job is already completed".into()));
    }
    if provider_id.is_some() {
        return Err(CoreError::Conflict("Job already has a provider".into()));
    }
    Ok(())
}

/// Guard for `release`: only the current provider may release, and only
/// before completion.
pub fn check_release(
    provider_id: Option<DbId>,
    completed: bool,
    actor_id: DbId,
) -> Result<(), CoreError> {
    if completed {
        return Err(CoreError::Conflict("Job is already completed".into()));
    }
    if provider_id != Some(actor_id) {
        return Err(CoreError::Forbidden(
            "Only the current provider can release a job".into(),
        ));
    }
    Ok(())
}

/// Guard for `complete`: only the requester may complete, the job must be
/// claimed, and it must not already be completed.
pub fn check_complete(
    requester_id: DbId,
    provider_id: Option<DbId>,
    completed: bool,
    actor_id: DbId,
) -> Result<(), CoreError> {
    if actor_id != requester_id {
        return Err(CoreError::Forbidden(
            "Only the requester can complete a job".into(),
        ));
    }
    if completed {
        return Err(CoreError::Conflict("Job is already completed".into()));
    }
    if provider_id.is_none() {
        return Err(CoreError::Validation(
            "Job has no provider; it must be claimed before completion".into(),
        ));
    }
    Ok(())
}

/// Guard for `delete`: requester, provider, or an admin, and never after
/// completion (a completed job anchors an immutable exchange).
pub fn check_delete(
    requester_id: DbId,
    provider_id: Option<DbId>,
    completed: bool,
    actor_id: DbId,
    actor_role: &str,
) -> Result<(), CoreError> {
    if completed {
        return Err(CoreError::Conflict(
            "Completed jobs cannot be deleted".into(),
        ));
    }
    let is_party = actor_id == requester_id || provider_id == Some(actor_id);
    if !is_party && actor_role != ROLE_ADMIN {
        return Err(CoreError::Forbidden(
            "Only the requester, provider, or an admin can delete a job".into(),
        ));
    }
    Ok(())
}
