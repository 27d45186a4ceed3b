//! Job entity models and DTOs.

use hourbank_core::job::JobStatus;
use hourbank_core::types::{DbId, Timestamp};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `jobs` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Job {
    pub id: DbId,
    pub title: String,
    pub description: String,
    pub hours: Decimal,
    pub requester_id: DbId,
    pub provider_id: Option<DbId>,
    pub visibility: String,
    pub completed_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

impl Job {
    /// Derived lifecycle status; never stored.
    pub fn status(&self) -> JobStatus {
        JobStatus::derive(self.provider_id, self.completed_at.is_some())
    }
}

/// DTO for creating a job.
#[derive(Debug, Deserialize)]
pub struct CreateJob {
    pub title: String,
    pub description: Option<String>,
    pub hours: Decimal,
}
