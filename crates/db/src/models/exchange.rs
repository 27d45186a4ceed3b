//! Exchange ledger models and derived read shapes.

use hourbank_core::types::{DbId, Timestamp};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the append-only `exchanges` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Exchange {
    pub id: DbId,
    pub job_id: DbId,
    pub provider_id: DbId,
    pub requester_id: DbId,
    pub hours: Decimal,
    pub region_id: Option<DbId>,
    pub created_at: Timestamp,
}

/// DTO for recording an exchange directly (the job completion path builds
/// its own insert inside the completion transaction).
#[derive(Debug, Deserialize)]
pub struct CreateExchange {
    pub job_id: DbId,
    pub provider_id: DbId,
    pub requester_id: DbId,
    pub hours: Decimal,
    pub region_id: Option<DbId>,
}

/// Derived net position for a user. Never stored.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Balance {
    pub hours_earned: Decimal,
    pub hours_spent: Decimal,
    pub balance: Decimal,
}

/// One exchange as seen from a particular user's history, joined with the
/// job title for display.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UserExchange {
    pub id: DbId,
    pub job_id: DbId,
    pub job_title: String,
    pub provider_id: DbId,
    pub requester_id: DbId,
    pub hours: Decimal,
    pub created_at: Timestamp,
}

/// Aggregated history with one counterpart, sorted by most recent interaction.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct WorkedWith {
    pub other_user_id: DbId,
    pub total_exchanges: i64,
    pub total_hours: Decimal,
    pub jobs_provided: i64,
    pub jobs_received: i64,
    pub last_exchange_at: Timestamp,
}

/// Aggregate ledger statistics.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ExchangeStatistics {
    pub exchange_count: i64,
    pub total_hours: Option<Decimal>,
    pub avg_hours: Option<Decimal>,
    pub min_hours: Option<Decimal>,
    pub max_hours: Option<Decimal>,
}

/// Filters for [`ExchangeStatistics`] queries.
#[derive(Debug, Default, Deserialize)]
pub struct StatisticsFilter {
    pub user_id: Option<DbId>,
    pub region_id: Option<DbId>,
    pub date_from: Option<Timestamp>,
    pub date_to: Option<Timestamp>,
}
