//! Repository for the append-only `exchanges` ledger.
//!
//! This table only ever gains rows. Balances, histories, and statistics are
//! all derived by aggregation at read time; nothing here caches a balance.

use hourbank_core::types::DbId;
use sqlx::PgPool;

use crate::models::exchange::{
    Balance, CreateExchange, Exchange, ExchangeStatistics, StatisticsFilter, UserExchange,
    WorkedWith,
};

/// Column list for `exchanges` queries.
const COLUMNS: &str = "id, job_id, provider_id, requester_id, hours, region_id, created_at";

/// Role filter for a user's exchange history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExchangeRole {
    All,
    Earned,
    Spent,
}

impl ExchangeRole {
    pub fn parse(s: &str) -> Result<Self, String> {
        match s {
            "all" => Ok(ExchangeRole::All),
            "earned" => Ok(ExchangeRole::Earned),
            "spent" => Ok(ExchangeRole::Spent),
            other => Err(format!(
                "Invalid exchange type '{other}'. Must be one of: all, earned, spent"
            )),
        }
    }
}

/// Sort order for a user's exchange history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExchangeOrder {
    Newest,
    Oldest,
}

impl ExchangeOrder {
    pub fn parse(s: &str) -> Result<Self, String> {
        match s {
            "desc" => Ok(ExchangeOrder::Newest),
            "asc" => Ok(ExchangeOrder::Oldest),
            other => Err(format!("Invalid order '{other}'. Must be one of: asc, desc")),
        }
    }

    fn sql(self) -> &'static str {
        match self {
            ExchangeOrder::Newest => "DESC",
            ExchangeOrder::Oldest => "ASC",
        }
    }
}

/// Provides reads and the direct-insert path for exchanges.
pub struct ExchangeRepo;

impl ExchangeRepo {
    /// Record an exchange directly, returning the generated id.
    ///
    /// The job completion path does not call this; it inserts inside its own
    /// transaction. This method trusts its caller on exactly-once semantics
    /// -- the `uq_exchanges_job_id` constraint is the final backstop.
    pub async fn create(pool: &PgPool, input: &CreateExchange) -> Result<DbId, sqlx::Error> {
        sqlx::query_scalar(
            "INSERT INTO exchanges (job_id, provider_id, requester_id, hours, region_id) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING id",
        )
        .bind(input.job_id)
        .bind(input.provider_id)
        .bind(input.requester_id)
        .bind(input.hours)
        .bind(input.region_id)
        .fetch_one(pool)
        .await
    }

    /// Fetch an exchange by id.
    pub async fn get(pool: &PgPool, exchange_id: DbId) -> Result<Option<Exchange>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM exchanges WHERE id = $1");
        sqlx::query_as::<_, Exchange>(&query)
            .bind(exchange_id)
            .fetch_optional(pool)
            .await
    }

    /// Derive a user's balance from the full ledger. No locks: the ledger
    /// is append-only, so the read reflects whatever has committed.
    pub async fn balance(pool: &PgPool, user_id: DbId) -> Result<Balance, sqlx::Error> {
        sqlx::query_as::<_, Balance>(
            "SELECT \
                 COALESCE(SUM(hours) FILTER (WHERE provider_id = $1), 0) AS hours_earned, \
                 COALESCE(SUM(hours) FILTER (WHERE requester_id = $1), 0) AS hours_spent, \
                 COALESCE(SUM(hours) FILTER (WHERE provider_id = $1), 0) \
                   - COALESCE(SUM(hours) FILTER (WHERE requester_id = $1), 0) AS balance \
             FROM exchanges \
             WHERE provider_id = $1 OR requester_id = $1",
        )
        .bind(user_id)
        .fetch_one(pool)
        .await
    }

    /// List a user's exchanges joined with job titles, filtered by role and
    /// sorted by creation time in the requested direction.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
        role: ExchangeRole,
        order: ExchangeOrder,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<UserExchange>, sqlx::Error> {
        let role_filter = match role {
            ExchangeRole::All => "(e.provider_id = $1 OR e.requester_id = $1)",
            ExchangeRole::Earned => "e.provider_id = $1",
            ExchangeRole::Spent => "e.requester_id = $1",
        };
        let query = format!(
            "SELECT e.id, e.job_id, j.title AS job_title, e.provider_id, e.requester_id, \
                    e.hours, e.created_at \
             FROM exchanges e \
             JOIN jobs j ON j.id = e.job_id \
             WHERE {role_filter} \
             ORDER BY e.created_at {} \
             LIMIT $2 OFFSET $3",
            order.sql()
        );
        sqlx::query_as::<_, UserExchange>(&query)
            .bind(user_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Group a user's exchange history by counterpart, most recent first.
    pub async fn worked_with(pool: &PgPool, user_id: DbId) -> Result<Vec<WorkedWith>, sqlx::Error> {
        sqlx::query_as::<_, WorkedWith>(
            "SELECT \
                 CASE WHEN provider_id = $1 THEN requester_id ELSE provider_id END AS other_user_id, \
                 COUNT(*) AS total_exchanges, \
                 COALESCE(SUM(hours), 0) AS total_hours, \
                 COUNT(*) FILTER (WHERE provider_id = $1) AS jobs_provided, \
                 COUNT(*) FILTER (WHERE requester_id = $1) AS jobs_received, \
                 MAX(created_at) AS last_exchange_at \
             FROM exchanges \
             WHERE provider_id = $1 OR requester_id = $1 \
             GROUP BY 1 \
             ORDER BY last_exchange_at DESC",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// Aggregate statistics over the ledger, with optional filters.
    pub async fn statistics(
        pool: &PgPool,
        filter: &StatisticsFilter,
    ) -> Result<ExchangeStatistics, sqlx::Error> {
        sqlx::query_as::<_, ExchangeStatistics>(
            "SELECT \
                 COUNT(*) AS exchange_count, \
                 SUM(hours) AS total_hours, \
                 AVG(hours) AS avg_hours, \
                 MIN(hours) AS min_hours, \
                 MAX(hours) AS max_hours \
             FROM exchanges \
             WHERE ($1::bigint IS NULL OR provider_id = $1 OR requester_id = $1) \
               AND ($2::bigint IS NULL OR region_id = $2) \
               AND ($3::timestamptz IS NULL OR created_at >= $3) \
               AND ($4::timestamptz IS NULL OR created_at <= $4)",
        )
        .bind(filter.user_id)
        .bind(filter.region_id)
        .bind(filter.date_from)
        .bind(filter.date_to)
        .fetch_one(pool)
        .await
    }

    /// Number of exchanges recorded for a job. Used by tests to assert the
    /// at-most-one invariant.
    pub async fn count_for_job(pool: &PgPool, job_id: DbId) -> Result<i64, sqlx::Error> {
        let count: Option<i64> =
            sqlx::query_scalar("SELECT COUNT(*) FROM exchanges WHERE job_id = $1")
                .bind(job_id)
                .fetch_one(pool)
                .await?;
        Ok(count.unwrap_or(0))
    }
}
