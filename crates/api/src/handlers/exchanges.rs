//! Handlers for the `/exchanges` resource: the append-only hour ledger and
//! the read shapes derived from it.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use hourbank_core::error::CoreError;
use hourbank_core::roles::is_moderator;
use hourbank_core::types::DbId;
use hourbank_db::models::exchange::{Balance, CreateExchange, Exchange, StatisticsFilter, UserExchange, WorkedWith};
use hourbank_db::models::private_note::PrivateNote;
use hourbank_db::repositories::{ExchangeOrder, ExchangeRepo, ExchangeRole, PrivateNoteRepo};
use hourbank_events::bus::EVENT_EXCHANGE_CREATED;
use hourbank_events::PlatformEvent;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::{RequireAdmin, RequireModerator};
use crate::response::DataResponse;
use crate::state::AppState;

/// Query parameters for `GET /exchanges/mine`.
#[derive(Debug, Deserialize)]
pub struct ExchangeListQuery {
    /// One of `all`, `earned`, `spent`. Defaults to `all`.
    #[serde(rename = "type")]
    pub role: Option<String>,
    /// `desc` (newest first, the default) or `asc`.
    pub order: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Query parameters for `GET /exchanges/worked-with`.
#[derive(Debug, Deserialize)]
pub struct WorkedWithQuery {
    /// Attach the caller's latest private note per counterpart.
    pub include_notes: Option<bool>,
}

/// A worked-with summary, optionally annotated with the caller's own latest
/// note about that counterpart. The note never belongs to anyone else; it
/// is looked up with the caller as author.
#[derive(Debug, Serialize)]
pub struct WorkedWithEntry {
    #[serde(flatten)]
    pub summary: WorkedWith,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_note: Option<PrivateNote>,
}

/// POST /api/v1/exchanges
///
/// Record an exchange directly, outside the job completion path. Admin
/// only; the `uq_exchanges_job_id` constraint still guarantees at most one
/// exchange per job and surfaces as 409.
pub async fn create_exchange(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateExchange>,
) -> AppResult<impl IntoResponse> {
    hourbank_core::hours::validate_hours(input.hours)
        .map_err(|e| AppError::Core(CoreError::Validation(e)))?;
    if input.provider_id == input.requester_id {
        return Err(AppError::Core(CoreError::Validation(
            "Provider and requester must be different users".into(),
        )));
    }

    let exchange_id = ExchangeRepo::create(&state.pool, &input).await?;

    state.event_bus.publish(
        PlatformEvent::new(EVENT_EXCHANGE_CREATED)
            .with_source("exchange", exchange_id)
            .with_actor(admin.user_id),
    );

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "data": { "exchange_id": exchange_id } })),
    ))
}

/// GET /api/v1/exchanges/{id}
///
/// Fetch one exchange. Visible to its two parties and to moderators.
pub async fn get_exchange(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(exchange_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Exchange>>> {
    let exchange = ExchangeRepo::get(&state.pool, exchange_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Exchange",
            id: exchange_id,
        }))?;

    let is_party =
        exchange.provider_id == auth.user_id || exchange.requester_id == auth.user_id;
    if !is_party && !is_moderator(&auth.role) {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Exchange",
            id: exchange_id,
        }));
    }

    Ok(Json(DataResponse { data: exchange }))
}

/// GET /api/v1/exchanges/balance
///
/// The caller's derived net position: hours earned, hours spent, balance.
pub async fn my_balance(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Balance>>> {
    let balance = ExchangeRepo::balance(&state.pool, auth.user_id).await?;
    Ok(Json(DataResponse { data: balance }))
}

/// GET /api/v1/exchanges/mine
///
/// The caller's exchange history, newest first unless `order=asc`,
/// filtered by role.
pub async fn my_exchanges(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<ExchangeListQuery>,
) -> AppResult<Json<DataResponse<Vec<UserExchange>>>> {
    let role = match params.role.as_deref() {
        Some(s) => ExchangeRole::parse(s)
            .map_err(|e| AppError::Core(CoreError::Validation(e)))?,
        None => ExchangeRole::All,
    };
    let order = match params.order.as_deref() {
        Some(s) => ExchangeOrder::parse(s)
            .map_err(|e| AppError::Core(CoreError::Validation(e)))?,
        None => ExchangeOrder::Newest,
    };
    let limit = params.limit.unwrap_or(50).min(100);
    let offset = params.offset.unwrap_or(0);

    let exchanges =
        ExchangeRepo::list_for_user(&state.pool, auth.user_id, role, order, limit, offset).await?;
    Ok(Json(DataResponse { data: exchanges }))
}

/// GET /api/v1/exchanges/worked-with
///
/// Counterpart summary of the caller's ledger history, most recent first.
/// With `include_notes=true`, each entry carries the caller's latest
/// private note about that counterpart.
pub async fn worked_with(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<WorkedWithQuery>,
) -> AppResult<Json<DataResponse<Vec<WorkedWithEntry>>>> {
    let summaries = ExchangeRepo::worked_with(&state.pool, auth.user_id).await?;

    let include_notes = params.include_notes.unwrap_or(false);
    let mut entries = Vec::with_capacity(summaries.len());
    for summary in summaries {
        let latest_note = if include_notes {
            PrivateNoteRepo::latest_for_subject(&state.pool, auth.user_id, summary.other_user_id)
                .await?
        } else {
            None
        };
        entries.push(WorkedWithEntry {
            summary,
            latest_note,
        });
    }

    Ok(Json(DataResponse { data: entries }))
}

/// GET /api/v1/exchanges/statistics
///
/// Aggregate ledger statistics, moderator only.
pub async fn statistics(
    RequireModerator(_mod): RequireModerator,
    State(state): State<AppState>,
    Query(filter): Query<StatisticsFilter>,
) -> AppResult<Json<DataResponse<hourbank_db::models::exchange::ExchangeStatistics>>> {
    let stats = ExchangeRepo::statistics(&state.pool, &filter).await?;
    Ok(Json(DataResponse { data: stats }))
}
