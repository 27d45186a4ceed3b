//! Handlers for the `/appreciations` resource.
//!
//! Appreciations hang off exchanges: one cannot be recorded without a real
//! exchange between the two users. There is no per-tag uniqueness; clients
//! send one request per selected tag.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use hourbank_core::error::CoreError;
use hourbank_core::roles::is_moderator;
use hourbank_core::types::DbId;
use hourbank_db::models::appreciation::{Appreciation, CreateAppreciation};
use hourbank_db::repositories::{AppreciationRepo, ExchangeRepo, SettingsRepo};
use hourbank_events::bus::EVENT_APPRECIATION_CREATED;
use hourbank_events::PlatformEvent;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Pagination parameters shared by the list endpoints.
#[derive(Debug, Deserialize)]
pub struct AppreciationListQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Query parameters for `GET /appreciations/mine`.
#[derive(Debug, Deserialize)]
pub struct MineQuery {
    /// `sent` or `received`. Defaults to `received`.
    pub direction: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// POST /api/v1/appreciations
///
/// Record an appreciation against an exchange. The exchange must exist,
/// the sender must be one of its parties, and the recipient must be the
/// counterpart; otherwise the request fails validation with no row written.
pub async fn create_appreciation(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateAppreciation>,
) -> AppResult<impl IntoResponse> {
    let exchange = ExchangeRepo::get(&state.pool, input.exchange_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Validation(format!(
                "Invalid exchange {}",
                input.exchange_id
            )))
        })?;

    let counterpart = if exchange.provider_id == auth.user_id {
        exchange.requester_id
    } else if exchange.requester_id == auth.user_id {
        exchange.provider_id
    } else {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Invalid exchange {}",
            input.exchange_id
        ))));
    };
    if input.to_user_id != counterpart {
        return Err(AppError::Core(CoreError::Validation(
            "Recipient is not the other party of this exchange".into(),
        )));
    }

    let settings = SettingsRepo::load(&state.pool).await?;
    settings
        .validate_appreciation_tag(&input.tag_slug)
        .map_err(|e| AppError::Core(CoreError::Validation(e)))?;

    let appreciation = AppreciationRepo::create(&state.pool, auth.user_id, &input).await?;

    state.event_bus.publish(
        PlatformEvent::new(EVENT_APPRECIATION_CREATED)
            .with_source("appreciation", appreciation.id)
            .with_actor(auth.user_id),
    );

    Ok((
        StatusCode::CREATED,
        Json(DataResponse { data: appreciation }),
    ))
}

/// GET /api/v1/appreciations/mine
///
/// The caller's own appreciations. `sent` includes hidden rows (authors
/// always see what they wrote); `received` is the public view of oneself.
pub async fn my_appreciations(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<MineQuery>,
) -> AppResult<Json<DataResponse<Vec<Appreciation>>>> {
    let limit = params.limit.unwrap_or(50).min(100);
    let offset = params.offset.unwrap_or(0);

    let rows = match params.direction.as_deref().unwrap_or("received") {
        "sent" => {
            AppreciationRepo::list_sent_by_user(&state.pool, auth.user_id, limit, offset).await?
        }
        "received" => {
            AppreciationRepo::list_public_for_user(&state.pool, auth.user_id, limit, offset)
                .await?
        }
        other => {
            return Err(AppError::Core(CoreError::Validation(format!(
                "Invalid direction '{other}'. Must be one of: sent, received"
            ))));
        }
    };

    Ok(Json(DataResponse { data: rows }))
}

/// GET /api/v1/users/{id}/appreciations
///
/// Public appreciations received by a user, newest first.
pub async fn list_for_user(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(user_id): Path<DbId>,
    Query(params): Query<AppreciationListQuery>,
) -> AppResult<Json<DataResponse<Vec<Appreciation>>>> {
    let limit = params.limit.unwrap_or(50).min(100);
    let offset = params.offset.unwrap_or(0);

    let rows =
        AppreciationRepo::list_public_for_user(&state.pool, user_id, limit, offset).await?;
    Ok(Json(DataResponse { data: rows }))
}

/// GET /api/v1/exchanges/{id}/appreciations
///
/// Everything attached to one exchange, visible to its parties and to
/// moderators.
pub async fn list_for_exchange(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(exchange_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<Appreciation>>>> {
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

    let rows = AppreciationRepo::list_for_exchange(&state.pool, exchange_id).await?;
    Ok(Json(DataResponse { data: rows }))
}
