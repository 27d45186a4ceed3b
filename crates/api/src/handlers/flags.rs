//! Handlers for the `/flags` resource: reporting and the moderation queue.
//!
//! Flag creation drives three follow-on effects in order: immediate
//! auto-hide of the flagged content, a moderation alert to every
//! moderator/admin, and the auto-downgrade check for the implicated user.
//! The flag row commits first; the follow-ons never roll it back.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use hourbank_core::error::CoreError;
use hourbank_core::moderation::{FlagStatus, FlaggedItemKind};
use hourbank_core::rate_limit::{flag_action_key, FLAG_LIMIT, FLAG_WINDOW_SECS};
use hourbank_core::types::DbId;
use hourbank_db::models::flag::{CreateFlag, Flag, UpdateFlagStatus};
use hourbank_db::repositories::{FlagRepo, SettingsRepo};
use hourbank_events::bus::{EVENT_FLAG_CREATED, EVENT_FLAG_UPDATED};
use hourbank_events::PlatformEvent;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::handlers::jobs::check_rate_limit;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireModerator;
use crate::moderation;
use crate::response::DataResponse;
use crate::state::AppState;

/// Query parameters for `GET /flags`.
#[derive(Debug, Deserialize)]
pub struct FlagListQuery {
    pub status: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// POST /api/v1/flags
///
/// Report content or a user. Rate-limited per reporter per item; the
/// reason must come from the configured set.
pub async fn create_flag(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateFlag>,
) -> AppResult<impl IntoResponse> {
    let kind = FlaggedItemKind::parse(&input.flagged_item_type)
        .map_err(|e| AppError::Core(CoreError::Validation(e)))?;

    let settings = SettingsRepo::load(&state.pool).await?;
    settings
        .validate_flag_reason(&input.reason_slug)
        .map_err(|e| AppError::Core(CoreError::Validation(e)))?;

    check_rate_limit(
        &state,
        &flag_action_key(kind.as_str(), input.flagged_item_id),
        auth.user_id,
        FLAG_LIMIT,
        FLAG_WINDOW_SECS,
    )
    .await?;

    let flag = FlagRepo::create(&state.pool, auth.user_id, &input).await?;

    // The flag row is committed; everything from here on is best-effort and
    // must not turn an already-persisted report into an error response.
    if settings.auto_hide_enabled && kind.supports_auto_hide() {
        if let Err(e) = moderation::apply_auto_hide(&state.pool, kind, flag.flagged_item_id).await
        {
            tracing::error!(error = %e, flag_id = flag.id, "Auto-hide failed after flag commit");
        }
    }

    moderation::alert_moderators(
        &state.pool,
        &format!(
            "New {} flag #{} ({}) awaiting review",
            kind.as_str(),
            flag.id,
            flag.reason_slug
        ),
        Some(flag.id),
    )
    .await;

    state.event_bus.publish(
        PlatformEvent::new(EVENT_FLAG_CREATED)
            .with_source("flag", flag.id)
            .with_actor(auth.user_id)
            .with_payload(serde_json::json!({
                "item_type": kind.as_str(),
                "item_id": flag.flagged_item_id,
            })),
    );

    // A user flag implicates its item id directly; content flags carry the
    // implicated user separately.
    let implicated = match kind {
        FlaggedItemKind::User => Some(flag.flagged_item_id),
        _ => flag.flagged_user_id,
    };
    if let Some(user_id) = implicated {
        if let Err(e) =
            moderation::run_auto_downgrade(&state.pool, &state.event_bus, &settings, user_id).await
        {
            tracing::error!(error = %e, flag_id = flag.id, user_id, "Auto-downgrade check failed");
        }
    }

    Ok((StatusCode::CREATED, Json(DataResponse { data: flag })))
}

/// GET /api/v1/flags
///
/// The moderation review queue, newest first, optionally filtered by
/// status. Moderator only.
pub async fn list_flags(
    RequireModerator(_mod): RequireModerator,
    State(state): State<AppState>,
    Query(params): Query<FlagListQuery>,
) -> AppResult<Json<DataResponse<Vec<Flag>>>> {
    if let Some(status) = params.status.as_deref() {
        FlagStatus::parse(status).map_err(|e| AppError::Core(CoreError::Validation(e)))?;
    }
    let limit = params.limit.unwrap_or(50).min(100);
    let offset = params.offset.unwrap_or(0);

    let flags =
        FlagRepo::list_for_review(&state.pool, params.status.as_deref(), limit, offset).await?;
    Ok(Json(DataResponse { data: flags }))
}

/// GET /api/v1/flags/{id}
///
/// Fetch one flag. Moderator only.
pub async fn get_flag(
    RequireModerator(_mod): RequireModerator,
    State(state): State<AppState>,
    Path(flag_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Flag>>> {
    let flag = FlagRepo::get(&state.pool, flag_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Flag",
            id: flag_id,
        }))?;
    Ok(Json(DataResponse { data: flag }))
}

/// PATCH /api/v1/flags/{id}
///
/// Move a flag to a new status. Any status can follow any other, so
/// moderators can revisit earlier decisions; only the status *string* is
/// validated.
pub async fn update_flag_status(
    RequireModerator(moderator): RequireModerator,
    State(state): State<AppState>,
    Path(flag_id): Path<DbId>,
    Json(input): Json<UpdateFlagStatus>,
) -> AppResult<Json<DataResponse<Flag>>> {
    let status = FlagStatus::parse(&input.status)
        .map_err(|e| AppError::Core(CoreError::Validation(e)))?;

    let flag = FlagRepo::update_status(
        &state.pool,
        flag_id,
        status.as_str(),
        moderator.user_id,
        input.resolution_note.as_deref(),
    )
    .await?
    .ok_or(AppError::Core(CoreError::NotFound {
        entity: "Flag",
        id: flag_id,
    }))?;

    state.event_bus.publish(
        PlatformEvent::new(EVENT_FLAG_UPDATED)
            .with_source("flag", flag.id)
            .with_actor(moderator.user_id)
            .with_payload(serde_json::json!({ "status": flag.status })),
    );

    Ok(Json(DataResponse { data: flag }))
}

/// POST /api/v1/flags/{id}/remove-content
///
/// Suppress the flagged content's visibility. Independent of the flag's
/// status; pairing it with a status update is the moderator's call.
pub async fn remove_content(
    RequireModerator(moderator): RequireModerator,
    State(state): State<AppState>,
    Path(flag_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let (kind, item_id) = flagged_item(&state, flag_id).await?;
    moderation::remove_content(&state.pool, kind, item_id).await?;
    tracing::info!(flag_id, item_id, kind = kind.as_str(), moderator_id = moderator.user_id, "Content removed");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/flags/{id}/restore-content
///
/// Restore the flagged content's visibility.
pub async fn restore_content(
    RequireModerator(moderator): RequireModerator,
    State(state): State<AppState>,
    Path(flag_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let (kind, item_id) = flagged_item(&state, flag_id).await?;
    moderation::restore_content(&state.pool, kind, item_id).await?;
    tracing::info!(flag_id, item_id, kind = kind.as_str(), moderator_id = moderator.user_id, "Content restored");
    Ok(StatusCode::NO_CONTENT)
}

async fn flagged_item(state: &AppState, flag_id: DbId) -> AppResult<(FlaggedItemKind, DbId)> {
    let flag = FlagRepo::get(&state.pool, flag_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Flag",
            id: flag_id,
        }))?;
    let kind = FlaggedItemKind::parse(&flag.flagged_item_type)
        .map_err(|e| AppError::InternalError(format!("Corrupt flag row: {e}")))?;
    Ok((kind, flag.flagged_item_id))
}
