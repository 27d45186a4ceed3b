//! Handlers for the `/jobs` resource: the job lifecycle state machine.
//!
//! All endpoints require authentication via [`AuthUser`]. State transitions
//! are validated twice: the guards in `hourbank_core::job` produce precise
//! error kinds up front, and the repository compare-and-swap statements
//! settle races so concurrent transitions cannot both win.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use hourbank_core::error::CoreError;
use hourbank_core::job::{self, JobVisibility};
use hourbank_core::moderation::FlaggedItemKind;
use hourbank_core::rate_limit::{
    job_create_action_key, JOB_CREATE_LIMIT, JOB_CREATE_WINDOW_SECS,
};
use hourbank_core::roles::is_moderator;
use hourbank_core::types::DbId;
use hourbank_db::models::job::{CreateJob, Job};
use hourbank_db::models::message::TYPE_JOB_UPDATE;
use hourbank_db::repositories::{
    JobRepo, MessageRepo, RateLimitDecision, RateLimitRepo, SettingsRepo,
};
use hourbank_events::bus::{
    EVENT_EXCHANGE_CREATED, EVENT_JOB_CLAIMED, EVENT_JOB_COMPLETED, EVENT_JOB_CREATED,
    EVENT_JOB_RELEASED,
};
use hourbank_events::PlatformEvent;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::moderation;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Query / request types
// ---------------------------------------------------------------------------

/// Query parameters for `GET /jobs`.
#[derive(Debug, Deserialize)]
pub struct JobListQuery {
    /// Maximum number of results. Defaults to 50, capped at 100.
    pub limit: Option<i64>,
    /// Number of results to skip. Defaults to 0.
    pub offset: Option<i64>,
}

/// Request body for `POST /jobs/{id}/release`.
#[derive(Debug, Deserialize)]
pub struct ReleaseRequest {
    pub reason: Option<String>,
}

/// Request body for `POST /jobs/{id}/complete`.
#[derive(Debug, Deserialize)]
pub struct CompleteRequest {
    /// Replaces the job's hours of record before the exchange is minted.
    pub hours_override: Option<Decimal>,
}

/// Maximum page size for job listing.
const MAX_LIMIT: i64 = 100;

/// Default page size for job listing.
const DEFAULT_LIMIT: i64 = 50;

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/jobs
///
/// Create an open, public job. Validates the hours range and rate-limits
/// creation per requester before persisting anything.
pub async fn create_job(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateJob>,
) -> AppResult<impl IntoResponse> {
    if input.title.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Title is required".into(),
        )));
    }
    hourbank_core::hours::validate_hours(input.hours)
        .map_err(|e| AppError::Core(CoreError::Validation(e)))?;

    check_rate_limit(
        &state,
        &job_create_action_key(),
        auth.user_id,
        JOB_CREATE_LIMIT,
        JOB_CREATE_WINDOW_SECS,
    )
    .await?;

    let job = JobRepo::create(&state.pool, auth.user_id, &input).await?;

    state.event_bus.publish(
        PlatformEvent::new(EVENT_JOB_CREATED)
            .with_source("job", job.id)
            .with_actor(auth.user_id),
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: job })))
}

/// GET /api/v1/jobs
///
/// List jobs visible to the caller, newest first. Moderators see hidden
/// jobs; everyone else sees public jobs plus their own, with open-flagged
/// jobs additionally suppressed while auto-hide is enabled.
pub async fn list_jobs(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<JobListQuery>,
) -> AppResult<Json<DataResponse<Vec<Job>>>> {
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT);
    let offset = params.offset.unwrap_or(0);

    let include_hidden = is_moderator(&auth.role);
    let settings = SettingsRepo::load(&state.pool).await?;
    let apply_flag_gate = settings.auto_hide_enabled && !include_hidden;

    let jobs = JobRepo::list_visible(
        &state.pool,
        auth.user_id,
        include_hidden,
        apply_flag_gate,
        limit,
        offset,
    )
    .await?;

    Ok(Json(DataResponse { data: jobs }))
}

/// GET /api/v1/jobs/{id}
///
/// Fetch one job. Hidden or flag-suppressed jobs resolve as 404 for anyone
/// who is not a party to them or a moderator.
pub async fn get_job(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(job_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Job>>> {
    let job = fetch_job(&state, job_id).await?;

    let is_party = job.requester_id == auth.user_id || job.provider_id == Some(auth.user_id);
    if !is_party && !is_moderator(&auth.role) {
        if job.visibility != JobVisibility::Public.as_str() {
            return Err(not_found(job_id));
        }
        let settings = SettingsRepo::load(&state.pool).await?;
        let visible =
            moderation::is_content_visible(&state.pool, &settings, FlaggedItemKind::Job, job_id)
                .await?;
        if !visible {
            return Err(not_found(job_id));
        }
    }

    Ok(Json(DataResponse { data: job }))
}

/// POST /api/v1/jobs/{id}/claim
///
/// Claim an open job as its provider. Exactly one of any number of
/// concurrent claimants wins.
pub async fn claim_job(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(job_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Job>>> {
    let current = fetch_job(&state, job_id).await?;
    job::check_claim(
        current.requester_id,
        current.provider_id,
        current.completed_at.is_some(),
        auth.user_id,
    )?;

    let won = JobRepo::claim(&state.pool, job_id, auth.user_id).await?;
    if !won {
        return Err(AppError::Core(CoreError::Conflict(
            "Job already has a provider".into(),
        )));
    }

    notify(
        &state,
        Some(auth.user_id),
        current.requester_id,
        &format!("Your job \"{}\" has been claimed", current.title),
        job_id,
    )
    .await;

    state.event_bus.publish(
        PlatformEvent::new(EVENT_JOB_CLAIMED)
            .with_source("job", job_id)
            .with_actor(auth.user_id),
    );

    let job = fetch_job(&state, job_id).await?;
    Ok(Json(DataResponse { data: job }))
}

/// POST /api/v1/jobs/{id}/release
///
/// Release a claimed job back to open. Only the current provider may
/// release; the requester is notified with the optional reason.
pub async fn release_job(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(job_id): Path<DbId>,
    Json(input): Json<ReleaseRequest>,
) -> AppResult<Json<DataResponse<Job>>> {
    let current = fetch_job(&state, job_id).await?;
    job::check_release(current.provider_id, current.completed_at.is_some(), auth.user_id)?;

    let released = JobRepo::release(&state.pool, job_id, auth.user_id).await?;
    if !released {
        return Err(AppError::Core(CoreError::Conflict(
            "Job is no longer held by you".into(),
        )));
    }

    let body = match input.reason.as_deref() {
        Some(reason) => format!(
            "Your job \"{}\" was released back to open: {reason}",
            current.title
        ),
        None => format!("Your job \"{}\" was released back to open", current.title),
    };
    notify(&state, Some(auth.user_id), current.requester_id, &body, job_id).await;

    state.event_bus.publish(
        PlatformEvent::new(EVENT_JOB_RELEASED)
            .with_source("job", job_id)
            .with_actor(auth.user_id),
    );

    let job = fetch_job(&state, job_id).await?;
    Ok(Json(DataResponse { data: job }))
}

/// POST /api/v1/jobs/{id}/complete
///
/// Complete a claimed job and mint its exchange. Requester only. The
/// completion and the exchange insert are one transaction keyed on
/// `completed_at IS NULL`, so concurrent attempts yield exactly one
/// exchange.
pub async fn complete_job(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(job_id): Path<DbId>,
    Json(input): Json<CompleteRequest>,
) -> AppResult<Json<serde_json::Value>> {
    let current = fetch_job(&state, job_id).await?;
    job::check_complete(
        current.requester_id,
        current.provider_id,
        current.completed_at.is_some(),
        auth.user_id,
    )?;

    if let Some(hours) = input.hours_override {
        hourbank_core::hours::validate_hours(hours)
            .map_err(|e| AppError::Core(CoreError::Validation(e)))?;
    }

    let Some(exchange_id) = JobRepo::complete(&state.pool, job_id, input.hours_override).await?
    else {
        return Err(AppError::Core(CoreError::Conflict(
            "Job is already completed".into(),
        )));
    };

    if let Some(provider_id) = current.provider_id {
        notify(
            &state,
            Some(auth.user_id),
            provider_id,
            &format!("Job \"{}\" was completed and your hours credited", current.title),
            job_id,
        )
        .await;
    }

    state.event_bus.publish(
        PlatformEvent::new(EVENT_JOB_COMPLETED)
            .with_source("job", job_id)
            .with_actor(auth.user_id),
    );
    state.event_bus.publish(
        PlatformEvent::new(EVENT_EXCHANGE_CREATED)
            .with_source("exchange", exchange_id)
            .with_actor(auth.user_id),
    );

    Ok(Json(serde_json::json!({
        "data": { "exchange_id": exchange_id }
    })))
}

/// DELETE /api/v1/jobs/{id}
///
/// Delete an uncompleted job. Permitted to the requester, the provider, or
/// an admin; completed jobs anchor an exchange and are never deletable.
pub async fn delete_job(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(job_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let current = fetch_job(&state, job_id).await?;
    job::check_delete(
        current.requester_id,
        current.provider_id,
        current.completed_at.is_some(),
        auth.user_id,
        &auth.role,
    )?;

    let deleted = JobRepo::delete(&state.pool, job_id).await?;
    if !deleted {
        return Err(AppError::Core(CoreError::Conflict(
            "Job is already completed".into(),
        )));
    }

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn fetch_job(state: &AppState, job_id: DbId) -> AppResult<Job> {
    JobRepo::get(&state.pool, job_id)
        .await?
        .ok_or_else(|| not_found(job_id))
}

fn not_found(job_id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Job",
        id: job_id,
    })
}

/// Best-effort job-update notification. Failure is logged; the transition
/// it reports already committed and must stand.
async fn notify(state: &AppState, from: Option<DbId>, to: DbId, body: &str, job_id: DbId) {
    if let Err(e) =
        MessageRepo::send(&state.pool, from, to, body, TYPE_JOB_UPDATE, Some(job_id)).await
    {
        tracing::error!(error = %e, to_user_id = to, job_id, "Failed to send job notification");
    }
}

/// Shared increment-and-compare against the fixed-window limiter.
pub(crate) async fn check_rate_limit(
    state: &AppState,
    action: &str,
    actor_id: DbId,
    limit: i64,
    period_secs: i64,
) -> AppResult<()> {
    match RateLimitRepo::check_and_increment(&state.pool, action, actor_id, limit, period_secs)
        .await?
    {
        RateLimitDecision::Allowed => Ok(()),
        RateLimitDecision::Limited { retry_after_secs } => {
            Err(AppError::Core(CoreError::RateLimited { retry_after_secs }))
        }
    }
}
