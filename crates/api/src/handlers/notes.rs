//! Handlers for the `/notes` resource: private notes about other users.
//!
//! Notes are visible to their author and no one else, moderators and
//! admins included. The authenticated user id is passed to the repository
//! as the author on every call; there is no handler that accepts an author
//! from the request.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use hourbank_core::error::CoreError;
use hourbank_core::types::DbId;
use hourbank_db::models::private_note::{CreatePrivateNote, PrivateNote, UpdatePrivateNote};
use hourbank_db::repositories::{PrivateNoteRepo, SettingsRepo};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Query parameters for `GET /notes`.
#[derive(Debug, Deserialize)]
pub struct NoteListQuery {
    /// Restrict to notes about one user.
    pub subject_id: Option<DbId>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// POST /api/v1/notes
///
/// Create a private note about another user.
pub async fn create_note(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreatePrivateNote>,
) -> AppResult<impl IntoResponse> {
    if input.subject_id == auth.user_id {
        return Err(AppError::Core(CoreError::Validation(
            "Cannot write a note about yourself".into(),
        )));
    }

    let settings = SettingsRepo::load(&state.pool).await?;
    settings
        .validate_note_tag(&input.tag_slug)
        .map_err(|e| AppError::Core(CoreError::Validation(e)))?;

    let note = PrivateNoteRepo::create(&state.pool, auth.user_id, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: note })))
}

/// GET /api/v1/notes
///
/// List the caller's own notes, optionally filtered to one subject.
pub async fn list_notes(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<NoteListQuery>,
) -> AppResult<Json<DataResponse<Vec<PrivateNote>>>> {
    let limit = params.limit.unwrap_or(50).min(100);
    let offset = params.offset.unwrap_or(0);

    let notes = PrivateNoteRepo::list_for_author(
        &state.pool,
        auth.user_id,
        params.subject_id,
        limit,
        offset,
    )
    .await?;
    Ok(Json(DataResponse { data: notes }))
}

/// PATCH /api/v1/notes/{id}
///
/// Update one of the caller's own notes. A note that exists but belongs to
/// someone else resolves as 404, identical to a missing one.
pub async fn update_note(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(note_id): Path<DbId>,
    Json(input): Json<UpdatePrivateNote>,
) -> AppResult<Json<DataResponse<PrivateNote>>> {
    if let Some(tag) = input.tag_slug.as_deref() {
        let settings = SettingsRepo::load(&state.pool).await?;
        settings
            .validate_note_tag(tag)
            .map_err(|e| AppError::Core(CoreError::Validation(e)))?;
    }

    let note = PrivateNoteRepo::update(&state.pool, auth.user_id, note_id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Note",
            id: note_id,
        }))?;
    Ok(Json(DataResponse { data: note }))
}

/// DELETE /api/v1/notes/{id}
///
/// Delete one of the caller's own notes. Same 404 behavior as update.
pub async fn delete_note(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(note_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let deleted = PrivateNoteRepo::delete(&state.pool, auth.user_id, note_id).await?;
    if !deleted {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Note",
            id: note_id,
        }));
    }
    Ok(StatusCode::NO_CONTENT)
}
