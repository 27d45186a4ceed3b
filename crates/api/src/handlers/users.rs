//! Handlers for the `/users` resource: registration, public profiles, and
//! the admin role override.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use hourbank_core::error::CoreError;
use hourbank_core::roles::{validate_role, ROLE_MEMBER};
use hourbank_core::types::{DbId, Timestamp};
use hourbank_db::models::user::CreateUser;
use hourbank_db::repositories::UserRepo;
use serde::{Deserialize, Serialize};

use crate::auth::password::hash_password;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /users`.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Request body for `PUT /users/{id}/role`.
#[derive(Debug, Deserialize)]
pub struct SetRoleRequest {
    pub role: String,
}

/// Public view of a user. Email stays private to the account itself.
#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub id: DbId,
    pub username: String,
    pub role: String,
    pub created_at: Timestamp,
}

/// Minimum accepted password length for registration.
const MIN_PASSWORD_LEN: usize = 8;

/// POST /api/v1/users
///
/// Register a new member account. Username uniqueness is enforced by the
/// `uq_users_username` constraint and surfaces as 409.
pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterRequest>,
) -> AppResult<impl IntoResponse> {
    let username = input.username.trim();
    if username.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Username is required".into(),
        )));
    }
    if input.password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        ))));
    }

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            username: username.to_string(),
            email: input.email,
            password_hash,
            role: Some(ROLE_MEMBER.to_string()),
        },
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: public_view(user),
        }),
    ))
}

/// GET /api/v1/users/{id}
///
/// Public profile of a user.
pub async fn get_user(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(user_id): Path<DbId>,
) -> AppResult<Json<DataResponse<PublicUser>>> {
    let user = UserRepo::get(&state.pool, user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: user_id,
        }))?;
    Ok(Json(DataResponse {
        data: public_view(user),
    }))
}

/// PUT /api/v1/users/{id}/role
///
/// Set a user's role directly. Admin only; this is the manual override for
/// promotions and for lifting an auto-downgrade.
pub async fn set_role(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(user_id): Path<DbId>,
    Json(input): Json<SetRoleRequest>,
) -> AppResult<Json<DataResponse<PublicUser>>> {
    validate_role(&input.role).map_err(|e| AppError::Core(CoreError::Validation(e)))?;

    let updated = UserRepo::set_role(&state.pool, user_id, &input.role).await?;
    if !updated {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: user_id,
        }));
    }
    tracing::info!(user_id, role = %input.role, admin_id = admin.user_id, "Role updated");

    let user = UserRepo::get(&state.pool, user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: user_id,
        }))?;
    Ok(Json(DataResponse {
        data: public_view(user),
    }))
}

fn public_view(user: hourbank_db::models::user::User) -> PublicUser {
    PublicUser {
        id: user.id,
        username: user.username,
        role: user.role,
        created_at: user.created_at,
    }
}
