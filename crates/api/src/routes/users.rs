//! Route definitions for the `/users` resource.
//!
//! Registration is public; everything else requires authentication.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::{appreciations, users};
use crate::state::AppState;

/// Routes mounted at `/users`.
///
/// ```text
/// POST   /                       -> register (public)
/// GET    /{id}                   -> get_user
/// PUT    /{id}/role              -> set_role (admin only)
/// GET    /{id}/appreciations     -> public appreciations received
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(users::register))
        .route("/{id}", get(users::get_user))
        .route("/{id}/role", put(users::set_role))
        .route("/{id}/appreciations", get(appreciations::list_for_user))
}
