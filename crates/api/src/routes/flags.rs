//! Route definitions for the `/flags` resource.
//!
//! Reporting is open to every authenticated user; the queue and the
//! moderation actions enforce moderator role inside their handlers.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::flags;
use crate::state::AppState;

/// Routes mounted at `/flags`.
///
/// ```text
/// GET    /                        -> list_flags (moderator only)
/// POST   /                        -> create_flag
/// GET    /{id}                    -> get_flag (moderator only)
/// PATCH  /{id}                    -> update_flag_status (moderator only)
/// POST   /{id}/remove-content     -> remove_content (moderator only)
/// POST   /{id}/restore-content    -> restore_content (moderator only)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(flags::list_flags).post(flags::create_flag))
        .route("/{id}", get(flags::get_flag).patch(flags::update_flag_status))
        .route("/{id}/remove-content", post(flags::remove_content))
        .route("/{id}/restore-content", post(flags::restore_content))
}
