//! Route definitions for the `/notes` resource. Author-only throughout.

use axum::routing::{get, patch};
use axum::Router;

use crate::handlers::notes;
use crate::state::AppState;

/// Routes mounted at `/notes`.
///
/// ```text
/// GET    /        -> list_notes (?subject_id)
/// POST   /        -> create_note
/// PATCH  /{id}    -> update_note
/// DELETE /{id}    -> delete_note
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(notes::list_notes).post(notes::create_note))
        .route("/{id}", patch(notes::update_note).delete(notes::delete_note))
}
