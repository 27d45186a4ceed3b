//! Route definitions for the `/appreciations` resource.
//!
//! Per-user and per-exchange listings are mounted under `/users` and
//! `/exchanges` respectively; only creation and the caller's own view live
//! here.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::appreciations;
use crate::state::AppState;

/// Routes mounted at `/appreciations`.
///
/// ```text
/// POST   /        -> create_appreciation
/// GET    /mine    -> my_appreciations (?direction=sent|received)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(appreciations::create_appreciation))
        .route("/mine", get(appreciations::my_appreciations))
}
