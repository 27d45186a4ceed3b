//! Route definitions for the `/exchanges` resource.
//!
//! Static segments are registered alongside `/{id}`; the router prefers
//! the static match, so `/balance` and friends never collide with ids.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{appreciations, exchanges};
use crate::state::AppState;

/// Routes mounted at `/exchanges`.
///
/// ```text
/// POST   /                     -> create_exchange (admin only)
/// GET    /balance              -> my_balance
/// GET    /mine                 -> my_exchanges
/// GET    /worked-with          -> worked_with
/// GET    /statistics           -> statistics (moderator only)
/// GET    /{id}                 -> get_exchange
/// GET    /{id}/appreciations   -> appreciations on one exchange
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(exchanges::create_exchange))
        .route("/balance", get(exchanges::my_balance))
        .route("/mine", get(exchanges::my_exchanges))
        .route("/worked-with", get(exchanges::worked_with))
        .route("/statistics", get(exchanges::statistics))
        .route("/{id}", get(exchanges::get_exchange))
        .route("/{id}/appreciations", get(appreciations::list_for_exchange))
}
