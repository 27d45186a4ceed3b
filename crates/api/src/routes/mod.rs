pub mod appreciations;
pub mod auth;
pub mod exchanges;
pub mod flags;
pub mod health;
pub mod jobs;
pub mod notes;
pub mod users;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/login                      login (public)
///
/// /users                           register (public)
/// /users/{id}                      public profile
/// /users/{id}/role                 set role (admin only, PUT)
/// /users/{id}/appreciations        public appreciations received
///
/// /jobs                            list, create
/// /jobs/{id}                       get, delete
/// /jobs/{id}/claim                 claim (POST)
/// /jobs/{id}/release               release (POST)
/// /jobs/{id}/complete              complete + mint exchange (POST)
///
/// /exchanges                       record directly (admin only, POST)
/// /exchanges/balance               caller's derived balance
/// /exchanges/mine                  caller's history (?type=all|earned|spent)
/// /exchanges/worked-with           counterpart summary (?include_notes)
/// /exchanges/statistics            ledger statistics (moderator only)
/// /exchanges/{id}                  get one
/// /exchanges/{id}/appreciations    appreciations on one exchange
///
/// /flags                           review queue (moderator), report (POST)
/// /flags/{id}                      get (moderator), status update (PATCH)
/// /flags/{id}/remove-content       suppress flagged content (POST)
/// /flags/{id}/restore-content      restore flagged content (POST)
///
/// /appreciations                   record (POST)
/// /appreciations/mine              own sent/received (?direction)
///
/// /notes                           own notes list, create
/// /notes/{id}                      update (PATCH), delete
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Authentication (login).
        .nest("/auth", auth::router())
        // Registration, profiles, role management.
        .nest("/users", users::router())
        // Job lifecycle state machine.
        .nest("/jobs", jobs::router())
        // Exchange ledger and derived reads.
        .nest("/exchanges", exchanges::router())
        // Flagging and the moderation queue.
        .nest("/flags", flags::router())
        // Appreciations.
        .nest("/appreciations", appreciations::router())
        // Private notes (author-only).
        .nest("/notes", notes::router())
}
