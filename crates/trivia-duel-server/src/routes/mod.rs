//! Route modules organized by bounded context.

use axum::Router;

use crate::state::AppState;

pub mod admin;
pub mod answers;
pub mod duels;
pub mod health;
pub mod matchmaking;
pub mod players;

/// The full route tree the gateway posts into.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .nest("/api/v1/players", players::router())
        .nest("/api/v1/matchmaking", matchmaking::router())
        .nest("/api/v1/duels", duels::router())
        .nest("/api/v1/answers", answers::router())
        .nest("/api/v1/admin", admin::router())
}
