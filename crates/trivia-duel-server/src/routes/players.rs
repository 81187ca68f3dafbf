//! Routes for the Players context.

use axum::extract::State;
use axum::{Json, Router, routing::post};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use trivia_duel_core::player::{Player, PlayerId};
use trivia_duel_players::application::command_handlers;
use trivia_duel_players::domain::commands;

use crate::boundary;
use crate::error::ApiError;
use crate::state::AppState;

/// Request body for POST /.
#[derive(Debug, Deserialize)]
pub struct RegisterPlayerRequest {
    /// Transport identity.
    pub player_id: PlayerId,
    /// Current display handle.
    pub handle: String,
}

/// Request body for POST /alias.
#[derive(Debug, Deserialize)]
pub struct SetAliasRequest {
    /// Who is choosing.
    pub player_id: PlayerId,
    /// The requested alias.
    pub alias: String,
}

/// A player record as returned to the gateway.
#[derive(Debug, Serialize)]
pub struct PlayerResponse {
    /// Transport identity.
    pub player_id: PlayerId,
    /// Display handle.
    pub handle: String,
    /// Public alias, once chosen.
    pub alias: Option<String>,
    /// Cumulative score.
    pub score: u32,
    /// Duels finished with every answer correct.
    pub flawless_duels: u32,
}

impl From<Player> for PlayerResponse {
    fn from(player: Player) -> Self {
        Self {
            player_id: player.id,
            handle: player.handle,
            alias: player.alias,
            score: player.score,
            flawless_duels: player.flawless_duels,
        }
    }
}

/// POST /
#[instrument(skip(state, request), fields(player_id = %request.player_id))]
async fn register_player(
    State(state): State<AppState>,
    Json(request): Json<RegisterPlayerRequest>,
) -> Result<Json<PlayerResponse>, ApiError> {
    let command = commands::RegisterPlayer {
        correlation_id: Uuid::new_v4(),
        player_id: request.player_id,
        handle: request.handle,
    };

    info!(correlation_id = %command.correlation_id, "handling register_player command");

    let player =
        command_handlers::handle_register_player(&command, state.services.players.as_ref())
            .await?;

    Ok(Json(player.into()))
}

/// POST /alias
#[instrument(skip(state, request), fields(player_id = %request.player_id))]
async fn set_alias(
    State(state): State<AppState>,
    Json(request): Json<SetAliasRequest>,
) -> Result<Json<PlayerResponse>, ApiError> {
    let command = commands::SetAlias {
        correlation_id: Uuid::new_v4(),
        player_id: request.player_id,
        alias: request.alias,
    };

    info!(correlation_id = %command.correlation_id, "handling set_alias command");

    let result = command_handlers::handle_set_alias(
        &command,
        state.services.players.as_ref(),
        state.services.messenger.as_ref(),
    )
    .await;

    match result {
        Ok(player) => Ok(Json(player.into())),
        Err(e) => {
            boundary::report(&state, &command.player_id, &e).await;
            Err(e.into())
        }
    }
}

/// Returns the router for the players context.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(register_player))
        .route("/alias", post(set_alias))
}
