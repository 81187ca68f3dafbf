//! Routes for the Matchmaking context.

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Json, Router, routing::post};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use trivia_duel_core::error::DomainError;
use trivia_duel_core::player::PlayerId;
use trivia_duel_matchmaking::application::command_handlers;
use trivia_duel_matchmaking::domain::commands;

use crate::boundary;
use crate::error::ApiError;
use crate::state::AppState;

/// Request body for POST /stranger.
#[derive(Debug, Deserialize)]
pub struct RequestStrangerRequest {
    /// Who wants a game.
    pub player_id: PlayerId,
}

/// Request body for POST /challenge.
#[derive(Debug, Deserialize)]
pub struct ChallengePlayerRequest {
    /// Who is challenging.
    pub player_id: PlayerId,
    /// Alias of the player being challenged.
    pub alias: String,
}

/// Response body for an accepted matchmaking request.
#[derive(Debug, Serialize)]
pub struct QueuedResponse {
    /// Correlation id of the queued request.
    pub correlation_id: Uuid,
}

async fn respond(
    state: &AppState,
    player: &PlayerId,
    correlation_id: Uuid,
    result: Result<(), DomainError>,
) -> Result<(StatusCode, Json<QueuedResponse>), ApiError> {
    match result {
        Ok(()) => Ok((StatusCode::ACCEPTED, Json(QueuedResponse { correlation_id }))),
        Err(e) => {
            boundary::report(state, player, &e).await;
            Err(e.into())
        }
    }
}

/// POST /stranger
#[instrument(skip(state, request), fields(player_id = %request.player_id))]
async fn request_stranger(
    State(state): State<AppState>,
    Json(request): Json<RequestStrangerRequest>,
) -> Result<(StatusCode, Json<QueuedResponse>), ApiError> {
    let command = commands::RequestStranger {
        correlation_id: Uuid::new_v4(),
        player_id: request.player_id,
    };

    info!(correlation_id = %command.correlation_id, "handling request_stranger command");

    let result = match state.ensure_open() {
        Ok(()) => {
            command_handlers::handle_request_stranger(&command, &state.services, &state.queues)
                .await
        }
        Err(e) => Err(e),
    };
    respond(&state, &command.player_id, command.correlation_id, result).await
}

/// POST /challenge
#[instrument(skip(state, request), fields(player_id = %request.player_id))]
async fn challenge_player(
    State(state): State<AppState>,
    Json(request): Json<ChallengePlayerRequest>,
) -> Result<(StatusCode, Json<QueuedResponse>), ApiError> {
    let command = commands::ChallengePlayer {
        correlation_id: Uuid::new_v4(),
        player_id: request.player_id,
        alias: request.alias,
    };

    info!(correlation_id = %command.correlation_id, "handling challenge_player command");

    let result = match state.ensure_open() {
        Ok(()) => {
            command_handlers::handle_challenge_player(&command, &state.services, &state.queues)
                .await
        }
        Err(e) => Err(e),
    };
    respond(&state, &command.player_id, command.correlation_id, result).await
}

/// Returns the router for the matchmaking context.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/stranger", post(request_stranger))
        .route("/challenge", post(challenge_player))
}
