//! Routes for the Turns context: playing a turn and answering a named
//! challenge.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Json, Router, routing::post};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use trivia_duel_core::messenger::MessageRef;
use trivia_duel_core::player::PlayerId;
use trivia_duel_turns::application::command_handlers;
use trivia_duel_turns::domain::commands;

use crate::boundary;
use crate::error::ApiError;
use crate::state::AppState;

/// Request body for POST /{id}/play.
#[derive(Debug, Deserialize)]
pub struct PlayTurnRequest {
    /// Who pressed Play.
    pub player_id: PlayerId,
}

/// Request body for POST /{id}/accept and POST /{id}/decline.
#[derive(Debug, Deserialize)]
pub struct ChallengeReplyRequest {
    /// Who pressed the button.
    pub player_id: PlayerId,
    /// The invitation message carrying the buttons.
    #[serde(default)]
    pub message_id: Option<MessageRef>,
}

/// Response body for an accepted duel command.
#[derive(Debug, Serialize)]
pub struct DuelCommandResponse {
    /// The duel acted on.
    pub duel_id: Uuid,
    /// Correlation id of the command.
    pub correlation_id: Uuid,
}

/// POST /{id}/play
///
/// The turn runs in the background, blocking on prompts for up to a
/// minute; failures reach the player through the error boundary.
#[instrument(skip(state, request), fields(player_id = %request.player_id))]
async fn play_turn(
    State(state): State<AppState>,
    Path(duel_id): Path<Uuid>,
    Json(request): Json<PlayTurnRequest>,
) -> Result<(StatusCode, Json<DuelCommandResponse>), ApiError> {
    let command = commands::PlayTurn {
        correlation_id: Uuid::new_v4(),
        duel_id,
        player_id: request.player_id,
    };

    info!(correlation_id = %command.correlation_id, "handling play_turn command");

    if let Err(e) = state.ensure_open() {
        boundary::report(&state, &command.player_id, &e).await;
        return Err(e.into());
    }

    let response = DuelCommandResponse {
        duel_id,
        correlation_id: command.correlation_id,
    };
    let player = command.player_id.clone();
    let services = state.services.clone();
    boundary::spawn_reported(state, player, async move {
        command_handlers::handle_play_turn(&command, &services).await
    });

    Ok((StatusCode::ACCEPTED, Json(response)))
}

/// POST /{id}/accept
#[instrument(skip(state, request), fields(player_id = %request.player_id))]
async fn accept_challenge(
    State(state): State<AppState>,
    Path(duel_id): Path<Uuid>,
    Json(request): Json<ChallengeReplyRequest>,
) -> Result<Json<DuelCommandResponse>, ApiError> {
    let command = commands::AcceptChallenge {
        correlation_id: Uuid::new_v4(),
        duel_id,
        player_id: request.player_id,
        source_message: request.message_id,
    };

    info!(correlation_id = %command.correlation_id, "handling accept_challenge command");

    let result = match state.ensure_open() {
        Ok(()) => command_handlers::handle_accept_challenge(&command, &state.services)
            .await
            .map(|_| ()),
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => Ok(Json(DuelCommandResponse {
            duel_id,
            correlation_id: command.correlation_id,
        })),
        Err(e) => {
            boundary::report(&state, &command.player_id, &e).await;
            Err(e.into())
        }
    }
}

/// POST /{id}/decline
#[instrument(skip(state, request), fields(player_id = %request.player_id))]
async fn decline_challenge(
    State(state): State<AppState>,
    Path(duel_id): Path<Uuid>,
    Json(request): Json<ChallengeReplyRequest>,
) -> Result<Json<DuelCommandResponse>, ApiError> {
    let command = commands::DeclineChallenge {
        correlation_id: Uuid::new_v4(),
        duel_id,
        player_id: request.player_id,
        source_message: request.message_id,
    };

    info!(correlation_id = %command.correlation_id, "handling decline_challenge command");

    match command_handlers::handle_decline_challenge(&command, &state.services).await {
        Ok(()) => Ok(Json(DuelCommandResponse {
            duel_id,
            correlation_id: command.correlation_id,
        })),
        Err(e) => {
            boundary::report(&state, &command.player_id, &e).await;
            Err(e.into())
        }
    }
}

/// Returns the router for the duels context.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{id}/play", post(play_turn))
        .route("/{id}/accept", post(accept_challenge))
        .route("/{id}/decline", post(decline_challenge))
}
