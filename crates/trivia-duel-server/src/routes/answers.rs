//! Route for answers to timed prompts.
//!
//! Answers keep flowing in maintenance mode so running turns can finish.

use axum::extract::State;
use axum::{Json, Router, routing::post};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use uuid::Uuid;

use trivia_duel_core::messenger::PromptId;
use trivia_duel_core::player::PlayerId;
use trivia_duel_turns::application::command_handlers;
use trivia_duel_turns::domain::commands;

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for POST /.
#[derive(Debug, Deserialize)]
pub struct SubmitAnswerRequest {
    /// The prompt that was answered.
    pub prompt_id: PromptId,
    /// Who answered.
    pub player_id: PlayerId,
    /// Index of the selected option.
    pub option: usize,
}

/// Response body for POST /.
#[derive(Debug, Serialize)]
pub struct SubmitAnswerResponse {
    /// Whether a waiting turn took the answer. Stale or foreign answers
    /// are dropped and report `false`.
    pub accepted: bool,
}

/// POST /
#[instrument(skip(state, request), fields(prompt_id = %request.prompt_id, player_id = %request.player_id))]
async fn submit_answer(
    State(state): State<AppState>,
    Json(request): Json<SubmitAnswerRequest>,
) -> Result<Json<SubmitAnswerResponse>, ApiError> {
    let command = commands::SubmitAnswer {
        correlation_id: Uuid::new_v4(),
        prompt_id: request.prompt_id,
        responder: request.player_id,
        option: request.option,
    };

    let accepted = command_handlers::handle_submit_answer(&command, &state.services)?;

    Ok(Json(SubmitAnswerResponse { accepted }))
}

/// Returns the router for prompt answers.
pub fn router() -> Router<AppState> {
    Router::new().route("/", post(submit_answer))
}
