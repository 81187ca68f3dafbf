//! Command handlers for the Matchmaking context.
//!
//! Handlers only validate and enqueue; pairing happens on the processor's
//! next pass.

use tracing::{info, instrument};
use trivia_duel_core::duel::Participant;
use trivia_duel_core::error::{DomainError, Rejection};
use trivia_duel_core::player::PlayerId;
use trivia_duel_turns::application::services::{DuelServices, notify};

use crate::domain::commands::{ChallengePlayer, RequestStranger};
use crate::domain::messages;
use crate::domain::queues::{MatchmakingQueues, NamedChallenge};

/// Loads the requesting player and snapshots them as a participant.
async fn requester(services: &DuelServices, id: &PlayerId) -> Result<Participant, DomainError> {
    let player = services
        .players
        .get(id)
        .await?
        .ok_or_else(|| DomainError::PlayerNotFound(id.clone()))?;
    let alias = player.alias.ok_or(Rejection::AliasRequired)?;
    Ok(Participant::new(player.id, alias))
}

/// Handles the `RequestStranger` command.
///
/// # Errors
///
/// Returns `DomainError::PlayerNotFound` for an unregistered player and
/// `DomainError::Rejected` if the player has no alias yet.
#[instrument(skip(services, queues, command), fields(player_id = %command.player_id, correlation_id = %command.correlation_id))]
pub async fn handle_request_stranger(
    command: &RequestStranger,
    services: &DuelServices,
    queues: &MatchmakingQueues,
) -> Result<(), DomainError> {
    let participant = requester(services, &command.player_id).await?;
    queues.push_stranger(participant)?;
    notify(
        services.messenger.as_ref(),
        &command.player_id,
        messages::STRANGER_QUEUED,
        &[],
    )
    .await;
    info!("stranger request queued");
    Ok(())
}

/// Handles the `ChallengePlayer` command.
///
/// # Errors
///
/// Returns `DomainError::PlayerNotFound` for an unregistered player and
/// `DomainError::Rejected` if the player has no alias yet, named
/// nobody, or named themselves.
#[instrument(skip(services, queues, command), fields(player_id = %command.player_id, correlation_id = %command.correlation_id))]
pub async fn handle_challenge_player(
    command: &ChallengePlayer,
    services: &DuelServices,
    queues: &MatchmakingQueues,
) -> Result<(), DomainError> {
    let participant = requester(services, &command.player_id).await?;
    let target_alias = command.alias.trim();
    if target_alias.is_empty() {
        return Err(DomainError::Validation("opponent alias is empty".to_owned()));
    }
    if target_alias.eq_ignore_ascii_case(&participant.alias) {
        return Err(Rejection::SelfChallenge.into());
    }

    queues.push_challenge(NamedChallenge {
        challenger: participant,
        target_alias: target_alias.to_owned(),
    })?;
    notify(
        services.messenger.as_ref(),
        &command.player_id,
        &messages::challenge_queued(target_alias),
        &[],
    )
    .await;
    info!(target_alias, "named challenge queued");
    Ok(())
}
