//! Command handlers for the Turns context.
//!
//! Each handler loads the duel, checks that the caller may act on it,
//! persists the state change and then drives the turn protocol or notifies
//! the players involved.

use tracing::{debug, info, instrument};
use trivia_duel_core::duel::DuelRecord;
use trivia_duel_core::error::{DomainError, Rejection};
use trivia_duel_core::messenger::MessageAction;
use trivia_duel_core::player::PlayerId;
use uuid::Uuid;

use crate::application::services::{DuelServices, notify, notify_edit};
use crate::application::turn::{TurnOutcome, run_turn};
use crate::domain::commands::{AcceptChallenge, DeclineChallenge, PlayTurn, SubmitAnswer};
use crate::domain::messages;
use crate::domain::scoreboard::{Progress, render_progress};

async fn load(services: &DuelServices, duel_id: Uuid) -> Result<DuelRecord, DomainError> {
    services
        .duels
        .get(duel_id)
        .await?
        .ok_or(DomainError::DuelNotFound(duel_id))
}

/// Handles the `PlayTurn` command: claims the duel's turn, stamps activity
/// and runs the turn protocol to completion.
///
/// # Errors
///
/// Returns `DomainError::DuelNotFound` if the duel no longer exists,
/// `DomainError::Rejected` if it is not the caller's turn or a turn is
/// already running, and any content or persistence error raised while the
/// turn runs.
#[instrument(skip(services, command), fields(duel_id = %command.duel_id, player_id = %command.player_id, correlation_id = %command.correlation_id))]
pub async fn handle_play_turn(
    command: &PlayTurn,
    services: &DuelServices,
) -> Result<TurnOutcome, DomainError> {
    let Some(_guard) = services.active_turns.try_claim(command.duel_id)? else {
        return Err(Rejection::TurnInProgress.into());
    };

    let mut duel = load(services, command.duel_id).await?;
    let seat = duel
        .seat_of(&command.player_id)
        .filter(|seat| Some(*seat) == duel.active_seat())
        .ok_or(Rejection::NotYourTurn)?;
    if !duel.has_playable_turn() {
        return Err(Rejection::NotYourTurn.into());
    }

    duel.touch(services.clock.now());
    services.duels.save(&duel).await?;

    info!(cursor = duel.cursor, pending_played = duel.pending_played, "turn started");
    run_turn(services, duel, seat).await
}

/// Sends the opening scoreboard to the player holding cursor 1.
///
/// # Errors
///
/// Returns `DomainError::Validation` if the duel has not started.
pub async fn start_duel(services: &DuelServices, duel: &DuelRecord) -> Result<(), DomainError> {
    let (Some(seat), Some(active)) = (duel.active_seat(), duel.active_player()) else {
        return Err(DomainError::Validation(format!(
            "duel {} has not started",
            duel.id
        )));
    };
    let text = render_progress(
        duel,
        seat,
        Progress::READY_FOR_NEW_ROUND,
        services.settings.play_window_hours,
    );
    notify(
        services.messenger.as_ref(),
        &active.id,
        &text,
        &[MessageAction::PlayTurn { duel_id: duel.id }],
    )
    .await;
    info!(duel_id = %duel.id, "duel started");
    Ok(())
}

fn check_invited(duel: &DuelRecord, player: &PlayerId) -> Result<(), DomainError> {
    match &duel.invited {
        Some(invited) if duel.is_invitation() && invited.id == *player => Ok(()),
        _ => Err(Rejection::NotInvited.into()),
    }
}

/// Handles the `AcceptChallenge` command: attaches the invited player,
/// tells the challenger and starts the duel.
///
/// # Errors
///
/// Returns `DomainError::DuelNotFound` if the invitation lapsed and
/// `DomainError::Rejected` if the caller is not the invited player.
#[instrument(skip(services, command), fields(duel_id = %command.duel_id, player_id = %command.player_id, correlation_id = %command.correlation_id))]
pub async fn handle_accept_challenge(
    command: &AcceptChallenge,
    services: &DuelServices,
) -> Result<DuelRecord, DomainError> {
    let Some(_guard) = services.active_turns.try_claim(command.duel_id)? else {
        return Err(Rejection::TurnInProgress.into());
    };
    let mut duel = load(services, command.duel_id).await?;
    check_invited(&duel, &command.player_id)?;

    let Some(invited) = duel.invited.clone() else {
        return Err(Rejection::NotInvited.into());
    };
    duel.attach_second(invited.clone(), services.clock.now());
    services.duels.save(&duel).await?;

    if let Some(source) = &command.source_message {
        notify_edit(
            services.messenger.as_ref(),
            &command.player_id,
            source,
            messages::INVITATION_ACCEPTED,
        )
        .await;
    }
    notify(
        services.messenger.as_ref(),
        &duel.first.id,
        &messages::challenge_accepted(&invited.alias, services.settings.play_window_hours),
        &[],
    )
    .await;
    start_duel(services, &duel).await?;
    Ok(duel)
}

/// Handles the `DeclineChallenge` command: removes the invitation and tells
/// the challenger.
///
/// # Errors
///
/// Returns `DomainError::DuelNotFound` if the invitation lapsed and
/// `DomainError::Rejected` if the caller is not the invited player.
#[instrument(skip(services, command), fields(duel_id = %command.duel_id, player_id = %command.player_id, correlation_id = %command.correlation_id))]
pub async fn handle_decline_challenge(
    command: &DeclineChallenge,
    services: &DuelServices,
) -> Result<(), DomainError> {
    let Some(_guard) = services.active_turns.try_claim(command.duel_id)? else {
        return Err(Rejection::TurnInProgress.into());
    };
    let duel = load(services, command.duel_id).await?;
    check_invited(&duel, &command.player_id)?;

    services.duels.delete(duel.id).await?;

    if let Some(source) = &command.source_message {
        notify_edit(
            services.messenger.as_ref(),
            &command.player_id,
            source,
            messages::INVITATION_DECLINED,
        )
        .await;
    }
    let alias = duel.invited.as_ref().map_or("", |p| p.alias.as_str());
    notify(
        services.messenger.as_ref(),
        &duel.first.id,
        &messages::challenge_declined(alias),
        &[],
    )
    .await;
    info!("challenge declined");
    Ok(())
}

/// Handles the `SubmitAnswer` command by resolving the matching prompt.
/// Returns whether a waiting turn was resolved; stale and foreign answers
/// are dropped silently.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if the correlation table's lock
/// is poisoned.
pub fn handle_submit_answer(
    command: &SubmitAnswer,
    services: &DuelServices,
) -> Result<bool, DomainError> {
    let resolved =
        services
            .correlation
            .resolve(&command.prompt_id, &command.responder, command.option)?;
    debug!(
        prompt_id = %command.prompt_id,
        responder = %command.responder,
        correlation_id = %command.correlation_id,
        resolved,
        "answer received"
    );
    Ok(resolved)
}
