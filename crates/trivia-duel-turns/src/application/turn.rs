//! The turn protocol.
//!
//! A turn runs in up to two phases. If the active player still owes the
//! round the opponent opened, they answer its three questions first. On the
//! final cursor that closes the duel; otherwise the player is told to open
//! a new round, which is a category poll followed by three questions, after
//! which the cursor advances and the opponent is called in.

use tracing::{info, warn};
use trivia_duel_core::duel::{DuelRecord, RoundContent, Seat};
use trivia_duel_core::error::DomainError;
use trivia_duel_core::finished::{FinishedGame, GameOutcome};
use trivia_duel_core::messenger::{ChoicePrompt, MessageAction};
use trivia_duel_core::player::{DuelResult, PlayerId};
use trivia_duel_core::questions::Category;
use trivia_duel_core::rng::{choose_index, sample_distinct};

use crate::application::services::{DuelServices, notify};
use crate::domain::messages;
use crate::domain::presentation::{category_poll_text, present_question};
use crate::domain::scoreboard::{Progress, render_final, render_progress};

/// What a completed call of the turn protocol achieved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// The pending round was answered; the player may now open a new round.
    PendingRoundPlayed,
    /// A new round was played and the opponent now holds the turn.
    HandedOver,
    /// The duel reached its end and was archived.
    Finished(GameOutcome),
    /// A prompt could not be delivered; the duel was cancelled and archived.
    Aborted,
}

/// Runs one step of the turn protocol for the player in `seat`.
///
/// A prompt delivery failure cancels the duel. Any other error leaves the
/// persisted record as it was before the failing step.
pub(crate) async fn run_turn(
    services: &DuelServices,
    mut duel: DuelRecord,
    seat: Seat,
) -> Result<TurnOutcome, DomainError> {
    let result = if duel.pending_played {
        play_new_round(services, &mut duel, seat).await
    } else {
        play_pending_round(services, &mut duel, seat).await
    };

    match result {
        Err(DomainError::DeliveryFailed(reason)) => {
            warn!(duel_id = %duel.id, reason = %reason, "prompt delivery failed, cancelling duel");
            abort(services, &duel).await?;
            Ok(TurnOutcome::Aborted)
        }
        other => other,
    }
}

async fn play_pending_round(
    services: &DuelServices,
    duel: &mut DuelRecord,
    seat: Seat,
) -> Result<TurnOutcome, DomainError> {
    let (active, _) = seats(duel, seat)?;
    let round = duel.pending_round();
    let content = duel.open_round.clone().ok_or_else(|| {
        DomainError::Infrastructure(format!("duel {} has no open round to answer", duel.id))
    })?;

    let label = category_label(services, duel.category(round)).await;
    notify(
        services.messenger.as_ref(),
        &active,
        &messages::category_announcement(round, &label),
        &[],
    )
    .await;

    answer_round(services, duel, seat, &active, round, &content).await?;
    duel.pending_played = true;

    if duel.is_final_step() {
        let outcome = finalize(services, duel).await?;
        return Ok(TurnOutcome::Finished(outcome));
    }

    duel.open_round = None;
    services.duels.save(duel).await?;
    let text = render_progress(
        duel,
        seat,
        Progress::READY_FOR_NEW_ROUND,
        services.settings.play_window_hours,
    );
    notify(
        services.messenger.as_ref(),
        &active,
        &text,
        &[MessageAction::PlayTurn { duel_id: duel.id }],
    )
    .await;
    info!(duel_id = %duel.id, round, "pending round played");
    Ok(TurnOutcome::PendingRoundPlayed)
}

async fn play_new_round(
    services: &DuelServices,
    duel: &mut DuelRecord,
    seat: Seat,
) -> Result<TurnOutcome, DomainError> {
    let (active, opponent) = seats(duel, seat)?;
    let round = duel.new_round();

    let offered = offer_categories(services, duel).await?;
    let prompt = ChoicePrompt {
        text: category_poll_text(round),
        options: offered.iter().map(|c| c.name.clone()).collect(),
        correct: None,
        open_seconds: services.settings.prompt_open_seconds(),
    };
    let choice = ask(services, duel, &active, &prompt).await?;
    let category = match choice.and_then(|i| offered.get(i)) {
        Some(category) => category.clone(),
        None => {
            let idx = services.with_rng(|rng| choose_index(rng, offered.len()))?;
            let category = offered[idx].clone();
            notify(
                services.messenger.as_ref(),
                &active,
                &messages::category_auto_picked(&category.name),
                &[],
            )
            .await;
            category
        }
    };

    let questions = services.questions.get_questions(category.id).await?;
    let content = RoundContent { questions };
    duel.set_category(round, category.id);
    duel.open_round = Some(content.clone());
    services.duels.save(duel).await?;

    answer_round(services, duel, seat, &active, round, &content).await?;

    duel.advance(services.clock.now());
    services.duels.save(duel).await?;

    let done = render_progress(
        duel,
        seat,
        Progress::TURN_DONE,
        services.settings.play_window_hours,
    );
    notify(services.messenger.as_ref(), &active, &done, &[]).await;
    let begins = render_progress(
        duel,
        seat.other(),
        Progress::TURN_BEGINS,
        services.settings.play_window_hours,
    );
    notify(
        services.messenger.as_ref(),
        &opponent,
        &begins,
        &[MessageAction::PlayTurn { duel_id: duel.id }],
    )
    .await;
    info!(duel_id = %duel.id, round, category_id = category.id, "round played, turn handed over");
    Ok(TurnOutcome::HandedOver)
}

fn seats(duel: &DuelRecord, seat: Seat) -> Result<(PlayerId, PlayerId), DomainError> {
    match (duel.participant(seat), duel.participant(seat.other())) {
        (Some(active), Some(opponent)) => Ok((active.id.clone(), opponent.id.clone())),
        _ => Err(DomainError::Validation(format!(
            "duel {} has not started",
            duel.id
        ))),
    }
}

/// Picks up to `category_choices` distinct categories not yet played.
async fn offer_categories(
    services: &DuelServices,
    duel: &DuelRecord,
) -> Result<Vec<Category>, DomainError> {
    let played = duel.played_categories();
    let pool: Vec<Category> = services
        .questions
        .list_categories()
        .await?
        .into_iter()
        .filter(|c| !played.contains(&c.id))
        .collect();
    if pool.is_empty() {
        return Err(DomainError::ContentUnavailable(
            "no unplayed categories left".to_owned(),
        ));
    }
    services.with_rng(|rng| sample_distinct(rng, &pool, services.settings.category_choices))
}

async fn category_label(services: &DuelServices, category_id: Option<u32>) -> String {
    let Some(id) = category_id else {
        return messages::unknown_category(0);
    };
    match services.questions.list_categories().await {
        Ok(categories) => categories
            .into_iter()
            .find(|c| c.id == id)
            .map_or_else(|| messages::unknown_category(id), |c| c.name),
        Err(e) => {
            warn!(category_id = id, error = %e, "category list unavailable for announcement");
            messages::unknown_category(id)
        }
    }
}

/// Asks the three questions of `round` and marks correct answers.
async fn answer_round(
    services: &DuelServices,
    duel: &mut DuelRecord,
    seat: Seat,
    active: &PlayerId,
    round: u8,
    content: &RoundContent,
) -> Result<(), DomainError> {
    for (number, question) in (1u8..).zip(content.questions.iter()) {
        let presented = services.with_rng(|rng| present_question(round, number, question, rng))?;
        let prompt = ChoicePrompt {
            text: presented.text,
            options: presented.options,
            correct: Some(presented.correct),
            open_seconds: services.settings.prompt_open_seconds(),
        };
        let choice = ask(services, duel, active, &prompt).await?;
        if choice == Some(presented.correct) {
            duel.correct_mut(seat).mark(round, number);
        }
    }
    Ok(())
}

/// Sends a prompt and blocks until it is answered or times out.
async fn ask(
    services: &DuelServices,
    duel: &DuelRecord,
    to: &PlayerId,
    prompt: &ChoicePrompt,
) -> Result<Option<usize>, DomainError> {
    let prompt_id = services
        .messenger
        .send_timed_choice_prompt(to, prompt)
        .await
        .map_err(|e| DomainError::DeliveryFailed(e.to_string()))?;
    let pending = services
        .correlation
        .register(prompt_id, duel.id, to.clone())?;
    Ok(pending.wait(services.settings.answer_wait()).await)
}

/// Archives a completed duel, settles scores and sends the final
/// scoreboards.
async fn finalize(services: &DuelServices, duel: &DuelRecord) -> Result<GameOutcome, DomainError> {
    let game = FinishedGame::completed(duel, services.clock.now())?;
    services.archive.insert(&game).await?;
    services.duels.delete(duel.id).await?;

    for seat in [Seat::First, Seat::Second] {
        let Some(participant) = duel.participant(seat) else {
            continue;
        };
        let result = match game.outcome.winner() {
            Some(winner) if *winner == participant.id => DuelResult::Win,
            Some(_) => DuelResult::Loss,
            None => DuelResult::Draw,
        };
        let flawless = duel.correct(seat).is_flawless();
        if !services
            .players
            .apply_result(&participant.id, result, flawless)
            .await?
        {
            warn!(player_id = %participant.id, "player record missing at finalize");
        }
    }

    for seat in [Seat::First, Seat::Second] {
        let (Some(viewer), Some(other)) = (duel.participant(seat), duel.participant(seat.other()))
        else {
            continue;
        };
        notify(
            services.messenger.as_ref(),
            &viewer.id,
            &render_final(duel, seat),
            &[MessageAction::PlayAgain {
                alias: other.alias.clone(),
            }],
        )
        .await;
    }

    info!(duel_id = %duel.id, outcome = ?game.outcome, "duel finished");
    Ok(game.outcome)
}

/// Cancels a duel after a delivery failure: both players are told, the
/// duel is archived without a winner and removed.
async fn abort(services: &DuelServices, duel: &DuelRecord) -> Result<(), DomainError> {
    for seat in [Seat::First, Seat::Second] {
        if let Some(participant) = duel.participant(seat) {
            notify(
                services.messenger.as_ref(),
                &participant.id,
                messages::DUEL_CANCELLED,
                &[],
            )
            .await;
        }
    }
    let game = FinishedGame::aborted(duel, services.clock.now())?;
    services.archive.insert(&game).await?;
    services.duels.delete(duel.id).await?;
    Ok(())
}
