//! The matchmaking queue processor.
//!
//! One instance runs per process. Each pass first drains every stranger
//! request, then works through the named challenges in arrival order.
//! Because it is the only consumer, a duel it creates is started exactly
//! once.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument};
use trivia_duel_core::duel::{DuelRecord, Participant};
use trivia_duel_core::error::{DomainError, Rejection};
use trivia_duel_core::messenger::MessageAction;
use trivia_duel_core::player::PlayerId;
use trivia_duel_turns::application::command_handlers::start_duel;
use trivia_duel_turns::application::services::{DuelServices, notify};
use trivia_duel_turns::domain::messages::challenge_accepted;
use uuid::Uuid;

use crate::domain::messages;
use crate::domain::queues::{MatchmakingQueues, NamedChallenge};

/// What one pass did.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PassSummary {
    /// Duels that started during the pass.
    pub started: usize,
    /// New open stranger requests.
    pub opened: usize,
    /// Invitations sent to named opponents.
    pub invited: usize,
    /// Challenges refused with a message to the challenger.
    pub rejected: usize,
    /// Requests dropped on an unexpected error.
    pub failed: usize,
}

enum StrangerResult {
    Joined,
    Opened,
}

enum ChallengeResult {
    Started,
    Invited,
}

/// Pairs queued requests into duels.
pub struct MatchmakingProcessor {
    services: DuelServices,
    queues: Arc<MatchmakingQueues>,
}

impl MatchmakingProcessor {
    /// Creates a processor draining `queues`.
    #[must_use]
    pub fn new(services: DuelServices, queues: Arc<MatchmakingQueues>) -> Self {
        Self { services, queues }
    }

    /// Runs a pass every `matchmaking_interval` until `cancel` fires.
    pub async fn run(&self, cancel: CancellationToken) {
        let interval = self.services.settings.matchmaking_interval;
        info!(interval_secs = interval.as_secs(), "matchmaking processor started");
        loop {
            tokio::select! {
                () = cancel.cancelled() => break,
                () = tokio::time::sleep(interval) => {
                    self.run_once().await;
                }
            }
        }
        info!("matchmaking processor stopped");
    }

    /// Performs a single pass over both queues.
    #[instrument(skip(self))]
    pub async fn run_once(&self) -> PassSummary {
        let mut summary = PassSummary::default();

        match self.queues.drain_strangers() {
            Ok(strangers) => {
                for player in strangers {
                    match self.pair_stranger(&player).await {
                        Ok(StrangerResult::Joined) => summary.started += 1,
                        Ok(StrangerResult::Opened) => summary.opened += 1,
                        Err(e) => {
                            error!(player_id = %player.id, error = %e, "stranger request dropped");
                            summary.failed += 1;
                        }
                    }
                }
            }
            Err(e) => error!(error = %e, "stranger queue unavailable"),
        }

        loop {
            let challenge = match self.queues.pop_challenge() {
                Ok(Some(challenge)) => challenge,
                Ok(None) => break,
                Err(e) => {
                    error!(error = %e, "challenge queue unavailable");
                    break;
                }
            };
            match self.resolve_challenge(&challenge).await {
                Ok(ChallengeResult::Started) => summary.started += 1,
                Ok(ChallengeResult::Invited) => summary.invited += 1,
                Err(DomainError::Rejected(rejection)) => {
                    debug!(player_id = %challenge.challenger.id, %rejection, "challenge refused");
                    notify(
                        self.services.messenger.as_ref(),
                        &challenge.challenger.id,
                        &rejection.to_string(),
                        &[],
                    )
                    .await;
                    summary.rejected += 1;
                }
                Err(e) => {
                    error!(player_id = %challenge.challenger.id, error = %e, "challenge dropped");
                    summary.failed += 1;
                }
            }
        }

        if summary != PassSummary::default() {
            info!(?summary, "matchmaking pass finished");
        }
        summary
    }

    async fn pair_stranger(&self, player: &Participant) -> Result<StrangerResult, DomainError> {
        let now = self.services.clock.now();
        if let Some(duel) = self.services.duels.claim_open_request(player, now).await? {
            notify(
                self.services.messenger.as_ref(),
                &player.id,
                &messages::paired_with(&duel.first.alias),
                &[],
            )
            .await;
            start_duel(&self.services, &duel).await?;
            info!(duel_id = %duel.id, player_id = %player.id, "joined open request");
            return Ok(StrangerResult::Joined);
        }

        let duel = DuelRecord::open_request(Uuid::new_v4(), player.clone(), now);
        self.services.duels.save(&duel).await?;
        notify(
            self.services.messenger.as_ref(),
            &player.id,
            messages::WAITING_FOR_STRANGER,
            &[],
        )
        .await;
        info!(duel_id = %duel.id, player_id = %player.id, "open request created");
        Ok(StrangerResult::Opened)
    }

    async fn open_duels(&self, player: &PlayerId) -> Result<usize, DomainError> {
        Ok(self.services.duels.involving(player).await?.len())
    }

    async fn resolve_challenge(
        &self,
        challenge: &NamedChallenge,
    ) -> Result<ChallengeResult, DomainError> {
        let NamedChallenge {
            challenger,
            target_alias,
        } = challenge;
        let cap = self.services.settings.max_open_duels;
        let hours = self.services.settings.play_window_hours;

        if self.open_duels(&challenger.id).await? >= cap {
            return Err(Rejection::TooManyDuels { cap }.into());
        }
        let opponent = self
            .services
            .players
            .find_by_alias(target_alias)
            .await?
            .ok_or_else(|| Rejection::UnknownAlias(target_alias.clone()))?;
        if opponent.id == challenger.id {
            return Err(Rejection::SelfChallenge.into());
        }
        if self.open_duels(&opponent.id).await? >= cap {
            return Err(Rejection::OpponentSaturated {
                alias: target_alias.clone(),
                cap,
            }
            .into());
        }
        if self
            .services
            .duels
            .between(&challenger.id, &opponent.id)
            .await?
            .is_some()
        {
            return Err(Rejection::AlreadyPlaying(target_alias.clone()).into());
        }

        let opponent_alias = opponent.alias.clone().unwrap_or_else(|| target_alias.clone());
        let target = Participant::new(opponent.id.clone(), opponent_alias.clone());
        let now = self.services.clock.now();

        if self
            .queues
            .take_reciprocal(&opponent.id, &challenger.alias)?
            .is_some()
        {
            let duel = DuelRecord::started(Uuid::new_v4(), challenger.clone(), target, now);
            self.services.duels.save(&duel).await?;
            notify(
                self.services.messenger.as_ref(),
                &challenger.id,
                &challenge_accepted(&opponent_alias, hours),
                &[],
            )
            .await;
            start_duel(&self.services, &duel).await?;
            info!(duel_id = %duel.id, "reciprocal challenges paired");
            return Ok(ChallengeResult::Started);
        }

        let duel = DuelRecord::invitation(Uuid::new_v4(), challenger.clone(), target, now);
        self.services.duels.save(&duel).await?;
        notify(
            self.services.messenger.as_ref(),
            &opponent.id,
            &messages::invitation(&challenger.alias, hours),
            &[
                MessageAction::AcceptChallenge { duel_id: duel.id },
                MessageAction::DeclineChallenge { duel_id: duel.id },
            ],
        )
        .await;
        notify(
            self.services.messenger.as_ref(),
            &challenger.id,
            &messages::invitation_sent(&opponent_alias, hours),
            &[],
        )
        .await;
        info!(duel_id = %duel.id, "invitation sent");
        Ok(ChallengeResult::Invited)
    }
}
