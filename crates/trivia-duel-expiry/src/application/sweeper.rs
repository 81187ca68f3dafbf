//! The periodic expiry and reminder sweep.
//!
//! Each sweep runs three passes over the persisted duels: expire, then the
//! urgent reminder, then the first reminder. A duel whose turn is running is
//! left alone; the sweep claims the duel's turn before touching it, so a
//! forced expiry never races an in-flight answer.

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};
use trivia_duel_core::duel::{DuelRecord, WarningLevel};
use trivia_duel_core::error::DomainError;
use trivia_duel_core::finished::FinishedGame;
use trivia_duel_turns::application::services::{DuelServices, TurnGuard, notify};
use uuid::Uuid;

use crate::domain::messages;
use crate::domain::schedule::{is_expired, needs_warning, reminder};

/// What one sweep did.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SweepSummary {
    /// Duels removed because their play window lapsed.
    pub expired: usize,
    /// Urgent reminders sent.
    pub second_warnings: usize,
    /// First reminders sent.
    pub first_warnings: usize,
    /// Due duels left for the next sweep because a turn was running.
    pub busy: usize,
}

enum Step {
    Done,
    Busy,
    Stale,
}

/// Reminds and expires stalled duels.
pub struct ExpirySweeper {
    services: DuelServices,
}

impl ExpirySweeper {
    /// Creates a sweeper.
    #[must_use]
    pub fn new(services: DuelServices) -> Self {
        Self { services }
    }

    /// Sweeps every `expiry_interval` until `cancel` fires.
    pub async fn run(&self, cancel: CancellationToken) {
        let interval = self.services.settings.expiry_interval;
        info!(interval_secs = interval.as_secs(), "expiry sweeper started");
        loop {
            tokio::select! {
                () = cancel.cancelled() => break,
                () = tokio::time::sleep(interval) => {
                    if let Err(e) = self.sweep_once().await {
                        error!(error = %e, "expiry sweep failed");
                    }
                }
            }
        }
        info!("expiry sweeper stopped");
    }

    /// Performs a single sweep.
    ///
    /// # Errors
    ///
    /// Returns an error if the duel list cannot be loaded. Failures on
    /// individual duels are logged and skipped.
    #[instrument(skip(self))]
    pub async fn sweep_once(&self) -> Result<SweepSummary, DomainError> {
        let settings = &self.services.settings;
        let mut summary = SweepSummary::default();

        let now = self.services.clock.now();
        for duel in self.services.duels.all().await? {
            if !is_expired(&duel, now, settings) {
                continue;
            }
            match self.expire(duel.id).await {
                Ok(Step::Done) => summary.expired += 1,
                Ok(Step::Busy) => summary.busy += 1,
                Ok(Step::Stale) => {}
                Err(e) => error!(duel_id = %duel.id, error = %e, "expiring duel failed"),
            }
        }

        for level in [WarningLevel::Second, WarningLevel::First] {
            let now = self.services.clock.now();
            for duel in self.services.duels.all().await? {
                if !needs_warning(&duel, level, now, settings) {
                    continue;
                }
                match self.remind(duel.id, level).await {
                    Ok(Step::Done) if level == WarningLevel::Second => summary.second_warnings += 1,
                    Ok(Step::Done) => summary.first_warnings += 1,
                    Ok(Step::Busy) => summary.busy += 1,
                    Ok(Step::Stale) => {}
                    Err(e) => error!(duel_id = %duel.id, error = %e, "reminder failed"),
                }
            }
        }

        if summary != SweepSummary::default() {
            info!(?summary, "expiry sweep finished");
        }
        Ok(summary)
    }

    /// Claims the duel's turn and reloads it. `None` means a turn is
    /// running; `Some(None)` means the duel is gone.
    async fn claim(
        &self,
        duel_id: Uuid,
    ) -> Result<Option<(TurnGuard, Option<DuelRecord>)>, DomainError> {
        let Some(guard) = self.services.active_turns.try_claim(duel_id)? else {
            return Ok(None);
        };
        let duel = self.services.duels.get(duel_id).await?;
        Ok(Some((guard, duel)))
    }

    async fn expire(&self, duel_id: Uuid) -> Result<Step, DomainError> {
        let Some((_guard, duel)) = self.claim(duel_id).await? else {
            return Ok(Step::Busy);
        };
        let now = self.services.clock.now();
        let Some(duel) = duel.filter(|d| is_expired(d, now, &self.services.settings)) else {
            return Ok(Step::Stale);
        };
        let hours = self.services.settings.play_window_hours;
        let messenger = self.services.messenger.as_ref();

        if duel.is_open_request() {
            // Matchmaking claims open requests without the turn guard.
            if !self.services.duels.delete_open_request(duel.id).await? {
                debug!(duel_id = %duel.id, "open request was claimed before it lapsed");
                return Ok(Step::Stale);
            }
            notify(messenger, &duel.first.id, &messages::request_unanswered(hours), &[]).await;
            info!(duel_id = %duel.id, "open request expired");
            return Ok(Step::Done);
        }

        if let Some(invited) = duel.invited.as_ref() {
            notify(
                messenger,
                &duel.first.id,
                &messages::invitation_lapsed(&invited.alias, hours),
                &[],
            )
            .await;
        } else if let (Some(loser), Some(winner)) = (duel.active_player(), duel.waiting_player()) {
            notify(messenger, &loser.id, &messages::forfeit_lost(&winner.alias, hours), &[]).await;
            notify(messenger, &winner.id, &messages::forfeit_won(&loser.alias, hours), &[]).await;
            let game = FinishedGame::forfeited(&duel, now)?;
            self.services.archive.insert(&game).await?;
        } else {
            warn!(duel_id = %duel.id, cursor = duel.cursor, "expired duel has no active player");
        }

        self.services.duels.delete(duel.id).await?;
        info!(duel_id = %duel.id, cursor = duel.cursor, "duel expired");
        Ok(Step::Done)
    }

    async fn remind(&self, duel_id: Uuid, level: WarningLevel) -> Result<Step, DomainError> {
        let Some((_guard, duel)) = self.claim(duel_id).await? else {
            return Ok(Step::Busy);
        };
        let now = self.services.clock.now();
        let settings = &self.services.settings;
        let Some(mut duel) = duel.filter(|d| needs_warning(d, level, now, settings)) else {
            return Ok(Step::Stale);
        };

        if let Some(sent) = reminder(&duel, level, settings) {
            notify(self.services.messenger.as_ref(), &sent.to, &sent.text, &[]).await;
        }
        duel.warning_level = level;
        self.services.duels.save(&duel).await?;
        info!(duel_id = %duel.id, ?level, "reminder sent");
        Ok(Step::Done)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use async_trait::async_trait;
    use chrono::{DateTime, TimeDelta, Utc};
    use trivia_duel_core::duel::Participant;
    use trivia_duel_core::finished::GameOutcome;
    use trivia_duel_core::player::PlayerId;
    use trivia_duel_core::repository::DuelRepository;
    use trivia_duel_core::settings::GameSettings;
    use trivia_duel_test_support::{
        InMemoryStore, ManualClock, MockRng, RecordingMessenger, StaticQuestionSource,
        participant, player, t0,
    };
    use trivia_duel_turns::application::correlation::CorrelationTable;
    use trivia_duel_turns::application::services::ActiveTurns;

    use super::*;

    struct Fixture {
        sweeper: Arc<ExpirySweeper>,
        services: DuelServices,
        clock: Arc<ManualClock>,
        store: Arc<InMemoryStore>,
        messenger: Arc<RecordingMessenger>,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(InMemoryStore::new());
        let messenger = Arc::new(RecordingMessenger::new());
        let clock = Arc::new(ManualClock::new(t0()));
        let services = DuelServices {
            clock: clock.clone(),
            rng: Arc::new(Mutex::new(MockRng)),
            duels: store.clone(),
            players: store.clone(),
            archive: store.clone(),
            messenger: messenger.clone(),
            questions: Arc::new(StaticQuestionSource::with_categories(10)),
            correlation: Arc::new(CorrelationTable::new()),
            active_turns: Arc::new(ActiveTurns::new()),
            settings: GameSettings::default(),
        };
        store.seed_player(player("a", "Astra"));
        store.seed_player(player("b", "Borealis"));
        Fixture {
            sweeper: Arc::new(ExpirySweeper::new(services.clone())),
            services,
            clock,
            store,
            messenger,
        }
    }

    fn started(fixture: &Fixture) -> DuelRecord {
        let duel = DuelRecord::started(
            Uuid::new_v4(),
            participant("a", "Astra"),
            participant("b", "Borealis"),
            t0(),
        );
        fixture.store.seed_duel(duel.clone());
        duel
    }

    /// A store where matchmaking claims the open request right after the
    /// sweeper loads it.
    struct ClaimedAfterLoad {
        inner: Arc<InMemoryStore>,
        joiner: Participant,
        now: DateTime<Utc>,
    }

    #[async_trait]
    impl DuelRepository for ClaimedAfterLoad {
        async fn get(&self, id: Uuid) -> Result<Option<DuelRecord>, DomainError> {
            let loaded = DuelRepository::get(self.inner.as_ref(), id).await?;
            self.inner.claim_open_request(&self.joiner, self.now).await?;
            Ok(loaded)
        }

        async fn save(&self, duel: &DuelRecord) -> Result<(), DomainError> {
            DuelRepository::save(self.inner.as_ref(), duel).await
        }

        async fn delete(&self, id: Uuid) -> Result<(), DomainError> {
            self.inner.delete(id).await
        }

        async fn delete_open_request(&self, id: Uuid) -> Result<bool, DomainError> {
            self.inner.delete_open_request(id).await
        }

        async fn involving(&self, player: &PlayerId) -> Result<Vec<DuelRecord>, DomainError> {
            self.inner.involving(player).await
        }

        async fn between(
            &self,
            a: &PlayerId,
            b: &PlayerId,
        ) -> Result<Option<DuelRecord>, DomainError> {
            self.inner.between(a, b).await
        }

        async fn claim_open_request(
            &self,
            joiner: &Participant,
            now: DateTime<Utc>,
        ) -> Result<Option<DuelRecord>, DomainError> {
            self.inner.claim_open_request(joiner, now).await
        }

        async fn all(&self) -> Result<Vec<DuelRecord>, DomainError> {
            self.inner.all().await
        }
    }

    fn a() -> PlayerId {
        PlayerId::new("a")
    }

    fn b() -> PlayerId {
        PlayerId::new("b")
    }

    #[tokio::test]
    async fn test_unjoined_open_request_is_cancelled_after_play_window() {
        // Arrange
        let fixture = fixture();
        let duel = DuelRecord::open_request(Uuid::new_v4(), participant("a", "Astra"), t0());
        fixture.store.seed_duel(duel.clone());
        fixture.clock.advance(TimeDelta::hours(49));

        // Act
        let summary = fixture.sweeper.sweep_once().await.unwrap();

        // Assert
        assert_eq!(summary.expired, 1);
        assert!(fixture.store.duel(duel.id).is_none());
        assert!(fixture.store.finished().is_empty());
        assert_eq!(
            fixture.messenger.messages_to(&a()),
            vec![
                "Nobody joined your game within <b>48</b> hours :(\nYour game request has been cancelled."
            ]
        );
    }

    #[tokio::test]
    async fn test_open_request_joined_during_sweep_is_kept() {
        // Arrange
        let fixture = fixture();
        let duel = DuelRecord::open_request(Uuid::new_v4(), participant("a", "Astra"), t0());
        fixture.store.seed_duel(duel.clone());
        fixture.clock.advance(TimeDelta::hours(49));
        let mut services = fixture.services.clone();
        services.duels = Arc::new(ClaimedAfterLoad {
            inner: fixture.store.clone(),
            joiner: participant("b", "Borealis"),
            now: t0() + TimeDelta::hours(49),
        });
        let sweeper = ExpirySweeper::new(services);

        // Act
        let summary = sweeper.sweep_once().await.unwrap();

        // Assert
        assert_eq!(summary.expired, 0);
        let kept = fixture.store.duel(duel.id).unwrap();
        assert_eq!(kept.cursor, 1);
        assert_eq!(kept.second.map(|p| p.alias), Some("Borealis".to_owned()));
        assert!(fixture.messenger.messages_to(&a()).is_empty());
    }

    #[tokio::test]
    async fn test_lapsed_invitation_tells_challenger_without_archiving() {
        // Arrange
        let fixture = fixture();
        let duel = DuelRecord::invitation(
            Uuid::new_v4(),
            participant("a", "Astra"),
            participant("b", "Borealis"),
            t0(),
        );
        fixture.store.seed_duel(duel.clone());
        fixture.clock.advance(TimeDelta::hours(49));

        // Act
        fixture.sweeper.sweep_once().await.unwrap();

        // Assert
        assert!(fixture.store.duel(duel.id).is_none());
        assert!(fixture.store.finished().is_empty());
        assert_eq!(
            fixture.messenger.messages_to(&a()),
            vec![messages::invitation_lapsed("Borealis", 48)]
        );
        assert!(fixture.messenger.messages_to(&b()).is_empty());
    }

    #[tokio::test]
    async fn test_lapsed_turn_is_forfeited_to_waiting_player() {
        // Arrange
        let fixture = fixture();
        let duel = started(&fixture);
        fixture.clock.advance(TimeDelta::hours(48) + TimeDelta::seconds(1));

        // Act
        let summary = fixture.sweeper.sweep_once().await.unwrap();

        // Assert
        assert_eq!(summary.expired, 1);
        assert!(fixture.store.duel(duel.id).is_none());
        let archived = fixture.store.finished();
        assert_eq!(archived.len(), 1);
        assert_eq!(archived[0].id, duel.id);
        assert_eq!(archived[0].outcome, GameOutcome::Forfeited { winner: a() });
        assert_eq!(
            fixture.messenger.messages_to(&b()),
            vec![messages::forfeit_lost("Astra", 48)]
        );
        assert_eq!(
            fixture.messenger.messages_to(&a()),
            vec![messages::forfeit_won("Borealis", 48)]
        );
        assert_eq!(fixture.store.player(&a()).unwrap().score, 0);
        assert_eq!(fixture.store.player(&b()).unwrap().score, 0);
    }

    #[tokio::test]
    async fn test_reminders_are_sent_once_per_level() {
        // Arrange
        let fixture = fixture();
        let duel = started(&fixture);

        // Act
        fixture.clock.advance(TimeDelta::hours(25));
        let first = fixture.sweeper.sweep_once().await.unwrap();
        let repeat = fixture.sweeper.sweep_once().await.unwrap();
        fixture.clock.advance(TimeDelta::hours(22) + TimeDelta::minutes(30));
        let second = fixture.sweeper.sweep_once().await.unwrap();

        // Assert
        assert_eq!(first.first_warnings, 1);
        assert_eq!(repeat, SweepSummary::default());
        assert_eq!(second.second_warnings, 1);
        assert_eq!(second.first_warnings, 0);
        assert_eq!(
            fixture.store.duel(duel.id).unwrap().warning_level,
            WarningLevel::Second
        );
        assert_eq!(
            fixture.messenger.messages_to(&b()),
            vec![
                messages::turn_reminder("Astra", 24),
                messages::urgent_turn_reminder("Astra", 1),
            ]
        );
    }

    #[tokio::test]
    async fn test_late_sweep_skips_straight_to_urgent_reminder() {
        let fixture = fixture();
        let duel = started(&fixture);
        fixture.clock.advance(TimeDelta::hours(47) + TimeDelta::minutes(10));

        let summary = fixture.sweeper.sweep_once().await.unwrap();

        assert_eq!(summary.second_warnings, 1);
        assert_eq!(summary.first_warnings, 0);
        assert_eq!(fixture.messenger.messages_to(&b()).len(), 1);
        assert_eq!(
            fixture.store.duel(duel.id).unwrap().warning_level,
            WarningLevel::Second
        );
    }

    #[tokio::test]
    async fn test_duel_with_running_turn_is_left_alone() {
        // Arrange
        let fixture = fixture();
        let duel = started(&fixture);
        let _turn = fixture
            .services
            .active_turns
            .try_claim(duel.id)
            .unwrap()
            .unwrap();
        fixture.clock.advance(TimeDelta::hours(49));

        // Act
        let summary = fixture.sweeper.sweep_once().await.unwrap();

        // Assert
        assert_eq!(summary.expired, 0);
        assert!(summary.busy >= 1);
        assert!(fixture.store.duel(duel.id).is_some());
        assert!(fixture.messenger.sent().is_empty());
    }

    #[tokio::test]
    async fn test_fresh_duels_are_untouched() {
        let fixture = fixture();
        started(&fixture);
        fixture.clock.advance(TimeDelta::hours(23));

        let summary = fixture.sweeper.sweep_once().await.unwrap();

        assert_eq!(summary, SweepSummary::default());
        assert!(fixture.messenger.sent().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_sweeps_on_interval_until_cancelled() {
        // Arrange
        let fixture = fixture();
        let duel = started(&fixture);
        fixture.clock.advance(TimeDelta::hours(49));
        let cancel = CancellationToken::new();
        let sweeper = Arc::clone(&fixture.sweeper);
        let token = cancel.clone();
        let handle = tokio::spawn(async move { sweeper.run(token).await });

        // Act
        tokio::time::sleep(Duration::from_secs(121)).await;
        cancel.cancel();
        handle.await.unwrap();

        // Assert
        assert!(fixture.store.duel(duel.id).is_none());
    }
}
