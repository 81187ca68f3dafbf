//! Collaborators a turn needs, and per-duel turn ownership.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use tracing::warn;
use trivia_duel_core::clock::Clock;
use trivia_duel_core::error::DomainError;
use trivia_duel_core::messenger::{MessageAction, MessageRef, Messenger};
use trivia_duel_core::player::PlayerId;
use trivia_duel_core::questions::QuestionSource;
use trivia_duel_core::repository::{DuelRepository, FinishedGameRepository, PlayerRepository};
use trivia_duel_core::rng::DeterministicRng;
use trivia_duel_core::settings::GameSettings;
use uuid::Uuid;

use crate::application::correlation::CorrelationTable;

/// Everything the turn protocol talks to. Constructed once at startup and
/// shared by the inbound handlers and both background loops.
#[derive(Clone)]
pub struct DuelServices {
    /// Time source for activity stamps.
    pub clock: Arc<dyn Clock>,
    /// Shuffles and category offers. Locked only around synchronous calls.
    pub rng: Arc<Mutex<dyn DeterministicRng + Send>>,
    /// In-progress duels.
    pub duels: Arc<dyn DuelRepository>,
    /// Player records.
    pub players: Arc<dyn PlayerRepository>,
    /// Archive of concluded duels.
    pub archive: Arc<dyn FinishedGameRepository>,
    /// Outbound transport.
    pub messenger: Arc<dyn Messenger>,
    /// Categories and questions.
    pub questions: Arc<dyn QuestionSource>,
    /// Outstanding prompts.
    pub correlation: Arc<CorrelationTable>,
    /// Duels whose turn is currently running.
    pub active_turns: Arc<ActiveTurns>,
    /// Timing and capacity knobs.
    pub settings: GameSettings,
}

impl DuelServices {
    /// Runs `f` with the RNG locked. Never call across an await.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the RNG mutex is poisoned.
    pub fn with_rng<T>(
        &self,
        f: impl FnOnce(&mut dyn DeterministicRng) -> T,
    ) -> Result<T, DomainError> {
        let mut guard = self
            .rng
            .lock()
            .map_err(|e| DomainError::Infrastructure(format!("RNG mutex poisoned: {e}")))?;
        Ok(f(&mut *guard))
    }
}

/// Set of duel ids with a turn in flight. At most one turn runs per duel.
#[derive(Debug, Default)]
pub struct ActiveTurns {
    duels: Mutex<HashSet<Uuid>>,
}

impl ActiveTurns {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims the turn of `duel_id`. Returns `None` if it is already taken.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the lock is poisoned.
    pub fn try_claim(self: &Arc<Self>, duel_id: Uuid) -> Result<Option<TurnGuard>, DomainError> {
        let mut duels = self
            .duels
            .lock()
            .map_err(|e| DomainError::Infrastructure(format!("active turns poisoned: {e}")))?;
        if !duels.insert(duel_id) {
            return Ok(None);
        }
        Ok(Some(TurnGuard {
            owner: Arc::clone(self),
            duel_id,
        }))
    }

    /// Whether a turn of `duel_id` is running.
    #[must_use]
    pub fn is_active(&self, duel_id: Uuid) -> bool {
        self.duels
            .lock()
            .map(|duels| duels.contains(&duel_id))
            .unwrap_or(true)
    }
}

/// Releases the claimed turn when dropped.
#[derive(Debug)]
pub struct TurnGuard {
    owner: Arc<ActiveTurns>,
    duel_id: Uuid,
}

impl Drop for TurnGuard {
    fn drop(&mut self) {
        if let Ok(mut duels) = self.owner.duels.lock() {
            duels.remove(&self.duel_id);
        }
    }
}

/// Sends a plain message, logging instead of failing if it cannot be
/// delivered.
pub async fn notify(
    messenger: &dyn Messenger,
    to: &PlayerId,
    text: &str,
    actions: &[MessageAction],
) -> Option<MessageRef> {
    match messenger.send_message(to, text, actions).await {
        Ok(sent) => Some(sent),
        Err(e) => {
            warn!(player_id = %to, error = %e, "message delivery failed");
            None
        }
    }
}

/// Edits an earlier message, logging instead of failing.
pub async fn notify_edit(messenger: &dyn Messenger, to: &PlayerId, message: &MessageRef, text: &str) {
    if let Err(e) = messenger.edit_message(to, message, text).await {
        warn!(player_id = %to, error = %e, "message edit failed");
    }
}
