//! Test stores: in-memory and failing implementations of the repository
//! ports.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use trivia_duel_core::duel::{DuelRecord, Participant};
use trivia_duel_core::error::DomainError;
use trivia_duel_core::finished::FinishedGame;
use trivia_duel_core::player::{DuelResult, Player, PlayerId};
use trivia_duel_core::repository::{DuelRepository, FinishedGameRepository, PlayerRepository};
use uuid::Uuid;

/// A store holding duels, players and archived games in memory. Implements
/// all three repository ports, with an atomic open-request claim.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    duels: Mutex<HashMap<Uuid, DuelRecord>>,
    players: Mutex<HashMap<PlayerId, Player>>,
    finished: Mutex<Vec<FinishedGame>>,
}

impl InMemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a duel directly.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn seed_duel(&self, duel: DuelRecord) {
        self.duels.lock().unwrap().insert(duel.id, duel);
    }

    /// Inserts a player directly.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn seed_player(&self, player: Player) {
        self.players
            .lock()
            .unwrap()
            .insert(player.id.clone(), player);
    }

    /// Current state of a duel.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn duel(&self, id: Uuid) -> Option<DuelRecord> {
        self.duels.lock().unwrap().get(&id).cloned()
    }

    /// All duels, oldest first.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn duels(&self) -> Vec<DuelRecord> {
        let mut duels: Vec<DuelRecord> = self.duels.lock().unwrap().values().cloned().collect();
        duels.sort_by_key(|d| (d.created_at, d.id));
        duels
    }

    /// Current state of a player.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn player(&self, id: &PlayerId) -> Option<Player> {
        self.players.lock().unwrap().get(id).cloned()
    }

    /// Archived games, in insertion order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn finished(&self) -> Vec<FinishedGame> {
        self.finished.lock().unwrap().clone()
    }
}

#[async_trait]
impl DuelRepository for InMemoryStore {
    async fn get(&self, id: Uuid) -> Result<Option<DuelRecord>, DomainError> {
        Ok(self.duel(id))
    }

    async fn save(&self, duel: &DuelRecord) -> Result<(), DomainError> {
        self.duels.lock().unwrap().insert(duel.id, duel.clone());
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        self.duels.lock().unwrap().remove(&id);
        Ok(())
    }

    async fn delete_open_request(&self, id: Uuid) -> Result<bool, DomainError> {
        let mut duels = self.duels.lock().unwrap();
        if duels.get(&id).is_some_and(DuelRecord::is_open_request) {
            duels.remove(&id);
            return Ok(true);
        }
        Ok(false)
    }

    async fn involving(&self, player: &PlayerId) -> Result<Vec<DuelRecord>, DomainError> {
        Ok(self
            .duels()
            .into_iter()
            .filter(|d| d.involves(player))
            .collect())
    }

    async fn between(&self, a: &PlayerId, b: &PlayerId) -> Result<Option<DuelRecord>, DomainError> {
        Ok(self.duels().into_iter().find(|d| d.is_between(a, b)))
    }

    async fn claim_open_request(
        &self,
        joiner: &Participant,
        now: DateTime<Utc>,
    ) -> Result<Option<DuelRecord>, DomainError> {
        let mut duels = self.duels.lock().unwrap();
        let opponents: HashSet<PlayerId> = duels
            .values()
            .filter(|d| d.involves(&joiner.id))
            .flat_map(|d| {
                [
                    Some(d.first.id.clone()),
                    d.second.as_ref().map(|p| p.id.clone()),
                    d.invited.as_ref().map(|p| p.id.clone()),
                ]
            })
            .flatten()
            .collect();
        let candidate = duels
            .values()
            .filter(|d| d.is_open_request())
            .filter(|d| d.first.id != joiner.id && !opponents.contains(&d.first.id))
            .min_by_key(|d| (d.created_at, d.id))
            .map(|d| d.id);
        Ok(candidate.and_then(|id| {
            duels.get_mut(&id).map(|duel| {
                duel.attach_second(joiner.clone(), now);
                duel.clone()
            })
        }))
    }

    async fn all(&self) -> Result<Vec<DuelRecord>, DomainError> {
        Ok(self.duels())
    }
}

#[async_trait]
impl PlayerRepository for InMemoryStore {
    async fn get(&self, id: &PlayerId) -> Result<Option<Player>, DomainError> {
        Ok(self.player(id))
    }

    async fn save(&self, player: &Player) -> Result<(), DomainError> {
        let mut players = self.players.lock().unwrap();
        match players.get_mut(&player.id) {
            Some(existing) => {
                existing.handle.clone_from(&player.handle);
                existing.alias.clone_from(&player.alias);
            }
            None => {
                players.insert(player.id.clone(), player.clone());
            }
        }
        Ok(())
    }

    async fn apply_result(
        &self,
        id: &PlayerId,
        result: DuelResult,
        flawless: bool,
    ) -> Result<bool, DomainError> {
        let mut players = self.players.lock().unwrap();
        let Some(player) = players.get_mut(id) else {
            return Ok(false);
        };
        player.apply_result(result, flawless);
        Ok(true)
    }

    async fn find_by_alias(&self, alias: &str) -> Result<Option<Player>, DomainError> {
        Ok(self
            .players
            .lock()
            .unwrap()
            .values()
            .find(|p| p.alias.as_deref().is_some_and(|a| a.eq_ignore_ascii_case(alias)))
            .cloned())
    }
}

#[async_trait]
impl FinishedGameRepository for InMemoryStore {
    async fn insert(&self, game: &FinishedGame) -> Result<(), DomainError> {
        self.finished.lock().unwrap().push(game.clone());
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<FinishedGame>, DomainError> {
        Ok(self
            .finished
            .lock()
            .unwrap()
            .iter()
            .find(|g| g.id == id)
            .cloned())
    }
}

/// A store that always returns an infrastructure error. Useful for testing
/// error-handling paths.
#[derive(Debug)]
pub struct FailingStore;

fn refused<T>() -> Result<T, DomainError> {
    Err(DomainError::Infrastructure("connection refused".into()))
}

#[async_trait]
impl DuelRepository for FailingStore {
    async fn get(&self, _id: Uuid) -> Result<Option<DuelRecord>, DomainError> {
        refused()
    }

    async fn save(&self, _duel: &DuelRecord) -> Result<(), DomainError> {
        refused()
    }

    async fn delete(&self, _id: Uuid) -> Result<(), DomainError> {
        refused()
    }

    async fn delete_open_request(&self, _id: Uuid) -> Result<bool, DomainError> {
        refused()
    }

    async fn involving(&self, _player: &PlayerId) -> Result<Vec<DuelRecord>, DomainError> {
        refused()
    }

    async fn between(
        &self,
        _a: &PlayerId,
        _b: &PlayerId,
    ) -> Result<Option<DuelRecord>, DomainError> {
        refused()
    }

    async fn claim_open_request(
        &self,
        _joiner: &Participant,
        _now: DateTime<Utc>,
    ) -> Result<Option<DuelRecord>, DomainError> {
        refused()
    }

    async fn all(&self) -> Result<Vec<DuelRecord>, DomainError> {
        refused()
    }
}

#[async_trait]
impl PlayerRepository for FailingStore {
    async fn get(&self, _id: &PlayerId) -> Result<Option<Player>, DomainError> {
        refused()
    }

    async fn save(&self, _player: &Player) -> Result<(), DomainError> {
        refused()
    }

    async fn apply_result(
        &self,
        _id: &PlayerId,
        _result: DuelResult,
        _flawless: bool,
    ) -> Result<bool, DomainError> {
        refused()
    }

    async fn find_by_alias(&self, _alias: &str) -> Result<Option<Player>, DomainError> {
        refused()
    }
}

#[async_trait]
impl FinishedGameRepository for FailingStore {
    async fn insert(&self, _game: &FinishedGame) -> Result<(), DomainError> {
        refused()
    }

    async fn get(&self, _id: Uuid) -> Result<Option<FinishedGame>, DomainError> {
        refused()
    }
}
