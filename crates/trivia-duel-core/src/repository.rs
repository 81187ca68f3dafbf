//! Persistence ports for duels, players and the archive.
//!
//! Storage is keyed load/save/delete with last-write-wins per row. Rows
//! written by more than one loop get conditional operations instead:
//! claiming and deleting open stranger requests, and settling scores.

use async_trait::async_trait;
use uuid::Uuid;

use crate::duel::{DuelRecord, Participant};
use crate::error::DomainError;
use crate::finished::FinishedGame;
use crate::player::{DuelResult, Player, PlayerId};

/// Repository for in-progress duels.
#[async_trait]
pub trait DuelRepository: Send + Sync {
    /// Loads a duel, or `None` if it does not exist.
    async fn get(&self, id: Uuid) -> Result<Option<DuelRecord>, DomainError>;

    /// Inserts or replaces a duel.
    async fn save(&self, duel: &DuelRecord) -> Result<(), DomainError>;

    /// Deletes a duel. Deleting a missing duel is not an error.
    async fn delete(&self, id: Uuid) -> Result<(), DomainError>;

    /// Deletes the duel only while it is still an unclaimed open stranger
    /// request. Returns `false` if it was claimed or is already gone.
    async fn delete_open_request(&self, id: Uuid) -> Result<bool, DomainError>;

    /// All duels `player` takes part in, including pending invitations.
    async fn involving(&self, player: &PlayerId) -> Result<Vec<DuelRecord>, DomainError>;

    /// The duel between exactly `a` and `b`, if one exists.
    async fn between(&self, a: &PlayerId, b: &PlayerId) -> Result<Option<DuelRecord>, DomainError>;

    /// Atomically attaches `joiner` to one open stranger request that
    /// does not already involve them (or anyone they are already playing
    /// against) and returns the updated duel. The same open request is
    /// never returned to two callers.
    async fn claim_open_request(
        &self,
        joiner: &Participant,
        now: chrono::DateTime<chrono::Utc>,
    ) -> Result<Option<DuelRecord>, DomainError>;

    /// Every persisted duel.
    async fn all(&self) -> Result<Vec<DuelRecord>, DomainError>;
}

/// Repository for player records.
#[async_trait]
pub trait PlayerRepository: Send + Sync {
    /// Loads a player.
    async fn get(&self, id: &PlayerId) -> Result<Option<Player>, DomainError>;

    /// Inserts a player, or updates the handle and alias of an existing
    /// one. Score and flawless count of an existing player are left alone.
    async fn save(&self, player: &Player) -> Result<(), DomainError>;

    /// Atomically applies a settled duel result to the player's score and
    /// flawless count. Returns `false` if the player does not exist.
    async fn apply_result(
        &self,
        id: &PlayerId,
        result: DuelResult,
        flawless: bool,
    ) -> Result<bool, DomainError>;

    /// Finds the player whose alias matches, case-insensitively.
    async fn find_by_alias(&self, alias: &str) -> Result<Option<Player>, DomainError>;
}

/// Append-only archive of concluded duels.
#[async_trait]
pub trait FinishedGameRepository: Send + Sync {
    /// Writes the archival record.
    async fn insert(&self, game: &FinishedGame) -> Result<(), DomainError>;

    /// Loads an archived game.
    async fn get(&self, id: Uuid) -> Result<Option<FinishedGame>, DomainError>;
}
