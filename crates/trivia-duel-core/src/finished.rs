//! Archival record of a concluded duel.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::duel::{DuelRecord, FINAL_CURSOR};
use crate::error::DomainError;
use crate::player::PlayerId;

/// How a duel ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GameOutcome {
    /// All six rounds were played and one player had more correct answers.
    Won {
        /// The winner.
        winner: PlayerId,
    },
    /// All six rounds were played with equal correct answers.
    Draw,
    /// The duel was aborted before completion; nobody won.
    Unfinished,
    /// The active player let the play window lapse.
    Forfeited {
        /// The player who was waiting.
        winner: PlayerId,
    },
}

impl GameOutcome {
    /// The winning player, if any.
    #[must_use]
    pub fn winner(&self) -> Option<&PlayerId> {
        match self {
            Self::Won { winner } | Self::Forfeited { winner } => Some(winner),
            Self::Draw | Self::Unfinished => None,
        }
    }
}

/// Immutable snapshot written once when a started duel ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinishedGame {
    /// Same id as the duel it archives.
    pub id: Uuid,
    /// The creator.
    pub first_player: PlayerId,
    /// The opponent.
    pub second_player: PlayerId,
    /// Correct answers of the first player.
    pub first_points: u32,
    /// Correct answers of the second player.
    pub second_points: u32,
    /// Categories of the six rounds.
    pub categories: [Option<u32>; 6],
    /// When both players were attached.
    pub started_at: Option<DateTime<Utc>>,
    /// When the duel ended.
    pub ended_at: DateTime<Utc>,
    /// Last round both players completed.
    pub until_round: u8,
    /// Result.
    pub outcome: GameOutcome,
}

impl FinishedGame {
    fn snapshot(
        duel: &DuelRecord,
        outcome: GameOutcome,
        ended_at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        let second = duel.second.as_ref().ok_or_else(|| {
            DomainError::Validation(format!("duel {} has no second participant", duel.id))
        })?;
        Ok(Self {
            id: duel.id,
            first_player: duel.first.id.clone(),
            second_player: second.id.clone(),
            first_points: duel.first_correct.count(),
            second_points: duel.second_correct.count(),
            categories: duel.categories,
            started_at: duel.started_at,
            ended_at,
            until_round: duel.cursor.saturating_sub(1),
            outcome,
        })
    }

    /// Archives a duel that reached its final step.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the duel has not started or is
    /// not at its final cursor.
    pub fn completed(duel: &DuelRecord, ended_at: DateTime<Utc>) -> Result<Self, DomainError> {
        if duel.cursor != FINAL_CURSOR {
            return Err(DomainError::Validation(format!(
                "duel {} is not complete (cursor {})",
                duel.id, duel.cursor
            )));
        }
        let mut game = Self::snapshot(duel, GameOutcome::Draw, ended_at)?;
        game.outcome = if game.first_points > game.second_points {
            GameOutcome::Won {
                winner: game.first_player.clone(),
            }
        } else if game.second_points > game.first_points {
            GameOutcome::Won {
                winner: game.second_player.clone(),
            }
        } else {
            GameOutcome::Draw
        };
        Ok(game)
    }

    /// Archives a duel that had to be cancelled.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the duel has not started.
    pub fn aborted(duel: &DuelRecord, ended_at: DateTime<Utc>) -> Result<Self, DomainError> {
        Self::snapshot(duel, GameOutcome::Unfinished, ended_at)
    }

    /// Archives a duel whose active player let the play window lapse.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the duel has not started.
    pub fn forfeited(duel: &DuelRecord, ended_at: DateTime<Utc>) -> Result<Self, DomainError> {
        let winner = duel
            .waiting_player()
            .map(|p| p.id.clone())
            .ok_or_else(|| DomainError::Validation(format!("duel {} has not started", duel.id)))?;
        Self::snapshot(duel, GameOutcome::Forfeited { winner }, ended_at)
    }
}
