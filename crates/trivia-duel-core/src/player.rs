//! Player identity and record.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque external identity of a player, as assigned by the transport.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    /// Wraps a transport-assigned identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the raw identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Persistent player record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// Transport identity.
    pub id: PlayerId,
    /// Display handle reported by the transport.
    pub handle: String,
    /// Public alias shown to opponents; unique case-insensitively.
    pub alias: Option<String>,
    /// Cumulative ranked score.
    pub score: u32,
    /// Number of duels finished with all 18 answers correct.
    pub flawless_duels: u32,
}

impl Player {
    /// Creates a player on first contact, without an alias.
    #[must_use]
    pub fn new(id: PlayerId, handle: impl Into<String>) -> Self {
        Self {
            id,
            handle: handle.into(),
            alias: None,
            score: 0,
            flawless_duels: 0,
        }
    }

    /// Returns the alias, or the handle if no alias has been chosen yet.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.handle)
    }

    /// Applies a settled duel. The score never drops below zero.
    pub fn apply_result(&mut self, result: DuelResult, flawless: bool) {
        self.score = self.score.saturating_add_signed(result.score_delta());
        if flawless {
            self.flawless_duels += 1;
        }
    }
}

/// One player's result of a completed duel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuelResult {
    /// More correct answers than the opponent.
    Win,
    /// Fewer correct answers than the opponent.
    Loss,
    /// Equal correct answers.
    Draw,
}

impl DuelResult {
    /// Ranked score change: win +3, loss -1, draw +1.
    #[must_use]
    pub const fn score_delta(self) -> i32 {
        match self {
            Self::Win => 3,
            Self::Loss => -1,
            Self::Draw => 1,
        }
    }
}
