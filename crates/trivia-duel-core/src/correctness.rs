//! Per-player correctness record: one write-once bit per (round, question).

use serde::{Deserialize, Serialize};

/// Number of rounds in a duel.
pub const ROUNDS: u8 = 6;

/// Number of questions per round.
pub const QUESTIONS_PER_ROUND: u8 = 3;

/// Total number of questions a player answers in a complete duel.
pub const TOTAL_QUESTIONS: u32 = (ROUNDS as u32) * (QUESTIONS_PER_ROUND as u32);

/// Bitset of correctly answered questions. Bit `(round - 1) * 3 + (q - 1)`
/// is set when question `q` of `round` was answered correctly. Bits are
/// never cleared.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorrectAnswers(u32);

impl CorrectAnswers {
    const MASK: u32 = (1 << TOTAL_QUESTIONS) - 1;

    /// An empty record.
    #[must_use]
    pub const fn new() -> Self {
        Self(0)
    }

    /// Restores a record from its persisted bit pattern. Bits beyond the
    /// 18th are discarded.
    #[must_use]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits & Self::MASK)
    }

    /// The persisted bit pattern.
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    fn bit(round: u8, question: u8) -> Option<u32> {
        if !(1..=ROUNDS).contains(&round) || !(1..=QUESTIONS_PER_ROUND).contains(&question) {
            return None;
        }
        Some(1 << (u32::from(round - 1) * u32::from(QUESTIONS_PER_ROUND) + u32::from(question - 1)))
    }

    /// Marks question `question` of `round` as correct. Out-of-range
    /// coordinates are ignored. Returns whether the bit was newly set.
    pub fn mark(&mut self, round: u8, question: u8) -> bool {
        match Self::bit(round, question) {
            Some(bit) if self.0 & bit == 0 => {
                self.0 |= bit;
                true
            }
            _ => false,
        }
    }

    /// Whether question `question` of `round` was answered correctly.
    #[must_use]
    pub fn is_correct(self, round: u8, question: u8) -> bool {
        Self::bit(round, question).is_some_and(|bit| self.0 & bit != 0)
    }

    /// The three results of one round, in question order.
    #[must_use]
    pub fn round(self, round: u8) -> [bool; 3] {
        [
            self.is_correct(round, 1),
            self.is_correct(round, 2),
            self.is_correct(round, 3),
        ]
    }

    /// Total number of correct answers.
    #[must_use]
    pub const fn count(self) -> u32 {
        self.0.count_ones()
    }

    /// Whether every one of the 18 questions was answered correctly.
    #[must_use]
    pub const fn is_flawless(self) -> bool {
        self.count() == TOTAL_QUESTIONS
    }
}
