//! The two inbound matchmaking queues.
//!
//! Both are owned by one `MatchmakingQueues` value built at startup and
//! shared between the inbound handlers (producers) and the processor (the
//! only consumer).

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use trivia_duel_core::duel::Participant;
use trivia_duel_core::error::DomainError;
use trivia_duel_core::player::PlayerId;

/// A queued challenge of `challenger` against whoever owns `target_alias`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedChallenge {
    /// The challenger, alias captured at enqueue time.
    pub challenger: Participant,
    /// The opponent's alias as typed.
    pub target_alias: String,
}

/// Stranger requests (no ordering guarantee) and named challenges (strict
/// arrival order).
#[derive(Debug, Default)]
pub struct MatchmakingQueues {
    strangers: Mutex<VecDeque<Participant>>,
    challenges: Mutex<VecDeque<NamedChallenge>>,
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, DomainError> {
    mutex
        .lock()
        .map_err(|e| DomainError::Infrastructure(format!("matchmaking queue poisoned: {e}")))
}

impl MatchmakingQueues {
    /// Creates empty queues.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a stranger request.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the queue's lock is poisoned.
    pub fn push_stranger(&self, player: Participant) -> Result<(), DomainError> {
        lock(&self.strangers)?.push_back(player);
        Ok(())
    }

    /// Queues a named challenge behind all earlier ones.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the queue's lock is poisoned.
    pub fn push_challenge(&self, challenge: NamedChallenge) -> Result<(), DomainError> {
        lock(&self.challenges)?.push_back(challenge);
        Ok(())
    }

    /// Takes every queued stranger request.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the queue's lock is poisoned.
    pub fn drain_strangers(&self) -> Result<Vec<Participant>, DomainError> {
        Ok(lock(&self.strangers)?.drain(..).collect())
    }

    /// Takes the oldest named challenge.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the queue's lock is poisoned.
    pub fn pop_challenge(&self) -> Result<Option<NamedChallenge>, DomainError> {
        Ok(lock(&self.challenges)?.pop_front())
    }

    /// Removes and returns the oldest queued challenge by `challenger`
    /// naming `alias`, if any.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the queue's lock is poisoned.
    pub fn take_reciprocal(
        &self,
        challenger: &PlayerId,
        alias: &str,
    ) -> Result<Option<NamedChallenge>, DomainError> {
        let mut challenges = lock(&self.challenges)?;
        let position = challenges.iter().position(|c| {
            c.challenger.id == *challenger && c.target_alias.eq_ignore_ascii_case(alias)
        });
        Ok(position.and_then(|i| challenges.remove(i)))
    }

    /// Number of queued stranger requests.
    #[must_use]
    pub fn strangers_waiting(&self) -> usize {
        self.strangers.lock().map_or(0, |q| q.len())
    }

    /// Number of queued named challenges.
    #[must_use]
    pub fn challenges_waiting(&self) -> usize {
        self.challenges.lock().map_or(0, |q| q.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn challenge(id: &str, alias: &str, target: &str) -> NamedChallenge {
        NamedChallenge {
            challenger: Participant::new(PlayerId::new(id), alias),
            target_alias: target.to_owned(),
        }
    }

    #[test]
    fn test_challenges_pop_in_arrival_order() {
        // Arrange
        let queues = MatchmakingQueues::new();
        queues.push_challenge(challenge("a", "Astra", "Borealis")).unwrap();
        queues.push_challenge(challenge("c", "Cygnus", "Astra")).unwrap();

        // Act
        let first = queues.pop_challenge().unwrap().unwrap();
        let second = queues.pop_challenge().unwrap().unwrap();

        // Assert
        assert_eq!(first.challenger.alias, "Astra");
        assert_eq!(second.challenger.alias, "Cygnus");
        assert!(queues.pop_challenge().unwrap().is_none());
    }

    #[test]
    fn test_take_reciprocal_removes_only_the_matching_entry() {
        // Arrange
        let queues = MatchmakingQueues::new();
        queues.push_challenge(challenge("c", "Cygnus", "Astra")).unwrap();
        queues.push_challenge(challenge("b", "Borealis", "astra")).unwrap();

        // Act
        let found = queues.take_reciprocal(&PlayerId::new("b"), "Astra").unwrap();

        // Assert
        assert_eq!(found, Some(challenge("b", "Borealis", "astra")));
        assert_eq!(queues.challenges_waiting(), 1);
        assert!(
            queues
                .take_reciprocal(&PlayerId::new("b"), "Astra")
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn test_drain_strangers_empties_queue() {
        let queues = MatchmakingQueues::new();
        queues
            .push_stranger(Participant::new(PlayerId::new("a"), "Astra"))
            .unwrap();

        let drained = queues.drain_strangers().unwrap();

        assert_eq!(drained.len(), 1);
        assert_eq!(queues.strangers_waiting(), 0);
    }
}
