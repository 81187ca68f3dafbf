//! Shared application state.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use trivia_duel_core::error::{DomainError, Rejection};
use trivia_duel_core::player::PlayerId;
use trivia_duel_matchmaking::domain::queues::MatchmakingQueues;
use trivia_duel_turns::application::services::DuelServices;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Engine collaborators, shared with the background loops.
    pub services: DuelServices,
    /// Matchmaking requests awaiting the next processor pass.
    pub queues: Arc<MatchmakingQueues>,
    /// Chat that receives unexpected errors.
    pub operator_chat: Option<PlayerId>,
    maintenance: Arc<AtomicBool>,
}

impl AppState {
    /// Create new application state.
    #[must_use]
    pub fn new(
        services: DuelServices,
        queues: Arc<MatchmakingQueues>,
        operator_chat: Option<PlayerId>,
    ) -> Self {
        Self {
            services,
            queues,
            operator_chat,
            maintenance: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Whether new play is currently refused.
    #[must_use]
    pub fn in_maintenance(&self) -> bool {
        self.maintenance.load(Ordering::SeqCst)
    }

    /// Switches maintenance mode and returns the previous value.
    pub fn set_maintenance(&self, enabled: bool) -> bool {
        self.maintenance.swap(enabled, Ordering::SeqCst)
    }

    /// Refuses new play while in maintenance.
    ///
    /// # Errors
    ///
    /// Returns `Rejection::Maintenance` while maintenance mode is on.
    pub fn ensure_open(&self) -> Result<(), DomainError> {
        if self.in_maintenance() {
            return Err(Rejection::Maintenance.into());
        }
        Ok(())
    }
}
