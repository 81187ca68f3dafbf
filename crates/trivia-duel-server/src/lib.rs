//! Trivia Duel: HTTP server.
//!
//! Hosts the engine behind an axum surface the transport gateway posts
//! player events into, and wires the background matchmaking and expiry
//! loops.

pub mod boundary;
pub mod config;
pub mod error;
pub mod gateway;
pub mod routes;
pub mod state;

#[cfg(test)]
pub(crate) fn test_state(
    messenger: std::sync::Arc<trivia_duel_test_support::RecordingMessenger>,
    operator_chat: Option<trivia_duel_core::player::PlayerId>,
) -> state::AppState {
    use std::sync::{Arc, Mutex};

    use trivia_duel_core::settings::GameSettings;
    use trivia_duel_matchmaking::domain::queues::MatchmakingQueues;
    use trivia_duel_test_support::{FixedClock, InMemoryStore, MockRng, StaticQuestionSource, t0};
    use trivia_duel_turns::application::correlation::CorrelationTable;
    use trivia_duel_turns::application::services::{ActiveTurns, DuelServices};

    let store = Arc::new(InMemoryStore::new());
    let services = DuelServices {
        clock: Arc::new(FixedClock(t0())),
        rng: Arc::new(Mutex::new(MockRng)),
        duels: store.clone(),
        players: store.clone(),
        archive: store,
        messenger,
        questions: Arc::new(StaticQuestionSource::with_categories(10)),
        correlation: Arc::new(CorrelationTable::new()),
        active_turns: Arc::new(ActiveTurns::new()),
        settings: GameSettings::default(),
    };
    state::AppState::new(services, Arc::new(MatchmakingQueues::new()), operator_chat)
}
