//! Trivia duel: Matchmaking bounded context.
//!
//! Players ask for a stranger or name an opponent; a single periodic
//! processor drains both queues and turns compatible requests into duels.

pub mod application;
pub mod domain;
