//! Application layer: correlation of answers, turn execution and challenge
//! handling.

pub mod command_handlers;
pub mod correlation;
pub mod services;
mod turn;

pub use turn::TurnOutcome;
