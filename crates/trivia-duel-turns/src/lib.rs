//! Trivia Duel: Turns bounded context.
//!
//! Runs one player's turn of a duel: answering the round the opponent
//! opened, choosing a category for a new round, waiting on timed prompts
//! whose answers arrive through the correlation table, and closing out the
//! duel with scoring and an archival record.

pub mod application;
pub mod domain;
