//! Trivia duel: Expiry bounded context.
//!
//! A periodic sweep reminds players of stalled turns and removes duels
//! nobody acted on within the play window.

pub mod application;
pub mod domain;
