//! Trivia duel: Players bounded context.
//!
//! Players are created on first contact and pick a public alias before
//! they can be matched.

pub mod application;
pub mod domain;
