//! Trivia Duel Core: shared domain abstractions.
//!
//! This crate defines the records, value types and ports that every
//! bounded context depends on. It contains no infrastructure code.

pub mod clock;
pub mod command;
pub mod correctness;
pub mod duel;
pub mod error;
pub mod finished;
pub mod messenger;
pub mod player;
pub mod questions;
pub mod repository;
pub mod rng;
pub mod settings;
