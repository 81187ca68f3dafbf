//! Shared test fakes and utilities for the trivia duel engine.

mod clock;
mod fixtures;
mod messenger;
mod questions;
mod rng;
mod store;

pub use clock::{FixedClock, ManualClock};
pub use fixtures::{participant, player, t0};
pub use messenger::{RecordingMessenger, Sent};
pub use questions::{FailingQuestionSource, StaticQuestionSource};
pub use rng::{MockRng, SequenceRng};
pub use store::{FailingStore, InMemoryStore};
