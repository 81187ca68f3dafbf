//! Trivia Duel: question content.
//!
//! Implements the `QuestionSource` port against the Open Trivia DB HTTP
//! API. Categories are cached for the configured TTL; question triples
//! are always fetched fresh.

pub mod application;
pub mod domain;
