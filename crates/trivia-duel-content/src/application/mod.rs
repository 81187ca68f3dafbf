//! Category caching and the HTTP question source.

pub mod cache;
pub mod open_trivia;
