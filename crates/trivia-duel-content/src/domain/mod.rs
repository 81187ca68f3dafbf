//! Provider payloads and text cleanup.

pub mod entities;
pub mod wire;
