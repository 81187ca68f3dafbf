//! Domain layer: commands, answer presentation, player-facing texts and the
//! scoreboard.

pub mod commands;
pub mod messages;
pub mod presentation;
pub mod scoreboard;
