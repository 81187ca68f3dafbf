//! Commands for the Players context.

use trivia_duel_core::command::Command;
use trivia_duel_core::player::PlayerId;
use uuid::Uuid;

/// Any inbound contact from a player; creates or refreshes their record.
#[derive(Debug, Clone)]
pub struct RegisterPlayer {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// Transport identity.
    pub player_id: PlayerId,
    /// Current display handle.
    pub handle: String,
}

impl Command for RegisterPlayer {
    fn command_type(&self) -> &'static str {
        "players.register_player"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// A player picks their public alias.
#[derive(Debug, Clone)]
pub struct SetAlias {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The player.
    pub player_id: PlayerId,
    /// Requested alias.
    pub alias: String,
}

impl Command for SetAlias {
    fn command_type(&self) -> &'static str {
        "players.set_alias"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}
