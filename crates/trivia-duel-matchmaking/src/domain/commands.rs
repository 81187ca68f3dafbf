//! Commands for the Matchmaking context.

use trivia_duel_core::command::Command;
use trivia_duel_core::player::PlayerId;
use uuid::Uuid;

/// A player wants to play against anyone.
#[derive(Debug, Clone)]
pub struct RequestStranger {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The requesting player.
    pub player_id: PlayerId,
}

impl Command for RequestStranger {
    fn command_type(&self) -> &'static str {
        "matchmaking.request_stranger"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// A player challenges someone by alias.
#[derive(Debug, Clone)]
pub struct ChallengePlayer {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The challenger.
    pub player_id: PlayerId,
    /// The opponent's alias as typed.
    pub alias: String,
}

impl Command for ChallengePlayer {
    fn command_type(&self) -> &'static str {
        "matchmaking.challenge_player"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}
