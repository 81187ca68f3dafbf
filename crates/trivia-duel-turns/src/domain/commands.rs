//! Commands for the Turns context.

use trivia_duel_core::command::Command;
use trivia_duel_core::messenger::{MessageRef, PromptId};
use trivia_duel_core::player::PlayerId;
use uuid::Uuid;

/// The active player pressed "Play" on a duel.
#[derive(Debug, Clone)]
pub struct PlayTurn {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The duel to play.
    pub duel_id: Uuid,
    /// Who pressed the button.
    pub player_id: PlayerId,
}

impl Command for PlayTurn {
    fn command_type(&self) -> &'static str {
        "turns.play_turn"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// The invited player accepted a named challenge.
#[derive(Debug, Clone)]
pub struct AcceptChallenge {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The pending duel.
    pub duel_id: Uuid,
    /// Who pressed the button.
    pub player_id: PlayerId,
    /// The invitation message, edited to confirm the choice.
    pub source_message: Option<MessageRef>,
}

impl Command for AcceptChallenge {
    fn command_type(&self) -> &'static str {
        "turns.accept_challenge"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// The invited player ignored a named challenge.
#[derive(Debug, Clone)]
pub struct DeclineChallenge {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The pending duel.
    pub duel_id: Uuid,
    /// Who pressed the button.
    pub player_id: PlayerId,
    /// The invitation message, edited to confirm the choice.
    pub source_message: Option<MessageRef>,
}

impl Command for DeclineChallenge {
    fn command_type(&self) -> &'static str {
        "turns.decline_challenge"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// A player selected an option on a timed prompt.
#[derive(Debug, Clone)]
pub struct SubmitAnswer {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The prompt that was answered.
    pub prompt_id: PromptId,
    /// Who answered.
    pub responder: PlayerId,
    /// Index of the selected option.
    pub option: usize,
}

impl Command for SubmitAnswer {
    fn command_type(&self) -> &'static str {
        "turns.submit_answer"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}
