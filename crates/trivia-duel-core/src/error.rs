//! Domain error types.

use thiserror::Error;
use uuid::Uuid;

use crate::player::PlayerId;

/// Top-level domain error type.
#[derive(Debug, Error)]
pub enum DomainError {
    /// A duel was not found (never existed, finished, or expired).
    #[error("duel not found: {0}")]
    DuelNotFound(Uuid),

    /// A player was not found.
    #[error("player not found: {0}")]
    PlayerNotFound(PlayerId),

    /// A malformed request that no player-facing rule covers.
    #[error("validation error: {0}")]
    Validation(String),

    /// A request that violates a game rule; reported back to the player.
    #[error("request rejected: {0}")]
    Rejected(Rejection),

    /// The question provider could not deliver categories or questions.
    #[error("content unavailable: {0}")]
    ContentUnavailable(String),

    /// A prompt could not be delivered to a player.
    #[error("delivery failed: {0}")]
    DeliveryFailed(String),

    /// An infrastructure/persistence error.
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}

impl From<Rejection> for DomainError {
    fn from(rejection: Rejection) -> Self {
        Self::Rejected(rejection)
    }
}

/// Game-rule violations. The `Display` text is what the requesting
/// player is told.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    /// The requester already has the maximum number of open duels.
    #[error(
        "You can't have over {cap} duels running at a time! Finish other duels first before starting new ones!"
    )]
    TooManyDuels {
        /// The configured cap.
        cap: usize,
    },

    /// No player carries the requested alias.
    #[error(
        "I can't find anyone by the alias <b>{0}</b>!\n\nPerhaps they changed it? Sorry, can't start a game."
    )]
    UnknownAlias(String),

    /// A player named their own alias.
    #[error("You cannot play a duel against yourself!")]
    SelfChallenge,

    /// The challenged player already has the maximum number of open duels.
    #[error(
        "You can't challenge <b>{alias}</b> to a duel, as they already have {cap} duels running! Try again later ;)"
    )]
    OpponentSaturated {
        /// The challenged alias.
        alias: String,
        /// The configured cap.
        cap: usize,
    },

    /// A duel between the two players already exists.
    #[error(
        "You are already playing against <b>{0}</b>!\nYou can't start multiple games against the same player simultaneously!"
    )]
    AlreadyPlaying(String),

    /// Matchmaking requires an alias.
    #[error(
        "You need to set yourself an alias before you can start playing! Use <code>/name &lt;alias&gt;</code> to set it!"
    )]
    AliasRequired,

    /// The alias does not follow the naming rules.
    #[error(
        "Your alias must have between 5 and 20 latin letters and digits, dashes and underscores, start with a letter and not be in use by someone else already! Using multiple consecutive dashes/underscores is forbidden."
    )]
    AliasInvalid,

    /// The alias belongs to another player.
    #[error("Sorry, this alias is already taken. Please choose a different one.")]
    AliasTaken,

    /// The player pressed play while it is the opponent's turn.
    #[error("It is not your turn in this game!")]
    NotYourTurn,

    /// A turn for this duel is already being played.
    #[error("This turn is already being played!")]
    TurnInProgress,

    /// Only the invited player may answer a challenge, and only once.
    #[error("This game request is no longer open for you!")]
    NotInvited,

    /// The engine is in maintenance mode.
    #[error("You can't play now, the bot is in maintenance mode! Please try again later.")]
    Maintenance,
}
