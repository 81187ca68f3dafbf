//! Player-facing texts sent while a turn runs.
//!
//! Messages use the transport's HTML subset; aliases are already restricted
//! to characters that need no escaping.

/// Announces the category of the round the player is about to answer.
#[must_use]
pub fn category_announcement(round: u8, category: &str) -> String {
    format!("Round {round} Category: {category}")
}

/// Label for a category id the provider no longer lists.
#[must_use]
pub fn unknown_category(id: u32) -> String {
    format!("Unknown category ({id})")
}

/// Sent when the category poll timed out and a category was picked.
#[must_use]
pub fn category_auto_picked(category: &str) -> String {
    format!("Time's up! I chose this category: {category}")
}

/// Sent to both players when a prompt could not be delivered.
pub const DUEL_CANCELLED: &str =
    "I could not send out a quiz to one of this game's players! This game sadly has to be cancelled.";

/// Sent to the challenger once the invited player accepted.
#[must_use]
pub fn challenge_accepted(alias: &str, play_window_hours: u32) -> String {
    format!(
        "<b>{alias}</b> accepted your challenge! They have up to <b>{play_window_hours}</b> hours to play it now!"
    )
}

/// Sent to the challenger once the invited player declined.
#[must_use]
pub fn challenge_declined(alias: &str) -> String {
    format!("<b>{alias}</b> did not want to play this time. Your game request has been cancelled.")
}

/// Replaces the invitation after it was accepted.
pub const INVITATION_ACCEPTED: &str = "You accepted this incoming game request!";

/// Replaces the invitation after it was declined.
pub const INVITATION_DECLINED: &str = "You rejected this incoming game request!";
