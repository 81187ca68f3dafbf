//! Player-facing texts of the matchmaking flow.

/// Confirms a stranger request was queued.
pub const STRANGER_QUEUED: &str =
    "You want to play against a stranger. I'm assigning you a game...";

/// Sent to the creator of a fresh open request.
pub const WAITING_FOR_STRANGER: &str = "Please wait, your opponent is playing the first round...";

/// Confirms a named challenge was queued.
#[must_use]
pub fn challenge_queued(alias: &str) -> String {
    format!("You are challenging <b>{alias}</b> to a game! Please wait, I'm assigning you a game...")
}

/// Sent to a player who joined an open request.
#[must_use]
pub fn paired_with(alias: &str) -> String {
    format!("You are now playing against <b>{alias}</b>!")
}

/// The invitation shown to the challenged player.
#[must_use]
pub fn invitation(challenger: &str, play_window_hours: u32) -> String {
    format!(
        "<b>{challenger}</b> is challenging you to a game! Do you want to play against them? You can accept this game within the next <b>{play_window_hours}</b> hours."
    )
}

/// Confirms to the challenger that the invitation went out.
#[must_use]
pub fn invitation_sent(alias: &str, play_window_hours: u32) -> String {
    format!(
        "You challenged <b>{alias}</b> to a game! They have up to <b>{play_window_hours}</b> hours to accept it (and then another <b>{play_window_hours}</b> hours to play it)!"
    )
}
