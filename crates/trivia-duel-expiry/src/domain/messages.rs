//! Texts sent by the expiry sweep.

/// To the creator of an open request nobody joined.
#[must_use]
pub fn request_unanswered(play_window_hours: u32) -> String {
    format!(
        "Nobody joined your game within <b>{play_window_hours}</b> hours :(\nYour game request has been cancelled."
    )
}

/// To a challenger whose invitation lapsed.
#[must_use]
pub fn invitation_lapsed(alias: &str, play_window_hours: u32) -> String {
    format!(
        "<b>{alias}</b> did not accept your game request within <b>{play_window_hours}</b> hours :(\n Your game request has been cancelled."
    )
}

/// To the player whose turn lapsed.
#[must_use]
pub fn forfeit_lost(opponent: &str, play_window_hours: u32) -> String {
    format!(
        "Your playing time of <b>{play_window_hours}</b> hours expired, therefore you lost your game against <b>{opponent}</b>!"
    )
}

/// To the opponent of the player whose turn lapsed.
#[must_use]
pub fn forfeit_won(alias: &str, play_window_hours: u32) -> String {
    format!(
        "<b>{alias}</b>'s time of <b>{play_window_hours}</b> hours expired, therefore you won the game!"
    )
}

/// First reminder of a stalled turn.
#[must_use]
pub fn turn_reminder(opponent: &str, hours_left: u32) -> String {
    format!(
        "Your game against <b>{opponent}</b> expires in <b>{hours_left}</b> hours! Remember to play it!"
    )
}

/// Second, urgent reminder of a stalled turn.
#[must_use]
pub fn urgent_turn_reminder(opponent: &str, hours_left: u32) -> String {
    format!(
        "Your game against <b>{opponent}</b> expires in <b>{hours_left}</b> hours! <b>Hurry! Remember to play it!</b>"
    )
}

/// Reminder of an invitation not yet answered.
#[must_use]
pub fn invitation_reminder(challenger: &str, hours_left: u32) -> String {
    format!(
        "The game request from <b>{challenger}</b> expires in <b>{hours_left}</b> hours! Accept it if you want to play!"
    )
}
