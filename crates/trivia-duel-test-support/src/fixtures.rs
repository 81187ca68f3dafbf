//! Small builders shared by tests across contexts.

use chrono::{DateTime, TimeZone, Utc};
use trivia_duel_core::duel::Participant;
use trivia_duel_core::player::{Player, PlayerId};

/// A fixed reference instant.
///
/// # Panics
///
/// Never in practice; the date is valid.
#[must_use]
pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
}

/// A registered player with an alias.
#[must_use]
pub fn player(id: &str, alias: &str) -> Player {
    let mut player = Player::new(PlayerId::new(id), alias.to_lowercase());
    player.alias = Some(alias.to_owned());
    player
}

/// A participant snapshot for building duel records.
#[must_use]
pub fn participant(id: &str, alias: &str) -> Participant {
    Participant::new(PlayerId::new(id), alias)
}
