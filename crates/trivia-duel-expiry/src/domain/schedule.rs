//! When a stalled duel is reminded or expired, and who hears about it.
//!
//! Ages are measured from the last turn activity. Thresholds are strict: a
//! duel idle for exactly the play window has not expired yet.

use chrono::{DateTime, TimeDelta, Utc};
use trivia_duel_core::duel::{DuelRecord, WarningLevel};
use trivia_duel_core::player::PlayerId;
use trivia_duel_core::settings::GameSettings;

use crate::domain::messages;

fn idle(duel: &DuelRecord, now: DateTime<Utc>) -> TimeDelta {
    now - duel.last_activity_at
}

/// Whether the duel's play window has lapsed.
#[must_use]
pub fn is_expired(duel: &DuelRecord, now: DateTime<Utc>, settings: &GameSettings) -> bool {
    idle(duel, now) > settings.play_window()
}

fn threshold(level: WarningLevel, settings: &GameSettings) -> Option<(TimeDelta, u32)> {
    match level {
        WarningLevel::None => None,
        WarningLevel::First => Some((settings.first_warning(), settings.first_warning_hours)),
        WarningLevel::Second => Some((settings.second_warning(), settings.second_warning_hours)),
    }
}

/// Whether the duel is due the reminder of `level`. Open stranger requests
/// are never reminded; nobody can act on them.
#[must_use]
pub fn needs_warning(
    duel: &DuelRecord,
    level: WarningLevel,
    now: DateTime<Utc>,
    settings: &GameSettings,
) -> bool {
    let Some((after, _)) = threshold(level, settings) else {
        return false;
    };
    !duel.is_open_request() && duel.warning_level < level && idle(duel, now) > after
}

/// A reminder ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reminder {
    /// Recipient.
    pub to: PlayerId,
    /// Message text.
    pub text: String,
}

/// The reminder of `level` for `duel`: the invited player of a pending
/// challenge, otherwise the player holding the turn.
#[must_use]
pub fn reminder(duel: &DuelRecord, level: WarningLevel, settings: &GameSettings) -> Option<Reminder> {
    let (_, hours) = threshold(level, settings)?;
    let hours_left = settings.play_window_hours.saturating_sub(hours);

    if duel.is_invitation() {
        let invited = duel.invited.as_ref()?;
        return Some(Reminder {
            to: invited.id.clone(),
            text: messages::invitation_reminder(&duel.first.alias, hours_left),
        });
    }

    let active = duel.active_player()?;
    let opponent = duel.waiting_player()?;
    let text = if level == WarningLevel::Second {
        messages::urgent_turn_reminder(&opponent.alias, hours_left)
    } else {
        messages::turn_reminder(&opponent.alias, hours_left)
    };
    Some(Reminder {
        to: active.id.clone(),
        text,
    })
}
