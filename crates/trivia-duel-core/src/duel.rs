//! The persisted record of one in-progress duel.
//!
//! A single turn cursor encodes both whose turn it is and which round is in
//! play:
//!
//! - `0`: waiting for an opponent (open stranger request or named
//!   challenge awaiting acceptance);
//! - `1..=6`: odd cursors belong to the second player, even cursors to the
//!   first player. At cursor `c` the active player first answers round
//!   `c - 1` (chosen by the opponent) and then opens round `c`;
//! - `7`: the second player answers round 6, after which the duel ends.
//!
//! `pending_played` is the phase flag: `false` while the active player still
//! owes the previous round, `true` once they may open a new round.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::correctness::{CorrectAnswers, ROUNDS};
use crate::player::PlayerId;
use crate::questions::TriviaQuestion;

/// The cursor value at which the last pending round is answered.
pub const FINAL_CURSOR: u8 = ROUNDS + 1;

/// One of the two sides of a duel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Seat {
    /// The player who created the duel.
    First,
    /// The player who joined or accepted.
    Second,
}

impl Seat {
    /// The other seat.
    #[must_use]
    pub const fn other(self) -> Self {
        match self {
            Self::First => Self::Second,
            Self::Second => Self::First,
        }
    }
}

/// Reminder escalation for a stalled turn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum WarningLevel {
    /// No reminder sent since the last activity.
    #[default]
    None,
    /// The first reminder was sent.
    First,
    /// The urgent reminder was sent.
    Second,
}

impl WarningLevel {
    /// Numeric form used in storage.
    #[must_use]
    pub const fn as_i16(self) -> i16 {
        match self {
            Self::None => 0,
            Self::First => 1,
            Self::Second => 2,
        }
    }

    /// Parses the storage form; unknown values clamp to the nearest level.
    #[must_use]
    pub const fn from_i16(value: i16) -> Self {
        match value {
            i16::MIN..=0 => Self::None,
            1 => Self::First,
            _ => Self::Second,
        }
    }
}

/// A participant as captured when the duel was created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    /// Player identity.
    pub id: PlayerId,
    /// Alias at the time the player entered the duel.
    pub alias: String,
}

impl Participant {
    /// Creates a participant snapshot.
    #[must_use]
    pub fn new(id: PlayerId, alias: impl Into<String>) -> Self {
        Self {
            id,
            alias: alias.into(),
        }
    }
}

/// Content of the round that is currently open.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundContent {
    /// The three questions, in order.
    pub questions: [TriviaQuestion; 3],
}

/// Persistent state of one duel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuelRecord {
    /// Duel identifier.
    pub id: Uuid,
    /// The creator.
    pub first: Participant,
    /// The joined or accepting player; `None` while the cursor is 0.
    pub second: Option<Participant>,
    /// Target of a named challenge that has not been accepted yet.
    pub invited: Option<Participant>,
    /// Turn cursor.
    pub cursor: u8,
    /// Phase flag: whether the active player has resolved the previous round.
    pub pending_played: bool,
    /// Category id chosen for each round.
    pub categories: [Option<u32>; 6],
    /// Questions of the round the opponent still has to answer.
    pub open_round: Option<RoundContent>,
    /// Correctness record of the first player.
    pub first_correct: CorrectAnswers,
    /// Correctness record of the second player.
    pub second_correct: CorrectAnswers,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
    /// When both players were attached.
    pub started_at: Option<DateTime<Utc>>,
    /// Last time the active player acted (or the duel changed hands).
    pub last_activity_at: DateTime<Utc>,
    /// Reminders sent since `last_activity_at`.
    pub warning_level: WarningLevel,
}

impl DuelRecord {
    fn blank(id: Uuid, first: Participant, now: DateTime<Utc>) -> Self {
        Self {
            id,
            first,
            second: None,
            invited: None,
            cursor: 0,
            pending_played: true,
            categories: [None; 6],
            open_round: None,
            first_correct: CorrectAnswers::new(),
            second_correct: CorrectAnswers::new(),
            created_at: now,
            started_at: None,
            last_activity_at: now,
            warning_level: WarningLevel::None,
        }
    }

    /// An open stranger request waiting for anyone to join.
    #[must_use]
    pub fn open_request(id: Uuid, first: Participant, now: DateTime<Utc>) -> Self {
        Self::blank(id, first, now)
    }

    /// A named challenge waiting for `invited` to accept.
    #[must_use]
    pub fn invitation(
        id: Uuid,
        first: Participant,
        invited: Participant,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            invited: Some(invited),
            ..Self::blank(id, first, now)
        }
    }

    /// A duel that starts immediately with both players attached.
    #[must_use]
    pub fn started(
        id: Uuid,
        first: Participant,
        second: Participant,
        now: DateTime<Utc>,
    ) -> Self {
        let mut duel = Self::blank(id, first, now);
        duel.attach_second(second, now);
        duel
    }

    /// Attaches the second player and hands them the first turn.
    pub fn attach_second(&mut self, second: Participant, now: DateTime<Utc>) {
        self.second = Some(second);
        self.invited = None;
        self.cursor = 1;
        self.pending_played = true;
        self.started_at = Some(now);
        self.touch(now);
    }

    /// Records turn activity and clears reminders.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.last_activity_at = now;
        self.warning_level = WarningLevel::None;
    }

    /// Whether this is an open stranger request.
    #[must_use]
    pub fn is_open_request(&self) -> bool {
        self.cursor == 0 && self.second.is_none() && self.invited.is_none()
    }

    /// Whether this is a named challenge awaiting acceptance.
    #[must_use]
    pub fn is_invitation(&self) -> bool {
        self.cursor == 0 && self.invited.is_some()
    }

    /// Whether both players are attached.
    #[must_use]
    pub fn is_started(&self) -> bool {
        self.cursor >= 1 && self.second.is_some()
    }

    /// Seat whose turn it is, if the duel has started.
    #[must_use]
    pub fn active_seat(&self) -> Option<Seat> {
        match self.cursor {
            0 => None,
            c if c % 2 == 1 => Some(Seat::Second),
            _ => Some(Seat::First),
        }
    }

    /// The participant in a seat.
    #[must_use]
    pub fn participant(&self, seat: Seat) -> Option<&Participant> {
        match seat {
            Seat::First => Some(&self.first),
            Seat::Second => self.second.as_ref(),
        }
    }

    /// The seat occupied by `player`, if any.
    #[must_use]
    pub fn seat_of(&self, player: &PlayerId) -> Option<Seat> {
        if self.first.id == *player {
            Some(Seat::First)
        } else if self.second.as_ref().is_some_and(|p| p.id == *player) {
            Some(Seat::Second)
        } else {
            None
        }
    }

    /// The player holding the turn.
    #[must_use]
    pub fn active_player(&self) -> Option<&Participant> {
        self.active_seat().and_then(|seat| self.participant(seat))
    }

    /// The player waiting on the active player.
    #[must_use]
    pub fn waiting_player(&self) -> Option<&Participant> {
        self.active_seat()
            .and_then(|seat| self.participant(seat.other()))
    }

    /// Whether `player` takes part in this duel, including as an invitee.
    #[must_use]
    pub fn involves(&self, player: &PlayerId) -> bool {
        self.seat_of(player).is_some() || self.invited.as_ref().is_some_and(|p| p.id == *player)
    }

    /// Whether this duel is between exactly `a` and `b` (in either order),
    /// counting a pending invitation.
    #[must_use]
    pub fn is_between(&self, a: &PlayerId, b: &PlayerId) -> bool {
        let other = self.second.as_ref().or(self.invited.as_ref());
        match other {
            Some(other) => {
                (self.first.id == *a && other.id == *b) || (self.first.id == *b && other.id == *a)
            }
            None => false,
        }
    }

    /// Correctness record of a seat.
    #[must_use]
    pub fn correct(&self, seat: Seat) -> CorrectAnswers {
        match seat {
            Seat::First => self.first_correct,
            Seat::Second => self.second_correct,
        }
    }

    /// Mutable correctness record of a seat.
    pub fn correct_mut(&mut self, seat: Seat) -> &mut CorrectAnswers {
        match seat {
            Seat::First => &mut self.first_correct,
            Seat::Second => &mut self.second_correct,
        }
    }

    /// The round the active player owes from the opponent's last turn.
    #[must_use]
    pub fn pending_round(&self) -> u8 {
        self.cursor.saturating_sub(1)
    }

    /// The round the active player opens when `pending_played` is true.
    #[must_use]
    pub fn new_round(&self) -> u8 {
        self.cursor
    }

    /// Category ids already played in this duel.
    #[must_use]
    pub fn played_categories(&self) -> Vec<u32> {
        self.categories.iter().flatten().copied().collect()
    }

    /// The category of a round.
    #[must_use]
    pub fn category(&self, round: u8) -> Option<u32> {
        round
            .checked_sub(1)
            .and_then(|idx| self.categories.get(usize::from(idx)))
            .copied()
            .flatten()
    }

    /// Stores the category chosen for a round. Out-of-range rounds are
    /// ignored.
    pub fn set_category(&mut self, round: u8, category_id: u32) {
        if let Some(slot) = round
            .checked_sub(1)
            .and_then(|idx| self.categories.get_mut(usize::from(idx)))
        {
            *slot = Some(category_id);
        }
    }

    /// Hands the turn to the opponent after a new round was played.
    pub fn advance(&mut self, now: DateTime<Utc>) {
        self.cursor = self.cursor.saturating_add(1).min(FINAL_CURSOR);
        self.pending_played = false;
        self.touch(now);
    }

    /// Whether the duel is at its last step and only the final pending
    /// round remains.
    #[must_use]
    pub fn is_final_step(&self) -> bool {
        self.cursor == FINAL_CURSOR
    }

    /// Whether the active player currently has something to play.
    #[must_use]
    pub fn has_playable_turn(&self) -> bool {
        match self.cursor {
            1..=ROUNDS => true,
            FINAL_CURSOR => !self.pending_played,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap()
    }

    fn astra() -> Participant {
        Participant::new(PlayerId::new("a"), "Astra")
    }

    fn borealis() -> Participant {
        Participant::new(PlayerId::new("b"), "Borealis")
    }

    #[test]
    fn test_open_request_has_no_second_player() {
        let duel = DuelRecord::open_request(Uuid::new_v4(), astra(), t0());
        assert_eq!(duel.cursor, 0);
        assert!(duel.second.is_none());
        assert!(duel.is_open_request());
        assert!(duel.active_seat().is_none());
    }

    #[test]
    fn test_invitation_keeps_target_out_of_second_seat() {
        let duel = DuelRecord::invitation(Uuid::new_v4(), astra(), borealis(), t0());
        assert!(duel.second.is_none());
        assert!(duel.is_invitation());
        assert!(duel.involves(&PlayerId::new("b")));
        assert!(duel.is_between(&PlayerId::new("b"), &PlayerId::new("a")));
    }

    #[test]
    fn test_attach_second_gives_first_turn_to_second_player() {
        let mut duel = DuelRecord::invitation(Uuid::new_v4(), astra(), borealis(), t0());
        duel.attach_second(borealis(), t0());
        assert_eq!(duel.cursor, 1);
        assert!(duel.invited.is_none());
        assert_eq!(duel.active_seat(), Some(Seat::Second));
        assert_eq!(duel.active_player().unwrap().alias, "Borealis");
        assert_eq!(duel.waiting_player().unwrap().alias, "Astra");
    }

    #[test]
    fn test_parity_alternates_active_seat() {
        let mut duel = DuelRecord::started(Uuid::new_v4(), astra(), borealis(), t0());
        duel.advance(t0());
        assert_eq!(duel.cursor, 2);
        assert_eq!(duel.active_seat(), Some(Seat::First));
        assert!(!duel.pending_played);
        assert_eq!(duel.pending_round(), 1);
        assert_eq!(duel.new_round(), 2);
    }

    #[test]
    fn test_advance_never_passes_final_cursor() {
        let mut duel = DuelRecord::started(Uuid::new_v4(), astra(), borealis(), t0());
        for _ in 0..10 {
            duel.advance(t0());
        }
        assert_eq!(duel.cursor, FINAL_CURSOR);
        assert!(duel.has_playable_turn());
        duel.pending_played = true;
        assert!(!duel.has_playable_turn());
    }

    #[test]
    fn test_categories_are_tracked_per_round() {
        let mut duel = DuelRecord::started(Uuid::new_v4(), astra(), borealis(), t0());
        duel.set_category(1, 9);
        duel.set_category(3, 21);
        duel.set_category(7, 99);
        assert_eq!(duel.played_categories(), vec![9, 21]);
        assert_eq!(duel.category(3), Some(21));
        assert_eq!(duel.category(0), None);
    }

    #[test]
    fn test_warning_level_storage_form_clamps() {
        assert_eq!(WarningLevel::from_i16(-3), WarningLevel::None);
        assert_eq!(WarningLevel::from_i16(2), WarningLevel::Second);
        assert_eq!(WarningLevel::from_i16(9), WarningLevel::Second);
        assert_eq!(WarningLevel::First.as_i16(), 1);
    }
}
