//! Scoreboard rendering.
//!
//! The cursor's value at render time decides which rows exist and which
//! marks are visible. A viewer never sees the opponent's answers to a
//! round before answering it themselves.

use std::fmt::Write as _;

use trivia_duel_core::correctness::{CorrectAnswers, ROUNDS};
use trivia_duel_core::duel::{DuelRecord, Seat};

/// The opponent played this question but the viewer may not see how.
pub const ANSWER_UNKNOWN: &str = "🌫";
/// The question has not been played yet.
pub const NOT_PLAYED: &str = "❔";
/// Correct answer.
pub const ANSWER_RIGHT: &str = "✅";
/// Wrong answer.
pub const ANSWER_WRONG: &str = "❌";

/// Which point of the turn the scoreboard is rendered at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    /// The viewer has answered the round the opponent opened.
    pub played_pending: bool,
    /// The viewer has also played a new round, so the turn passed on.
    pub played_next_round: bool,
}

impl Progress {
    /// The viewer is about to open a new round (or start the duel).
    pub const READY_FOR_NEW_ROUND: Self = Self {
        played_pending: true,
        played_next_round: false,
    };
    /// The viewer just finished their turn.
    pub const TURN_DONE: Self = Self {
        played_pending: true,
        played_next_round: true,
    };
    /// The viewer's turn just began and they owe the previous round.
    pub const TURN_BEGINS: Self = Self {
        played_pending: false,
        played_next_round: false,
    };
}

fn marks(correct: CorrectAnswers, round: u8, opponent_count: Option<&mut u32>) -> String {
    let results = correct.round(round);
    if let Some(count) = opponent_count {
        *count += results.iter().map(|&r| u32::from(r)).sum::<u32>();
    }
    results
        .iter()
        .map(|&right| if right { ANSWER_RIGHT } else { ANSWER_WRONG })
        .collect()
}

fn repeat3(mark: &str) -> String {
    mark.repeat(3)
}

/// One scoreboard row; opponent marks that are shown are added to
/// `opponent_count`.
fn round_row(
    own: CorrectAnswers,
    opponent: CorrectAnswers,
    round: u8,
    own_unknown: bool,
    opponent_unknown: bool,
    opponent_hidden: bool,
    opponent_count: &mut u32,
) -> String {
    let mut row = if own_unknown {
        repeat3(NOT_PLAYED)
    } else {
        marks(own, round, None)
    };
    let _ = write!(row, "   Round {round}   ");
    if opponent_unknown {
        row.push_str(&repeat3(NOT_PLAYED));
    } else if opponent_hidden {
        row.push_str(&repeat3(ANSWER_UNKNOWN));
    } else {
        row.push_str(&marks(opponent, round, Some(opponent_count)));
    }
    row
}

fn header(opponent_alias: &str, own_count: u32, opponent_count: u32) -> String {
    format!(
        "Your game against <b>{opponent_alias}</b>:\n\n<code>You: {own_count}           Opponent: {opponent_count}\n"
    )
}

/// Renders the in-game scoreboard for `viewer`, with the closing line
/// telling them whether it is their turn.
#[must_use]
pub fn render_progress(
    duel: &DuelRecord,
    viewer: Seat,
    progress: Progress,
    play_window_hours: u32,
) -> String {
    let round_now = duel.cursor;
    let own = duel.correct(viewer);
    let opponent = duel.correct(viewer.other());
    let opponent_alias = duel
        .participant(viewer.other())
        .map_or("", |p| p.alias.as_str());
    let Progress {
        played_pending,
        played_next_round,
    } = progress;

    let last_row = if played_pending && !played_next_round {
        round_now
    } else {
        round_now.saturating_sub(1)
    };

    let mut opponent_count = 0;
    let mut rows = String::new();
    for i in 1..=last_row {
        let own_unknown = (played_pending && !played_next_round && i == round_now)
            || (!played_pending && i + 1 == round_now);
        let opponent_unknown =
            played_pending && (if played_next_round { i + 1 } else { i }) == round_now;
        let opponent_hidden = !played_pending && i + 1 == round_now;
        rows.push('\n');
        rows.push_str(&round_row(
            own,
            opponent,
            i,
            own_unknown,
            opponent_unknown,
            opponent_hidden,
            &mut opponent_count,
        ));
    }

    let mut message = header(opponent_alias, own.count(), opponent_count);
    message.push_str(&rows);
    message.push_str("</code>\n\n");

    if played_next_round {
        let _ = write!(
            message,
            "It is <b>{opponent_alias}</b>'s turn now. They have <b>{play_window_hours}</b> hours to do their turn, starting now."
        );
    } else {
        let round_to_play = if played_pending {
            round_now
        } else {
            round_now.saturating_sub(1)
        };
        let _ = write!(
            message,
            "It is your turn to play round <b>{round_to_play}</b> now! Press the button when you are ready to play! You have <b>{play_window_hours}</b> hours!"
        );
    }
    message
}

/// Renders the final scoreboard for `viewer` with every round revealed and
/// the result line.
#[must_use]
pub fn render_final(duel: &DuelRecord, viewer: Seat) -> String {
    let own = duel.correct(viewer);
    let opponent = duel.correct(viewer.other());
    let opponent_alias = duel
        .participant(viewer.other())
        .map_or("", |p| p.alias.as_str());

    let mut message = header(opponent_alias, own.count(), opponent.count());
    let mut ignored = 0;
    for round in 1..=ROUNDS {
        message.push('\n');
        message.push_str(&round_row(
            own,
            opponent,
            round,
            false,
            false,
            false,
            &mut ignored,
        ));
    }
    message.push_str("</code>\n\nThis game is over now.\n");

    let line = match own.count().cmp(&opponent.count()) {
        std::cmp::Ordering::Greater => {
            "Congratulations, you won this game! Would you like to play again?"
        }
        std::cmp::Ordering::Less => "Sadly, you lost this game. But don't give up, try again!",
        std::cmp::Ordering::Equal => {
            "The game ended with a draw - Nothing won, nothing lost. Play again?"
        }
    };
    message.push_str(line);
    message
}

#[cfg(test)]
mod tests {
    use trivia_duel_core::duel::FINAL_CURSOR;
    use trivia_duel_test_support::{participant, t0};
    use uuid::Uuid;

    use super::*;

    fn duel() -> DuelRecord {
        DuelRecord::started(
            Uuid::new_v4(),
            participant("a", "Astra"),
            participant("b", "Borealis"),
            t0(),
        )
    }

    #[test]
    fn test_opening_scoreboard_shows_round_one_unplayed() {
        // Arrange
        let duel = duel();

        // Act
        let text = render_progress(&duel, Seat::Second, Progress::READY_FOR_NEW_ROUND, 48);

        // Assert
        assert_eq!(
            text,
            "Your game against <b>Astra</b>:\n\n<code>You: 0           Opponent: 0\n\
             \n❔❔❔   Round 1   ❔❔❔</code>\n\n\
             It is your turn to play round <b>1</b> now! Press the button when you are ready to play! You have <b>48</b> hours!"
        );
    }

    #[test]
    fn test_turn_done_scoreboard_shows_own_marks_and_hands_over() {
        // Arrange
        let mut duel = duel();
        duel.second_correct.mark(1, 1);
        duel.second_correct.mark(1, 3);
        duel.advance(t0());

        // Act
        let text = render_progress(&duel, Seat::Second, Progress::TURN_DONE, 48);

        // Assert
        assert_eq!(
            text,
            "Your game against <b>Astra</b>:\n\n<code>You: 2           Opponent: 0\n\
             \n✅❌✅   Round 1   ❔❔❔</code>\n\n\
             It is <b>Astra</b>'s turn now. They have <b>48</b> hours to do their turn, starting now."
        );
    }

    #[test]
    fn test_turn_begins_scoreboard_hides_opponent_answers() {
        // Arrange
        let mut duel = duel();
        duel.second_correct.mark(1, 1);
        duel.advance(t0());

        // Act
        let text = render_progress(&duel, Seat::First, Progress::TURN_BEGINS, 48);

        // Assert
        assert_eq!(
            text,
            "Your game against <b>Borealis</b>:\n\n<code>You: 0           Opponent: 0\n\
             \n❔❔❔   Round 1   🌫🌫🌫</code>\n\n\
             It is your turn to play round <b>1</b> now! Press the button when you are ready to play! You have <b>48</b> hours!"
        );
    }

    #[test]
    fn test_after_pending_round_opponent_marks_are_revealed() {
        // Arrange
        let mut duel = duel();
        duel.second_correct.mark(1, 1);
        duel.advance(t0());
        duel.first_correct.mark(1, 2);
        duel.pending_played = true;

        // Act
        let text = render_progress(&duel, Seat::First, Progress::READY_FOR_NEW_ROUND, 48);

        // Assert
        assert_eq!(
            text,
            "Your game against <b>Borealis</b>:\n\n<code>You: 1           Opponent: 1\n\
             \n❌✅❌   Round 1   ✅❌❌\
             \n❔❔❔   Round 2   ❔❔❔</code>\n\n\
             It is your turn to play round <b>2</b> now! Press the button when you are ready to play! You have <b>48</b> hours!"
        );
    }

    #[test]
    fn test_final_scoreboard_reveals_all_rounds_and_reports_draw() {
        // Arrange
        let mut duel = duel();
        duel.cursor = FINAL_CURSOR;
        duel.first_correct.mark(6, 3);
        duel.second_correct.mark(2, 1);

        // Act
        let text = render_final(&duel, Seat::First);

        // Assert
        assert!(text.starts_with(
            "Your game against <b>Borealis</b>:\n\n<code>You: 1           Opponent: 1\n"
        ));
        assert!(text.contains("\n❌❌❌   Round 2   ✅❌❌"));
        assert!(text.contains("\n❌❌✅   Round 6   ❌❌❌</code>\n\nThis game is over now.\n"));
        assert!(text.ends_with("The game ended with a draw - Nothing won, nothing lost. Play again?"));
    }

    #[test]
    fn test_final_scoreboard_congratulates_winner_and_consoles_loser() {
        // Arrange
        let mut duel = duel();
        duel.cursor = FINAL_CURSOR;
        duel.second_correct.mark(1, 1);

        // Act
        let winner = render_final(&duel, Seat::Second);
        let loser = render_final(&duel, Seat::First);

        // Assert
        assert!(winner.ends_with("Congratulations, you won this game! Would you like to play again?"));
        assert!(loser.ends_with("Sadly, you lost this game. But don't give up, try again!"));
    }
}
