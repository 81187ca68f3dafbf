//! Turning stored questions into prompts.

use trivia_duel_core::questions::TriviaQuestion;
use trivia_duel_core::rng::{DeterministicRng, shuffle};

/// A question ready to be sent: options in presentation order and the
/// position of the correct one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresentedQuestion {
    /// Prompt text, prefixed with round and question number.
    pub text: String,
    /// The four options, shuffled.
    pub options: Vec<String>,
    /// Index of the correct answer within `options`.
    pub correct: usize,
}

/// Shuffles the correct answer in among the distractors. The correct
/// answer's position is tracked by index, so duplicate option texts cannot
/// confuse scoring.
pub fn present_question(
    round: u8,
    number: u8,
    question: &TriviaQuestion,
    rng: &mut dyn DeterministicRng,
) -> PresentedQuestion {
    let options = question.options();
    let mut order: Vec<usize> = (0..options.len()).collect();
    shuffle(rng, &mut order);
    let correct = order.iter().position(|&i| i == 0).unwrap_or(0);
    PresentedQuestion {
        text: format!("Round {round}, Question {number}: {}", question.text),
        options: order.iter().map(|&i| options[i].clone()).collect(),
        correct,
    }
}

/// Text of the category poll that opens a new round.
#[must_use]
pub fn category_poll_text(round: u8) -> String {
    format!("Round {round} - Which category would you like to play?")
}
