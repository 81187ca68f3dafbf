//! Open Trivia DB response payloads and their conversion into domain
//! values.

use serde::Deserialize;
use trivia_duel_core::error::DomainError;
use trivia_duel_core::questions::{Category, TriviaQuestion};

use crate::domain::entities::decode_entities;

/// Number of questions requested per round.
pub const QUESTIONS_PER_ROUND: usize = 3;

/// Body of `GET /api_category.php`.
#[derive(Debug, Deserialize)]
pub struct CategoryListResponse {
    /// All categories the provider knows.
    pub trivia_categories: Vec<CategoryEntry>,
}

/// One category entry.
#[derive(Debug, Deserialize)]
pub struct CategoryEntry {
    /// Provider id.
    pub id: u32,
    /// HTML-escaped name.
    pub name: String,
}

/// Body of `GET /api.php`.
#[derive(Debug, Deserialize)]
pub struct QuestionResponse {
    /// Zero on success; any other value means the request produced no
    /// usable results.
    pub response_code: u8,
    /// Questions, HTML-escaped.
    #[serde(default)]
    pub results: Vec<QuestionEntry>,
}

/// One question entry.
#[derive(Debug, Deserialize)]
pub struct QuestionEntry {
    /// Question text.
    pub question: String,
    /// The correct answer.
    pub correct_answer: String,
    /// The distractors.
    pub incorrect_answers: Vec<String>,
}

impl CategoryListResponse {
    /// Decoded categories in provider order.
    #[must_use]
    pub fn into_categories(self) -> Vec<Category> {
        self.trivia_categories
            .into_iter()
            .map(|entry| Category {
                id: entry.id,
                name: decode_entities(&entry.name),
            })
            .collect()
    }
}

impl QuestionEntry {
    fn into_question(self) -> Result<TriviaQuestion, DomainError> {
        let incorrect: Vec<String> = self
            .incorrect_answers
            .iter()
            .map(|a| decode_entities(a))
            .collect();
        let incorrect_answers: [String; 3] = incorrect.try_into().map_err(|got: Vec<String>| {
            DomainError::ContentUnavailable(format!(
                "expected 3 distractors, got {}",
                got.len()
            ))
        })?;

        Ok(TriviaQuestion {
            text: decode_entities(&self.question),
            correct_answer: decode_entities(&self.correct_answer),
            incorrect_answers,
        })
    }
}

impl QuestionResponse {
    /// The first three questions, decoded.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::ContentUnavailable` if the provider reported a
    /// non-zero code, returned fewer than three results, or a result is not
    /// a four-option multiple-choice question.
    pub fn into_round(self, category_id: u32) -> Result<[TriviaQuestion; 3], DomainError> {
        if self.response_code != 0 || self.results.len() < QUESTIONS_PER_ROUND {
            return Err(DomainError::ContentUnavailable(format!(
                "no results for category {category_id} (response code {}, {} results)",
                self.response_code,
                self.results.len()
            )));
        }

        let questions = self
            .results
            .into_iter()
            .take(QUESTIONS_PER_ROUND)
            .map(QuestionEntry::into_question)
            .collect::<Result<Vec<_>, _>>()?;

        questions.try_into().map_err(|_| {
            DomainError::ContentUnavailable(format!("short round for category {category_id}"))
        })
    }
}
