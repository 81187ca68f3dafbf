//! Question source port.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// A trivia category offered when a new round starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Provider-assigned category id.
    pub id: u32,
    /// Human-readable name.
    pub name: String,
}

/// One multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriviaQuestion {
    /// Question text.
    pub text: String,
    /// The correct answer.
    pub correct_answer: String,
    /// Three distractors.
    pub incorrect_answers: [String; 3],
}

impl TriviaQuestion {
    /// The four answer options with the correct answer first.
    #[must_use]
    pub fn options(&self) -> [String; 4] {
        let [a, b, c] = self.incorrect_answers.clone();
        [self.correct_answer.clone(), a, b, c]
    }
}

/// Supplier of categories and per-category question triples.
#[async_trait]
pub trait QuestionSource: Send + Sync {
    /// Lists all categories. Implementations may cache.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::ContentUnavailable` if the provider cannot be
    /// reached.
    async fn list_categories(&self) -> Result<Vec<Category>, DomainError>;

    /// Fetches exactly three questions for a category.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::ContentUnavailable` if the provider fails or
    /// reports no results.
    async fn get_questions(&self, category_id: u32) -> Result<[TriviaQuestion; 3], DomainError>;
}
