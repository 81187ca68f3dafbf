//! Test question sources.

use std::sync::Mutex;

use async_trait::async_trait;
use trivia_duel_core::error::DomainError;
use trivia_duel_core::questions::{Category, QuestionSource, TriviaQuestion};

/// Serves a fixed category list and synthesises three questions per
/// category. Question `n` of category `c` reads `"Question c.n"` with
/// correct answer `"right c.n"` and distractors `"wrong c.n.1"` to
/// `"wrong c.n.3"`.
#[derive(Debug)]
pub struct StaticQuestionSource {
    categories: Vec<Category>,
    fetched: Mutex<Vec<u32>>,
}

impl StaticQuestionSource {
    /// A source with categories `1..=count` named `"Category <id>"`.
    #[must_use]
    pub fn with_categories(count: u32) -> Self {
        Self::new(
            (1..=count)
                .map(|id| Category {
                    id,
                    name: format!("Category {id}"),
                })
                .collect(),
        )
    }

    /// A source with the given categories.
    #[must_use]
    pub fn new(categories: Vec<Category>) -> Self {
        Self {
            categories,
            fetched: Mutex::new(Vec::new()),
        }
    }

    /// Category ids for which questions were fetched, in order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn fetched(&self) -> Vec<u32> {
        self.fetched.lock().unwrap().clone()
    }

    /// The question this source returns for `(category, n)`.
    #[must_use]
    pub fn question(category: u32, n: u32) -> TriviaQuestion {
        TriviaQuestion {
            text: format!("Question {category}.{n}"),
            correct_answer: format!("right {category}.{n}"),
            incorrect_answers: [
                format!("wrong {category}.{n}.1"),
                format!("wrong {category}.{n}.2"),
                format!("wrong {category}.{n}.3"),
            ],
        }
    }
}

#[async_trait]
impl QuestionSource for StaticQuestionSource {
    async fn list_categories(&self) -> Result<Vec<Category>, DomainError> {
        Ok(self.categories.clone())
    }

    async fn get_questions(&self, category_id: u32) -> Result<[TriviaQuestion; 3], DomainError> {
        self.fetched.lock().unwrap().push(category_id);
        if !self.categories.iter().any(|c| c.id == category_id) {
            return Err(DomainError::ContentUnavailable(format!(
                "no questions for category {category_id}"
            )));
        }
        Ok([
            Self::question(category_id, 1),
            Self::question(category_id, 2),
            Self::question(category_id, 3),
        ])
    }
}

/// A question source whose provider is always down.
#[derive(Debug)]
pub struct FailingQuestionSource;

#[async_trait]
impl QuestionSource for FailingQuestionSource {
    async fn list_categories(&self) -> Result<Vec<Category>, DomainError> {
        Err(DomainError::ContentUnavailable("categories unavailable".into()))
    }

    async fn get_questions(&self, _category_id: u32) -> Result<[TriviaQuestion; 3], DomainError> {
        Err(DomainError::ContentUnavailable("no results".into()))
    }
}
