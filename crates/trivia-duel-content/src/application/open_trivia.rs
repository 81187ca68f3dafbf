//! Open Trivia DB client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};
use trivia_duel_core::error::DomainError;
use trivia_duel_core::questions::{Category, QuestionSource, TriviaQuestion};

use crate::application::cache::TtlValue;
use crate::domain::wire::{CategoryListResponse, QUESTIONS_PER_ROUND, QuestionResponse};

/// Public Open Trivia DB endpoint.
pub const DEFAULT_OPENTDB_BASE_URL: &str = "https://opentdb.com";

/// Per-request timeout. A turn blocks on this, so keep it well below the
/// answer window.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// `QuestionSource` backed by the Open Trivia DB HTTP API.
pub struct OpenTriviaClient {
    client: Client,
    base_url: String,
    categories: TtlValue<Vec<Category>>,
}

impl OpenTriviaClient {
    /// Creates a client for `base_url` caching the category list for
    /// `category_ttl`.
    #[must_use]
    pub fn new(base_url: &str, category_ttl: Duration) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            categories: TtlValue::new(category_ttl),
        }
    }

    async fn fetch_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, DomainError> {
        let url = format!("{}{path}", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| DomainError::ContentUnavailable(format!("{path}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DomainError::ContentUnavailable(format!("{path}: HTTP {status}")));
        }

        let body = response
            .text()
            .await
            .map_err(|e| DomainError::ContentUnavailable(format!("{path}: {e}")))?;
        serde_json::from_str(&body)
            .map_err(|e| DomainError::ContentUnavailable(format!("{path}: malformed body: {e}")))
    }

    async fn fetch_categories(&self) -> Result<Vec<Category>, DomainError> {
        let response: CategoryListResponse = self.fetch_json("/api_category.php", &[]).await?;
        let categories = response.into_categories();
        if categories.is_empty() {
            return Err(DomainError::ContentUnavailable(
                "provider listed no categories".to_owned(),
            ));
        }
        debug!(count = categories.len(), "category list refreshed");
        Ok(categories)
    }
}

#[async_trait]
impl QuestionSource for OpenTriviaClient {
    #[instrument(skip(self))]
    async fn list_categories(&self) -> Result<Vec<Category>, DomainError> {
        self.categories
            .get_or_try_fetch(|| self.fetch_categories())
            .await
            .inspect_err(|e| warn!(error = %e, "categories unavailable"))
    }

    #[instrument(skip(self))]
    async fn get_questions(&self, category_id: u32) -> Result<[TriviaQuestion; 3], DomainError> {
        let query = [
            ("amount", QUESTIONS_PER_ROUND.to_string()),
            ("category", category_id.to_string()),
            ("type", "multiple".to_owned()),
        ];
        let response: QuestionResponse = self.fetch_json("/api.php", &query).await?;
        response
            .into_round(category_id)
            .inspect_err(|e| warn!(error = %e, "question fetch failed"))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use axum::Router;
    use axum::extract::{Query, State};
    use axum::http::StatusCode;
    use axum::routing::get;

    use super::*;

    #[derive(Clone, Default)]
    struct Provider {
        category_calls: Arc<AtomicUsize>,
    }

    async fn categories(State(provider): State<Provider>) -> &'static str {
        provider.category_calls.fetch_add(1, Ordering::SeqCst);
        r#"{"trivia_categories":[{"id":9,"name":"General Knowledge"},{"id":15,"name":"Entertainment: Video Games"}]}"#
    }

    async fn questions(Query(params): Query<HashMap<String, String>>) -> (StatusCode, String) {
        if params.get("amount").map(String::as_str) != Some("3")
            || params.get("type").map(String::as_str) != Some("multiple")
        {
            return (StatusCode::BAD_REQUEST, String::new());
        }
        match params.get("category").map(String::as_str) {
            Some("9") => {
                let entry = |n: u32| {
                    format!(
                        r#"{{"question":"Q{n} &amp; more","correct_answer":"R{n}","incorrect_answers":["W1","W2","W3"]}}"#
                    )
                };
                (
                    StatusCode::OK,
                    format!(
                        r#"{{"response_code":0,"results":[{},{},{}]}}"#,
                        entry(1),
                        entry(2),
                        entry(3)
                    ),
                )
            }
            Some("500") => (StatusCode::INTERNAL_SERVER_ERROR, String::new()),
            _ => (StatusCode::OK, r#"{"response_code":1,"results":[]}"#.to_owned()),
        }
    }

    async fn serve(provider: Provider) -> String {
        let app = Router::new()
            .route("/api_category.php", get(categories))
            .route("/api.php", get(questions))
            .with_state(provider);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/")
    }

    #[tokio::test]
    async fn test_categories_are_fetched_once_within_ttl() {
        // Arrange
        let provider = Provider::default();
        let base = serve(provider.clone()).await;
        let client = OpenTriviaClient::new(&base, Duration::from_secs(300));

        // Act
        let first = client.list_categories().await.unwrap();
        let second = client.list_categories().await.unwrap();

        // Assert
        assert_eq!(first, second);
        assert_eq!(first[1].name, "Entertainment: Video Games");
        assert_eq!(provider.category_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_questions_are_fetched_and_decoded() {
        // Arrange
        let base = serve(Provider::default()).await;
        let client = OpenTriviaClient::new(&base, Duration::from_secs(300));

        // Act
        let round = client.get_questions(9).await.unwrap();

        // Assert
        assert_eq!(round[0].text, "Q1 & more");
        assert_eq!(round[2].correct_answer, "R3");
    }

    #[tokio::test]
    async fn test_empty_category_is_content_unavailable() {
        let base = serve(Provider::default()).await;
        let client = OpenTriviaClient::new(&base, Duration::from_secs(300));

        let result = client.get_questions(31).await;

        assert!(matches!(result, Err(DomainError::ContentUnavailable(_))));
    }

    #[tokio::test]
    async fn test_server_error_is_content_unavailable() {
        let base = serve(Provider::default()).await;
        let client = OpenTriviaClient::new(&base, Duration::from_secs(300));

        let result = client.get_questions(500).await;

        assert!(matches!(result, Err(DomainError::ContentUnavailable(_))));
    }

    #[tokio::test]
    async fn test_unreachable_provider_is_content_unavailable() {
        let client = OpenTriviaClient::new("http://127.0.0.1:9", Duration::from_secs(300));

        let result = client.list_categories().await;

        assert!(matches!(result, Err(DomainError::ContentUnavailable(_))));
    }
}
