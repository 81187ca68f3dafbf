//! Shared test helpers for server integration tests.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;
use trivia_duel_core::messenger::PromptId;
use trivia_duel_core::player::PlayerId;
use trivia_duel_core::settings::GameSettings;
use trivia_duel_matchmaking::domain::queues::MatchmakingQueues;
use trivia_duel_test_support::{
    FixedClock, InMemoryStore, MockRng, RecordingMessenger, Sent, StaticQuestionSource,
};
use trivia_duel_turns::application::correlation::CorrelationTable;
use trivia_duel_turns::application::services::{ActiveTurns, DuelServices};

use trivia_duel_server::routes;
use trivia_duel_server::state::AppState;

/// Fixed timestamp used across all integration tests.
fn fixed_clock() -> Arc<FixedClock> {
    Arc::new(FixedClock(
        chrono::TimeZone::with_ymd_and_hms(&chrono::Utc, 2026, 1, 15, 10, 0, 0).unwrap(),
    ))
}

/// The app under test plus handles on its fakes.
pub struct TestApp {
    pub state: AppState,
    pub store: Arc<InMemoryStore>,
    pub messenger: Arc<RecordingMessenger>,
}

impl TestApp {
    /// Build the full app over an in-memory store, a recording messenger
    /// and deterministic Clock/RNG. Uses the same route tree as `main.rs`.
    pub fn new() -> Self {
        let store = Arc::new(InMemoryStore::new());
        let messenger = Arc::new(RecordingMessenger::new());
        let services = DuelServices {
            clock: fixed_clock(),
            rng: Arc::new(Mutex::new(MockRng)),
            duels: store.clone(),
            players: store.clone(),
            archive: store.clone(),
            messenger: messenger.clone(),
            questions: Arc::new(StaticQuestionSource::with_categories(10)),
            correlation: Arc::new(CorrelationTable::new()),
            active_turns: Arc::new(ActiveTurns::new()),
            settings: GameSettings::default(),
        };
        let state = AppState::new(
            services,
            Arc::new(MatchmakingQueues::new()),
            Some(PlayerId::new("ops")),
        );
        Self {
            state,
            store,
            messenger,
        }
    }

    pub fn router(&self) -> Router {
        routes::router().with_state(self.state.clone())
    }

    /// Registers a player and gives them an alias.
    pub async fn player(&self, id: &str, alias: &str) {
        let (status, _) = post_json(
            self.router(),
            "/api/v1/players",
            &serde_json::json!({ "player_id": id, "handle": alias.to_lowercase() }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = post_json(
            self.router(),
            "/api/v1/players/alias",
            &serde_json::json!({ "player_id": id, "alias": alias }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    /// Prompts sent so far, oldest first.
    pub fn prompts(&self) -> Vec<(PlayerId, PromptId)> {
        self.messenger
            .sent()
            .into_iter()
            .filter_map(|sent| match sent {
                Sent::Prompt { to, id, .. } => Some((to, id)),
                _ => None,
            })
            .collect()
    }

    /// Lets spawned work run until at least `count` prompts went out.
    pub async fn wait_for_prompts(&self, count: usize) {
        for _ in 0..1_000 {
            if self.prompts().len() >= count {
                return;
            }
            tokio::task::yield_now().await;
        }
        panic!("expected {count} prompts, saw {}", self.prompts().len());
    }

    /// Lets spawned work run until `player` received `count` messages.
    pub async fn wait_for_messages(&self, player: &str, count: usize) {
        let player = PlayerId::new(player);
        for _ in 0..1_000 {
            if self.messenger.messages_to(&player).len() >= count {
                return;
            }
            tokio::task::yield_now().await;
        }
        panic!("expected {count} messages to {player}");
    }
}

/// Send a POST request with a JSON body and return the response.
pub async fn post_json(
    app: Router,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}

/// Send a GET request and return the response.
pub async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}
