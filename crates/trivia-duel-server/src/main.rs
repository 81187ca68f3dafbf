//! Trivia Duel server entry point.

use std::sync::{Arc, Mutex};

use sqlx::postgres::PgPoolOptions;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use trivia_duel_content::application::open_trivia::OpenTriviaClient;
use trivia_duel_core::clock::SystemClock;
use trivia_duel_core::rng::SystemRng;
use trivia_duel_expiry::application::sweeper::ExpirySweeper;
use trivia_duel_matchmaking::application::processor::MatchmakingProcessor;
use trivia_duel_matchmaking::domain::queues::MatchmakingQueues;
use trivia_duel_server::config::ServerConfig;
use trivia_duel_server::error::AppError;
use trivia_duel_server::gateway::HttpMessenger;
use trivia_duel_server::routes;
use trivia_duel_server::state::AppState;
use trivia_duel_store::MIGRATOR;
use trivia_duel_store::pg_store::PgStore;
use trivia_duel_turns::application::correlation::CorrelationTable;
use trivia_duel_turns::application::services::{ActiveTurns, DuelServices};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // A missing .env file is fine; the environment may already be set.
    dotenvy::dotenv().ok();

    // Initialize tracing subscriber.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    tracing::info!("Starting Trivia Duel server");

    let config = ServerConfig::from_lookup(|key| std::env::var(key).ok())?;

    // Create database connection pool and bring the schema up to date.
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await?;
    MIGRATOR.run(&pool).await?;

    let store = Arc::new(PgStore::new(pool));
    let services = DuelServices {
        clock: Arc::new(SystemClock),
        rng: Arc::new(Mutex::new(SystemRng::new())),
        duels: store.clone(),
        players: store.clone(),
        archive: store,
        messenger: Arc::new(HttpMessenger::new(&config.gateway_url)),
        questions: Arc::new(OpenTriviaClient::new(
            &config.opentdb_base_url,
            config.settings.category_cache_ttl,
        )),
        correlation: Arc::new(CorrelationTable::new()),
        active_turns: Arc::new(ActiveTurns::new()),
        settings: config.settings.clone(),
    };
    let queues = Arc::new(MatchmakingQueues::new());

    // Background loops stop when the server shuts down.
    let cancel = CancellationToken::new();
    let matchmaking = tokio::spawn({
        let processor = MatchmakingProcessor::new(services.clone(), queues.clone());
        let cancel = cancel.clone();
        async move { processor.run(cancel).await }
    });
    let expiry = tokio::spawn({
        let sweeper = ExpirySweeper::new(services.clone());
        let cancel = cancel.clone();
        async move { sweeper.run(cancel).await }
    });

    let app_state = AppState::new(services, queues, config.operator_chat.clone());
    let app = routes::router()
        .layer(TraceLayer::new_for_http())
        .with_state(app_state);

    tracing::info!("Listening on {}", config.addr);
    let listener = tokio::net::TcpListener::bind(config.addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cancel.clone()))
        .await?;

    cancel.cancel();
    let (matchmaking, expiry) = tokio::join!(matchmaking, expiry);
    if let Err(e) = matchmaking.and(expiry) {
        tracing::error!(error = %e, "background loop panicked");
    }

    tracing::info!("Trivia Duel server stopped");
    Ok(())
}

/// Resolves on Ctrl-C or when `cancel` fires.
async fn shutdown_signal(cancel: CancellationToken) {
    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            if let Err(e) = result {
                tracing::error!(error = %e, "failed to listen for shutdown signal");
            }
        }
        () = cancel.cancelled() => {}
    }
    tracing::info!("shutting down");
}
