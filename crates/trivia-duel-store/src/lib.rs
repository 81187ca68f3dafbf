//! Trivia Duel: PostgreSQL persistence.
//!
//! One [`PgStore`](pg_store::PgStore) implements all three repository
//! ports over a shared pool. Schema lives in the workspace `migrations/`
//! directory and is applied with [`MIGRATOR`].

pub mod pg_duel_repository;
pub mod pg_finished_game_repository;
pub mod pg_player_repository;
pub mod pg_store;

/// Embedded schema migrations.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations");
