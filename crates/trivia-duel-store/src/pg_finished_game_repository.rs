//! `PostgreSQL` implementation of the `FinishedGameRepository` trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use uuid::Uuid;

use trivia_duel_core::error::DomainError;
use trivia_duel_core::finished::{FinishedGame, GameOutcome};
use trivia_duel_core::player::PlayerId;
use trivia_duel_core::repository::FinishedGameRepository;

use crate::pg_store::{PgStore, corrupt, db_error, from_db_int, to_db_int};

#[derive(sqlx::FromRow)]
struct FinishedRow {
    id: Uuid,
    first_player: String,
    second_player: String,
    first_points: i32,
    second_points: i32,
    categories: Json<[Option<u32>; 6]>,
    started_at: Option<DateTime<Utc>>,
    ended_at: DateTime<Utc>,
    until_round: i16,
    outcome: Json<GameOutcome>,
}

impl TryFrom<FinishedRow> for FinishedGame {
    type Error = DomainError;

    fn try_from(row: FinishedRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            first_player: PlayerId::new(row.first_player),
            second_player: PlayerId::new(row.second_player),
            first_points: from_db_int("first_points", row.first_points)?,
            second_points: from_db_int("second_points", row.second_points)?,
            categories: row.categories.0,
            started_at: row.started_at,
            ended_at: row.ended_at,
            until_round: u8::try_from(row.until_round)
                .map_err(|_| corrupt("until_round", row.until_round))?,
            outcome: row.outcome.0,
        })
    }
}

#[async_trait]
impl FinishedGameRepository for PgStore {
    async fn insert(&self, game: &FinishedGame) -> Result<(), DomainError> {
        sqlx::query(
            r"
            INSERT INTO finished_duels (
                id, first_player, second_player, first_points, second_points,
                categories, started_at, ended_at, until_round, outcome
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ",
        )
        .bind(game.id)
        .bind(game.first_player.as_str())
        .bind(game.second_player.as_str())
        .bind(to_db_int("first_points", game.first_points)?)
        .bind(to_db_int("second_points", game.second_points)?)
        .bind(Json(game.categories))
        .bind(game.started_at)
        .bind(game.ended_at)
        .bind(i16::from(game.until_round))
        .bind(Json(&game.outcome))
        .execute(&self.pool)
        .await
        .map_err(db_error("archive finished duel"))?;

        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<FinishedGame>, DomainError> {
        let row: Option<FinishedRow> = sqlx::query_as(
            r"
            SELECT id, first_player, second_player, first_points, second_points,
                   categories, started_at, ended_at, until_round, outcome
            FROM finished_duels
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("load finished duel"))?;

        row.map(FinishedGame::try_from).transpose()
    }
}
