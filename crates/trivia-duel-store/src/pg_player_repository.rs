//! `PostgreSQL` implementation of the `PlayerRepository` trait.

use async_trait::async_trait;

use trivia_duel_core::error::{DomainError, Rejection};
use trivia_duel_core::player::{DuelResult, Player, PlayerId};
use trivia_duel_core::repository::PlayerRepository;

use crate::pg_store::{PgStore, db_error, from_db_int, to_db_int};

#[derive(sqlx::FromRow)]
struct PlayerRow {
    id: String,
    handle: String,
    alias: Option<String>,
    score: i32,
    flawless_duels: i32,
}

impl TryFrom<PlayerRow> for Player {
    type Error = DomainError;

    fn try_from(row: PlayerRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: PlayerId::new(row.id),
            handle: row.handle,
            alias: row.alias,
            score: from_db_int("score", row.score)?,
            flawless_duels: from_db_int("flawless_duels", row.flawless_duels)?,
        })
    }
}

#[async_trait]
impl PlayerRepository for PgStore {
    async fn get(&self, id: &PlayerId) -> Result<Option<Player>, DomainError> {
        let row: Option<PlayerRow> = sqlx::query_as(
            "SELECT id, handle, alias, score, flawless_duels FROM players WHERE id = $1",
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("load player"))?;

        row.map(Player::try_from).transpose()
    }

    async fn save(&self, player: &Player) -> Result<(), DomainError> {
        let result = sqlx::query(
            r"
            INSERT INTO players (id, handle, alias, score, flawless_duels)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO UPDATE SET
                handle = EXCLUDED.handle,
                alias = EXCLUDED.alias
            ",
        )
        .bind(player.id.as_str())
        .bind(&player.handle)
        .bind(player.alias.as_deref())
        .bind(to_db_int("score", player.score)?)
        .bind(to_db_int("flawless_duels", player.flawless_duels)?)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            // The only unique index besides the key is the alias index; a
            // concurrent claim of the same alias lands here.
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                Err(Rejection::AliasTaken.into())
            }
            Err(e) => Err(db_error("save player")(e)),
        }
    }

    async fn apply_result(
        &self,
        id: &PlayerId,
        result: DuelResult,
        flawless: bool,
    ) -> Result<bool, DomainError> {
        let updated = sqlx::query(
            r"
            UPDATE players SET
                score = GREATEST(score + $2, 0),
                flawless_duels = flawless_duels + $3
            WHERE id = $1
            ",
        )
        .bind(id.as_str())
        .bind(result.score_delta())
        .bind(i32::from(flawless))
        .execute(&self.pool)
        .await
        .map_err(db_error("apply duel result"))?;

        Ok(updated.rows_affected() == 1)
    }

    async fn find_by_alias(&self, alias: &str) -> Result<Option<Player>, DomainError> {
        let row: Option<PlayerRow> = sqlx::query_as(
            "SELECT id, handle, alias, score, flawless_duels FROM players \
             WHERE lower(alias) = lower($1)",
        )
        .bind(alias)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("find player by alias"))?;

        row.map(Player::try_from).transpose()
    }
}
