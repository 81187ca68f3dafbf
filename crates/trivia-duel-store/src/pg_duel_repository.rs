//! `PostgreSQL` implementation of the `DuelRepository` trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use tracing::debug;
use uuid::Uuid;

use trivia_duel_core::correctness::CorrectAnswers;
use trivia_duel_core::duel::{DuelRecord, Participant, RoundContent, WarningLevel};
use trivia_duel_core::error::DomainError;
use trivia_duel_core::player::PlayerId;
use trivia_duel_core::repository::DuelRepository;

use crate::pg_store::{PgStore, corrupt, db_error};

const DUEL_COLUMNS: &str = "id, first_player, first_alias, second_player, second_alias, \
     invited_player, invited_alias, cursor, pending_played, categories, open_round, \
     first_correct, second_correct, created_at, started_at, last_activity_at, warning_level";

#[derive(sqlx::FromRow)]
struct DuelRow {
    id: Uuid,
    first_player: String,
    first_alias: String,
    second_player: Option<String>,
    second_alias: Option<String>,
    invited_player: Option<String>,
    invited_alias: Option<String>,
    cursor: i16,
    pending_played: bool,
    categories: Json<[Option<u32>; 6]>,
    open_round: Option<Json<RoundContent>>,
    first_correct: i32,
    second_correct: i32,
    created_at: DateTime<Utc>,
    started_at: Option<DateTime<Utc>>,
    last_activity_at: DateTime<Utc>,
    warning_level: i16,
}

fn participant(id: Option<String>, alias: Option<String>) -> Option<Participant> {
    id.map(|id| Participant::new(PlayerId::new(id), alias.unwrap_or_default()))
}

fn bits(column: &'static str, value: i32) -> Result<CorrectAnswers, DomainError> {
    u32::try_from(value)
        .map(CorrectAnswers::from_bits)
        .map_err(|_| corrupt(column, value))
}

impl TryFrom<DuelRow> for DuelRecord {
    type Error = DomainError;

    fn try_from(row: DuelRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            first: Participant::new(PlayerId::new(row.first_player), row.first_alias),
            second: participant(row.second_player, row.second_alias),
            invited: participant(row.invited_player, row.invited_alias),
            cursor: u8::try_from(row.cursor).map_err(|_| corrupt("cursor", row.cursor))?,
            pending_played: row.pending_played,
            categories: row.categories.0,
            open_round: row.open_round.map(|json| json.0),
            first_correct: bits("first_correct", row.first_correct)?,
            second_correct: bits("second_correct", row.second_correct)?,
            created_at: row.created_at,
            started_at: row.started_at,
            last_activity_at: row.last_activity_at,
            warning_level: WarningLevel::from_i16(row.warning_level),
        })
    }
}

fn correct_column(value: CorrectAnswers) -> i32 {
    // 18 significant bits always fit.
    i32::try_from(value.bits()).unwrap_or(i32::MAX)
}

fn into_records(rows: Vec<DuelRow>) -> Result<Vec<DuelRecord>, DomainError> {
    rows.into_iter().map(DuelRecord::try_from).collect()
}

#[async_trait]
impl DuelRepository for PgStore {
    async fn get(&self, id: Uuid) -> Result<Option<DuelRecord>, DomainError> {
        let row: Option<DuelRow> = sqlx::query_as(&format!(
            "SELECT {DUEL_COLUMNS} FROM running_duels WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("load duel"))?;

        row.map(DuelRecord::try_from).transpose()
    }

    async fn save(&self, duel: &DuelRecord) -> Result<(), DomainError> {
        sqlx::query(
            r"
            INSERT INTO running_duels (
                id, first_player, first_alias, second_player, second_alias,
                invited_player, invited_alias, cursor, pending_played, categories,
                open_round, first_correct, second_correct, created_at, started_at,
                last_activity_at, warning_level
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            ON CONFLICT (id) DO UPDATE SET
                first_player = EXCLUDED.first_player,
                first_alias = EXCLUDED.first_alias,
                second_player = EXCLUDED.second_player,
                second_alias = EXCLUDED.second_alias,
                invited_player = EXCLUDED.invited_player,
                invited_alias = EXCLUDED.invited_alias,
                cursor = EXCLUDED.cursor,
                pending_played = EXCLUDED.pending_played,
                categories = EXCLUDED.categories,
                open_round = EXCLUDED.open_round,
                first_correct = EXCLUDED.first_correct,
                second_correct = EXCLUDED.second_correct,
                started_at = EXCLUDED.started_at,
                last_activity_at = EXCLUDED.last_activity_at,
                warning_level = EXCLUDED.warning_level
            ",
        )
        .bind(duel.id)
        .bind(duel.first.id.as_str())
        .bind(&duel.first.alias)
        .bind(duel.second.as_ref().map(|p| p.id.as_str()))
        .bind(duel.second.as_ref().map(|p| p.alias.as_str()))
        .bind(duel.invited.as_ref().map(|p| p.id.as_str()))
        .bind(duel.invited.as_ref().map(|p| p.alias.as_str()))
        .bind(i16::from(duel.cursor))
        .bind(duel.pending_played)
        .bind(Json(duel.categories))
        .bind(duel.open_round.as_ref().map(Json))
        .bind(correct_column(duel.first_correct))
        .bind(correct_column(duel.second_correct))
        .bind(duel.created_at)
        .bind(duel.started_at)
        .bind(duel.last_activity_at)
        .bind(duel.warning_level.as_i16())
        .execute(&self.pool)
        .await
        .map_err(db_error("save duel"))?;

        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        sqlx::query("DELETE FROM running_duels WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error("delete duel"))?;
        Ok(())
    }

    async fn delete_open_request(&self, id: Uuid) -> Result<bool, DomainError> {
        let result = sqlx::query(
            "DELETE FROM running_duels \
             WHERE id = $1 AND cursor = 0 \
               AND second_player IS NULL AND invited_player IS NULL",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(db_error("delete open request"))?;
        Ok(result.rows_affected() == 1)
    }

    async fn involving(&self, player: &PlayerId) -> Result<Vec<DuelRecord>, DomainError> {
        let rows: Vec<DuelRow> = sqlx::query_as(&format!(
            "SELECT {DUEL_COLUMNS} FROM running_duels \
             WHERE first_player = $1 OR second_player = $1 OR invited_player = $1 \
             ORDER BY created_at, id"
        ))
        .bind(player.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("load duels of player"))?;

        into_records(rows)
    }

    async fn between(&self, a: &PlayerId, b: &PlayerId) -> Result<Option<DuelRecord>, DomainError> {
        let row: Option<DuelRow> = sqlx::query_as(&format!(
            "SELECT {DUEL_COLUMNS} FROM running_duels \
             WHERE (first_player = $1 AND (second_player = $2 OR invited_player = $2)) \
                OR (first_player = $2 AND (second_player = $1 OR invited_player = $1)) \
             ORDER BY created_at, id \
             LIMIT 1"
        ))
        .bind(a.as_str())
        .bind(b.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("load duel between players"))?;

        row.map(DuelRecord::try_from).transpose()
    }

    async fn claim_open_request(
        &self,
        joiner: &Participant,
        now: DateTime<Utc>,
    ) -> Result<Option<DuelRecord>, DomainError> {
        // Oldest eligible request wins. Rows locked by a concurrent claim
        // are skipped rather than waited on, so two claimers never receive
        // the same request.
        let row: Option<DuelRow> = sqlx::query_as(&format!(
            r"
            UPDATE running_duels
            SET second_player = $1,
                second_alias = $2,
                cursor = 1,
                pending_played = TRUE,
                started_at = $3,
                last_activity_at = $3,
                warning_level = 0
            WHERE cursor = 0
              AND second_player IS NULL
              AND invited_player IS NULL
              AND id = (
                  SELECT d.id
                  FROM running_duels d
                  WHERE d.cursor = 0
                    AND d.second_player IS NULL
                    AND d.invited_player IS NULL
                    AND d.first_player <> $1
                    AND d.first_player NOT IN (
                        SELECT first_player FROM running_duels
                        WHERE second_player = $1 OR invited_player = $1
                        UNION
                        SELECT second_player FROM running_duels
                        WHERE first_player = $1 AND second_player IS NOT NULL
                        UNION
                        SELECT invited_player FROM running_duels
                        WHERE first_player = $1 AND invited_player IS NOT NULL
                    )
                  ORDER BY d.created_at, d.id
                  LIMIT 1
                  FOR UPDATE SKIP LOCKED
              )
            RETURNING {DUEL_COLUMNS}
            "
        ))
        .bind(joiner.id.as_str())
        .bind(&joiner.alias)
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("claim open request"))?;

        let claimed = row.map(DuelRecord::try_from).transpose()?;
        if let Some(duel) = &claimed {
            debug!(duel_id = %duel.id, joiner = %joiner.id, "open request claimed");
        }
        Ok(claimed)
    }

    async fn all(&self) -> Result<Vec<DuelRecord>, DomainError> {
        let rows: Vec<DuelRow> = sqlx::query_as(&format!(
            "SELECT {DUEL_COLUMNS} FROM running_duels ORDER BY created_at, id"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("load all duels"))?;

        into_records(rows)
    }
}
