//! Shared pool handle and error mapping.

use sqlx::PgPool;
use trivia_duel_core::error::DomainError;

/// PostgreSQL-backed store for duels, players and finished games.
#[derive(Debug, Clone)]
pub struct PgStore {
    pub(crate) pool: PgPool,
}

impl PgStore {
    /// Creates a new `PgStore`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The underlying pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Maps a driver error into an infrastructure error tagged with the
/// operation that failed.
pub(crate) fn db_error(operation: &'static str) -> impl Fn(sqlx::Error) -> DomainError {
    move |e| DomainError::Infrastructure(format!("{operation} failed: {e}"))
}

/// A stored value did not fit the domain type.
pub(crate) fn corrupt(column: &'static str, value: impl std::fmt::Display) -> DomainError {
    DomainError::Infrastructure(format!("stored {column} out of range: {value}"))
}

/// Converts an unsigned counter to its `INTEGER` column value.
pub(crate) fn to_db_int(column: &'static str, value: u32) -> Result<i32, DomainError> {
    i32::try_from(value).map_err(|_| corrupt(column, value))
}

/// Converts an `INTEGER` column value back to an unsigned counter.
pub(crate) fn from_db_int(column: &'static str, value: i32) -> Result<u32, DomainError> {
    u32::try_from(value).map_err(|_| corrupt(column, value))
}
