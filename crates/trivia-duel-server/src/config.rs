//! Process configuration read at startup.

use std::net::SocketAddr;

use trivia_duel_content::application::open_trivia::DEFAULT_OPENTDB_BASE_URL;
use trivia_duel_core::player::PlayerId;
use trivia_duel_core::settings::GameSettings;

use crate::error::AppError;

/// Everything `main` needs to wire the server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Postgres connection string.
    pub database_url: String,
    /// Listen address.
    pub addr: SocketAddr,
    /// Transport gateway receiving outbound messages and prompts.
    pub gateway_url: String,
    /// Chat that receives unexpected errors, if any.
    pub operator_chat: Option<PlayerId>,
    /// Open Trivia DB endpoint.
    pub opentdb_base_url: String,
    /// Game tunables.
    pub settings: GameSettings,
}

impl ServerConfig {
    /// Reads the configuration through `lookup`, normally the process
    /// environment.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a required variable is missing or a
    /// value does not parse.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| AppError::Config(format!("{key} environment variable must be set")))
        };

        let database_url = required("DATABASE_URL")?;
        let gateway_url = required("GATEWAY_URL")?;
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port: u16 = lookup("PORT")
            .unwrap_or_else(|| "3000".to_string())
            .parse()
            .map_err(|e| AppError::Config(format!("PORT must be a valid u16: {e}")))?;
        let addr: SocketAddr = format!("{host}:{port}")
            .parse()
            .map_err(|e| AppError::Config(format!("invalid HOST:PORT combination: {e}")))?;

        let settings =
            GameSettings::from_lookup(&lookup).map_err(|e| AppError::Config(e.to_string()))?;

        Ok(Self {
            database_url,
            addr,
            gateway_url,
            operator_chat: lookup("OPERATOR_CHAT")
                .filter(|v| !v.trim().is_empty())
                .map(PlayerId::new),
            opentdb_base_url: lookup("OPENTDB_BASE_URL")
                .unwrap_or_else(|| DEFAULT_OPENTDB_BASE_URL.to_string()),
            settings,
        })
    }
}
