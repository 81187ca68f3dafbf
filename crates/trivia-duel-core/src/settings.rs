//! Game tunables.
//!
//! Defaults reproduce the live game's timing. Every value can be
//! overridden from the process environment at startup.

use std::time::Duration;

use chrono::TimeDelta;
use thiserror::Error;

/// A tunable read from the environment did not parse or was inconsistent.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettingsError {
    /// The variable is present but not a valid number.
    #[error("invalid value for {key}: {value:?}")]
    Invalid {
        /// Environment variable name.
        key: &'static str,
        /// Raw value found.
        value: String,
    },

    /// Thresholds are out of order.
    #[error("warning thresholds must satisfy first < second < play window")]
    ThresholdOrder,
}

/// Timing and capacity knobs for duels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSettings {
    /// How long a choice prompt stays open on the player's device.
    pub answer_time: Duration,
    /// Extra time the engine waits beyond `answer_time` for a late answer.
    pub answer_grace: Duration,
    /// Number of categories offered at the start of a new round.
    pub category_choices: usize,
    /// Hours a player has to take their turn before the duel lapses.
    pub play_window_hours: u32,
    /// Hours of inactivity after which the first reminder is sent.
    pub first_warning_hours: u32,
    /// Hours of inactivity after which the urgent reminder is sent.
    pub second_warning_hours: u32,
    /// How long the category list is cached.
    pub category_cache_ttl: Duration,
    /// Maximum number of open duels per player.
    pub max_open_duels: usize,
    /// Cadence of the matchmaking processor.
    pub matchmaking_interval: Duration,
    /// Cadence of the expiry and warning sweep.
    pub expiry_interval: Duration,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            answer_time: Duration::from_secs(15),
            answer_grace: Duration::from_secs(3),
            category_choices: 3,
            play_window_hours: 48,
            first_warning_hours: 24,
            second_warning_hours: 47,
            category_cache_ttl: Duration::from_secs(300 * 60),
            max_open_duels: 10,
            matchmaking_interval: Duration::from_secs(5),
            expiry_interval: Duration::from_secs(120),
        }
    }
}

impl GameSettings {
    /// Builds settings from defaults, overriding any value for which
    /// `lookup` returns a string.
    ///
    /// Recognised keys: `ANSWER_TIME_SECS`, `ANSWER_GRACE_SECS`,
    /// `CATEGORY_CHOICES`, `PLAY_WINDOW_HOURS`, `FIRST_WARNING_HOURS`,
    /// `SECOND_WARNING_HOURS`, `CATEGORY_CACHE_MINUTES`, `MAX_OPEN_DUELS`,
    /// `MATCHMAKING_INTERVAL_SECS`, `EXPIRY_INTERVAL_SECS`.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::Invalid` if a value does not parse, or
    /// `SettingsError::ThresholdOrder` if the warnings do not precede the
    /// play window.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Self::default();

        if let Some(secs) = parse(&lookup, "ANSWER_TIME_SECS")? {
            settings.answer_time = Duration::from_secs(secs);
        }
        if let Some(secs) = parse(&lookup, "ANSWER_GRACE_SECS")? {
            settings.answer_grace = Duration::from_secs(secs);
        }
        if let Some(n) = parse(&lookup, "CATEGORY_CHOICES")? {
            settings.category_choices = n;
        }
        if let Some(h) = parse(&lookup, "PLAY_WINDOW_HOURS")? {
            settings.play_window_hours = h;
        }
        if let Some(h) = parse(&lookup, "FIRST_WARNING_HOURS")? {
            settings.first_warning_hours = h;
        }
        if let Some(h) = parse(&lookup, "SECOND_WARNING_HOURS")? {
            settings.second_warning_hours = h;
        }
        if let Some(minutes) = parse::<u64, _>(&lookup, "CATEGORY_CACHE_MINUTES")? {
            settings.category_cache_ttl = Duration::from_secs(minutes * 60);
        }
        if let Some(n) = parse(&lookup, "MAX_OPEN_DUELS")? {
            settings.max_open_duels = n;
        }
        if let Some(secs) = parse(&lookup, "MATCHMAKING_INTERVAL_SECS")? {
            settings.matchmaking_interval = Duration::from_secs(secs);
        }
        if let Some(secs) = parse(&lookup, "EXPIRY_INTERVAL_SECS")? {
            settings.expiry_interval = Duration::from_secs(secs);
        }

        if settings.first_warning_hours >= settings.second_warning_hours
            || settings.second_warning_hours >= settings.play_window_hours
        {
            return Err(SettingsError::ThresholdOrder);
        }
        if settings.category_choices == 0 {
            return Err(SettingsError::Invalid {
                key: "CATEGORY_CHOICES",
                value: "0".to_owned(),
            });
        }

        Ok(settings)
    }

    /// Total time the engine blocks on one prompt.
    #[must_use]
    pub fn answer_wait(&self) -> Duration {
        self.answer_time + self.answer_grace
    }

    /// Seconds a prompt stays open on the transport side.
    #[must_use]
    pub fn prompt_open_seconds(&self) -> u32 {
        u32::try_from(self.answer_time.as_secs()).unwrap_or(u32::MAX)
    }

    /// The play window as a timestamp delta.
    #[must_use]
    pub fn play_window(&self) -> TimeDelta {
        TimeDelta::hours(i64::from(self.play_window_hours))
    }

    /// Inactivity after which the first reminder is due.
    #[must_use]
    pub fn first_warning(&self) -> TimeDelta {
        TimeDelta::hours(i64::from(self.first_warning_hours))
    }

    /// Inactivity after which the urgent reminder is due.
    #[must_use]
    pub fn second_warning(&self) -> TimeDelta {
        TimeDelta::hours(i64::from(self.second_warning_hours))
    }
}

fn parse<T, F>(lookup: &F, key: &'static str) -> Result<Option<T>, SettingsError>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| SettingsError::Invalid { key, value }),
    }
}
