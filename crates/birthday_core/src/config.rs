//! Runtime configuration from environment variables.
//!
//! # Responsibility
//! - Read and validate host settings in one place.
//!
//! # Invariants
//! - Unset variables fall back to documented defaults.
//! - Set-but-invalid variables are errors, never silently defaulted.

use crate::logging::default_log_level;
use crate::service::birthday_service::DEFAULT_UPCOMING_LIMIT;
use chrono::NaiveTime;
use chrono_tz::Tz;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const ENV_DB_PATH: &str = "BIRTHDAY_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "BIRTHDAY_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "BIRTHDAY_LOG_DIR";
pub const ENV_TIMEZONE: &str = "BIRTHDAY_TIMEZONE";
pub const ENV_ANNOUNCE_AT: &str = "BIRTHDAY_ANNOUNCE_AT";
pub const ENV_UPCOMING_LIMIT: &str = "BIRTHDAY_UPCOMING_LIMIT";

const DEFAULT_DB_PATH: &str = "birthdays.sqlite3";
const DEFAULT_TIMEZONE: Tz = chrono_tz::America::Belem;
const DEFAULT_ANNOUNCE_AT: &str = "08:10";

/// Invalid configuration value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    pub variable: &'static str,
    pub message: String,
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid {}: {}", self.variable, self.message)
    }
}

impl Error for ConfigError {}

/// Settings for a birthday bot host.
#[derive(Debug, Clone, PartialEq)]
pub struct BotConfig {
    pub db_path: PathBuf,
    pub log_level: String,
    pub log_dir: PathBuf,
    pub timezone: Tz,
    pub announce_at: NaiveTime,
    pub upcoming_limit: usize,
}

impl BotConfig {
    /// Loads configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let cwd = std::env::current_dir().map_err(|err| ConfigError {
            variable: ENV_LOG_DIR,
            message: format!("cannot resolve working directory: {err}"),
        })?;
        Self::from_lookup(cwd, |name| std::env::var(name).ok())
    }

    /// Loads configuration through `lookup`, resolving relative paths under `base_dir`.
    pub fn from_lookup(
        base_dir: PathBuf,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let get = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let db_path = get(ENV_DB_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_PATH));

        let log_level = get(ENV_LOG_LEVEL).unwrap_or_else(|| default_log_level().to_string());

        let log_dir = match get(ENV_LOG_DIR) {
            Some(dir) => PathBuf::from(dir),
            None => PathBuf::from("logs"),
        };
        let log_dir = if log_dir.is_absolute() {
            log_dir
        } else {
            base_dir.join(log_dir)
        };

        let timezone = match get(ENV_TIMEZONE) {
            Some(name) => name.parse::<Tz>().map_err(|_| ConfigError {
                variable: ENV_TIMEZONE,
                message: format!("unknown timezone `{name}`"),
            })?,
            None => DEFAULT_TIMEZONE,
        };

        let announce_at_text = get(ENV_ANNOUNCE_AT).unwrap_or_else(|| DEFAULT_ANNOUNCE_AT.to_string());
        let announce_at =
            NaiveTime::parse_from_str(&announce_at_text, "%H:%M").map_err(|_| ConfigError {
                variable: ENV_ANNOUNCE_AT,
                message: format!("expected HH:MM, got `{announce_at_text}`"),
            })?;

        let upcoming_limit = match get(ENV_UPCOMING_LIMIT) {
            Some(text) => match text.parse::<usize>() {
                Ok(limit) if limit > 0 => limit,
                _ => {
                    return Err(ConfigError {
                        variable: ENV_UPCOMING_LIMIT,
                        message: format!("expected a positive integer, got `{text}`"),
                    })
                }
            },
            None => DEFAULT_UPCOMING_LIMIT,
        };

        Ok(Self {
            db_path,
            log_level,
            log_dir,
            timezone,
            announce_at,
            upcoming_limit,
        })
    }
}
