//! Core domain logic for the group birthday bot.
//! This crate is the single source of truth for birthday invariants.

pub mod clock;
pub mod command;
pub mod config;
pub mod dates;
pub mod db;
pub mod format;
pub mod logging;
pub mod model;
pub mod repo;
pub mod scheduler;
pub mod service;
pub mod transport;

pub use clock::{Clock, FixedClock, SystemClock};
pub use command::dispatcher::Dispatcher;
pub use command::parser::{parse_command, Command, FormatError};
pub use config::{BotConfig, ConfigError};
pub use dates::{is_real_date, next_occurrence};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::birthday::{normalize_name, BirthdayRecord, GroupId, UpcomingEntry};
pub use repo::birthday_repo::{
    BirthdayRepository, RepoError, RepoResult, SqliteBirthdayRepository,
};
pub use scheduler::{DailyScheduler, SchedulerReport, MAX_CONCURRENT_SENDS};
pub use service::birthday_service::{
    BirthdayService, ServiceError, ServiceResult, DEFAULT_UPCOMING_LIMIT,
};
pub use transport::{Chat, SendError, Transport};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
