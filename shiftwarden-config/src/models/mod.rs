pub mod sources;

use chrono::{FixedOffset, NaiveTime};
use std::path::PathBuf;

/// Fully composed runtime configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub directory: DirectoryConfig,
    pub notifications: NotificationConfig,
    pub schedule: ScheduleConfig,
    pub calendar: CalendarConfig,
    pub logging: LoggingConfig,
    pub metadata: ConfigMetadata,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub primary_url: Option<String>,
    pub max_connections: u32,
}

#[derive(Debug, Clone)]
pub struct DirectoryConfig {
    /// Separate directory database. `None` shares the primary database.
    pub url: Option<String>,
    pub profile_collection: String,
    pub role_assignment_collection: String,
    pub oversight_roles: Vec<String>,
    pub active_status: String,
    pub scan_limit: i64,
}

#[derive(Debug, Clone, Copy)]
pub struct NotificationConfig {
    pub lead_days: u32,
}

#[derive(Debug, Clone, Copy)]
pub struct ScheduleConfig {
    pub daily_at: NaiveTime,
    pub run_on_startup: bool,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CalendarConfig {
    /// `None` evaluates calendar days in the host's local time zone.
    pub utc_offset: Option<FixedOffset>,
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub filter: String,
}

#[derive(Debug, Clone, Default)]
pub struct ConfigMetadata {
    pub config_path: Option<PathBuf>,
    pub env_file_loaded: bool,
}
