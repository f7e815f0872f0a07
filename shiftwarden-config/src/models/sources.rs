use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::util::{non_empty_var, parse_bool_var, parse_csv_var};

/// Raw configuration as defined in a TOML file.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct FileConfig {
    #[serde(default)]
    pub database: FileDatabaseConfig,
    #[serde(default)]
    pub directory: FileDirectoryConfig,
    #[serde(default)]
    pub notifications: FileNotificationConfig,
    #[serde(default)]
    pub schedule: FileScheduleConfig,
    #[serde(default)]
    pub calendar: FileCalendarConfig,
    #[serde(default)]
    pub logging: FileLoggingConfig,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileDatabaseConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_file: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_connections: Option<u32>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileDirectoryConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_collection: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role_assignment_collection: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oversight_roles: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scan_limit: Option<i64>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileNotificationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lead_days: Option<i64>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileScheduleConfig {
    /// `HH:MM` in the calendar zone.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daily_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_on_startup: Option<bool>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileCalendarConfig {
    /// Fixed offset such as `+02:00`. Unset means the host's local zone.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub utc_offset: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileLoggingConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
}

/// Environment-derived configuration values. Values that need validation are
/// kept raw so a bad value is reported instead of silently ignored.
#[derive(Debug, Default, Clone)]
pub struct EnvConfig {
    pub config_path: Option<PathBuf>,
    pub database_url: Option<String>,
    pub database_url_file: Option<PathBuf>,
    pub database_host: Option<String>,
    pub database_port: Option<u16>,
    pub database_user: Option<String>,
    pub database_name: Option<String>,
    pub database_password: Option<String>,
    pub database_password_file: Option<PathBuf>,
    pub database_max_connections: Option<String>,
    pub directory_url: Option<String>,
    pub directory_profile_collection: Option<String>,
    pub directory_role_assignment_collection: Option<String>,
    pub oversight_roles: Option<Vec<String>>,
    pub directory_active_status: Option<String>,
    pub lead_days: Option<String>,
    pub daily_at: Option<String>,
    pub run_on_startup: Option<bool>,
    pub utc_offset: Option<String>,
    pub log_filter: Option<String>,
}

impl EnvConfig {
    pub fn gather() -> Self {
        Self {
            config_path: non_empty_var("SHIFTWARDEN_CONFIG").map(PathBuf::from),
            database_url: std::env::var("DATABASE_URL").ok(),
            database_url_file: std::env::var("DATABASE_URL_FILE")
                .ok()
                .map(PathBuf::from),
            database_host: std::env::var("DATABASE_HOST").ok(),
            database_port: std::env::var("DATABASE_PORT")
                .ok()
                .and_then(|s| s.parse().ok()),
            database_user: std::env::var("DATABASE_USER").ok(),
            database_name: std::env::var("DATABASE_NAME").ok(),
            database_password: std::env::var("DATABASE_PASSWORD").ok(),
            database_password_file: std::env::var("DATABASE_PASSWORD_FILE")
                .ok()
                .map(PathBuf::from),
            database_max_connections: non_empty_var("DATABASE_MAX_CONNECTIONS"),
            directory_url: non_empty_var("DIRECTORY_DATABASE_URL"),
            directory_profile_collection: non_empty_var("DIRECTORY_PROFILE_COLLECTION"),
            directory_role_assignment_collection: non_empty_var(
                "DIRECTORY_ROLE_ASSIGNMENT_COLLECTION",
            ),
            oversight_roles: parse_csv_var("OVERSIGHT_ROLES"),
            directory_active_status: non_empty_var("DIRECTORY_ACTIVE_STATUS"),
            lead_days: non_empty_var("NOTIFICATION_LEAD_DAYS"),
            daily_at: non_empty_var("NOTIFICATION_DAILY_AT"),
            run_on_startup: parse_bool_var("NOTIFICATION_RUN_ON_STARTUP"),
            utc_offset: non_empty_var("CALENDAR_UTC_OFFSET"),
            log_filter: non_empty_var("SHIFTWARDEN_LOG"),
        }
    }
}
