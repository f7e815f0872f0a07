//! Defaults applied when neither the config file nor the environment sets a
//! value.

pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_PROFILE_COLLECTION: &str = "profiles";
pub const DEFAULT_ROLE_ASSIGNMENT_COLLECTION: &str = "role_assignments";
pub const DEFAULT_OVERSIGHT_ROLES: [&str; 3] = ["hr", "hr manager", "human resources"];
pub const DEFAULT_ACTIVE_STATUS: &str = "active";
pub const DEFAULT_DIRECTORY_SCAN_LIMIT: i64 = 5_000;
pub const DEFAULT_LEAD_DAYS: u32 = 7;
pub const MAX_LEAD_DAYS: u32 = 365;
pub const DEFAULT_DAILY_AT: &str = "08:00";
pub const DEFAULT_LOG_FILTER: &str = "info,sqlx=warn";
