use chrono::{FixedOffset, NaiveTime};
use thiserror::Error;

use crate::constants::MAX_LEAD_DAYS;
use crate::models::Config;
use crate::util::{parse_daily_at, parse_utc_offset};

#[derive(Debug, Error)]
pub enum ConfigGuardRailError {
    #[error("notification lead days must be between 0 and {max}, got {value}")]
    LeadDaysOutOfRange { value: String, max: u32 },
    #[error("daily run time '{value}' is not a valid HH:MM time")]
    InvalidDailyAt { value: String },
    #[error("calendar UTC offset '{value}' is not a valid offset such as +02:00")]
    InvalidUtcOffset { value: String },
    #[error("{field} must be a positive integer, got '{value}'")]
    InvalidPositive { field: &'static str, value: String },
    #[error("no oversight role labels configured")]
    EmptyOversightRoles,
    #[error("directory collection {field} must not be blank")]
    BlankCollection { field: &'static str },
}

#[derive(Debug, Clone)]
pub struct ConfigWarning {
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, Default, Clone)]
pub struct ConfigWarnings {
    pub items: Vec<ConfigWarning>,
}

impl ConfigWarnings {
    pub fn push<S: Into<String>>(&mut self, message: S) {
        self.items.push(ConfigWarning {
            message: message.into(),
            hint: None,
        });
    }

    pub fn push_with_hint<S: Into<String>, H: Into<String>>(&mut self, message: S, hint: H) {
        self.items.push(ConfigWarning {
            message: message.into(),
            hint: Some(hint.into()),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn extend(&mut self, other: ConfigWarnings) {
        self.items.extend(other.items);
    }
}

pub fn lead_days(raw: &str) -> Result<u32, ConfigGuardRailError> {
    raw.trim()
        .parse::<u32>()
        .ok()
        .filter(|days| *days <= MAX_LEAD_DAYS)
        .ok_or_else(|| ConfigGuardRailError::LeadDaysOutOfRange {
            value: raw.to_string(),
            max: MAX_LEAD_DAYS,
        })
}

pub fn daily_at(raw: &str) -> Result<NaiveTime, ConfigGuardRailError> {
    parse_daily_at(raw).ok_or_else(|| ConfigGuardRailError::InvalidDailyAt {
        value: raw.to_string(),
    })
}

pub fn utc_offset(raw: &str) -> Result<FixedOffset, ConfigGuardRailError> {
    parse_utc_offset(raw).ok_or_else(|| ConfigGuardRailError::InvalidUtcOffset {
        value: raw.to_string(),
    })
}

pub fn positive<T>(field: &'static str, raw: &str) -> Result<T, ConfigGuardRailError>
where
    T: std::str::FromStr + PartialOrd + Default,
{
    raw.trim()
        .parse::<T>()
        .ok()
        .filter(|value| *value > T::default())
        .ok_or_else(|| ConfigGuardRailError::InvalidPositive {
            field,
            value: raw.to_string(),
        })
}

/// Checks on the composed configuration. Hard failures abort startup;
/// everything else comes back as warnings for the operator.
pub fn apply_guard_rails(config: &Config) -> Result<ConfigWarnings, ConfigGuardRailError> {
    let mut warnings = ConfigWarnings::default();
    let directory = &config.directory;

    if directory.profile_collection.trim().is_empty() {
        return Err(ConfigGuardRailError::BlankCollection {
            field: "profile_collection",
        });
    }
    if directory.role_assignment_collection.trim().is_empty() {
        return Err(ConfigGuardRailError::BlankCollection {
            field: "role_assignment_collection",
        });
    }
    if directory
        .oversight_roles
        .iter()
        .all(|label| label.trim().is_empty())
    {
        return Err(ConfigGuardRailError::EmptyOversightRoles);
    }

    if config.database.primary_url.is_none() {
        warnings.push_with_hint(
            "No database URL configured",
            "Set DATABASE_URL or database.url in shiftwarden.toml",
        );
    }
    if directory.url.is_none() {
        warnings.push(
            "DIRECTORY_DATABASE_URL not set; directory documents are read from the primary database",
        );
    }
    if config.notifications.lead_days == 0 {
        warnings.push_with_hint(
            "Lead days is 0; only assignments ending today are notified",
            "Set NOTIFICATION_LEAD_DAYS to widen the window",
        );
    }

    Ok(warnings)
}
