use chrono::NaiveTime;

use crate::error::{NotifyError, Result};
use crate::time::CalendarZone;

pub const DEFAULT_LEAD_DAYS: u32 = 7;
pub const MAX_LEAD_DAYS: u32 = 365;

/// Knobs for a single expiry run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpiryJobConfig {
    /// Days ahead of today whose assignments are considered expiring.
    pub lead_days: u32,
    /// Zone used for the scan threshold and the duplicate window.
    pub zone: CalendarZone,
}

impl ExpiryJobConfig {
    pub fn new(lead_days: u32, zone: CalendarZone) -> Result<Self> {
        if lead_days > MAX_LEAD_DAYS {
            return Err(NotifyError::InvalidRecord(format!(
                "lead_days must be between 0 and {MAX_LEAD_DAYS}, got {lead_days}"
            )));
        }
        Ok(Self { lead_days, zone })
    }
}

impl Default for ExpiryJobConfig {
    fn default() -> Self {
        Self {
            lead_days: DEFAULT_LEAD_DAYS,
            zone: CalendarZone::Local,
        }
    }
}

/// When the trigger fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerSchedule {
    /// Wall-clock time of the daily run in the job's calendar zone.
    pub daily_at: NaiveTime,
    pub run_on_startup: bool,
}

impl Default for TriggerSchedule {
    fn default() -> Self {
        Self {
            daily_at: NaiveTime::from_hms_opt(8, 0, 0).unwrap_or(NaiveTime::MIN),
            run_on_startup: true,
        }
    }
}
