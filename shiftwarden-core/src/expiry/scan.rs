use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Days, Utc};
use tracing::debug;

use super::config::ExpiryJobConfig;
use crate::database::ports::assignments::{AssignmentRepository, ExpiryScanQuery};
use crate::error::Result;
use crate::types::Assignment;

/// Scan range for a run at `now`: from `now` through the last millisecond of
/// the calendar day `lead_days` ahead.
pub fn scan_window(now: DateTime<Utc>, config: &ExpiryJobConfig) -> ExpiryScanQuery {
    let zone = config.zone;
    let today = zone.date_of(now);
    let horizon = today
        .checked_add_days(Days::new(u64::from(config.lead_days)))
        .unwrap_or(today);

    ExpiryScanQuery {
        ends_from: now,
        ends_until: zone.end_of_day(horizon),
    }
}

pub struct ExpiryScanner {
    repository: Arc<dyn AssignmentRepository>,
}

impl fmt::Debug for ExpiryScanner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExpiryScanner").finish_non_exhaustive()
    }
}

impl ExpiryScanner {
    pub fn new(repository: Arc<dyn AssignmentRepository>) -> Self {
        Self { repository }
    }

    /// Eligible assignments ordered by end, then id.
    pub async fn scan(&self, now: DateTime<Utc>, config: &ExpiryJobConfig) -> Result<Vec<Assignment>> {
        let query = scan_window(now, config);
        let mut assignments = self.repository.find_expiring(&query).await?;

        // Adapters already filter; keep the order guarantee independent of them.
        assignments.retain(|assignment| assignment.state.is_eligible());
        assignments.sort_by(|a, b| a.ends_at.cmp(&b.ends_at).then_with(|| a.id.cmp(&b.id)));

        debug!(
            ends_from = %query.ends_from,
            ends_until = %query.ends_until,
            found = assignments.len(),
            "Scanned for expiring assignments"
        );
        Ok(assignments)
    }
}
