use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::database::ports::notifications::NotificationRepository;
use crate::error::Result;
use crate::time::CalendarZone;
use crate::types::{NewNotification, NotificationFilter, NotificationRecord};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Emission {
    Created(NotificationRecord),
    /// An identical notice was already recorded today.
    Duplicate,
}

/// Writes a notification unless the same recipient already got the same
/// notice for the same assignment window during the current calendar day.
pub struct NotificationEmitter {
    repository: Arc<dyn NotificationRepository>,
    zone: CalendarZone,
}

impl fmt::Debug for NotificationEmitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotificationEmitter")
            .field("zone", &self.zone)
            .finish_non_exhaustive()
    }
}

impl NotificationEmitter {
    pub fn new(repository: Arc<dyn NotificationRepository>, zone: CalendarZone) -> Self {
        Self { repository, zone }
    }

    pub fn duplicate_filter(&self, candidate: &NewNotification, now: DateTime<Utc>) -> NotificationFilter {
        let (created_from, created_until) = self.zone.day_bounds(now);
        NotificationFilter {
            recipient_id: candidate.recipient_id,
            assignment_id: candidate.metadata.assignment_id,
            kind: candidate.kind,
            window_start: candidate.metadata.shift_start_date.clone(),
            window_end: candidate.metadata.shift_end_date.clone(),
            created_from,
            created_until,
        }
    }

    pub async fn emit(&self, candidate: NewNotification, now: DateTime<Utc>) -> Result<Emission> {
        let filter = self.duplicate_filter(&candidate, now);
        if self.repository.exists_matching(&filter).await? {
            return Ok(Emission::Duplicate);
        }
        let record = self.repository.create(candidate).await?;
        Ok(Emission::Created(record))
    }
}
