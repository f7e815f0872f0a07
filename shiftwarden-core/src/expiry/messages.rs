use chrono::{DateTime, Utc};

use crate::time::CalendarZone;
use crate::types::{AssignmentId, IdentityId};

pub fn oversight_message(
    assignment: AssignmentId,
    subject: IdentityId,
    ends_at: DateTime<Utc>,
    now: DateTime<Utc>,
    zone: CalendarZone,
) -> String {
    format!(
        "Shift assignment {assignment} for {subject} ends on {} ({}).",
        zone.date_of(ends_at).format("%Y-%m-%d"),
        remaining(ends_at, now, zone)
    )
}

pub fn subject_message(ends_at: DateTime<Utc>, now: DateTime<Utc>, zone: CalendarZone) -> String {
    format!(
        "Your shift assignment ends on {} ({}).",
        zone.date_of(ends_at).format("%Y-%m-%d"),
        remaining(ends_at, now, zone)
    )
}

fn remaining(ends_at: DateTime<Utc>, now: DateTime<Utc>, zone: CalendarZone) -> String {
    let days = (zone.date_of(ends_at) - zone.date_of(now)).num_days();
    match days {
        i64::MIN..=0 => "ends today".to_string(),
        1 => "1 day remaining".to_string(),
        n => format!("{n} days remaining"),
    }
}
