//! Wall-clock access and calendar-day arithmetic.
//!
//! Expiry thresholds, the once-per-day duplicate window and the daily trigger
//! all reason about *calendar days* in the service's zone, not in UTC. The
//! zone is either the host's local time zone or a fixed offset chosen in
//! configuration; tests pin a fixed offset so they do not depend on the host.

use std::fmt;
use std::sync::Arc;

use chrono::{
    DateTime, Duration, FixedOffset, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, Offset,
    TimeZone, Utc,
};
use parking_lot::Mutex;

pub trait Clock: Send + Sync + fmt::Debug {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually driven clock for deterministic runs.
#[derive(Debug, Clone)]
pub struct FixedClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(Mutex::new(now)),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock() = now;
    }

    pub fn advance(&self, by: Duration) {
        let mut guard = self.now.lock();
        *guard += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}

/// Zone in which calendar days are evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CalendarZone {
    /// The host's local time zone, DST transitions included.
    #[default]
    Local,
    Fixed(FixedOffset),
}

impl CalendarZone {
    pub fn utc() -> Self {
        CalendarZone::Fixed(Utc.fix())
    }

    /// Calendar date of `at` in this zone.
    pub fn date_of(&self, at: DateTime<Utc>) -> NaiveDate {
        match self {
            CalendarZone::Local => at.with_timezone(&chrono::Local).date_naive(),
            CalendarZone::Fixed(offset) => at.with_timezone(offset).date_naive(),
        }
    }

    /// First instant of `date`.
    pub fn start_of_day(&self, date: NaiveDate) -> DateTime<Utc> {
        self.resolve(date.and_time(NaiveTime::MIN))
    }

    /// Last millisecond of `date` (23:59:59.999 local).
    pub fn end_of_day(&self, date: NaiveDate) -> DateTime<Utc> {
        match date.succ_opt() {
            Some(next) => self.start_of_day(next) - Duration::milliseconds(1),
            None => self.resolve(date.and_time(last_millisecond())),
        }
    }

    /// Inclusive bounds of the calendar day containing `at`.
    pub fn day_bounds(&self, at: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
        let date = self.date_of(at);
        (self.start_of_day(date), self.end_of_day(date))
    }

    /// Next instant strictly after `after` whose local wall time is `at`.
    pub fn next_daily(&self, after: DateTime<Utc>, at: NaiveTime) -> DateTime<Utc> {
        let today = self.date_of(after);
        let candidate = self.resolve(today.and_time(at));
        if candidate > after {
            return candidate;
        }
        let tomorrow = today.succ_opt().unwrap_or(today);
        self.resolve(tomorrow.and_time(at))
    }

    fn resolve(&self, local: NaiveDateTime) -> DateTime<Utc> {
        match self {
            CalendarZone::Local => resolve_in(&chrono::Local, local),
            CalendarZone::Fixed(offset) => resolve_in(offset, local),
        }
    }
}

impl fmt::Display for CalendarZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CalendarZone::Local => f.write_str("local"),
            CalendarZone::Fixed(offset) => write!(f, "{offset}"),
        }
    }
}

fn last_millisecond() -> NaiveTime {
    NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN)
}

fn resolve_in<Tz: TimeZone>(tz: &Tz, local: NaiveDateTime) -> DateTime<Utc> {
    match tz.from_local_datetime(&local) {
        LocalResult::Single(ts) => ts.with_timezone(&Utc),
        LocalResult::Ambiguous(earliest, _) => earliest.with_timezone(&Utc),
        LocalResult::None => {
            // Inside a DST gap; the first valid local instant is at most an
            // hour later.
            tz.from_local_datetime(&(local + Duration::hours(1)))
                .earliest()
                .map(|ts| ts.with_timezone(&Utc))
                .unwrap_or_else(|| Utc.from_utc_datetime(&local))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn utc_day_bounds_cover_whole_day() {
        let zone = CalendarZone::utc();
        let at = Utc.with_ymd_and_hms(2025, 1, 1, 13, 45, 0).unwrap();
        let (start, end) = zone.day_bounds(at);
        assert_eq!(start, Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap());
        assert_eq!(
            end,
            Utc.with_ymd_and_hms(2025, 1, 1, 23, 59, 59).unwrap() + Duration::milliseconds(999)
        );
    }

    #[test]
    fn fixed_offset_shifts_the_calendar_day() {
        let zone = CalendarZone::Fixed(FixedOffset::east_opt(2 * 3600).unwrap());
        // 23:30 UTC on Jan 1 is already Jan 2 at +02:00.
        let at = Utc.with_ymd_and_hms(2025, 1, 1, 23, 30, 0).unwrap();
        assert_eq!(zone.date_of(at), ymd(2025, 1, 2));

        let (start, _) = zone.day_bounds(at);
        assert_eq!(start, Utc.with_ymd_and_hms(2025, 1, 1, 22, 0, 0).unwrap());
    }

    #[test]
    fn end_of_day_is_last_millisecond() {
        let zone = CalendarZone::utc();
        let end = zone.end_of_day(ymd(2025, 1, 8));
        assert_eq!(end.to_rfc3339(), "2025-01-08T23:59:59.999+00:00");
    }

    #[test]
    fn next_daily_rolls_over_after_slot() {
        let zone = CalendarZone::utc();
        let slot = NaiveTime::from_hms_opt(8, 0, 0).unwrap();

        let before = Utc.with_ymd_and_hms(2025, 1, 1, 7, 0, 0).unwrap();
        assert_eq!(
            zone.next_daily(before, slot),
            Utc.with_ymd_and_hms(2025, 1, 1, 8, 0, 0).unwrap()
        );

        let exactly = Utc.with_ymd_and_hms(2025, 1, 1, 8, 0, 0).unwrap();
        assert_eq!(
            zone.next_daily(exactly, slot),
            Utc.with_ymd_and_hms(2025, 1, 2, 8, 0, 0).unwrap()
        );
    }

    #[test]
    fn fixed_clock_advances() {
        let clock = FixedClock::new(Utc.with_ymd_and_hms(2025, 1, 1, 9, 0, 0).unwrap());
        clock.advance(Duration::days(1));
        assert_eq!(
            clock.now(),
            Utc.with_ymd_and_hms(2025, 1, 2, 9, 0, 0).unwrap()
        );
    }
}
