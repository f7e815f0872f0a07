use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;
use tokio::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use super::config::TriggerSchedule;
use super::job::ExpiryNotificationJob;
use super::stats::RunOutcome;
use crate::time::{CalendarZone, Clock};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerKind {
    Startup,
    Daily,
    Manual,
}

impl fmt::Display for TriggerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TriggerKind::Startup => "startup",
            TriggerKind::Daily => "daily",
            TriggerKind::Manual => "manual",
        })
    }
}

/// Fires the job once at startup and then daily at a fixed wall-clock time.
/// Both triggers share the job's run guard.
#[derive(Clone)]
pub struct ExpiryTrigger {
    job: Arc<ExpiryNotificationJob>,
    schedule: TriggerSchedule,
    zone: CalendarZone,
    clock: Arc<dyn Clock>,
}

impl fmt::Debug for ExpiryTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExpiryTrigger")
            .field("schedule", &self.schedule)
            .field("zone", &self.zone)
            .field("job", &self.job)
            .finish_non_exhaustive()
    }
}

impl ExpiryTrigger {
    pub fn new(
        job: Arc<ExpiryNotificationJob>,
        schedule: TriggerSchedule,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let zone = job.config().zone;
        Self {
            job,
            schedule,
            zone,
            clock,
        }
    }

    /// Start the triggers. The returned handle completes once `shutdown` is
    /// cancelled; a run already in flight is left to finish on its own.
    pub fn spawn(self, shutdown: CancellationToken) -> JoinHandle<()> {
        if self.schedule.run_on_startup {
            let startup = self.clone();
            tokio::spawn(async move {
                startup.fire(TriggerKind::Startup).await;
            });
        }
        tokio::spawn(self.daily_loop(shutdown))
    }

    /// Run the job on its own task so a panic inside a run is contained
    /// and reported.
    pub async fn fire(&self, kind: TriggerKind) -> Option<RunOutcome> {
        info!(trigger = %kind, "Expiry run triggered");
        let job = Arc::clone(&self.job);
        match tokio::spawn(async move { job.run().await }).await {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                error!(trigger = %kind, error = %e, "Expiry run aborted");
                None
            }
        }
    }

    async fn daily_loop(self, shutdown: CancellationToken) {
        let mut last_slot: Option<DateTime<Utc>> = None;
        loop {
            let now = self.clock.now();
            // A slot that already fired never fires again, even when the
            // clock lags behind the timer.
            let from = last_slot.map_or(now, |slot| slot.max(now));
            let next = self.zone.next_daily(from, self.schedule.daily_at);
            let wait = (next - now).to_std().unwrap_or(Duration::ZERO);
            info!(next_run = %next, "Next daily expiry run scheduled");

            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("Expiry trigger stopped");
                    return;
                }
                _ = tokio::time::sleep_until(Instant::now() + wait) => {}
            }

            last_slot = Some(next);
            self.fire(TriggerKind::Daily).await;
        }
    }
}
