//! The expiring-assignment notification job.
//!
//! A run takes the [`RunGuard`], scans assignments ending within the lead
//! window, resolves oversight recipients once, and then handles each
//! assignment in order under its own lock: subject and recipient existence
//! checks, then one oversight notice per recipient and one notice to the
//! subject, each suppressed if already sent today.

pub mod config;
pub mod emitter;
pub mod existence;
pub mod guard;
pub mod job;
pub mod locks;
pub mod messages;
pub mod scan;
pub mod stats;
pub mod trigger;

pub use config::{DEFAULT_LEAD_DAYS, ExpiryJobConfig, MAX_LEAD_DAYS, TriggerSchedule};
pub use emitter::{Emission, NotificationEmitter};
pub use existence::ExistenceCache;
pub use guard::{RunGuard, RunPermit};
pub use job::{ExpiryNotificationJob, JobDependencies};
pub use locks::{AssignmentLock, AssignmentLocks};
pub use scan::{ExpiryScanner, scan_window};
pub use stats::{RunOutcome, RunSummary, SkipReason};
pub use trigger::{ExpiryTrigger, TriggerKind};
