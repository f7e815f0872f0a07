use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, error, info, instrument, warn};

use super::config::ExpiryJobConfig;
use super::emitter::{Emission, NotificationEmitter};
use super::existence::ExistenceCache;
use super::guard::RunGuard;
use super::locks::AssignmentLocks;
use super::messages;
use super::scan::ExpiryScanner;
use super::stats::{RunOutcome, RunSummary, SkipReason};
use crate::database::ports::assignments::AssignmentRepository;
use crate::database::ports::directory::DirectoryStore;
use crate::database::ports::notifications::NotificationRepository;
use crate::directory::{DirectorySettings, RecipientDirectory};
use crate::error::Result;
use crate::time::Clock;
use crate::types::{
    Assignment, IdentityId, NewNotification, NotificationKind, NotificationMetadata,
    OversightRecipient, window_iso,
};

/// Everything the job reads from or writes to.
pub struct JobDependencies {
    pub assignments: Arc<dyn AssignmentRepository>,
    pub notifications: Arc<dyn NotificationRepository>,
    /// `None` when the process has no directory connection.
    pub directory: Option<Arc<dyn DirectoryStore>>,
    pub directory_settings: Arc<DirectorySettings>,
    pub clock: Arc<dyn Clock>,
}

impl fmt::Debug for JobDependencies {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JobDependencies")
            .field("directory_connected", &self.directory.is_some())
            .field("directory_settings", &self.directory_settings)
            .finish_non_exhaustive()
    }
}

/// Coordinator for expiry runs. Owns the run guard, the assignment locks and
/// the existence cache; share it behind an `Arc` between triggers.
pub struct ExpiryNotificationJob {
    scanner: ExpiryScanner,
    recipients: RecipientDirectory,
    emitter: NotificationEmitter,
    existence: ExistenceCache,
    locks: AssignmentLocks,
    guard: RunGuard,
    clock: Arc<dyn Clock>,
    config: ExpiryJobConfig,
}

impl fmt::Debug for ExpiryNotificationJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExpiryNotificationJob")
            .field("config", &self.config)
            .field("recipients", &self.recipients)
            .field("existence", &self.existence)
            .field("locks", &self.locks)
            .field("guard", &self.guard)
            .finish_non_exhaustive()
    }
}

impl ExpiryNotificationJob {
    pub fn new(deps: JobDependencies, config: ExpiryJobConfig) -> Self {
        let recipients = match &deps.directory {
            Some(store) => RecipientDirectory::new(store.clone(), deps.directory_settings.clone()),
            None => RecipientDirectory::unavailable(),
        };
        let existence = ExistenceCache::new(
            deps.directory.clone(),
            deps.directory_settings.profile_collection.clone(),
        );

        Self {
            scanner: ExpiryScanner::new(deps.assignments),
            recipients,
            emitter: NotificationEmitter::new(deps.notifications, config.zone),
            existence,
            locks: AssignmentLocks::new(),
            guard: RunGuard::new(),
            clock: deps.clock,
            config,
        }
    }

    /// Replace the recipient discovery strategies.
    pub fn with_recipient_directory(mut self, recipients: RecipientDirectory) -> Self {
        self.recipients = recipients;
        self
    }

    pub fn config(&self) -> &ExpiryJobConfig {
        &self.config
    }

    pub fn run_guard(&self) -> &RunGuard {
        &self.guard
    }

    pub fn locks(&self) -> &AssignmentLocks {
        &self.locks
    }

    /// Execute one scan-and-notify pass. Never returns an error: failures are
    /// logged and counted in the summary.
    #[instrument(skip(self), fields(lead_days = self.config.lead_days, zone = %self.config.zone))]
    pub async fn run(&self) -> RunOutcome {
        let Some(_permit) = self.guard.try_acquire() else {
            warn!("Expiry run already in progress; skipping this trigger");
            return RunOutcome::AlreadyRunning;
        };

        let summary = match self.execute().await {
            Ok(summary) => summary,
            Err(e) => {
                error!(error = %e, "Expiry run failed");
                let mut summary = RunSummary::default();
                summary.record_error();
                summary
            }
        };

        info!(
            scanned = summary.scanned,
            recipients = summary.recipients,
            created = summary.created,
            skipped = summary.skipped,
            errored = summary.errored,
            skip_reasons = ?summary.skip_reasons,
            "Expiry run complete"
        );

        RunOutcome::Completed(summary)
    }

    async fn execute(&self) -> Result<RunSummary> {
        self.existence.clear();
        let now = self.clock.now();

        let assignments = self.scanner.scan(now, &self.config).await?;
        let mut summary = RunSummary {
            scanned: assignments.len(),
            ..Default::default()
        };

        if assignments.is_empty() {
            debug!("No assignments nearing expiry");
            return Ok(summary);
        }

        let recipients = self.recipients.discover().await;
        summary.recipients = recipients.len();

        for assignment in &assignments {
            self.process(assignment, &recipients, now, &mut summary).await;
        }

        Ok(summary)
    }

    #[instrument(skip_all, fields(assignment_id = %assignment.id))]
    async fn process(
        &self,
        assignment: &Assignment,
        recipients: &[OversightRecipient],
        now: DateTime<Utc>,
        summary: &mut RunSummary,
    ) {
        let Some(_lock) = self.locks.acquire(assignment.id) else {
            warn!(reason = %SkipReason::Locked, "Skipping assignment");
            summary.record_skip(SkipReason::Locked);
            return;
        };

        if let Err(e) = self.notify(assignment, recipients, now, summary).await {
            error!(error = %e, "Failed to process assignment");
            summary.record_error();
        }
    }

    async fn notify(
        &self,
        assignment: &Assignment,
        recipients: &[OversightRecipient],
        now: DateTime<Utc>,
        summary: &mut RunSummary,
    ) -> Result<()> {
        let (Some(subject), Some(ends_at)) = (assignment.subject_id, assignment.ends_at) else {
            warn!(reason = %SkipReason::MissingFields, "Skipping assignment");
            summary.record_skip(SkipReason::MissingFields);
            return Ok(());
        };

        if ends_at < now {
            warn!(reason = %SkipReason::AlreadyExpired, ends_at = %ends_at, "Skipping assignment");
            summary.record_skip(SkipReason::AlreadyExpired);
            return Ok(());
        }

        if !self.existence.exists(subject).await? {
            warn!(reason = %SkipReason::SubjectNotFound, subject_id = %subject, "Skipping assignment");
            summary.record_skip(SkipReason::SubjectNotFound);
            return Ok(());
        }

        let metadata = NotificationMetadata {
            assignment_id: assignment.id,
            subject_id: subject,
            shift_start_date: window_iso(assignment.starts_at),
            shift_end_date: window_iso(Some(ends_at)),
        };
        let zone = self.config.zone;

        for recipient in recipients {
            if recipient.identity == subject {
                debug!(recipient_id = %recipient.identity, "Subject holds an oversight role; not notifying as oversight");
                continue;
            }
            if !self.existence.exists(recipient.identity).await? {
                warn!(
                    reason = %SkipReason::RecipientNotFound,
                    recipient_id = %recipient.identity,
                    "Skipping oversight notification"
                );
                summary.record_skip(SkipReason::RecipientNotFound);
                continue;
            }

            let candidate = NewNotification {
                recipient_id: recipient.identity,
                kind: NotificationKind::Oversight,
                message: messages::oversight_message(assignment.id, subject, ends_at, now, zone),
                metadata: metadata.clone(),
                created_at: now,
            };
            self.deliver(candidate, now, summary).await?;
        }

        let candidate = NewNotification {
            recipient_id: subject,
            kind: NotificationKind::Subject,
            message: messages::subject_message(ends_at, now, zone),
            metadata,
            created_at: now,
        };
        self.deliver(candidate, now, summary).await
    }

    async fn deliver(
        &self,
        candidate: NewNotification,
        now: DateTime<Utc>,
        summary: &mut RunSummary,
    ) -> Result<()> {
        let recipient: IdentityId = candidate.recipient_id;
        let kind = candidate.kind;

        match self.emitter.emit(candidate, now).await? {
            Emission::Created(record) => {
                debug!(
                    notification_id = %record.id,
                    recipient_id = %recipient,
                    kind = %kind,
                    "Notification created"
                );
                summary.record_created();
            }
            Emission::Duplicate => {
                warn!(
                    reason = %SkipReason::DuplicateToday,
                    recipient_id = %recipient,
                    kind = %kind,
                    "Skipping notification"
                );
                summary.record_skip(SkipReason::DuplicateToday);
            }
        }
        Ok(())
    }
}
