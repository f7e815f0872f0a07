use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::json;

use shiftwarden_core::database::{
    AssignmentRepository, DirectoryStore, InMemoryAssignmentRepository, InMemoryDirectory,
    InMemoryNotificationRepository, NotificationRepository,
};
use shiftwarden_core::directory::{
    DEFAULT_PROFILE_COLLECTION, DEFAULT_ROLE_ASSIGNMENT_COLLECTION, DirectorySettings,
};
use shiftwarden_core::expiry::{ExpiryJobConfig, ExpiryNotificationJob, JobDependencies};
use shiftwarden_core::time::{CalendarZone, FixedClock};
use shiftwarden_core::types::{Assignment, AssignmentId, AssignmentState, IdentityId};

/// 2025-01-01 09:00 UTC, the "today" of most scenarios.
pub fn today() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 1, 9, 0, 0).unwrap()
}

pub fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
}

pub fn assignment(subject: Option<IdentityId>, ends_at: DateTime<Utc>, state: &str) -> Assignment {
    Assignment {
        id: AssignmentId::new(),
        subject_id: subject,
        starts_at: Some(ends_at - Duration::days(30)),
        ends_at: Some(ends_at),
        state: AssignmentState::from(state),
    }
}

/// In-memory stores, a pinned clock and a UTC calendar.
pub struct JobHarness {
    pub assignments: Arc<InMemoryAssignmentRepository>,
    pub notifications: Arc<InMemoryNotificationRepository>,
    pub directory: Arc<InMemoryDirectory>,
    pub clock: FixedClock,
    pub config: ExpiryJobConfig,
}

impl JobHarness {
    pub fn new() -> Self {
        Self {
            assignments: Arc::new(InMemoryAssignmentRepository::new()),
            notifications: Arc::new(InMemoryNotificationRepository::new()),
            directory: Arc::new(InMemoryDirectory::new()),
            clock: FixedClock::new(today()),
            config: ExpiryJobConfig::new(7, CalendarZone::utc()).unwrap(),
        }
    }

    pub fn job(&self) -> ExpiryNotificationJob {
        self.job_with(
            self.assignments.clone(),
            self.notifications.clone(),
            Some(self.directory.clone()),
        )
    }

    pub fn job_with(
        &self,
        assignments: Arc<dyn AssignmentRepository>,
        notifications: Arc<dyn NotificationRepository>,
        directory: Option<Arc<dyn DirectoryStore>>,
    ) -> ExpiryNotificationJob {
        ExpiryNotificationJob::new(
            JobDependencies {
                assignments,
                notifications,
                directory,
                directory_settings: Arc::new(DirectorySettings::default()),
                clock: Arc::new(self.clock.clone()),
            },
            self.config,
        )
    }

    /// A plain profile: the identity exists but holds no oversight role.
    pub async fn person(&self) -> IdentityId {
        let id = IdentityId::new();
        self.profile(id, json!({ "role": "nurse", "status": "active" }))
            .await;
        id
    }

    /// An active HR profile.
    pub async fn hr(&self) -> IdentityId {
        let id = IdentityId::new();
        self.profile(id, json!({ "role": "HR", "status": "active", "email": format!("{id}@example.com") }))
            .await;
        id
    }

    pub async fn profile(&self, id: IdentityId, body: serde_json::Value) {
        self.directory
            .insert_json(DEFAULT_PROFILE_COLLECTION, &id.to_string(), body)
            .await
            .unwrap();
    }

    /// Grant HR through the role-assignment collection only.
    pub async fn role_assignment(&self, profile: IdentityId) {
        self.directory
            .insert_json(
                DEFAULT_ROLE_ASSIGNMENT_COLLECTION,
                &IdentityId::new().to_string(),
                json!({ "role": "hr", "profileId": profile.to_string() }),
            )
            .await
            .unwrap();
    }

    pub async fn add(&self, assignment: Assignment) -> Assignment {
        self.assignments.insert(assignment.clone()).await;
        assignment
    }
}
