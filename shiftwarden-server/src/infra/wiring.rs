use std::sync::Arc;

use anyhow::Context;
use shiftwarden_config::Config;
use shiftwarden_core::database::{
    AssignmentRepository, DirectoryStore, InMemoryNotificationRepository, NotificationRepository,
    PostgresAssignmentRepository, PostgresDirectoryStore, PostgresNotificationRepository,
};
use shiftwarden_core::directory::{DirectorySettings, RoleLabels};
use shiftwarden_core::expiry::{
    ExpiryJobConfig, ExpiryNotificationJob, JobDependencies, TriggerSchedule,
};
use shiftwarden_core::time::{CalendarZone, Clock};
use sqlx::PgPool;
use tracing::{info, warn};

use super::database;

/// Storage handles the job runs against.
pub struct Stores {
    pub assignments: Arc<dyn AssignmentRepository>,
    pub notifications: Arc<dyn NotificationRepository>,
    pub directory: Option<Arc<dyn DirectoryStore>>,
}

pub fn calendar_zone(config: &Config) -> CalendarZone {
    match config.calendar.utc_offset {
        Some(offset) => CalendarZone::Fixed(offset),
        None => CalendarZone::Local,
    }
}

pub fn job_config(config: &Config) -> anyhow::Result<ExpiryJobConfig> {
    ExpiryJobConfig::new(config.notifications.lead_days, calendar_zone(config))
        .context("invalid expiry job configuration")
}

pub fn directory_settings(config: &Config) -> DirectorySettings {
    let directory = &config.directory;
    DirectorySettings {
        profile_collection: directory.profile_collection.clone(),
        role_assignment_collection: directory.role_assignment_collection.clone(),
        oversight_roles: RoleLabels::new(&directory.oversight_roles),
        active_status: directory.active_status.clone(),
        scan_limit: directory.scan_limit,
    }
}

pub fn trigger_schedule(config: &Config) -> TriggerSchedule {
    TriggerSchedule {
        daily_at: config.schedule.daily_at,
        run_on_startup: config.schedule.run_on_startup,
    }
}

/// Postgres-backed stores on `pool`. A separate directory database that
/// cannot be reached leaves the directory unset; runs then notify subjects
/// only.
pub async fn postgres_stores(config: &Config, pool: PgPool, dry_run: bool) -> Stores {
    let notifications: Arc<dyn NotificationRepository> = if dry_run {
        info!("Dry run: notifications are kept in memory");
        Arc::new(InMemoryNotificationRepository::new())
    } else {
        Arc::new(PostgresNotificationRepository::new(pool.clone()))
    };

    let directory: Option<Arc<dyn DirectoryStore>> = match config.directory.url.as_deref() {
        None => Some(Arc::new(PostgresDirectoryStore::new(pool.clone()))),
        Some(url) => match database::connect(url, config.database.max_connections).await {
            Ok(directory_pool) => Some(Arc::new(PostgresDirectoryStore::new(directory_pool))),
            Err(e) => {
                warn!(error = %format!("{e:#}"), "Directory database unreachable; continuing without oversight recipients");
                None
            }
        },
    };

    Stores {
        assignments: Arc::new(PostgresAssignmentRepository::new(pool)),
        notifications,
        directory,
    }
}

pub fn build_job(
    config: &Config,
    stores: Stores,
    clock: Arc<dyn Clock>,
) -> anyhow::Result<Arc<ExpiryNotificationJob>> {
    let job = ExpiryNotificationJob::new(
        JobDependencies {
            assignments: stores.assignments,
            notifications: stores.notifications,
            directory: stores.directory,
            directory_settings: Arc::new(directory_settings(config)),
            clock,
        },
        job_config(config)?,
    );
    Ok(Arc::new(job))
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::{Duration, FixedOffset, NaiveTime, TimeZone, Utc};
    use serde_json::json;
    use shiftwarden_config::ConfigLoader;
    use shiftwarden_config::models::sources::EnvConfig;
    use shiftwarden_core::database::{InMemoryAssignmentRepository, InMemoryDirectory};
    use shiftwarden_core::expiry::RunOutcome;
    use shiftwarden_core::time::FixedClock;
    use shiftwarden_core::types::{Assignment, AssignmentId, AssignmentState, IdentityId};

    fn config(env: EnvConfig) -> Config {
        ConfigLoader::new()
            .load_with_env(env)
            .expect("config loads")
            .config
    }

    #[test]
    fn config_maps_onto_job_settings() {
        let config = config(EnvConfig {
            lead_days: Some("10".into()),
            utc_offset: Some("-05:00".into()),
            daily_at: Some("07:45".into()),
            run_on_startup: Some(false),
            oversight_roles: Some(vec!["People-Ops".into()]),
            directory_profile_collection: Some("people".into()),
            ..Default::default()
        });

        let job = job_config(&config).unwrap();
        assert_eq!(job.lead_days, 10);
        assert_eq!(
            job.zone,
            CalendarZone::Fixed(FixedOffset::west_opt(5 * 3600).unwrap())
        );

        let settings = directory_settings(&config);
        assert_eq!(settings.profile_collection, "people");
        assert!(settings.oversight_roles.contains("people ops"));
        assert!(!settings.oversight_roles.contains("hr"));

        let schedule = trigger_schedule(&config);
        assert_eq!(schedule.daily_at, NaiveTime::from_hms_opt(7, 45, 0).unwrap());
        assert!(!schedule.run_on_startup);
    }

    #[test]
    fn unset_offset_uses_local_zone() {
        assert_eq!(calendar_zone(&config(EnvConfig::default())), CalendarZone::Local);
    }

    #[tokio::test]
    async fn built_job_runs_against_the_given_stores() {
        let config = config(EnvConfig {
            utc_offset: Some("Z".into()),
            ..Default::default()
        });
        let now = Utc.with_ymd_and_hms(2025, 3, 3, 9, 0, 0).unwrap();

        let assignments = Arc::new(InMemoryAssignmentRepository::new());
        let notifications = Arc::new(InMemoryNotificationRepository::new());
        let directory = Arc::new(InMemoryDirectory::new());

        let subject = IdentityId::new();
        directory
            .insert_json("profiles", &subject.to_string(), json!({ "status": "active" }))
            .await
            .unwrap();
        assignments
            .insert(Assignment {
                id: AssignmentId::new(),
                subject_id: Some(subject),
                starts_at: Some(now - Duration::days(10)),
                ends_at: Some(now + Duration::days(2)),
                state: AssignmentState::Approved,
            })
            .await;

        let job = build_job(
            &config,
            Stores {
                assignments,
                notifications: notifications.clone(),
                directory: Some(directory),
            },
            Arc::new(FixedClock::new(now)),
        )
        .unwrap();

        let RunOutcome::Completed(summary) = job.run().await else {
            panic!("run should complete");
        };
        assert_eq!(summary.created, 1);
        assert_eq!(notifications.len().await, 1);
    }
}
