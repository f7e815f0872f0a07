//! Repository behaviour against a live PostgreSQL instance.
//! Run with `--features postgres-tests` and `DATABASE_URL` set.

#![cfg(feature = "postgres-tests")]

use anyhow::Result;
use chrono::{Duration, TimeZone, Utc};
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;

use shiftwarden_core::database::{
    AssignmentRepository, DirectoryStore, DocumentQuery, ExpiryScanQuery, NotificationRepository,
    PostgresAssignmentRepository, PostgresDirectoryStore, PostgresNotificationRepository,
};
use shiftwarden_core::directory::{DirectorySettings, RecipientDirectory};
use shiftwarden_core::types::{
    AssignmentId, IdentityId, NewNotification, NotificationFilter, NotificationKind,
    NotificationMetadata, window_iso,
};

async fn seed_assignment(
    pool: &PgPool,
    id: AssignmentId,
    subject: Option<IdentityId>,
    ends_at: chrono::DateTime<Utc>,
    state: &str,
) -> Result<()> {
    sqlx::query(
        "INSERT INTO shift_assignments (id, subject_id, starts_at, ends_at, state) VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(id.as_uuid())
    .bind(subject.map(|s| s.as_uuid()))
    .bind(ends_at - Duration::days(30))
    .bind(ends_at)
    .bind(state)
    .execute(pool)
    .await?;
    Ok(())
}

async fn seed_document(
    pool: &PgPool,
    collection: &str,
    id: &str,
    body: serde_json::Value,
) -> Result<()> {
    sqlx::query("INSERT INTO directory_documents (collection, id, body) VALUES ($1, $2, $3)")
        .bind(collection)
        .bind(id)
        .bind(body)
        .execute(pool)
        .await?;
    Ok(())
}

#[sqlx::test(migrator = "shiftwarden_core::MIGRATOR")]
async fn expiring_scan_filters_and_orders(pool: PgPool) -> Result<()> {
    let repo = PostgresAssignmentRepository::new(pool.clone());
    let base = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();

    let late = AssignmentId::new();
    let early = AssignmentId::new();
    seed_assignment(&pool, late, Some(IdentityId::new()), base + Duration::days(5), "approved").await?;
    seed_assignment(&pool, early, None, base + Duration::days(2), "Pending").await?;
    seed_assignment(&pool, AssignmentId::new(), Some(IdentityId::new()), base + Duration::days(3), "cancelled").await?;
    seed_assignment(&pool, AssignmentId::new(), Some(IdentityId::new()), base + Duration::days(20), "approved").await?;

    let found = repo
        .find_expiring(&ExpiryScanQuery {
            ends_from: base,
            ends_until: base + Duration::days(8),
        })
        .await?;

    let ids: Vec<_> = found.iter().map(|a| a.id).collect();
    assert_eq!(ids, vec![early, late]);
    assert!(found[0].subject_id.is_none());
    Ok(())
}

#[sqlx::test(migrator = "shiftwarden_core::MIGRATOR")]
async fn notification_duplicates_match_window_and_day(pool: PgPool) -> Result<()> {
    let repo = PostgresNotificationRepository::new(pool);
    let now = Utc.with_ymd_and_hms(2025, 1, 1, 9, 0, 0).unwrap();
    let recipient = IdentityId::new();
    let assignment = AssignmentId::new();

    let created = repo
        .create(NewNotification {
            recipient_id: recipient,
            kind: NotificationKind::Oversight,
            message: "Shift ends soon".into(),
            metadata: NotificationMetadata {
                assignment_id: assignment,
                subject_id: IdentityId::new(),
                shift_start_date: None,
                shift_end_date: window_iso(Some(now + Duration::days(4))),
            },
            created_at: now,
        })
        .await?;
    assert_eq!(created.recipient_id, recipient);
    assert_eq!(created.kind, NotificationKind::Oversight);

    let mut filter = NotificationFilter {
        recipient_id: recipient,
        assignment_id: assignment,
        kind: NotificationKind::Oversight,
        window_start: None,
        window_end: window_iso(Some(now + Duration::days(4))),
        created_from: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
        created_until: Utc.with_ymd_and_hms(2025, 1, 1, 23, 59, 59).unwrap(),
    };
    assert!(repo.exists_matching(&filter).await?);

    filter.window_start = Some("2024-12-01T00:00:00.000Z".into());
    assert!(!repo.exists_matching(&filter).await?);

    filter.window_start = None;
    filter.kind = NotificationKind::Subject;
    assert!(!repo.exists_matching(&filter).await?);

    filter.kind = NotificationKind::Oversight;
    filter.created_from += Duration::days(1);
    filter.created_until += Duration::days(1);
    assert!(!repo.exists_matching(&filter).await?);
    Ok(())
}

#[sqlx::test(migrator = "shiftwarden_core::MIGRATOR")]
async fn directory_queries_filter_project_and_list(pool: PgPool) -> Result<()> {
    let store = PostgresDirectoryStore::new(pool.clone());
    let hr = IdentityId::new().to_string();
    seed_document(&pool, "profiles", &hr, json!({ "role": "HR", "status": "active", "email": "hr@example.com" })).await?;
    seed_document(&pool, "profiles", "p2", json!({ "role": "nurse", "status": "active" })).await?;
    seed_document(&pool, "profiles", "p3", json!({ "name": "no role" })).await?;
    seed_document(&pool, "role_assignments", "r1", json!({ "role": "hr" })).await?;

    assert_eq!(store.collections().await?, vec!["profiles", "role_assignments"]);
    assert_eq!(store.count("profiles").await?, 3);

    let with_role = store
        .find(
            &DocumentQuery::new("profiles")
                .exists("role")
                .equals("status", "active")
                .project(["role"]),
        )
        .await?;
    assert_eq!(with_role.len(), 2);
    assert!(with_role.iter().all(|d| d.body.len() == 1));

    let limited = store
        .find(&DocumentQuery::new("profiles").limit(1))
        .await?;
    assert_eq!(limited.len(), 1);

    let one = store.find_one("profiles", &hr).await?.expect("profile");
    assert_eq!(one.str_field("email"), Some("hr@example.com"));
    assert!(store.find_one("profiles", "missing").await?.is_none());

    let roles = store.distinct("profiles", "role").await?;
    assert_eq!(roles.len(), 2);
    Ok(())
}

#[sqlx::test(migrator = "shiftwarden_core::MIGRATOR")]
async fn label_filter_applies_before_the_limit(pool: PgPool) -> Result<()> {
    let store = PostgresDirectoryStore::new(pool.clone());
    seed_document(&pool, "profiles", "a1", json!({ "role": "nurse", "status": "active" })).await?;
    seed_document(&pool, "profiles", "a2", json!({ "role": "nurse", "status": "active" })).await?;
    seed_document(&pool, "profiles", "z1", json!({ "roleName": [" HR_Manager ", 3], "status": "active" })).await?;
    seed_document(&pool, "profiles", "z2", json!({ "role": { "name": "hr" } })).await?;

    let found = store
        .find(
            &DocumentQuery::new("profiles")
                .any_label(["role", "roleName"], ["hr", "hrmanager"])
                .limit(1),
        )
        .await?;

    let ids: Vec<_> = found.iter().map(|d| d.id.as_str()).collect();
    assert_eq!(ids, vec!["z1"]);
    Ok(())
}

#[sqlx::test(migrator = "shiftwarden_core::MIGRATOR")]
async fn non_object_bodies_do_not_break_discovery(pool: PgPool) -> Result<()> {
    let store = PostgresDirectoryStore::new(pool.clone());
    let hr = IdentityId::new();
    let broken = IdentityId::new().to_string();
    seed_document(&pool, "profiles", &hr.to_string(), json!({ "role": "HR", "status": "active" })).await?;
    seed_document(&pool, "profiles", &broken, json!(["role", "HR"])).await?;
    seed_document(&pool, "profiles", "scalar", json!("hr")).await?;

    let resolved = RecipientDirectory::new(
        Arc::new(store.clone()),
        Arc::new(DirectorySettings::default()),
    )
    .discover()
    .await;
    let ids: Vec<_> = resolved.iter().map(|r| r.identity).collect();
    assert_eq!(ids, vec![hr]);

    let all = store.find(&DocumentQuery::new("profiles").exists("role")).await?;
    assert_eq!(all.len(), 1);

    let existing = store.find_one("profiles", &broken).await?.expect("identity row");
    assert!(existing.body.is_empty());
    assert_eq!(store.distinct("profiles", "role").await?, vec![json!("HR")]);
    Ok(())
}
