mod support;

use std::sync::Arc;

use anyhow::Result;
use chrono::Duration;

use shiftwarden_core::NotifyError;
use shiftwarden_core::expiry::{RunOutcome, RunSummary, SkipReason};
use shiftwarden_core::types::{NotificationId, NotificationKind};

use support::harness::{JobHarness, assignment, at, today};
use support::mocks::{MockAssignments, MockDirectory, MockNotifications};

fn completed(outcome: RunOutcome) -> RunSummary {
    match outcome {
        RunOutcome::Completed(summary) => summary,
        RunOutcome::AlreadyRunning => panic!("run unexpectedly skipped"),
    }
}

#[tokio::test]
async fn notifies_oversight_and_subject_for_expiring_assignment() -> Result<()> {
    let h = JobHarness::new();
    let h1 = h.hr().await;
    let h2 = h.hr().await;
    let s1 = h.person().await;
    let a1 = h.add(assignment(Some(s1), at(2025, 1, 5, 17), "approved")).await;

    let summary = completed(h.job().run().await);
    assert_eq!(summary.created, 3);
    assert_eq!(summary.skipped, 0);
    assert_eq!(summary.errored, 0);
    assert_eq!(summary.recipients, 2);

    let records = h.notifications.records().await;
    let mut oversight: Vec<_> = records
        .iter()
        .filter(|r| r.kind == NotificationKind::Oversight)
        .map(|r| r.recipient_id)
        .collect();
    oversight.sort();
    let mut expected = vec![h1, h2];
    expected.sort();
    assert_eq!(oversight, expected);

    let subject: Vec<_> = records
        .iter()
        .filter(|r| r.kind == NotificationKind::Subject)
        .collect();
    assert_eq!(subject.len(), 1);
    assert_eq!(subject[0].recipient_id, s1);
    assert_eq!(subject[0].metadata.assignment_id, a1.id);
    assert_eq!(subject[0].metadata.subject_id, s1);
    assert_eq!(
        subject[0].metadata.shift_end_date.as_deref(),
        Some("2025-01-05T17:00:00.000Z")
    );
    assert!(subject[0].message.contains("4 days remaining"));
    assert!(records.iter().all(|r| r.created_at == today()));
    Ok(())
}

#[tokio::test]
async fn rerun_on_the_same_day_creates_nothing() -> Result<()> {
    let h = JobHarness::new();
    h.hr().await;
    h.hr().await;
    let s1 = h.person().await;
    h.add(assignment(Some(s1), at(2025, 1, 5, 17), "approved")).await;

    let job = h.job();
    completed(job.run().await);

    h.clock.advance(Duration::hours(10));
    let summary = completed(job.run().await);
    assert_eq!(summary.created, 0);
    assert_eq!(summary.skipped, 3);
    assert_eq!(summary.skipped_for(SkipReason::DuplicateToday), 3);
    assert_eq!(h.notifications.len().await, 3);
    Ok(())
}

#[tokio::test]
async fn rerun_on_the_next_day_notifies_again() -> Result<()> {
    let h = JobHarness::new();
    h.hr().await;
    let s1 = h.person().await;
    h.add(assignment(Some(s1), at(2025, 1, 5, 17), "pending")).await;

    let job = h.job();
    assert_eq!(completed(job.run().await).created, 2);

    h.clock.advance(Duration::days(1));
    let summary = completed(job.run().await);
    assert_eq!(summary.created, 2);
    assert_eq!(summary.skipped, 0);
    assert_eq!(h.notifications.len().await, 4);
    Ok(())
}

#[tokio::test]
async fn recipient_missing_from_profiles_is_skipped() -> Result<()> {
    let h = JobHarness::new();
    // Both HR grants live only in the role-assignment collection; H1 has
    // no profile of its own.
    let h1 = shiftwarden_core::types::IdentityId::new();
    let h2 = h.person().await;
    h.role_assignment(h1).await;
    h.role_assignment(h2).await;
    let s1 = h.person().await;
    h.add(assignment(Some(s1), at(2025, 1, 5, 17), "approved")).await;

    let summary = completed(h.job().run().await);
    assert_eq!(summary.created, 2);
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.skipped_for(SkipReason::RecipientNotFound), 1);

    let recipients: Vec<_> = h
        .notifications
        .records()
        .await
        .into_iter()
        .map(|r| r.recipient_id)
        .collect();
    assert!(recipients.contains(&h2));
    assert!(recipients.contains(&s1));
    assert!(!recipients.contains(&h1));
    Ok(())
}

#[tokio::test]
async fn subject_holding_oversight_role_gets_only_the_subject_notice() -> Result<()> {
    let h = JobHarness::new();
    let h1 = h.hr().await;
    let s1 = h.hr().await;
    h.add(assignment(Some(s1), at(2025, 1, 3, 12), "approved")).await;

    let summary = completed(h.job().run().await);
    assert_eq!(summary.created, 2);
    assert_eq!(summary.skipped, 0);

    let to_subject: Vec<_> = h
        .notifications
        .records()
        .await
        .into_iter()
        .filter(|r| r.recipient_id == s1)
        .collect();
    assert_eq!(to_subject.len(), 1);
    assert_eq!(to_subject[0].kind, NotificationKind::Subject);

    let to_h1 = h
        .notifications
        .records()
        .await
        .into_iter()
        .filter(|r| r.recipient_id == h1)
        .count();
    assert_eq!(to_h1, 1);
    Ok(())
}

#[tokio::test]
async fn assignment_without_subject_is_skipped_as_missing_fields() -> Result<()> {
    let h = JobHarness::new();
    h.hr().await;
    h.add(assignment(None, at(2025, 1, 4, 8), "approved")).await;

    let summary = completed(h.job().run().await);
    assert_eq!(summary.created, 0);
    assert_eq!(summary.skipped_for(SkipReason::MissingFields), 1);
    assert!(h.notifications.is_empty().await);
    Ok(())
}

#[tokio::test]
async fn unknown_subject_blocks_every_notice_for_the_assignment() -> Result<()> {
    let h = JobHarness::new();
    h.hr().await;
    h.hr().await;
    let ghost = shiftwarden_core::types::IdentityId::new();
    h.add(assignment(Some(ghost), at(2025, 1, 4, 8), "approved")).await;

    let summary = completed(h.job().run().await);
    assert_eq!(summary.created, 0);
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.skipped_for(SkipReason::SubjectNotFound), 1);
    assert!(h.notifications.is_empty().await);
    Ok(())
}

#[tokio::test]
async fn ineligible_state_and_out_of_window_assignments_are_ignored() -> Result<()> {
    let h = JobHarness::new();
    h.hr().await;
    let s1 = h.person().await;
    h.add(assignment(Some(s1), at(2025, 1, 4, 8), "cancelled")).await;
    h.add(assignment(Some(s1), at(2025, 1, 9, 0), "approved")).await;
    h.add(assignment(Some(s1), at(2024, 12, 31, 23), "approved")).await;
    // Earlier today, before the run started.
    h.add(assignment(Some(s1), at(2025, 1, 1, 8), "pending")).await;

    let summary = completed(h.job().run().await);
    assert_eq!(summary.scanned, 0);
    assert_eq!(summary.created, 0);
    assert!(h.notifications.is_empty().await);
    Ok(())
}

#[tokio::test]
async fn window_includes_the_whole_horizon_day() -> Result<()> {
    let h = JobHarness::new();
    let s1 = h.person().await;
    h.add(assignment(Some(s1), at(2025, 1, 8, 23), "approved")).await;

    let summary = completed(h.job().run().await);
    assert_eq!(summary.scanned, 1);
    assert_eq!(summary.created, 1);
    Ok(())
}

#[tokio::test]
async fn without_recipients_only_subjects_are_notified() -> Result<()> {
    let h = JobHarness::new();
    let s1 = h.person().await;
    let s2 = h.person().await;
    h.add(assignment(Some(s1), at(2025, 1, 2, 8), "approved")).await;
    h.add(assignment(Some(s2), at(2025, 1, 3, 8), "pending")).await;

    let summary = completed(h.job().run().await);
    assert_eq!(summary.recipients, 0);
    assert_eq!(summary.created, 2);
    assert!(
        h.notifications
            .records()
            .await
            .iter()
            .all(|r| r.kind == NotificationKind::Subject)
    );
    Ok(())
}

#[tokio::test]
async fn assignment_already_locked_is_skipped() -> Result<()> {
    let h = JobHarness::new();
    let s1 = h.person().await;
    let a1 = h.add(assignment(Some(s1), at(2025, 1, 2, 8), "approved")).await;

    let job = h.job();
    let held = job.locks().acquire(a1.id).expect("lock");
    let summary = completed(job.run().await);
    assert_eq!(summary.skipped_for(SkipReason::Locked), 1);
    assert_eq!(summary.created, 0);

    drop(held);
    assert_eq!(completed(job.run().await).created, 1);
    Ok(())
}

#[tokio::test]
async fn run_while_another_is_active_touches_no_store() -> Result<()> {
    let h = JobHarness::new();
    // Mocks without expectations panic on any call.
    let job = h.job_with(
        Arc::new(MockAssignments::new()),
        Arc::new(MockNotifications::new()),
        Some(Arc::new(MockDirectory::new())),
    );

    let _permit = job.run_guard().try_acquire().expect("guard free");
    assert_eq!(job.run().await, RunOutcome::AlreadyRunning);
    Ok(())
}

#[tokio::test]
async fn empty_scan_never_queries_the_directory() -> Result<()> {
    let h = JobHarness::new();
    let mut assignments = MockAssignments::new();
    assignments
        .expect_find_expiring()
        .times(1)
        .returning(|_| Ok(Vec::new()));

    let job = h.job_with(
        Arc::new(assignments),
        Arc::new(MockNotifications::new()),
        Some(Arc::new(MockDirectory::new())),
    );

    let summary = completed(job.run().await);
    assert_eq!(summary, RunSummary::default());
    assert!(!job.run_guard().is_active());
    Ok(())
}

#[tokio::test]
async fn failing_assignment_does_not_stop_the_run() -> Result<()> {
    let h = JobHarness::new();
    let s1 = h.person().await;
    let s2 = h.person().await;
    h.add(assignment(Some(s1), at(2025, 1, 2, 8), "approved")).await;
    h.add(assignment(Some(s2), at(2025, 1, 3, 8), "approved")).await;

    let mut notifications = MockNotifications::new();
    notifications
        .expect_exists_matching()
        .returning(|_| Ok(false));
    notifications.expect_create().times(2).returning(move |n| {
        if n.recipient_id == s1 {
            Err(NotifyError::Database("insert rejected".into()))
        } else {
            Ok(n.into_record(NotificationId::new()))
        }
    });

    let job = h.job_with(
        h.assignments.clone(),
        Arc::new(notifications),
        Some(h.directory.clone()),
    );

    let summary = completed(job.run().await);
    assert_eq!(summary.errored, 1);
    assert_eq!(summary.created, 1);
    assert!(job.locks().is_empty());
    assert!(!job.run_guard().is_active());
    Ok(())
}

#[tokio::test]
async fn scan_failure_is_counted_not_raised() -> Result<()> {
    let h = JobHarness::new();
    let mut assignments = MockAssignments::new();
    assignments
        .expect_find_expiring()
        .returning(|_| Err(NotifyError::Database("relation missing".into())));

    let job = h.job_with(
        Arc::new(assignments),
        Arc::new(MockNotifications::new()),
        None,
    );

    let summary = completed(job.run().await);
    assert_eq!(summary.errored, 1);
    assert!(!job.run_guard().is_active());
    Ok(())
}

#[tokio::test]
async fn unreachable_directory_fails_closed() -> Result<()> {
    let h = JobHarness::new();
    let s1 = shiftwarden_core::types::IdentityId::new();
    h.add(assignment(Some(s1), at(2025, 1, 2, 8), "approved")).await;

    let mut directory = MockDirectory::new();
    directory
        .expect_find()
        .returning(|_| Err(NotifyError::Unavailable("connection refused".into())));
    directory
        .expect_find_one()
        .returning(|_, _| Err(NotifyError::Unavailable("connection refused".into())));

    let job = h.job_with(
        h.assignments.clone(),
        h.notifications.clone(),
        Some(Arc::new(directory)),
    );

    let summary = completed(job.run().await);
    assert_eq!(summary.recipients, 0);
    assert_eq!(summary.errored, 0);
    assert_eq!(summary.skipped_for(SkipReason::SubjectNotFound), 1);
    assert!(h.notifications.is_empty().await);
    Ok(())
}

#[tokio::test]
async fn no_directory_connection_sends_nothing() -> Result<()> {
    let h = JobHarness::new();
    let s1 = h.person().await;
    h.add(assignment(Some(s1), at(2025, 1, 2, 8), "approved")).await;

    let job = h.job_with(h.assignments.clone(), h.notifications.clone(), None);
    let summary = completed(job.run().await);
    assert_eq!(summary.skipped_for(SkipReason::SubjectNotFound), 1);
    assert!(h.notifications.is_empty().await);
    Ok(())
}

#[tokio::test]
async fn profile_removed_between_runs_is_rechecked() -> Result<()> {
    let h = JobHarness::new();
    let s1 = h.person().await;
    h.add(assignment(Some(s1), at(2025, 1, 3, 8), "approved")).await;

    let job = h.job();
    assert_eq!(completed(job.run().await).created, 1);

    h.directory
        .remove(
            shiftwarden_core::directory::DEFAULT_PROFILE_COLLECTION,
            &s1.to_string(),
        )
        .await;
    h.clock.advance(Duration::days(1));

    let summary = completed(job.run().await);
    assert_eq!(summary.created, 0);
    assert_eq!(summary.skipped_for(SkipReason::SubjectNotFound), 1);
    Ok(())
}
