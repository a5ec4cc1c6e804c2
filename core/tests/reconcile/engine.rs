// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use taskbridge_core::{Action, SnapshotStore, StoreKind, SyncEngine, SyncError, Target};

use crate::common::{BrokenSnapshot, FakeLocal, FakeRemote, engine, seed_snapshot, snapshot, task, ts};

#[tokio::test]
async fn engine_dry_run_changes_nothing() {
    // Arrange
    let local = FakeLocal::new();
    let remote = FakeRemote::new();
    local.add_list("Work");
    local.add_list("Reminders");
    remote.add_calendar("Tasks");
    local.add_item("Work", task("Write report", "2024-04-18T10:00:00Z"));
    remote.add_item("Tasks", task("Buy eggs", "2024-04-18T10:00:00Z"));
    let db = snapshot().await;

    // Act
    let report = engine(&local, &remote, &db, &["Work", "Reminders"])
        .with_dry_run(true)
        .run()
        .await
        .unwrap();

    // Assert
    assert!(report.dry_run);
    assert!(local.calls().is_empty());
    assert!(remote.calls().is_empty());
    assert_eq!(report.count(Action::Create, Target::RemoteCalendar), 1);
    assert_eq!(report.count(Action::Create, Target::RemoteItem), 1);
    assert_eq!(report.count(Action::Create, Target::LocalItem), 1);
    assert!(db.read_containers().await.unwrap().is_empty());
    assert!(db.read_items().await.unwrap().is_empty());
}

#[tokio::test]
async fn engine_dry_run_reports_same_operations_as_real_run() {
    // Arrange
    let local = FakeLocal::new();
    let remote = FakeRemote::new();
    local.add_list("Reminders");
    remote.add_calendar("Tasks");
    local.add_item("Reminders", task("Call mom", "2024-04-18T10:00:00Z"));
    let db = snapshot().await;
    let engine = engine(&local, &remote, &db, &["Reminders"]);

    // Act
    let planned = engine.discover().await.unwrap();
    let dry = SyncEngine::new(local.clone(), remote.clone(), db.clone())
        .with_sync_names(["Reminders"])
        .with_dry_run(true)
        .run()
        .await
        .unwrap();
    let real = engine.run().await.unwrap();

    // Assert
    assert_eq!(planned.local.len(), 1);
    assert_eq!(planned.remote.len(), 1);
    assert_eq!(dry.succeeded.len(), real.succeeded.len());
    for (a, b) in dry.succeeded.iter().zip(&real.succeeded) {
        assert_eq!((a.action, a.target, &a.name), (b.action, b.target, &b.name));
    }
}

#[tokio::test]
async fn engine_discovery_failure_is_fatal() {
    // Arrange
    let local = FakeLocal::new();
    let remote = FakeRemote::new();
    local.add_list("Work");
    local.fail_listing();
    let db = snapshot().await;
    seed_snapshot(&db, ("Work", "Work"), &[]).await;

    // Act
    let err = engine(&local, &remote, &db, &["Work"])
        .run()
        .await
        .unwrap_err();

    // Assert
    assert!(matches!(
        err,
        SyncError::DiscoveryFailed {
            store: StoreKind::Local,
            ..
        }
    ));
    assert!(remote.calls().is_empty());
    assert_eq!(db.read_containers().await.unwrap().len(), 1);
}

#[tokio::test]
async fn engine_remote_listing_failure_is_fatal() {
    // Arrange
    let local = FakeLocal::new();
    let remote = FakeRemote::new();
    local.add_list("Work");
    remote.add_calendar("Work");
    remote.fail_listing();
    let db = snapshot().await;

    // Act
    let err = engine(&local, &remote, &db, &["Work"])
        .run()
        .await
        .unwrap_err();

    // Assert
    assert!(matches!(
        err,
        SyncError::DiscoveryFailed {
            store: StoreKind::Remote,
            ..
        }
    ));
}

#[tokio::test]
async fn engine_persistence_failure_carries_report() {
    // Arrange
    let local = FakeLocal::new();
    let remote = FakeRemote::new();
    local.add_list("Reminders");
    remote.add_calendar("Tasks");
    local.add_item("Reminders", task("Call mom", "2024-04-18T10:00:00Z"));
    let engine = SyncEngine::new(local.clone(), remote.clone(), BrokenSnapshot)
        .with_sync_names(["Reminders"]);

    // Act
    let err = engine.run().await.unwrap_err();

    // Assert
    let SyncError::PersistenceFailed { cause, report } = err else {
        panic!("expected a persistence failure, got {err:?}");
    };
    assert_eq!(cause.to_string(), "disk full");
    assert_eq!(report.count(Action::Create, Target::RemoteItem), 1);
    assert_eq!(remote.items("Tasks").len(), 1);
}

#[tokio::test]
async fn engine_rejects_concurrent_runs() {
    // Arrange
    let mut local = FakeLocal::new();
    let remote = FakeRemote::new();
    let resume = local.pause_listing();
    let db = snapshot().await;
    let engine = engine(&local, &remote, &db, &[]);

    // Act
    let first = engine.run();
    let second = async {
        let result = engine.run().await;
        resume.notify_one();
        result
    };
    let (first, second) = tokio::join!(first, second);

    // Assert
    assert!(first.is_ok());
    assert!(matches!(second, Err(SyncError::RunInProgress)));
}

#[tokio::test]
async fn engine_interprets_floating_times_in_configured_zone() {
    // Arrange
    let local = FakeLocal::new();
    let remote = FakeRemote::new();
    local.add_list("Reminders");
    remote.add_calendar("Tasks");
    remote.add_raw(
        "Tasks",
        "BEGIN:VCALENDAR\r\n\
         VERSION:2.0\r\n\
         BEGIN:VTODO\r\n\
         UID:floating-1\r\n\
         SUMMARY:Stand-up\r\n\
         DTSTAMP:20240418T100000Z\r\n\
         DUE:20240419T090000\r\n\
         END:VTODO\r\n\
         END:VCALENDAR\r\n",
    );
    let db = snapshot().await;
    let engine = engine(&local, &remote, &db, &["Reminders"])
        .with_timezone(jiff::tz::TimeZone::fixed(jiff::tz::offset(2)));

    // Act
    engine.run().await.unwrap();

    // Assert
    let items = local.items("Reminders");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].due_at, Some(ts("2024-04-19T07:00:00Z")));
}

#[tokio::test]
async fn engine_prune_completed_deletes_completed_reminders() {
    // Arrange
    let local = FakeLocal::new();
    let remote = FakeRemote::new();
    local.add_list("Reminders");
    local.add_item("Reminders", task("Open", "2024-04-18T10:00:00Z"));
    for name in ["Done", "Also done"] {
        let mut item = task(name, "2024-04-18T10:00:00Z");
        item.completed_at = Some(ts("2024-04-18T11:00:00Z"));
        local.add_item("Reminders", item);
    }
    let db = snapshot().await;

    // Act
    let dry = engine(&local, &remote, &db, &[])
        .with_dry_run(true)
        .prune_completed()
        .await
        .unwrap();
    let pruned = engine(&local, &remote, &db, &[])
        .prune_completed()
        .await
        .unwrap();

    // Assert
    assert_eq!(dry, 2);
    assert_eq!(pruned, 2);
    assert_eq!(local.calls(), vec!["delete_completed".to_string()]);
    let left: Vec<_> = local
        .items("Reminders")
        .into_iter()
        .map(|i| i.name)
        .collect();
    assert_eq!(left, vec!["Open".to_string()]);
}

#[tokio::test]
async fn engine_prune_completed_without_completed_reminders() {
    // Arrange
    let local = FakeLocal::new();
    let remote = FakeRemote::new();
    local.add_list("Reminders");
    local.add_item("Reminders", task("Open", "2024-04-18T10:00:00Z"));
    let db = snapshot().await;

    // Act
    let pruned = engine(&local, &remote, &db, &[])
        .prune_completed()
        .await
        .unwrap();

    // Assert
    assert_eq!(pruned, 0);
    assert!(local.calls().is_empty());
}
