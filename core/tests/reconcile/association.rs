// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Pairing of local lists with remote calendars.

use taskbridge_core::{Action, SnapshotStore, Target};

use crate::common::{FakeLocal, FakeRemote, engine, snapshot, task};

#[tokio::test]
async fn association_pairs_by_name_and_flags_sync() {
    // Arrange
    let local = FakeLocal::new();
    let remote = FakeRemote::new();
    for name in ["sync_me", "do_not_sync_me"] {
        local.add_list(name);
        remote.add_calendar(name);
    }
    let db = snapshot().await;

    // Act
    let report = engine(&local, &remote, &db, &["sync_me"]).run().await.unwrap();

    // Assert
    assert!(report.is_noop());
    let rows = db.read_containers().await.unwrap();
    assert_eq!(rows.len(), 2);

    let synced: Vec<_> = rows.iter().filter(|r| r.sync).collect();
    assert_eq!(synced.len(), 1);
    assert_eq!(synced[0].local_name.as_deref(), Some("sync_me"));
    assert_eq!(synced[0].remote_name.as_deref(), Some("sync_me"));

    let unsynced: Vec<_> = rows.iter().filter(|r| !r.sync).collect();
    assert_eq!(unsynced.len(), 1);
    assert_eq!(unsynced[0].local_name.as_deref(), Some("do_not_sync_me"));
    assert_eq!(unsynced[0].remote_name.as_deref(), Some("do_not_sync_me"));
}

#[tokio::test]
async fn association_joins_reminders_with_tasks() {
    // Arrange
    let local = FakeLocal::new();
    let remote = FakeRemote::new();
    local.add_list("Reminders");
    remote.add_calendar("Tasks");
    let db = snapshot().await;

    // Act
    engine(&local, &remote, &db, &["Reminders"]).run().await.unwrap();

    // Assert
    assert!(remote.calls().is_empty());
    assert!(local.calls().is_empty());
    let rows = db.read_containers().await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].local_name.as_deref(), Some("Reminders"));
    assert_eq!(rows[0].remote_name.as_deref(), Some("Tasks"));
    assert!(rows[0].sync);
}

#[tokio::test]
async fn association_alias_overrides_same_name_calendar() {
    // Arrange
    let local = FakeLocal::new();
    let remote = FakeRemote::new();
    local.add_list("Reminders");
    remote.add_calendar("Reminders");
    remote.add_calendar("Tasks");
    let db = snapshot().await;

    // Act
    engine(&local, &remote, &db, &["Reminders"]).run().await.unwrap();

    // Assert
    let rows = db.read_containers().await.unwrap();
    let paired = rows
        .iter()
        .find(|r| r.local_name.as_deref() == Some("Reminders"))
        .unwrap();
    assert_eq!(paired.remote_name.as_deref(), Some("Tasks"));

    // The leftover calendar must not produce a second "Reminders" list.
    assert_eq!(local.lists(), vec!["Reminders".to_string()]);
    let leftover = rows
        .iter()
        .find(|r| r.local_name.is_none())
        .unwrap();
    assert_eq!(leftover.remote_name.as_deref(), Some("Reminders"));
    assert!(!leftover.sync);
}

#[tokio::test]
async fn association_syncs_items_through_the_alias() {
    // Arrange
    let local = FakeLocal::new();
    let remote = FakeRemote::new();
    local.add_list("Reminders");
    remote.add_calendar("Tasks");
    local.add_item("Reminders", task("Call mom", "2024-04-18T10:00:00Z"));
    let db = snapshot().await;

    // Act
    engine(&local, &remote, &db, &["Reminders"]).run().await.unwrap();

    // Assert
    let tasks = remote.items("Tasks");
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].name, "Call mom");
}

#[tokio::test]
async fn association_creates_missing_remote_calendar() {
    // Arrange
    let local = FakeLocal::new();
    let remote = FakeRemote::new();
    local.add_list("Work");
    local.add_item("Work", task("Write report", "2024-04-18T10:00:00Z"));
    let db = snapshot().await;

    // Act
    let report = engine(&local, &remote, &db, &["Work"]).run().await.unwrap();

    // Assert
    assert_eq!(remote.calendars(), vec!["Work".to_string()]);
    assert_eq!(report.count(Action::Create, Target::RemoteCalendar), 1);
    assert_eq!(remote.items("Work").len(), 1);
}

#[tokio::test]
async fn association_creates_missing_local_list() {
    // Arrange
    let local = FakeLocal::new();
    let remote = FakeRemote::new();
    remote.add_calendar("Groceries");
    remote.add_item("Groceries", task("Eggs", "2024-04-18T10:00:00Z"));
    let db = snapshot().await;

    // Act
    let report = engine(&local, &remote, &db, &["Groceries"])
        .run()
        .await
        .unwrap();

    // Assert
    assert_eq!(local.lists(), vec!["Groceries".to_string()]);
    assert_eq!(report.count(Action::Create, Target::LocalList), 1);
    assert_eq!(local.items("Groceries").len(), 1);
}

#[tokio::test]
async fn association_records_failed_creation() {
    // Arrange
    let local = FakeLocal::new();
    let remote = FakeRemote::new();
    local.add_list("Work");
    remote.fail_on("create_calendar");
    let db = snapshot().await;

    // Act
    let report = engine(&local, &remote, &db, &["Work"]).run().await.unwrap();

    // Assert
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].operation.target, Target::RemoteCalendar);
    assert_eq!(report.failed[0].operation.name, "Work");
    assert!(remote.calendars().is_empty());

    let rows = db.read_containers().await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].local_name.as_deref(), Some("Work"));
    assert_eq!(rows[0].remote_name, None);
    assert!(rows[0].sync);
}

#[tokio::test]
async fn association_retries_failed_creation_next_run() {
    // Arrange
    let local = FakeLocal::new();
    let remote = FakeRemote::new();
    local.add_list("Work");
    remote.fail_on("create_calendar");
    let db = snapshot().await;
    let engine = engine(&local, &remote, &db, &["Work"]);
    engine.run().await.unwrap();

    // Act
    remote.clear_failures();
    let report = engine.run().await.unwrap();

    // Assert
    assert!(report.is_success());
    assert_eq!(remote.calendars(), vec!["Work".to_string()]);
}

#[tokio::test]
async fn association_leaves_unconfigured_containers_alone() {
    // Arrange
    let local = FakeLocal::new();
    let remote = FakeRemote::new();
    local.add_list("Private");
    remote.add_calendar("Shared");
    remote.add_item("Shared", task("Not mine", "2024-04-18T10:00:00Z"));
    let db = snapshot().await;

    // Act
    let report = engine(&local, &remote, &db, &[]).run().await.unwrap();

    // Assert
    assert!(report.is_noop());
    assert!(local.calls().is_empty());
    assert!(remote.calls().is_empty());
    let rows = db.read_containers().await.unwrap();
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|r| !r.sync));
    assert!(db.read_items().await.unwrap().is_empty());
}
