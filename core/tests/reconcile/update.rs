// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use taskbridge_core::{Action, SnapshotStore, StoreKind, Target};

use crate::common::{FakeLocal, FakeRemote, engine, snapshot, task, ts};

fn stores() -> (FakeLocal, FakeRemote) {
    let local = FakeLocal::new();
    let remote = FakeRemote::new();
    local.add_list("Reminders");
    remote.add_calendar("Tasks");
    (local, remote)
}

#[tokio::test]
async fn update_creates_remote_only_item_locally() {
    // Arrange
    let (local, remote) = stores();
    let mut eggs = task("Buy eggs", "2024-04-18T10:00:00Z");
    eggs.due_at = Some(ts("2024-04-20T09:00:00Z"));
    eggs.notes = "Free range, a dozen".to_string();
    let uid = remote.add_item("Tasks", eggs);
    let db = snapshot().await;

    // Act
    let report = engine(&local, &remote, &db, &["Reminders"])
        .run()
        .await
        .unwrap();

    // Assert
    assert_eq!(report.count(Action::Create, Target::LocalItem), 1);
    let items = local.items("Reminders");
    assert_eq!(items.len(), 1);
    let created = &items[0];
    assert_eq!(created.name, "Buy eggs");
    assert_eq!(created.due_at, Some(ts("2024-04-20T09:00:00Z")));
    assert_eq!(created.notes, "Free range, a dozen");
    assert_eq!(created.modified_at, ts("2024-04-18T10:00:00Z"));

    let rows = db.read_items().await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].local_uuid, created.local_id);
    assert_eq!(rows[0].remote_uuid.as_deref(), Some(uid.as_str()));
    assert_eq!(rows[0].local_container.as_deref(), Some("Reminders"));
    assert_eq!(rows[0].remote_container.as_deref(), Some("Tasks"));
}

#[tokio::test]
async fn update_creates_local_only_item_remotely() {
    // Arrange
    let (local, remote) = stores();
    let id = local.add_item("Reminders", task("Call mom", "2024-04-18T10:00:00Z"));
    let db = snapshot().await;

    // Act
    let report = engine(&local, &remote, &db, &["Reminders"])
        .run()
        .await
        .unwrap();

    // Assert
    assert_eq!(report.count(Action::Create, Target::RemoteItem), 1);
    assert_eq!(
        remote.calls(),
        vec!["create_item:Tasks:Call mom".to_string()]
    );
    let rows = db.read_items().await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].local_uuid.as_deref(), Some(id.as_str()));
    assert!(rows[0].remote_uuid.is_some());
}

#[tokio::test]
async fn update_second_run_is_noop() {
    // Arrange
    let (local, remote) = stores();
    local.add_item("Reminders", task("Call mom", "2024-04-18T10:00:00Z"));
    remote.add_item("Tasks", task("Buy eggs", "2024-04-18T11:00:00Z"));
    let db = snapshot().await;
    let engine = engine(&local, &remote, &db, &["Reminders"]);
    engine.run().await.unwrap();
    let local_calls = local.calls().len();
    let remote_calls = remote.calls().len();

    // Act
    let report = engine.run().await.unwrap();

    // Assert
    assert!(report.is_noop(), "unexpected operations: {report:?}");
    assert_eq!(local.calls().len(), local_calls);
    assert_eq!(remote.calls().len(), remote_calls);
    assert_eq!(db.read_items().await.unwrap().len(), 2);
}

#[tokio::test]
async fn update_newer_local_item_wins() {
    // Arrange
    let (local, remote) = stores();
    let id = local.add_item("Reminders", task("Call mom", "2024-04-18T10:00:00Z"));
    let db = snapshot().await;
    let engine = engine(&local, &remote, &db, &["Reminders"]);
    engine.run().await.unwrap();

    // Act
    local.edit_item(&id, |item| {
        item.name = "Call mom back".to_string();
        item.completed_at = Some(ts("2024-04-19T08:00:00Z"));
        item.modified_at = ts("2024-04-19T08:00:00Z");
    });
    let report = engine.run().await.unwrap();

    // Assert
    assert_eq!(report.count(Action::Update, Target::RemoteItem), 1);
    let remote_items = remote.items("Tasks");
    assert_eq!(remote_items.len(), 1);
    assert_eq!(remote_items[0].name, "Call mom back");
    assert!(remote_items[0].is_completed());
    assert_eq!(remote_items[0].modified_at, ts("2024-04-19T08:00:00Z"));
}

#[tokio::test]
async fn update_newer_remote_item_wins() {
    // Arrange
    let (local, remote) = stores();
    let uid = remote.add_item("Tasks", task("Buy eggs", "2024-04-18T10:00:00Z"));
    let db = snapshot().await;
    let engine = engine(&local, &remote, &db, &["Reminders"]);
    engine.run().await.unwrap();

    // Act
    remote.edit_item(&uid, |item| {
        item.notes = "Brown ones".to_string();
        item.modified_at = ts("2024-04-19T08:00:00Z");
    });
    let report = engine.run().await.unwrap();

    // Assert
    assert_eq!(report.count(Action::Update, Target::LocalItem), 1);
    assert_eq!(report.succeeded.len(), 1);
    let local_items = local.items("Reminders");
    assert_eq!(local_items.len(), 1);
    assert_eq!(local_items[0].notes, "Brown ones");
}

#[tokio::test]
async fn update_equal_timestamps_change_nothing() {
    // Arrange
    let (local, remote) = stores();
    local.add_item("Reminders", {
        let mut item = task("Milk", "2024-04-18T10:00:00Z");
        item.notes = "local notes".to_string();
        item
    });
    remote.add_item("Tasks", {
        let mut item = task("Milk", "2024-04-18T10:00:00Z");
        item.notes = "remote notes".to_string();
        item
    });
    let db = snapshot().await;

    // Act
    let report = engine(&local, &remote, &db, &["Reminders"])
        .run()
        .await
        .unwrap();

    // Assert: the pair is matched by name and left alone.
    assert!(report.is_noop());
    assert_eq!(local.items("Reminders")[0].notes, "local notes");
    assert_eq!(remote.items("Tasks")[0].notes, "remote notes");
    let rows = db.read_items().await.unwrap();
    assert_eq!(rows.len(), 1);
    assert!(rows[0].local_uuid.is_some());
    assert!(rows[0].remote_uuid.is_some());
}

#[tokio::test]
async fn update_matches_unlinked_items_by_name() {
    // Arrange
    let (local, remote) = stores();
    local.add_item("Reminders", task("Milk", "2024-04-18T12:00:00Z"));
    remote.add_item("Tasks", task("Milk", "2024-04-18T10:00:00Z"));
    let db = snapshot().await;

    // Act
    let report = engine(&local, &remote, &db, &["Reminders"])
        .run()
        .await
        .unwrap();

    // Assert
    assert_eq!(report.succeeded.len(), 1);
    assert_eq!(report.count(Action::Update, Target::RemoteItem), 1);
    assert_eq!(remote.items("Tasks").len(), 1);
    assert_eq!(
        remote.items("Tasks")[0].modified_at,
        ts("2024-04-18T12:00:00Z")
    );
}

#[tokio::test]
async fn update_skips_malformed_records() {
    // Arrange
    let (local, remote) = stores();
    remote.add_raw("Tasks", "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nEND:VCALENDAR\r\n");
    remote.add_item("Tasks", task("Buy eggs", "2024-04-18T10:00:00Z"));
    let db = snapshot().await;

    // Act
    let report = engine(&local, &remote, &db, &["Reminders"])
        .run()
        .await
        .unwrap();

    // Assert
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].store, StoreKind::Remote);
    assert!(report.is_success());
    assert_eq!(local.items("Reminders").len(), 1);
}

#[tokio::test]
async fn update_failure_does_not_abort_run() {
    // Arrange
    let (local, remote) = stores();
    let id = local.add_item("Reminders", task("Call mom", "2024-04-18T10:00:00Z"));
    let db = snapshot().await;
    let engine = engine(&local, &remote, &db, &["Reminders"]);
    engine.run().await.unwrap();

    local.edit_item(&id, |item| {
        item.name = "Call mom back".to_string();
        item.modified_at = ts("2024-04-19T08:00:00Z");
    });
    local.add_item("Reminders", task("Water plants", "2024-04-19T09:00:00Z"));
    remote.fail_on("update_item");

    // Act
    let report = engine.run().await.unwrap();

    // Assert
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].operation.action, Action::Update);
    assert_eq!(report.failed[0].operation.target, Target::RemoteItem);
    assert_eq!(report.count(Action::Create, Target::RemoteItem), 1);
    assert_eq!(remote.items("Tasks").len(), 2);

    // Act
    remote.clear_failures();
    let retry = engine.run().await.unwrap();

    // Assert
    assert_eq!(retry.count(Action::Update, Target::RemoteItem), 1);
    assert!(
        remote
            .items("Tasks")
            .iter()
            .any(|item| item.name == "Call mom back")
    );
}

#[tokio::test]
async fn update_leaves_disabled_pairings_alone() {
    // Arrange
    let local = FakeLocal::new();
    let remote = FakeRemote::new();
    local.add_list("Private");
    remote.add_calendar("Private");
    local.add_item("Private", task("Secret", "2024-04-18T10:00:00Z"));
    let db = snapshot().await;

    // Act
    let report = engine(&local, &remote, &db, &[]).run().await.unwrap();

    // Assert
    assert!(report.is_noop());
    assert!(remote.items("Private").is_empty());
    assert!(db.read_items().await.unwrap().is_empty());
}
