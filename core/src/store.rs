// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::future::Future;

use async_trait::async_trait;

use crate::container::{LocalList, RemoteCalendar};
use crate::error::{StoreResult, SyncError};
use crate::item::Item;
use crate::report::{Action, Operation, SyncReport, Target};

/// The OS-native reminders store.
#[async_trait]
pub trait LocalStore: Send + Sync {
    /// Lists every reminders list.
    async fn list_lists(&self) -> StoreResult<Vec<LocalList>>;

    /// Reads every reminder in a list as a bridge record, fields separated by
    /// [`UNIT_SEPARATOR`](crate::UNIT_SEPARATOR).
    async fn list_items(&self, list: &LocalList) -> StoreResult<Vec<String>>;

    /// Creates a reminder and returns its identifier.
    async fn create_item(&self, list: &LocalList, item: &Item) -> StoreResult<String>;

    /// Overwrites the reminder identified by `item.local_id`.
    async fn update_item(&self, item: &Item) -> StoreResult<()>;

    async fn delete_item(&self, id: &str) -> StoreResult<()>;

    async fn create_list(&self, name: &str) -> StoreResult<LocalList>;

    async fn delete_list(&self, list: &LocalList) -> StoreResult<()>;

    /// Counts completed reminders across all lists.
    async fn count_completed(&self) -> StoreResult<usize>;

    /// Deletes completed reminders across all lists, returning how many.
    async fn delete_completed(&self) -> StoreResult<usize>;
}

/// The `CalDAV` task server.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Lists every calendar that can hold tasks.
    async fn list_calendars(&self) -> StoreResult<Vec<RemoteCalendar>>;

    /// Reads the iCalendar text of every task in a calendar.
    async fn list_items(&self, calendar: &RemoteCalendar) -> StoreResult<Vec<String>>;

    /// Creates a task and returns its `UID`.
    async fn create_item(&self, calendar: &RemoteCalendar, item: &Item) -> StoreResult<String>;

    /// Overwrites the task identified by `item.remote_id`.
    async fn update_item(&self, calendar: &RemoteCalendar, item: &Item) -> StoreResult<()>;

    async fn delete_item(&self, calendar: &RemoteCalendar, id: &str) -> StoreResult<()>;

    async fn create_calendar(&self, name: &str) -> StoreResult<RemoteCalendar>;

    async fn delete_calendar(&self, calendar: &RemoteCalendar) -> StoreResult<()>;
}

/// Both stores behind the dry-run switch, collecting every mutation into a
/// report.
///
/// Each mutation is a single attempt: a failure is logged and recorded, and
/// the caller carries on.
pub(crate) struct Stores<'a> {
    pub local: &'a dyn LocalStore,
    pub remote: &'a dyn RemoteStore,
    report: SyncReport,
}

impl<'a> Stores<'a> {
    pub fn new(local: &'a dyn LocalStore, remote: &'a dyn RemoteStore, dry_run: bool) -> Self {
        Self {
            local,
            remote,
            report: SyncReport::new(dry_run),
        }
    }

    pub fn dry_run(&self) -> bool {
        self.report.dry_run
    }

    pub fn report_mut(&mut self) -> &mut SyncReport {
        &mut self.report
    }

    pub fn into_report(self) -> SyncReport {
        self.report
    }

    pub async fn create_local_list(&mut self, name: &str) -> Option<LocalList> {
        let local = self.local;
        let op = Operation::new(Action::Create, Target::LocalList, name);
        let list = self
            .apply(op, || LocalList::new(name), local.create_list(name))
            .await?;
        self.note_created_id(list.id.clone());
        Some(list)
    }

    pub async fn create_remote_calendar(&mut self, name: &str) -> Option<RemoteCalendar> {
        let remote = self.remote;
        let op = Operation::new(Action::Create, Target::RemoteCalendar, name);
        let calendar = self
            .apply(op, || RemoteCalendar::new(name), remote.create_calendar(name))
            .await?;
        self.note_created_id(calendar.href.clone());
        Some(calendar)
    }

    pub async fn delete_local_list(&mut self, list: &LocalList) -> bool {
        let local = self.local;
        let op = Operation::new(Action::Delete, Target::LocalList, &list.name).with_id(list.id.clone());
        self.apply(op, || (), local.delete_list(list)).await.is_some()
    }

    pub async fn delete_remote_calendar(&mut self, calendar: &RemoteCalendar) -> bool {
        let remote = self.remote;
        let op = Operation::new(Action::Delete, Target::RemoteCalendar, &calendar.name)
            .with_id(calendar.href.clone());
        self.apply(op, || (), remote.delete_calendar(calendar))
            .await
            .is_some()
    }

    pub async fn create_local_item(&mut self, list: &LocalList, item: &Item) -> Option<String> {
        let local = self.local;
        let op = Operation::new(Action::Create, Target::LocalItem, &item.name);
        let id = self
            .apply(op, placeholder_id, local.create_item(list, item))
            .await?;
        self.note_created_id(Some(id.clone()));
        Some(id)
    }

    pub async fn create_remote_item(
        &mut self,
        calendar: &RemoteCalendar,
        item: &Item,
    ) -> Option<String> {
        let remote = self.remote;
        let op = Operation::new(Action::Create, Target::RemoteItem, &item.name);
        let id = self
            .apply(op, placeholder_id, remote.create_item(calendar, item))
            .await?;
        self.note_created_id(Some(id.clone()));
        Some(id)
    }

    pub async fn update_local_item(&mut self, item: &Item) -> bool {
        let local = self.local;
        let op = Operation::new(Action::Update, Target::LocalItem, &item.name)
            .with_id(item.local_id.clone());
        self.apply(op, || (), local.update_item(item)).await.is_some()
    }

    pub async fn update_remote_item(&mut self, calendar: &RemoteCalendar, item: &Item) -> bool {
        let remote = self.remote;
        let op = Operation::new(Action::Update, Target::RemoteItem, &item.name)
            .with_id(item.remote_id.clone());
        self.apply(op, || (), remote.update_item(calendar, item))
            .await
            .is_some()
    }

    pub async fn delete_local_item(&mut self, id: &str, name: &str) -> bool {
        let local = self.local;
        let op = Operation::new(Action::Delete, Target::LocalItem, name).with_id(Some(id.to_string()));
        self.apply(op, || (), local.delete_item(id)).await.is_some()
    }

    pub async fn delete_remote_item(
        &mut self,
        calendar: &RemoteCalendar,
        id: &str,
        name: &str,
    ) -> bool {
        let remote = self.remote;
        let op =
            Operation::new(Action::Delete, Target::RemoteItem, name).with_id(Some(id.to_string()));
        self.apply(op, || (), remote.delete_item(calendar, id))
            .await
            .is_some()
    }

    /// Runs `call`, or only logs it in a dry run, and records the outcome.
    ///
    /// `call` is never polled in a dry run, so the store sees nothing.
    async fn apply<T>(
        &mut self,
        operation: Operation,
        simulated: impl FnOnce() -> T,
        call: impl Future<Output = StoreResult<T>>,
    ) -> Option<T> {
        if self.report.dry_run {
            tracing::info!(%operation, "dry run: skipping");
            self.report.record_success(operation);
            return Some(simulated());
        }

        match call.await {
            Ok(value) => {
                tracing::info!(%operation, "applied");
                self.report.record_success(operation);
                Some(value)
            }
            Err(cause) => {
                let reason = cause.to_string();
                let err = SyncError::OperationFailed {
                    operation: operation.to_string(),
                    cause,
                };
                tracing::warn!(err = %err, "operation failed, continuing");
                self.report.record_failure(operation, reason);
                None
            }
        }
    }

    fn note_created_id(&mut self, id: Option<String>) {
        if let Some(op) = self.report.succeeded.last_mut() {
            op.id = id;
        }
    }
}

/// Stand-in id for an item that a dry run pretends to create.
fn placeholder_id() -> String {
    format!("dry-run-{}", uuid::Uuid::new_v4())
}
