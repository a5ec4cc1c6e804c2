// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Reconciliation of the macOS Reminders app with a `CalDAV` task server.
//!
//! A run discovers the lists and calendars on both stores, mirrors
//! deletions recorded against the snapshot of the previous run, pairs
//! containers by name, copies the newer version of each item to the other
//! store, and finally replaces the snapshot.

mod association;
mod config;
mod container;
mod deletion;
mod discovery;
mod engine;
mod error;
mod item;
mod reminders;
mod remote;
mod report;
mod snapshot;
mod store;
mod update;

pub use crate::association::{DEFAULT_LOCAL_LIST, DEFAULT_REMOTE_CALENDAR};
pub use crate::config::{APP_NAME, Config, DB_FILE_NAME, expand_path, get_config_dir};
pub use crate::container::{ContainerPairing, LocalList, RemoteCalendar};
pub use crate::discovery::Discovery;
pub use crate::engine::SyncEngine;
pub use crate::error::{StoreError, StoreKind, StoreResult, SyncError};
pub use crate::item::{
    Item, LOCAL_DATE_FORMAT, LocalFields, MISSING_VALUE, RawRecord, UNIT_SEPARATOR,
};
pub use crate::reminders::{RECORD_SEPARATOR, ScriptBridge};
pub use crate::remote::CalDavStore;
pub use crate::report::{Action, FailedOperation, Operation, SkippedRecord, SyncReport, Target};
pub use crate::snapshot::{ContainerRow, ItemRow, Snapshot, SnapshotStore, SqliteSnapshot};
pub use crate::store::{LocalStore, RemoteStore};
