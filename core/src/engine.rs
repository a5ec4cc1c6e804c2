// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::collections::BTreeSet;
use std::error::Error;

use jiff::tz::TimeZone;
use tokio::sync::Mutex;

use crate::association::associate;
use crate::config::Config;
use crate::deletion::{reconcile_containers, reconcile_items};
use crate::discovery::{Discovery, load_items};
use crate::error::SyncError;
use crate::reminders::ScriptBridge;
use crate::remote::CalDavStore;
use crate::report::SyncReport;
use crate::snapshot::{Snapshot, SnapshotStore, SqliteSnapshot};
use crate::store::{LocalStore, RemoteStore, Stores};
use crate::update::{push_local_to_remote, push_remote_to_local};

/// Reconciles a local reminders store with a `CalDAV` task server.
pub struct SyncEngine {
    local: Box<dyn LocalStore>,
    remote: Box<dyn RemoteStore>,
    snapshot: Box<dyn SnapshotStore>,
    sync_names: BTreeSet<String>,
    dry_run: bool,
    timezone: TimeZone,
    run_guard: Mutex<()>,
}

impl std::fmt::Debug for SyncEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncEngine")
            .field("sync_names", &self.sync_names)
            .field("dry_run", &self.dry_run)
            .field("timezone", &self.timezone)
            .finish_non_exhaustive()
    }
}

impl SyncEngine {
    /// Creates an engine that syncs nothing until names are configured.
    pub fn new(
        local: impl LocalStore + 'static,
        remote: impl RemoteStore + 'static,
        snapshot: impl SnapshotStore + 'static,
    ) -> Self {
        Self {
            local: Box::new(local),
            remote: Box::new(remote),
            snapshot: Box::new(snapshot),
            sync_names: BTreeSet::new(),
            dry_run: false,
            timezone: TimeZone::UTC,
            run_guard: Mutex::new(()),
        }
    }

    /// Builds the engine for the scripting bridge, the configured `CalDAV`
    /// server and the snapshot database in the state directory.
    pub async fn from_config(config: &Config) -> Result<Self, Box<dyn Error>> {
        let timezone = config.timezone()?;
        let local = ScriptBridge::new(timezone.clone());
        let remote = CalDavStore::new(config.caldav.clone(), timezone.clone())?;

        let db_path = config.db_path();
        if let Some(dir) = config.state_dir.as_ref() {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|e| format!("Failed to create state directory {}: {e}", dir.display()))?;
        } else {
            tracing::warn!("no state directory, the sync snapshot will not be kept between runs");
        }
        let snapshot = SqliteSnapshot::open(db_path.as_deref()).await?;

        Ok(Self::new(local, remote, snapshot)
            .with_sync_names(config.sync.iter().cloned())
            .with_dry_run(config.dry_run)
            .with_timezone(timezone))
    }

    /// Sets the names of the lists and calendars to keep in sync.
    pub fn with_sync_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sync_names = names.into_iter().map(Into::into).collect();
        self
    }

    /// Only log and report mutations instead of applying them.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Sets the time zone for dates without an explicit offset.
    pub fn with_timezone(mut self, timezone: TimeZone) -> Self {
        self.timezone = timezone;
        self
    }

    pub fn sync_names(&self) -> &BTreeSet<String> {
        &self.sync_names
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Lists the containers of both stores without changing anything.
    pub async fn discover(&self) -> Result<Discovery, SyncError> {
        Discovery::run(&*self.local, &*self.remote).await
    }

    /// Runs one synchronization pass.
    ///
    /// # Errors
    ///
    /// Fails without touching the snapshot if either store cannot be listed
    /// or the previous snapshot cannot be read. If writing the new snapshot
    /// fails, the error carries the report of what was already applied.
    /// Failed creates, updates and deletes do not fail the run; they are
    /// listed in the report.
    #[tracing::instrument(skip(self), fields(dry_run = self.dry_run))]
    pub async fn run(&self) -> Result<SyncReport, SyncError> {
        let _guard = self
            .run_guard
            .try_lock()
            .map_err(|_| SyncError::RunInProgress)?;
        tracing::info!("starting synchronization");

        let local = &*self.local;
        let remote = &*self.remote;
        let mut stores = Stores::new(local, remote, self.dry_run);

        let mut discovery = Discovery::run(local, remote).await?;
        let previous = Snapshot::read(&*self.snapshot)
            .await
            .map_err(SyncError::SnapshotUnavailable)?;

        let retained_containers = reconcile_containers(
            &previous.containers,
            &mut discovery,
            &self.sync_names,
            &mut stores,
        )
        .await;
        let mut pairings = associate(discovery, &self.sync_names, &mut stores).await;

        load_items(&mut pairings, local, remote, &self.timezone, stores.report_mut()).await?;
        for pairing in &mut pairings {
            pairing.link_from_snapshot(&previous.items);
        }

        let retained_items = reconcile_items(&mut pairings, &previous.items, &mut stores).await;
        for pairing in &mut pairings {
            push_local_to_remote(pairing, &mut stores).await;
            push_remote_to_local(pairing, &mut stores).await;
        }

        let dry_run = stores.dry_run();
        let report = stores.into_report();
        tracing::info!(
            succeeded = report.succeeded.len(),
            failed = report.failed.len(),
            skipped = report.skipped.len(),
            "reconciliation finished"
        );

        if dry_run {
            tracing::info!("dry run: skipping snapshot write");
            return Ok(report);
        }

        let retained = Snapshot {
            containers: retained_containers,
            items: retained_items,
        };
        let next = Snapshot::capture(&pairings, retained);
        if let Err(cause) = next.write(&*self.snapshot).await {
            return Err(SyncError::PersistenceFailed {
                cause,
                report: Box::new(report),
            });
        }

        tracing::debug!(
            containers = next.containers.len(),
            items = next.items.len(),
            "snapshot written"
        );
        Ok(report)
    }

    /// Deletes completed reminders from the local store and returns how many
    /// there were. A dry run only counts them.
    pub async fn prune_completed(&self) -> Result<usize, SyncError> {
        let _guard = self
            .run_guard
            .try_lock()
            .map_err(|_| SyncError::RunInProgress)?;

        let count = self
            .local
            .count_completed()
            .await
            .map_err(|cause| SyncError::OperationFailed {
                operation: "count completed reminders".to_string(),
                cause,
            })?;

        if count == 0 {
            tracing::info!("no completed reminders");
            return Ok(0);
        }
        if self.dry_run {
            tracing::info!(count, "dry run: skipping deletion of completed reminders");
            return Ok(count);
        }

        let deleted = self
            .local
            .delete_completed()
            .await
            .map_err(|cause| SyncError::OperationFailed {
                operation: "delete completed reminders".to_string(),
                cause,
            })?;
        tracing::info!(deleted, "deleted completed reminders");
        Ok(deleted)
    }
}
