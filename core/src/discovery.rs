// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::collections::BTreeSet;

use jiff::tz::TimeZone;

use crate::container::{ContainerPairing, LocalList, RemoteCalendar};
use crate::error::{StoreKind, SyncError};
use crate::item::{Item, RawRecord};
use crate::report::SyncReport;
use crate::store::{LocalStore, RemoteStore};

/// Containers found on both stores at the start of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct Discovery {
    pub local: Vec<LocalList>,
    pub remote: Vec<RemoteCalendar>,
}

impl Discovery {
    /// Lists the containers of both stores.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::DiscoveryFailed`] if either store cannot be listed.
    pub(crate) async fn run(
        local: &dyn LocalStore,
        remote: &dyn RemoteStore,
    ) -> Result<Self, SyncError> {
        let lists = local
            .list_lists()
            .await
            .map_err(|cause| SyncError::DiscoveryFailed {
                store: StoreKind::Local,
                cause,
            })?;

        let calendars = remote
            .list_calendars()
            .await
            .map_err(|cause| SyncError::DiscoveryFailed {
                store: StoreKind::Remote,
                cause,
            })?;

        tracing::debug!(
            lists = lists.len(),
            calendars = calendars.len(),
            "discovered containers"
        );
        Ok(Self {
            local: dedup_by_name(lists, |l| &l.name, StoreKind::Local),
            remote: dedup_by_name(calendars, |c| &c.name, StoreKind::Remote),
        })
    }
}

/// Keeps the first container of each name; names are the join key.
fn dedup_by_name<T>(containers: Vec<T>, name: impl Fn(&T) -> &String, store: StoreKind) -> Vec<T> {
    let mut kept: Vec<T> = Vec::with_capacity(containers.len());
    for c in containers {
        if kept.iter().any(|k| name(k) == name(&c)) {
            tracing::warn!(%store, name = %name(&c), "ignoring container with duplicate name");
            continue;
        }
        kept.push(c);
    }
    kept
}

/// Loads the items of every pairing whose items are synchronized.
///
/// Records that fail to parse are skipped and noted in the report.
///
/// # Errors
///
/// Returns [`SyncError::DiscoveryFailed`] if a list or calendar cannot be read.
pub(crate) async fn load_items(
    pairings: &mut [ContainerPairing],
    local: &dyn LocalStore,
    remote: &dyn RemoteStore,
    tz: &TimeZone,
    report: &mut SyncReport,
) -> Result<(), SyncError> {
    for pairing in pairings.iter_mut().filter(|p| p.syncs_items()) {
        let created = pairing.created;
        let ContainerPairing {
            local: Some(list),
            remote: Some(calendar),
            local_items,
            remote_items,
            unreadable_local,
            unreadable_remote,
            ..
        } = pairing
        else {
            continue;
        };

        if created != Some(StoreKind::Local) {
            let records = local
                .list_items(list)
                .await
                .map_err(|cause| SyncError::DiscoveryFailed {
                    store: StoreKind::Local,
                    cause,
                })?;
            let records = records.into_iter().map(RawRecord::from_local_record);
            (*local_items, *unreadable_local) = parse_all(records, &list.name, tz, report);
        }

        if created != Some(StoreKind::Remote) {
            let records = remote
                .list_items(calendar)
                .await
                .map_err(|cause| SyncError::DiscoveryFailed {
                    store: StoreKind::Remote,
                    cause,
                })?;
            let records = records.into_iter().map(RawRecord::from_remote_ics);
            (*remote_items, *unreadable_remote) = parse_all(records, &calendar.name, tz, report);
        }

        tracing::debug!(
            list = %list.name,
            calendar = %calendar.name,
            local = local_items.len(),
            remote = remote_items.len(),
            "loaded items"
        );
    }
    Ok(())
}

/// Parses every record, returning the items and the ids of the records that
/// were skipped but could still be identified.
fn parse_all(
    records: impl Iterator<Item = RawRecord>,
    container: &str,
    tz: &TimeZone,
    report: &mut SyncReport,
) -> (Vec<Item>, BTreeSet<String>) {
    let mut items = Vec::new();
    let mut unreadable = BTreeSet::new();
    for raw in records {
        match Item::parse(&raw, tz) {
            Ok(item) => items.push(item),
            Err(err) => {
                let id = raw.id();
                tracing::warn!(container, id = id.as_deref(), err = %err, "skipping record");
                report.record_skipped(raw.store(), container, err.to_string());
                unreadable.extend(id);
            }
        }
    }
    (items, unreadable)
}
