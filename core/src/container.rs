// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::collections::BTreeSet;

use crate::error::StoreKind;
use crate::item::Item;
use crate::snapshot::ItemRow;

/// A reminders list on the local store.
#[derive(Debug, Clone, Eq, serde::Serialize)]
pub struct LocalList {
    /// Display name, the join key against remote calendars.
    pub name: String,

    /// Store specific handle, if the store reported one.
    pub id: Option<String>,
}

impl LocalList {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

impl PartialEq for LocalList {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

/// A task calendar on the remote server.
#[derive(Debug, Clone, Eq, serde::Serialize)]
pub struct RemoteCalendar {
    /// Display name, the join key against local lists.
    pub name: String,

    /// Collection href on the server.
    pub href: Option<String>,
}

impl RemoteCalendar {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            href: None,
        }
    }

    pub fn with_href(mut self, href: impl Into<String>) -> Self {
        self.href = Some(href.into());
        self
    }
}

impl PartialEq for RemoteCalendar {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

/// A local list associated with a remote calendar, and the items of both
/// sides while a run is in progress.
///
/// Either side may be missing: a container that is not configured for sync,
/// or whose counterpart could not be created, is still tracked so later runs
/// can tell a deletion from a container that was never synchronized.
#[derive(Debug, Clone, Default)]
pub struct ContainerPairing {
    pub local: Option<LocalList>,
    pub remote: Option<RemoteCalendar>,

    /// Whether the pairing is configured for synchronization.
    pub sync: bool,

    pub local_items: Vec<Item>,
    pub remote_items: Vec<Item>,

    /// Ids of records that were listed but could not be parsed. They still
    /// exist, so their counterparts must not be treated as orphaned.
    pub(crate) unreadable_local: BTreeSet<String>,
    pub(crate) unreadable_remote: BTreeSet<String>,

    /// The side created during this run, known to be empty.
    pub(crate) created: Option<StoreKind>,
}

impl ContainerPairing {
    pub fn new(local: Option<LocalList>, remote: Option<RemoteCalendar>, sync: bool) -> Self {
        Self {
            local,
            remote,
            sync,
            local_items: Vec::new(),
            remote_items: Vec::new(),
            unreadable_local: BTreeSet::new(),
            unreadable_remote: BTreeSet::new(),
            created: None,
        }
    }

    pub(crate) fn with_created(mut self, created: Option<StoreKind>) -> Self {
        self.created = created;
        self
    }

    pub fn local_name(&self) -> Option<&str> {
        self.local.as_ref().map(|l| l.name.as_str())
    }

    pub fn remote_name(&self) -> Option<&str> {
        self.remote.as_ref().map(|r| r.name.as_str())
    }

    /// Whether items of this pairing are reconciled.
    pub fn syncs_items(&self) -> bool {
        self.sync && self.local.is_some() && self.remote.is_some()
    }

    /// Whether a snapshot row was recorded for this pairing.
    pub(crate) fn owns_row(&self, row: &ItemRow) -> bool {
        self.local_name().is_some()
            && self.remote_name().is_some()
            && row.local_container.as_deref() == self.local_name()
            && row.remote_container.as_deref() == self.remote_name()
    }

    /// Restores cross-store links that only the snapshot remembers.
    ///
    /// The local store has no place for the remote `UID` and vice versa, so a
    /// freshly loaded item only carries its own id.
    pub(crate) fn link_from_snapshot(&mut self, rows: &[ItemRow]) {
        let rows: Vec<&ItemRow> = rows.iter().filter(|r| self.owns_row(r)).collect();

        for item in self.local_items.iter_mut().filter(|i| i.remote_id.is_none()) {
            if let Some(row) = rows
                .iter()
                .find(|r| r.local_uuid.is_some() && r.local_uuid == item.local_id)
            {
                item.remote_id.clone_from(&row.remote_uuid);
            }
        }

        for item in self.remote_items.iter_mut().filter(|i| i.local_id.is_none()) {
            if let Some(row) = rows
                .iter()
                .find(|r| r.remote_uuid.is_some() && r.remote_uuid == item.remote_id)
            {
                item.local_id.clone_from(&row.local_uuid);
            }
        }
    }
}
