// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::collections::BTreeSet;

use crate::container::ContainerPairing;
use crate::discovery::Discovery;
use crate::error::StoreKind;
use crate::store::Stores;

/// The default local list, always paired with [`DEFAULT_REMOTE_CALENDAR`].
pub const DEFAULT_LOCAL_LIST: &str = "Reminders";

/// The default remote calendar, always paired with [`DEFAULT_LOCAL_LIST`].
pub const DEFAULT_REMOTE_CALENDAR: &str = "Tasks";

/// Pairs local lists with remote calendars by name.
///
/// A container configured for sync that has no counterpart gets one created
/// on the other store; if that fails, the pairing stays one-sided until a
/// later run. Containers not configured for sync, and containers whose name
/// is already taken by the default pairing, are kept as disabled pairings.
pub(crate) async fn associate(
    discovery: Discovery,
    sync_names: &BTreeSet<String>,
    stores: &mut Stores<'_>,
) -> Vec<ContainerPairing> {
    let Discovery {
        local: mut lists,
        remote: mut calendars,
    } = discovery;
    let mut pairings = Vec::with_capacity(lists.len().max(calendars.len()));

    let default_list = lists.iter().position(|l| l.name == DEFAULT_LOCAL_LIST);
    let default_calendar = calendars
        .iter()
        .position(|c| c.name == DEFAULT_REMOTE_CALENDAR);
    if let (Some(li), Some(ci)) = (default_list, default_calendar) {
        let list = lists.remove(li);
        let calendar = calendars.remove(ci);
        let sync = sync_names.contains(&list.name) || sync_names.contains(&calendar.name);
        pairings.push(ContainerPairing::new(Some(list), Some(calendar), sync));
    }

    for list in lists {
        if let Some(ci) = calendars.iter().position(|c| c.name == list.name) {
            let calendar = calendars.remove(ci);
            let sync = sync_names.contains(&list.name);
            pairings.push(ContainerPairing::new(Some(list), Some(calendar), sync));
        } else if pairings.iter().any(|p| p.remote_name() == Some(list.name.as_str())) {
            tracing::warn!(name = %list.name, "remote calendar already paired, not syncing list");
            pairings.push(ContainerPairing::new(Some(list), None, false));
        } else if sync_names.contains(&list.name) {
            let calendar = stores.create_remote_calendar(&list.name).await;
            let created = calendar.is_some().then_some(StoreKind::Remote);
            pairings.push(ContainerPairing::new(Some(list), calendar, true).with_created(created));
        } else {
            pairings.push(ContainerPairing::new(Some(list), None, false));
        }
    }

    for calendar in calendars {
        if pairings.iter().any(|p| p.local_name() == Some(calendar.name.as_str())) {
            tracing::warn!(name = %calendar.name, "local list already paired, not syncing calendar");
            pairings.push(ContainerPairing::new(None, Some(calendar), false));
        } else if sync_names.contains(&calendar.name) {
            let list = stores.create_local_list(&calendar.name).await;
            let created = list.is_some().then_some(StoreKind::Local);
            pairings.push(ContainerPairing::new(list, Some(calendar), true).with_created(created));
        } else {
            pairings.push(ContainerPairing::new(None, Some(calendar), false));
        }
    }

    for pairing in &pairings {
        tracing::debug!(
            local = pairing.local_name(),
            remote = pairing.remote_name(),
            sync = pairing.sync,
            "associated containers"
        );
    }
    pairings
}
