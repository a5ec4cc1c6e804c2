// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::collections::BTreeSet;

use crate::container::ContainerPairing;
use crate::discovery::Discovery;
use crate::snapshot::{ContainerRow, ItemRow};
use crate::store::Stores;

/// Mirrors containers deleted on one store since the last run.
///
/// Only snapshot rows of synchronized pairings whose names are still
/// configured for sync are considered. A deleted container's counterpart is
/// deleted and both are removed from `discovery`, so association does not
/// create them again.
///
/// Returns the rows whose deletion failed; they stay in the snapshot so the
/// next run retries.
pub(crate) async fn reconcile_containers(
    rows: &[ContainerRow],
    discovery: &mut Discovery,
    sync_names: &BTreeSet<String>,
    stores: &mut Stores<'_>,
) -> Vec<ContainerRow> {
    let mut retained = Vec::new();
    for row in rows {
        let (Some(local_name), Some(remote_name)) =
            (row.local_name.as_deref(), row.remote_name.as_deref())
        else {
            continue;
        };
        if !row.sync || !(sync_names.contains(local_name) || sync_names.contains(remote_name)) {
            continue;
        }

        let li = discovery.local.iter().position(|l| l.name == local_name);
        let ci = discovery.remote.iter().position(|c| c.name == remote_name);
        match (li, ci) {
            (Some(_), Some(_)) => {}
            (None, Some(ci)) => {
                let calendar = discovery.remote.remove(ci);
                tracing::info!(local_name, remote_name, "local list was deleted");
                if !stores.delete_remote_calendar(&calendar).await {
                    retained.push(row.clone());
                }
            }
            (Some(li), None) => {
                let list = discovery.local.remove(li);
                tracing::info!(local_name, remote_name, "remote calendar was deleted");
                if !stores.delete_local_list(&list).await {
                    retained.push(row.clone());
                }
            }
            (None, None) => {
                tracing::debug!(local_name, remote_name, "container deleted on both stores");
            }
        }
    }
    retained
}

/// Mirrors items deleted on one store since the last run.
///
/// Items whose deletion was mirrored leave the pairing's collections; a
/// failed delete keeps its snapshot row in the returned list and the item out
/// of this run. A record that was listed but could not be parsed is not a
/// deletion, and its row is kept.
pub(crate) async fn reconcile_items(
    pairings: &mut [ContainerPairing],
    rows: &[ItemRow],
    stores: &mut Stores<'_>,
) -> Vec<ItemRow> {
    let mut retained = Vec::new();
    for pairing in pairings.iter_mut().filter(|p| p.syncs_items()) {
        let owned: Vec<&ItemRow> = rows.iter().filter(|r| pairing.owns_row(r)).collect();
        let ContainerPairing {
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

        for row in owned {
            let (Some(local_id), Some(remote_id)) =
                (row.local_uuid.as_deref(), row.remote_uuid.as_deref())
            else {
                continue;
            };

            let li = local_items
                .iter()
                .position(|i| i.local_id.as_deref() == Some(local_id));
            let ri = remote_items
                .iter()
                .position(|i| i.remote_id.as_deref() == Some(remote_id));
            if unreadable_local.contains(local_id) || unreadable_remote.contains(remote_id) {
                tracing::debug!(local_id, remote_id, "item unreadable on one store, keeping link");
                // A readable side still present is recorded again when the
                // snapshot is captured.
                if li.is_none() && ri.is_none() {
                    retained.push(row.clone());
                }
                continue;
            }

            let deleted = match (li, ri) {
                (None, Some(ri)) => {
                    let item = remote_items.remove(ri);
                    tracing::info!(local_id, remote_id, "local item was deleted");
                    stores.delete_remote_item(calendar, remote_id, &item.name).await
                }
                (Some(li), None) => {
                    let item = local_items.remove(li);
                    tracing::info!(local_id, remote_id, "remote item was deleted");
                    stores.delete_local_item(local_id, &item.name).await
                }
                _ => true,
            };
            if !deleted {
                retained.push(row.clone());
            }
        }
    }
    retained
}
