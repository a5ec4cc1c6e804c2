// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use crate::container::ContainerPairing;
use crate::error::StoreKind;
use crate::item::Item;
use crate::store::Stores;

/// Pushes local items to the remote calendar.
pub(crate) async fn push_local_to_remote(pairing: &mut ContainerPairing, stores: &mut Stores<'_>) {
    push(pairing, StoreKind::Local, stores).await;
}

/// Pushes remote items to the local list.
pub(crate) async fn push_remote_to_local(pairing: &mut ContainerPairing, stores: &mut Stores<'_>) {
    push(pairing, StoreKind::Remote, stores).await;
}

/// Walks the items of `source` in order and brings the other store in line:
/// an item without counterpart is created there, and a counterpart older
/// than the item is overwritten. Counterparts that are newer are left for the
/// opposite pass.
///
/// Created counterparts are appended to the other collection, so the opposite
/// pass sees them as already matched.
async fn push(pairing: &mut ContainerPairing, source: StoreKind, stores: &mut Stores<'_>) {
    if !pairing.syncs_items() {
        return;
    }
    let ContainerPairing {
        local: Some(list),
        remote: Some(calendar),
        local_items,
        remote_items,
        ..
    } = pairing
    else {
        return;
    };
    let (sources, targets) = match source {
        StoreKind::Local => (local_items, remote_items),
        StoreKind::Remote => (remote_items, local_items),
    };
    let target = other(source);

    for i in 0..sources.len() {
        let Some(item) = sources.get(i) else { break };

        let Some(j) = find_counterpart(item, targets, source) else {
            if let Some(linked) = item.id(target) {
                tracing::debug!(
                    name = %item.name,
                    linked,
                    "linked counterpart is gone, leaving item for the next run"
                );
                continue;
            }

            let created = match target {
                StoreKind::Remote => stores.create_remote_item(calendar, item).await,
                StoreKind::Local => stores.create_local_item(list, item).await,
            };
            if let Some(id) = created
                && let Some(item) = sources.get_mut(i)
            {
                item.set_id(target, Some(id));
                targets.push(item.clone());
            }
            continue;
        };

        let (Some(item), Some(counterpart)) = (sources.get_mut(i), targets.get_mut(j)) else {
            continue;
        };
        link(item, counterpart, source);

        if item.modified_at <= counterpart.modified_at {
            continue;
        }

        let mut updated = counterpart.clone();
        updated.apply_fields_from(item);
        let applied = match target {
            StoreKind::Remote => stores.update_remote_item(calendar, &updated).await,
            StoreKind::Local => stores.update_local_item(&updated).await,
        };
        if applied {
            *counterpart = updated;
        }
    }
}

fn other(store: StoreKind) -> StoreKind {
    match store {
        StoreKind::Local => StoreKind::Remote,
        StoreKind::Remote => StoreKind::Local,
    }
}

/// Finds the counterpart of `item` (read from `source`) among `targets`.
///
/// Linked items match by id only. Unlinked items match the first unlinked
/// target with the same name.
fn find_counterpart(item: &Item, targets: &[Item], source: StoreKind) -> Option<usize> {
    let target = other(source);
    if let Some(id) = item.id(target) {
        return targets.iter().position(|t| t.id(target) == Some(id));
    }

    let own = item.id(source)?;
    targets
        .iter()
        .position(|t| t.id(source) == Some(own))
        .or_else(|| {
            targets
                .iter()
                .position(|t| t.id(source).is_none() && t.name == item.name)
        })
}

/// Records each side's id on the other.
fn link(item: &mut Item, counterpart: &mut Item, source: StoreKind) {
    let target = other(source);
    if item.id(target).is_none() {
        item.set_id(target, counterpart.id(target).map(str::to_string));
    }
    if counterpart.id(source).is_none() {
        counterpart.set_id(source, item.id(source).map(str::to_string));
    }
}
