// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::fmt;

use crate::error::StoreKind;

/// What a mutating call does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Create,
    Update,
    Delete,
}

/// What a mutating call is applied to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Target {
    LocalList,
    RemoteCalendar,
    LocalItem,
    RemoteItem,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        })
    }
}

impl Target {
    /// The store the target lives on.
    pub fn store(self) -> StoreKind {
        match self {
            Self::LocalList | Self::LocalItem => StoreKind::Local,
            Self::RemoteCalendar | Self::RemoteItem => StoreKind::Remote,
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::LocalList => "local list",
            Self::RemoteCalendar => "remote calendar",
            Self::LocalItem => "local item",
            Self::RemoteItem => "remote item",
        })
    }
}

/// One decision of the reconciler: a create, update or delete on one store.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Operation {
    pub action: Action,
    pub target: Target,

    /// Name of the list, calendar or item.
    pub name: String,

    /// Identifier of the target, once known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl Operation {
    pub fn new(action: Action, target: Target, name: impl Into<String>) -> Self {
        Self {
            action,
            target,
            name: name.into(),
            id: None,
        }
    }

    pub fn with_id(mut self, id: Option<String>) -> Self {
        self.id = id;
        self
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {:?}", self.action, self.target, self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct FailedOperation {
    pub operation: Operation,
    pub reason: String,
}

/// A record that could not be parsed and was left alone.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct SkippedRecord {
    pub store: StoreKind,

    /// The list or calendar the record was read from.
    pub container: String,

    pub reason: String,
}

/// Outcome of one synchronization run.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct SyncReport {
    /// Whether mutating calls were only simulated.
    pub dry_run: bool,

    /// Operations applied (or, in a dry run, that would have been applied).
    pub succeeded: Vec<Operation>,

    /// Operations that failed; the run continued past them.
    pub failed: Vec<FailedOperation>,

    /// Records that could not be parsed.
    pub skipped: Vec<SkippedRecord>,
}

impl SyncReport {
    pub fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            ..Default::default()
        }
    }

    /// Whether every attempted operation succeeded.
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    /// Whether the run changed nothing and found nothing to change.
    pub fn is_noop(&self) -> bool {
        self.succeeded.is_empty() && self.failed.is_empty()
    }

    /// Number of succeeded operations with the given action and target.
    pub fn count(&self, action: Action, target: Target) -> usize {
        self.succeeded
            .iter()
            .filter(|op| op.action == action && op.target == target)
            .count()
    }

    pub(crate) fn record_success(&mut self, operation: Operation) {
        self.succeeded.push(operation);
    }

    pub(crate) fn record_failure(&mut self, operation: Operation, reason: String) {
        self.failed.push(FailedOperation { operation, reason });
    }

    pub(crate) fn record_skipped(&mut self, store: StoreKind, container: &str, reason: String) {
        self.skipped.push(SkippedRecord {
            store,
            container: container.to_string(),
            reason,
        });
    }
}
