// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::fmt;

use crate::report::SyncReport;

/// Error type returned by store drivers.
pub type StoreError = Box<dyn std::error::Error + Send + Sync>;

/// Result type returned by store drivers.
pub type StoreResult<T> = Result<T, StoreError>;

/// Which side of the synchronization a failure or record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    /// The OS-native reminders store.
    Local,
    /// The `CalDAV` task server.
    Remote,
}

impl fmt::Display for StoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local => f.write_str("local"),
            Self::Remote => f.write_str("remote"),
        }
    }
}

/// Errors raised by the synchronization engine.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// A raw record could not be turned into an item.
    #[error("malformed {store} record: {reason}")]
    MalformedRecord {
        /// The store that produced the record.
        store: StoreKind,
        /// What was missing or unparseable.
        reason: String,
    },

    /// Listing a store failed; the run stops before mutating anything further.
    #[error("failed to discover {store} store: {cause}")]
    DiscoveryFailed {
        /// The store that could not be listed.
        store: StoreKind,
        /// The driver error.
        cause: StoreError,
    },

    /// A single create, update or delete failed.
    #[error("{operation} failed: {cause}")]
    OperationFailed {
        /// Human readable description of the operation.
        operation: String,
        /// The driver error.
        cause: StoreError,
    },

    /// The previous snapshot could not be read.
    #[error("failed to read sync snapshot: {0}")]
    SnapshotUnavailable(StoreError),

    /// Writing the snapshot failed after the stores were reconciled.
    ///
    /// The report lists what was already applied to the stores.
    #[error("failed to persist sync snapshot: {cause}")]
    PersistenceFailed {
        /// The driver error.
        cause: StoreError,
        /// Operations applied before persistence failed.
        report: Box<SyncReport>,
    },

    /// Another run holds the engine.
    #[error("a synchronization run is already in progress")]
    RunInProgress,

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl SyncError {
    pub(crate) fn malformed(store: StoreKind, reason: impl Into<String>) -> Self {
        Self::MalformedRecord {
            store,
            reason: reason.into(),
        }
    }
}
