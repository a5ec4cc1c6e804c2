// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

pub(crate) mod ics;
mod local;

use jiff::Timestamp;
use jiff::tz::TimeZone;

use crate::error::{StoreKind, SyncError};

pub use crate::item::local::{LOCAL_DATE_FORMAT, LocalFields, MISSING_VALUE, UNIT_SEPARATOR};

/// A task record normalized from either store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    /// Identifier assigned by the local reminders store.
    pub local_id: Option<String>,

    /// The iCalendar `UID` assigned on the remote server.
    pub remote_id: Option<String>,

    /// Title of the task.
    pub name: String,

    /// When the task was created.
    pub created_at: Timestamp,

    /// When the task is due.
    pub due_at: Option<Timestamp>,

    /// Whether `due_at` denotes a whole day rather than an instant.
    pub all_day: bool,

    /// When the store should alert the user.
    pub remind_at: Option<Timestamp>,

    /// Last modification time according to the store that produced the item.
    pub modified_at: Timestamp,

    /// When the task was completed. `Some` means the task is completed.
    pub completed_at: Option<Timestamp>,

    /// Free-form notes.
    pub notes: String,
}

/// A record as delivered by a store driver, before normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawRecord {
    /// One record printed by the scripting bridge, fields separated by
    /// [`UNIT_SEPARATOR`].
    Local(String),

    /// An iCalendar object containing one `VTODO`.
    Remote(String),
}

impl RawRecord {
    /// Wraps a record read from the local store.
    pub fn from_local_record(record: impl Into<String>) -> Self {
        Self::Local(record.into())
    }

    /// Renders field values as a local record.
    pub fn from_local_fields(fields: &LocalFields) -> Self {
        Self::Local(fields.to_record())
    }

    /// Wraps an iCalendar object read from the remote store.
    pub fn from_remote_ics(ics: impl Into<String>) -> Self {
        Self::Remote(ics.into())
    }

    /// The store the record was read from.
    pub fn store(&self) -> StoreKind {
        match self {
            Self::Local(_) => StoreKind::Local,
            Self::Remote(_) => StoreKind::Remote,
        }
    }

    /// The identifier the record carries on its store, recovered without
    /// parsing the rest of it.
    pub fn id(&self) -> Option<String> {
        match self {
            Self::Local(record) => local::id_of(record),
            Self::Remote(ics) => ics::uid_of(ics),
        }
    }
}

impl Item {
    /// Creates a new item that exists on neither store yet.
    pub fn new(name: impl Into<String>, modified_at: Timestamp) -> Self {
        Self {
            local_id: None,
            remote_id: None,
            name: name.into(),
            created_at: modified_at,
            due_at: None,
            all_day: false,
            remind_at: None,
            modified_at,
            completed_at: None,
            notes: String::new(),
        }
    }

    /// Parses a raw record.
    ///
    /// Dates without an explicit offset are interpreted in `tz`.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::MalformedRecord`] if the name, the identifier or
    /// every timestamp that could establish the record's age is missing, or
    /// if a present value cannot be parsed.
    pub fn parse(raw: &RawRecord, tz: &TimeZone) -> Result<Self, SyncError> {
        match raw {
            RawRecord::Local(record) => {
                local::parse(&LocalFields::from_record(record, UNIT_SEPARATOR)?, tz)
            }
            RawRecord::Remote(ics) => ics::parse(ics, tz),
        }
    }

    /// Serializes the item as an iCalendar object with the given `UID`.
    pub fn to_ics(&self, uid: &str, tz: &TimeZone) -> String {
        ics::write(self, uid, tz)
    }

    /// Whether the item is completed.
    pub fn is_completed(&self) -> bool {
        self.completed_at.is_some()
    }

    /// Identifier of the item on the given store.
    pub fn id(&self, store: StoreKind) -> Option<&str> {
        match store {
            StoreKind::Local => self.local_id.as_deref(),
            StoreKind::Remote => self.remote_id.as_deref(),
        }
    }

    /// Sets the identifier of the item on the given store.
    pub fn set_id(&mut self, store: StoreKind, id: Option<String>) {
        match store {
            StoreKind::Local => self.local_id = id,
            StoreKind::Remote => self.remote_id = id,
        }
    }

    /// Copies the mutable fields of `other`, keeping identity and creation time.
    pub fn apply_fields_from(&mut self, other: &Item) {
        self.name.clone_from(&other.name);
        self.due_at = other.due_at;
        self.all_day = other.all_day;
        self.remind_at = other.remind_at;
        self.completed_at = other.completed_at;
        self.notes.clone_from(&other.notes);
        self.modified_at = other.modified_at;
    }
}
