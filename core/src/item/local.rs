// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use jiff::Timestamp;
use jiff::civil::DateTime;
use jiff::tz::TimeZone;

use crate::error::{StoreKind, SyncError};
use crate::item::Item;

/// Placeholder the scripting bridge prints for an unset property.
pub const MISSING_VALUE: &str = "missing value";

/// Date format used by the scripting bridge, e.g. `Thursday, 18 April 2024 at 08:00:00`.
pub const LOCAL_DATE_FORMAT: &str = "%A, %-d %B %Y at %H:%M:%S";

const PARSE_DATE_FORMAT: &str = "%A, %d %B %Y at %H:%M:%S";

/// Separates fields within a record printed by the scripting bridge.
pub const UNIT_SEPARATOR: char = '\u{1f}';

/// Field values of one reminder, in the order the scripting bridge prints them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalFields {
    pub id: String,
    pub name: String,
    pub created: String,
    pub completed: String,
    pub due: String,
    pub all_day: String,
    pub remind: String,
    pub modified: String,
    pub completion: String,
    pub body: String,
}

impl LocalFields {
    /// Number of fields in one record.
    pub const COUNT: usize = 10;

    /// Splits one record into its fields.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::MalformedRecord`] if the record does not have
    /// exactly [`Self::COUNT`] fields.
    pub fn from_record(record: &str, separator: char) -> Result<Self, SyncError> {
        let values: Vec<&str> = record.splitn(Self::COUNT, separator).collect();
        let [id, name, created, completed, due, all_day, remind, modified, completion, body] =
            values.as_slice()
        else {
            return Err(SyncError::malformed(
                StoreKind::Local,
                format!("expected {} fields, got {}", Self::COUNT, values.len()),
            ));
        };

        Ok(Self {
            id: (*id).to_string(),
            name: (*name).to_string(),
            created: (*created).to_string(),
            completed: (*completed).to_string(),
            due: (*due).to_string(),
            all_day: (*all_day).to_string(),
            remind: (*remind).to_string(),
            modified: (*modified).to_string(),
            completion: (*completion).to_string(),
            body: (*body).to_string(),
        })
    }

    /// Renders an item the way the scripting bridge would print it.
    pub fn from_item(item: &Item, tz: &TimeZone) -> Self {
        Self {
            id: item.local_id.clone().unwrap_or_else(|| MISSING_VALUE.to_string()),
            name: item.name.clone(),
            created: format_date(Some(item.created_at), tz),
            completed: item.is_completed().to_string(),
            due: format_date(item.due_at, tz),
            all_day: item.all_day.to_string(),
            remind: format_date(item.remind_at, tz),
            modified: format_date(Some(item.modified_at), tz),
            completion: format_date(item.completed_at, tz),
            body: if item.notes.is_empty() {
                MISSING_VALUE.to_string()
            } else {
                item.notes.clone()
            },
        }
    }

    /// Joins the fields into one bridge record.
    pub fn to_record(&self) -> String {
        self.values().join(&UNIT_SEPARATOR.to_string())
    }

    /// The fields in bridge order.
    pub fn values(&self) -> [&str; Self::COUNT] {
        [
            &self.id,
            &self.name,
            &self.created,
            &self.completed,
            &self.due,
            &self.all_day,
            &self.remind,
            &self.modified,
            &self.completion,
            &self.body,
        ]
    }
}

/// The reminder id of a bridge record, even one that cannot be parsed.
pub(crate) fn id_of(record: &str) -> Option<String> {
    let id = record.split(UNIT_SEPARATOR).next()?;
    value(id).map(str::to_string)
}

pub(crate) fn parse(fields: &LocalFields, tz: &TimeZone) -> Result<Item, SyncError> {
    let id = value(&fields.id).ok_or_else(|| malformed("missing id"))?;
    let name = value(&fields.name).ok_or_else(|| malformed("missing name"))?;

    let created = parse_date(&fields.created, tz)?;
    let modified = parse_date(&fields.modified, tz)?;
    let (created_at, modified_at) = match (created, modified) {
        (Some(c), Some(m)) => (c, m),
        (Some(c), None) => (c, c),
        (None, Some(m)) => (m, m),
        (None, None) => return Err(malformed(format!("{name:?} has no creation date"))),
    };

    let completed_at = match (parse_flag(&fields.completed), parse_date(&fields.completion, tz)?) {
        (_, Some(at)) => Some(at),
        (true, None) => Some(modified_at),
        (false, None) => None,
    };

    Ok(Item {
        local_id: Some(id.to_string()),
        remote_id: None,
        name: name.to_string(),
        created_at,
        due_at: parse_date(&fields.due, tz)?,
        all_day: parse_flag(&fields.all_day),
        remind_at: parse_date(&fields.remind, tz)?,
        modified_at,
        completed_at,
        notes: value(&fields.body).unwrap_or_default().to_string(),
    })
}

fn value(s: &str) -> Option<&str> {
    match s.trim() {
        "" | MISSING_VALUE => None,
        v => Some(v),
    }
}

fn parse_flag(s: &str) -> bool {
    s.trim().eq_ignore_ascii_case("true")
}

fn parse_date(s: &str, tz: &TimeZone) -> Result<Option<Timestamp>, SyncError> {
    let Some(s) = value(s) else {
        return Ok(None);
    };

    DateTime::strptime(PARSE_DATE_FORMAT, s)
        .and_then(|dt| dt.to_zoned(tz.clone()))
        .map(|zoned| Some(zoned.timestamp()))
        .map_err(|e| malformed(format!("invalid date {s:?}: {e}")))
}

fn format_date(ts: Option<Timestamp>, tz: &TimeZone) -> String {
    match ts {
        Some(ts) => ts.to_zoned(tz.clone()).strftime(LOCAL_DATE_FORMAT).to_string(),
        None => MISSING_VALUE.to_string(),
    }
}

fn malformed(reason: impl Into<String>) -> SyncError {
    SyncError::malformed(StoreKind::Local, reason)
}
