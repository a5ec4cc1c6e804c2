// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::fmt;
use std::ops::Deref;

/// Calendar resource href (path).
///
/// A `Href` is the server-relative path of a collection or object, such as
/// `/calendars/alice/work/` or `/calendars/alice/work/1234.ics`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Href(String);

impl Href {
    /// Creates a new `Href` from a string.
    #[must_use]
    pub const fn new(href: String) -> Self {
        Self(href)
    }

    /// Returns the inner string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Joins a child segment onto a collection href.
    #[must_use]
    pub fn join(&self, segment: &str) -> Self {
        let base = self.0.trim_end_matches('/');
        Self(format!("{base}/{segment}"))
    }

    /// The last non-empty path segment, percent-decoding nothing.
    #[must_use]
    pub fn last_segment(&self) -> &str {
        self.0
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or_default()
    }
}

impl Deref for Href {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Display for Href {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for Href {
    fn from(href: String) -> Self {
        Self(href)
    }
}

impl From<&str> for Href {
    fn from(href: &str) -> Self {
        Self(href.to_string())
    }
}

/// Entity tag used for optimistic concurrency on writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ETag(String);

impl ETag {
    /// Creates a new `ETag` from a string.
    #[must_use]
    pub const fn new(etag: String) -> Self {
        Self(etag)
    }

    /// Returns the inner string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ETag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for ETag {
    fn from(etag: &str) -> Self {
        Self(etag.to_string())
    }
}

/// A calendar object resource with its raw iCalendar text.
#[derive(Debug, Clone)]
pub struct CalendarResource {
    /// The href of the resource.
    pub href: Href,
    /// The entity tag of the resource, if the server reported one.
    pub etag: Option<ETag>,
    /// The iCalendar text (`BEGIN:VCALENDAR` ... `END:VCALENDAR`).
    pub data: String,
}

/// Calendar collection metadata.
#[derive(Debug, Clone)]
pub struct CalendarCollection {
    /// The href of the calendar collection.
    pub href: Href,
    /// The display name of the calendar.
    pub display_name: Option<String>,
    /// Supported component types (VEVENT, VTODO, etc.).
    pub supported_components: Vec<String>,
}

impl CalendarCollection {
    /// Creates a new `CalendarCollection`.
    #[must_use]
    pub fn new(href: Href) -> Self {
        Self {
            href,
            display_name: None,
            supported_components: Vec::new(),
        }
    }

    /// The user-facing name: the display name, or the last href segment.
    #[must_use]
    pub fn name(&self) -> &str {
        match self.display_name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => self.href.last_segment(),
        }
    }

    /// Whether the collection accepts `VTODO` components.
    ///
    /// Servers that omit `supported-calendar-component-set` accept all types.
    #[must_use]
    pub fn supports_todos(&self) -> bool {
        self.supported_components.is_empty()
            || self
                .supported_components
                .iter()
                .any(|c| c.eq_ignore_ascii_case("VTODO"))
    }
}
