// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! XML utilities for WebDAV/CalDAV processing.

use quick_xml::Reader;
use quick_xml::events::BytesStart;

use crate::error::CalDavError;

/// XML namespaces used in `CalDAV`.
pub mod ns {
    /// `WebDAV` namespace.
    pub const DAV: &str = "DAV:";

    /// `CalDAV` namespace.
    pub const CALDAV: &str = "urn:ietf:params:xml:ns:caldav";
}

/// Reads and unescapes the text content of `start` up to its end tag.
///
/// Entity and character references (servers commonly send `&#13;` inside
/// calendar data) are resolved after the raw text has been collected.
pub fn read_element_text(
    reader: &mut Reader<&[u8]>,
    start: &BytesStart<'_>,
) -> Result<String, CalDavError> {
    let end = start.to_end().into_owned();
    let raw = reader.read_text(end.name())?;
    let text = quick_xml::escape::unescape(&raw)
        .map_err(|e| CalDavError::Xml(format!("Invalid escape sequence: {e}")))?;
    Ok(text.trim().to_string())
}

