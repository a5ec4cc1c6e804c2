// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Just enough of RFC 5545 to read and write a single `VTODO`.

use jiff::civil::{Date, DateTime};
use jiff::tz::TimeZone;
use jiff::{SignedDuration, Timestamp};

use crate::error::{StoreKind, SyncError};
use crate::item::Item;

const PRODID: &str = "-//TaskBridge//TaskBridge//EN";
const MAX_LINE_OCTETS: usize = 75;

/// One unfolded content line: `NAME;PARAM=VALUE:value`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ContentLine<'a> {
    name: &'a str,
    params: Vec<(&'a str, &'a str)>,
    value: &'a str,
}

impl<'a> ContentLine<'a> {
    fn parse(line: &'a str) -> Option<Self> {
        let mut in_quotes = false;
        let colon = line.char_indices().find_map(|(i, c)| match c {
            '"' => {
                in_quotes = !in_quotes;
                None
            }
            ':' if !in_quotes => Some(i),
            _ => None,
        })?;

        let (head, value) = (&line[..colon], &line[colon + 1..]);
        let mut parts = head.split(';');
        let name = parts.next()?.trim();
        let params = parts
            .filter_map(|p| p.split_once('='))
            .map(|(k, v)| (k.trim(), v.trim_matches('"')))
            .collect();

        Some(Self {
            name,
            params,
            value,
        })
    }

    fn is(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    fn param(&self, key: &str) -> Option<&'a str> {
        self.params
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| *v)
    }
}

/// Joins folded lines back together.
pub(crate) fn unfold(text: &str) -> String {
    text.replace("\r\n ", "")
        .replace("\r\n\t", "")
        .replace("\n ", "")
        .replace("\n\t", "")
}

/// Splits a line into chunks of at most 75 octets joined by CRLF + space.
pub(crate) fn fold(line: &str) -> String {
    let mut out = String::with_capacity(line.len() + line.len() / MAX_LINE_OCTETS * 3);
    let mut width = 0;
    for c in line.chars() {
        let len = c.len_utf8();
        if width + len > MAX_LINE_OCTETS {
            out.push_str("\r\n ");
            width = 1;
        }
        out.push(c);
        width += len;
    }
    out
}

pub(crate) fn escape_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            ';' => out.push_str("\\;"),
            ',' => out.push_str("\\,"),
            '\n' => out.push_str("\\n"),
            '\r' => {}
            c => out.push(c),
        }
    }
    out
}

pub(crate) fn unescape_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n' | 'N') => out.push('\n'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

/// Extracts the `UID` of the first `VTODO`, if any.
pub(crate) fn uid_of(ics: &str) -> Option<String> {
    let text = unfold(ics);
    let mut in_todo = false;
    for line in text.lines().filter_map(ContentLine::parse) {
        let is_todo = line.value.trim().eq_ignore_ascii_case("VTODO");
        if line.is("BEGIN") && is_todo {
            in_todo = true;
        } else if line.is("END") && is_todo {
            return None;
        } else if in_todo && line.is("UID") {
            return Some(unescape_text(line.value.trim()));
        }
    }
    None
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Outside,
    Todo,
    Alarm,
    Nested,
    Done,
}

#[derive(Debug, Clone, Copy)]
enum Trigger {
    Absolute(Timestamp),
    Relative(SignedDuration),
}

pub(crate) fn parse(ics: &str, tz: &TimeZone) -> Result<Item, SyncError> {
    let text = unfold(ics);

    let mut section = Section::Outside;
    let mut seen_alarm = false;
    let mut uid = None;
    let mut summary = None;
    let mut description = None;
    let mut created = None;
    let mut stamp = None;
    let mut last_modified = None;
    let mut due = None;
    let mut all_day = false;
    let mut completed = None;
    let mut status_completed = false;
    let mut trigger = None;

    for line in text.lines().filter_map(ContentLine::parse) {
        let value = line.value.trim();
        match section {
            Section::Outside if line.is("BEGIN") && value.eq_ignore_ascii_case("VTODO") => {
                section = Section::Todo;
            }
            Section::Outside | Section::Done => {}
            Section::Todo if line.is("END") && value.eq_ignore_ascii_case("VTODO") => {
                section = Section::Done;
            }
            Section::Todo if line.is("BEGIN") => {
                section = if value.eq_ignore_ascii_case("VALARM") && !seen_alarm {
                    seen_alarm = true;
                    Section::Alarm
                } else {
                    Section::Nested
                };
            }
            Section::Alarm | Section::Nested if line.is("END") => section = Section::Todo,
            Section::Nested => {}
            Section::Alarm => {
                if line.is("TRIGGER") {
                    trigger = Some(parse_trigger(&line, tz)?);
                }
            }
            Section::Todo => match line.name.to_ascii_uppercase().as_str() {
                "UID" => uid = Some(unescape_text(value)),
                "SUMMARY" => summary = Some(unescape_text(value)),
                "DESCRIPTION" => description = Some(unescape_text(value)),
                "CREATED" => created = Some(parse_date_time(&line, tz)?.0),
                "DTSTAMP" => stamp = Some(parse_date_time(&line, tz)?.0),
                "LAST-MODIFIED" => last_modified = Some(parse_date_time(&line, tz)?.0),
                "DUE" => {
                    let (at, is_date) = parse_date_time(&line, tz)?;
                    due = Some(at);
                    all_day = is_date;
                }
                "COMPLETED" => completed = Some(parse_date_time(&line, tz)?.0),
                "STATUS" => status_completed = value.eq_ignore_ascii_case("COMPLETED"),
                _ => {}
            },
        }
    }

    if section == Section::Outside {
        return Err(malformed("no VTODO component"));
    }
    let uid = uid.filter(|u| !u.is_empty()).ok_or_else(|| malformed("missing UID"))?;
    let name = summary
        .filter(|s| !s.is_empty())
        .ok_or_else(|| malformed(format!("{uid} has no SUMMARY")))?;
    let modified_at = last_modified
        .or(stamp)
        .or(created)
        .ok_or_else(|| malformed(format!("{uid} has no timestamp")))?;

    let remind_at = match trigger {
        Some(Trigger::Absolute(at)) => Some(at),
        Some(Trigger::Relative(offset)) => match due {
            Some(due) => Some(due.checked_add(offset).map_err(|e| {
                malformed(format!("alarm of {uid} is out of range: {e}"))
            })?),
            None => {
                tracing::debug!(uid, "ignoring relative alarm without a due date");
                None
            }
        },
        None => None,
    };

    let completed_at = match (completed, status_completed) {
        (Some(at), _) => Some(at),
        (None, true) => Some(modified_at),
        (None, false) => None,
    };

    Ok(Item {
        local_id: None,
        remote_id: Some(uid),
        name,
        created_at: created.unwrap_or(modified_at),
        due_at: due,
        all_day,
        remind_at,
        modified_at,
        completed_at,
        notes: description.unwrap_or_default(),
    })
}

pub(crate) fn write(item: &Item, uid: &str, tz: &TimeZone) -> String {
    let mut lines = vec![
        "BEGIN:VCALENDAR".to_string(),
        "VERSION:2.0".to_string(),
        format!("PRODID:{PRODID}"),
        "BEGIN:VTODO".to_string(),
        format!("UID:{}", escape_text(uid)),
        format!("DTSTAMP:{}", utc(item.modified_at)),
        format!("CREATED:{}", utc(item.created_at)),
        format!("LAST-MODIFIED:{}", utc(item.modified_at)),
        format!("SUMMARY:{}", escape_text(&item.name)),
    ];

    if !item.notes.is_empty() {
        lines.push(format!("DESCRIPTION:{}", escape_text(&item.notes)));
    }

    match item.due_at {
        Some(due) if item.all_day => {
            let date = due.to_zoned(tz.clone()).date();
            lines.push(format!("DUE;VALUE=DATE:{}", date.strftime("%Y%m%d")));
        }
        Some(due) => lines.push(format!("DUE:{}", utc(due))),
        None => {}
    }

    match item.completed_at {
        Some(at) => {
            lines.push("STATUS:COMPLETED".to_string());
            lines.push(format!("COMPLETED:{}", utc(at)));
        }
        None => lines.push("STATUS:NEEDS-ACTION".to_string()),
    }

    if let Some(at) = item.remind_at {
        lines.push("BEGIN:VALARM".to_string());
        lines.push("ACTION:DISPLAY".to_string());
        lines.push(format!("DESCRIPTION:{}", escape_text(&item.name)));
        lines.push(format!("TRIGGER;VALUE=DATE-TIME:{}", utc(at)));
        lines.push("END:VALARM".to_string());
    }

    lines.push("END:VTODO".to_string());
    lines.push("END:VCALENDAR".to_string());

    let mut out = String::new();
    for line in lines {
        out.push_str(&fold(&line));
        out.push_str("\r\n");
    }
    out
}

fn utc(ts: Timestamp) -> String {
    ts.strftime("%Y%m%dT%H%M%SZ").to_string()
}

/// Parses a DATE or DATE-TIME value, reporting whether it was a DATE.
fn parse_date_time(line: &ContentLine<'_>, tz: &TimeZone) -> Result<(Timestamp, bool), SyncError> {
    let value = line.value.trim();
    let invalid = |e: jiff::Error| malformed(format!("invalid {} {value:?}: {e}", line.name));

    let is_date = line
        .param("VALUE")
        .is_some_and(|v| v.eq_ignore_ascii_case("DATE"))
        || (value.len() == 8 && value.bytes().all(|b| b.is_ascii_digit()));
    if is_date {
        let at = Date::strptime("%Y%m%d", value)
            .and_then(|d| d.to_zoned(tz.clone()))
            .map_err(invalid)?;
        return Ok((at.timestamp(), true));
    }

    let (civil, zone) = match value.strip_suffix('Z') {
        Some(rest) => (rest, TimeZone::UTC),
        None => (value, zone_of(line, tz)),
    };
    let at = DateTime::strptime("%Y%m%dT%H%M%S", civil)
        .and_then(|dt| dt.to_zoned(zone))
        .map_err(invalid)?;
    Ok((at.timestamp(), false))
}

fn zone_of(line: &ContentLine<'_>, tz: &TimeZone) -> TimeZone {
    let Some(tzid) = line.param("TZID") else {
        return tz.clone();
    };
    match TimeZone::get(tzid) {
        Ok(zone) => zone,
        Err(e) => {
            tracing::warn!(tzid, err = %e, "unknown TZID, using the configured time zone");
            tz.clone()
        }
    }
}

fn parse_trigger(line: &ContentLine<'_>, tz: &TimeZone) -> Result<Trigger, SyncError> {
    let absolute = line
        .param("VALUE")
        .is_some_and(|v| v.eq_ignore_ascii_case("DATE-TIME"));
    if absolute {
        return Ok(Trigger::Absolute(parse_date_time(line, tz)?.0));
    }

    parse_duration(line.value.trim())
        .map(Trigger::Relative)
        .ok_or_else(|| malformed(format!("invalid TRIGGER {:?}", line.value)))
}

/// Parses an RFC 5545 duration such as `-PT15M` or `P1DT2H`.
fn parse_duration(s: &str) -> Option<SignedDuration> {
    let (negative, rest) = match s.as_bytes().first()? {
        b'-' => (true, &s[1..]),
        b'+' => (false, &s[1..]),
        _ => (false, s),
    };
    let rest = rest.strip_prefix('P')?;

    let mut secs: i64 = 0;
    let mut number = String::new();
    let mut in_time = false;
    let mut any = false;
    for c in rest.chars() {
        match c {
            '0'..='9' => number.push(c),
            'T' if number.is_empty() => in_time = true,
            unit => {
                let n: i64 = number.parse().ok()?;
                number.clear();
                let scale = match (unit, in_time) {
                    ('W', false) => 7 * 86_400,
                    ('D', false) => 86_400,
                    ('H', true) => 3_600,
                    ('M', true) => 60,
                    ('S', true) => 1,
                    _ => return None,
                };
                secs = secs.checked_add(n.checked_mul(scale)?)?;
                any = true;
            }
        }
    }
    if !number.is_empty() || !any {
        return None;
    }

    Some(SignedDuration::from_secs(if negative { -secs } else { secs }))
}

fn malformed(reason: impl Into<String>) -> SyncError {
    SyncError::malformed(StoreKind::Remote, reason)
}
