// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Response parsers for WebDAV/CalDAV operations.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::error::CalDavError;
use crate::types::{CalendarCollection, CalendarResource, ETag, Href};
use crate::xml::read_element_text;

/// `WebDAV` multistatus response.
#[derive(Debug, Clone, Default)]
pub struct MultiStatusResponse {
    /// The response items.
    pub responses: Vec<ResponseItem>,
}

/// Individual response in multistatus.
#[derive(Debug, Clone, Default)]
pub struct ResponseItem {
    /// The href the response describes.
    pub href: Href,
    /// Property groups, one per reported status.
    pub prop_stats: Vec<PropStat>,
}

/// Property stat with status and value.
#[derive(Debug, Clone, Default)]
pub struct PropStat {
    /// The properties in this group.
    pub props: Properties,
    /// The raw status line, e.g. `HTTP/1.1 200 OK`.
    pub status: String,
}

impl PropStat {
    /// Whether the group carries successfully retrieved values.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.status.contains(" 200")
    }
}

/// WebDAV/CalDAV properties.
#[derive(Debug, Clone, Default)]
pub struct Properties {
    /// `D:displayname`.
    pub display_name: Option<String>,
    /// `D:getetag`.
    pub get_etag: Option<ETag>,
    /// `C:calendar-data`.
    pub calendar_data: Option<String>,
    /// `C:supported-calendar-component-set`.
    pub supported_calendar_components: Option<Vec<String>>,
    /// `D:resourcetype` contains `C:calendar`.
    pub is_calendar: bool,
}

impl MultiStatusResponse {
    /// Parses multistatus response from XML.
    ///
    /// # Errors
    ///
    /// Returns an error if XML parsing fails.
    pub fn from_xml(xml: &str) -> Result<Self, CalDavError> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);
        reader.config_mut().check_end_names = true;

        let mut responses = Vec::new();
        let mut current: Option<ResponseItem> = None;
        let mut props = Properties::default();
        let mut in_propstat = false;

        loop {
            match reader.read_event()? {
                Event::Eof => break,
                Event::Start(ref e) => match e.name().local_name().into_inner() {
                    b"response" => current = Some(ResponseItem::default()),
                    b"href" if !in_propstat => {
                        let href = read_element_text(&mut reader, e)?;
                        if let Some(resp) = current.as_mut() {
                            resp.href = Href::new(href);
                        }
                    }
                    b"propstat" => {
                        in_propstat = true;
                        props = Properties::default();
                    }
                    b"displayname" if in_propstat => {
                        props.display_name = Some(read_element_text(&mut reader, e)?);
                    }
                    b"getetag" if in_propstat => {
                        props.get_etag = Some(ETag::new(read_element_text(&mut reader, e)?));
                    }
                    b"calendar-data" if in_propstat => {
                        props.calendar_data = Some(read_element_text(&mut reader, e)?);
                    }
                    b"resourcetype" if in_propstat => {
                        props.is_calendar = read_resource_type(&mut reader)?;
                    }
                    b"supported-calendar-component-set" if in_propstat => {
                        props.supported_calendar_components =
                            Some(read_supported_components(&mut reader)?);
                    }
                    b"status" if in_propstat => {
                        let status = read_element_text(&mut reader, e)?;
                        if let Some(resp) = current.as_mut() {
                            resp.prop_stats.push(PropStat {
                                props: std::mem::take(&mut props),
                                status,
                            });
                        }
                    }
                    _ => {}
                },
                Event::End(ref e) => match e.name().local_name().into_inner() {
                    b"propstat" => in_propstat = false,
                    b"response" => responses.extend(current.take()),
                    _ => {}
                },
                _ => {}
            }
        }

        Ok(Self { responses })
    }

    /// Converts the response into calendar object resources.
    ///
    /// Entries without calendar data (such as the collection itself) are skipped.
    #[must_use]
    pub fn into_resources(self) -> Vec<CalendarResource> {
        let mut resources = Vec::new();
        for response in self.responses {
            for prop_stat in response.prop_stats {
                if !prop_stat.is_ok() {
                    continue;
                }
                if let Some(data) = prop_stat.props.calendar_data {
                    resources.push(CalendarResource {
                        href: response.href.clone(),
                        etag: prop_stat.props.get_etag,
                        data,
                    });
                }
            }
        }
        resources
    }

    /// Converts the response into calendar collections.
    #[must_use]
    pub fn into_collections(self) -> Vec<CalendarCollection> {
        let mut collections = Vec::new();
        for response in self.responses {
            for prop_stat in response.prop_stats {
                if prop_stat.is_ok() && prop_stat.props.is_calendar {
                    let mut collection = CalendarCollection::new(response.href.clone());
                    collection.display_name = prop_stat.props.display_name;
                    collection.supported_components = prop_stat
                        .props
                        .supported_calendar_components
                        .unwrap_or_default();
                    collections.push(collection);
                }
            }
        }
        collections
    }
}

fn read_resource_type(reader: &mut Reader<&[u8]>) -> Result<bool, CalDavError> {
    let mut is_calendar = false;
    loop {
        match reader.read_event()? {
            Event::End(ref e) if e.name().local_name().into_inner() == b"resourcetype" => break,
            Event::Start(ref e) | Event::Empty(ref e) => {
                if e.name().local_name().into_inner() == b"calendar" {
                    is_calendar = true;
                }
            }
            Event::Eof => return Err(CalDavError::Xml("Unexpected EOF".to_string())),
            _ => {}
        }
    }
    Ok(is_calendar)
}

fn read_supported_components(reader: &mut Reader<&[u8]>) -> Result<Vec<String>, CalDavError> {
    let mut components = Vec::new();
    loop {
        match reader.read_event()? {
            Event::End(ref e)
                if e.name().local_name().into_inner() == b"supported-calendar-component-set" =>
            {
                break;
            }
            Event::Start(ref e) | Event::Empty(ref e)
                if e.name().local_name().into_inner() == b"comp" =>
            {
                if let Some(name) = comp_name(e)? {
                    components.push(name);
                }
            }
            Event::Eof => return Err(CalDavError::Xml("Unexpected EOF".to_string())),
            _ => {}
        }
    }
    Ok(components)
}

fn comp_name(e: &BytesStart<'_>) -> Result<Option<String>, CalDavError> {
    match e.try_get_attribute("name") {
        Ok(Some(attr)) => std::str::from_utf8(&attr.value)
            .map(|s| Some(s.to_string()))
            .map_err(|e| CalDavError::Xml(format!("UTF-8 error: {e}"))),
        Ok(None) => Ok(None),
        Err(e) => Err(CalDavError::Xml(e.to_string())),
    }
}
