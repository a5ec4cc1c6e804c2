// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Request builders for `CalDAV` operations.

use std::io::Cursor;

use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};

use crate::error::CalDavError;
use crate::xml::ns;

type XmlWriter = Writer<Cursor<Vec<u8>>>;

/// PROPFIND request builder.
#[derive(Debug, Default)]
pub struct PropFindRequest {
    props: Vec<Prop>,
}

/// Properties to request in PROPFIND.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prop {
    /// Display name.
    DisplayName,
    /// Resource type.
    ResourceType,
    /// `ETag`.
    GetETag,
    /// Calendar data.
    CalendarData,
    /// Supported calendar components.
    SupportedCalendarComponents,
}

impl Prop {
    const fn name(self) -> &'static str {
        match self {
            Self::DisplayName => "displayname",
            Self::ResourceType => "resourcetype",
            Self::GetETag => "getetag",
            Self::CalendarData => "calendar-data",
            Self::SupportedCalendarComponents => "supported-calendar-component-set",
        }
    }

    const fn is_caldav(self) -> bool {
        matches!(self, Self::CalendarData | Self::SupportedCalendarComponents)
    }

    fn write_empty(self, writer: &mut XmlWriter) -> Result<(), CalDavError> {
        let prefix = if self.is_caldav() { "C" } else { "D" };
        let tag = format!("{prefix}:{}", self.name());
        writer.write_event(Event::Start(BytesStart::new(tag.as_str())))?;
        writer.write_event(Event::End(BytesEnd::new(tag.as_str())))?;
        Ok(())
    }
}

impl PropFindRequest {
    /// Creates a new PROPFIND request.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a property to the request.
    #[must_use]
    pub fn prop(mut self, prop: Prop) -> Self {
        self.props.push(prop);
        self
    }

    /// Builds the XML body for the PROPFIND request.
    ///
    /// # Errors
    ///
    /// Returns an error if XML building fails.
    pub fn build(&self) -> Result<String, CalDavError> {
        let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);

        // <D:propfind xmlns:D="DAV:" [xmlns:C="urn:ietf:params:xml:ns:caldav"]>
        let mut propfind = BytesStart::new("D:propfind");
        propfind.push_attribute(("xmlns:D", ns::DAV));
        if self.props.iter().any(|p| p.is_caldav()) {
            propfind.push_attribute(("xmlns:C", ns::CALDAV));
        }
        writer.write_event(Event::Start(propfind))?;
        writer.write_event(Event::Start(BytesStart::new("D:prop")))?;
        for prop in &self.props {
            prop.write_empty(&mut writer)?;
        }
        writer.write_event(Event::End(BytesEnd::new("D:prop")))?;
        writer.write_event(Event::End(BytesEnd::new("D:propfind")))?;

        into_string(writer)
    }
}

/// `calendar-query` REPORT builder that selects every object of one component type.
#[derive(Debug)]
pub struct CalendarQueryRequest {
    component: String,
}

impl CalendarQueryRequest {
    /// Creates a query for all `VTODO` components.
    #[must_use]
    pub fn todos() -> Self {
        Self::component("VTODO")
    }

    /// Creates a query for the given component type (VEVENT, VTODO, ...).
    #[must_use]
    pub fn component(component: impl Into<String>) -> Self {
        Self {
            component: component.into(),
        }
    }

    /// Builds the XML body for the calendar query request.
    ///
    /// # Errors
    ///
    /// Returns an error if XML building fails.
    pub fn build(&self) -> Result<String, CalDavError> {
        let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);

        let mut calendar_query = BytesStart::new("C:calendar-query");
        calendar_query.push_attribute(("xmlns:D", ns::DAV));
        calendar_query.push_attribute(("xmlns:C", ns::CALDAV));
        writer.write_event(Event::Start(calendar_query))?;

        writer.write_event(Event::Start(BytesStart::new("D:prop")))?;
        Prop::GetETag.write_empty(&mut writer)?;
        Prop::CalendarData.write_empty(&mut writer)?;
        writer.write_event(Event::End(BytesEnd::new("D:prop")))?;

        // <C:filter><C:comp-filter name="VCALENDAR"><C:comp-filter name="VTODO"/></...></C:filter>
        writer.write_event(Event::Start(BytesStart::new("C:filter")))?;
        let mut vcalendar = BytesStart::new("C:comp-filter");
        vcalendar.push_attribute(("name", "VCALENDAR"));
        writer.write_event(Event::Start(vcalendar))?;
        let mut component = BytesStart::new("C:comp-filter");
        component.push_attribute(("name", self.component.as_str()));
        writer.write_event(Event::Empty(component))?;
        writer.write_event(Event::End(BytesEnd::new("C:comp-filter")))?;
        writer.write_event(Event::End(BytesEnd::new("C:filter")))?;

        writer.write_event(Event::End(BytesEnd::new("C:calendar-query")))?;

        into_string(writer)
    }
}

/// MKCALENDAR request body builder.
#[derive(Debug)]
pub struct MkCalendarRequest {
    display_name: String,
    components: Vec<String>,
}

impl MkCalendarRequest {
    /// Creates a request for a calendar with the given display name.
    #[must_use]
    pub fn new(display_name: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            components: Vec::new(),
        }
    }

    /// Restricts the new calendar to a component type.
    #[must_use]
    pub fn component(mut self, component: impl Into<String>) -> Self {
        self.components.push(component.into());
        self
    }

    /// Builds the XML body for the MKCALENDAR request.
    ///
    /// # Errors
    ///
    /// Returns an error if XML building fails.
    pub fn build(&self) -> Result<String, CalDavError> {
        let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);

        let mut mkcalendar = BytesStart::new("C:mkcalendar");
        mkcalendar.push_attribute(("xmlns:D", ns::DAV));
        mkcalendar.push_attribute(("xmlns:C", ns::CALDAV));
        writer.write_event(Event::Start(mkcalendar))?;
        writer.write_event(Event::Start(BytesStart::new("D:set")))?;
        writer.write_event(Event::Start(BytesStart::new("D:prop")))?;

        writer.write_event(Event::Start(BytesStart::new("D:displayname")))?;
        writer.write_event(Event::Text(BytesText::new(&self.display_name)))?;
        writer.write_event(Event::End(BytesEnd::new("D:displayname")))?;

        if !self.components.is_empty() {
            writer.write_event(Event::Start(BytesStart::new(
                "C:supported-calendar-component-set",
            )))?;
            for name in &self.components {
                let mut comp = BytesStart::new("C:comp");
                comp.push_attribute(("name", name.as_str()));
                writer.write_event(Event::Empty(comp))?;
            }
            writer.write_event(Event::End(BytesEnd::new(
                "C:supported-calendar-component-set",
            )))?;
        }

        writer.write_event(Event::End(BytesEnd::new("D:prop")))?;
        writer.write_event(Event::End(BytesEnd::new("D:set")))?;
        writer.write_event(Event::End(BytesEnd::new("C:mkcalendar")))?;

        into_string(writer)
    }
}

fn into_string(writer: XmlWriter) -> Result<String, CalDavError> {
    let bytes = writer.into_inner().into_inner();
    String::from_utf8(bytes).map_err(|e| CalDavError::Xml(format!("UTF-8 error: {e}")))
}
