// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! `CalDAV` client for task list operations.

use std::sync::Arc;

use reqwest::Method;

use crate::config::CalDavConfig;
use crate::error::CalDavError;
use crate::http::HttpClient;
use crate::request::{CalendarQueryRequest, MkCalendarRequest, Prop, PropFindRequest};
use crate::response::MultiStatusResponse;
use crate::types::{CalendarCollection, CalendarResource, ETag, Href};

const XML_CONTENT_TYPE: &str = "application/xml; charset=utf-8";
const ICS_CONTENT_TYPE: &str = "text/calendar; charset=utf-8";

/// `CalDAV` client for accessing and managing task calendars.
///
/// # Example
///
/// ```ignore
/// use taskbridge_caldav::{AuthMethod, CalDavClient, CalDavConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = CalDavConfig::new("https://caldav.example.com", "/dav/calendars/user/")
///     .with_auth(AuthMethod::Basic {
///         username: "user".to_string(),
///         password: "pass".to_string(),
///     });
///
/// let client = CalDavClient::new(config)?;
/// for calendar in client.list_calendars().await? {
///     let todos = client.list_todos(&calendar.href).await?;
///     println!("{}: {} todos", calendar.name(), todos.len());
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct CalDavClient {
    http: Arc<HttpClient>,
    config: CalDavConfig,
}

impl CalDavClient {
    /// Creates a new `CalDAV` client.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is empty or HTTP client initialization fails.
    pub fn new(config: CalDavConfig) -> Result<Self, CalDavError> {
        if config.base_url.trim().is_empty() {
            return Err(CalDavError::Config("base_url must not be empty".to_string()));
        }
        let http = HttpClient::new(&config)?;
        Ok(Self {
            http: Arc::new(http),
            config,
        })
    }

    /// The calendar home collection.
    #[must_use]
    pub fn calendar_home(&self) -> Href {
        Href::new(self.config.calendar_home_dir())
    }

    /// Lists the calendar collections under the calendar home.
    ///
    /// # Errors
    ///
    /// Returns an error if PROPFIND fails.
    pub async fn list_calendars(&self) -> Result<Vec<CalendarCollection>, CalDavError> {
        let url = self.full_url(&self.config.calendar_home_dir());
        let body = PropFindRequest::new()
            .prop(Prop::DisplayName)
            .prop(Prop::ResourceType)
            .prop(Prop::SupportedCalendarComponents)
            .build()?;

        let resp = self
            .http
            .execute(
                self.http
                    .build_dav_request("PROPFIND", &url)?
                    .header("Content-Type", XML_CONTENT_TYPE)
                    .header("Depth", "1")
                    .body(body),
            )
            .await?;

        let xml = resp.text().await?;
        Ok(MultiStatusResponse::from_xml(&xml)?.into_collections())
    }

    /// Creates a calendar collection that holds `VTODO` components.
    ///
    /// # Errors
    ///
    /// Returns an error if MKCALENDAR fails.
    pub async fn make_calendar(
        &self,
        href: &Href,
        display_name: &str,
    ) -> Result<CalendarCollection, CalDavError> {
        let url = self.full_url(href);
        let body = MkCalendarRequest::new(display_name)
            .component("VTODO")
            .build()?;

        self.http
            .execute(
                self.http
                    .build_dav_request("MKCALENDAR", &url)?
                    .header("Content-Type", XML_CONTENT_TYPE)
                    .body(body),
            )
            .await?;

        tracing::info!(%href, display_name, "created calendar");
        let mut collection = CalendarCollection::new(href.clone());
        collection.display_name = Some(display_name.to_string());
        collection.supported_components = vec!["VTODO".to_string()];
        Ok(collection)
    }

    /// Deletes a calendar collection and everything in it.
    ///
    /// # Errors
    ///
    /// Returns an error if DELETE fails.
    pub async fn delete_calendar(&self, href: &Href) -> Result<(), CalDavError> {
        let url = self.full_url(href);
        self.http
            .execute(self.http.build_request(Method::DELETE, &url))
            .await?;
        tracing::info!(%href, "deleted calendar");
        Ok(())
    }

    /// Fetches every `VTODO` object in a calendar.
    ///
    /// # Errors
    ///
    /// Returns an error if the REPORT fails.
    pub async fn list_todos(
        &self,
        calendar_href: &Href,
    ) -> Result<Vec<CalendarResource>, CalDavError> {
        let url = self.full_url(calendar_href);
        let body = CalendarQueryRequest::todos().build()?;

        let resp = self
            .http
            .execute(
                self.http
                    .build_dav_request("REPORT", &url)?
                    .header("Content-Type", XML_CONTENT_TYPE)
                    .header("Depth", "1")
                    .body(body),
            )
            .await?;

        let xml = resp.text().await?;
        Ok(MultiStatusResponse::from_xml(&xml)?.into_resources())
    }

    /// Stores a calendar object.
    ///
    /// With `etag`, the write only succeeds if the object is unchanged on the
    /// server; without it, the write only succeeds if the object does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if PUT fails or the precondition does not hold.
    pub async fn put_object(
        &self,
        href: &Href,
        etag: Option<&ETag>,
        ics: String,
    ) -> Result<Option<ETag>, CalDavError> {
        let url = self.full_url(href);
        let req = self
            .http
            .build_request(Method::PUT, &url)
            .header("Content-Type", ICS_CONTENT_TYPE)
            .body(ics);
        let req = match etag {
            Some(_) => HttpClient::if_match(req, etag),
            None => HttpClient::if_none_match_any(req),
        };

        let resp = self.http.execute(req).await?;
        Ok(HttpClient::extract_etag(&resp))
    }

    /// Replaces a calendar object regardless of its current state.
    ///
    /// # Errors
    ///
    /// Returns an error if PUT fails.
    pub async fn overwrite_object(&self, href: &Href, ics: String) -> Result<Option<ETag>, CalDavError> {
        let url = self.full_url(href);
        let resp = self
            .http
            .execute(
                self.http
                    .build_request(Method::PUT, &url)
                    .header("Content-Type", ICS_CONTENT_TYPE)
                    .body(ics),
            )
            .await?;
        Ok(HttpClient::extract_etag(&resp))
    }

    /// Deletes a calendar object.
    ///
    /// # Errors
    ///
    /// Returns an error if DELETE fails.
    pub async fn delete_object(&self, href: &Href, etag: Option<&ETag>) -> Result<(), CalDavError> {
        let url = self.full_url(href);
        self.http
            .execute(HttpClient::if_match(
                self.http.build_request(Method::DELETE, &url),
                etag,
            ))
            .await?;
        Ok(())
    }

    /// Builds full URL from href.
    fn full_url(&self, href: &str) -> String {
        if href.starts_with("http://") || href.starts_with("https://") {
            return href.to_string();
        }
        format!("{}{}", self.config.base_url.trim_end_matches('/'), href)
    }
}
