// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use jiff::tz::TimeZone;
use taskbridge_caldav::{CalDavClient, CalDavConfig, CalDavError, ETag, Href};

use crate::container::RemoteCalendar;
use crate::error::StoreResult;
use crate::item::{Item, ics};
use crate::store::RemoteStore;

/// Where a task lives on the server, as of the last listing or write.
#[derive(Debug, Clone)]
struct Location {
    href: Href,
    etag: Option<ETag>,
}

/// [`RemoteStore`] backed by a `CalDAV` server.
///
/// Tasks are addressed by `UID`. The href and `ETag` of every task seen in a
/// listing are remembered so updates and deletes can be made conditional.
#[derive(Debug)]
pub struct CalDavStore {
    client: CalDavClient,
    timezone: TimeZone,
    index: Mutex<HashMap<String, Location>>,
}

impl CalDavStore {
    /// Creates a store for the configured server.
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be built from `config`.
    pub fn new(config: CalDavConfig, timezone: TimeZone) -> Result<Self, CalDavError> {
        Ok(Self {
            client: CalDavClient::new(config)?,
            timezone,
            index: Mutex::new(HashMap::new()),
        })
    }

    fn calendar_href(calendar: &RemoteCalendar) -> StoreResult<Href> {
        calendar
            .href
            .clone()
            .map(Href::new)
            .ok_or_else(|| format!("calendar {:?} has no href", calendar.name).into())
    }

    fn uid_of(item: &Item) -> StoreResult<&str> {
        item.remote_id
            .as_deref()
            .ok_or_else(|| format!("task {:?} has no UID", item.name).into())
    }

    fn lookup(&self, uid: &str) -> Option<Location> {
        let index = self.index.lock().unwrap_or_else(PoisonError::into_inner);
        index.get(uid).cloned()
    }

    fn remember(&self, uid: &str, href: Href, etag: Option<ETag>) {
        let mut index = self.index.lock().unwrap_or_else(PoisonError::into_inner);
        index.insert(uid.to_string(), Location { href, etag });
    }

    fn forget(&self, uid: &str) {
        let mut index = self.index.lock().unwrap_or_else(PoisonError::into_inner);
        index.remove(uid);
    }

    /// The href of a task: the one last seen, or `<calendar>/<uid>.ics`.
    fn locate(&self, calendar: &RemoteCalendar, uid: &str) -> StoreResult<Location> {
        match self.lookup(uid) {
            Some(location) => Ok(location),
            None => Ok(Location {
                href: Self::calendar_href(calendar)?.join(&format!("{uid}.ics")),
                etag: None,
            }),
        }
    }
}

#[async_trait]
impl RemoteStore for CalDavStore {
    async fn list_calendars(&self) -> StoreResult<Vec<RemoteCalendar>> {
        let calendars = self.client.list_calendars().await?;
        Ok(calendars
            .into_iter()
            .filter(|c| c.supports_todos())
            .map(|c| RemoteCalendar::new(c.name()).with_href(c.href.to_string()))
            .collect())
    }

    async fn list_items(&self, calendar: &RemoteCalendar) -> StoreResult<Vec<String>> {
        let href = Self::calendar_href(calendar)?;
        let resources = self.client.list_todos(&href).await?;

        let mut records = Vec::with_capacity(resources.len());
        for resource in resources {
            match ics::uid_of(&resource.data) {
                Some(uid) => self.remember(&uid, resource.href, resource.etag),
                None => tracing::debug!(href = %resource.href, "task without UID"),
            }
            records.push(resource.data);
        }
        Ok(records)
    }

    async fn create_item(&self, calendar: &RemoteCalendar, item: &Item) -> StoreResult<String> {
        let uid = uuid::Uuid::new_v4().to_string();
        let href = Self::calendar_href(calendar)?.join(&format!("{uid}.ics"));
        let data = item.to_ics(&uid, &self.timezone);

        let etag = self.client.put_object(&href, None, data).await?;
        tracing::debug!(%href, uid, "created task");
        self.remember(&uid, href, etag);
        Ok(uid)
    }

    async fn update_item(&self, calendar: &RemoteCalendar, item: &Item) -> StoreResult<()> {
        let uid = Self::uid_of(item)?;
        let location = self.locate(calendar, uid)?;
        let data = item.to_ics(uid, &self.timezone);

        let etag = match &location.etag {
            Some(etag) => self.client.put_object(&location.href, Some(etag), data).await?,
            None => self.client.overwrite_object(&location.href, data).await?,
        };
        tracing::debug!(href = %location.href, uid, "updated task");
        self.remember(uid, location.href, etag);
        Ok(())
    }

    async fn delete_item(&self, calendar: &RemoteCalendar, id: &str) -> StoreResult<()> {
        let location = self.locate(calendar, id)?;
        self.client
            .delete_object(&location.href, location.etag.as_ref())
            .await?;
        tracing::debug!(href = %location.href, uid = id, "deleted task");
        self.forget(id);
        Ok(())
    }

    async fn create_calendar(&self, name: &str) -> StoreResult<RemoteCalendar> {
        let href = self
            .client
            .calendar_home()
            .join(&format!("{}/", uuid::Uuid::new_v4()));
        let collection = self.client.make_calendar(&href, name).await?;
        Ok(RemoteCalendar::new(name).with_href(collection.href.to_string()))
    }

    async fn delete_calendar(&self, calendar: &RemoteCalendar) -> StoreResult<()> {
        let href = Self::calendar_href(calendar)?;
        self.client.delete_calendar(&href).await?;
        Ok(())
    }
}
