// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! The `CalDAV` driver against a mock server.

use jiff::tz::TimeZone;
use taskbridge_caldav::CalDavConfig;
use taskbridge_core::{CalDavStore, Item, RawRecord, RemoteCalendar, RemoteStore};
use wiremock::matchers::{body_string_contains, header, method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common::{task, ts};

const CALENDARS: &str = r#"<?xml version="1.0" encoding="utf-8" ?>
<D:multistatus xmlns:D="DAV:" xmlns:C="urn:ietf:params:xml:ns:caldav">
  <D:response>
    <D:href>/dav/calendars/alice/</D:href>
    <D:propstat>
      <D:prop>
        <D:resourcetype><D:collection/></D:resourcetype>
      </D:prop>
      <D:status>HTTP/1.1 200 OK</D:status>
    </D:propstat>
  </D:response>
  <D:response>
    <D:href>/dav/calendars/alice/tasks/</D:href>
    <D:propstat>
      <D:prop>
        <D:displayname>Tasks</D:displayname>
        <D:resourcetype><D:collection/><C:calendar/></D:resourcetype>
        <C:supported-calendar-component-set>
          <C:comp name="VTODO"/>
        </C:supported-calendar-component-set>
      </D:prop>
      <D:status>HTTP/1.1 200 OK</D:status>
    </D:propstat>
  </D:response>
  <D:response>
    <D:href>/dav/calendars/alice/events/</D:href>
    <D:propstat>
      <D:prop>
        <D:displayname>Events</D:displayname>
        <D:resourcetype><D:collection/><C:calendar/></D:resourcetype>
        <C:supported-calendar-component-set>
          <C:comp name="VEVENT"/>
        </C:supported-calendar-component-set>
      </D:prop>
      <D:status>HTTP/1.1 200 OK</D:status>
    </D:propstat>
  </D:response>
</D:multistatus>"#;

const TODOS: &str = r#"<D:multistatus xmlns:D="DAV:" xmlns:C="urn:ietf:params:xml:ns:caldav">
  <D:response>
    <D:href>/dav/calendars/alice/tasks/milk.ics</D:href>
    <D:propstat>
      <D:prop>
        <D:getetag>"42"</D:getetag>
        <C:calendar-data>BEGIN:VCALENDAR
VERSION:2.0
BEGIN:VTODO
UID:milk-1
SUMMARY:Buy milk
DTSTAMP:20240418T100000Z
END:VTODO
END:VCALENDAR</C:calendar-data>
      </D:prop>
      <D:status>HTTP/1.1 200 OK</D:status>
    </D:propstat>
  </D:response>
</D:multistatus>"#;

fn store_for(server: &MockServer) -> CalDavStore {
    let config = CalDavConfig::new(server.uri(), "/dav/calendars/alice/");
    CalDavStore::new(config, TimeZone::UTC).unwrap()
}

fn tasks_calendar() -> RemoteCalendar {
    RemoteCalendar::new("Tasks").with_href("/dav/calendars/alice/tasks/")
}

#[tokio::test]
async fn caldav_store_lists_task_calendars_only() {
    let server = MockServer::start().await;
    Mock::given(method("PROPFIND"))
        .and(path("/dav/calendars/alice/"))
        .respond_with(ResponseTemplate::new(207).set_body_raw(CALENDARS, "application/xml"))
        .mount(&server)
        .await;

    let calendars = store_for(&server).list_calendars().await.unwrap();

    assert_eq!(calendars, vec![RemoteCalendar::new("Tasks")]);
    assert_eq!(
        calendars[0].href.as_deref(),
        Some("/dav/calendars/alice/tasks/")
    );
}

#[tokio::test]
async fn caldav_store_lists_items_as_ics() {
    let server = MockServer::start().await;
    Mock::given(method("REPORT"))
        .and(path("/dav/calendars/alice/tasks/"))
        .respond_with(ResponseTemplate::new(207).set_body_raw(TODOS, "application/xml"))
        .mount(&server)
        .await;

    let records = store_for(&server)
        .list_items(&tasks_calendar())
        .await
        .unwrap();

    assert_eq!(records.len(), 1);
    let item = Item::parse(&RawRecord::from_remote_ics(records[0].clone()), &TimeZone::UTC)
        .unwrap();
    assert_eq!(item.remote_id.as_deref(), Some("milk-1"));
    assert_eq!(item.name, "Buy milk");
    assert_eq!(item.modified_at, ts("2024-04-18T10:00:00Z"));
}

#[tokio::test]
async fn caldav_store_creates_item_with_new_uid() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path_regex(r"^/dav/calendars/alice/tasks/[0-9a-f-]{36}\.ics$"))
        .and(header("If-None-Match", "*"))
        .and(body_string_contains("SUMMARY:Call mom"))
        .respond_with(ResponseTemplate::new(201).insert_header("ETag", "\"1\""))
        .expect(1)
        .mount(&server)
        .await;

    let uid = store_for(&server)
        .create_item(&tasks_calendar(), &task("Call mom", "2024-04-18T10:00:00Z"))
        .await
        .unwrap();

    assert_eq!(uid.len(), 36);
    let requests = server.received_requests().await.unwrap();
    let body = String::from_utf8_lossy(&requests[0].body);
    assert!(body.contains(&format!("UID:{uid}")));
}

#[tokio::test]
async fn caldav_store_updates_with_listed_etag() {
    let server = MockServer::start().await;
    Mock::given(method("REPORT"))
        .and(path("/dav/calendars/alice/tasks/"))
        .respond_with(ResponseTemplate::new(207).set_body_raw(TODOS, "application/xml"))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/dav/calendars/alice/tasks/milk.ics"))
        .and(header("If-Match", "\"42\""))
        .and(body_string_contains("SUMMARY:Buy oat milk"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let store = store_for(&server);
    let calendar = tasks_calendar();
    store.list_items(&calendar).await.unwrap();
    let mut item = task("Buy oat milk", "2024-04-19T10:00:00Z");
    item.remote_id = Some("milk-1".to_string());

    store.update_item(&calendar, &item).await.unwrap();
}

#[tokio::test]
async fn caldav_store_deletes_unlisted_item_by_uid() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/dav/calendars/alice/tasks/gone-1.ics"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    store_for(&server)
        .delete_item(&tasks_calendar(), "gone-1")
        .await
        .unwrap();
}

#[tokio::test]
async fn caldav_store_reports_conflicts() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(412))
        .mount(&server)
        .await;

    let result = store_for(&server)
        .create_item(&tasks_calendar(), &task("Call mom", "2024-04-18T10:00:00Z"))
        .await;

    assert!(result.is_err());
}

#[tokio::test]
async fn caldav_store_creates_calendar_under_home() {
    let server = MockServer::start().await;
    Mock::given(method("MKCALENDAR"))
        .and(path_regex(r"^/dav/calendars/alice/[0-9a-f-]{36}/$"))
        .and(body_string_contains("Groceries"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let calendar = store_for(&server)
        .create_calendar("Groceries")
        .await
        .unwrap();

    assert_eq!(calendar.name, "Groceries");
    let href = calendar.href.unwrap();
    assert!(href.starts_with("/dav/calendars/alice/"));
    assert!(href.ends_with('/'));
}
