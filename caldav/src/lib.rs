// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Minimal `CalDAV` client (RFC 4791) for task lists: discovers calendar
//! collections that can hold `VTODO`s, creates and deletes them, and reads and
//! writes the raw iCalendar objects stored inside.

#![warn(
    trivial_casts,
    trivial_numeric_casts,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unsafe_code,
    unstable_features,
    unused_import_braces,
    unused_qualifications,
    clippy::dbg_macro,
    clippy::indexing_slicing,
    clippy::pedantic
)]
// Allow certain clippy lints that are too restrictive for this crate
#![allow(clippy::similar_names, clippy::single_match_else)]

mod client;
mod config;
mod error;
mod http;
mod request;
mod response;
mod types;
mod xml;

pub use crate::client::CalDavClient;
pub use crate::config::{AuthMethod, CalDavConfig};
pub use crate::error::CalDavError;
pub use crate::request::{CalendarQueryRequest, MkCalendarRequest, Prop, PropFindRequest};
pub use crate::response::MultiStatusResponse;
pub use crate::types::{CalendarCollection, CalendarResource, ETag, Href};
