// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use crate::types::Href;

/// `CalDAV` client errors.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum CalDavError {
    /// HTTP layer error.
    #[error("HTTP error: {0}")]
    Http(String),

    /// XML parsing/writing error.
    #[error("XML error: {0}")]
    Xml(String),

    /// Authentication error.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Resource not found.
    #[error("Resource not found: {0}")]
    NotFound(Href),

    /// Precondition failed (`ETag` mismatch).
    #[error("Precondition failed: {0}")]
    PreconditionFailed(String),

    /// Invalid response from server.
    #[error("Invalid server response: {0}")]
    InvalidResponse(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for CalDavError {
    fn from(e: reqwest::Error) -> Self {
        Self::Http(e.to_string())
    }
}

impl From<quick_xml::Error> for CalDavError {
    fn from(e: quick_xml::Error) -> Self {
        Self::Xml(e.to_string())
    }
}

impl From<std::io::Error> for CalDavError {
    fn from(e: std::io::Error) -> Self {
        Self::Xml(format!("IO error: {e}"))
    }
}
